use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A material together with how many of it a recipe or upgrade needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantifiedMaterial {
    pub material: String,
    pub quantity: u32,
}

impl QuantifiedMaterial {
    pub fn new(material: impl Into<String>, quantity: u32) -> Self {
        Self {
            material: material.into(),
            quantity,
        }
    }
}

/// Which trader sells a material, and at what price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraderListing {
    pub available: bool,
    pub trader_name: String,
    /// Free-form price text from the wiki; "Unknown" when the cell was empty.
    pub price: String,
    pub frequency: String,
}

/// One entry in the materials-info output, keyed by material name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialInfo {
    pub material: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trader: Option<TraderListing>,
}

/// A single upgrade level of a workshop station.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationLevel {
    pub level: String,
    pub required_resources: Vec<QuantifiedMaterial>,
    /// Item names unlocked for crafting at this level.
    pub crafts: Vec<String>,
}

/// The workshop output file: stations in document order, each with its levels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkshopData {
    pub stations: IndexMap<String, Vec<StationLevel>>,
}

/// A crafting or upgrade recipe, keyed by canonical item name in the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recipe {
    pub station: String,
    pub level: String,
    pub required_materials: Vec<QuantifiedMaterial>,
    /// Base-tier item consumed by an upgrade recipe, when known.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upgrade_from: Option<String>,
}

/// Recipes keyed by canonical item name, in catalog order.
pub type RecipeMap = IndexMap<String, Recipe>;

/// An expedition project and its material costs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub name: String,
    pub description: String,
    pub required_materials: Vec<QuantifiedMaterial>,
}

/// One entry of the items catalog (`items.json`).
///
/// The catalog is produced elsewhere and carries fields this tool does not
/// interpret; `extra` keeps them intact across an in-place rewrite.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    #[serde(default)]
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}
