use indexmap::IndexMap;

use crate::model::WorkshopData;
use crate::parse::{is_upgrade_tier, strip_tier};

/// Where an item is crafted, per the workshop data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CraftSource {
    pub station: String,
    pub level: String,
}

/// Canonical craftable item names mapped to their craft source, in workshop
/// document order. These names are authoritative for reconciliation.
pub type Catalog = IndexMap<String, CraftSource>;

/// Collect every craftable item declared in the workshop data.
pub fn catalog_from_workshop(workshop: &WorkshopData) -> Catalog {
    let mut catalog = Catalog::new();

    for (station_name, levels) in &workshop.stations {
        for level_data in levels {
            for item_name in &level_data.crafts {
                catalog.entry(item_name.clone()).or_insert_with(|| CraftSource {
                    station: station_name.clone(),
                    level: level_data.level.clone(),
                });
            }
        }
    }

    catalog
}

/// Add synthetic tier II/III/IV entries for every tier-I item.
///
/// The workshop only lists base items; upgrade tiers inherit the base item's
/// station and level.
pub fn extend_with_upgrade_tiers(catalog: &mut Catalog) {
    let base_items: Vec<(String, CraftSource)> = catalog
        .iter()
        .filter(|(name, _)| name.ends_with(" I"))
        .map(|(name, source)| (name.clone(), source.clone()))
        .collect();

    for (base_item, source) in base_items {
        let base_name = base_item[..base_item.len() - 2].trim_end().to_string();
        for tier in ["II", "III", "IV"] {
            let upgrade_item = format!("{} {}", base_name, tier);
            catalog.entry(upgrade_item).or_insert_with(|| source.clone());
        }
    }
}

/// Group catalog items by their tier-stripped base name, preserving order.
pub fn group_by_base(catalog: &Catalog) -> IndexMap<String, Vec<String>> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();

    for name in catalog.keys() {
        let base = strip_tier(name).to_string();
        groups.entry(base).or_default().push(name.clone());
    }

    groups
}

/// Whether any catalog entry is an upgrade-tier item.
pub fn upgrade_items(catalog: &Catalog) -> impl Iterator<Item = (&String, &CraftSource)> {
    catalog
        .iter()
        .filter(|(name, _)| is_upgrade_tier(name))
}
