use indexmap::IndexMap;

use crate::model::{MaterialInfo, Recipe};

/// Merge two sightings of the same material.
///
/// A present incoming trader sub-record updates the entry; an absent one
/// never clobbers data a previous page already supplied.
pub fn merge_material(old: MaterialInfo, new: MaterialInfo) -> MaterialInfo {
    MaterialInfo {
        material: old.material,
        trader: new.trader.or(old.trader),
    }
}

/// Merge two recipes extracted for the same item: the first non-empty
/// materials list wins, so re-encountering an item on a later page cannot
/// overwrite data already found.
pub fn merge_recipe(old: Recipe, new: Recipe) -> Recipe {
    if old.required_materials.is_empty() {
        new
    } else {
        old
    }
}

/// Fold material records into one entry per material name, first seen wins
/// the slot, reducer resolves repeats. Order of first sighting is preserved.
pub fn fold_materials(records: impl IntoIterator<Item = MaterialInfo>) -> Vec<MaterialInfo> {
    let mut merged: IndexMap<String, MaterialInfo> = IndexMap::new();

    for record in records {
        match merged.entry(record.material.clone()) {
            indexmap::map::Entry::Occupied(mut entry) => {
                let existing = entry.get().clone();
                entry.insert(merge_material(existing, record));
            }
            indexmap::map::Entry::Vacant(entry) => {
                entry.insert(record);
            }
        }
    }

    merged.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TraderListing;

    fn listing(trader: &str) -> TraderListing {
        TraderListing {
            available: true,
            trader_name: trader.to_string(),
            price: "120".to_string(),
            frequency: "Daily".to_string(),
        }
    }

    fn info(material: &str, trader: Option<&str>) -> MaterialInfo {
        MaterialInfo {
            material: material.to_string(),
            trader: trader.map(listing),
        }
    }

    #[test]
    fn test_empty_never_overwrites_filled() {
        let merged = merge_material(info("Scrap", Some("Celeste")), info("Scrap", None));
        assert_eq!(merged.trader.unwrap().trader_name, "Celeste");
    }

    #[test]
    fn test_later_trader_updates() {
        let merged = merge_material(info("Scrap", Some("Celeste")), info("Scrap", Some("Apollo")));
        assert_eq!(merged.trader.unwrap().trader_name, "Apollo");
    }

    #[test]
    fn test_fold_keeps_first_seen_order() {
        let folded = fold_materials(vec![
            info("Scrap", Some("Celeste")),
            info("Wire", None),
            info("Scrap", None),
            info("Wire", Some("Lance")),
        ]);
        let names: Vec<_> = folded.iter().map(|m| m.material.as_str()).collect();
        assert_eq!(names, vec!["Scrap", "Wire"]);
        assert_eq!(
            folded[0].trader.as_ref().unwrap().trader_name,
            "Celeste"
        );
        assert_eq!(folded[1].trader.as_ref().unwrap().trader_name, "Lance");
    }

    #[test]
    fn test_recipe_first_filled_wins() {
        use crate::model::QuantifiedMaterial;

        let filled = Recipe {
            station: "Workbench".to_string(),
            level: "I".to_string(),
            required_materials: vec![QuantifiedMaterial::new("Scrap", 2)],
            upgrade_from: None,
        };
        let empty = Recipe {
            required_materials: Vec::new(),
            ..filled.clone()
        };

        let merged = merge_recipe(filled.clone(), empty.clone());
        assert_eq!(merged, filled);

        let merged = merge_recipe(empty, filled.clone());
        assert_eq!(merged, filled);
    }
}
