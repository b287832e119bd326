use anyhow::Result;
use indexmap::IndexMap;
use scraper::Html;
use std::collections::HashSet;

use crate::fetch::{page_variants, WikiClient};
use crate::model::{QuantifiedMaterial, Recipe, RecipeMap, WorkshopData};
use crate::parse::{parse_recipe_materials, reconcile, tier_of, MatchMode};
use crate::scrape::{classify, content_region, tables_in, TableKind};

use super::catalog::catalog_from_workshop;
use super::recipe_pages::{recipe_rows, visit_pages};

/// Scrape base crafting recipes for every item the workshop can craft.
///
/// Each craftable item gets its own page walk; pages visited for an earlier
/// item are not re-fetched. Items whose recipe was not found anywhere keep
/// an empty materials list in the output.
pub fn extract_crafting(client: &WikiClient, workshop: &WorkshopData) -> Result<RecipeMap> {
    println!("Extracting crafting recipes...");

    let catalog = catalog_from_workshop(workshop);
    println!("Found {} craftable items", catalog.len());

    let names: Vec<&str> = catalog.keys().map(String::as_str).collect();
    let mut found: IndexMap<String, Vec<QuantifiedMaterial>> = IndexMap::new();
    let mut processed: HashSet<String> = HashSet::new();

    let mut fetch_order: Vec<&String> = catalog.keys().collect();
    fetch_order.sort();

    for item in fetch_order {
        visit_pages(client, &page_variants(item), &mut processed, |document| {
            harvest_crafting_tables(document, &names, &mut found);
        })?;
    }

    let mut recipes = RecipeMap::new();
    for (item, source) in &catalog {
        recipes.insert(
            item.clone(),
            Recipe {
                station: source.station.clone(),
                level: source.level.clone(),
                required_materials: found.get(item).cloned().unwrap_or_default(),
                upgrade_from: None,
            },
        );
    }

    Ok(recipes)
}

/// Merge the recipe rows of every non-upgrade recipe table on the page.
fn harvest_crafting_tables(
    document: &Html,
    names: &[&str],
    found: &mut IndexMap<String, Vec<QuantifiedMaterial>>,
) {
    let Some(region) = content_region(document) else {
        return;
    };

    for table in tables_in(region) {
        if classify(&table) != TableKind::Recipe {
            continue;
        }

        for row in recipe_rows(&table) {
            let matched = reconcile(&row.result_item, names, MatchMode::Crafting);

            for item in matched {
                let already_filled = found.get(&item).map(|m| !m.is_empty()).unwrap_or(false);
                if already_filled {
                    continue;
                }

                // Tier-suffixed ingredients belong to upgrade recipes, not
                // base crafting costs.
                let materials: Vec<QuantifiedMaterial> = parse_recipe_materials(row.recipe_cell)
                    .into_iter()
                    .filter(|entry| tier_of(&entry.material).is_none())
                    .collect();

                if !materials.is_empty() {
                    println!("  + {}: {} materials", item, materials.len());
                    found.insert(item, materials);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"<div class="mw-parser-output"><table>
        <tr><th>Recipe</th><th>Craft Time</th><th>B</th><th>C</th><th>Result</th></tr>
        <tr><td>2x Scrap<br>1x Wire</td><td>5s</td><td></td><td></td><td>1x Rattler I</td></tr>
    </table></div>"#;

    #[test]
    fn test_harvest_fills_matching_item() {
        let document = Html::parse_document(PAGE);
        let names = vec!["Rattler I", "Lure"];
        let mut found = IndexMap::new();

        harvest_crafting_tables(&document, &names, &mut found);

        assert_eq!(
            found["Rattler I"],
            vec![
                QuantifiedMaterial::new("Scrap", 2),
                QuantifiedMaterial::new("Wire", 1)
            ]
        );
        assert!(!found.contains_key("Lure"));
    }

    #[test]
    fn test_harvest_never_overwrites_filled_entry() {
        let document = Html::parse_document(PAGE);
        let names = vec!["Rattler I"];
        let mut found = IndexMap::new();
        found.insert(
            "Rattler I".to_string(),
            vec![QuantifiedMaterial::new("Fabric", 9)],
        );

        harvest_crafting_tables(&document, &names, &mut found);

        assert_eq!(
            found["Rattler I"],
            vec![QuantifiedMaterial::new("Fabric", 9)]
        );
    }

    #[test]
    fn test_upgrade_tables_skipped() {
        let html = r#"<div class="mw-parser-output"><table>
            <tr><th>Recipe</th><th>Upgraded Stats</th><th>B</th><th>C</th><th>Result</th></tr>
            <tr><td>Rattler I 2x Scrap</td><td></td><td></td><td></td><td>Rattler II</td></tr>
        </table></div>"#;
        let document = Html::parse_document(html);
        let names = vec!["Rattler I", "Rattler II"];
        let mut found = IndexMap::new();

        harvest_crafting_tables(&document, &names, &mut found);
        assert!(found.is_empty());
    }
}
