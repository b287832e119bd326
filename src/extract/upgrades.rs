use anyhow::Result;
use indexmap::IndexMap;
use scraper::Html;
use std::collections::HashSet;

use crate::fetch::{family_page_variants, WikiClient};
use crate::model::{QuantifiedMaterial, Recipe, RecipeMap, WorkshopData};
use crate::parse::{
    is_upgrade_tier, normalize_recipe_text, parse_recipe_materials, reconcile,
    split_leading_base_item, tier_of, MatchMode,
};
use crate::scrape::{classify, content_region, tables_in, TableKind};

use super::catalog::{
    catalog_from_workshop, extend_with_upgrade_tiers, group_by_base, upgrade_items,
};
use super::recipe_pages::{recipe_rows, visit_pages};

/// Materials plus the base-item back-reference harvested for one upgrade.
#[derive(Debug, Clone)]
struct UpgradeCost {
    materials: Vec<QuantifiedMaterial>,
    upgrade_from: Option<String>,
}

/// Scrape tier-upgrade recipes (II, III, IV).
///
/// The workshop only declares tier-I items, so the catalog is first extended
/// with synthetic upgrade tiers; the walk then visits one page per item
/// family rather than one per item.
pub fn extract_upgrades(client: &WikiClient, workshop: &WorkshopData) -> Result<RecipeMap> {
    println!("Extracting upgrade recipes...");

    let mut catalog = catalog_from_workshop(workshop);
    extend_with_upgrade_tiers(&mut catalog);
    println!("Found {} items (including upgrades)", catalog.len());

    let names: Vec<&str> = catalog.keys().map(String::as_str).collect();
    let mut found: IndexMap<String, UpgradeCost> = IndexMap::new();
    let mut processed: HashSet<String> = HashSet::new();

    let families = group_by_base(&catalog);
    let mut fetch_order: Vec<&String> = families.keys().collect();
    fetch_order.sort();

    for base_name in fetch_order {
        let variants = family_page_variants(base_name, &families[base_name]);
        visit_pages(client, &variants, &mut processed, |document| {
            harvest_upgrade_tables(document, &names, &mut found);
        })?;
    }

    let mut recipes = RecipeMap::new();
    for (item, source) in upgrade_items(&catalog) {
        let cost = found.get(item);
        recipes.insert(
            item.clone(),
            Recipe {
                station: source.station.clone(),
                level: source.level.clone(),
                required_materials: cost.map(|c| c.materials.clone()).unwrap_or_default(),
                upgrade_from: cost.and_then(|c| c.upgrade_from.clone()),
            },
        );
    }

    Ok(recipes)
}

/// Merge the rows of every upgrade table on the page.
fn harvest_upgrade_tables(
    document: &Html,
    names: &[&str],
    found: &mut IndexMap<String, UpgradeCost>,
) {
    let Some(region) = content_region(document) else {
        return;
    };

    for table in tables_in(region) {
        if classify(&table) != TableKind::Upgrade {
            continue;
        }

        for row in recipe_rows(&table) {
            let matched = reconcile(&row.result_item, names, MatchMode::Upgrade);

            for item in matched {
                if !is_upgrade_tier(&item) {
                    continue;
                }
                let already_filled = found
                    .get(&item)
                    .map(|c| !c.materials.is_empty())
                    .unwrap_or(false);
                if already_filled {
                    continue;
                }

                if let Some(cost) = parse_upgrade_cell(row.recipe_cell, &row.result_item) {
                    println!("  + {}: {} materials", item, cost.materials.len());
                    found.insert(item, cost);
                }
            }
        }
    }
}

/// Parse an upgrade ingredients cell.
///
/// The cell leads with the previous-tier item being consumed ("Rattler I
/// 2x Scrap"); that prefix becomes a quantity-1 material and the
/// `upgrade_from` back-reference.
fn parse_upgrade_cell(recipe_cell: &str, result_item: &str) -> Option<UpgradeCost> {
    let normalized = normalize_recipe_text(recipe_cell);

    let mut materials = Vec::new();
    let remainder = match split_leading_base_item(&normalized) {
        Some((base_item, rest)) => {
            if !base_item.eq_ignore_ascii_case(result_item) {
                materials.push(QuantifiedMaterial::new(base_item, 1));
            }
            rest
        }
        None => normalized,
    };
    materials.extend(parse_recipe_materials(&remainder));

    if materials.is_empty() {
        return None;
    }

    let upgrade_from = materials
        .iter()
        .find(|entry| tier_of(&entry.material).is_some())
        .map(|entry| entry.material.clone());

    Some(UpgradeCost {
        materials,
        upgrade_from,
    })
}
