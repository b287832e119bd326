use anyhow::{Context, Result};
use indexmap::IndexMap;
use std::fs;
use std::path::Path;

use crate::extract::{catalog_from_workshop, extend_with_upgrade_tiers, Catalog};
use crate::model::{RecipeMap, WorkshopData};
use crate::output::read_json;

/// Recipe coverage split over the craftable catalog.
#[derive(Debug, Default)]
pub struct Coverage {
    /// (item, station, level, material count)
    pub with_recipes: Vec<(String, String, String, usize)>,
    /// (item, station, level)
    pub without_recipes: Vec<(String, String, String)>,
}

impl Coverage {
    pub fn total(&self) -> usize {
        self.with_recipes.len() + self.without_recipes.len()
    }
}

/// Compare the craftable catalog (workshop items plus synthetic upgrade
/// tiers) against the harvested recipes.
pub fn coverage(workshop: &WorkshopData, recipes: &RecipeMap) -> Coverage {
    let mut catalog: Catalog = catalog_from_workshop(workshop);
    extend_with_upgrade_tiers(&mut catalog);

    let mut report = Coverage::default();
    for (item, source) in &catalog {
        let materials = recipes
            .get(item)
            .map(|r| r.required_materials.len())
            .unwrap_or(0);

        if materials > 0 {
            report.with_recipes.push((
                item.clone(),
                source.station.clone(),
                source.level.clone(),
                materials,
            ));
        } else {
            report
                .without_recipes
                .push((item.clone(), source.station.clone(), source.level.clone()));
        }
    }

    report
}

/// Load the workshop and recipe outputs from `data_dir` and print which
/// craftable items still lack a recipe, grouped by station. With `checklist`
/// set, the same report is also written as a markdown checklist.
pub fn check_missing_recipes(data_dir: &Path, checklist: Option<&Path>) -> Result<()> {
    let workshop: WorkshopData = read_json(&data_dir.join("workshop_level_ups.json"))?;

    let mut recipes: RecipeMap = read_json(&data_dir.join("crafting_recipes.json"))?;
    let upgrades_path = data_dir.join("upgrade_recipes.json");
    if upgrades_path.exists() {
        let upgrades: RecipeMap = read_json(&upgrades_path)?;
        recipes.extend(upgrades);
    }

    let report = coverage(&workshop, &recipes);

    println!("Total craftable items: {}", report.total());
    println!("Items with recipes: {}", report.with_recipes.len());
    println!("Items without recipes: {}", report.without_recipes.len());

    let rule = "=".repeat(60);
    println!("\n{}", rule);
    println!("Items WITHOUT recipes (grouped by station):");
    println!("{}", rule);

    let mut by_station: IndexMap<&str, Vec<(&str, &str)>> = IndexMap::new();
    for (item, station, level) in &report.without_recipes {
        by_station
            .entry(station.as_str())
            .or_default()
            .push((item.as_str(), level.as_str()));
    }
    by_station.sort_keys();

    for (station, mut items) in by_station {
        println!("\n{}:", station);
        items.sort();
        for (item, level) in items {
            println!("  - {} ({})", item, level);
        }
    }

    println!("\n{}", rule);
    println!("Items WITH recipes:");
    println!("{}", rule);

    let mut with_recipes = report.with_recipes.clone();
    with_recipes.sort();
    for (item, station, level, count) in with_recipes {
        println!("  ✓ {} ({}, {}) - {} materials", item, station, level, count);
    }

    if let Some(path) = checklist {
        write_checklist(&report, path)?;
        println!("\nChecklist saved to {:?}", path);
    }

    Ok(())
}

/// Render the coverage report as a markdown checklist: checked boxes for
/// items with recipes, unchecked for the rest, grouped per station.
pub fn write_checklist(report: &Coverage, path: &Path) -> Result<()> {
    let mut by_station: IndexMap<&str, (Vec<(&str, &str, usize)>, Vec<(&str, &str)>)> =
        IndexMap::new();
    for (item, station, level, count) in &report.with_recipes {
        by_station
            .entry(station.as_str())
            .or_default()
            .0
            .push((item.as_str(), level.as_str(), *count));
    }
    for (item, station, level) in &report.without_recipes {
        by_station
            .entry(station.as_str())
            .or_default()
            .1
            .push((item.as_str(), level.as_str()));
    }
    by_station.sort_keys();

    let total = report.total();
    let covered = report.with_recipes.len();
    let percent = if total > 0 { covered * 100 / total } else { 0 };

    let mut out = String::new();
    out.push_str("# Crafting Recipes Checklist\n\n");
    out.push_str(&format!(
        "**Status:** {}/{} items have recipes ({}%)\n\n",
        covered, total, percent
    ));
    out.push_str("---\n\n");

    for (station, (mut with, mut without)) in by_station {
        with.sort();
        without.sort();

        out.push_str(&format!("## {}\n\n", station));
        out.push_str(&format!(
            "**Status:** {}/{} items have recipes\n\n",
            with.len(),
            with.len() + without.len()
        ));

        if !with.is_empty() {
            out.push_str("### ✅ Items WITH recipes:\n\n");
            for (item, level, count) in with {
                out.push_str(&format!(
                    "- [x] **{}** ({}) - {} materials\n",
                    item, level, count
                ));
            }
            out.push('\n');
        }

        if !without.is_empty() {
            out.push_str("### ❌ Items WITHOUT recipes:\n\n");
            for (item, level) in without {
                out.push_str(&format!("- [ ] **{}** ({})\n", item, level));
            }
            out.push('\n');
        }

        out.push_str("---\n\n");
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {:?}", parent))?;
    }
    fs::write(path, out).with_context(|| format!("Failed to write checklist: {:?}", path))
}
