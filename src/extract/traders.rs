use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Html;

use crate::fetch::{WikiClient, FANDOM_URL};
use crate::model::{MaterialInfo, TraderListing};
use crate::output::fold_materials;
use crate::scrape::{classify, content_region, tables_in, TableKind, WikiTable};

/// The trader roster and what each one stocks.
pub const TRADERS: &[(&str, &str, &str)] = &[
    ("Celeste", "Celeste", "Basic Materials"),
    ("Tian Wen", "Tian_Wen", "Weapons & Ammo"),
    ("Apollo", "Apollo", "Grenades & Gadgets"),
    ("Shani", "Shani", "Security"),
    ("Lance", "Lance", "Medical, Shields & Augments"),
];

/// "x3" bundle-count markers around a material name.
static COUNT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^x\d+\s*").expect("Invalid prefix regex"));
static COUNT_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*x\d+$").expect("Invalid suffix regex"));

/// Header text echoed into data rows by irregular wiki tables.
const HEADER_ECHOES: &[&str] = &[
    "required resources",
    "item",
    "material",
    "price",
    "cost",
    "level requirement",
];

/// Scrape every trader page and fold the sightings into one entry per
/// material.
pub fn extract_traders(client: &WikiClient) -> Result<Vec<MaterialInfo>> {
    println!("Extracting trader data...");

    let mut sightings = Vec::new();

    for (name, page, category) in TRADERS {
        println!("  Fetching {} ({})...", name, category);

        let Some(body) = client.fetch_wiki_page(FANDOM_URL, page)? else {
            continue;
        };
        let document = Html::parse_document(&body);
        let Some(region) = content_region(&document) else {
            continue;
        };

        for table in tables_in(region) {
            if classify(&table) != TableKind::TraderPricing {
                continue;
            }
            sightings.extend(materials_from_table(&table, name));
        }
    }

    Ok(fold_materials(sightings))
}

fn materials_from_table(table: &WikiTable, trader_name: &str) -> Vec<MaterialInfo> {
    let item_col = table.find_column(&["item"]);
    let material_col = item_col.or_else(|| table.find_column(&["material"]));
    let price_col = table.find_column(&["required resources", "price", "cost"]);

    let mut records = Vec::new();

    for row in &table.rows {
        if row.len() < 2 {
            continue;
        }

        let material = material_col
            .and_then(|col| row.get(col))
            .map(|cell| clean_material_name(cell))
            .unwrap_or_default();
        let price = price_col
            .and_then(|col| row.get(col))
            .map(|cell| cell.replace('\n', " ").trim().to_string())
            .unwrap_or_default();

        if material.is_empty()
            || material.starts_with('$')
            || HEADER_ECHOES.contains(&material.to_lowercase().as_str())
        {
            continue;
        }

        records.push(MaterialInfo {
            material,
            trader: Some(TraderListing {
                available: true,
                trader_name: trader_name.to_string(),
                price: if price.is_empty() {
                    "Unknown".to_string()
                } else {
                    price
                },
                frequency: "Daily".to_string(),
            }),
        });
    }

    records
}

/// Strip bundle-count markers and collapse line breaks in a name cell.
fn clean_material_name(cell: &str) -> String {
    let flattened = cell.replace('\n', " ");
    let trimmed = flattened.trim();
    let without_prefix = COUNT_PREFIX.replace(trimmed, "");
    COUNT_SUFFIX.replace(&without_prefix, "").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_material_name() {
        assert_eq!(clean_material_name("x3 Scrap"), "Scrap");
        assert_eq!(clean_material_name("Scrap x10"), "Scrap");
        assert_eq!(clean_material_name("Metal\nParts"), "Metal Parts");
    }

    fn trader_table(html: &str) -> WikiTable {
        let document = Html::parse_document(html);
        let region = content_region(&document).unwrap();
        tables_in(region).into_iter().next().unwrap()
    }

    #[test]
    fn test_materials_from_table() {
        let table = trader_table(
            r#"<div class="mw-parser-output"><table>
                <tr><th>Item</th><th>Price</th></tr>
                <tr><td>x2 Scrap</td><td>$120</td></tr>
                <tr><td>$400</td><td>Great Mullet</td></tr>
                <tr><td>Item</td><td>Price</td></tr>
            </table></div>"#,
        );

        let records = materials_from_table(&table, "Celeste");
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].material, "Scrap");
        let listing = records[0].trader.as_ref().unwrap();
        assert_eq!(listing.trader_name, "Celeste");
        assert_eq!(listing.price, "$120");
        assert_eq!(listing.frequency, "Daily");
    }

    #[test]
    fn test_empty_price_becomes_unknown() {
        let table = trader_table(
            r#"<div class="mw-parser-output"><table>
                <tr><th>Item</th><th>Price</th></tr>
                <tr><td>Wire</td><td></td></tr>
            </table></div>"#,
        );

        let records = materials_from_table(&table, "Lance");
        assert_eq!(records[0].trader.as_ref().unwrap().price, "Unknown");
    }
}
