use anyhow::Result;
use scraper::Html;

use crate::fetch::{WikiClient, FANDOM_URL};
use crate::model::{StationLevel, WorkshopData};
use crate::parse::parse_requirements;
use crate::scrape::{content_region, section_tables, WikiTable};

const WORKSHOP_PAGE: &str = "Workshop";

/// Every station with its own section on the Workshop page.
pub const STATION_NAMES: &[&str] = &[
    "Workbench",
    "Gunsmith",
    "Gear Bench",
    "Explosives Station",
    "Medical Lab",
    "Utility Station",
    "Refiner",
    "Scrappy the Rooster",
];

/// Scrape the Workshop page into per-station level records.
pub fn extract_workshop(client: &WikiClient) -> Result<WorkshopData> {
    println!("Extracting workshop data...");

    let mut data = WorkshopData::default();

    let Some(body) = client.fetch_wiki_page(FANDOM_URL, WORKSHOP_PAGE)? else {
        println!("  Workshop page unavailable");
        return Ok(data);
    };
    let document = Html::parse_document(&body);
    let Some(region) = content_region(&document) else {
        return Ok(data);
    };

    for station_name in STATION_NAMES {
        let mut levels = Vec::new();
        for table in section_tables(region, station_name) {
            levels.extend(levels_from_table(&table));
        }
        if !levels.is_empty() {
            data.stations.insert(station_name.to_string(), levels);
        }
    }

    Ok(data)
}

fn levels_from_table(table: &WikiTable) -> Vec<StationLevel> {
    let level_col = table.find_column(&["level"]);
    let resources_col = table.find_column(&["required", "resource"]);
    let crafts_col = table.find_column(&["craft"]);

    let mut levels = Vec::new();

    for row in &table.rows {
        if row.len() < 2 {
            continue;
        }

        let level = level_col
            .and_then(|col| row.get(col))
            .map(|cell| cell.trim().to_string())
            .unwrap_or_default();
        if level.is_empty() {
            continue;
        }

        let required_resources = resources_col
            .and_then(|col| row.get(col))
            .map(|cell| parse_requirements(cell))
            .unwrap_or_default();

        let crafts = crafts_col
            .and_then(|col| row.get(col))
            .map(|cell| {
                cell.lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        levels.push(StationLevel {
            level,
            required_resources,
            crafts,
        });
    }

    levels
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::QuantifiedMaterial;
    use crate::scrape::tables_in;

    #[test]
    fn test_levels_from_table() {
        let html = r#"<div class="mw-parser-output"><table>
            <tr><th>Level</th><th>Required Resources</th><th>Crafts</th></tr>
            <tr><td>I</td><td>2x Scrap, 1x Wire</td><td>Rattler I<br>Lure</td></tr>
            <tr><td>II</td><td>6x Scrap</td><td></td></tr>
            <tr><td></td><td>bad row</td><td></td></tr>
        </table></div>"#;
        let document = Html::parse_document(html);
        let region = content_region(&document).unwrap();
        let table = tables_in(region).into_iter().next().unwrap();

        let levels = levels_from_table(&table);
        assert_eq!(levels.len(), 2);
        assert_eq!(levels[0].level, "I");
        assert_eq!(
            levels[0].required_resources,
            vec![
                QuantifiedMaterial::new("Scrap", 2),
                QuantifiedMaterial::new("Wire", 1)
            ]
        );
        assert_eq!(levels[0].crafts, vec!["Rattler I", "Lure"]);
        assert!(levels[1].crafts.is_empty());
    }
}
