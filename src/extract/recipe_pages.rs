use anyhow::Result;
use scraper::Html;
use std::collections::HashSet;

use crate::fetch::{WikiClient, BASE_URLS};
use crate::parse::strip_quantity_prefix;
use crate::scrape::WikiTable;

/// Fetch the first reachable page among the variant names, trying each
/// mirror in order, and hand it to `harvest`. Pages already visited in this
/// run are not fetched again; their rows were merged the first time.
pub(crate) fn visit_pages(
    client: &WikiClient,
    variants: &[String],
    processed: &mut HashSet<String>,
    mut harvest: impl FnMut(&Html),
) -> Result<()> {
    'variants: for page in variants {
        for base_url in BASE_URLS {
            let url = format!("{}/wiki/{}", base_url, page);
            if processed.contains(&url) {
                break 'variants;
            }
            if let Some(body) = client.fetch_page(&url)? {
                harvest(&Html::parse_document(&body));
                processed.insert(url);
                break 'variants;
            }
        }
    }
    Ok(())
}

/// One data row of a recipe or upgrade table.
pub(crate) struct RecipeRow<'a> {
    /// The ingredients cell, line breaks preserved.
    pub recipe_cell: &'a str,
    /// The result-item name, leading quantity stripped.
    pub result_item: String,
}

/// Pull the recipe cell and result item out of each usable data row.
///
/// The wiki's recipe tables put ingredients in the first column and the
/// crafted item in the fifth (older layouts: fourth).
pub(crate) fn recipe_rows<'a>(table: &'a WikiTable) -> Vec<RecipeRow<'a>> {
    let mut rows = Vec::new();

    for row in &table.rows {
        if row.len() < 3 {
            continue;
        }

        let result_cell = row.get(4).or_else(|| row.get(3));
        let Some(result_cell) = result_cell else {
            continue;
        };

        let result_item = strip_quantity_prefix(&result_cell.replace('\n', " "));
        if result_item.is_empty() {
            continue;
        }

        rows.push(RecipeRow {
            recipe_cell: &row[0],
            result_item,
        });
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::{content_region, tables_in};

    #[test]
    fn test_recipe_rows_prefer_fifth_column() {
        let html = r#"<div class="mw-parser-output"><table>
            <tr><th>Recipe</th><th>A</th><th>B</th><th>C</th><th>Result</th></tr>
            <tr><td>2x Scrap<br>1x Wire</td><td></td><td></td><td></td><td>1x Rattler I</td></tr>
            <tr><td>short</td><td>row</td></tr>
        </table></div>"#;
        let document = Html::parse_document(html);
        let region = content_region(&document).unwrap();
        let table = tables_in(region).into_iter().next().unwrap();

        let rows = recipe_rows(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].result_item, "Rattler I");
        assert_eq!(rows[0].recipe_cell, "2x Scrap\n1x Wire");
    }

    #[test]
    fn test_recipe_rows_fall_back_to_fourth_column() {
        let html = r#"<div class="mw-parser-output"><table>
            <tr><th>Recipe</th><th>A</th><th>B</th><th>Result</th></tr>
            <tr><td>2x Scrap</td><td></td><td></td><td>Lure</td></tr>
        </table></div>"#;
        let document = Html::parse_document(html);
        let region = content_region(&document).unwrap();
        let table = tables_in(region).into_iter().next().unwrap();

        let rows = recipe_rows(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].result_item, "Lure");
    }
}
