use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

static SELECTOR_CONTENT: Lazy<Selector> =
    Lazy::new(|| Selector::parse("div.mw-parser-output").expect("Invalid content selector"));
static SELECTOR_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Invalid table selector"));
static SELECTOR_TR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Invalid tr selector"));
static SELECTOR_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("th, td").expect("Invalid cell selector"));

/// Trailing tier token of an upgrade-tier item (II and above).
static UPGRADE_TIER_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(II|III|IV)$").expect("Invalid tier regex"));

/// What a wiki table appears to describe, judged from its header row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Trader inventory with item/material and price columns.
    TraderPricing,
    /// Tier-upgrade costs; takes priority over `Recipe` when both match.
    Upgrade,
    /// Base crafting costs.
    Recipe,
    /// Expedition project table.
    Project,
    Other,
}

/// A table lifted out of the page: lower-cased headers plus raw data rows.
///
/// Cell text preserves `<br>` and block boundaries as newlines so that
/// multi-entry cells (recipes, craft lists) stay splittable.
#[derive(Debug, Clone)]
pub struct WikiTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl WikiTable {
    /// Extract headers and rows from a `<table>` element. Returns `None` for
    /// tables without at least one header row and one data row.
    pub fn from_element(table: ElementRef) -> Option<Self> {
        let mut rows_iter = table.select(&SELECTOR_TR);
        let header_row = rows_iter.next()?;

        let headers: Vec<String> = header_row
            .select(&SELECTOR_CELL)
            .map(|cell| cell_text(cell).trim().to_lowercase())
            .collect();

        let rows: Vec<Vec<String>> = rows_iter
            .map(|row| {
                row.select(&SELECTOR_CELL)
                    .map(|cell| cell_text(cell).trim().to_string())
                    .collect()
            })
            .collect();

        if headers.is_empty() || rows.is_empty() {
            return None;
        }

        Some(Self { headers, rows })
    }

    /// Index of the first header containing any of the given keywords.
    pub fn find_column(&self, keywords: &[&str]) -> Option<usize> {
        self.headers
            .iter()
            .position(|h| keywords.iter().any(|kw| h.contains(kw)))
    }

    fn headers_text(&self) -> String {
        self.headers.join(" ")
    }
}

/// The page's main content region (`div.mw-parser-output`).
pub fn content_region(document: &Html) -> Option<ElementRef<'_>> {
    document.select(&SELECTOR_CONTENT).next()
}

/// All usable tables inside the content region, in document order.
pub fn tables_in(region: ElementRef) -> Vec<WikiTable> {
    region
        .select(&SELECTOR_TABLE)
        .filter_map(WikiTable::from_element)
        .collect()
}

/// Classify a table by its header keywords.
///
/// Upgrade classification wins over generic recipe classification: upgrade
/// tables are structurally recipe tables for tier-II+ items. A recipe table
/// whose first data rows list tier-II+ result items is also treated as an
/// upgrade table, covering pages where the headers alone do not say so.
pub fn classify(table: &WikiTable) -> TableKind {
    let headers = table.headers_text();

    let is_upgrade = headers.contains("upgraded")
        || (headers.contains("upgrade")
            && (headers.contains("stats") || headers.contains("perks")));
    let is_recipe = headers.contains("recipe")
        || headers.contains("craft")
        || headers.contains("blueprint");

    if is_recipe && (is_upgrade || headers.contains("upgrade") || has_upgrade_rows(table)) {
        return TableKind::Upgrade;
    }
    if is_recipe {
        return TableKind::Recipe;
    }
    if headers.contains("caravan build") || headers.contains("required materials") {
        return TableKind::Project;
    }
    if headers.contains("item")
        || headers.contains("required resources")
        || headers.contains("material")
        || headers.contains("price")
    {
        return TableKind::TraderPricing;
    }
    TableKind::Other
}

/// Content sniff: do the first two data rows name a tier-II+ result item?
fn has_upgrade_rows(table: &WikiTable) -> bool {
    table.rows.iter().take(2).any(|row| {
        row.get(4)
            .map(|cell| UPGRADE_TIER_SUFFIX.is_match(cell.trim()))
            .unwrap_or(false)
    })
}

/// Collect an element's text, inserting newlines at `<br>` and at the end of
/// block children. The scraper `text()` iterator runs everything together,
/// which would glue multi-entry cells into one token.
pub fn cell_text(element: ElementRef) -> String {
    let mut out = String::new();
    collect_text(*element, &mut out);
    out
}

fn collect_text(node: ego_tree::NodeRef<Node>, out: &mut String) {
    for child in node.children() {
        match child.value() {
            Node::Text(text) => out.push_str(&text),
            Node::Element(element) => {
                let name = element.name();
                if name == "br" {
                    out.push('\n');
                    continue;
                }
                collect_text(child, out);
                if matches!(name, "p" | "div" | "li" | "tr") {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_tables(html: &str) -> Vec<WikiTable> {
        let document = Html::parse_document(html);
        content_region(&document)
            .map(tables_in)
            .unwrap_or_default()
    }

    const TRADER_HTML: &str = r#"
        <div class="mw-parser-output">
            <table>
                <tr><th>Item</th><th>Price</th></tr>
                <tr><td>Scrap</td><td>$120</td></tr>
            </table>
        </div>
    "#;

    #[test]
    fn test_extracts_headers_and_rows() {
        let tables = parse_tables(TRADER_HTML);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["item", "price"]);
        assert_eq!(tables[0].rows, vec![vec!["Scrap", "$120"]]);
    }

    #[test]
    fn test_skips_tables_without_data_rows() {
        let html = r#"
            <div class="mw-parser-output">
                <table><tr><th>Only header</th></tr></table>
            </div>
        "#;
        assert!(parse_tables(html).is_empty());
    }

    #[test]
    fn test_classify_trader_table() {
        let tables = parse_tables(TRADER_HTML);
        assert_eq!(classify(&tables[0]), TableKind::TraderPricing);
    }

    #[test]
    fn test_classify_upgrade_beats_recipe() {
        let html = r#"
            <div class="mw-parser-output">
                <table>
                    <tr><th>Recipe</th><th>Upgraded Stats</th></tr>
                    <tr><td>2x Scrap</td><td>+5 damage</td></tr>
                </table>
            </div>
        "#;
        let tables = parse_tables(html);
        assert_eq!(classify(&tables[0]), TableKind::Upgrade);
    }

    #[test]
    fn test_classify_upgrade_by_content_sniff() {
        let html = r#"
            <div class="mw-parser-output">
                <table>
                    <tr><th>Recipe</th><th>A</th><th>B</th><th>C</th><th>Result</th></tr>
                    <tr><td>2x Scrap</td><td></td><td></td><td></td><td>Rattler II</td></tr>
                </table>
            </div>
        "#;
        let tables = parse_tables(html);
        assert_eq!(classify(&tables[0]), TableKind::Upgrade);
    }

    #[test]
    fn test_cell_text_preserves_breaks() {
        let html = r#"
            <div class="mw-parser-output">
                <table>
                    <tr><th>Crafts</th></tr>
                    <tr><td>Rattler I<br>Stitcher I</td></tr>
                </table>
            </div>
        "#;
        let tables = parse_tables(html);
        assert_eq!(tables[0].rows[0][0], "Rattler I\nStitcher I");
    }

    #[test]
    fn test_find_column() {
        let tables = parse_tables(TRADER_HTML);
        assert_eq!(tables[0].find_column(&["item"]), Some(0));
        assert_eq!(tables[0].find_column(&["price", "cost"]), Some(1));
        assert_eq!(tables[0].find_column(&["frequency"]), None);
    }
}
