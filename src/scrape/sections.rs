use once_cell::sync::Lazy;
use scraper::{ElementRef, Selector};

use super::tables::WikiTable;

static SELECTOR_HEADING: Lazy<Selector> =
    Lazy::new(|| Selector::parse("h2, h3").expect("Invalid heading selector"));
static SELECTOR_NESTED_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Invalid table selector"));

/// Tables belonging to the section whose heading mentions `title`.
///
/// The wiki puts each station's level table under an `h2`/`h3` heading; the
/// section ends at the next heading of either rank.
pub fn section_tables(region: ElementRef, title: &str) -> Vec<WikiTable> {
    let needle = title.to_lowercase();

    for heading in region.select(&SELECTOR_HEADING) {
        let text: String = heading.text().collect::<String>().to_lowercase();
        if !text.contains(&needle) {
            continue;
        }

        let mut tables = Vec::new();
        for sibling in heading.next_siblings() {
            let Some(element) = ElementRef::wrap(sibling) else {
                continue;
            };
            match element.value().name() {
                "h2" | "h3" => break,
                "table" => {
                    if let Some(table) = WikiTable::from_element(element) {
                        tables.push(table);
                    }
                }
                _ => {
                    // Station tables are sometimes wrapped in a scrollable div.
                    tables.extend(
                        element
                            .select(&SELECTOR_NESTED_TABLE)
                            .filter_map(WikiTable::from_element),
                    );
                }
            }
        }
        return tables;
    }

    Vec::new()
}
