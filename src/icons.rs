use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::fs;
use std::path::Path;
use url::Url;

use crate::fetch::{wiki_page_name, ListingCache, WikiClient, FANDOM_URL};
use crate::model::Item;
use crate::output::{read_json, write_json};

static SELECTOR_TABLE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("table").expect("Invalid table selector"));
static SELECTOR_TR: Lazy<Selector> =
    Lazy::new(|| Selector::parse("tr").expect("Invalid tr selector"));
static SELECTOR_CELL: Lazy<Selector> =
    Lazy::new(|| Selector::parse("td, th").expect("Invalid cell selector"));
static SELECTOR_LINK: Lazy<Selector> =
    Lazy::new(|| Selector::parse("a").expect("Invalid link selector"));
static SELECTOR_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img").expect("Invalid img selector"));
static SELECTOR_INFOBOX_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse("aside.portable-infobox img").expect("Invalid infobox selector"));
static SELECTOR_KEYED_IMG: Lazy<Selector> =
    Lazy::new(|| Selector::parse("img[data-image-key]").expect("Invalid keyed-img selector"));

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s-]").expect("Invalid filename regex"));
static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[-\s]+").expect("Invalid separator regex"));

/// The wiki's image CDN; links elsewhere are navigation, not icons.
const IMAGE_HOST: &str = "static.wikia.nocookie.net";

/// What an item's image field currently holds. Total and mutually
/// exclusive; only `Placeholder` and `Remote` ever trigger a fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageRef {
    /// Already points at a downloaded icon.
    Local,
    /// Inline data-URI stand-in; the real icon must be searched for.
    Placeholder,
    /// Direct URL to download.
    Remote,
    Unknown,
}

impl ImageRef {
    pub fn classify(image: &str) -> Self {
        if image.starts_with("/icons/") || image.starts_with("icons/") {
            ImageRef::Local
        } else if image.starts_with("data:") {
            ImageRef::Placeholder
        } else if image.starts_with("http") {
            ImageRef::Remote
        } else {
            ImageRef::Unknown
        }
    }
}

/// Counters reported after an icon run.
#[derive(Debug, Default, Clone, Copy)]
pub struct IconStats {
    pub downloaded: u32,
    pub skipped: u32,
    pub failed: u32,
    pub updated: u32,
}

/// Resolve and download icons for every item in the catalog file, rewriting
/// image references to local paths. The catalog is saved back in place only
/// when something changed.
pub fn process_items(
    client: &WikiClient,
    items_path: &Path,
    icons_dir: &Path,
) -> Result<IconStats> {
    let mut items: Vec<Item> = read_json(items_path)?;
    println!("Found {} items", items.len());

    fs::create_dir_all(icons_dir)
        .with_context(|| format!("Failed to create icons directory: {:?}", icons_dir))?;

    let mut listing = ListingCache::new();
    let mut stats = IconStats::default();

    let pb = ProgressBar::new(items.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg:30} [{bar:40.cyan/blue}] {pos}/{len}")
            .unwrap()
            .progress_chars("=>-"),
    );

    for item in &mut items {
        pb.set_message(item.name.clone());
        resolve_item_icon(client, &mut listing, item, icons_dir, &mut stats, &pb)?;
        pb.inc(1);
    }
    pb.finish_with_message("Icons done");

    if stats.updated > 0 {
        write_json(items_path, &items)?;
        println!("Updated {} items with local icon paths", stats.updated);
    }

    Ok(stats)
}

fn resolve_item_icon(
    client: &WikiClient,
    listing: &mut ListingCache,
    item: &mut Item,
    icons_dir: &Path,
    stats: &mut IconStats,
    pb: &ProgressBar,
) -> Result<()> {
    let safe_name = sanitize_filename(&item.name);

    match ImageRef::classify(&item.image) {
        ImageRef::Local => {}
        ImageRef::Unknown => {
            stats.skipped += 1;
        }
        ImageRef::Placeholder => {
            let file_name = format!("{}.png", safe_name);
            let local_path = icons_dir.join(&file_name);
            let relative_path = format!("/icons/{}", file_name);

            if local_path.exists() {
                item.image = relative_path;
                stats.updated += 1;
                return Ok(());
            }

            match resolve_image_url(client, listing, &item.name, item.url.as_deref())? {
                Some(image_url) => {
                    if download_image(client, &image_url, &local_path)? {
                        item.image = relative_path;
                        stats.downloaded += 1;
                        stats.updated += 1;
                    } else {
                        stats.failed += 1;
                        pb.println(format!("  {}: download failed, keeping placeholder", item.name));
                    }
                }
                None => {
                    stats.skipped += 1;
                }
            }
        }
        ImageRef::Remote => {
            let file_name = format!("{}{}", safe_name, image_extension(&item.image));
            let local_path = icons_dir.join(&file_name);
            let relative_path = format!("/icons/{}", file_name);

            if local_path.exists() {
                if item.image != relative_path {
                    item.image = relative_path;
                    stats.updated += 1;
                }
                return Ok(());
            }

            if download_image(client, &item.image.clone(), &local_path)? {
                item.image = relative_path;
                stats.downloaded += 1;
                stats.updated += 1;
            } else {
                // Keep the original URL rather than point at nothing.
                stats.failed += 1;
            }
        }
    }

    Ok(())
}

/// Find the full-resolution icon URL for an item: the cached listing page
/// first, then the item's own wiki page.
pub fn resolve_image_url(
    client: &WikiClient,
    listing: &mut ListingCache,
    item_name: &str,
    wiki_url: Option<&str>,
) -> Result<Option<String>> {
    if let Some(page) = listing.get_or_fetch(client)? {
        if let Some(url) = find_image_in_listing(page, item_name) {
            return Ok(Some(url));
        }
    }

    let page_url = match wiki_url {
        Some(url) => url.to_string(),
        None => format!("{}/wiki/{}", FANDOM_URL, wiki_page_name(item_name)),
    };
    let Some(body) = client.fetch_page(&page_url)? else {
        return Ok(None);
    };

    Ok(find_image_on_item_page(&Html::parse_document(&body)))
}

/// Search the Items listing tables for a row naming the item, and take the
/// icon URL from the adjacent link (preferred) or lazy-loaded image.
fn find_image_in_listing(page: &Html, item_name: &str) -> Option<String> {
    let wiki_name = wiki_page_name(item_name);

    for table in page.select(&SELECTOR_TABLE) {
        for row in table.select(&SELECTOR_TR) {
            let cells: Vec<_> = row.select(&SELECTOR_CELL).collect();
            if cells.len() < 2 {
                continue;
            }

            let name_cell: String = cells[1].text().collect::<String>().trim().to_string();
            if name_cell != item_name && name_cell != wiki_name {
                continue;
            }

            // The anchor's target is the full-resolution asset; the <img>
            // src is a scaled-down thumb.
            if let Some(link) = cells[0].select(&SELECTOR_LINK).next() {
                if let Some(href) = link.value().attr("href") {
                    if href.contains(IMAGE_HOST) {
                        return Some(strip_scaling(href));
                    }
                }
            }

            if let Some(img) = row.select(&SELECTOR_IMG).next() {
                if let Some(key) = img.value().attr("data-image-key") {
                    if let Some(url) = find_keyed_image(page, key) {
                        return Some(url);
                    }
                }
            }
        }
    }

    None
}

/// Resolve a `data-image-key` to a CDN URL by scanning the whole page for
/// another copy of the same image that was actually loaded.
fn find_keyed_image(page: &Html, key: &str) -> Option<String> {
    let selector = Selector::parse(&format!("img[data-image-key=\"{}\"]", key)).ok()?;

    for img in page.select(&selector) {
        if let Some(src) = img.value().attr("src") {
            if src.contains(IMAGE_HOST) {
                return Some(strip_scaling(src));
            }
        }
    }
    None
}

/// Extract the primary image from an item's own page: the infobox image
/// first, then any image carrying the wiki's image-key attribute.
fn find_image_on_item_page(page: &Html) -> Option<String> {
    if let Some(img) = page.select(&SELECTOR_INFOBOX_IMG).next() {
        // data-src holds the real URL when the image is lazy-loaded.
        let src = img
            .value()
            .attr("data-src")
            .or_else(|| img.value().attr("src"));
        if let Some(src) = src {
            return Some(strip_scaling(src));
        }
    }

    for img in page.select(&SELECTOR_KEYED_IMG) {
        let src = img
            .value()
            .attr("src")
            .or_else(|| img.value().attr("data-src"));
        if let Some(src) = src {
            if src.contains(IMAGE_HOST) {
                return Some(strip_scaling(src));
            }
        }
    }

    None
}

/// Download an image, persisting it only when the response really is one.
fn download_image(client: &WikiClient, url: &str, dest: &Path) -> Result<bool> {
    let Some((bytes, content_type)) = client.fetch_bytes(url)? else {
        return Ok(false);
    };
    persist_if_image(&content_type, &bytes, dest)
}

/// Write the payload to `dest` only when the content type says it is an
/// image. A non-image response (typically an HTML error page served with
/// status 200) writes nothing and reports `false`.
pub fn persist_if_image(content_type: &str, bytes: &[u8], dest: &Path) -> Result<bool> {
    if !content_type.starts_with("image/") {
        return Ok(false);
    }

    fs::write(dest, bytes).with_context(|| format!("Failed to write icon: {:?}", dest))?;
    Ok(true)
}

/// Drop the CDN's scaling suffix and query string to get the
/// full-resolution asset URL.
fn strip_scaling(url: &str) -> String {
    let url = url.split('?').next().unwrap_or(url);
    let url = url.split("/scale-to-width").next().unwrap_or(url);
    url.to_string()
}

/// Convert an item name to a safe lowercase filename stem.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned = NON_WORD.replace_all(name, "");
    SEPARATORS.replace_all(&cleaned, "_").to_lowercase()
}

/// File extension for an image URL, judged from its path; `.png` when
/// nothing recognizable is found.
pub fn image_extension(image_url: &str) -> &'static str {
    let path = Url::parse(image_url)
        .map(|u| u.path().to_lowercase())
        .unwrap_or_default();

    for ext in [".png", ".jpg", ".jpeg", ".gif", ".webp"] {
        if path.contains(ext) {
            return match ext {
                ".jpg" | ".jpeg" => ".jpg",
                ".gif" => ".gif",
                ".webp" => ".webp",
                _ => ".png",
            };
        }
    }
    ".png"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_total_and_exclusive() {
        assert_eq!(ImageRef::classify("/icons/scrap.png"), ImageRef::Local);
        assert_eq!(ImageRef::classify("icons/scrap.png"), ImageRef::Local);
        assert_eq!(ImageRef::classify("data:image/png;base64,AAAA"), ImageRef::Placeholder);
        assert_eq!(ImageRef::classify("https://example.com/a.png"), ImageRef::Remote);
        assert_eq!(ImageRef::classify(""), ImageRef::Unknown);
        assert_eq!(ImageRef::classify("C:\\icons\\a.png"), ImageRef::Unknown);
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("Hunter's Mark II"), "hunters_mark_ii");
        assert_eq!(sanitize_filename("Gear Bench"), "gear_bench");
        assert_eq!(sanitize_filename("Anti-Armor Round"), "anti_armor_round");
    }

    #[test]
    fn test_image_extension() {
        assert_eq!(image_extension("https://x.test/a/scrap.PNG"), ".png");
        assert_eq!(image_extension("https://x.test/a/scrap.jpeg?cb=1"), ".jpg");
        assert_eq!(image_extension("https://x.test/a/scrap"), ".png");
        assert_eq!(image_extension("not a url"), ".png");
    }

    #[test]
    fn test_strip_scaling() {
        assert_eq!(
            strip_scaling("https://static.wikia.nocookie.net/a/b.png/revision/latest/scale-to-width-down/30?cb=1"),
            "https://static.wikia.nocookie.net/a/b.png/revision/latest"
        );
        assert_eq!(strip_scaling("https://h/a.png?cb=2"), "https://h/a.png");
    }

    const LISTING: &str = r#"
        <table>
            <tr>
                <td><a href="https://static.wikia.nocookie.net/arc/images/a.png/revision/latest/scale-to-width-down/30?cb=9"><img src="thumb.png"></a></td>
                <td>Rusted Gear</td>
            </tr>
        </table>
    "#;

    #[test]
    fn test_find_image_in_listing_prefers_link_target() {
        let page = Html::parse_document(LISTING);
        let url = find_image_in_listing(&page, "Rusted Gear").unwrap();
        assert_eq!(
            url,
            "https://static.wikia.nocookie.net/arc/images/a.png/revision/latest"
        );
    }

    #[test]
    fn test_find_image_in_listing_misses_other_items() {
        let page = Html::parse_document(LISTING);
        assert!(find_image_in_listing(&page, "Scrap").is_none());
    }

    #[test]
    fn test_find_image_on_item_page_infobox_lazy_src() {
        let html = r#"
            <aside class="portable-infobox">
                <img src="placeholder.gif" data-src="https://static.wikia.nocookie.net/arc/b.png/scale-to-width-down/100">
            </aside>
        "#;
        let page = Html::parse_document(html);
        assert_eq!(
            find_image_on_item_page(&page).unwrap(),
            "https://static.wikia.nocookie.net/arc/b.png"
        );
    }

    #[test]
    fn test_html_payload_writes_no_file() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("rattler.png");

        let persisted =
            persist_if_image("text/html; charset=utf-8", b"<html>404</html>", &dest).unwrap();
        assert!(!persisted);
        assert!(!dest.exists());
    }

    #[test]
    fn test_image_payload_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("rattler.png");

        let persisted = persist_if_image("image/png", b"\x89PNG", &dest).unwrap();
        assert!(persisted);
        assert_eq!(std::fs::read(&dest).unwrap(), b"\x89PNG");
    }

    #[test]
    fn test_find_image_via_image_key() {
        let html = r#"
            <table><tr>
                <td><img data-image-key="Gear.png" src="data:image/gif;base64,x"></td>
                <td>Rusted Gear</td>
            </tr></table>
            <img data-image-key="Gear.png" src="https://static.wikia.nocookie.net/arc/Gear.png/scale-to-width-down/50?cb=3">
        "#;
        let page = Html::parse_document(html);
        let url = find_image_in_listing(&page, "Rusted Gear").unwrap();
        assert_eq!(url, "https://static.wikia.nocookie.net/arc/Gear.png");
    }
}
