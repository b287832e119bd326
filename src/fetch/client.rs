use anyhow::{Context, Result};
use reqwest::blocking::Client;
use std::thread;
use std::time::Duration;

/// Wiki mirrors tried in order when looking for an item page.
pub const BASE_URLS: &[&str] = &["https://arcraiders.wiki", "https://arc-raiders.fandom.com"];

/// The mirror that hosts the trader/workshop/projects/items pages.
pub const FANDOM_URL: &str = "https://arc-raiders.fandom.com";

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Blocking HTTP client for the wiki, with a fixed politeness delay after
/// every request.
pub struct WikiClient {
    client: Client,
    delay: Duration,
}

impl WikiClient {
    pub fn new(delay: Duration) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client, delay })
    }

    /// Fetch a page, returning `Ok(None)` for transport failures and non-200
    /// responses. A missing page is not an error; callers fall through to the
    /// next URL variant.
    pub fn fetch_page(&self, url: &str) -> Result<Option<String>> {
        let result = self.client.get(url).send();
        let body = match result {
            Ok(response) if response.status().is_success() => response.text().ok(),
            _ => None,
        };
        thread::sleep(self.delay);
        Ok(body)
    }

    /// Fetch a `/wiki/<page>` path on the given mirror.
    pub fn fetch_wiki_page(&self, base_url: &str, page: &str) -> Result<Option<String>> {
        self.fetch_page(&format!("{}/wiki/{}", base_url, page))
    }

    /// Fetch raw bytes plus the response content type, `Ok(None)` on failure.
    pub fn fetch_bytes(&self, url: &str) -> Result<Option<(Vec<u8>, String)>> {
        let result = self.client.get(url).send();
        let payload = match result {
            Ok(response) if response.status().is_success() => {
                let content_type = response
                    .headers()
                    .get(reqwest::header::CONTENT_TYPE)
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                response.bytes().ok().map(|b| (b.to_vec(), content_type))
            }
            _ => None,
        };
        thread::sleep(self.delay);
        Ok(payload)
    }
}

/// Convert an item name to its wiki page name (spaces become underscores).
pub fn wiki_page_name(name: &str) -> String {
    name.replace(' ', "_")
}

/// The page-name variations tried for a single item, most likely first.
///
/// A tier-I item usually lives on the suffix-less page ("Rattler", not
/// "Rattler_I"), so that variant goes first. The typographic-apostrophe
/// variant covers wiki pages authored with U+2019.
pub fn page_variants(item_name: &str) -> Vec<String> {
    let mut variants = Vec::new();

    if let Some(base) = item_name.strip_suffix(" I") {
        variants.push(wiki_page_name(base.trim_end()));
    }
    variants.push(wiki_page_name(item_name));
    variants.push(wiki_page_name(item_name).replace('\'', "\u{2019}"));

    dedup_preserving_order(variants)
}

/// Page-name variations for a base name plus all of its tier variants,
/// used by the upgrade flow which walks one page per item family.
pub fn family_page_variants(base_name: &str, related_items: &[String]) -> Vec<String> {
    let mut variants = Vec::new();

    if let Some(base) = base_name.strip_suffix(" I") {
        variants.push(wiki_page_name(base.trim_end()));
    }
    variants.push(wiki_page_name(base_name));
    variants.push(wiki_page_name(base_name).replace('\'', "\u{2019}"));

    for item in related_items {
        variants.push(wiki_page_name(item).replace('\'', "\u{2019}"));
    }

    dedup_preserving_order(variants)
}

fn dedup_preserving_order(variants: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    variants
        .into_iter()
        .filter(|v| seen.insert(v.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_page_name() {
        assert_eq!(wiki_page_name("Gear Bench"), "Gear_Bench");
        assert_eq!(wiki_page_name("Rattler"), "Rattler");
    }

    #[test]
    fn test_page_variants_tier_one_first() {
        let variants = page_variants("Rattler I");
        assert_eq!(variants[0], "Rattler");
        assert!(variants.contains(&"Rattler_I".to_string()));
    }

    #[test]
    fn test_page_variants_deduplicated() {
        let variants = page_variants("Scrap");
        assert_eq!(variants, vec!["Scrap".to_string()]);
    }

    #[test]
    fn test_family_variants_include_related() {
        let related = vec!["Rattler I".to_string(), "Rattler II".to_string()];
        let variants = family_page_variants("Rattler", &related);
        assert_eq!(variants[0], "Rattler");
        assert!(variants.contains(&"Rattler_II".to_string()));
    }
}
