use anyhow::Result;
use scraper::Html;

use super::client::{WikiClient, FANDOM_URL};

const ITEMS_PAGE: &str = "Items";

/// Lazily fetched copy of the Items listing page.
///
/// The page is fetched at most once per run; a failed fetch is remembered as
/// `Unavailable` and never retried. Owned by the extraction run and passed
/// explicitly, not process-wide state.
pub enum ListingCache {
    NotFetched,
    Unavailable,
    Loaded(Html),
}

impl ListingCache {
    pub fn new() -> Self {
        ListingCache::NotFetched
    }

    /// Return the parsed listing page, fetching it on first use.
    pub fn get_or_fetch(&mut self, client: &WikiClient) -> Result<Option<&Html>> {
        if let ListingCache::NotFetched = self {
            *self = match client.fetch_wiki_page(FANDOM_URL, ITEMS_PAGE)? {
                Some(body) => {
                    println!("  Loaded Items listing page");
                    ListingCache::Loaded(Html::parse_document(&body))
                }
                None => {
                    println!("  Items listing page unavailable");
                    ListingCache::Unavailable
                }
            };
        }

        match self {
            ListingCache::Loaded(html) => Ok(Some(html)),
            _ => Ok(None),
        }
    }
}

impl Default for ListingCache {
    fn default() -> Self {
        Self::new()
    }
}
