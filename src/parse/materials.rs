use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::QuantifiedMaterial;

/// A quantity token with optional multiplier, e.g. "2x ", "3 × ", "4".
static QTY_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*[x×]?\s*").expect("Invalid quantity regex"));

/// A quantity token with a mandatory multiplier, used for comma/newline
/// delimited resource lists where a bare number is data, not a quantity.
static QTY_TOKEN_STRICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)\s*[x×]\s*").expect("Invalid quantity regex"));

/// A quantity glued to the preceding name ("Scrap2x Wire").
static GLUED_QTY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([A-Za-z])(\d+\s*[x×])").expect("Invalid glue regex"));

/// Whole-cell fallback: one quantity, rest of the text is the name.
static LOOSE_PAIR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+)\s*[x×]?\s*(.+)$").expect("Invalid fallback regex"));

/// Leading base-item reference in an upgrade recipe cell:
/// "Rattler I 2x Scrap" starts with the tier-I item being upgraded.
static LEADING_BASE_ITEM: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z\s']+?)\s+(I{1,3}|IV|V)(\s.*|)$").expect("Invalid base-item regex")
});

/// Cell-layout artifacts that regex extraction sometimes picks up as
/// material names. Matched as whole words, case-insensitively.
const NOISE_KEYWORDS: &[&str] = &[
    "gunsmith",
    "workshop",
    "level",
    "blueprint",
    "required",
    "no",
    "yes",
    "upgrade",
    "stats",
    "perks",
];

/// Parse a delimited resource list ("2x Scrap, 3x Wire" or one entry per
/// line), as found in workshop level and project tables. Entries without an
/// explicit multiplier are not recognized here.
pub fn parse_requirements(cell: &str) -> Vec<QuantifiedMaterial> {
    tokenized_pairs(cell, &QTY_TOKEN_STRICT, true)
}

/// Parse a free-form recipe cell into (quantity, material) pairs.
///
/// The cell is normalized (line breaks and "+" become separators, glued
/// quantity tokens are split off), then scanned for quantity-plus-name runs;
/// a cell with no recognizable run falls back to a single loose pair. Noise
/// keywords are dropped from the result. Best-effort by design: irregular
/// cells may silently misparse and callers must not treat the output as
/// authoritative.
pub fn parse_recipe_materials(cell: &str) -> Vec<QuantifiedMaterial> {
    let normalized = normalize_recipe_text(cell);

    let mut pairs = tokenized_pairs(&normalized, &QTY_TOKEN, false);
    if pairs.is_empty() {
        pairs = loose_pair(&normalized).into_iter().collect();
    }

    pairs
        .into_iter()
        .filter(|entry| !is_noise(&entry.material))
        .collect()
}

/// Split a leading base-item reference off an upgrade recipe cell.
///
/// Returns the tier-suffixed item name and the remaining cell text. The cell
/// must already be normalized to a single line.
pub fn split_leading_base_item(text: &str) -> Option<(String, String)> {
    let caps = LEADING_BASE_ITEM.captures(text.trim())?;
    let base_item = format!("{} {}", caps[1].trim(), &caps[2]);
    let rest = caps[3].trim().to_string();
    Some((base_item, rest))
}

/// Normalize a recipe cell to one scannable line.
pub fn normalize_recipe_text(cell: &str) -> String {
    let flattened = cell.replace('\n', " ").replace('+', " ");
    GLUED_QTY.replace_all(&flattened, "$1 $2").trim().to_string()
}

/// Whether an extracted name is a table-layout artifact, not a material.
pub fn is_noise(name: &str) -> bool {
    let lowered = name.to_lowercase();
    lowered
        .split_whitespace()
        .any(|word| NOISE_KEYWORDS.contains(&word))
}

/// Scan for quantity tokens and take each token's trailing text, up to the
/// next token, as the material name. `stop_at_delimiters` additionally cuts
/// names at the first comma or line break.
fn tokenized_pairs(
    text: &str,
    token: &Regex,
    stop_at_delimiters: bool,
) -> Vec<QuantifiedMaterial> {
    let matches: Vec<_> = token.captures_iter(text).collect();
    let mut pairs = Vec::new();

    for (i, caps) in matches.iter().enumerate() {
        let quantity: u32 = match caps[1].parse() {
            Ok(q) => q,
            Err(_) => continue,
        };

        let start = caps.get(0).map(|m| m.end()).unwrap_or(0);
        let end = matches
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map(|m| m.start())
            .unwrap_or(text.len());
        if start > end {
            continue;
        }

        let mut name = &text[start..end];
        if stop_at_delimiters {
            if let Some(cut) = name.find([',', '\n']) {
                name = &name[..cut];
            }
        }
        let name = name
            .trim()
            .trim_end_matches([',', '.', ';', ':'])
            .trim();

        if name.is_empty() || !name.starts_with(|c: char| c.is_ascii_alphabetic()) {
            continue;
        }

        pairs.push(QuantifiedMaterial::new(name, quantity));
    }

    pairs
}

fn loose_pair(text: &str) -> Option<QuantifiedMaterial> {
    let caps = LOOSE_PAIR.captures(text.trim())?;
    let quantity: u32 = caps[1].parse().ok()?;
    let name = caps[2].trim();
    if name.is_empty() {
        return None;
    }
    Some(QuantifiedMaterial::new(name, quantity))
}
