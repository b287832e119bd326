use once_cell::sync::Lazy;
use regex::Regex;

use super::tier::{is_upgrade_tier, strip_tier, tier_of};

/// Leading "2x " style quantity on a result-item cell.
static QUANTITY_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\s*[x×]?\s*").expect("Invalid prefix regex"));

/// Minimum raw-name length for the substring fallback; shorter names match
/// too many unrelated catalog entries.
const MIN_SUBSTRING_LEN: usize = 3;

/// Which reconciliation rules apply for a given extraction path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Base crafting: exact, then base-name, then gated substring match.
    Crafting,
    /// Tier upgrades: exact, then base-name restricted to candidates whose
    /// own tier token equals the raw name's. No substring fallback, so one
    /// table row can never leak across tiers.
    Upgrade,
}

/// Strip a leading quantity/multiplier from a result-item cell.
pub fn strip_quantity_prefix(raw: &str) -> String {
    QUANTITY_PREFIX.replace(raw.trim(), "").trim().to_string()
}

/// Resolve a raw result-item name against the canonical catalog names.
///
/// Rules are attempted strictly in order, stopping at the first that yields
/// anything: exact equality cannot be shadowed by the weaker heuristics.
/// Substring matching may return several canonical names; callers write the
/// row to each.
pub fn reconcile(raw: &str, names: &[&str], mode: MatchMode) -> Vec<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Vec::new();
    }

    let matched = exact_match(raw, names);
    if !matched.is_empty() {
        return matched;
    }

    let matched = base_name_match(raw, names, mode);
    if !matched.is_empty() {
        return matched;
    }

    match mode {
        MatchMode::Crafting => substring_match(raw, names),
        MatchMode::Upgrade => Vec::new(),
    }
}

fn exact_match(raw: &str, names: &[&str]) -> Vec<String> {
    names
        .iter()
        .find(|name| name.eq_ignore_ascii_case(raw))
        .map(|name| vec![name.to_string()])
        .unwrap_or_default()
}

fn base_name_match(raw: &str, names: &[&str], mode: MatchMode) -> Vec<String> {
    let raw_base = strip_tier(raw).to_lowercase();
    if raw_base.is_empty() {
        return Vec::new();
    }
    let raw_tier = tier_of(raw);

    names
        .iter()
        .filter(|name| strip_tier(name).to_lowercase() == raw_base)
        .filter(|name| match mode {
            MatchMode::Crafting => true,
            // A tier-suffixed raw name only matches the same tier; a
            // suffix-less raw name matches any upgrade tier of the family.
            MatchMode::Upgrade => {
                is_upgrade_tier(name)
                    && match raw_tier {
                        Some(tier) => tier_of(name) == Some(tier),
                        None => true,
                    }
            }
        })
        .map(|name| name.to_string())
        .collect()
}

fn substring_match(raw: &str, names: &[&str]) -> Vec<String> {
    let raw_clean = raw.to_lowercase();
    if raw_clean.len() <= MIN_SUBSTRING_LEN {
        return Vec::new();
    }

    names
        .iter()
        .filter(|name| {
            let name_clean = name.to_lowercase();
            name_clean.contains(&raw_clean) || raw_clean.contains(&name_clean)
        })
        .map(|name| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CATALOG: &[&str] = &["Rattler I", "Rattler II", "Stitcher I", "Heavy Vest"];

    #[test]
    fn test_exact_match_wins() {
        assert_eq!(
            reconcile("Rattler II", CATALOG, MatchMode::Crafting),
            vec!["Rattler II"]
        );
        assert_eq!(
            reconcile("rattler ii", CATALOG, MatchMode::Upgrade),
            vec!["Rattler II"]
        );
    }

    #[test]
    fn test_base_name_match_crafting() {
        // No exact "Rattler" in the catalog: base match picks up all tiers.
        assert_eq!(
            reconcile("Rattler", CATALOG, MatchMode::Crafting),
            vec!["Rattler I", "Rattler II"]
        );
    }

    #[test]
    fn test_base_name_match_upgrade_requires_tier_equality() {
        assert_eq!(
            reconcile("Rattler III", CATALOG, MatchMode::Upgrade),
            Vec::<String>::new()
        );
        // Suffix-less raw name matches upgrade tiers only.
        assert_eq!(
            reconcile("Rattler", CATALOG, MatchMode::Upgrade),
            vec!["Rattler II"]
        );
    }

    #[test]
    fn test_substring_gated_by_length() {
        assert_eq!(
            reconcile("Vest", CATALOG, MatchMode::Crafting),
            vec!["Heavy Vest"]
        );
        assert!(reconcile("Ves", CATALOG, MatchMode::Crafting).is_empty());
    }

    #[test]
    fn test_no_substring_fallback_in_upgrade_mode() {
        assert!(reconcile("Vest", CATALOG, MatchMode::Upgrade).is_empty());
    }

    #[test]
    fn test_strip_quantity_prefix() {
        assert_eq!(strip_quantity_prefix("2x Rattler I"), "Rattler I");
        assert_eq!(strip_quantity_prefix("3 × Wire"), "Wire");
        assert_eq!(strip_quantity_prefix("Rattler I"), "Rattler I");
    }
}
