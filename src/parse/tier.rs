use once_cell::sync::Lazy;
use regex::Regex;

/// Trailing roman-numeral tier token, I through V.
static TIER_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+(I{1,3}|IV|V)$").expect("Invalid tier regex"));

/// The tier token of a name, if it carries one ("Rattler II" -> "II").
pub fn tier_of(name: &str) -> Option<&str> {
    TIER_SUFFIX
        .captures(name.trim_end())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// The name with any tier suffix removed ("Compensator I" -> "Compensator").
pub fn strip_tier(name: &str) -> &str {
    let trimmed = name.trim();
    match TIER_SUFFIX.find(trimmed) {
        Some(m) => trimmed[..m.start()].trim_end(),
        None => trimmed,
    }
}

/// Whether the name carries a tier-II+ suffix, i.e. denotes an upgrade item.
pub fn is_upgrade_tier(name: &str) -> bool {
    matches!(tier_of(name), Some("II" | "III" | "IV"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_of() {
        assert_eq!(tier_of("Rattler II"), Some("II"));
        assert_eq!(tier_of("Rattler I"), Some("I"));
        assert_eq!(tier_of("Anvil IV"), Some("IV"));
        assert_eq!(tier_of("Scrap"), None);
    }

    #[test]
    fn test_strip_tier_consistent() {
        assert_eq!(strip_tier("Compensator I"), "Compensator");
        assert_eq!(strip_tier("Compensator"), "Compensator");
        assert_eq!(strip_tier("Rattler III"), "Rattler");
    }

    #[test]
    fn test_is_upgrade_tier() {
        assert!(is_upgrade_tier("Rattler II"));
        assert!(is_upgrade_tier("Rattler IV"));
        assert!(!is_upgrade_tier("Rattler I"));
        assert!(!is_upgrade_tier("Rattler V"));
        assert!(!is_upgrade_tier("Scrap"));
    }
}
