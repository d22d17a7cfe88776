//! Identifier normalization.
//!
//! Variable and sub-item names are free text ("Wall Height", "Waste %",
//! "4x8 Drywall Sheets"). Formulas may refer to them either by their raw
//! name inside brackets or by a normalized identifier, e.g. `[Wall_Height]`
//! or bare `Wall_Height`.
//!
//! Normalization is lossy: "Wall Height" and "Wall-Height" both map to
//! `Wall_Height`. Lookups try the raw name first, so the collision only
//! matters when neither side matches exactly.

use regex::Regex;
use std::sync::OnceLock;

fn disallowed_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^A-Za-z0-9_]").expect("identifier charset regex must compile"))
}

fn underscore_run_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"_+").expect("underscore run regex must compile"))
}

/// Map a human-entered name to an evaluator identifier.
///
/// The result matches `[A-Za-z_][A-Za-z0-9_]*` or is empty. Callers treat an
/// empty result as an unnamed entry.
///
/// ```
/// use takeoff_engine::engine::normalize;
/// assert_eq!(normalize("Wall Height"), "Wall_Height");
/// assert_eq!(normalize("Waste %"), "Waste_Percent");
/// assert_eq!(normalize("$ Cost"), "Cost");
/// assert_eq!(normalize("4x8 Drywall Sheets"), "_4x8_Drywall_Sheets");
/// ```
pub fn normalize(name: &str) -> String {
    let slug = name.trim().replace('%', "_Percent").replace('$', "");
    let slug = disallowed_re().replace_all(&slug, "_");
    let slug = underscore_run_re().replace_all(&slug, "_");
    let slug = slug.trim_matches('_');

    if slug.starts_with(|c: char| c.is_ascii_digit()) {
        format!("_{}", slug)
    } else {
        slug.to_string()
    }
}

/// Whether `s` can be written as a bare identifier in a formula.
pub fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_spaces() {
        assert_eq!(normalize("Wall Height"), "Wall_Height");
        assert_eq!(normalize("  Wall   Height  "), "Wall_Height");
    }

    #[test]
    fn test_normalize_percent_and_currency() {
        assert_eq!(normalize("Waste %"), "Waste_Percent");
        assert_eq!(normalize("%"), "Percent");
        assert_eq!(normalize("$ Cost"), "Cost");
        assert_eq!(normalize("Cost ($/sf)"), "Cost_sf");
    }

    #[test]
    fn test_normalize_leading_digit() {
        assert_eq!(normalize("4x8 Drywall Sheets"), "_4x8_Drywall_Sheets");
        assert_eq!(normalize("5/8 Sheetrock"), "_5_8_Sheetrock");
        assert_eq!(normalize("10ft Studs"), "_10ft_Studs");
    }

    #[test]
    fn test_normalize_empty_results() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("   "), "");
        assert_eq!(normalize("$$$"), "");
        assert_eq!(normalize("---"), "");
    }

    #[test]
    fn test_normalize_non_ascii() {
        assert_eq!(normalize("Höhe"), "H_he");
        assert_eq!(normalize("area m²"), "area_m");
    }

    #[test]
    fn test_normalize_collision_is_accepted() {
        assert_eq!(normalize("Wall Height"), normalize("Wall-Height"));
    }

    #[test]
    fn test_is_identifier() {
        assert!(is_identifier("qty"));
        assert!(is_identifier("_4x8"));
        assert!(is_identifier("$price"));
        assert!(!is_identifier(""));
        assert!(!is_identifier("4x8"));
        assert!(!is_identifier("Wall Height"));
    }

    proptest! {
        #[test]
        fn prop_normalize_is_identifier_or_empty(name in "\\PC{0,24}") {
            let slug = normalize(&name);
            prop_assert!(slug.is_empty() || is_identifier(&slug));
            prop_assert!(!slug.contains('$'));
            prop_assert!(!slug.contains("__"));
        }

        #[test]
        fn prop_normalize_is_idempotent(name in "\\PC{0,24}") {
            let once = normalize(&name);
            prop_assert_eq!(normalize(&once), once);
        }
    }
}
