//! Bracketed reference scanning and rewriting on formula text.
//!
//! These work on the raw string so they also apply to formulas that do not
//! parse yet (an author mid-edit). Text outside `[...]` is never touched.

use regex::{Captures, Regex};
use std::sync::OnceLock;

use super::ident::normalize;

fn reference_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[([^\[\]]+)\]").expect("reference regex must compile"))
}

/// Names referenced as `[Name]`, unique, in order of first appearance.
pub fn extract_references(formula: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in reference_re().captures_iter(formula) {
        let name = &caps[1];
        if !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    }
    names
}

/// Point references at a renamed variable or sub-item.
///
/// Rewrites `[old]` and any bracketed spelling that normalizes to the same
/// identifier as `old` (e.g. `[Old_Name]` for "Old Name") to `[new]`.
/// Bare identifiers are left alone; rename those by hand.
pub fn rename_reference(formula: &str, old: &str, new: &str) -> String {
    let old_ident = normalize(old);
    reference_re()
        .replace_all(formula, |caps: &Captures| {
            let name = &caps[1];
            let matches = name == old || (!old_ident.is_empty() && normalize(name) == old_ident);
            if matches {
                format!("[{}]", new)
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_references() {
        assert_eq!(
            extract_references("roundup([Labor per SF] / 32) * [waste] + [Labor per SF]"),
            vec!["Labor per SF".to_string(), "waste".to_string()]
        );
        assert!(extract_references("qty * 2").is_empty());
        assert!(extract_references("[]").is_empty());
    }

    #[test]
    fn test_rename_exact_and_normalized() {
        let formula = "[Drywall Sheets] * 36 + [Drywall_Sheets] / 40";
        assert_eq!(
            rename_reference(formula, "Drywall Sheets", "4x8 Sheets"),
            "[4x8 Sheets] * 36 + [4x8 Sheets] / 40"
        );
    }

    #[test]
    fn test_rename_leaves_similar_names() {
        assert_eq!(
            rename_reference("[width] + [width2] + width", "width", "span"),
            "[span] + [width2] + width"
        );
    }
}
