//! Construction dimension input, e.g. `10' 6"` or `10-6`.
//!
//! Values are returned in decimal feet. Accepted forms:
//!
//! - decimals and integers: `10.5`
//! - fractions and mixed numbers: `1/4`, `10 1/2`
//! - feet and inches: `10' 6"`, `10ft 6in`, `10' - 1/4"`, `6"`
//! - dash shorthand, feet then inches: `10-6`

use regex::Regex;
use std::sync::OnceLock;

const NUMBER: &str = r"(\d+\s+\d+/\d+|\d+/\d+|\d+(?:\.\d+)?)";

fn float_prefix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?")
            .expect("float prefix regex must compile")
    })
}

fn feet_inch_marker_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"['"]|ft|in"#).expect("feet/inch marker regex must compile"))
}

fn feet_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r"{}\s*(?:'|ft)", NUMBER)).expect("feet regex must compile")
    })
}

fn inches_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(&format!(r#"{}\s*(?:"|in)?"#, NUMBER)).expect("inches regex must compile")
    })
}

/// Leading decimal number of `s`, or NaN when there is none.
fn parse_float_prefix(s: &str) -> f64 {
    float_prefix_re()
        .find(s)
        .and_then(|m| m.as_str().trim().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

fn parse_fraction(s: &str) -> f64 {
    if let Some((num, den)) = s.split_once('/') {
        if !den.contains('/') {
            let num = parse_float_prefix(num);
            let den = parse_float_prefix(den);
            if !num.is_nan() && !den.is_nan() && den != 0.0 {
                return num / den;
            }
        }
    }
    parse_float_prefix(s)
}

fn parse_numeric(s: &str) -> f64 {
    let s = s.trim();
    let parts: Vec<&str> = s.split_whitespace().collect();
    if parts.len() == 2 {
        return parse_float_prefix(parts[0]) + parse_fraction(parts[1]);
    }
    parse_fraction(s)
}

/// Parse a dimension typed by a user into decimal feet.
pub fn parse_dimension(input: &str) -> Option<f64> {
    let s = input.trim().to_lowercase();
    if s.is_empty() {
        return None;
    }

    if feet_inch_marker_re().is_match(&s) {
        let mut feet = 0.0;
        let mut remainder = s.as_str();
        if let Some(caps) = feet_re().captures(&s) {
            feet = parse_numeric(&caps[1]);
            let whole = caps.get(0).map_or(0, |m| m.end());
            remainder = &s[whole..];
        }

        let remainder = remainder.trim_start_matches(|c: char| c.is_whitespace() || c == '-');
        let inches = inches_re()
            .captures(remainder)
            .map(|caps| parse_numeric(&caps[1]))
            .unwrap_or(0.0);

        let total = feet + inches / 12.0;
        return total.is_finite().then_some(total);
    }

    if s.contains('-') && !s.contains('/') {
        if let Some((f, i)) = s.split_once('-') {
            if !i.contains('-') {
                let f = parse_float_prefix(f.trim());
                let i = parse_float_prefix(i.trim());
                if !f.is_nan() && !i.is_nan() {
                    return Some(f + i / 12.0);
                }
            }
        }
    }

    let value = parse_numeric(&s);
    (!value.is_nan()).then_some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Option<f64>, b: f64) -> bool {
        a.is_some_and(|a| (a - b).abs() < 1e-9)
    }

    #[test]
    fn test_plain_numbers() {
        assert!(close(parse_dimension("10.5"), 10.5));
        assert!(close(parse_dimension(" 12 "), 12.0));
        assert!(close(parse_dimension("1/4"), 0.25));
        assert!(close(parse_dimension("10 1/2"), 10.5));
    }

    #[test]
    fn test_feet_and_inches() {
        assert!(close(parse_dimension("10' 6\""), 10.5));
        assert!(close(parse_dimension("10ft 6in"), 10.5));
        assert!(close(parse_dimension("10' - 1/4\""), 10.0 + 0.25 / 12.0));
        assert!(close(parse_dimension("10' 1/4\""), 10.0 + 0.25 / 12.0));
        assert!(close(parse_dimension("6\""), 0.5));
        assert!(close(parse_dimension("3'"), 3.0));
        assert!(close(parse_dimension("5' 10 1/2\""), 5.0 + 10.5 / 12.0));
    }

    #[test]
    fn test_dash_shorthand() {
        assert!(close(parse_dimension("10-6"), 10.5));
    }

    #[test]
    fn test_invalid() {
        assert_eq!(parse_dimension(""), None);
        assert_eq!(parse_dimension("   "), None);
        assert_eq!(parse_dimension("abc"), None);
    }
}
