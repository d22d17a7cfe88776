//! Display formatting for quantities and money. Nothing here feeds back
//! into evaluation.

/// Shown in place of a value that could not be computed.
pub const NOT_AVAILABLE: &str = "#N/A";

fn group_thousands(int_part: &str) -> String {
    let digits: Vec<char> = int_part.chars().collect();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.iter().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(*ch);
    }
    out
}

/// Fixed decimals with thousands separators; trailing zeros dropped when
/// `trim` is set.
fn grouped(n: f64, decimals: usize, trim: bool) -> String {
    if n.is_nan() {
        return NOT_AVAILABLE.to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "∞" } else { "-∞" }.to_string();
    }
    let fixed = format!("{:.*}", decimals, n.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, f),
        None => (fixed.as_str(), ""),
    };
    let frac_part = if trim { frac_part.trim_end_matches('0') } else { frac_part };

    let mut out = String::new();
    // -0.001 rounds to "0"; don't print "-0".
    let is_zero = int_part.chars().all(|c| c == '0') && frac_part.chars().all(|c| c == '0');
    if n < 0.0 && !is_zero {
        out.push('-');
    }
    out.push_str(&group_thousands(int_part));
    if !frac_part.is_empty() {
        out.push('.');
        out.push_str(frac_part);
    }
    out
}

/// Formatting used next to a markup on the drawing: 4 decimals for very
/// small values, 2 otherwise.
pub fn format_unit_value(value: f64, unit: &str) -> String {
    if value == 0.0 {
        return format!("0 {}", unit);
    }
    if value.abs() < 0.01 {
        return format!("{:.4} {}", value, unit);
    }
    format!("{:.2} {}", value, unit)
}

/// Estimate-table quantity: at most 2 fraction digits, grouped thousands.
pub fn format_quantity(value: f64, unit: &str) -> String {
    let number = grouped(value, 2, true);
    if unit.is_empty() {
        number
    } else {
        format!("{} {}", number, unit)
    }
}

/// `Some` value formatted as a bare number, `None` as [`NOT_AVAILABLE`].
pub fn format_result(value: Option<f64>) -> String {
    // -0 prints as 0.
    match value.map(|v| v + 0.0) {
        Some(v) if v.fract() == 0.0 && v.abs() < 1e15 => format!("{:.0}", v),
        Some(v) => {
            let s = format!("{:.10}", v);
            match s.trim_end_matches('0').trim_end_matches('.') {
                "-0" => "0".to_string(),
                trimmed => trimmed.to_string(),
            }
        }
        None => NOT_AVAILABLE.to_string(),
    }
}

/// Money with two decimals, e.g. `$1,234.50`.
pub fn format_currency(value: f64) -> String {
    let body = grouped(value, 2, false);
    match body.strip_prefix('-') {
        Some(rest) => format!("-${}", rest),
        None => format!("${}", body),
    }
}

/// Decimal feet as feet, inches and sixteenths: `78' 4 7/8"`.
///
/// Under one foot only inches are shown (`5 1/2"`).
pub fn format_architectural(feet: f64) -> String {
    if feet == 0.0 || !feet.is_finite() {
        return "0\"".to_string();
    }

    let sign = if feet < 0.0 { "-" } else { "" };
    let abs = feet.abs();

    let mut whole_feet = abs.floor() as u64;
    let inches = (abs - abs.floor()) * 12.0;
    let mut whole_inches = inches.floor() as u64;
    let mut sixteenths = ((inches - inches.floor()) * 16.0).round() as u64;

    if sixteenths == 16 {
        sixteenths = 0;
        whole_inches += 1;
    }
    if whole_inches == 12 {
        whole_inches = 0;
        whole_feet += 1;
    }

    let fraction = if sixteenths > 0 {
        let (mut num, mut den) = (sixteenths, 16u64);
        while num % 2 == 0 && den % 2 == 0 {
            num /= 2;
            den /= 2;
        }
        format!(" {}/{}", num, den)
    } else {
        String::new()
    };

    if whole_feet == 0 {
        if whole_inches == 0 && fraction.is_empty() {
            return "0\"".to_string();
        }
        return format!("{}{}{}\"", sign, whole_inches, fraction);
    }
    format!("{}{}' {}{}\"", sign, whole_feet, whole_inches, fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_unit_value() {
        assert_eq!(format_unit_value(0.0, "ft"), "0 ft");
        assert_eq!(format_unit_value(0.005, "ft"), "0.0050 ft");
        assert_eq!(format_unit_value(12.346, "ft²"), "12.35 ft²");
    }

    #[test]
    fn test_format_quantity() {
        assert_eq!(format_quantity(1234.5, "ft"), "1,234.5 ft");
        assert_eq!(format_quantity(4.0, "ea"), "4 ea");
        assert_eq!(format_quantity(1_000_000.126, ""), "1,000,000.13");
        assert_eq!(format_quantity(-0.001, "ea"), "0 ea");
        assert_eq!(format_quantity(-1234.0, "ft"), "-1,234 ft");
    }

    #[test]
    fn test_format_result() {
        assert_eq!(format_result(Some(8.0)), "8");
        assert_eq!(format_result(Some(2.5)), "2.5");
        assert_eq!(format_result(Some(-3.0)), "-3");
        assert_eq!(format_result(Some(-0.0)), "0");
        assert_eq!(format_result(Some(-1e-12)), "0");
        assert_eq!(format_result(None), "#N/A");
    }

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(1234.5), "$1,234.50");
        assert_eq!(format_currency(0.0), "$0.00");
        assert_eq!(format_currency(-52.0), "-$52.00");
    }

    #[test]
    fn test_format_architectural() {
        assert_eq!(format_architectural(10.5), "10' 6\"");
        assert_eq!(format_architectural(10.375), "10' 4 1/2\"");
        assert_eq!(format_architectural(78.40625), "78' 4 7/8\"");
        assert_eq!(format_architectural(0.0), "0\"");
        assert_eq!(format_architectural(0.5), "6\"");
        assert_eq!(format_architectural(-1.0), "-1' 0\"");
    }

    #[test]
    fn test_format_architectural_carries_overflow() {
        // 11.999 inches rounds up to a full foot.
        assert_eq!(format_architectural(1.0 + 11.999 / 12.0), "2' 0\"");
    }
}
