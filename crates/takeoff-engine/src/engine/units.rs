//! Measurement unit conversion.
//!
//! Markups are captured in raw canvas units: pixels for lengths, square
//! pixels for areas, and plain counts. A page calibration supplies the
//! scale factor (pixels per real-world foot). Lengths are first brought to
//! feet and areas to square feet, then multiplied by a fixed per-unit factor.
//!
//! No rounding happens here; display formatting lives in [`super::format`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Pixels per foot assumed when a page has no calibration (1px = 1in).
pub const LEGACY_PIXELS_PER_FOOT: f64 = 12.0;

/// What a measured raw value represents.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasureKind {
    Linear,
    Area,
    Count,
}

impl FromStr for MeasureKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "linear" | "segment" | "length" => Ok(MeasureKind::Linear),
            "area" => Ok(MeasureKind::Area),
            "count" => Ok(MeasureKind::Count),
            other => Err(format!("Unknown measurement kind: {}", other)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinearUnit {
    Mm,
    Cm,
    M,
    Km,
    In,
    Ft,
    Yd,
    Mi,
}

impl LinearUnit {
    pub const ALL: [LinearUnit; 8] = [
        LinearUnit::Mm,
        LinearUnit::Cm,
        LinearUnit::M,
        LinearUnit::Km,
        LinearUnit::In,
        LinearUnit::Ft,
        LinearUnit::Yd,
        LinearUnit::Mi,
    ];

    /// Multiplier taking feet to this unit.
    pub fn per_foot(self) -> f64 {
        match self {
            LinearUnit::Mm => 304.8,
            LinearUnit::Cm => 30.48,
            LinearUnit::M => 0.3048,
            LinearUnit::Km => 0.0003048,
            LinearUnit::In => 12.0,
            LinearUnit::Ft => 1.0,
            LinearUnit::Yd => 1.0 / 3.0,
            LinearUnit::Mi => 1.0 / 5280.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LinearUnit::Mm => "mm",
            LinearUnit::Cm => "cm",
            LinearUnit::M => "m",
            LinearUnit::Km => "km",
            LinearUnit::In => "in",
            LinearUnit::Ft => "ft",
            LinearUnit::Yd => "yd",
            LinearUnit::Mi => "mi",
        }
    }

    pub fn parse(label: &str) -> Option<LinearUnit> {
        match label.trim() {
            "mm" => Some(LinearUnit::Mm),
            "cm" => Some(LinearUnit::Cm),
            "m" => Some(LinearUnit::M),
            "km" => Some(LinearUnit::Km),
            "in" | "\"" => Some(LinearUnit::In),
            "ft" | "'" | "lf" => Some(LinearUnit::Ft),
            "yd" => Some(LinearUnit::Yd),
            "mi" => Some(LinearUnit::Mi),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AreaUnit {
    Mm2,
    Cm2,
    M2,
    Km2,
    In2,
    Ft2,
    Yd2,
    Mi2,
    Acre,
    Hectare,
}

impl AreaUnit {
    pub const ALL: [AreaUnit; 10] = [
        AreaUnit::Mm2,
        AreaUnit::Cm2,
        AreaUnit::M2,
        AreaUnit::Km2,
        AreaUnit::In2,
        AreaUnit::Ft2,
        AreaUnit::Yd2,
        AreaUnit::Mi2,
        AreaUnit::Acre,
        AreaUnit::Hectare,
    ];

    /// Multiplier taking square feet to this unit.
    pub fn per_square_foot(self) -> f64 {
        const M_PER_FT: f64 = 0.3048;
        match self {
            AreaUnit::Mm2 => 304.8 * 304.8,
            AreaUnit::Cm2 => 30.48 * 30.48,
            AreaUnit::M2 => M_PER_FT * M_PER_FT,
            AreaUnit::Km2 => M_PER_FT * M_PER_FT / 1e6,
            AreaUnit::In2 => 144.0,
            AreaUnit::Ft2 => 1.0,
            AreaUnit::Yd2 => 1.0 / 9.0,
            AreaUnit::Mi2 => 1.0 / (5280.0 * 5280.0),
            AreaUnit::Acre => 1.0 / 43560.0,
            AreaUnit::Hectare => M_PER_FT * M_PER_FT / 10_000.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            AreaUnit::Mm2 => "mm²",
            AreaUnit::Cm2 => "cm²",
            AreaUnit::M2 => "m²",
            AreaUnit::Km2 => "km²",
            AreaUnit::In2 => "in²",
            AreaUnit::Ft2 => "ft²",
            AreaUnit::Yd2 => "yd²",
            AreaUnit::Mi2 => "mi²",
            AreaUnit::Acre => "ac",
            AreaUnit::Hectare => "ha",
        }
    }

    /// Accepts the superscript labels used by the drawing UI as well as the
    /// ASCII spellings found in hand-written templates (`ft2`, `sq ft`, `sf`).
    pub fn parse(label: &str) -> Option<AreaUnit> {
        let label = label.trim().to_ascii_lowercase();
        let label = label.replace('²', "2");
        match label.as_str() {
            "mm2" | "sq mm" => Some(AreaUnit::Mm2),
            "cm2" | "sq cm" => Some(AreaUnit::Cm2),
            "m2" | "sq m" | "sqm" => Some(AreaUnit::M2),
            "km2" | "sq km" => Some(AreaUnit::Km2),
            "in2" | "sq in" => Some(AreaUnit::In2),
            "ft2" | "sq ft" | "sqft" | "sf" => Some(AreaUnit::Ft2),
            "yd2" | "sq yd" | "sy" => Some(AreaUnit::Yd2),
            "mi2" | "sq mi" => Some(AreaUnit::Mi2),
            "ac" | "acre" | "acres" => Some(AreaUnit::Acre),
            "ha" | "hectare" | "hectares" => Some(AreaUnit::Hectare),
            _ => None,
        }
    }
}

/// Either a linear or an area unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Unit {
    Linear(LinearUnit),
    Area(AreaUnit),
}

impl Unit {
    pub fn kind(self) -> MeasureKind {
        match self {
            Unit::Linear(_) => MeasureKind::Linear,
            Unit::Area(_) => MeasureKind::Area,
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LinearUnit::parse(s)
            .map(Unit::Linear)
            .or_else(|| AreaUnit::parse(s).map(Unit::Area))
            .ok_or_else(|| format!("Unknown unit: {}", s))
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unit::Linear(u) => f.write_str(u.label()),
            Unit::Area(u) => f.write_str(u.label()),
        }
    }
}

/// A calibration of zero, a negative value, or NaN means "uncalibrated":
/// the raw value is taken to already be in feet.
fn effective_scale(pixels_per_foot: f64) -> f64 {
    if pixels_per_foot.is_finite() && pixels_per_foot > 0.0 {
        pixels_per_foot
    } else {
        1.0
    }
}

/// Convert a pixel distance to `unit`.
pub fn convert_linear(pixels: f64, unit: LinearUnit, pixels_per_foot: f64) -> f64 {
    pixels / effective_scale(pixels_per_foot) * unit.per_foot()
}

/// Convert a square-pixel area to `unit`.
pub fn convert_area(square_pixels: f64, unit: AreaUnit, pixels_per_foot: f64) -> f64 {
    let scale = effective_scale(pixels_per_foot);
    square_pixels / (scale * scale) * unit.per_square_foot()
}

/// Inverse of [`convert_linear`].
pub fn to_pixels_linear(value: f64, unit: LinearUnit, pixels_per_foot: f64) -> f64 {
    value / unit.per_foot() * effective_scale(pixels_per_foot)
}

/// Inverse of [`convert_area`].
pub fn to_pixels_area(value: f64, unit: AreaUnit, pixels_per_foot: f64) -> f64 {
    let scale = effective_scale(pixels_per_foot);
    value / unit.per_square_foot() * scale * scale
}

/// Bring a raw measured value to the quantity a template formula sees as `qty`.
///
/// Counts pass through. Linear and area values are scaled and converted to
/// the unit named by `unit`; an unrecognised label leaves the value in feet
/// (or square feet). Area markups may be stored signed, so their magnitude
/// is used.
pub fn to_base_quantity(raw: f64, unit: &str, pixels_per_foot: f64, kind: MeasureKind) -> f64 {
    match kind {
        MeasureKind::Count => raw,
        MeasureKind::Linear => {
            let scale = effective_scale(pixels_per_foot);
            match LinearUnit::parse(unit) {
                Some(u) => convert_linear(raw, u, scale),
                None => raw / scale,
            }
        }
        MeasureKind::Area => {
            let raw = raw.abs();
            let scale = effective_scale(pixels_per_foot);
            match AreaUnit::parse(unit) {
                Some(u) => convert_area(raw, u, scale),
                None => raw / (scale * scale),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-9 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn test_linear_feet_and_inches() {
        assert!(close(convert_linear(120.0, LinearUnit::Ft, 12.0), 10.0));
        assert!(close(convert_linear(120.0, LinearUnit::In, 12.0), 120.0));
        assert!(close(convert_linear(36.0, LinearUnit::Yd, 12.0), 1.0));
    }

    #[test]
    fn test_linear_metric() {
        assert!(close(convert_linear(10.0, LinearUnit::M, 1.0), 3.048));
        assert!(close(convert_linear(1.0, LinearUnit::Mm, 1.0), 304.8));
        assert!(close(convert_linear(5280.0, LinearUnit::Mi, 1.0), 1.0));
    }

    #[test]
    fn test_area_uses_squared_scale() {
        // 10ft x 10ft at 12px/ft is 120px x 120px.
        assert!(close(convert_area(14_400.0, AreaUnit::Ft2, 12.0), 100.0));
        assert!(close(convert_area(14_400.0, AreaUnit::Yd2, 12.0), 100.0 / 9.0));
    }

    #[test]
    fn test_area_acre_and_hectare_constants() {
        assert!(close(convert_area(43_560.0, AreaUnit::Acre, 1.0), 1.0));
        // 1 ha = 10_000 m² = 107_639.104... ft²
        let ft2_per_ha = 10_000.0 / (0.3048 * 0.3048);
        assert!(close(convert_area(ft2_per_ha, AreaUnit::Hectare, 1.0), 1.0));
    }

    #[test]
    fn test_degenerate_scale_is_identity() {
        assert_eq!(convert_linear(42.0, LinearUnit::Ft, 0.0), 42.0);
        assert_eq!(convert_linear(42.0, LinearUnit::Ft, -3.0), 42.0);
        assert_eq!(convert_area(42.0, AreaUnit::Ft2, f64::NAN), 42.0);
    }

    #[test]
    fn test_to_base_quantity_count_ignores_scale() {
        assert_eq!(to_base_quantity(7.0, "ea", 48.0, MeasureKind::Count), 7.0);
        assert_eq!(to_base_quantity(7.0, "ea", 0.0, MeasureKind::Count), 7.0);
    }

    #[test]
    fn test_to_base_quantity_area_uses_magnitude() {
        let q = to_base_quantity(-14_400.0, "ft²", 12.0, MeasureKind::Area);
        assert!(close(q, 100.0));
        let q = to_base_quantity(14_400.0, "sq ft", 12.0, MeasureKind::Area);
        assert!(close(q, 100.0));
    }

    #[test]
    fn test_to_base_quantity_unknown_unit_stays_in_feet() {
        assert!(close(to_base_quantity(24.0, "lf?", 12.0, MeasureKind::Linear), 2.0));
    }

    #[test]
    fn test_unit_from_str() {
        assert_eq!("ft".parse::<Unit>(), Ok(Unit::Linear(LinearUnit::Ft)));
        assert_eq!("m²".parse::<Unit>(), Ok(Unit::Area(AreaUnit::M2)));
        assert_eq!("ac".parse::<Unit>(), Ok(Unit::Area(AreaUnit::Acre)));
        assert!("furlong".parse::<Unit>().is_err());
        assert_eq!(Unit::Area(AreaUnit::Ft2).to_string(), "ft²");
    }

    proptest! {
        #[test]
        fn prop_linear_round_trip(x in -1.0e6f64..1.0e6, ppf in 0.01f64..1.0e4) {
            for unit in LinearUnit::ALL {
                let px = to_pixels_linear(x, unit, ppf);
                prop_assert!(close(convert_linear(px, unit, ppf), x));
            }
        }

        #[test]
        fn prop_area_round_trip(x in 0.0f64..1.0e6, ppf in 0.01f64..1.0e3) {
            for unit in AreaUnit::ALL {
                let px = to_pixels_area(x, unit, ppf);
                prop_assert!(close(convert_area(px, unit, ppf), x));
            }
        }
    }
}
