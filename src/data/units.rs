use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use super::error::VolumeError;

// ---------------------------------------------------------------------------
// LengthUnit – the units a bin size or a placement may be given in
// ---------------------------------------------------------------------------

/// Length units understood by the loader. Everything is normalised to cm.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum LengthUnit {
    Cm,
    Mm,
    M,
    Nm,
}

impl FromStr for LengthUnit {
    type Err = VolumeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "cm" => Ok(LengthUnit::Cm),
            "mm" => Ok(LengthUnit::Mm),
            "m" => Ok(LengthUnit::M),
            "nm" => Ok(LengthUnit::Nm),
            other => Err(VolumeError::UnsupportedUnit(other.to_string())),
        }
    }
}

impl fmt::Display for LengthUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LengthUnit::Cm => "cm",
            LengthUnit::Mm => "mm",
            LengthUnit::M => "m",
            LengthUnit::Nm => "nm",
        };
        f.write_str(s)
    }
}

/// Convert `value` given in `unit` to centimetres.
///
/// The `m` and `nm` factors are the ones results have always been read with
/// (×10 and ÷1e8); change them here and nowhere else.
pub fn to_cm(value: f64, unit: LengthUnit) -> f64 {
    match unit {
        LengthUnit::Cm => value,
        LengthUnit::Mm => value / 10.0,
        LengthUnit::M => value * 10.0,
        LengthUnit::Nm => value / 1e8,
    }
}

// ---------------------------------------------------------------------------
// UnitValue – a `d:` parameter, magnitude in its declared unit
// ---------------------------------------------------------------------------

/// A dimensioned number exactly as written, e.g. `5.0 mm`.
///
/// The unit is kept as text because parameter files also carry non-length
/// units (`deg`, `MeV`, ...); only length units convert.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitValue {
    pub magnitude: f64,
    pub unit: String,
}

impl UnitValue {
    pub fn new(magnitude: f64, unit: impl Into<String>) -> Self {
        Self {
            magnitude,
            unit: unit.into(),
        }
    }

    pub fn length_unit(&self) -> Result<LengthUnit, VolumeError> {
        self.unit.parse()
    }

    /// The magnitude in centimetres; fails for non-length units.
    pub fn to_cm(&self) -> Result<f64, VolumeError> {
        Ok(to_cm(self.magnitude, self.length_unit()?))
    }
}

impl fmt::Display for UnitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.magnitude, self.unit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() <= 1e-12 * a.abs().max(b.abs()).max(1.0)
    }

    #[test]
    fn conversion_constants() {
        assert_eq!(to_cm(3.0, LengthUnit::Cm), 3.0);
        assert!(close(to_cm(5.0, LengthUnit::Mm), 0.5));
        assert!(close(to_cm(2.0, LengthUnit::M), 20.0));
        assert!(close(to_cm(4.0, LengthUnit::Nm), 4e-8));
    }

    #[test]
    fn conversion_is_linear() {
        for unit in [LengthUnit::Cm, LengthUnit::Mm, LengthUnit::M, LengthUnit::Nm] {
            let one = to_cm(1.0, unit);
            assert!(close(to_cm(7.5, unit), 7.5 * one), "{unit}");
            // cm → mm by hand and back through the table
            assert!(close(to_cm(one * 10.0, LengthUnit::Mm), one), "{unit}");
        }
    }

    #[test]
    fn unknown_unit_is_rejected() {
        let err = "deg".parse::<LengthUnit>().unwrap_err();
        assert!(matches!(err, VolumeError::UnsupportedUnit(ref u) if u == "deg"));

        let v = UnitValue::new(90.0, "deg");
        assert!(v.to_cm().is_err());
    }

    #[test]
    fn unit_value_keeps_declared_unit() {
        let v = UnitValue::new(5.0, "mm");
        assert!(close(v.to_cm().unwrap(), 0.5));
        assert_eq!(v.magnitude, 5.0);
        assert_eq!(v.unit, "mm");
        assert_eq!(v.to_string(), "5 mm");
    }
}
