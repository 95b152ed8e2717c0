use serde::Serialize;

use super::error::{Result, VolumeError};
use super::model::Axis;
use super::units::{to_cm, LengthUnit};

/// Scorer quantities whose header line declares the per-voxel statistics.
pub const KNOWN_SCORERS: [&str; 11] = [
    "ProtonLET",
    "DoseToMedium",
    "DoseToWater",
    "DoseToMaterial",
    "EnergyDeposit",
    "Fluence",
    "EnergyFluence",
    "StepCount",
    "OpticalPhotonCount",
    "Charge",
    "EffectiveCharge",
];

/// Statistic labels a scorer may report. Unknown labels are still accepted.
pub const KNOWN_STATS: [&str; 9] = [
    "Sum",
    "Mean",
    "Histories",
    "Count_In_Bin",
    "Second_Moment",
    "Variance",
    "Standard_Deviation",
    "Min",
    "Max",
];

// ---------------------------------------------------------------------------
// AxisBinSpec – "# X in 10 bins of 2 mm"
// ---------------------------------------------------------------------------

/// Binning along one axis. The default (no bins, zero size) stands for an
/// axis line that was absent or unreadable.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct AxisBinSpec {
    pub bins: usize,
    pub size_cm: f64,
}

impl AxisBinSpec {
    pub fn new(bins: usize, size_cm: f64) -> Self {
        Self { bins, size_cm }
    }

    /// Parse `<N> bins of <size> <unit>` anywhere in `line`.
    pub fn parse(line: &str) -> Result<Self> {
        let unparsed = || VolumeError::HeaderFieldUnparsed {
            field: "axis bins",
            line: line.to_string(),
        };

        let (before, after) = line.split_once(" bins of ").ok_or_else(unparsed)?;
        let bins = before
            .split_whitespace()
            .last()
            .and_then(|tok| tok.parse::<usize>().ok())
            .ok_or_else(unparsed)?;

        let mut tokens = after.split_whitespace();
        let size = tokens
            .next()
            .and_then(|tok| tok.parse::<f64>().ok())
            .ok_or_else(unparsed)?;
        let unit: LengthUnit = tokens.next().ok_or_else(unparsed)?.parse()?;

        Ok(Self::new(bins, to_cm(size, unit)))
    }

    /// `bins` offsets from 0 in steps of `size_cm`, right end excluded.
    pub fn scale(&self) -> Vec<f64> {
        linspace(0.0, self.size_cm * self.bins as f64, self.bins)
    }
}

/// `n` evenly spaced values from `start` towards `stop`, `stop` excluded.
pub(crate) fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    if n == 0 {
        return Vec::new();
    }
    let step = (stop - start) / n as f64;
    (0..n).map(|i| start + step * i as f64).collect()
}

// ---------------------------------------------------------------------------
// ScoredQuantity – "# DoseToMedium ( Gy ) : Sum Mean"
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ScoredQuantity {
    pub name: String,
    pub unit: String,
    /// Column order of the values in every data row.
    pub stats: Vec<String>,
}

impl ScoredQuantity {
    pub fn parse(line: &str) -> Result<Self> {
        let unparsed = || VolumeError::HeaderFieldUnparsed {
            field: "scored quantity",
            line: line.to_string(),
        };

        let tokens: Vec<&str> = line.split_whitespace().collect();
        let name = tokens.get(1).ok_or_else(unparsed)?;
        let unit = tokens.get(3).ok_or_else(unparsed)?;
        let (_, stats) = line.split_once(": ").ok_or_else(unparsed)?;

        Ok(Self {
            name: name.to_string(),
            unit: unit.to_string(),
            stats: stats.split_whitespace().map(str::to_string).collect(),
        })
    }

    /// Declared statistics that are not in [`KNOWN_STATS`].
    pub fn unrecognised_stats(&self) -> Vec<&str> {
        self.stats
            .iter()
            .map(String::as_str)
            .filter(|stat| !KNOWN_STATS.contains(stat))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// ResultHeader – the leading comment block of a results table
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ResultHeader {
    pub topas_version: String,
    /// Parameter file path exactly as written in the header.
    pub parameter_file: String,
    pub scorer: String,
    pub scored_component: String,
    pub x: AxisBinSpec,
    pub y: AxisBinSpec,
    pub z: AxisBinSpec,
    pub scored_quantity: ScoredQuantity,
}

impl ResultHeader {
    /// Read the contiguous `#` block at the top of `text`. Lines that are not
    /// recognised are ignored; fields that fail to parse keep their default.
    pub fn parse(text: &str) -> Self {
        let mut header = ResultHeader::default();
        for line in text.lines().take_while(|l| l.starts_with('#')) {
            header.apply_line(line.trim_end());
        }
        header
    }

    fn apply_line(&mut self, line: &str) {
        if line.starts_with("# TOPAS Version") {
            self.topas_version = soft(value_after_colon(line, "TOPAS version"));
        } else if line.starts_with("# Parameter File") {
            self.parameter_file = soft(value_after_colon(line, "parameter file"));
        } else if let Some(scorer) = line.strip_prefix("# Results for scorer ") {
            self.scorer = scorer.trim().to_string();
        } else if line.starts_with("# Scored in component") {
            self.scored_component = soft(value_after_colon(line, "scored component"));
        } else if line.starts_with("# X in ") {
            self.x = soft(AxisBinSpec::parse(line));
        } else if line.starts_with("# Y in ") {
            self.y = soft(AxisBinSpec::parse(line));
        } else if line.starts_with("# Z in ") {
            self.z = soft(AxisBinSpec::parse(line));
        } else if is_quantity_line(line) {
            self.scored_quantity = soft(ScoredQuantity::parse(line));
            let unrecognised = self.scored_quantity.unrecognised_stats();
            if !unrecognised.is_empty() {
                log::debug!("keeping unrecognised statistics {unrecognised:?}");
            }
        }
    }

    pub fn bins(&self, axis: Axis) -> &AxisBinSpec {
        match axis {
            Axis::X => &self.x,
            Axis::Y => &self.y,
            Axis::Z => &self.z,
        }
    }

    /// Array shape implied by the three axis lines.
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.x.bins, self.y.bins, self.z.bins)
    }
}

fn is_quantity_line(line: &str) -> bool {
    line.strip_prefix("# ")
        .is_some_and(|rest| KNOWN_SCORERS.iter().any(|s| rest.starts_with(s)))
}

fn value_after_colon(line: &str, field: &'static str) -> Result<String> {
    line.split_once(": ")
        .map(|(_, value)| value.trim().to_string())
        .ok_or_else(|| VolumeError::HeaderFieldUnparsed {
            field,
            line: line.to_string(),
        })
}

fn soft<T: Default>(parsed: Result<T>) -> T {
    parsed.unwrap_or_else(|e| {
        log::warn!("{e}; using default");
        T::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "\
# TOPAS Version: 3.9
# Parameter File: dose.txt
# Results for scorer DoseAtPhantom
# Scored in component: Phantom
# X in 10 bins of 2.0 mm
# Y in 4 bins of 1 cm
# Z in 3 bins of 0.05 m
# DoseToMedium ( Gy ) : Sum   Mean   Standard_Deviation
# some other remark
0, 0, 0, 1.0, 1.0, 0.0
# Z in 99 bins of 1 cm
";

    #[test]
    fn full_header() {
        let header = ResultHeader::parse(HEADER);
        assert_eq!(header.topas_version, "3.9");
        assert_eq!(header.parameter_file, "dose.txt");
        assert_eq!(header.scorer, "DoseAtPhantom");
        assert_eq!(header.scored_component, "Phantom");
        assert_eq!(header.x.bins, 10);
        assert!((header.x.size_cm - 0.2).abs() < 1e-12);
        assert_eq!(header.y, AxisBinSpec::new(4, 1.0));
        assert_eq!(header.scored_quantity.name, "DoseToMedium");
        assert_eq!(header.scored_quantity.unit, "Gy");
        assert_eq!(
            header.scored_quantity.stats,
            vec!["Sum", "Mean", "Standard_Deviation"]
        );
    }

    #[test]
    fn header_stops_at_first_data_row() {
        let header = ResultHeader::parse(HEADER);
        assert_eq!(header.z.bins, 3);
        assert!((header.z.size_cm - 0.5).abs() < 1e-12);
        assert_eq!(header.shape(), (10, 4, 3));
    }

    #[test]
    fn bins_of_line_without_axis_prefix() {
        let spec = AxisBinSpec::parse("# 10 bins of 2.0 mm").unwrap();
        assert_eq!(spec.bins, 10);
        assert!((spec.size_cm - 0.2).abs() < 1e-12);
    }

    #[test]
    fn bins_with_other_units() {
        let spec = AxisBinSpec::parse("# X in 5 bins of 200 nm").unwrap();
        assert!((spec.size_cm - 2e-6).abs() < 1e-18);
        assert!(matches!(
            AxisBinSpec::parse("# X in 5 bins of 2 in"),
            Err(VolumeError::UnsupportedUnit(_))
        ));
    }

    #[test]
    fn absent_and_broken_lines_leave_defaults() {
        let header = ResultHeader::parse(
            "# Results for scorer Fluence\n# X in many bins of 1 cm\n# Fluence\n",
        );
        assert_eq!(header.scorer, "Fluence");
        assert_eq!(header.x, AxisBinSpec::default());
        assert_eq!(header.y, AxisBinSpec::default());
        assert_eq!(header.scored_quantity, ScoredQuantity::default());
        assert_eq!(header.parameter_file, "");
        assert!(header.x.scale().is_empty());
    }

    #[test]
    fn unrecognised_stats_are_kept_and_reported() {
        let header = ResultHeader::parse("# Fluence ( /mm2 ) : Sum Median Max\n");
        assert_eq!(header.scored_quantity.stats, vec!["Sum", "Median", "Max"]);
        assert_eq!(header.scored_quantity.unrecognised_stats(), vec!["Median"]);

        let header = ResultHeader::parse(HEADER);
        assert!(header.scored_quantity.unrecognised_stats().is_empty());
    }

    #[test]
    fn unknown_scorer_line_is_ignored() {
        let header = ResultHeader::parse("# Momentum ( MeV ) : Sum\n");
        assert!(header.scored_quantity.stats.is_empty());
    }

    #[test]
    fn scale_excludes_right_end() {
        let scale = AxisBinSpec::new(4, 0.5).scale();
        assert_eq!(scale, vec![0.0, 0.5, 1.0, 1.5]);
    }
}
