use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ndarray::{Array3, ArrayView3};
use serde::Serialize;

use super::header::ResultHeader;
use super::params::{Component, ParameterFile};

// ---------------------------------------------------------------------------
// Axis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    /// Position of this axis in `[x, y, z]` array indexing.
    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    /// Plot label, e.g. `Z (cm)`.
    pub fn label(self) -> &'static str {
        match self {
            Axis::X => "X (cm)",
            Axis::Y => "Y (cm)",
            Axis::Z => "Z (cm)",
        }
    }

    pub(crate) fn nd(self) -> ndarray::Axis {
        ndarray::Axis(self.index())
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Axis::X => "x",
            Axis::Y => "y",
            Axis::Z => "z",
        };
        f.write_str(s)
    }
}

impl FromStr for Axis {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "x" | "X" => Ok(Axis::X),
            "y" | "Y" => Ok(Axis::Y),
            "z" | "Z" => Ok(Axis::Z),
            other => Err(format!("unknown axis '{other}'")),
        }
    }
}

// ---------------------------------------------------------------------------
// AxisCoordinates – physical positions of the bins along one axis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxisCoordinates {
    /// Lower edge of every bin, in cm.
    pub start_cm: Vec<f64>,
    /// Centre of every bin, in cm.
    pub center_cm: Vec<f64>,
    /// `(first lower edge, last lower edge + bin size)`.
    pub extent_cm: (f64, f64),
    pub bin_size_cm: f64,
}

impl AxisCoordinates {
    pub fn len(&self) -> usize {
        self.start_cm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.start_cm.is_empty()
    }

    pub fn min_center(&self) -> Option<f64> {
        self.center_cm.iter().copied().reduce(f64::min)
    }

    pub fn max_center(&self) -> Option<f64> {
        self.center_cm.iter().copied().reduce(f64::max)
    }
}

// ---------------------------------------------------------------------------
// Volume – the complete loaded result
// ---------------------------------------------------------------------------

/// A loaded scorer result. Immutable once built; arrays are only handed out
/// as views.
#[derive(Debug, Clone)]
pub struct Volume {
    file_name: PathBuf,
    header: ResultHeader,
    parameters: ParameterFile,
    /// stat label → values indexed `[x, y, z]`.
    data: BTreeMap<String, Array3<f64>>,
    axes: [AxisCoordinates; 3],
}

impl Volume {
    pub(crate) fn new(
        file_name: PathBuf,
        header: ResultHeader,
        parameters: ParameterFile,
        data: BTreeMap<String, Array3<f64>>,
        axes: [AxisCoordinates; 3],
    ) -> Self {
        Volume {
            file_name,
            header,
            parameters,
            data,
            axes,
        }
    }

    /// Results file this volume was read from.
    pub fn file_name(&self) -> &Path {
        &self.file_name
    }

    pub fn header(&self) -> &ResultHeader {
        &self.header
    }

    pub fn parameters(&self) -> &ParameterFile {
        &self.parameters
    }

    pub fn geometry_components(&self) -> &BTreeMap<String, Component> {
        &self.parameters.geometry
    }

    /// Statistic labels in header (column) order.
    pub fn stats(&self) -> &[String] {
        &self.header.scored_quantity.stats
    }

    pub fn data(&self, stat: &str) -> Option<ArrayView3<'_, f64>> {
        self.data.get(stat).map(|a| a.view())
    }

    pub fn axis(&self, axis: Axis) -> &AxisCoordinates {
        &self.axes[axis.index()]
    }

    pub fn shape(&self) -> (usize, usize, usize) {
        self.header.shape()
    }
}
