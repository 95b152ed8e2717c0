use ndarray::Array2;

use super::error::{Result, VolumeError};
use super::model::{Axis, Volume};

// ---------------------------------------------------------------------------
// Bin lookup
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BinIndex {
    /// Nearest bin.
    Discrete(usize),
    /// Position between bin centres, e.g. `1.25`.
    Fractional(f64),
}

impl BinIndex {
    pub fn as_f64(self) -> f64 {
        match self {
            BinIndex::Discrete(i) => i as f64,
            BinIndex::Fractional(f) => f,
        }
    }

    pub fn discrete(self) -> Option<usize> {
        match self {
            BinIndex::Discrete(i) => Some(i),
            BinIndex::Fractional(_) => None,
        }
    }
}

/// The bin holding `coordinate_cm` along `axis`, or `None` when the
/// coordinate lies outside the range of bin centres.
///
/// With `discrete` the fractional position is rounded half-to-even to the
/// nearest bin.
pub fn bin_for_coordinate(
    volume: &Volume,
    axis: Axis,
    coordinate_cm: f64,
    discrete: bool,
) -> Option<BinIndex> {
    let centers = &volume.axis(axis).center_cm;
    let position = fractional_bin(centers, coordinate_cm)?;
    if discrete {
        let bin = position.round_ties_even().max(0.0) as usize;
        Some(BinIndex::Discrete(bin.min(centers.len() - 1)))
    } else {
        Some(BinIndex::Fractional(position))
    }
}

fn fractional_bin(centers: &[f64], coordinate: f64) -> Option<f64> {
    let min = centers.iter().copied().reduce(f64::min)?;
    let max = centers.iter().copied().reduce(f64::max)?;
    if !(min..=max).contains(&coordinate) {
        return None;
    }
    if centers.len() == 1 {
        return Some(0.0);
    }

    // Interpolation from any pair gives the same answer on a uniform grid, so
    // when no pair passes the bracket test the last pair is used.
    let last = centers.len() - 2;
    let (index, pair) = centers
        .windows(2)
        .enumerate()
        .find(|(_, pair)| bracket_hit(pair[0], pair[1], coordinate))
        .unwrap_or((last, &centers[last..]));

    let spacing = pair[1] - pair[0];
    if spacing == 0.0 {
        return Some(index as f64);
    }
    Some(index as f64 + (coordinate - pair[0]) / spacing)
}

/// Bracket test as the viewer has always evaluated it: `val - c * next - c`.
/// This is not the sign-change test `(val - c) * (next - c)` and can reject
/// the pair that actually brackets `c`.
fn bracket_hit(val: f64, next: f64, coordinate: f64) -> bool {
    val - coordinate * next - coordinate <= 0.0
}

/// Bin-centre coordinate of the central bin along `axis`.
pub fn middle_cm(volume: &Volume, axis: Axis) -> Option<f64> {
    let centers = &volume.axis(axis).center_cm;
    centers.get(centers.len() / 2).copied()
}

// ---------------------------------------------------------------------------
// Slices
// ---------------------------------------------------------------------------

/// A 2-D cross-section through one statistic at a fixed bin of one axis.
///
/// `values[[row, column]]` indexes the volume directly: the remaining axes
/// keep their `x, y, z` order, the first one running along rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice {
    pub stat: String,
    pub axis: Axis,
    pub bin: usize,
    /// Centre of the fixed bin, in cm.
    pub position_cm: f64,
    pub values: Array2<f64>,
    pub row_axis: Axis,
    pub column_axis: Axis,
    pub row_extent_cm: (f64, f64),
    pub column_extent_cm: (f64, f64),
}

/// The two axes spanning the plane perpendicular to `axis`, as (rows, columns).
pub fn in_plane_axes(axis: Axis) -> (Axis, Axis) {
    match axis {
        Axis::X => (Axis::Y, Axis::Z),
        Axis::Y => (Axis::X, Axis::Z),
        Axis::Z => (Axis::X, Axis::Y),
    }
}

/// Cut `stat` at `bin` along `axis`; `None` picks the central bin.
pub fn slice(volume: &Volume, stat: &str, axis: Axis, bin: Option<usize>) -> Result<Slice> {
    let data = volume
        .data(stat)
        .ok_or_else(|| VolumeError::UnknownStatistic(stat.to_string()))?;

    let coords = volume.axis(axis);
    let bins = coords.len();
    let bin = bin.unwrap_or(bins / 2);
    if bin >= bins {
        return Err(VolumeError::BinOutOfRange { axis, bin, bins });
    }

    let (row_axis, column_axis) = in_plane_axes(axis);
    Ok(Slice {
        stat: stat.to_string(),
        axis,
        bin,
        position_cm: coords.center_cm[bin],
        values: data.index_axis(axis.nd(), bin).to_owned(),
        row_axis,
        column_axis,
        row_extent_cm: volume.axis(row_axis).extent_cm,
        column_extent_cm: volume.axis(column_axis).extent_cm,
    })
}

impl Slice {
    pub fn row_label(&self) -> &'static str {
        self.row_axis.label()
    }

    pub fn column_label(&self) -> &'static str {
        self.column_axis.label()
    }

    pub fn max(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::max)
    }

    pub fn min(&self) -> Option<f64> {
        self.values.iter().copied().reduce(f64::min)
    }

    /// Multi-line caption naming the quantity, its provenance and the cut.
    pub fn title(&self, volume: &Volume) -> String {
        let header = volume.header();
        let quantity = &header.scored_quantity;
        format!(
            "{} {} [{}]\nScorer: {}; Scored component: {}\nParameterFile: {}\nResultsFile: {}\n(Slice: {} = {} cm)",
            quantity.name,
            self.stat,
            quantity.unit,
            header.scorer,
            header.scored_component,
            header.parameter_file,
            volume.file_name().display(),
            self.axis,
            self.position_cm,
        )
    }
}
