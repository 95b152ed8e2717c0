use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ndarray::Array3;

use super::error::{Result, VolumeError};
use super::header::{linspace, AxisBinSpec, ResultHeader};
use super::model::{Axis, AxisCoordinates, Volume};
use super::params::{Component, ParameterFile};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a cartesian scorer results table together with the parameter file
/// its header points at.
pub fn load_volume(path: &Path) -> Result<Volume> {
    let text = std::fs::read_to_string(path).map_err(|e| VolumeError::unreadable(path, e))?;
    let header = ResultHeader::parse(&text);

    let parameter_path = resolve_parameter_file(path, &header.parameter_file);
    log::debug!("reading parameter file {}", parameter_path.display());
    let parameters = ParameterFile::from_path(&parameter_path)?;

    let volume = build_volume(path.to_path_buf(), &text, header, parameters)?;
    log::info!(
        "Loaded {} ({} in {}): shape {:?}, stats {:?}",
        path.display(),
        volume.header().scorer,
        volume.header().scored_component,
        volume.shape(),
        volume.stats()
    );
    Ok(volume)
}

/// The header records the parameter file as it was passed to the simulation,
/// usually relative to the run directory that also holds the results.
fn resolve_parameter_file(results: &Path, written: &str) -> PathBuf {
    let path = PathBuf::from(written);
    if path.is_relative() && !path.exists() {
        if let Some(candidate) = results.parent().map(|dir| dir.join(&path)) {
            if candidate.exists() {
                return candidate;
            }
        }
    }
    path
}

/// Assemble a volume from an already-read results table and parameter file.
pub fn build_volume(
    file_name: PathBuf,
    results_text: &str,
    header: ResultHeader,
    parameters: ParameterFile,
) -> Result<Volume> {
    check_grid(header.shape())?;

    let component_name = header.scored_component.as_str();
    let component = parameters
        .geometry_component(component_name)
        .ok_or_else(|| VolumeError::MissingGeometryComponent {
            component: component_name.to_string(),
            key: None,
        })?;

    let axes = [
        axis_coordinates(component_name, component, Axis::X, &header.x)?,
        axis_coordinates(component_name, component, Axis::Y, &header.y)?,
        axis_coordinates(component_name, component, Axis::Z, &header.z)?,
    ];

    let mut arrays = read_rows(results_text, &header)?;
    // Rows are written from the rear face forward along z.
    for array in &mut arrays {
        array.invert_axis(Axis::Z.nd());
    }

    let data: BTreeMap<String, Array3<f64>> = header
        .scored_quantity
        .stats
        .iter()
        .cloned()
        .zip(arrays)
        .collect();

    Ok(Volume::new(file_name, header, parameters, data, axes))
}

/// Bin counts come straight from the header; refuse grids whose voxel count
/// cannot be addressed before anything is allocated for them.
fn check_grid(shape: (usize, usize, usize)) -> Result<()> {
    let limit = isize::MAX as usize / std::mem::size_of::<f64>();
    let (x, y, z) = shape;
    let voxels = x.checked_mul(y).and_then(|xy| xy.checked_mul(z));
    let fits = |n: usize| n <= limit;
    if voxels.is_some_and(fits) && fits(x) && fits(y) && fits(z) {
        Ok(())
    } else {
        Err(VolumeError::GridTooLarge { shape })
    }
}

// ---------------------------------------------------------------------------
// Axes
// ---------------------------------------------------------------------------

/// Bin edges and centres along `axis`, placed by the component's translation
/// and half length. Rotations are not applied.
fn axis_coordinates(
    component_name: &str,
    component: &Component,
    axis: Axis,
    spec: &AxisBinSpec,
) -> Result<AxisCoordinates> {
    let suffix = match axis {
        Axis::X => "X",
        Axis::Y => "Y",
        Axis::Z => "Z",
    };
    let translation = length_cm(component_name, component, &format!("Trans{suffix}"))?;
    let half_length = length_cm(component_name, component, &format!("HL{suffix}"))?;

    let lower = translation - half_length;
    let upper = translation + half_length;
    let start_cm = linspace(lower, upper, spec.bins);
    let center_cm: Vec<f64> = start_cm.iter().map(|s| s + 0.5 * spec.size_cm).collect();
    let extent_cm = (
        start_cm.first().copied().unwrap_or(lower),
        start_cm.last().map(|s| s + spec.size_cm).unwrap_or(lower),
    );

    Ok(AxisCoordinates {
        start_cm,
        center_cm,
        extent_cm,
        bin_size_cm: spec.size_cm,
    })
}

fn length_cm(component_name: &str, component: &Component, key: &str) -> Result<f64> {
    component
        .get(key)
        .and_then(|v| v.as_unit_value())
        .ok_or_else(|| VolumeError::missing_key(component_name, key))?
        .to_cm()
}

// ---------------------------------------------------------------------------
// Data rows
// ---------------------------------------------------------------------------

/// Read every non-comment row `x, y, z, v1, v2, ...` into one array per
/// statistic, in header order.
fn read_rows(text: &str, header: &ResultHeader) -> Result<Vec<Array3<f64>>> {
    let shape = header.shape();
    let stats = &header.scored_quantity.stats;
    let mut arrays: Vec<Array3<f64>> = stats.iter().map(|_| Array3::zeros(shape)).collect();

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(b'#'))
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    for result in reader.records() {
        let record = result.map_err(|e| VolumeError::MalformedDataRow {
            line: e.position().map(|p| p.line()).unwrap_or(0),
            reason: e.to_string(),
        })?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let malformed = |reason: String| VolumeError::MalformedDataRow { line, reason };

        if record.len() != 3 + stats.len() {
            return Err(malformed(format!(
                "expected {} fields (x, y, z and {} values), found {}",
                3 + stats.len(),
                stats.len(),
                record.len()
            )));
        }

        let mut index = [0usize; 3];
        for (i, slot) in index.iter_mut().enumerate() {
            let field = &record[i];
            *slot = field
                .parse()
                .map_err(|_| malformed(format!("'{field}' is not a voxel index")))?;
        }
        let (x, y, z) = (index[0], index[1], index[2]);
        if x >= shape.0 || y >= shape.1 || z >= shape.2 {
            return Err(malformed(format!(
                "voxel ({x}, {y}, {z}) is outside the {shape:?} grid"
            )));
        }

        for (array, field) in arrays.iter_mut().zip(record.iter().skip(3)) {
            array[[x, y, z]] = field
                .parse()
                .map_err(|_| malformed(format!("'{field}' is not a number")))?;
        }
    }

    Ok(arrays)
}

#[cfg(test)]
mod tests {
    use super::*;

    const PARAMS: &str = "\
d:Ge/Phantom/TransX = 0 cm
d:Ge/Phantom/TransY = 10 mm
d:Ge/Phantom/TransZ = -1 cm
d:Ge/Phantom/HLX = 1 cm
d:Ge/Phantom/HLY = 1 cm
d:Ge/Phantom/HLZ = 15 mm
";

    fn header(stats: &str) -> String {
        format!(
            "# Scored in component: Phantom\n\
             # X in 2 bins of 1 cm\n\
             # Y in 1 bins of 2 cm\n\
             # Z in 3 bins of 1 cm\n\
             # DoseToMedium ( Gy ) : {stats}\n"
        )
    }

    fn build(text: &str) -> Result<Volume> {
        build_volume(
            PathBuf::from("inline.csv"),
            text,
            ResultHeader::parse(text),
            ParameterFile::parse(PARAMS),
        )
    }

    #[test]
    fn axes_follow_component_placement() {
        let volume = build(&header("Sum")).unwrap();

        let x = volume.axis(Axis::X);
        assert_eq!(x.start_cm, vec![-1.0, 0.0]);
        assert_eq!(x.center_cm, vec![-0.5, 0.5]);
        assert_eq!(x.extent_cm, (-1.0, 1.0));

        let y = volume.axis(Axis::Y);
        assert_eq!(y.start_cm, vec![0.0]);
        assert_eq!(y.center_cm, vec![1.0]);

        let z = volume.axis(Axis::Z);
        assert_eq!(z.start_cm, vec![-2.5, -1.5, -0.5]);
        assert_eq!(z.extent_cm, (-2.5, 0.5));
    }

    #[test]
    fn rows_fill_stats_in_header_order() {
        let text = header("Sum Mean") + "1, 0, 2, 4.5, 0.5\n0, 0, 0, 1e-3, 2\n";
        let volume = build(&text).unwrap();
        let sum = volume.data("Sum").unwrap();
        let mean = volume.data("Mean").unwrap();
        assert_eq!(sum.shape(), &[2, 1, 3]);
        // z reversed: file z=2 is stored at 0
        assert_eq!(sum[[1, 0, 0]], 4.5);
        assert_eq!(mean[[1, 0, 0]], 0.5);
        assert_eq!(sum[[0, 0, 2]], 1e-3);
        assert_eq!(mean[[0, 0, 2]], 2.0);
        assert_eq!(sum[[0, 0, 0]], 0.0);
    }

    #[test]
    fn wrong_field_count_fails() {
        let text = header("Sum Mean") + "0, 0, 0, 1.0\n";
        let err = build(&text).unwrap_err();
        assert!(matches!(err, VolumeError::MalformedDataRow { .. }), "{err}");
    }

    #[test]
    fn non_numeric_value_fails() {
        let text = header("Sum") + "0, 0, 0, nope\n";
        assert!(matches!(build(&text), Err(VolumeError::MalformedDataRow { .. })));
        let text = header("Sum") + "0, a, 0, 1\n";
        assert!(matches!(build(&text), Err(VolumeError::MalformedDataRow { .. })));
    }

    #[test]
    fn voxel_outside_grid_fails() {
        let text = header("Sum") + "2, 0, 0, 1.0\n";
        assert!(matches!(build(&text), Err(VolumeError::MalformedDataRow { .. })));
    }

    #[test]
    fn oversized_grid_fails_before_allocating() {
        let text = "# Scored in component: Phantom\n\
                    # X in 3000000 bins of 1 cm\n\
                    # Y in 3000000 bins of 1 cm\n\
                    # Z in 3000000 bins of 1 cm\n\
                    # DoseToMedium ( Gy ) : Sum\n";
        let err = build(text).unwrap_err();
        assert!(
            matches!(err, VolumeError::GridTooLarge { shape: (3000000, 3000000, 3000000) }),
            "{err}"
        );
    }

    #[test]
    fn empty_axis_does_not_hide_an_oversized_one() {
        let huge = usize::MAX / 2;
        assert!(matches!(
            check_grid((huge, 0, 1)),
            Err(VolumeError::GridTooLarge { .. })
        ));
        assert!(check_grid((2, 1, 3)).is_ok());
        assert!(check_grid((0, 0, 0)).is_ok());
    }

    #[test]
    fn missing_component_fails() {
        let text = header("Sum").replace("Phantom", "Tank");
        let err = build(&text).unwrap_err();
        assert!(matches!(
            err,
            VolumeError::MissingGeometryComponent { ref component, key: None } if component == "Tank"
        ));
    }

    #[test]
    fn missing_half_length_fails() {
        let err = build_volume(
            PathBuf::from("inline.csv"),
            "",
            ResultHeader::parse(&header("Sum")),
            ParameterFile::parse("d:Ge/Phantom/TransX = 0 cm\nd:Ge/Phantom/TransY = 0 cm\n"),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            VolumeError::MissingGeometryComponent { key: Some(ref k), .. } if k == "HLX"
        ));
    }

    #[test]
    fn resolve_keeps_existing_or_absolute_paths() {
        let absolute = std::env::temp_dir().join("params.txt");
        let written = absolute.to_string_lossy().into_owned();
        assert_eq!(resolve_parameter_file(Path::new("/data/run/out.csv"), &written), absolute);
        assert_eq!(
            resolve_parameter_file(Path::new("/data/run/out.csv"), "no-such-params.txt"),
            PathBuf::from("no-such-params.txt")
        );
    }
}
