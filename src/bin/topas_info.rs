use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use serde::Serialize;

use topas_viewer::data::header::ResultHeader;
use topas_viewer::data::params::Component;
use topas_viewer::{load_volume, Axis};

#[derive(Serialize)]
struct AxisSummary {
    axis: Axis,
    bins: usize,
    bin_size_cm: f64,
    extent_cm: (f64, f64),
}

#[derive(Serialize)]
struct StatSummary {
    stat: String,
    min: f64,
    max: f64,
    sum: f64,
}

#[derive(Serialize)]
struct Summary<'a> {
    file: String,
    header: &'a ResultHeader,
    geometry: Option<&'a Component>,
    axes: Vec<AxisSummary>,
    stats: Vec<StatSummary>,
}

/// Print a JSON summary of a results file: header, scored component,
/// axis extents and the range of every statistic.
fn main() -> Result<()> {
    env_logger::init();

    let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) else {
        bail!("usage: topas_info <results.csv>");
    };
    let volume = load_volume(&path).with_context(|| format!("reading {}", path.display()))?;
    let header = volume.header();

    let axes = Axis::ALL
        .iter()
        .map(|&axis| {
            let coords = volume.axis(axis);
            AxisSummary {
                axis,
                bins: coords.len(),
                bin_size_cm: coords.bin_size_cm,
                extent_cm: coords.extent_cm,
            }
        })
        .collect();

    let stats = volume
        .stats()
        .iter()
        .filter_map(|stat| {
            let data = volume.data(stat)?;
            Some(StatSummary {
                stat: stat.clone(),
                min: data.iter().copied().fold(f64::INFINITY, f64::min),
                max: data.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                sum: data.sum(),
            })
        })
        .collect();

    let summary = Summary {
        file: path.display().to_string(),
        header,
        geometry: volume.geometry_components().get(&header.scored_component),
        axes,
        stats,
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&summary).context("serialising summary")?
    );
    Ok(())
}
