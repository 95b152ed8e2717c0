use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::model::Axis;

/// Everything that can go wrong while reading or querying a volume.
///
/// `HeaderFieldUnparsed` is soft: the header reader logs it and falls back to
/// the field's default, so it never escapes [`crate::load_volume`].
#[derive(Debug, Error)]
pub enum VolumeError {
    #[error("cannot read {path:?}: {source}")]
    FileNotReadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("unsupported length unit '{0}'")]
    UnsupportedUnit(String),

    #[error("scored component '{component}' has no usable geometry{}", key_suffix(.key))]
    MissingGeometryComponent {
        component: String,
        key: Option<String>,
    },

    #[error("malformed data row at line {line}: {reason}")]
    MalformedDataRow { line: u64, reason: String },

    #[error("could not parse {field} from header line '{line}'")]
    HeaderFieldUnparsed { field: &'static str, line: String },

    #[error("header declares a {shape:?} grid, too large to hold in memory")]
    GridTooLarge { shape: (usize, usize, usize) },

    #[error("statistic '{0}' is not present in this volume")]
    UnknownStatistic(String),

    #[error("bin {bin} is outside the {bins} bins of the {axis} axis")]
    BinOutOfRange { axis: Axis, bin: usize, bins: usize },
}

fn key_suffix(key: &Option<String>) -> String {
    key.as_deref()
        .map(|k| format!(" (key {k})"))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, VolumeError>;

impl VolumeError {
    pub(crate) fn unreadable(path: impl Into<PathBuf>, source: io::Error) -> Self {
        VolumeError::FileNotReadable {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn missing_key(component: &str, key: &str) -> Self {
        VolumeError::MissingGeometryComponent {
            component: component.to_string(),
            key: Some(key.to_string()),
        }
    }
}
