//! Reading TOPAS cartesian scorer results into volumetric arrays with
//! physical axes.
//!
//! The [`data`] module is the whole of the reusable core; the viewer binary
//! only consumes [`data::model::Volume`] and the helpers in [`data::slice`].

pub mod data;

pub use data::error::{Result, VolumeError};
pub use data::loader::load_volume;
pub use data::model::{Axis, Volume};
pub use data::slice::{bin_for_coordinate, slice, BinIndex, Slice};
