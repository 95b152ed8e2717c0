use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use eframe::egui::{self, TextureHandle, TextureOptions};

use topas_viewer::data::slice::{bin_for_coordinate, middle_cm, slice, BinIndex, Slice};
use topas_viewer::{load_volume, Axis, Volume};

use crate::color;

// ---------------------------------------------------------------------------
// Settings
// ---------------------------------------------------------------------------

/// Start-up options of the viewer window.
pub struct ViewerSettings {
    pub window_size: [f32; 2],
    /// Initial folder of the file dialog (`TOPAS_RESULTS_DIR`).
    pub results_dir: Option<PathBuf>,
}

impl Default for ViewerSettings {
    fn default() -> Self {
        Self {
            window_size: [1600.0, 640.0],
            results_dir: std::env::var_os("TOPAS_RESULTS_DIR").map(PathBuf::from),
        }
    }
}

// ---------------------------------------------------------------------------
// One orthogonal view
// ---------------------------------------------------------------------------

pub struct SliceView {
    pub slice: Slice,
    pub title: String,
    /// Colour limits the texture was rendered with.
    pub clim: (f64, f64),
    pub texture: TextureHandle,
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub settings: ViewerSettings,

    /// Loaded volume (None until a file was read successfully).
    pub volume: Option<Volume>,

    /// Contents of the path entry in the top bar.
    pub path_input: String,

    /// Statistic shown in all three views.
    pub stat: Option<String>,

    /// Requested slice position along x, y, z in cm.
    pub positions_cm: [f64; 3],

    /// Contrast limits in percent of each view's maximum.
    pub contrast_min: f64,
    pub contrast_max: f64,

    /// Rendered views, indexed by the fixed axis.
    pub views: [Option<SliceView>; 3],

    /// Status message shown in the UI and whether it reports a failure.
    pub status_message: Option<String>,
    pub status_is_error: bool,

    dirty: bool,
}

impl AppState {
    pub fn new(settings: ViewerSettings) -> Self {
        Self {
            settings,
            volume: None,
            path_input: String::new(),
            stat: None,
            positions_cm: [0.0; 3],
            contrast_min: 0.0,
            contrast_max: 100.0,
            views: [None, None, None],
            status_message: None,
            status_is_error: false,
            dirty: false,
        }
    }

    /// Read a results file; failures are reported in the status line.
    pub fn open(&mut self, path: &Path) {
        self.path_input = path.display().to_string();
        match read(path) {
            Ok(volume) => {
                self.set_volume(volume);
                self.status_message = Some("File read successfully".to_string());
                self.status_is_error = false;
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                self.volume = None;
                self.views = [None, None, None];
                self.status_message = Some("Error reading file".to_string());
                self.status_is_error = true;
            }
        }
    }

    /// Ingest a newly loaded volume and centre all three views.
    pub fn set_volume(&mut self, volume: Volume) {
        self.stat = volume.stats().first().cloned();
        for axis in Axis::ALL {
            self.positions_cm[axis.index()] = middle_cm(&volume, axis).unwrap_or(0.0);
        }
        self.contrast_min = 0.0;
        self.contrast_max = 100.0;
        self.volume = Some(volume);
        self.dirty = true;
    }

    pub fn select_stat(&mut self, stat: String) {
        self.stat = Some(stat);
        self.dirty = true;
    }

    pub fn set_position(&mut self, axis: Axis, cm: f64) {
        self.positions_cm[axis.index()] = cm;
        self.dirty = true;
    }

    pub fn set_contrast(&mut self, min_percent: f64, max_percent: f64) {
        self.contrast_min = min_percent;
        self.contrast_max = max_percent;
        self.dirty = true;
    }

    pub fn view(&self, axis: Axis) -> Option<&SliceView> {
        self.views[axis.index()].as_ref()
    }

    /// Re-cut and re-upload every view after a change.
    pub fn refresh(&mut self, ctx: &egui::Context) {
        if !self.dirty {
            return;
        }
        self.dirty = false;

        let (Some(volume), Some(stat)) = (&self.volume, &self.stat) else {
            self.views = [None, None, None];
            return;
        };

        for axis in Axis::ALL {
            let cm = self.positions_cm[axis.index()];
            let bin = bin_for_coordinate(volume, axis, cm, true).and_then(BinIndex::discrete);
            let cut = match slice(volume, stat, axis, bin) {
                Ok(cut) => cut,
                Err(e) => {
                    log::warn!("No {axis} view: {e}");
                    self.views[axis.index()] = None;
                    continue;
                }
            };

            let clim = color::contrast_limits(&cut, self.contrast_min, self.contrast_max);
            let image = color::colorize(&cut.values, clim);
            let texture = match self.views[axis.index()].take() {
                Some(mut view) => {
                    view.texture.set(image, TextureOptions::NEAREST);
                    view.texture
                }
                None => ctx.load_texture(format!("slice-{axis}"), image, TextureOptions::NEAREST),
            };

            self.views[axis.index()] = Some(SliceView {
                title: cut.title(volume),
                slice: cut,
                clim,
                texture,
            });
        }
    }
}

fn read(path: &Path) -> Result<Volume> {
    load_volume(path).with_context(|| format!("reading {}", path.display()))
}
