use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use topas_viewer::Axis;

use crate::color;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, path entry and load status.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        let entry = ui.add(
            egui::TextEdit::singleline(&mut state.path_input)
                .hint_text("results .csv")
                .desired_width(500.0),
        );
        if entry.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            let path = PathBuf::from(state.path_input.trim());
            state.open(&path);
        }

        if let Some(msg) = &state.status_message {
            let color = if state.status_is_error {
                Color32::RED
            } else {
                Color32::GREEN
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – statistic, slice positions, contrast
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Slices");
    ui.separator();

    let Some(volume) = &state.volume else {
        ui.label("No results loaded.");
        return;
    };

    // Copy out what the widgets need so state can be mutated below.
    let stats = volume.stats().to_vec();
    let ranges: Vec<(Axis, Option<(f64, f64)>, f64)> = Axis::ALL
        .iter()
        .map(|&axis| {
            let coords = volume.axis(axis);
            let range = coords.min_center().zip(coords.max_center());
            (axis, range, coords.bin_size_cm)
        })
        .collect();
    let header = volume.header().clone();
    let geometry = volume
        .geometry_components()
        .get(&header.scored_component)
        .cloned()
        .unwrap_or_default();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            ui.strong("Statistic");
            let current = state.stat.clone().unwrap_or_default();
            egui::ComboBox::from_id_salt("stat")
                .selected_text(&current)
                .show_ui(ui, |ui: &mut Ui| {
                    for stat in &stats {
                        if ui.selectable_label(current == *stat, stat).clicked() {
                            state.select_stat(stat.clone());
                        }
                    }
                });
            ui.separator();

            for (axis, range, step) in &ranges {
                let Some((lo, hi)) = *range else {
                    ui.label(format!("{axis}: no bins"));
                    continue;
                };
                let mut cm = state.positions_cm[axis.index()];
                let mut slider = egui::Slider::new(&mut cm, lo..=hi)
                    .text(format!("{axis} bin centre [cm]"));
                if *step > 0.0 {
                    slider = slider.step_by(*step);
                }
                if ui.add(slider).changed() {
                    state.set_position(*axis, cm);
                }
            }
            ui.separator();

            ui.strong("Contrast [% of max]");
            let mut min = state.contrast_min;
            let mut max = state.contrast_max;
            let min_changed = ui
                .add(egui::Slider::new(&mut min, 0.0..=100.0).step_by(1.0).text("Min"))
                .changed();
            let max_changed = ui
                .add(egui::Slider::new(&mut max, 0.0..=100.0).step_by(1.0).text("Max"))
                .changed();
            if min_changed || max_changed {
                state.set_contrast(min, max);
            }
            ui.separator();

            egui::CollapsingHeader::new(RichText::new("Header").strong())
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    let quantity = &header.scored_quantity;
                    ui.label(format!("TOPAS version: {}", header.topas_version));
                    ui.label(format!("Scorer: {}", header.scorer));
                    ui.label(format!("Component: {}", header.scored_component));
                    ui.label(format!("Quantity: {} [{}]", quantity.name, quantity.unit));
                    ui.label(format!("Bins: {:?}", header.shape()));
                    ui.label(format!("Parameter file: {}", header.parameter_file));
                });

            egui::CollapsingHeader::new(RichText::new("Geometry").strong())
                .default_open(false)
                .show(ui, |ui: &mut Ui| {
                    for (key, value) in &geometry {
                        ui.label(format!("{key} = {value}"));
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Right side panel – colour bar of the x view
// ---------------------------------------------------------------------------

pub fn color_bar(ui: &mut Ui, state: &AppState) {
    let Some(view) = state.view(Axis::X) else {
        return;
    };
    let (lo, hi) = view.clim;

    ui.label(RichText::new(format!("{hi:.1e}")).small());
    let height = (ui.available_height() - 24.0).max(40.0);
    let (rect, _) = ui.allocate_exact_size(egui::vec2(20.0, height), egui::Sense::hover());
    let steps = color::color_bar_steps(64);
    let step_height = rect.height() / steps.len() as f32;
    for (i, c) in steps.iter().enumerate() {
        // lowest colour at the bottom
        let top = rect.bottom() - (i + 1) as f32 * step_height;
        let band = egui::Rect::from_min_size(
            egui::pos2(rect.left(), top),
            egui::vec2(rect.width(), step_height + 0.5),
        );
        ui.painter().rect_filled(band, 0.0, *c);
    }
    ui.label(RichText::new(format!("{lo:.1e}")).small());
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let mut dialog = rfd::FileDialog::new()
        .set_title("Select a topas csv file")
        .add_filter("Comma-separated values", &["csv"])
        .add_filter("All files", &["*"]);
    if let Some(dir) = &state.settings.results_dir {
        dialog = dialog.set_directory(dir);
    }

    if let Some(path) = dialog.pick_file() {
        state.open(&path);
    }
}
