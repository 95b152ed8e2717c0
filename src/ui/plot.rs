use eframe::egui::{self, RichText, Ui};
use egui_plot::{Plot, PlotImage, PlotPoint};

use topas_viewer::Axis;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Orthogonal slice views (central panel)
// ---------------------------------------------------------------------------

/// Render the three views side by side.
pub fn orthogonal_views(ui: &mut Ui, state: &AppState) {
    if state.volume.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a results file to view slices  (File → Open…)");
        });
        return;
    }

    ui.columns(3, |columns| {
        for (ui, axis) in columns.iter_mut().zip(Axis::ALL) {
            slice_plot(ui, state, axis);
        }
    });
}

/// One view: the slice through the fixed `axis`, drawn over its physical extent.
fn slice_plot(ui: &mut Ui, state: &AppState, axis: Axis) {
    let Some(view) = state.view(axis) else {
        ui.label(format!("No {axis} slice"));
        return;
    };
    let cut = &view.slice;

    ui.label(RichText::new(&view.title).small());

    let (left, right) = cut.column_extent_cm;
    let (bottom, top) = cut.row_extent_cm;
    let image = PlotImage::new(
        view.texture.id(),
        PlotPoint::new((left + right) / 2.0, (bottom + top) / 2.0),
        egui::vec2((right - left) as f32, (top - bottom) as f32),
    );

    Plot::new(format!("slice_plot_{axis}"))
        .data_aspect(1.0)
        .x_axis_label(cut.column_label())
        .y_axis_label(cut.row_label())
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            plot_ui.image(image);
        });
}
