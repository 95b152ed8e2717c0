use std::path::PathBuf;

use eframe::egui;

use crate::state::{AppState, ViewerSettings};
use crate::ui::{panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct TopasViewerApp {
    pub state: AppState,
}

impl TopasViewerApp {
    pub fn new(settings: ViewerSettings, initial_file: Option<PathBuf>) -> Self {
        let mut state = AppState::new(settings);
        if let Some(path) = initial_file {
            state.open(&path);
        }
        Self { state }
    }
}

impl eframe::App for TopasViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.refresh(ctx);

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: slice controls ----
        egui::SidePanel::left("slice_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Right side panel: colour bar ----
        egui::SidePanel::right("color_bar")
            .exact_width(64.0)
            .resizable(false)
            .show(ctx, |ui| {
                panels::color_bar(ui, &self.state);
            });

        // ---- Central panel: orthogonal views ----
        egui::CentralPanel::default().show(ctx, |ui| {
            plot::orthogonal_views(ui, &self.state);
        });
    }
}
