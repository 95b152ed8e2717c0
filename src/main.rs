mod app;
mod color;
mod state;
mod ui;

use std::path::PathBuf;

use app::TopasViewerApp;
use eframe::egui;
use state::ViewerSettings;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = ViewerSettings::default();
    // Optional results file to open at start-up.
    let initial_file = std::env::args_os().nth(1).map(PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(settings.window_size)
            .with_min_inner_size([800.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "TOPAS Results Viewer",
        options,
        Box::new(move |_cc| Ok(Box::new(TopasViewerApp::new(settings, initial_file)))),
    )
}
