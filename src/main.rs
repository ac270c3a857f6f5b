mod app;
mod state;
mod ui;

use std::path::PathBuf;

use app::DistanceViewerApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let mut app = DistanceViewerApp::default();
    // Optional project or links file to open on start-up.
    if let Some(path) = std::env::args_os().nth(1).map(PathBuf::from) {
        app.state.open(&path);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 720.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Graphab Distance – Cost Conversion",
        options,
        Box::new(|_cc| Ok(Box::new(app))),
    )
}
