mod app;
mod color;
mod config;
mod data;
mod state;
mod ui;

use app::NelExplorerApp;
use config::Settings;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let settings = Settings::from_args(std::env::args().skip(1));
    log::info!("Data source: {} [{}]", settings.path.display(), settings.sheet);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "NEL Contract & Provider Explorer",
        options,
        Box::new(move |_cc| {
            // Load synchronously before the first frame; the base table never changes afterwards.
            Ok(Box::new(NelExplorerApp::new(settings)))
        }),
    )
}
