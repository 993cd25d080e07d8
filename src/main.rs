#![cfg_attr(not(debug_assertions), windows_subsystem = "windows")]

use roadmap_timeline::app::RoadmapApp;
use roadmap_timeline::config::TimelineConfig;
use tracing_subscriber::EnvFilter;

fn main() -> eframe::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("roadmap_timeline=info")),
        )
        .init();

    let config = TimelineConfig::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 400.0])
            .with_title("Roadmap Timeline"),
        ..Default::default()
    };

    eframe::run_native(
        "Roadmap Timeline",
        options,
        Box::new(|cc| Ok(Box::new(RoadmapApp::new(cc, config)?))),
    )
}
