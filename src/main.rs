mod app;
mod color;
mod state;
mod ui;

use app::VgSalesApp;
use clap::Parser;
use eframe::egui;
use vgsales_viewer::config::{CommonArgs, Settings};

/// Interactive dashboard over a video-game sales table.
#[derive(Parser)]
#[command(name = "vgsales-viewer", about = "Video-game sales dashboard")]
struct Cli {
    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> eframe::Result {
    env_logger::init();
    let settings = Settings::from(Cli::parse().common);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "VG Sales – Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(VgSalesApp::new(settings)))),
    )
}
