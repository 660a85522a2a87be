use eframe::egui;
use vgsales_viewer::config::Settings;

use crate::state::AppState;
use crate::ui::{pages, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct VgSalesApp {
    pub state: AppState,
}

impl VgSalesApp {
    /// Start with the configured data file loaded, if it exists.
    pub fn new(settings: Settings) -> Self {
        let path = settings.data_path.clone();
        let mut state = AppState::new(settings);
        if path.exists() {
            state.load_path(&path);
        } else {
            log::info!("{} not found, waiting for File → Open", path.display());
        }
        Self { state }
    }
}

impl eframe::App for VgSalesApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: navigation + selection ----
        egui::SidePanel::left("nav_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: current page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            pages::central_panel(ui, &mut self.state);
        });
    }
}
