use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use vgsales_viewer::data::model::{Field, FieldValue};

use crate::state::{AppState, Section};

// ---------------------------------------------------------------------------
// Left side panel – navigation and Top Games selection
// ---------------------------------------------------------------------------

/// Columns offered as multi-selects on the Top Games page.
const SELECTABLE: [Field; 3] = [Field::Platform, Field::Genre, Field::Publisher];

/// Render the left panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Sections");
    ui.separator();

    for section in Section::ALL {
        if ui
            .selectable_label(state.section == section, section.title())
            .clicked()
        {
            state.section = section;
        }
    }

    if state.section != Section::TopGames {
        return;
    }

    ui.add_space(8.0);
    ui.heading("Filters");
    ui.separator();

    let Some(engine) = &state.engine else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let choices: Vec<(Field, Vec<FieldValue>)> = SELECTABLE
        .into_iter()
        .map(|column| (column, engine.dataset().distinct_values(column)))
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (column, all_values) in &choices {
                let column = *column;

                let n_selected = state
                    .params
                    .selection
                    .get(&column)
                    .map_or(0, |s| s.len());
                let header_text = format!("{column}  ({n_selected}/{})", all_values.len());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column)
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        if ui.small_button("Clear").clicked() {
                            state.params.selection.remove(&column);
                        }

                        ScrollArea::vertical()
                            .id_salt(column)
                            .max_height(240.0)
                            .show(ui, |ui: &mut Ui| {
                                for val in all_values {
                                    let mut checked = state
                                        .params
                                        .selection
                                        .get(&column)
                                        .is_some_and(|s| s.contains(val));

                                    // Genre entries carry their chart colour.
                                    let mut text = RichText::new(val.to_string());
                                    if column == Field::Genre {
                                        if let Some(cm) = &state.genre_colors {
                                            text = text.color(cm.color_for(val));
                                        }
                                    }

                                    if ui.checkbox(&mut checked, text).changed() {
                                        state.toggle_selection(column, val);
                                    }
                                }
                            });
                    });
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Export CSV…").clicked() {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(engine) = &state.engine {
            ui.label(format!("{} games loaded", engine.dataset().len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export current rows")
        .add_filter("CSV", &["csv"])
        .set_file_name("export.csv")
        .save_file();

    if let Some(path) = file {
        state.export_current(&path);
    }
}
