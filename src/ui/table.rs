use std::hash::Hash;

use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};
use vgsales_viewer::data::model::{Field, Record};

/// Scrollable table of `records`, one column per entry of `columns`.
/// `id_salt` keeps column widths apart between pages.
pub fn records_table(ui: &mut Ui, id_salt: impl Hash, records: &[Record], columns: &[Field]) {
    if records.is_empty() {
        ui.label("No matching games.");
        return;
    }

    ui.push_id(id_salt, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .columns(Column::auto().at_least(60.0), columns.len())
            .min_scrolled_height(0.0)
            .header(20.0, |mut header| {
                for field in columns {
                    header.col(|ui: &mut Ui| {
                        ui.strong(field.header());
                    });
                }
            })
            .body(|body| {
                body.rows(18.0, records.len(), |mut row| {
                    let rec = &records[row.index()];
                    for &field in columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(rec.display(field));
                        });
                    }
                });
            });
    });
}
