use eframe::egui::{self, Color32, Ui};
use vgsales_viewer::console::columns_for;
use vgsales_viewer::data::aggregate::{Decade, GroupSum, Overview};
use vgsales_viewer::data::model::{Field, SalesField};
use vgsales_viewer::engine::{Request, Response};

use crate::state::{AppState, PageParams, SalesFilter, Section};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Central panel – one page per section
// ---------------------------------------------------------------------------

/// Render the current section: its inputs, then its result.
pub fn central_panel(ui: &mut Ui, state: &mut AppState) {
    if state.engine.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view sales  (File → Open…)");
        });
        return;
    }

    ui.heading(state.section.title());
    ui.separator();

    let bounds = state.year_bounds;
    controls(ui, state.section, &mut state.params, bounds, &state.game_names);
    ui.separator();

    let Some(request) = state.current_request() else {
        ui.label("Enter a value above to run the query.");
        return;
    };
    let response = match state.result() {
        Some(Ok(response)) => response,
        Some(Err(e)) => {
            ui.colored_label(Color32::YELLOW, format!("Warning: {e}"));
            return;
        }
        None => return,
    };

    show_response(ui, state, &request, &response);
}

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

fn controls(
    ui: &mut Ui,
    section: Section,
    p: &mut PageParams,
    (first_year, last_year): (i32, i32),
    game_names: &[String],
) {
    match section {
        Section::Overview | Section::SalesTrend => {}

        Section::Releases => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Year");
                ui.add(egui::DragValue::new(&mut p.year).range(first_year..=last_year));
            });
        }

        Section::SalesFilters => {
            egui::ComboBox::from_id_salt("sales_filter")
                .selected_text(p.sales_filter.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for filter in SalesFilter::ALL {
                        ui.selectable_value(&mut p.sales_filter, filter, filter.label());
                    }
                });
            sales_filter_controls(ui, p, game_names);
        }

        Section::TopGames => {
            ui.horizontal(|ui: &mut Ui| {
                ui.add(egui::Slider::new(&mut p.top_n, 1..=50).text("games"));
                ui.label("ranked by");
                sales_field_combo(ui, "top_by", &mut p.top_by, &SalesField::ALL);
            });
            ui.label("Narrow by platform, genre or publisher in the side panel.");
        }

        Section::RegionsByDecade => {
            egui::ComboBox::from_id_salt("decade")
                .selected_text(p.decade.label())
                .show_ui(ui, |ui: &mut Ui| {
                    for decade in Decade::ALL {
                        ui.selectable_value(&mut p.decade, decade, decade.label());
                    }
                });
        }

        Section::GenrePopularity => {
            ui.add(egui::Slider::new(&mut p.year_from, first_year..=last_year).text("from"));
            ui.add(egui::Slider::new(&mut p.year_to, first_year..=last_year).text("to"));
        }

        Section::GameSearch => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Name contains");
                ui.text_edit_singleline(&mut p.search);
            });
        }
    }
}

fn sales_filter_controls(ui: &mut Ui, p: &mut PageParams, game_names: &[String]) {
    match p.sales_filter {
        SalesFilter::ByPublisher => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Publisher contains");
                ui.text_edit_singleline(&mut p.publisher);
            });
        }
        SalesFilter::AboveRegionalSales => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Any region above");
                min_sales_value(ui, &mut p.min_sales);
            });
        }
        SalesFilter::ByRegion => {
            ui.horizontal(|ui: &mut Ui| {
                ui.label("Publisher contains");
                ui.text_edit_singleline(&mut p.publisher);
                ui.label("Region");
                sales_field_combo(ui, "region", &mut p.region, &SalesField::REGIONS);
            });
            ui.horizontal(|ui: &mut Ui| {
                ui.checkbox(&mut p.use_min_sales, "Only above");
                min_sales_value(ui, &mut p.min_sales);
            });
        }
        SalesFilter::GlobalSales => {
            ui.horizontal(|ui: &mut Ui| {
                ui.checkbox(&mut p.use_min_sales, "Only games above");
                min_sales_value(ui, &mut p.min_sales);
            });
        }
        SalesFilter::BestSellers => {
            ui.horizontal(|ui: &mut Ui| {
                ui.checkbox(&mut p.use_best_count, "Show the top");
                ui.add(egui::DragValue::new(&mut p.best_count).range(1..=100));
            });
        }
        SalesFilter::ByName => {
            let selected = if p.game_name.is_empty() {
                "Pick a game"
            } else {
                p.game_name.as_str()
            };
            egui::ComboBox::from_id_salt("game_name")
                .selected_text(selected.to_string())
                .width(320.0)
                .height(400.0)
                .show_ui(ui, |ui: &mut Ui| {
                    for name in game_names {
                        ui.selectable_value(&mut p.game_name, name.clone(), name);
                    }
                });
        }
    }
}

fn min_sales_value(ui: &mut Ui, value: &mut f64) {
    ui.add(
        egui::DragValue::new(value)
            .speed(0.1)
            .range(0.0..=100.0)
            .suffix(" M"),
    );
}

fn sales_field_combo(ui: &mut Ui, id: &str, value: &mut SalesField, choices: &[SalesField]) {
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.label())
        .show_ui(ui, |ui: &mut Ui| {
            for &choice in choices {
                ui.selectable_value(value, choice, choice.label());
            }
        });
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

fn show_response(ui: &mut Ui, state: &AppState, request: &Request, response: &Response) {
    let section = state.section.title();
    match response {
        Response::Overview(ov) => overview_grid(ui, ov),

        Response::Records { records, global_total } => {
            if let Request::TopSellers { by, .. } = request {
                if state.section == Section::TopGames && !records.is_empty() {
                    plot::top_sellers_chart(ui, records, *by, state.genre_colors.as_ref());
                    ui.separator();
                }
            }
            ui.label(format!(
                "{} games | total global sales: {global_total:.2} million",
                records.len()
            ));
            table::records_table(ui, section, records, &columns_for(request));
        }

        Response::Record(rec) => {
            ui.label(format!("Best seller: {} ({:.2} million)", rec.name, rec.sales_global));
            table::records_table(ui, section, std::slice::from_ref(rec), &Field::ALL);
        }

        Response::Total(total) => {
            ui.heading(format!("Total global sales: {total:.2} million"));
        }

        Response::Groups { group_field: Field::Year, fields, groups } => {
            if let Some(&field) = fields.first() {
                plot::trend_line(ui, groups, field);
            }
            groups_grid(ui, Field::Year, fields, groups);
        }

        Response::Groups { group_field, fields, groups } => {
            plot::stacked_groups_chart(ui, groups, fields);
            groups_grid(ui, *group_field, fields, groups);
        }

        Response::Regions { label, totals } => {
            ui.label(format!("Regional sales for {label}: {:.2} million in total", totals.global));
            plot::region_chart(ui, "decade_regions", totals);
        }

        Response::Search { records, totals } => {
            ui.label(format!("{} matching games", records.len()));
            if !records.is_empty() {
                plot::region_chart(ui, "search_regions", totals);
            }
            table::records_table(ui, section, records, &columns_for(request));
        }

        Response::Frequencies { field, counts } => {
            egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
                egui::Grid::new("frequencies").num_columns(2).striped(true).show(ui, |ui: &mut Ui| {
                    ui.strong(field.header());
                    ui.strong("Games");
                    ui.end_row();
                    for (value, count) in counts {
                        ui.label(value.to_string());
                        ui.label(count.to_string());
                        ui.end_row();
                    }
                });
            });
        }
    }
}

fn overview_grid(ui: &mut Ui, ov: &Overview) {
    let years = match (ov.earliest_year, ov.latest_year) {
        (Some(a), Some(b)) => format!("{a} – {b}"),
        _ => "unknown".to_string(),
    };
    let rows = [
        ("Rows", ov.records.to_string()),
        ("Columns", ov.columns.to_string()),
        ("Unique titles", ov.unique_titles.to_string()),
        ("Release years", years),
        ("Mean global sales", format!("{:.2} million", ov.mean_global_sales)),
        ("Total global sales", format!("{:.2} million", ov.total_global_sales)),
    ];

    egui::Grid::new("overview").num_columns(2).striped(true).show(ui, |ui: &mut Ui| {
        for (label, value) in rows {
            ui.label(label);
            ui.strong(value);
            ui.end_row();
        }
        if let Some((publisher, count)) = &ov.top_publisher {
            ui.label("Publisher with most games");
            ui.strong(format!("{publisher} ({count})"));
            ui.end_row();
        }
    });
}

fn groups_grid(ui: &mut Ui, group_field: Field, fields: &[SalesField], groups: &[GroupSum]) {
    egui::ScrollArea::vertical().show(ui, |ui: &mut Ui| {
        groups_rows(ui, group_field, fields, groups)
    });
}

fn groups_rows(ui: &mut Ui, group_field: Field, fields: &[SalesField], groups: &[GroupSum]) {
    egui::Grid::new("groups")
        .num_columns(fields.len() + 2)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            ui.strong(group_field.header());
            ui.strong("Games");
            for field in fields {
                ui.strong(field.label());
            }
            ui.end_row();

            for g in groups {
                ui.label(g.key.to_string());
                ui.label(g.count.to_string());
                for sum in &g.sums {
                    ui.label(format!("{sum:.2}"));
                }
                ui.end_row();
            }
        });
}
