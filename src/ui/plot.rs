use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};
use vgsales_viewer::data::aggregate::{GroupSum, RegionTotals};
use vgsales_viewer::data::model::{Field, Record, SalesField};

use crate::color::{sales_color, ColorMap};

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Top sellers – horizontal bars, best at the top
// ---------------------------------------------------------------------------

pub fn top_sellers_chart(
    ui: &mut Ui,
    records: &[Record],
    by: SalesField,
    genre_colors: Option<&ColorMap>,
) {
    let n = records.len();
    let bars: Vec<Bar> = records
        .iter()
        .enumerate()
        .map(|(i, rec)| {
            let color = genre_colors
                .map(|cm| cm.color_for(&rec.value(Field::Genre)))
                .unwrap_or(Color32::LIGHT_BLUE);
            Bar::new((n - i) as f64, rec.sales(by))
                .name(format!("{} ({}, {})", rec.name, rec.platform, rec.genre))
                .fill(color)
                .width(0.8)
        })
        .collect();

    Plot::new("top_sellers")
        .height(CHART_HEIGHT)
        .x_axis_label(format!("{} (millions)", by.label()))
        .show_axes([true, false])
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal().name(by.label()));
        });
}

// ---------------------------------------------------------------------------
// Regional split – one bar per region
// ---------------------------------------------------------------------------

pub fn region_chart(ui: &mut Ui, id: &str, totals: &RegionTotals) {
    Plot::new(id)
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Sales (millions)")
        .show_axes([false, true])
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for (i, region) in SalesField::REGIONS.into_iter().enumerate() {
                let bar = Bar::new(i as f64, totals.get(region))
                    .name(region.label())
                    .width(0.7);
                plot_ui.bar_chart(
                    BarChart::new(vec![bar])
                        .color(sales_color(region))
                        .name(region.label()),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Genre popularity – regional sums stacked per genre
// ---------------------------------------------------------------------------

pub fn stacked_groups_chart(ui: &mut Ui, groups: &[GroupSum], fields: &[SalesField]) {
    let mut charts: Vec<BarChart> = Vec::with_capacity(fields.len());
    for (j, &field) in fields.iter().enumerate() {
        let bars: Vec<Bar> = groups
            .iter()
            .enumerate()
            .map(|(i, g)| {
                Bar::new(i as f64, g.sums[j])
                    .name(g.key.to_string())
                    .width(0.7)
            })
            .collect();
        let mut chart = BarChart::new(bars)
            .color(sales_color(field))
            .name(field.label());
        if !charts.is_empty() {
            let below: Vec<&BarChart> = charts.iter().collect();
            chart = chart.stack_on(&below);
        }
        charts.push(chart);
    }

    Plot::new("stacked_groups")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .y_axis_label("Sales (millions)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}

// ---------------------------------------------------------------------------
// Sales trend – yearly totals as a line
// ---------------------------------------------------------------------------

/// Groups keyed by year; the unknown-year group is left off the axis.
pub fn trend_line(ui: &mut Ui, groups: &[GroupSum], field: SalesField) {
    let points: PlotPoints = groups
        .iter()
        .filter_map(|g| Some([g.key.as_f64()?, g.sums[0]]))
        .collect();

    Plot::new("sales_trend")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Sales (millions)")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(points)
                    .name(field.label())
                    .color(sales_color(field))
                    .width(2.0),
            );
        });
}
