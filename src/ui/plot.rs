use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot};

use data_sweeper::data::insight::CHART_COLUMNS;
use data_sweeper::data::{chart_series, Dataset};

use crate::color::series_color;

// ---------------------------------------------------------------------------
// Insight chart
// ---------------------------------------------------------------------------

/// Grouped bar chart of the first numeric columns, one group per row.
pub fn insight_chart(ui: &mut Ui, dataset: &Dataset) {
    let series = chart_series(dataset, CHART_COLUMNS);
    if series.is_empty() {
        ui.colored_label(
            Color32::from_rgb(230, 160, 0),
            "No numeric data available for visualization!",
        );
        return;
    }

    let count = series.len();
    let width = 0.8 / count as f64;

    let charts: Vec<BarChart> = series
        .iter()
        .enumerate()
        .map(|(k, s)| {
            // Centre the group of bars on the row index.
            let offset = (k as f64 - (count as f64 - 1.0) / 2.0) * width;
            let bars: Vec<Bar> = s
                .values
                .iter()
                .enumerate()
                .filter_map(|(row, v)| v.map(|v| Bar::new(row as f64 + offset, v).width(width)))
                .collect();
            BarChart::new(bars)
                .name(&s.name)
                .color(series_color(k, count))
        })
        .collect();

    Plot::new("insight_chart")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_label("Row")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            for chart in charts {
                plot_ui.bar_chart(chart);
            }
        });
}
