use eframe::egui::{ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use data_sweeper::data::{preview, Dataset};
use data_sweeper::data::insight::PREVIEW_ROWS;

// ---------------------------------------------------------------------------
// Quick data preview
// ---------------------------------------------------------------------------

/// Render the first rows of `dataset` as a striped table.
pub fn preview_table(ui: &mut Ui, dataset: &Dataset) {
    if dataset.num_columns() == 0 {
        ui.label("No columns.");
        return;
    }
    let head = preview(dataset, PREVIEW_ROWS);

    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .vscroll(false)
            .columns(TableColumn::auto().at_least(60.0), head.num_columns())
            .header(20.0, |mut header| {
                for column in head.columns() {
                    header.col(|ui: &mut Ui| {
                        ui.strong(format!("{} ({})", column.name, column.kind));
                    });
                }
            })
            .body(|mut body| {
                for row in 0..head.num_rows() {
                    body.row(18.0, |mut table_row| {
                        for column in head.columns() {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(column.values[row].to_string());
                            });
                        }
                    });
                }
            });
    });

    ui.label(format!(
        "{} rows × {} columns",
        dataset.num_rows(),
        dataset.num_columns()
    ));
}
