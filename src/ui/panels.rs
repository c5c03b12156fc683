use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use data_sweeper::data::{CleaningOp, ExportTarget, ExportedFile};

use crate::state::{AppState, FileSession, Notice};
use crate::ui::{plot, table};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_files_dialog(state);
                ui.close_menu();
            }
            if ui.button("Close all").clicked() {
                state.clear();
                ui.close_menu();
            }
        });

        ui.separator();

        if !state.sessions.is_empty() {
            ui.label(format!("{} file(s) loaded", state.sessions.len()));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – uploaded files
// ---------------------------------------------------------------------------

/// List loaded files and the ones that failed to load.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Files");
    ui.separator();

    if ui.button("📥 Upload CSV / Excel…").clicked() {
        open_files_dialog(state);
    }
    ui.add_space(4.0);

    let mut close: Option<usize> = None;
    for (i, session) in state.sessions.iter().enumerate() {
        ui.horizontal(|ui: &mut Ui| {
            if ui.small_button("✖").on_hover_text("Close").clicked() {
                close = Some(i);
            }
            ui.label(session.summary.file_name.as_str());
        });
    }
    if let Some(i) = close {
        state.remove(i);
    }

    if !state.failures.is_empty() {
        ui.separator();
        ui.strong("Skipped");
        for failure in &state.failures {
            ui.label(RichText::new(&failure.file_name).color(Color32::RED))
                .on_hover_text(failure.message.as_str());
        }
    }
}

// ---------------------------------------------------------------------------
// Central panel – one section per file
// ---------------------------------------------------------------------------

pub fn file_sections(ui: &mut Ui, state: &mut AppState) {
    if state.sessions.is_empty() && state.failures.is_empty() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Upload CSV or Excel files to get started  (File → Open…)");
        });
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for failure in &state.failures {
                ui.colored_label(
                    Color32::RED,
                    format!("Error reading `{}`: {}", failure.file_name, failure.message),
                );
            }

            for (i, session) in state.sessions.iter_mut().enumerate() {
                ui.push_id(i, |ui: &mut Ui| file_section(ui, session));
                ui.separator();
            }

            if !state.sessions.is_empty() {
                ui.label(RichText::new("All files processed. Ready for the next task?").strong());
            }
        });
}

fn file_section(ui: &mut Ui, session: &mut FileSession) {
    let name = session.summary.file_name.clone();

    // ---- File details ----
    ui.heading(format!("File: {name}"));
    ui.label(format!("Size: {} KB", session.summary.size_kb()));
    ui.label(format!("Format: {}", session.summary.format));
    ui.add_space(4.0);

    // ---- Preview ----
    ui.strong("Quick data preview");
    table::preview_table(ui, &session.view);
    ui.add_space(4.0);

    // ---- Cleaning ----
    egui::CollapsingHeader::new(RichText::new("Data cleaning options").strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            let mut enabled = session.cleaning_enabled;
            if ui
                .checkbox(&mut enabled, format!("Enable cleaning for `{name}`"))
                .changed()
            {
                session.cleaning_enabled = enabled;
                session.refresh();
            }
            if session.cleaning_enabled {
                ui.horizontal(|ui: &mut Ui| {
                    for op in CleaningOp::ALL {
                        let mut on = match op {
                            CleaningOp::RemoveDuplicates => session.remove_duplicates,
                            CleaningOp::FillMissingNumeric => session.fill_missing,
                        };
                        if ui.checkbox(&mut on, op.to_string()).changed() {
                            session.set_cleaning(op, on);
                        }
                    }
                });
            }
        });

    // ---- Column selection ----
    egui::CollapsingHeader::new(RichText::new("Select columns for export").strong())
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            let columns = session.source.column_names();
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for col in &columns {
                    let mut checked = session.selected.contains(col);
                    if ui.checkbox(&mut checked, col.as_str()).changed() {
                        session.toggle_column(col);
                    }
                }
            });
            if session.selected.is_empty() {
                ui.label("Nothing ticked: every column will be exported.");
            }
        });

    // ---- Insights ----
    ui.checkbox(
        &mut session.show_insights,
        format!("Generate insights for `{name}`"),
    );
    if session.show_insights {
        plot::insight_chart(ui, &session.view);
    }

    // ---- Export ----
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Convert to:");
        ui.radio_value(&mut session.target, ExportTarget::Csv, ExportTarget::Csv.label());
        ui.radio_value(
            &mut session.target,
            ExportTarget::Spreadsheet,
            ExportTarget::Spreadsheet.label(),
        );
        if ui.button(format!("Convert `{name}` now")).clicked() {
            session.notice = Some(match session.export() {
                Ok(file) => save_file_dialog(&file, session.target),
                Err(e) => {
                    log::error!("Export of `{name}` failed: {e}");
                    Notice::Error(e.to_string())
                }
            });
        }
    });

    match &session.notice {
        Some(Notice::Success(msg)) => {
            ui.colored_label(Color32::from_rgb(0, 160, 60), msg.as_str());
        }
        Some(Notice::Error(msg)) => {
            ui.colored_label(Color32::RED, msg.as_str());
        }
        None => {}
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_files_dialog(state: &mut AppState) {
    let files = rfd::FileDialog::new()
        .set_title("Upload data files")
        .add_filter("Supported files", &["csv", "xlsx"])
        .add_filter("CSV", &["csv"])
        .add_filter("Excel", &["xlsx"])
        .pick_files();

    if let Some(paths) = files {
        state.open_paths(&paths);
    }
}

/// Ask where to save an exported file and write it there.
fn save_file_dialog(file: &ExportedFile, target: ExportTarget) -> Notice {
    let Some(path) = rfd::FileDialog::new()
        .set_title("Download converted file")
        .set_file_name(&file.file_name)
        .add_filter(target.label(), &[target.extension()])
        .save_file()
    else {
        return Notice::Error("Download cancelled".to_string());
    };

    match std::fs::write(&path, &file.bytes) {
        Ok(()) => {
            log::info!("Saved {} ({}) to {}", file.file_name, file.mime, path.display());
            Notice::Success(format!(
                "Converted to {target} and saved to {}",
                path.display()
            ))
        }
        Err(e) => {
            log::error!("Failed to write {}: {e}", path.display());
            Notice::Error(format!("Error during conversion: {e}"))
        }
    }
}
