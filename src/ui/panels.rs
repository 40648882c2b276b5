use std::sync::Arc;

use eframe::egui::{self, Color32, RichText, ScrollArea, Slider, Ui};

use crate::config::{EXPORT_FILE_NAME, EXPORT_MIME};
use crate::data::filter::Column;
use crate::state::AppState;
use crate::ui::format::{format_pounds, format_thousands};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    // Hold our own handle so `state` can be mutated inside the loop.
    let Some(table) = state.table.as_ref().map(Arc::clone) else {
        ui.label("No dataset loaded.");
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Per-column multi-selects (collapsible) ----
            for column in Column::ALL {
                let all_values = column.domain(&table);
                if all_values.is_empty() {
                    // e.g. no rating column in the source
                    continue;
                }

                // Show count of selected / total in the header
                let n_selected = column.selection(&state.filters).len();
                let n_total = all_values.len();
                let header_text = format!("{}  ({n_selected}/{n_total})", column.label());

                egui::CollapsingHeader::new(RichText::new(header_text).strong())
                    .id_salt(column.label())
                    .default_open(false)
                    .show(ui, |ui: &mut Ui| {
                        ui.horizontal(|ui: &mut Ui| {
                            if ui.small_button("All").clicked() {
                                state.select_all(column);
                            }
                            if ui.small_button("None").clicked() {
                                state.select_none(column);
                            }
                        });

                        for val in all_values {
                            let mut text = RichText::new(val);
                            if column == Column::Rating {
                                text = text.color(state.rating_colors.color_for(Some(val.as_str())));
                            }

                            let mut checked = column.selection(&state.filters).contains(val);
                            if ui.checkbox(&mut checked, text).changed() {
                                state.toggle_filter_value(column, val);
                            }
                        }
                    });
            }
            ui.separator();

            // ---- Contract value range ----
            ui.strong("Contract Value (£)");
            match (table.value_bounds, state.filters.value_range) {
                (Some((min, max)), Some((mut lo, mut hi))) => {
                    let lo_changed = ui
                        .add(
                            Slider::new(&mut lo, min..=max)
                                .text("min")
                                .custom_formatter(|v, _| format_pounds(v)),
                        )
                        .changed();
                    let hi_changed = ui
                        .add(
                            Slider::new(&mut hi, min..=max)
                                .text("max")
                                .custom_formatter(|v, _| format_pounds(v)),
                        )
                        .changed();
                    if lo_changed || hi_changed {
                        // The min handle pushes max along; max stops at min.
                        if lo_changed && lo > hi {
                            hi = lo;
                        }
                        state.set_value_range(lo, hi);
                    }
                }
                _ => {
                    ui.label("No numeric contract values.");
                }
            }
            ui.separator();

            if ui.button("Reset filters").clicked() {
                state.reset_filters();
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
            if ui.button("Open workbook…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.table.is_some(), egui::Button::new("Export CSV…"))
                .clicked()
            {
                save_csv_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} contract rows loaded from {}, {} provider rows shown",
                format_thousands(table.len() as f64),
                state.settings.path.display(),
                format_thousands(state.rows.len() as f64)
            ));
            if table.coercion_failures > 0 {
                ui.label(
                    RichText::new(format!("{} non-numeric contract values ignored", table.coercion_failures))
                        .weak(),
                );
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            let color = if msg.starts_with("Exported") {
                Color32::DARK_GREEN
            } else {
                Color32::RED
            };
            ui.label(RichText::new(msg).color(color));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open contract data")
        .add_filter("Supported files", &["xlsx", "xlsm", "csv", "json", "parquet", "pq"])
        .add_filter("Excel workbook", &["xlsx", "xlsm"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn save_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered aggregated data")
        .set_file_name(EXPORT_FILE_NAME)
        .add_filter(format!("CSV ({EXPORT_MIME})"), &["csv"])
        .save_file();

    if let Some(path) = file {
        state.export_to(&path);
    }
}
