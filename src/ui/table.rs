use eframe::egui::{self, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::color::ColorMap;
use crate::config::{AGGREGATE_COLUMNS, COL_CONTRACT_VALUE, COL_PROVIDER};
use crate::data::model::{ProviderAggregate, ProviderTotal};
use crate::ui::format::format_pounds;

const ROW_HEIGHT: f32 = 20.0;

fn text_or_blank(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("")
}

/// Main aggregated table, columns in export order.
pub fn aggregate_table(ui: &mut Ui, rows: &[ProviderAggregate], rating_colors: &ColorMap) {
    ui.push_id("aggregate_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .max_scroll_height(360.0)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(TableColumn::initial(220.0).at_least(80.0).clip(true))
            .column(TableColumn::auto().at_least(100.0))
            .columns(TableColumn::initial(160.0).clip(true), 3)
            .columns(TableColumn::initial(240.0).clip(true), 2)
            .header(ROW_HEIGHT, |mut header| {
                for name in AGGREGATE_COLUMNS {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut table_row| {
                    let row = &rows[table_row.index()];
                    table_row.col(|ui: &mut Ui| {
                        ui.label(text_or_blank(&row.provider));
                    });
                    table_row.col(|ui: &mut Ui| {
                        ui.label(format_pounds(row.contract_value));
                    });
                    table_row.col(|ui: &mut Ui| {
                        ui.label(text_or_blank(&row.org_type));
                    });
                    table_row.col(|ui: &mut Ui| {
                        ui.label(text_or_blank(&row.category));
                    });
                    table_row.col(|ui: &mut Ui| {
                        let rating = row.cqc_rating.as_deref();
                        ui.label(
                            RichText::new(rating.unwrap_or(""))
                                .color(rating_colors.color_for(rating)),
                        );
                    });
                    table_row.col(|ui: &mut Ui| {
                        ui.label(text_or_blank(&row.summary)).on_hover_text(text_or_blank(&row.summary));
                    });
                    table_row.col(|ui: &mut Ui| {
                        ui.label(text_or_blank(&row.companies_house_info));
                    });
                });
            });
    });
}

/// Private providers in the fixed spend band.
pub fn private_table(ui: &mut Ui, rows: &[ProviderTotal]) {
    ui.push_id("private_table", |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(240.0)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(TableColumn::initial(320.0).clip(true))
            .column(TableColumn::remainder())
            .header(ROW_HEIGHT, |mut header| {
                for name in [COL_PROVIDER, COL_CONTRACT_VALUE] {
                    header.col(|ui: &mut Ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut table_row| {
                    let row = &rows[table_row.index()];
                    table_row.col(|ui: &mut Ui| {
                        ui.label(row.provider.as_str());
                    });
                    table_row.col(|ui: &mut Ui| {
                        ui.label(format_pounds(row.contract_value));
                    });
                });
            });
    });
}
