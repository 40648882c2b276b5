use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::config::{PRIVATE_BAND, Settings};
use crate::state::AppState;
use crate::ui::format::format_thousands;
use crate::ui::{chart, panels, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct NelExplorerApp {
    pub state: AppState,
}

impl NelExplorerApp {
    pub fn new(settings: Settings) -> Self {
        Self {
            state: AppState::load(settings),
        }
    }
}

impl eframe::App for NelExplorerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Fatal load error: nothing else is rendered ----
        if let Some(err) = &self.state.fatal {
            egui::CentralPanel::default().show(ctx, |ui| {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.label(RichText::new(err).color(Color32::RED).heading());
                });
            });
            return;
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: tables + chart ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| dashboard(ui, &mut self.state));
        });
    }
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading("NEL Contract & Provider Explorer");
    ui.add_space(4.0);

    if state.table.as_ref().is_some_and(|t| t.is_empty()) {
        ui.label("The worksheet has a header row but no contract rows.");
    }

    ui.label(
        RichText::new(format!(
            "{} unique providers shown after aggregation",
            format_thousands(state.rows.len() as f64)
        ))
        .strong(),
    );
    table::aggregate_table(ui, &state.rows, &state.rating_colors);

    if ui.button("📥 Download filtered aggregated data (CSV)").clicked() {
        panels::save_csv_dialog(state);
    }

    ui.add_space(12.0);
    ui.heading(format!(
        "🏢 Private Providers (£{}m–£{}m Contract Value Range)",
        PRIVATE_BAND.0 / 1_000_000.0,
        PRIVATE_BAND.1 / 1_000_000.0
    ));
    table::private_table(ui, &state.private_rows);
    chart::private_bar_chart(ui, &state.private_rows);

    ui.separator();
    ui.small("Data source: NEL Contract Data (enriched via merge pipeline).");
}
