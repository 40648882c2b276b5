use eframe::egui::Ui;
use egui_plot::{uniform_grid_spacer, Bar, BarChart, Plot};

use crate::color::BAR_COLOR;
use crate::data::model::ProviderTotal;
use crate::ui::format::{format_thousands, truncate};

/// Longest provider name shown under a bar.
const TICK_LABEL_CHARS: usize = 18;

// ---------------------------------------------------------------------------
// Private-provider bar chart
// ---------------------------------------------------------------------------

/// One bar per provider, in the (descending) order of `rows`.
pub fn private_bar_chart(ui: &mut Ui, rows: &[ProviderTotal]) {
    if rows.is_empty() {
        ui.label("No private providers in this spend band.");
        return;
    }

    let bars: Vec<Bar> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| {
            Bar::new(i as f64, r.contract_value)
                .name(&r.provider)
                .fill(BAR_COLOR)
                .width(0.7)
        })
        .collect();

    let chart = BarChart::new(bars)
        .color(BAR_COLOR)
        .element_formatter(Box::new(|bar: &Bar, _chart: &BarChart| {
            format!("Provider: {}\nValue (£): {}", bar.name, format_thousands(bar.value))
        }));

    // Tick labels only at whole positions; egui_plot cannot rotate them, so long names are cut.
    let names: Vec<String> = rows
        .iter()
        .map(|r| truncate(&r.provider, TICK_LABEL_CHARS))
        .collect();

    Plot::new("private_chart")
        .height(400.0)
        .x_axis_label("Provider")
        .y_axis_label("Contract Value (£)")
        .x_grid_spacer(uniform_grid_spacer(|_| [1.0, 5.0, 10.0]))
        .x_axis_formatter(move |mark, _range| {
            let pos = mark.value.round();
            if (mark.value - pos).abs() > 1e-6 || pos < 0.0 {
                return String::new();
            }
            names.get(pos as usize).cloned().unwrap_or_default()
        })
        .y_axis_formatter(|mark, _range| format_thousands(mark.value))
        .label_formatter(|_name, _point| String::new())
        .allow_scroll(false)
        .allow_drag(true)
        .allow_zoom(true)
        .allow_boxed_zoom(true)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}
