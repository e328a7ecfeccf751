use eframe::egui::{RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoint, Text};

use crate::color;
use crate::data::query::DashboardView;

/// Width of one month group; each series takes half.
const GROUP_WIDTH: f64 = 0.7;

// ---------------------------------------------------------------------------
// Planned vs hired per month (grouped bars)
// ---------------------------------------------------------------------------

pub fn monthly_chart(ui: &mut Ui, view: &DashboardView) {
    ui.strong("Previsto x Contratado por mês");
    if view.monthly.is_empty() {
        ui.label("Sem dados para o filtro atual.");
        return;
    }

    let half = GROUP_WIDTH / 2.0;
    let planned: Vec<Bar> = view
        .monthly
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Bar::new(i as f64 - half / 2.0, m.planned as f64)
                .width(half)
                .name(format!("{} previsto", m.month))
        })
        .collect();
    let hired: Vec<Bar> = view
        .monthly
        .iter()
        .enumerate()
        .map(|(i, m)| {
            Bar::new(i as f64 + half / 2.0, m.hired as f64)
                .width(half)
                .name(format!("{} contratado", m.month))
        })
        .collect();

    let months: Vec<String> = view.monthly.iter().map(|m| m.month.clone()).collect();

    Plot::new("monthly_targets")
        .legend(Legend::default())
        .height(320.0)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .x_axis_formatter(move |mark, _range| axis_label(&months, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(planned).name("Previsto").color(color::PLANNED));
            plot_ui.bar_chart(BarChart::new(hired).name("Contratado").color(color::HIRED));
        });
}

// ---------------------------------------------------------------------------
// Recruitment funnel (centred horizontal bars)
// ---------------------------------------------------------------------------

pub fn funnel_chart(ui: &mut Ui, view: &DashboardView) {
    ui.strong("Funil de Recrutamento");

    let n = view.funnel.len();
    let shades = color::funnel_shades(color::HIRED, n);
    // Stage 1 at the top: position n-1, last stage at 0.
    let labels: Vec<String> = view.funnel.iter().rev().map(|e| e.stage.to_string()).collect();

    let bars: Vec<Bar> = view
        .funnel
        .iter()
        .zip(&shades)
        .enumerate()
        .map(|(i, (entry, shade))| {
            let q = entry.quantity as f64;
            Bar::new((n - 1 - i) as f64, q)
                .base_offset(-q / 2.0)
                .width(0.8)
                .fill(*shade)
                .name(entry.stage)
        })
        .collect();
    let counts: Vec<(f64, String)> = view
        .funnel
        .iter()
        .enumerate()
        .map(|(i, e)| ((n - 1 - i) as f64, e.quantity.to_string()))
        .collect();

    Plot::new("recruitment_funnel")
        .height(320.0)
        .show_axes([false, true])
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .allow_boxed_zoom(false)
        .y_axis_formatter(move |mark, _range| axis_label(&labels, mark.value))
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).horizontal());
            for (y, count) in counts {
                plot_ui.text(Text::new(PlotPoint::new(0.0, y), RichText::new(count).strong()));
            }
        });
}

/// Label for an axis tick at `value`: only whole positions that index into
/// `labels` get one.
fn axis_label(labels: &[String], value: f64) -> String {
    let idx = value.round();
    if (value - idx).abs() > 1e-6 || idx < 0.0 {
        return String::new();
    }
    labels.get(idx as usize).cloned().unwrap_or_default()
}
