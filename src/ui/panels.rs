use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color;
use crate::data::error::TableKind;
use crate::data::model::Dimension;
use crate::data::query::DashboardView;
use crate::state::AppState;

/// Combo entry meaning "no constraint".
const ALL_LABEL: &str = "Todos";

// ---------------------------------------------------------------------------
// Left side panel – cascading dropdowns
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filtros");
    ui.separator();

    let Some(view) = &state.view else {
        ui.label("Nenhum dado carregado.");
        return;
    };

    // Clone the option lists so we can mutate state inside the loop.
    let options: Vec<(Dimension, Vec<String>)> = Dimension::ALL
        .iter()
        .map(|&dim| {
            let values = match dim {
                Dimension::Company => view.company_options.clone(),
                _ => view.options.get(dim).to_vec(),
            };
            (dim, values)
        })
        .collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            for (dim, values) in &options {
                ui.strong(dim.column());
                filter_combo(ui, state, *dim, values);
                ui.add_space(6.0);
            }

            ui.separator();
            if ui.button("Limpar filtros").clicked() {
                state.clear_filters();
            }
        });
}

fn filter_combo(ui: &mut Ui, state: &mut AppState, dim: Dimension, values: &[String]) {
    let current = state.selection.get(dim).map(str::to_string);
    let mut chosen = current.clone();

    egui::ComboBox::from_id_salt(dim.column())
        .selected_text(current.as_deref().unwrap_or(ALL_LABEL))
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut chosen, None, ALL_LABEL);
            for value in values {
                ui.selectable_value(&mut chosen, Some(value.clone()), value.as_str());
            }
        });

    if chosen != current {
        state.set_filter(dim, chosen);
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("Arquivo", |ui: &mut Ui| {
            if ui.button("Recarregar").clicked() {
                state.reload();
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Abrir headcount local…").clicked() {
                open_local_dialog(state, TableKind::Headcount);
                ui.close_menu();
            }
            if ui.button("Abrir pipeline local…").clicked() {
                open_local_dialog(state, TableKind::Pipeline);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "headcount: {}/{} linhas · pipeline: {}/{} linhas",
                view.headcount_rows,
                ds.headcount.len(),
                view.pipeline_rows,
                ds.pipeline.len(),
            ));
        }

        if state.is_loading() {
            ui.separator();
            ui.spinner();
            ui.label("Carregando…");
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// KPI cards
// ---------------------------------------------------------------------------

/// White rounded box the dashboard sections sit in.
pub fn card<R>(ui: &mut Ui, add_contents: impl FnOnce(&mut Ui) -> R) -> R {
    egui::Frame::group(ui.style())
        .fill(color::CARD)
        .show(ui, add_contents)
        .inner
}

/// The KPI row above the charts: the hired total next to the "Metas por
/// cargo" and "Performance mensal" headings.
pub fn kpi_row(ui: &mut Ui, view: &DashboardView) {
    ui.columns(3, |cols| {
        card(&mut cols[0], |ui: &mut Ui| {
            ui.label(
                RichText::new(view.kpi_label())
                    .size(28.0)
                    .color(color::HIRED),
            );
        });
        card(&mut cols[1], |ui: &mut Ui| {
            ui.label("Metas por cargo");
        });
        card(&mut cols[2], |ui: &mut Ui| {
            ui.label("Performance mensal");
        });
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_local_dialog(state: &mut AppState, table: TableKind) {
    let file = rfd::FileDialog::new()
        .set_title(format!("Abrir tabela de {table}"))
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Using {} as {table} source", path.display());
        state.open_local(table, path);
    }
}
