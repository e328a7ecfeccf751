use std::time::Duration;

use eframe::egui::{self, RichText, ScrollArea, Ui};

use crate::color;
use crate::state::AppState;
use crate::ui::{panels, plot, table};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.state.poll_load();
        if self.state.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(220.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: KPIs, charts, table ----
        egui::CentralPanel::default()
            .frame(egui::Frame::central_panel(&ctx.style()).fill(color::BACKGROUND))
            .show(ctx, |ui| {
                dashboard(ui, &self.state);
            });
    }
}

fn dashboard(ui: &mut Ui, state: &AppState) {
    ui.heading(
        RichText::new("Dashboard de Recrutamento & Headcount")
            .color(color::TITLE)
            .strong(),
    );
    ui.add_space(8.0);

    let Some(view) = &state.view else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.is_loading() {
                ui.heading("Carregando dados…");
            } else {
                ui.heading("Sem dados. Verifique as fontes em Arquivo → Recarregar.");
            }
        });
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            panels::kpi_row(ui, view);
            ui.add_space(12.0);

            ui.columns(2, |cols| {
                panels::card(&mut cols[0], |ui: &mut Ui| plot::monthly_chart(ui, view));
                panels::card(&mut cols[1], |ui: &mut Ui| plot::funnel_chart(ui, view));
            });
            ui.add_space(12.0);

            panels::card(ui, |ui: &mut Ui| table::monthly_table(ui, &view.monthly));
        });
}
