use eframe::egui::Ui;
use egui_extras::{Column, TableBuilder};

use crate::data::query::MonthlyTarget;

/// Hired as a percentage of planned; undefined when nothing was planned.
fn attainment(target: &MonthlyTarget) -> Option<f64> {
    (target.planned != 0).then(|| target.hired as f64 * 100.0 / target.planned as f64)
}

/// Month-by-month breakdown under the charts.
pub fn monthly_table(ui: &mut Ui, monthly: &[MonthlyTarget]) {
    ui.strong("Performance mensal");

    TableBuilder::new(ui)
        .striped(true)
        .column(Column::auto().at_least(90.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            header.col(|ui| {
                ui.strong("Mês");
            });
            header.col(|ui| {
                ui.strong("Previsto");
            });
            header.col(|ui| {
                ui.strong("Contratado");
            });
            header.col(|ui| {
                ui.strong("Atingimento");
            });
        })
        .body(|mut body| {
            for target in monthly {
                body.row(18.0, |mut row| {
                    row.col(|ui| {
                        ui.label(target.month.as_str());
                    });
                    row.col(|ui| {
                        ui.label(target.planned.to_string());
                    });
                    row.col(|ui| {
                        ui.label(target.hired.to_string());
                    });
                    row.col(|ui| {
                        ui.label(
                            attainment(target)
                                .map(|p| format!("{p:.0}%"))
                                .unwrap_or_else(|| "–".to_string()),
                        );
                    });
                });
            }
        });
}
