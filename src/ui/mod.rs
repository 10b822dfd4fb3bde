pub mod chart_builder_panel;
pub mod overview_panel;
pub mod sheet_dialog;

use crate::chart::figure::Figure;

/// Requests from a panel that the app carries out after drawing.
pub enum PanelAction {
    SavePng { figure: Figure, file_name: String },
    CopyPng(Figure),
    ExportReport,
}

/// Save / copy buttons shown under every chart.
pub(crate) fn chart_buttons(
    ui: &mut egui::Ui,
    figure: &Figure,
    file_name: &str,
    actions: &mut Vec<PanelAction>,
) {
    ui.horizontal(|ui| {
        if ui
            .add(egui::Button::new("Download PNG").min_size(egui::vec2(0.0, 26.0)))
            .on_hover_text("Save this chart as a 300 DPI PNG")
            .clicked()
        {
            actions.push(PanelAction::SavePng {
                figure: figure.clone(),
                file_name: file_name.to_string(),
            });
        }
        if ui
            .add(egui::Button::new("Copy").min_size(egui::vec2(0.0, 26.0)))
            .on_hover_text("Copy this chart to the clipboard")
            .clicked()
        {
            actions.push(PanelAction::CopyPng(figure.clone()));
        }
    });
}
