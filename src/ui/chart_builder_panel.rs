use egui::RichText;

use crate::chart::color::Rgb;
use crate::chart::spec::{ChartKind, ThresholdAxis};
use crate::processing::aggregation::AggMethod;
use crate::render::plot_view::show_figure;
use crate::state::app_state::Session;
use crate::state::theme::Theme;
use crate::ui::{chart_buttons, PanelAction};

const COMBO_WIDTH: f32 = 260.0;

fn column_combo(ui: &mut egui::Ui, id: &str, value: &mut String, names: &[&str]) -> bool {
    let mut changed = false;
    egui::ComboBox::from_id_salt(id)
        .selected_text(value.as_str())
        .width(COMBO_WIDTH)
        .show_ui(ui, |ui| {
            for name in names {
                let selected = value.as_str() == *name;
                if ui.selectable_label(selected, *name).clicked() && !selected {
                    *value = name.to_string();
                    changed = true;
                }
            }
        });
    changed
}

/// The custom chart tab. Generating a chart stores it on the session as the
/// last custom chart.
pub fn show_chart_builder_panel(
    ui: &mut egui::Ui,
    session: &mut Session,
    accent: Rgb,
    theme: &Theme,
) -> Vec<PanelAction> {
    let mut actions = Vec::new();
    let names: Vec<String> = session.table().column_names().iter().map(|s| s.to_string()).collect();
    let name_refs: Vec<&str> = names.iter().map(String::as_str).collect();
    let numeric = session.analysis.overview.numeric_columns.clone();

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        ui.heading("Custom Chart Builder");
        ui.add_space(8.0);

        let form = &mut session.form;
        let mut columns_changed = false;
        egui::Grid::new("chart_form")
            .num_columns(2)
            .spacing([12.0, 8.0])
            .show(ui, |ui| {
                ui.label("Chart Type");
                egui::ComboBox::from_id_salt("chart_kind")
                    .selected_text(form.kind.label())
                    .width(COMBO_WIDTH)
                    .show_ui(ui, |ui| {
                        for kind in ChartKind::ALL {
                            ui.selectable_value(&mut form.kind, kind, kind.label());
                        }
                    });
                ui.end_row();

                ui.label("X-axis Column");
                columns_changed |= column_combo(ui, "x_column", &mut form.x_column, &name_refs);
                ui.end_row();

                if form.kind.uses_y() {
                    ui.label("Y-axis Column");
                    columns_changed |= column_combo(ui, "y_column", &mut form.y_column, &name_refs);
                    ui.end_row();
                }

                if form.uses_aggregation() {
                    ui.label("Aggregation");
                    ui.horizontal(|ui| {
                        egui::ComboBox::from_id_salt("aggregation")
                            .selected_text(form.aggregation.label())
                            .width(COMBO_WIDTH)
                            .show_ui(ui, |ui| {
                                for method in AggMethod::ALL {
                                    let label = method.label();
                                    ui.selectable_value(&mut form.aggregation, method, label);
                                }
                            });
                        if form.kind == ChartKind::Line {
                            ui.label(RichText::new("Line charts always average y per x.").weak());
                        }
                    });
                    ui.end_row();
                }

                if form.kind == ChartKind::Bar {
                    ui.label("Orientation");
                    ui.checkbox(&mut form.horizontal, "Horizontal bars");
                    ui.end_row();
                }

                ui.label("Chart Title");
                ui.add(egui::TextEdit::singleline(&mut form.title).desired_width(COMBO_WIDTH));
                ui.end_row();
                ui.label("X-axis Label");
                ui.add(egui::TextEdit::singleline(&mut form.x_label).desired_width(COMBO_WIDTH));
                ui.end_row();
                ui.label("Y-axis Label");
                ui.add(egui::TextEdit::singleline(&mut form.y_label).desired_width(COMBO_WIDTH));
                ui.end_row();
            });
        if columns_changed {
            form.sync_defaults();
        }

        if form.uses_aggregation() && !numeric.contains(&form.y_column) {
            ui.colored_label(theme.warn_color(), "Y column must be numeric for this chart type.");
        }

        ui.add_space(12.0);
        ui.label(RichText::new("Threshold Line (optional)").strong());
        ui.checkbox(&mut form.threshold_enabled, "Add a threshold line");
        if form.threshold_enabled {
            egui::Grid::new("threshold_form")
                .num_columns(2)
                .spacing([12.0, 8.0])
                .show(ui, |ui| {
                    ui.label("Apply to");
                    ui.horizontal(|ui| {
                        for axis in [ThresholdAxis::X, ThresholdAxis::Y] {
                            ui.radio_value(&mut form.threshold.axis, axis, axis.label());
                        }
                    });
                    ui.end_row();

                    ui.label("Threshold value");
                    ui.add(egui::DragValue::new(&mut form.threshold.value).speed(1.0));
                    ui.end_row();

                    ui.label("Line color");
                    let mut rgb = form.threshold.color.to_array();
                    if ui.color_edit_button_srgb(&mut rgb).changed() {
                        form.threshold.color = Rgb::from_array(rgb);
                    }
                    ui.end_row();

                    ui.label("Threshold label");
                    ui.add(
                        egui::TextEdit::singleline(&mut form.threshold.label)
                            .hint_text("optional")
                            .desired_width(COMBO_WIDTH),
                    );
                    ui.end_row();
                });
        }

        ui.add_space(12.0);
        let generate = egui::Button::new(RichText::new("Generate Chart").strong())
            .min_size(egui::vec2(140.0, 30.0));
        if ui.add(generate).clicked() {
            // The error is kept on the session and shown below.
            let _ = session.generate_custom_chart(accent);
        }

        if let Some(message) = &session.form_error {
            ui.add_space(6.0);
            ui.colored_label(theme.warn_color(), message);
        }

        if let Some(figure) = &session.last_custom_chart {
            ui.add_space(12.0);
            show_figure(ui, "custom_chart", figure);
            let file_name = format!("{}.png", figure.file_stem());
            chart_buttons(ui, figure, &file_name, &mut actions);
        }
    });

    actions
}
