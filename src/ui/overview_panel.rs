use egui::RichText;
use egui_extras::{Column, TableBuilder};

use crate::chart::color::Rgb;
use crate::chart::spec::{category_spec, histogram_spec, ChartKind, ChartLabels};
use crate::processing::insights::{group_thousands, render_summary};
use crate::processing::statistics::STAT_HEADERS;
use crate::render::plot_view::show_figure;
use crate::state::app_state::{DistributionChart, Session, PREVIEW_ROWS};
use crate::state::theme::Theme;
use crate::ui::{chart_buttons, PanelAction};

const ROW_HEIGHT: f32 = 20.0;

fn section(ui: &mut egui::Ui, title: &str) {
    ui.add_space(14.0);
    ui.heading(title);
    ui.add_space(4.0);
}

/// The overview tab: preview, column info, insights, statistics,
/// distribution charts and report export.
pub fn show_overview_panel(
    ui: &mut egui::Ui,
    session: &mut Session,
    accent: Rgb,
    theme: &Theme,
) -> Vec<PanelAction> {
    let mut actions = Vec::new();

    egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
        show_preview(ui, session);
        show_column_info(ui, session, theme);
        show_summary(ui, session);
        show_statistics(ui, session);

        section(ui, "Distribution of Numerical Columns");
        distribution_section(ui, session, accent, ChartKind::Histogram, &mut actions);
        section(ui, "Distribution of Categorical Columns");
        distribution_section(ui, session, accent, ChartKind::Bar, &mut actions);

        section(ui, "Export Full Report to PDF");
        let charts = session.selected_numeric.len()
            + session.selected_text.len()
            + usize::from(session.last_custom_chart.is_some());
        ui.label(
            RichText::new(format!(
                "The report includes the summary, the statistics table and {charts} chart(s)."
            ))
            .weak(),
        );
        let export = egui::Button::new(
            RichText::new("Export Summary + Stats + Charts to PDF").strong(),
        )
        .min_size(egui::vec2(0.0, 30.0));
        if ui.add(export).clicked() {
            actions.push(PanelAction::ExportReport);
        }
        ui.add_space(20.0);
    });

    actions
}

fn show_preview(ui: &mut egui::Ui, session: &Session) {
    let table = session.table();
    section(ui, "Dataset Overview");
    ui.label(format!("Shape: ({}, {})", table.row_count(), table.column_count()));
    if table.row_count() > PREVIEW_ROWS {
        ui.label(RichText::new(format!("Showing the first {PREVIEW_ROWS} rows.")).weak());
    }

    let rows = table.row_count().min(PREVIEW_ROWS);
    ui.push_id("preview_table", |ui| {
        egui::ScrollArea::horizontal().show(ui, |ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
                .column(Column::auto().at_least(40.0))
                .columns(Column::auto().at_least(80.0), table.column_count())
                .max_scroll_height(320.0)
                .header(ROW_HEIGHT, |mut header| {
                    header.col(|ui| {
                        ui.strong("#");
                    });
                    for column in table.columns() {
                        header.col(|ui| {
                            ui.strong(&column.name);
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows, |mut row| {
                        let index = row.index();
                        row.col(|ui| {
                            ui.label(RichText::new(index.to_string()).weak());
                        });
                        for column in table.columns() {
                            row.col(|ui| {
                                ui.label(column.display_at(index));
                            });
                        }
                    });
                });
        });
    });
}

fn show_column_info(ui: &mut egui::Ui, session: &Session, theme: &Theme) {
    let table = session.table();
    section(ui, "Column Info");

    ui.label(RichText::new("Data Types:").strong());
    egui::Grid::new("column_types")
        .striped(true)
        .num_columns(2)
        .min_col_width(120.0)
        .show(ui, |ui| {
            ui.strong("Column");
            ui.strong("Type");
            ui.end_row();
            for column in table.columns() {
                ui.label(&column.name);
                ui.label(column.kind().label());
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    let missing: Vec<(&str, usize)> = table
        .columns()
        .iter()
        .map(|c| (c.name.as_str(), c.null_count()))
        .filter(|(_, n)| *n > 0)
        .collect();
    if missing.is_empty() {
        ui.colored_label(theme.ok_color(), "No missing values found.");
        return;
    }

    ui.label(RichText::new("Missing Values:").strong());
    let rows = table.row_count().max(1) as f64;
    egui::Grid::new("missing_values")
        .striped(true)
        .num_columns(3)
        .min_col_width(100.0)
        .show(ui, |ui| {
            ui.strong("Column");
            ui.strong("Missing");
            ui.strong("%");
            ui.end_row();
            for (name, count) in missing {
                ui.label(name);
                ui.label(group_thousands(count));
                ui.label(format!("{:.1}", count as f64 / rows * 100.0));
                ui.end_row();
            }
        });
}

fn show_summary(ui: &mut egui::Ui, session: &Session) {
    let text = render_summary(&session.analysis.overview, &session.analysis.findings);
    let mut lines = text.lines();
    ui.add_space(14.0);
    egui::Frame::group(ui.style())
        .inner_margin(egui::Margin::same(10))
        .show(ui, |ui| {
            ui.set_width(ui.available_width());
            if let Some(heading) = lines.next() {
                ui.heading(heading);
            }
            for line in lines {
                if line.ends_with(':') {
                    ui.add_space(4.0);
                    ui.strong(line);
                } else {
                    ui.label(line);
                }
            }
        });
}

fn show_statistics(ui: &mut egui::Ui, session: &Session) {
    section(ui, "Descriptive Stats");
    let stats = &session.analysis.statistics;
    if stats.is_empty() {
        ui.label(RichText::new("No numeric columns to describe.").weak());
        return;
    }

    let rows: Vec<[String; 9]> = stats.iter().map(|s| s.row()).collect();
    ui.push_id("stats_table", |ui| {
        TableBuilder::new(ui)
            .striped(true)
            .resizable(true)
            .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
            .column(Column::auto().at_least(120.0))
            .columns(Column::auto().at_least(70.0), STAT_HEADERS.len() - 1)
            .vscroll(false)
            .header(ROW_HEIGHT, |mut header| {
                for name in STAT_HEADERS {
                    header.col(|ui| {
                        ui.strong(name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                    let cells = &rows[row.index()];
                    for cell in cells {
                        row.col(|ui| {
                            ui.label(cell);
                        });
                    }
                });
            });
    });
}

fn distribution_section(
    ui: &mut egui::Ui,
    session: &mut Session,
    accent: Rgb,
    kind: ChartKind,
    actions: &mut Vec<PanelAction>,
) {
    let candidates: Vec<String> = match kind {
        ChartKind::Histogram => session.analysis.overview.numeric_columns.clone(),
        _ => session.analysis.overview.text_columns.clone(),
    };
    if candidates.is_empty() {
        ui.label(RichText::new("No columns of this type.").weak());
        return;
    }

    let prompt = match kind {
        ChartKind::Histogram => "Select numeric columns to display:",
        _ => "Select categorical columns to display:",
    };
    ui.label(prompt);
    ui.horizontal_wrapped(|ui| {
        for column in &candidates {
            let selected = match kind {
                ChartKind::Histogram => session.selected_numeric.contains(column),
                _ => session.selected_text.contains(column),
            };
            if ui.selectable_label(selected, column.as_str()).clicked() {
                match kind {
                    ChartKind::Histogram => session.toggle_numeric(column),
                    _ => session.toggle_text(column),
                }
            }
        }
    });

    let charts: Vec<DistributionChart> = session
        .distributions(accent)
        .iter()
        .filter(|c| c.kind == kind)
        .cloned()
        .collect();
    if charts.is_empty() {
        return;
    }

    ui.columns(2, |cols| {
        for (i, chart) in charts.iter().enumerate() {
            let ui = &mut cols[i % 2];
            ui.push_id(("dist", kind.label(), &chart.column), |ui| {
                label_editor(ui, session, &chart.column, kind, accent);
                match &chart.figure {
                    Ok(figure) => {
                        show_figure(ui, &format!("dist_{}_{}", kind.label(), chart.column), figure);
                        chart_buttons(ui, figure, &chart.file_name(), actions);
                    }
                    Err(message) => {
                        ui.colored_label(egui::Color32::from_rgb(255, 80, 80), message);
                    }
                }
                ui.add_space(10.0);
            });
        }
    });
}

/// Inline editor for a distribution chart's title and axis labels.
fn label_editor(
    ui: &mut egui::Ui,
    session: &mut Session,
    column: &str,
    kind: ChartKind,
    accent: Rgb,
) {
    let defaults = match kind {
        ChartKind::Histogram => histogram_spec(column, accent, &ChartLabels::default()),
        _ => category_spec(column, accent, &ChartLabels::default()),
    };
    let current = session.labels_for(column);
    let mut title = current.title.clone().unwrap_or_else(|| defaults.title.clone());
    let mut x_label = current.x_label.clone().unwrap_or_else(|| defaults.x_label.clone());
    let mut y_label = current.y_label.clone().unwrap_or_else(|| defaults.y_label.clone());

    let mut changed = false;
    egui::CollapsingHeader::new(format!("Customize '{column}' chart")).show(ui, |ui| {
        egui::Grid::new("labels").num_columns(2).show(ui, |ui| {
            ui.label("Title");
            changed |= ui.text_edit_singleline(&mut title).changed();
            ui.end_row();
            ui.label("X-axis label");
            changed |= ui.text_edit_singleline(&mut x_label).changed();
            ui.end_row();
            ui.label("Y-axis label");
            changed |= ui.text_edit_singleline(&mut y_label).changed();
            ui.end_row();
        });
    });

    if changed {
        let keep = |value: String, default: &str| (value != default).then_some(value);
        session.set_labels(
            column,
            ChartLabels {
                title: keep(title, &defaults.title),
                x_label: keep(x_label, &defaults.x_label),
                y_label: keep(y_label, &defaults.y_label),
            },
        );
    }
}
