//! Interactive rendering of a [`Figure`] with egui_plot.

use egui::{Color32, RichText, Ui};
use egui_plot::{
    Bar, BarChart, GridMark, HLine, Legend, Line, LineStyle, Plot, PlotPoints, Points, VLine,
};

use crate::chart::figure::{category_at, Figure, Marks};
use crate::chart::spec::ThresholdAxis;

const PLOT_HEIGHT: f32 = 320.0;
const BAR_WIDTH: f64 = 0.8;

/// Draw a figure inside `ui`. `id` must be unique among plots on screen.
pub fn show_figure(ui: &mut Ui, id: &str, figure: &Figure) {
    if !figure.title.is_empty() {
        ui.label(RichText::new(&figure.title).strong().size(15.0));
    }

    let categories = figure.categories().map(<[String]>::to_vec).unwrap_or_default();
    let horizontal = figure.is_horizontal();
    let category_axis = move |mark: GridMark, _range: &std::ops::RangeInclusive<f64>| {
        category_at(&categories, mark.value).map(str::to_string).unwrap_or_default()
    };

    let mut plot = Plot::new(id)
        .height(PLOT_HEIGHT)
        .x_axis_label(figure.x_label.clone())
        .y_axis_label(figure.y_label.clone())
        .show_grid(false)
        .allow_scroll(false)
        .include_x(figure.x_range.0)
        .include_x(figure.x_range.1)
        .include_y(figure.y_range.0)
        .include_y(figure.y_range.1);
    if figure.categories().is_some() {
        plot = if horizontal {
            plot.y_axis_formatter(category_axis)
        } else {
            plot.x_axis_formatter(category_axis)
        };
    }
    if figure.shows_legend() {
        plot = plot.legend(Legend::default());
    }

    let accent = figure.accent.color32();
    plot.show(ui, |plot_ui| {
        match &figure.marks {
            Marks::Histogram { edges, counts } => {
                let bars = edges
                    .windows(2)
                    .zip(counts)
                    .map(|(w, &c)| {
                        Bar::new((w[0] + w[1]) / 2.0, c as f64)
                            .width(w[1] - w[0])
                            .fill(accent)
                            .stroke((1.0, Color32::WHITE))
                    })
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).color(accent));
            }
            Marks::Bars { labels, values, horizontal } => {
                let bars = values
                    .iter()
                    .zip(labels)
                    .enumerate()
                    .filter(|(_, (v, _))| v.is_finite())
                    .map(|(i, (&v, label))| {
                        Bar::new(i as f64, v)
                            .width(BAR_WIDTH)
                            .name(label)
                            .fill(accent)
                    })
                    .collect();
                let chart = BarChart::new(bars).color(accent);
                plot_ui.bar_chart(if *horizontal { chart.horizontal() } else { chart });
            }
            Marks::Line { points } => {
                let series: PlotPoints = points.iter().map(|&(x, y)| [x, y]).collect();
                plot_ui.line(Line::new(series).color(accent).width(2.0));
            }
            Marks::Scatter { points } => {
                let series: PlotPoints = points.iter().map(|&(x, y)| [x, y]).collect();
                plot_ui.points(Points::new(series).color(accent).radius(3.0));
            }
        }

        if let Some(threshold) = &figure.threshold {
            let color = threshold.color.color32();
            let style = LineStyle::dashed_loose();
            match threshold.axis {
                ThresholdAxis::Y => plot_ui.hline(
                    HLine::new(threshold.value)
                        .color(color)
                        .width(2.0)
                        .style(style)
                        .name(&threshold.label),
                ),
                ThresholdAxis::X => plot_ui.vline(
                    VLine::new(threshold.value)
                        .color(color)
                        .width(2.0)
                        .style(style)
                        .name(&threshold.label),
                ),
            }
        }
    });
}
