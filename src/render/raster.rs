//! Rasterizes a [`Figure`] to PNG with plotters' bitmap backend.
//!
//! Text uses the proportional font egui ships with, registered once as
//! `sans-serif`, so no system fonts are needed.

use std::borrow::Cow;
use std::fmt;
use std::io::Cursor;
use std::sync::OnceLock;

use plotters::coord::cartesian::Cartesian2d;
use plotters::coord::types::RangedCoordf64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{register_font, FontStyle, FontTransform};

use crate::chart::color::TEXT_COLOR;
use crate::chart::figure::{category_at, Figure, Marks, FIGURE_HEIGHT_IN, FIGURE_WIDTH_IN};
use crate::chart::spec::ThresholdAxis;
use crate::error::{AnalyzerError, Result};

/// Resolution of the interactive "download as PNG" export.
pub const DOWNLOAD_DPI: u32 = 300;
/// Resolution of chart pages in the PDF report.
pub const REPORT_DPI: u32 = 120;
const MIN_DPI: u32 = 36;
const MAX_DPI: u32 = 600;

/// Point sizes of the text elements.
const TITLE_PT: f64 = 14.0;
const AXIS_LABEL_PT: f64 = 11.0;
const TICK_PT: f64 = 9.0;
const MAX_TICK_CHARS: usize = 18;

const FONT_FAMILY: &str = "sans-serif";

static FONT: OnceLock<std::result::Result<(), String>> = OnceLock::new();

fn bundled_font() -> Option<&'static [u8]> {
    let defs = egui::FontDefinitions::default();
    let name = defs.families.get(&egui::FontFamily::Proportional)?.first()?.clone();
    let data = defs.font_data.get(&name)?;
    match &data.font {
        Cow::Borrowed(bytes) => Some(*bytes),
        Cow::Owned(bytes) => Some(Box::leak(bytes.clone().into_boxed_slice())),
    }
}

fn ensure_font() -> Result<()> {
    FONT.get_or_init(|| {
        let bytes = bundled_font().ok_or_else(|| "no bundled font available".to_string())?;
        register_font(FONT_FAMILY, FontStyle::Normal, bytes)
            .map_err(|_| "bundled font could not be parsed".to_string())
    })
    .clone()
    .map_err(|message| AnalyzerError::Render { message })
}

fn render_error(e: impl fmt::Display) -> AnalyzerError {
    AnalyzerError::Render {
        message: e.to_string(),
    }
}

/// Pixel dimensions of a figure at the given DPI.
pub fn pixel_size(dpi: u32) -> (u32, u32) {
    let dpi = f64::from(dpi.clamp(MIN_DPI, MAX_DPI));
    (
        (FIGURE_WIDTH_IN * dpi).round() as u32,
        (FIGURE_HEIGHT_IN * dpi).round() as u32,
    )
}

/// Draw the figure on a white canvas and encode it as PNG.
pub fn render_png(figure: &Figure, dpi: u32) -> Result<Vec<u8>> {
    ensure_font()?;
    let dpi = dpi.clamp(MIN_DPI, MAX_DPI);
    let (width, height) = pixel_size(dpi);
    let scale = f64::from(dpi) / 72.0;

    let mut buffer = vec![255u8; width as usize * height as usize * 3];
    {
        let root = BitMapBackend::with_buffer(&mut buffer, (width, height)).into_drawing_area();
        draw_figure(&root, figure, scale).map_err(render_error)?;
        root.present().map_err(render_error)?;
    }

    let image = image::RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        AnalyzerError::Render {
            message: "pixel buffer does not match figure size".to_string(),
        }
    })?;
    let mut png = Cursor::new(Vec::new());
    image
        .write_to(&mut png, image::ImageFormat::Png)
        .map_err(render_error)?;

    tracing::debug!(width, height, dpi, "rasterized chart");
    Ok(png.into_inner())
}

fn shorten(label: &str) -> String {
    if label.chars().count() <= MAX_TICK_CHARS {
        label.to_string()
    } else {
        let mut s: String = label.chars().take(MAX_TICK_CHARS - 1).collect();
        s.push('\u{2026}');
        s
    }
}

type DrawResult<DB> =
    std::result::Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

fn draw_figure<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    figure: &Figure,
    scale: f64,
) -> DrawResult<DB> {
    root.fill(&WHITE)?;

    let px = |pt: f64| (pt * scale).round().max(1.0) as u32;
    let text = TEXT_COLOR.plotters();
    let title_font = (FONT_FAMILY, TITLE_PT * scale).into_font().color(&text);
    let axis_font = (FONT_FAMILY, AXIS_LABEL_PT * scale).into_font().color(&text);
    let tick_font = (FONT_FAMILY, TICK_PT * scale).into_font().color(&text);
    let rotated = figure.x_label_rotation != 0.0;

    let mut builder = ChartBuilder::on(root);
    builder
        .margin(px(10.0))
        .x_label_area_size(px(if rotated { 72.0 } else { 34.0 }))
        .y_label_area_size(px(if figure.is_horizontal() { 80.0 } else { 48.0 }));
    if !figure.title.is_empty() {
        builder.caption(&figure.title, title_font);
    }

    let categories = figure.categories().unwrap_or(&[]);
    let category_label = |v: &f64| category_at(categories, *v).map(shorten).unwrap_or_default();
    let number_label = |v: &f64| format!("{v}");
    let (x_fmt, y_fmt): (&dyn Fn(&f64) -> String, &dyn Fn(&f64) -> String) = match &figure.marks {
        Marks::Bars { horizontal: true, .. } => (&number_label, &category_label),
        Marks::Bars { .. } => (&category_label, &number_label),
        _ => (&number_label, &number_label),
    };

    let (x0, x1) = figure.x_range;
    let (y0, y1) = figure.y_range;
    let mut chart = builder.build_cartesian_2d(x0..x1, y0..y1)?;

    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_mesh()
            .x_desc(figure.x_label.as_str())
            .y_desc(figure.y_label.as_str())
            .axis_desc_style(axis_font.clone())
            .label_style(tick_font.clone())
            .x_label_formatter(x_fmt)
            .y_label_formatter(y_fmt);
        if categories.is_empty() {
            mesh.x_labels(8).y_labels(8);
        } else if figure.is_horizontal() {
            mesh.x_labels(8).y_labels(categories.len());
        } else {
            mesh.x_labels(categories.len()).y_labels(8);
        }
        if rotated {
            // Bitmap text only turns in quarter steps.
            mesh.x_label_style(tick_font.clone().transform(FontTransform::Rotate90));
        }
        mesh.draw()?;
    }

    let accent = figure.accent.plotters();
    let edge = WHITE.stroke_width(px(0.5));

    match &figure.marks {
        Marks::Histogram { edges, counts } => {
            let rects: Vec<[(f64, f64); 2]> = edges
                .windows(2)
                .zip(counts)
                .map(|(w, &c)| [(w[0], 0.0), (w[1], c as f64)])
                .collect();
            draw_rects(&mut chart, &rects, accent.filled(), edge)?;
        }
        Marks::Bars { values, horizontal, .. } => {
            let rects: Vec<[(f64, f64); 2]> = values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_finite())
                .map(|(i, &v)| {
                    let (lo, hi) = (i as f64 - 0.4, i as f64 + 0.4);
                    if *horizontal { [(0.0, lo), (v, hi)] } else { [(lo, 0.0), (hi, v)] }
                })
                .collect();
            draw_rects(&mut chart, &rects, accent.filled(), edge)?;
        }
        Marks::Line { points } => {
            let style = accent.stroke_width(px(2.0));
            chart.draw_series(LineSeries::new(points.iter().copied(), style))?;
        }
        Marks::Scatter { points } => {
            chart.draw_series(
                points
                    .iter()
                    .map(|&p| Circle::new(p, px(3.0), accent.filled())),
            )?;
        }
    }

    if let Some(threshold) = &figure.threshold {
        let color = threshold.color.plotters();
        let line = match threshold.axis {
            ThresholdAxis::Y => vec![(x0, threshold.value), (x1, threshold.value)],
            ThresholdAxis::X => vec![(threshold.value, y0), (threshold.value, y1)],
        };
        let series = chart.draw_series(DashedLineSeries::new(
            line,
            px(6.0),
            px(4.0),
            color.stroke_width(px(2.0)),
        ))?;

        if figure.shows_legend() {
            let swatch = px(16.0) as i32;
            let width = px(2.0);
            series
                .label(threshold.label.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + swatch, y)], color.stroke_width(width))
                });
            chart
                .configure_series_labels()
                .background_style(WHITE.mix(0.8))
                .border_style(BLACK)
                .label_font(tick_font)
                .position(SeriesLabelPosition::UpperRight)
                .draw()?;
        }
    }

    Ok(())
}

fn draw_rects<DB: DrawingBackend>(
    chart: &mut ChartContext<'_, DB, Cartesian2d<RangedCoordf64, RangedCoordf64>>,
    rects: &[[(f64, f64); 2]],
    fill: ShapeStyle,
    edge: ShapeStyle,
) -> DrawResult<DB> {
    chart.draw_series(rects.iter().map(|&r| Rectangle::new(r, fill)))?;
    chart.draw_series(rects.iter().map(|&r| Rectangle::new(r, edge)))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pixel_size_follows_dpi() {
        assert_eq!(pixel_size(100), (600, 400));
        assert_eq!(pixel_size(DOWNLOAD_DPI), (1800, 1200));
        assert_eq!(pixel_size(REPORT_DPI), (720, 480));
        assert_eq!(pixel_size(10_000), pixel_size(MAX_DPI));
    }

    #[test]
    fn long_tick_labels_are_shortened() {
        assert_eq!(shorten("short"), "short");
        let long = "a".repeat(40);
        assert_eq!(shorten(&long).chars().count(), MAX_TICK_CHARS);
    }

    #[test]
    fn renders_png_with_threshold_legend() {
        use crate::chart::color::DEFAULT_ACCENT;
        use crate::chart::spec::{ChartKind, Threshold};

        let figure = Figure {
            kind: ChartKind::Bar,
            title: "Sales by city".into(),
            x_label: "city".into(),
            y_label: "sales".into(),
            accent: DEFAULT_ACCENT,
            marks: Marks::Bars {
                labels: vec!["Paris".into(), "Oslo".into()],
                values: vec![3.0, 5.0],
                horizontal: false,
            },
            x_range: (-0.5, 1.5),
            y_range: (0.0, 5.5),
            x_label_rotation: 45.0,
            threshold: Some(Threshold {
                value: 4.0,
                label: "target".into(),
                ..Threshold::default()
            }),
        };
        let png = render_png(&figure, 50).unwrap();
        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = image::load_from_memory(&png).unwrap();
        assert_eq!((decoded.width(), decoded.height()), pixel_size(50));
    }
}
