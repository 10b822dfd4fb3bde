//! Multi-page PDF summary report built with printpdf.
//!
//! Layout: a title page with the dataset shape and the insight findings, a
//! page with the leading columns of the statistics table, then one page per
//! chart image. Coordinates are tracked from the top of the page and flipped
//! to PDF space (origin bottom-left) when drawing.

use std::fmt;

use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point,
};

use crate::chart::figure::Figure;
use crate::error::{AnalyzerError, Result};
use crate::processing::insights::{group_thousands, Finding};
use crate::processing::statistics::{ColumnStatistics, STAT_HEADERS};
use crate::render::raster::render_png;

pub const REPORT_TITLE: &str = "Smart CSV Analyzer Report";

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN: f64 = 10.0;
const BOTTOM_BREAK: f64 = 15.0;
const LINE_HEIGHT: f64 = 8.0;

const GRID_COLUMNS: usize = 6;
const CELL_HEIGHT: f64 = 8.0;
const MAX_LINE_CHARS: usize = 100;
const MAX_CELL_CHARS: usize = 15;

const IMAGE_TOP: f64 = 20.0;
const IMAGE_WIDTH: f64 = 180.0;

/// What goes into a report.
#[derive(Debug, Clone, Copy)]
pub struct ReportInput<'a> {
    pub rows: usize,
    pub columns: usize,
    pub findings: &'a [Finding],
    pub statistics: &'a [ColumnStatistics],
    pub charts: &'a [Figure],
    /// Raster resolution of the chart pages.
    pub dpi: u32,
}

fn export_error(e: impl fmt::Debug) -> AnalyzerError {
    AnalyzerError::Export {
        message: format!("{e:?}"),
    }
}

/// Map text onto what the built-in Helvetica can show and cap its length.
pub fn sanitize_line(text: &str, max_chars: usize) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\u{2022}' | '\u{2013}' | '\u{2014}' | '\u{2212}' => out.push('-'),
            '\u{2018}' | '\u{2019}' => out.push('\''),
            '\u{201C}' | '\u{201D}' => out.push('"'),
            '\u{2026}' => out.push_str("..."),
            '\t' | '\n' | '\r' => out.push(' '),
            c if (c as u32) < 0x20 => {}
            c if (c as u32) <= 0xFF => out.push(c),
            _ => {}
        }
    }
    out.chars().take(max_chars).collect()
}

struct Fonts {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
}

/// Current page and the distance already used from its top edge. Every
/// string placed on a page is also kept in `transcript`.
struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    y: f64,
    pages: usize,
    transcript: Vec<String>,
}

impl PageCursor {
    fn new(title: &str) -> Self {
        let (doc, page, layer) =
            PdfDocument::new(title, Mm(PAGE_WIDTH as f32), Mm(PAGE_HEIGHT as f32), "Layer 1");
        let layer = doc.get_page(page).get_layer(layer);
        Self {
            doc,
            layer,
            y: MARGIN,
            pages: 1,
            transcript: Vec::new(),
        }
    }

    fn new_page(&mut self) {
        self.pages += 1;
        let (page, layer) = self.doc.add_page(
            Mm(PAGE_WIDTH as f32),
            Mm(PAGE_HEIGHT as f32),
            format!("Layer {}", self.pages),
        );
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = MARGIN;
    }

    /// Break to a fresh page when `height` no longer fits.
    fn reserve(&mut self, height: f64) {
        if self.y + height > PAGE_HEIGHT - BOTTOM_BREAK {
            self.new_page();
        }
    }

    /// PDF y coordinate of a distance from the top edge.
    fn pdf_y(top: f64) -> Mm {
        Mm((PAGE_HEIGHT - top) as f32)
    }

    fn text_line(&mut self, text: &str, size: f32, font: &IndirectFontRef) {
        self.reserve(LINE_HEIGHT);
        self.y += LINE_HEIGHT;
        self.layer
            .use_text(text, size, Mm(MARGIN as f32), Self::pdf_y(self.y - 2.0), font);
        self.transcript.push(text.to_string());
    }

    fn gap(&mut self, height: f64) {
        self.y += height;
    }

    fn cell(&mut self, x: f64, width: f64, text: &str, size: f32, font: &IndirectFontRef) {
        let (top, bottom) = (self.y, self.y + CELL_HEIGHT);
        let corners = [(x, top), (x + width, top), (x + width, bottom), (x, bottom)];
        self.layer.add_line(Line {
            points: corners
                .iter()
                .map(|&(cx, cy)| (Point::new(Mm(cx as f32), Self::pdf_y(cy)), false))
                .collect(),
            is_closed: true,
        });
        self.layer
            .use_text(text, size, Mm((x + 1.5) as f32), Self::pdf_y(bottom - 2.5), font);
        self.transcript.push(text.to_string());
    }

    fn grid_row(&mut self, cells: &[String], font: &IndirectFontRef) {
        self.reserve(CELL_HEIGHT);
        let width = (PAGE_WIDTH - 2.0 * MARGIN) / GRID_COLUMNS as f64;
        for (i, text) in cells.iter().enumerate() {
            let text = sanitize_line(text, MAX_CELL_CHARS);
            self.cell(MARGIN + i as f64 * width, width, &text, 10.0, font);
        }
        self.y += CELL_HEIGHT;
    }

    /// Place a PNG on its own page, scaled to the report image width.
    fn image_page(&mut self, png: &[u8]) -> Result<()> {
        let decoded = printpdf::image_crate::load_from_memory(png).map_err(export_error)?;
        let (width_px, height_px) = (decoded.width() as f64, decoded.height() as f64);
        if width_px <= 0.0 {
            return Err(AnalyzerError::Export {
                message: "chart image is empty".to_string(),
            });
        }
        let height_mm = IMAGE_WIDTH * height_px / width_px;
        let dpi = width_px * 25.4 / IMAGE_WIDTH;

        self.new_page();
        Image::from_dynamic_image(&decoded).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN as f32)),
                translate_y: Some(Self::pdf_y(IMAGE_TOP + height_mm)),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
        self.y = IMAGE_TOP + height_mm;
        Ok(())
    }
}

/// Build the report and return the encoded PDF.
pub fn export_report(input: &ReportInput<'_>) -> Result<Vec<u8>> {
    build_report(input, render_png).map(|report| report.bytes)
}

struct BuiltReport {
    bytes: Vec<u8>,
    pages: usize,
    transcript: Vec<String>,
}

/// Lay out the report, rasterizing each chart with `render`. A chart that
/// fails to render or embed is skipped.
fn build_report<R>(input: &ReportInput<'_>, render: R) -> Result<BuiltReport>
where
    R: Fn(&Figure, u32) -> Result<Vec<u8>>,
{
    let mut cursor = PageCursor::new(REPORT_TITLE);
    let fonts = Fonts {
        regular: cursor
            .doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(export_error)?,
        bold: cursor
            .doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(export_error)?,
    };

    cursor.text_line(REPORT_TITLE, 16.0, &fonts.bold);
    cursor.gap(2.0);
    let shape = format!(
        "Rows: {}    Columns: {}",
        group_thousands(input.rows),
        group_thousands(input.columns)
    );
    cursor.text_line(&shape, 12.0, &fonts.regular);
    cursor.gap(4.0);

    cursor.text_line("Data Summary:", 12.0, &fonts.bold);
    for finding in input.findings {
        let line = format!("- {}", sanitize_line(&finding.to_string(), MAX_LINE_CHARS));
        cursor.text_line(&line, 10.0, &fonts.regular);
    }

    cursor.new_page();
    cursor.text_line("Descriptive Statistics", 14.0, &fonts.bold);
    cursor.gap(2.0);
    let header: Vec<String> = STAT_HEADERS
        .iter()
        .take(GRID_COLUMNS)
        .map(|h| h.to_string())
        .collect();
    cursor.grid_row(&header, &fonts.bold);
    for stats in input.statistics {
        let row: Vec<String> = stats.row().into_iter().take(GRID_COLUMNS).collect();
        cursor.grid_row(&row, &fonts.regular);
    }

    let mut embedded = 0usize;
    for figure in input.charts {
        let placed = render(figure, input.dpi).and_then(|png| cursor.image_page(&png));
        match placed {
            Ok(()) => embedded += 1,
            Err(e) => tracing::warn!(chart = %figure.title, "skipping chart in report: {e}"),
        }
    }

    let PageCursor {
        doc,
        pages,
        transcript,
        ..
    } = cursor;
    let bytes = doc.save_to_bytes().map_err(export_error)?;
    tracing::info!(pages, charts = embedded, size = bytes.len(), "report exported");
    Ok(BuiltReport {
        bytes,
        pages,
        transcript,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::builder::build_chart;
    use crate::chart::color::DEFAULT_ACCENT;
    use crate::chart::spec::{histogram_spec, ChartLabels};
    use crate::data::table::{Column, Table};
    use crate::processing::insights::generate_insights;
    use crate::processing::statistics::compute_statistics;

    fn sample() -> Table {
        Table::new(vec![
            Column::numeric("price", vec![Some(10.0), Some(20.0), Some(30.0), Some(1000.0)]),
            Column::text(
                "category",
                vec![Some("A".into()), Some("A".into()), Some("B".into()), None],
            ),
        ])
    }

    #[test]
    fn sanitizes_for_builtin_fonts() {
        assert_eq!(sanitize_line("• a – b “c” ‘d’", 100), "- a - b \"c\" 'd'");
        assert_eq!(sanitize_line("café 東京", 100), "café ");
        assert_eq!(sanitize_line(&"x".repeat(150), MAX_LINE_CHARS).len(), 100);
        assert_eq!(sanitize_line("1,234 rows × 5", 100), "1,234 rows × 5");
    }

    fn input<'a>(
        table: &Table,
        findings: &'a [Finding],
        stats: &'a [ColumnStatistics],
        charts: &'a [Figure],
    ) -> ReportInput<'a> {
        ReportInput {
            rows: table.row_count(),
            columns: table.column_count(),
            findings,
            statistics: stats,
            charts,
            dpi: 60,
        }
    }

    #[test]
    fn report_without_charts_has_summary_and_statistics() {
        let table = sample();
        let findings = generate_insights(&table);
        let stats = compute_statistics(&table);
        let report = build_report(&input(&table, &findings, &stats, &[]), render_png).unwrap();
        assert!(report.bytes.starts_with(b"%PDF"));
        assert_eq!(report.pages, 2);

        let text = &report.transcript;
        assert_eq!(text[0], REPORT_TITLE);
        assert!(text.contains(&"Rows: 4    Columns: 2".to_string()));
        assert!(text.contains(&"Data Summary:".to_string()));
        for finding in &findings {
            let line = format!("- {}", sanitize_line(&finding.to_string(), MAX_LINE_CHARS));
            assert!(text.contains(&line), "missing {line}");
        }
        assert!(text.contains(&"Descriptive Statistics".to_string()));
        for header in STAT_HEADERS.iter().take(GRID_COLUMNS) {
            assert!(text.contains(&header.to_string()), "missing header {header}");
        }
        assert!(text.contains(&"price".to_string()));
        assert!(text.contains(&"265".to_string()));
    }

    #[test]
    fn long_findings_keep_a_hundred_characters() {
        let table = Table::new(vec![Column::numeric(
            format!("a_{}", "very_long_column_name".repeat(8)),
            vec![Some(1.0), None],
        )]);
        let findings = generate_insights(&table);
        let stats = compute_statistics(&table);
        let report = build_report(&input(&table, &findings, &stats, &[]), render_png).unwrap();
        let line = report
            .transcript
            .iter()
            .find(|l| l.starts_with("- "))
            .unwrap();
        assert_eq!(line.chars().count(), MAX_LINE_CHARS + 2);
    }

    #[test]
    fn failing_chart_is_skipped() {
        let table = sample();
        let findings = generate_insights(&table);
        let stats = compute_statistics(&table);
        let spec = histogram_spec("price", DEFAULT_ACCENT, &ChartLabels::default());
        let good = build_chart(&table, &spec).unwrap();
        let mut bad = good.clone();
        bad.title = "broken".to_string();
        let charts = [good.clone(), bad, good];

        let render = |figure: &Figure, dpi: u32| -> Result<Vec<u8>> {
            if figure.title == "broken" {
                Err(AnalyzerError::Render {
                    message: "no backend".to_string(),
                })
            } else {
                render_png(figure, dpi)
            }
        };
        let report = build_report(&input(&table, &findings, &stats, &charts), render).unwrap();
        assert!(report.bytes.starts_with(b"%PDF"));
        assert_eq!(report.pages, 4);

        let corrupt = |_: &Figure, _: u32| -> Result<Vec<u8>> { Ok(b"not a png".to_vec()) };
        let report = build_report(&input(&table, &findings, &stats, &charts), corrupt).unwrap();
        assert_eq!(report.pages, 2);
    }

    #[test]
    fn charts_add_pages() {
        let table = sample();
        let findings = generate_insights(&table);
        let stats = compute_statistics(&table);
        let spec = histogram_spec("price", DEFAULT_ACCENT, &ChartLabels::default());
        let figure = build_chart(&table, &spec).unwrap();
        let base = input(&table, &findings, &stats, &[]);
        let without = build_report(&base, render_png).unwrap();
        let charts = [figure.clone(), figure];
        let with = build_report(&ReportInput { charts: &charts, ..base }, render_png).unwrap();
        assert!(with.bytes.starts_with(b"%PDF"));
        assert!(with.bytes.len() > without.bytes.len());
        assert_eq!(with.pages, 4);
    }
}
