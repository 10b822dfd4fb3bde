//! Turns a [`ChartSpec`] into a [`Figure`].
//!
//! Validation runs before any work: bar values must be numeric, line and
//! scatter axes must both be numeric, and histograms need a numeric column.
//! A failed validation returns an error and nothing else.

use crate::chart::figure::{Figure, Marks, CATEGORY_LABEL_ROTATION};
use crate::chart::spec::{ChartKind, ChartSpec, ThresholdAxis};
use crate::data::table::{format_number, Column, ColumnValues, Table};
use crate::error::{AnalyzerError, Result};
use crate::processing::aggregation::{aggregate, value_counts, AggMethod};

pub const HISTOGRAM_BINS: usize = 20;
pub const TOP_CATEGORIES: usize = 10;
/// Space left above the tallest bar.
pub const HEADROOM: f64 = 1.1;
/// Padding around line and scatter data, as a fraction of the span.
const DATA_MARGIN: f64 = 0.05;

pub fn build_chart(table: &Table, spec: &ChartSpec) -> Result<Figure> {
    let x_col = lookup(table, &spec.x_column)?;

    let figure = match spec.kind {
        ChartKind::Histogram => histogram(x_col, spec)?,
        ChartKind::Bar => match &spec.y_column {
            Some(y) => aggregated_bars(table, x_col, lookup(table, y)?, spec)?,
            None => category_bars(x_col, spec),
        },
        ChartKind::Line | ChartKind::Scatter => {
            let y = spec
                .y_column
                .as_deref()
                .ok_or(AnalyzerError::MissingYColumn { kind: spec.kind })?;
            let y_col = lookup(table, y)?;
            for col in [x_col, y_col] {
                if !col.is_numeric() {
                    return Err(AnalyzerError::NonNumericAxis {
                        column: col.name.clone(),
                    });
                }
            }
            if spec.kind == ChartKind::Line {
                line(table, spec, y)?
            } else {
                scatter(x_col, y_col, spec)
            }
        }
    };

    tracing::debug!(
        kind = figure.kind.label(),
        marks = figure.mark_count(),
        "built chart"
    );
    Ok(figure)
}

fn lookup<'a>(table: &'a Table, name: &str) -> Result<&'a Column> {
    table.column(name).ok_or_else(|| AnalyzerError::ColumnNotFound {
        name: name.to_string(),
    })
}

fn base_figure(spec: &ChartSpec, marks: Marks, x_range: (f64, f64), y_range: (f64, f64)) -> Figure {
    Figure {
        kind: spec.kind,
        title: spec.title.clone(),
        x_label: spec.x_label.clone(),
        y_label: spec.y_label.clone(),
        accent: spec.accent,
        marks,
        x_range,
        y_range,
        x_label_rotation: 0.0,
        threshold: spec.threshold.clone(),
    }
}

/// Equal-width bins over the observed range. An empty input spans `[0, 1]`
/// and a constant one `[v - 0.5, v + 0.5]`; the last bin is closed.
pub fn histogram_bins(values: &[f64], bins: usize) -> (Vec<f64>, Vec<usize>) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    let bins = bins.max(1);

    let (mut lo, mut hi) = finite
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));
    if finite.is_empty() {
        (lo, hi) = (0.0, 1.0);
    } else if lo == hi {
        (lo, hi) = (lo - 0.5, hi + 0.5);
    }

    // Divide before subtracting so spans near f64::MAX stay finite.
    let n = bins as f64;
    let width = hi / n - lo / n;
    let mut edges: Vec<f64> = (0..=bins).map(|i| lo + width * i as f64).collect();
    edges[bins] = hi;

    let mut counts = vec![0usize; bins];
    for v in finite {
        let idx = ((v / width - lo / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    (edges, counts)
}

fn count_upper(max: usize) -> f64 {
    if max > 0 { max as f64 * HEADROOM } else { 1.0 }
}

fn histogram(col: &Column, spec: &ChartSpec) -> Result<Figure> {
    if !col.is_numeric() {
        return Err(AnalyzerError::NonNumericAxis {
            column: col.name.clone(),
        });
    }
    let (edges, counts) = histogram_bins(&col.numbers(), HISTOGRAM_BINS);
    let x_range = (edges[0], edges[edges.len() - 1]);
    let y_range = (0.0, count_upper(counts.iter().copied().max().unwrap_or(0)));
    Ok(base_figure(spec, Marks::Histogram { edges, counts }, x_range, y_range))
}

/// Top categories by frequency. Numeric columns count their values.
fn category_bars(col: &Column, spec: &ChartSpec) -> Figure {
    let cells: Vec<String> = match &col.values {
        ColumnValues::Text(v) => v.iter().flatten().cloned().collect(),
        ColumnValues::Numeric(v) => v.iter().flatten().map(|n| format_number(*n)).collect(),
    };
    let refs: Vec<&str> = cells.iter().map(String::as_str).collect();
    let top: Vec<(String, usize)> = value_counts(&refs).into_iter().take(TOP_CATEGORIES).collect();

    let max = top.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let (labels, values): (Vec<String>, Vec<f64>) =
        top.into_iter().map(|(label, count)| (label, count as f64)).unzip();

    let x_range = category_range(labels.len());
    let marks = Marks::Bars {
        labels,
        values,
        horizontal: false,
    };
    let mut figure = base_figure(spec, marks, x_range, (0.0, count_upper(max)));
    figure.x_label_rotation = CATEGORY_LABEL_ROTATION;
    figure
}

fn category_range(n: usize) -> (f64, f64) {
    (-0.5, n.max(1) as f64 - 0.5)
}

/// Value-axis bounds for bars: headroom above the maximum, or 1 when nothing
/// is positive; negative bars extend the lower bound.
fn value_range(values: &[f64]) -> (f64, f64) {
    let finite = values.iter().copied().filter(|v| v.is_finite());
    let (min, max) = finite.fold((0.0f64, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    let top = if max > 0.0 { max } else { 1.0 };
    let bottom = if min < 0.0 { min * HEADROOM } else { 0.0 };
    (bottom, top * HEADROOM)
}

fn aggregated_bars(
    table: &Table,
    x_col: &Column,
    y_col: &Column,
    spec: &ChartSpec,
) -> Result<Figure> {
    if !y_col.is_numeric() {
        return Err(AnalyzerError::NonNumericAggregationTarget {
            column: y_col.name.clone(),
        });
    }

    let series = aggregate(table, &x_col.name, &y_col.name, spec.aggregation)?;
    let labels: Vec<String> = series.keys.iter().map(|k| k.label()).collect();
    let category = category_range(labels.len());
    let value = value_range(&series.values);

    let marks = Marks::Bars {
        labels,
        values: series.values,
        horizontal: spec.horizontal,
    };

    let figure = if spec.horizontal {
        let mut f = base_figure(spec, marks, value, category);
        f.x_label = spec.y_label.clone();
        f.y_label = spec.x_label.clone();
        f
    } else {
        let mut f = base_figure(spec, marks, category, value);
        f.x_label_rotation = CATEGORY_LABEL_ROTATION;
        f
    };
    Ok(figure)
}

/// Mean of y per x in first-seen x order; no sorting is applied.
fn line(table: &Table, spec: &ChartSpec, y: &str) -> Result<Figure> {
    let series = aggregate(table, &spec.x_column, y, AggMethod::Mean)?;
    let points: Vec<(f64, f64)> = series
        .keys
        .iter()
        .zip(&series.values)
        .filter_map(|(k, &v)| Some((k.as_number()?, v)).filter(|_| v.is_finite()))
        .collect();
    Ok(point_figure(spec, Marks::Line { points: points.clone() }, &points))
}

fn scatter(x_col: &Column, y_col: &Column, spec: &ChartSpec) -> Figure {
    let points: Vec<(f64, f64)> = (0..x_col.len())
        .filter_map(|row| Some((x_col.number_at(row)?, y_col.number_at(row)?)))
        .collect();
    point_figure(spec, Marks::Scatter { points: points.clone() }, &points)
}

fn point_figure(spec: &ChartSpec, marks: Marks, points: &[(f64, f64)]) -> Figure {
    let mut xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let mut ys: Vec<f64> = points.iter().map(|p| p.1).collect();

    // Autoscaled axes also make room for the reference line.
    if let Some(t) = &spec.threshold {
        match t.axis {
            ThresholdAxis::X => xs.push(t.value),
            ThresholdAxis::Y => ys.push(t.value),
        }
    }

    base_figure(spec, marks, padded_range(&xs), padded_range(&ys))
}

fn padded_range(values: &[f64]) -> (f64, f64) {
    let (lo, hi) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));
    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    if lo == hi {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = (hi - lo) * DATA_MARGIN;
    (lo - pad, hi + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::color::{DEFAULT_ACCENT, DEFAULT_THRESHOLD_COLOR};
    use crate::chart::spec::Threshold;

    fn table() -> Table {
        Table::new(vec![
            Column::numeric(
                "x",
                vec![Some(3.0), Some(1.0), Some(3.0), Some(2.0), None],
            ),
            Column::numeric(
                "y",
                vec![Some(10.0), Some(20.0), Some(30.0), None, Some(5.0)],
            ),
            Column::text(
                "city",
                ["Oslo", "Rome", "Oslo", "Lima", "Oslo"]
                    .iter()
                    .map(|s| Some(s.to_string()))
                    .collect(),
            ),
        ])
    }

    #[test]
    fn line_with_text_axis_fails() {
        let spec = ChartSpec::new(ChartKind::Line, "city", DEFAULT_ACCENT).with_y("y");
        let err = build_chart(&table(), &spec).unwrap_err();
        assert!(matches!(err, AnalyzerError::NonNumericAxis { column } if column == "city"));

        let spec = ChartSpec::new(ChartKind::Line, "x", DEFAULT_ACCENT).with_y("city");
        assert!(build_chart(&table(), &spec).is_err());
    }

    #[test]
    fn scatter_needs_a_y_column() {
        let spec = ChartSpec::new(ChartKind::Scatter, "x", DEFAULT_ACCENT);
        assert!(matches!(
            build_chart(&table(), &spec),
            Err(AnalyzerError::MissingYColumn { kind: ChartKind::Scatter })
        ));
    }

    #[test]
    fn bar_with_text_values_fails() {
        let spec = ChartSpec::new(ChartKind::Bar, "x", DEFAULT_ACCENT)
            .with_y("city")
            .with_aggregation(AggMethod::Sum);
        assert!(matches!(
            build_chart(&table(), &spec),
            Err(AnalyzerError::NonNumericAggregationTarget { .. })
        ));
    }

    #[test]
    fn unknown_column_is_reported() {
        let spec = ChartSpec::new(ChartKind::Histogram, "missing", DEFAULT_ACCENT);
        assert!(matches!(
            build_chart(&table(), &spec),
            Err(AnalyzerError::ColumnNotFound { .. })
        ));
    }

    #[test]
    fn line_keeps_first_seen_order() {
        let spec = ChartSpec::new(ChartKind::Line, "x", DEFAULT_ACCENT).with_y("y");
        let figure = build_chart(&table(), &spec).unwrap();
        match figure.marks {
            // x=2 has no y value, so its mean is dropped.
            Marks::Line { points } => assert_eq!(points, vec![(3.0, 20.0), (1.0, 20.0)]),
            other => panic!("unexpected marks {other:?}"),
        }
    }

    #[test]
    fn scatter_drops_incomplete_rows() {
        let spec = ChartSpec::new(ChartKind::Scatter, "x", DEFAULT_ACCENT).with_y("y");
        let figure = build_chart(&table(), &spec).unwrap();
        assert_eq!(figure.mark_count(), 3);
    }

    #[test]
    fn histogram_has_twenty_bins_and_headroom() {
        let spec = ChartSpec::new(ChartKind::Histogram, "y", DEFAULT_ACCENT);
        let figure = build_chart(&table(), &spec).unwrap();
        match &figure.marks {
            Marks::Histogram { edges, counts } => {
                assert_eq!(counts.len(), HISTOGRAM_BINS);
                assert_eq!(edges.len(), HISTOGRAM_BINS + 1);
                assert_eq!(counts.iter().sum::<usize>(), 4);
                assert_eq!(edges[0], 5.0);
                assert_eq!(edges[HISTOGRAM_BINS], 30.0);
                assert_eq!(counts[HISTOGRAM_BINS - 1], 1);
            }
            other => panic!("unexpected marks {other:?}"),
        }
        assert!((figure.y_range.1 - 1.1).abs() < 1e-12);
    }

    #[test]
    fn histogram_of_empty_and_constant_columns() {
        let (edges, counts) = histogram_bins(&[], HISTOGRAM_BINS);
        assert_eq!((edges[0], edges[HISTOGRAM_BINS]), (0.0, 1.0));
        assert!(counts.iter().all(|&c| c == 0));
        assert_eq!(count_upper(0), 1.0);

        let (edges, counts) = histogram_bins(&[2.0, 2.0], HISTOGRAM_BINS);
        assert_eq!((edges[0], edges[HISTOGRAM_BINS]), (1.5, 2.5));
        assert_eq!(counts.iter().sum::<usize>(), 2);
    }

    #[test]
    fn category_bars_rank_by_frequency() {
        let spec = ChartSpec::new(ChartKind::Bar, "city", DEFAULT_ACCENT);
        let figure = build_chart(&table(), &spec).unwrap();
        assert_eq!(
            figure.categories().unwrap(),
            &["Oslo".to_string(), "Rome".to_string(), "Lima".to_string()]
        );
        assert_eq!(figure.x_label_rotation, CATEGORY_LABEL_ROTATION);
        assert!((figure.y_range.1 - 3.3).abs() < 1e-12);
    }

    #[test]
    fn category_bars_keep_only_top_ten() {
        let values: Vec<Option<String>> = (0..15).map(|i| Some(format!("c{i}"))).collect();
        let table = Table::new(vec![Column::text("c", values)]);
        let spec = ChartSpec::new(ChartKind::Bar, "c", DEFAULT_ACCENT);
        let figure = build_chart(&table, &spec).unwrap();
        assert_eq!(figure.mark_count(), TOP_CATEGORIES);
    }

    #[test]
    fn horizontal_bars_swap_axes() {
        let spec = ChartSpec::new(ChartKind::Bar, "city", DEFAULT_ACCENT)
            .with_y("y")
            .with_aggregation(AggMethod::Sum)
            .with_labels("City", "Total")
            .horizontal(true);
        let figure = build_chart(&table(), &spec).unwrap();
        assert!(figure.is_horizontal());
        assert_eq!(figure.x_label, "Total");
        assert_eq!(figure.y_label, "City");
        assert_eq!(figure.x_label_rotation, 0.0);
        assert_eq!(figure.y_range, (-0.5, 2.5));
        match &figure.marks {
            Marks::Bars { values, .. } => assert_eq!(values, &vec![45.0, 20.0, 0.0]),
            other => panic!("unexpected marks {other:?}"),
        }
    }

    #[test]
    fn threshold_is_carried_and_widens_autoscale() {
        let threshold = Threshold {
            axis: ThresholdAxis::Y,
            value: 100.0,
            color: DEFAULT_THRESHOLD_COLOR,
            label: String::new(),
        };
        let spec = ChartSpec::new(ChartKind::Scatter, "x", DEFAULT_ACCENT)
            .with_y("y")
            .with_threshold(threshold);
        let figure = build_chart(&table(), &spec).unwrap();
        assert!(figure.y_range.1 > 100.0);
        assert!(!figure.shows_legend());
    }

    #[test]
    fn building_does_not_touch_the_table() {
        let before = table();
        let after = before.clone();
        let spec = ChartSpec::new(ChartKind::Bar, "city", DEFAULT_ACCENT)
            .with_y("y")
            .with_aggregation(AggMethod::Mean);
        let first = build_chart(&after, &spec).unwrap();
        let second = build_chart(&after, &spec).unwrap();
        assert_eq!(before, after);
        // Lima has no y values, so its mean bar is NaN; Debug output
        // compares NaN equal to itself.
        assert_eq!(format!("{first:?}"), format!("{second:?}"));
    }

    #[test]
    fn histogram_bins_span_the_full_f64_range() {
        let (edges, counts) = histogram_bins(&[-1e308, 0.0, 1e308], 20);
        assert!(edges.iter().all(|e| e.is_finite()), "{edges:?}");
        assert_eq!(edges[0], -1e308);
        assert_eq!(edges[20], 1e308);
        assert!(edges.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(counts.iter().sum::<usize>(), 3);
        assert_eq!(counts[0], 1);
        assert_eq!(counts[19], 1);
    }
}
