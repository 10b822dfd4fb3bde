//! Heuristic, human-readable findings about a table.
//!
//! Findings come out in a fixed order: missing values first, then one
//! distribution finding per numeric column, one dominant-category finding
//! per text column, and finally one outlier finding per numeric column.
//! Columns without any non-null value are skipped by every section except
//! the missing-value one.

use std::fmt;

use crate::data::table::Table;
use crate::processing::aggregation::value_counts;
use crate::processing::statistics::{mean, quantile_sorted, skewness, std_dev};

/// Multiplier applied to the IQR to get the outlier fences.
pub const IQR_FENCE: f64 = 1.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkewLabel {
    RightSkewed,
    LeftSkewed,
    Symmetrical,
}

impl SkewLabel {
    pub fn classify(skew: f64) -> Self {
        if skew > 1.0 {
            SkewLabel::RightSkewed
        } else if skew < -1.0 {
            SkewLabel::LeftSkewed
        } else {
            SkewLabel::Symmetrical
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SkewLabel::RightSkewed => "right-skewed",
            SkewLabel::LeftSkewed => "left-skewed",
            SkewLabel::Symmetrical => "fairly symmetrical",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierDirection {
    High,
    Low,
    HighAndLow,
}

impl OutlierDirection {
    pub fn label(&self) -> &'static str {
        match self {
            OutlierDirection::High => "high",
            OutlierDirection::Low => "low",
            OutlierDirection::HighAndLow => "high and low",
        }
    }
}

/// IQR fences and the values falling outside them.
#[derive(Debug, Clone, PartialEq)]
pub struct OutlierSummary {
    pub q1: f64,
    pub q3: f64,
    pub iqr: f64,
    pub lower: f64,
    pub upper: f64,
    pub high_count: usize,
    pub low_count: usize,
}

impl OutlierSummary {
    /// `None` for an empty input.
    pub fn compute(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile_sorted(&sorted, 0.25);
        let q3 = quantile_sorted(&sorted, 0.75);
        let iqr = q3 - q1;
        let lower = q1 - IQR_FENCE * iqr;
        let upper = q3 + IQR_FENCE * iqr;

        Some(Self {
            q1,
            q3,
            iqr,
            lower,
            upper,
            high_count: sorted.iter().filter(|&&v| v > upper).count(),
            low_count: sorted.iter().filter(|&&v| v < lower).count(),
        })
    }

    pub fn count(&self) -> usize {
        self.high_count + self.low_count
    }

    pub fn direction(&self) -> Option<OutlierDirection> {
        match (self.high_count > 0, self.low_count > 0) {
            (true, true) => Some(OutlierDirection::HighAndLow),
            (true, false) => Some(OutlierDirection::High),
            (false, true) => Some(OutlierDirection::Low),
            (false, false) => None,
        }
    }
}

/// One line of the generated summary.
#[derive(Debug, Clone, PartialEq)]
pub enum Finding {
    MissingValues {
        column: String,
        percent: f64,
        count: usize,
    },
    NoMissingValues,
    Distribution {
        column: String,
        min: f64,
        max: f64,
        mean: f64,
        std_dev: f64,
        skew: f64,
        label: SkewLabel,
    },
    DominantCategory {
        column: String,
        value: String,
        frequency: usize,
        percent: f64,
    },
    Outliers {
        column: String,
        count: usize,
        percent: f64,
        direction: OutlierDirection,
    },
    NoOutliers {
        column: String,
    },
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Finding::MissingValues { column, percent, count } => write!(
                f,
                "{column} has {percent:.1}% missing values ({} rows).",
                group_thousands(*count)
            ),
            Finding::NoMissingValues => write!(f, "No missing values detected."),
            Finding::Distribution { column, min, max, mean, std_dev, label, .. } => write!(
                f,
                "{column} ranges from {min:.1} to {max:.1}, mean = {mean:.1}, \
                 std = {std_dev:.1} ({}).",
                label.label()
            ),
            Finding::DominantCategory { column, value, percent, .. } => write!(
                f,
                "{column}: Most frequent value is '{value}' ({percent:.1}% of non-missing records)."
            ),
            Finding::Outliers { column, count, percent, direction } => write!(
                f,
                "{column} has {count} outlier{} ({percent:.1}%) on the {} end of the distribution.",
                if *count > 1 { "s" } else { "" },
                direction.label()
            ),
            Finding::NoOutliers { column } => write!(
                f,
                "{column} has no significant outliers based on the IQR method."
            ),
        }
    }
}

/// Shape and column groups shown above the findings.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetOverview {
    pub rows: usize,
    pub columns: usize,
    pub numeric_columns: Vec<String>,
    pub text_columns: Vec<String>,
}

pub fn dataset_overview(table: &Table) -> DatasetOverview {
    DatasetOverview {
        rows: table.row_count(),
        columns: table.column_count(),
        numeric_columns: table.numeric_columns().map(|c| c.name.clone()).collect(),
        text_columns: table.text_columns().map(|c| c.name.clone()).collect(),
    }
}

pub fn generate_insights(table: &Table) -> Vec<Finding> {
    let mut findings = Vec::new();
    let rows = table.row_count();

    let missing: Vec<Finding> = table
        .columns()
        .iter()
        .filter_map(|col| {
            let count = col.null_count();
            (count > 0).then(|| Finding::MissingValues {
                column: col.name.clone(),
                percent: percent_of(count, rows),
                count,
            })
        })
        .collect();
    if missing.is_empty() {
        findings.push(Finding::NoMissingValues);
    } else {
        findings.extend(missing);
    }

    for col in table.numeric_columns() {
        let values = col.numbers();
        if values.is_empty() {
            continue;
        }
        let skew = skewness(&values);
        findings.push(Finding::Distribution {
            column: col.name.clone(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: mean(&values),
            std_dev: std_dev(&values),
            skew,
            label: SkewLabel::classify(skew),
        });
    }

    for col in table.text_columns() {
        let values = col.texts();
        let Some((value, frequency)) = value_counts(&values).into_iter().next() else {
            continue;
        };
        findings.push(Finding::DominantCategory {
            column: col.name.clone(),
            value,
            frequency,
            percent: percent_of(frequency, values.len()),
        });
    }

    for col in table.numeric_columns() {
        let values = col.numbers();
        let Some(summary) = OutlierSummary::compute(&values) else {
            continue;
        };
        let finding = match summary.direction() {
            None => Finding::NoOutliers {
                column: col.name.clone(),
            },
            Some(direction) => Finding::Outliers {
                column: col.name.clone(),
                count: summary.count(),
                percent: percent_of(summary.count(), values.len()),
                direction,
            },
        };
        findings.push(finding);
    }

    tracing::debug!(count = findings.len(), "generated insights");
    findings
}

/// Plain-text rendering of the overview block followed by the findings.
pub fn render_summary(overview: &DatasetOverview, findings: &[Finding]) -> String {
    let join = |names: &[String]| {
        if names.is_empty() { "None".to_string() } else { names.join(", ") }
    };

    let mut out = String::from("Smart Data Insights\n");
    out.push_str(&format!(
        "Shape: {} rows \u{00d7} {} columns\n",
        group_thousands(overview.rows),
        overview.columns
    ));
    out.push_str(&format!(
        "Numeric columns ({}): {}\n",
        overview.numeric_columns.len(),
        join(&overview.numeric_columns)
    ));
    out.push_str(&format!(
        "Text columns ({}): {}\n",
        overview.text_columns.len(),
        join(&overview.text_columns)
    ));
    out.push_str("Insights:\n");
    for finding in findings {
        out.push_str(&format!("\u{2022} {finding}\n"));
    }
    out
}

fn percent_of(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

/// `1234567` -> `1,234,567`.
pub fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Column;

    fn nums(values: &[f64]) -> Vec<Option<f64>> {
        values.iter().copied().map(Some).collect()
    }

    fn texts(values: &[&str]) -> Vec<Option<String>> {
        values.iter().map(|s| Some(s.to_string())).collect()
    }

    #[test]
    fn no_missing_values_is_a_single_finding() {
        let table = Table::new(vec![
            Column::numeric("a", nums(&[1.0, 2.0])),
            Column::text("b", texts(&["x", "y"])),
        ]);
        let findings = generate_insights(&table);
        let missing: Vec<_> = findings
            .iter()
            .filter(|f| matches!(f, Finding::NoMissingValues | Finding::MissingValues { .. }))
            .collect();
        assert_eq!(missing, vec![&Finding::NoMissingValues]);
        assert_eq!(findings[0].to_string(), "No missing values detected.");
    }

    #[test]
    fn missing_values_per_column() {
        let table = Table::new(vec![
            Column::numeric("a", vec![Some(1.0), None, None, Some(4.0)]),
            Column::text("b", vec![None, Some("x".into()), Some("y".into()), Some("z".into())]),
        ]);
        let findings = generate_insights(&table);
        assert_eq!(
            findings[0].to_string(),
            "a has 50.0% missing values (2 rows)."
        );
        assert_eq!(
            findings[1].to_string(),
            "b has 25.0% missing values (1 rows)."
        );
    }

    #[test]
    fn constant_column_is_symmetrical() {
        let table = Table::new(vec![Column::numeric("c", nums(&[7.0; 5]))]);
        let findings = generate_insights(&table);
        match &findings[1] {
            Finding::Distribution { label, skew, .. } => {
                assert_eq!(*label, SkewLabel::Symmetrical);
                assert_eq!(*skew, 0.0);
            }
            other => panic!("unexpected finding {other:?}"),
        }
        assert!(matches!(findings[2], Finding::NoOutliers { .. }));
    }

    #[test]
    fn large_offsets_keep_their_skew() {
        let table = Table::new(vec![Column::numeric(
            "ts",
            nums(&[1e8, 1e8, 1e8, 1e8 + 3.0]),
        )]);
        let findings = generate_insights(&table);
        match &findings[1] {
            Finding::Distribution { label, skew, .. } => {
                assert_eq!(*label, SkewLabel::RightSkewed);
                assert!((skew - 2.0).abs() < 1e-6, "got {skew}");
            }
            other => panic!("unexpected finding {other:?}"),
        }
        assert!(findings[1].to_string().ends_with("(right-skewed)."));
    }

    #[test]
    fn all_null_column_is_skipped() {
        let table = Table::new(vec![
            Column::numeric("ghost", vec![None, None, None]),
            Column::text("shade", vec![None, None, None]),
        ]);
        let findings = generate_insights(&table);
        assert_eq!(findings.len(), 2);
        assert!(findings
            .iter()
            .all(|f| matches!(f, Finding::MissingValues { .. })));
    }

    #[test]
    fn iqr_fences_flag_single_high_value() {
        let summary = OutlierSummary::compute(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert!((summary.q1 - 2.25).abs() < 1e-12);
        assert!((summary.q3 - 4.75).abs() < 1e-12);
        assert!((summary.iqr - 2.5).abs() < 1e-12);
        assert!((summary.upper - 8.5).abs() < 1e-12);
        assert_eq!(summary.count(), 1);
        assert_eq!(summary.direction(), Some(OutlierDirection::High));
    }

    #[test]
    fn outliers_on_both_ends() {
        let summary =
            OutlierSummary::compute(&[-100.0, 1.0, 2.0, 3.0, 4.0, 5.0, 100.0]).unwrap();
        assert_eq!(summary.count(), 2);
        assert_eq!(summary.direction(), Some(OutlierDirection::HighAndLow));
        assert_eq!(summary.direction().unwrap().label(), "high and low");
    }

    #[test]
    fn mode_ties_keep_first_seen() {
        let table = Table::new(vec![Column::text("t", texts(&["b", "a", "a", "b", "c"]))]);
        let findings = generate_insights(&table);
        match &findings[1] {
            Finding::DominantCategory { value, frequency, percent, .. } => {
                assert_eq!(value, "b");
                assert_eq!(*frequency, 2);
                assert!((percent - 40.0).abs() < 1e-12);
            }
            other => panic!("unexpected finding {other:?}"),
        }
    }

    #[test]
    fn price_and_category_scenario() {
        let table = Table::new(vec![
            Column::numeric("price", nums(&[10.0, 20.0, 30.0, 1000.0])),
            Column::text("category", texts(&["A", "A", "B", "C"])),
        ]);
        let findings = generate_insights(&table);
        let lines: Vec<String> = findings.iter().map(ToString::to_string).collect();

        assert_eq!(lines[0], "No missing values detected.");
        assert!(lines[1].starts_with("price ranges from 10.0 to 1000.0, mean = 265.0"));
        assert!(lines[1].ends_with("(right-skewed)."));
        assert_eq!(
            lines[2],
            "category: Most frequent value is 'A' (50.0% of non-missing records)."
        );
        assert_eq!(
            lines[3],
            "price has 1 outlier (25.0%) on the high end of the distribution."
        );
    }

    #[test]
    fn empty_table_does_not_divide_by_zero() {
        let table = Table::new(vec![Column::numeric("a", Vec::new())]);
        let findings = generate_insights(&table);
        assert_eq!(findings, vec![Finding::NoMissingValues]);
    }

    #[test]
    fn summary_lists_columns_and_findings() {
        let table = Table::new(vec![
            Column::numeric("n", nums(&[1.0, 2.0, 3.0])),
            Column::text("t", texts(&["a", "a", "b"])),
        ]);
        let findings = generate_insights(&table);
        let text = render_summary(&dataset_overview(&table), &findings);
        assert!(text.contains("Shape: 3 rows \u{00d7} 2 columns"));
        assert!(text.contains("Numeric columns (1): n"));
        assert!(text.contains("Text columns (1): t"));
        assert_eq!(text.matches('\u{2022}').count(), findings.len());
    }

    #[test]
    fn thousands_are_grouped() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }
}
