use crate::chart::color::{Rgb, DEFAULT_THRESHOLD_COLOR};
use crate::processing::aggregation::AggMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartKind {
    Histogram,
    #[default]
    Bar,
    Line,
    Scatter,
}

impl ChartKind {
    pub const ALL: [ChartKind; 4] = [
        ChartKind::Line,
        ChartKind::Bar,
        ChartKind::Scatter,
        ChartKind::Histogram,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ChartKind::Histogram => "Histogram",
            ChartKind::Bar => "Bar",
            ChartKind::Line => "Line",
            ChartKind::Scatter => "Scatter",
        }
    }

    /// Whether the chart plots a second column against x.
    pub fn uses_y(&self) -> bool {
        !matches!(self, ChartKind::Histogram)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThresholdAxis {
    X,
    #[default]
    Y,
}

impl ThresholdAxis {
    pub fn label(&self) -> &'static str {
        match self {
            ThresholdAxis::X => "X-axis",
            ThresholdAxis::Y => "Y-axis",
        }
    }
}

/// A dashed reference line: vertical on the x axis, horizontal on y.
#[derive(Debug, Clone, PartialEq)]
pub struct Threshold {
    pub axis: ThresholdAxis,
    pub value: f64,
    pub color: Rgb,
    /// Shown in a legend when non-empty.
    pub label: String,
}

impl Default for Threshold {
    fn default() -> Self {
        Self {
            axis: ThresholdAxis::Y,
            value: 0.0,
            color: DEFAULT_THRESHOLD_COLOR,
            label: String::new(),
        }
    }
}

/// Everything needed to draw one chart from a table.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub x_column: String,
    /// Unused by histograms; a bar chart without it counts categories.
    pub y_column: Option<String>,
    pub aggregation: AggMethod,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub accent: Rgb,
    pub threshold: Option<Threshold>,
    /// Horizontal bars (bar charts only).
    pub horizontal: bool,
}

impl ChartSpec {
    pub fn new(kind: ChartKind, x_column: impl Into<String>, accent: Rgb) -> Self {
        let x_column = x_column.into();
        Self {
            kind,
            x_label: x_column.clone(),
            x_column,
            y_column: None,
            aggregation: AggMethod::None,
            title: String::new(),
            y_label: String::new(),
            accent,
            threshold: None,
            horizontal: false,
        }
    }

    pub fn with_y(mut self, y_column: impl Into<String>) -> Self {
        let y = y_column.into();
        self.y_label = y.clone();
        self.y_column = Some(y);
        self
    }

    pub fn with_aggregation(mut self, method: AggMethod) -> Self {
        self.aggregation = method;
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_labels(mut self, x_label: impl Into<String>, y_label: impl Into<String>) -> Self {
        self.x_label = x_label.into();
        self.y_label = y_label.into();
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = Some(threshold);
        self
    }

    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }
}

/// User overrides for a distribution chart's title and axis labels.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ChartLabels {
    pub title: Option<String>,
    pub x_label: Option<String>,
    pub y_label: Option<String>,
}

/// Histogram of a numeric column as shown in the distribution section.
pub fn histogram_spec(column: &str, accent: Rgb, labels: &ChartLabels) -> ChartSpec {
    distribution_spec(ChartKind::Histogram, column, accent, labels, "Distribution")
}

/// Top-10 category counts of a text column.
pub fn category_spec(column: &str, accent: Rgb, labels: &ChartLabels) -> ChartSpec {
    distribution_spec(ChartKind::Bar, column, accent, labels, "Top 10 Categories")
}

fn distribution_spec(
    kind: ChartKind,
    column: &str,
    accent: Rgb,
    labels: &ChartLabels,
    suffix: &str,
) -> ChartSpec {
    ChartSpec::new(kind, column, accent)
        .with_title(
            labels
                .title
                .clone()
                .unwrap_or_else(|| format!("{column} {suffix}")),
        )
        .with_labels(
            labels.x_label.clone().unwrap_or_else(|| column.to_string()),
            labels.y_label.clone().unwrap_or_else(|| "Count".to_string()),
        )
}
