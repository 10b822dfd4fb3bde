use std::collections::HashMap;

use crate::chart::builder::build_chart;
use crate::chart::color::Rgb;
use crate::chart::figure::Figure;
use crate::chart::spec::{
    category_spec, histogram_spec, ChartKind, ChartLabels, ChartSpec, Threshold,
};
use crate::data::loader::LoadedTable;
use crate::data::table::Table;
use crate::error::Result;
use crate::processing::aggregation::AggMethod;
use crate::processing::insights::{dataset_overview, generate_insights, DatasetOverview, Finding};
use crate::processing::statistics::{compute_statistics, ColumnStatistics};
use crate::report::pdf::ReportInput;

pub const VERSION: &str = "0.1.0";

/// Number of leading rows shown in the overview preview.
pub const PREVIEW_ROWS: usize = 50;

/// Insight engine output for the loaded table, computed once per load.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub overview: DatasetOverview,
    pub findings: Vec<Finding>,
    pub statistics: Vec<ColumnStatistics>,
}

impl Analysis {
    pub fn of(table: &Table) -> Self {
        let analysis = Self {
            overview: dataset_overview(table),
            findings: generate_insights(table),
            statistics: compute_statistics(table),
        };
        tracing::debug!(
            findings = analysis.findings.len(),
            numeric = analysis.statistics.len(),
            "analysis computed"
        );
        analysis
    }
}

/// A histogram or top-categories chart shown in the overview tab.
#[derive(Debug, Clone)]
pub struct DistributionChart {
    pub column: String,
    pub kind: ChartKind,
    pub figure: std::result::Result<Figure, String>,
}

impl DistributionChart {
    pub fn file_name(&self) -> String {
        match self.kind {
            ChartKind::Histogram => format!("{}_distribution.png", self.column),
            _ => format!("{}_categories.png", self.column),
        }
    }
}

/// Editable state of the custom chart builder.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartForm {
    pub kind: ChartKind,
    pub x_column: String,
    pub y_column: String,
    pub aggregation: AggMethod,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub threshold_enabled: bool,
    pub threshold: Threshold,
    pub horizontal: bool,
    /// Columns the defaulted title and labels were derived from.
    defaults_for: (String, String),
}

impl ChartForm {
    pub fn new(table: &Table) -> Self {
        let names = table.column_names();
        let x = names.first().map(|s| s.to_string()).unwrap_or_default();
        let y = names.get(1).or(names.first()).map(|s| s.to_string()).unwrap_or_default();
        let mut form = Self {
            kind: ChartKind::Line,
            x_column: x,
            y_column: y,
            aggregation: AggMethod::Mean,
            title: String::new(),
            x_label: String::new(),
            y_label: String::new(),
            threshold_enabled: false,
            threshold: Threshold::default(),
            horizontal: false,
            defaults_for: (String::new(), String::new()),
        };
        form.sync_defaults();
        form
    }

    /// Refresh the title and axis labels after the column choice changed,
    /// unless the user has already edited them.
    pub fn sync_defaults(&mut self) {
        let (old_x, old_y) = &self.defaults_for;
        if *old_x == self.x_column && *old_y == self.y_column {
            return;
        }
        if self.title.is_empty() || self.title == format!("{old_y} by {old_x}") {
            self.title = format!("{} by {}", self.y_column, self.x_column);
        }
        if self.x_label.is_empty() || self.x_label == *old_x {
            self.x_label = self.x_column.clone();
        }
        if self.y_label.is_empty() || self.y_label == *old_y {
            self.y_label = self.y_column.clone();
        }
        self.defaults_for = (self.x_column.clone(), self.y_column.clone());
    }

    /// Whether the aggregation selector applies to the current kind.
    pub fn uses_aggregation(&self) -> bool {
        matches!(self.kind, ChartKind::Bar | ChartKind::Line)
    }

    pub fn to_spec(&self, accent: Rgb) -> ChartSpec {
        let mut spec = ChartSpec::new(self.kind, self.x_column.clone(), accent)
            .with_title(self.title.clone())
            .horizontal(self.kind == ChartKind::Bar && self.horizontal);
        if self.kind.uses_y() {
            spec = spec.with_y(self.y_column.clone());
        }
        if self.uses_aggregation() {
            spec = spec.with_aggregation(self.aggregation);
        }
        spec = spec.with_labels(self.x_label.clone(), self.y_label.clone());
        if self.threshold_enabled {
            spec = spec.with_threshold(self.threshold.clone());
        }
        spec
    }
}

/// Everything tied to the currently loaded dataset.
#[derive(Debug, Clone)]
pub struct Session {
    pub dataset: LoadedTable,
    pub analysis: Analysis,
    pub selected_numeric: Vec<String>,
    pub selected_text: Vec<String>,
    pub label_overrides: HashMap<String, ChartLabels>,
    pub form: ChartForm,
    /// The most recently generated custom chart; goes into the report.
    pub last_custom_chart: Option<Figure>,
    pub form_error: Option<String>,
    distributions: Vec<DistributionChart>,
    distributions_accent: Option<Rgb>,
}

impl Session {
    pub fn new(dataset: LoadedTable) -> Self {
        let analysis = Analysis::of(&dataset.table);
        let form = ChartForm::new(&dataset.table);
        tracing::info!(
            source = %dataset.source_name,
            rows = dataset.table.row_count(),
            columns = dataset.table.column_count(),
            "dataset loaded"
        );
        Self {
            dataset,
            analysis,
            selected_numeric: Vec::new(),
            selected_text: Vec::new(),
            label_overrides: HashMap::new(),
            form,
            last_custom_chart: None,
            form_error: None,
            distributions: Vec::new(),
            distributions_accent: None,
        }
    }

    pub fn table(&self) -> &Table {
        &self.dataset.table
    }

    /// Display name, including the sheet for workbooks.
    pub fn title(&self) -> String {
        match &self.dataset.sheet {
            Some(sheet) => format!("{} [{}]", self.dataset.source_name, sheet),
            None => self.dataset.source_name.clone(),
        }
    }

    pub fn toggle_numeric(&mut self, column: &str) {
        toggle(&mut self.selected_numeric, column);
        self.invalidate_distributions();
    }

    pub fn toggle_text(&mut self, column: &str) {
        toggle(&mut self.selected_text, column);
        self.invalidate_distributions();
    }

    pub fn set_labels(&mut self, column: &str, labels: ChartLabels) {
        if labels == ChartLabels::default() {
            self.label_overrides.remove(column);
        } else {
            self.label_overrides.insert(column.to_string(), labels);
        }
        self.invalidate_distributions();
    }

    pub fn labels_for(&self, column: &str) -> ChartLabels {
        self.label_overrides.get(column).cloned().unwrap_or_default()
    }

    pub fn invalidate_distributions(&mut self) {
        self.distributions_accent = None;
    }

    fn distribution_specs(&self, accent: Rgb) -> Vec<ChartSpec> {
        let numeric = self
            .selected_numeric
            .iter()
            .map(|c| histogram_spec(c, accent, &self.labels_for(c)));
        let text = self
            .selected_text
            .iter()
            .map(|c| category_spec(c, accent, &self.labels_for(c)));
        numeric.chain(text).collect()
    }

    /// Distribution charts for the selected columns, rebuilt when the
    /// selection, label overrides or accent change.
    pub fn distributions(&mut self, accent: Rgb) -> &[DistributionChart] {
        if self.distributions_accent != Some(accent) {
            let charts = self
                .distribution_specs(accent)
                .into_iter()
                .map(|spec| DistributionChart {
                    figure: build_chart(self.table(), &spec).map_err(|e| e.to_string()),
                    column: spec.x_column,
                    kind: spec.kind,
                })
                .collect();
            self.distributions = charts;
            self.distributions_accent = Some(accent);
        }
        &self.distributions
    }

    /// Build the custom chart from the form. On success the figure becomes
    /// the last custom chart.
    pub fn generate_custom_chart(&mut self, accent: Rgb) -> Result<&Figure> {
        let spec = self.form.to_spec(accent);
        match build_chart(self.table(), &spec) {
            Ok(figure) => {
                self.form_error = None;
                tracing::info!(
                    kind = spec.kind.label(),
                    title = %figure.title,
                    "custom chart generated"
                );
                let figure: &Figure = self.last_custom_chart.insert(figure);
                Ok(figure)
            }
            Err(e) => {
                self.form_error = Some(e.to_string());
                tracing::warn!("custom chart rejected: {e}");
                Err(e)
            }
        }
    }

    /// Charts for the PDF report: selected distributions, then the last
    /// custom chart. Charts that fail to build are left out.
    pub fn report_charts(&self, accent: Rgb) -> Vec<Figure> {
        let mut charts: Vec<Figure> = self
            .distribution_specs(accent)
            .iter()
            .filter_map(|spec| match build_chart(self.table(), spec) {
                Ok(figure) => Some(figure),
                Err(e) => {
                    tracing::warn!(column = %spec.x_column, "skipping report chart: {e}");
                    None
                }
            })
            .collect();
        charts.extend(self.last_custom_chart.clone());
        charts
    }

    pub fn report_input<'a>(&'a self, charts: &'a [Figure], dpi: u32) -> ReportInput<'a> {
        ReportInput {
            rows: self.table().row_count(),
            columns: self.table().column_count(),
            findings: &self.analysis.findings,
            statistics: &self.analysis.statistics,
            charts,
            dpi,
        }
    }
}

fn toggle(selection: &mut Vec<String>, column: &str) {
    if let Some(pos) = selection.iter().position(|c| c == column) {
        selection.remove(pos);
    } else {
        selection.push(column.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::color::DEFAULT_ACCENT;
    use crate::data::table::Column;
    use crate::error::AnalyzerError;

    fn session() -> Session {
        let table = Table::new(vec![
            Column::text(
                "city",
                vec![Some("Oslo".into()), Some("Rome".into()), Some("Oslo".into())],
            ),
            Column::numeric("sales", vec![Some(1.0), Some(2.0), Some(3.0)]),
        ]);
        Session::new(LoadedTable {
            source_name: "sales.csv".into(),
            sheet: None,
            table,
        })
    }

    #[test]
    fn form_defaults_follow_columns_until_edited() {
        let mut s = session();
        assert_eq!(s.form.title, "sales by city");
        assert_eq!(s.form.x_label, "city");

        s.form.x_column = "sales".into();
        s.form.sync_defaults();
        assert_eq!(s.form.title, "sales by sales");

        s.form.title = "My chart".into();
        s.form.x_column = "city".into();
        s.form.sync_defaults();
        assert_eq!(s.form.title, "My chart");
        assert_eq!(s.form.x_label, "city");
    }

    #[test]
    fn custom_chart_is_kept_for_the_report() {
        let mut s = session();
        s.form.kind = ChartKind::Bar;
        s.form.aggregation = AggMethod::Sum;
        let figure = s.generate_custom_chart(DEFAULT_ACCENT).unwrap();
        assert_eq!(figure.mark_count(), 2);
        assert!(s.last_custom_chart.is_some());

        s.toggle_numeric("sales");
        s.toggle_text("city");
        let charts = s.report_charts(DEFAULT_ACCENT);
        assert_eq!(charts.len(), 3);
        assert_eq!(charts[0].title, "sales Distribution");
        assert_eq!(charts[1].title, "city Top 10 Categories");
        assert_eq!(charts[2].title, "sales by city");
    }

    #[test]
    fn rejected_chart_keeps_previous_one() {
        let mut s = session();
        s.form.kind = ChartKind::Scatter;
        assert!(matches!(
            s.generate_custom_chart(DEFAULT_ACCENT),
            Err(AnalyzerError::NonNumericAxis { .. })
        ));
        assert!(s.form_error.is_some());
        assert!(s.last_custom_chart.is_none());
    }

    #[test]
    fn distributions_follow_selection_and_overrides() {
        let mut s = session();
        s.toggle_numeric("sales");
        assert_eq!(s.distributions(DEFAULT_ACCENT).len(), 1);

        s.set_labels(
            "sales",
            ChartLabels {
                title: Some("Revenue".into()),
                ..ChartLabels::default()
            },
        );
        let charts = s.distributions(DEFAULT_ACCENT);
        assert_eq!(charts[0].file_name(), "sales_distribution.png");
        assert_eq!(charts[0].figure.as_ref().unwrap().title, "Revenue");

        s.toggle_numeric("sales");
        assert!(s.distributions(DEFAULT_ACCENT).is_empty());
    }
}
