//! Error types shared by loading, charting and export.

use std::{error::Error, fmt, io};

use crate::chart::spec::ChartKind;

/// Every recoverable failure the analyzer can surface to the user.
#[derive(Debug)]
pub enum AnalyzerError {
    Io(io::Error),
    /// The file could be opened but not parsed as a table.
    FileParse { message: String },
    UnsupportedFormat { extension: String },
    EmptyFile,
    SheetNotFound { name: String },
    ColumnNotFound { name: String },
    /// A chart axis that must be numeric points at a text column.
    NonNumericAxis { column: String },
    /// Bar chart values must come from a numeric column.
    NonNumericAggregationTarget { column: String },
    MissingYColumn { kind: ChartKind },
    Aggregation { message: String },
    Render { message: String },
    Export { message: String },
    Settings { message: String },
}

impl fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::FileParse { message } => write!(f, "Error reading file: {message}"),
            Self::UnsupportedFormat { extension } => {
                write!(f, "Unsupported file format: .{extension}")
            }
            Self::EmptyFile => write!(f, "No data found in file"),
            Self::SheetNotFound { name } => write!(f, "Sheet '{name}' not found"),
            Self::ColumnNotFound { name } => write!(f, "Column '{name}' not found"),
            Self::NonNumericAxis { column } => write!(
                f,
                "Column '{column}' is not numeric; both axes must be numeric for this chart type"
            ),
            Self::NonNumericAggregationTarget { column } => {
                write!(f, "Column '{column}' must be numeric for aggregation")
            }
            Self::MissingYColumn { kind } => {
                write!(f, "A Y-axis column is required for {} charts", kind.label())
            }
            Self::Aggregation { message } => write!(f, "Error aggregating data: {message}"),
            Self::Render { message } => write!(f, "Chart rendering failed: {message}"),
            Self::Export { message } => write!(f, "Export failed: {message}"),
            Self::Settings { message } => write!(f, "Settings error: {message}"),
        }
    }
}

impl Error for AnalyzerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for AnalyzerError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<csv::Error> for AnalyzerError {
    fn from(e: csv::Error) -> Self {
        Self::FileParse {
            message: e.to_string(),
        }
    }
}

impl From<calamine::Error> for AnalyzerError {
    fn from(e: calamine::Error) -> Self {
        Self::FileParse {
            message: e.to_string(),
        }
    }
}

impl From<serde_json::Error> for AnalyzerError {
    fn from(e: serde_json::Error) -> Self {
        Self::Settings {
            message: e.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AnalyzerError>;
