use crate::data::parser;

/// Cell storage for a single column. Nulls are `None`.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Numeric(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
}

impl ColumnKind {
    pub fn label(&self) -> &'static str {
        match self {
            ColumnKind::Numeric => "float64",
            ColumnKind::Text => "object",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: ColumnValues,
}

impl Column {
    pub fn numeric(name: impl Into<String>, values: Vec<Option<f64>>) -> Self {
        Self { name: name.into(), values: ColumnValues::Numeric(values) }
    }

    pub fn text(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self { name: name.into(), values: ColumnValues::Text(values) }
    }

    /// Build a typed column from raw cells: numeric when every non-null
    /// cell parses as a number, textual otherwise.
    pub fn from_raw(name: impl Into<String>, cells: &[String]) -> Self {
        let trimmed: Vec<Option<&str>> = cells
            .iter()
            .map(|c| {
                let t = c.trim();
                if parser::is_null_token(t) { None } else { Some(t) }
            })
            .collect();

        let parsed: Option<Vec<Option<f64>>> = trimmed
            .iter()
            .map(|c| match c {
                None => Some(None),
                Some(s) => parser::parse_number(s).map(Some),
            })
            .collect();

        match parsed {
            Some(values) => Self::numeric(name, values),
            None => Self::text(
                name,
                trimmed.into_iter().map(|c| c.map(str::to_string)).collect(),
            ),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self.values {
            ColumnValues::Numeric(_) => ColumnKind::Numeric,
            ColumnValues::Text(_) => ColumnKind::Text,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind() == ColumnKind::Numeric
    }

    pub fn len(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.len(),
            ColumnValues::Text(v) => v.len(),
        }
    }

    pub fn null_count(&self) -> usize {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().filter(|c| c.is_none()).count(),
            ColumnValues::Text(v) => v.iter().filter(|c| c.is_none()).count(),
        }
    }

    /// Non-null numeric values in row order. Empty for text columns.
    pub fn numbers(&self) -> Vec<f64> {
        match &self.values {
            ColumnValues::Numeric(v) => v.iter().flatten().copied().collect(),
            ColumnValues::Text(_) => Vec::new(),
        }
    }

    pub fn number_at(&self, row: usize) -> Option<f64> {
        match &self.values {
            ColumnValues::Numeric(v) => v.get(row).copied().flatten(),
            ColumnValues::Text(_) => None,
        }
    }

    /// Non-null text values in row order. Empty for numeric columns.
    pub fn texts(&self) -> Vec<&str> {
        match &self.values {
            ColumnValues::Text(v) => v.iter().flatten().map(String::as_str).collect(),
            ColumnValues::Numeric(_) => Vec::new(),
        }
    }

    /// Display form of a cell; empty string for nulls.
    pub fn display_at(&self, row: usize) -> String {
        match &self.values {
            ColumnValues::Numeric(v) => v
                .get(row)
                .copied()
                .flatten()
                .map(format_number)
                .unwrap_or_default(),
            ColumnValues::Text(v) => v.get(row).cloned().flatten().unwrap_or_default(),
        }
    }
}

/// Shortest faithful rendering of a cell value (`3` rather than `3.0`).
pub fn format_number(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{v:.0}")
    } else {
        format!("{v}")
    }
}

/// An immutable, column-major table.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    row_count: usize,
}

impl Table {
    /// Columns shorter than the longest one are padded with nulls.
    pub fn new(mut columns: Vec<Column>) -> Self {
        let row_count = columns.iter().map(Column::len).max().unwrap_or(0);
        for col in &mut columns {
            match &mut col.values {
                ColumnValues::Numeric(v) => v.resize(row_count, None),
                ColumnValues::Text(v) => v.resize(row_count, None),
            }
        }
        Self { columns, row_count }
    }

    /// Type each raw string column independently.
    pub fn from_raw(names: Vec<String>, cells: Vec<Vec<String>>) -> Self {
        let columns = names
            .into_iter()
            .zip(cells.iter())
            .map(|(name, data)| Column::from_raw(name, data))
            .collect();
        Self::new(columns)
    }

    pub fn row_count(&self) -> usize {
        self.row_count
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn text_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.is_numeric())
    }
}
