use std::collections::HashMap;

use crate::data::table::{format_number, Column, ColumnValues, Table};
use crate::error::{AnalyzerError, Result};

/// How y values are reduced per x group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AggMethod {
    #[default]
    None,
    Mean,
    Sum,
    Count,
}

impl AggMethod {
    pub const ALL: [AggMethod; 4] = [
        AggMethod::None,
        AggMethod::Mean,
        AggMethod::Sum,
        AggMethod::Count,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AggMethod::None => "None",
            AggMethod::Mean => "Mean",
            AggMethod::Sum => "Sum",
            AggMethod::Count => "Count",
        }
    }
}

/// A grouping key taken from the x column.
#[derive(Debug, Clone, PartialEq)]
pub enum GroupKey {
    Number(f64),
    Text(String),
}

impl GroupKey {
    pub fn label(&self) -> String {
        match self {
            GroupKey::Number(v) => format_number(*v),
            GroupKey::Text(s) => s.clone(),
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            GroupKey::Number(v) => Some(*v),
            GroupKey::Text(_) => None,
        }
    }
}

/// Hashable identity of a key; `-0.0` and `0.0` collapse.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum KeyId {
    Number(u64),
    Text(String),
}

impl From<&GroupKey> for KeyId {
    fn from(key: &GroupKey) -> Self {
        match key {
            GroupKey::Number(v) => KeyId::Number((v + 0.0).to_bits()),
            GroupKey::Text(s) => KeyId::Text(s.clone()),
        }
    }
}

/// Two aligned columns: x keys and reduced y values.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedSeries {
    pub x_column: String,
    /// Name of the value column; `Count` for counted series.
    pub value_column: String,
    pub keys: Vec<GroupKey>,
    pub values: Vec<f64>,
}

fn column<'a>(table: &'a Table, name: &str) -> Result<&'a Column> {
    table.column(name).ok_or_else(|| AnalyzerError::ColumnNotFound {
        name: name.to_string(),
    })
}

fn keys_of(col: &Column) -> Vec<Option<GroupKey>> {
    match &col.values {
        ColumnValues::Numeric(v) => v.iter().map(|c| c.map(GroupKey::Number)).collect(),
        ColumnValues::Text(v) => v
            .iter()
            .map(|c| c.as_ref().map(|s| GroupKey::Text(s.clone())))
            .collect(),
    }
}

/// Group rows by the x column (first-seen order, null keys dropped) and
/// reduce y. `AggMethod::None` passes rows through ungrouped.
pub fn aggregate(table: &Table, x: &str, y: &str, method: AggMethod) -> Result<AggregatedSeries> {
    let x_col = column(table, x)?;
    let y_col = column(table, y)?;

    if method != AggMethod::Count && !y_col.is_numeric() {
        return Err(AnalyzerError::Aggregation {
            message: format!(
                "cannot compute {} of non-numeric column '{y}'",
                method.label().to_lowercase()
            ),
        });
    }

    let keys = keys_of(x_col);
    let present: Vec<bool> = match &y_col.values {
        ColumnValues::Numeric(v) => v.iter().map(Option::is_some).collect(),
        ColumnValues::Text(v) => v.iter().map(Option::is_some).collect(),
    };

    let value_column = if method == AggMethod::Count { "Count" } else { y }.to_string();

    if method == AggMethod::None {
        let (keys, values) = keys
            .into_iter()
            .enumerate()
            .filter_map(|(row, key)| {
                key.map(|k| (k, y_col.number_at(row).unwrap_or(f64::NAN)))
            })
            .unzip();
        return Ok(AggregatedSeries {
            x_column: x.to_string(),
            value_column,
            keys,
            values,
        });
    }

    let mut index: HashMap<KeyId, usize> = HashMap::new();
    let mut groups: Vec<(GroupKey, Vec<usize>)> = Vec::new();
    for (row, key) in keys.into_iter().enumerate() {
        let Some(key) = key else { continue };
        let slot = *index.entry(KeyId::from(&key)).or_insert_with(|| {
            groups.push((key.clone(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(row);
    }

    let mut out_keys = Vec::with_capacity(groups.len());
    let mut out_values = Vec::with_capacity(groups.len());
    for (key, rows) in groups {
        let value = match method {
            AggMethod::Count => rows.iter().filter(|&&r| present[r]).count() as f64,
            AggMethod::Sum => rows.iter().filter_map(|&r| y_col.number_at(r)).sum(),
            AggMethod::Mean => {
                let vals: Vec<f64> = rows.iter().filter_map(|&r| y_col.number_at(r)).collect();
                if vals.is_empty() {
                    f64::NAN
                } else {
                    vals.iter().sum::<f64>() / vals.len() as f64
                }
            }
            AggMethod::None => unreachable!("handled above"),
        };
        out_keys.push(key);
        out_values.push(value);
    }

    Ok(AggregatedSeries {
        x_column: x.to_string(),
        value_column,
        keys: out_keys,
        values: out_values,
    })
}

/// Frequency of each distinct value, most frequent first; equal counts keep
/// first-seen order.
pub fn value_counts(values: &[&str]) -> Vec<(String, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for &v in values {
        match index.get(v) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(v, counts.len());
                counts.push((v.to_string(), 1));
            }
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
