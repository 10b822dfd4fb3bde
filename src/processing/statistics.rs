use crate::data::table::Table;

/// Header row of the descriptive statistics table.
pub const STAT_HEADERS: [&str; 9] = [
    "Column", "Count", "Mean", "Min", "25%", "Median", "75%", "Max", "Std",
];

/// Descriptive statistics for one numeric column. Values are raw; use
/// [`format_stat`] at display time.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStatistics {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
    pub std_dev: f64,
}

impl ColumnStatistics {
    /// Compute statistics from column values, ignoring NaN entries. An empty
    /// input yields count 0 and NaN values.
    pub fn compute(column: &str, values: &[f64]) -> Self {
        let mut vals: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        vals.sort_by(f64::total_cmp);

        let count = vals.len();
        if count == 0 {
            return Self {
                column: column.to_string(),
                count,
                mean: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                median: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
                std_dev: f64::NAN,
            };
        }

        Self {
            column: column.to_string(),
            count,
            mean: mean(&vals),
            min: vals[0],
            q25: quantile_sorted(&vals, 0.25),
            median: quantile_sorted(&vals, 0.5),
            q75: quantile_sorted(&vals, 0.75),
            max: vals[count - 1],
            std_dev: std_dev(&vals),
        }
    }

    /// Display cells in [`STAT_HEADERS`] order.
    pub fn row(&self) -> [String; 9] {
        [
            self.column.clone(),
            format_stat(self.count as f64),
            format_stat(self.mean),
            format_stat(self.min),
            format_stat(self.q25),
            format_stat(self.median),
            format_stat(self.q75),
            format_stat(self.max),
            format_stat(self.std_dev),
        ]
    }
}

/// Per numeric column, in table order.
pub fn compute_statistics(table: &Table) -> Vec<ColumnStatistics> {
    table
        .numeric_columns()
        .map(|col| ColumnStatistics::compute(&col.name, &col.numbers()))
        .collect()
}

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation.
pub fn std_dev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Adjusted Fisher-Pearson skewness (G1). Zero for fewer than three values
/// or a constant series.
pub fn skewness(values: &[f64]) -> f64 {
    let n = values.len();
    if n < 3 {
        return 0.0;
    }
    if values.iter().all(|v| *v == values[0]) {
        return 0.0;
    }
    let nf = n as f64;
    // Second pass removes the rounding left in a large-magnitude mean.
    let rough = mean(values);
    let m = rough + values.iter().map(|v| v - rough).sum::<f64>() / nf;
    let m2 = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / nf;
    let m3 = values.iter().map(|v| (v - m).powi(3)).sum::<f64>() / nf;
    if m2 == 0.0 {
        return 0.0;
    }

    let g1 = m3 / m2.powf(1.5);
    (nf * (nf - 1.0)).sqrt() / (nf - 2.0) * g1
}

/// Linear-interpolated quantile of an ascending slice, `q` in `[0, 1]`.
pub fn quantile_sorted(sorted: &[f64], q: f64) -> f64 {
    match sorted.len() {
        0 => f64::NAN,
        1 => sorted[0],
        n => {
            let pos = q.clamp(0.0, 1.0) * (n - 1) as f64;
            let lo = pos.floor() as usize;
            let hi = pos.ceil() as usize;
            let frac = pos - lo as f64;
            sorted[lo] + (sorted[hi] - sorted[lo]) * frac
        }
    }
}

/// Round to two decimals, then drop trailing zeros and a dangling point.
pub fn format_stat(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let s = format!("{value:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::table::Column;

    #[test]
    fn price_column_statistics() {
        let stats = ColumnStatistics::compute("price", &[10.0, 20.0, 30.0, 1000.0]);
        assert_eq!(stats.count, 4);
        assert_eq!(stats.mean, 265.0);
        assert_eq!(stats.min, 10.0);
        assert_eq!(stats.max, 1000.0);
        assert_eq!(stats.median, 25.0);
        assert_eq!(stats.q25, 17.5);
        assert_eq!(stats.q75, 272.5);

        let row = stats.row();
        assert_eq!(row[0], "price");
        assert_eq!(row[1], "4");
        assert_eq!(row[2], "265");
        assert_eq!(row[3], "10");
        assert_eq!(row[7], "1000");
    }

    #[test]
    fn quartiles_interpolate() {
        let sorted = [1.0, 2.0, 3.0, 4.0, 5.0, 100.0];
        assert!((quantile_sorted(&sorted, 0.25) - 2.25).abs() < 1e-12);
        assert!((quantile_sorted(&sorted, 0.75) - 4.75).abs() < 1e-12);
        assert_eq!(quantile_sorted(&sorted, 0.0), 1.0);
        assert_eq!(quantile_sorted(&sorted, 1.0), 100.0);
    }

    #[test]
    fn constant_series_has_zero_skew() {
        assert_eq!(skewness(&[4.2; 10]), 0.0);
        assert!(std_dev(&[4.2; 10]) < 1e-12);
    }

    #[test]
    fn skew_sign_follows_tail() {
        assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0, 100.0]) > 1.0);
        assert!(skewness(&[-100.0, 1.0, 2.0, 3.0, 4.0, 5.0]) < -1.0);
        assert!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).abs() < 1e-12);
    }

    #[test]
    fn skew_survives_a_large_offset() {
        let base = skewness(&[0.0, 0.0, 0.0, 3.0]);
        let shifted = skewness(&[1e8, 1e8, 1e8, 1e8 + 3.0]);
        assert!((base - 2.0).abs() < 1e-9, "got {base}");
        assert!((shifted - base).abs() < 1e-6, "got {shifted}");

        let stamps: Vec<f64> = [0.0, 10.0, 20.0, 30.0, 4000.0].iter().map(|v| 1.7e9 + v).collect();
        assert!(skewness(&stamps) > 1.0);
        assert_eq!(skewness(&[1.7e9; 5]), 0.0);
    }

    #[test]
    fn adjusted_skew_matches_reference() {
        // [1, 2, 3, 10]: g1 = 45 / 12.5^1.5, scaled by sqrt(12) / 2.
        let g = skewness(&[1.0, 2.0, 3.0, 10.0]);
        assert!((g - 1.763_6).abs() < 1e-3, "got {g}");
    }

    #[test]
    fn formatting_trims_zeros() {
        assert_eq!(format_stat(265.0), "265");
        assert_eq!(format_stat(2.50), "2.5");
        assert_eq!(format_stat(1.234_56), "1.23");
        assert_eq!(format_stat(0.001), "0");
        assert_eq!(format_stat(-0.001), "0");
        assert_eq!(format_stat(f64::NAN), "NaN");
    }

    #[test]
    fn all_null_column_yields_nan_row() {
        let table = Table::new(vec![
            Column::numeric("empty", vec![None, None]),
            Column::text("label", vec![Some("a".into()), None]),
        ]);
        let stats = compute_statistics(&table);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 0);
        assert_eq!(stats[0].row()[2], "NaN");
    }
}
