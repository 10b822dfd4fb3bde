use std::collections::HashSet;

/// Tokens read as missing values, in addition to blank cells. Matched
/// exactly, so "Na" or "none" stay text.
const NULL_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL", "None", "#N/A", "-NaN"];

/// Whether a trimmed cell should be treated as missing.
pub fn is_null_token(cell: &str) -> bool {
    cell.is_empty() || NULL_TOKENS.contains(&cell)
}

/// Parse a trimmed, non-null cell as a number.
pub fn parse_number(cell: &str) -> Option<f64> {
    cell.parse::<f64>().ok().filter(|v| !v.is_nan())
}

/// Decode raw file bytes: UTF-8 first (minus a leading BOM), Latin-1 as a
/// fallback where every byte maps to the same code point.
pub fn decode_text(content: &[u8]) -> String {
    let content = content.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(content);
    match std::str::from_utf8(content) {
        Ok(s) => s.to_string(),
        Err(_) => content.iter().map(|&b| b as char).collect(),
    }
}

/// Clean up header names: blanks become `Unnamed: {i}` and repeats get a
/// `.{n}` suffix so every column can be addressed by name.
pub fn normalize_headers(raw: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(raw.len());

    for (i, name) in raw.iter().enumerate() {
        let base = match name.trim() {
            "" => format!("Unnamed: {i}"),
            trimmed => trimmed.to_string(),
        };

        let mut candidate = base.clone();
        let mut suffix = 1;
        while seen.contains(&candidate) {
            candidate = format!("{base}.{suffix}");
            suffix += 1;
        }
        seen.insert(candidate.clone());
        names.push(candidate);
    }

    names
}

/// Convert row-major records into column-major cells, padding short rows
/// with blanks and dropping cells beyond the header width.
pub fn rows_to_columns(rows: &[Vec<String>], num_cols: usize) -> Vec<Vec<String>> {
    let mut column_data: Vec<Vec<String>> = vec![Vec::with_capacity(rows.len()); num_cols];
    for row in rows {
        for (col_idx, col_data) in column_data.iter_mut().enumerate() {
            col_data.push(row.get(col_idx).cloned().unwrap_or_default());
        }
    }
    column_data
}
