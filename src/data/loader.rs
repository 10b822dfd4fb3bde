use std::path::{Path, PathBuf};

use calamine::{open_workbook_auto, Data, Reader};

use crate::data::{datetime, parser};
use crate::data::table::Table;
use crate::error::{AnalyzerError, Result};

/// A parsed table together with where it came from.
#[derive(Debug, Clone)]
pub struct LoadedTable {
    pub source_name: String,
    pub sheet: Option<String>,
    pub table: Table,
}

/// Outcome of opening a file: either a table, or a workbook whose sheet the
/// user still has to pick.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Table(LoadedTable),
    ChooseSheet { path: PathBuf, sheets: Vec<String> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FileKind {
    Csv,
    Workbook,
}

fn file_kind(path: &Path) -> Result<FileKind> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" => Ok(FileKind::Csv),
        "xls" | "xlsx" | "xlsm" | "xlsb" | "ods" => Ok(FileKind::Workbook),
        _ => Err(AnalyzerError::UnsupportedFormat { extension: ext }),
    }
}

/// Whether the path has an extension the loader understands.
pub fn is_supported(path: &Path) -> bool {
    file_kind(path).is_ok()
}

fn source_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Open a CSV or workbook. Workbooks with several sheets are not read until
/// a sheet is chosen; single-sheet workbooks load straight away.
pub fn open(path: &Path) -> Result<LoadOutcome> {
    match file_kind(path)? {
        FileKind::Csv => Ok(LoadOutcome::Table(LoadedTable {
            source_name: source_name(path),
            sheet: None,
            table: load_csv(path)?,
        })),
        FileKind::Workbook => {
            let sheets = sheet_names(path)?;
            match sheets.as_slice() {
                [] => Err(AnalyzerError::EmptyFile),
                [only] => load_sheet(path, only).map(LoadOutcome::Table),
                _ => Ok(LoadOutcome::ChooseSheet {
                    path: path.to_path_buf(),
                    sheets,
                }),
            }
        }
    }
}

pub fn load_csv(path: &Path) -> Result<Table> {
    let content = std::fs::read(path)?;
    parse_csv(&content)
}

/// Parse CSV bytes. The first record is the header.
pub fn parse_csv(content: &[u8]) -> Result<Table> {
    let text = parser::decode_text(content);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut all_rows: Vec<Vec<String>> = Vec::new();
    for result in reader.records() {
        let record = result?;
        all_rows.push(record.iter().map(|s| s.to_string()).collect());
    }

    table_from_rows(all_rows)
}

fn table_from_rows(mut all_rows: Vec<Vec<String>>) -> Result<Table> {
    if all_rows.is_empty() {
        return Err(AnalyzerError::EmptyFile);
    }

    let header = all_rows.remove(0);
    let columns = parser::normalize_headers(&header);
    if columns.is_empty() {
        return Err(AnalyzerError::EmptyFile);
    }

    let column_data = parser::rows_to_columns(&all_rows, columns.len());
    let table = Table::from_raw(columns, column_data);
    tracing::debug!(
        rows = table.row_count(),
        columns = table.column_count(),
        "parsed table"
    );
    Ok(table)
}

pub fn sheet_names(path: &Path) -> Result<Vec<String>> {
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names())
}

pub fn load_sheet(path: &Path, sheet: &str) -> Result<LoadedTable> {
    let mut workbook = open_workbook_auto(path)?;

    if !workbook.sheet_names().iter().any(|s| s == sheet) {
        return Err(AnalyzerError::SheetNotFound {
            name: sheet.to_string(),
        });
    }

    let range = workbook.worksheet_range(sheet)?;
    let all_rows: Vec<Vec<String>> = range
        .rows()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();

    Ok(LoadedTable {
        source_name: source_name(path),
        sheet: Some(sheet.to_string()),
        table: table_from_rows(all_rows)?,
    })
}

fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Bool(b) => b.to_string(),
        Data::DateTime(dt) => datetime::format_excel_serial(dt.as_f64()),
        Data::DateTimeIso(s) => s.clone(),
        Data::DurationIso(s) => s.clone(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;
    use crate::data::table::ColumnKind;

    #[test]
    fn csv_header_and_types() {
        let table = parse_csv(b"price,category\n10,A\n20,A\n30,B\n1000,C\n").unwrap();
        assert_eq!(table.row_count(), 4);
        assert_eq!(table.column_names(), vec!["price", "category"]);
        assert_eq!(table.column("price").unwrap().kind(), ColumnKind::Numeric);
        assert_eq!(table.column("category").unwrap().kind(), ColumnKind::Text);
    }

    #[test]
    fn ragged_rows_become_nulls() {
        let table = parse_csv(b"a,b\n1,2\n3\n").unwrap();
        assert_eq!(table.column("b").unwrap().null_count(), 1);
    }

    #[test]
    fn empty_input_is_an_error() {
        assert!(matches!(parse_csv(b""), Err(AnalyzerError::EmptyFile)));
    }

    #[test]
    fn header_only_gives_zero_rows() {
        let table = parse_csv(b"a,b\n").unwrap();
        assert_eq!(table.row_count(), 0);
        assert_eq!(table.column_count(), 2);
    }

    #[test]
    fn open_csv_from_disk() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(b"x,y\n1,2\n3,4\n").unwrap();

        match open(file.path()).unwrap() {
            LoadOutcome::Table(loaded) => {
                assert!(loaded.sheet.is_none());
                assert_eq!(loaded.table.row_count(), 2);
                assert!(loaded.source_name.ends_with(".csv"));
            }
            LoadOutcome::ChooseSheet { .. } => panic!("csv has no sheets"),
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            open(file.path()),
            Err(AnalyzerError::UnsupportedFormat { .. })
        ));
        assert!(!is_supported(file.path()));
    }

    #[test]
    fn excel_cells_render_as_text() {
        assert_eq!(cell_to_string(&Data::Int(7)), "7");
        assert_eq!(cell_to_string(&Data::Float(1.5)), "1.5");
        assert_eq!(cell_to_string(&Data::Bool(true)), "true");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }
}
