use crate::error::{DashboardError, Result};
use crate::table::{Table, Value};
use calamine::{Data, Reader, open_workbook_auto};
use lazy_static::lazy_static;
use regex::Regex;
use std::path::Path;

lazy_static! {
    // No leading zeros, so identifiers such as "0012" stay text.
    static ref NUMBER_REGEX: Regex =
        Regex::new(r"^[+-]?(0|[1-9][0-9]*)(\.[0-9]+)?([eE][+-]?[0-9]+)?$").unwrap();
}

/// On-disk formats the storage layer understands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileFormat {
    Csv,
    Workbook,
}

impl FileFormat {
    /// Detects the format from the file extension (case-insensitive)
    ///
    /// # Returns
    /// * `Option<FileFormat>` - `None` for extensions no reader handles
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_lowercase());
        match extension.as_deref() {
            Some("csv") => Some(FileFormat::Csv),
            Some("xlsx") | Some("xlsm") | Some("xlsb") | Some("xls") | Some("ods") => {
                Some(FileFormat::Workbook)
            }
            _ => None,
        }
    }
}

/// Load a table from a CSV file
///
/// The first record is the header. Fields that look like numbers load as
/// numbers, `true`/`false` as booleans, ISO datetimes as dates and empty
/// fields as empty cells; everything else is text. Fields of the columns
/// named in `text_columns` skip that detection and load exactly as written.
///
/// # Arguments
/// * `path` - Path to the CSV file to load
/// * `text_columns` - Header names whose fields are always kept as text
///
/// # Returns
/// * `Result<Table>` - The loaded table or a `FileRead` error
///
/// # Examples
/// ```no_run
/// use sales_dashboard::loader::from_csv;
/// use std::path::Path;
///
/// let notes = from_csv(Path::new("opmerkingen.csv"), &["Opmerkingen".to_string()]);
/// ```
pub fn from_csv(path: &Path, text_columns: &[String]) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .map_err(|e| DashboardError::read(path, e))?;

    let headers = reader
        .headers()
        .map_err(|e| DashboardError::read(path, e))?
        .clone();
    if headers.is_empty() {
        return Err(DashboardError::read(path, "CSV file is empty"));
    }

    let table_columns = header_names(headers.iter().map(str::to_string));
    let verbatim: Vec<bool> = table_columns
        .iter()
        .map(|name| text_columns.contains(name))
        .collect();

    let mut table = Table::new(table_columns);
    for record in reader.records() {
        let record = record.map_err(|e| DashboardError::read(path, e))?;
        let row = record
            .iter()
            .enumerate()
            .map(|(i, field)| match verbatim.get(i) {
                Some(true) => Value::Text(field.to_string()),
                _ => parse_field(field),
            })
            .collect();
        table.push_row(row);
    }

    Ok(table)
}

/// Load a table from the first worksheet of a workbook
///
/// Works for every format calamine opens (xlsx, xlsm, xlsb, xls, ods). The
/// first row of the used range is the header. Workbook cells carry their own
/// types, so no detection happens here.
///
/// # Arguments
/// * `path` - Path to the workbook to load
///
/// # Returns
/// * `Result<Table>` - The loaded table or a `FileRead` error
pub fn from_excel(path: &Path) -> Result<Table> {
    let mut workbook = open_workbook_auto(path).map_err(|e| DashboardError::read(path, e))?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| DashboardError::read(path, "no sheets found in workbook"))?;

    let range = workbook
        .worksheet_range(&sheet_name)
        .map_err(|e| DashboardError::read(path, e))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| DashboardError::read(path, "worksheet is empty"))?;

    let mut table = Table::new(header_names(header.iter().map(|cell| match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    })));
    for row in rows {
        table.push_row(row.iter().map(from_cell).collect());
    }

    Ok(table)
}

/// Detect the file type and load it with the matching reader
///
/// # Arguments
/// * `path` - Path to a `.csv` file or a workbook
/// * `text_columns` - Columns kept as text when the file is CSV
///
/// # Returns
/// * `Result<Table>` - The loaded table, or a `FileRead` error for missing,
///   malformed or unrecognised files
pub fn load_table(path: &Path, text_columns: &[String]) -> Result<Table> {
    let table = match FileFormat::from_path(path) {
        Some(FileFormat::Csv) => from_csv(path, text_columns)?,
        Some(FileFormat::Workbook) => from_excel(path)?,
        None => {
            return Err(DashboardError::read(
                path,
                DashboardError::UnsupportedFormat(path.to_path_buf()),
            ));
        }
    };
    log::debug!(
        "read {} rows x {} columns from {}",
        table.len(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

fn from_cell(cell: &Data) -> Value {
    match cell {
        Data::Empty => Value::Empty,
        Data::String(s) => Value::Text(s.clone()),
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) => Value::parse_datetime(s).unwrap_or_else(|| Value::Text(s.clone())),
        other => Value::Text(other.to_string()),
    }
}

fn parse_field(field: &str) -> Value {
    if field.is_empty() {
        return Value::Empty;
    }
    if NUMBER_REGEX.is_match(field) {
        if let Ok(n) = field.parse::<f64>() {
            return Value::Number(n);
        }
    }
    if field.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if field.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    Value::parse_datetime(field).unwrap_or_else(|| Value::Text(field.to_string()))
}

// Blank header cells get positional names so every column stays addressable.
fn header_names(names: impl Iterator<Item = String>) -> Vec<String> {
    names
        .enumerate()
        .map(|(i, name)| {
            let name = name.trim().to_string();
            if name.is_empty() {
                format!("Column {}", i + 1)
            } else {
                name
            }
        })
        .collect()
}
