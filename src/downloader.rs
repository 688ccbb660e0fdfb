use crate::error::{DashboardError, Result};
use crate::loader::FileFormat;
use crate::table::{Table, Value};
use rust_xlsxwriter::{Format, Workbook, Worksheet, XlsxError};
use std::path::Path;

/// Convert a table to CSV format
///
/// Writes the header row followed by every data row. Quoting of commas,
/// quotes and line breaks is left to the csv writer, so multi-line notes
/// survive a round trip.
///
/// # Arguments
/// * `table` - Reference to the table to convert
///
/// # Returns
/// * `Result<Vec<u8>, Box<dyn Error>>` - CSV content as bytes or an error
pub fn to_csv(table: &Table) -> std::result::Result<Vec<u8>, Box<dyn std::error::Error>> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&table.columns)?;
    for row in &table.rows {
        writer.write_record(row.iter().map(|value| value.to_string()))?;
    }
    Ok(writer.into_inner().map_err(|e| e.into_error())?)
}

/// Convert a table to XLSX format
///
/// One worksheet, bold header row, then the data rows. Dates get a
/// `yyyy-mm-dd hh:mm:ss` number format and text in `wrap_column` is written
/// with text wrap so multi-line notes display as such in Excel.
///
/// A worksheet cell holds at most 32,767 characters. A longer text fails the
/// whole workbook with `XlsxError::MaxStringLengthExceeded`.
///
/// # Arguments
/// * `table` - Reference to the table to convert
/// * `wrap_column` - Header of the column written with text wrap, if any
///
/// # Returns
/// * `Result<Vec<u8>, XlsxError>` - XLSX file content as bytes or an error
pub fn to_xlsx(table: &Table, wrap_column: Option<&str>) -> std::result::Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();

    let header_format = Format::new().set_bold();
    let date_format = Format::new().set_num_format("yyyy-mm-dd hh:mm:ss");
    let wrap_format = Format::new().set_text_wrap();
    let wrap_idx = wrap_column.and_then(|name| table.column_index(name));

    for (c, name) in table.columns.iter().enumerate() {
        worksheet.write_string_with_format(0, c as u16, name, &header_format)?;
    }

    for (r, row) in table.rows.iter().enumerate() {
        let r = (r + 1) as u32;
        for (c, value) in row.iter().enumerate() {
            let c16 = c as u16;
            match value {
                Value::Empty => {}
                Value::Text(s) if s.is_empty() => {}
                Value::Text(s) if Some(c) == wrap_idx => {
                    worksheet.write_string_with_format(r, c16, s, &wrap_format)?;
                }
                Value::Text(s) => {
                    worksheet.write_string(r, c16, s)?;
                }
                Value::Number(n) if n.is_finite() => {
                    worksheet.write_number(r, c16, *n)?;
                }
                Value::Number(_) => {}
                Value::Bool(b) => {
                    worksheet.write_boolean(r, c16, *b)?;
                }
                Value::DateTime(serial) => {
                    worksheet.write_number_with_format(r, c16, *serial, &date_format)?;
                }
            }
        }
    }

    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer()
}

/// Serialize `table` in the format implied by `path`'s extension.
///
/// Only `.xlsx` and `.csv` can be written; other workbook flavours are read-only.
///
/// # Arguments
/// * `path` - Destination, only its extension is used
/// * `table` - Reference to the table to serialize
/// * `wrap_column` - Forwarded to [`to_xlsx`]
///
/// # Returns
/// * `Result<Vec<u8>>` - File content, or `FileWrite` naming `path`
pub fn encode_table(path: &Path, table: &Table, wrap_column: Option<&str>) -> Result<Vec<u8>> {
    let is_xlsx = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("xlsx"));

    match FileFormat::from_path(path) {
        Some(FileFormat::Csv) => to_csv(table).map_err(|e| DashboardError::write(path, e)),
        Some(FileFormat::Workbook) if is_xlsx => {
            to_xlsx(table, wrap_column).map_err(|e| DashboardError::write(path, e))
        }
        _ => Err(DashboardError::write(
            path,
            DashboardError::UnsupportedFormat(path.to_path_buf()),
        )),
    }
}
