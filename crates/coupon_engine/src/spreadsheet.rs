use std::io::Cursor;
use std::path::Path;

use calamine::{open_workbook_auto_from_rs, Data, Reader};
use coupon_logging::coupon_debug;

use crate::decode::{decode_text, DecodeError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SheetError {
    #[error("failed to read file: {0}")]
    Io(String),
    #[error("unsupported or corrupt spreadsheet: {0}")]
    Workbook(String),
    #[error("the workbook has no sheets")]
    NoSheet,
    #[error("invalid csv: {0}")]
    Csv(String),
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Read `path` and return the first column of its first sheet.
pub fn load_first_column(path: &Path) -> Result<Vec<String>, SheetError> {
    let bytes = std::fs::read(path).map_err(|err| SheetError::Io(err.to_string()))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    read_first_column(&bytes, &file_name)
}

/// Cell text of column A, one entry per sheet row starting at row 1.
///
/// Rows above the first populated cell come back as empty strings so that
/// positions stay aligned with the row numbers a user sees. `.csv` files are
/// decoded as text; anything else goes through the workbook reader, which
/// sniffs xls/xlsx/ods itself.
pub fn read_first_column(bytes: &[u8], file_name: &str) -> Result<Vec<String>, SheetError> {
    let is_csv = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("csv"));
    let cells = if is_csv {
        read_csv(bytes)?
    } else {
        read_workbook(bytes)?
    };
    coupon_debug!("{}: {} rows in first column", file_name, cells.len());
    Ok(cells)
}

fn read_workbook(bytes: &[u8]) -> Result<Vec<String>, SheetError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|err| SheetError::Workbook(err.to_string()))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or(SheetError::NoSheet)?
        .map_err(|err| SheetError::Workbook(err.to_string()))?;

    let Some((start_row, start_col)) = range.start() else {
        return Ok(Vec::new());
    };
    let mut cells = vec![String::new(); start_row as usize];
    for row in range.rows() {
        // Column A only exists in the range when the range starts there.
        let cell = if start_col == 0 {
            row.first().map(cell_text).unwrap_or_default()
        } else {
            String::new()
        };
        cells.push(cell);
    }
    Ok(cells)
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

fn read_csv(bytes: &[u8]) -> Result<Vec<String>, SheetError> {
    let decoded = decode_text(bytes)?;
    coupon_debug!("csv decoded as {}", decoded.encoding_label);
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(decoded.text.as_bytes());
    let mut cells = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|err| SheetError::Csv(err.to_string()))?;
        cells.push(record.get(0).unwrap_or_default().to_string());
    }
    Ok(cells)
}
