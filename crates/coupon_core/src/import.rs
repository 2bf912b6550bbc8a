//! Strict validation of first-column spreadsheet values.
//!
//! Unlike the manual list, a single bad row voids the whole batch.

use coupon_logging::{coupon_info, coupon_warn};
use thiserror::Error;

use crate::phone::{check_phone, PhoneRuleViolation};

/// Maximum number of sheet rows accepted in one upload.
pub const MAX_IMPORT_ROWS: usize = 20_000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ImportError {
    #[error("the file has {count} rows; at most {max} phone numbers can be uploaded at once")]
    TooManyRows { count: usize, max: usize },
    #[error("row {row}: phone numbers may only contain digits and hyphens (no spaces or symbols)")]
    InvalidCharacters { row: usize },
    #[error("row {row}: phone number does not start with '01'")]
    MissingPrefix { row: usize },
    #[error("row {row}: phone numbers starting with '010' must have 11 digits")]
    Length010 { row: usize },
    #[error("row {row}: phone number must have 10 or 11 digits")]
    Length { row: usize },
    #[error("the file could not be read: {reason}")]
    Unreadable { reason: String },
}

impl ImportError {
    fn from_rule(violation: PhoneRuleViolation, row: usize) -> Self {
        match violation {
            PhoneRuleViolation::MissingPrefix => ImportError::MissingPrefix { row },
            PhoneRuleViolation::Length010 => ImportError::Length010 { row },
            PhoneRuleViolation::LengthOther => ImportError::Length { row },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportRow {
    /// 1-based sheet row.
    pub row: usize,
    pub raw_cell_value: String,
    pub normalized_phone: String,
}

/// A fully validated upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedBatch {
    pub file_name: String,
    pub rows: Vec<ImportRow>,
}

impl ImportedBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn phones(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|row| row.normalized_phone.clone())
            .collect()
    }
}

/// Validates first-column cell values in sheet order.
///
/// Rows whose trimmed value is empty are skipped. Every other value must pass,
/// in order: digits-and-hyphens only, then the phone rule on the hyphen-free
/// string. The first failure is returned and nothing is kept.
pub fn validate_rows(cells: &[String]) -> Result<Vec<ImportRow>, ImportError> {
    if cells.len() > MAX_IMPORT_ROWS {
        coupon_warn!(
            "Import rejected: {} rows exceeds limit {}",
            cells.len(),
            MAX_IMPORT_ROWS
        );
        return Err(ImportError::TooManyRows {
            count: cells.len(),
            max: MAX_IMPORT_ROWS,
        });
    }

    let mut rows = Vec::with_capacity(cells.len());
    for (idx, cell) in cells.iter().enumerate() {
        let row = idx + 1;
        let value = cell.trim();
        if value.is_empty() {
            continue;
        }
        if value.chars().any(|c| !(c.is_ascii_digit() || c == '-')) {
            coupon_warn!("Import rejected at row {}: invalid characters", row);
            return Err(ImportError::InvalidCharacters { row });
        }
        let phone = value.replace('-', "");
        if let Err(violation) = check_phone(&phone) {
            coupon_warn!("Import rejected at row {}: {:?}", row, violation);
            return Err(ImportError::from_rule(violation, row));
        }
        rows.push(ImportRow {
            row,
            raw_cell_value: cell.clone(),
            normalized_phone: phone,
        });
    }

    coupon_info!("Import accepted: {} phone numbers", rows.len());
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    #[test]
    fn strips_hyphens_and_skips_blank_rows() {
        let rows = validate_rows(&cells(&["010-1234-5678", "  ", "", " 0161234567 "])).unwrap();
        let phones: Vec<_> = rows.iter().map(|r| r.normalized_phone.as_str()).collect();
        assert_eq!(phones, vec!["01012345678", "0161234567"]);
        assert_eq!(rows[1].row, 4);
        assert_eq!(rows[1].raw_cell_value, " 0161234567 ");
    }

    #[test]
    fn one_bad_row_voids_the_batch() {
        let mut values = vec!["01012345678"; 10];
        values[4] = "0212345678";
        let err = validate_rows(&cells(&values)).unwrap_err();
        assert_eq!(err, ImportError::MissingPrefix { row: 5 });
    }

    #[test]
    fn rules_are_checked_in_order() {
        assert_eq!(
            validate_rows(&cells(&["010 1234 5678"])).unwrap_err(),
            ImportError::InvalidCharacters { row: 1 }
        );
        assert_eq!(
            validate_rows(&cells(&["+82-10-1234-5678"])).unwrap_err(),
            ImportError::InvalidCharacters { row: 1 }
        );
        assert_eq!(
            validate_rows(&cells(&["1012345678"])).unwrap_err(),
            ImportError::MissingPrefix { row: 1 }
        );
        assert_eq!(
            validate_rows(&cells(&["010-123-4567"])).unwrap_err(),
            ImportError::Length010 { row: 1 }
        );
        assert_eq!(
            validate_rows(&cells(&["011-123-456"])).unwrap_err(),
            ImportError::Length { row: 1 }
        );
    }

    #[test]
    fn row_limit_checked_before_rows() {
        let mut values = vec!["bad".to_string(); MAX_IMPORT_ROWS + 1];
        values[0] = "01012345678".to_string();
        assert_eq!(
            validate_rows(&values).unwrap_err(),
            ImportError::TooManyRows {
                count: MAX_IMPORT_ROWS + 1,
                max: MAX_IMPORT_ROWS
            }
        );
    }

    #[test]
    fn exactly_at_limit_is_accepted() {
        let values = vec!["0161234567".to_string(); MAX_IMPORT_ROWS];
        assert_eq!(validate_rows(&values).unwrap().len(), MAX_IMPORT_ROWS);
    }

    #[test]
    fn error_messages_name_the_rule() {
        let err = ImportError::Length010 { row: 3 };
        assert_eq!(
            err.to_string(),
            "row 3: phone numbers starting with '010' must have 11 digits"
        );
    }
}
