//! Pre-flight XLSForm structure checks.
//!
//! Run before parsing: both `survey` and `choices` sheets must exist, and
//! each must carry its required columns. Checks run in a fixed order and
//! stop at the first failure.

use crate::api::logs::log_error;
use crate::error::{SchemaError, SchemaResult};
use crate::source::{load_workbook, TabularSource};

pub const SURVEY_SHEET: &str = "survey";
pub const CHOICES_SHEET: &str = "choices";
pub const SETTINGS_SHEET: &str = "settings";

pub const REQUIRED_SHEETS: [&str; 2] = [SURVEY_SHEET, CHOICES_SHEET];
pub const REQUIRED_SURVEY_COLUMNS: [&str; 3] = ["type", "name", "label"];
pub const REQUIRED_CHOICES_COLUMNS: [&str; 3] = ["list_name", "name", "label"];

/// Check the source, returning the first missing sheet or column.
pub fn check_schema(source: &TabularSource) -> SchemaResult<()> {
    for sheet in REQUIRED_SHEETS {
        if source.sheet(sheet).is_none() {
            return Err(SchemaError::MissingSheet(sheet.to_string()));
        }
    }

    for (sheet_name, columns) in [
        (SURVEY_SHEET, &REQUIRED_SURVEY_COLUMNS),
        (CHOICES_SHEET, &REQUIRED_CHOICES_COLUMNS),
    ] {
        let sheet = source
            .sheet(sheet_name)
            .ok_or_else(|| SchemaError::MissingSheet(sheet_name.to_string()))?;
        if let Some(column) = columns.iter().find(|c| !sheet.has_column(c)) {
            return Err(SchemaError::MissingColumn {
                sheet: sheet_name.to_string(),
                column: column.to_string(),
            });
        }
    }

    Ok(())
}

/// `true` when the source follows the XLSForm layout. Failures are logged.
pub fn validate(source: &TabularSource) -> bool {
    match check_schema(source) {
        Ok(()) => true,
        Err(e) => {
            log_error(format!("XLSForm validation failed: {}", e));
            false
        }
    }
}

/// Like [`validate`], but starting from raw bytes. Decode errors count as
/// validation failure.
pub fn validate_bytes(bytes: &[u8]) -> bool {
    match load_workbook(bytes) {
        Ok(source) => validate(&source),
        Err(e) => {
            log_error(format!("Error validating file: {}", e));
            false
        }
    }
}
