//! Tabular sources: named sheets of rows keyed by column header.
//!
//! A [`TabularSource`] is what the schema validator and the parser consume.
//! Adapters fill it from a workbook ([`workbook`]) or from a directory of
//! CSV files ([`delimited`]). Cells are stored as JSON values; empty cells
//! are simply absent from their [`Row`].

pub mod delimited;
pub mod workbook;

#[cfg(test)]
pub(crate) mod fixtures;

use serde_json::{Map, Value};

pub use delimited::{decode_content, detect_delimiter, detect_encoding, load_csv_dir, parse_delimited};
pub use workbook::{load_workbook, load_workbook_file};

// =============================================================================
// Row
// =============================================================================

/// One data row, column header → cell value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row(Map<String, Value>);

impl Row {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw cell value.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.0.get(column)
    }

    /// Cell rendered as text; `None` when absent or blank.
    ///
    /// Numbers and booleans are rendered the way they print in JSON, so a
    /// choice named `1` in the sheet comes back as `"1"`.
    pub fn text(&self, column: &str) -> Option<String> {
        match self.0.get(column)? {
            Value::Null => None,
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Insert a cell, ignoring nulls and blank strings.
    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        let blank = match &value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        };
        if !blank {
            self.0.insert(column.into(), value);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

// =============================================================================
// Sheet
// =============================================================================

/// A rectangular table with a header row.
#[derive(Debug, Clone, PartialEq)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Row>,
}

impl Sheet {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
        }
    }

    /// Append a row; rows without any cell are dropped.
    pub fn push_row(&mut self, row: Row) {
        if !row.is_empty() {
            self.rows.push(row);
        }
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.headers.iter().any(|h| h == column)
    }

    /// Build a sheet from JSON objects, one per row.
    ///
    /// Headers are the union of all keys in first-seen order. Non-object
    /// records are ignored.
    ///
    /// # Example
    /// ```
    /// use mform::source::Sheet;
    /// use serde_json::json;
    ///
    /// let sheet = Sheet::from_records("choices", vec![
    ///     json!({ "list_name": "yn", "name": "yes", "label": "Yes" }),
    /// ]);
    /// assert!(sheet.has_column("list_name"));
    /// assert_eq!(sheet.rows.len(), 1);
    /// ```
    pub fn from_records(name: impl Into<String>, records: Vec<Value>) -> Self {
        let mut sheet = Sheet::new(name, Vec::new());
        for record in records {
            let Value::Object(obj) = record else { continue };
            let mut row = Row::new();
            for (column, value) in obj {
                if !sheet.has_column(&column) {
                    sheet.headers.push(column.clone());
                }
                row.insert(column, value);
            }
            sheet.push_row(row);
        }
        sheet
    }
}

// =============================================================================
// Tabular Source
// =============================================================================

/// Ordered collection of sheets, looked up by exact name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabularSource {
    sheets: Vec<Sheet>,
}

impl TabularSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a sheet, replacing any sheet with the same name.
    pub fn insert(&mut self, sheet: Sheet) {
        match self.sheets.iter_mut().find(|s| s.name == sheet.name) {
            Some(existing) => *existing = sheet,
            None => self.sheets.push(sheet),
        }
    }

    /// Builder-style [`insert`](Self::insert).
    pub fn with_sheet(mut self, sheet: Sheet) -> Self {
        self.insert(sheet);
        self
    }

    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    pub fn sheet_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|s| s.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}
