//! Workbook loading (`.xlsx`, `.xlsm`, `.xls`, `.ods`) via calamine.
//!
//! The first row of every sheet is its header row. Blank rows and blank
//! header columns are skipped.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use serde_json::{Number, Value};
use std::io::Cursor;
use std::path::Path;

use super::{Row, Sheet, TabularSource};
use crate::error::{SourceError, SourceResult};

/// Decode workbook bytes, format auto-detected.
pub fn load_workbook(bytes: &[u8]) -> SourceResult<TabularSource> {
    if bytes.is_empty() {
        return Err(SourceError::Empty);
    }

    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes.to_vec()))
        .map_err(|e| SourceError::Workbook(e.to_string()))?;

    let mut source = TabularSource::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| SourceError::Sheet {
                sheet: name.clone(),
                message: e.to_string(),
            })?;
        source.insert(sheet_from_range(&name, &range));
    }

    Ok(source)
}

/// Read and decode a workbook file.
pub fn load_workbook_file<P: AsRef<Path>>(path: P) -> SourceResult<TabularSource> {
    let bytes = std::fs::read(path.as_ref())?;
    load_workbook(&bytes)
}

fn sheet_from_range(name: &str, range: &Range<Data>) -> Sheet {
    let mut rows = range.rows();

    let header_cells: Vec<Option<String>> = match rows.next() {
        Some(cells) => cells.iter().map(header_text).collect(),
        None => return Sheet::new(name, Vec::new()),
    };

    let headers = header_cells.iter().flatten().cloned().collect();
    let mut sheet = Sheet::new(name, headers);

    for cells in rows {
        let mut row = Row::new();
        for (header, cell) in header_cells.iter().zip(cells) {
            if let (Some(column), Some(value)) = (header, cell_value(cell)) {
                row.insert(column.clone(), value);
            }
        }
        sheet.push_row(row);
    }

    sheet
}

fn header_text(cell: &Data) -> Option<String> {
    let text = match cell_value(cell)? {
        Value::String(s) => s,
        other => other.to_string(),
    };
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Map a calamine cell to JSON. Empty and error cells have no value.
fn cell_value(cell: &Data) -> Option<Value> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(Value::String(s.clone())),
        Data::Int(i) => Some(Value::from(*i)),
        Data::Float(f) => float_value(*f),
        Data::Bool(b) => Some(Value::Bool(*b)),
        Data::DateTime(dt) => float_value(dt.as_f64()),
        Data::DateTimeIso(s) => Some(Value::String(s.clone())),
        Data::DurationIso(s) => Some(Value::String(s.clone())),
    }
}

/// Spreadsheets store every number as a float; whole numbers become integers.
fn float_value(f: f64) -> Option<Value> {
    if f.fract() == 0.0 && f.abs() < 9.0e15 {
        Some(Value::from(f as i64))
    } else {
        Number::from_f64(f).map(Value::Number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_float_value_whole_numbers() {
        assert_eq!(float_value(2.0), Some(json!(2)));
        assert_eq!(float_value(1.5), Some(json!(1.5)));
        assert_eq!(float_value(f64::NAN), None);
    }

    #[test]
    fn test_cell_value_mapping() {
        assert_eq!(cell_value(&Data::Empty), None);
        assert_eq!(cell_value(&Data::String("  ".into())), None);
        assert_eq!(cell_value(&Data::String("yes".into())), Some(json!("yes")));
        assert_eq!(cell_value(&Data::Int(7)), Some(json!(7)));
        assert_eq!(cell_value(&Data::Bool(true)), Some(json!(true)));
    }

    #[test]
    fn test_sheet_from_range() {
        let mut range = Range::new((0, 0), (2, 2));
        range.set_value((0, 0), Data::String("type".into()));
        range.set_value((0, 1), Data::String(" name ".into()));
        range.set_value((0, 2), Data::Empty);
        range.set_value((1, 0), Data::String("integer".into()));
        range.set_value((1, 1), Data::String("age".into()));
        range.set_value((1, 2), Data::String("ignored".into()));

        let sheet = sheet_from_range("survey", &range);
        assert_eq!(sheet.headers, vec!["type", "name"]);
        // row 2 is blank and skipped
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].text("name").as_deref(), Some("age"));
        assert!(sheet.rows[0].get("").is_none());
    }

    #[test]
    fn test_load_workbook_from_bytes() {
        let bytes = crate::source::fixtures::xlsx_bytes(&[
            ("survey", vec![
                vec![json!("type"), json!("name"), json!("label")],
                vec![json!("integer"), json!("age"), json!("Age")],
            ]),
            ("choices", vec![
                vec![json!("list_name"), json!("name"), json!("label")],
                vec![json!("yn"), json!(1), json!("Yes")],
                vec![json!("yn"), json!(2.5), json!("Maybe")],
            ]),
        ]);

        let source = load_workbook(&bytes).unwrap();
        assert_eq!(source.sheet_names(), vec!["survey", "choices"]);

        let survey = source.sheet("survey").unwrap();
        assert_eq!(survey.headers, vec!["type", "name", "label"]);
        assert_eq!(survey.rows[0].text("name").as_deref(), Some("age"));

        let choices = source.sheet("choices").unwrap();
        assert_eq!(choices.rows.len(), 2);
        assert_eq!(choices.rows[0].get("name"), Some(&json!(1)));
        assert_eq!(choices.rows[0].text("name").as_deref(), Some("1"));
        assert_eq!(choices.rows[1].get("name"), Some(&json!(2.5)));
    }

    #[test]
    fn test_empty_bytes_rejected() {
        assert!(matches!(load_workbook(&[]), Err(SourceError::Empty)));
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        let result = load_workbook(b"this is not a spreadsheet");
        assert!(matches!(result, Err(SourceError::Workbook(_))));
    }
}
