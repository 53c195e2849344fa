//! In-memory xlsx workbooks for tests.

use rust_xlsxwriter::Workbook;
use serde_json::Value;

/// Build an xlsx file from named sheets of rows. Strings, numbers and bools
/// become typed cells; `null` leaves the cell blank.
pub(crate) fn xlsx_bytes(sheets: &[(&str, Vec<Vec<Value>>)]) -> Vec<u8> {
    let mut workbook = Workbook::new();

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Value::String(s) => {
                        worksheet.write_string(r, c, s.as_str()).unwrap();
                    }
                    Value::Number(n) => {
                        worksheet.write_number(r, c, n.as_f64().unwrap()).unwrap();
                    }
                    Value::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).unwrap();
                    }
                    _ => {}
                }
            }
        }
    }

    workbook.save_to_buffer().unwrap()
}
