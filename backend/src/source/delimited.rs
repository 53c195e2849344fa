//! XLSForm stored as CSV files, one per sheet.
//!
//! A directory holding `survey.csv`, `choices.csv` and optionally
//! `settings.csv` is read with encoding and delimiter auto-detection.
//! Files that are missing are left out of the source; the schema
//! validator reports required ones.

use std::path::Path;

use super::{Row, Sheet, TabularSource};
use crate::error::{SourceError, SourceResult};
use crate::schema::{CHOICES_SHEET, SETTINGS_SHEET, SURVEY_SHEET};
use serde_json::Value;

/// Detect the encoding of raw bytes using chardet
pub fn detect_encoding(bytes: &[u8]) -> String {
    let result = chardet::detect(bytes);
    let charset = result.0;

    match charset.to_lowercase().as_str() {
        "ascii" | "utf-8" | "utf8" | "" => "utf-8".to_string(),
        "iso-8859-1" | "iso-8859-15" | "latin-1" | "latin1" => "iso-8859-1".to_string(),
        "windows-1252" | "cp1252" => "windows-1252".to_string(),
        _ => charset,
    }
}

/// Decode bytes to string using the specified encoding
pub fn decode_content(bytes: &[u8], encoding: &str) -> SourceResult<String> {
    let content = match encoding.to_lowercase().as_str() {
        "utf-8" | "utf8" | "ascii" => match std::str::from_utf8(bytes) {
            Ok(s) => s.to_string(),
            Err(_) => String::from_utf8_lossy(bytes).into_owned(),
        },
        "iso-8859-1" | "latin-1" | "latin1" => encoding_rs::ISO_8859_15.decode(bytes).0.into_owned(),
        "windows-1252" | "cp1252" => encoding_rs::WINDOWS_1252.decode(bytes).0.into_owned(),
        other => {
            let label = encoding_rs::Encoding::for_label(other.as_bytes())
                .ok_or_else(|| SourceError::Encoding(format!("unsupported encoding '{}'", other)))?;
            label.decode(bytes).0.into_owned()
        }
    };

    // UTF-8 BOM written by spreadsheet exports
    Ok(content.trim_start_matches('\u{feff}').to_string())
}

/// Detect the delimiter by counting occurrences in the first line
pub fn detect_delimiter(content: &str) -> char {
    let first_line = content.lines().next().unwrap_or("");

    let separators = [',', ';', '\t', '|'];
    let mut best_sep = ',';
    let mut best_count = 0;

    for &sep in &separators {
        let count = first_line.matches(sep).count();
        if count > best_count {
            best_count = count;
            best_sep = sep;
        }
    }

    best_sep
}

/// Parse delimited text into a sheet. The first record is the header row.
///
/// # Example
/// ```
/// use mform::source::parse_delimited;
///
/// let sheet = parse_delimited("choices", "list_name,name,label\nyn,yes,Yes", ',').unwrap();
/// assert_eq!(sheet.rows.len(), 1);
/// assert_eq!(sheet.rows[0].text("label").as_deref(), Some("Yes"));
/// ```
pub fn parse_delimited(name: &str, content: &str, delimiter: char) -> SourceResult<Sheet> {
    let csv_error = |source| SourceError::Csv {
        file: name.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter as u8)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(content.as_bytes());

    let header_cells: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect();

    let headers = header_cells.iter().filter(|h| !h.is_empty()).cloned().collect();
    let mut sheet = Sheet::new(name, headers);

    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut row = Row::new();
        for (header, cell) in header_cells.iter().zip(record.iter()) {
            if !header.is_empty() {
                row.insert(header.clone(), Value::String(cell.to_string()));
            }
        }
        sheet.push_row(row);
    }

    Ok(sheet)
}

/// Parse one CSV file's bytes with auto-detected encoding and delimiter.
pub fn parse_delimited_bytes(name: &str, bytes: &[u8]) -> SourceResult<Sheet> {
    let encoding = detect_encoding(bytes);
    let content = decode_content(bytes, &encoding)?;
    let delimiter = detect_delimiter(&content);
    parse_delimited(name, &content, delimiter)
}

/// Load `survey.csv`, `choices.csv` and `settings.csv` from a directory.
pub fn load_csv_dir<P: AsRef<Path>>(dir: P) -> SourceResult<TabularSource> {
    let dir = dir.as_ref();
    let mut source = TabularSource::new();

    for name in [SURVEY_SHEET, CHOICES_SHEET, SETTINGS_SHEET] {
        let path = dir.join(format!("{}.csv", name));
        if !path.is_file() {
            continue;
        }
        let bytes = std::fs::read(&path)?;
        source.insert(parse_delimited_bytes(name, &bytes)?);
    }

    if source.is_empty() {
        return Err(SourceError::Empty);
    }

    Ok(source)
}
