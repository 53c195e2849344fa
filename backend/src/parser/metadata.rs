//! Form title, version and settings.
//!
//! The settings sheet is read as key/value rows: `form_id` holds the key
//! and `value` the value.

use serde_json::{Map, Value};

use super::groups::RowKind;
use crate::models::{LocalizedText, DEFAULT_VERSION, UNTITLED_FORM};
use crate::source::Sheet;

/// Label of the first `form_title` survey row.
pub fn form_title(survey: &Sheet) -> LocalizedText {
    let title = survey
        .rows
        .iter()
        .find(|row| {
            row.text("type")
                .is_some_and(|t| RowKind::classify(&t) == RowKind::FormTitle)
        })
        .and_then(|row| row.text("label"));

    LocalizedText::new(title.unwrap_or_else(|| UNTITLED_FORM.to_string()))
}

/// `value` of the settings row keyed `version`, or [`DEFAULT_VERSION`].
pub fn form_version(settings: Option<&Sheet>) -> String {
    settings
        .and_then(|sheet| {
            sheet
                .rows
                .iter()
                .find(|row| row.text("form_id").as_deref() == Some("version"))
        })
        .and_then(|row| row.text("value"))
        .unwrap_or_else(|| DEFAULT_VERSION.to_string())
}

/// Every `form_id → value` pair; later duplicates win.
pub fn form_settings(settings: Option<&Sheet>) -> Map<String, Value> {
    let mut map = Map::new();
    let Some(sheet) = settings else {
        return map;
    };

    for row in &sheet.rows {
        if let (Some(key), Some(value)) = (row.text("form_id"), row.get("value")) {
            map.insert(key, value.clone());
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn settings() -> Sheet {
        Sheet::from_records(
            "settings",
            vec![
                json!({ "form_id": "version", "value": "2024.1" }),
                json!({ "form_id": "default_language", "value": "en" }),
                json!({ "form_id": "max_submissions", "value": 50 }),
                json!({ "form_id": "default_language", "value": "fr" }),
                json!({ "form_id": "orphan_key" }),
                json!({ "value": "orphan_value" }),
            ],
        )
    }

    #[test]
    fn test_title_from_first_form_title_row() {
        let survey = Sheet::from_records(
            "survey",
            vec![
                json!({ "type": "text", "name": "q1", "label": "Name" }),
                json!({ "type": "form_title", "label": "Census" }),
                json!({ "type": "form_title", "label": "Ignored" }),
            ],
        );
        assert_eq!(form_title(&survey), LocalizedText::new("Census"));
    }

    #[test]
    fn test_title_default() {
        let survey = Sheet::from_records("survey", vec![json!({ "type": "text", "name": "q1" })]);
        assert_eq!(form_title(&survey).default_text(), Some("Untitled Form"));
    }

    #[test]
    fn test_version_lookup() {
        assert_eq!(form_version(Some(&settings())), "2024.1");
    }

    #[test]
    fn test_numeric_version_rendered() {
        let sheet = Sheet::from_records("settings", vec![json!({ "form_id": "version", "value": 3 })]);
        assert_eq!(form_version(Some(&sheet)), "3");
    }

    #[test]
    fn test_version_default() {
        assert_eq!(form_version(None), "1.0.0");
        let no_row = Sheet::from_records("settings", vec![json!({ "form_id": "style", "value": "pages" })]);
        assert_eq!(form_version(Some(&no_row)), "1.0.0");
        let no_columns = Sheet::new("settings", vec![]);
        assert_eq!(form_version(Some(&no_columns)), "1.0.0");
    }

    #[test]
    fn test_settings_last_write_wins() {
        let map = form_settings(Some(&settings()));
        assert_eq!(map.len(), 3);
        assert_eq!(map["version"], json!("2024.1"));
        assert_eq!(map["default_language"], json!("fr"));
        assert_eq!(map["max_submissions"], json!(50));
    }

    #[test]
    fn test_settings_absent_sheet() {
        assert!(form_settings(None).is_empty());
    }
}
