//! Choice list lookup in the `choices` sheet.

use crate::models::{Choice, LocalizedText};
use crate::source::Sheet;

/// All options whose `list_name` equals `list_name`, in sheet order.
///
/// An unknown list yields an empty vector.
pub fn resolve_choices(list_name: &str, choices: &Sheet) -> Vec<Choice> {
    choices
        .rows
        .iter()
        .filter(|row| row.text("list_name").as_deref() == Some(list_name))
        .map(|row| Choice {
            name: row.text("name").unwrap_or_default(),
            label: LocalizedText::new(row.text("label").unwrap_or_default()),
        })
        .collect()
}
