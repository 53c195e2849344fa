//! Domain models for parsed forms.
//!
//! - [`ParsedForm`] - The complete document produced from one XLSForm
//! - [`FormGroup`] - Ordered container of questions
//! - [`Question`] - One survey row turned into a typed question
//! - [`Choice`] - One option of a select question
//! - [`Constraint`] - Opaque validation rule plus its message
//! - [`LocalizedText`] - Locale code to text map (only `default` is populated)
//!
//! Expressions (`relevant`, `calculation`, `constraint`) are kept as plain
//! strings and never evaluated.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Locale key used for every text the parser emits.
pub const DEFAULT_LOCALE: &str = "default";

/// Version assigned when the settings sheet does not provide one.
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Title assigned when the survey has no `form_title` row.
pub const UNTITLED_FORM: &str = "Untitled Form";

/// Name of the synthetic group collecting ungrouped questions.
pub const DEFAULT_GROUP_NAME: &str = "default";

/// Label of the synthetic group.
pub const DEFAULT_GROUP_LABEL: &str = "Default Group";

// =============================================================================
// Localized Text
// =============================================================================

/// Text keyed by locale code, serialized as a plain JSON object.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LocalizedText(BTreeMap<String, String>);

impl LocalizedText {
    /// Text with only the `default` locale set.
    pub fn new(text: impl Into<String>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(DEFAULT_LOCALE.to_string(), text.into());
        Self(map)
    }

    /// Text for the `default` locale, if any.
    pub fn default_text(&self) -> Option<&str> {
        self.get(DEFAULT_LOCALE)
    }

    pub fn get(&self, locale: &str) -> Option<&str> {
        self.0.get(locale).map(String::as_str)
    }

    /// Add or replace a translation.
    pub fn with_locale(mut self, locale: impl Into<String>, text: impl Into<String>) -> Self {
        self.0.insert(locale.into(), text.into());
        self
    }
}

// =============================================================================
// Choices & Constraints
// =============================================================================

/// One option of a choice list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Choice {
    /// Stored value.
    pub name: String,
    pub label: LocalizedText,
}

/// Opaque constraint expression with the message shown when it fails.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constraint {
    pub rule: String,
    pub message: LocalizedText,
}

// =============================================================================
// Question
// =============================================================================

/// A question built from one survey row.
///
/// Optional fields are omitted from JSON when unset.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    /// Question type as written in the sheet (`text`, `integer`, `select_one`, ...).
    #[serde(rename = "type")]
    pub question_type: String,
    pub name: String,
    pub label: LocalizedText,
    #[serde(default)]
    pub required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calculation: Option<String>,
    /// Raw default value, kept with its cell type.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<LocalizedText>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<Choice>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub constraints: Option<Constraint>,
}

impl Question {
    /// Whether the type belongs to the select family.
    pub fn is_select(&self) -> bool {
        is_select_type(&self.question_type)
    }
}

/// Select-family detection is a plain substring test on the type.
pub fn is_select_type(question_type: &str) -> bool {
    question_type.contains("select")
}

// =============================================================================
// Group
// =============================================================================

/// Ordered container of questions.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormGroup {
    pub name: String,
    pub label: LocalizedText,
    #[serde(default)]
    pub questions: Vec<Question>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appearance: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevant: Option<String>,
}

impl FormGroup {
    /// Create an empty group.
    pub fn new(name: impl Into<String>, label: LocalizedText) -> Self {
        Self {
            name: name.into(),
            label,
            questions: Vec::new(),
            appearance: None,
            relevant: None,
        }
    }

    /// The synthetic group holding questions outside any explicit group.
    pub fn synthetic_default() -> Self {
        Self::new(DEFAULT_GROUP_NAME, LocalizedText::new(DEFAULT_GROUP_LABEL))
    }
}

// =============================================================================
// Parsed Form
// =============================================================================

/// The complete document produced from one XLSForm.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParsedForm {
    /// Freshly generated for every parse.
    pub id: String,
    pub title: LocalizedText,
    pub version: String,
    pub groups: Vec<FormGroup>,
    #[serde(default)]
    pub settings: Map<String, Value>,
}

impl ParsedForm {
    /// Total number of questions across all groups.
    pub fn question_count(&self) -> usize {
        self.groups.iter().map(|g| g.questions.len()).sum()
    }

    pub fn group(&self, name: &str) -> Option<&FormGroup> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// First question with the given name, in document order.
    pub fn find_question(&self, name: &str) -> Option<&Question> {
        self.groups
            .iter()
            .flat_map(|g| g.questions.iter())
            .find(|q| q.name == name)
    }
}

// =============================================================================
// Tests
// =============================================================================
