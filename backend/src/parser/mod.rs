//! XLSForm → [`ParsedForm`].
//!
//! The parser is a single synchronous pass over an already loaded
//! [`TabularSource`]:
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ xlsx / csv   │──▶│ check_schema │──▶│ group stream │──▶│  ParsedForm  │
//! │ (source/)    │   │ (schema/)    │   │ + questions  │   │  (models/)   │
//! └──────────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//! ```
//!
//! [`parse_source`] expects a validated source; [`parse_bytes`] and
//! [`parse_file`] load and validate first.

pub mod choices;
pub mod groups;
pub mod metadata;
pub mod question;

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

pub use choices::resolve_choices;
pub use groups::{build_groups, NestingPolicy, RowKind};
pub use metadata::{form_settings, form_title, form_version};
pub use question::build_question;

use crate::api::logs::{log_error, log_info, log_success};
use crate::error::{FormResult, SchemaError, SourceResult};
use crate::models::ParsedForm;
use crate::schema::{check_schema, CHOICES_SHEET, SETTINGS_SHEET, SURVEY_SHEET};
use crate::source::{load_csv_dir, load_workbook, load_workbook_file, Sheet, TabularSource};

/// Parser options
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseOptions {
    /// How nested `begin_group` rows are handled
    #[serde(default)]
    pub nesting: NestingPolicy,
}

impl ParseOptions {
    pub fn with_nesting(nesting: NestingPolicy) -> Self {
        Self { nesting }
    }
}

/// Assemble a form from a source.
///
/// The source should have passed [`check_schema`]; only the presence of the
/// `survey` and `choices` sheets is checked again here.
pub fn parse_source(source: &TabularSource, options: &ParseOptions) -> FormResult<ParsedForm> {
    let survey = required_sheet(source, SURVEY_SHEET)?;
    let choices = required_sheet(source, CHOICES_SHEET)?;
    let settings = source.sheet(SETTINGS_SHEET);

    log_info(format!(
        "📋 Parsing {} survey rows, {} choices",
        survey.rows.len(),
        choices.rows.len()
    ));

    let form = ParsedForm {
        id: Uuid::new_v4().to_string(),
        title: form_title(survey),
        version: form_version(settings),
        groups: build_groups(survey, choices, options.nesting),
        settings: form_settings(settings),
    };

    log_success(format!(
        "Parsed '{}' v{}: {} group(s), {} question(s)",
        form.title.default_text().unwrap_or_default(),
        form.version,
        form.groups.len(),
        form.question_count()
    ));

    Ok(form)
}

/// Decode workbook bytes, validate and parse.
pub fn parse_bytes(bytes: &[u8], options: &ParseOptions) -> FormResult<ParsedForm> {
    let source = load_workbook(bytes)?;
    validated_parse(&source, options)
}

/// Parse a workbook file, or a directory of CSV sheets.
pub fn parse_file<P: AsRef<Path>>(path: P, options: &ParseOptions) -> FormResult<ParsedForm> {
    let source = load_path(path)?;
    validated_parse(&source, options)
}

/// Load a workbook file or a CSV directory, depending on what `path` is.
pub fn load_path<P: AsRef<Path>>(path: P) -> SourceResult<TabularSource> {
    let path = path.as_ref();
    if path.is_dir() {
        load_csv_dir(path)
    } else {
        load_workbook_file(path)
    }
}

fn validated_parse(source: &TabularSource, options: &ParseOptions) -> FormResult<ParsedForm> {
    if let Err(e) = check_schema(source) {
        log_error(format!("XLSForm validation failed: {}", e));
        return Err(e.into());
    }
    parse_source(source, options)
}

fn required_sheet<'a>(source: &'a TabularSource, name: &str) -> Result<&'a Sheet, SchemaError> {
    source
        .sheet(name)
        .ok_or_else(|| SchemaError::MissingSheet(name.to_string()))
}
