//! JSON Schema validation of emitted form documents.
//!
//! The parsed-form schema (Draft 7) is embedded at compile time from
//! `schemas/parsed-form.json`. It is used by `mform check` to verify a
//! document produced earlier, possibly edited by hand, before it is handed
//! to a form renderer.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::json;
//! use mform::validation::is_valid_document;
//!
//! let doc = json!({
//!     "id": "5f0c",
//!     "title": { "default": "Census" },
//!     "version": "1.0.0",
//!     "groups": [],
//!     "settings": {}
//! });
//! assert!(is_valid_document(&doc));
//! ```

use once_cell::sync::Lazy;
use serde_json::Value;

static PARSED_FORM_SCHEMA: Lazy<Value> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../schemas/parsed-form.json"))
        .expect("Invalid embedded schema")
});

/// Validate a JSON value against a schema.
///
/// # Returns
/// * `Ok(())` if valid
/// * `Err(Vec<String>)` with every error otherwise
pub fn validate(schema: &Value, data: &Value) -> Result<(), Vec<String>> {
    let validator = jsonschema::draft7::new(schema)
        .map_err(|e| vec![format!("Invalid schema: {}", e)])?;

    let errors: Vec<String> = validator
        .iter_errors(data)
        .map(|e| e.to_string())
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Boolean variant of [`validate`].
pub fn is_valid(schema: &Value, data: &Value) -> bool {
    jsonschema::draft7::is_valid(schema, data)
}

/// Validate against the parsed-form document schema.
pub fn validate_document(data: &Value) -> Result<(), Vec<String>> {
    validate(&PARSED_FORM_SCHEMA, data)
}

/// Quick check against the parsed-form document schema.
pub fn is_valid_document(data: &Value) -> bool {
    is_valid(&PARSED_FORM_SCHEMA, data)
}
