//! REST API types.
//!
//! The parsed form is returned as-is under `form`; everything else is
//! upload bookkeeping for the frontend.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::models::ParsedForm;
use crate::parser::NestingPolicy;

/// Response sent after a successful parse.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParseResponse {
    /// Unique job identifier
    pub job_id: String,

    /// Always "ready" on success
    pub status: String,

    pub form: ParsedForm,

    pub metadata: ResponseMetadata,
}

/// Upload and document statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMetadata {
    pub file_name: Option<String>,
    pub size_bytes: usize,
    pub group_count: usize,
    pub question_count: usize,
    pub nesting: NestingPolicy,
}

impl ParseResponse {
    pub fn new(form: ParsedForm, file_name: Option<String>, size_bytes: usize, nesting: NestingPolicy) -> Self {
        let metadata = ResponseMetadata {
            file_name,
            size_bytes,
            group_count: form.groups.len(),
            question_count: form.question_count(),
            nesting,
        };

        Self {
            job_id: Uuid::new_v4().to_string(),
            status: "ready".to_string(),
            form,
            metadata,
        }
    }
}

/// Response of the schema pre-flight endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub valid: bool,
    /// Sheet names found in the workbook
    pub sheets: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Create an error response body
pub fn error_response(kind: &str, error: &str) -> Value {
    json!({
        "jobId": Uuid::new_v4().to_string(),
        "status": "error",
        "kind": kind,
        "error": error,
    })
}
