//! # mForm - XLSForm spreadsheet parsing
//!
//! mForm turns an XLSForm survey definition (a `survey` sheet, a `choices`
//! sheet and an optional `settings` sheet) into a nested form document:
//! ordered groups of questions with resolved choice lists.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │ XLSX / CSV  │────▶│   Source    │────▶│   Schema    │────▶│ ParsedForm  │
//! │   bytes     │     │  (sheets)   │     │   checks    │     │   (JSON)    │
//! └─────────────┘     └─────────────┘     └─────────────┘     └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use mform::{parse_file, ParseOptions};
//!
//! let form = parse_file("census.xlsx", &ParseOptions::default()).unwrap();
//! println!("{} questions", form.question_count());
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy
//! - [`models`] - Form document (ParsedForm, FormGroup, Question, Choice)
//! - [`source`] - Workbook and CSV loading
//! - [`schema`] - Required sheet/column checks
//! - [`parser`] - Group tracking, question building, metadata
//! - [`validation`] - JSON Schema check of emitted documents
//! - [`config`] - Server configuration
//! - [`api`] - HTTP API server

// Core modules
pub mod error;
pub mod models;

// Input
pub mod source;
pub mod schema;

// Parsing
pub mod parser;

// Output validation
pub mod validation;

// HTTP API
pub mod config;
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{FormError, SchemaError, ServerError, SourceError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{Choice, Constraint, FormGroup, LocalizedText, ParsedForm, Question};

// =============================================================================
// Re-exports - Sources & schema
// =============================================================================

pub use source::{load_csv_dir, load_workbook, load_workbook_file, Row, Sheet, TabularSource};
pub use schema::{check_schema, validate, validate_bytes};

// =============================================================================
// Re-exports - Parser
// =============================================================================

pub use parser::{
    build_question,
    load_path,
    parse_bytes,
    parse_file,
    parse_source,
    resolve_choices,
    NestingPolicy,
    ParseOptions,
};

// =============================================================================
// Re-exports - Validation
// =============================================================================

pub use validation::{is_valid_document, validate_document};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use config::ServerConfig;
pub use api::types::{error_response, ParseResponse, ResponseMetadata, ValidateResponse};

// Server
pub mod server {
    pub use crate::api::server::{router, start_server};
}
