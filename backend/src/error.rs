//! Error types for the XLSForm parsing pipeline.
//!
//! - [`SourceError`] - the input could not be decoded as a spreadsheet
//! - [`SchemaError`] - a required sheet or column is missing
//! - [`FormError`] - top-level error returned by the parser entry points
//! - [`ServerError`] - HTTP shell errors
//!
//! Conversions are provided via `From`, so `?` works across boundaries.

use thiserror::Error;

// =============================================================================
// Source Errors (malformed input)
// =============================================================================

/// The raw bytes could not be turned into a tabular source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Failed to read file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),

    /// The workbook container could not be decoded (corrupt or wrong format).
    #[error("Cannot decode workbook: {0}")]
    Workbook(String),

    /// A single sheet inside an otherwise readable workbook failed to load.
    #[error("Cannot read sheet '{sheet}': {message}")]
    Sheet { sheet: String, message: String },

    /// Text decoding failed.
    #[error("Encoding error: {0}")]
    Encoding(String),

    /// Invalid CSV content.
    #[error("Invalid CSV in '{file}': {source}")]
    Csv {
        file: String,
        #[source]
        source: csv::Error,
    },

    /// The input contains nothing at all.
    #[error("Input is empty")]
    Empty,
}

// =============================================================================
// Schema Errors (missing sheets / columns)
// =============================================================================

/// Required XLSForm structure is missing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    /// A required sheet is absent.
    #[error("Missing required sheet '{0}'")]
    MissingSheet(String),

    /// A required column is absent from a sheet.
    #[error("Missing required column '{column}' in sheet '{sheet}'")]
    MissingColumn { sheet: String, column: String },
}

// =============================================================================
// Form Errors (top-level)
// =============================================================================

/// Top-level error of the parse entry points.
///
/// Either the input was not a spreadsheet at all, or it was one but does not
/// follow the XLSForm layout.
#[derive(Debug, Error)]
pub enum FormError {
    /// MalformedSource.
    #[error("Malformed source: {0}")]
    Source(#[from] SourceError),

    /// SchemaInvalid.
    #[error("Invalid XLSForm: {0}")]
    Schema(#[from] SchemaError),
}

impl FormError {
    /// Short machine-readable discriminant used in API responses.
    pub fn kind(&self) -> &'static str {
        match self {
            FormError::Source(_) => "malformed_source",
            FormError::Schema(_) => "schema_invalid",
        }
    }
}

// =============================================================================
// Server Errors
// =============================================================================

/// HTTP server errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Parsing failed.
    #[error("{0}")]
    Form(#[from] FormError),

    /// Invalid request.
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Failed to bind or serve.
    #[error("Server IO error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for source loading.
pub type SourceResult<T> = Result<T, SourceError>;

/// Result type for schema checks.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Result type for parse operations.
pub type FormResult<T> = Result<T, FormError>;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;
