//! Server configuration.
//!
//! Values come from the environment (a `.env` file is loaded by the binary
//! through `dotenvy`), falling back to the defaults below. CLI flags may
//! override them.

use clap::ValueEnum;
use std::env;

use crate::api::logs::log_warning;
use crate::parser::{NestingPolicy, ParseOptions};

/// Default HTTP port.
pub const DEFAULT_PORT: u16 = 8000;

/// Default allowed CORS origin (frontend dev server).
pub const DEFAULT_CORS_ORIGIN: &str = "http://localhost:4200";

/// Maximum upload size (in bytes).
///
/// 50 MB limit.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

pub const ENV_PORT: &str = "MFORM_PORT";
pub const ENV_CORS_ORIGINS: &str = "MFORM_CORS_ORIGINS";
pub const ENV_MAX_UPLOAD_BYTES: &str = "MFORM_MAX_UPLOAD_BYTES";
pub const ENV_NESTING: &str = "MFORM_NESTING";

/// Runtime configuration of the HTTP shell.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    /// Allowed origins; `*` allows any.
    pub cors_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub parse_options: ParseOptions,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            cors_origins: vec![DEFAULT_CORS_ORIGIN.to_string()],
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            parse_options: ParseOptions::default(),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let port = lookup(ENV_PORT)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.port);

        let cors_origins = lookup(ENV_CORS_ORIGINS)
            .map(|v| {
                v.split(',')
                    .map(|o| o.trim().to_string())
                    .filter(|o| !o.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or(defaults.cors_origins);

        let max_upload_bytes = lookup(ENV_MAX_UPLOAD_BYTES)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(defaults.max_upload_bytes);

        let nesting = match lookup(ENV_NESTING) {
            Some(value) => NestingPolicy::from_str(value.trim(), true).unwrap_or_else(|_| {
                log_warning(format!(
                    "{}: unknown nesting policy '{}' (expected 'single' or 'stack'), using the default",
                    ENV_NESTING, value
                ));
                defaults.parse_options.nesting
            }),
            None => defaults.parse_options.nesting,
        };

        Self {
            port,
            cors_origins,
            max_upload_bytes,
            parse_options: ParseOptions::with_nesting(nesting),
        }
    }

    /// Whether any origin is allowed.
    pub fn allows_any_origin(&self) -> bool {
        self.cors_origins.iter().any(|o| o == "*")
    }
}
