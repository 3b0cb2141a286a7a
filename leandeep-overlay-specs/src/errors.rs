//! Error types for the conformance harness.

use thiserror::Error;

/// Errors that can occur while loading or running fixtures.
#[derive(Debug, Error)]
pub enum SpecError {
    /// A fixture or configuration file is not valid TOML for its schema.
    #[error("parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// A file or directory could not be read.
    #[error("failed to load fixture: {path}: {message}")]
    Load { path: String, message: String },

    /// The harness could not run as configured.
    #[error("harness run failed: {message}")]
    Run { message: String },
}

impl SpecError {
    /// Convert a TOML error, locating it by line within `source`.
    pub(crate) fn from_toml(source: &str, err: &toml::de::Error) -> Self {
        let line = err
            .span()
            .map(|span| {
                let before = &source.as_bytes()[..span.start.min(source.len())];
                before.iter().filter(|&&b| b == b'\n').count() + 1
            })
            .unwrap_or(0);
        SpecError::Parse {
            line,
            message: err.message().to_string(),
        }
    }
}

/// Result type for harness operations.
pub type SpecResult<T> = Result<T, SpecError>;
