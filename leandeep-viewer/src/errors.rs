//! Error types for the viewer and their serialized form.

use leandeep_overlay::OverlayError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewError {
    /// A message's markers could not be resolved against its text.
    #[error("message {message}: {source}")]
    Overlay {
        message: String,
        #[source]
        source: OverlayError,
    },

    /// Input crossing the wasm boundary did not deserialize.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A result could not be handed back, e.g. it failed to serialize.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ViewError {
    pub fn code(&self) -> &'static str {
        match self {
            ViewError::Overlay { source, .. } => source.code(),
            ViewError::InvalidInput(_) => "invalid_input",
            ViewError::Internal(_) => "internal",
        }
    }
}

/// Error response structure returned to JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub span: Option<String>,
}

impl From<&ViewError> for ErrorResponse {
    fn from(err: &ViewError) -> Self {
        let span = match err {
            ViewError::Overlay { source, .. } => Some(source.span_id().to_string()),
            ViewError::InvalidInput(_) | ViewError::Internal(_) => None,
        };
        ErrorResponse {
            error: ErrorDetail {
                code: err.code().to_string(),
                message: err.to_string(),
                span,
            },
        }
    }
}

impl From<&OverlayError> for ErrorResponse {
    fn from(err: &OverlayError) -> Self {
        ErrorResponse {
            error: ErrorDetail {
                code: err.code().to_string(),
                message: err.to_string(),
                span: Some(err.span_id().to_string()),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use leandeep_overlay::{resolve, TextSpan};

    #[test]
    fn test_error_codes() {
        let overlay = resolve("ab", &[TextSpan::new("bad", 1, 9, "ATO")]).unwrap_err();
        let err = ViewError::Overlay {
            message: "m1".into(),
            source: overlay,
        };
        let response = ErrorResponse::from(&err);
        assert_eq!(response.error.code, "invalid_span");
        assert_eq!(response.error.span.as_deref(), Some("bad"));
        assert!(response.error.message.starts_with("message m1: "));

        let response = ErrorResponse::from(&ViewError::Internal("no serializer".into()));
        assert_eq!(response.error.code, "internal");
        assert_eq!(response.error.message, "internal error: no serializer");
        assert!(response.error.span.is_none());

        assert_eq!(ViewError::InvalidInput("x".into()).code(), "invalid_input");
    }
}
