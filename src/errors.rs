//! Error types for overlay resolution.
//!
//! Both variants are input-validation failures: resolution performs no I/O,
//! so nothing here is transient or worth retrying.

use thiserror::Error;

use crate::offsets::OffsetUnit;

/// Why a span failed offset validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidReason {
    /// `start >= end`
    Empty,
    /// `end` lies past the end of the text.
    OutOfBounds,
}

impl std::fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InvalidReason::Empty => f.write_str("start must be less than end"),
            InvalidReason::OutOfBounds => f.write_str("end exceeds text length"),
        }
    }
}

/// Errors that can occur while resolving spans against a text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OverlayError {
    /// Span offsets violate `0 <= start < end <= length(text)`.
    #[error("invalid span {id:?} [{start}..{end}) over text of length {len}: {reason}")]
    InvalidSpan {
        id: String,
        start: usize,
        end: usize,
        len: usize,
        reason: InvalidReason,
    },

    /// An offset does not land on a boundary of the configured unit.
    #[error("span {id:?} offset {offset} is not on a {unit} boundary")]
    Encoding {
        id: String,
        offset: usize,
        unit: OffsetUnit,
    },
}

impl OverlayError {
    /// Id of the span that triggered the error.
    pub fn span_id(&self) -> &str {
        match self {
            OverlayError::InvalidSpan { id, .. } | OverlayError::Encoding { id, .. } => id,
        }
    }

    /// Stable machine-readable code, used at serialization boundaries.
    pub fn code(&self) -> &'static str {
        match self {
            OverlayError::InvalidSpan { .. } => "invalid_span",
            OverlayError::Encoding { .. } => "encoding",
        }
    }
}

/// Result type for overlay operations.
pub type OverlayResult<T> = Result<T, OverlayError>;
