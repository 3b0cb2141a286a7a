//! Annotation spans and the categories they carry.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A category a span can be labeled with.
///
/// Categories are ordered so that a segment's category set has a stable
/// identity, and named so that presentation layers can key styling on them.
///
/// # Example
///
/// ```
/// use leandeep_overlay::Category;
///
/// #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
/// pub struct Emphasis;
///
/// impl Category for Emphasis {
///     fn name(&self) -> &str { "emphasis" }
///     fn glyph(&self) -> Option<&'static str> { Some("*") }
/// }
/// ```
pub trait Category: Debug + Clone + Ord {
    /// Name used in display output and CSS class names.
    fn name(&self) -> &str;

    /// Optional short glyph rendered before the name in diagrams.
    fn glyph(&self) -> Option<&'static str> {
        None
    }
}

impl Category for String {
    fn name(&self) -> &str {
        self
    }
}

impl Category for &'static str {
    fn name(&self) -> &str {
        self
    }
}

/// A labeled interval `[start, end)` over a text.
///
/// Offsets are counted in whatever [`OffsetUnit`](crate::OffsetUnit) the
/// resolver is configured with. `payload` carries caller metadata through
/// resolution untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSpan<C, P = ()> {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub category: C,
    #[serde(default)]
    pub payload: P,
}

impl<C> TextSpan<C> {
    /// Create a span without payload.
    pub fn new(id: impl Into<String>, start: usize, end: usize, category: C) -> Self {
        TextSpan {
            id: id.into(),
            start,
            end,
            category,
            payload: (),
        }
    }
}

impl<C, P> TextSpan<C, P> {
    /// Create a span carrying `payload`.
    pub fn with_payload(
        id: impl Into<String>,
        start: usize,
        end: usize,
        category: C,
        payload: P,
    ) -> Self {
        TextSpan {
            id: id.into(),
            start,
            end,
            category,
            payload,
        }
    }

    /// Width in the caller's offset unit. Zero for inverted spans.
    pub fn width(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}
