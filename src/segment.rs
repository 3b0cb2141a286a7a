//! Resolver output types.

use serde::Serialize;

use crate::errors::OverlayError;

/// A run of text with a constant set of active categories.
///
/// `start` and `end` are byte offsets into the resolved text, so
/// `&text[seg.start..seg.end] == seg.text` always holds regardless of the
/// unit the spans were given in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Segment<'t, C> {
    pub text: &'t str,
    pub start: usize,
    pub end: usize,
    /// Active categories, deduplicated, widest span first.
    pub categories: Vec<C>,
    /// Indices into the input span slice of every span containing the
    /// whole segment, widest first. After merging, a span covering only
    /// part of the run contributes its category but is not listed here.
    pub span_indices: Vec<usize>,
}

impl<'t, C: Ord> Segment<'t, C> {
    /// Plain runs carry no categories.
    pub fn is_marked(&self) -> bool {
        !self.categories.is_empty()
    }

    pub fn has_category(&self, category: &C) -> bool {
        self.categories.contains(category)
    }

    /// Categories as an unordered set.
    pub fn category_set(&self) -> std::collections::BTreeSet<&C> {
        self.categories.iter().collect()
    }

    pub(crate) fn same_categories(&self, other: &Segment<'_, C>) -> bool {
        self.categories.len() == other.categories.len()
            && self.categories.iter().all(|c| other.categories.contains(c))
    }
}

/// A span excluded from a lenient resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedSpan {
    /// Position in the input span slice.
    pub index: usize,
    pub id: String,
    pub error: OverlayError,
}

/// Segments plus any spans rejected under
/// [`ValidationPolicy::Lenient`](crate::ValidationPolicy::Lenient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution<'t, C> {
    pub segments: Vec<Segment<'t, C>>,
    /// Always empty under the atomic policy.
    pub rejected: Vec<RejectedSpan>,
}

impl<'t, C> Resolution<'t, C> {
    pub fn rejected_ids(&self) -> Vec<&str> {
        self.rejected.iter().map(|r| r.id.as_str()).collect()
    }

    /// Concatenation of all segment texts.
    pub fn text(&self) -> String {
        self.segments.iter().map(|s| s.text).collect()
    }
}
