//! Breakpoint-based span overlay resolution.
//!
//! Every span boundary is a breakpoint. Between two consecutive breakpoints
//! the set of covering spans cannot change, so each interval becomes one
//! segment carrying the categories of the spans that contain it.
//!
//! ```text
//! a  b  c  d  e  f
//! ╰────────╯          X
//!       ╰────────╯    Y
//! ├─────┼─────┼─────┤ breakpoints 0, 2, 4, 6
//!  {X}   {X,Y} {Y}
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::errors::{InvalidReason, OverlayError, OverlayResult};
use crate::offsets::{OffsetMapper, OffsetUnit};
use crate::segment::{RejectedSpan, Resolution, Segment};
use crate::span::{Category, TextSpan};

/// What to do when a span fails validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationPolicy {
    /// Fail the whole call on the first invalid span.
    Atomic,
    /// Drop invalid spans and report them in [`Resolution::rejected`].
    Lenient,
}

impl Default for ValidationPolicy {
    fn default() -> Self {
        ValidationPolicy::Atomic
    }
}

/// Resolver configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolveOptions {
    pub unit: OffsetUnit,
    /// Merge neighbouring segments whose category sets are equal.
    pub merge_adjacent: bool,
    pub policy: ValidationPolicy,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        ResolveOptions {
            unit: OffsetUnit::default(),
            merge_adjacent: true,
            policy: ValidationPolicy::default(),
        }
    }
}

impl ResolveOptions {
    pub fn with_unit(mut self, unit: OffsetUnit) -> Self {
        self.unit = unit;
        self
    }

    pub fn with_policy(mut self, policy: ValidationPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_merge(mut self, merge_adjacent: bool) -> Self {
        self.merge_adjacent = merge_adjacent;
        self
    }
}

/// Resolves spans against text with a fixed set of options.
#[derive(Debug, Clone, Copy, Default)]
pub struct Resolver {
    options: ResolveOptions,
}

/// A validated span in byte space.
#[derive(Debug, Clone, Copy)]
struct Placed {
    index: usize,
    start: usize,
    end: usize,
}

impl Resolver {
    pub fn new(options: ResolveOptions) -> Self {
        Resolver { options }
    }

    pub fn options(&self) -> &ResolveOptions {
        &self.options
    }

    /// Partition `text` into segments according to `spans`.
    ///
    /// Empty text yields no segments. All spans are validated before any
    /// segment is produced.
    pub fn resolve<'t, C: Category, P>(
        &self,
        text: &'t str,
        spans: &[TextSpan<C, P>],
    ) -> OverlayResult<Resolution<'t, C>> {
        let mapper = OffsetMapper::new(text, self.options.unit);

        let mut placed = Vec::with_capacity(spans.len());
        let mut rejected = Vec::new();
        for (index, span) in spans.iter().enumerate() {
            match place(&mapper, span) {
                Ok((start, end)) => placed.push(Placed { index, start, end }),
                Err(error) => match self.options.policy {
                    ValidationPolicy::Atomic => return Err(error),
                    ValidationPolicy::Lenient => {
                        debug!(index, id = %span.id, %error, "rejecting span");
                        rejected.push(RejectedSpan {
                            index,
                            id: span.id.clone(),
                            error,
                        });
                    }
                },
            }
        }

        if text.is_empty() {
            return Ok(Resolution {
                segments: Vec::new(),
                rejected,
            });
        }

        // widest outermost, then id, then input order
        placed.sort_by(|a, b| {
            let (sa, sb) = (&spans[a.index], &spans[b.index]);
            sb.width()
                .cmp(&sa.width())
                .then_with(|| sa.id.cmp(&sb.id))
                .then(a.index.cmp(&b.index))
        });
        let mut rank = vec![0; spans.len()];
        for (position, p) in placed.iter().enumerate() {
            rank[p.index] = position;
        }

        let mut breakpoints = Vec::with_capacity(placed.len() * 2 + 2);
        breakpoints.push(0);
        breakpoints.push(text.len());
        for p in &placed {
            breakpoints.push(p.start);
            breakpoints.push(p.end);
        }
        breakpoints.sort_unstable();
        breakpoints.dedup();

        let mut segments: Vec<Segment<'t, C>> = Vec::with_capacity(breakpoints.len() - 1);
        for window in breakpoints.windows(2) {
            let (lo, hi) = (window[0], window[1]);
            let span_indices: Vec<usize> = placed
                .iter()
                .filter(|p| p.start <= lo && hi <= p.end)
                .map(|p| p.index)
                .collect();
            let segment = Segment {
                text: &text[lo..hi],
                start: lo,
                end: hi,
                categories: categories_of(spans, &span_indices),
                span_indices,
            };

            if self.options.merge_adjacent {
                if let Some(last) = segments.last_mut() {
                    if last.same_categories(&segment) {
                        merge_into(last, segment, text, spans, &rank);
                        continue;
                    }
                }
            }
            segments.push(segment);
        }

        trace!(
            spans = placed.len(),
            breakpoints = breakpoints.len(),
            segments = segments.len(),
            "resolved overlay"
        );

        Ok(Resolution { segments, rejected })
    }
}

/// Resolve with default options: char offsets, merged runs, atomic failure.
///
/// ```
/// use leandeep_overlay::{resolve, TextSpan};
///
/// let spans = [TextSpan::new("a", 0, 4, "X"), TextSpan::new("b", 2, 6, "Y")];
/// let segments = resolve("abcdef", &spans).unwrap();
/// let texts: Vec<_> = segments.iter().map(|s| s.text).collect();
/// assert_eq!(texts, ["ab", "cd", "ef"]);
/// assert_eq!(segments[1].categories, ["X", "Y"]);
/// ```
pub fn resolve<'t, C: Category, P>(
    text: &'t str,
    spans: &[TextSpan<C, P>],
) -> OverlayResult<Vec<Segment<'t, C>>> {
    Resolver::default()
        .resolve(text, spans)
        .map(|resolution| resolution.segments)
}

fn place<C, P>(mapper: &OffsetMapper<'_>, span: &TextSpan<C, P>) -> OverlayResult<(usize, usize)> {
    let invalid = |reason| OverlayError::InvalidSpan {
        id: span.id.clone(),
        start: span.start,
        end: span.end,
        len: mapper.len(),
        reason,
    };
    if span.start >= span.end {
        return Err(invalid(InvalidReason::Empty));
    }
    if span.end > mapper.len() {
        return Err(invalid(InvalidReason::OutOfBounds));
    }

    let to_byte = |offset: usize| {
        mapper
            .byte_offset(offset)
            .ok_or_else(|| OverlayError::Encoding {
                id: span.id.clone(),
                offset,
                unit: mapper.unit(),
            })
    };
    Ok((to_byte(span.start)?, to_byte(span.end)?))
}

fn categories_of<C: Category, P>(spans: &[TextSpan<C, P>], span_indices: &[usize]) -> Vec<C> {
    let mut categories: Vec<C> = Vec::with_capacity(span_indices.len());
    for &index in span_indices {
        let category = &spans[index].category;
        if !categories.contains(category) {
            categories.push(category.clone());
        }
    }
    categories
}

fn merge_into<'t, C: Category, P>(
    last: &mut Segment<'t, C>,
    next: Segment<'t, C>,
    text: &'t str,
    spans: &[TextSpan<C, P>],
    rank: &[usize],
) {
    last.end = next.end;
    last.text = &text[last.start..last.end];

    let mut overlapping = last.span_indices.clone();
    for &index in &next.span_indices {
        if !overlapping.contains(&index) {
            overlapping.push(index);
        }
    }
    overlapping.sort_by_key(|&index| rank[index]);
    last.categories = categories_of(spans, &overlapping);

    // only spans covering both halves cover the merged run
    last.span_indices.retain(|index| next.span_indices.contains(index));
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'t, C>(segments: &[Segment<'t, C>]) -> Vec<&'t str> {
        segments.iter().map(|s| s.text).collect()
    }

    fn categories<'a>(segments: &[Segment<'a, &'static str>]) -> Vec<Vec<&'static str>> {
        segments.iter().map(|s| s.categories.clone()).collect()
    }

    #[test]
    fn test_no_spans_yields_whole_text() {
        let spans: [TextSpan<&str>; 0] = [];
        let segments = resolve("hello world", &spans).unwrap();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].text, "hello world");
        assert!(!segments[0].is_marked());
        assert_eq!((segments[0].start, segments[0].end), (0, 11));
    }

    #[test]
    fn test_empty_text_yields_no_segments() {
        let spans: [TextSpan<&str>; 0] = [];
        assert!(resolve("", &spans).unwrap().is_empty());
    }

    #[test]
    fn test_any_span_on_empty_text_is_invalid() {
        let err = resolve("", &[TextSpan::new("a", 0, 1, "X")]).unwrap_err();
        assert!(matches!(
            err,
            OverlayError::InvalidSpan {
                reason: InvalidReason::OutOfBounds,
                ..
            }
        ));
    }

    #[test]
    fn test_single_full_cover_span() {
        let segments = resolve("hello", &[TextSpan::new("a", 0, 5, "X")]).unwrap();
        assert_eq!(texts(&segments), ["hello"]);
        assert_eq!(categories(&segments), [vec!["X"]]);
    }

    #[test]
    fn test_disjoint_spans() {
        let spans = [TextSpan::new("a", 0, 2, "X"), TextSpan::new("b", 3, 5, "Y")];
        let segments = resolve("ab cd", &spans).unwrap();
        assert_eq!(texts(&segments), ["ab", " ", "cd"]);
        assert_eq!(categories(&segments), [vec!["X"], vec![], vec!["Y"]]);
    }

    #[test]
    fn test_overlapping_spans() {
        let spans = [TextSpan::new("a", 0, 4, "X"), TextSpan::new("b", 2, 6, "Y")];
        let segments = resolve("abcdef", &spans).unwrap();
        assert_eq!(texts(&segments), ["ab", "cd", "ef"]);
        assert_eq!(categories(&segments), [vec!["X"], vec!["X", "Y"], vec!["Y"]]);
        assert_eq!(segments[1].span_indices, [0, 1]);
    }

    #[test]
    fn test_nested_spans() {
        let spans = [TextSpan::new("outer", 0, 6, "X"), TextSpan::new("inner", 2, 4, "Y")];
        let segments = resolve("abcdef", &spans).unwrap();
        assert_eq!(texts(&segments), ["ab", "cd", "ef"]);
        assert_eq!(categories(&segments), [vec!["X"], vec!["X", "Y"], vec!["X"]]);
    }

    #[test]
    fn test_widest_span_is_outermost_regardless_of_input_order() {
        let spans = [TextSpan::new("inner", 2, 4, "Y"), TextSpan::new("outer", 0, 6, "X")];
        let segments = resolve("abcdef", &spans).unwrap();
        assert_eq!(segments[1].categories, ["X", "Y"]);
        assert_eq!(segments[1].span_indices, [1, 0]);
    }

    #[test]
    fn test_equal_width_ties_break_on_id() {
        let spans = [TextSpan::new("b", 0, 3, "Y"), TextSpan::new("a", 0, 3, "X")];
        let segments = resolve("abc", &spans).unwrap();
        assert_eq!(segments[0].categories, ["X", "Y"]);
        assert_eq!(segments[0].span_indices, [1, 0]);
    }

    #[test]
    fn test_repeated_category_reported_once() {
        let spans = [TextSpan::new("a", 0, 4, "X"), TextSpan::new("b", 1, 3, "X")];
        let segments = resolve("abcd", &spans).unwrap();
        // merged: the category set never changes
        assert_eq!(texts(&segments), ["abcd"]);
        assert_eq!(segments[0].categories, ["X"]);
        // "b" covers only "bc", so it no longer contains the merged run
        assert_eq!(segments[0].span_indices, [0]);
    }

    #[test]
    fn test_unmerged_keeps_every_interval() {
        let spans = [TextSpan::new("a", 0, 2, "X"), TextSpan::new("b", 2, 4, "X")];
        let resolver = Resolver::new(ResolveOptions::default().with_merge(false));
        let resolution = resolver.resolve("abcd", &spans).unwrap();
        assert_eq!(texts(&resolution.segments), ["ab", "cd"]);

        let merged = resolve("abcd", &spans).unwrap();
        assert_eq!(texts(&merged), ["abcd"]);
        assert_eq!(merged[0].categories, ["X"]);
        assert!(merged[0].span_indices.is_empty());
    }

    #[test]
    fn test_listed_spans_contain_their_segment() {
        let text = "abcdef";
        let spans = [
            TextSpan::new("a", 0, 4, "X"),
            TextSpan::new("b", 1, 3, "X"),
            TextSpan::new("c", 3, 6, "X"),
            TextSpan::new("d", 2, 5, "Y"),
        ];
        for merge in [true, false] {
            let resolver = Resolver::new(ResolveOptions::default().with_merge(merge));
            for segment in resolver.resolve(text, &spans).unwrap().segments {
                for &index in &segment.span_indices {
                    let span = &spans[index];
                    assert!(
                        span.start <= segment.start && segment.end <= span.end,
                        "{} listed on {:?}",
                        span.id,
                        segment.text
                    );
                }
            }
        }
    }

    #[test]
    fn test_inverted_span_rejected() {
        let err = resolve("abc", &[TextSpan::new("bad", 2, 2, "X")]).unwrap_err();
        assert_eq!(
            err,
            OverlayError::InvalidSpan {
                id: "bad".into(),
                start: 2,
                end: 2,
                len: 3,
                reason: InvalidReason::Empty,
            }
        );
    }

    #[test]
    fn test_out_of_bounds_span_rejected() {
        let spans = [TextSpan::new("ok", 0, 1, "X"), TextSpan::new("bad", 1, 9, "Y")];
        let err = resolve("abc", &spans).unwrap_err();
        assert_eq!(err.span_id(), "bad");
        assert_eq!(err.code(), "invalid_span");
    }

    #[test]
    fn test_lenient_policy_reports_rejected_spans() {
        let spans = [
            TextSpan::new("ok", 0, 2, "X"),
            TextSpan::new("bad", 5, 3, "Y"),
            TextSpan::new("far", 1, 40, "Y"),
        ];
        let resolver = Resolver::new(ResolveOptions::default().with_policy(ValidationPolicy::Lenient));
        let resolution = resolver.resolve("abcd", &spans).unwrap();
        assert_eq!(resolution.rejected_ids(), ["bad", "far"]);
        assert_eq!(resolution.rejected[1].index, 2);
        assert_eq!(texts(&resolution.segments), ["ab", "cd"]);
        assert_eq!(resolution.text(), "abcd");
    }

    #[test]
    fn test_char_offsets_over_multibyte_text() {
        let text = "Ich fühle mich";
        let spans = [TextSpan::new("a", 4, 9, "ATO")];
        let segments = resolve(text, &spans).unwrap();
        assert_eq!(texts(&segments), ["Ich ", "fühle", " mich"]);
        assert_eq!((segments[1].start, segments[1].end), (4, 10));
    }

    #[test]
    fn test_byte_offset_inside_character_is_encoding_error() {
        let resolver = Resolver::new(ResolveOptions::default().with_unit(OffsetUnit::Byte));
        let err = resolver
            .resolve("für", &[TextSpan::new("a", 0, 2, "X")])
            .unwrap_err();
        assert_eq!(
            err,
            OverlayError::Encoding {
                id: "a".into(),
                offset: 2,
                unit: OffsetUnit::Byte,
            }
        );
    }

    #[test]
    fn test_utf16_offsets_match_javascript_indices() {
        let resolver = Resolver::new(ResolveOptions::default().with_unit(OffsetUnit::Utf16));
        // "😀" occupies utf16 offsets 3..5
        let text = "hi 😀 there";
        let segments = resolver
            .resolve(text, &[TextSpan::new("e", 3, 5, "X"), TextSpan::new("t", 6, 11, "Y")])
            .unwrap()
            .segments;
        assert_eq!(texts(&segments), ["hi ", "😀", " ", "there"]);

        let err = resolver
            .resolve(text, &[TextSpan::new("half", 4, 6, "X")])
            .unwrap_err();
        assert_eq!(err.code(), "encoding");
    }

    #[test]
    fn test_round_trip_reconstructs_text() {
        let text = "Können Sie ein konkretes Beispiel nennen?";
        let spans = [
            TextSpan::new("a", 0, 6, "SEM"),
            TextSpan::new("b", 3, 20, "ATO"),
            TextSpan::new("c", 15, 33, "CLU"),
            TextSpan::new("d", 15, 24, "MEMA"),
            TextSpan::new("e", 40, 41, "ATO"),
        ];
        for merge in [true, false] {
            let resolver = Resolver::new(ResolveOptions::default().with_merge(merge));
            let resolution = resolver.resolve(text, &spans).unwrap();
            assert_eq!(resolution.text(), text);
            for pair in resolution.segments.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let spans = [TextSpan::new("a", 0, 4, "X"), TextSpan::new("b", 2, 6, "Y")];
        let first = resolve("abcdef", &spans).unwrap();
        let second = resolve("abcdef", &spans).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_payload_passes_through() {
        let spans = [TextSpan::with_payload("a", 0, 1, "X", 0.92_f64)];
        let segments = resolve("ab", &spans).unwrap();
        assert_eq!(spans[segments[0].span_indices[0]].payload, 0.92);
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let options: ResolveOptions = serde_json::from_str(r#"{"unit":"utf16"}"#).unwrap();
        assert_eq!(options.unit, OffsetUnit::Utf16);
        assert!(options.merge_adjacent);
        assert_eq!(options.policy, ValidationPolicy::Atomic);
    }
}
