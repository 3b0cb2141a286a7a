//! Inline HTML markup for annotated text.
//!
//! The text is cut at every span boundary and each marked interval becomes
//! a stack of nested `<span>` elements, one per covering annotation, widest
//! annotation outermost. Plain intervals are emitted as escaped text.

use std::fmt::Write;

use crate::errors::OverlayResult;
use crate::offsets::OffsetUnit;
use crate::resolver::{ResolveOptions, Resolver, ValidationPolicy};
use crate::span::{Category, TextSpan};

/// Options controlling generated markup.
#[derive(Debug, Clone)]
pub struct MarkupOptions {
    /// Base CSS class; categories add `{class}-{category}`.
    pub class: String,
    /// Id of the span rendered with the `{class}-active` modifier.
    pub selected: Option<String>,
    /// Unit of the span offsets.
    pub unit: OffsetUnit,
    /// Under [`ValidationPolicy::Lenient`] invalid spans are left unmarked.
    pub policy: ValidationPolicy,
}

impl Default for MarkupOptions {
    fn default() -> Self {
        MarkupOptions {
            class: "marker".to_string(),
            selected: None,
            unit: OffsetUnit::default(),
            policy: ValidationPolicy::default(),
        }
    }
}

impl MarkupOptions {
    pub fn selected(mut self, id: impl Into<String>) -> Self {
        self.selected = Some(id.into());
        self
    }

    pub fn with_unit(mut self, unit: OffsetUnit) -> Self {
        self.unit = unit;
        self
    }
}

/// Render `text` annotated with `spans` as inline HTML.
///
/// Every span is wrapped around exactly its own `[start, end)`, so the
/// output does not depend on how segments would be merged for display.
pub fn render_markup<C: Category, P>(
    text: &str,
    spans: &[TextSpan<C, P>],
    options: &MarkupOptions,
) -> OverlayResult<String> {
    let resolver = Resolver::new(ResolveOptions {
        unit: options.unit,
        merge_adjacent: false,
        policy: options.policy,
    });
    let resolution = resolver.resolve(text, spans)?;

    let mut html = String::with_capacity(text.len());
    for segment in &resolution.segments {
        for &index in &segment.span_indices {
            open_tag(&mut html, &spans[index], options);
        }
        escape_into(&mut html, segment.text);
        for _ in &segment.span_indices {
            html.push_str("</span>");
        }
    }
    Ok(html)
}

fn open_tag<C: Category, P>(html: &mut String, span: &TextSpan<C, P>, options: &MarkupOptions) {
    html.push_str("<span class=\"");
    escape_into(html, &options.class);
    html.push(' ');
    escape_into(html, &options.class);
    html.push('-');
    escape_into(html, &span.category.name().to_lowercase());
    if options.selected.as_deref() == Some(span.id.as_str()) {
        // writing into a String cannot fail
        let _ = write!(html, " {}-active", options.class);
    }
    html.push_str("\" tabindex=\"0\" data-marker-id=\"");
    escape_into(html, &span.id);
    html.push_str("\">");
}

/// Append `s` to `out` with HTML special characters escaped.
pub fn escape_into(out: &mut String, s: &str) {
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
}

/// HTML-escaped copy of `s`.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    escape_into(&mut out, s);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markup<C: Category>(text: &str, spans: &[TextSpan<C>]) -> String {
        render_markup(text, spans, &MarkupOptions::default()).unwrap()
    }

    #[test]
    fn test_plain_text_is_escaped() {
        let spans: [TextSpan<&str>; 0] = [];
        assert_eq!(markup("a < b & \"c\"", &spans), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn test_disjoint_markers() {
        let spans = [TextSpan::new("m1", 0, 2, "ATO"), TextSpan::new("m2", 3, 5, "SEM")];
        assert_eq!(
            markup("ab cd", &spans),
            "<span class=\"marker marker-ato\" tabindex=\"0\" data-marker-id=\"m1\">ab</span> \
             <span class=\"marker marker-sem\" tabindex=\"0\" data-marker-id=\"m2\">cd</span>"
        );
    }

    #[test]
    fn test_overlap_nests_widest_outermost() {
        let spans = [TextSpan::new("w", 0, 4, "MEMA"), TextSpan::new("n", 2, 3, "ATO")];
        let html = render_markup("abcd", &spans, &MarkupOptions::default().selected("n")).unwrap();
        assert_eq!(
            html,
            concat!(
                "<span class=\"marker marker-mema\" tabindex=\"0\" data-marker-id=\"w\">ab</span>",
                "<span class=\"marker marker-mema\" tabindex=\"0\" data-marker-id=\"w\">",
                "<span class=\"marker marker-ato marker-active\" tabindex=\"0\" data-marker-id=\"n\">c</span>",
                "</span>",
                "<span class=\"marker marker-mema\" tabindex=\"0\" data-marker-id=\"w\">d</span>",
            )
        );
    }

    #[test]
    fn test_same_category_markers_wrap_only_their_own_text() {
        let nested = [TextSpan::new("a", 0, 4, "X"), TextSpan::new("b", 1, 3, "X")];
        assert_eq!(
            markup("abcd", &nested),
            concat!(
                "<span class=\"marker marker-x\" tabindex=\"0\" data-marker-id=\"a\">a</span>",
                "<span class=\"marker marker-x\" tabindex=\"0\" data-marker-id=\"a\">",
                "<span class=\"marker marker-x\" tabindex=\"0\" data-marker-id=\"b\">bc</span>",
                "</span>",
                "<span class=\"marker marker-x\" tabindex=\"0\" data-marker-id=\"a\">d</span>",
            )
        );

        let touching = [TextSpan::new("a", 0, 2, "X"), TextSpan::new("b", 2, 4, "X")];
        let html = render_markup("abcd", &touching, &MarkupOptions::default().selected("a")).unwrap();
        assert_eq!(
            html,
            concat!(
                "<span class=\"marker marker-x marker-active\" tabindex=\"0\" data-marker-id=\"a\">ab</span>",
                "<span class=\"marker marker-x\" tabindex=\"0\" data-marker-id=\"b\">cd</span>",
            )
        );
    }

    #[test]
    fn test_markup_matches_unmerged_segments() {
        let text = "abcdef";
        let spans = [
            TextSpan::new("a", 0, 4, "X"),
            TextSpan::new("b", 1, 3, "X"),
            TextSpan::new("c", 4, 6, "X"),
        ];
        let unmerged = Resolver::new(ResolveOptions::default().with_merge(false))
            .resolve(text, &spans)
            .unwrap()
            .segments;
        let merged = crate::resolve(text, &spans).unwrap();
        assert_eq!(merged.len(), 1);

        // every marker appears around exactly the text it covers
        let html = markup(text, &spans);
        let expected: String = unmerged
            .iter()
            .map(|segment| {
                let mut out = String::new();
                for &index in &segment.span_indices {
                    open_tag(&mut out, &spans[index], &MarkupOptions::default());
                }
                out.push_str(segment.text);
                out.push_str(&"</span>".repeat(segment.span_indices.len()));
                out
            })
            .collect();
        assert_eq!(html, expected);
    }

    #[test]
    fn test_repeated_snippet_marks_the_annotated_occurrence() {
        // the second "ab" is annotated, not the first
        let spans = [TextSpan::new("m", 3, 5, "CLU")];
        assert_eq!(
            markup("ab ab", &spans),
            "ab <span class=\"marker marker-clu\" tabindex=\"0\" data-marker-id=\"m\">ab</span>"
        );
    }

    #[test]
    fn test_offsets_in_requested_unit() {
        let spans = [TextSpan::new("m", 2, 4, "ATO")];
        let options = MarkupOptions::default().with_unit(OffsetUnit::Utf16);
        assert_eq!(
            render_markup("😀ok", &spans, &options).unwrap(),
            "😀<span class=\"marker marker-ato\" tabindex=\"0\" data-marker-id=\"m\">ok</span>"
        );
    }

    #[test]
    fn test_invalid_span_fails_or_is_skipped() {
        let spans = [TextSpan::new("bad", 1, 9, "ATO")];
        let err = render_markup("ab", &spans, &MarkupOptions::default()).unwrap_err();
        assert_eq!(err.span_id(), "bad");

        let lenient = MarkupOptions {
            policy: ValidationPolicy::Lenient,
            ..MarkupOptions::default()
        };
        assert_eq!(render_markup("ab", &spans, &lenient).unwrap(), "ab");
    }

    #[test]
    fn test_ids_are_escaped() {
        let spans = [TextSpan::new("x\"y", 0, 1, "ATO")];
        assert!(markup("a", &spans).contains("data-marker-id=\"x&quot;y\""));
    }
}
