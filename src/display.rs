use crate::offsets::{OffsetMapper, OffsetUnit};
use crate::segment::Segment;
use crate::span::{Category, TextSpan};
use std::fmt::Write;
use unicode_width::UnicodeWidthStr;

/// Text diagram of spans drawn under the text they cover.
///
/// ```text
/// Ich fühle mich missverstanden
///     ╰───╯ATO a
///                ╰────────────╯MEMA b
/// ```
///
/// Columns are display widths, so wide and combining characters line up in
/// a terminal. Spans failing validation are listed as `!{id}` instead of
/// being drawn.
pub struct OverlayDisplay<'a, C, P> {
    text: &'a str,
    spans: &'a [TextSpan<C, P>],
    unit: OffsetUnit,
}

impl<'a, C: Category, P> OverlayDisplay<'a, C, P> {
    pub fn new(text: &'a str, spans: &'a [TextSpan<C, P>]) -> Self {
        OverlayDisplay {
            text,
            spans,
            unit: OffsetUnit::default(),
        }
    }

    /// Interpret span offsets in `unit`.
    pub fn with_unit(mut self, unit: OffsetUnit) -> Self {
        self.unit = unit;
        self
    }
}

// a  b  c  d  e  f
// ╰────────╯X a
//       ╰────────╯Y b
impl<'a, C: Category, P> std::fmt::Display for OverlayDisplay<'a, C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mapper = OffsetMapper::new(self.text, self.unit);
        // newlines would break column alignment; byte offsets stay valid
        let line: String = self
            .text
            .chars()
            .map(|c| if c.is_ascii_control() { ' ' } else { c })
            .collect();
        f.write_str(&line)?;

        let mut order: Vec<usize> = (0..self.spans.len()).collect();
        order.sort_by(|&a, &b| {
            let (sa, sb) = (&self.spans[a], &self.spans[b]);
            sa.start
                .cmp(&sb.start)
                .then_with(|| sb.width().cmp(&sa.width()))
                .then_with(|| sa.id.cmp(&sb.id))
        });

        for idx in order {
            let span = &self.spans[idx];
            f.write_char('\n')?;

            let range = if span.start < span.end && span.end <= mapper.len() {
                mapper
                    .byte_offset(span.start)
                    .zip(mapper.byte_offset(span.end))
            } else {
                None
            };
            let (start_byte, end_byte) = match range {
                Some(range) => range,
                None => {
                    write!(f, "!{} [{}..{})", span.id, span.start, span.end)?;
                    continue;
                }
            };

            let start_char_idx = UnicodeWidthStr::width(&line[..start_byte]);
            let end_char_idx = UnicodeWidthStr::width(&line[..end_byte]);
            for _ in 0..start_char_idx {
                f.write_char(' ')?;
            }

            f.write_char('╰')?;
            for _ in (start_char_idx + 1)..end_char_idx.saturating_sub(1) {
                f.write_char('─')?;
            }
            if end_char_idx - start_char_idx > 1 {
                f.write_char('╯')?;
            }

            if let Some(glyph) = span.category.glyph() {
                f.write_str(glyph)?;
            }
            write!(f, "{} {}", span.category.name(), span.id)?;
        }

        Ok(())
    }
}

/// One line per segment: `{start}..{end} {text:?} [{categories}]`.
pub struct SegmentsDisplay<'a, 't, C> {
    segments: &'a [Segment<'t, C>],
}

impl<'a, 't, C: Category> SegmentsDisplay<'a, 't, C> {
    pub fn new(segments: &'a [Segment<'t, C>]) -> Self {
        SegmentsDisplay { segments }
    }
}

impl<'a, 't, C: Category> std::fmt::Display for SegmentsDisplay<'a, 't, C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_char('\n')?;
            }
            write!(f, "{}..{} {:?} [", segment.start, segment.end, segment.text)?;
            for (j, category) in segment.categories.iter().enumerate() {
                if j > 0 {
                    f.write_str(", ")?;
                }
                f.write_str(category.name())?;
            }
            f.write_char(']')?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve;

    #[test]
    fn test_overlay_display() {
        let spans = [
            TextSpan::new("a", 4, 9, "ATO"),
            TextSpan::new("b", 15, 29, "MEMA"),
            TextSpan::new("c", 0, 9, "SEM"),
        ];
        let display = OverlayDisplay::new("Ich fühle mich missverstanden", &spans);

        insta::assert_snapshot!(display, @r###"
        Ich fühle mich missverstanden
        ╰───────╯SEM c
            ╰───╯ATO a
                       ╰────────────╯MEMA b
        "###);
    }

    #[test]
    fn test_overlay_display_single_column_and_invalid() {
        let spans = [TextSpan::new("q", 2, 3, "ATO"), TextSpan::new("bad", 2, 9, "SEM")];
        let display = OverlayDisplay::new("ab?", &spans);

        insta::assert_snapshot!(display, @r###"
        ab?
        !bad [2..9)
          ╰ATO q
        "###);
    }

    #[test]
    fn test_segments_display() {
        let spans = [TextSpan::new("a", 0, 4, "X"), TextSpan::new("b", 2, 6, "Y")];
        let segments = resolve("abcdef", &spans).unwrap();

        insta::assert_snapshot!(SegmentsDisplay::new(&segments), @r###"
        0..2 "ab" [X]
        2..4 "cd" [X, Y]
        4..6 "ef" [Y]
        "###);
    }
}
