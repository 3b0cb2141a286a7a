//! Offset units and conversion to byte offsets.
//!
//! Spans computed in one unit and applied in another is the classic way
//! highlights drift by a few characters after the first umlaut. Every
//! resolution therefore names its unit explicitly, and the mapper refuses
//! offsets that would split a unit.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// The unit span offsets are counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OffsetUnit {
    /// UTF-8 bytes, Rust's native `str` indexing.
    Byte,
    /// Unicode scalar values (Python `str` indices).
    Char,
    /// UTF-16 code units (JavaScript string indices).
    Utf16,
    /// Extended grapheme clusters.
    Grapheme,
}

impl Default for OffsetUnit {
    fn default() -> Self {
        OffsetUnit::Char
    }
}

impl std::fmt::Display for OffsetUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            OffsetUnit::Byte => "byte",
            OffsetUnit::Char => "char",
            OffsetUnit::Utf16 => "utf16",
            OffsetUnit::Grapheme => "grapheme",
        })
    }
}

/// Maps offsets in some [`OffsetUnit`] onto byte offsets of one text.
///
/// ```
/// use leandeep_overlay::{OffsetMapper, OffsetUnit};
///
/// let mapper = OffsetMapper::new("für", OffsetUnit::Char);
/// assert_eq!(mapper.len(), 3);
/// assert_eq!(mapper.byte_offset(2), Some(3));
/// ```
#[derive(Debug, Clone)]
pub struct OffsetMapper<'t> {
    text: &'t str,
    unit: OffsetUnit,
    /// `table[unit_offset]` is the byte offset, or `None` when the unit
    /// offset falls inside a character. Absent for [`OffsetUnit::Byte`].
    table: Option<Vec<Option<usize>>>,
}

impl<'t> OffsetMapper<'t> {
    pub fn new(text: &'t str, unit: OffsetUnit) -> Self {
        let table = match unit {
            OffsetUnit::Byte => None,
            OffsetUnit::Char => Some(
                text.char_indices()
                    .map(|(idx, _)| Some(idx))
                    .chain(std::iter::once(Some(text.len())))
                    .collect(),
            ),
            OffsetUnit::Utf16 => {
                let mut table = Vec::with_capacity(text.len() + 1);
                for (idx, ch) in text.char_indices() {
                    table.push(Some(idx));
                    // second half of a surrogate pair
                    for _ in 1..ch.len_utf16() {
                        table.push(None);
                    }
                }
                table.push(Some(text.len()));
                Some(table)
            }
            OffsetUnit::Grapheme => Some(
                text.grapheme_indices(true)
                    .map(|(idx, _)| Some(idx))
                    .chain(std::iter::once(Some(text.len())))
                    .collect(),
            ),
        };

        OffsetMapper { text, unit, table }
    }

    pub fn unit(&self) -> OffsetUnit {
        self.unit
    }

    /// Length of the text measured in the mapper's unit.
    pub fn len(&self) -> usize {
        match &self.table {
            Some(table) => table.len() - 1,
            None => self.text.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset for `offset`, or `None` when it is past the end or
    /// does not sit on a unit boundary.
    pub fn byte_offset(&self, offset: usize) -> Option<usize> {
        match &self.table {
            Some(table) => table.get(offset).copied().flatten(),
            None if offset <= self.text.len() && self.text.is_char_boundary(offset) => {
                Some(offset)
            }
            None => None,
        }
    }

    /// Offset in the mapper's unit for byte offset `byte`, or `None` when
    /// it is past the end or not on a unit boundary.
    pub fn unit_offset(&self, byte: usize) -> Option<usize> {
        if byte > self.text.len() || !self.text.is_char_boundary(byte) {
            return None;
        }
        let head = &self.text[..byte];
        let offset = match self.unit {
            OffsetUnit::Byte => byte,
            OffsetUnit::Char => head.chars().count(),
            OffsetUnit::Utf16 => head.encode_utf16().count(),
            OffsetUnit::Grapheme => head.graphemes(true).count(),
        };
        // a byte inside a grapheme cluster has no offset of its own
        (self.byte_offset(offset) == Some(byte)).then_some(offset)
    }
}
