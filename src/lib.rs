//! Deterministic span overlay resolution for annotated transcripts.
//!
//! Given a text and a set of possibly overlapping annotation spans, the
//! resolver partitions the text into segments, each carrying the categories
//! of every span that covers it. Presentation layers render the segments in
//! order, one plain run or one stack of highlights at a time.
//!
//! ## Core Types
//!
//! - [`TextSpan`] - A labeled `[start, end)` interval with a [`Category`]
//! - [`Segment`] - A run of text with a constant set of active categories
//! - [`Resolver`] / [`ResolveOptions`] - Resolution with an explicit [`OffsetUnit`]
//! - [`OverlayDisplay`] - Text diagrams of spans, for tests and debugging
//!
//! ## Example
//!
//! ```
//! use leandeep_overlay::{resolve, TextSpan};
//!
//! let spans = [
//!     TextSpan::new("outer", 0, 6, "X"),
//!     TextSpan::new("inner", 2, 4, "Y"),
//! ];
//! let segments = resolve("abcdef", &spans).unwrap();
//!
//! assert_eq!(segments.len(), 3);
//! assert_eq!(segments[1].text, "cd");
//! assert_eq!(segments[1].categories, ["X", "Y"]);
//! ```

mod display;
mod errors;
mod markup;
mod offsets;
mod resolver;
mod segment;
mod span;

pub use display::{OverlayDisplay, SegmentsDisplay};
pub use errors::{InvalidReason, OverlayError, OverlayResult};
pub use markup::{escape_html, escape_into, render_markup, MarkupOptions};
pub use offsets::{OffsetMapper, OffsetUnit};
pub use resolver::{resolve, ResolveOptions, Resolver, ValidationPolicy};
pub use segment::{RejectedSpan, Resolution, Segment};
pub use span::{Category, TextSpan};
