//! Fixture file model.
//!
//! A fixture is a TOML document describing one resolver call and what it
//! should produce:
//!
//! ```toml
//! title = "Two overlapping spans"
//! text = "abcdef"
//!
//! [[span]]
//! id = "x"
//! start = 0
//! end = 4
//! category = "X"
//!
//! [[expect]]
//! text = "ab"
//! categories = ["X"]
//! ```
//!
//! Instead of `[[expect]]` segments a fixture may declare an
//! `[expect_error]` table naming the error kind and offending span.

use leandeep_overlay::{ResolveOptions, TextSpan};
use serde::{Deserialize, Serialize};

use crate::errors::{SpecError, SpecResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayFixture {
    #[serde(default)]
    pub title: Option<String>,
    pub text: String,
    /// Ids of spans a lenient run must reject, in input order.
    #[serde(default)]
    pub expect_rejected: Vec<String>,
    #[serde(default)]
    pub options: ResolveOptions,
    #[serde(default, rename = "span")]
    pub spans: Vec<SpanDef>,
    #[serde(default, rename = "expect")]
    pub segments: Vec<ExpectedSegment>,
    #[serde(default)]
    pub expect_error: Option<ExpectedError>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanDef {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub category: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedSegment {
    pub text: String,
    #[serde(default)]
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedError {
    /// `invalid_span` or `encoding`.
    pub kind: String,
    pub span: String,
}

impl OverlayFixture {
    /// Spans in resolver form.
    pub fn text_spans(&self) -> Vec<TextSpan<String>> {
        self.spans
            .iter()
            .map(|s| TextSpan::new(s.id.clone(), s.start, s.end, s.category.clone()))
            .collect()
    }

    pub fn expects_error(&self) -> bool {
        self.expect_error.is_some()
    }

    pub fn span_by_id(&self, id: &str) -> Option<&SpanDef> {
        self.spans.iter().find(|s| s.id == id)
    }
}

/// Parse fixture TOML.
pub fn parse_fixture(input: &str) -> SpecResult<OverlayFixture> {
    let fixture: OverlayFixture =
        toml::from_str(input).map_err(|e| SpecError::from_toml(input, &e))?;

    if fixture.expect_error.is_some() && !fixture.segments.is_empty() {
        return Err(SpecError::Parse {
            line: 0,
            message: "a fixture cannot declare both [[expect]] and [expect_error]".into(),
        });
    }
    if let Some(expected) = &fixture.expect_error {
        if !matches!(expected.kind.as_str(), "invalid_span" | "encoding") {
            return Err(SpecError::Parse {
                line: 0,
                message: format!("unknown error kind {:?}", expected.kind),
            });
        }
    }

    Ok(fixture)
}
