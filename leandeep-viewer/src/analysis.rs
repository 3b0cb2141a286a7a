//! Adapter for marker analysis responses.
//!
//! The analysis service reports every pattern hit as a `[start, end)` pair
//! of code point offsets into the analyzed text. Each hit becomes one
//! overlay span with id `{marker}#{n}`.

use leandeep_overlay::{OffsetMapper, OffsetUnit, TextSpan};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::layers::Layer;

/// Offsets in analysis responses count Unicode scalar values.
pub const ANALYSIS_UNIT: OffsetUnit = OffsetUnit::Char;

/// Default confidence threshold of the analyze endpoint.
pub const DEFAULT_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub markers: Vec<DetectedMarker>,
    #[serde(default)]
    pub meta: Option<AnalyzeMeta>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzeMeta {
    pub processing_ms: f64,
    pub version: String,
    pub text_length: usize,
    pub markers_detected: usize,
    pub layers_scanned: Vec<String>,
    #[serde(default)]
    pub shadow_mode: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedMarker {
    pub id: String,
    pub layer: Layer,
    pub confidence: f64,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub matches: Vec<PatternMatch>,
    #[serde(default)]
    pub family: Option<String>,
    #[serde(default)]
    pub multiplier: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternMatch {
    pub pattern: String,
    pub span: (usize, usize),
    pub matched_text: String,
}

/// Payload of spans built from a response.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchRef<'a> {
    pub marker: &'a DetectedMarker,
    pub hit: &'a PatternMatch,
}

/// Spans for every match of every marker at or above `threshold`.
pub fn spans_from_response(
    response: &AnalyzeResponse,
    threshold: f64,
) -> Vec<TextSpan<Layer, MatchRef<'_>>> {
    response
        .markers
        .iter()
        .filter(|marker| marker.confidence >= threshold)
        .flat_map(|marker| {
            marker.matches.iter().enumerate().map(move |(n, hit)| {
                TextSpan::with_payload(
                    format!("{}#{}", marker.id, n),
                    hit.span.0,
                    hit.span.1,
                    marker.layer,
                    MatchRef { marker, hit },
                )
            })
        })
        .collect()
}

/// A match whose reported text differs from the text at its offsets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatchMismatch {
    pub id: String,
    pub expected: String,
    /// `None` when the offsets fall outside the text.
    pub found: Option<String>,
}

/// Compare each match's `matched_text` with the slice its span points at.
pub fn verify_matches(text: &str, response: &AnalyzeResponse) -> Vec<MatchMismatch> {
    let mapper = OffsetMapper::new(text, ANALYSIS_UNIT);
    let mut mismatches = Vec::new();

    for marker in &response.markers {
        for (n, hit) in marker.matches.iter().enumerate() {
            let (start, end) = hit.span;
            let found = match (mapper.byte_offset(start), mapper.byte_offset(end)) {
                (Some(s), Some(e)) if s <= e => Some(&text[s..e]),
                _ => None,
            };
            if found != Some(hit.matched_text.as_str()) {
                let id = format!("{}#{}", marker.id, n);
                warn!(%id, expected = %hit.matched_text, ?found, "match text does not line up");
                mismatches.push(MatchMismatch {
                    id,
                    expected: hit.matched_text.clone(),
                    found: found.map(str::to_string),
                });
            }
        }
    }

    mismatches
}
