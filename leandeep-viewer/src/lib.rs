//! Transcript viewer for leandeep-overlay, compiled to wasm.
//!
//! JavaScript owns the DOM and forwards user events as [`Action`]s; this
//! crate owns the state transitions and turns state into a [`ViewModel`].
//! Every export has an `*_internal` twin returning plain Rust values so the
//! logic is testable off the browser.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

pub mod analysis;
pub mod data;
pub mod errors;
pub mod extractors;
pub mod layers;
pub mod state;
pub mod view;

pub use analysis::{spans_from_response, verify_matches, AnalyzeResponse, DetectedMarker, PatternMatch};
pub use data::{DataSource, MarkerAnnotation, Message, MockData};
pub use errors::{ErrorResponse, ViewError};
pub use layers::{Layer, LayerManifest, LAYER_MANIFESTS};
pub use state::{Action, LayerSet, Route, ViewState};
pub use view::{render, ViewModel};

use leandeep_overlay::{
    Category, OffsetMapper, OffsetUnit, Resolution, ResolveOptions, Resolver, TextSpan,
    ValidationPolicy,
};
use tracing::error;

// Set up panic hook for better error messages in browser console
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

fn to_js<T: Serialize>(value: &T) -> JsValue {
    match serde_wasm_bindgen::to_value(value) {
        Ok(value) => value,
        Err(err) => {
            let err = ViewError::Internal(err.to_string());
            error!(error = %err, "result did not serialize");
            // an error response is plain strings, so this one serializes
            serde_wasm_bindgen::to_value(&ErrorResponse::from(&err)).unwrap_or(JsValue::NULL)
        }
    }
}

fn from_js<T: DeserializeOwned>(value: JsValue) -> Result<T, ViewError> {
    serde_wasm_bindgen::from_value(value).map_err(|e| ViewError::InvalidInput(e.to_string()))
}

fn error_to_js(err: &ViewError) -> JsValue {
    to_js(&ErrorResponse::from(err))
}

// ============================================================================
// OVERLAY API
// ============================================================================

/// A span as sent from JavaScript.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlaySpan {
    pub id: String,
    pub start: usize,
    pub end: usize,
    pub category: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverlayRequest {
    pub text: String,
    pub spans: Vec<OverlaySpan>,
    #[serde(default)]
    pub options: Option<ResolveOptions>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlaySegment {
    pub text: String,
    /// Offsets in the unit of the request.
    pub start: usize,
    pub end: usize,
    pub categories: Vec<String>,
    pub span_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RejectedOverlaySpan {
    pub id: String,
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverlayResponse {
    pub segments: Vec<OverlaySegment>,
    pub rejected: Vec<RejectedOverlaySpan>,
}

/// Resolve `{ text, spans, options? }` into segments.
///
/// Offsets default to UTF-16 code units, the unit JavaScript strings index
/// in. Returns `{ error: { code, message, span } }` on failure.
#[wasm_bindgen]
pub fn resolve_overlay(request: JsValue) -> JsValue {
    match from_js::<OverlayRequest>(request).and_then(|request| resolve_overlay_internal(&request)) {
        Ok(result) => to_js(&result),
        Err(err) => error_to_js(&err),
    }
}

fn resolve_overlay_internal(request: &OverlayRequest) -> Result<OverlayResponse, ViewError> {
    let options = request.options.unwrap_or_else(|| {
        ResolveOptions::default().with_unit(OffsetUnit::Utf16)
    });
    let spans: Vec<TextSpan<String>> = request
        .spans
        .iter()
        .map(|s| TextSpan::new(s.id.clone(), s.start, s.end, s.category.clone()))
        .collect();

    let resolution = Resolver::new(options)
        .resolve(&request.text, &spans)
        .map_err(|source| ViewError::Overlay {
            message: "request".into(),
            source,
        })?;
    Ok(OverlayResponse {
        segments: overlay_segments(&request.text, options.unit, &resolution, &spans)?,
        rejected: resolution
            .rejected
            .iter()
            .map(|r| RejectedOverlaySpan {
                id: r.id.clone(),
                code: r.error.code().to_string(),
                message: r.error.to_string(),
            })
            .collect(),
    })
}

/// Segments with offsets converted back from bytes into `unit`.
fn overlay_segments<C: Category, P>(
    text: &str,
    unit: OffsetUnit,
    resolution: &Resolution<'_, C>,
    spans: &[TextSpan<C, P>],
) -> Result<Vec<OverlaySegment>, ViewError> {
    let mapper = OffsetMapper::new(text, unit);
    let unit_offset = |byte: usize| {
        mapper.unit_offset(byte).ok_or_else(|| {
            ViewError::Internal(format!("byte offset {} is not a {} boundary", byte, unit))
        })
    };

    resolution
        .segments
        .iter()
        .map(|segment| {
            Ok(OverlaySegment {
                text: segment.text.to_string(),
                start: unit_offset(segment.start)?,
                end: unit_offset(segment.end)?,
                categories: segment
                    .categories
                    .iter()
                    .map(|category| category.name().to_string())
                    .collect(),
                span_ids: segment
                    .span_indices
                    .iter()
                    .map(|&i| spans[i].id.clone())
                    .collect(),
            })
        })
        .collect()
}

// ============================================================================
// VIEW API
// ============================================================================

#[wasm_bindgen]
pub fn initial_state() -> JsValue {
    to_js(&ViewState::default())
}

/// Apply one action to a state, returning the new state.
#[wasm_bindgen]
pub fn apply_action(state: JsValue, action: JsValue) -> JsValue {
    let result = from_js::<ViewState>(state)
        .and_then(|state| from_js::<Action>(action).map(|action| (state, action)))
        .map(|(state, action)| apply_action_internal(&state, &action));
    match result {
        Ok(next) => to_js(&next),
        Err(err) => error_to_js(&err),
    }
}

fn apply_action_internal(state: &ViewState, action: &Action) -> ViewState {
    state.apply(action, &MockData)
}

/// Render a state against the built-in mock data.
#[wasm_bindgen]
pub fn render_view(state: JsValue) -> JsValue {
    match from_js::<ViewState>(state).and_then(|state| render_view_internal(&state)) {
        Ok(model) => to_js(&model),
        Err(err) => error_to_js(&err),
    }
}

fn render_view_internal(state: &ViewState) -> Result<ViewModel, ViewError> {
    render(state, &MockData)
}

// ============================================================================
// ANALYSIS API
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOverlayRequest {
    pub text: String,
    pub response: AnalyzeResponse,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_threshold() -> f64 {
    analysis::DEFAULT_THRESHOLD
}

/// Resolve an analysis response against its text. Mismatched matches are
/// rejected, not fatal.
#[wasm_bindgen]
pub fn spans_from_analysis(request: JsValue) -> JsValue {
    match from_js::<AnalysisOverlayRequest>(request)
        .and_then(|request| spans_from_analysis_internal(&request))
    {
        Ok(result) => to_js(&result),
        Err(err) => error_to_js(&err),
    }
}

fn spans_from_analysis_internal(
    request: &AnalysisOverlayRequest,
) -> Result<OverlayResponse, ViewError> {
    let spans = spans_from_response(&request.response, request.threshold);
    let options = ResolveOptions::default()
        .with_unit(analysis::ANALYSIS_UNIT)
        .with_policy(ValidationPolicy::Lenient);

    let mut rejected: Vec<RejectedOverlaySpan> = verify_matches(&request.text, &request.response)
        .into_iter()
        .map(|m| RejectedOverlaySpan {
            message: format!("expected {:?}, found {:?}", m.expected, m.found),
            id: m.id,
            code: "text_mismatch".to_string(),
        })
        .collect();
    // markers below the threshold never became spans
    rejected.retain(|r| spans.iter().any(|s| s.id == r.id));
    let spans: Vec<_> = spans
        .into_iter()
        .filter(|s| !rejected.iter().any(|r| r.id == s.id))
        .collect();

    let resolution = Resolver::new(options)
        .resolve(&request.text, &spans)
        .map_err(|source| ViewError::Overlay {
            message: "analysis".into(),
            source,
        })?;
    rejected.extend(resolution.rejected.iter().map(|r| RejectedOverlaySpan {
        id: r.id.clone(),
        code: r.error.code().to_string(),
        message: r.error.to_string(),
    }));

    Ok(OverlayResponse {
        segments: overlay_segments(&request.text, options.unit, &resolution, &spans)?,
        rejected,
    })
}
