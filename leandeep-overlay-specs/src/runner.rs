//! Runs fixtures through the resolver and compares the outcome.

use leandeep_overlay::{Category, OverlayError, Resolver, Segment, SegmentsDisplay};
use std::fmt;
use tracing::{debug, info, warn};

use crate::config::HarnessConfig;
use crate::errors::{SpecError, SpecResult};
use crate::failures::{ExpectedFailures, FailureState, HarnessResult};
use crate::fixture::OverlayFixture;
use crate::formatter::{
    format_expected_failure, format_failure, format_stale_entries, format_summary,
};
use crate::loader::load_all_fixtures;

/// One way a fixture's outcome differs from its expectations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mismatch {
    SegmentCount { expected: usize, actual: usize },
    Segment {
        index: usize,
        expected_text: String,
        expected_categories: Vec<String>,
        actual_text: String,
        actual_categories: Vec<String>,
    },
    /// Segments did not concatenate back to the input text.
    RoundTrip { actual: String },
    UnexpectedError { code: String, message: String },
    MissingError { kind: String, span: String },
    WrongError {
        expected_kind: String,
        expected_span: String,
        actual_kind: String,
        actual_span: String,
    },
    Rejected {
        expected: Vec<String>,
        actual: Vec<String>,
    },
}

impl Mismatch {
    /// Key used in the expected-failures ledger.
    pub fn check_ref(&self) -> String {
        match self {
            Mismatch::SegmentCount { .. } => "count".to_string(),
            Mismatch::Segment { index, .. } => format!("segment[{}]", index),
            Mismatch::RoundTrip { .. } => "round_trip".to_string(),
            Mismatch::UnexpectedError { .. }
            | Mismatch::MissingError { .. }
            | Mismatch::WrongError { .. } => "error".to_string(),
            Mismatch::Rejected { .. } => "rejected".to_string(),
        }
    }
}

impl fmt::Display for Mismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mismatch::SegmentCount { expected, actual } => {
                write!(f, "expected {} segments, found {}", expected, actual)
            }
            Mismatch::Segment {
                index,
                expected_text,
                expected_categories,
                actual_text,
                actual_categories,
            } => write!(
                f,
                "segment {}: expected {:?} [{}], found {:?} [{}]",
                index,
                expected_text,
                expected_categories.join(", "),
                actual_text,
                actual_categories.join(", ")
            ),
            Mismatch::RoundTrip { actual } => {
                write!(f, "segments concatenate to {:?}", actual)
            }
            Mismatch::UnexpectedError { code, message } => {
                write!(f, "unexpected {} error: {}", code, message)
            }
            Mismatch::MissingError { kind, span } => {
                write!(f, "expected {} error for span {:?}, resolution succeeded", kind, span)
            }
            Mismatch::WrongError {
                expected_kind,
                expected_span,
                actual_kind,
                actual_span,
            } => write!(
                f,
                "expected {} error for span {:?}, found {} error for span {:?}",
                expected_kind, expected_span, actual_kind, actual_span
            ),
            Mismatch::Rejected { expected, actual } => write!(
                f,
                "expected rejected [{}], found [{}]",
                expected.join(", "),
                actual.join(", ")
            ),
        }
    }
}

/// Outcome of running one fixture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixtureReport {
    pub name: String,
    /// Rendered segments, empty when resolution failed.
    pub segments: String,
    pub mismatches: Vec<Mismatch>,
}

impl FixtureReport {
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }

    pub fn check_refs(&self) -> Vec<String> {
        self.mismatches.iter().map(Mismatch::check_ref).collect()
    }
}

/// Resolve `fixture` and compare against its expectations.
pub fn run_fixture(name: &str, fixture: &OverlayFixture) -> FixtureReport {
    let spans = fixture.text_spans();
    let mut mismatches = Vec::new();
    let mut rendered = String::new();

    match Resolver::new(fixture.options).resolve(&fixture.text, &spans) {
        Ok(resolution) => {
            rendered = SegmentsDisplay::new(&resolution.segments).to_string();
            if let Some(expected) = &fixture.expect_error {
                mismatches.push(Mismatch::MissingError {
                    kind: expected.kind.clone(),
                    span: expected.span.clone(),
                });
            } else {
                compare_segments(fixture, &resolution.segments, &mut mismatches);
            }

            let actual = resolution.text();
            if actual != fixture.text {
                mismatches.push(Mismatch::RoundTrip { actual });
            }

            let rejected: Vec<String> = resolution
                .rejected_ids()
                .into_iter()
                .map(str::to_string)
                .collect();
            if rejected != fixture.expect_rejected {
                mismatches.push(Mismatch::Rejected {
                    expected: fixture.expect_rejected.clone(),
                    actual: rejected,
                });
            }
        }
        Err(err) => compare_error(fixture, &err, &mut mismatches),
    }

    debug!(fixture = name, mismatches = mismatches.len(), "ran fixture");
    FixtureReport {
        name: name.to_string(),
        segments: rendered,
        mismatches,
    }
}

fn compare_segments<C: Category>(
    fixture: &OverlayFixture,
    actual: &[Segment<'_, C>],
    mismatches: &mut Vec<Mismatch>,
) {
    if actual.len() != fixture.segments.len() {
        mismatches.push(Mismatch::SegmentCount {
            expected: fixture.segments.len(),
            actual: actual.len(),
        });
    }

    for (index, (expected, segment)) in fixture.segments.iter().zip(actual).enumerate() {
        let categories: Vec<String> = segment
            .categories
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        if expected.text != segment.text || expected.categories != categories {
            mismatches.push(Mismatch::Segment {
                index,
                expected_text: expected.text.clone(),
                expected_categories: expected.categories.clone(),
                actual_text: segment.text.to_string(),
                actual_categories: categories,
            });
        }
    }
}

fn compare_error(fixture: &OverlayFixture, err: &OverlayError, mismatches: &mut Vec<Mismatch>) {
    match &fixture.expect_error {
        Some(expected) if expected.kind == err.code() && expected.span == err.span_id() => {}
        Some(expected) => mismatches.push(Mismatch::WrongError {
            expected_kind: expected.kind.clone(),
            expected_span: expected.span.clone(),
            actual_kind: err.code().to_string(),
            actual_span: err.span_id().to_string(),
        }),
        None => mismatches.push(Mismatch::UnexpectedError {
            code: err.code().to_string(),
            message: err.to_string(),
        }),
    }
}

/// Totals plus the rendered failure and summary text of a harness run.
#[derive(Debug, Clone)]
pub struct HarnessReport {
    pub result: HarnessResult,
    pub output: String,
}

/// Run every fixture under `config.fixtures_dir`, classifying failures
/// with the ledger at `config.failures_file`.
pub fn run_harness(config: &HarnessConfig) -> SpecResult<HarnessReport> {
    let fixtures = load_all_fixtures(&config.fixtures_dir)?;
    if fixtures.is_empty() {
        return Err(SpecError::Run {
            message: format!("no fixtures found in {}", config.fixtures_dir.display()),
        });
    }
    let expected = ExpectedFailures::load(&config.failures_file)?;

    let mut result = HarnessResult::new();
    let mut output = String::new();
    let mut failed = Vec::new();
    for (name, fixture) in &fixtures {
        let report = run_fixture(name, fixture);
        if report.passed() {
            result.record_pass();
            continue;
        }
        failed.push(name.as_str());

        let refs = report.check_refs();
        let state = expected.fixture_state(name, refs.iter().map(String::as_str));
        result.record_failure(state);
        if state == FailureState::Regression {
            output.push_str(&format_failure(fixture, &report));
        } else {
            let entries: Vec<_> = refs
                .iter()
                .filter_map(|check| expected.get_entry(name, check))
                .collect();
            output.push_str(&format_expected_failure(name, state, &entries));
        }
    }

    // missing or now passing
    let stale: Vec<&str> = expected
        .all_fixtures()
        .into_iter()
        .filter(|fixture| !failed.contains(fixture))
        .collect();
    for fixture in &stale {
        warn!(fixture = %fixture, "expected failure did not fail");
    }
    output.push_str(&format_stale_entries(&stale));

    output.push_str(&format_summary(fixtures.len(), &result));
    info!(
        total = result.total,
        passed = result.passed,
        regressions = result.regressions,
        "harness finished"
    );
    Ok(HarnessReport { result, output })
}
