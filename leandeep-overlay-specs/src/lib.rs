//! Fixture-driven conformance harness for leandeep-overlay.
//!
//! Each fixture is a TOML file holding a text, its spans, resolver options
//! and the segments (or error) the resolver must produce. The harness runs
//! every fixture under a directory and classifies failures against a
//! ledger of expected failures, so known gaps don't mask regressions.
//!
//! ## Modules
//!
//! - [`fixture`] - Fixture model and TOML parsing
//! - [`loader`] - Loading fixture files and directories
//! - [`runner`] - Running fixtures and comparing outcomes
//! - [`formatter`] - Failure diagrams and run summaries
//! - [`failures`] - Expected failures tracking via TOML
//! - [`config`] - Harness paths
//! - [`errors`] - Error types for the harness

pub mod config;
pub mod errors;
pub mod failures;
pub mod fixture;
pub mod formatter;
pub mod loader;
pub mod runner;

pub use config::HarnessConfig;
pub use errors::{SpecError, SpecResult};
pub use failures::{ExpectedFailures, FailureEntry, FailureState, HarnessResult};
pub use fixture::{parse_fixture, ExpectedError, ExpectedSegment, OverlayFixture, SpanDef};
pub use formatter::{format_expected_failure, format_failure, format_stale_entries, format_summary};
pub use loader::{load_all_fixtures, load_fixture};
pub use runner::{run_fixture, run_harness, FixtureReport, HarnessReport, Mismatch};
