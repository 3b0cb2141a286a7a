//! Failure and summary formatting.

use leandeep_overlay::OverlayDisplay;
use std::fmt::Write;

use crate::failures::{FailureEntry, FailureState, HarnessResult};
use crate::fixture::OverlayFixture;
use crate::runner::FixtureReport;

/// Format a failed fixture: its spans drawn under the text, each
/// mismatch, then the segments actually produced.
pub fn format_failure(fixture: &OverlayFixture, report: &FixtureReport) -> String {
    let mut output = String::new();

    writeln!(output, "\nFAIL: {}", report.name).unwrap();
    if let Some(title) = &fixture.title {
        writeln!(output, "  {}", title).unwrap();
    }
    writeln!(output).unwrap();

    let spans = fixture.text_spans();
    let diagram = OverlayDisplay::new(&fixture.text, &spans)
        .with_unit(fixture.options.unit)
        .to_string();
    for line in diagram.lines() {
        writeln!(output, "  {}", line).unwrap();
    }
    writeln!(output).unwrap();

    for mismatch in &report.mismatches {
        writeln!(output, "  \u{2717} {}", mismatch).unwrap();
    }

    if !report.segments.is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "  actual segments:").unwrap();
        for line in report.segments.lines() {
            writeln!(output, "    {}", line).unwrap();
        }
    }

    output
}

/// Format a failure the ledger allows: one line per matched check with
/// its recorded reason.
pub fn format_expected_failure(name: &str, state: FailureState, entries: &[&FailureEntry]) -> String {
    let mut output = String::new();

    let label = match state {
        FailureState::Known => "known",
        FailureState::Pending => "pending",
        FailureState::Regression => "regression",
    };
    writeln!(output, "
EXPECTED ({}): {}", label, name).unwrap();
    for entry in entries {
        match &entry.reason {
            Some(reason) => writeln!(output, "  - {}: {}", entry.check, reason).unwrap(),
            None => writeln!(output, "  - {}", entry.check).unwrap(),
        }
    }

    output
}

/// Format ledger fixtures that did not fail in this run.
pub fn format_stale_entries(fixtures: &[&str]) -> String {
    let mut output = String::new();
    if fixtures.is_empty() {
        return output;
    }

    writeln!(output, "
STALE: {} ledger fixtures did not fail", fixtures.len()).unwrap();
    for fixture in fixtures {
        writeln!(output, "  {}", fixture).unwrap();
    }

    output
}

/// Format a summary of a harness run.
pub fn format_summary(fixtures: usize, result: &HarnessResult) -> String {
    let mut output = String::new();

    let status = if result.success() { "PASS" } else { "FAIL" };
    let failed = result.expected_failures + result.regressions;

    writeln!(output, "\n{}: {} fixtures", status, fixtures).unwrap();
    writeln!(
        output,
        "  {} passed, {} failed ({} expected, {} regressions)",
        result.passed, failed, result.expected_failures, result.regressions
    )
    .unwrap();

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::parse_fixture;
    use crate::runner::run_fixture;

    #[test]
    fn test_format_failure() {
        let fixture = parse_fixture(
            r#"
title = "overlap with a wrong expectation"
text = "abcdef"

[[span]]
id = "x"
start = 0
end = 4
category = "X"

[[span]]
id = "y"
start = 2
end = 6
category = "Y"

[[expect]]
text = "ab"
categories = ["X"]

[[expect]]
text = "cd"
categories = ["X"]

[[expect]]
text = "ef"
categories = ["Y"]
"#,
        )
        .unwrap();
        let report = run_fixture("overlap.toml", &fixture);

        insta::assert_snapshot!(format_failure(&fixture, &report).trim(), @r###"
        FAIL: overlap.toml
          overlap with a wrong expectation

          abcdef
          ╰──╯X x
            ╰──╯Y y

          ✗ segment 1: expected "cd" [X], found "cd" [X, Y]

          actual segments:
            0..2 "ab" [X]
            2..4 "cd" [X, Y]
            4..6 "ef" [Y]
        "###);
    }

    #[test]
    fn test_format_failure_for_error() {
        let fixture = parse_fixture(
            r#"
text = "abc"

[[span]]
id = "bad"
start = 1
end = 7
category = "X"
"#,
        )
        .unwrap();
        let report = run_fixture("bad.toml", &fixture);

        insta::assert_snapshot!(format_failure(&fixture, &report).trim(), @r###"
        FAIL: bad.toml

          abc
          !bad [1..7)

          ✗ unexpected invalid_span error: invalid span "bad" [1..7) over text of length 3: end exceeds text length
        "###);
    }

    #[test]
    fn test_format_expected_failure() {
        let with_reason = FailureEntry {
            fixture: "units/grapheme.toml".into(),
            check: "segment[1]".into(),
            reason: Some("cluster rules differ".into()),
            added: None,
        };
        let bare = FailureEntry {
            reason: None,
            check: "count".into(),
            ..with_reason.clone()
        };
        let output = format_expected_failure(
            "units/grapheme.toml",
            FailureState::Pending,
            &[&with_reason, &bare],
        );
        insta::assert_snapshot!(output.trim(), @r###"
        EXPECTED (pending): units/grapheme.toml
          - segment[1]: cluster rules differ
          - count
        "###);
    }

    #[test]
    fn test_format_stale_entries() {
        assert_eq!(format_stale_entries(&[]), "");
        insta::assert_snapshot!(format_stale_entries(&["gone.toml", "fixed.toml"]).trim(), @r###"
        STALE: 2 ledger fixtures did not fail
          gone.toml
          fixed.toml
        "###);
    }

    #[test]
    fn test_format_summary() {
        let result = HarnessResult {
            total: 4,
            passed: 2,
            expected_failures: 1,
            regressions: 1,
        };
        insta::assert_snapshot!(format_summary(4, &result).trim(), @r###"
        FAIL: 4 fixtures
          2 passed, 2 failed (1 expected, 1 regressions)
        "###);

        let clean = HarnessResult {
            total: 1,
            passed: 1,
            ..HarnessResult::default()
        };
        assert!(format_summary(1, &clean).contains("PASS: 1 fixtures"));
    }
}
