//! JUnit-style XML report rendering.
//!
//! Fixed schema: `testsuites > testsuite{name, tests, failures, errors,
//! skipped, timestamp} > testcase{classname, name, time}` with an optional
//! `failure{type, message}` block plus `system-out` / `system-err` text
//! blocks. All interpolated text is XML-escaped.

use chrono::Utc;

use crate::models::StageResult;

/// The six fixed assertions enumerated by a successful patch validation.
pub const VALIDATION_ASSERTIONS: [&str; 6] = [
    "BaselineCompiles",
    "TestPatchApplies",
    "TestPatchFailsTests",
    "GoldenPatchApplies",
    "GoldenPatchCompiles",
    "GoldenPatchPassesTests",
];

/// Render a single stage outcome as a one-case test suite.
#[must_use]
pub fn render_stage(stage: &StageResult) -> String {
    let failures = u32::from(!stage.passed);
    let failure_block = match (&stage.message, stage.passed) {
        (Some(message), false) => format!(
            "\n      <failure type=\"TestFailure\" message=\"{}\"/>",
            escape_xml(message)
        ),
        _ => String::new(),
    };

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="{name}" tests="1" failures="{failures}" errors="0" skipped="0" timestamp="{timestamp}">
    <testcase classname="{name}" name="test{name}" time="0.0">{failure_block}
      <system-out>{stdout}</system-out>
      <system-err>{stderr}</system-err>
    </testcase>
  </testsuite>
</testsuites>"#,
        name = escape_xml(&stage.name),
        timestamp = timestamp(),
        stdout = escape_xml(&stage.stdout),
        stderr = escape_xml(&stage.stderr),
    )
}

/// Render the all-pass validation report listing the six fixed assertions.
#[must_use]
pub fn render_validation_success() -> String {
    let cases: String = VALIDATION_ASSERTIONS
        .iter()
        .map(|name| {
            format!("    <testcase classname=\"PatchValidation\" name=\"test{name}\" time=\"0.0\"/>\n")
        })
        .collect();

    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<testsuites>
  <testsuite name="PatchValidation" tests="6" failures="0" errors="0" skipped="0" timestamp="{timestamp}">
{cases}  </testsuite>
</testsuites>"#,
        timestamp = timestamp(),
    )
}

fn timestamp() -> String {
    Utc::now().format("%Y-%m-%dT%H:%M:%S").to_string()
}

/// Escape the five XML-special characters in attribute and text content.
fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
