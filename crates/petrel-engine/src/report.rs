//! Plain-text rendering of an analysis report.
//!
//! Each solver section prints four lines: the section name, the value
//! vector space-separated (infinite values as `infinity`/`-infinity`),
//! the wall-clock duration as `<seconds>.<millis>s`, and the same
//! duration in nanoseconds. The counter selector follows as a table and
//! the validator verdict, when present, closes the report.

use std::fmt::Write;
use std::time::Duration;

use petrel_cmdp::ExtInt;

use crate::pipeline::AnalysisReport;

fn format_duration(duration: Duration) -> String {
    format!("{}.{:03}s", duration.as_secs(), duration.subsec_millis())
}

fn render_section(out: &mut String, name: &str, values: &[ExtInt], duration: Duration) {
    out.push_str(name);
    out.push('\n');
    let row = values
        .iter()
        .map(ExtInt::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    out.push_str(&row);
    out.push('\n');
    out.push_str(&format_duration(duration));
    out.push('\n');
    let _ = writeln!(out, "{}", duration.as_nanos());
}

/// Renders the full report in the persisted text format.
pub fn render_report(report: &AnalysisReport) -> String {
    let mut out = String::new();
    render_section(
        &mut out,
        "MinInitCons",
        &report.min_init_cons,
        report.timings.min_init_cons,
    );
    render_section(&mut out, "Safe", &report.safe, report.timings.safe);
    render_section(&mut out, "SafePR", &report.safe_pr, report.timings.safe_pr);
    let _ = write!(out, "{}", report.selector);
    if let Some(verdict) = report.verdict {
        let _ = writeln!(out, "Counter selector satisfies requirements: {verdict}");
    }
    out
}
