//! Human-readable run report rendering.

use crate::models::{ProbeOutcome, RunReport};
use chrono::SecondsFormat;

/// Render a report as the multi-line block appended to the primary log.
///
/// Pure function of the report; no side effects.
pub fn render(report: &RunReport) -> String {
    let mut out = String::new();
    out.push_str("==================== health check report ====================\n");
    out.push_str(&format!(
        "run {} at {}\n",
        report.run_id,
        report.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true)
    ));

    for result in &report.results {
        let duration = result
            .duration_ms
            .map(|ms| format!(" ({ms}ms)"))
            .unwrap_or_default();
        out.push_str(&format!(
            "  {:<18} {:>7}  {}{}\n",
            result.name,
            result.outcome.to_string(),
            result.detail,
            duration
        ));
    }

    let passed = count(report, ProbeOutcome::Ok);
    let failed = count(report, ProbeOutcome::Fail);
    let warned = count(report, ProbeOutcome::Warn);
    let skipped = count(report, ProbeOutcome::Skipped);
    out.push_str(&format!(
        "probes: {passed} passed, {failed} failed, {warned} warned, {skipped} skipped\n"
    ));

    if !report.failed_probes.is_empty() {
        out.push_str(&format!("failed: {}\n", report.failed_probes.join(", ")));
    }
    out.push_str(&format!("overall: {}\n", report.overall_status));
    out.push_str("=============================================================");
    out
}

fn count(report: &RunReport, outcome: ProbeOutcome) -> usize {
    report
        .results
        .iter()
        .filter(|r| r.outcome == outcome)
        .count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProbeResult;
    use std::time::Duration;

    #[test]
    fn healthy_report_renders_status_block() {
        let report = RunReport::from_results(vec![
            ProbeResult::ok("docker_container", "container \"app\" is running"),
            ProbeResult::ok("http_root", "status 200 in 12ms")
                .with_duration(Duration::from_millis(12)),
        ]);
        let rendered = render(&report);
        assert!(rendered.contains("overall: HEALTHY"));
        assert!(rendered.contains("docker_container"));
        assert!(rendered.contains("(12ms)"));
        assert!(rendered.contains("2 passed, 0 failed"));
        assert!(!rendered.contains("failed:"));
    }

    #[test]
    fn unhealthy_report_lists_failed_probes() {
        let report = RunReport::from_results(vec![
            ProbeResult::fail("docker_container", "not running"),
            ProbeResult::skipped("database", "no database configured"),
        ]);
        let rendered = render(&report);
        assert!(rendered.contains("overall: UNHEALTHY"));
        assert!(rendered.contains("failed: docker_container"));
        assert!(rendered.contains("1 skipped"));
    }

    #[test]
    fn rendering_is_pure() {
        let report = RunReport::from_results(vec![ProbeResult::ok("http_root", "status 200")]);
        assert_eq!(render(&report), render(&report));
    }
}
