//! Probe result types shared by every probe variant.

use crate::models::Alert;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outcome of a single probe invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeOutcome {
    /// Check passed
    Ok,
    /// Check failed; contributes to overall unhealthiness
    Fail,
    /// Check passed with a condition worth surfacing
    Warn,
    /// Check could not run because its capability is unconfigured
    Skipped,
}

impl ProbeOutcome {
    /// Whether this outcome counts toward overall failure.
    pub fn is_fail(self) -> bool {
        matches!(self, ProbeOutcome::Fail)
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeOutcome::Ok => write!(f, "OK"),
            ProbeOutcome::Fail => write!(f, "FAIL"),
            ProbeOutcome::Warn => write!(f, "WARN"),
            ProbeOutcome::Skipped => write!(f, "SKIPPED"),
        }
    }
}

/// The outcome of one probe invocation.
///
/// Every probe produces exactly one result per run; expected failure modes
/// (network unreachable, timeout, missing tool) resolve to `Fail` with the
/// cause in `detail` rather than propagating.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProbeResult {
    /// Probe identifier, unique per run
    pub name: String,
    /// Pass/fail outcome
    pub outcome: ProbeOutcome,
    /// Free-text diagnostic (HTTP code, error message)
    pub detail: String,
    /// When the probe ran
    pub measured_at: DateTime<Utc>,
    /// Elapsed time, recorded where latency matters
    pub duration_ms: Option<u64>,
    /// Threshold alerts raised by the probe while its outcome stayed Ok
    #[serde(default)]
    pub alerts: Vec<Alert>,
}

impl ProbeResult {
    fn new(name: impl Into<String>, outcome: ProbeOutcome, detail: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            outcome,
            detail: detail.into(),
            measured_at: Utc::now(),
            duration_ms: None,
            alerts: Vec::new(),
        }
    }

    /// A passing result.
    pub fn ok(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, ProbeOutcome::Ok, detail)
    }

    /// A failing result.
    pub fn fail(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, ProbeOutcome::Fail, detail)
    }

    /// A passing result with a surfaced condition.
    pub fn warn(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, ProbeOutcome::Warn, detail)
    }

    /// A skipped result.
    pub fn skipped(name: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::new(name, ProbeOutcome::Skipped, detail)
    }

    /// Record the elapsed time of the underlying check.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis() as u64);
        self
    }

    /// Attach a threshold alert to this result.
    pub fn with_alert(mut self, alert: Alert) -> Self {
        self.alerts.push(alert);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertSeverity;

    #[test]
    fn constructors_set_outcome_and_detail() {
        let result = ProbeResult::fail("http_root", "status 503");
        assert_eq!(result.outcome, ProbeOutcome::Fail);
        assert!(result.outcome.is_fail());
        assert_eq!(result.detail, "status 503");
        assert!(result.duration_ms.is_none());
        assert!(result.alerts.is_empty());
    }

    #[test]
    fn only_fail_counts_as_failure() {
        assert!(!ProbeOutcome::Ok.is_fail());
        assert!(!ProbeOutcome::Warn.is_fail());
        assert!(!ProbeOutcome::Skipped.is_fail());
        assert!(ProbeOutcome::Fail.is_fail());
    }

    #[test]
    fn duration_and_alerts_are_attached() {
        let result = ProbeResult::ok("http_root", "status 200")
            .with_duration(Duration::from_millis(1234))
            .with_alert(Alert::new(
                AlertSeverity::Warning,
                "http_root",
                "slow response",
            ));
        assert_eq!(result.duration_ms, Some(1234));
        assert_eq!(result.alerts.len(), 1);
    }
}
