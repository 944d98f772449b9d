//! Run report aggregation.

use crate::models::probe::ProbeResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Overall health of the monitored deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OverallStatus {
    /// Every probe passed (or was skipped/warned)
    Healthy,
    /// At least one probe failed
    Unhealthy,
}

impl OverallStatus {
    /// Whether the run passed.
    pub fn is_healthy(self) -> bool {
        matches!(self, OverallStatus::Healthy)
    }
}

impl fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverallStatus::Healthy => write!(f, "HEALTHY"),
            OverallStatus::Unhealthy => write!(f, "UNHEALTHY"),
        }
    }
}

/// Aggregate of a single monitoring pass.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RunReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// When the aggregation happened
    pub timestamp: DateTime<Utc>,
    /// Fail-dominates verdict over all probe outcomes
    pub overall_status: OverallStatus,
    /// Names of failed probes, in battery order
    pub failed_probes: Vec<String>,
    /// Every probe result, in battery order
    pub results: Vec<ProbeResult>,
}

impl RunReport {
    /// Fold an ordered sequence of probe results into a report.
    ///
    /// `Fail` dominates; `Warn` and `Skipped` never contribute to failure.
    /// The fold is order-deterministic, so concurrent probe execution would
    /// not change the verdict.
    pub fn from_results(results: Vec<ProbeResult>) -> Self {
        let failed_probes: Vec<String> = results
            .iter()
            .filter(|r| r.outcome.is_fail())
            .map(|r| r.name.clone())
            .collect();
        let overall_status = if failed_probes.is_empty() {
            OverallStatus::Healthy
        } else {
            OverallStatus::Unhealthy
        };
        Self {
            run_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            overall_status,
            failed_probes,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::probe::ProbeResult;

    #[test]
    fn all_ok_is_healthy() {
        let report = RunReport::from_results(vec![
            ProbeResult::ok("docker_container", "running"),
            ProbeResult::ok("http_root", "status 200"),
        ]);
        assert_eq!(report.overall_status, OverallStatus::Healthy);
        assert!(report.overall_status.is_healthy());
        assert!(report.failed_probes.is_empty());
    }

    #[test]
    fn single_fail_dominates() {
        let report = RunReport::from_results(vec![
            ProbeResult::fail("docker_container", "not running"),
            ProbeResult::ok("http_root", "status 200"),
        ]);
        assert_eq!(report.overall_status, OverallStatus::Unhealthy);
        assert_eq!(report.failed_probes, vec!["docker_container"]);
    }

    #[test]
    fn warn_and_skipped_do_not_flip_status() {
        let report = RunReport::from_results(vec![
            ProbeResult::ok("http_root", "status 200"),
            ProbeResult::warn("disk_space", "usage near threshold"),
            ProbeResult::skipped("database", "no database configured"),
        ]);
        assert_eq!(report.overall_status, OverallStatus::Healthy);
        assert!(report.failed_probes.is_empty());
    }

    #[test]
    fn failed_probe_order_is_preserved() {
        let report = RunReport::from_results(vec![
            ProbeResult::fail("docker_container", "not running"),
            ProbeResult::ok("http_root", "status 200"),
            ProbeResult::fail("disk_space", "usage 95%"),
        ]);
        assert_eq!(report.failed_probes, vec!["docker_container", "disk_space"]);
    }

    #[test]
    fn empty_battery_is_healthy() {
        let report = RunReport::from_results(Vec::new());
        assert_eq!(report.overall_status, OverallStatus::Healthy);
    }

    #[test]
    fn repeated_aggregation_is_idempotent() {
        let results = vec![
            ProbeResult::ok("http_root", "status 200"),
            ProbeResult::ok("database", "SELECT 1 succeeded"),
        ];
        let first = RunReport::from_results(results.clone());
        let second = RunReport::from_results(results);
        assert_eq!(first.overall_status, second.overall_status);
        assert_eq!(first.failed_probes, second.failed_probes);
    }
}
