//! Monitor run loop: fixed probe battery, aggregation, reporting, alerting.

use crate::alerting::AlertDispatcher;
use crate::config::Config;
use crate::models::{Alert, AlertSeverity, ProbeOutcome, RunReport};
use crate::probes;
use crate::report;
use crate::telemetry;
use std::time::Duration;
use tracing::{error, info, warn};

/// Probes separated by the pacing delay: the container and HTTP checks hit
/// the same freshly-probed service, so they are not fired back-to-back.
const PACED_PROBES: usize = 3;

/// Runs one complete monitoring pass.
pub struct Monitor {
    config: Config,
    dispatcher: AlertDispatcher,
}

impl Monitor {
    pub fn new(config: Config) -> Self {
        let alert_log = config.logging.dir.join(telemetry::ALERT_LOG);
        let dispatcher = AlertDispatcher::new(alert_log, &config.alerting);
        Self { config, dispatcher }
    }

    /// Run every probe in battery order, aggregate, log the report, and
    /// dispatch alerts. Always produces a complete report; individual probe
    /// failures never abort the pass.
    pub async fn run(&self) -> RunReport {
        let battery = probes::battery();
        let mut results = Vec::with_capacity(battery.len());

        for (idx, probe) in battery.iter().enumerate() {
            if (1..PACED_PROBES).contains(&idx) && self.config.app.pacing_delay_ms > 0 {
                tokio::time::sleep(Duration::from_millis(self.config.app.pacing_delay_ms)).await;
            }

            info!(probe = probe.name(), "running probe");
            let result = probe.run(&self.config).await;
            match result.outcome {
                ProbeOutcome::Ok => {
                    info!(probe = %result.name, detail = %result.detail, "probe passed");
                }
                ProbeOutcome::Warn => {
                    warn!(probe = %result.name, detail = %result.detail, "probe warned");
                }
                ProbeOutcome::Skipped => {
                    warn!(probe = %result.name, detail = %result.detail, "probe skipped");
                }
                ProbeOutcome::Fail => {
                    error!(probe = %result.name, detail = %result.detail, "probe failed");
                }
            }
            results.push(result);
        }

        let run_report = RunReport::from_results(results);
        for line in report::render(&run_report).lines() {
            info!("{line}");
        }

        self.dispatch_alerts(&run_report).await;
        run_report
    }

    /// One Critical alert per failed probe, plus whatever threshold alerts
    /// the probes attached to their results.
    async fn dispatch_alerts(&self, run_report: &RunReport) {
        for result in &run_report.results {
            for alert in &result.alerts {
                self.dispatcher.emit(alert).await;
            }
            if result.outcome.is_fail() {
                let alert = Alert::new(
                    AlertSeverity::Critical,
                    result.name.clone(),
                    format!("{} failed: {}", result.name, result.detail),
                );
                self.dispatcher.emit(&alert).await;
            }
        }
    }
}
