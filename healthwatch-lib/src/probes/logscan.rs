//! Application log error scan.
//!
//! Counts error-ish lines in the tail of the application log. A missing log
//! file is benign (the volume may simply not be mounted on this host). A
//! count over the threshold raises an alert but the outcome stays Ok; only
//! an unreadable file fails the probe.

use crate::config::Config;
use crate::models::{Alert, AlertSeverity, ProbeResult};
use crate::probes::Probe;
use async_trait::async_trait;
use regex::Regex;
use std::io;

const NAME: &str = "log_errors";

/// Scans the tail of the application log for error/critical/exception lines.
#[derive(Debug)]
pub struct LogErrorScanProbe {
    pattern: Regex,
}

impl LogErrorScanProbe {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(r"(?i)error|critical|exception").expect("static pattern"),
        }
    }
}

impl Default for LogErrorScanProbe {
    fn default() -> Self {
        Self::new()
    }
}

/// Count pattern-matching lines within the last `tail` lines.
fn count_error_lines(pattern: &Regex, contents: &str, tail: usize) -> usize {
    let lines: Vec<&str> = contents.lines().collect();
    let start = lines.len().saturating_sub(tail);
    lines[start..]
        .iter()
        .filter(|line| pattern.is_match(line))
        .count()
}

#[async_trait]
impl Probe for LogErrorScanProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, config: &Config) -> ProbeResult {
        let scan = &config.logscan;
        let contents = match tokio::fs::read_to_string(&scan.path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return ProbeResult::ok(NAME, "log not mounted");
            }
            Err(err) => {
                return ProbeResult::fail(
                    NAME,
                    format!("failed to read {}: {err}", scan.path.display()),
                );
            }
        };

        let count = count_error_lines(&self.pattern, &contents, scan.tail_lines);
        let detail = format!("{count} error lines in last {} lines", scan.tail_lines);

        if count > scan.error_threshold {
            ProbeResult::ok(NAME, detail).with_alert(Alert::new(
                AlertSeverity::Warning,
                NAME,
                format!(
                    "{count} error lines exceed threshold {}",
                    scan.error_threshold
                ),
            ))
        } else {
            ProbeResult::ok(NAME, detail)
        }
    }
}
