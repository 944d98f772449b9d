//! Alert data structures.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Alert severity levels.
///
/// `Critical` marks a failed probe; `Warning` marks a threshold breach on a
/// probe whose outcome stayed healthy (slow response, noisy application log).
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum AlertSeverity {
    /// Threshold breach worth a human look
    Warning,
    /// Probe failure
    Critical,
}

impl fmt::Display for AlertSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertSeverity::Warning => write!(f, "warning"),
            AlertSeverity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for AlertSeverity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warning" => Ok(AlertSeverity::Warning),
            "critical" => Ok(AlertSeverity::Critical),
            _ => Err(format!("Invalid alert severity: {s}")),
        }
    }
}

/// A notification-worthy event, durably appended to the alert log and
/// optionally forwarded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Alert {
    /// Unique alert identifier
    pub id: Uuid,
    /// Alert severity level
    pub severity: AlertSeverity,
    /// Probe name or component that raised the alert
    pub source: String,
    /// Human-readable alert message
    pub message: String,
    /// Alert creation timestamp
    pub emitted_at: DateTime<Utc>,
}

impl Alert {
    /// Create a new alert.
    pub fn new(
        severity: AlertSeverity,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            severity,
            source: source.into(),
            message: message.into(),
            emitted_at: Utc::now(),
        }
    }

    /// Render the single-line form used in the alert log.
    pub fn format_line(&self) -> String {
        format!(
            "{} [{}] {}: {}",
            self.emitted_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            self.severity,
            self.source,
            self.message
        )
    }
}
