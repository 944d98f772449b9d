//! Alert delivery: durable alert log plus best-effort forwarding.
//!
//! Every alert is appended to the alert log file first; that file is the
//! durable record. Configured forwarders (mail, webhook) each get one
//! delivery attempt per alert, and a forwarding failure is logged and
//! swallowed. Alerts are deliberately not deduplicated or rate limited:
//! every qualifying condition in every run re-emits.

use crate::config::AlertingConfig;
use crate::models::Alert;
use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{error, warn};

/// Alert delivery errors.
#[derive(Debug, Error)]
pub enum AlertingError {
    #[error("alert log error: {path}: {source}")]
    FileSink {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("mail delivery failed: {0}")]
    Mail(String),

    #[error("webhook delivery failed: {0}")]
    Webhook(String),
}

/// Alert sink contract for delivery mechanisms.
#[async_trait]
pub trait AlertSink: Send + Sync {
    /// Get the sink name.
    fn name(&self) -> &str;

    /// Deliver one alert through this sink.
    async fn deliver(&self, alert: &Alert) -> Result<(), AlertingError>;
}

/// Append-only file sink; the durable alert record.
pub struct FileSink {
    path: PathBuf,
}

impl FileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl AlertSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertingError> {
        let append = |path: &PathBuf| -> std::io::Result<()> {
            let mut file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)?;
            writeln!(file, "{}", alert.format_line())
        };
        append(&self.path).map_err(|source| AlertingError::FileSink {
            path: self.path.clone(),
            source,
        })
    }
}

/// Mail forwarder shelling out to the local mailer; absence of the mailer is
/// a delivery failure, never a crash.
pub struct MailSink {
    recipient: String,
    mailer: String,
}

impl MailSink {
    pub fn new(recipient: impl Into<String>, mailer: impl Into<String>) -> Self {
        Self {
            recipient: recipient.into(),
            mailer: mailer.into(),
        }
    }
}

#[async_trait]
impl AlertSink for MailSink {
    fn name(&self) -> &str {
        "mail"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertingError> {
        let subject = format!("[healthwatch] {} alert: {}", alert.severity, alert.source);
        let mut child = Command::new(&self.mailer)
            .arg("-s")
            .arg(subject)
            .arg(&self.recipient)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| AlertingError::Mail(format!("failed to spawn {}: {err}", self.mailer)))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(alert.format_line().as_bytes())
                .await
                .map_err(|err| AlertingError::Mail(format!("failed to write body: {err}")))?;
        }

        let status = child
            .wait()
            .await
            .map_err(|err| AlertingError::Mail(err.to_string()))?;
        if status.success() {
            Ok(())
        } else {
            Err(AlertingError::Mail(format!(
                "{} exited with {status}",
                self.mailer
            )))
        }
    }
}

/// Webhook forwarder posting the alert as JSON.
pub struct WebhookSink {
    url: String,
    client: reqwest::Client,
}

impl WebhookSink {
    pub fn new(url: impl Into<String>) -> Result<Self, AlertingError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|err| AlertingError::Webhook(format!("client setup failed: {err}")))?;
        Ok(Self {
            url: url.into(),
            client,
        })
    }
}

#[async_trait]
impl AlertSink for WebhookSink {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn deliver(&self, alert: &Alert) -> Result<(), AlertingError> {
        let response = self
            .client
            .post(&self.url)
            .json(alert)
            .send()
            .await
            .map_err(|err| AlertingError::Webhook(err.to_string()))?;
        response
            .error_for_status()
            .map_err(|err| AlertingError::Webhook(err.to_string()))?;
        Ok(())
    }
}

/// Default mailer binary when `ALERT_EMAIL` is set without an explicit mailer.
const DEFAULT_MAILER: &str = "mail";

/// Coordinates delivery: alert log first, then each forwarder once.
pub struct AlertDispatcher {
    log: FileSink,
    forwarders: Vec<Box<dyn AlertSink>>,
}

impl AlertDispatcher {
    /// Build a dispatcher from the alerting configuration.
    pub fn new(alert_log: impl Into<PathBuf>, config: &AlertingConfig) -> Self {
        let mut forwarders: Vec<Box<dyn AlertSink>> = Vec::new();

        if let Some(recipient) = &config.email {
            let mailer = config.mailer.as_deref().unwrap_or(DEFAULT_MAILER);
            forwarders.push(Box::new(MailSink::new(recipient, mailer)));
        }
        if let Some(url) = &config.webhook_url {
            match WebhookSink::new(url) {
                Ok(sink) => forwarders.push(Box::new(sink)),
                Err(err) => warn!(%err, "webhook forwarder disabled"),
            }
        }

        Self {
            log: FileSink::new(alert_log),
            forwarders,
        }
    }

    /// Number of configured forwarders.
    pub fn forwarder_count(&self) -> usize {
        self.forwarders.len()
    }

    /// Emit one alert: durable append, then best-effort forwarding.
    pub async fn emit(&self, alert: &Alert) {
        if let Err(err) = self.log.deliver(alert).await {
            error!(%err, "failed to append alert log");
        }
        for sink in &self.forwarders {
            if let Err(err) = sink.deliver(alert).await {
                warn!(sink = sink.name(), %err, "alert forwarding failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::AlertSeverity;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn alert(message: &str) -> Alert {
        Alert::new(AlertSeverity::Critical, "docker_container", message)
    }

    #[tokio::test]
    async fn file_sink_appends_one_line_per_alert() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.log");
        let sink = FileSink::new(&path);

        sink.deliver(&alert("first")).await.unwrap();
        sink.deliver(&alert("second")).await.unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("first"));
        assert!(lines[1].contains("second"));
    }

    #[tokio::test]
    async fn mail_sink_reports_missing_mailer() {
        let sink = MailSink::new("ops@example.com", "/nonexistent/healthwatch-mailer");
        let err = sink.deliver(&alert("boom")).await.unwrap_err();
        assert!(matches!(err, AlertingError::Mail(_)));
    }

    #[tokio::test]
    async fn webhook_sink_posts_alert_json() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let sink = WebhookSink::new(format!("{}/hook", server.uri())).unwrap();
        sink.deliver(&alert("boom")).await.unwrap();
    }

    #[tokio::test]
    async fn webhook_sink_treats_http_error_as_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/hook"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let sink = WebhookSink::new(format!("{}/hook", server.uri())).unwrap();
        let err = sink.deliver(&alert("boom")).await.unwrap_err();
        assert!(matches!(err, AlertingError::Webhook(_)));
    }

    #[tokio::test]
    async fn dispatcher_swallows_forwarding_failures() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.log");
        let config = AlertingConfig {
            email: Some("ops@example.com".to_owned()),
            webhook_url: None,
            mailer: Some("/nonexistent/healthwatch-mailer".to_owned()),
        };
        let dispatcher = AlertDispatcher::new(&path, &config);
        assert_eq!(dispatcher.forwarder_count(), 1);

        // forwarding fails, but the durable record is still written
        dispatcher.emit(&alert("boom")).await;
        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("boom"));
    }

    #[tokio::test]
    async fn dispatcher_without_forwarders_only_writes_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("alerts.log");
        let dispatcher = AlertDispatcher::new(&path, &AlertingConfig::default());
        assert_eq!(dispatcher.forwarder_count(), 0);

        dispatcher.emit(&alert("boom")).await;
        assert!(path.exists());
    }
}
