//! HTTP probes against the application's public surface.
//!
//! The root probe accepts 200 and 302 (a login redirect is a live
//! application) and raises a latency alert when the response is slow but
//! still healthy. The endpoint probe is stricter: only an exact 200 passes.

use crate::config::Config;
use crate::models::{Alert, AlertSeverity, ProbeResult};
use crate::probes::Probe;
use async_trait::async_trait;
use std::time::{Duration, Instant};

const ROOT_NAME: &str = "http_root";
const ENDPOINT_NAME: &str = "http_endpoint";

/// Outcome of a single GET: status code or a transport-level cause.
/// Unreachable targets surface as code "000" in probe details, mirroring the
/// curl convention schedulers already grep for.
async fn fetch(url: &str, timeout: Duration) -> (Result<u16, String>, Duration) {
    let started = Instant::now();

    let client = match reqwest::Client::builder()
        .timeout(timeout)
        .redirect(reqwest::redirect::Policy::none())
        .build()
    {
        Ok(client) => client,
        Err(err) => return (Err(format!("client setup failed: {err}")), started.elapsed()),
    };

    let outcome = match client.get(url).send().await {
        Ok(response) => Ok(response.status().as_u16()),
        Err(err) if err.is_timeout() => Err(format!("timed out after {}s", timeout.as_secs())),
        Err(err) => Err(format!("unreachable: {}", root_cause(&err))),
    };

    (outcome, started.elapsed())
}

/// Walk to the innermost error source for a readable transport cause.
fn root_cause(err: &reqwest::Error) -> String {
    let mut cause: &dyn std::error::Error = err;
    while let Some(inner) = cause.source() {
        cause = inner;
    }
    cause.to_string()
}

/// GET on the application base URL; 200 and 302 both pass.
#[derive(Debug, Default)]
pub struct HttpRootProbe;

impl HttpRootProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for HttpRootProbe {
    fn name(&self) -> &'static str {
        ROOT_NAME
    }

    async fn run(&self, config: &Config) -> ProbeResult {
        let url = config.app.base_url.clone();
        let timeout = Duration::from_secs(config.app.root_timeout_secs);
        let (outcome, elapsed) = fetch(&url, timeout).await;

        match outcome {
            Ok(status) if status == 200 || status == 302 => {
                let threshold = Duration::from_millis(config.app.response_time_threshold_ms);
                let mut result = ProbeResult::ok(
                    ROOT_NAME,
                    format!("status {status} in {}ms", elapsed.as_millis()),
                )
                .with_duration(elapsed);
                if elapsed > threshold {
                    result = result.with_alert(Alert::new(
                        AlertSeverity::Warning,
                        ROOT_NAME,
                        format!(
                            "slow response: {}ms exceeds {}ms threshold",
                            elapsed.as_millis(),
                            threshold.as_millis()
                        ),
                    ));
                }
                result
            }
            Ok(status) => ProbeResult::fail(ROOT_NAME, format!("unexpected status {status}"))
                .with_duration(elapsed),
            Err(cause) => ProbeResult::fail(ROOT_NAME, format!("status 000 ({cause})"))
                .with_duration(elapsed),
        }
    }
}

/// GET on a specific application path; only an exact 200 passes.
#[derive(Debug, Default)]
pub struct HttpEndpointProbe;

impl HttpEndpointProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for HttpEndpointProbe {
    fn name(&self) -> &'static str {
        ENDPOINT_NAME
    }

    async fn run(&self, config: &Config) -> ProbeResult {
        let url = format!(
            "{}/{}",
            config.app.base_url.trim_end_matches('/'),
            config.app.endpoint_path.trim_start_matches('/')
        );
        let timeout = Duration::from_secs(config.app.endpoint_timeout_secs);
        let (outcome, elapsed) = fetch(&url, timeout).await;

        match outcome {
            Ok(200) => ProbeResult::ok(
                ENDPOINT_NAME,
                format!("status 200 in {}ms", elapsed.as_millis()),
            )
            .with_duration(elapsed),
            Ok(status) => ProbeResult::fail(ENDPOINT_NAME, format!("unexpected status {status}"))
                .with_duration(elapsed),
            Err(cause) => ProbeResult::fail(ENDPOINT_NAME, format!("status 000 ({cause})"))
                .with_duration(elapsed),
        }
    }
}
