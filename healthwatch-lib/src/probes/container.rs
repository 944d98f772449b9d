//! Container liveness probe.

use crate::config::Config;
use crate::models::ProbeResult;
use crate::probes::Probe;
use async_trait::async_trait;
use std::io;
use tokio::process::Command;

const NAME: &str = "docker_container";

/// Queries the container runtime for the running state of the configured
/// container. A missing runtime binary is itself a failure, not a crash.
#[derive(Debug, Default)]
pub struct ContainerProbe;

impl ContainerProbe {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Probe for ContainerProbe {
    fn name(&self) -> &'static str {
        NAME
    }

    async fn run(&self, config: &Config) -> ProbeResult {
        let Some(name) = config.container.name.as_deref() else {
            return ProbeResult::fail(NAME, "CONTAINER_NAME not configured");
        };

        let runtime = &config.container.runtime;
        let output = Command::new(runtime)
            .args(["inspect", "--format", "{{.State.Running}}", name])
            .output()
            .await;

        match output {
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                ProbeResult::fail(NAME, format!("container runtime {runtime:?} not found"))
            }
            Err(err) => ProbeResult::fail(NAME, format!("failed to run {runtime}: {err}")),
            Ok(out) if !out.status.success() => {
                let stderr = String::from_utf8_lossy(&out.stderr);
                ProbeResult::fail(
                    NAME,
                    format!("inspect exited with {}: {}", out.status, stderr.trim()),
                )
            }
            Ok(out) => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                let state = stdout.trim();
                if state == "true" {
                    ProbeResult::ok(NAME, format!("container {name:?} is running"))
                } else {
                    ProbeResult::fail(NAME, format!("container {name:?} reported state {state:?}"))
                }
            }
        }
    }
}
