//! Health probes: independent checks against one aspect each of the deployed
//! system, unified behind a single result shape so the aggregator needs no
//! probe-specific logic.
//!
//! Each probe owns its own definition of "OK" and its own timeout; expected
//! failure modes never escape as errors, they become `Fail` results.

pub mod container;
pub mod database;
pub mod disk;
pub mod http;
pub mod logscan;

pub use container::ContainerProbe;
pub use database::DatabaseProbe;
pub use disk::DiskSpaceProbe;
pub use http::{HttpEndpointProbe, HttpRootProbe};
pub use logscan::LogErrorScanProbe;

use crate::config::Config;
use crate::models::ProbeResult;
use async_trait::async_trait;

/// Uniform probe contract.
///
/// `run` never panics for expected failure modes; all such conditions resolve
/// to a `Fail` result with the cause in `detail`.
#[async_trait]
pub trait Probe: Send + Sync {
    /// Stable probe identifier, unique within the battery.
    fn name(&self) -> &'static str;

    /// Execute the check against the configured target.
    async fn run(&self, config: &Config) -> ProbeResult;
}

/// The fixed battery, in declared order: container, http-root, http-endpoint,
/// database, disk, logs.
pub fn battery() -> Vec<Box<dyn Probe>> {
    vec![
        Box::new(ContainerProbe::new()),
        Box::new(HttpRootProbe::new()),
        Box::new(HttpEndpointProbe::new()),
        Box::new(DatabaseProbe::new()),
        Box::new(DiskSpaceProbe::new()),
        Box::new(LogErrorScanProbe::new()),
    ]
}
