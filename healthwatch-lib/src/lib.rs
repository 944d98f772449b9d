#![forbid(unsafe_code)]

//! healthwatch-lib: core library for the healthwatch deployment monitor.
//!
//! This library provides everything the `healthwatch` binary composes into a
//! single monitoring pass:
//! - Hierarchical configuration (embedded defaults, deployment env-file,
//!   `HEALTHWATCH_*` environment variables)
//! - A six-probe health battery behind a uniform result contract
//! - Fail-dominates aggregation into a run report
//! - Durable alert log with best-effort mail/webhook forwarding
//! - tracing-based primary health log with guard-scoped flush
//! - Advisory run lock preventing overlapping invocations

pub mod alerting;
pub mod config;
pub mod models;
pub mod monitor;
pub mod probes;
pub mod report;
pub mod runlock;
pub mod telemetry;
