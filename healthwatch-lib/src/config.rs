//! Configuration management with hierarchical overrides using figment.
//!
//! Supports multiple configuration sources with precedence:
//! 1. Environment variables (`HEALTHWATCH_*`, `__` as section separator)
//! 2. Deployment env-file (key=value pairs, `deploy.env` by default)
//! 3. Embedded defaults (lowest precedence)
//!
//! Loading never mutates the process environment; the result is an immutable
//! [`Config`] value passed by reference to every probe.

use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration loading and validation errors.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("deployment file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("malformed line {line} in {path}: {content:?}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        content: String,
    },

    #[error("invalid configuration format: {0}")]
    InvalidFormat(#[from] figment::Error),

    #[error("IO error reading configuration: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration validation failed: {message}")]
    ValidationError { message: String },
}

/// Process-wide configuration, loaded once at startup and read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Monitored application endpoints and HTTP probe tuning
    pub app: AppConfig,
    /// Container liveness probe configuration
    pub container: ContainerConfig,
    /// Database connectivity probe configuration
    pub database: DatabaseConfig,
    /// Disk usage probe configuration
    pub disk: DiskConfig,
    /// Application log scan probe configuration
    pub logscan: LogScanConfig,
    /// Alert forwarding configuration
    pub alerting: AlertingConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Application endpoint configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    /// Base URL of the monitored application
    pub base_url: String,
    /// Endpoint path probed with the strict 200-only check
    pub endpoint_path: String,
    /// Timeout for the root HTTP probe in seconds
    pub root_timeout_secs: u64,
    /// Timeout for the endpoint HTTP probe in seconds
    pub endpoint_timeout_secs: u64,
    /// Response-time threshold in milliseconds; slower root responses alert
    pub response_time_threshold_ms: u64,
    /// Pacing delay between the first probes in milliseconds
    pub pacing_delay_ms: u64,
}

/// Container liveness probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContainerConfig {
    /// Container runtime binary used for the liveness query
    pub runtime: String,
    /// Name of the container expected to be running
    pub name: Option<String>,
}

/// Database connectivity probe configuration.
///
/// All connection fields default to unset; a completely unconfigured database
/// section disables the probe (it reports `Skipped`), while a partially
/// configured one is a deployment mistake and fails the probe.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DatabaseConfig {
    /// Database host
    pub host: Option<String>,
    /// Database port
    pub port: u16,
    /// Database user
    pub user: Option<String>,
    /// Database password
    pub password: Option<String>,
    /// Database name
    pub name: Option<String>,
    /// Connection acquire timeout in seconds
    pub connect_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Whether any connection parameter has been supplied.
    pub fn is_configured(&self) -> bool {
        self.host.is_some() || self.user.is_some() || self.password.is_some() || self.name.is_some()
    }
}

/// Disk usage probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiskConfig {
    /// Mount point whose usage is checked
    pub mount_path: PathBuf,
    /// Usage percentage above which the probe fails
    pub usage_threshold_percent: u8,
}

/// Application log scan probe configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LogScanConfig {
    /// Application log file path; absence is benign
    pub path: PathBuf,
    /// Number of trailing lines scanned
    pub tail_lines: usize,
    /// Error-line count above which an alert is raised
    pub error_threshold: usize,
}

/// Alert forwarding configuration. Both channels are optional; the alert log
/// file is always written.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct AlertingConfig {
    /// Recipient for mail forwarding
    pub email: Option<String>,
    /// Webhook URL for HTTP forwarding
    pub webhook_url: Option<String>,
    /// Mailer binary used for mail forwarding
    pub mailer: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Directory holding the primary and alert logs
    pub dir: PathBuf,
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:5000".to_owned(),
            endpoint_path: "/register".to_owned(),
            root_timeout_secs: 10,
            endpoint_timeout_secs: 5,
            response_time_threshold_ms: 2000,
            pacing_delay_ms: 2000,
        }
    }
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            runtime: "docker".to_owned(),
            name: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: 5432,
            user: None,
            password: None,
            name: None,
            connect_timeout_secs: 5,
        }
    }
}

impl Default for DiskConfig {
    fn default() -> Self {
        Self {
            mount_path: PathBuf::from("/"),
            usage_threshold_percent: 80,
        }
    }
}

impl Default for LogScanConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("logs/app.log"),
            tail_lines: 100,
            error_threshold: 10,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            level: "info".to_owned(),
        }
    }
}

impl Config {
    /// Validate cross-field constraints that figment cannot express.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.disk.usage_threshold_percent > 100 {
            return Err(ConfigError::ValidationError {
                message: format!(
                    "disk usage threshold must be 0-100, got {}",
                    self.disk.usage_threshold_percent
                ),
            });
        }
        if self.logscan.tail_lines == 0 {
            return Err(ConfigError::ValidationError {
                message: "log scan tail window must be at least 1 line".to_owned(),
            });
        }
        Ok(())
    }
}

/// Default deployment parameter file, looked up relative to the working
/// directory when no explicit path is given.
pub const DEFAULT_ENV_FILE: &str = "deploy.env";

/// Configuration loader with hierarchical override support.
pub struct ConfigLoader {
    env_file: Option<PathBuf>,
}

impl ConfigLoader {
    /// Create a loader that reads `deploy.env` if present.
    pub fn new() -> Self {
        Self { env_file: None }
    }

    /// Create a loader for an explicit deployment file; the file must exist.
    pub fn with_env_file(path: impl Into<PathBuf>) -> Self {
        Self {
            env_file: Some(path.into()),
        }
    }

    /// Load configuration with hierarchical overrides.
    pub fn load(&self) -> Result<Config, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match &self.env_file {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound { path: path.clone() });
                }
                figment = figment.merge(Serialized::defaults(load_deploy_overrides(path)?));
            }
            None => {
                let path = Path::new(DEFAULT_ENV_FILE);
                if path.exists() {
                    figment = figment.merge(Serialized::defaults(load_deploy_overrides(path)?));
                }
            }
        }

        figment = figment.merge(Env::prefixed("HEALTHWATCH_").split("__"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse a deployment env-file into key/value pairs.
///
/// Tolerates blank lines, full-line `#` comments, an optional `export `
/// prefix, and single or double quoting around values. Rejects lines without
/// an `=` or with a key that is not a valid shell identifier.
pub fn parse_env_file(path: &Path) -> Result<Vec<(String, String)>, ConfigError> {
    let contents = std::fs::read_to_string(path)?;
    let mut pairs = Vec::new();

    for (idx, raw) in contents.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_prefix("export ").unwrap_or(line).trim_start();

        let malformed = || ConfigError::MalformedLine {
            path: path.to_path_buf(),
            line: idx + 1,
            content: raw.to_owned(),
        };

        let (key, value) = line.split_once('=').ok_or_else(malformed)?;
        let key = key.trim();
        if key.is_empty() || !is_identifier(key) {
            return Err(malformed());
        }

        pairs.push((key.to_owned(), unquote(value.trim()).to_owned()));
    }

    Ok(pairs)
}

fn is_identifier(key: &str) -> bool {
    let mut chars = key.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

fn unquote(value: &str) -> &str {
    let bytes = value.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if first == last && (first == b'"' || first == b'\'') {
            return &value[1..value.len() - 1];
        }
    }
    value
}

/// Map recognized deployment keys onto the nested [`Config`] structure.
/// Unrecognized keys are ignored; deployment files carry variables for other
/// consumers too.
fn load_deploy_overrides(path: &Path) -> Result<serde_json::Value, ConfigError> {
    let pairs = parse_env_file(path)?;
    let mut root = serde_json::Map::new();

    for (key, value) in pairs {
        match key.as_str() {
            "APP_BASE_URL" => set_nested(&mut root, "app", "base_url", json!(value)),
            "APP_ENDPOINT_PATH" => set_nested(&mut root, "app", "endpoint_path", json!(value)),
            "RESPONSE_TIME_THRESHOLD" => {
                let secs = parse_number::<f64>(&key, &value)?;
                if !secs.is_finite() || secs < 0.0 {
                    return Err(ConfigError::ValidationError {
                        message: format!("{key}: threshold must be a non-negative number"),
                    });
                }
                let ms = (secs * 1000.0).round() as u64;
                set_nested(&mut root, "app", "response_time_threshold_ms", json!(ms));
            }
            "CONTAINER_NAME" => set_nested(&mut root, "container", "name", json!(value)),
            "DB_HOST" => set_nested(&mut root, "database", "host", json!(value)),
            "DB_PORT" => {
                let port = parse_number::<u16>(&key, &value)?;
                set_nested(&mut root, "database", "port", json!(port));
            }
            "DB_USER" => set_nested(&mut root, "database", "user", json!(value)),
            "DB_PASSWORD" => set_nested(&mut root, "database", "password", json!(value)),
            "DB_NAME" => set_nested(&mut root, "database", "name", json!(value)),
            "DISK_THRESHOLD" => {
                let pct = parse_number::<u8>(&key, &value)?;
                set_nested(&mut root, "disk", "usage_threshold_percent", json!(pct));
            }
            "LOG_ERROR_THRESHOLD" => {
                let count = parse_number::<usize>(&key, &value)?;
                set_nested(&mut root, "logscan", "error_threshold", json!(count));
            }
            "ALERT_EMAIL" => set_nested(&mut root, "alerting", "email", json!(value)),
            "ALERT_WEBHOOK_URL" => set_nested(&mut root, "alerting", "webhook_url", json!(value)),
            _ => {}
        }
    }

    Ok(serde_json::Value::Object(root))
}

fn set_nested(
    root: &mut serde_json::Map<String, serde_json::Value>,
    section: &str,
    field: &str,
    value: serde_json::Value,
) {
    let entry = root
        .entry(section.to_owned())
        .or_insert_with(|| serde_json::Value::Object(serde_json::Map::new()));
    if let Some(map) = entry.as_object_mut() {
        map.insert(field.to_owned(), value);
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::ValidationError {
        message: format!("{key}: invalid numeric value {value:?}"),
    })
}
