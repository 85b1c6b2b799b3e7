//! Configuration loading
//!
//! Two sources, resolved in this priority order:
//! 1. Environment variables (store credentials are environment-only)
//! 2. TOML config file (`BCI_CONFIG`, else `<config dir>/bci/config.toml`)
//! 3. Built-in defaults
//!
//! A missing TOML file is not an error: defaults are used and a warning is
//! logged. Missing store credentials are fatal.

use crate::time::EpochMode;
use crate::{Error, Result};
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Object key namespace under which the build cache lives
pub const KEY_PREFIX: &str = "build_cache/";

/// Upper bound on concurrent lookups regardless of core count
pub const MAX_WORKERS: usize = 128;

/// Default per-lookup timeout
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 30;

/// Default frequency threshold for index partitions
pub const DEFAULT_THRESHOLD: usize = 1000;

pub const ENV_ACCESS_KEY: &str = "AWS_ACCESS_KEY_ID";
pub const ENV_SECRET_KEY: &str = "AWS_SECRET_ACCESS_KEY";
pub const ENV_ENDPOINT: &str = "S3_ENDPOINT_URL";
pub const ENV_BUCKET: &str = "S3_BUCKET_ID";
pub const ENV_REGION: &str = "S3_REGION";
pub const ENV_CONFIG_PATH: &str = "BCI_CONFIG";
pub const ENV_WORKERS: &str = "BCI_WORKERS";
pub const ENV_LOOKUP_TIMEOUT: &str = "BCI_LOOKUP_TIMEOUT_SECS";
pub const ENV_EPOCH_MODE: &str = "BCI_EPOCH_MODE";
pub const ENV_LOG_LEVEL: &str = "BCI_LOG_LEVEL";

const DEFAULT_REGION: &str = "us-east-1";

/// Remote store connection settings
#[derive(Clone)]
pub struct StoreConfig {
    pub access_key: String,
    pub secret_key: String,
    /// Host (and optional port) with any URL scheme removed
    pub host: String,
    pub bucket: String,
    pub region: String,
    pub key_prefix: String,
}

impl StoreConfig {
    /// Load store settings from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load store settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &str| -> Result<String> {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| Error::Config(format!("required environment variable {} is not set", name)))
        };

        let endpoint = required(ENV_ENDPOINT)?;

        Ok(Self {
            access_key: required(ENV_ACCESS_KEY)?,
            secret_key: required(ENV_SECRET_KEY)?,
            host: strip_scheme(&endpoint).to_string(),
            bucket: required(ENV_BUCKET)?,
            region: lookup(ENV_REGION)
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            key_prefix: KEY_PREFIX.to_string(),
        })
    }

    /// Endpoint URL used for connections (always TLS)
    pub fn endpoint_url(&self) -> String {
        format!("https://{}", self.host)
    }

    /// Full object key for a spec file
    pub fn object_key(&self, specfile_path: &str) -> String {
        format!("{}{}", self.key_prefix, specfile_path)
    }
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("access_key", &"<redacted>")
            .field("secret_key", &"<redacted>")
            .field("host", &self.host)
            .field("bucket", &self.bucket)
            .field("region", &self.region)
            .field("key_prefix", &self.key_prefix)
            .finish()
    }
}

/// Remove a leading `scheme://` from an endpoint URL
pub fn strip_scheme(endpoint: &str) -> &str {
    match endpoint.split_once("://") {
        Some((_, rest)) => rest,
        None => endpoint,
    }
}

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub enrich: EnrichSettings,

    #[serde(default)]
    pub index: IndexSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log file path (optional, logs to stdout if not specified)
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Enrichment stage settings
#[derive(Debug, Clone, Deserialize)]
pub struct EnrichSettings {
    /// Worker count; unset means one per core (capped)
    #[serde(default)]
    pub workers: Option<usize>,

    /// Per-lookup timeout in seconds, 0 disables
    #[serde(default = "default_lookup_timeout_secs")]
    pub lookup_timeout_secs: u64,

    #[serde(default)]
    pub epoch_mode: EpochMode,
}

impl Default for EnrichSettings {
    fn default() -> Self {
        Self {
            workers: None,
            lookup_timeout_secs: default_lookup_timeout_secs(),
            epoch_mode: EpochMode::default(),
        }
    }
}

impl EnrichSettings {
    pub fn lookup_timeout(&self) -> Option<Duration> {
        match self.lookup_timeout_secs {
            0 => None,
            secs => Some(Duration::from_secs(secs)),
        }
    }
}

fn default_lookup_timeout_secs() -> u64 {
    DEFAULT_LOOKUP_TIMEOUT_SECS
}

/// Index stage settings
#[derive(Debug, Clone, Deserialize)]
pub struct IndexSettings {
    #[serde(default = "default_threshold")]
    pub threshold: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            threshold: default_threshold(),
        }
    }
}

fn default_threshold() -> usize {
    DEFAULT_THRESHOLD
}

impl TomlConfig {
    /// Load configuration from the default location, then apply environment
    /// overrides.
    pub fn load() -> Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .ok()
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) => Self::load_from(&path)?,
            None => {
                warn!("Could not determine config directory, using defaults");
                Self::default()
            }
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific file
    ///
    /// Missing file → defaults with a warning. Unreadable or malformed file → error.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            warn!("Config file not found: {} (using defaults)", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Read {} failed: {}", path.display(), e)))?;
        let config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Parse {} failed: {}", path.display(), e)))?;
        info!("Loaded config file: {}", path.display());
        Ok(config)
    }

    /// Apply environment overrides through an arbitrary variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(value) = get(ENV_WORKERS) {
            let workers = value
                .trim()
                .parse::<usize>()
                .map_err(|e| Error::Config(format!("{}: invalid worker count '{}': {}", ENV_WORKERS, value, e)))?;
            self.enrich.workers = Some(workers);
        }

        if let Some(value) = get(ENV_LOOKUP_TIMEOUT) {
            self.enrich.lookup_timeout_secs = value
                .trim()
                .parse::<u64>()
                .map_err(|e| Error::Config(format!("{}: invalid timeout '{}': {}", ENV_LOOKUP_TIMEOUT, value, e)))?;
        }

        if let Some(value) = get(ENV_EPOCH_MODE) {
            self.enrich.epoch_mode = value
                .parse()
                .map_err(|e| Error::Config(format!("{}: {}", ENV_EPOCH_MODE, e)))?;
        }

        if let Some(value) = get(ENV_LOG_LEVEL) {
            self.logging.level = value.trim().to_string();
        }

        Ok(())
    }
}

/// `<config dir>/bci/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bci").join("config.toml"))
}

/// Number of lookup workers to run
///
/// Unset → available parallelism; always clamped into `1..=MAX_WORKERS`.
pub fn resolve_worker_count(requested: Option<usize>) -> usize {
    requested.unwrap_or_else(num_cpus::get).clamp(1, MAX_WORKERS)
}
