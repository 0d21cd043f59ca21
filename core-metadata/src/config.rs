//! Layered service configuration
//!
//! Sources, later ones winning:
//!
//! - built-in defaults
//! - `/etc/core-metadata/{service}/config.toml`
//! - `$XDG_CONFIG_HOME/core-metadata/{service}/config.toml`
//! - `./config.toml`
//! - `METADATA_*` environment variables, nested keys joined with `__`
//!   (`METADATA_QUERY__MAX_RESULT_COUNT=500`)

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::handlers::QuerySettings;

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "METADATA_";

/// Separator between nested keys in environment variable names
pub const ENV_SEPARATOR: &str = "__";

const APP_DIR: &str = "core-metadata";
const CONFIG_FILE: &str = "config.toml";

/// Complete configuration of a metadata service process
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,

    #[serde(default)]
    pub middleware: MiddlewareConfig,

    /// Defaults and bounds applied to list queries
    #[serde(default)]
    pub query: QuerySettings,
}

/// Identity and listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub name: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// `EnvFilter` directive, e.g. `info,core_metadata=debug`
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Requests running longer than this are answered with 408
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Free-form deployment label (dev, staging, production)
    #[serde(default = "default_environment")]
    pub environment: String,
}

/// HTTP middleware settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MiddlewareConfig {
    /// Largest accepted request body, in MB
    #[serde(default = "default_body_limit_mb")]
    pub body_limit_mb: usize,

    #[serde(default)]
    pub cors_mode: CorsMode,
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            body_limit_mb: default_body_limit_mb(),
            cors_mode: CorsMode::default(),
        }
    }
}

impl MiddlewareConfig {
    /// Body limit in bytes
    pub fn body_limit_bytes(&self) -> usize {
        self.body_limit_mb.saturating_mul(1024 * 1024)
    }
}

/// Cross-origin policy of the HTTP listener
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorsMode {
    /// Any origin, method and header
    #[default]
    Permissive,
    /// No cross-origin requests allowed
    Restrictive,
    /// Cross-origin support switched off; same effect as `Restrictive`
    Disabled,
}

impl fmt::Display for CorsMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CorsMode::Permissive => "permissive",
            CorsMode::Restrictive => "restrictive",
            CorsMode::Disabled => "disabled",
        })
    }
}

fn default_port() -> u16 {
    59881
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_environment() -> String {
    "dev".to_string()
}

fn default_body_limit_mb() -> usize {
    10
}

impl Config {
    /// Load configuration for the running binary
    ///
    /// The binary's file stem names the service directory searched for
    /// config files.
    pub fn load() -> Result<Self> {
        let service_name = std::env::current_exe()
            .ok()
            .and_then(|exe| exe.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .unwrap_or_else(|| APP_DIR.to_string());

        Self::load_for_service(&service_name)
    }

    /// Load configuration searching the directories of `service_name`
    pub fn load_for_service(service_name: &str) -> Result<Self> {
        let files: Vec<PathBuf> = search_paths(service_name)
            .into_iter()
            .filter(|path| path.exists())
            .collect();

        for path in &files {
            tracing::info!(path = %path.display(), "loading configuration file");
        }

        Self::extract(layered(&files))
    }

    /// Load configuration from one explicit file plus the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        Self::extract(layered(&[path.as_ref().to_path_buf()]))
    }

    fn extract(figment: Figment) -> Result<Self> {
        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings no request could ever satisfy
    pub fn validate(&self) -> Result<()> {
        self.query
            .validate()
            .map_err(|reason| Error::InvalidConfig(format!("query: {reason}")))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                name: APP_DIR.to_string(),
                port: default_port(),
                log_level: default_log_level(),
                timeout_secs: default_timeout(),
                environment: default_environment(),
            },
            middleware: MiddlewareConfig::default(),
            query: QuerySettings::default(),
        }
    }
}

/// Defaults, then `files` in order, then the environment
fn layered(files: &[PathBuf]) -> Figment {
    let figment = files.iter().fold(
        Figment::from(Serialized::defaults(Config::default())),
        |figment, path| figment.merge(Toml::file(path)),
    );
    figment.merge(Env::prefixed(ENV_PREFIX).split(ENV_SEPARATOR))
}

/// Candidate config files, lowest priority first
fn search_paths(service_name: &str) -> Vec<PathBuf> {
    let relative = Path::new(service_name).join(CONFIG_FILE);
    let mut paths = vec![Path::new("/etc").join(APP_DIR).join(&relative)];

    if let Ok(path) = xdg::BaseDirectories::with_prefix(APP_DIR).place_config_file(&relative) {
        paths.push(path);
    }

    paths.push(PathBuf::from(CONFIG_FILE));
    paths
}
