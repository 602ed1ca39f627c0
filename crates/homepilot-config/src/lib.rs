//! Configuration for the HomePilot shutter bridge.
//!
//! A TOML file plus `HOMEPILOT_*` environment overrides, validated and
//! translated to `homepilot_core::BridgeConfig`. The only required setting
//! is the gateway URL.

use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use homepilot_core::{BridgeConfig, TlsVerification};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no gateway url configured (set `url` in {path} or HOMEPILOT_URL)")]
    MissingUrl { path: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config struct ──────────────────────────────────────────────

/// Bridge settings as written in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Gateway endpoint (e.g., "http://192.168.1.10/deviceajax.do").
    pub url: Option<String>,

    /// Skip TLS certificate validation. On by default: the gateway is an
    /// unauthenticated LAN appliance.
    #[serde(default = "default_insecure")]
    pub insecure: bool,

    /// Path to a custom CA certificate. Takes precedence over `insecure`.
    pub ca_cert: Option<PathBuf>,

    /// Timeout of each device-list poll, in milliseconds.
    #[serde(default = "default_poll_timeout_ms")]
    pub poll_timeout_ms: u64,

    /// Client-wide timeout, in seconds. Also bounds move commands.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            url: None,
            insecure: default_insecure(),
            ca_cert: None,
            poll_timeout_ms: default_poll_timeout_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_insecure() -> bool {
    true
}
fn default_poll_timeout_ms() -> u64 {
    1500
}
fn default_timeout_secs() -> u64 {
    30
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "homepilot", "homepilot-bridge").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("homepilot-bridge");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the Config from the canonical path + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load the Config from `path` + environment. A missing file is not an
/// error; defaults and environment still apply.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    debug!(path = %path.display(), "loading config");

    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("HOMEPILOT_"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load, validate and translate in one step.
pub fn load_bridge_config() -> Result<BridgeConfig, ConfigError> {
    let path = config_path();
    let config = load_config_from(&path)?;
    to_bridge_config(&config, &path)
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write it to `path`.
pub fn save_config(cfg: &Config, path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Translation ─────────────────────────────────────────────────────

/// Validate `config` and build the runtime `BridgeConfig`.
///
/// `source` only names the file in error messages.
pub fn to_bridge_config(config: &Config, source: &Path) -> Result<BridgeConfig, ConfigError> {
    let raw = config
        .url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or_else(|| ConfigError::MissingUrl {
            path: source.display().to_string(),
        })?;

    let url: url::Url = raw.parse().map_err(|_| ConfigError::Validation {
        field: "url".into(),
        reason: format!("invalid URL: {raw}"),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::Validation {
            field: "url".into(),
            reason: format!("expected http or https, got '{}'", url.scheme()),
        });
    }

    if config.poll_timeout_ms == 0 {
        return Err(ConfigError::Validation {
            field: "poll_timeout_ms".into(),
            reason: "must be greater than 0".into(),
        });
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation {
            field: "timeout_secs".into(),
            reason: "must be greater than 0".into(),
        });
    }

    let tls = if let Some(ref ca_path) = config.ca_cert {
        TlsVerification::CustomCa(ca_path.clone())
    } else if config.insecure {
        TlsVerification::DangerAcceptInvalid
    } else {
        TlsVerification::SystemDefaults
    };

    Ok(BridgeConfig {
        url,
        tls,
        poll_timeout: Duration::from_millis(config.poll_timeout_ms),
        timeout: Duration::from_secs(config.timeout_secs),
    })
}
