//! Configuration loading for petvet.
//!
//! Reads `~/.petvet/config.toml` when present. Every key is optional:
//!
//! ```toml
//! [service]
//! base_url = "https://${PETS_HOST}/api"
//! timeout_seconds = 30
//! connect_timeout_seconds = 10
//! user_agent = "petvet/0.1"
//!
//! [aggregate]
//! max_in_flight = 16        # omit or 0 for uncapped
//! order = "primary"         # or "completion"
//!
//! [log]
//! level = "info"
//! file = "/tmp/petvet.log"
//! ```
//!
//! `PETVET_BASE_URL` and `PETVET_MAX_IN_FLIGHT` override the file.

use std::path::{Path, PathBuf};
use std::time::Duration;

use petvet_engine::{AggregateOptions, ResultOrder};
use petvet_providers::endpoints::parse_base_url;
use petvet_providers::{DEFAULT_BASE_URL, ServiceSettings};
use serde::Deserialize;
use thiserror::Error;

pub const BASE_URL_ENV: &str = "PETVET_BASE_URL";
pub const MAX_IN_FLIGHT_ENV: &str = "PETVET_MAX_IN_FLIGHT";

const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Debug, Default, Deserialize)]
pub struct PetVetConfig {
    pub service: Option<ServiceConfig>,
    pub aggregate: Option<AggregateConfig>,
    pub log: Option<LogConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServiceConfig {
    /// Supports `${VAR}` expansion.
    pub base_url: Option<String>,
    /// Whole-request timeout. Default: 30.
    pub timeout_seconds: Option<u32>,
    /// Default: 10.
    pub connect_timeout_seconds: Option<u32>,
    pub user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AggregateConfig {
    pub max_in_flight: Option<usize>,
    pub order: Option<ResultOrder>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LogConfig {
    /// `EnvFilter` directive. Default: "info".
    pub level: Option<String>,
    /// Append logs here instead of stderr.
    pub file: Option<PathBuf>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl PetVetConfig {
    /// Load from the default path. `Ok(None)` when there is no config file.
    pub fn load() -> Result<Option<Self>, ConfigError> {
        let Some(path) = config_path() else {
            return Ok(None);
        };
        if !path.exists() {
            return Ok(None);
        }
        Self::load_from(&path).map(Some)
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| {
            tracing::warn!("Failed to read config at {:?}: {}", path, source);
            ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }
        })?;

        toml::from_str(&content).map_err(|source| {
            tracing::warn!("Failed to parse config at {:?}: {}", path, source);
            ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            }
        })
    }

    /// Resolve HTTP settings, applying `PETVET_BASE_URL`.
    pub fn service_settings(&self) -> Result<ServiceSettings, ConfigError> {
        self.service_settings_with(|key| std::env::var(key).ok())
    }

    fn service_settings_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<ServiceSettings, ConfigError> {
        let service = self.service.as_ref();

        let raw_base = env(BASE_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .or_else(|| {
                service
                    .and_then(|s| s.base_url.as_deref())
                    .map(|v| expand_env_vars(v, &env))
            })
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base_url = parse_base_url(&raw_base).map_err(|e| ConfigError::Invalid {
            field: "service.base_url",
            message: e.to_string(),
        })?;

        let mut settings = ServiceSettings::new(base_url);
        if let Some(secs) = service.and_then(|s| s.timeout_seconds) {
            settings = settings.with_timeout(positive_secs("service.timeout_seconds", secs)?);
        }
        if let Some(secs) = service.and_then(|s| s.connect_timeout_seconds) {
            settings = settings
                .with_connect_timeout(positive_secs("service.connect_timeout_seconds", secs)?);
        }
        if let Some(agent) = service
            .and_then(|s| s.user_agent.as_deref())
            .filter(|a| !a.trim().is_empty())
        {
            settings = settings.with_user_agent(agent.trim());
        }
        Ok(settings)
    }

    /// Resolve engine options, applying `PETVET_MAX_IN_FLIGHT`.
    pub fn aggregate_options(&self) -> Result<AggregateOptions, ConfigError> {
        self.aggregate_options_with(|key| std::env::var(key).ok())
    }

    fn aggregate_options_with(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<AggregateOptions, ConfigError> {
        let aggregate = self.aggregate.as_ref();

        let max_in_flight = match env(MAX_IN_FLIGHT_ENV).filter(|v| !v.trim().is_empty()) {
            Some(raw) => Some(raw.trim().parse::<usize>().map_err(|e| {
                ConfigError::Invalid {
                    field: MAX_IN_FLIGHT_ENV,
                    message: format!("{raw:?}: {e}"),
                }
            })?),
            None => aggregate.and_then(|a| a.max_in_flight),
        };

        let order = aggregate.and_then(|a| a.order).unwrap_or_default();

        Ok(AggregateOptions::default()
            .with_max_in_flight(max_in_flight.unwrap_or(0))
            .with_order(order))
    }

    #[must_use]
    pub fn log_level(&self) -> &str {
        self.log
            .as_ref()
            .and_then(|l| l.level.as_deref())
            .filter(|l| !l.trim().is_empty())
            .unwrap_or(DEFAULT_LOG_LEVEL)
    }

    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log.as_ref().and_then(|l| l.file.as_deref())
    }
}

fn positive_secs(field: &'static str, secs: u32) -> Result<Duration, ConfigError> {
    if secs == 0 {
        return Err(ConfigError::Invalid {
            field,
            message: "must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(u64::from(secs)))
}

/// Replace `${VAR}` with the variable's value; unset variables become empty.
fn expand_env_vars(value: &str, env: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

fn config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".petvet").join("config.toml"))
}
