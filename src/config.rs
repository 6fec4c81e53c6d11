//! Configuration management for the blackout service.
//!
//! Built once at startup and handed to the router and the redaction
//! service; nothing here is mutated afterwards.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::domain::BlackoutRatio;

/// Access password used when `PHI_APP_PASSWORD` is unset. Never rely on
/// this in a real deployment.
pub const FALLBACK_ACCESS_PASSWORD: &str = "Savvy?";

/// 200 MiB, enough for a 400-page textbook scan.
pub const DEFAULT_MAX_UPLOAD_BYTES: u64 = 200 * 1024 * 1024;

/// Stays under the ~30 s request kill of common hosting platforms.
pub const DEFAULT_TIME_BUDGET: Duration = Duration::from_secs(25);

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value '{value}' for {key}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub access: AccessConfig,
    pub storage: StorageConfig,
    pub limits: LimitsConfig,
    pub redaction: RedactionConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct AccessConfig {
    pub password: String,
    /// True when `password` is [`FALLBACK_ACCESS_PASSWORD`]
    pub is_fallback: bool,
}

#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory for per-request input and output artifacts
    pub scratch_dir: PathBuf,
}

#[derive(Debug, Clone)]
pub struct LimitsConfig {
    pub max_upload_bytes: u64,
}

#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub ratio: BlackoutRatio,
    /// `None` disables the budget and selects unbounded mode
    pub time_budget: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server: ServerConfig {
                host: "0.0.0.0".to_string(),
                port: 8000,
            },
            access: AccessConfig {
                password: FALLBACK_ACCESS_PASSWORD.to_string(),
                is_fallback: true,
            },
            storage: StorageConfig {
                scratch_dir: env::temp_dir(),
            },
            limits: LimitsConfig {
                max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            },
            redaction: RedactionConfig::default(),
        }
    }
}

impl Default for RedactionConfig {
    fn default() -> Self {
        RedactionConfig {
            ratio: BlackoutRatio::DEFAULT,
            time_budget: Some(DEFAULT_TIME_BUDGET),
        }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    ///
    /// | variable | default |
    /// |---|---|
    /// | `HOST` | `0.0.0.0` |
    /// | `PORT` | `8000` |
    /// | `PHI_APP_PASSWORD` | [`FALLBACK_ACCESS_PASSWORD`] |
    /// | `BLACKOUT_TMP_DIR` | OS temp dir |
    /// | `BLACKOUT_MAX_UPLOAD_BYTES` | 200 MiB |
    /// | `BLACKOUT_RATIO` | `0.40` |
    /// | `BLACKOUT_TIME_BUDGET_SECS` | `25` (`0` or `none` disables) |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) against an arbitrary lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Config::default();
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("PORT") {
            Some(raw) => raw.trim().parse::<u16>().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: raw.clone(),
                reason: "expected a port number".to_string(),
            })?,
            None => defaults.server.port,
        };

        let access = match get("PHI_APP_PASSWORD") {
            Some(password) => AccessConfig {
                password,
                is_fallback: false,
            },
            None => defaults.access,
        };

        let max_upload_bytes = match get("BLACKOUT_MAX_UPLOAD_BYTES") {
            Some(raw) => match raw.trim().parse::<u64>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "BLACKOUT_MAX_UPLOAD_BYTES",
                        value: raw,
                        reason: "expected a positive byte count".to_string(),
                    })
                }
            },
            None => defaults.limits.max_upload_bytes,
        };

        let ratio = match get("BLACKOUT_RATIO") {
            Some(raw) => raw.parse::<BlackoutRatio>().map_err(|e| ConfigError::Invalid {
                key: "BLACKOUT_RATIO",
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => defaults.redaction.ratio,
        };

        let time_budget = match get("BLACKOUT_TIME_BUDGET_SECS") {
            Some(raw) => parse_time_budget(&raw).ok_or_else(|| ConfigError::Invalid {
                key: "BLACKOUT_TIME_BUDGET_SECS",
                value: raw.clone(),
                reason: "expected seconds, 0 or 'none'".to_string(),
            })?,
            None => defaults.redaction.time_budget,
        };

        Ok(Config {
            server: ServerConfig {
                host: get("HOST").unwrap_or(defaults.server.host),
                port,
            },
            access,
            storage: StorageConfig {
                scratch_dir: get("BLACKOUT_TMP_DIR")
                    .map(PathBuf::from)
                    .unwrap_or(defaults.storage.scratch_dir),
            },
            limits: LimitsConfig { max_upload_bytes },
            redaction: RedactionConfig { ratio, time_budget },
        })
    }
}

/// `Some(None)` disables the budget; `None` means the value is malformed.
fn parse_time_budget(raw: &str) -> Option<Option<Duration>> {
    let raw = raw.trim();
    if raw.eq_ignore_ascii_case("none") {
        return Some(None);
    }
    let secs: f64 = raw.parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    if secs == 0.0 {
        Some(None)
    } else {
        Duration::try_from_secs_f64(secs).ok().map(Some)
    }
}
