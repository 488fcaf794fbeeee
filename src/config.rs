// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! # Runtime Configuration
//!
//! This module defines environment variable names and default values used
//! by the client. Configuration is loaded from the environment once, when the
//! client is assembled.
//!
//! ## Environment Variables
//!
//! | Variable | Description | Default |
//! |----------|-------------|---------|
//! | `NOTUS_API_URI` | Base URI of the Notus REST API | Required |
//! | `NOTUS_SESSION_DIR` | Directory holding the persisted session token | `$HOME/.notus` |
//! | `NOTUS_HTTP_TIMEOUT_SECS` | Per-request timeout for API calls | none |
//! | `LOG_FORMAT` | Logging format (`json` or `pretty`) | `pretty` |
//! | `RUST_LOG` | Log level filter | `info` |

use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Environment variable name for the Notus REST API base URI.
///
/// Every gateway endpoint and the GraphQL link are resolved against it,
/// e.g. `https://api.notus.events` gives `https://api.notus.events/sign-in`.
pub const API_URI_ENV: &str = "NOTUS_API_URI";

/// Environment variable name for the session directory.
///
/// The session store keeps `session.json` here. When the variable is unset
/// and `$HOME` is unknown, the session store runs without persistence.
pub const SESSION_DIR_ENV: &str = "NOTUS_SESSION_DIR";

/// Environment variable name for the optional HTTP request timeout (seconds).
pub const HTTP_TIMEOUT_ENV: &str = "NOTUS_HTTP_TIMEOUT_SECS";

/// Environment variable name for the log output format.
pub const LOG_FORMAT_ENV: &str = "LOG_FORMAT";

/// Default directory name under `$HOME` for the session store.
const DEFAULT_SESSION_DIR_NAME: &str = ".notus";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("configuration missing: {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Log output format selected by `LOG_FORMAT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl LogFormat {
    fn parse(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Pretty
        }
    }

    pub fn from_env() -> Self {
        env_optional(LOG_FORMAT_ENV)
            .map(|v| Self::parse(&v))
            .unwrap_or_default()
    }
}

/// Client configuration resolved from the environment.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_uri: Url,
    pub session_dir: Option<PathBuf>,
    pub http_timeout: Option<Duration>,
}

impl ClientConfig {
    /// Build a configuration for the given API base URI with no session
    /// persistence and no request timeout.
    pub fn new(api_uri: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            api_uri: parse_api_uri(api_uri)?,
            session_dir: None,
            http_timeout: None,
        })
    }

    pub fn with_session_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.session_dir = Some(dir.into());
        self
    }

    pub fn with_http_timeout(mut self, timeout: Duration) -> Self {
        self.http_timeout = Some(timeout);
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        let api_uri = env_optional(API_URI_ENV).ok_or(ConfigError::Missing(API_URI_ENV))?;
        let session_dir = env_optional(SESSION_DIR_ENV).map(PathBuf::from).or_else(|| {
            env_optional("HOME").map(|home| PathBuf::from(home).join(DEFAULT_SESSION_DIR_NAME))
        });
        let http_timeout = match env_optional(HTTP_TIMEOUT_ENV) {
            Some(raw) => Some(parse_timeout(&raw)?),
            None => None,
        };

        Ok(Self {
            api_uri: parse_api_uri(&api_uri)?,
            session_dir,
            http_timeout,
        })
    }
}

fn parse_api_uri(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| ConfigError::Invalid {
        name: API_URI_ENV,
        reason: e.to_string(),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Invalid {
            name: API_URI_ENV,
            reason: format!("unsupported scheme '{other}'"),
        }),
    }
}

fn parse_timeout(raw: &str) -> Result<Duration, ConfigError> {
    let secs: u64 = raw.parse().map_err(|_| ConfigError::Invalid {
        name: HTTP_TIMEOUT_ENV,
        reason: format!("expected whole seconds, got '{raw}'"),
    })?;
    if secs == 0 {
        return Err(ConfigError::Invalid {
            name: HTTP_TIMEOUT_ENV,
            reason: "timeout must be greater than zero".to_string(),
        });
    }
    Ok(Duration::from_secs(secs))
}

fn env_optional(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
