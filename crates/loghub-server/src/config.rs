// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Environment-driven server configuration.

use std::env;
use std::path::PathBuf;

use crate::error::ServerError;

/// Listen port for the HTTP server.
pub const ENV_PORT: &str = "LOGHUB_PORT";
/// Directory the per-service log files are written under.
pub const ENV_LOG_ROOT: &str = "LOGHUB_LOG_ROOT";
/// Diagnostic log level for the server's own tracing output.
pub const ENV_LOG_LEVEL: &str = "LOGHUB_LOG_LEVEL";

const DEFAULT_PORT: u16 = 8080;
const DEFAULT_LOG_ROOT: &str = "logs";
const DEFAULT_LOG_LEVEL: &str = "info";

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Server configuration, resolved once at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    pub log_root: PathBuf,
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            log_root: PathBuf::from(DEFAULT_LOG_ROOT),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

impl ServerConfig {
    /// Reads configuration from the environment, falling back to defaults
    /// for unset variables. A variable that is set but unusable is an
    /// error rather than a silent fallback.
    pub fn from_env() -> Result<Self, ServerError> {
        Self::from_vars(
            env::var(ENV_PORT).ok().as_deref(),
            env::var(ENV_LOG_ROOT).ok().as_deref(),
            env::var(ENV_LOG_LEVEL).ok().as_deref(),
        )
    }

    fn from_vars(
        port: Option<&str>,
        log_root: Option<&str>,
        log_level: Option<&str>,
    ) -> Result<Self, ServerError> {
        let port = match port {
            Some(raw) => raw.parse::<u16>().map_err(|_| {
                ServerError::Config(format!("{ENV_PORT} must be a port number, got '{raw}'"))
            })?,
            None => DEFAULT_PORT,
        };
        if port == 0 {
            return Err(ServerError::Config(format!("{ENV_PORT} must not be 0")));
        }

        let log_root = match log_root {
            Some("") => {
                return Err(ServerError::Config(format!(
                    "{ENV_LOG_ROOT} must not be empty"
                )));
            }
            Some(raw) => PathBuf::from(raw),
            None => PathBuf::from(DEFAULT_LOG_ROOT),
        };

        let log_level = log_level
            .map(str::to_lowercase)
            .unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string());
        if !VALID_LOG_LEVELS.contains(&log_level.as_str()) {
            return Err(ServerError::Config(format!(
                "{ENV_LOG_LEVEL} must be one of {VALID_LOG_LEVELS:?}, got '{log_level}'"
            )));
        }

        Ok(ServerConfig {
            port,
            log_root,
            log_level,
        })
    }
}
