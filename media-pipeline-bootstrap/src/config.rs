// /////////////////////////////////////////////////////////////////////////////
// Media-to-Subtitles Pipeline Orchestrator
// SPDX-License-Identifier: BSD-3-Clause
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Configuration
//!
//! The handful of settings read before a job even starts: the tracing log
//! level and an optional config-file override (§6.6 environment
//! variables `LOG_LEVEL`, `CONFIG_FILE`).

use std::path::PathBuf;
use std::str::FromStr;

/// Tracing verbosity, mirroring the `tracing::Level` ladder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl Default for LogLevel {
    fn default() -> Self {
        Self::Info
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown LOG_LEVEL '{other}'")),
        }
    }
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => tracing::Level::TRACE,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Error => tracing::Level::ERROR,
        }
    }
}

/// Bootstrap-phase settings, read once at process start.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub log_level: LogLevel,
    pub config_file: Option<PathBuf>,
}

impl AppConfig {
    /// Reads `LOG_LEVEL` and `CONFIG_FILE` from the process environment,
    /// falling back to [`LogLevel::Info`] and no override file.
    pub fn from_env() -> Self {
        let log_level = std::env::var("LOG_LEVEL")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();
        let config_file = std::env::var_os("CONFIG_FILE").map(PathBuf::from);

        Self {
            log_level,
            config_file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_log_level_is_rejected() {
        assert!("verbose".parse::<LogLevel>().is_err());
    }

    #[test]
    fn log_level_parsing_is_case_insensitive() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
    }

    #[test]
    fn default_log_level_is_info() {
        assert_eq!(LogLevel::default(), LogLevel::Info);
    }
}
