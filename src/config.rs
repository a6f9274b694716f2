//! Runtime configuration
//!
//! Read from the environment (after `.env` is loaded by the binaries).

use crate::error::AdvisorError;
use crate::Result;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Constants for the simulated typing delay
#[derive(Debug, Clone)]
pub struct TypingConfig {
    pub enabled: bool,
    pub base: Duration,
    pub per_char: Duration,
    /// Cap on the length-dependent part
    pub variable_cap: Duration,
    /// Upper bound of the random jitter
    pub jitter: Duration,
    /// Delay before the opening greeting
    pub greeting_delay: Duration,
}

impl Default for TypingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            base: Duration::from_millis(1000),
            per_char: Duration::from_millis(20),
            variable_cap: Duration::from_millis(2000),
            jitter: Duration::from_millis(500),
            greeting_delay: Duration::from_millis(1000),
        }
    }
}

impl TypingConfig {
    /// No delays at all
    pub fn instant() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }
}

/// Bounds on the chat sessions the HTTP server keeps open
#[derive(Debug, Clone)]
pub struct SessionLimits {
    /// Sessions untouched for this long are evicted
    pub idle_timeout: Duration,
    pub max_sessions: usize,
}

impl Default for SessionLimits {
    fn default() -> Self {
        Self {
            idle_timeout: Duration::from_secs(30 * 60),
            max_sessions: 1000,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub port: u16,
    pub typing: TypingConfig,
    pub sessions: SessionLimits,
    /// File backing the persisted session flag, in-memory when unset
    pub session_file: Option<PathBuf>,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            typing: TypingConfig::default(),
            sessions: SessionLimits::default(),
            session_file: None,
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup, so tests don't touch the process env
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(port) = lookup("PORT").or_else(|| lookup("API_PORT")) {
            config.port = port.trim().parse().map_err(|_| {
                AdvisorError::ConfigError(format!("Invalid port: {}", port))
            })?;
        }

        if let Some(flag) = lookup("ADVISOR_SIMULATE_TYPING") {
            config.typing.enabled = parse_bool(&flag).ok_or_else(|| {
                AdvisorError::ConfigError(format!(
                    "ADVISOR_SIMULATE_TYPING must be true or false, got {}",
                    flag
                ))
            })?;
        }

        if let Some(raw) = lookup("ADVISOR_SESSION_IDLE_SECS") {
            let secs = parse_positive(&raw).ok_or_else(|| {
                AdvisorError::ConfigError(format!("Invalid session idle timeout: {}", raw))
            })?;
            config.sessions.idle_timeout = Duration::from_secs(secs);
        }

        if let Some(raw) = lookup("ADVISOR_MAX_SESSIONS") {
            let max = parse_positive(&raw).ok_or_else(|| {
                AdvisorError::ConfigError(format!("Invalid session limit: {}", raw))
            })?;
            config.sessions.max_sessions = usize::try_from(max).unwrap_or(usize::MAX);
        }

        config.session_file = lookup("ADVISOR_SESSION_FILE")
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        Ok(config)
    }
}

fn parse_positive(value: &str) -> Option<u64> {
    value.trim().parse::<u64>().ok().filter(|n| *n > 0)
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
