//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::duration_serde;

/// Main server configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    /// Listener and identity settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Protocol and resource limits
    #[serde(default)]
    pub limits: LimitsConfig,
    /// Idle eviction settings
    #[serde(default)]
    pub timeouts: TimeoutConfig,
    /// Client authentication settings
    #[serde(default)]
    pub auth: AuthConfig,
}

/// Listener and identity settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Host/IP to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Hostname advertised in the greeting and matched against Path
    /// headers for relay loop prevention
    pub hostname: String,
    /// Number of worker threads (0 = number of CPU cores)
    pub threads: usize,
}

impl ServerConfig {
    /// Default listen host (all interfaces)
    pub const DEFAULT_HOST: &'static str = "0.0.0.0";
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::DEFAULT_HOST.to_string(),
            port: super::defaults::port(),
            hostname: super::defaults::hostname(),
            threads: 0,
        }
    }
}

/// Protocol and resource limits
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum protocol line payload in octets, excluding CRLF
    pub max_line_length: usize,
    /// Maximum accumulated article size during POST, in bytes
    pub max_article_size: usize,
    /// Maximum concurrent connections (0 = derive from parallelism)
    pub max_connections: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_line_length: crate::constants::protocol::MAX_LINE_LENGTH,
            max_article_size: crate::constants::protocol::MAX_ARTICLE_SIZE,
            max_connections: 0,
        }
    }
}

impl LimitsConfig {
    /// Effective connection budget, deriving from available parallelism
    /// when not set explicitly
    #[must_use]
    pub fn effective_max_connections(&self) -> usize {
        use crate::constants::workers;

        if self.max_connections > 0 {
            return self.max_connections;
        }
        let cores = std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(1);
        (cores * workers::CONNECTIONS_PER_CORE).max(workers::MIN_CONNECTIONS)
    }
}

/// Idle eviction settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Per-connection idle timeout before the reaper evicts, in seconds
    #[serde(with = "duration_serde")]
    pub idle: Duration,
    /// Interval between reaper sweeps, in seconds
    #[serde(with = "duration_serde")]
    pub reaper_interval: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            idle: crate::constants::timeout::IDLE,
            reaper_interval: crate::constants::timeout::REAPER_INTERVAL,
        }
    }
}

/// Client authentication settings
///
/// Empty user list means authentication is disabled; policy internals
/// beyond username/password matching live outside the core.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AuthConfig {
    /// List of authorized users
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub users: Vec<UserCredentials>,
}

/// Individual user credentials
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserCredentials {
    pub username: String,
    pub password: String,
}
