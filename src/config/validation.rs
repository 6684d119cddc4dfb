//! Configuration validation

use super::Config;
use anyhow::{bail, Result};
use tracing::warn;

/// Validate a loaded configuration before the server starts
///
/// Hard errors abort startup; questionable but workable values only warn.
pub fn validate(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        bail!("server.port must not be 0");
    }
    if config.server.hostname.trim().is_empty() {
        bail!("server.hostname must not be empty");
    }
    // The hostname lands inside generated message-ids and Path tokens
    if !config
        .server
        .hostname
        .bytes()
        .all(|b| b.is_ascii_graphic() && b != b'>' && b != b'<' && b != b'!')
    {
        bail!("server.hostname must be printable ASCII without '<', '>', or '!'");
    }
    if config.limits.max_line_length == 0 {
        bail!("limits.max_line_length must be greater than 0");
    }
    if config.limits.max_article_size < config.limits.max_line_length {
        bail!("limits.max_article_size must be at least one line long");
    }
    if config.timeouts.idle.is_zero() {
        bail!("timeouts.idle must be greater than 0");
    }
    if config.timeouts.reaper_interval.is_zero() {
        bail!("timeouts.reaper_interval must be greater than 0");
    }

    for user in &config.auth.users {
        // Empty credentials would silently authenticate everyone
        if user.username.trim().is_empty() || user.password.trim().is_empty() {
            bail!("auth.users entries must have non-empty username and password");
        }
    }

    if config.timeouts.reaper_interval > config.timeouts.idle {
        warn!(
            "reaper interval ({:?}) exceeds idle timeout ({:?}); eviction will lag",
            config.timeouts.reaper_interval, config.timeouts.idle
        );
    }

    Ok(())
}
