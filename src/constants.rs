//! Constants used throughout the NNTP server
//!
//! This module centralizes magic numbers and protocol limits
//! to improve maintainability and reduce duplication.

use std::time::Duration;

/// Protocol framing limits
///
/// All limits follow RFC 3977 unless overridden in the configuration:
/// - Command lines are small (512 octets of payload)
/// - Articles are bounded to prevent memory exhaustion from a single post
pub mod protocol {
    /// Maximum protocol line payload in octets, excluding CRLF (RFC 3977 §3.1)
    pub const MAX_LINE_LENGTH: usize = 512;

    /// Maximum accumulated article size during POST (1 MiB)
    pub const MAX_ARTICLE_SIZE: usize = 1024 * 1024;

    /// Line terminator sent on every response line
    pub const CRLF: &[u8] = b"\r\n";

    /// Terminator line closing every multi-line response payload
    pub const MULTILINE_TERMINATOR: &[u8] = b".\r\n";
}

/// Buffer sizing
pub mod buffer {
    /// Read buffer for the connection read loop (16KB)
    /// Large enough that a full command round trip needs one syscall
    pub const READ_CHUNK: usize = 16 * 1024;

    /// Initial capacity for the POST header accumulation buffer
    pub const HEADER_INITIAL: usize = 1024;

    /// Initial capacity for the POST body accumulation buffer
    pub const BODY_INITIAL: usize = 8192;
}

/// Timeout and sweep intervals
pub mod timeout {
    use super::Duration;

    /// Default per-connection idle timeout before the reaper evicts
    pub const IDLE: Duration = Duration::from_secs(600);

    /// Default interval between reaper sweeps
    pub const REAPER_INTERVAL: Duration = Duration::from_secs(30);
}

/// Session defaults
pub mod session {
    /// Text encoding assumed for protocol lines, restored after every
    /// completed command
    pub const DEFAULT_ENCODING: &str = "UTF-8";
}

/// Worker budget derivation
pub mod workers {
    /// Connections admitted per unit of available parallelism when the
    /// budget is not set explicitly in the configuration
    pub const CONNECTIONS_PER_CORE: usize = 64;

    /// Floor for the derived connection budget
    pub const MIN_CONNECTIONS: usize = 16;
}

/// Reserved group names
pub mod groups {
    /// Group that receives control articles after a cancel is applied
    pub const CONTROL: &str = "control";
}
