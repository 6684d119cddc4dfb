//! Default values for configuration fields

/// Default NNTP listen port (unprivileged, like the proxy convention)
pub fn port() -> u16 {
    1119
}

/// Default hostname used in the greeting and Path loop check
pub fn hostname() -> String {
    "news.localdomain".to_string()
}
