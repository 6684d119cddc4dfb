//! Server configuration: types, defaults, validation, and file loading

mod defaults;
mod loading;
mod types;
mod validation;

pub use loading::{load_config, load_or_create};
pub use types::{AuthConfig, Config, LimitsConfig, ServerConfig, TimeoutConfig, UserCredentials};
pub use validation::validate;

use serde::{Deserialize, Deserializer, Serializer};
use std::time::Duration;

/// Serde helper for durations expressed as whole seconds in TOML
pub mod duration_serde {
    use super::*;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
