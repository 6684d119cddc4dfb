//! Client authentication handling
//!
//! Credential matching only; account provisioning and policy live outside
//! the core. With no users configured, authentication is disabled and the
//! AUTHINFO commands still answer per RFC 4643.

use crate::config::AuthConfig;
use crate::types::ValidationError;
use std::collections::HashMap;

/// Validates AUTHINFO credentials against the configured user list
pub struct AuthHandler {
    /// Map of username -> password for O(1) lookups
    users: HashMap<String, String>,
}

impl std::fmt::Debug for AuthHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthHandler")
            .field("enabled", &!self.users.is_empty())
            .field("user_count", &self.users.len())
            .finish_non_exhaustive()
    }
}

impl Default for AuthHandler {
    fn default() -> Self {
        Self {
            users: HashMap::new(),
        }
    }
}

impl AuthHandler {
    /// Build a handler from the configured user list
    ///
    /// # Errors
    /// Returns `Err` if any username or password is empty or whitespace.
    /// Empty credentials would silently authenticate everyone, so the
    /// server refuses to start instead.
    pub fn from_config(config: &AuthConfig) -> Result<Self, ValidationError> {
        let mut users = HashMap::new();
        for user in &config.users {
            if user.username.trim().is_empty() {
                return Err(ValidationError::EmptyUsername);
            }
            if user.password.trim().is_empty() {
                return Err(ValidationError::EmptyPassword);
            }
            users.insert(user.username.clone(), user.password.clone());
        }
        Ok(Self { users })
    }

    /// Whether authentication is enabled
    #[inline]
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        !self.users.is_empty()
    }

    /// Validate credentials
    #[must_use]
    pub fn validate(&self, username: &str, password: &str) -> bool {
        if self.users.is_empty() {
            return true; // Auth disabled, always accept
        }
        self.users
            .get(username)
            .is_some_and(|stored| stored == password)
    }
}
