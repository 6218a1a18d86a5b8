//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into core
//! services. The intent is to avoid reading process-wide environment variables
//! during request handling, which can lead to inconsistent behaviour in
//! multi-threaded runtimes and test harnesses.

use crate::{DirectoryError, DirectoryResult};

/// Placeholder credential assigned to accounts created through the façade
/// when no override is configured. Account provisioning and first-login
/// resets are handled by the external identity store.
pub const DEFAULT_CREDENTIAL: &str = "changeme";

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    default_credential: String,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::InvalidInput` if `default_credential` is
    /// empty or whitespace-only.
    pub fn new(default_credential: String) -> DirectoryResult<Self> {
        if default_credential.trim().is_empty() {
            return Err(DirectoryError::InvalidInput(
                "default_credential cannot be empty".into(),
            ));
        }

        Ok(Self { default_credential })
    }

    /// The credential assigned to newly created accounts.
    pub fn default_credential(&self) -> &str {
        &self.default_credential
    }
}

/// Parse the default credential from an optional environment value.
///
/// If `value` is `None` or empty/whitespace, returns [`DEFAULT_CREDENTIAL`].
pub fn default_credential_from_env_value(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_CREDENTIAL.to_string())
}
