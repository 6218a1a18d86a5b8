//! # Carelink Core
//!
//! Core business logic for the Carelink patient advocate system.
//!
//! This crate contains pure data operations and association bookkeeping:
//! - Account directory for patients and patient advocates
//! - The patient ↔ advocate relationship ledger and its permission records
//! - Façade services that resolve usernames and drive the ledger
//!
//! **No API concerns**: Authentication, HTTP servers, or service interfaces
//! belong in `api-rest` or `api-shared`.

pub mod account;
pub mod advocate;
pub mod config;
pub mod directory;
pub mod error;
pub mod patient;
pub mod permission;
pub mod services;

pub use account::{Account, AccountForm, Role};
pub use advocate::{AdvocateForm, AdvocateProfile, PatientAdvocate};
pub use config::CoreConfig;
pub use directory::{AccountDirectory, DirectoryEntry, SharedDirectory};
pub use error::{DirectoryError, DirectoryResult};
pub use patient::{Patient, PatientForm, PatientProfile};
pub use permission::{Permission, VisibilityFlags};
pub use services::advocates::AdvocateService;
pub use services::patients::PatientService;

/// Maximum length of a username as stored by the directory.
pub const MAX_USERNAME_LEN: usize = 20;

/// Errors raised while validating text inputs at the type level.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TextError {
    #[error("username cannot be empty")]
    Empty,
    #[error("username exceeds maximum length of {max} characters")]
    TooLong { max: usize },
    #[error("username contains invalid characters (only alphanumeric, '.', '-', '_' allowed)")]
    InvalidCharacters,
}

/// A validated account username.
///
/// Usernames are the immutable key for every directory entry. They are
/// trimmed, non-empty, at most [`MAX_USERNAME_LEN`] characters, and limited
/// to a conservative ASCII set so they can be embedded in request paths
/// without escaping.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validates and creates a username.
    ///
    /// # Errors
    ///
    /// Returns a `TextError` if the value is empty, too long, or contains
    /// characters outside `[A-Za-z0-9._-]`.
    pub fn new(value: &str) -> Result<Self, TextError> {
        let trimmed = value.trim();

        if trimmed.is_empty() {
            return Err(TextError::Empty);
        }

        if trimmed.len() > MAX_USERNAME_LEN {
            return Err(TextError::TooLong {
                max: MAX_USERNAME_LEN,
            });
        }

        let ok = trimmed
            .bytes()
            .all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'z' | b'A'..=b'Z' | b'.' | b'-' | b'_'));

        if !ok {
            return Err(TextError::InvalidCharacters);
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Username {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Username {
    type Error = TextError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl std::str::FromStr for Username {
    type Err = TextError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}
