//! Account identities shared by patients and patient advocates.
//!
//! An [`Account`] holds the identity attributes common to every directory
//! entry: the immutable username, the opaque credential delegated to the
//! external identity store, and the set of granted roles. Concrete record
//! kinds ([`crate::Patient`], [`crate::PatientAdvocate`]) are built from an
//! `Account` and fail construction when the matching role is absent.

use crate::{DirectoryError, DirectoryResult, Username};
use serde::{Deserialize, Serialize};

/// Roles an account can carry. The directory resolves an account to its
/// concrete record kind exactly once, at the directory boundary, so role
/// checks never recur deeper in the call graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Patient,
    PatientAdvocate,
    Hcp,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Role::Patient => "PATIENT",
            Role::PatientAdvocate => "PATIENT_ADVOCATE",
            Role::Hcp => "HCP",
            Role::Admin => "ADMIN",
        };
        f.write_str(label)
    }
}

/// Submitted identity details for a new account.
#[derive(Debug, Clone)]
pub struct AccountForm {
    pub username: Username,
    pub credential: String,
    pub role: Role,
}

/// An identity record in the account directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    username: Username,
    #[serde(skip_serializing, default)]
    credential: String,
    roles: Vec<Role>,
}

impl Account {
    pub fn new(form: AccountForm) -> Self {
        Self {
            username: form.username,
            credential: form.credential,
            roles: vec![form.role],
        }
    }

    pub fn username(&self) -> &Username {
        &self.username
    }

    pub fn roles(&self) -> &[Role] {
        &self.roles
    }

    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Confirms the account carries `role`, for constructors of concrete
    /// record kinds.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::RoleMismatch` when the role is absent.
    pub fn require_role(&self, role: Role) -> DirectoryResult<()> {
        if self.has_role(role) {
            Ok(())
        } else {
            Err(DirectoryError::RoleMismatch { expected: role })
        }
    }
}
