//! Patient advocate records.
//!
//! A patient advocate is an account authorised to view a patient's data,
//! subject to the permissions held on the patient side of the relationship
//! ledger. The advocate's own side of the ledger is an ordered list of the
//! patient usernames it has been granted access to.

use crate::account::{Account, Role};
use crate::{DirectoryResult, Username};
use serde::{Deserialize, Serialize};

/// Profile fields an administrator may edit on an advocate. The username,
/// roles, and patient list are managed elsewhere and never touched by a
/// profile update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvocateProfile {
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub preferred_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address1: Option<String>,
    pub phone: Option<String>,
}

/// Submitted details for creating a patient advocate.
#[derive(Debug, Clone)]
pub struct AdvocateForm {
    pub username: Username,
    pub profile: AdvocateProfile,
}

/// A patient advocate stored in the account directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatientAdvocate {
    account: Account,
    profile: AdvocateProfile,
    patients: Vec<Username>,
}

impl PatientAdvocate {
    /// Builds an advocate record from an identity account.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::RoleMismatch` if the account does not carry
    /// [`Role::PatientAdvocate`].
    pub fn new(account: Account) -> DirectoryResult<Self> {
        account.require_role(Role::PatientAdvocate)?;

        Ok(Self {
            account,
            profile: AdvocateProfile::default(),
            patients: Vec::new(),
        })
    }

    pub fn username(&self) -> &Username {
        self.account.username()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn profile(&self) -> &AdvocateProfile {
        &self.profile
    }

    pub fn update_profile(&mut self, profile: AdvocateProfile) {
        self.profile = profile;
    }

    /// The patients this advocate has been granted access to, in grant order.
    pub fn patients(&self) -> &[Username] {
        &self.patients
    }

    /// Records a patient under this advocate. Already-recorded usernames are
    /// not duplicated, unlike the patient-side permission list.
    pub fn add_patient(&mut self, patient: Username) {
        if !self.patients.contains(&patient) {
            self.patients.push(patient);
        }
    }

    /// Removes the patient from this advocate's list. Returns whether an
    /// entry was removed.
    pub fn remove_patient(&mut self, patient: &Username) -> bool {
        match self.patients.iter().position(|p| p == patient) {
            Some(index) => {
                self.patients.remove(index);
                true
            }
            None => false,
        }
    }
}
