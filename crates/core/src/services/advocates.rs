//! Patient advocate directory operations.
//!
//! This service owns the advocate-facing slice of the façade: CRUD over
//! advocate accounts, the patient association that seeds a full-access
//! permission, and the advocate-side listing of associated patients.
//!
//! Every operation resolves usernames first and reports not-found before the
//! ledger is touched. Mutating operations hold the directory write lock for
//! their whole resolve-scan-mutate sequence.

use crate::account::{Account, AccountForm, Role};
use crate::advocate::{AdvocateForm, AdvocateProfile, PatientAdvocate};
use crate::config::CoreConfig;
use crate::directory::{DirectoryEntry, SharedDirectory};
use crate::{DirectoryResult, Username};
use std::sync::Arc;

/// Façade over advocate accounts and their patient associations.
#[derive(Clone)]
pub struct AdvocateService {
    cfg: Arc<CoreConfig>,
    directory: SharedDirectory,
}

impl AdvocateService {
    pub fn new(cfg: Arc<CoreConfig>, directory: SharedDirectory) -> Self {
        Self { cfg, directory }
    }

    /// All advocates, in username order.
    pub fn list(&self) -> Vec<PatientAdvocate> {
        let directory = self.directory.read().expect("account directory lock poisoned");
        directory.advocates().cloned().collect()
    }

    /// Creates an advocate account with the configured placeholder
    /// credential. The caller never supplies a credential here; provisioning
    /// a real one is the identity store's concern.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::DuplicateUsername` if the username is taken
    /// by any existing account.
    pub fn create(&self, form: AdvocateForm) -> DirectoryResult<PatientAdvocate> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        let account = Account::new(AccountForm {
            username: form.username,
            credential: self.cfg.default_credential().to_string(),
            role: Role::PatientAdvocate,
        });

        let mut advocate = PatientAdvocate::new(account)?;
        advocate.update_profile(form.profile);

        let created = advocate.clone();
        directory.insert(DirectoryEntry::Advocate(advocate))?;

        tracing::info!("created patient advocate {}", created.username());
        Ok(created)
    }

    /// Looks up one advocate by username.
    pub fn get(&self, username: &Username) -> DirectoryResult<PatientAdvocate> {
        let directory = self.directory.read().expect("account directory lock poisoned");
        directory.advocate(username).cloned()
    }

    /// Replaces the advocate's profile fields in place. The username, roles,
    /// and patient list are untouched.
    pub fn update(
        &self,
        username: &Username,
        profile: AdvocateProfile,
    ) -> DirectoryResult<PatientAdvocate> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        let advocate = directory.advocate_mut(username)?;
        advocate.update_profile(profile);
        Ok(advocate.clone())
    }

    /// Deletes the advocate account and every permission it was granted, on
    /// every patient. Returns the removed record with its patient list as it
    /// stood at deletion.
    pub fn delete(&self, username: &Username) -> DirectoryResult<PatientAdvocate> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        let removed = directory.remove_advocate(username)?;

        for patient in directory.patients_mut() {
            patient.purge_advocate(username);
        }

        tracing::info!("deleted patient advocate {}", removed.username());
        Ok(removed)
    }

    /// Associates the patient with the advocate, granting full access. The
    /// grant performs no uniqueness check; associating the same pair twice
    /// stores a second permission on the patient side.
    ///
    /// Returns the advocate as updated by the association.
    pub fn associate(
        &self,
        advocate: &Username,
        patient: &Username,
    ) -> DirectoryResult<PatientAdvocate> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        let updated = directory.with_pair_mut(patient, advocate, |patient_record, advocate_record| {
            patient_record.grant_advocate(advocate_record);
            advocate_record.clone()
        })?;

        tracing::info!(
            "associated patient {} with advocate {}",
            patient,
            updated.username()
        );
        Ok(updated)
    }

    /// The usernames of the patients associated with the advocate, verbatim
    /// and in grant order. A missing advocate is an explicit not-found.
    pub fn associated_patients(&self, advocate: &Username) -> DirectoryResult<Vec<Username>> {
        let directory = self.directory.read().expect("account directory lock poisoned");
        Ok(directory.advocate(advocate)?.patients().to_vec())
    }
}
