//! In-memory account directory.
//!
//! The directory is the single store for patient and advocate records, keyed
//! by username. Each entry is a tagged [`DirectoryEntry`] variant, so an
//! account resolves to its concrete kind exactly once, here at the boundary;
//! no role-gated downcasting happens deeper in the call graph.
//!
//! ## Concurrency
//!
//! The directory itself is a plain map; callers share it through
//! [`SharedDirectory`], an `Arc<RwLock<_>>`. Every mutating façade operation
//! holds the write lock for its whole resolve-scan-mutate sequence, which
//! keeps concurrent grant/revoke calls against the same pair from racing.

use crate::advocate::PatientAdvocate;
use crate::patient::Patient;
use crate::{DirectoryError, DirectoryResult, Username};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// The directory shared across services. Lock poisoning is not recovered
/// from; a panic while holding the lock is a programming error.
pub type SharedDirectory = Arc<RwLock<AccountDirectory>>;

/// An account resolved to its concrete record kind.
#[derive(Debug, Clone)]
pub enum DirectoryEntry {
    Patient(Patient),
    Advocate(PatientAdvocate),
}

impl DirectoryEntry {
    pub fn username(&self) -> &Username {
        match self {
            DirectoryEntry::Patient(patient) => patient.username(),
            DirectoryEntry::Advocate(advocate) => advocate.username(),
        }
    }
}

/// Username-keyed store of patient and advocate records.
///
/// Listing order is the map's username order, which keeps list endpoints
/// deterministic without a secondary index.
#[derive(Debug, Default)]
pub struct AccountDirectory {
    entries: BTreeMap<Username, DirectoryEntry>,
}

impl AccountDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps a fresh directory for sharing across services.
    pub fn shared() -> SharedDirectory {
        Arc::new(RwLock::new(Self::new()))
    }

    pub fn contains(&self, username: &Username) -> bool {
        self.entries.contains_key(username)
    }

    /// Inserts a new entry.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::DuplicateUsername` if the username is taken,
    /// regardless of the existing entry's kind.
    pub fn insert(&mut self, entry: DirectoryEntry) -> DirectoryResult<()> {
        let username = entry.username().clone();
        if self.entries.contains_key(&username) {
            return Err(DirectoryError::DuplicateUsername(username));
        }
        self.entries.insert(username, entry);
        Ok(())
    }

    pub fn patient(&self, username: &Username) -> DirectoryResult<&Patient> {
        match self.entries.get(username) {
            Some(DirectoryEntry::Patient(patient)) => Ok(patient),
            _ => Err(DirectoryError::PatientNotFound(username.clone())),
        }
    }

    pub fn patient_mut(&mut self, username: &Username) -> DirectoryResult<&mut Patient> {
        match self.entries.get_mut(username) {
            Some(DirectoryEntry::Patient(patient)) => Ok(patient),
            _ => Err(DirectoryError::PatientNotFound(username.clone())),
        }
    }

    pub fn advocate(&self, username: &Username) -> DirectoryResult<&PatientAdvocate> {
        match self.entries.get(username) {
            Some(DirectoryEntry::Advocate(advocate)) => Ok(advocate),
            _ => Err(DirectoryError::AdvocateNotFound(username.clone())),
        }
    }

    pub fn advocate_mut(&mut self, username: &Username) -> DirectoryResult<&mut PatientAdvocate> {
        match self.entries.get_mut(username) {
            Some(DirectoryEntry::Advocate(advocate)) => Ok(advocate),
            _ => Err(DirectoryError::AdvocateNotFound(username.clone())),
        }
    }

    /// Removes and returns the advocate entry for `username`.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::AdvocateNotFound` if the username is absent
    /// or names a different record kind (the mismatched entry stays put).
    pub fn remove_advocate(&mut self, username: &Username) -> DirectoryResult<PatientAdvocate> {
        match self.entries.remove(username) {
            Some(DirectoryEntry::Advocate(advocate)) => Ok(advocate),
            Some(other) => {
                self.entries.insert(username.clone(), other);
                Err(DirectoryError::AdvocateNotFound(username.clone()))
            }
            None => Err(DirectoryError::AdvocateNotFound(username.clone())),
        }
    }

    /// Runs `f` with mutable access to both sides of a patient-advocate
    /// pair. The patient is resolved first, so when both identities are
    /// missing the patient-side not-found is reported. The advocate entry is
    /// detached from the map for the duration of `f` so both records can be
    /// borrowed mutably at once, and is reinserted before returning.
    ///
    /// # Errors
    ///
    /// Returns the not-found error for whichever identity fails to resolve;
    /// `f` is not run in that case.
    pub fn with_pair_mut<R>(
        &mut self,
        patient: &Username,
        advocate: &Username,
        f: impl FnOnce(&mut Patient, &mut PatientAdvocate) -> R,
    ) -> DirectoryResult<R> {
        if !matches!(self.entries.get(patient), Some(DirectoryEntry::Patient(_))) {
            return Err(DirectoryError::PatientNotFound(patient.clone()));
        }

        let mut detached = self.remove_advocate(advocate)?;
        let result = match self.patient_mut(patient) {
            Ok(patient_record) => Ok(f(patient_record, &mut detached)),
            Err(err) => Err(err),
        };
        self.entries
            .insert(detached.username().clone(), DirectoryEntry::Advocate(detached));

        result
    }

    /// All patients, in username order.
    pub fn patients(&self) -> impl Iterator<Item = &Patient> {
        self.entries.values().filter_map(|entry| match entry {
            DirectoryEntry::Patient(patient) => Some(patient),
            _ => None,
        })
    }

    /// All patients, mutably, in username order.
    pub fn patients_mut(&mut self) -> impl Iterator<Item = &mut Patient> {
        self.entries.values_mut().filter_map(|entry| match entry {
            DirectoryEntry::Patient(patient) => Some(patient),
            _ => None,
        })
    }

    /// All advocates, in username order.
    pub fn advocates(&self) -> impl Iterator<Item = &PatientAdvocate> {
        self.entries.values().filter_map(|entry| match entry {
            DirectoryEntry::Advocate(advocate) => Some(advocate),
            _ => None,
        })
    }
}
