//! Patient directory operations and permission management.
//!
//! The patient-facing slice of the façade: CRUD over patient accounts, the
//! patient's view of its advocates, and the grant/read/update/revoke cycle
//! for the permission attached to one (patient, advocate) pair.

use crate::account::{Account, AccountForm, Role};
use crate::advocate::PatientAdvocate;
use crate::config::CoreConfig;
use crate::directory::{DirectoryEntry, SharedDirectory};
use crate::patient::{Patient, PatientForm, PatientProfile};
use crate::permission::{Permission, VisibilityFlags};
use crate::{DirectoryError, DirectoryResult, Username};
use std::sync::Arc;

/// Façade over patient accounts and their permission records.
#[derive(Clone)]
pub struct PatientService {
    cfg: Arc<CoreConfig>,
    directory: SharedDirectory,
}

impl PatientService {
    pub fn new(cfg: Arc<CoreConfig>, directory: SharedDirectory) -> Self {
        Self { cfg, directory }
    }

    /// All patients, in username order.
    pub fn list(&self) -> Vec<Patient> {
        let directory = self.directory.read().expect("account directory lock poisoned");
        directory.patients().cloned().collect()
    }

    /// Creates a patient account with the configured placeholder credential.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::DuplicateUsername` if the username is taken
    /// by any existing account.
    pub fn create(&self, form: PatientForm) -> DirectoryResult<Patient> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        let account = Account::new(AccountForm {
            username: form.username,
            credential: self.cfg.default_credential().to_string(),
            role: Role::Patient,
        });

        let mut patient = Patient::new(account)?;
        patient.update_profile(form.profile);

        let created = patient.clone();
        directory.insert(DirectoryEntry::Patient(patient))?;

        tracing::info!("created patient {}", created.username());
        Ok(created)
    }

    /// Looks up one patient by username.
    pub fn get(&self, username: &Username) -> DirectoryResult<Patient> {
        let directory = self.directory.read().expect("account directory lock poisoned");
        directory.patient(username).cloned()
    }

    /// Replaces the patient's demographic profile in place. The username,
    /// roles, and permission list are untouched.
    pub fn update(&self, username: &Username, profile: PatientProfile) -> DirectoryResult<Patient> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        let patient = directory.patient_mut(username)?;
        patient.update_profile(profile);
        Ok(patient.clone())
    }

    /// The patient's permission records, in grant order.
    pub fn permissions(&self, patient: &Username) -> DirectoryResult<Vec<Permission>> {
        let directory = self.directory.read().expect("account directory lock poisoned");
        Ok(directory.patient(patient)?.permissions().to_vec())
    }

    /// The advocates granted access to the patient, each permission's
    /// advocate username resolved to its full record. Entries whose advocate
    /// no longer resolves are skipped with a warning rather than failing the
    /// whole listing.
    pub fn advocates_of(&self, patient: &Username) -> DirectoryResult<Vec<PatientAdvocate>> {
        let directory = self.directory.read().expect("account directory lock poisoned");
        let patient_record = directory.patient(patient)?;

        let mut advocates = Vec::with_capacity(patient_record.permissions().len());
        for permission in patient_record.permissions() {
            match directory.advocate(permission.advocate()) {
                Ok(advocate) => advocates.push(advocate.clone()),
                Err(_) => {
                    tracing::warn!(
                        "permission for patient {} references unknown advocate {}",
                        patient,
                        permission.advocate()
                    );
                }
            }
        }

        Ok(advocates)
    }

    /// Reads the permission stored for the (patient, advocate) pair.
    ///
    /// # Errors
    ///
    /// Not-found for either identity; `DirectoryError::PermissionMissing`
    /// when both resolve but no grant exists.
    pub fn permission(&self, patient: &Username, advocate: &Username) -> DirectoryResult<Permission> {
        let directory = self.directory.read().expect("account directory lock poisoned");
        let patient_record = directory.patient(patient)?;
        let advocate_record = directory.advocate(advocate)?;

        patient_record
            .permission_for(advocate_record.username())
            .cloned()
            .ok_or_else(|| DirectoryError::PermissionMissing {
                patient: patient.clone(),
                advocate: advocate.clone(),
            })
    }

    /// Grants the advocate full access to the patient, returning the created
    /// permission. Equivalent to [`crate::AdvocateService::associate`] seen
    /// from the patient side.
    pub fn grant(&self, patient: &Username, advocate: &Username) -> DirectoryResult<Permission> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        let permission = directory.with_pair_mut(patient, advocate, |patient_record, advocate_record| {
            patient_record.grant_advocate(advocate_record)
        })?;

        tracing::info!("granted advocate {} access to patient {}", advocate, patient);
        Ok(permission)
    }

    /// Overwrites the visibility flags of the stored permission for the
    /// pair. Both identities must resolve even though only the patient side
    /// is mutated.
    ///
    /// # Errors
    ///
    /// Not-found for either identity; `DirectoryError::PermissionMissing`
    /// when no stored permission matches the pair (nothing is mutated).
    pub fn update_permission(
        &self,
        patient: &Username,
        advocate: &Username,
        flags: VisibilityFlags,
    ) -> DirectoryResult<Permission> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        directory.advocate(advocate)?;
        let patient_record = directory.patient_mut(patient)?;

        let new = Permission::new(patient.clone(), advocate.clone(), flags);
        if !patient_record.update_permission(&new) {
            return Err(DirectoryError::PermissionMissing {
                patient: patient.clone(),
                advocate: advocate.clone(),
            });
        }

        patient_record
            .permission_for(advocate)
            .cloned()
            .ok_or_else(|| DirectoryError::PermissionMissing {
                patient: patient.clone(),
                advocate: advocate.clone(),
            })
    }

    /// Revokes the advocate's access: removes the first matching permission
    /// on the patient side and the patient's entry on the advocate side.
    /// Revoking an absent grant is a no-op once both identities resolve.
    pub fn revoke(&self, patient: &Username, advocate: &Username) -> DirectoryResult<()> {
        let mut directory = self
            .directory
            .write()
            .expect("account directory lock poisoned");

        directory.with_pair_mut(patient, advocate, |patient_record, advocate_record| {
            patient_record.revoke_advocate(advocate_record);
        })?;

        tracing::info!("revoked advocate {} access to patient {}", advocate, patient);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advocate::{AdvocateForm, AdvocateProfile};
    use crate::directory::AccountDirectory;
    use crate::services::advocates::AdvocateService;

    fn username(value: &str) -> Username {
        Username::new(value).expect("username should be valid")
    }

    fn services() -> (PatientService, AdvocateService) {
        let cfg = Arc::new(CoreConfig::new("changeme".into()).expect("config should build"));
        let directory = AccountDirectory::shared();
        (
            PatientService::new(cfg.clone(), directory.clone()),
            AdvocateService::new(cfg, directory),
        )
    }

    fn seed_pair(patients: &PatientService, advocates: &AdvocateService) {
        patients
            .create(PatientForm {
                username: username("pat1"),
                profile: PatientProfile::default(),
            })
            .expect("patient create should succeed");
        advocates
            .create(AdvocateForm {
                username: username("adv1"),
                profile: AdvocateProfile::default(),
            })
            .expect("advocate create should succeed");
    }

    #[test]
    fn test_create_and_get_patient() {
        let (patients, _) = services();

        let created = patients
            .create(PatientForm {
                username: username("pat1"),
                profile: PatientProfile {
                    first_name: Some("Alice".into()),
                    last_name: Some("Smith".into()),
                    ..PatientProfile::default()
                },
            })
            .expect("create should succeed");
        assert_eq!(created.profile().first_name.as_deref(), Some("Alice"));

        let fetched = patients
            .get(&username("pat1"))
            .expect("get should succeed");
        assert_eq!(fetched.profile().last_name.as_deref(), Some("Smith"));

        let err = patients
            .create(PatientForm {
                username: username("pat1"),
                profile: PatientProfile::default(),
            })
            .expect_err("duplicate username should conflict");
        assert!(matches!(err, DirectoryError::DuplicateUsername(_)));
    }

    #[test]
    fn test_update_patient_profile() {
        let (patients, _) = services();
        patients
            .create(PatientForm {
                username: username("pat1"),
                profile: PatientProfile::default(),
            })
            .expect("create should succeed");

        let updated = patients
            .update(
                &username("pat1"),
                PatientProfile {
                    city: Some("Raleigh".into()),
                    ..PatientProfile::default()
                },
            )
            .expect("update should succeed");
        assert_eq!(updated.profile().city.as_deref(), Some("Raleigh"));

        let err = patients
            .update(&username("ghost"), PatientProfile::default())
            .expect_err("missing patient should fail");
        assert!(matches!(err, DirectoryError::PatientNotFound(_)));
    }

    #[test]
    fn test_grant_then_read_permission() {
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);

        let granted = patients
            .grant(&username("pat1"), &username("adv1"))
            .expect("grant should succeed");
        assert!(granted.office_visibility);
        assert!(granted.billing_visibility);
        assert!(granted.prescription_visibility);

        let read = patients
            .permission(&username("pat1"), &username("adv1"))
            .expect("permission should be readable");
        assert_eq!(read, granted);
    }

    #[test]
    fn test_permission_absent_is_conflict_class() {
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);

        let err = patients
            .permission(&username("pat1"), &username("adv1"))
            .expect_err("absent permission should fail");
        assert!(matches!(err, DirectoryError::PermissionMissing { .. }));
    }

    #[test]
    fn test_permission_requires_both_identities() {
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);

        let err = patients
            .permission(&username("ghost"), &username("adv1"))
            .expect_err("missing patient should fail");
        assert!(matches!(err, DirectoryError::PatientNotFound(_)));

        let err = patients
            .permission(&username("pat1"), &username("ghost"))
            .expect_err("missing advocate should fail");
        assert!(matches!(err, DirectoryError::AdvocateNotFound(_)));
    }

    #[test]
    fn test_update_permission_to_all_false() {
        // Grant, then flip every flag off; the stored pair must be unchanged.
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);
        patients
            .grant(&username("pat1"), &username("adv1"))
            .expect("grant should succeed");

        let updated = patients
            .update_permission(
                &username("pat1"),
                &username("adv1"),
                VisibilityFlags {
                    office_visibility: false,
                    billing_visibility: false,
                    prescription_visibility: false,
                },
            )
            .expect("update should succeed");

        assert!(!updated.office_visibility);
        assert!(!updated.billing_visibility);
        assert!(!updated.prescription_visibility);
        assert_eq!(updated.patient().as_str(), "pat1");
        assert_eq!(updated.advocate().as_str(), "adv1");
    }

    #[test]
    fn test_update_permission_missing_pair_fails_and_mutates_nothing() {
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);

        let err = patients
            .update_permission(
                &username("pat1"),
                &username("adv1"),
                VisibilityFlags::full_access(),
            )
            .expect_err("updating an absent permission should fail");
        assert!(matches!(err, DirectoryError::PermissionMissing { .. }));

        let stored = patients
            .permissions(&username("pat1"))
            .expect("permissions should list");
        assert!(stored.is_empty());
    }

    #[test]
    fn test_revoke_scenario() {
        // Associate then revoke; both sides return to length zero.
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);
        patients
            .grant(&username("pat1"), &username("adv1"))
            .expect("grant should succeed");

        patients
            .revoke(&username("pat1"), &username("adv1"))
            .expect("revoke should succeed");

        let stored = patients
            .permissions(&username("pat1"))
            .expect("permissions should list");
        assert!(stored.is_empty());

        let associated = advocates
            .associated_patients(&username("adv1"))
            .expect("associated patients should list");
        assert!(associated.is_empty());

        let err = patients
            .permission(&username("pat1"), &username("adv1"))
            .expect_err("revoked permission should be gone");
        assert!(matches!(err, DirectoryError::PermissionMissing { .. }));
    }

    #[test]
    fn test_double_grant_asymmetry_through_facade() {
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);

        patients
            .grant(&username("pat1"), &username("adv1"))
            .expect("grant should succeed");
        patients
            .grant(&username("pat1"), &username("adv1"))
            .expect("second grant should also succeed");

        let stored = patients
            .permissions(&username("pat1"))
            .expect("permissions should list");
        assert_eq!(stored.len(), 2, "duplicate grant should store two permissions");

        let associated = advocates
            .associated_patients(&username("adv1"))
            .expect("associated patients should list");
        assert_eq!(associated.len(), 1, "advocate list should deduplicate");
    }

    #[test]
    fn test_advocates_of_resolves_full_records() {
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);
        advocates
            .create(AdvocateForm {
                username: username("adv2"),
                profile: AdvocateProfile::default(),
            })
            .expect("advocate create should succeed");

        patients
            .grant(&username("pat1"), &username("adv1"))
            .expect("grant should succeed");
        patients
            .grant(&username("pat1"), &username("adv2"))
            .expect("grant should succeed");

        let resolved = patients
            .advocates_of(&username("pat1"))
            .expect("advocates should resolve");
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].username().as_str(), "adv1");
        assert_eq!(resolved[1].username().as_str(), "adv2");
    }

    #[test]
    fn test_advocates_of_skips_dangling_references() {
        let (patients, advocates) = services();
        seed_pair(&patients, &advocates);
        patients
            .grant(&username("pat1"), &username("adv1"))
            .expect("grant should succeed");

        // Deleting through the service purges permissions, so fabricate the
        // dangling state the skip path guards against by removing the entry
        // directly.
        patients
            .directory
            .write()
            .expect("account directory lock poisoned")
            .remove_advocate(&username("adv1"))
            .expect("advocate should be removable");

        let resolved = patients
            .advocates_of(&username("pat1"))
            .expect("listing should still succeed");
        assert!(resolved.is_empty(), "dangling reference should be skipped");
    }
}
