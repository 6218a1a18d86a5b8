//! Patient records and the patient side of the relationship ledger.
//!
//! A patient owns the ordered list of [`Permission`] records describing which
//! advocates may view its data. All ledger lookups are linear scans over that
//! list; at the expected scale (single digits to low hundreds of grants per
//! patient) no index structure is warranted. When duplicate grants exist,
//! the first match in insertion order wins for both find and update.

use crate::account::{Account, Role};
use crate::advocate::PatientAdvocate;
use crate::permission::{Permission, VisibilityFlags};
use crate::{DirectoryResult, Username};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Demographic and contact fields a patient or clinician may edit. The
/// username, roles, and permission list are never touched by a profile
/// update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatientProfile {
    pub first_name: Option<String>,
    pub preferred_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address1: Option<String>,
    pub address2: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub phone: Option<String>,
    pub date_of_birth: Option<NaiveDate>,
}

/// Submitted details for creating a patient.
#[derive(Debug, Clone)]
pub struct PatientForm {
    pub username: Username,
    pub profile: PatientProfile,
}

/// A patient stored in the account directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Patient {
    account: Account,
    profile: PatientProfile,
    permissions: Vec<Permission>,
}

impl Patient {
    /// Builds a patient record from an identity account.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::RoleMismatch` if the account does not carry
    /// [`Role::Patient`].
    pub fn new(account: Account) -> DirectoryResult<Self> {
        account.require_role(Role::Patient)?;

        Ok(Self {
            account,
            profile: PatientProfile::default(),
            permissions: Vec::new(),
        })
    }

    pub fn username(&self) -> &Username {
        self.account.username()
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn profile(&self) -> &PatientProfile {
        &self.profile
    }

    pub fn update_profile(&mut self, profile: PatientProfile) {
        self.profile = profile;
    }

    /// The permission records held by this patient, in grant order.
    pub fn permissions(&self) -> &[Permission] {
        &self.permissions
    }

    /// Grants the advocate full access to this patient's data.
    ///
    /// Appends a new permission with all three visibility flags set and
    /// records this patient's username on the advocate's side. No uniqueness
    /// check is performed on the permission list: granting twice for the same
    /// pair yields two permission entries, while the advocate's patient list
    /// deduplicates and keeps a single entry.
    ///
    /// Returns the created permission.
    pub fn grant_advocate(&mut self, advocate: &mut PatientAdvocate) -> Permission {
        let permission =
            Permission::full_access(self.username().clone(), advocate.username().clone());
        self.permissions.push(permission.clone());
        advocate.add_patient(self.username().clone());
        permission
    }

    /// Revokes the advocate's access to this patient's data.
    ///
    /// Removes the first permission matching the advocate's username (a no-op
    /// when none exists) and independently removes this patient's username
    /// from the advocate's list. The two removals are not transactional with
    /// each other; either side proceeds even when the other has nothing to
    /// remove.
    pub fn revoke_advocate(&mut self, advocate: &mut PatientAdvocate) {
        self.remove_permission_for(advocate.username().clone());
        advocate.remove_patient(self.username());
    }

    /// Finds the first permission granted to the given advocate, in insertion
    /// order.
    pub fn permission_for(&self, advocate: &Username) -> Option<&Permission> {
        self.permissions
            .iter()
            .find(|permission| permission.advocate() == advocate)
    }

    /// Overwrites the visibility flags of the stored permission whose
    /// (advocate, patient) pair matches `new`. Only the three flags change;
    /// the identifying pair is left as stored. Returns `false` and mutates
    /// nothing when no pair matches.
    pub fn update_permission(&mut self, new: &Permission) -> bool {
        for existing in &mut self.permissions {
            if existing.covers_pair(new.patient(), new.advocate()) {
                existing.set_flags(new.flags());
                return true;
            }
        }
        false
    }

    /// Removes every permission granted to the given advocate. Used when the
    /// advocate's account is deleted from the directory.
    pub(crate) fn purge_advocate(&mut self, advocate: &Username) {
        self.permissions
            .retain(|permission| permission.advocate() != advocate);
    }

    fn remove_permission_for(&mut self, advocate: Username) -> Option<Permission> {
        let index = self
            .permissions
            .iter()
            .position(|permission| *permission.advocate() == advocate)?;
        Some(self.permissions.remove(index))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountForm;
    use crate::DirectoryError;

    fn username(value: &str) -> Username {
        Username::new(value).expect("username should be valid")
    }

    fn patient(name: &str) -> Patient {
        let account = Account::new(AccountForm {
            username: username(name),
            credential: "pw".into(),
            role: Role::Patient,
        });
        Patient::new(account).expect("patient construction should succeed")
    }

    fn advocate(name: &str) -> PatientAdvocate {
        let account = Account::new(AccountForm {
            username: username(name),
            credential: "pw".into(),
            role: Role::PatientAdvocate,
        });
        PatientAdvocate::new(account).expect("advocate construction should succeed")
    }

    #[test]
    fn test_new_rejects_non_patient_account() {
        let account = Account::new(AccountForm {
            username: username("pat1"),
            credential: "pw".into(),
            role: Role::Admin,
        });

        let err = Patient::new(account)
            .expect_err("constructing a patient from an admin account should fail");
        assert!(matches!(
            err,
            DirectoryError::RoleMismatch {
                expected: Role::Patient
            }
        ));
    }

    #[test]
    fn test_grant_creates_full_access_permission() {
        let mut pat = patient("pat1");
        let mut adv = advocate("adv1");

        assert_eq!(pat.permissions().len(), 0);

        let granted = pat.grant_advocate(&mut adv);
        assert_eq!(pat.permissions().len(), 1);

        let permission = pat
            .permission_for(adv.username())
            .expect("permission should be found after grant");
        assert_eq!(permission, &granted);
        assert_eq!(permission.patient().as_str(), "pat1");
        assert_eq!(permission.advocate().as_str(), "adv1");
        assert!(permission.office_visibility);
        assert!(permission.billing_visibility);
        assert!(permission.prescription_visibility);

        assert_eq!(adv.patients(), &[username("pat1")]);
    }

    #[test]
    fn test_revoke_removes_both_sides() {
        let mut pat = patient("pat1");
        let mut adv = advocate("adv1");

        pat.grant_advocate(&mut adv);
        pat.revoke_advocate(&mut adv);

        assert!(pat.permission_for(adv.username()).is_none());
        assert_eq!(pat.permissions().len(), 0);
        assert!(adv.patients().is_empty());
    }

    #[test]
    fn test_revoke_without_grant_is_a_no_op() {
        let mut pat = patient("pat1");
        let mut adv = advocate("adv1");

        pat.revoke_advocate(&mut adv);

        assert_eq!(pat.permissions().len(), 0);
        assert!(adv.patients().is_empty());
    }

    #[test]
    fn test_double_grant_asymmetry() {
        // Granting twice duplicates the permission entry but not the
        // advocate's patient-list entry.
        let mut pat = patient("pat1");
        let mut adv = advocate("adv1");

        pat.grant_advocate(&mut adv);
        pat.grant_advocate(&mut adv);

        assert_eq!(pat.permissions().len(), 2);
        assert_eq!(adv.patients().len(), 1);
    }

    #[test]
    fn test_duplicate_grants_first_match_wins() {
        let mut pat = patient("pat1");
        let mut adv = advocate("adv1");

        let first = pat.grant_advocate(&mut adv);
        let second = pat.grant_advocate(&mut adv);
        assert_ne!(first.id(), second.id());

        let found = pat
            .permission_for(adv.username())
            .expect("permission should be found");
        assert_eq!(found.id(), first.id());

        // Update also hits the first entry only.
        let update = Permission::new(
            username("pat1"),
            username("adv1"),
            VisibilityFlags {
                office_visibility: false,
                billing_visibility: true,
                prescription_visibility: true,
            },
        );
        assert!(pat.update_permission(&update));
        assert!(!pat.permissions()[0].office_visibility);
        assert!(pat.permissions()[1].office_visibility);
    }

    #[test]
    fn test_update_permission_overwrites_flags_only() {
        let mut pat = patient("pat1");
        let mut adv = advocate("adv1");
        pat.grant_advocate(&mut adv);

        let update = Permission::new(
            username("pat1"),
            username("adv1"),
            VisibilityFlags {
                office_visibility: false,
                billing_visibility: false,
                prescription_visibility: false,
            },
        );
        assert!(pat.update_permission(&update));

        let stored = pat
            .permission_for(adv.username())
            .expect("permission should still exist");
        assert!(!stored.office_visibility);
        assert!(!stored.billing_visibility);
        assert!(!stored.prescription_visibility);
        assert_eq!(stored.patient().as_str(), "pat1");
        assert_eq!(stored.advocate().as_str(), "adv1");
    }

    #[test]
    fn test_update_permission_missing_pair_mutates_nothing() {
        let mut pat = patient("pat1");
        let mut adv = advocate("adv1");
        pat.grant_advocate(&mut adv);

        let update = Permission::new(
            username("pat1"),
            username("adv2"),
            VisibilityFlags {
                office_visibility: false,
                billing_visibility: false,
                prescription_visibility: false,
            },
        );
        assert!(!pat.update_permission(&update));

        let stored = pat
            .permission_for(adv.username())
            .expect("permission should be untouched");
        assert!(stored.office_visibility);
        assert!(stored.billing_visibility);
        assert!(stored.prescription_visibility);
    }

    #[test]
    fn test_permission_for_unknown_advocate_is_none() {
        let pat = patient("pat1");
        assert!(pat.permission_for(&username("adv1")).is_none());
    }

    #[test]
    fn test_purge_advocate_removes_all_duplicates() {
        let mut pat = patient("pat1");
        let mut adv = advocate("adv1");
        let mut other = advocate("adv2");

        pat.grant_advocate(&mut adv);
        pat.grant_advocate(&mut adv);
        pat.grant_advocate(&mut other);
        assert_eq!(pat.permissions().len(), 3);

        pat.purge_advocate(adv.username());
        assert_eq!(pat.permissions().len(), 1);
        assert_eq!(pat.permissions()[0].advocate().as_str(), "adv2");
    }
}
