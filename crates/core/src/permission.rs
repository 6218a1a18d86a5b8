//! Permission records tying one patient advocate to one patient.

use crate::Username;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The three independent visibility toggles carried by a [`Permission`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisibilityFlags {
    pub office_visibility: bool,
    pub billing_visibility: bool,
    pub prescription_visibility: bool,
}

impl VisibilityFlags {
    /// All three categories visible, the state a fresh grant starts in.
    pub fn full_access() -> Self {
        Self {
            office_visibility: true,
            billing_visibility: true,
            prescription_visibility: true,
        }
    }
}

/// One advocate's access grant for one patient.
///
/// A permission is identified by its (patient, advocate) pair by convention
/// only; the patient's permission list does not enforce uniqueness, so
/// duplicate grants are possible and left to callers to handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    id: Uuid,
    patient: Username,
    advocate: Username,
    pub office_visibility: bool,
    pub billing_visibility: bool,
    pub prescription_visibility: bool,
}

impl Permission {
    pub fn new(patient: Username, advocate: Username, flags: VisibilityFlags) -> Self {
        Self {
            id: Uuid::new_v4(),
            patient,
            advocate,
            office_visibility: flags.office_visibility,
            billing_visibility: flags.billing_visibility,
            prescription_visibility: flags.prescription_visibility,
        }
    }

    /// A grant with every category visible.
    pub fn full_access(patient: Username, advocate: Username) -> Self {
        Self::new(patient, advocate, VisibilityFlags::full_access())
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn patient(&self) -> &Username {
        &self.patient
    }

    pub fn advocate(&self) -> &Username {
        &self.advocate
    }

    pub fn flags(&self) -> VisibilityFlags {
        VisibilityFlags {
            office_visibility: self.office_visibility,
            billing_visibility: self.billing_visibility,
            prescription_visibility: self.prescription_visibility,
        }
    }

    /// Overwrites the three visibility flags; the (patient, advocate) pair
    /// never changes after creation.
    pub fn set_flags(&mut self, flags: VisibilityFlags) {
        self.office_visibility = flags.office_visibility;
        self.billing_visibility = flags.billing_visibility;
        self.prescription_visibility = flags.prescription_visibility;
    }

    /// Whether this permission is the grant for the given pair.
    pub fn covers_pair(&self, patient: &Username, advocate: &Username) -> bool {
        self.patient == *patient && self.advocate == *advocate
    }
}
