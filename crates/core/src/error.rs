use crate::account::Role;
use crate::Username;

#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    #[error("no patient found for username {0}")]
    PatientNotFound(Username),
    #[error("no patient advocate found for username {0}")]
    AdvocateNotFound(Username),
    #[error("user with the username {0} already exists")]
    DuplicateUsername(Username),
    #[error("no permission stored for patient {patient} and advocate {advocate}")]
    PermissionMissing {
        patient: Username,
        advocate: Username,
    },
    #[error("attempted to create a {expected} record for a user without the {expected} role")]
    RoleMismatch { expected: Role },
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Text(#[from] crate::TextError),
}

pub type DirectoryResult<T> = std::result::Result<T, DirectoryError>;
