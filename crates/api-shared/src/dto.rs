//! Wire-level request and response types.
//!
//! These types carry plain strings; parsing and validation against the core
//! domain types happens at the handler boundary in `api-rest`. Keeping the
//! DTOs free of domain imports lets any future API surface reuse them.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct HealthRes {
    pub ok: bool,
    pub message: String,
}

/// Error body returned for every failed request.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ErrorRes {
    pub message: String,
}

/// Submitted profile for creating or updating a patient advocate. The
/// username field is ignored on update; the path identifies the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct AdvocateForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub middle_name: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A patient advocate as returned by the API. The advocate's patient list
/// is deliberately absent; it has its own endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AdvocateRes {
    pub username: String,
    pub roles: Vec<String>,
    pub first_name: Option<String>,
    pub middle_name: Option<String>,
    pub preferred_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub address1: Option<String>,
    pub phone: Option<String>,
}

/// Submitted profile for creating or updating a patient. The username field
/// is ignored on update; the path identifies the record.
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct PatientForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub preferred_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub address1: Option<String>,
    #[serde(default)]
    pub address2: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    /// ISO-8601 date, `YYYY-MM-DD`.
    #[serde(default)]
    pub date_of_birth: Option<String>,
}

/// A patient as returned by the API. Permission records have their own
/// endpoints and are not embedded here.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PatientRes {
    pub username: String,
    pub roles: Vec<String>,
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
    pub date_of_birth: Option<String>,
}

/// The visibility flags submitted when updating a permission. The pair the
/// permission belongs to comes from the request path.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionForm {
    pub office_visibility: bool,
    pub billing_visibility: bool,
    pub prescription_visibility: bool,
}

/// One advocate's access grant for one patient.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PermissionRes {
    pub id: String,
    pub patient: String,
    pub advocate: String,
    pub office_visibility: bool,
    pub billing_visibility: bool,
    pub prescription_visibility: bool,
}
