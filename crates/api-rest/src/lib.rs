//! # API REST
//!
//! REST API implementation for Carelink.
//!
//! Handles:
//! - HTTP endpoints with axum
//! - OpenAPI/Swagger documentation
//! - REST-specific concerns (JSON serialization, CORS, status mapping)
//!
//! Uses `api-shared` for DTO types and `carelink-core` for the directory and
//! ledger logic. The workspace's `carelink-run` binary mounts the router
//! built here.

#![warn(rust_2018_idioms)]

use axum::{
    extract::{Path as AxumPath, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use api_shared::dto;
use api_shared::HealthService;
use carelink_core::{
    AccountDirectory, AdvocateForm, AdvocateProfile, AdvocateService, CoreConfig, DirectoryError,
    Patient, PatientAdvocate, PatientForm, PatientProfile, PatientService, Permission, Username,
    VisibilityFlags,
};
use chrono::NaiveDate;

/// Application state for the REST API server
///
/// Contains shared state that needs to be accessible to all request handlers:
/// the two façade services, both backed by the same account directory.
#[derive(Clone)]
pub struct AppState {
    advocates: AdvocateService,
    patients: PatientService,
}

impl AppState {
    /// Creates the state for a fresh, empty account directory.
    pub fn new(cfg: Arc<CoreConfig>) -> Self {
        let directory = AccountDirectory::shared();
        Self {
            advocates: AdvocateService::new(cfg.clone(), directory.clone()),
            patients: PatientService::new(cfg, directory),
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        health,
        list_advocates,
        create_advocate,
        get_advocate,
        update_advocate,
        delete_advocate,
        associate_patient,
        advocate_patients,
        list_patients,
        create_patient,
        get_patient,
        update_patient,
        patient_permissions,
        patient_advocates,
        grant_permission,
        get_permission,
        update_permission,
        revoke_permission,
    ),
    components(schemas(
        dto::HealthRes,
        dto::ErrorRes,
        dto::AdvocateForm,
        dto::AdvocateRes,
        dto::PatientForm,
        dto::PatientRes,
        dto::PermissionForm,
        dto::PermissionRes,
    ))
)]
struct ApiDoc;

/// Builds the full REST router with Swagger UI and permissive CORS.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/patientadvocates", get(list_advocates))
        .route("/api/v1/patientadvocate", post(create_advocate))
        .route("/api/v1/patientadvocate/:id", get(get_advocate))
        .route("/api/v1/patientadvocate/:id", put(update_advocate))
        .route("/api/v1/patientadvocate/:id", delete(delete_advocate))
        .route(
            "/api/v1/patientadvocate/:id/patients/:patient_id",
            post(associate_patient),
        )
        .route("/api/v1/patientadvocate/:id/patients", get(advocate_patients))
        .route("/api/v1/patients", get(list_patients))
        .route("/api/v1/patients", post(create_patient))
        .route("/api/v1/patients/:username", get(get_patient))
        .route("/api/v1/patients/:username", put(update_patient))
        .route(
            "/api/v1/patients/:username/permissions",
            get(patient_permissions),
        )
        .route(
            "/api/v1/patients/:username/patientadvocate",
            get(patient_advocates),
        )
        .route(
            "/api/v1/patients/:username/permissions/:advocate",
            post(grant_permission),
        )
        .route(
            "/api/v1/patients/:username/permissions/:advocate",
            get(get_permission),
        )
        .route(
            "/api/v1/patients/:username/permissions/:advocate",
            put(update_permission),
        )
        .route(
            "/api/v1/patients/:username/permissions/:advocate",
            delete(revoke_permission),
        )
        .merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Error mapping and DTO conversion
// ---------------------------------------------------------------------------

type ApiError = (StatusCode, Json<dto::ErrorRes>);

/// Maps a domain failure onto an HTTP status and the JSON error body shape
/// every endpoint shares.
fn error_response(err: DirectoryError) -> ApiError {
    let status = match &err {
        DirectoryError::PatientNotFound(_) | DirectoryError::AdvocateNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        DirectoryError::DuplicateUsername(_) | DirectoryError::PermissionMissing { .. } => {
            StatusCode::CONFLICT
        }
        DirectoryError::RoleMismatch { .. }
        | DirectoryError::InvalidInput(_)
        | DirectoryError::Text(_) => StatusCode::BAD_REQUEST,
    };

    tracing::warn!("request failed ({}): {}", status, err);
    (
        status,
        Json(dto::ErrorRes {
            message: err.to_string(),
        }),
    )
}

fn parse_username(raw: &str) -> Result<Username, ApiError> {
    Username::new(raw).map_err(|e| error_response(DirectoryError::from(e)))
}

fn advocate_res(record: &PatientAdvocate) -> dto::AdvocateRes {
    let profile = record.profile();
    dto::AdvocateRes {
        username: record.username().to_string(),
        roles: record
            .account()
            .roles()
            .iter()
            .map(|role| role.to_string())
            .collect(),
        first_name: profile.first_name.clone(),
        middle_name: profile.middle_name.clone(),
        preferred_name: profile.preferred_name.clone(),
        last_name: profile.last_name.clone(),
        email: profile.email.clone(),
        address1: profile.address1.clone(),
        phone: profile.phone.clone(),
    }
}

fn advocate_profile(form: &dto::AdvocateForm) -> AdvocateProfile {
    AdvocateProfile {
        first_name: form.first_name.clone(),
        middle_name: form.middle_name.clone(),
        preferred_name: form.preferred_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
        address1: form.address1.clone(),
        phone: form.phone.clone(),
    }
}

fn patient_res(record: &Patient) -> dto::PatientRes {
    let profile = record.profile();
    dto::PatientRes {
        username: record.username().to_string(),
        roles: record
            .account()
            .roles()
            .iter()
            .map(|role| role.to_string())
            .collect(),
        first_name: profile.first_name.clone(),
        preferred_name: profile.preferred_name.clone(),
        last_name: profile.last_name.clone(),
        email: profile.email.clone(),
        address1: profile.address1.clone(),
        address2: profile.address2.clone(),
        city: profile.city.clone(),
        state: profile.state.clone(),
        zip: profile.zip.clone(),
        phone: profile.phone.clone(),
        date_of_birth: profile
            .date_of_birth
            .map(|date| date.format("%Y-%m-%d").to_string()),
    }
}

fn patient_profile(form: &dto::PatientForm) -> Result<PatientProfile, ApiError> {
    let date_of_birth = match &form.date_of_birth {
        Some(raw) => Some(NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| {
            error_response(DirectoryError::InvalidInput(format!(
                "date_of_birth must be YYYY-MM-DD, got {raw:?}"
            )))
        })?),
        None => None,
    };

    Ok(PatientProfile {
        first_name: form.first_name.clone(),
        preferred_name: form.preferred_name.clone(),
        last_name: form.last_name.clone(),
        email: form.email.clone(),
        address1: form.address1.clone(),
        address2: form.address2.clone(),
        city: form.city.clone(),
        state: form.state.clone(),
        zip: form.zip.clone(),
        phone: form.phone.clone(),
        date_of_birth,
    })
}

fn permission_res(permission: &Permission) -> dto::PermissionRes {
    dto::PermissionRes {
        id: permission.id().to_string(),
        patient: permission.patient().to_string(),
        advocate: permission.advocate().to_string(),
        office_visibility: permission.office_visibility,
        billing_visibility: permission.billing_visibility,
        prescription_visibility: permission.prescription_visibility,
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Health check response", body = dto::HealthRes)
    )
)]
/// Health check endpoint for the REST API
///
/// Used for monitoring and load balancer health checks.
#[axum::debug_handler]
async fn health(State(_state): State<AppState>) -> Json<dto::HealthRes> {
    Json(HealthService::check_health())
}

#[utoipa::path(
    get,
    path = "/api/v1/patientadvocates",
    responses(
        (status = 200, description = "List of patient advocates", body = [dto::AdvocateRes])
    )
)]
/// List all patient advocates, in username order.
#[axum::debug_handler]
async fn list_advocates(State(state): State<AppState>) -> Json<Vec<dto::AdvocateRes>> {
    let advocates = state.advocates.list();
    Json(advocates.iter().map(advocate_res).collect())
}

#[utoipa::path(
    post,
    path = "/api/v1/patientadvocate",
    request_body = dto::AdvocateForm,
    responses(
        (status = 201, description = "Patient advocate created", body = dto::AdvocateRes),
        (status = 400, description = "Invalid username", body = dto::ErrorRes),
        (status = 409, description = "Username already taken", body = dto::ErrorRes)
    )
)]
/// Create a patient advocate account
///
/// The account is stored with the configured placeholder credential; real
/// credential provisioning is the identity store's concern.
///
/// # Errors
/// Returns `409 Conflict` if the username is taken by any existing account,
/// or `400 Bad Request` when the username fails validation.
#[axum::debug_handler]
async fn create_advocate(
    State(state): State<AppState>,
    Json(form): Json<dto::AdvocateForm>,
) -> Result<(StatusCode, Json<dto::AdvocateRes>), ApiError> {
    let username = parse_username(&form.username)?;
    let created = state
        .advocates
        .create(AdvocateForm {
            username,
            profile: advocate_profile(&form),
        })
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(advocate_res(&created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/patientadvocate/{id}",
    params(("id" = String, Path, description = "Advocate username")),
    responses(
        (status = 200, description = "Patient advocate", body = dto::AdvocateRes),
        (status = 404, description = "Advocate not found", body = dto::ErrorRes)
    )
)]
/// Look up one patient advocate by username.
#[axum::debug_handler]
async fn get_advocate(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<dto::AdvocateRes>, ApiError> {
    let username = parse_username(&id)?;
    let advocate = state.advocates.get(&username).map_err(error_response)?;
    Ok(Json(advocate_res(&advocate)))
}

#[utoipa::path(
    put,
    path = "/api/v1/patientadvocate/{id}",
    params(("id" = String, Path, description = "Advocate username")),
    request_body = dto::AdvocateForm,
    responses(
        (status = 200, description = "Patient advocate updated", body = dto::AdvocateRes),
        (status = 404, description = "Advocate not found", body = dto::ErrorRes)
    )
)]
/// Replace an advocate's profile fields
///
/// The username, roles, and patient list are untouched; the record is
/// identified by the path, and any username in the body is ignored.
#[axum::debug_handler]
async fn update_advocate(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
    Json(form): Json<dto::AdvocateForm>,
) -> Result<Json<dto::AdvocateRes>, ApiError> {
    let username = parse_username(&id)?;
    let updated = state
        .advocates
        .update(&username, advocate_profile(&form))
        .map_err(error_response)?;
    Ok(Json(advocate_res(&updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/patientadvocate/{id}",
    params(("id" = String, Path, description = "Advocate username")),
    responses(
        (status = 200, description = "Patient advocate deleted", body = dto::AdvocateRes),
        (status = 404, description = "Advocate not found", body = dto::ErrorRes)
    )
)]
/// Delete an advocate account
///
/// Every permission the advocate holds on any patient is removed with it.
/// Returns the record as it stood at deletion.
#[axum::debug_handler]
async fn delete_advocate(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<dto::AdvocateRes>, ApiError> {
    let username = parse_username(&id)?;
    let removed = state.advocates.delete(&username).map_err(error_response)?;
    Ok(Json(advocate_res(&removed)))
}

#[utoipa::path(
    post,
    path = "/api/v1/patientadvocate/{id}/patients/{patient_id}",
    params(
        ("id" = String, Path, description = "Advocate username"),
        ("patient_id" = String, Path, description = "Patient username")
    ),
    responses(
        (status = 201, description = "Association created", body = dto::AdvocateRes),
        (status = 404, description = "Patient or advocate not found", body = dto::ErrorRes)
    )
)]
/// Associate a patient with an advocate
///
/// Grants the advocate full access: a permission with all three visibility
/// flags set is appended on the patient side. No uniqueness check is made;
/// associating the same pair twice stores a second permission.
#[axum::debug_handler]
async fn associate_patient(
    State(state): State<AppState>,
    AxumPath((id, patient_id)): AxumPath<(String, String)>,
) -> Result<(StatusCode, Json<dto::AdvocateRes>), ApiError> {
    let advocate = parse_username(&id)?;
    let patient = parse_username(&patient_id)?;
    let updated = state
        .advocates
        .associate(&advocate, &patient)
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(advocate_res(&updated))))
}

#[utoipa::path(
    get,
    path = "/api/v1/patientadvocate/{id}/patients",
    params(("id" = String, Path, description = "Advocate username")),
    responses(
        (status = 200, description = "Associated patient usernames", body = [String]),
        (status = 404, description = "Advocate not found", body = dto::ErrorRes)
    )
)]
/// The usernames of the patients associated with an advocate, in grant order.
#[axum::debug_handler]
async fn advocate_patients(
    State(state): State<AppState>,
    AxumPath(id): AxumPath<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let username = parse_username(&id)?;
    let patients = state
        .advocates
        .associated_patients(&username)
        .map_err(error_response)?;
    Ok(Json(patients.iter().map(|p| p.to_string()).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients",
    responses(
        (status = 200, description = "List of patients", body = [dto::PatientRes])
    )
)]
/// List all patients, in username order.
#[axum::debug_handler]
async fn list_patients(State(state): State<AppState>) -> Json<Vec<dto::PatientRes>> {
    let patients = state.patients.list();
    Json(patients.iter().map(patient_res).collect())
}

#[utoipa::path(
    post,
    path = "/api/v1/patients",
    request_body = dto::PatientForm,
    responses(
        (status = 201, description = "Patient created", body = dto::PatientRes),
        (status = 400, description = "Invalid username or date", body = dto::ErrorRes),
        (status = 409, description = "Username already taken", body = dto::ErrorRes)
    )
)]
/// Create a patient account
///
/// # Errors
/// Returns `409 Conflict` if the username is taken by any existing account,
/// or `400 Bad Request` when the username or birth date fails validation.
#[axum::debug_handler]
async fn create_patient(
    State(state): State<AppState>,
    Json(form): Json<dto::PatientForm>,
) -> Result<(StatusCode, Json<dto::PatientRes>), ApiError> {
    let username = parse_username(&form.username)?;
    let profile = patient_profile(&form)?;
    let created = state
        .patients
        .create(PatientForm { username, profile })
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(patient_res(&created))))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{username}",
    params(("username" = String, Path, description = "Patient username")),
    responses(
        (status = 200, description = "Patient", body = dto::PatientRes),
        (status = 404, description = "Patient not found", body = dto::ErrorRes)
    )
)]
/// Look up one patient by username.
#[axum::debug_handler]
async fn get_patient(
    State(state): State<AppState>,
    AxumPath(username): AxumPath<String>,
) -> Result<Json<dto::PatientRes>, ApiError> {
    let username = parse_username(&username)?;
    let patient = state.patients.get(&username).map_err(error_response)?;
    Ok(Json(patient_res(&patient)))
}

#[utoipa::path(
    put,
    path = "/api/v1/patients/{username}",
    params(("username" = String, Path, description = "Patient username")),
    request_body = dto::PatientForm,
    responses(
        (status = 200, description = "Patient updated", body = dto::PatientRes),
        (status = 404, description = "Patient not found", body = dto::ErrorRes)
    )
)]
/// Replace a patient's demographic profile
///
/// The username, roles, and permission list are untouched.
#[axum::debug_handler]
async fn update_patient(
    State(state): State<AppState>,
    AxumPath(username): AxumPath<String>,
    Json(form): Json<dto::PatientForm>,
) -> Result<Json<dto::PatientRes>, ApiError> {
    let username = parse_username(&username)?;
    let profile = patient_profile(&form)?;
    let updated = state
        .patients
        .update(&username, profile)
        .map_err(error_response)?;
    Ok(Json(patient_res(&updated)))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{username}/permissions",
    params(("username" = String, Path, description = "Patient username")),
    responses(
        (status = 200, description = "Permissions held by the patient", body = [dto::PermissionRes]),
        (status = 404, description = "Patient not found", body = dto::ErrorRes)
    )
)]
/// A patient's permission records, in grant order.
#[axum::debug_handler]
async fn patient_permissions(
    State(state): State<AppState>,
    AxumPath(username): AxumPath<String>,
) -> Result<Json<Vec<dto::PermissionRes>>, ApiError> {
    let username = parse_username(&username)?;
    let permissions = state
        .patients
        .permissions(&username)
        .map_err(error_response)?;
    Ok(Json(permissions.iter().map(permission_res).collect()))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{username}/patientadvocate",
    params(("username" = String, Path, description = "Patient username")),
    responses(
        (status = 200, description = "Advocates with access to the patient", body = [dto::AdvocateRes]),
        (status = 404, description = "Patient not found", body = dto::ErrorRes)
    )
)]
/// The advocates granted access to a patient, resolved to full records
///
/// Permission entries whose advocate no longer resolves are skipped.
#[axum::debug_handler]
async fn patient_advocates(
    State(state): State<AppState>,
    AxumPath(username): AxumPath<String>,
) -> Result<Json<Vec<dto::AdvocateRes>>, ApiError> {
    let username = parse_username(&username)?;
    let advocates = state
        .patients
        .advocates_of(&username)
        .map_err(error_response)?;
    Ok(Json(advocates.iter().map(advocate_res).collect()))
}

#[utoipa::path(
    post,
    path = "/api/v1/patients/{username}/permissions/{advocate}",
    params(
        ("username" = String, Path, description = "Patient username"),
        ("advocate" = String, Path, description = "Advocate username")
    ),
    responses(
        (status = 201, description = "Permission granted", body = dto::PermissionRes),
        (status = 404, description = "Patient or advocate not found", body = dto::ErrorRes)
    )
)]
/// Grant an advocate full access to a patient
///
/// Equivalent to the advocate-side association endpoint, seen from the
/// patient side. Returns the created permission.
#[axum::debug_handler]
async fn grant_permission(
    State(state): State<AppState>,
    AxumPath((username, advocate)): AxumPath<(String, String)>,
) -> Result<(StatusCode, Json<dto::PermissionRes>), ApiError> {
    let patient = parse_username(&username)?;
    let advocate = parse_username(&advocate)?;
    let granted = state
        .patients
        .grant(&patient, &advocate)
        .map_err(error_response)?;
    Ok((StatusCode::CREATED, Json(permission_res(&granted))))
}

#[utoipa::path(
    get,
    path = "/api/v1/patients/{username}/permissions/{advocate}",
    params(
        ("username" = String, Path, description = "Patient username"),
        ("advocate" = String, Path, description = "Advocate username")
    ),
    responses(
        (status = 200, description = "Permission for the pair", body = dto::PermissionRes),
        (status = 404, description = "Patient or advocate not found", body = dto::ErrorRes),
        (status = 409, description = "No permission exists for the pair", body = dto::ErrorRes)
    )
)]
/// Read the permission stored for a (patient, advocate) pair
///
/// # Errors
/// Returns `404 Not Found` when either identity is missing and
/// `409 Conflict` when both resolve but no grant exists.
#[axum::debug_handler]
async fn get_permission(
    State(state): State<AppState>,
    AxumPath((username, advocate)): AxumPath<(String, String)>,
) -> Result<Json<dto::PermissionRes>, ApiError> {
    let patient = parse_username(&username)?;
    let advocate = parse_username(&advocate)?;
    let permission = state
        .patients
        .permission(&patient, &advocate)
        .map_err(error_response)?;
    Ok(Json(permission_res(&permission)))
}

#[utoipa::path(
    put,
    path = "/api/v1/patients/{username}/permissions/{advocate}",
    params(
        ("username" = String, Path, description = "Patient username"),
        ("advocate" = String, Path, description = "Advocate username")
    ),
    request_body = dto::PermissionForm,
    responses(
        (status = 200, description = "Permission updated", body = dto::PermissionRes),
        (status = 404, description = "Patient or advocate not found", body = dto::ErrorRes),
        (status = 409, description = "No permission exists for the pair", body = dto::ErrorRes)
    )
)]
/// Overwrite the visibility flags of a stored permission
///
/// Only the three flags change; the identifying pair never does. Updating an
/// absent permission fails without mutating anything.
#[axum::debug_handler]
async fn update_permission(
    State(state): State<AppState>,
    AxumPath((username, advocate)): AxumPath<(String, String)>,
    Json(form): Json<dto::PermissionForm>,
) -> Result<Json<dto::PermissionRes>, ApiError> {
    let patient = parse_username(&username)?;
    let advocate = parse_username(&advocate)?;
    let updated = state
        .patients
        .update_permission(
            &patient,
            &advocate,
            VisibilityFlags {
                office_visibility: form.office_visibility,
                billing_visibility: form.billing_visibility,
                prescription_visibility: form.prescription_visibility,
            },
        )
        .map_err(error_response)?;
    Ok(Json(permission_res(&updated)))
}

#[utoipa::path(
    delete,
    path = "/api/v1/patients/{username}/permissions/{advocate}",
    params(
        ("username" = String, Path, description = "Patient username"),
        ("advocate" = String, Path, description = "Advocate username")
    ),
    responses(
        (status = 204, description = "Permission revoked"),
        (status = 404, description = "Patient or advocate not found", body = dto::ErrorRes)
    )
)]
/// Revoke an advocate's access to a patient
///
/// Removes the first matching permission on the patient side and the
/// patient's entry on the advocate side. Revoking an absent grant is a
/// no-op once both identities resolve.
#[axum::debug_handler]
async fn revoke_permission(
    State(state): State<AppState>,
    AxumPath((username, advocate)): AxumPath<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let patient = parse_username(&username)?;
    let advocate = parse_username(&advocate)?;
    state
        .patients
        .revoke(&patient, &advocate)
        .map_err(error_response)?;
    Ok(StatusCode::NO_CONTENT)
}
