// libs/doctor-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use access_cell::models::Permission;
use access_cell::services::guard::ensure_permission;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::bearer_from_headers;

use crate::models::{CreateDoctorRequest, DoctorError, UpdateDoctorRequest};
use crate::services::doctor::DoctorService;

impl From<DoctorError> for AppError {
    fn from(err: DoctorError) -> Self {
        match err {
            DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
            DoctorError::ValidationError(msg) => AppError::Validation(msg),
            DoctorError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DoctorsQuery {
    pub cidade: Option<String>,
}

/// Public listing for the booking form: active doctors only.
pub async fn list_doctors(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<DoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    let service = DoctorService::new(&config);
    let doctors = service.list_doctors(query.cidade.as_deref(), true).await?;

    Ok(Json(json!({ "doctors": doctors })))
}

pub async fn get_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::DoctorsView, &token).await?;

    let service = DoctorService::new(&config);
    let doctor = service.get_doctor(&doctor_id, &token).await?;

    Ok(Json(json!(doctor)))
}

pub async fn create_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<CreateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::DoctorsCreate, &token).await?;

    let service = DoctorService::new(&config);
    let doctor = service.create_doctor(request, &token).await?;

    Ok(Json(json!(doctor)))
}

pub async fn update_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateDoctorRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::DoctorsEdit, &token).await?;

    let service = DoctorService::new(&config);
    let doctor = service.update_doctor(&doctor_id, request, &token).await?;

    Ok(Json(json!(doctor)))
}

pub async fn delete_doctor(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(doctor_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::DoctorsDelete, &token).await?;

    let service = DoctorService::new(&config);
    service.delete_doctor(&doctor_id, &token).await?;

    Ok(Json(json!({ "deleted": doctor_id })))
}
