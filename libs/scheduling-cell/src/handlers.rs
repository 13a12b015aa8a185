// libs/scheduling-cell/src/handlers.rs
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

use crate::models::{
    AvailabilityResponse, CreateCityRequest, CreateDateRequest, SchedulingError,
    UpdateCityRequest, UpdateDateRequest, UpsertScheduleConfigRequest,
};
use crate::services::availability::AvailabilityService;
use crate::services::city::CityService;
use crate::services::config::ScheduleConfigService;
use crate::services::dates::AvailableDatesService;

impl From<SchedulingError> for AppError {
    fn from(err: SchedulingError) -> Self {
        match err {
            SchedulingError::NotFound => AppError::NotFound("Record not found".to_string()),
            SchedulingError::ConfigNotFound(cidade) => {
                AppError::NotFound(format!("No schedule configuration for city {}", cidade))
            }
            SchedulingError::InvalidInterval(i) => {
                AppError::Validation(format!("Invalid slot interval: {}", i))
            }
            SchedulingError::InvalidTime(t) => AppError::Validation(format!("Invalid time: {}", t)),
            SchedulingError::ValidationError(msg) => AppError::Validation(msg),
            SchedulingError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

// ==============================================================================
// PUBLIC (booking form)
// ==============================================================================

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub cidade: String,
    pub data: String,
}

pub async fn get_availability(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    let service = AvailabilityService::new(&config);
    let horarios = service.available_times(&query.cidade, &query.data).await?;

    Ok(Json(AvailabilityResponse {
        cidade: query.cidade,
        data: query.data,
        horarios,
    }))
}

pub async fn list_cities(
    State(config): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = CityService::new(&config);
    let cities = service.list_cities(true).await?;

    Ok(Json(json!({ "cities": cities })))
}

#[derive(Debug, Deserialize)]
pub struct DatesQuery {
    pub cidade: Option<String>,
}

pub async fn list_dates(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<DatesQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AvailableDatesService::new(&config);
    let dates = service.list_dates(query.cidade.as_deref(), None).await?;

    Ok(Json(json!({ "dates": dates })))
}

// ==============================================================================
// PROTECTED (admin UI)
// ==============================================================================

pub async fn create_date(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<CreateDateRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::DatesCreate, &token).await?;

    let service = AvailableDatesService::new(&config);
    let date = service.create_date(request, &token).await?;

    Ok(Json(json!(date)))
}

pub async fn update_date(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(date_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateDateRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::DatesEdit, &token).await?;

    let service = AvailableDatesService::new(&config);
    let date = service.update_date(&date_id, request, &token).await?;

    Ok(Json(json!(date)))
}

pub async fn delete_date(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(date_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::DatesDelete, &token).await?;

    let service = AvailableDatesService::new(&config);
    service.delete_date(&date_id, &token).await?;

    Ok(Json(json!({ "deleted": date_id })))
}

/// Daily sweep entry point, hit by the external job runner.
pub async fn sweep_dates(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::DatesEdit, &token).await?;

    let service = AvailableDatesService::new(&config);
    let summary = service.sweep_past_dates(&token).await?;

    Ok(Json(json!(summary)))
}

pub async fn get_schedule_config(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(cidade_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::ScheduleView, &token).await?;

    let service = ScheduleConfigService::new(&config);
    let schedule = service.get_config(&cidade_id, &token).await?;

    Ok(Json(json!(schedule)))
}

pub async fn upsert_schedule_config(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(cidade_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpsertScheduleConfigRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::ScheduleEdit, &token).await?;

    let service = ScheduleConfigService::new(&config);
    let schedule = service.upsert_config(&cidade_id, request, &token).await?;

    Ok(Json(json!(schedule)))
}

pub async fn create_city(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<CreateCityRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::CitiesCreate, &token).await?;

    let service = CityService::new(&config);
    let city = service.create_city(request, &token).await?;

    Ok(Json(json!(city)))
}

pub async fn update_city(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(city_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateCityRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::CitiesEdit, &token).await?;

    let service = CityService::new(&config);
    let city = service.update_city(&city_id, request, &token).await?;

    Ok(Json(json!(city)))
}

pub async fn delete_city(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(city_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::CitiesDelete, &token).await?;

    let service = CityService::new(&config);
    service.delete_city(&city_id, &token).await?;

    Ok(Json(json!({ "deleted": city_id })))
}
