// libs/appointment-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use access_cell::models::Permission;
use access_cell::services::guard::ensure_permission;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::bearer_from_headers;

use crate::models::{
    AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    CreateAppointmentRequest, UpdateAppointmentRequest,
};
use crate::services::booking::AppointmentBookingService;
use crate::services::notification::WebhookNotificationService;

impl From<AppointmentError> for AppError {
    fn from(err: AppointmentError) -> Self {
        match err {
            AppointmentError::NotFound => AppError::NotFound("Appointment not found".to_string()),
            AppointmentError::SlotUnavailable { .. } => AppError::SlotUnavailable(err.to_string()),
            AppointmentError::ValidationError(msg) => AppError::Validation(msg),
            AppointmentError::InvalidStatusTransition { .. } => AppError::Validation(err.to_string()),
            AppointmentError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

/// Public booking form submission. Always lands as `pendente`; the
/// notification webhook fires after the write and never fails the booking.
pub async fn create_appointment(
    State(config): State<Arc<AppConfig>>,
    Json(mut request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Booking request for {} on {} at {}", request.cidade, request.data, request.horario);

    // The public form cannot pick its own status.
    request.status = Some(AppointmentStatus::Pendente);

    let service = AppointmentBookingService::new(&config);
    let appointment = service.create_appointment(request).await?;

    let notifier = WebhookNotificationService::new(&config);
    notifier.notify_created(&appointment).await;

    Ok(Json(json!(appointment)))
}

#[derive(Debug, Deserialize)]
pub struct CheckAvailabilityQuery {
    pub cidade: String,
    pub data: String,
    pub horario: String,
}

/// Pre-submit check used by the booking form.
pub async fn check_availability(
    State(config): State<Arc<AppConfig>>,
    Query(query): Query<CheckAvailabilityQuery>,
) -> Result<Json<Value>, AppError> {
    let service = AppointmentBookingService::new(&config);
    let available = service
        .check_time_availability(&query.cidade, &query.data, &query.horario)
        .await?;

    Ok(Json(json!({ "available": available })))
}

pub async fn search_appointments(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<AppointmentSearchQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::AppointmentsView, &token).await?;

    let service = AppointmentBookingService::new(&config);
    let appointments = service.search_appointments(&query, &token).await?;

    Ok(Json(json!({ "appointments": appointments })))
}

pub async fn get_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::AppointmentsView, &token).await?;

    let service = AppointmentBookingService::new(&config);
    let appointment = service.get_appointment(&appointment_id, &token).await?;

    Ok(Json(json!(appointment)))
}

/// Staff creation path: requires the create grant and may set an initial
/// status (e.g. walk-ins recorded directly as `confirmado`).
pub async fn create_appointment_admin(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<CreateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::AppointmentsCreate, &token).await?;

    let service = AppointmentBookingService::new(&config);
    let appointment = service.create_appointment(request).await?;

    let notifier = WebhookNotificationService::new(&config);
    notifier.notify_created(&appointment).await;

    Ok(Json(json!(appointment)))
}

pub async fn update_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateAppointmentRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::AppointmentsEdit, &token).await?;

    let service = AppointmentBookingService::new(&config);
    let appointment = service.update_appointment(&appointment_id, request, &token).await?;

    Ok(Json(json!(appointment)))
}

pub async fn delete_appointment(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(appointment_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::AppointmentsDelete, &token).await?;

    let service = AppointmentBookingService::new(&config);
    service.delete_appointment(&appointment_id, &token).await?;

    Ok(Json(json!({ "deleted": appointment_id })))
}
