// libs/financial-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};

use access_cell::models::Permission;
use access_cell::services::guard::ensure_permission;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::bearer_from_headers;

use crate::models::{CreateRecordRequest, FinancialError, RecordsQuery, UpdateRecordRequest};
use crate::services::records::FinancialRecordService;

impl From<FinancialError> for AppError {
    fn from(err: FinancialError) -> Self {
        match err {
            FinancialError::NotFound => AppError::NotFound("Record not found".to_string()),
            FinancialError::ValidationError(msg) => AppError::Validation(msg),
            FinancialError::DatabaseError(msg) => AppError::Database(msg),
        }
    }
}

pub async fn list_records(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<RecordsQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::FinancialView, &token).await?;

    let service = FinancialRecordService::new(&config);
    let records = service.list_records(&query, &token).await?;

    Ok(Json(json!({ "records": records })))
}

/// Totals for the reports screen; the PDF itself is rendered client-side.
pub async fn get_summary(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Query(query): Query<RecordsQuery>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::FinancialReports, &token).await?;

    let service = FinancialRecordService::new(&config);
    let summary = service.summary(&query, &token).await?;

    Ok(Json(json!(summary)))
}

pub async fn create_record(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<CreateRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::FinancialCreate, &token).await?;

    let service = FinancialRecordService::new(&config);
    let record = service.create_record(request, &token).await?;

    Ok(Json(json!(record)))
}

pub async fn update_record(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(record_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateRecordRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::FinancialEdit, &token).await?;

    let service = FinancialRecordService::new(&config);
    let record = service.update_record(&record_id, request, &token).await?;

    Ok(Json(json!(record)))
}

pub async fn delete_record(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(record_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::FinancialDelete, &token).await?;

    let service = FinancialRecordService::new(&config);
    service.delete_record(&record_id, &token).await?;

    Ok(Json(json!({ "deleted": record_id })))
}
