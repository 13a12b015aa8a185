// libs/access-cell/src/handlers.rs
use std::sync::Arc;

use axum::{
    extract::{Extension, Path, State},
    http::HeaderMap,
    Json,
};
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_utils::extractor::bearer_from_headers;

use crate::models::{AccessError, CreateUserRequest, Permission, Role, UpdateUserRequest};
use crate::services::guard::ensure_permission;
use crate::services::users::UserManagementService;

impl From<AccessError> for AppError {
    fn from(err: AccessError) -> Self {
        match err {
            AccessError::NotFound => AppError::NotFound("User not found".to_string()),
            AccessError::UnknownRole(role) => AppError::Validation(format!("Unknown role: {}", role)),
            AccessError::ValidationError(msg) => AppError::Validation(msg),
            AccessError::DatabaseError(msg) => AppError::Database(msg),
            AccessError::AuthProviderError(msg) => AppError::ExternalService(msg),
        }
    }
}

pub async fn list_users(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::UsersView, &token).await?;

    let service = UserManagementService::new(&config);
    let users = service.list_users(&token).await?;

    Ok(Json(json!({ "users": users })))
}

pub async fn get_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::UsersView, &token).await?;

    let service = UserManagementService::new(&config);
    let record = service.get_user(&user_id, &token).await?;

    Ok(Json(json!(record)))
}

pub async fn create_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
    Json(request): Json<CreateUserRequest>,
) -> Result<Json<Value>, AppError> {
    debug!("Creating user {}", request.email);

    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::UsersCreate, &token).await?;

    let service = UserManagementService::new(&config);
    let record = service.create_user(request, &token).await?;

    Ok(Json(json!(record)))
}

pub async fn update_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<UpdateUserRequest>,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);

    // Changing roles requires the role-management grant on top of edit.
    let needed = if request.role.is_some() {
        Permission::RolesManage
    } else {
        Permission::UsersEdit
    };
    ensure_permission(&supabase, &user, needed, &token).await?;

    let service = UserManagementService::new(&config);
    let record = service.update_user(&user_id, request, &token).await?;

    Ok(Json(json!(record)))
}

pub async fn delete_user(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Path(user_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::UsersDelete, &token).await?;

    if user.id == user_id {
        return Err(AppError::Validation("Cannot delete your own account".to_string()));
    }

    let service = UserManagementService::new(&config);
    service.delete_user(&user_id, &token).await?;

    Ok(Json(json!({ "deleted": user_id })))
}

/// Static role table, for the admin UI.
pub async fn list_roles(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
) -> Result<Json<Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);
    ensure_permission(&supabase, &user, Permission::UsersView, &token).await?;

    Ok(Json(json!({ "roles": Role::all_definitions() })))
}
