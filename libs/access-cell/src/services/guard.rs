// libs/access-cell/src/services/guard.rs
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_database::supabase::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{Permission, UserRecord};
use crate::services::evaluator::user_has_permission;

/// Resolve the authenticated principal against `usuarios` and require a
/// permission. The JWT only proves identity; the stored record is what
/// carries role and overrides.
pub async fn ensure_permission(
    supabase: &SupabaseClient,
    user: &User,
    permission: Permission,
    auth_token: &str,
) -> Result<UserRecord, AppError> {
    let record = fetch_user_record(supabase, &user.id, auth_token).await?;

    if record.disabled {
        return Err(AppError::Auth("Account is disabled".to_string()));
    }

    if !user_has_permission(&record, permission) {
        debug!("User {} denied permission {}", user.id, permission);
        return Err(AppError::Auth(format!("Missing permission: {}", permission)));
    }

    Ok(record)
}

pub async fn fetch_user_record(
    supabase: &SupabaseClient,
    user_id: &str,
    auth_token: &str,
) -> Result<UserRecord, AppError> {
    let path = format!("/rest/v1/usuarios?id=eq.{}", user_id);
    let result: Vec<Value> = supabase
        .request(Method::GET, &path, Some(auth_token), None)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let record = result
        .into_iter()
        .next()
        .ok_or_else(|| AppError::Auth("No user record for this account".to_string()))?;

    serde_json::from_value(record)
        .map_err(|e| AppError::Database(format!("Failed to parse user record: {}", e)))
}
