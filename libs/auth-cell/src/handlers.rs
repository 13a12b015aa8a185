use std::sync::Arc;

use axum::{
    extract::{Extension, State, Json},
    http::HeaderMap,
};
use serde_json::json;
use tracing::debug;

use access_cell::services::guard::fetch_user_record;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::{LoginRequest, LoginResponse, TokenResponse, User};
use shared_models::error::AppError;
use shared_utils::jwt::validate_token as check_token;
use shared_utils::extractor::bearer_from_headers;

use crate::services::login::AdminLoginService;

/// Admin panel sign-in. Non-admin and disabled accounts are signed back
/// out before an error is returned.
pub async fn login(
    State(config): State<Arc<AppConfig>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let service = AdminLoginService::new(&config);
    let response = service.login(&request.email, &request.password).await?;
    Ok(Json(response))
}

pub async fn validate_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<TokenResponse>, AppError> {
    debug!("Validating token");

    let token = bearer_from_headers(&headers)?;

    match check_token(&token, &config.supabase_jwt_secret) {
        Ok(user) => {
            let response = TokenResponse {
                valid: true,
                user_id: user.id,
                email: user.email,
                role: user.role,
            };

            Ok(Json(response))
        },
        Err(err) => {
            Err(AppError::Auth(err))
        }
    }
}

pub async fn verify_token(
    State(config): State<Arc<AppConfig>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    debug!("Verifying token");

    let token = bearer_from_headers(&headers)?;

    match check_token(&token, &config.supabase_jwt_secret) {
        Ok(_) => Ok(Json(json!({ "valid": true }))),
        Err(_) => Ok(Json(json!({ "valid": false }))),
    }
}

/// The signed-in user's own `usuarios` record, for the admin UI shell.
pub async fn me(
    State(config): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, AppError> {
    let token = bearer_from_headers(&headers)?;
    let supabase = SupabaseClient::new(&config);

    let record = fetch_user_record(&supabase, &user.id, &token).await?;

    Ok(Json(json!(record)))
}
