// libs/auth-cell/src/services/login.rs
use tracing::{debug, info, warn};

use access_cell::services::evaluator::is_admin_role;
use access_cell::services::guard::fetch_user_record;
use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;
use shared_models::auth::LoginResponse;
use shared_models::error::AppError;

pub struct AdminLoginService {
    supabase: SupabaseClient,
}

impl AdminLoginService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Sign in against the auth provider, then gate on the `usuarios`
    /// record: only enabled, admin-equivalent accounts may hold a
    /// session. Anyone else is signed straight back out.
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, AppError> {
        debug!("Login attempt for {}", email);

        let session = self.supabase.sign_in(email, password)
            .await
            .map_err(|e| {
                debug!("Sign-in rejected for {}: {}", email, e);
                AppError::Auth("Invalid email or password".to_string())
            })?;

        let access_token = session["access_token"].as_str()
            .ok_or_else(|| AppError::ExternalService("Auth provider returned no access token".to_string()))?
            .to_string();
        let user_id = session["user"]["id"].as_str()
            .ok_or_else(|| AppError::ExternalService("Auth provider returned no user id".to_string()))?
            .to_string();

        let record = match fetch_user_record(&self.supabase, &user_id, &access_token).await {
            Ok(record) => record,
            Err(e) => {
                self.sign_out_quietly(&access_token).await;
                return Err(e);
            }
        };

        if !is_admin_role(&record.role) {
            warn!("Login denied for {}: role {} is not an administrator", email, record.role);
            self.sign_out_quietly(&access_token).await;
            return Err(AppError::Auth("Access restricted to administrators".to_string()));
        }

        if record.disabled {
            warn!("Login denied for {}: account disabled", email);
            self.sign_out_quietly(&access_token).await;
            return Err(AppError::Auth("Account is disabled".to_string()));
        }

        info!("Administrator {} signed in", email);
        Ok(LoginResponse {
            access_token,
            user_id,
            email: Some(record.email),
            role: record.role,
        })
    }

    async fn sign_out_quietly(&self, access_token: &str) {
        if let Err(e) = self.supabase.sign_out(access_token).await {
            warn!("Failed to terminate rejected session: {}", e);
        }
    }
}
