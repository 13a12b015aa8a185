// libs/access-cell/src/services/users.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AccessError, CreateUserRequest, Permission, Role, UpdateUserRequest, UserRecord,
};
use crate::services::evaluator::is_admin_role;

pub struct UserManagementService {
    supabase: SupabaseClient,
}

impl UserManagementService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_users(&self, auth_token: &str) -> Result<Vec<UserRecord>, AccessError> {
        debug!("Listing users");

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            "/rest/v1/usuarios?order=email.asc",
            Some(auth_token),
            None,
        ).await.map_err(|e| AccessError::DatabaseError(e.to_string()))?;

        let mut users: Vec<UserRecord> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<UserRecord>, _>>()
            .map_err(|e| AccessError::DatabaseError(format!("Failed to parse users: {}", e)))?;

        // Admins are presented with the full permission set even when the
        // stored list is stale or partial.
        for user in &mut users {
            if is_admin_role(&user.role) {
                user.permissions = Some(full_permission_tokens());
            }
        }

        Ok(users)
    }

    pub async fn get_user(&self, user_id: &str, auth_token: &str) -> Result<UserRecord, AccessError> {
        let path = format!("/rest/v1/usuarios?id=eq.{}", user_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AccessError::DatabaseError(e.to_string()))?;

        let record = result.into_iter().next().ok_or(AccessError::NotFound)?;
        let mut user: UserRecord = serde_json::from_value(record)
            .map_err(|e| AccessError::DatabaseError(format!("Failed to parse user: {}", e)))?;

        if is_admin_role(&user.role) {
            user.permissions = Some(full_permission_tokens());
        }

        Ok(user)
    }

    /// Create the auth account and the matching `usuarios` record.
    pub async fn create_user(
        &self,
        request: CreateUserRequest,
        auth_token: &str,
    ) -> Result<UserRecord, AccessError> {
        if request.email.trim().is_empty() {
            return Err(AccessError::ValidationError("email is required".to_string()));
        }
        if Role::parse(&request.role).is_none() {
            return Err(AccessError::UnknownRole(request.role));
        }

        info!("Creating user {}", request.email);

        let created = self.supabase
            .create_auth_user(&request.email, &request.password, auth_token)
            .await
            .map_err(|e| AccessError::AuthProviderError(e.to_string()))?;

        let uid = created["id"].as_str()
            .ok_or_else(|| AccessError::AuthProviderError("Auth user has no id".to_string()))?
            .to_string();

        let permissions = resolve_permissions(&request.role, request.permissions.as_deref());
        let row = json!({
            "id": uid.clone(),
            "email": request.email,
            "nome": request.nome,
            "role": request.role,
            "permissions": permissions,
            "disabled": false,
        });

        let result: Result<Vec<Value>, _> = self.supabase
            .insert_returning("usuarios", row, Some(auth_token))
            .await;

        let rows = match result {
            Ok(rows) => rows,
            Err(e) => {
                // Best effort: do not leave an orphan auth account behind.
                if let Err(cleanup) = self.supabase.delete_auth_user(&uid, auth_token).await {
                    warn!("Failed to clean up auth user {} after store error: {}", uid, cleanup);
                }
                return Err(AccessError::DatabaseError(e.to_string()));
            }
        };

        let record = rows.into_iter().next()
            .ok_or_else(|| AccessError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(record)
            .map_err(|e| AccessError::DatabaseError(format!("Failed to parse user: {}", e)))
    }

    /// Patch a `usuarios` record. Whenever the resulting role is
    /// admin-equivalent the persisted permission list is forced to the full
    /// set, so a partial list can never be saved for an administrator.
    pub async fn update_user(
        &self,
        user_id: &str,
        request: UpdateUserRequest,
        auth_token: &str,
    ) -> Result<UserRecord, AccessError> {
        let current = self.get_user(user_id, auth_token).await?;

        let resulting_role = request.role.as_deref().unwrap_or(&current.role);
        if Role::parse(resulting_role).is_none() {
            return Err(AccessError::UnknownRole(resulting_role.to_string()));
        }

        let mut patch = serde_json::Map::new();
        if let Some(nome) = request.nome {
            patch.insert("nome".to_string(), json!(nome));
        }
        if let Some(role) = &request.role {
            patch.insert("role".to_string(), json!(role));
        }
        if let Some(disabled) = request.disabled {
            patch.insert("disabled".to_string(), json!(disabled));
        }

        if is_admin_role(resulting_role) {
            patch.insert("permissions".to_string(), json!(full_permission_tokens()));
        } else if let Some(permissions) = request.permissions {
            patch.insert("permissions".to_string(), json!(permissions));
        } else if request.role.is_some() {
            // Role changed without an explicit list: fall back to the new
            // role's defaults instead of keeping the old override.
            patch.insert(
                "permissions".to_string(),
                json!(resolve_permissions(resulting_role, None)),
            );
        }

        let path = format!("/rest/v1/usuarios?id=eq.{}", user_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(patch)),
            Some(headers),
        ).await.map_err(|e| AccessError::DatabaseError(e.to_string()))?;

        let record = result.into_iter().next().ok_or(AccessError::NotFound)?;
        serde_json::from_value(record)
            .map_err(|e| AccessError::DatabaseError(format!("Failed to parse user: {}", e)))
    }

    /// Remove the `usuarios` record and the auth account.
    pub async fn delete_user(&self, user_id: &str, auth_token: &str) -> Result<(), AccessError> {
        info!("Deleting user {}", user_id);

        let path = format!("/rest/v1/usuarios?id=eq.{}", user_id);
        self.supabase.execute(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| AccessError::DatabaseError(e.to_string()))?;

        self.supabase.delete_auth_user(user_id, auth_token)
            .await
            .map_err(|e| AccessError::AuthProviderError(e.to_string()))?;

        Ok(())
    }
}

fn full_permission_tokens() -> Vec<String> {
    Permission::ALL.iter().map(|p| p.to_string()).collect()
}

/// Permission list to persist for a new or re-roled user: administrators
/// always get the complete set; others get the explicit list when given,
/// or their role defaults.
fn resolve_permissions(role: &str, explicit: Option<&[String]>) -> Vec<String> {
    if is_admin_role(role) {
        return full_permission_tokens();
    }
    if let Some(explicit) = explicit {
        return explicit.to_vec();
    }
    match Role::parse(role) {
        Some(role) => role.definition().permissions.iter().map(|p| p.to_string()).collect(),
        None => vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_persisted_permissions_are_always_complete() {
        let partial = vec!["users:view".to_string()];
        assert_eq!(resolve_permissions("admin", Some(&partial)), full_permission_tokens());
        assert_eq!(resolve_permissions("ADMINISTRADOR", None), full_permission_tokens());
    }

    #[test]
    fn non_admin_keeps_explicit_list() {
        let explicit = vec!["financial:view".to_string()];
        assert_eq!(resolve_permissions("financeiro", Some(&explicit)), explicit);
    }

    #[test]
    fn non_admin_defaults_to_role_table() {
        let defaults = resolve_permissions("medico", None);
        assert!(defaults.contains(&"appointments:view".to_string()));
        assert!(!defaults.contains(&"users:view".to_string()));
    }
}
