use anyhow::Result;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method,
};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// Non-success response from the store, kept typed so call sites can
/// branch on the status code (e.g. 409 on the booking unique index).
#[derive(Debug, Error)]
#[error("API error ({status}): {message}")]
pub struct ApiStatusError {
    pub status: u16,
    pub message: String,
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> HeaderMap {
        let mut headers = HeaderMap::new();

        headers.insert("apikey", HeaderValue::from_str(&self.anon_key).unwrap());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Unauthenticated requests still carry the anon key as bearer
        let bearer = auth_token.unwrap_or(&self.anon_key);
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", bearer)).unwrap()
        );

        headers
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let mut headers = self.get_headers(auth_token);
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(ApiStatusError {
                status: status.as_u16(),
                message: error_text,
            }.into());
        }

        let data = response.json::<T>().await?;
        Ok(data)
    }

    /// Fire a request where no response body is expected (deletes and
    /// fire-and-forget patches answer 204).
    pub async fn execute(&self, method: Method, path: &str,
                         auth_token: Option<&str>, body: Option<Value>) -> Result<()> {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making request to {}", url);

        let headers = self.get_headers(auth_token);
        let mut req = self.client.request(method, &url).headers(headers);
        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);

            return Err(ApiStatusError {
                status: status.as_u16(),
                message: error_text,
            }.into());
        }

        Ok(())
    }

    /// Insert returning the created row(s).
    pub async fn insert_returning<T>(&self, table: &str, row: Value,
                                     auth_token: Option<&str>) -> Result<T>
    where T: DeserializeOwned {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));

        self.request_with_headers(
            Method::POST,
            &format!("/rest/v1/{}", table),
            auth_token,
            Some(row),
            Some(headers),
        ).await
    }

    /// Upsert a batch of rows in a single statement. PostgREST applies the
    /// whole payload atomically, which is what the date sweep relies on.
    pub async fn bulk_upsert(&self, table: &str, rows: Vec<Value>,
                             on_conflict: &str, auth_token: Option<&str>) -> Result<Vec<Value>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );

        self.request_with_headers(
            Method::POST,
            &format!("/rest/v1/{}?on_conflict={}", table, on_conflict),
            auth_token,
            Some(Value::Array(rows)),
            Some(headers),
        ).await
    }

    // ==========================================================================
    // AUTH PROVIDER (narrow interface over Supabase GoTrue)
    // ==========================================================================

    /// Password sign-in. Returns the session payload (access_token, user).
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Value> {
        self.request(
            Method::POST,
            "/auth/v1/token?grant_type=password",
            None,
            Some(json!({ "email": email, "password": password })),
        ).await
    }

    /// Terminate the session behind the given access token.
    pub async fn sign_out(&self, access_token: &str) -> Result<()> {
        self.execute(Method::POST, "/auth/v1/logout", Some(access_token), None).await
    }

    /// Create an auth user. Returns the new user payload with its id.
    pub async fn create_auth_user(&self, email: &str, password: &str,
                                  auth_token: &str) -> Result<Value> {
        self.request(
            Method::POST,
            "/auth/v1/admin/users",
            Some(auth_token),
            Some(json!({ "email": email, "password": password, "email_confirm": true })),
        ).await
    }

    /// Delete an auth user by id.
    pub async fn delete_auth_user(&self, user_id: &str, auth_token: &str) -> Result<()> {
        self.execute(
            Method::DELETE,
            &format!("/auth/v1/admin/users/{}", user_id),
            Some(auth_token),
            None,
        ).await
    }

    pub fn get_base_url(&self) -> &str {
        &self.base_url
    }
}
