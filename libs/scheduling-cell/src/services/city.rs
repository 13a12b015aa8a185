// libs/scheduling-cell/src/services/city.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{City, CreateCityRequest, SchedulingError, UpdateCityRequest};

pub struct CityService {
    supabase: SupabaseClient,
}

impl CityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_cities(&self, only_active: bool) -> Result<Vec<City>, SchedulingError> {
        let mut path = "/rest/v1/cidades?order=nome.asc".to_string();
        if only_active {
            path.push_str("&ativa=eq.true");
        }

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<City>, _>>()
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse cities: {}", e)))
    }

    pub async fn create_city(
        &self,
        request: CreateCityRequest,
        auth_token: &str,
    ) -> Result<City, SchedulingError> {
        if request.nome.trim().is_empty() {
            return Err(SchedulingError::ValidationError("nome is required".to_string()));
        }

        info!("Creating city {}", request.nome);

        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "nome": request.nome,
            "estado": request.estado,
            "ativa": true,
        });

        let result: Vec<Value> = self.supabase
            .insert_returning("cidades", row, Some(auth_token))
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let created = result.into_iter().next()
            .ok_or_else(|| SchedulingError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(created)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse city: {}", e)))
    }

    pub async fn update_city(
        &self,
        city_id: &str,
        request: UpdateCityRequest,
        auth_token: &str,
    ) -> Result<City, SchedulingError> {
        let mut patch = serde_json::Map::new();
        if let Some(nome) = request.nome {
            patch.insert("nome".to_string(), json!(nome));
        }
        if let Some(estado) = request.estado {
            patch.insert("estado".to_string(), json!(estado));
        }
        if let Some(ativa) = request.ativa {
            patch.insert("ativa".to_string(), json!(ativa));
        }

        let path = format!("/rest/v1/cidades?id=eq.{}", city_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(patch)),
            Some(headers),
        ).await.map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let updated = result.into_iter().next().ok_or(SchedulingError::NotFound)?;
        serde_json::from_value(updated)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse city: {}", e)))
    }

    pub async fn delete_city(&self, city_id: &str, auth_token: &str) -> Result<(), SchedulingError> {
        let path = format!("/rest/v1/cidades?id=eq.{}", city_id);
        self.supabase.execute(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
