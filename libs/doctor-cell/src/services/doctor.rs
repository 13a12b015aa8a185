// libs/doctor-cell/src/services/doctor.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{CreateDoctorRequest, Doctor, DoctorError, UpdateDoctorRequest};

pub struct DoctorService {
    supabase: SupabaseClient,
}

impl DoctorService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Doctors for the booking form and listings. Optionally narrowed to
    /// one city.
    pub async fn list_doctors(
        &self,
        cidade: Option<&str>,
        only_active: bool,
    ) -> Result<Vec<Doctor>, DoctorError> {
        let mut path = "/rest/v1/medicos?order=nome.asc".to_string();
        if only_active {
            path.push_str("&ativo=eq.true");
        }
        if let Some(cidade) = cidade {
            path.push_str(&format!("&cidades=cs.{{{}}}", urlencoding::encode(cidade)));
        }

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Doctor>, _>>()
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctors: {}", e)))
    }

    pub async fn get_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<Doctor, DoctorError> {
        debug!("Fetching doctor {}", doctor_id);

        let path = format!("/rest/v1/medicos?id=eq.{}", doctor_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let record = result.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(record)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn create_doctor(
        &self,
        request: CreateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        if request.nome.trim().is_empty() {
            return Err(DoctorError::ValidationError("nome is required".to_string()));
        }

        info!("Creating doctor {}", request.nome);

        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "nome": request.nome,
            "especialidade": request.especialidade,
            "cidades": request.cidades.unwrap_or_default(),
            "ativo": true,
        });

        let result: Vec<Value> = self.supabase
            .insert_returning("medicos", row, Some(auth_token))
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let created = result.into_iter().next()
            .ok_or_else(|| DoctorError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(created)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn update_doctor(
        &self,
        doctor_id: &str,
        request: UpdateDoctorRequest,
        auth_token: &str,
    ) -> Result<Doctor, DoctorError> {
        let mut patch = serde_json::Map::new();
        if let Some(nome) = request.nome {
            patch.insert("nome".to_string(), json!(nome));
        }
        if let Some(especialidade) = request.especialidade {
            patch.insert("especialidade".to_string(), json!(especialidade));
        }
        if let Some(cidades) = request.cidades {
            patch.insert("cidades".to_string(), json!(cidades));
        }
        if let Some(ativo) = request.ativo {
            patch.insert("ativo".to_string(), json!(ativo));
        }

        let path = format!("/rest/v1/medicos?id=eq.{}", doctor_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(patch)),
            Some(headers),
        ).await.map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        let updated = result.into_iter().next().ok_or(DoctorError::NotFound)?;
        serde_json::from_value(updated)
            .map_err(|e| DoctorError::DatabaseError(format!("Failed to parse doctor: {}", e)))
    }

    pub async fn delete_doctor(&self, doctor_id: &str, auth_token: &str) -> Result<(), DoctorError> {
        info!("Deleting doctor {}", doctor_id);

        let path = format!("/rest/v1/medicos?id=eq.{}", doctor_id);
        self.supabase.execute(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| DoctorError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}
