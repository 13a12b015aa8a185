// libs/scheduling-cell/src/services/config.rs
use reqwest::Method;
use serde_json::{json, Value};
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{ScheduleConfig, SchedulingError, UpsertScheduleConfigRequest};
use crate::services::slots::slot_minutes;

pub struct ScheduleConfigService {
    supabase: SupabaseClient,
}

impl ScheduleConfigService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn get_config(
        &self,
        cidade_id: &str,
        auth_token: &str,
    ) -> Result<ScheduleConfig, SchedulingError> {
        let path = format!(
            "/rest/v1/scheduleConfigs?cidade_id=eq.{}",
            urlencoding::encode(cidade_id)
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let config = result.into_iter().next()
            .ok_or_else(|| SchedulingError::ConfigNotFound(cidade_id.to_string()))?;

        serde_json::from_value(config)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse schedule config: {}", e)))
    }

    /// Create or replace the city's schedule. One config per city, keyed
    /// by `cidade_id`.
    pub async fn upsert_config(
        &self,
        cidade_id: &str,
        request: UpsertScheduleConfigRequest,
        auth_token: &str,
    ) -> Result<ScheduleConfig, SchedulingError> {
        debug!("Upserting schedule config for {}", cidade_id);

        if request.intervalo <= 0 {
            return Err(SchedulingError::InvalidInterval(request.intervalo));
        }
        for bound in [
            &request.horarios.manha_inicio,
            &request.horarios.manha_fim,
            &request.horarios.tarde_inicio,
            &request.horarios.tarde_fim,
        ] {
            slot_minutes(bound)?;
        }

        let row = json!({
            "cidade_id": cidade_id,
            "periodo_manha": request.periodo_manha,
            "periodo_tarde": request.periodo_tarde,
            "horarios": request.horarios,
            "intervalo": request.intervalo,
        });

        let result = self.supabase
            .bulk_upsert("scheduleConfigs", vec![row], "cidade_id", Some(auth_token))
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let saved = result.into_iter().next()
            .ok_or_else(|| SchedulingError::DatabaseError("Upsert returned no row".to_string()))?;

        serde_json::from_value(saved)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse schedule config: {}", e)))
    }
}
