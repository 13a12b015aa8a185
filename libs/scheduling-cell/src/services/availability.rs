// libs/scheduling-cell/src/services/availability.rs
use std::collections::HashSet;

use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{AvailabilityFetchFailurePolicy, ScheduleConfig, SchedulingError};
use crate::services::slots::{filter_available, generate_slots, sort_chronological};

pub struct AvailabilityService {
    supabase: SupabaseClient,
    fetch_failure_policy: AvailabilityFetchFailurePolicy,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            fetch_failure_policy: AvailabilityFetchFailurePolicy::FailOpen,
        }
    }

    /// Free slots for a city on one date: generate from the city's
    /// schedule configuration, subtract booked times, return in
    /// chronological order.
    pub async fn available_times(
        &self,
        cidade: &str,
        data: &str,
    ) -> Result<Vec<String>, SchedulingError> {
        debug!("Computing available times for {} on {}", cidade, data);

        let config = self.fetch_schedule_config(cidade).await?;
        let slots = generate_slots(&config)?;

        let booked = match self.fetch_booked_times(cidade, data).await {
            Ok(booked) => booked,
            Err(e) => match self.fetch_failure_policy {
                AvailabilityFetchFailurePolicy::FailOpen => {
                    warn!("Booked-times query failed for {} on {}, failing open: {}", cidade, data, e);
                    HashSet::new()
                }
            },
        };

        let mut available = filter_available(&slots, &booked);
        sort_chronological(&mut available);

        debug!("{} of {} slots free for {} on {}", available.len(), slots.len(), cidade, data);
        Ok(available)
    }

    async fn fetch_schedule_config(&self, cidade: &str) -> Result<ScheduleConfig, SchedulingError> {
        let path = format!(
            "/rest/v1/scheduleConfigs?cidade_id=eq.{}",
            urlencoding::encode(cidade)
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let config = result.into_iter().next()
            .ok_or_else(|| SchedulingError::ConfigNotFound(cidade.to_string()))?;

        serde_json::from_value(config)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse schedule config: {}", e)))
    }

    /// Times already taken on that day. Cancelled appointments do not
    /// block a slot.
    async fn fetch_booked_times(
        &self,
        cidade: &str,
        data: &str,
    ) -> Result<HashSet<String>, SchedulingError> {
        let path = format!(
            "/rest/v1/agendamentos?cidade=eq.{}&data=eq.{}&status=in.(pendente,confirmado)&select=horario",
            urlencoding::encode(cidade),
            urlencoding::encode(data)
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        Ok(result.iter()
            .filter_map(|row| row["horario"].as_str().map(|h| h.to_string()))
            .collect())
    }
}
