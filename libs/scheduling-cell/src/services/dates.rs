// libs/scheduling-cell/src/services/dates.rs
use chrono::{NaiveDate, Utc};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AvailableDate, CreateDateRequest, DateStatus, SchedulingError, SweepSummary,
    UpdateDateRequest,
};

/// A date is spent once its calendar day is on or before today; the
/// comparison ignores time of day. Unparseable dates count as spent so a
/// broken record can never keep itself bookable.
pub fn is_expired(data: &str, today: NaiveDate) -> bool {
    match NaiveDate::parse_from_str(data, "%d/%m/%Y") {
        Ok(date) => date <= today,
        Err(_) => true,
    }
}

pub struct AvailableDatesService {
    supabase: SupabaseClient,
}

impl AvailableDatesService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// List dates for a city (or all cities). The read path self-heals:
    /// any `Disponível` record whose day has passed is flipped before the
    /// list is returned, so a missed sweep cannot surface stale dates.
    pub async fn list_dates(
        &self,
        cidade: Option<&str>,
        auth_token: Option<&str>,
    ) -> Result<Vec<AvailableDate>, SchedulingError> {
        let mut path = "/rest/v1/datas_disponiveis?order=data.asc".to_string();
        if let Some(cidade) = cidade {
            path.push_str(&format!("&cidade=eq.{}", urlencoding::encode(cidade)));
        }

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            auth_token,
            None,
        ).await.map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let mut dates: Vec<AvailableDate> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<AvailableDate>, _>>()
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse dates: {}", e)))?;

        let today = Utc::now().date_naive();
        let stale: Vec<&AvailableDate> = dates.iter()
            .filter(|d| d.status == DateStatus::Disponivel && is_expired(&d.data, today))
            .collect();

        if !stale.is_empty() {
            debug!("Self-healing {} stale available dates", stale.len());
            let flips = stale.iter().map(|d| flip_row(d)).collect();
            if let Err(e) = self.supabase.bulk_upsert(
                "datas_disponiveis",
                flips,
                "id",
                auth_token,
            ).await {
                // The read still returns the normalized view.
                warn!("Failed to persist self-healed dates: {}", e);
            }
        }

        for date in &mut dates {
            if date.status == DateStatus::Disponivel && is_expired(&date.data, today) {
                date.status = DateStatus::Indisponivel;
            }
        }

        Ok(dates)
    }

    pub async fn create_date(
        &self,
        request: CreateDateRequest,
        auth_token: &str,
    ) -> Result<AvailableDate, SchedulingError> {
        if request.cidade.trim().is_empty() {
            return Err(SchedulingError::ValidationError("cidade is required".to_string()));
        }

        let parsed = NaiveDate::parse_from_str(&request.data, "%d/%m/%Y")
            .map_err(|_| SchedulingError::ValidationError(
                format!("Invalid date: {} (expected DD/MM/YYYY)", request.data)
            ))?;

        if parsed <= Utc::now().date_naive() {
            return Err(SchedulingError::ValidationError(
                "Date must be in the future".to_string()
            ));
        }

        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "cidade": request.cidade,
            "data": request.data,
            "status": DateStatus::Disponivel,
        });

        let result: Vec<Value> = self.supabase
            .insert_returning("datas_disponiveis", row, Some(auth_token))
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let created = result.into_iter().next()
            .ok_or_else(|| SchedulingError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(created)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse date: {}", e)))
    }

    pub async fn update_date(
        &self,
        date_id: &str,
        request: UpdateDateRequest,
        auth_token: &str,
    ) -> Result<AvailableDate, SchedulingError> {
        let path = format!("/rest/v1/datas_disponiveis?id=eq.{}", date_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(json!({ "status": request.status })),
            Some(headers),
        ).await.map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let updated = result.into_iter().next().ok_or(SchedulingError::NotFound)?;
        serde_json::from_value(updated)
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse date: {}", e)))
    }

    pub async fn delete_date(&self, date_id: &str, auth_token: &str) -> Result<(), SchedulingError> {
        let path = format!("/rest/v1/datas_disponiveis?id=eq.{}", date_id);
        self.supabase.execute(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        Ok(())
    }

    /// Daily sweep: mark every `Disponível` date whose day has passed as
    /// `Indisponível`. All flips ride a single bulk upsert so the batch
    /// applies atomically.
    pub async fn sweep_past_dates(&self, auth_token: &str) -> Result<SweepSummary, SchedulingError> {
        let path = format!(
            "/rest/v1/datas_disponiveis?status=eq.{}",
            urlencoding::encode("Disponível")
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;

        let dates: Vec<AvailableDate> = result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<AvailableDate>, _>>()
            .map_err(|e| SchedulingError::DatabaseError(format!("Failed to parse dates: {}", e)))?;

        let today = Utc::now().date_naive();
        let scanned = dates.len();
        let flips: Vec<Value> = dates.iter()
            .filter(|d| is_expired(&d.data, today))
            .map(flip_row)
            .collect();
        let flipped = flips.len();

        if flipped > 0 {
            self.supabase.bulk_upsert("datas_disponiveis", flips, "id", Some(auth_token))
                .await
                .map_err(|e| SchedulingError::DatabaseError(e.to_string()))?;
        }

        info!("Date sweep: {} scanned, {} marked unavailable", scanned, flipped);
        Ok(SweepSummary { scanned, flipped })
    }
}

fn flip_row(date: &AvailableDate) -> Value {
    json!({
        "id": date.id,
        "cidade": date.cidade,
        "data": date.data,
        "status": DateStatus::Indisponivel,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn yesterday_and_today_are_expired() {
        let today = day(2026, 6, 15);
        assert!(is_expired("14/06/2026", today));
        assert!(is_expired("15/06/2026", today));
    }

    #[test]
    fn tomorrow_is_not_expired() {
        let today = day(2026, 6, 15);
        assert!(!is_expired("16/06/2026", today));
        assert!(!is_expired("01/01/2030", today));
    }

    #[test]
    fn unparseable_date_is_treated_as_expired() {
        let today = day(2026, 6, 15);
        assert!(is_expired("2026-06-20", today));
        assert!(is_expired("31/02/2026", today));
        assert!(is_expired("", today));
    }
}
