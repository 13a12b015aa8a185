// libs/appointment-cell/src/services/booking.rs
use chrono::{NaiveDate, NaiveTime};
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::{ApiStatusError, SupabaseClient};

use crate::models::{
    Appointment, AppointmentError, AppointmentSearchQuery, AppointmentStatus,
    CreateAppointmentRequest, UpdateAppointmentRequest,
};

pub struct AppointmentBookingService {
    supabase: SupabaseClient,
}

impl AppointmentBookingService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    /// Double-booking guard: a slot is free iff no pending or confirmed
    /// appointment holds the same `(cidade, data, horario)` tuple.
    pub async fn check_time_availability(
        &self,
        cidade: &str,
        data: &str,
        horario: &str,
    ) -> Result<bool, AppointmentError> {
        let path = format!(
            "/rest/v1/agendamentos?cidade=eq.{}&data=eq.{}&horario=eq.{}&status=in.(pendente,confirmado)&select=id&limit=1",
            urlencoding::encode(cidade),
            urlencoding::encode(data),
            urlencoding::encode(horario)
        );

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            None,
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(result.is_empty())
    }

    /// Create an appointment from the public form or the admin UI. The
    /// guard runs first for a friendly rejection; the insert itself still
    /// rides the store's unique index on occupied slots, so two racing
    /// bookings cannot both land (the loser surfaces as a 409).
    pub async fn create_appointment(
        &self,
        request: CreateAppointmentRequest,
    ) -> Result<Appointment, AppointmentError> {
        validate_create_request(&request)?;

        let available = self
            .check_time_availability(&request.cidade, &request.data, &request.horario)
            .await?;
        if !available {
            return Err(AppointmentError::SlotUnavailable {
                cidade: request.cidade,
                data: request.data,
                horario: request.horario,
            });
        }

        let status = request.status.unwrap_or(AppointmentStatus::Pendente);
        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "nome": request.nome,
            "telefone": request.telefone,
            "cidade": &request.cidade,
            "data": &request.data,
            "horario": &request.horario,
            "status": status,
            "observacoes": request.observacoes,
            "medico": request.medico,
            "notificacao_erro": null,
        });

        let result: Vec<Value> = self.supabase
            .insert_returning("agendamentos", row, None)
            .await
            .map_err(|e| {
                if is_conflict(&e) {
                    AppointmentError::SlotUnavailable {
                        cidade: request.cidade.clone(),
                        data: request.data.clone(),
                        horario: request.horario.clone(),
                    }
                } else {
                    AppointmentError::DatabaseError(e.to_string())
                }
            })?;

        let created = result.into_iter().next()
            .ok_or_else(|| AppointmentError::DatabaseError("Insert returned no row".to_string()))?;

        let appointment: Appointment = serde_json::from_value(created)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))?;

        info!("Appointment {} created for {} on {} at {}",
              appointment.id, appointment.cidade, appointment.data, appointment.horario);

        Ok(appointment)
    }

    pub async fn get_appointment(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let path = format!("/rest/v1/agendamentos?id=eq.{}", appointment_id);
        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let record = result.into_iter().next().ok_or(AppointmentError::NotFound)?;
        serde_json::from_value(record)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    pub async fn search_appointments(
        &self,
        query: &AppointmentSearchQuery,
        auth_token: &str,
    ) -> Result<Vec<Appointment>, AppointmentError> {
        let mut path = "/rest/v1/agendamentos?order=data.asc,horario.asc".to_string();
        if let Some(cidade) = &query.cidade {
            path.push_str(&format!("&cidade=eq.{}", urlencoding::encode(cidade)));
        }
        if let Some(data) = &query.data {
            path.push_str(&format!("&data=eq.{}", urlencoding::encode(data)));
        }
        if let Some(status) = &query.status {
            path.push_str(&format!("&status=eq.{}", status));
        }

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<Appointment>, _>>()
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointments: {}", e)))
    }

    /// Staff update: status transitions are validated against the state
    /// machine before anything is written.
    pub async fn update_appointment(
        &self,
        appointment_id: &str,
        request: UpdateAppointmentRequest,
        auth_token: &str,
    ) -> Result<Appointment, AppointmentError> {
        let current = self.get_appointment(appointment_id, auth_token).await?;

        let mut patch = serde_json::Map::new();
        if let Some(next) = request.status {
            if !current.status.can_transition_to(next) {
                return Err(AppointmentError::InvalidStatusTransition {
                    from: current.status,
                    to: next,
                });
            }
            patch.insert("status".to_string(), json!(next));
        }
        if let Some(observacoes) = request.observacoes {
            patch.insert("observacoes".to_string(), json!(observacoes));
        }
        if let Some(medico) = request.medico {
            patch.insert("medico".to_string(), json!(medico));
        }

        if patch.is_empty() {
            return Ok(current);
        }

        let path = format!("/rest/v1/agendamentos?id=eq.{}", appointment_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(patch)),
            Some(headers),
        ).await.map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        let updated = result.into_iter().next().ok_or(AppointmentError::NotFound)?;

        debug!("Appointment {} updated", appointment_id);
        serde_json::from_value(updated)
            .map_err(|e| AppointmentError::DatabaseError(format!("Failed to parse appointment: {}", e)))
    }

    /// Physical delete, admin only. The active listings never call this;
    /// they filter by status and date instead.
    pub async fn delete_appointment(
        &self,
        appointment_id: &str,
        auth_token: &str,
    ) -> Result<(), AppointmentError> {
        warn!("Deleting appointment {}", appointment_id);

        let path = format!("/rest/v1/agendamentos?id=eq.{}", appointment_id);
        self.supabase.execute(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| AppointmentError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

fn validate_create_request(request: &CreateAppointmentRequest) -> Result<(), AppointmentError> {
    for (field, value) in [
        ("nome", &request.nome),
        ("telefone", &request.telefone),
        ("cidade", &request.cidade),
        ("data", &request.data),
        ("horario", &request.horario),
    ] {
        if value.trim().is_empty() {
            return Err(AppointmentError::ValidationError(format!("{} is required", field)));
        }
    }

    if NaiveDate::parse_from_str(&request.data, "%d/%m/%Y").is_err() {
        return Err(AppointmentError::ValidationError(
            format!("Invalid date: {} (expected DD/MM/YYYY)", request.data)
        ));
    }
    if NaiveTime::parse_from_str(&request.horario, "%H:%M").is_err() {
        return Err(AppointmentError::ValidationError(
            format!("Invalid time: {} (expected HH:MM)", request.horario)
        ));
    }

    Ok(())
}

fn is_conflict(err: &anyhow::Error) -> bool {
    err.downcast_ref::<ApiStatusError>()
        .map(|api| api.status == 409)
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> CreateAppointmentRequest {
        CreateAppointmentRequest {
            nome: "Maria".to_string(),
            telefone: "33999887766".to_string(),
            cidade: "Mantena".to_string(),
            data: "01/01/2030".to_string(),
            horario: "09:00".to_string(),
            observacoes: None,
            medico: None,
            status: None,
        }
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let mut req = request();
        req.telefone = "  ".to_string();
        assert!(matches!(
            validate_create_request(&req),
            Err(AppointmentError::ValidationError(_))
        ));
    }

    #[test]
    fn malformed_date_and_time_are_rejected() {
        let mut req = request();
        req.data = "2030-01-01".to_string();
        assert!(validate_create_request(&req).is_err());

        let mut req = request();
        req.horario = "9am".to_string();
        assert!(validate_create_request(&req).is_err());
    }

    #[test]
    fn well_formed_request_passes_validation() {
        assert!(validate_create_request(&request()).is_ok());
    }

    #[test]
    fn status_machine_transitions() {
        use AppointmentStatus::*;
        assert!(Pendente.can_transition_to(Confirmado));
        assert!(Pendente.can_transition_to(Cancelado));
        assert!(Confirmado.can_transition_to(Cancelado));
        assert!(!Confirmado.can_transition_to(Pendente));
        assert!(!Cancelado.can_transition_to(Pendente));
        assert!(!Cancelado.can_transition_to(Confirmado));
    }

    #[test]
    fn only_active_statuses_occupy_slots() {
        assert!(AppointmentStatus::Pendente.occupies_slot());
        assert!(AppointmentStatus::Confirmado.occupies_slot());
        assert!(!AppointmentStatus::Cancelado.occupies_slot());
    }
}
