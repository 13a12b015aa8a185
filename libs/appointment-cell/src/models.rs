// libs/appointment-cell/src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    Pendente,
    Confirmado,
    Cancelado,
}

impl AppointmentStatus {
    /// Whether this status keeps the slot occupied for the double-booking
    /// guard. A cancelled appointment frees its slot.
    pub fn occupies_slot(&self) -> bool {
        matches!(self, AppointmentStatus::Pendente | AppointmentStatus::Confirmado)
    }

    pub fn can_transition_to(&self, next: AppointmentStatus) -> bool {
        matches!(
            (self, next),
            (AppointmentStatus::Pendente, AppointmentStatus::Confirmado)
                | (AppointmentStatus::Pendente, AppointmentStatus::Cancelado)
                | (AppointmentStatus::Confirmado, AppointmentStatus::Cancelado)
        )
    }
}

impl fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppointmentStatus::Pendente => write!(f, "pendente"),
            AppointmentStatus::Confirmado => write!(f, "confirmado"),
            AppointmentStatus::Cancelado => write!(f, "cancelado"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Appointment {
    pub id: String,
    pub nome: String,
    pub telefone: String,
    pub cidade: String,
    /// `DD/MM/YYYY`
    pub data: String,
    /// `HH:MM`
    pub horario: String,
    pub status: AppointmentStatus,
    #[serde(default)]
    pub observacoes: Option<String>,
    #[serde(default)]
    pub medico: Option<String>,
    #[serde(default)]
    pub notificacao_erro: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateAppointmentRequest {
    pub nome: String,
    pub telefone: String,
    pub cidade: String,
    pub data: String,
    pub horario: String,
    pub observacoes: Option<String>,
    pub medico: Option<String>,
    /// Administrative flows may create directly as `confirmado`; the public
    /// form leaves this out and gets `pendente`.
    pub status: Option<AppointmentStatus>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateAppointmentRequest {
    pub status: Option<AppointmentStatus>,
    pub observacoes: Option<String>,
    pub medico: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppointmentSearchQuery {
    pub cidade: Option<String>,
    pub data: Option<String>,
    pub status: Option<AppointmentStatus>,
}

/// Payload POSTed to the notification webhook when a booking is created.
#[derive(Debug, Clone, Serialize)]
pub struct NotificationPayload {
    pub appointment_id: String,
    pub telefone: String,
    pub nome: String,
    pub cidade: String,
    pub data: String,
    pub horario: String,
    pub medico: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    #[error("Appointment not found")]
    NotFound,

    #[error("Slot {horario} on {data} in {cidade} is already booked")]
    SlotUnavailable {
        cidade: String,
        data: String,
        horario: String,
    },

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Cannot change appointment status from {from} to {to}")]
    InvalidStatusTransition {
        from: AppointmentStatus,
        to: AppointmentStatus,
    },

    #[error("Database error: {0}")]
    DatabaseError(String),
}
