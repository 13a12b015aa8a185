// libs/scheduling-cell/src/models.rs
use serde::{Deserialize, Serialize};

// ==============================================================================
// CITIES (collection `cidades`)
// ==============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct City {
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub estado: Option<String>,
    #[serde(default = "default_true")]
    pub ativa: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateCityRequest {
    pub nome: String,
    pub estado: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateCityRequest {
    pub nome: Option<String>,
    pub estado: Option<String>,
    pub ativa: Option<bool>,
}

// ==============================================================================
// SCHEDULE CONFIGURATION (collection `scheduleConfigs`, keyed by city)
// ==============================================================================

/// Morning/afternoon window bounds as `HH:MM` strings, the exact form the
/// store keeps them in.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleHours {
    pub manha_inicio: String,
    pub manha_fim: String,
    pub tarde_inicio: String,
    pub tarde_fim: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    pub cidade_id: String,
    pub periodo_manha: bool,
    pub periodo_tarde: bool,
    pub horarios: ScheduleHours,
    /// Slot step in minutes. Must be positive.
    pub intervalo: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpsertScheduleConfigRequest {
    pub periodo_manha: bool,
    pub periodo_tarde: bool,
    pub horarios: ScheduleHours,
    pub intervalo: i64,
}

// ==============================================================================
// AVAILABLE DATES (collection `datas_disponiveis`)
// ==============================================================================

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DateStatus {
    #[serde(rename = "Disponível")]
    Disponivel,
    #[serde(rename = "Indisponível")]
    Indisponivel,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailableDate {
    pub id: String,
    pub cidade: String,
    /// `DD/MM/YYYY`
    pub data: String,
    pub status: DateStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDateRequest {
    pub cidade: String,
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDateRequest {
    pub status: DateStatus,
}

/// Outcome of one run of the past-date sweep.
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub scanned: usize,
    pub flipped: usize,
}

// ==============================================================================
// AVAILABILITY
// ==============================================================================

/// What to do when the booked-times query fails while computing
/// availability. `FailOpen` shows every generated slot rather than
/// blocking the booking form; the double-booking guard still rejects
/// conflicting writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityFetchFailurePolicy {
    FailOpen,
}

#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityResponse {
    pub cidade: String,
    pub data: String,
    pub horarios: Vec<String>,
}

// ==============================================================================
// ERRORS
// ==============================================================================

#[derive(Debug, thiserror::Error)]
pub enum SchedulingError {
    #[error("Record not found")]
    NotFound,

    #[error("No schedule configuration for city {0}")]
    ConfigNotFound(String),

    #[error("Invalid slot interval: {0}")]
    InvalidInterval(i64),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
