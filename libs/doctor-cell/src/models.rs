// libs/doctor-cell/src/models.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Doctor {
    pub id: String,
    pub nome: String,
    #[serde(default)]
    pub especialidade: Option<String>,
    /// Cities this doctor attends in.
    #[serde(default)]
    pub cidades: Vec<String>,
    #[serde(default = "default_true")]
    pub ativo: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateDoctorRequest {
    pub nome: String,
    pub especialidade: Option<String>,
    pub cidades: Option<Vec<String>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateDoctorRequest {
    pub nome: Option<String>,
    pub especialidade: Option<String>,
    pub cidades: Option<Vec<String>>,
    pub ativo: Option<bool>,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Doctor not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
