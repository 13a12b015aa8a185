// libs/financial-cell/src/models.rs
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RecordType {
    Receita,
    Despesa,
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::Receita => write!(f, "receita"),
            RecordType::Despesa => write!(f, "despesa"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialRecord {
    pub id: String,
    pub tipo: RecordType,
    pub descricao: String,
    pub valor: f64,
    /// `DD/MM/YYYY`
    pub data: String,
    #[serde(default)]
    pub cidade: Option<String>,
    #[serde(default)]
    pub categoria: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRecordRequest {
    pub tipo: RecordType,
    pub descricao: String,
    pub valor: f64,
    pub data: String,
    pub cidade: Option<String>,
    pub categoria: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateRecordRequest {
    pub tipo: Option<RecordType>,
    pub descricao: Option<String>,
    pub valor: Option<f64>,
    pub data: Option<String>,
    pub cidade: Option<String>,
    pub categoria: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordsQuery {
    pub cidade: Option<String>,
    pub tipo: Option<RecordType>,
}

/// Receita/despesa totals for a listing. PDF rendering of these numbers
/// happens outside this service.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FinancialSummary {
    pub total_receitas: f64,
    pub total_despesas: f64,
    pub saldo: f64,
    pub record_count: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum FinancialError {
    #[error("Record not found")]
    NotFound,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),
}
