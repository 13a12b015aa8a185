// libs/financial-cell/src/services/records.rs
use chrono::NaiveDate;
use reqwest::Method;
use serde_json::{json, Value};
use tracing::{debug, info};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    CreateRecordRequest, FinancialError, FinancialRecord, FinancialSummary,
    RecordType, RecordsQuery, UpdateRecordRequest,
};

/// Totals over an in-memory record list.
pub fn summarize(records: &[FinancialRecord]) -> FinancialSummary {
    let total_receitas: f64 = records.iter()
        .filter(|r| r.tipo == RecordType::Receita)
        .map(|r| r.valor)
        .sum();
    let total_despesas: f64 = records.iter()
        .filter(|r| r.tipo == RecordType::Despesa)
        .map(|r| r.valor)
        .sum();

    FinancialSummary {
        total_receitas,
        total_despesas,
        saldo: total_receitas - total_despesas,
        record_count: records.len(),
    }
}

pub struct FinancialRecordService {
    supabase: SupabaseClient,
}

impl FinancialRecordService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
        }
    }

    pub async fn list_records(
        &self,
        query: &RecordsQuery,
        auth_token: &str,
    ) -> Result<Vec<FinancialRecord>, FinancialError> {
        let mut path = "/rest/v1/registros_financeiros?order=data.desc".to_string();
        if let Some(cidade) = &query.cidade {
            path.push_str(&format!("&cidade=eq.{}", urlencoding::encode(cidade)));
        }
        if let Some(tipo) = &query.tipo {
            path.push_str(&format!("&tipo=eq.{}", tipo));
        }

        let result: Vec<Value> = self.supabase.request(
            Method::GET,
            &path,
            Some(auth_token),
            None,
        ).await.map_err(|e| FinancialError::DatabaseError(e.to_string()))?;

        result.into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<FinancialRecord>, _>>()
            .map_err(|e| FinancialError::DatabaseError(format!("Failed to parse records: {}", e)))
    }

    pub async fn summary(
        &self,
        query: &RecordsQuery,
        auth_token: &str,
    ) -> Result<FinancialSummary, FinancialError> {
        let records = self.list_records(query, auth_token).await?;
        debug!("Summarizing {} financial records", records.len());
        Ok(summarize(&records))
    }

    pub async fn create_record(
        &self,
        request: CreateRecordRequest,
        auth_token: &str,
    ) -> Result<FinancialRecord, FinancialError> {
        if request.descricao.trim().is_empty() {
            return Err(FinancialError::ValidationError("descricao is required".to_string()));
        }
        if request.valor <= 0.0 {
            return Err(FinancialError::ValidationError("valor must be positive".to_string()));
        }
        if NaiveDate::parse_from_str(&request.data, "%d/%m/%Y").is_err() {
            return Err(FinancialError::ValidationError(
                format!("Invalid date: {} (expected DD/MM/YYYY)", request.data)
            ));
        }

        info!("Creating {} record: {}", request.tipo, request.descricao);

        let row = json!({
            "id": Uuid::new_v4().to_string(),
            "tipo": request.tipo,
            "descricao": request.descricao,
            "valor": request.valor,
            "data": request.data,
            "cidade": request.cidade,
            "categoria": request.categoria,
        });

        let result: Vec<Value> = self.supabase
            .insert_returning("registros_financeiros", row, Some(auth_token))
            .await
            .map_err(|e| FinancialError::DatabaseError(e.to_string()))?;

        let created = result.into_iter().next()
            .ok_or_else(|| FinancialError::DatabaseError("Insert returned no row".to_string()))?;

        serde_json::from_value(created)
            .map_err(|e| FinancialError::DatabaseError(format!("Failed to parse record: {}", e)))
    }

    pub async fn update_record(
        &self,
        record_id: &str,
        request: UpdateRecordRequest,
        auth_token: &str,
    ) -> Result<FinancialRecord, FinancialError> {
        if let Some(valor) = request.valor {
            if valor <= 0.0 {
                return Err(FinancialError::ValidationError("valor must be positive".to_string()));
            }
        }
        if let Some(data) = &request.data {
            if NaiveDate::parse_from_str(data, "%d/%m/%Y").is_err() {
                return Err(FinancialError::ValidationError(
                    format!("Invalid date: {} (expected DD/MM/YYYY)", data)
                ));
            }
        }

        let mut patch = serde_json::Map::new();
        if let Some(tipo) = request.tipo {
            patch.insert("tipo".to_string(), json!(tipo));
        }
        if let Some(descricao) = request.descricao {
            patch.insert("descricao".to_string(), json!(descricao));
        }
        if let Some(valor) = request.valor {
            patch.insert("valor".to_string(), json!(valor));
        }
        if let Some(data) = request.data {
            patch.insert("data".to_string(), json!(data));
        }
        if let Some(cidade) = request.cidade {
            patch.insert("cidade".to_string(), json!(cidade));
        }
        if let Some(categoria) = request.categoria {
            patch.insert("categoria".to_string(), json!(categoria));
        }

        let path = format!("/rest/v1/registros_financeiros?id=eq.{}", record_id);
        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert("Prefer", reqwest::header::HeaderValue::from_static("return=representation"));

        let result: Vec<Value> = self.supabase.request_with_headers(
            Method::PATCH,
            &path,
            Some(auth_token),
            Some(Value::Object(patch)),
            Some(headers),
        ).await.map_err(|e| FinancialError::DatabaseError(e.to_string()))?;

        let updated = result.into_iter().next().ok_or(FinancialError::NotFound)?;
        serde_json::from_value(updated)
            .map_err(|e| FinancialError::DatabaseError(format!("Failed to parse record: {}", e)))
    }

    pub async fn delete_record(&self, record_id: &str, auth_token: &str) -> Result<(), FinancialError> {
        let path = format!("/rest/v1/registros_financeiros?id=eq.{}", record_id);
        self.supabase.execute(Method::DELETE, &path, Some(auth_token), None)
            .await
            .map_err(|e| FinancialError::DatabaseError(e.to_string()))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(tipo: RecordType, valor: f64) -> FinancialRecord {
        FinancialRecord {
            id: Uuid::new_v4().to_string(),
            tipo,
            descricao: "teste".to_string(),
            valor,
            data: "01/06/2026".to_string(),
            cidade: None,
            categoria: None,
        }
    }

    #[test]
    fn summary_totals_by_type() {
        let records = vec![
            record(RecordType::Receita, 300.0),
            record(RecordType::Receita, 150.0),
            record(RecordType::Despesa, 120.0),
        ];

        let summary = summarize(&records);
        assert_eq!(summary.total_receitas, 450.0);
        assert_eq!(summary.total_despesas, 120.0);
        assert_eq!(summary.saldo, 330.0);
        assert_eq!(summary.record_count, 3);
    }

    #[test]
    fn summary_of_nothing_is_zero() {
        let summary = summarize(&[]);
        assert_eq!(summary.total_receitas, 0.0);
        assert_eq!(summary.total_despesas, 0.0);
        assert_eq!(summary.saldo, 0.0);
        assert_eq!(summary.record_count, 0);
    }
}
