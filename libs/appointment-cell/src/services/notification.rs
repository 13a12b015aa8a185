// libs/appointment-cell/src/services/notification.rs
use chrono::Utc;
use regex::Regex;
use reqwest::Method;
use serde_json::json;
use tracing::{debug, warn};

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{Appointment, NotificationPayload};

/// Digits only, with the Brazilian country code prefixed when absent.
pub fn normalize_phone(raw: &str) -> String {
    let digits = Regex::new(r"\D").unwrap().replace_all(raw, "").to_string();

    if digits.starts_with("55") && digits.len() > 11 {
        digits
    } else {
        format!("55{}", digits)
    }
}

pub struct WebhookNotificationService {
    client: reqwest::Client,
    webhook_url: String,
    supabase: SupabaseClient,
}

impl WebhookNotificationService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: config.notification_webhook_url.clone(),
            supabase: SupabaseClient::new(config),
        }
    }

    /// Deliver the created-appointment notification. Delivery failure is
    /// recorded on the appointment (`notificacao_erro`) and never retried;
    /// the booking itself has already been persisted and stands.
    pub async fn notify_created(&self, appointment: &Appointment) {
        if self.webhook_url.is_empty() {
            debug!("Notification webhook not configured, skipping appointment {}", appointment.id);
            return;
        }

        let payload = NotificationPayload {
            appointment_id: appointment.id.clone(),
            telefone: normalize_phone(&appointment.telefone),
            nome: appointment.nome.clone(),
            cidade: appointment.cidade.clone(),
            data: appointment.data.clone(),
            horario: appointment.horario.clone(),
            medico: appointment.medico.clone(),
            timestamp: Utc::now().to_rfc3339(),
        };

        let delivery_error = match self.client.post(&self.webhook_url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => None,
            Ok(response) => Some(format!("Webhook returned {}", response.status())),
            Err(e) => Some(format!("Webhook delivery failed: {}", e)),
        };

        if let Some(error) = delivery_error {
            warn!("Notification for appointment {} failed: {}", appointment.id, error);
            self.record_delivery_failure(&appointment.id, &error).await;
        } else {
            debug!("Notification delivered for appointment {}", appointment.id);
        }
    }

    async fn record_delivery_failure(&self, appointment_id: &str, error: &str) {
        let path = format!("/rest/v1/agendamentos?id=eq.{}", appointment_id);
        let patch = json!({ "notificacao_erro": error });

        if let Err(e) = self.supabase.execute(Method::PATCH, &path, None, Some(patch)).await {
            warn!("Failed to record notification error on appointment {}: {}", appointment_id, e);
        }
    }
}
