use std::sync::Arc;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use base64::{Engine as _, engine::general_purpose};
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_anon_key: String,
    pub notification_webhook_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_anon_key: "test-anon-key".to_string(),
            notification_webhook_url: String::new(),
        }
    }
}

impl TestConfig {
    pub fn with_base_url(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_anon_key: self.supabase_anon_key.clone(),
            supabase_jwt_secret: self.jwt_secret.clone(),
            notification_webhook_url: self.notification_webhook_url.clone(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub role: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: "test@example.com".to_string(),
            role: "recepcionista".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(email: &str, role: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            email: email.to_string(),
            role: role.to_string(),
        }
    }

    pub fn admin(email: &str) -> Self {
        Self::new(email, "admin")
    }

    pub fn gerente(email: &str) -> Self {
        Self::new(email, "gerente")
    }

    pub fn recepcionista(email: &str) -> Self {
        Self::new(email, "recepcionista")
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            email: Some(self.email.clone()),
            role: Some(self.role.clone()),
            metadata: None,
            created_at: Some(Utc::now()),
        }
    }
}

pub struct JwtTestUtils;

impl JwtTestUtils {
    pub fn create_test_token(user: &TestUser, secret: &str, exp_hours: Option<i64>) -> String {
        let now = Utc::now();
        let exp = now + Duration::hours(exp_hours.unwrap_or(24));

        let header = json!({
            "alg": "HS256",
            "typ": "JWT"
        });

        let payload = json!({
            "sub": user.id,
            "email": user.email,
            "role": user.role,
            "iat": now.timestamp(),
            "exp": exp.timestamp()
        });

        let header_encoded = general_purpose::URL_SAFE_NO_PAD.encode(header.to_string());
        let payload_encoded = general_purpose::URL_SAFE_NO_PAD.encode(payload.to_string());

        let signing_input = format!("{}.{}", header_encoded, payload_encoded);

        let mut mac = Hmac::<Sha256>::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        let signature_encoded = general_purpose::URL_SAFE_NO_PAD.encode(signature);

        format!("{}.{}", signing_input, signature_encoded)
    }

    pub fn create_expired_token(user: &TestUser, secret: &str) -> String {
        Self::create_test_token(user, secret, Some(-1))
    }

    pub fn create_invalid_signature_token(user: &TestUser) -> String {
        Self::create_test_token(user, "wrong-secret", Some(24))
    }

    pub fn create_malformed_token() -> String {
        "invalid.token.format".to_string()
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn usuario_response(user_id: &str, email: &str, role: &str) -> serde_json::Value {
        json!({
            "id": user_id,
            "email": email,
            "nome": "Test User",
            "role": role,
            "permissions": null,
            "disabled": false,
            "created_at": "2024-01-01T00:00:00Z",
            "updated_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn cidade_response(id: &str, nome: &str) -> serde_json::Value {
        json!({
            "id": id,
            "nome": nome,
            "estado": "MG",
            "ativa": true,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn medico_response(id: &str, nome: &str, especialidade: &str) -> serde_json::Value {
        json!({
            "id": id,
            "nome": nome,
            "especialidade": especialidade,
            "cidades": ["Mantena"],
            "ativo": true,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn agendamento_response(id: &str, cidade: &str, data: &str,
                                horario: &str, status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "nome": "Paciente Teste",
            "telefone": "5533999887766",
            "cidade": cidade,
            "data": data,
            "horario": horario,
            "status": status,
            "observacoes": null,
            "medico": null,
            "notificacao_erro": null,
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn data_disponivel_response(id: &str, cidade: &str, data: &str,
                                    status: &str) -> serde_json::Value {
        json!({
            "id": id,
            "cidade": cidade,
            "data": data,
            "status": status
        })
    }

    pub fn config_agenda_response(cidade_id: &str) -> serde_json::Value {
        json!({
            "cidade_id": cidade_id,
            "periodo_manha": true,
            "periodo_tarde": true,
            "horarios": {
                "manha_inicio": "08:00",
                "manha_fim": "12:00",
                "tarde_inicio": "14:00",
                "tarde_fim": "18:00"
            },
            "intervalo": 30
        })
    }

    pub fn registro_financeiro_response(id: &str, tipo: &str, valor: f64) -> serde_json::Value {
        json!({
            "id": id,
            "tipo": tipo,
            "descricao": "Registro de teste",
            "valor": valor,
            "data": "01/06/2026",
            "cidade": "Mantena",
            "categoria": null
        })
    }

    pub fn error_response(message: &str, code: &str) -> serde_json::Value {
        json!({
            "error": {
                "message": message,
                "code": code
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_creation() {
        let config = TestConfig::default();
        let app_config = config.to_app_config();

        assert_eq!(app_config.supabase_url, "http://localhost:54321");
        assert_eq!(app_config.supabase_anon_key, "test-anon-key");
        assert!(!app_config.supabase_jwt_secret.is_empty());
    }

    #[test]
    fn test_user_creation() {
        let user = TestUser::admin("admin@example.com");
        assert_eq!(user.email, "admin@example.com");
        assert_eq!(user.role, "admin");

        let user_model = user.to_user();
        assert_eq!(user_model.email, Some(user.email.clone()));
        assert_eq!(user_model.role, Some(user.role.clone()));
        assert_eq!(user_model.id, user.id);
    }

    #[test]
    fn test_jwt_token_creation() {
        let user = TestUser::default();
        let secret = "test-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        assert!(token.contains('.'));
        assert_eq!(token.split('.').count(), 3);
    }

    #[test]
    fn test_jwt_roundtrip_validation() {
        let user = TestUser::gerente("gerente@example.com");
        let secret = "roundtrip-secret";
        let token = JwtTestUtils::create_test_token(&user, secret, Some(1));

        let validated = crate::jwt::validate_token(&token, secret).unwrap();
        assert_eq!(validated.id, user.id);
        assert_eq!(validated.role, Some("gerente".to_string()));
    }

    #[test]
    fn test_expired_token_rejected() {
        let user = TestUser::default();
        let secret = "expiry-secret";
        let token = JwtTestUtils::create_expired_token(&user, secret);

        assert!(crate::jwt::validate_token(&token, secret).is_err());
    }
}
