use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use doctor_cell::models::{CreateDoctorRequest, DoctorError};
use doctor_cell::services::doctor::DoctorService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn service_for(mock_server: &MockServer) -> DoctorService {
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    DoctorService::new(&config)
}

#[tokio::test]
async fn listing_filters_active_doctors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medicos"))
        .and(query_param("ativo", "eq.true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::medico_response("m1", "Dr. Silva", "Clínica Geral")
        ])))
        .mount(&mock_server)
        .await;

    let doctors = service_for(&mock_server).list_doctors(None, true).await.unwrap();
    assert_eq!(doctors.len(), 1);
    assert_eq!(doctors[0].nome, "Dr. Silva");
}

#[tokio::test]
async fn create_requires_a_name() {
    let mock_server = MockServer::start().await;

    let request = CreateDoctorRequest {
        nome: "   ".to_string(),
        especialidade: None,
        cidades: None,
    };

    let err = service_for(&mock_server)
        .create_doctor(request, "test-token")
        .await
        .unwrap_err();

    assert!(matches!(err, DoctorError::ValidationError(_)));
    assert!(mock_server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn missing_doctor_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/medicos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let err = service_for(&mock_server)
        .get_doctor("missing", "test-token")
        .await
        .unwrap_err();

    assert!(matches!(err, DoctorError::NotFound));
}
