use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use scheduling_cell::models::{DateStatus, SchedulingError};
use scheduling_cell::services::availability::AvailabilityService;
use scheduling_cell::services::dates::AvailableDatesService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn mantena_config() -> serde_json::Value {
    json!({
        "cidade_id": "Mantena",
        "periodo_manha": true,
        "periodo_tarde": true,
        "horarios": {
            "manha_inicio": "08:00",
            "manha_fim": "09:00",
            "tarde_inicio": "14:00",
            "tarde_fim": "15:00"
        },
        "intervalo": 30
    })
}

fn ddmmyyyy(offset_days: i64) -> String {
    (Utc::now().date_naive() + Duration::days(offset_days))
        .format("%d/%m/%Y")
        .to_string()
}

#[tokio::test]
async fn availability_with_no_bookings_yields_all_slots() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/scheduleConfigs"))
        .and(query_param("cidade_id", "eq.Mantena"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([mantena_config()])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/agendamentos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    let horarios = service.available_times("Mantena", "01/01/2030").await.unwrap();
    assert_eq!(horarios, vec!["08:00", "08:30", "14:00", "14:30"]);
}

#[tokio::test]
async fn availability_subtracts_pending_and_confirmed_bookings() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/scheduleConfigs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([mantena_config()])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/agendamentos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "horario": "08:30" },
            { "horario": "14:00" }
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    let horarios = service.available_times("Mantena", "01/01/2030").await.unwrap();
    assert_eq!(horarios, vec!["08:00", "14:30"]);
}

#[tokio::test]
async fn availability_fails_open_when_bookings_query_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/scheduleConfigs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([mantena_config()])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/agendamentos"))
        .respond_with(ResponseTemplate::new(500).set_body_string("storage exploded"))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    // Read failure must not block the form: every generated slot shows.
    let horarios = service.available_times("Mantena", "01/01/2030").await.unwrap();
    assert_eq!(horarios, vec!["08:00", "08:30", "14:00", "14:30"]);
}

#[tokio::test]
async fn availability_without_config_is_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/scheduleConfigs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let service = AvailabilityService::new(&config);

    let err = service.available_times("Atlantis", "01/01/2030").await.unwrap_err();
    assert!(matches!(err, SchedulingError::ConfigNotFound(_)));
}

#[tokio::test]
async fn sweep_flips_only_past_dates_in_one_batch() {
    let mock_server = MockServer::start().await;

    let yesterday = ddmmyyyy(-1);
    let tomorrow = ddmmyyyy(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/datas_disponiveis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::data_disponivel_response("d1", "Mantena", &yesterday, "Disponível"),
            MockSupabaseResponses::data_disponivel_response("d2", "Mantena", &tomorrow, "Disponível"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/datas_disponiveis"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([
            MockSupabaseResponses::data_disponivel_response("d1", "Mantena", &yesterday, "Indisponível"),
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let service = AvailableDatesService::new(&config);

    let summary = service.sweep_past_dates("test-token").await.unwrap();
    assert_eq!(summary.scanned, 2);
    assert_eq!(summary.flipped, 1);

    let requests = mock_server.received_requests().await.unwrap();
    let batches: Vec<_> = requests.iter()
        .filter(|r| r.method.as_str() == "POST")
        .collect();
    assert_eq!(batches.len(), 1, "sweep must issue a single batch write");

    let body: serde_json::Value = serde_json::from_slice(&batches[0].body).unwrap();
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["id"], "d1");
    assert_eq!(rows[0]["status"], "Indisponível");
}

#[tokio::test]
async fn sweep_with_nothing_stale_writes_nothing() {
    let mock_server = MockServer::start().await;

    let tomorrow = ddmmyyyy(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/datas_disponiveis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::data_disponivel_response("d2", "Mantena", &tomorrow, "Disponível"),
        ])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let service = AvailableDatesService::new(&config);

    let summary = service.sweep_past_dates("test-token").await.unwrap();
    assert_eq!(summary.flipped, 0);

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| r.method.as_str() != "POST"));
}

#[tokio::test]
async fn list_dates_self_heals_stale_records() {
    let mock_server = MockServer::start().await;

    let yesterday = ddmmyyyy(-1);
    let tomorrow = ddmmyyyy(1);

    Mock::given(method("GET"))
        .and(path("/rest/v1/datas_disponiveis"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::data_disponivel_response("d1", "Mantena", &yesterday, "Disponível"),
            MockSupabaseResponses::data_disponivel_response("d2", "Mantena", &tomorrow, "Disponível"),
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/datas_disponiveis"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    let service = AvailableDatesService::new(&config);

    let dates = service.list_dates(Some("Mantena"), None).await.unwrap();

    let d1 = dates.iter().find(|d| d.id == "d1").unwrap();
    let d2 = dates.iter().find(|d| d.id == "d2").unwrap();
    assert_eq!(d1.status, DateStatus::Indisponivel);
    assert_eq!(d2.status, DateStatus::Disponivel);
}
