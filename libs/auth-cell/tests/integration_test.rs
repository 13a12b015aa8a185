use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use auth_cell::services::login::AdminLoginService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn service_for(mock_server: &MockServer) -> AdminLoginService {
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    AdminLoginService::new(&config)
}

async fn mount_sign_in(mock_server: &MockServer, user_id: &str) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .and(query_param("grant_type", "password"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "session-token",
            "token_type": "bearer",
            "user": { "id": user_id, "email": "someone@clinica.com" }
        })))
        .mount(mock_server)
        .await;
}

async fn mount_logout(mock_server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/v1/logout"))
        .respond_with(ResponseTemplate::new(204))
        .mount(mock_server)
        .await;
}

async fn logout_was_called(mock_server: &MockServer) -> bool {
    mock_server.received_requests().await.unwrap().iter()
        .any(|r| r.url.path() == "/auth/v1/logout")
}

#[tokio::test]
async fn admin_login_succeeds() {
    let mock_server = MockServer::start().await;

    mount_sign_in(&mock_server, "u1").await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .and(query_param("id", "eq.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::usuario_response("u1", "admin@clinica.com", "admin")
        ])))
        .mount(&mock_server)
        .await;

    let response = service_for(&mock_server)
        .login("admin@clinica.com", "secret")
        .await
        .unwrap();

    assert_eq!(response.access_token, "session-token");
    assert_eq!(response.role, "admin");
    assert!(!logout_was_called(&mock_server).await);
}

#[tokio::test]
async fn legacy_administrador_role_is_accepted() {
    let mock_server = MockServer::start().await;

    mount_sign_in(&mock_server, "u1").await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::usuario_response("u1", "admin@clinica.com", "administrador")
        ])))
        .mount(&mock_server)
        .await;

    let response = service_for(&mock_server)
        .login("admin@clinica.com", "secret")
        .await
        .unwrap();

    assert_eq!(response.role, "administrador");
}

#[tokio::test]
async fn non_admin_is_signed_out_and_rejected() {
    let mock_server = MockServer::start().await;

    mount_sign_in(&mock_server, "u2").await;
    mount_logout(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::usuario_response("u2", "recep@clinica.com", "recepcionista")
        ])))
        .mount(&mock_server)
        .await;

    let err = service_for(&mock_server)
        .login("recep@clinica.com", "secret")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("administrators"));
    assert!(logout_was_called(&mock_server).await);
}

#[tokio::test]
async fn disabled_admin_is_signed_out_and_rejected() {
    let mock_server = MockServer::start().await;

    mount_sign_in(&mock_server, "u3").await;
    mount_logout(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "u3",
                "email": "old-admin@clinica.com",
                "nome": "Old Admin",
                "role": "admin",
                "permissions": null,
                "disabled": true
            }
        ])))
        .mount(&mock_server)
        .await;

    let err = service_for(&mock_server)
        .login("old-admin@clinica.com", "secret")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("disabled"));
    assert!(logout_was_called(&mock_server).await);
}

#[tokio::test]
async fn missing_user_record_is_signed_out_and_rejected() {
    let mock_server = MockServer::start().await;

    mount_sign_in(&mock_server, "u4").await;
    mount_logout(&mock_server).await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let err = service_for(&mock_server)
        .login("ghost@clinica.com", "secret")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("user record"));
    assert!(logout_was_called(&mock_server).await);
}

#[tokio::test]
async fn wrong_password_is_rejected_without_store_lookup() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/v1/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Invalid login credentials"
        })))
        .mount(&mock_server)
        .await;

    let err = service_for(&mock_server)
        .login("admin@clinica.com", "wrong")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Invalid email or password"));

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests.iter().all(|r| !r.url.path().starts_with("/rest/v1/usuarios")));
}
