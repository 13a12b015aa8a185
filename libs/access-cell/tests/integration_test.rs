use serde_json::json;
use wiremock::{MockServer, Mock, ResponseTemplate};
use wiremock::matchers::{method, path, query_param};

use access_cell::models::{Permission, UpdateUserRequest};
use access_cell::services::users::UserManagementService;
use shared_utils::test_utils::{MockSupabaseResponses, TestConfig};

fn service_for(mock_server: &MockServer) -> UserManagementService {
    let config = TestConfig::with_base_url(&mock_server.uri()).to_app_config();
    UserManagementService::new(&config)
}

#[tokio::test]
async fn list_users_presents_full_set_for_admins() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "u1",
                "email": "admin@clinica.com",
                "nome": "Admin",
                "role": "administrador",
                "permissions": ["users:view"],
                "disabled": false
            },
            MockSupabaseResponses::usuario_response("u2", "recep@clinica.com", "recepcionista")
        ])))
        .mount(&mock_server)
        .await;

    let users = service_for(&mock_server)
        .list_users("test-token")
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    let admin = users.iter().find(|u| u.id == "u1").unwrap();
    let perms = admin.permissions.as_ref().unwrap();
    assert_eq!(perms.len(), Permission::ALL.len());
    assert!(perms.contains(&"financial:reports".to_string()));

    let recep = users.iter().find(|u| u.id == "u2").unwrap();
    assert!(recep.permissions.is_none());
}

#[tokio::test]
async fn updating_admin_persists_complete_permission_set() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .and(query_param("id", "eq.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "u1",
                "email": "admin@clinica.com",
                "nome": "Admin",
                "role": "admin",
                "permissions": [],
                "disabled": false
            }
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/usuarios"))
        .and(query_param("id", "eq.u1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "u1",
                "email": "admin@clinica.com",
                "nome": "Admin",
                "role": "admin",
                "permissions": Permission::ALL.iter().map(|p| p.to_string()).collect::<Vec<_>>(),
                "disabled": false
            }
        ])))
        .mount(&mock_server)
        .await;

    // The caller tries to save a partial list; the override must win.
    let request = UpdateUserRequest {
        nome: None,
        role: None,
        permissions: Some(vec!["users:view".to_string()]),
        disabled: None,
    };

    service_for(&mock_server)
        .update_user("u1", request, "test-token")
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let patch = requests.iter()
        .find(|r| r.method.as_str() == "PATCH")
        .expect("no PATCH issued");
    let body: serde_json::Value = serde_json::from_slice(&patch.body).unwrap();
    let persisted = body["permissions"].as_array().unwrap();
    assert_eq!(persisted.len(), Permission::ALL.len());
}

#[tokio::test]
async fn update_rejects_unknown_role() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .and(query_param("id", "eq.u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::usuario_response("u2", "recep@clinica.com", "recepcionista")
        ])))
        .mount(&mock_server)
        .await;

    let request = UpdateUserRequest {
        nome: None,
        role: Some("estagiario".to_string()),
        permissions: None,
        disabled: None,
    };

    let err = service_for(&mock_server)
        .update_user("u2", request, "test-token")
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Unknown role"));
}

#[tokio::test]
async fn role_change_resets_permissions_to_new_defaults() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/usuarios"))
        .and(query_param("id", "eq.u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::usuario_response("u2", "recep@clinica.com", "recepcionista")
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/rest/v1/usuarios"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            MockSupabaseResponses::usuario_response("u2", "recep@clinica.com", "financeiro")
        ])))
        .mount(&mock_server)
        .await;

    let request = UpdateUserRequest {
        nome: None,
        role: Some("financeiro".to_string()),
        permissions: None,
        disabled: None,
    };

    service_for(&mock_server)
        .update_user("u2", request, "test-token")
        .await
        .unwrap();

    let requests = mock_server.received_requests().await.unwrap();
    let patch = requests.iter()
        .find(|r| r.method.as_str() == "PATCH")
        .expect("no PATCH issued");
    let body: serde_json::Value = serde_json::from_slice(&patch.body).unwrap();
    let persisted = body["permissions"].as_array().unwrap();
    assert!(persisted.iter().any(|p| p == "financial:reports"));
    assert!(!persisted.iter().any(|p| p == "appointments:create"));
}
