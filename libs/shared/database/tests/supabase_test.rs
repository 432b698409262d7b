use assert_matches::assert_matches;
use reqwest::Method;
use serde_json::{json, Value};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shared_config::AppConfig;
use shared_database::{StoreError, SupabaseClient};

fn client_for(server: &MockServer) -> SupabaseClient {
    let config = AppConfig {
        supabase_url: server.uri(),
        supabase_anon_key: "test-anon-key".to_string(),
        supabase_jwt_secret: "secret".to_string(),
        ..AppConfig::default()
    };
    SupabaseClient::new(&config)
}

#[tokio::test]
async fn test_request_sends_api_key_and_anon_bearer() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/notifications"))
        .and(query_param("lue", "eq.false"))
        .and(header("apikey", "test-anon-key"))
        .and(header("authorization", "Bearer test-anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let rows: Vec<Value> = client
        .request(Method::GET, "/rest/v1/notifications?lue=eq.false", None, None)
        .await
        .unwrap();

    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_request_uses_caller_token_when_given() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/patients"))
        .and(header("authorization", "Bearer user-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    let rows: Vec<Value> = client
        .request(Method::GET, "/rest/v1/patients", Some("user-token"), None)
        .await
        .unwrap();

    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_error_statuses_are_classified() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/rest/v1/notifications"))
        .respond_with(ResponseTemplate::new(409).set_body_string("duplicate key"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/rendezvous"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);

    let conflict = client
        .request::<Value>(Method::POST, "/rest/v1/notifications", None, Some(json!({})))
        .await
        .unwrap_err();
    assert_matches!(conflict, StoreError::Constraint(_));

    let unavailable = client
        .request::<Value>(Method::GET, "/rest/v1/rendezvous", None, None)
        .await
        .unwrap_err();
    assert!(unavailable.is_connectivity());
}

#[tokio::test]
async fn test_unreachable_store_is_connectivity_error() {
    let config = AppConfig {
        // Nothing listens on the discard port
        supabase_url: "http://127.0.0.1:9".to_string(),
        supabase_anon_key: "test-anon-key".to_string(),
        ..AppConfig::default()
    };
    let client = SupabaseClient::new(&config);

    let err = client.connect().await.unwrap_err();
    assert!(err.is_connectivity());
    assert!(!client.is_connected());
}

#[tokio::test]
async fn test_connect_and_disconnect_track_session() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert!(!client.is_connected());

    client.connect().await.unwrap();
    assert!(client.is_connected());

    client.disconnect().await;
    assert!(!client.is_connected());

    client.reconnect().await.unwrap();
    assert!(client.is_connected());
}

#[tokio::test]
async fn test_connect_fails_on_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/rest/v1/"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&mock_server)
        .await;

    let client = client_for(&mock_server);
    assert_matches!(client.connect().await, Err(StoreError::Unavailable(_)));
}
