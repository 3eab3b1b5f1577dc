//! Request plumbing against a mock backend: headers, errors, pages,
//! operations and token endpoints.

use gcp_client::auth::{AuthorizedUser, AuthorizedUserKey, CachedTokenProvider, MetadataServer};
use gcp_client::{ClientConfig, Code, GcpClient, GcpError, Operation, StaticToken, TokenProvider};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer, config: ClientConfig) -> GcpClient {
    let config = ClientConfig {
        endpoint_override: Some(server.uri()),
        poll_interval: Duration::from_millis(10),
        ..config
    };
    GcpClient::new(Arc::new(StaticToken::new("test-token")), config).unwrap()
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Widgets {
    #[serde(default)]
    widgets: Vec<String>,
    #[serde(default)]
    next_page_token: Option<String>,
}

gcp_client::impl_page!(Widgets, widgets, String);

#[tokio::test]
async fn test_sends_bearer_token_and_quota_project() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/things/a"))
        .and(header("authorization", "Bearer test-token"))
        .and(header("x-goog-user-project", "billing-project"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "things/a"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(
        &server,
        ClientConfig {
            quota_project: Some("billing-project".into()),
            ..Default::default()
        },
    );
    let url = format!("{}/v1/things/a", client.base_url("things.googleapis.com"));
    let value: Value = client.get(&url, &[]).await.unwrap();
    assert_eq!(value["name"], "things/a");
}

#[tokio::test]
async fn test_empty_delete_body_decodes() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/things/a"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = client_for(&server, ClientConfig::default());
    let url = format!("{}/v1/things/a", server.uri());
    let value: Value = client.delete(&url, &[]).await.unwrap();
    assert_eq!(value, json!({}));
}

#[tokio::test]
async fn test_error_envelope_maps_to_code() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/things/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": {"code": 404, "message": "Thing missing not found", "status": "NOT_FOUND"}
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/things"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "error": {"code": 409, "message": "Thing already exists", "status": "ALREADY_EXISTS"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, ClientConfig::default());

    let err = client
        .get::<Value>(&format!("{}/v1/things/missing", server.uri()), &[])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message(), Some("Thing missing not found"));

    let err = client
        .post::<_, Value>(&format!("{}/v1/things", server.uri()), &[], &json!({}))
        .await
        .unwrap_err();
    assert!(err.is_already_exists());
}

#[tokio::test]
async fn test_plain_text_error_uses_http_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden"))
        .mount(&server)
        .await;

    let client = client_for(&server, ClientConfig::default());
    let err = client
        .get::<Value>(&format!("{}/v1/anything", server.uri()), &[])
        .await
        .unwrap_err();
    match err {
        GcpError::Api(status) => {
            assert_eq!(status.code, Code::PermissionDenied);
            assert_eq!(status.http_status, Some(403));
            assert_eq!(status.message, "Forbidden");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_list_all_follows_page_tokens() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"widgets": ["c"]})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/widgets"))
        .and(query_param("filter", "color=blue"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "widgets": ["a", "b"],
            "nextPageToken": "page-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, ClientConfig::default());
    let url = format!("{}/v1/widgets", server.uri());
    let widgets = client
        .list_all::<Widgets>(&url, &[("filter", "color=blue".to_string())])
        .await
        .unwrap();
    assert_eq!(widgets, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_wait_operation_polls_until_done() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": false
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/operations/op-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": true,
            "response": {"name": "things/a"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, ClientConfig::default());
    let started = Operation {
        name: "operations/op-1".into(),
        ..Default::default()
    };
    let base = format!("{}/v1", server.uri());
    let result: Value = client
        .wait_operation_as(started, |name| format!("{}/{}", base, name))
        .await
        .unwrap();
    assert_eq!(result["name"], "things/a");

    let polls = server.received_requests().await.unwrap();
    assert_eq!(polls.len(), 2);
}

#[tokio::test]
async fn test_failed_operation_is_operation_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/operations/op-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-2",
            "done": true,
            "error": {"code": 6, "message": "Lake already exists"}
        })))
        .mount(&server)
        .await;

    let client = client_for(&server, ClientConfig::default());
    let started = Operation {
        name: "operations/op-2".into(),
        ..Default::default()
    };
    let base = format!("{}/v1", server.uri());
    let err = client
        .wait_operation_as::<Value>(started, |name| format!("{}/{}", base, name))
        .await
        .unwrap_err();
    assert!(matches!(err, GcpError::Operation(_)));
    assert!(err.is_already_exists());
}

#[tokio::test]
async fn test_wait_operation_times_out() {
    let server = MockServer::start().await;
    let client = client_for(
        &server,
        ClientConfig {
            operation_timeout: Duration::ZERO,
            ..Default::default()
        },
    );
    let started = Operation {
        name: "operations/slow".into(),
        ..Default::default()
    };
    let err = client
        .wait_operation(started, |name| format!("{}/v1/{}", server.uri(), name))
        .await
        .unwrap_err();
    assert!(matches!(err, GcpError::Timeout(name) if name == "operations/slow"));
}

#[tokio::test]
async fn test_authorized_user_refresh_grant() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains("refresh_token=refresh-me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.user",
            "expires_in": 3599,
            "token_type": "Bearer"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let key = AuthorizedUserKey {
        client_id: "client".into(),
        client_secret: "secret".into(),
        refresh_token: "refresh-me".into(),
        quota_project_id: None,
        token_uri: format!("{}/token", server.uri()),
    };
    let provider = CachedTokenProvider::new(AuthorizedUser::new(key, reqwest::Client::new()));

    let first = provider.access_token().await.unwrap();
    let second = provider.access_token().await.unwrap();
    assert_eq!(first.token, "ya29.user");
    assert_eq!(second.token, "ya29.user");
    assert!(!first.is_expired());
}

#[tokio::test]
async fn test_token_endpoint_failure_is_auth_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"error":"invalid_grant"}"#))
        .mount(&server)
        .await;

    let key = AuthorizedUserKey {
        client_id: "client".into(),
        client_secret: "secret".into(),
        refresh_token: "revoked".into(),
        quota_project_id: None,
        token_uri: format!("{}/token", server.uri()),
    };
    let err = AuthorizedUser::new(key, reqwest::Client::new())
        .access_token()
        .await
        .unwrap_err();
    match err {
        GcpError::Auth(message) => assert!(message.contains("invalid_grant")),
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_metadata_server_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/computeMetadata/v1/instance/service-accounts/default/token"))
        .and(header("Metadata-Flavor", "Google"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "ya29.gce",
            "expires_in": 1800
        })))
        .mount(&server)
        .await;

    let provider = MetadataServer::new("unused", reqwest::Client::new()).with_base_url(server.uri());
    let token = provider.access_token().await.unwrap();
    assert_eq!(token.token, "ya29.gce");
}
