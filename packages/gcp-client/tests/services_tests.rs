//! Facade URL shapes, bodies and operation handling against a mock backend.

use chrono::{TimeZone, Utc};
use gcp_client::services::dataplex::Lake;
use gcp_client::services::dlp::{ContentItem, InfoType, InspectConfig};
use gcp_client::services::secret_manager::{Replication, Secret};
use gcp_client::services::speech::{RecognitionAudio, RecognitionConfig};
use gcp_client::services::storage_control::AnywhereCache;
use gcp_client::{ClientConfig, FieldMask, GcpClient, StaticToken};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> GcpClient {
    let config = ClientConfig {
        endpoint_override: Some(server.uri()),
        poll_interval: Duration::from_millis(10),
        ..Default::default()
    };
    GcpClient::new(Arc::new(StaticToken::new("test-token")), config).unwrap()
}

// =============================================================================
// Secret Manager
// =============================================================================

#[tokio::test]
async fn test_create_secret_sends_id_and_replication() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/p/secrets"))
        .and(query_param("secretId", "db-password"))
        .and(body_json(json!({"replication": {"automatic": {}}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/123/secrets/db-password",
            "replication": {"automatic": {}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let secret = Secret {
        replication: Some(Replication::automatic()),
        ..Default::default()
    };
    let created = client
        .secret_manager(None)
        .create_secret("projects/p", "db-password", &secret)
        .await
        .unwrap();
    assert_eq!(created.name, "projects/123/secrets/db-password");
}

#[tokio::test]
async fn test_add_and_access_secret_version() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/p/secrets/s:addVersion"))
        .and(body_json(json!({"payload": {"data": "aHVudGVyMg=="}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/123/secrets/s/versions/1",
            "state": "ENABLED"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/p/secrets/s/versions/latest:access"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/123/secrets/s/versions/1",
            "payload": {"data": "aHVudGVyMg=="}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let secrets = client.secret_manager(None);
    let version = secrets
        .add_secret_version("projects/p/secrets/s", b"hunter2")
        .await
        .unwrap();
    assert_eq!(version.name, "projects/123/secrets/s/versions/1");

    let accessed = secrets
        .access_secret_version("projects/p/secrets/s/versions/latest")
        .await
        .unwrap();
    assert_eq!(accessed.data().unwrap(), b"hunter2");
}

#[tokio::test]
async fn test_update_secret_sends_mask() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/v1/projects/p/secrets/s"))
        .and(query_param("updateMask", "labels"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/p/secrets/s",
            "labels": {"env": "prod"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let secret = Secret {
        name: "projects/p/secrets/s".into(),
        labels: HashMap::from([("env".to_string(), "prod".to_string())]),
        ..Default::default()
    };
    let updated = client
        .secret_manager(None)
        .update_secret(&secret, &FieldMask::new().with("labels"))
        .await
        .unwrap();
    assert_eq!(updated.labels.get("env").map(String::as_str), Some("prod"));
}

// =============================================================================
// Dataplex
// =============================================================================

#[tokio::test]
async fn test_create_lake_waits_for_operation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/p/locations/us-central1/lakes"))
        .and(query_param("lakeId", "sales"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/p/locations/us-central1/operations/op-7",
            "done": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/projects/p/locations/us-central1/operations/op-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/p/locations/us-central1/operations/op-7",
            "done": true,
            "response": {
                "name": "projects/p/locations/us-central1/lakes/sales",
                "state": "ACTIVE"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let lake = client
        .dataplex()
        .create_lake("projects/p/locations/us-central1", "sales", &Lake::default())
        .await
        .unwrap();
    assert_eq!(lake.name, "projects/p/locations/us-central1/lakes/sales");
    assert_eq!(lake.state.as_deref(), Some("ACTIVE"));
}

#[tokio::test]
async fn test_search_entries_posts_query() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/projects/p/locations/global:searchEntries"))
        .and(query_param("query", "orders"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "results": [{
                "linkedResource": "//bigquery.googleapis.com/projects/p/datasets/d/tables/orders",
                "dataplexEntry": {"name": "projects/p/locations/us/entryGroups/@bigquery/entries/orders"}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let results = client
        .dataplex()
        .search_entries("projects/p/locations/global", "orders")
        .await
        .unwrap();
    assert_eq!(results.len(), 1);
    assert!(results[0]
        .linked_resource
        .as_deref()
        .unwrap_or_default()
        .ends_with("tables/orders"));
}

// =============================================================================
// DLP
// =============================================================================

#[tokio::test]
async fn test_inspect_content_decodes_findings() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/projects/p/locations/global/content:inspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": {"findings": [{
                "quote": "555-0100",
                "infoType": {"name": "PHONE_NUMBER"},
                "likelihood": "LIKELY"
            }]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let config = InspectConfig {
        info_types: vec![InfoType::new("PHONE_NUMBER")],
        include_quote: Some(true),
        ..Default::default()
    };
    let response = client
        .dlp()
        .inspect_content(
            "projects/p/locations/global",
            &ContentItem::text("call 555-0100"),
            &config,
        )
        .await
        .unwrap();
    let findings = response.result.findings;
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].quote.as_deref(), Some("555-0100"));
}

// =============================================================================
// Monitoring
// =============================================================================

#[tokio::test]
async fn test_list_time_series_sends_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v3/projects/p/timeSeries"))
        .and(query_param("filter", "metric.type = \"custom.googleapis.com/x\""))
        .and(query_param("interval.startTime", "2024-05-01T10:00:00Z"))
        .and(query_param("interval.endTime", "2024-05-01T10:20:00Z"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "timeSeries": [{
                "metric": {"type": "custom.googleapis.com/x"},
                "resource": {"type": "global", "labels": {"project_id": "p"}},
                "points": [{
                    "interval": {"endTime": "2024-05-01T10:10:00Z"},
                    "value": {"doubleValue": 3.5}
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let start = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
    let end = Utc.with_ymd_and_hms(2024, 5, 1, 10, 20, 0).unwrap();
    let series = client
        .monitoring()
        .list_time_series("projects/p", "metric.type = \"custom.googleapis.com/x\"", start, end)
        .await
        .unwrap();
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].points[0].value.display(), "3.5");
}

// =============================================================================
// Speech
// =============================================================================

#[tokio::test]
async fn test_long_running_recognize_polls_v1_operations() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/speech:longrunningrecognize"))
        .and(body_json(json!({
            "config": {"languageCode": "en-US"},
            "audio": {"uri": "gs://bucket/audio.flac"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "4242"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/operations/4242"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "4242",
            "done": true,
            "response": {"results": [{"alternatives": [{"transcript": "hello world", "confidence": 0.9}]}]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let config = RecognitionConfig {
        language_code: "en-US".into(),
        ..Default::default()
    };
    let response = client
        .speech(None)
        .long_running_recognize(&config, &RecognitionAudio::uri("gs://bucket/audio.flac"))
        .await
        .unwrap();
    let transcripts: Vec<&str> = response.transcripts().map(|a| a.transcript.as_str()).collect();
    assert_eq!(transcripts, vec!["hello world"]);
}

// =============================================================================
// Storage control
// =============================================================================

#[tokio::test]
async fn test_folder_names_are_encoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/storage/v1/b/my-bucket/folders/logs%2F2024%2F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "bucket": "my-bucket",
            "name": "logs/2024/"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let folder = client
        .storage_control()
        .get_folder("my-bucket", "logs/2024/")
        .await
        .unwrap();
    assert_eq!(folder.name, "logs/2024/");
}

#[tokio::test]
async fn test_rename_folder_polls_bucket_operation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/b/my-bucket/folders/a%2F/renameTo/folders/b%2F"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/_/buckets/my-bucket/operations/rename-1",
            "done": false
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/storage/v1/b/my-bucket/operations/rename-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/_/buckets/my-bucket/operations/rename-1",
            "done": true,
            "response": {"bucket": "my-bucket", "name": "b/"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    client
        .storage_control()
        .rename_folder("my-bucket", "a/", "b/")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_create_anywhere_cache_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/storage/v1/b/my-bucket/anywhereCaches"))
        .and(body_json(json!({
            "zone": "us-central1-a",
            "ttl": "86400s",
            "admissionPolicy": "admit-on-first-miss"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "projects/_/buckets/my-bucket/operations/cache-1",
            "done": true,
            "response": {
                "bucket": "my-bucket",
                "anywhereCacheId": "us-central1-a",
                "zone": "us-central1-a",
                "state": "running"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server);
    let cache = AnywhereCache {
        zone: "us-central1-a".into(),
        ttl: Some("86400s".into()),
        admission_policy: Some("admit-on-first-miss".into()),
        ..Default::default()
    };
    let created = client
        .storage_control()
        .create_anywhere_cache("my-bucket", &cache)
        .await
        .unwrap();
    assert_eq!(created.anywhere_cache_id.as_deref(), Some("us-central1-a"));
    assert_eq!(created.state.as_deref(), Some("running"));
}
