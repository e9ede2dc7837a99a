use axum_test::TestServer;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use bytes::Bytes;
use cloud_relay::{
    adapters::inbound::http::router::{create_router, AppState},
    domain::models::ErrorPolicy,
    ports::{
        services::{FetchService, RelayService},
        storage::ObjectStorage,
    },
    BucketName, FetchServiceImpl, InMemoryPublisher, ObjectName, ObjectStoreAdapter,
    RelayServiceImpl, StoreProvider,
};
use serde_json::json;
use std::sync::Arc;

const OUTPUT_TOPIC: &str = "fetched-files";
const ERROR_TOPIC: &str = "fetch-failures";

/// Server plus handles on the backends it runs over, so tests can seed
/// objects and inspect what was published.
struct TestApp {
    server: TestServer,
    storage: Arc<ObjectStoreAdapter>,
    publisher: InMemoryPublisher,
}

fn setup_test_app(policy: ErrorPolicy, with_fetch: bool) -> TestApp {
    let storage = Arc::new(ObjectStoreAdapter::new(StoreProvider::Memory));
    let publisher = InMemoryPublisher::new();

    let relay_service = RelayServiceImpl::new(
        storage.clone(),
        Arc::new(publisher.clone()),
        BucketName::new("dst".to_string()).unwrap(),
        policy,
    );

    let fetch_service = with_fetch.then(|| {
        Arc::new(FetchServiceImpl::new(
            storage.clone(),
            Arc::new(publisher.clone()),
            reqwest::Client::new(),
            OUTPUT_TOPIC,
            ERROR_TOPIC,
        )) as Arc<dyn FetchService>
    });

    let state = AppState {
        relay_service: Arc::new(relay_service) as Arc<dyn RelayService>,
        fetch_service,
    };

    let server = TestServer::new(create_router(state)).unwrap();
    TestApp {
        server,
        storage,
        publisher,
    }
}

fn bucket(name: &str) -> BucketName {
    BucketName::new(name.to_string()).unwrap()
}

fn object(name: &str) -> ObjectName {
    ObjectName::new(name.to_string()).unwrap()
}

/// Push envelope carrying a storage notification in its attributes
fn storage_envelope(bucket_id: &str, object_id: &str, event_type: &str) -> serde_json::Value {
    json!({
        "message": {
            "attributes": {
                "bucketId": bucket_id,
                "objectId": object_id,
                "eventType": event_type,
            },
            "messageId": "123456",
        },
        "subscription": "projects/test-project/subscriptions/storage-events"
    })
}

/// Push envelope carrying a base64 fetch request in its data field
fn fetch_envelope(payload: &serde_json::Value) -> serde_json::Value {
    json!({
        "message": {
            "data": BASE64.encode(payload.to_string()),
            "messageId": "123457",
        },
        "subscription": "projects/test-project/subscriptions/fetch-requests"
    })
}

#[tokio::test]
async fn health_endpoint_reports_ok() {
    let app = setup_test_app(ErrorPolicy::Suppress, false);

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "ok");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn storage_event_moves_the_object() {
    let app = setup_test_app(ErrorPolicy::Suppress, false);

    // Seed the source object
    app.storage
        .put(
            &bucket("src"),
            &object("a/b.txt"),
            Bytes::from("payload"),
            Some("text/plain"),
        )
        .await
        .unwrap();

    let response = app
        .server
        .post("/v1/events/storage")
        .json(&storage_envelope("src", "a/b.txt", "OBJECT_FINALIZE"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "moved");
    assert_eq!(body["destination"], "gs://dst/src/a/b.txt");
    assert_eq!(body["bytes"], 7);

    // The copy exists and matches the source
    let moved = app
        .storage
        .get(&bucket("dst"), &object("src/a/b.txt"))
        .await
        .unwrap();
    assert_eq!(moved, Bytes::from("payload"));
}

#[tokio::test]
async fn storage_event_skips_non_finalize_notifications() {
    let app = setup_test_app(ErrorPolicy::Suppress, false);

    let response = app
        .server
        .post("/v1/events/storage")
        .json(&storage_envelope("src", "a/b.txt", "OBJECT_DELETE"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "skipped");
    assert_eq!(body["event_type"], "OBJECT_DELETE");

    // Nothing was written
    assert!(!app
        .storage
        .exists(&bucket("dst"), &object("src/a/b.txt"))
        .await
        .unwrap());
}

#[tokio::test]
async fn storage_event_with_missing_attributes_is_rejected() {
    let app = setup_test_app(ErrorPolicy::Suppress, false);

    // Only the event type is present; the response must name every
    // missing attribute, not just the first
    let response = app
        .server
        .post("/v1/events/storage")
        .json(&json!({
            "message": {
                "attributes": { "eventType": "OBJECT_FINALIZE" },
            }
        }))
        .await;

    response.assert_status_bad_request();
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "InvalidNotification");
    assert_eq!(
        body["details"]["missing_attributes"],
        json!(["bucketId", "objectId"])
    );
}

#[tokio::test]
async fn missing_source_is_suppressed_under_the_default_policy() {
    let app = setup_test_app(ErrorPolicy::Suppress, false);

    let response = app
        .server
        .post("/v1/events/storage")
        .json(&storage_envelope("src", "no-such.csv", "OBJECT_FINALIZE"))
        .await;

    // The infrastructure sees success, so the event is not redelivered
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "suppressed");
    assert!(body["error"].as_str().unwrap().contains("not found"));
}

#[tokio::test]
async fn missing_source_is_a_server_error_under_propagate() {
    let app = setup_test_app(ErrorPolicy::Propagate, false);

    let response = app
        .server
        .post("/v1/events/storage")
        .json(&storage_envelope("src", "no-such.csv", "OBJECT_FINALIZE"))
        .await;

    response.assert_status(axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "InternalError");
}

#[tokio::test]
async fn dead_letter_policy_records_the_failure_on_its_topic() {
    let app = setup_test_app(
        ErrorPolicy::DeadLetter {
            topic: "relay-failures".to_string(),
        },
        false,
    );

    let response = app
        .server
        .post("/v1/events/storage")
        .json(&storage_envelope("src", "no-such.csv", "OBJECT_FINALIZE"))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "suppressed");

    let letters = app.publisher.published_to("relay-failures").await;
    assert_eq!(letters.len(), 1);
    let letter: serde_json::Value = serde_json::from_slice(&letters[0].data).unwrap();
    assert_eq!(letter["bucketId"], "src");
    assert_eq!(letter["objectId"], "no-such.csv");
}

#[tokio::test]
async fn fetch_endpoint_is_unavailable_when_not_configured() {
    let app = setup_test_app(ErrorPolicy::Suppress, false);

    let response = app
        .server
        .post("/v1/events/fetch")
        .json(&fetch_envelope(&json!({
            "source_file_name": "https://example.com/file.csv",
            "bucket_name": "landing",
            "destination_blob_name": "file.csv",
        })))
        .await;

    response.assert_status(axum::http::StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn fetch_event_mirrors_the_remote_file() {
    let mut remote = mockito::Server::new_async().await;
    remote
        .mock("GET", "/exports/daily.csv")
        .with_status(200)
        .with_header("content-type", "text/csv")
        .with_body("a,b\n1,2\n")
        .create_async()
        .await;

    let app = setup_test_app(ErrorPolicy::Suppress, true);

    let response = app
        .server
        .post("/v1/events/fetch")
        .json(&fetch_envelope(&json!({
            "source_file_name": format!("{}/exports/daily.csv", remote.url()),
            "bucket_name": "landing",
            "destination_blob_name": "incoming/daily.csv",
        })))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "fetched");
    assert_eq!(body["uri"], "gs://landing/incoming/daily.csv");

    // The body landed in the bucket
    let stored = app
        .storage
        .get(&bucket("landing"), &object("incoming/daily.csv"))
        .await
        .unwrap();
    assert_eq!(stored, Bytes::from("a,b\n1,2\n"));

    // A success notification went to the output topic
    let notifications = app.publisher.published_to(OUTPUT_TOPIC).await;
    assert_eq!(notifications.len(), 1);
    let notification: serde_json::Value = serde_json::from_slice(&notifications[0].data).unwrap();
    assert_eq!(notification["status"], "fetched");
    assert_eq!(notification["uri"], "gs://landing/incoming/daily.csv");
}

#[tokio::test]
async fn failed_fetch_is_reported_in_band_and_on_the_error_topic() {
    let mut remote = mockito::Server::new_async().await;
    remote
        .mock("GET", "/exports/gone.csv")
        .with_status(404)
        .create_async()
        .await;

    let app = setup_test_app(ErrorPolicy::Suppress, true);

    let source_url = format!("{}/exports/gone.csv", remote.url());
    let response = app
        .server
        .post("/v1/events/fetch")
        .json(&fetch_envelope(&json!({
            "source_file_name": source_url,
            "bucket_name": "landing",
            "destination_blob_name": "incoming/gone.csv",
        })))
        .await;

    // The push delivery still succeeds; the failure travels on the topic
    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "failed");
    assert!(body["error"].as_str().unwrap().contains("404"));

    let notifications = app.publisher.published_to(ERROR_TOPIC).await;
    assert_eq!(notifications.len(), 1);
    let notification: serde_json::Value = serde_json::from_slice(&notifications[0].data).unwrap();
    assert_eq!(notification["status"], "failed");
    assert_eq!(notification["source_url"], source_url);

    // Nothing was stored
    assert!(!app
        .storage
        .exists(&bucket("landing"), &object("incoming/gone.csv"))
        .await
        .unwrap());
}

#[tokio::test]
async fn malformed_fetch_payload_is_reported_without_redelivery() {
    let app = setup_test_app(ErrorPolicy::Suppress, true);

    // Valid base64, but the JSON inside is missing required fields
    let response = app
        .server
        .post("/v1/events/fetch")
        .json(&json!({
            "message": {
                "data": BASE64.encode(r#"{ "bucket_name": "landing" }"#),
            }
        }))
        .await;

    response.assert_status_ok();
    let body: serde_json::Value = response.json();
    assert_eq!(body["outcome"], "failed");

    // The malformed message is recorded on the error topic
    let notifications = app.publisher.published_to(ERROR_TOPIC).await;
    assert_eq!(notifications.len(), 1);
}

#[tokio::test]
async fn fetch_event_without_data_is_rejected() {
    let app = setup_test_app(ErrorPolicy::Suppress, true);

    let response = app
        .server
        .post("/v1/events/fetch")
        .json(&json!({ "message": { "attributes": {} } }))
        .await;

    response.assert_status_bad_request();
}
