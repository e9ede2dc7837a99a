use bytes::Bytes;
use chrono::Utc;
use cloud_relay::{
    domain::models::{FetchOutcome, FetchRequest},
    ports::{services::FetchService, storage::ObjectStorage},
    BucketName, FetchServiceImpl, InMemoryPublisher, ObjectName, ObjectStoreAdapter,
    StoreProvider,
};
use std::sync::Arc;

const OUTPUT_TOPIC: &str = "fetched-files";
const ERROR_TOPIC: &str = "fetch-failures";

fn setup() -> (FetchServiceImpl, Arc<ObjectStoreAdapter>, InMemoryPublisher) {
    let storage = Arc::new(ObjectStoreAdapter::new(StoreProvider::Memory));
    let publisher = InMemoryPublisher::new();
    let service = FetchServiceImpl::new(
        storage.clone(),
        Arc::new(publisher.clone()),
        reqwest::Client::new(),
        OUTPUT_TOPIC,
        ERROR_TOPIC,
    );
    (service, storage, publisher)
}

fn bucket(name: &str) -> BucketName {
    BucketName::new(name.to_string()).unwrap()
}

fn object(name: &str) -> ObjectName {
    ObjectName::new(name.to_string()).unwrap()
}

#[tokio::test]
async fn date_tokens_are_expanded_before_fetching() {
    let today = Utc::now().date_naive().format("%Y-%m-%d").to_string();

    let mut remote = mockito::Server::new_async().await;
    let mock = remote
        .mock("GET", format!("/exports/{}.csv", today).as_str())
        .with_status(200)
        .with_body("a,b\n")
        .create_async()
        .await;

    let (service, storage, _) = setup();

    let outcome = service
        .handle_request(FetchRequest {
            source_url: format!("{}/exports/$DATEISO.csv", remote.url()),
            bucket: "landing".to_string(),
            destination: "daily/$DATEISO.csv".to_string(),
            datediff: None,
        })
        .await;

    match outcome {
        FetchOutcome::Fetched { uri, bytes } => {
            assert_eq!(uri.to_string(), format!("gs://landing/daily/{}.csv", today));
            assert_eq!(bytes, 4);
        }
        other => panic!("expected a fetch, got {:?}", other),
    }

    // The expanded destination name was used for the write
    assert!(storage
        .exists(&bucket("landing"), &object(&format!("daily/{}.csv", today)))
        .await
        .unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn remote_content_type_is_applied_to_the_stored_object() {
    let mut remote = mockito::Server::new_async().await;
    remote
        .mock("GET", "/exports/regions.geojson")
        .with_status(200)
        .with_header("content-type", "application/geo+json")
        .with_body(r#"{"type":"FeatureCollection","features":[]}"#)
        .create_async()
        .await;

    let (service, storage, _) = setup();

    let outcome = service
        .handle_request(FetchRequest {
            source_url: format!("{}/exports/regions.geojson", remote.url()),
            bucket: "landing".to_string(),
            destination: "incoming/regions.geojson".to_string(),
            datediff: None,
        })
        .await;
    assert!(matches!(outcome, FetchOutcome::Fetched { .. }));

    let read = storage
        .get_stream(&bucket("landing"), &object("incoming/regions.geojson"))
        .await
        .unwrap();
    assert_eq!(read.content_type.as_deref(), Some("application/geo+json"));
}

#[tokio::test]
async fn unreachable_remote_is_reported_on_the_error_topic() {
    let (service, storage, publisher) = setup();

    // Nothing listens on this port; the connection is refused
    let outcome = service
        .handle_request(FetchRequest {
            source_url: "http://127.0.0.1:1/file.csv".to_string(),
            bucket: "landing".to_string(),
            destination: "file.csv".to_string(),
            datediff: None,
        })
        .await;

    assert!(matches!(outcome, FetchOutcome::Failed { .. }));

    let notifications = publisher.published_to(ERROR_TOPIC).await;
    assert_eq!(notifications.len(), 1);
    let notification: serde_json::Value = serde_json::from_slice(&notifications[0].data).unwrap();
    assert_eq!(notification["status"], "failed");
    assert_eq!(notification["source_url"], "http://127.0.0.1:1/file.csv");

    assert!(!storage
        .exists(&bucket("landing"), &object("file.csv"))
        .await
        .unwrap());
}

#[tokio::test]
async fn datediff_token_without_a_value_fails_before_any_request() {
    let (service, _, publisher) = setup();

    // $DATEDIFF with no datediff value cannot be expanded; no HTTP request
    // is attempted and the failure is published
    let outcome = service
        .handle_request(FetchRequest {
            source_url: "https://example.com/$DATEDIFF.csv".to_string(),
            bucket: "landing".to_string(),
            destination: "file.csv".to_string(),
            datediff: None,
        })
        .await;

    match outcome {
        FetchOutcome::Failed { error } => assert!(error.contains("datediff")),
        other => panic!("expected a failure, got {:?}", other),
    }

    assert_eq!(publisher.published_to(ERROR_TOPIC).await.len(), 1);
    assert_eq!(publisher.published_to(OUTPUT_TOPIC).await.len(), 0);
}

#[tokio::test]
async fn raw_message_payloads_are_decoded_as_fetch_requests() {
    let mut remote = mockito::Server::new_async().await;
    remote
        .mock("GET", "/exports/daily.csv")
        .with_status(200)
        .with_body("a,b\n1,2\n")
        .create_async()
        .await;

    let (service, storage, _) = setup();

    let payload = serde_json::json!({
        "source_file_name": format!("{}/exports/daily.csv", remote.url()),
        "bucket_name": "landing",
        "destination_blob_name": "incoming/daily.csv",
    });

    let outcome = service.handle_message(payload.to_string().as_bytes()).await;
    assert!(matches!(outcome, FetchOutcome::Fetched { .. }));

    let stored = storage
        .get(&bucket("landing"), &object("incoming/daily.csv"))
        .await
        .unwrap();
    assert_eq!(stored, Bytes::from("a,b\n1,2\n"));
}

#[tokio::test]
async fn undecodable_message_is_discarded_with_a_notification() {
    let (service, _, publisher) = setup();

    let outcome = service.handle_message(b"not json at all").await;
    assert!(matches!(outcome, FetchOutcome::Failed { .. }));

    let notifications = publisher.published_to(ERROR_TOPIC).await;
    assert_eq!(notifications.len(), 1);
    let notification: serde_json::Value = serde_json::from_slice(&notifications[0].data).unwrap();
    assert_eq!(notification["status"], "failed");
    // The source URL is unknown for an undecodable message
    assert!(notification.get("source_url").is_none());
}
