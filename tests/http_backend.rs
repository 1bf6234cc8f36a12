//! End-to-end tests: controller over the real HTTP source against a mock backend.

use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cyberhound::config::Config;
use cyberhound::feed::{
    build_client, FeedSyncController, FixtureProvider, HttpIntelSource, ScanOutcome, SyncOptions,
    SyncStatus, FIXTURE_COUNT,
};

fn controller_for(server: &MockServer) -> FeedSyncController<HttpIntelSource> {
    let config = Config {
        api_base: server.uri(),
        request_timeout_secs: 2,
        boot_sequence: false,
        ..Config::default()
    };
    let source = HttpIntelSource::from_config(build_client().unwrap(), &config).unwrap();
    FeedSyncController::new(
        source,
        FixtureProvider::default(),
        SyncOptions::from_config(&config),
    )
}

#[tokio::test]
async fn test_live_feed_end_to_end() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest_deals.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "extracted_intel": [
                { "id": "GHOST-7", "title": "SMART CONTRACT AUDIT", "reward": "$2500 USDC" }
            ]
        })))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    controller.initialize().await;

    assert_eq!(controller.status(), SyncStatus::ConnectedLive);
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].label, "SMART CONTRACT AUDIT");
    assert_eq!(
        snapshot[0].detail_text("reward").as_deref(),
        Some("$2500 USDC")
    );
}

#[tokio::test]
async fn test_server_error_falls_back_to_fixtures() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/latest_deals.json"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    assert_eq!(controller.poll().await, SyncStatus::OfflineSimulated);
    assert_eq!(controller.snapshot().len(), FIXTURE_COUNT);
}

#[tokio::test]
async fn test_oversized_feed_falls_back_to_fixtures() {
    let server = MockServer::start().await;
    let padding = " ".repeat(6 * 1024 * 1024);
    Mock::given(method("GET"))
        .and(path("/latest_deals.json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(format!("[{{ \"id\": 1, \"brand\": \"Huge\" }}{}]", padding)),
        )
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    assert_eq!(controller.poll().await, SyncStatus::OfflineSimulated);
    assert_eq!(controller.snapshot().len(), FIXTURE_COUNT);
    assert_eq!(controller.message(), "LINK FAILURE // RUNNING SIMULATION");
}

#[tokio::test]
async fn test_slow_backend_times_out_into_simulation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{ "id": 1, "brand": "Late" }]))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    assert_eq!(controller.poll().await, SyncStatus::OfflineSimulated);
}

#[tokio::test]
async fn test_scan_posts_target_then_repolls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/scan"))
        .and(query_param("target", "adobe"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "status": "SUCCESS", "deals_found": 2 })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/latest_deals.json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            { "id": 1, "brand": "Adobe" },
            { "id": 2, "brand": "Figma" }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let controller = controller_for(&server);
    let outcome = controller.trigger_scan("adobe").await;

    assert_eq!(
        outcome,
        ScanOutcome::Completed {
            found: Some(2),
            status: SyncStatus::ConnectedLive
        }
    );
    assert_eq!(controller.snapshot().len(), 2);
}

#[tokio::test]
async fn test_unreachable_backend_runs_simulation() {
    let config = Config {
        api_base: "http://127.0.0.1:9".to_string(),
        request_timeout_secs: 2,
        boot_sequence: false,
        ..Config::default()
    };
    let source = HttpIntelSource::from_config(build_client().unwrap(), &config).unwrap();
    let controller = FeedSyncController::new(
        source,
        FixtureProvider::default(),
        SyncOptions::from_config(&config),
    );

    assert_eq!(controller.poll().await, SyncStatus::OfflineSimulated);
    assert!(matches!(
        controller.trigger_scan("remote").await,
        ScanOutcome::Failed(_)
    ));
    assert_eq!(controller.snapshot().len(), FIXTURE_COUNT);
}
