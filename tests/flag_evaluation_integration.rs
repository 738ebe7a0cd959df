//! Integration tests for flag evaluation with Wiremock
//!
//! Drives the fault injector through the OFREP adapter against a mock
//! flag backend.

use product_catalog::adapters::outbound::{OfrepConfig, OfrepFlagEvaluator};
use product_catalog::{
    CatalogService, CatalogError, CatalogStore, FailureConfig, FailureRate, FaultDraw,
    FaultInjector, Money, Product,
};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FLAG_PATH: &str = "/ofrep/v1/evaluate/flags/productCatalogFailure";

struct NoDraw;

impl FaultDraw for NoDraw {
    fn draw(&self) -> u32 {
        999
    }
}

fn product(id: &str, name: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: String::new(),
        picture: String::new(),
        price_usd: Money::new("USD", 1, 0),
        categories: Vec::new(),
    }
}

fn create_service(base_url: String, timeout: Duration) -> CatalogService {
    let flags = OfrepFlagEvaluator::new(OfrepConfig { base_url, timeout }).unwrap();
    let faults = FaultInjector::new(
        FailureConfig::new(FailureRate::never()),
        Arc::new(NoDraw),
        Arc::new(flags),
    );
    let store = CatalogStore::new(vec![
        product("OLJCESPC7Z", "Explorascope"),
        product("66VCHSJNUP", "Starsense Explorer"),
    ]);
    CatalogService::new(store, faults)
}

/// Test the sentinel fails while the remote flag is on
#[tokio::test]
async fn test_remote_flag_enabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(FLAG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "value": true, "variant": "on" })),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let service = create_service(mock_server.uri(), Duration::from_millis(500));

    let err = service.get_product("OLJCESPC7Z").await.unwrap_err();
    assert!(matches!(err, CatalogError::Internal(_)));

    // Non-sentinel ids never reach the flag backend (expect(1) above)
    assert!(service.get_product("66VCHSJNUP").await.is_ok());
}

/// Test the sentinel is served while the remote flag is off
#[tokio::test]
async fn test_remote_flag_disabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(FLAG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "value": false, "variant": "off" })),
        )
        .mount(&mock_server)
        .await;

    let service = create_service(mock_server.uri(), Duration::from_millis(500));
    let product = service.get_product("OLJCESPC7Z").await.unwrap();
    assert_eq!(product.name, "Explorascope");
}

/// Test flag changes are picked up per request
#[tokio::test]
async fn test_remote_flag_toggled() {
    let mock_server = MockServer::start().await;

    let enabled = Mock::given(method("POST"))
        .and(path(FLAG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": true })))
        .mount_as_scoped(&mock_server)
        .await;

    let service = create_service(mock_server.uri(), Duration::from_millis(500));
    assert!(service.get_product("OLJCESPC7Z").await.is_err());
    drop(enabled);

    Mock::given(method("POST"))
        .and(path(FLAG_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "value": false })))
        .mount(&mock_server)
        .await;

    assert!(service.get_product("OLJCESPC7Z").await.is_ok());
}

/// Test a flag backend error leaves the sentinel available
#[tokio::test]
async fn test_remote_flag_error_defaults_to_disabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(FLAG_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let service = create_service(mock_server.uri(), Duration::from_millis(500));
    assert!(service.get_product("OLJCESPC7Z").await.is_ok());
}

/// Test a slow flag backend is bounded by the evaluation timeout
#[tokio::test]
async fn test_remote_flag_timeout_defaults_to_disabled() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(FLAG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "value": true }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let service = create_service(mock_server.uri(), Duration::from_millis(100));

    let started = std::time::Instant::now();
    assert!(service.get_product("OLJCESPC7Z").await.is_ok());
    assert!(started.elapsed() < Duration::from_secs(1));
}

/// Test a cancelled request abandons the flag evaluation
#[tokio::test]
async fn test_cancelled_request_abandons_flag_evaluation() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(FLAG_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "value": true }))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let service = create_service(mock_server.uri(), Duration::from_secs(5));

    let result =
        tokio::time::timeout(Duration::from_millis(100), service.get_product("OLJCESPC7Z")).await;
    assert!(result.is_err());
}
