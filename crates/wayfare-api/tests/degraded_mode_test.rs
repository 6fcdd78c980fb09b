//! Server behaviour without a database connection.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::{get, send};
use wayfare_api::{router, AppState};
use wayfare_search::{MemoryLocationStore, SearchConfig};

#[tokio::test]
async fn test_data_endpoints_answer_503() {
    let app = router(AppState::unavailable(
        "database not connected",
        SearchConfig::default(),
    ));

    for uri in [
        "/api/locations",
        "/api/locations?search=Tokyo",
        "/api/currencies",
        "/api/currencies/active",
        "/api/currencies/code/USD",
    ] {
        let (status, body) = get(&app, uri).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE, "{}", uri);
        assert_eq!(body["success"], false, "{}", uri);
        assert_eq!(
            body["message"], "Service unavailable: database not connected",
            "{}",
            uri
        );
    }

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/currencies",
        Some(json!({"code": "USD", "name": "美元"})),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_health_reports_unavailable_database() {
    let app = router(AppState::unavailable("database not connected", SearchConfig::default()));

    let (status, body) = get(&app, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn test_health_ok_with_store() {
    let app = router(AppState::in_memory(
        MemoryLocationStore::new(),
        common::FakeCurrencies::shared(),
        SearchConfig::default(),
    ));

    let (_, body) = get(&app, "/health").await;

    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "connected");
}
