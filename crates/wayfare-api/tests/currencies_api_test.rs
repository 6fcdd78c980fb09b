//! Currency endpoints driven through the router.

mod common;

use std::sync::Arc;

use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::json;

use common::{get, send, FakeCurrencies};
use wayfare_api::{router, AppState};
use wayfare_search::{MemoryLocationStore, SearchConfig};

fn app() -> (Router, Arc<FakeCurrencies>) {
    let currencies = FakeCurrencies::shared();
    let app = router(AppState::in_memory(
        MemoryLocationStore::new(),
        currencies.clone(),
        SearchConfig::default(),
    ));
    (app, currencies)
}

async fn create(app: &Router, body: serde_json::Value) -> (StatusCode, serde_json::Value) {
    send(app, Method::POST, "/api/currencies", Some(body)).await
}

#[tokio::test]
async fn test_create_and_lookup_by_code() {
    let (app, _) = app();

    let (status, body) = create(&app, json!({"code": "usd", "name": "美元", "exchangeRate": 7.1})).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Currency created successfully");
    assert_eq!(body["data"]["code"], "USD");
    assert_eq!(body["data"]["decimalPlaces"], 2);

    let (status, body) = get(&app, "/api/currencies/code/usd").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["exchangeRate"], 7.1);
}

#[tokio::test]
async fn test_duplicate_code_is_bad_request() {
    let (app, _) = app();

    create(&app, json!({"code": "EUR", "name": "欧元"})).await;
    let (status, body) = create(&app, json!({"code": "eur", "name": "Euro"})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Currency code already exists");
}

#[tokio::test]
async fn test_single_default_after_create_and_update() {
    let (app, currencies) = app();

    let (_, cny) = create(&app, json!({"code": "CNY", "name": "人民币", "isDefault": true})).await;
    let (_, jpy) = create(&app, json!({"code": "JPY", "name": "日元", "isDefault": true})).await;
    assert_eq!(currencies.default_count(), 1);

    let (_, body) = get(&app, &format!("/api/currencies/{}", cny["data"]["id"].as_str().unwrap())).await;
    assert_eq!(body["data"]["isDefault"], false);

    let (status, _) = send(
        &app,
        Method::PUT,
        &format!("/api/currencies/{}", cny["data"]["id"].as_str().unwrap()),
        Some(json!({"isDefault": true})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(currencies.default_count(), 1);

    let (_, body) = get(&app, &format!("/api/currencies/{}", jpy["data"]["id"].as_str().unwrap())).await;
    assert_eq!(body["data"]["isDefault"], false);
}

#[tokio::test]
async fn test_list_filters_and_active_only() {
    let (app, _) = app();

    create(&app, json!({"code": "GBP", "name": "英镑", "displayOrder": 2})).await;
    create(&app, json!({"code": "HKD", "name": "港币", "displayOrder": 1})).await;
    create(&app, json!({"code": "MOP", "name": "澳门元", "isActive": false})).await;

    let (_, body) = get(&app, "/api/currencies").await;
    assert_eq!(body["count"], 3);
    assert_eq!(body["data"][0]["code"], "MOP");
    assert_eq!(body["data"][1]["code"], "HKD");

    let (_, body) = get(&app, "/api/currencies?isActive=false").await;
    assert_eq!(body["count"], 1);

    let (_, body) = get(&app, "/api/currencies/active").await;
    assert_eq!(body["count"], 2);
}

#[tokio::test]
async fn test_validation_and_not_found() {
    let (app, _) = app();

    let (status, body) = create(&app, json!({"code": "X", "name": "x", "decimalPlaces": 9})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "decimalPlaces must be between 0 and 4");

    let (status, body) = get(&app, "/api/currencies/code/ZZZ").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Currency not found");

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/currencies/{}", uuid::Uuid::now_v7()),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_exchange_rates_over_active_currencies() {
    let (app, _) = app();

    create(&app, json!({"code": "USD", "name": "美元", "exchangeRate": 7.1})).await;
    create(&app, json!({"code": "JPY", "name": "日元", "exchangeRate": 0.048})).await;
    create(&app, json!({"code": "MOP", "name": "澳门元", "isActive": false})).await;

    let (status, body) = get(&app, "/api/currencies/exchange-rates").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"], json!({"JPY": 0.048, "USD": 7.1}));
}

#[tokio::test]
async fn test_update_null_clears_symbol() {
    let (app, _) = app();

    let (_, created) = create(&app, json!({"code": "EUR", "name": "欧元", "symbol": "€"})).await;
    assert_eq!(created["data"]["symbol"], "€");
    let id = created["data"]["id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/currencies/{}", id),
        Some(json!({"symbol": null})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["symbol"], serde_json::Value::Null);
    assert_eq!(body["data"]["name"], "欧元");
}
