//! Location endpoints driven through the router with an in-memory store.

mod common;

use axum::http::{Method, StatusCode};
use axum::Router;
use serde_json::json;
use uuid::Uuid;

use common::{get, send, FakeCurrencies};
use wayfare_api::{router, AppState};
use wayfare_core::{Location, LocationStatus, LocationType};
use wayfare_search::{MemoryLocationStore, SearchConfig};

fn app_with(store: MemoryLocationStore) -> Router {
    router(AppState::in_memory(
        store,
        FakeCurrencies::shared(),
        SearchConfig::default(),
    ))
}

fn seeded() -> (MemoryLocationStore, Location) {
    let tokyo = Location::new("东京", LocationType::City)
        .with_en_name("Tokyo")
        .with_pinyin("Dongjing");
    let store = MemoryLocationStore::new().with_locations([
        tokyo.clone(),
        Location::new("东京羽田机场", LocationType::Airport)
            .with_en_name("Tokyo Haneda Airport")
            .with_code("HND")
            .with_parent(tokyo.id),
        Location::new("北京", LocationType::City)
            .with_en_name("Beijing")
            .with_pinyin("Beijing"),
        Location::new("大阪", LocationType::City)
            .with_en_name("Osaka")
            .with_status(LocationStatus::Inactive),
    ]);
    (store, tokyo)
}

#[tokio::test]
async fn test_search_returns_scored_page_with_metadata() {
    let (store, tokyo) = seeded();
    let app = app_with(store);

    let (status, body) = get(&app, "/api/locations?search=Tokyo&status=active").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"][0]["id"], tokyo.id.to_string());
    assert_eq!(body["data"][0]["matchScore"], 100);
    assert_eq!(body["data"][0]["enName"], "Tokyo");
    assert_eq!(body["data"][0]["type"], "city");
    assert_eq!(body["meta"]["kind"], "pinyin_or_english");
    assert_eq!(body["meta"]["stage"], "text_index");
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["hasPrevPage"], false);
}

#[tokio::test]
async fn test_blank_search_lists_everything() {
    let (store, _) = seeded();
    let app = app_with(store);

    let (status, body) = get(&app, "/api/locations?search=%20%20&limit=2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["meta"]["stage"], "listing");
    assert_eq!(body["pagination"]["total"], 4);
    assert_eq!(body["pagination"]["limit"], 2);
    assert_eq!(body["pagination"]["totalPages"], 2);
    assert_eq!(body["pagination"]["hasNextPage"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["data"][0]["matchScore"], 0);
}

#[tokio::test]
async fn test_garbage_paging_falls_back_to_defaults() {
    let (store, _) = seeded();
    let app = app_with(store);

    let (status, body) = get(&app, "/api/locations?page=abc&limit=-3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 20);
}

#[tokio::test]
async fn test_search_limit_is_clamped() {
    let (store, _) = seeded();
    let app = app_with(store);

    let (_, body) = get(&app, "/api/locations?search=Beijing&limit=5000").await;
    assert_eq!(body["pagination"]["limit"], 100);
}

#[tokio::test]
async fn test_code_search_and_include_children() {
    let (store, tokyo) = seeded();
    let app = app_with(store);

    let (_, body) = get(&app, "/api/locations?search=HND").await;
    assert_eq!(body["meta"]["kind"], "code");
    assert_eq!(body["data"][0]["code"], "HND");
    assert_eq!(body["data"][0]["parent"]["name"], "东京");

    let (_, body) = get(
        &app,
        "/api/locations?search=Tokyo&type=city&includeChildren=yes",
    )
    .await;
    let data = body["data"].as_array().unwrap();
    assert_eq!(body["pagination"]["total"], 1);
    assert_eq!(data.len(), 2);
    assert_eq!(data[1]["parentId"], tokyo.id.to_string());
}

#[tokio::test]
async fn test_invalid_status_is_bad_request() {
    let app = app_with(MemoryLocationStore::new());

    let (status, body) = get(&app, "/api/locations?status=archived").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid location status: archived");
}

#[tokio::test]
async fn test_get_and_list_by_parent() {
    let (store, tokyo) = seeded();
    let app = app_with(store);

    let (status, body) = get(&app, &format!("/api/locations/{}", tokyo.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "东京");
    assert_eq!(body["data"]["parent"], serde_json::Value::Null);

    let (status, body) = get(&app, &format!("/api/locations/parent/{}", tokyo.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert_eq!(body["data"][0]["code"], "HND");
    assert_eq!(body["data"][0]["parent"]["id"], tokyo.id.to_string());
}

#[tokio::test]
async fn test_missing_and_malformed_ids_are_not_found() {
    let app = app_with(MemoryLocationStore::new());

    let (status, body) = get(&app, &format!("/api/locations/{}", Uuid::now_v7())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "Location not found");

    let (status, _) = get(&app, "/api/locations/not-a-uuid").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_update_delete_roundtrip() {
    let store = MemoryLocationStore::new();
    let app = app_with(store.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/locations",
        Some(json!({"name": " 成都 ", "type": "city", "code": "ctu", "enName": "Chengdu"})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Location created successfully");
    assert_eq!(body["data"]["name"], "成都");
    assert_eq!(body["data"]["code"], "CTU");
    let id = body["data"]["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/locations/{}", id),
        Some(json!({"cityLevel": 1})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cityLevel"], 1);

    let (status, body) = send(&app, Method::DELETE, &format!("/api/locations/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Location deleted successfully");
    assert!(store.is_empty());
}

#[tokio::test]
async fn test_create_rejects_blank_name() {
    let app = app_with(MemoryLocationStore::new());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/locations",
        Some(json!({"name": "   ", "type": "city"})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Location name is required");
}

#[tokio::test]
async fn test_batch_create() {
    let store = MemoryLocationStore::new();
    let app = app_with(store.clone());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/locations/batch",
        Some(json!({"locations": [
            {"name": "上海", "type": "city"},
            {"name": "上海虹桥站", "type": "station", "code": "aoh"}
        ]})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "2 locations created successfully");
    assert_eq!(store.len(), 2);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/locations/batch",
        Some(json!({"locations": []})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Locations array is required");
}

#[tokio::test]
async fn test_get_embeds_parent_summary() {
    let tokyo = Location::new("东京", LocationType::City).with_code("tyo");
    let haneda = Location::new("东京羽田机场", LocationType::Airport)
        .with_code("HND")
        .with_parent(tokyo.id);
    let app = app_with(MemoryLocationStore::new().with_locations([tokyo.clone(), haneda.clone()]));

    let (status, body) = get(&app, &format!("/api/locations/{}", haneda.id)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["parentId"], tokyo.id.to_string());
    assert_eq!(
        body["data"]["parent"],
        json!({
            "id": tokyo.id.to_string(),
            "name": "东京",
            "code": "TYO",
            "type": "city",
            "city": null,
            "province": null,
        })
    );
}

#[tokio::test]
async fn test_update_null_unlinks_parent() {
    let tokyo = Location::new("东京", LocationType::City);
    let airport = Location::new("首都机场", LocationType::Airport)
        .with_en_name("Capital")
        .with_parent(tokyo.id);
    let store = MemoryLocationStore::new().with_locations([tokyo, airport.clone()]);
    let app = app_with(store.clone());

    let (status, body) = send(
        &app,
        Method::PUT,
        &format!("/api/locations/{}", airport.id),
        Some(json!({"parentId": null, "enName": null})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["parentId"], serde_json::Value::Null);
    assert_eq!(body["data"]["enName"], serde_json::Value::Null);
    assert_eq!(body["data"]["name"], "首都机场");

    let (_, body) = get(&app, &format!("/api/locations/{}", airport.id)).await;
    assert_eq!(body["data"]["parent"], serde_json::Value::Null);
}
