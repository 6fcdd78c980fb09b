//! Currency reference-data endpoints.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use wayfare_core::{CurrencyFilter, NewCurrency, UpdateCurrency};

use super::parse_id;
use crate::query_types::{non_blank, CurrencyListQuery};
use crate::{ApiError, AppState};

const NOT_FOUND: &str = "Currency not found";

/// `GET /api/currencies`
pub async fn list_currencies(
    State(state): State<AppState>,
    Query(query): Query<CurrencyListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = CurrencyFilter {
        is_active: query.is_active.and_then(|b| b.into_inner()),
        code: non_blank(query.code),
        search: non_blank(query.search),
    };
    let currencies = state.currencies.list(filter).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": currencies.len(),
        "data": currencies,
    })))
}

/// `GET /api/currencies/active`
pub async fn list_active_currencies(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let currencies = state.currencies.list_active().await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": currencies.len(),
        "data": currencies,
    })))
}

/// `GET /api/currencies/exchange-rates`
///
/// Code to rate over the active currencies, for client-side conversion.
pub async fn list_exchange_rates(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let rates: BTreeMap<String, f64> = state
        .currencies
        .list_active()
        .await?
        .into_iter()
        .map(|c| (c.code, c.exchange_rate))
        .collect();
    Ok(Json(serde_json::json!({
        "success": true,
        "data": rates,
    })))
}

/// `GET /api/currencies/code/:code`
pub async fn get_currency_by_code(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.currencies.get_by_code(&code).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": currency,
    })))
}

/// `GET /api/currencies/:id`
pub async fn get_currency(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let currency = state.currencies.get(id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": currency,
    })))
}

/// `POST /api/currencies`
pub async fn create_currency(
    State(state): State<AppState>,
    Json(body): Json<NewCurrency>,
) -> Result<impl IntoResponse, ApiError> {
    let currency = state.currencies.create(body).await?;
    info!(
        subsystem = "api",
        currency_code = %currency.code,
        is_default = currency.is_default,
        "Currency created"
    );
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Currency created successfully",
            "data": currency,
        })),
    ))
}

/// `PUT /api/currencies/:id`
pub async fn update_currency(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateCurrency>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let currency = state.currencies.update(id, body).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Currency updated successfully",
        "data": currency,
    })))
}

/// `DELETE /api/currencies/:id`
pub async fn delete_currency(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.currencies.delete(id).await?;
    info!(subsystem = "api", currency_id = %id, "Currency deleted");
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Currency deleted successfully",
    })))
}
