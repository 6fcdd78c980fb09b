//! Shared helpers for router tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use wayfare_core::{
    Currency, CurrencyFilter, CurrencyRepository, Error, NewCurrency, Result, UpdateCurrency,
};

/// Send one request through the router and decode the JSON body.
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

/// Currency repository over a `Vec`, enforcing unique codes and a single default.
#[derive(Default)]
pub struct FakeCurrencies {
    rows: Mutex<Vec<Currency>>,
}

impl FakeCurrencies {
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn default_count(&self) -> usize {
        self.rows.lock().unwrap().iter().filter(|c| c.is_default).count()
    }
}

fn duplicate() -> Error {
    Error::Duplicate("Currency code already exists".to_string())
}

fn not_found() -> Error {
    Error::NotFound("Currency not found".to_string())
}

#[async_trait]
impl CurrencyRepository for FakeCurrencies {
    async fn list(&self, filter: CurrencyFilter) -> Result<Vec<Currency>> {
        let mut rows: Vec<Currency> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.is_active.map_or(true, |a| c.is_active == a))
            .filter(|c| {
                filter
                    .code
                    .as_deref()
                    .map_or(true, |code| c.code.contains(&code.to_uppercase()))
            })
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.display_order, &a.code).cmp(&(b.display_order, &b.code)));
        Ok(rows)
    }

    async fn list_active(&self) -> Result<Vec<Currency>> {
        self.list(CurrencyFilter {
            is_active: Some(true),
            ..Default::default()
        })
        .await
    }

    async fn get_by_code(&self, code: &str) -> Result<Currency> {
        let code = code.trim().to_uppercase();
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.code == code)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn get(&self, id: Uuid) -> Result<Currency> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create(&self, req: NewCurrency) -> Result<Currency> {
        let req = req.normalized()?;
        let mut rows = self.rows.lock().unwrap();
        if rows.iter().any(|c| c.code == req.code) {
            return Err(duplicate());
        }
        if req.is_default {
            rows.iter_mut().for_each(|c| c.is_default = false);
        }
        let now = Utc::now();
        let currency = Currency {
            id: Uuid::now_v7(),
            code: req.code,
            name: req.name,
            name_en: req.name_en,
            symbol: req.symbol,
            exchange_rate: req.exchange_rate.unwrap_or(1.0),
            is_active: req.is_active.unwrap_or(true),
            is_default: req.is_default,
            decimal_places: req.decimal_places.unwrap_or(2),
            display_order: req.display_order.unwrap_or(0),
            remark: req.remark,
            created_at: now,
            updated_at: now,
        };
        rows.push(currency.clone());
        Ok(currency)
    }

    async fn update(&self, id: Uuid, req: UpdateCurrency) -> Result<Currency> {
        let req = req.normalized()?;
        let mut rows = self.rows.lock().unwrap();
        if let Some(code) = req.code.as_deref() {
            if rows.iter().any(|c| c.code == code && c.id != id) {
                return Err(duplicate());
            }
        }
        if !rows.iter().any(|c| c.id == id) {
            return Err(not_found());
        }
        if req.is_default == Some(true) {
            rows.iter_mut().for_each(|c| c.is_default = false);
        }
        let row = rows.iter_mut().find(|c| c.id == id).ok_or_else(not_found)?;
        if let Some(code) = req.code {
            row.code = code;
        }
        if let Some(name) = req.name {
            row.name = name;
        }
        if let Some(name_en) = req.name_en {
            row.name_en = name_en;
        }
        if let Some(symbol) = req.symbol {
            row.symbol = symbol;
        }
        if let Some(remark) = req.remark {
            row.remark = remark;
        }
        if let Some(order) = req.display_order {
            row.display_order = order;
        }
        if let Some(rate) = req.exchange_rate {
            row.exchange_rate = rate;
        }
        if let Some(active) = req.is_active {
            row.is_active = active;
        }
        if let Some(is_default) = req.is_default {
            row.is_default = is_default;
        }
        row.updated_at = Utc::now();
        Ok(row.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.len();
        rows.retain(|c| c.id != id);
        if rows.len() == before {
            return Err(not_found());
        }
        Ok(())
    }
}
