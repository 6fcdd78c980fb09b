//! # wayfare-api
//!
//! HTTP surface for location search and currency reference data.
//!
//! The binary in `main.rs` owns process concerns (logging, configuration,
//! database connection, middleware). This library owns the routes and the
//! shared [`AppState`], so tests can drive the router without a server.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;

use wayfare_core::{CurrencyRepository, LocationRepository};
use wayfare_db::{Database, UnavailableStore};
use wayfare_search::{LocationSearchService, MemoryLocationStore, SearchConfig};

pub mod config;
pub mod error;
pub mod handlers;
pub mod query_types;

pub use error::ApiError;

/// What the repositories are backed by.
#[derive(Clone)]
pub enum Backing {
    Postgres(Database),
    Memory,
    /// Degraded mode; every data call fails with the given reason.
    Unavailable(String),
}

/// State shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub locations: Arc<dyn LocationRepository>,
    pub currencies: Arc<dyn CurrencyRepository>,
    pub search: LocationSearchService,
    pub backing: Backing,
}

impl AppState {
    /// State over a connected PostgreSQL database.
    pub fn with_database(db: Database, config: SearchConfig) -> Self {
        let locations = Arc::new(db.locations.clone());
        Self {
            search: LocationSearchService::new(locations.clone(), config),
            locations,
            currencies: Arc::new(db.currencies.clone()),
            backing: Backing::Postgres(db),
        }
    }

    /// Degraded-mode state: data endpoints answer 503.
    pub fn unavailable(reason: impl Into<String>, config: SearchConfig) -> Self {
        let reason = reason.into();
        let store = Arc::new(UnavailableStore::new(reason.clone()));
        Self {
            search: LocationSearchService::new(store.clone(), config),
            locations: store.clone(),
            currencies: store,
            backing: Backing::Unavailable(reason),
        }
    }

    /// State over an in-memory location store.
    pub fn in_memory(
        store: MemoryLocationStore,
        currencies: Arc<dyn CurrencyRepository>,
        config: SearchConfig,
    ) -> Self {
        let store = Arc::new(store);
        Self {
            search: LocationSearchService::new(store.clone(), config),
            locations: store,
            currencies,
            backing: Backing::Memory,
        }
    }
}

/// All routes with state applied; middleware is layered by the caller.
pub fn router(state: AppState) -> Router {
    use handlers::{currencies, health, locations};

    Router::new()
        .route("/health", get(health::health_check))
        // Locations
        .route(
            "/api/locations",
            get(locations::list_locations).post(locations::create_location),
        )
        .route("/api/locations/batch", post(locations::create_locations_batch))
        .route(
            "/api/locations/parent/:parent_id",
            get(locations::list_by_parent),
        )
        .route(
            "/api/locations/:id",
            get(locations::get_location)
                .put(locations::update_location)
                .delete(locations::delete_location),
        )
        // Currencies
        .route(
            "/api/currencies",
            get(currencies::list_currencies).post(currencies::create_currency),
        )
        .route("/api/currencies/active", get(currencies::list_active_currencies))
        .route(
            "/api/currencies/exchange-rates",
            get(currencies::list_exchange_rates),
        )
        .route("/api/currencies/code/:code", get(currencies::get_currency_by_code))
        .route(
            "/api/currencies/:id",
            get(currencies::get_currency)
                .put(currencies::update_currency)
                .delete(currencies::delete_currency),
        )
        .with_state(state)
}
