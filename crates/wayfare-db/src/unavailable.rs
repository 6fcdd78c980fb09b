//! Store used when the database could not be reached at startup.
//!
//! Every operation fails with [`Error::Unavailable`], which the HTTP layer
//! maps to 503. The server stays up and reports the condition through
//! `/health` instead of failing later on a missing pool.

use async_trait::async_trait;
use uuid::Uuid;

use wayfare_core::{
    Currency, CurrencyFilter, CurrencyRepository, Error, Location, LocationFilter,
    LocationRepository, LocationSearchBackend, NewCurrency, NewLocation, PageRequest,
    ParentSummary, RegexQuery, Result, ScoreSpec, SearchPage, TextQuery, UpdateCurrency,
    UpdateLocation,
};

/// Placeholder store for degraded mode.
#[derive(Debug, Clone)]
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    fn fail<T>(&self) -> Result<T> {
        Err(Error::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl LocationSearchBackend for UnavailableStore {
    async fn search_text(
        &self,
        _query: &TextQuery,
        _score: &ScoreSpec,
        _filter: &LocationFilter,
        _page: PageRequest,
    ) -> Result<SearchPage> {
        self.fail()
    }

    async fn search_regex(
        &self,
        _query: &RegexQuery,
        _filter: &LocationFilter,
        _page: PageRequest,
    ) -> Result<SearchPage> {
        self.fail()
    }

    async fn list_filtered(&self, _filter: &LocationFilter, _page: PageRequest) -> Result<SearchPage> {
        self.fail()
    }

    async fn active_children(&self, _parent_ids: &[Uuid]) -> Result<Vec<Location>> {
        self.fail()
    }
}

#[async_trait]
impl LocationRepository for UnavailableStore {
    async fn get(&self, _id: Uuid) -> Result<Location> {
        self.fail()
    }

    async fn list_by_parent(&self, _parent_id: Uuid) -> Result<Vec<Location>> {
        self.fail()
    }

    async fn parents(&self, _ids: &[Uuid]) -> Result<Vec<ParentSummary>> {
        self.fail()
    }

    async fn create(&self, _req: NewLocation) -> Result<Location> {
        self.fail()
    }

    async fn create_batch(&self, _reqs: Vec<NewLocation>) -> Result<Vec<Location>> {
        self.fail()
    }

    async fn update(&self, _id: Uuid, _req: UpdateLocation) -> Result<Location> {
        self.fail()
    }

    async fn delete(&self, _id: Uuid) -> Result<()> {
        self.fail()
    }
}

#[async_trait]
impl CurrencyRepository for UnavailableStore {
    async fn list(&self, _filter: CurrencyFilter) -> Result<Vec<Currency>> {
        self.fail()
    }

    async fn list_active(&self) -> Result<Vec<Currency>> {
        self.fail()
    }

    async fn get_by_code(&self, _code: &str) -> Result<Currency> {
        self.fail()
    }

    async fn get(&self, _id: Uuid) -> Result<Currency> {
        self.fail()
    }

    async fn create(&self, _req: NewCurrency) -> Result<Currency> {
        self.fail()
    }

    async fn update(&self, _id: Uuid, _req: UpdateCurrency) -> Result<Currency> {
        self.fail()
    }

    async fn delete(&self, _id: Uuid) -> Result<()> {
        self.fail()
    }
}
