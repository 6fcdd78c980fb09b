//! Core traits for wayfare abstractions.
//!
//! These traits define the interfaces that concrete storage implementations
//! must satisfy. The HTTP layer and the search fallback controller are
//! written against them, which keeps both testable without a database.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::*;
use crate::search::*;

// =============================================================================
// LOCATION SEARCH
// =============================================================================

/// Executes location search queries against a store.
///
/// Every method returns one page of results ordered by
/// `(matchScore desc, type rank asc, name asc)` together with the total match
/// count before pagination.
#[async_trait]
pub trait LocationSearchBackend: Send + Sync {
    /// Run a text-index query. Fails when the text index is not available.
    async fn search_text(
        &self,
        query: &TextQuery,
        score: &ScoreSpec,
        filter: &LocationFilter,
        page: PageRequest,
    ) -> Result<SearchPage>;

    /// Run a staged regex query. Status constraints live in the clauses.
    async fn search_regex(
        &self,
        query: &RegexQuery,
        filter: &LocationFilter,
        page: PageRequest,
    ) -> Result<SearchPage>;

    /// List locations matching the filter only, every score 0.
    async fn list_filtered(&self, filter: &LocationFilter, page: PageRequest)
        -> Result<SearchPage>;

    /// Active locations whose parent is one of `parent_ids`.
    async fn active_children(&self, parent_ids: &[Uuid]) -> Result<Vec<Location>>;
}

// =============================================================================
// LOCATION REPOSITORY
// =============================================================================

/// Repository for location CRUD operations.
#[async_trait]
pub trait LocationRepository: Send + Sync {
    /// Fetch a location by ID.
    async fn get(&self, id: Uuid) -> Result<Location>;

    /// All locations whose parent is `parent_id`, ordered by type rank then name.
    async fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<Location>>;

    /// Summaries of the given locations in one lookup; unknown ids are skipped.
    async fn parents(&self, ids: &[Uuid]) -> Result<Vec<ParentSummary>>;

    /// Insert a location.
    async fn create(&self, req: NewLocation) -> Result<Location>;

    /// Insert several locations in a single transaction.
    async fn create_batch(&self, reqs: Vec<NewLocation>) -> Result<Vec<Location>>;

    /// Apply a partial update.
    async fn update(&self, id: Uuid, req: UpdateLocation) -> Result<Location>;

    /// Permanently delete a location. Children keep existing with no parent.
    async fn delete(&self, id: Uuid) -> Result<()>;
}

// =============================================================================
// CURRENCY REPOSITORY
// =============================================================================

/// Repository for currency CRUD operations.
#[async_trait]
pub trait CurrencyRepository: Send + Sync {
    /// List currencies ordered by display order then code.
    async fn list(&self, filter: CurrencyFilter) -> Result<Vec<Currency>>;

    /// Active currencies only.
    async fn list_active(&self) -> Result<Vec<Currency>>;

    /// Look up by code (case-insensitive).
    async fn get_by_code(&self, code: &str) -> Result<Currency>;

    /// Fetch a currency by ID.
    async fn get(&self, id: Uuid) -> Result<Currency>;

    /// Insert a currency; clears the default flag elsewhere when `is_default`.
    async fn create(&self, req: NewCurrency) -> Result<Currency>;

    /// Apply a partial update; clears the default flag elsewhere when set.
    async fn update(&self, id: Uuid, req: UpdateCurrency) -> Result<Currency>;

    /// Permanently delete a currency.
    async fn delete(&self, id: Uuid) -> Result<()>;
}
