//! Location search with staged fallback.
//!
//! A search walks a small state machine:
//!
//! ```text
//! TryTextIndex -> TryRegexPrefix -> TryRegexContains -> Done
//! ```
//!
//! - The text stage is skipped when disabled or when nothing searchable
//!   remains after sanitising. Any text-stage error, or zero matches, moves on
//!   to the prefix stage. Errors there are logged and never surfaced.
//! - The prefix stage widens to the contains stage only when it found nothing
//!   and the [`WideningPolicy`] allows it.
//! - Regex stage errors propagate to the caller.
//!
//! When the text stage finds at least one match no regex query is issued.
//!
//! [`WideningPolicy`]: crate::flags::WideningPolicy

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use wayfare_core::defaults::{PAGE_LIMIT_LIST_MAX, PAGE_LIMIT_SEARCH_MAX};
use wayfare_core::{
    Classification, LocationFilter, LocationSearchBackend, LocationType, PageRequest, QueryKind,
    Result, ScoredLocation, SearchPage, SearchPriority, SearchStage,
};

use crate::classifier::classify;
use crate::flags::SearchConfig;
use crate::regex_builder::build_regex_query;
use crate::scoring::{compare_locations, score_spec};
use crate::text_builder::build_text_query;

/// A location search as received from the HTTP layer.
#[derive(Debug, Clone, Default)]
pub struct SearchRequest {
    pub search: Option<String>,
    pub priority: Option<SearchPriority>,
    pub filter: LocationFilter,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    /// Append active children of the cities on the page.
    pub include_children: bool,
}

impl SearchRequest {
    /// Trimmed search term, or `None` when there is no search constraint.
    pub fn term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    /// Page request with the limit clamped for searching or listing.
    pub fn page_request(&self) -> PageRequest {
        let max_limit = if self.term().is_some() {
            PAGE_LIMIT_SEARCH_MAX
        } else {
            PAGE_LIMIT_LIST_MAX
        };
        PageRequest::new(self.page, self.limit, max_limit)
    }
}

/// One page of search results and how it was produced.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationPage {
    pub items: Vec<ScoredLocation>,
    /// Matches before pagination; appended children are not counted.
    pub total: i64,
    pub page: PageRequest,
    pub stage: SearchStage,
    pub classification: Classification,
}

impl LocationPage {
    pub fn total_pages(&self) -> i64 {
        self.page.total_pages(self.total)
    }

    pub fn has_next_page(&self) -> bool {
        i64::from(self.page.page) < self.total_pages()
    }

    pub fn has_prev_page(&self) -> bool {
        self.page.page > 1
    }
}

#[derive(Debug)]
enum FallbackState {
    TryTextIndex,
    TryRegexPrefix,
    TryRegexContains,
    Done(SearchStage, SearchPage),
}

/// Runs location searches against a backend with text and regex fallback.
#[derive(Clone)]
pub struct LocationSearchService {
    backend: Arc<dyn LocationSearchBackend>,
    config: SearchConfig,
}

impl LocationSearchService {
    pub fn new(backend: Arc<dyn LocationSearchBackend>, config: SearchConfig) -> Self {
        Self { backend, config }
    }

    pub fn config(&self) -> SearchConfig {
        self.config
    }

    /// Search or list locations.
    #[instrument(skip(self, request), fields(
        subsystem = "search",
        component = "fallback",
        op = "search",
        query = request.term().unwrap_or_default(),
    ))]
    pub async fn search(&self, request: SearchRequest) -> Result<LocationPage> {
        let start = Instant::now();
        let page = request.page_request();

        let (stage, result, classification) = match request.term() {
            None => {
                let result = self.backend.list_filtered(&request.filter, page).await?;
                (
                    SearchStage::Listing,
                    result,
                    Classification::new(QueryKind::Unknown),
                )
            }
            Some(term) => {
                let classification = classify(term);
                let (stage, result) = self
                    .run_fallback(term, classification, &request, page)
                    .await?;
                (stage, result, classification)
            }
        };

        let total = result.total;
        let mut items = result.items;
        if request.include_children {
            self.append_children(&mut items).await?;
        }

        info!(
            search_stage = %stage,
            query_kind = %classification.kind,
            total,
            result_count = items.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Location search completed"
        );

        Ok(LocationPage {
            items,
            total,
            page,
            stage,
            classification,
        })
    }

    async fn run_fallback(
        &self,
        term: &str,
        classification: Classification,
        request: &SearchRequest,
        page: PageRequest,
    ) -> Result<(SearchStage, SearchPage)> {
        let status = request.filter.status;
        // Regex clauses carry the status themselves.
        let residual = request.filter.without_status();

        let mut state = FallbackState::TryTextIndex;
        loop {
            state = match state {
                FallbackState::TryTextIndex => {
                    match self.try_text_index(term, classification, request, page).await {
                        Some(result) => FallbackState::Done(SearchStage::TextIndex, result),
                        None => FallbackState::TryRegexPrefix,
                    }
                }
                FallbackState::TryRegexPrefix => {
                    let Some(query) = build_regex_query(term, request.priority, status, true)
                    else {
                        return Ok((SearchStage::RegexPrefix, SearchPage::empty()));
                    };
                    let result = self.backend.search_regex(&query, &residual, page).await?;
                    debug!(
                        search_stage = "regex_prefix",
                        clause_count = query.clauses.len(),
                        total = result.total,
                        "Regex prefix stage complete"
                    );
                    if result.is_empty()
                        && self.config.widening.allows(classification, request.priority)
                    {
                        FallbackState::TryRegexContains
                    } else {
                        FallbackState::Done(SearchStage::RegexPrefix, result)
                    }
                }
                FallbackState::TryRegexContains => {
                    let Some(query) = build_regex_query(term, request.priority, status, false)
                    else {
                        return Ok((SearchStage::RegexContains, SearchPage::empty()));
                    };
                    let result = self.backend.search_regex(&query, &residual, page).await?;
                    debug!(
                        search_stage = "regex_contains",
                        clause_count = query.clauses.len(),
                        total = result.total,
                        "Regex contains stage complete"
                    );
                    FallbackState::Done(SearchStage::RegexContains, result)
                }
                FallbackState::Done(stage, result) => return Ok((stage, result)),
            };
        }
    }

    /// Returns the text-stage page when it found something, `None` to fall through.
    async fn try_text_index(
        &self,
        term: &str,
        classification: Classification,
        request: &SearchRequest,
        page: PageRequest,
    ) -> Option<SearchPage> {
        if !self.config.text_index {
            debug!("Text index disabled, skipping text stage");
            return None;
        }
        let query = build_text_query(term)?;
        let score = score_spec(term, classification, request.priority);

        match self
            .backend
            .search_text(&query, &score, &request.filter, page)
            .await
        {
            Ok(result) if !result.is_empty() => Some(result),
            Ok(_) => {
                debug!(search_stage = "text_index", "Text index found no matches");
                None
            }
            Err(e) => {
                warn!(
                    search_stage = "text_index",
                    error = %e,
                    "Text index query failed, falling back to regex"
                );
                None
            }
        }
    }

    async fn append_children(&self, items: &mut Vec<ScoredLocation>) -> Result<()> {
        let city_ids: Vec<Uuid> = items
            .iter()
            .filter(|item| item.location.location_type == LocationType::City)
            .map(|item| item.location.id)
            .collect();
        if city_ids.is_empty() {
            return Ok(());
        }

        let present: HashSet<Uuid> = items.iter().map(|item| item.location.id).collect();
        let mut children = self.backend.active_children(&city_ids).await?;
        children.retain(|child| !present.contains(&child.id));
        children.sort_by(compare_locations);

        debug!(
            parent_count = city_ids.len(),
            result_count = children.len(),
            "Appending child locations"
        );
        items.extend(children.into_iter().map(ScoredLocation::unscored));
        Ok(())
    }
}
