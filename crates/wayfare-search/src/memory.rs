//! In-process location store.
//!
//! Implements [`LocationSearchBackend`] and [`LocationRepository`] over a
//! `Vec<Location>` using the same matching, scoring and ordering rules as the
//! SQL renderer. Used by tests throughout the workspace and handy for local
//! runs without PostgreSQL.
//!
//! ```rust
//! use wayfare_core::{Location, LocationType};
//! use wayfare_search::memory::MemoryLocationStore;
//!
//! let store = MemoryLocationStore::new()
//!     .with_location(Location::new("东京", LocationType::City).with_en_name("Tokyo"))
//!     .with_text_index(false);
//! assert_eq!(store.len(), 1);
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use wayfare_core::defaults;
use wayfare_core::{
    Error, Location, LocationFilter, LocationRepository, LocationSearchBackend, LocationStatus,
    NewLocation, PageRequest, ParentSummary, RegexQuery, Result, ScoreSpec, ScoredLocation,
    SearchPage, TextQuery, UpdateLocation,
};

use crate::regex_builder;
use crate::scoring::{compare_locations, score_and_rank};

/// A backend call recorded for assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Text { search: String },
    Regex { prefix_only: bool, clause_count: usize },
    List,
    Children { parent_count: usize },
}

#[derive(Debug)]
struct StoreState {
    locations: Vec<Location>,
    text_index: bool,
}

/// Location store held in memory.
#[derive(Clone)]
pub struct MemoryLocationStore {
    state: Arc<Mutex<StoreState>>,
    call_log: Arc<Mutex<Vec<BackendCall>>>,
}

impl Default for MemoryLocationStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLocationStore {
    /// Create an empty store with the text index available.
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(StoreState {
                locations: Vec::new(),
                text_index: true,
            })),
            call_log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn with_location(self, location: Location) -> Self {
        self.insert(location);
        self
    }

    pub fn with_locations(self, locations: impl IntoIterator<Item = Location>) -> Self {
        for location in locations {
            self.insert(location);
        }
        self
    }

    /// Toggle text index availability. When unavailable, text queries fail
    /// the way a missing `search_tsv` column does.
    pub fn with_text_index(self, available: bool) -> Self {
        self.set_text_index(available);
        self
    }

    pub fn set_text_index(&self, available: bool) {
        lock(&self.state).text_index = available;
    }

    pub fn insert(&self, location: Location) {
        lock(&self.state).locations.push(location);
    }

    pub fn len(&self) -> usize {
        lock(&self.state).locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get all logged calls for assertion.
    pub fn calls(&self) -> Vec<BackendCall> {
        lock(&self.call_log).clone()
    }

    /// Number of regex queries issued so far.
    pub fn regex_call_count(&self) -> usize {
        lock(&self.call_log)
            .iter()
            .filter(|call| matches!(call, BackendCall::Regex { .. }))
            .count()
    }

    pub fn clear_calls(&self) {
        lock(&self.call_log).clear();
    }

    fn record(&self, call: BackendCall) {
        lock(&self.call_log).push(call);
    }

    fn snapshot(&self) -> Vec<Location> {
        lock(&self.state).locations.clone()
    }
}

/// Recover the guard from a poisoned lock; the data is plain values.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn filter_matches(filter: &LocationFilter, location: &Location) -> bool {
    if let Some(status) = filter.status {
        if location.status != status {
            return false;
        }
    }
    if let Some(location_type) = filter.location_type {
        if location.location_type != location_type {
            return false;
        }
    }
    contains_ci(location.city.as_deref(), filter.city.as_deref())
        && contains_ci(location.country.as_deref(), filter.country.as_deref())
}

fn contains_ci(value: Option<&str>, needle: Option<&str>) -> bool {
    match needle {
        None => true,
        Some(needle) => value
            .map(|v| v.to_lowercase().contains(&needle.to_lowercase()))
            .unwrap_or(false),
    }
}

/// Lower-cased words of the fields covered by the text index.
fn text_tokens(location: &Location) -> Vec<String> {
    [
        Some(location.name.as_str()),
        location.en_name.as_deref(),
        location.pinyin.as_deref(),
        location.code.as_deref(),
        location.city.as_deref(),
        location.province.as_deref(),
        location.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .flat_map(|value| {
        value
            .split(|ch: char| !(ch.is_alphanumeric() || ch == '_'))
            .filter(|token| !token.is_empty())
            .map(str::to_lowercase)
            .collect::<Vec<_>>()
    })
    .collect()
}

fn text_matches(query: &TextQuery, location: &Location) -> bool {
    let tokens = text_tokens(location);
    query
        .search
        .split_whitespace()
        .map(str::to_lowercase)
        .all(|word| tokens.contains(&word))
}

fn paginate(ranked: Vec<ScoredLocation>, page: PageRequest) -> SearchPage {
    let total = ranked.len() as i64;
    let items = ranked
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit as usize)
        .collect();
    SearchPage { items, total }
}

fn materialize(req: NewLocation) -> Location {
    let now = Utc::now();
    Location {
        id: Uuid::now_v7(),
        name: req.name,
        en_name: req.en_name,
        pinyin: req.pinyin,
        code: req.code,
        location_type: req.location_type,
        status: req.status,
        parent_id: req.parent_id,
        city: req.city,
        province: req.province,
        district: req.district,
        county: req.county,
        country: req.country,
        country_code: req.country_code,
        latitude: req.latitude.unwrap_or_default(),
        longitude: req.longitude.unwrap_or_default(),
        timezone: req.timezone,
        risk_level: req.risk_level,
        no_airport: req.no_airport,
        city_level: req.city_level.unwrap_or(defaults::LOCATION_CITY_LEVEL),
        ctrip_city_id: req.ctrip_city_id,
        continent_id: req.continent_id,
        remark: req.remark,
        created_at: now,
        updated_at: now,
    }
}

/// Present fields overwrite; for nullable fields `Some(None)` clears.
fn apply_update(location: &mut Location, req: UpdateLocation) {
    macro_rules! set {
        ($($field:ident),+ $(,)?) => {
            $(
                if let Some(value) = req.$field {
                    location.$field = value;
                }
            )+
        };
    }
    set!(
        name,
        en_name,
        pinyin,
        code,
        location_type,
        status,
        parent_id,
        city,
        province,
        district,
        county,
        country,
        country_code,
        latitude,
        longitude,
        timezone,
        risk_level,
        no_airport,
        city_level,
        remark,
    );
    location.updated_at = Utc::now();
}

#[async_trait]
impl LocationSearchBackend for MemoryLocationStore {
    async fn search_text(
        &self,
        query: &TextQuery,
        score: &ScoreSpec,
        filter: &LocationFilter,
        page: PageRequest,
    ) -> Result<SearchPage> {
        self.record(BackendCall::Text {
            search: query.search.clone(),
        });
        if !lock(&self.state).text_index {
            return Err(Error::Search(
                "column \"search_tsv\" does not exist".to_string(),
            ));
        }
        let candidates = self
            .snapshot()
            .into_iter()
            .filter(|loc| filter_matches(filter, loc) && text_matches(query, loc))
            .collect();
        Ok(paginate(score_and_rank(candidates, score), page))
    }

    async fn search_regex(
        &self,
        query: &RegexQuery,
        filter: &LocationFilter,
        page: PageRequest,
    ) -> Result<SearchPage> {
        self.record(BackendCall::Regex {
            prefix_only: query.prefix_only,
            clause_count: query.clauses.len(),
        });
        let candidates = self
            .snapshot()
            .into_iter()
            .filter(|loc| filter_matches(filter, loc) && regex_builder::matches(query, loc))
            .collect();
        Ok(paginate(score_and_rank(candidates, &query.score), page))
    }

    async fn list_filtered(&self, filter: &LocationFilter, page: PageRequest) -> Result<SearchPage> {
        self.record(BackendCall::List);
        let mut candidates: Vec<Location> = self
            .snapshot()
            .into_iter()
            .filter(|loc| filter_matches(filter, loc))
            .collect();
        candidates.sort_by(compare_locations);
        let ranked = candidates.into_iter().map(ScoredLocation::unscored).collect();
        Ok(paginate(ranked, page))
    }

    async fn active_children(&self, parent_ids: &[Uuid]) -> Result<Vec<Location>> {
        self.record(BackendCall::Children {
            parent_count: parent_ids.len(),
        });
        let mut children: Vec<Location> = self
            .snapshot()
            .into_iter()
            .filter(|loc| {
                loc.status == LocationStatus::Active
                    && loc.parent_id.map(|p| parent_ids.contains(&p)).unwrap_or(false)
            })
            .collect();
        children.sort_by(compare_locations);
        Ok(children)
    }
}

#[async_trait]
impl LocationRepository for MemoryLocationStore {
    async fn get(&self, id: Uuid) -> Result<Location> {
        lock(&self.state)
            .locations
            .iter()
            .find(|loc| loc.id == id)
            .cloned()
            .ok_or_else(|| Error::NotFound("Location not found".to_string()))
    }

    async fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<Location>> {
        let mut children: Vec<Location> = self
            .snapshot()
            .into_iter()
            .filter(|loc| loc.parent_id == Some(parent_id))
            .collect();
        children.sort_by(compare_locations);
        Ok(children)
    }

    async fn parents(&self, ids: &[Uuid]) -> Result<Vec<ParentSummary>> {
        Ok(lock(&self.state)
            .locations
            .iter()
            .filter(|loc| ids.contains(&loc.id))
            .map(ParentSummary::from)
            .collect())
    }

    async fn create(&self, req: NewLocation) -> Result<Location> {
        let location = materialize(req.normalized()?);
        self.insert(location.clone());
        Ok(location)
    }

    async fn create_batch(&self, reqs: Vec<NewLocation>) -> Result<Vec<Location>> {
        if reqs.is_empty() {
            return Err(Error::InvalidInput(
                "Locations must be a non-empty array".to_string(),
            ));
        }
        // Validate everything before inserting anything.
        let locations = reqs
            .into_iter()
            .map(|req| req.normalized().map(materialize))
            .collect::<Result<Vec<_>>>()?;
        lock(&self.state).locations.extend(locations.iter().cloned());
        Ok(locations)
    }

    async fn update(&self, id: Uuid, req: UpdateLocation) -> Result<Location> {
        let req = req.normalized()?;
        let mut state = lock(&self.state);
        let location = state
            .locations
            .iter_mut()
            .find(|loc| loc.id == id)
            .ok_or_else(|| Error::NotFound("Location not found".to_string()))?;
        apply_update(location, req);
        Ok(location.clone())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut state = lock(&self.state);
        let before = state.locations.len();
        state.locations.retain(|loc| loc.id != id);
        if state.locations.len() == before {
            return Err(Error::NotFound("Location not found".to_string()));
        }
        for loc in state.locations.iter_mut() {
            if loc.parent_id == Some(id) {
                loc.parent_id = None;
            }
        }
        Ok(())
    }
}
