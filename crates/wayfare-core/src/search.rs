//! Location search types shared by the query builders and the database layer.
//!
//! The builders in `wayfare-search` produce these values; `wayfare-db`
//! renders them to SQL. Keeping them here lets both sides agree on the shape
//! of a query without depending on each other.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults;
use crate::error::{Error, Result};
use crate::models::{Location, LocationStatus, LocationType, ScoredLocation};

// =============================================================================
// CLASSIFICATION
// =============================================================================

/// What a raw search string looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryKind {
    /// Empty or whitespace-only input.
    Unknown,
    /// Airport or station code, e.g. `PEK`.
    Code,
    /// Contains CJK ideographs.
    Chinese,
    /// Everything else: pinyin, English, or mixed punctuation.
    PinyinOrEnglish,
}

impl QueryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryKind::Unknown => "unknown",
            QueryKind::Code => "code",
            QueryKind::Chinese => "chinese",
            QueryKind::PinyinOrEnglish => "pinyin_or_english",
        }
    }
}

impl fmt::Display for QueryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of classifying a search string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    pub kind: QueryKind,
    pub is_pinyin_or_english: bool,
}

impl Classification {
    pub fn new(kind: QueryKind) -> Self {
        Self {
            kind,
            is_pinyin_or_english: kind == QueryKind::PinyinOrEnglish,
        }
    }
}

/// Caller hint that overrides classification when choosing fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchPriority {
    /// Search `en_name`/`pinyin` regardless of how the input classifies.
    #[serde(rename = "enName_pinyin")]
    EnNamePinyin,
}

impl SearchPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchPriority::EnNamePinyin => "enName_pinyin",
        }
    }
}

impl FromStr for SearchPriority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "enName_pinyin" => Ok(SearchPriority::EnNamePinyin),
            other => Err(Error::InvalidInput(format!(
                "Unknown search priority: {}",
                other
            ))),
        }
    }
}

// =============================================================================
// FIELDS AND CLAUSES
// =============================================================================

/// A searchable location column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SearchField {
    Name,
    EnName,
    Pinyin,
    Code,
}

impl SearchField {
    /// Column name in the `location` table.
    pub fn column(&self) -> &'static str {
        match self {
            SearchField::Name => "name",
            SearchField::EnName => "en_name",
            SearchField::Pinyin => "pinyin",
            SearchField::Code => "code",
        }
    }

    /// Read this field from a location.
    pub fn value<'a>(&self, location: &'a Location) -> Option<&'a str> {
        match self {
            SearchField::Name => Some(location.name.as_str()),
            SearchField::EnName => location.en_name.as_deref(),
            SearchField::Pinyin => location.pinyin.as_deref(),
            SearchField::Code => location.code.as_deref(),
        }
    }
}

/// Match strength of a regex clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    /// `^term$`
    Exact,
    /// `^term` (index friendly)
    Prefix,
    /// `term` anywhere (full scan)
    Contains,
}

/// One disjunct of a regex query: `field ~* pattern AND status = ?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchClause {
    pub field: SearchField,
    pub tier: MatchTier,
    /// Escaped term, without anchors.
    pub escaped: String,
    pub status: Option<LocationStatus>,
}

impl MatchClause {
    /// Full case-insensitive regex pattern for this clause.
    pub fn pattern(&self) -> String {
        match self.tier {
            MatchTier::Exact => format!("^{}$", self.escaped),
            MatchTier::Prefix => format!("^{}", self.escaped),
            MatchTier::Contains => self.escaped.clone(),
        }
    }
}

/// Fields and term used to compute `matchScore`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreSpec {
    /// Trimmed, unescaped search term.
    pub term: String,
    pub fields: Vec<SearchField>,
}

/// Disjunctive regex query over location fields, ordered exact, prefix, contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegexQuery {
    pub classification: Classification,
    pub clauses: Vec<MatchClause>,
    pub prefix_only: bool,
    pub score: ScoreSpec,
}

impl RegexQuery {
    /// Highest tier present in the query.
    pub fn widest_tier(&self) -> Option<MatchTier> {
        self.clauses.iter().map(|c| c.tier).max()
    }
}

/// Full-text query against the weighted `search_tsv` column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuery {
    /// Sanitised search string handed to `plainto_tsquery`.
    pub search: String,
    /// Text search configuration; always `simple` (no stemming, no stopwords).
    pub language: &'static str,
}

impl TextQuery {
    pub fn new(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            language: defaults::TEXT_SEARCH_CONFIG,
        }
    }
}

// =============================================================================
// FILTERS, PAGES, OUTCOMES
// =============================================================================

/// Non-search filters applied alongside a search or listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LocationFilter {
    pub status: Option<LocationStatus>,
    pub location_type: Option<LocationType>,
    /// Case-insensitive substring of the `city` column.
    pub city: Option<String>,
    /// Case-insensitive substring of the `country` column.
    pub country: Option<String>,
}

impl LocationFilter {
    /// Same filter with the status constraint removed (regex clauses carry it).
    pub fn without_status(&self) -> Self {
        Self {
            status: None,
            ..self.clone()
        }
    }
}

/// 1-based page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub limit: u32,
}

impl PageRequest {
    /// Build a page request, clamping the page to >= 1 and the limit to `1..=max_limit`.
    pub fn new(page: Option<u32>, limit: Option<u32>, max_limit: u32) -> Self {
        Self {
            page: page.unwrap_or(defaults::PAGE).max(1),
            limit: limit.unwrap_or(defaults::PAGE_LIMIT).clamp(1, max_limit.max(1)),
        }
    }

    pub fn offset(&self) -> i64 {
        (i64::from(self.page) - 1) * i64::from(self.limit)
    }

    pub fn total_pages(&self, total: i64) -> i64 {
        let limit = i64::from(self.limit);
        (total + limit - 1) / limit
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None, defaults::PAGE_LIMIT_LIST_MAX)
    }
}

/// One page of matches plus the total number of matches.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchPage {
    pub items: Vec<ScoredLocation>,
    pub total: i64,
}

impl SearchPage {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

/// Which stage of the search produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStage {
    /// No search term: plain filtered listing.
    Listing,
    TextIndex,
    RegexPrefix,
    RegexContains,
}

impl SearchStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchStage::Listing => "listing",
            SearchStage::TextIndex => "text_index",
            SearchStage::RegexPrefix => "regex_prefix",
            SearchStage::RegexContains => "regex_contains",
        }
    }
}

impl fmt::Display for SearchStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
