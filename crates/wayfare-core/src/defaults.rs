//! Centralized default constants for wayfare.
//!
//! All crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page number (1-based).
pub const PAGE: u32 = 1;

/// Default page size for location listings and searches.
pub const PAGE_LIMIT: u32 = 20;

/// Maximum page size when a search term is present.
pub const PAGE_LIMIT_SEARCH_MAX: u32 = 100;

/// Maximum page size for unfiltered listings (used by pickers that load all cities).
pub const PAGE_LIMIT_LIST_MAX: u32 = 10_000;

// =============================================================================
// SEARCH
// =============================================================================

/// Score for a case-insensitive exact match on a scored field.
pub const SCORE_EXACT: u8 = 100;

/// Score for a case-insensitive prefix match on a scored field.
pub const SCORE_PREFIX: u8 = 80;

/// Score for a document matched only by a weaker tier.
pub const SCORE_NONE: u8 = 0;

/// Shortest input treated as a location code.
pub const CODE_MIN_LEN: usize = 2;

/// Longest input treated as a location code.
pub const CODE_MAX_LEN: usize = 5;

/// Text search configuration: no stemming, no stopwords.
pub const TEXT_SEARCH_CONFIG: &str = "simple";

// =============================================================================
// LOCATION
// =============================================================================

/// Country assigned to locations created without one.
pub const LOCATION_COUNTRY: &str = "中国";

/// Timezone assigned to locations created without one.
pub const LOCATION_TIMEZONE: &str = "Asia/Shanghai";

/// City tier for locations created without one (4 = other cities).
pub const LOCATION_CITY_LEVEL: i16 = 4;

// =============================================================================
// CURRENCY
// =============================================================================

/// Default exchange rate relative to the base currency.
pub const CURRENCY_EXCHANGE_RATE: f64 = 1.0;

/// Default number of decimal places for amounts.
pub const CURRENCY_DECIMAL_PLACES: i16 = 2;

/// Largest allowed number of decimal places.
pub const CURRENCY_DECIMAL_PLACES_MAX: i16 = 4;
