//! Data models for locations and currencies.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::defaults;
use crate::error::{Error, Result};

// =============================================================================
// LOCATION ENUMS
// =============================================================================

/// Kind of place a location record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Country,
    Province,
    #[default]
    City,
    Airport,
    Station,
    Bus,
}

impl LocationType {
    /// All variants in hierarchical order.
    pub const ALL: [LocationType; 6] = [
        LocationType::Country,
        LocationType::Province,
        LocationType::City,
        LocationType::Airport,
        LocationType::Station,
        LocationType::Bus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Country => "country",
            LocationType::Province => "province",
            LocationType::City => "city",
            LocationType::Airport => "airport",
            LocationType::Station => "station",
            LocationType::Bus => "bus",
        }
    }

    /// Tie-break rank used when ordering results with equal scores.
    ///
    /// Enclosing places rank before the places inside them, so a city sorts
    /// ahead of its airports and stations.
    pub fn rank(&self) -> u8 {
        match self {
            LocationType::Country => 0,
            LocationType::Province => 1,
            LocationType::City => 2,
            LocationType::Airport => 3,
            LocationType::Station => 4,
            LocationType::Bus => 5,
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        LocationType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidInput(format!("Invalid location type: {}", s)))
    }
}

/// Whether a location is offered to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationStatus {
    #[default]
    Active,
    Inactive,
}

impl LocationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationStatus::Active => "active",
            LocationStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for LocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(LocationStatus::Active),
            "inactive" => Ok(LocationStatus::Inactive),
            _ => Err(Error::InvalidInput(format!("Invalid location status: {}", s))),
        }
    }
}

/// Travel risk classification (meaningful for cities only).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::VeryHigh => "very_high",
        }
    }
}

impl FromStr for RiskLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(RiskLevel::Low),
            "medium" => Ok(RiskLevel::Medium),
            "high" => Ok(RiskLevel::High),
            "very_high" => Ok(RiskLevel::VeryHigh),
            _ => Err(Error::InvalidInput(format!("Invalid risk level: {}", s))),
        }
    }
}

// =============================================================================
// LOCATION
// =============================================================================

/// A place: country, province, city, airport, station or bus stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    pub id: Uuid,
    /// Local-language display name.
    pub name: String,
    pub en_name: Option<String>,
    pub pinyin: Option<String>,
    /// IATA or station code, always stored uppercase.
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub status: LocationStatus,
    /// Enclosing city. Weak reference: deleting the parent only clears it.
    pub parent_id: Option<Uuid>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub timezone: Option<String>,
    pub risk_level: RiskLevel,
    pub no_airport: bool,
    /// 1 = tier-one city ... 4 = other.
    pub city_level: i16,
    /// Upstream identifiers kept only for sync reconciliation.
    pub ctrip_city_id: Option<i64>,
    pub continent_id: Option<i32>,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Location {
    /// Create an active location with default attributes.
    pub fn new(name: impl Into<String>, location_type: LocationType) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            name: name.into(),
            en_name: None,
            pinyin: None,
            code: None,
            location_type,
            status: LocationStatus::Active,
            parent_id: None,
            city: None,
            province: None,
            district: None,
            county: None,
            country: Some(defaults::LOCATION_COUNTRY.to_string()),
            country_code: None,
            latitude: 0.0,
            longitude: 0.0,
            timezone: Some(defaults::LOCATION_TIMEZONE.to_string()),
            risk_level: RiskLevel::Low,
            no_airport: false,
            city_level: defaults::LOCATION_CITY_LEVEL,
            ctrip_city_id: None,
            continent_id: None,
            remark: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_en_name(mut self, en_name: impl Into<String>) -> Self {
        self.en_name = Some(en_name.into());
        self
    }

    pub fn with_pinyin(mut self, pinyin: impl Into<String>) -> Self {
        self.pinyin = Some(pinyin.into());
        self
    }

    /// Set the code; stored uppercase like every write path.
    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into().trim().to_uppercase());
        self
    }

    pub fn with_status(mut self, status: LocationStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_parent(mut self, parent_id: Uuid) -> Self {
        self.parent_id = Some(parent_id);
        self
    }
}

/// A location annotated with its relevance score for the current search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredLocation {
    #[serde(flatten)]
    pub location: Location,
    pub match_score: u8,
}

impl ScoredLocation {
    pub fn new(location: Location, match_score: u8) -> Self {
        Self {
            location,
            match_score,
        }
    }

    /// Wrap a location that was not ranked against a search term.
    pub fn unscored(location: Location) -> Self {
        Self::new(location, defaults::SCORE_NONE)
    }
}

/// Parent fields embedded next to `parentId` in read responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParentSummary {
    pub id: Uuid,
    pub name: String,
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub location_type: LocationType,
    pub city: Option<String>,
    pub province: Option<String>,
}

impl From<&Location> for ParentSummary {
    fn from(location: &Location) -> Self {
        Self {
            id: location.id,
            name: location.name.clone(),
            code: location.code.clone(),
            location_type: location.location_type,
            city: location.city.clone(),
            province: location.province.clone(),
        }
    }
}

/// Request body for creating a location.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLocation {
    #[serde(default)]
    pub name: String,
    pub en_name: Option<String>,
    pub pinyin: Option<String>,
    pub code: Option<String>,
    #[serde(rename = "type", default)]
    pub location_type: LocationType,
    #[serde(default)]
    pub status: LocationStatus,
    pub parent_id: Option<Uuid>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub district: Option<String>,
    pub county: Option<String>,
    pub country: Option<String>,
    pub country_code: Option<String>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub timezone: Option<String>,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub no_airport: bool,
    pub city_level: Option<i16>,
    pub ctrip_city_id: Option<i64>,
    pub continent_id: Option<i32>,
    pub remark: Option<String>,
}

impl NewLocation {
    /// Trim text fields, uppercase codes and reject records without a name.
    pub fn normalized(mut self) -> Result<Self> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() {
            return Err(Error::InvalidInput("Location name is required".to_string()));
        }
        self.en_name = trim_opt(self.en_name);
        self.pinyin = trim_opt(self.pinyin);
        self.code = trim_upper_opt(self.code);
        self.country_code = trim_upper_opt(self.country_code);
        self.city = trim_opt(self.city);
        self.province = trim_opt(self.province);
        self.district = trim_opt(self.district);
        self.county = trim_opt(self.county);
        self.country = trim_opt(self.country).or_else(|| Some(defaults::LOCATION_COUNTRY.into()));
        self.timezone =
            trim_opt(self.timezone).or_else(|| Some(defaults::LOCATION_TIMEZONE.into()));
        if let Some(level) = self.city_level {
            validate_city_level(level)?;
        }
        Ok(self)
    }
}

/// Partial update for a location.
///
/// Absent fields are left unchanged. Nullable fields use a double option so
/// an explicit `null` clears the column: `None` is absent, `Some(None)` clears.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocation {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub en_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub pinyin: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub code: Option<Option<String>>,
    #[serde(rename = "type")]
    pub location_type: Option<LocationType>,
    pub status: Option<LocationStatus>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<Option<Uuid>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub city: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub province: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub district: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub county: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub country: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub country_code: Option<Option<String>>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub timezone: Option<Option<String>>,
    pub risk_level: Option<RiskLevel>,
    pub no_airport: Option<bool>,
    pub city_level: Option<i16>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub remark: Option<Option<String>>,
}

impl UpdateLocation {
    /// Trim and uppercase like [`NewLocation::normalized`]; a blank nullable
    /// value clears the field.
    pub fn normalized(mut self) -> Result<Self> {
        if let Some(name) = self.name.as_deref() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidInput("Location name is required".to_string()));
            }
            self.name = Some(trimmed.to_string());
        }
        self.en_name = self.en_name.map(trim_opt);
        self.pinyin = self.pinyin.map(trim_opt);
        self.code = self.code.map(trim_upper_opt);
        self.city = self.city.map(trim_opt);
        self.province = self.province.map(trim_opt);
        self.district = self.district.map(trim_opt);
        self.county = self.county.map(trim_opt);
        self.country = self.country.map(trim_opt);
        self.country_code = self.country_code.map(trim_upper_opt);
        self.timezone = self.timezone.map(trim_opt);
        if let Some(level) = self.city_level {
            validate_city_level(level)?;
        }
        Ok(self)
    }

    /// Whether the update unlinks the location from its parent.
    pub fn clears_parent(&self) -> bool {
        matches!(self.parent_id, Some(None))
    }
}

fn validate_city_level(level: i16) -> Result<()> {
    if (1..=4).contains(&level) {
        Ok(())
    } else {
        Err(Error::InvalidInput(format!(
            "cityLevel must be between 1 and 4, got {}",
            level
        )))
    }
}

// =============================================================================
// CURRENCY
// =============================================================================

/// Exchange-rate record relative to the base currency (CNY = 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    pub id: Uuid,
    pub code: String,
    pub name: String,
    pub name_en: Option<String>,
    pub symbol: Option<String>,
    pub exchange_rate: f64,
    pub is_active: bool,
    /// At most one currency carries this flag.
    pub is_default: bool,
    pub decimal_places: i16,
    pub display_order: i32,
    pub remark: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request body for creating a currency.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCurrency {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    pub name_en: Option<String>,
    pub symbol: Option<String>,
    pub exchange_rate: Option<f64>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub is_default: bool,
    pub decimal_places: Option<i16>,
    pub display_order: Option<i32>,
    pub remark: Option<String>,
}

impl NewCurrency {
    pub fn normalized(mut self) -> Result<Self> {
        self.code = self.code.trim().to_uppercase();
        self.name = self.name.trim().to_string();
        if self.code.is_empty() {
            return Err(Error::InvalidInput("Currency code is required".to_string()));
        }
        if self.name.is_empty() {
            return Err(Error::InvalidInput("Currency name is required".to_string()));
        }
        validate_currency_numbers(self.exchange_rate, self.decimal_places)?;
        Ok(self)
    }
}

/// Partial update for a currency. `Some(None)` clears a nullable field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCurrency {
    pub code: Option<String>,
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub name_en: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub symbol: Option<Option<String>>,
    pub exchange_rate: Option<f64>,
    pub is_active: Option<bool>,
    pub is_default: Option<bool>,
    pub decimal_places: Option<i16>,
    pub display_order: Option<i32>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub remark: Option<Option<String>>,
}

impl UpdateCurrency {
    pub fn normalized(mut self) -> Result<Self> {
        self.code = upper_opt(self.code);
        if matches!(self.code.as_deref(), Some("")) {
            return Err(Error::InvalidInput("Currency code is required".to_string()));
        }
        if let Some(name) = self.name.as_deref() {
            let trimmed = name.trim();
            if trimmed.is_empty() {
                return Err(Error::InvalidInput("Currency name is required".to_string()));
            }
            self.name = Some(trimmed.to_string());
        }
        self.name_en = self.name_en.map(trim_opt);
        self.symbol = self.symbol.map(trim_opt);
        validate_currency_numbers(self.exchange_rate, self.decimal_places)?;
        Ok(self)
    }
}

fn validate_currency_numbers(exchange_rate: Option<f64>, decimal_places: Option<i16>) -> Result<()> {
    if let Some(rate) = exchange_rate {
        if !rate.is_finite() || rate < 0.0 {
            return Err(Error::InvalidInput(
                "Exchange rate must be a non-negative number".to_string(),
            ));
        }
    }
    if let Some(places) = decimal_places {
        if !(0..=defaults::CURRENCY_DECIMAL_PLACES_MAX).contains(&places) {
            return Err(Error::InvalidInput(format!(
                "decimalPlaces must be between 0 and {}",
                defaults::CURRENCY_DECIMAL_PLACES_MAX
            )));
        }
    }
    Ok(())
}

/// Filters for listing currencies.
#[derive(Debug, Clone, Default)]
pub struct CurrencyFilter {
    pub is_active: Option<bool>,
    /// Case-insensitive substring of the code.
    pub code: Option<String>,
    /// Case-insensitive substring of code, name or English name.
    pub search: Option<String>,
}

// =============================================================================
// HELPERS
// =============================================================================

fn trim_opt(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn upper_opt(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_uppercase())
}

fn trim_upper_opt(value: Option<String>) -> Option<String> {
    trim_opt(value).map(|v| v.to_uppercase())
}

/// Keep an explicit `null` apart from an absent field. Paired with
/// `#[serde(default)]`, absent stays `None` and `null` becomes `Some(None)`.
fn nullable<'de, D, T>(deserializer: D) -> std::result::Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
