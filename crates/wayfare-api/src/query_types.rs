//! Query string types that never reject a request.
//!
//! Browsers and older clients send `page=abc`, `limit=-5` or
//! `includeChildren=yes`. Instead of failing deserialization with a
//! cryptic 400, these wrappers read anything unparsable as "not given" and
//! let the caller apply its defaults.

use std::fmt;

use serde::{Deserialize, Deserializer};

use wayfare_search::flags::parse_bool;

/// A non-negative integer; unparsable input reads as `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LenientU32(pub Option<u32>);

impl LenientU32 {
    pub fn into_inner(self) -> Option<u32> {
        self.0
    }
}

impl<'de> Deserialize<'de> for LenientU32 {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(LenientU32(s.trim().parse().ok()))
    }
}

impl fmt::Display for LenientU32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(n) => write!(f, "{}", n),
            None => f.write_str("(default)"),
        }
    }
}

/// A boolean accepting `true/1/yes/on` and `false/0/no/off`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LenientBool(pub Option<bool>);

impl LenientBool {
    pub fn into_inner(self) -> Option<bool> {
        self.0
    }
}

impl<'de> Deserialize<'de> for LenientBool {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(LenientBool(parse_bool(&s)))
    }
}

/// Query parameters of `GET /api/locations`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub location_type: Option<String>,
    pub city: Option<String>,
    pub country: Option<String>,
    pub search_priority: Option<String>,
    pub page: Option<LenientU32>,
    pub limit: Option<LenientU32>,
    pub include_children: Option<LenientBool>,
}

/// Query parameters of `GET /api/currencies`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrencyListQuery {
    pub is_active: Option<LenientBool>,
    pub code: Option<String>,
    pub search: Option<String>,
}

/// Drop blank values so `?city=` means "no city filter".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
