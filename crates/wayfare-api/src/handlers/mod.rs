//! HTTP handlers for wayfare-api.

pub mod currencies;
pub mod health;
pub mod locations;

use uuid::Uuid;

use crate::ApiError;

/// Parse a path id. A malformed id cannot name an existing record.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw.trim()).map_err(|_| ApiError::NotFound(not_found.to_string()))
}
