//! Location search and CRUD endpoints.

use std::collections::HashMap;
use std::str::FromStr;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use wayfare_core::{
    LocationFilter, LocationStatus, LocationType, NewLocation, ParentSummary, SearchPriority,
    UpdateLocation,
};
use wayfare_search::SearchRequest;

use super::parse_id;
use crate::query_types::{non_blank, LocationListQuery};
use crate::{ApiError, AppState};

const NOT_FOUND: &str = "Location not found";

/// Parse an optional enum parameter; blank means absent.
fn parse_enum<T>(value: Option<String>) -> Result<Option<T>, ApiError>
where
    T: FromStr<Err = wayfare_core::Error>,
{
    non_blank(value)
        .map(|v| v.parse::<T>())
        .transpose()
        .map_err(ApiError::from)
}

impl LocationListQuery {
    pub fn into_search_request(self) -> Result<SearchRequest, ApiError> {
        // Unknown priority hints are ignored rather than rejected.
        let priority = non_blank(self.search_priority)
            .and_then(|p| p.parse::<SearchPriority>().ok());

        Ok(SearchRequest {
            search: self.search,
            priority,
            filter: LocationFilter {
                status: parse_enum::<LocationStatus>(self.status)?,
                location_type: parse_enum::<LocationType>(self.location_type)?,
                city: non_blank(self.city),
                country: non_blank(self.country),
            },
            page: self.page.and_then(|p| p.into_inner()),
            limit: self.limit.and_then(|l| l.into_inner()),
            include_children: self
                .include_children
                .and_then(|b| b.into_inner())
                .unwrap_or(false),
        })
    }
}

/// A row as returned by read endpoints, with its parent's summary beside `parentId`.
#[derive(Debug, Serialize)]
pub struct WithParent<T> {
    #[serde(flatten)]
    pub item: T,
    pub parent: Option<ParentSummary>,
}

/// Attach parent summaries to `items`, resolving every distinct parent in one lookup.
async fn with_parents<T>(
    state: &AppState,
    items: Vec<T>,
    parent_of: impl Fn(&T) -> Option<Uuid>,
) -> Result<Vec<WithParent<T>>, ApiError> {
    let mut ids: Vec<Uuid> = items.iter().filter_map(&parent_of).collect();
    ids.sort_unstable();
    ids.dedup();

    let parents: HashMap<Uuid, ParentSummary> = if ids.is_empty() {
        HashMap::new()
    } else {
        state
            .locations
            .parents(&ids)
            .await?
            .into_iter()
            .map(|p| (p.id, p))
            .collect()
    };

    Ok(items
        .into_iter()
        .map(|item| {
            let parent = parent_of(&item).and_then(|id| parents.get(&id).cloned());
            WithParent { item, parent }
        })
        .collect())
}

/// `GET /api/locations`
pub async fn list_locations(
    State(state): State<AppState>,
    Query(query): Query<LocationListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let request = query.into_search_request()?;
    debug!(subsystem = "api", ?request, "Location list request");

    let page = state.search.search(request).await?;
    let total_pages = page.total_pages();
    let (has_next, has_prev) = (page.has_next_page(), page.has_prev_page());
    let items = with_parents(&state, page.items, |s| s.location.parent_id).await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "data": items,
        "pagination": {
            "page": page.page.page,
            "limit": page.page.limit,
            "total": page.total,
            "totalPages": total_pages,
            "hasNextPage": has_next,
            "hasPrevPage": has_prev,
        },
        "meta": {
            "stage": page.stage,
            "kind": page.classification.kind,
        },
    })))
}

/// `GET /api/locations/parent/:parent_id`
pub async fn list_by_parent(
    State(state): State<AppState>,
    Path(parent_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let parent_id = parse_id(&parent_id, NOT_FOUND)?;
    let locations = state.locations.list_by_parent(parent_id).await?;
    let locations = with_parents(&state, locations, |l| l.parent_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "count": locations.len(),
        "data": locations,
    })))
}

/// `GET /api/locations/:id`
pub async fn get_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let location = state.locations.get(id).await?;
    let mut located = with_parents(&state, vec![location], |l| l.parent_id).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "data": located.pop(),
    })))
}

/// `POST /api/locations`
pub async fn create_location(
    State(state): State<AppState>,
    Json(body): Json<NewLocation>,
) -> Result<impl IntoResponse, ApiError> {
    let location = state.locations.create(body).await?;
    info!(
        subsystem = "api",
        location_id = %location.id,
        location_type = location.location_type.as_str(),
        "Location created"
    );
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": "Location created successfully",
            "data": location,
        })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct BatchCreateBody {
    #[serde(default)]
    pub locations: Vec<NewLocation>,
}

/// `POST /api/locations/batch`
pub async fn create_locations_batch(
    State(state): State<AppState>,
    Json(body): Json<BatchCreateBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.locations.is_empty() {
        return Err(ApiError::BadRequest(
            "Locations array is required".to_string(),
        ));
    }
    let created = state.locations.create_batch(body.locations).await?;
    info!(subsystem = "api", result_count = created.len(), "Locations batch created");
    Ok((
        StatusCode::CREATED,
        Json(serde_json::json!({
            "success": true,
            "message": format!("{} locations created successfully", created.len()),
            "data": created,
        })),
    ))
}

/// `PUT /api/locations/:id`
pub async fn update_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<UpdateLocation>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let location = state.locations.update(id, body).await?;
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Location updated successfully",
        "data": location,
    })))
}

/// `DELETE /api/locations/:id`
pub async fn delete_location(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.locations.delete(id).await?;
    info!(subsystem = "api", location_id = %id, "Location deleted");
    Ok(Json(serde_json::json!({
        "success": true,
        "message": "Location deleted successfully",
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_types::{LenientBool, LenientU32};

    #[test]
    fn test_query_maps_to_request() {
        let query = LocationListQuery {
            search: Some("Tokyo".into()),
            status: Some("active".into()),
            location_type: Some(" ".into()),
            city: Some("".into()),
            search_priority: Some("enName_pinyin".into()),
            page: Some(LenientU32(Some(2))),
            limit: Some(LenientU32(None)),
            include_children: Some(LenientBool(Some(true))),
            ..Default::default()
        };
        let request = query.into_search_request().unwrap();
        assert_eq!(request.search.as_deref(), Some("Tokyo"));
        assert_eq!(request.priority, Some(SearchPriority::EnNamePinyin));
        assert_eq!(request.filter.status, Some(LocationStatus::Active));
        assert_eq!(request.filter.location_type, None);
        assert_eq!(request.filter.city, None);
        assert_eq!(request.page, Some(2));
        assert_eq!(request.limit, None);
        assert!(request.include_children);
    }

    #[test]
    fn test_unknown_priority_is_ignored() {
        let query = LocationListQuery {
            search_priority: Some("whatever".into()),
            ..Default::default()
        };
        assert_eq!(query.into_search_request().unwrap().priority, None);
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        let query = LocationListQuery {
            status: Some("archived".into()),
            ..Default::default()
        };
        assert!(matches!(
            query.into_search_request(),
            Err(ApiError::BadRequest(_))
        ));
    }
}
