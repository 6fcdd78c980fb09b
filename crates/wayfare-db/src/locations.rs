//! Location repository implementation.

use std::time::Instant;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, info, instrument};
use uuid::Uuid;

use wayfare_core::defaults;
use wayfare_core::{
    Error, Location, LocationFilter, LocationRepository, LocationSearchBackend, NewLocation,
    PageRequest, ParentSummary, RegexQuery, Result, ScoreSpec, ScoredLocation, SearchPage,
    TextQuery, UpdateLocation,
};

use crate::query::{
    bind_params, location_order_sql, nullable_text, LocationQuery, QueryParam, UpdateSet,
    LOCATION_COLUMNS,
};

/// PostgreSQL implementation of the location search backend and repository.
#[derive(Clone)]
pub struct PgLocationRepository {
    pool: Pool<Postgres>,
}

impl PgLocationRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Run the count and page queries for one search stage.
    async fn fetch_page(&self, query: LocationQuery, page: PageRequest) -> Result<SearchPage> {
        let start = Instant::now();

        let count_sql = query.count_sql();
        let total: i64 = bind_params(sqlx::query(&count_sql), query.params())
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?
            .try_get(0)
            .map_err(Error::Database)?;

        if total == 0 {
            return Ok(SearchPage::empty());
        }

        let (page_sql, params) = query.page_sql(page);
        let rows = bind_params(sqlx::query(&page_sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        let items = rows
            .iter()
            .map(scored_location_from_row)
            .collect::<Result<Vec<_>>>()?;

        debug!(
            subsystem = "database",
            component = "locations",
            total,
            result_count = items.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Location page fetched"
        );
        Ok(SearchPage { items, total })
    }

    async fn insert_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: NewLocation,
    ) -> Result<Location> {
        let now = Utc::now();
        let sql = format!(
            r#"
            INSERT INTO location (id, name, en_name, pinyin, code, "type", status, parent_id,
                city, province, district, county, country, country_code, latitude, longitude,
                timezone, risk_level, no_airport, city_level, ctrip_city_id, continent_id, remark,
                created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16,
                $17, $18, $19, $20, $21, $22, $23, $24, $24)
            RETURNING {}
            "#,
            LOCATION_COLUMNS
        );

        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7())
            .bind(&req.name)
            .bind(&req.en_name)
            .bind(&req.pinyin)
            .bind(&req.code)
            .bind(req.location_type.as_str())
            .bind(req.status.as_str())
            .bind(req.parent_id)
            .bind(&req.city)
            .bind(&req.province)
            .bind(&req.district)
            .bind(&req.county)
            .bind(&req.country)
            .bind(&req.country_code)
            .bind(req.latitude.unwrap_or_default())
            .bind(req.longitude.unwrap_or_default())
            .bind(&req.timezone)
            .bind(req.risk_level.as_str())
            .bind(req.no_airport)
            .bind(req.city_level.unwrap_or(defaults::LOCATION_CITY_LEVEL))
            .bind(req.ctrip_city_id)
            .bind(req.continent_id)
            .bind(&req.remark)
            .bind(now)
            .fetch_one(&mut **tx)
            .await
            .map_err(Error::Database)?;

        location_from_row(&row)
    }
}

/// Map a `location` row to the model.
pub(crate) fn location_from_row(row: &PgRow) -> Result<Location> {
    let location_type: String = row.try_get("type")?;
    let status: String = row.try_get("status")?;
    let risk_level: String = row.try_get("risk_level")?;

    Ok(Location {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        en_name: row.try_get("en_name")?,
        pinyin: row.try_get("pinyin")?,
        code: row.try_get("code")?,
        location_type: location_type.parse()?,
        status: status.parse()?,
        parent_id: row.try_get("parent_id")?,
        city: row.try_get("city")?,
        province: row.try_get("province")?,
        district: row.try_get("district")?,
        county: row.try_get("county")?,
        country: row.try_get("country")?,
        country_code: row.try_get("country_code")?,
        latitude: row.try_get("latitude")?,
        longitude: row.try_get("longitude")?,
        timezone: row.try_get("timezone")?,
        risk_level: risk_level.parse()?,
        no_airport: row.try_get("no_airport")?,
        city_level: row.try_get("city_level")?,
        ctrip_city_id: row.try_get("ctrip_city_id")?,
        continent_id: row.try_get("continent_id")?,
        remark: row.try_get("remark")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn scored_location_from_row(row: &PgRow) -> Result<ScoredLocation> {
    let score: i32 = row.try_get("match_score")?;
    let score = u8::try_from(score).unwrap_or(defaults::SCORE_NONE);
    Ok(ScoredLocation::new(location_from_row(row)?, score))
}

#[async_trait]
impl LocationSearchBackend for PgLocationRepository {
    #[instrument(skip(self, query, score, filter), fields(
        subsystem = "database",
        component = "locations",
        op = "search_text",
        query = %query.search,
    ))]
    async fn search_text(
        &self,
        query: &TextQuery,
        score: &ScoreSpec,
        filter: &LocationFilter,
        page: PageRequest,
    ) -> Result<SearchPage> {
        let sql = LocationQuery::new().filter(filter).text(query).score(score);
        self.fetch_page(sql, page).await
    }

    #[instrument(skip(self, query, filter), fields(
        subsystem = "database",
        component = "locations",
        op = "search_regex",
        prefix_only = query.prefix_only,
        clause_count = query.clauses.len(),
    ))]
    async fn search_regex(
        &self,
        query: &RegexQuery,
        filter: &LocationFilter,
        page: PageRequest,
    ) -> Result<SearchPage> {
        let sql = LocationQuery::new().filter(filter).regex(query);
        self.fetch_page(sql, page).await
    }

    async fn list_filtered(&self, filter: &LocationFilter, page: PageRequest) -> Result<SearchPage> {
        self.fetch_page(LocationQuery::new().filter(filter), page)
            .await
    }

    async fn active_children(&self, parent_ids: &[Uuid]) -> Result<Vec<Location>> {
        if parent_ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT {} FROM location WHERE parent_id = ANY($1::uuid[]) AND status = 'active' ORDER BY {}",
            LOCATION_COLUMNS,
            location_order_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(parent_ids)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(location_from_row).collect()
    }
}

#[async_trait]
impl LocationRepository for PgLocationRepository {
    async fn get(&self, id: Uuid) -> Result<Location> {
        let sql = format!("SELECT {} FROM location WHERE id = $1", LOCATION_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound("Location not found".to_string()))?;
        location_from_row(&row)
    }

    async fn list_by_parent(&self, parent_id: Uuid) -> Result<Vec<Location>> {
        let sql = format!(
            "SELECT {} FROM location WHERE parent_id = $1 ORDER BY {}",
            LOCATION_COLUMNS,
            location_order_sql()
        );
        let rows = sqlx::query(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(location_from_row).collect()
    }

    async fn parents(&self, ids: &[Uuid]) -> Result<Vec<ParentSummary>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            "SELECT id, name, code, \"type\", city, province FROM location WHERE id = ANY($1::uuid[])",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        rows.iter()
            .map(|row| -> Result<ParentSummary> {
                let location_type: String = row.try_get("type")?;
                Ok(ParentSummary {
                    id: row.try_get("id")?,
                    name: row.try_get("name")?,
                    code: row.try_get("code")?,
                    location_type: location_type.parse()?,
                    city: row.try_get("city")?,
                    province: row.try_get("province")?,
                })
            })
            .collect()
    }

    #[instrument(skip(self, req), fields(subsystem = "database", component = "locations", op = "create"))]
    async fn create(&self, req: NewLocation) -> Result<Location> {
        let req = req.normalized()?;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let location = self.insert_tx(&mut tx, req).await?;
        tx.commit().await.map_err(Error::Database)?;

        info!(location_id = %location.id, "Location created");
        Ok(location)
    }

    #[instrument(skip(self, reqs), fields(
        subsystem = "database",
        component = "locations",
        op = "create_batch",
        batch_size = reqs.len(),
    ))]
    async fn create_batch(&self, reqs: Vec<NewLocation>) -> Result<Vec<Location>> {
        if reqs.is_empty() {
            return Err(Error::InvalidInput(
                "Locations must be a non-empty array".to_string(),
            ));
        }
        let reqs = reqs
            .into_iter()
            .map(NewLocation::normalized)
            .collect::<Result<Vec<_>>>()?;

        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let mut created = Vec::with_capacity(reqs.len());
        for req in reqs {
            created.push(self.insert_tx(&mut tx, req).await?);
        }
        tx.commit().await.map_err(Error::Database)?;

        info!(result_count = created.len(), "Location batch created");
        Ok(created)
    }

    #[instrument(skip(self, req), fields(
        subsystem = "database",
        component = "locations",
        op = "update",
        location_id = %id,
    ))]
    async fn update(&self, id: Uuid, req: UpdateLocation) -> Result<Location> {
        let req = req.normalized()?;
        if req.clears_parent() {
            debug!("Unlinking location from parent");
        }
        let text = |value: &'static str| Some(QueryParam::String(value.to_string()));

        let mut set = UpdateSet::new(id);
        set.set("name", req.name.map(QueryParam::String))
            .set_nullable("en_name", nullable_text(req.en_name))
            .set_nullable("pinyin", nullable_text(req.pinyin))
            .set_nullable("code", nullable_text(req.code))
            .set("\"type\"", req.location_type.and_then(|t| text(t.as_str())))
            .set("status", req.status.and_then(|s| text(s.as_str())))
            .set_nullable("parent_id", req.parent_id.map(|p| p.map(QueryParam::Uuid)))
            .set_nullable("city", nullable_text(req.city))
            .set_nullable("province", nullable_text(req.province))
            .set_nullable("district", nullable_text(req.district))
            .set_nullable("county", nullable_text(req.county))
            .set_nullable("country", nullable_text(req.country))
            .set_nullable("country_code", nullable_text(req.country_code))
            .set("latitude", req.latitude.map(QueryParam::Double))
            .set("longitude", req.longitude.map(QueryParam::Double))
            .set_nullable("timezone", nullable_text(req.timezone))
            .set("risk_level", req.risk_level.and_then(|r| text(r.as_str())))
            .set("no_airport", req.no_airport.map(QueryParam::Bool))
            .set("city_level", req.city_level.map(QueryParam::SmallInt))
            .set_nullable("remark", nullable_text(req.remark));

        let (sql, params) = set.into_sql("location", LOCATION_COLUMNS, Utc::now());
        let row = bind_params(sqlx::query(&sql), &params)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound("Location not found".to_string()))?;

        location_from_row(&row)
    }

    #[instrument(skip(self), fields(
        subsystem = "database",
        component = "locations",
        op = "delete",
        location_id = %id,
    ))]
    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM location WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Location not found".to_string()));
        }
        info!("Location deleted");
        Ok(())
    }
}
