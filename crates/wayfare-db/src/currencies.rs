//! Currency repository implementation.
//!
//! At most one currency is the default. Setting the flag clears it on every
//! other row inside the same transaction, and the partial unique index
//! `currency_single_default` rejects any interleaving that would leave two.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{info, instrument};
use uuid::Uuid;

use wayfare_core::defaults;
use wayfare_core::{
    Currency, CurrencyFilter, CurrencyRepository, Error, NewCurrency, Result, UpdateCurrency,
};

use crate::query::{bind_params, escape_like, nullable_text, QueryParam, UpdateSet};
use crate::map_unique_violation;

const CURRENCY_COLUMNS: &str = "id, code, name, name_en, symbol, exchange_rate, is_active, \
    is_default, decimal_places, display_order, remark, created_at, updated_at";

const DUPLICATE_CODE: &str = "Currency code already exists";

const SINGLE_DEFAULT_INDEX: &str = "currency_single_default";

/// Map unique violations on insert/update to user-facing duplicates.
fn map_write_error(err: sqlx::Error) -> Error {
    let on_default_index = err
        .as_database_error()
        .and_then(|db_err| db_err.constraint())
        .map(|name| name == SINGLE_DEFAULT_INDEX)
        .unwrap_or(false);
    if on_default_index {
        map_unique_violation(err, "Another currency was set as default concurrently")
    } else {
        map_unique_violation(err, DUPLICATE_CODE)
    }
}

/// PostgreSQL implementation of CurrencyRepository.
#[derive(Clone)]
pub struct PgCurrencyRepository {
    pool: Pool<Postgres>,
}

impl PgCurrencyRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Clear the default flag on every row except `keep`.
    async fn clear_default_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        keep: Option<Uuid>,
    ) -> Result<u64> {
        let result = sqlx::query(
            "UPDATE currency SET is_default = FALSE, updated_at = $2 \
             WHERE is_default AND ($1::uuid IS NULL OR id <> $1)",
        )
        .bind(keep)
        .bind(Utc::now())
        .execute(&mut **tx)
        .await
        .map_err(Error::Database)?;
        Ok(result.rows_affected())
    }
}

fn currency_from_row(row: &PgRow) -> Result<Currency> {
    Ok(Currency {
        id: row.try_get("id")?,
        code: row.try_get("code")?,
        name: row.try_get("name")?,
        name_en: row.try_get("name_en")?,
        symbol: row.try_get("symbol")?,
        exchange_rate: row.try_get("exchange_rate")?,
        is_active: row.try_get("is_active")?,
        is_default: row.try_get("is_default")?,
        decimal_places: row.try_get("decimal_places")?,
        display_order: row.try_get("display_order")?,
        remark: row.try_get("remark")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Build the `WHERE` clause for a currency listing.
fn currency_filter_sql(filter: &CurrencyFilter) -> (String, Vec<QueryParam>) {
    let mut conditions = Vec::new();
    let mut params = Vec::new();

    if let Some(is_active) = filter.is_active {
        conditions.push(if is_active { "is_active" } else { "NOT is_active" }.to_string());
    }
    if let Some(code) = filter.code.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        params.push(QueryParam::String(format!("%{}%", escape_like(code))));
        conditions.push(format!("code ILIKE ${}", params.len()));
    }
    if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        params.push(QueryParam::String(format!("%{}%", escape_like(search))));
        let p = params.len();
        conditions.push(format!(
            "(code ILIKE ${p} OR name ILIKE ${p} OR name_en ILIKE ${p})"
        ));
    }

    let where_sql = if conditions.is_empty() {
        "TRUE".to_string()
    } else {
        conditions.join(" AND ")
    };
    (where_sql, params)
}

#[async_trait]
impl CurrencyRepository for PgCurrencyRepository {
    async fn list(&self, filter: CurrencyFilter) -> Result<Vec<Currency>> {
        let (where_sql, params) = currency_filter_sql(&filter);
        let sql = format!(
            "SELECT {} FROM currency WHERE {} ORDER BY display_order, code",
            CURRENCY_COLUMNS, where_sql
        );
        let rows = bind_params(sqlx::query(&sql), &params)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        rows.iter().map(currency_from_row).collect()
    }

    async fn list_active(&self) -> Result<Vec<Currency>> {
        self.list(CurrencyFilter {
            is_active: Some(true),
            ..Default::default()
        })
        .await
    }

    async fn get_by_code(&self, code: &str) -> Result<Currency> {
        let sql = format!("SELECT {} FROM currency WHERE code = $1", CURRENCY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(code.trim().to_uppercase())
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound("Currency not found".to_string()))?;
        currency_from_row(&row)
    }

    async fn get(&self, id: Uuid) -> Result<Currency> {
        let sql = format!("SELECT {} FROM currency WHERE id = $1", CURRENCY_COLUMNS);
        let row = sqlx::query(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound("Currency not found".to_string()))?;
        currency_from_row(&row)
    }

    #[instrument(skip(self, req), fields(
        subsystem = "database",
        component = "currencies",
        op = "create",
        currency_code = %req.code,
    ))]
    async fn create(&self, req: NewCurrency) -> Result<Currency> {
        let req = req.normalized()?;
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if req.is_default {
            let cleared = self.clear_default_tx(&mut tx, None).await?;
            info!(cleared, "Cleared previous default currency");
        }

        let sql = format!(
            r#"
            INSERT INTO currency (id, code, name, name_en, symbol, exchange_rate, is_active,
                is_default, decimal_places, display_order, remark, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $12)
            RETURNING {}
            "#,
            CURRENCY_COLUMNS
        );
        let row = sqlx::query(&sql)
            .bind(Uuid::now_v7())
            .bind(&req.code)
            .bind(&req.name)
            .bind(&req.name_en)
            .bind(&req.symbol)
            .bind(req.exchange_rate.unwrap_or(defaults::CURRENCY_EXCHANGE_RATE))
            .bind(req.is_active.unwrap_or(true))
            .bind(req.is_default)
            .bind(req.decimal_places.unwrap_or(defaults::CURRENCY_DECIMAL_PLACES))
            .bind(req.display_order.unwrap_or(0))
            .bind(&req.remark)
            .bind(now)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_write_error)?;

        tx.commit().await.map_err(Error::Database)?;

        let currency = currency_from_row(&row)?;
        info!(currency_id = %currency.id, "Currency created");
        Ok(currency)
    }

    #[instrument(skip(self, req), fields(
        subsystem = "database",
        component = "currencies",
        op = "update",
        currency_id = %id,
    ))]
    async fn update(&self, id: Uuid, req: UpdateCurrency) -> Result<Currency> {
        let req = req.normalized()?;
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        if req.is_default == Some(true) {
            let cleared = self.clear_default_tx(&mut tx, Some(id)).await?;
            info!(cleared, "Cleared previous default currency");
        }

        let mut set = UpdateSet::new(id);
        set.set("code", req.code.map(QueryParam::String))
            .set("name", req.name.map(QueryParam::String))
            .set_nullable("name_en", nullable_text(req.name_en))
            .set_nullable("symbol", nullable_text(req.symbol))
            .set("exchange_rate", req.exchange_rate.map(QueryParam::Double))
            .set("is_active", req.is_active.map(QueryParam::Bool))
            .set("is_default", req.is_default.map(QueryParam::Bool))
            .set("decimal_places", req.decimal_places.map(QueryParam::SmallInt))
            .set("display_order", req.display_order.map(QueryParam::Int))
            .set_nullable("remark", nullable_text(req.remark));

        let (sql, params) = set.into_sql("currency", CURRENCY_COLUMNS, Utc::now());
        let row = bind_params(sqlx::query(&sql), &params)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_write_error)?
            .ok_or_else(|| Error::NotFound("Currency not found".to_string()))?;

        tx.commit().await.map_err(Error::Database)?;
        currency_from_row(&row)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM currency WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("Currency not found".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_filter() {
        let (sql, params) = currency_filter_sql(&CurrencyFilter::default());
        assert_eq!(sql, "TRUE");
        assert!(params.is_empty());
    }

    #[test]
    fn test_combined_filter() {
        let filter = CurrencyFilter {
            is_active: Some(false),
            code: Some("us".to_string()),
            search: Some("dollar".to_string()),
        };
        let (sql, params) = currency_filter_sql(&filter);
        assert_eq!(
            sql,
            "NOT is_active AND code ILIKE $1 AND (code ILIKE $2 OR name ILIKE $2 OR name_en ILIKE $2)"
        );
        assert_eq!(
            params,
            vec![
                QueryParam::String("%us%".to_string()),
                QueryParam::String("%dollar%".to_string()),
            ]
        );
    }

    #[test]
    fn test_blank_search_is_ignored() {
        let filter = CurrencyFilter {
            search: Some("  ".to_string()),
            ..Default::default()
        };
        assert_eq!(currency_filter_sql(&filter).0, "TRUE");
    }
}
