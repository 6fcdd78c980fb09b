//! # wayfare-db
//!
//! PostgreSQL database layer for wayfare.
//!
//! This crate provides:
//! - Connection pool management
//! - SQL rendering of location search queries (text index, staged regex, scoring)
//! - Location and currency repositories
//! - A degraded-mode store for running without a database
//!
//! ## Example
//!
//! ```rust,ignore
//! use wayfare_db::{Database, LocationRepository};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("postgres://localhost/wayfare").await?;
//!     db.migrate().await?;
//!
//!     let children = db.locations.list_by_parent(city_id).await?;
//!     println!("{} children", children.len());
//!     Ok(())
//! }
//! ```

pub mod currencies;
pub mod locations;
pub mod pool;
pub mod query;
pub mod unavailable;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use wayfare_core::*;

pub use currencies::PgCurrencyRepository;
pub use locations::PgLocationRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use query::{escape_like, LocationQuery, QueryParam};
pub use unavailable::UnavailableStore;

/// SQLSTATE for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// Map a unique violation to [`Error::Duplicate`] with a user-facing message.
pub(crate) fn map_unique_violation(err: sqlx::Error, message: &str) -> Error {
    let is_unique = err
        .as_database_error()
        .and_then(|db_err| db_err.code())
        .map(|code| code == UNIQUE_VIOLATION)
        .unwrap_or(false);
    if is_unique {
        Error::Duplicate(message.to_string())
    } else {
        Error::Database(err)
    }
}

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Postgres>,
    /// Location search backend and CRUD repository.
    pub locations: PgLocationRepository,
    /// Currency repository.
    pub currencies: PgCurrencyRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Postgres>) -> Self {
        Self {
            locations: PgLocationRepository::new(pool.clone()),
            currencies: PgCurrencyRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Round-trip a trivial query to confirm the database answers.
    pub async fn health_check(&self) -> Result<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        log_pool_metrics(&self.pool);
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Postgres> {
        &self.pool
    }

    /// Close every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
