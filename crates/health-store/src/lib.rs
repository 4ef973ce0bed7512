//! SQLite and CSV record storage for health alerts.
//!
//! [`HealthStore`] keeps outbreak reports, vaccination campaigns and
//! subscribers in SQLite via SQLx. [`CsvDataset`] reads the same records from
//! CSV exports. Both implement [`alert_engine::RecordSource`].
//!
//! # Example
//!
//! ```no_run
//! use health_store::{HealthStore, subscriber};
//! use alert_engine::{ChannelKind, Location, Subscriber};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = HealthStore::connect("sqlite:health.db?mode=rwc").await?;
//!     store.migrate().await?;
//!
//!     let asha = Subscriber {
//!         id: "u1".to_string(),
//!         name: "Asha".to_string(),
//!         email: Some("asha@example.org".to_string()),
//!         preferred_channel: ChannelKind::Email,
//!         location: Location::new("Delhi", "New Delhi"),
//!         notifications_enabled: true,
//!         ..Default::default()
//!     };
//!     subscriber::create_subscriber(store.pool(), &asha).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod coerce;
pub mod dataset;
pub mod error;
pub mod outbreak;
pub mod subscriber;
pub mod vaccination;

pub use dataset::{read_outbreaks, read_vaccinations, CsvDataset};
pub use error::{Result, StoreError};

use alert_engine::{AlertError, Location, OutbreakEvent, RecordSource, Subscriber, VaccinationEvent};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Default SQLite location when `SQLITE_PATH` is unset.
pub const DEFAULT_SQLITE_PATH: &str = "sqlite:health.db?mode=rwc";

/// Record store connection wrapper.
#[derive(Debug, Clone)]
pub struct HealthStore {
    pool: SqlitePool,
}

impl HealthStore {
    const DEFAULT_POOL_SIZE: u32 = 5;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// `sqlite::memory:` works for tests.
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect using `SQLITE_PATH`, falling back to [`DEFAULT_SQLITE_PATH`].
    pub async fn connect_from_env() -> Result<Self> {
        let url = std::env::var("SQLITE_PATH")
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SQLITE_PATH.to_string());
        Self::connect(&url).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!("Connected to record store: {} (pool size: {})", url, pool_size);

        Ok(Self { pool })
    }

    /// Run schema migrations.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running record store migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Copy a CSV dataset into the store.
    ///
    /// Records whose ID is already stored are left untouched. Returns the
    /// number of records written.
    pub async fn import(&self, dataset: &CsvDataset) -> Result<usize> {
        let mut written = 0;
        for record in &dataset.outbreaks {
            match outbreak::create_outbreak(&self.pool, record).await {
                Ok(()) => written += 1,
                Err(StoreError::AlreadyExists { .. }) => {
                    tracing::debug!(id = %record.id, "Outbreak already stored");
                }
                Err(e) => return Err(e),
            }
        }
        for record in &dataset.vaccinations {
            match vaccination::create_vaccination(&self.pool, record).await {
                Ok(()) => written += 1,
                Err(StoreError::AlreadyExists { .. }) => {
                    tracing::debug!(id = %record.id, "Vaccination already stored");
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(written, "Imported CSV dataset");
        Ok(written)
    }

    /// Close the connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl RecordSource for HealthStore {
    async fn list_outbreaks(&self) -> std::result::Result<Vec<OutbreakEvent>, AlertError> {
        Ok(outbreak::list_outbreaks(&self.pool).await?)
    }

    async fn list_vaccinations(&self) -> std::result::Result<Vec<VaccinationEvent>, AlertError> {
        Ok(vaccination::list_vaccinations(&self.pool).await?)
    }

    async fn list_subscribers(
        &self,
        location: &Location,
    ) -> std::result::Result<Vec<Subscriber>, AlertError> {
        Ok(subscriber::list_opted_in(&self.pool, location).await?)
    }
}
