use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use jiff::Timestamp;
use nimbler_core::{CredentialHasher, Result, StoreError};
use sqlx::migrate::Migrator;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::info;

use crate::account::SqliteAccountRepository;
use crate::config::StoreConfig;
use crate::error::{map_migrate_error, map_sqlx_error};
use crate::link::SqliteLinkRepository;

/// Schema migrations embedded at compile time.
pub static MIGRATOR: Migrator = sqlx::migrate!();

/// Shared handle to the relational store.
///
/// Cloning is cheap; every clone addresses the same connection pool. The
/// account and link repositories are views over this handle.
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
    operation_timeout: Duration,
}

impl SqliteStore {
    /// Creates a store from an existing pool.
    pub fn new(pool: SqlitePool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }

    /// Opens a connection pool as described by `config`.
    ///
    /// Foreign keys are always enforced and the journal runs in WAL mode so
    /// readers never block the single writer.
    pub async fn connect(config: &StoreConfig) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)
            .map_err(map_sqlx_error)?
            .create_if_missing(config.create_if_missing)
            .journal_mode(SqliteJournalMode::Wal)
            .foreign_keys(true)
            .busy_timeout(config.busy_timeout);

        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.operation_timeout)
            .connect_with(options)
            .await
            .map_err(map_sqlx_error)?;

        info!(
            max_connections = config.max_connections,
            operation_timeout = ?config.operation_timeout,
            "connected to sqlite store"
        );
        Ok(Self::new(pool, config.operation_timeout))
    }

    /// Brings the schema up to date.
    pub async fn migrate(&self) -> Result<()> {
        MIGRATOR.run(&self.pool).await.map_err(map_migrate_error)?;
        info!("schema migrations applied");
        Ok(())
    }

    /// Returns a reference to the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Returns the account repository backed by this store.
    pub fn accounts<H: CredentialHasher>(&self, hasher: H) -> SqliteAccountRepository<H> {
        SqliteAccountRepository::new(self.pool.clone(), hasher, self.operation_timeout)
    }

    /// Returns the link repository backed by this store.
    pub fn links(&self) -> SqliteLinkRepository {
        SqliteLinkRepository::new(self.pool.clone(), self.operation_timeout)
    }

    /// Closes every pooled connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

/// Runs `operation` to completion or fails with [`StoreError::Timeout`].
///
/// Dropping the inner future on expiry also drops any transaction it holds,
/// which rolls it back.
pub(crate) async fn within<T, F>(limit: Duration, name: &'static str, operation: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    tokio::time::timeout(limit, operation)
        .await
        .map_err(|_| StoreError::Timeout(format!("{name} exceeded {limit:?}")))?
}

/// Converts a timestamp to the nanoseconds since the epoch the schema stores.
///
/// Only instants between 1677 and 2262 fit in an `i64`; anything else is
/// rejected as [`StoreError::InvalidInput`].
pub(crate) fn to_nanos(timestamp: Timestamp) -> Result<i64> {
    i64::try_from(timestamp.as_nanosecond()).map_err(|_| {
        StoreError::InvalidInput(format!(
            "timestamp {timestamp} is outside the storable range"
        ))
    })
}

pub(crate) fn from_nanos(value: i64) -> Result<Timestamp> {
    Timestamp::from_nanosecond(i128::from(value)).map_err(|e| {
        StoreError::InvalidData(format!("invalid timestamp '{}': {e}", value))
    })
}

pub(crate) fn from_optional_nanos(value: Option<i64>) -> Result<Option<Timestamp>> {
    value.map(from_nanos).transpose()
}
