use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use nimbler_core::{LinkHash, LinkRepository, NewLink, ReadLinkRepository, Result, StoreError};
use sqlx::SqlitePool;
use tracing::{debug, instrument};

use crate::account::live;
use crate::error::{
    is_foreign_key_violation, is_unique_violation_on, map_sqlx_error, LINK_ALIAS, LINK_HASH,
};
use crate::sqlite::{to_nanos, within};

/// SQLite implementation of the link repositories.
///
/// Expiration is enforced only by [`ReadLinkRepository::resolve_original`];
/// expired rows stay in place until deleted.
#[derive(Debug, Clone)]
pub struct SqliteLinkRepository {
    pool: SqlitePool,
    operation_timeout: Duration,
}

impl SqliteLinkRepository {
    pub fn new(pool: SqlitePool, operation_timeout: Duration) -> Self {
        Self {
            pool,
            operation_timeout,
        }
    }
}

#[async_trait]
impl ReadLinkRepository for SqliteLinkRepository {
    #[instrument(skip(self))]
    async fn resolve_original(&self, hash: &LinkHash, now: Timestamp) -> Result<String> {
        within(self.operation_timeout, "resolve original", async {
            let original_url: Option<String> = sqlx::query_scalar(
                r#"
                SELECT original_url
                FROM links
                WHERE hash = ?
                  AND expires_at > ?
                "#,
            )
            .bind(hash.as_str())
            .bind(to_nanos(now)?)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            original_url.ok_or_else(|| StoreError::LinkNotFound(hash.to_string()))
        })
        .await
    }

    #[instrument(skip(self))]
    async fn alias_exists(&self, alias: &str) -> Result<bool> {
        within(self.operation_timeout, "alias exists", async {
            let exists = sqlx::query(
                r#"
                SELECT 1
                FROM links
                WHERE custom_alias = ?
                LIMIT 1
                "#,
            )
            .bind(alias)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .is_some();

            Ok(exists)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn list_expired_before(&self, cutoff: Timestamp, limit: u32) -> Result<Vec<LinkHash>> {
        within(self.operation_timeout, "list expired links", async {
            let hashes: Vec<String> = sqlx::query_scalar(
                r#"
                SELECT hash
                FROM links
                WHERE expires_at < ?
                ORDER BY expires_at, hash
                LIMIT ?
                "#,
            )
            .bind(to_nanos(cutoff)?)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            Ok(hashes.into_iter().map(LinkHash::new_unchecked).collect())
        })
        .await
    }
}

#[async_trait]
impl LinkRepository for SqliteLinkRepository {
    #[instrument(skip(self, link), fields(hash = %link.hash, owner = %link.owner))]
    async fn create(&self, link: NewLink) -> Result<()> {
        link.validate()?;

        within(self.operation_timeout, "create link", async {
            // Selecting the owner from live accounts makes a deleted or missing
            // owner insert nothing; the foreign key backs this up.
            let result = sqlx::query(live!(
                r#"
                INSERT INTO links (hash, account_id, created_at, expires_at, original_url, custom_alias)
                SELECT ?, account_id, ?, ?, ?, ?
                FROM accounts
                WHERE account_id = ?
                "#
            ))
            .bind(link.hash.as_str())
            .bind(to_nanos(Timestamp::now())?)
            .bind(to_nanos(link.expires_at)?)
            .bind(&link.original_url)
            .bind(link.custom_alias.as_deref())
            .bind(link.owner.to_string())
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) if done.rows_affected() == 0 => {
                    Err(StoreError::InvalidOwner(link.owner.to_string()))
                }
                Ok(_) => Ok(()),
                Err(err) if is_unique_violation_on(&err, LINK_HASH) => {
                    Err(StoreError::HashConflict(link.hash.to_string()))
                }
                Err(err) if is_unique_violation_on(&err, LINK_ALIAS) => Err(
                    StoreError::AliasConflict(link.custom_alias.clone().unwrap_or_default()),
                ),
                Err(err) if is_foreign_key_violation(&err) => {
                    Err(StoreError::InvalidOwner(link.owner.to_string()))
                }
                Err(err) => Err(map_sqlx_error(err)),
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, hash: &LinkHash) -> Result<()> {
        within(self.operation_timeout, "delete link", async {
            sqlx::query("DELETE FROM links WHERE hash = ?")
                .bind(hash.as_str())
                .execute(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

            Ok(())
        })
        .await
    }

    #[instrument(skip(self, hashes), fields(count = hashes.len()))]
    async fn delete_batch(&self, hashes: &[LinkHash]) -> Result<()> {
        within(self.operation_timeout, "delete link batch", async {
            // The transaction rolls back when dropped, so every early return
            // below leaves the batch untouched.
            let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

            let mut deleted = 0;
            for hash in hashes {
                deleted += sqlx::query("DELETE FROM links WHERE hash = ?")
                    .bind(hash.as_str())
                    .execute(&mut *tx)
                    .await
                    .map_err(map_sqlx_error)?
                    .rows_affected();
            }

            tx.commit().await.map_err(map_sqlx_error)?;
            debug!(deleted, "link batch deleted");
            Ok(())
        })
        .await
    }
}
