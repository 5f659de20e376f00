#![allow(dead_code)]

use std::time::Duration;

use nimbler_core::{Account, AccountRepository, Argon2Hasher};
use nimbler_storage::config::DEFAULT_OPERATION_TIMEOUT;
use nimbler_storage::{SqliteAccountRepository, SqliteLinkRepository, SqliteStore, StoreConfig};
use nimbler_test_infra::sqlite::{SqliteConfig, SqliteDatabase};

pub struct Fixture {
    db: SqliteDatabase,
    pub store: SqliteStore,
    pub accounts: SqliteAccountRepository,
    pub links: SqliteLinkRepository,
}

impl Fixture {
    pub async fn start() -> Self {
        Self::start_with(fast_hasher(), DEFAULT_OPERATION_TIMEOUT).await
    }

    /// Connects and migrates with default settings; only the account
    /// repository uses `operation_timeout`.
    pub async fn start_with(hasher: Argon2Hasher, operation_timeout: Duration) -> Self {
        let db = SqliteDatabase::new(SqliteConfig::builder().build()).expect("temp database");
        let config = StoreConfig::builder()
            .database_url(db.database_url())
            .build();

        let store = SqliteStore::connect(&config).await.expect("connect sqlite");
        store.migrate().await.expect("create schema");

        Self {
            db,
            accounts: SqliteStore::new(store.pool().clone(), operation_timeout).accounts(hasher),
            links: store.links(),
            store,
        }
    }

    /// Connection string of the fixture database, for opening a second pool
    /// with different settings.
    pub fn database_url(&self) -> String {
        self.db.database_url()
    }

    pub async fn account(&self, name: &str, email: &str) -> Account {
        self.accounts
            .create(name, email, "qwerty")
            .await
            .expect("create account")
    }
}

/// Argon2 with minimal costs; production defaults are far too slow for
/// unoptimized test builds.
pub fn fast_hasher() -> Argon2Hasher {
    Argon2Hasher::with_cost(256, 1, 1).expect("argon2 params")
}
