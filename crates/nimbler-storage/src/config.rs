use std::time::Duration;

use typed_builder::TypedBuilder;

pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection settings for [`SqliteStore`](crate::SqliteStore).
#[derive(Debug, Clone, TypedBuilder)]
pub struct StoreConfig {
    /// SQLite connection string, e.g. `sqlite://nimbler.db`.
    #[builder(setter(into))]
    pub database_url: String,
    #[builder(default = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,
    /// Upper bound on every store operation, including credential hashing
    /// and waiting for a pooled connection.
    #[builder(default = DEFAULT_OPERATION_TIMEOUT)]
    pub operation_timeout: Duration,
    /// How long a writer waits on a locked database before failing.
    #[builder(default = DEFAULT_BUSY_TIMEOUT)]
    pub busy_timeout: Duration,
    #[builder(default = true)]
    pub create_if_missing: bool,
}
