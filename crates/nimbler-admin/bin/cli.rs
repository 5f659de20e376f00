use std::time::Duration;

use clap::{Parser, Subcommand};
use jiff::Timestamp;
use nimbler_storage::config::{DEFAULT_MAX_CONNECTIONS, DEFAULT_OPERATION_TIMEOUT};
use nimbler_storage::StoreConfig;

pub const DATABASE_URL_ENV: &str = "NIMBLER_DATABASE_URL";
pub const MAX_CONNECTIONS_ENV: &str = "NIMBLER_MAX_CONNECTIONS";
pub const OPERATION_TIMEOUT_MS_ENV: &str = "NIMBLER_OPERATION_TIMEOUT_MS";

pub const DEFAULT_DATABASE_URL: &str = "sqlite://nimbler.db";
pub const DEFAULT_BATCH_SIZE: u32 = 500;

#[derive(Debug, Parser)]
#[command(name = "nimbler-admin", about = "Maintenance tasks for the Nimbler store")]
pub struct CLI {
    #[arg(long, env = DATABASE_URL_ENV, default_value = DEFAULT_DATABASE_URL)]
    pub database_url: String,

    #[arg(long, env = MAX_CONNECTIONS_ENV, default_value_t = DEFAULT_MAX_CONNECTIONS)]
    pub max_connections: u32,

    #[arg(
        long,
        env = OPERATION_TIMEOUT_MS_ENV,
        default_value_t = DEFAULT_OPERATION_TIMEOUT.as_millis() as u64,
    )]
    pub operation_timeout_ms: u64,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending schema migrations.
    Migrate,
    /// Delete links that expired before a cutoff.
    Reap {
        /// RFC 3339 cutoff; defaults to now.
        #[arg(long)]
        before: Option<Timestamp>,

        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
        batch_size: u32,
    },
}

impl CLI {
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig::builder()
            .database_url(self.database_url.clone())
            .max_connections(self.max_connections)
            .operation_timeout(Duration::from_millis(self.operation_timeout_ms))
            .build()
    }
}
