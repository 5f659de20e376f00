mod cli;

use anyhow::Context;
use clap::Parser;
use jiff::Timestamp;
use nimbler_core::reap_expired;
use nimbler_storage::SqliteStore;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::cli::{Command, CLI};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = CLI::parse();
    let store = SqliteStore::connect(&config.store_config())
        .await
        .context("connecting to store")?;

    match config.command {
        Command::Migrate => {
            store.migrate().await.context("applying migrations")?;
        }
        Command::Reap { before, batch_size } => {
            let cutoff = before.unwrap_or_else(Timestamp::now);
            info!(%cutoff, batch_size, "reaping expired links");

            let reaped = reap_expired(&store.links(), cutoff, batch_size)
                .await
                .context("reaping expired links")?;
            info!(reaped, "reaper finished");
        }
    }

    store.close().await;
    Ok(())
}
