//! SQLite backend for the Nimbler account and link stores.

pub mod account;
pub mod config;
mod error;
pub mod link;
pub mod sqlite;

pub use account::SqliteAccountRepository;
pub use config::StoreConfig;
pub use link::SqliteLinkRepository;
pub use nimbler_core::{
    AccountRepository, ErrorKind, LinkRepository, ReadLinkRepository, StoreError,
};
pub use sqlite::{SqliteStore, MIGRATOR};
