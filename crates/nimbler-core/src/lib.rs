//! Core types and traits for the Nimbler account and link stores.
//!
//! This crate defines the domain model, the error taxonomy and the
//! repository contracts. Storage backends live in `nimbler_storage`.

pub mod account;
pub mod credential;
pub mod error;
pub mod link;
pub mod reaper;
pub mod repository;

pub use account::{Account, AccountId};
pub use credential::{Argon2Hasher, CredentialHash, CredentialHasher};
pub use error::{ErrorKind, Result, StoreError};
pub use link::{LinkHash, NewLink};
pub use reaper::reap_expired;
pub use repository::{AccountRepository, LinkRepository, ReadLinkRepository};
