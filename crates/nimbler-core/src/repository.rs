use async_trait::async_trait;
use jiff::Timestamp;

use crate::account::Account;
use crate::error::Result;
use crate::link::{LinkHash, NewLink};

/// Account lifecycle: creation, authentication, lookup, mutation and soft
/// deletion.
///
/// Identifiers arrive as caller-supplied strings and are validated before any
/// query is issued. Deleted accounts are invisible to every operation.
#[async_trait]
pub trait AccountRepository: Send + Sync + 'static {
    /// Creates an account, hashing `credential` before it is persisted.
    /// Returns `Err(EmailConflict)` if a live account already uses `email`.
    async fn create(&self, name: &str, email: &str, credential: &str) -> Result<Account>;

    /// Looks up the live account for `email` and verifies `credential`.
    ///
    /// Returns `Err(AccountNotFound)` for an unknown email and
    /// `Err(AuthFailure)` for a wrong credential.
    async fn authenticate(&self, email: &str, credential: &str) -> Result<Account>;

    /// Retrieves the live account with the given identifier.
    async fn retrieve(&self, id: &str) -> Result<Account>;

    /// Checks whether a live account uses `email`.
    async fn email_exists(&self, email: &str) -> Result<bool>;

    /// Replaces the name and email of a live account.
    async fn update_profile(&self, id: &str, name: &str, email: &str) -> Result<()>;

    /// Replaces the credential of a live account.
    async fn update_credential(&self, id: &str, credential: &str) -> Result<()>;

    /// Soft deletes an account. Deleting a missing or already deleted
    /// account succeeds.
    async fn delete(&self, id: &str) -> Result<()>;
}

/// A read-only view of the link store.
#[async_trait]
pub trait ReadLinkRepository: Send + Sync + 'static {
    /// Returns the original URL for `hash` if it expires strictly after `now`.
    /// Missing and expired links both yield `Err(LinkNotFound)`.
    async fn resolve_original(&self, hash: &LinkHash, now: Timestamp) -> Result<String>;

    /// Checks whether any link uses `alias`. The answer is advisory; the
    /// alias may be taken before the caller inserts.
    async fn alias_exists(&self, alias: &str) -> Result<bool>;

    /// Returns up to `limit` hashes that expired before `cutoff`, oldest first.
    async fn list_expired_before(&self, cutoff: Timestamp, limit: u32) -> Result<Vec<LinkHash>>;
}

#[async_trait]
pub trait LinkRepository: ReadLinkRepository {
    /// Inserts a new link owned by a live account.
    async fn create(&self, link: NewLink) -> Result<()>;

    /// Deletes the link for `hash`. A missing link is not an error.
    async fn delete(&self, hash: &LinkHash) -> Result<()>;

    /// Deletes every link in `hashes` atomically: either all existing ones are
    /// removed or, on failure, none are.
    async fn delete_batch(&self, hashes: &[LinkHash]) -> Result<()>;
}
