use std::fmt::{Display, Formatter};

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors returned by the account and link stores.
///
/// Variants carry the underlying fault as context. Several variants share a
/// coarse [`ErrorKind`], which is what the serving layer maps to responses.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("account id is not in its proper form: {0}")]
    InvalidId(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("account not found: {0}")]
    AccountNotFound(String),
    #[error("link not found: {0}")]
    LinkNotFound(String),
    #[error("email already exists: {0}")]
    EmailConflict(String),
    #[error("custom alias already exists: {0}")]
    AliasConflict(String),
    #[error("link hash already exists: {0}")]
    HashConflict(String),
    #[error("owner account does not exist: {0}")]
    InvalidOwner(String),
    #[error("authentication failed")]
    AuthFailure,
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation timed out: {0}")]
    Timeout(String),
    #[error("storage query failed: {0}")]
    Query(String),
    #[error("stored data is invalid: {0}")]
    InvalidData(String),
    #[error("credential hashing failed: {0}")]
    Credential(String),
}

/// Coarse classification of a [`StoreError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A supplied account identifier is malformed. No query was issued.
    InvalidId,
    /// A supplied value (name, email, url, batch size) failed validation.
    InvalidInput,
    /// The account or link does not exist, or the link has expired.
    NotFound,
    EmailConflict,
    AliasConflict,
    HashConflict,
    /// The link references an account that does not exist or was deleted.
    InvalidOwner,
    /// The credential did not match for an existing account.
    AuthFailure,
    /// Any other persistence fault.
    StoreUnavailable,
}

impl StoreError {
    /// Returns the stable classification of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::InvalidId(_) => ErrorKind::InvalidId,
            StoreError::InvalidInput(_) => ErrorKind::InvalidInput,
            StoreError::AccountNotFound(_) | StoreError::LinkNotFound(_) => ErrorKind::NotFound,
            StoreError::EmailConflict(_) => ErrorKind::EmailConflict,
            StoreError::AliasConflict(_) => ErrorKind::AliasConflict,
            StoreError::HashConflict(_) => ErrorKind::HashConflict,
            StoreError::InvalidOwner(_) => ErrorKind::InvalidOwner,
            StoreError::AuthFailure => ErrorKind::AuthFailure,
            StoreError::Unavailable(_)
            | StoreError::Timeout(_)
            | StoreError::Query(_)
            | StoreError::InvalidData(_)
            | StoreError::Credential(_) => ErrorKind::StoreUnavailable,
        }
    }

    /// Returns `true` if this error is the "does not exist" kind.
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorKind::InvalidId => "invalid-id",
            ErrorKind::InvalidInput => "invalid-input",
            ErrorKind::NotFound => "not-found",
            ErrorKind::EmailConflict => "email-conflict",
            ErrorKind::AliasConflict => "alias-conflict",
            ErrorKind::HashConflict => "hash-conflict",
            ErrorKind::InvalidOwner => "invalid-owner",
            ErrorKind::AuthFailure => "auth-failure",
            ErrorKind::StoreUnavailable => "store-unavailable",
        };
        f.write_str(name)
    }
}
