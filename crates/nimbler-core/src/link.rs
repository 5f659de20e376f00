use std::fmt::Display;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::account::AccountId;
use crate::error::{Result, StoreError};

/// Primary key of a link, produced by the external key generator.
///
/// Hashes must be 1-16 characters long and contain only
/// alphanumeric characters, hyphens, or underscores.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LinkHash(String);

const MAX_HASH_LENGTH: usize = 16;

impl LinkHash {
    /// Creates a new `LinkHash` after validating the input.
    pub fn new(hash: impl Into<String>) -> Result<Self> {
        let hash = hash.into();
        Self::validate(&hash)?;
        Ok(Self(hash))
    }

    /// Creates a `LinkHash` without validation.
    ///
    /// Use this only for values read back from the store.
    pub fn new_unchecked(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn validate(hash: &str) -> Result<()> {
        if hash.is_empty() || hash.len() > MAX_HASH_LENGTH {
            return Err(StoreError::InvalidInput(format!(
                "link hash length must be between 1 and {}, got {}",
                MAX_HASH_LENGTH,
                hash.len()
            )));
        }

        if !hash
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(StoreError::InvalidInput(format!(
                "link hash must contain only alphanumeric characters, hyphens, or underscores: '{}'",
                hash
            )));
        }

        Ok(())
    }
}

impl TryFrom<String> for LinkHash {
    type Error = StoreError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<LinkHash> for String {
    fn from(value: LinkHash) -> Self {
        value.0
    }
}

impl Display for LinkHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A link to be inserted. The store fills in the creation time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLink {
    pub hash: LinkHash,
    pub owner: AccountId,
    pub expires_at: Timestamp,
    pub original_url: String,
    pub custom_alias: Option<String>,
}

impl NewLink {
    /// Checks the fields the schema cannot express as typed values.
    pub fn validate(&self) -> Result<()> {
        if self.original_url.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "original url cannot be empty".to_string(),
            ));
        }

        if self
            .custom_alias
            .as_deref()
            .is_some_and(|alias| alias.trim().is_empty())
        {
            return Err(StoreError::InvalidInput(
                "custom alias cannot be blank".to_string(),
            ));
        }

        Ok(())
    }
}
