use std::fmt::{Display, Formatter};
use std::str::FromStr;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::credential::CredentialHash;
use crate::error::{Result, StoreError};

const MAX_NAME_LENGTH: usize = 20;
const MAX_EMAIL_LENGTH: usize = 255;

/// Identifier of an account, generated by the store at creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parses an identifier supplied by a caller.
    ///
    /// Fails with [`StoreError::InvalidId`] when `value` is not a UUID.
    pub fn parse(value: &str) -> Result<Self> {
        Uuid::parse_str(value)
            .map(Self)
            .map_err(|_| StoreError::InvalidId(value.to_owned()))
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for AccountId {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Display for AccountId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.0.hyphenated().fmt(f)
    }
}

/// A registered user identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub credential: CredentialHash,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
    pub deleted_at: Option<Timestamp>,
}

impl Account {
    /// Returns `true` until the account has been soft deleted.
    pub fn is_active(&self) -> bool {
        self.deleted_at.is_none()
    }
}

/// Checks a display name: non-empty and at most 20 characters.
pub fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(StoreError::InvalidInput("name cannot be empty".to_string()));
    }

    let length = name.chars().count();
    if length > MAX_NAME_LENGTH {
        return Err(StoreError::InvalidInput(format!(
            "name must be at most {} characters, got {}",
            MAX_NAME_LENGTH, length
        )));
    }

    Ok(())
}

/// Checks an email address: non-empty and at most 255 characters.
pub fn validate_email(email: &str) -> Result<()> {
    if email.trim().is_empty() {
        return Err(StoreError::InvalidInput("email cannot be empty".to_string()));
    }

    if email.len() > MAX_EMAIL_LENGTH {
        return Err(StoreError::InvalidInput(format!(
            "email must be at most {} bytes, got {}",
            MAX_EMAIL_LENGTH,
            email.len()
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn parse_round_trips_generated_id() {
        let id = AccountId::generate();
        let parsed = AccountId::parse(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn parse_rejects_malformed_ids() {
        for raw in ["", "123", "not-a-uuid", "0000000-0000-0000-0000-000000000000"] {
            let err = AccountId::parse(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidId, "{raw:?} should be rejected");
        }
    }

    #[test]
    fn display_is_hyphenated_lowercase() {
        let id: AccountId = "9A7B3C1D-0E2F-4A5B-8C6D-7E8F9A0B1C2D".parse().unwrap();
        assert_eq!(id.to_string(), "9a7b3c1d-0e2f-4a5b-8c6d-7e8f9a0b1c2d");
    }

    #[test]
    fn name_bounds() {
        assert!(validate_name("igor").is_ok());
        assert!(validate_name(&"n".repeat(20)).is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"n".repeat(21)).is_err());
    }

    #[test]
    fn email_bounds() {
        assert!(validate_email("igor@example.com").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email(&format!("{}@example.com", "a".repeat(250))).is_err());
    }
}
