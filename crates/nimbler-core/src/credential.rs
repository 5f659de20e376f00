use std::fmt::{Debug, Formatter};

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};

use crate::error::{Result, StoreError};

/// An irreversible, salted credential digest in PHC string format.
#[derive(Clone, PartialEq, Eq)]
pub struct CredentialHash(String);

impl CredentialHash {
    /// Wraps a digest read back from the store.
    pub fn from_phc(phc: impl Into<String>) -> Self {
        Self(phc.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl Debug for CredentialHash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("CredentialHash(<redacted>)")
    }
}

/// A slow, salted one-way hash for account credentials.
///
/// Both operations are CPU bound; callers on an async runtime should run
/// them on the blocking pool.
pub trait CredentialHasher: Send + Sync + 'static {
    fn hash(&self, plaintext: &str) -> Result<CredentialHash>;

    /// Compares `plaintext` against `digest` in constant time.
    fn verify(&self, plaintext: &str, digest: &CredentialHash) -> Result<bool>;
}

/// Argon2id hasher.
#[derive(Clone)]
pub struct Argon2Hasher {
    params: Params,
}

impl Argon2Hasher {
    pub fn new(params: Params) -> Self {
        Self { params }
    }

    /// Builds a hasher from raw Argon2 costs: memory in KiB, passes, lanes.
    pub fn with_cost(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        Params::new(memory_kib, iterations, parallelism, None)
            .map(Self::new)
            .map_err(|e| StoreError::InvalidInput(format!("argon2 parameters: {e}")))
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl Default for Argon2Hasher {
    fn default() -> Self {
        Self::new(Params::default())
    }
}

impl Debug for Argon2Hasher {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2Hasher")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .finish()
    }
}

impl CredentialHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<CredentialHash> {
        let salt = SaltString::generate(&mut OsRng);
        let digest = self
            .argon2()
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| StoreError::Credential(format!("generating credential hash: {e}")))?;
        Ok(CredentialHash(digest.to_string()))
    }

    fn verify(&self, plaintext: &str, digest: &CredentialHash) -> Result<bool> {
        let parsed = PasswordHash::new(digest.as_str())
            .map_err(|e| StoreError::InvalidData(format!("malformed credential hash: {e}")))?;

        match self.argon2().verify_password(plaintext.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(StoreError::Credential(format!(
                "verifying credential hash: {e}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hasher() -> Argon2Hasher {
        Argon2Hasher::with_cost(256, 1, 1).unwrap()
    }

    #[test]
    fn hash_never_contains_plaintext() {
        let digest = hasher().hash("qwerty").unwrap();
        assert_ne!(digest.as_str(), "qwerty");
        assert!(!digest.as_str().contains("qwerty"));
        assert!(digest.as_str().starts_with("$argon2id$"));
    }

    #[test]
    fn verify_accepts_only_the_original() {
        let hasher = hasher();
        let digest = hasher.hash("qwerty").unwrap();

        assert!(hasher.verify("qwerty", &digest).unwrap());
        assert!(!hasher.verify("wrong", &digest).unwrap());
        assert!(!hasher.verify("", &digest).unwrap());
    }

    #[test]
    fn hashes_are_salted() {
        let hasher = hasher();
        let a = hasher.hash("qwerty").unwrap();
        let b = hasher.hash("qwerty").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn malformed_digest_is_invalid_data() {
        let err = hasher()
            .verify("qwerty", &CredentialHash::from_phc("plain"))
            .unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[test]
    fn rejects_impossible_costs() {
        assert!(Argon2Hasher::with_cost(1, 1, 1).is_err());
        assert!(Argon2Hasher::with_cost(256, 0, 1).is_err());
    }

    #[test]
    fn debug_redacts_digest() {
        let digest = hasher().hash("qwerty").unwrap();
        assert_eq!(format!("{digest:?}"), "CredentialHash(<redacted>)");
    }
}
