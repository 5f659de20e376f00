//! Disposable infrastructure for integration tests.

pub mod error;
pub mod sqlite;

pub use error::{Result, TestInfraError};
