use nimbler_core::StoreError;
use sqlx::error::DatabaseError;

/// Column named by SQLite when the live-email unique index is violated.
pub(crate) const ACCOUNT_EMAIL: &str = "accounts.email";
pub(crate) const LINK_HASH: &str = "links.hash";
pub(crate) const LINK_ALIAS: &str = "links.custom_alias";

// Primary result codes; extended codes carry them in the low byte.
const SQLITE_BUSY: i32 = 5;
const SQLITE_LOCKED: i32 = 6;

/// Returns `true` if `err` is a unique violation on `column`.
///
/// SQLite reports unique and primary key failures as
/// `UNIQUE constraint failed: <table>.<column>`, which is the only place the
/// offending constraint is named.
pub(crate) fn is_unique_violation_on(err: &sqlx::Error, column: &str) -> bool {
    err.as_database_error().is_some_and(|db| {
        db.is_unique_violation() && db.message().contains(column)
    })
}

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|db| db.is_foreign_key_violation())
}

/// Returns `true` if SQLite gave up waiting on another connection's lock.
fn is_lock_contention(db: &dyn DatabaseError) -> bool {
    db.code()
        .and_then(|code| code.parse::<i32>().ok())
        .is_some_and(|code| matches!(code & 0xff, SQLITE_BUSY | SQLITE_LOCKED))
}

pub(crate) fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let message = err.to_string();

    match err {
        sqlx::Error::Database(ref db) if is_lock_contention(&**db) => {
            StoreError::Unavailable(message)
        }
        sqlx::Error::PoolTimedOut => StoreError::Timeout(message),
        sqlx::Error::PoolClosed
        | sqlx::Error::WorkerCrashed
        | sqlx::Error::Io(_)
        | sqlx::Error::Tls(_) => StoreError::Unavailable(message),
        sqlx::Error::ColumnIndexOutOfBounds { .. }
        | sqlx::Error::ColumnNotFound(_)
        | sqlx::Error::ColumnDecode { .. }
        | sqlx::Error::TypeNotFound { .. }
        | sqlx::Error::Decode(_)
        | sqlx::Error::RowNotFound => StoreError::InvalidData(message),
        _ => StoreError::Query(message),
    }
}

pub(crate) fn map_migrate_error(err: sqlx::migrate::MigrateError) -> StoreError {
    match err {
        sqlx::migrate::MigrateError::Execute(inner) => map_sqlx_error(inner),
        other => StoreError::Query(format!("applying migrations: {other}")),
    }
}
