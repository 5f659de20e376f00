use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use jiff::Timestamp;
use nimbler_core::account::{validate_email, validate_name};
use nimbler_core::{
    Account, AccountId, AccountRepository, Argon2Hasher, CredentialHash, CredentialHasher,
    Result, StoreError,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tokio::sync::OnceCell;
use tracing::{debug, instrument};

use crate::error::{is_unique_violation_on, map_sqlx_error, ACCOUNT_EMAIL};
use crate::sqlite::{from_nanos, from_optional_nanos, to_nanos, within};

/// Restricts a statement over `accounts` to rows that were not soft deleted.
///
/// Every statement that must ignore deleted accounts goes through this macro
/// so the predicate exists in exactly one place. The statement must end in a
/// `WHERE` clause.
macro_rules! live {
    ($sql:literal) => {
        concat!($sql, " AND deleted_at IS NULL")
    };
}
pub(crate) use live;

/// SQLite implementation of [`AccountRepository`].
///
/// Accounts are soft deleted through `deleted_at`; deleted rows are kept but
/// never returned and do not hold on to their email.
#[derive(Debug, Clone)]
pub struct SqliteAccountRepository<H = Argon2Hasher> {
    pool: SqlitePool,
    hasher: Arc<H>,
    operation_timeout: Duration,
    decoy: Arc<OnceCell<CredentialHash>>,
}

impl<H: CredentialHasher> SqliteAccountRepository<H> {
    pub fn new(pool: SqlitePool, hasher: H, operation_timeout: Duration) -> Self {
        Self {
            pool,
            hasher: Arc::new(hasher),
            operation_timeout,
            decoy: Arc::new(OnceCell::new()),
        }
    }

    async fn hash(&self, plaintext: &str) -> Result<CredentialHash> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || hasher.hash(&plaintext))
            .await
            .map_err(|e| StoreError::Credential(format!("hashing task failed: {e}")))?
    }

    async fn verify(&self, plaintext: &str, digest: CredentialHash) -> Result<bool> {
        let hasher = Arc::clone(&self.hasher);
        let plaintext = plaintext.to_owned();

        tokio::task::spawn_blocking(move || hasher.verify(&plaintext, &digest))
            .await
            .map_err(|e| StoreError::Credential(format!("verification task failed: {e}")))?
    }

    /// Spends one verification on a throwaway digest so an unknown email
    /// costs the same as a wrong credential.
    async fn verify_decoy(&self, plaintext: &str) -> Result<()> {
        let decoy = self
            .decoy
            .get_or_try_init(|| self.hash("nimbler-decoy-credential"))
            .await?
            .clone();
        self.verify(plaintext, decoy).await?;
        Ok(())
    }
}

fn account_from_row(row: &SqliteRow) -> Result<Account> {
    let id: String = row.try_get("account_id").map_err(map_sqlx_error)?;
    let credential: Vec<u8> = row.try_get("credential").map_err(map_sqlx_error)?;
    let credential = String::from_utf8(credential).map_err(|e| {
        StoreError::InvalidData(format!("credential hash for account '{}': {e}", id))
    })?;

    Ok(Account {
        id: AccountId::parse(&id)
            .map_err(|_| StoreError::InvalidData(format!("invalid account id '{}'", id)))?,
        name: row.try_get("name").map_err(map_sqlx_error)?,
        email: row.try_get("email").map_err(map_sqlx_error)?,
        credential: CredentialHash::from_phc(credential),
        created_at: from_nanos(row.try_get("created_at").map_err(map_sqlx_error)?)?,
        updated_at: from_optional_nanos(row.try_get("updated_at").map_err(map_sqlx_error)?)?,
        deleted_at: from_optional_nanos(row.try_get("deleted_at").map_err(map_sqlx_error)?)?,
    })
}

#[async_trait]
impl<H: CredentialHasher> AccountRepository for SqliteAccountRepository<H> {
    #[instrument(skip(self, credential))]
    async fn create(&self, name: &str, email: &str, credential: &str) -> Result<Account> {
        validate_name(name)?;
        validate_email(email)?;

        within(self.operation_timeout, "create account", async {
            let account = Account {
                id: AccountId::generate(),
                name: name.to_owned(),
                email: email.to_owned(),
                credential: self.hash(credential).await?,
                created_at: Timestamp::now(),
                updated_at: None,
                deleted_at: None,
            };

            let result = sqlx::query(
                r#"
                INSERT INTO accounts (account_id, name, email, credential, created_at)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(account.id.to_string())
            .bind(&account.name)
            .bind(&account.email)
            .bind(account.credential.as_bytes())
            .bind(to_nanos(account.created_at)?)
            .execute(&self.pool)
            .await;

            match result {
                Ok(_) => {
                    debug!(account_id = %account.id, "account created");
                    Ok(account)
                }
                Err(err) if is_unique_violation_on(&err, ACCOUNT_EMAIL) => {
                    Err(StoreError::EmailConflict(email.to_owned()))
                }
                Err(err) => Err(map_sqlx_error(err)),
            }
        })
        .await
    }

    #[instrument(skip(self, credential))]
    async fn authenticate(&self, email: &str, credential: &str) -> Result<Account> {
        within(self.operation_timeout, "authenticate", async {
            let row = sqlx::query(live!(
                r#"
                SELECT account_id, name, email, credential, created_at, updated_at, deleted_at
                FROM accounts
                WHERE email = ?
                "#
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            let Some(row) = row else {
                self.verify_decoy(credential).await?;
                return Err(StoreError::AccountNotFound(email.to_owned()));
            };

            let account = account_from_row(&row)?;
            if !self.verify(credential, account.credential.clone()).await? {
                debug!(account_id = %account.id, "credential mismatch");
                return Err(StoreError::AuthFailure);
            }

            Ok(account)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn retrieve(&self, id: &str) -> Result<Account> {
        let account_id = AccountId::parse(id)?;

        within(self.operation_timeout, "retrieve account", async {
            let row = sqlx::query(live!(
                r#"
                SELECT account_id, name, email, credential, created_at, updated_at, deleted_at
                FROM accounts
                WHERE account_id = ?
                "#
            ))
            .bind(account_id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            match row {
                Some(row) => account_from_row(&row),
                None => Err(StoreError::AccountNotFound(account_id.to_string())),
            }
        })
        .await
    }

    #[instrument(skip(self))]
    async fn email_exists(&self, email: &str) -> Result<bool> {
        within(self.operation_timeout, "email exists", async {
            let exists = sqlx::query(live!(
                r#"
                SELECT 1
                FROM accounts
                WHERE email = ?
                "#
            ))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?
            .is_some();

            Ok(exists)
        })
        .await
    }

    #[instrument(skip(self))]
    async fn update_profile(&self, id: &str, name: &str, email: &str) -> Result<()> {
        let account_id = AccountId::parse(id)?;
        validate_name(name)?;
        validate_email(email)?;

        within(self.operation_timeout, "update profile", async {
            let result = sqlx::query(live!(
                r#"
                UPDATE accounts
                SET name = ?, email = ?, updated_at = ?
                WHERE account_id = ?
                "#
            ))
            .bind(name)
            .bind(email)
            .bind(to_nanos(Timestamp::now())?)
            .bind(account_id.to_string())
            .execute(&self.pool)
            .await;

            match result {
                Ok(done) if done.rows_affected() == 0 => {
                    Err(StoreError::AccountNotFound(account_id.to_string()))
                }
                Ok(_) => Ok(()),
                Err(err) if is_unique_violation_on(&err, ACCOUNT_EMAIL) => {
                    Err(StoreError::EmailConflict(email.to_owned()))
                }
                Err(err) => Err(map_sqlx_error(err)),
            }
        })
        .await
    }

    #[instrument(skip(self, credential))]
    async fn update_credential(&self, id: &str, credential: &str) -> Result<()> {
        let account_id = AccountId::parse(id)?;

        within(self.operation_timeout, "update credential", async {
            let digest = self.hash(credential).await?;

            let result = sqlx::query(live!(
                r#"
                UPDATE accounts
                SET credential = ?, updated_at = ?
                WHERE account_id = ?
                "#
            ))
            .bind(digest.as_bytes())
            .bind(to_nanos(Timestamp::now())?)
            .bind(account_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            if result.rows_affected() == 0 {
                return Err(StoreError::AccountNotFound(account_id.to_string()));
            }
            Ok(())
        })
        .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> Result<()> {
        let account_id = AccountId::parse(id)?;

        within(self.operation_timeout, "delete account", async {
            sqlx::query(live!(
                r#"
                UPDATE accounts
                SET deleted_at = ?
                WHERE account_id = ?
                "#
            ))
            .bind(to_nanos(Timestamp::now())?)
            .bind(account_id.to_string())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

            Ok(())
        })
        .await
    }
}
