use std::path::{Path, PathBuf};

use tempfile::TempDir;
use typed_builder::TypedBuilder;

use crate::Result;

#[derive(TypedBuilder)]
pub struct SqliteConfig {
    #[builder(default = "nimbler.db".to_string())]
    file_name: String,
    #[builder(default = "nimbler-test-".to_string())]
    dir_prefix: String,
}

/// Test fixture for a disposable on-disk SQLite database.
///
/// The database file lives in a private temporary directory that is removed
/// when the fixture is dropped. An on-disk file is used instead of
/// `sqlite::memory:` so that every pooled connection sees the same data.
pub struct SqliteDatabase {
    dir: TempDir,
    path: PathBuf,
}

impl SqliteDatabase {
    /// Reserves a fresh database location. The file itself is created by the
    /// first connection.
    pub fn new(config: SqliteConfig) -> Result<Self> {
        let dir = tempfile::Builder::new()
            .prefix(&config.dir_prefix)
            .tempdir()?;
        let path = dir.path().join(&config.file_name);

        Ok(Self { dir, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn database_url(&self) -> String {
        format!("sqlite://{}?mode=rwc", self.path.display())
    }

    /// Returns the directory holding the database and its WAL files.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}
