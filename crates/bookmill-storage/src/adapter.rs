// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use bookmill_config::model::StorageConfig;
use bookmill_core::types::{Book, BookId, BookStats, Question};
use bookmill_core::{AdapterType, BookmillError, HealthStatus, PluginAdapter, StorageAdapter};

use crate::database::Database;
use crate::queries;

/// SQLite-backed storage adapter.
///
/// Wraps a [`Database`] handle and delegates to the typed query modules. The
/// database is opened on the first call to [`StorageAdapter::initialize`].
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// The database connection is not opened until `initialize` is called.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, BookmillError> {
        self.db
            .get()
            .ok_or_else(|| BookmillError::storage("storage not initialized, call initialize() first"))
    }

    async fn checkpoint(&self, db: &Database) -> Result<(), BookmillError> {
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        debug!(path = %self.config.database_path, "WAL checkpoint complete");
        Ok(())
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, BookmillError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BookmillError> {
        match self.db.get() {
            Some(db) => self.checkpoint(db).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), BookmillError> {
        let db = Database::open_with(&self.config.database_path, self.config.wal_mode).await?;
        self.db
            .set(db)
            .map_err(|_| BookmillError::storage("storage already initialized"))?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), BookmillError> {
        let db = self.db()?;
        self.checkpoint(db).await
    }

    async fn insert_book(&self, book: &Book) -> Result<(), BookmillError> {
        queries::books::insert_book(self.db()?, book).await
    }

    async fn get_book(&self, id: &BookId) -> Result<Option<Book>, BookmillError> {
        queries::books::get_book(self.db()?, id).await
    }

    async fn list_books(&self) -> Result<Vec<Book>, BookmillError> {
        queries::books::list_books(self.db()?).await
    }

    async fn tracked_file_paths(&self) -> Result<Vec<String>, BookmillError> {
        queries::books::tracked_file_paths(self.db()?).await
    }

    async fn update_book(&self, book: &Book) -> Result<Book, BookmillError> {
        queries::books::update_book(self.db()?, book).await
    }

    async fn record_progress(
        &self,
        book: &Book,
        questions: &[Question],
    ) -> Result<Book, BookmillError> {
        queries::books::record_progress(self.db()?, book, questions).await
    }

    async fn list_questions(&self, book_id: &BookId) -> Result<Vec<Question>, BookmillError> {
        queries::questions::list_questions(self.db()?, book_id).await
    }

    async fn book_stats(&self) -> Result<BookStats, BookmillError> {
        queries::books::book_stats(self.db()?).await
    }
}
