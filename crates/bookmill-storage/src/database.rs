// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All access is serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes: the
//! compare-and-swap updates rely on a single writer.

use std::path::Path;

use bookmill_core::BookmillError;
use tracing::debug;

use crate::migrations;

/// Handle to the single SQLite connection.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database in WAL mode and run pending migrations.
    pub async fn open(path: &str) -> Result<Self, BookmillError> {
        Self::open_with(path, true).await
    }

    /// Open the database, choosing the journal mode explicitly.
    ///
    /// Missing parent directories are created.
    pub async fn open_with(path: &str, wal_mode: bool) -> Result<Self, BookmillError> {
        if let Some(parent) = Path::new(path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(BookmillError::storage)?;

        let migrated = conn
            .call(move |conn| -> Result<Result<(), BookmillError>, rusqlite::Error> {
                let journal = if wal_mode { "WAL" } else { "DELETE" };
                let _mode: String =
                    conn.pragma_update_and_check(None, "journal_mode", journal, |row| row.get(0))?;
                conn.pragma_update(None, "synchronous", "NORMAL")?;
                conn.pragma_update(None, "foreign_keys", "ON")?;
                conn.pragma_update(None, "busy_timeout", 5000)?;
                Ok(migrations::run_migrations(conn))
            })
            .await
            .map_err(map_tr_err)?;
        migrated?;

        debug!(path, wal_mode, "database opened");
        Ok(Self { conn })
    }

    /// The underlying connection, for query modules.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Close the connection, waiting for queued calls to finish.
    pub async fn close(self) -> Result<(), BookmillError> {
        self.conn.close().await.map_err(BookmillError::storage)
    }
}

/// Convert a tokio-rusqlite error into [`BookmillError::Storage`].
pub fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> BookmillError {
    BookmillError::storage(e)
}
