// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the book record store.

use async_trait::async_trait;

use crate::error::BookmillError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Book, BookId, BookStats, Question};

/// Adapter for the book record store.
///
/// Writes to an existing book are compare-and-swap on [`Book::revision`]: the
/// write only lands if the stored revision still equals the one on the record
/// passed in, otherwise [`BookmillError::Conflict`] is returned and nothing
/// changes.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection, etc.).
    async fn initialize(&self) -> Result<(), BookmillError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), BookmillError>;

    /// Inserts a new book record.
    async fn insert_book(&self, book: &Book) -> Result<(), BookmillError>;

    /// Fetches one book.
    async fn get_book(&self, id: &BookId) -> Result<Option<Book>, BookmillError>;

    /// Lists all books, newest first.
    async fn list_books(&self) -> Result<Vec<Book>, BookmillError>;

    /// File paths of every tracked book.
    async fn tracked_file_paths(&self) -> Result<Vec<String>, BookmillError>;

    /// Writes the mutable fields of `book` and returns the stored record with
    /// its bumped revision and refreshed `updated_at`.
    async fn update_book(&self, book: &Book) -> Result<Book, BookmillError>;

    /// Like [`update_book`](Self::update_book), and inserts `questions` in the
    /// same transaction.
    async fn record_progress(
        &self,
        book: &Book,
        questions: &[Question],
    ) -> Result<Book, BookmillError>;

    /// Questions of a book ordered by page, then ordinal.
    async fn list_questions(&self, book_id: &BookId) -> Result<Vec<Question>, BookmillError>;

    /// Aggregate counts for the dashboard.
    async fn book_stats(&self) -> Result<BookStats, BookmillError>;
}
