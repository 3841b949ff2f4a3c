// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Book record operations.
//!
//! Updates are compare-and-swap on `revision`: the `WHERE` clause pins the
//! revision the caller read, so a concurrent writer turns the update into a
//! no-op that is reported as [`BookmillError::Conflict`].

use std::str::FromStr;

use bookmill_core::{BookmillError, now_timestamp};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};

use crate::database::Database;
use crate::models::{Book, BookId, BookStats, BookStatus, Question};
use crate::queries::questions;

const BOOK_COLUMNS: &str = "id, name, file_path, grade, subject, semester, total_pages, \
     processed_pages, questions_count, status, revision, created_at, updated_at";

/// Result of a compare-and-swap write.
enum WriteOutcome {
    Written(Book),
    Missing,
    Stale,
}

impl WriteOutcome {
    fn into_result(self, id: &BookId) -> Result<Book, BookmillError> {
        match self {
            WriteOutcome::Written(book) => Ok(book),
            WriteOutcome::Missing => Err(BookmillError::NotFound { id: id.to_string() }),
            WriteOutcome::Stale => Err(BookmillError::Conflict { id: id.to_string() }),
        }
    }
}

pub(crate) fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    let status: String = row.get(9)?;
    let status = BookStatus::from_str(&status)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(9, Type::Text, Box::new(e)))?;
    Ok(Book {
        id: BookId(row.get(0)?),
        name: row.get(1)?,
        file_path: row.get(2)?,
        grade: row.get(3)?,
        subject: row.get(4)?,
        semester: row.get(5)?,
        total_pages: row.get(6)?,
        processed_pages: row.get(7)?,
        questions_count: row.get(8)?,
        status,
        revision: row.get(10)?,
        created_at: row.get(11)?,
        updated_at: row.get(12)?,
    })
}

/// Insert a new book record.
///
/// A second record for an already tracked `file_path` is rejected as invalid input.
pub async fn insert_book(db: &Database, book: &Book) -> Result<(), BookmillError> {
    let book = book.clone();
    let outcome = db
        .connection()
        .call(move |conn| -> Result<Result<(), String>, rusqlite::Error> {
            let inserted = conn.execute(
                "INSERT INTO books (id, name, file_path, grade, subject, semester, total_pages,
                                    processed_pages, questions_count, status, revision,
                                    created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13)",
                params![
                    book.id.as_str(),
                    book.name,
                    book.file_path,
                    book.grade,
                    book.subject,
                    book.semester,
                    book.total_pages,
                    book.processed_pages,
                    book.questions_count,
                    book.status.as_str(),
                    book.revision,
                    book.created_at,
                    book.updated_at,
                ],
            );
            match inserted {
                Ok(_) => Ok(Ok(())),
                Err(rusqlite::Error::SqliteFailure(err, message))
                    if err.code == rusqlite::ErrorCode::ConstraintViolation =>
                {
                    Ok(Err(message.unwrap_or_else(|| err.to_string())))
                }
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)?;

    outcome.map_err(|reason| {
        BookmillError::InvalidInput(format!("book record rejected: {reason}"))
    })
}

/// Get a book by ID.
pub async fn get_book(db: &Database, id: &BookId) -> Result<Option<Book>, BookmillError> {
    let id = id.clone();
    db.connection()
        .call(move |conn| -> Result<Option<Book>, rusqlite::Error> {
            conn.query_row(
                &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
                params![id.as_str()],
                book_from_row,
            )
            .optional()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// List every book, newest first.
pub async fn list_books(db: &Database) -> Result<Vec<Book>, BookmillError> {
    db.connection()
        .call(|conn| -> Result<Vec<Book>, rusqlite::Error> {
            let mut stmt = conn.prepare(&format!(
                "SELECT {BOOK_COLUMNS} FROM books ORDER BY created_at DESC, rowid DESC"
            ))?;
            let rows = stmt.query_map([], book_from_row)?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// File paths of all tracked books.
pub async fn tracked_file_paths(db: &Database) -> Result<Vec<String>, BookmillError> {
    db.connection()
        .call(|conn| -> Result<Vec<String>, rusqlite::Error> {
            let mut stmt = conn.prepare("SELECT file_path FROM books")?;
            let rows = stmt.query_map([], |row| row.get(0))?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Compare-and-swap write of the mutable columns.
fn write_book(conn: &Connection, book: &Book) -> rusqlite::Result<WriteOutcome> {
    let now = now_timestamp();
    let changed = conn.execute(
        "UPDATE books
         SET grade = ?1, subject = ?2, semester = ?3, total_pages = ?4,
             processed_pages = ?5, questions_count = ?6, status = ?7,
             revision = revision + 1, updated_at = ?8
         WHERE id = ?9 AND revision = ?10",
        params![
            book.grade,
            book.subject,
            book.semester,
            book.total_pages,
            book.processed_pages,
            book.questions_count,
            book.status.as_str(),
            now,
            book.id.as_str(),
            book.revision,
        ],
    )?;

    if changed == 1 {
        let mut stored = book.clone();
        stored.revision += 1;
        stored.updated_at = now;
        return Ok(WriteOutcome::Written(stored));
    }

    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM books WHERE id = ?1)",
        params![book.id.as_str()],
        |row| row.get(0),
    )?;
    Ok(if exists {
        WriteOutcome::Stale
    } else {
        WriteOutcome::Missing
    })
}

/// Write the mutable fields of `book` if its revision is still current.
///
/// Returns the stored record with bumped revision and `updated_at`.
pub async fn update_book(db: &Database, book: &Book) -> Result<Book, BookmillError> {
    let book = book.clone();
    let id = book.id.clone();
    let outcome = db
        .connection()
        .call(move |conn| -> Result<WriteOutcome, rusqlite::Error> { write_book(conn, &book) })
        .await
        .map_err(crate::database::map_tr_err)?;
    outcome.into_result(&id)
}

/// Compare-and-swap write plus question inserts, in one transaction.
///
/// On a stale revision nothing is written, questions included.
pub async fn record_progress(
    db: &Database,
    book: &Book,
    new_questions: &[Question],
) -> Result<Book, BookmillError> {
    let book = book.clone();
    let new_questions = new_questions.to_vec();
    let id = book.id.clone();
    let outcome = db
        .connection()
        .call(move |conn| -> Result<WriteOutcome, rusqlite::Error> {
            let tx = conn.transaction()?;
            let outcome = write_book(&tx, &book)?;
            if matches!(outcome, WriteOutcome::Written(_)) {
                questions::insert_all(&tx, &new_questions)?;
                tx.commit()?;
            }
            Ok(outcome)
        })
        .await
        .map_err(crate::database::map_tr_err)?;
    outcome.into_result(&id)
}

/// Dashboard totals.
pub async fn book_stats(db: &Database) -> Result<BookStats, BookmillError> {
    db.connection()
        .call(|conn| -> Result<BookStats, rusqlite::Error> {
            conn.query_row(
                "SELECT COUNT(*),
                        COALESCE(SUM(status = 'processing'), 0),
                        COALESCE(SUM(status = 'completed'), 0),
                        (SELECT COUNT(*) FROM questions)
                 FROM books",
                [],
                |row| {
                    Ok(BookStats {
                        total_books: row.get::<_, i64>(0)? as u64,
                        processing_books: row.get::<_, i64>(1)? as u64,
                        completed_books: row.get::<_, i64>(2)? as u64,
                        total_questions: row.get::<_, i64>(3)? as u64,
                    })
                },
            )
        })
        .await
        .map_err(crate::database::map_tr_err)
}
