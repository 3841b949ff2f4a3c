// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Generated question operations.

use bookmill_core::BookmillError;
use rusqlite::{Connection, params};

use crate::database::Database;
use crate::models::{BookId, Question};

/// Insert questions on an open connection or transaction.
pub(crate) fn insert_all(conn: &Connection, questions: &[Question]) -> rusqlite::Result<()> {
    let mut stmt = conn.prepare_cached(
        "INSERT INTO questions (id, book_id, page_number, ordinal, text, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for q in questions {
        stmt.execute(params![
            q.id,
            q.book_id.as_str(),
            q.page_number,
            q.ordinal,
            q.text,
            q.created_at,
        ])?;
    }
    Ok(())
}

/// Questions of a book ordered by page number, then ordinal.
pub async fn list_questions(db: &Database, book_id: &BookId) -> Result<Vec<Question>, BookmillError> {
    let book_id = book_id.clone();
    db.connection()
        .call(move |conn| -> Result<Vec<Question>, rusqlite::Error> {
            let mut stmt = conn.prepare(
                "SELECT id, book_id, page_number, ordinal, text, created_at
                 FROM questions WHERE book_id = ?1
                 ORDER BY page_number ASC, ordinal ASC",
            )?;
            let rows = stmt.query_map(params![book_id.as_str()], |row| {
                Ok(Question {
                    id: row.get(0)?,
                    book_id: BookId(row.get(1)?),
                    page_number: row.get(2)?,
                    ordinal: row.get(3)?,
                    text: row.get(4)?,
                    created_at: row.get(5)?,
                })
            })?;
            rows.collect()
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmill_core::{Book, Classification};
    use tempfile::tempdir;

    #[tokio::test]
    async fn questions_of_unknown_book_are_empty() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("q.db").to_str().unwrap())
            .await
            .unwrap();
        let qs = list_questions(&db, &BookId::from("nope")).await.unwrap();
        assert!(qs.is_empty());
        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn questions_require_an_existing_book() {
        let dir = tempdir().unwrap();
        let db = Database::open(dir.path().join("fk.db").to_str().unwrap())
            .await
            .unwrap();
        let orphan = Book::new("x.pdf", "x.pdf", Classification::default());
        let q = Question {
            id: "q1".to_string(),
            book_id: orphan.id.clone(),
            page_number: 1,
            ordinal: 1,
            text: "orphan".to_string(),
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        };
        let result = db
            .connection()
            .call(move |conn| -> Result<(), rusqlite::Error> { insert_all(conn, &[q]) })
            .await;
        assert!(result.is_err(), "foreign key should reject orphan questions");
        db.close().await.unwrap();
    }
}
