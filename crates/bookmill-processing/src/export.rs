// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! CSV export of a book's generated questions.

use std::path::PathBuf;

use bookmill_config::model::ExportConfig;
use bookmill_core::{Book, BookmillError, Question};
use serde::Serialize;

/// Where export files go and how they are named.
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub output_dir: PathBuf,
    /// Template with a `{stem}` placeholder.
    pub file_name_format: String,
}

impl From<&ExportConfig> for ExportSettings {
    fn from(config: &ExportConfig) -> Self {
        Self {
            output_dir: PathBuf::from(&config.output_dir),
            file_name_format: config.file_name_format.clone(),
        }
    }
}

impl ExportSettings {
    /// File name for a book's export: the name up to its first `.` fills `{stem}`.
    pub fn file_name(&self, book_name: &str) -> String {
        let stem = book_name.split('.').next().unwrap_or_default();
        let stem = if stem.trim().is_empty() { "book" } else { stem };
        let stem: String = stem
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.file_name_format.replace("{stem}", &stem)
    }
}

/// A finished export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportResult {
    pub book: Book,
    pub questions: Vec<Question>,
    pub file_name: String,
    /// Where the CSV was written.
    pub path: PathBuf,
}

#[derive(Serialize)]
struct CsvRow<'a> {
    book_id: &'a str,
    book_name: &'a str,
    page_number: u32,
    ordinal: u32,
    question: &'a str,
    created_at: &'a str,
}

/// Renders questions as CSV with a header row.
pub fn render_csv(book: &Book, questions: &[Question]) -> Result<Vec<u8>, BookmillError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    if questions.is_empty() {
        writer
            .write_record([
                "book_id",
                "book_name",
                "page_number",
                "ordinal",
                "question",
                "created_at",
            ])
            .map_err(csv_err)?;
    }
    for q in questions {
        writer
            .serialize(CsvRow {
                book_id: book.id.as_str(),
                book_name: &book.name,
                page_number: q.page_number,
                ordinal: q.ordinal,
                question: &q.text,
                created_at: &q.created_at,
            })
            .map_err(csv_err)?;
    }
    writer
        .into_inner()
        .map_err(|e| BookmillError::Internal(format!("failed to flush CSV: {e}")))
}

fn csv_err(e: csv::Error) -> BookmillError {
    BookmillError::Internal(format!("failed to write CSV: {e}"))
}
