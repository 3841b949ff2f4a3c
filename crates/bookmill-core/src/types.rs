// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared by storage, processing, and the HTTP gateway.

use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Current UTC time as an RFC 3339 string with millisecond precision.
///
/// This is the timestamp format stored in every `created_at`/`updated_at` column.
pub fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Unique identifier for a book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookId(pub String);

impl BookId {
    /// Generates a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BookId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for BookId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Processing status of a book.
///
/// Only the transition handler and the progress simulator change it.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum BookStatus {
    Idle,
    Paused,
    Processing,
    Completed,
    Error,
    Canceled,
}

impl BookStatus {
    /// All statuses, in declaration order.
    pub const ALL: [BookStatus; 6] = [
        BookStatus::Idle,
        BookStatus::Paused,
        BookStatus::Processing,
        BookStatus::Completed,
        BookStatus::Error,
        BookStatus::Canceled,
    ];

    /// Lowercase name as stored in the database and sent on the wire.
    pub fn as_str(&self) -> &'static str {
        self.into()
    }
}

/// An external command applied to a book by the transition handler.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Display,
    EnumString,
    IntoStaticStr,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ProcessingCommand {
    Start,
    Pause,
    Cancel,
}

/// Optional classification metadata of a textbook.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classification {
    /// School grade, 1 through 12.
    pub grade: Option<u8>,
    pub subject: Option<String>,
    /// Semester, 1 or 2.
    pub semester: Option<u8>,
}

impl Classification {
    pub fn is_empty(&self) -> bool {
        self.grade.is_none() && self.subject.is_none() && self.semester.is_none()
    }
}

/// A tracked book and its processing counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub id: BookId,
    pub name: String,
    /// Location of the PDF, relative to the library root.
    pub file_path: String,
    pub grade: Option<u8>,
    pub subject: Option<String>,
    pub semester: Option<u8>,
    pub total_pages: Option<u32>,
    pub processed_pages: u32,
    pub questions_count: u32,
    pub status: BookStatus,
    /// Optimistic-concurrency counter, bumped by every write.
    pub revision: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl Book {
    /// A fresh idle record with zeroed counters.
    pub fn new(name: impl Into<String>, file_path: impl Into<String>, meta: Classification) -> Self {
        let now = now_timestamp();
        Self {
            id: BookId::generate(),
            name: name.into(),
            file_path: file_path.into(),
            grade: meta.grade,
            subject: meta.subject,
            semester: meta.semester,
            total_pages: None,
            processed_pages: 0,
            questions_count: 0,
            status: BookStatus::Idle,
            revision: 0,
            created_at: now.clone(),
            updated_at: now,
        }
    }

    pub fn classification(&self) -> Classification {
        Classification {
            grade: self.grade,
            subject: self.subject.clone(),
            semester: self.semester,
        }
    }

    /// Fills classification fields that are still unset. Values already on the
    /// record are kept.
    pub fn fill_classification(&mut self, meta: Classification) {
        if self.grade.is_none() {
            self.grade = meta.grade;
        }
        if self.subject.is_none() {
            self.subject = meta.subject;
        }
        if self.semester.is_none() {
            self.semester = meta.semester;
        }
    }

    pub fn progress(&self) -> Progress {
        Progress::of(self)
    }
}

/// Completion snapshot reported by progress checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub processed_pages: u32,
    /// 0 when the page count is not known yet.
    pub total_pages: u32,
    /// Rounded, 0..=100.
    pub percentage: u8,
}

impl Progress {
    pub fn of(book: &Book) -> Self {
        let total = book.total_pages.unwrap_or(0);
        let percentage = if total == 0 {
            0
        } else {
            let ratio = f64::from(book.processed_pages) / f64::from(total);
            (ratio * 100.0).round().clamp(0.0, 100.0) as u8
        };
        Self {
            processed_pages: book.processed_pages,
            total_pages: total,
            percentage,
        }
    }
}

/// Result of the metadata-extraction step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractedMetadata {
    /// Always positive.
    pub total_pages: u32,
    #[serde(flatten)]
    pub classification: Classification,
}

/// A generated question belonging to a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub book_id: BookId,
    /// 1-based page the question was generated from.
    pub page_number: u32,
    /// 1-based position of the question within the whole book.
    pub ordinal: u32,
    pub text: String,
    pub created_at: String,
}

/// Dashboard totals.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookStats {
    pub total_books: u64,
    pub processing_books: u64,
    pub completed_books: u64,
    pub total_questions: u64,
}

/// Emitted whenever a book's status or counters change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub book_id: BookId,
    pub status: BookStatus,
    pub processed_pages: u32,
    pub total_pages: u32,
    pub questions_count: u32,
    pub percentage: u8,
    pub at: String,
}

impl ProgressEvent {
    pub fn from_book(book: &Book) -> Self {
        let progress = book.progress();
        Self {
            book_id: book.id.clone(),
            status: book.status,
            processed_pages: progress.processed_pages,
            total_pages: progress.total_pages,
            questions_count: book.questions_count,
            percentage: progress.percentage,
            at: book.updated_at.clone(),
        }
    }
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Extractor,
}
