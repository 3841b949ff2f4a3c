// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for Bookmill.

use thiserror::Error;

use crate::types::{BookStatus, ProcessingCommand};

/// The primary error type used across all Bookmill adapters and operations.
#[derive(Debug, Error)]
pub enum BookmillError {
    /// The referenced book does not exist.
    #[error("book not found: {id}")]
    NotFound { id: String },

    /// A command was issued while the book's status does not allow it.
    #[error("cannot {command} book {book_id} while it is {status}")]
    InvalidTransition {
        book_id: String,
        command: ProcessingCommand,
        status: BookStatus,
    },

    /// The book was written by someone else between our read and our write.
    #[error("book {id} was modified concurrently, reload it and try again")]
    Conflict { id: String },

    /// Caller-supplied data was rejected (bad upload, out-of-range metadata).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An external collaborator failed (PDF parsing, classification endpoint).
    #[error("dependency failure: {message}")]
    Dependency {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Storage backend errors (database connection, query failure, file IO).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl BookmillError {
    /// Shorthand for a dependency failure without an underlying source.
    pub fn dependency(message: impl Into<String>) -> Self {
        Self::Dependency {
            message: message.into(),
            source: None,
        }
    }

    /// Wraps any error as a storage failure.
    pub fn storage(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Storage {
            source: source.into(),
        }
    }

    /// Whether re-issuing the same command could succeed without other changes.
    ///
    /// Only a lost concurrent-write race qualifies. Nothing retries automatically;
    /// this only shapes the message shown to the user.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict { .. })
    }

    /// The book's status at the time of the failure, for invalid transitions.
    pub fn current_status(&self) -> Option<BookStatus> {
        match self {
            Self::InvalidTransition { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<std::io::Error> for BookmillError {
    fn from(err: std::io::Error) -> Self {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
