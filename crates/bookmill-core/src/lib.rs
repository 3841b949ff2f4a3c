// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for Bookmill.
//!
//! This crate provides the error type, the domain types, and the adapter
//! traits used throughout the workspace. Storage backends and metadata
//! extractors implement the traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::BookmillError;
pub use types::{
    AdapterType, Book, BookId, BookStats, BookStatus, Classification, ExtractedMetadata,
    HealthStatus, ProcessingCommand, Progress, ProgressEvent, Question, now_timestamp,
};

pub use traits::{MetadataExtractor, PluginAdapter, StorageAdapter};
