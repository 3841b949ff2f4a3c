// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Metadata extraction adapter trait.

use async_trait::async_trait;

use crate::error::BookmillError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{Book, ExtractedMetadata};

/// Determines a book's page count and, optionally, its classification.
///
/// Called synchronously by `start` when the book has no page count yet. A
/// failure aborts the start; the caller persists a successful result.
#[async_trait]
pub trait MetadataExtractor: PluginAdapter {
    /// Extracts metadata from the book's stored file.
    ///
    /// Implementations must return a positive `total_pages` or an error.
    async fn extract(&self, book: &Book) -> Result<ExtractedMetadata, BookmillError>;
}
