// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PDF-backed metadata extraction.

use async_trait::async_trait;
use bookmill_core::{
    AdapterType, Book, BookmillError, Classification, ExtractedMetadata, HealthStatus,
    MetadataExtractor, PluginAdapter,
};
use lopdf::Document;
use tracing::{debug, warn};

use crate::classifier::LlmClassifier;
use crate::library::Library;

/// What a single pass over the PDF yields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PdfSummary {
    pub page_count: u32,
    /// Text of the leading pages, for classification.
    pub sample_text: String,
}

/// Parses a PDF and reads the text of its first `sample_pages` pages.
///
/// Pages whose text cannot be extracted contribute nothing to the sample.
pub fn summarize_pdf(bytes: &[u8], sample_pages: u32) -> Result<PdfSummary, BookmillError> {
    let doc = Document::load_mem(bytes).map_err(|e| BookmillError::Dependency {
        message: format!("could not parse PDF: {e}"),
        source: Some(Box::new(e)),
    })?;

    let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    let page_count = u32::try_from(pages.len())
        .map_err(|_| BookmillError::dependency("PDF has too many pages"))?;

    let sample_text = pages
        .iter()
        .take(sample_pages as usize)
        .filter_map(|&page| doc.extract_text(&[page]).ok())
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
        .collect::<Vec<_>>()
        .join("\n");

    Ok(PdfSummary {
        page_count,
        sample_text,
    })
}

/// Reads the page count from the book's PDF and, when a classifier is
/// configured, asks it for grade, subject and semester.
#[derive(Debug, Clone)]
pub struct PdfMetadataExtractor {
    library: Library,
    classifier: Option<LlmClassifier>,
    sample_pages: u32,
}

impl PdfMetadataExtractor {
    pub fn new(library: Library, classifier: Option<LlmClassifier>, sample_pages: u32) -> Self {
        Self {
            library,
            classifier,
            sample_pages: sample_pages.max(1),
        }
    }

    async fn classify(&self, book: &Book, sample: &str) -> Classification {
        let Some(classifier) = &self.classifier else {
            return Classification::default();
        };
        if sample.is_empty() {
            debug!(book_id = %book.id, "no extractable text, skipping classification");
            return Classification::default();
        }
        match classifier.classify(sample).await {
            Ok(classification) => classification,
            Err(e) => {
                warn!(book_id = %book.id, error = %e, "classification failed, continuing without it");
                Classification::default()
            }
        }
    }
}

#[async_trait]
impl PluginAdapter for PdfMetadataExtractor {
    fn name(&self) -> &str {
        "pdf"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Extractor
    }

    async fn health_check(&self) -> Result<HealthStatus, BookmillError> {
        if self.library.root().is_dir() {
            Ok(HealthStatus::Healthy)
        } else {
            Ok(HealthStatus::Degraded(format!(
                "library directory {} does not exist",
                self.library.root().display()
            )))
        }
    }

    async fn shutdown(&self) -> Result<(), BookmillError> {
        Ok(())
    }
}

#[async_trait]
impl MetadataExtractor for PdfMetadataExtractor {
    async fn extract(&self, book: &Book) -> Result<ExtractedMetadata, BookmillError> {
        let path = self.library.resolve(&book.file_path)?;
        let bytes = tokio::fs::read(&path).await.map_err(|e| BookmillError::Dependency {
            message: format!("could not read {}: {e}", path.display()),
            source: Some(Box::new(e)),
        })?;

        let sample_pages = self.sample_pages;
        let summary = tokio::task::spawn_blocking(move || summarize_pdf(&bytes, sample_pages))
            .await
            .map_err(|e| BookmillError::Internal(format!("PDF parsing task failed: {e}")))??;

        if summary.page_count == 0 {
            return Err(BookmillError::dependency(format!(
                "{} has no pages",
                book.file_path
            )));
        }
        debug!(book_id = %book.id, pages = summary.page_count, "page count extracted");

        let classification = self.classify(book, &summary.sample_text).await;
        Ok(ExtractedMetadata {
            total_pages: summary.page_count,
            classification,
        })
    }
}
