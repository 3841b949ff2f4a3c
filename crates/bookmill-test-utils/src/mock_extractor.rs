// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock metadata extractor for deterministic testing.
//!
//! Results are popped from a FIFO queue. When the queue is empty the
//! default page count is returned with an empty classification.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use bookmill_core::{
    AdapterType, Book, BookmillError, Classification, ExtractedMetadata, HealthStatus,
    MetadataExtractor, PluginAdapter,
};

pub struct MockExtractor {
    default_pages: u32,
    results: Mutex<VecDeque<Result<ExtractedMetadata, String>>>,
    calls: AtomicUsize,
}

impl MockExtractor {
    /// Reports `total_pages` for every book.
    pub fn new(total_pages: u32) -> Self {
        Self {
            default_pages: total_pages,
            results: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful extraction.
    pub async fn push_metadata(&self, total_pages: u32, classification: Classification) {
        self.results.lock().await.push_back(Ok(ExtractedMetadata {
            total_pages,
            classification,
        }));
    }

    /// Queue a dependency failure.
    pub async fn push_failure(&self, message: &str) {
        self.results.lock().await.push_back(Err(message.to_string()));
    }

    /// How many times `extract` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Default for MockExtractor {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
impl PluginAdapter for MockExtractor {
    fn name(&self) -> &str {
        "mock-extractor"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Extractor
    }

    async fn health_check(&self) -> Result<HealthStatus, BookmillError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BookmillError> {
        Ok(())
    }
}

#[async_trait]
impl MetadataExtractor for MockExtractor {
    async fn extract(&self, _book: &Book) -> Result<ExtractedMetadata, BookmillError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.results.lock().await.pop_front() {
            Some(Ok(meta)) => Ok(meta),
            Some(Err(message)) => Err(BookmillError::dependency(message)),
            None => Ok(ExtractedMetadata {
                total_pages: self.default_pages,
                classification: Classification::default(),
            }),
        }
    }
}
