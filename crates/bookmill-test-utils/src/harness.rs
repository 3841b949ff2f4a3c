// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles a complete book service with a mock extractor,
//! a temp SQLite database, a temp library directory and a seeded progress
//! simulator.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bookmill_config::BookmillConfig;
use bookmill_core::{Book, BookmillError, Classification, StorageAdapter};
use bookmill_processing::testing::sample_pdf;
use bookmill_processing::{BookService, ExportSettings, Library, ProgressSimulator, UploadRequest};
use bookmill_storage::SqliteStorage;

use crate::mock_extractor::MockExtractor;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    total_pages: u32,
    seed: u64,
    max_upload_bytes: Option<usize>,
    bearer_token: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            total_pages: 30,
            seed: 42,
            max_upload_bytes: None,
            bearer_token: None,
        }
    }

    /// Page count the mock extractor reports when nothing is queued.
    pub fn with_total_pages(mut self, total_pages: u32) -> Self {
        self.total_pages = total_pages;
        self
    }

    /// Seed for the progress simulator.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = Some(bytes);
        self
    }

    /// Set the bearer token recorded in the harness config.
    pub fn with_bearer_token(mut self, token: &str) -> Self {
        self.bearer_token = Some(token.to_string());
        self
    }

    /// Build the test harness, creating all required subsystems.
    pub async fn build(self) -> Result<TestHarness, BookmillError> {
        let temp_dir = tempfile::TempDir::new()?;
        let root = temp_dir.path();

        let mut config = BookmillConfig::default();
        config.storage.database_path = root.join("bookmill.db").to_string_lossy().into_owned();
        config.library.books_dir = root.join("books").to_string_lossy().into_owned();
        config.export.output_dir = root.join("exports").to_string_lossy().into_owned();
        config.server.bearer_token = self.bearer_token;
        if let Some(bytes) = self.max_upload_bytes {
            config.server.max_upload_bytes = bytes;
        }

        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        let storage: Arc<dyn StorageAdapter> = Arc::new(storage);

        let extractor = Arc::new(MockExtractor::new(self.total_pages));
        let library = Library::new(&config.library.books_dir);

        let service = BookService::new(
            storage.clone(),
            extractor.clone(),
            library,
            ProgressSimulator::seeded(&config.processing, self.seed),
            ExportSettings::from(&config.export),
            config.server.max_upload_bytes,
        );

        Ok(TestHarness {
            service: Arc::new(service),
            extractor,
            storage,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with a mock extractor and temp storage.
pub struct TestHarness {
    pub service: Arc<BookService>,
    /// The extractor the service calls on first start.
    pub extractor: Arc<MockExtractor>,
    /// SQLite storage adapter (temp DB, cleaned up on drop).
    pub storage: Arc<dyn StorageAdapter>,
    /// Configuration pointing at the temp directory.
    pub config: BookmillConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn books_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.library.books_dir)
    }

    pub fn export_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.export.output_dir)
    }

    /// Writes a generated PDF into the library, outside the service.
    ///
    /// `relative` may contain `/` separators; parent directories are created.
    pub async fn add_pdf(&self, relative: &str, pages: &[&str]) -> Result<PathBuf, BookmillError> {
        let path = self.books_dir().join(Path::new(relative));
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&path, sample_pdf(pages)).await?;
        Ok(path)
    }

    /// Uploads a one-page generated PDF through the service.
    pub async fn upload(&self, name: &str, classification: Classification) -> Result<Book, BookmillError> {
        self.service
            .upload_book(UploadRequest {
                file_name: name.to_string(),
                bytes: sample_pdf(&["page one"]),
                classification,
            })
            .await
    }
}
