// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Book lifecycle for Bookmill.
//!
//! The status state machine, the simulated progress engine, PDF metadata
//! extraction with optional LLM classification, the on-disk book library,
//! CSV export, and the [`BookService`] that ties them to a storage adapter.
//!
//! Processing is simulated: nothing reads the book's pages after the page
//! count is known, and generated questions are placeholders.

pub mod classifier;
pub mod export;
pub mod extractor;
pub mod library;
pub mod service;
pub mod simulator;
pub mod transitions;

#[cfg(any(test, feature = "test-support"))]
pub mod testing;

pub use classifier::LlmClassifier;
pub use export::{ExportResult, ExportSettings};
pub use extractor::PdfMetadataExtractor;
pub use library::Library;
pub use service::{BookService, CsvExport, ProgressReport, UploadRequest};
pub use simulator::ProgressSimulator;
