// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Bookmill integration tests.
//!
//! Provides a mock metadata extractor and a harness that wires a
//! [`BookService`](bookmill_processing::BookService) over a temporary SQLite
//! database and library, so tests run without real PDFs or network access.
//!
//! # Components
//!
//! - [`MockExtractor`] - Extractor with pre-configured results
//! - [`TestHarness`] - Complete service stack in a temp directory

pub mod harness;
pub mod mock_extractor;

pub use bookmill_processing::testing::sample_pdf;
pub use harness::{TestHarness, TestHarnessBuilder};
pub use mock_extractor::MockExtractor;
