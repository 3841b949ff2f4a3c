// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Adapter trait definitions.
//!
//! All adapters extend the [`PluginAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod extractor;
pub mod storage;

pub use adapter::PluginAdapter;
pub use extractor::MetadataExtractor;
pub use storage::StorageAdapter;
