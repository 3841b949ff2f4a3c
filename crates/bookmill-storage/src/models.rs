// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain model types for storage entities.
//!
//! The canonical types live in `bookmill-core::types` so they can cross the
//! adapter trait boundary. They are re-exported here for convenience.

pub use bookmill_core::types::{Book, BookId, BookStats, BookStatus, Question};
