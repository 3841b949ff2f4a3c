// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP gateway for Bookmill.
//!
//! Exposes the [`BookService`](bookmill_processing::BookService) operations as
//! a JSON API under `/v1`, a server-sent event stream of progress per book,
//! and an unauthenticated `/health` endpoint.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod server;
pub mod sse;

pub use auth::AuthConfig;
pub use error::ApiError;
pub use server::{GatewayState, HealthState, ServerConfig, build_router, start_server};
