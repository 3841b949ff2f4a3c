// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping of service errors to HTTP responses.

use axum::{
    Json,
    extract::multipart::MultipartError,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use bookmill_core::{BookStatus, BookmillError};
use serde::Serialize;

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    /// The book's current status, for rejected transitions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<BookStatus>,
}

/// An error ready to be sent to the client.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            body: ErrorResponse {
                error: message.into(),
                status: None,
            },
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "missing or invalid bearer token")
    }

    /// Keeps the status axum picked, which is 413 for an oversized body.
    pub fn from_multipart(err: MultipartError) -> Self {
        Self::new(err.status(), err.body_text())
    }
}

impl From<BookmillError> for ApiError {
    fn from(err: BookmillError) -> Self {
        let status = match &err {
            BookmillError::NotFound { .. } => StatusCode::NOT_FOUND,
            BookmillError::InvalidTransition { .. } | BookmillError::Conflict { .. } => {
                StatusCode::CONFLICT
            }
            BookmillError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            BookmillError::Dependency { .. } => StatusCode::BAD_GATEWAY,
            BookmillError::Storage { .. }
            | BookmillError::Config(_)
            | BookmillError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!(error = %err, status = status.as_u16(), "request failed");
        }
        Self {
            status,
            body: ErrorResponse {
                error: err.to_string(),
                status: err.current_status(),
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}
