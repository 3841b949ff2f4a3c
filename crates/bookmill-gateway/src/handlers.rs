// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway REST API.

use axum::{
    Json,
    extract::{Multipart, Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use bookmill_core::{Book, BookId, BookStats, Classification, HealthStatus, Progress, Question};
use bookmill_processing::UploadRequest;
use serde::Serialize;

use crate::error::ApiError;
use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, `degraded` or `unhealthy`.
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize)]
pub struct ScanResponse {
    pub message: String,
    pub added: usize,
}

#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub books: Vec<Book>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book: Book,
}

/// Response body for uploads and processing commands.
#[derive(Debug, Serialize)]
pub struct BookActionResponse {
    pub message: String,
    pub book: Book,
}

#[derive(Debug, Serialize)]
pub struct ProgressResponse {
    pub message: String,
    pub book: Book,
    pub progress: Progress,
}

#[derive(Debug, Serialize)]
pub struct ExportResponse {
    pub message: String,
    pub filename: String,
    pub path: String,
    pub questions: Vec<Question>,
}

/// GET /health
///
/// Reports storage health. Not behind auth so supervisors can poll it.
pub async fn get_health(
    State(state): State<GatewayState>,
) -> (StatusCode, Json<HealthResponse>) {
    let (code, status) = match state.service.storage().health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "ok"),
        Ok(HealthStatus::Degraded(reason)) => {
            tracing::warn!(%reason, "storage degraded");
            (StatusCode::OK, "degraded")
        }
        Ok(HealthStatus::Unhealthy(reason)) => {
            tracing::error!(%reason, "storage unhealthy");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
        Err(e) => {
            tracing::error!(error = %e, "storage health check failed");
            (StatusCode::SERVICE_UNAVAILABLE, "unhealthy")
        }
    };
    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_secs: state.health.start_time.elapsed().as_secs(),
        }),
    )
}

/// POST /v1/scan
pub async fn post_scan(State(state): State<GatewayState>) -> Result<Json<ScanResponse>, ApiError> {
    let added = state.service.scan().await?;
    Ok(Json(ScanResponse {
        message: format!("Scan complete. Found and added {added} new PDF files."),
        added,
    }))
}

/// GET /v1/books
pub async fn list_books(
    State(state): State<GatewayState>,
) -> Result<Json<BookListResponse>, ApiError> {
    let books = state.service.list_books().await?;
    Ok(Json(BookListResponse { books }))
}

/// GET /v1/books/{id}
pub async fn get_book(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<BookResponse>, ApiError> {
    let book = state.service.get_book(&BookId::from(id)).await?;
    Ok(Json(BookResponse { book }))
}

/// POST /v1/books
///
/// Multipart form with a `file` part and optional `grade`, `subject` and
/// `semester` text parts.
pub async fn upload_book(
    State(state): State<GatewayState>,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<BookActionResponse>), ApiError> {
    let mut file: Option<(String, Vec<u8>)> = None;
    let mut classification = Classification::default();

    while let Some(field) = multipart.next_field().await.map_err(ApiError::from_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(ApiError::from_multipart)?;
                file = Some((file_name, bytes.to_vec()));
            }
            "grade" | "semester" | "subject" => {
                let text = field.text().await.map_err(ApiError::from_multipart)?;
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                match name.as_str() {
                    "grade" => classification.grade = Some(parse_number(&name, text)?),
                    "semester" => classification.semester = Some(parse_number(&name, text)?),
                    _ => classification.subject = Some(text.to_string()),
                }
            }
            other => {
                tracing::debug!(field = other, "ignoring unknown upload field");
            }
        }
    }

    let (file_name, bytes) =
        file.ok_or_else(|| ApiError::bad_request("multipart field `file` is required"))?;
    let book = state
        .service
        .upload_book(UploadRequest {
            file_name,
            bytes,
            classification,
        })
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BookActionResponse {
            message: "Book uploaded successfully".to_string(),
            book,
        }),
    ))
}

fn parse_number(field: &str, text: &str) -> Result<u8, ApiError> {
    text.parse()
        .map_err(|_| ApiError::bad_request(format!("`{field}` must be a number, got `{text}`")))
}

/// POST /v1/books/{id}/start
pub async fn start_book(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<BookActionResponse>, ApiError> {
    let book = state.service.start_processing(&BookId::from(id)).await?;
    Ok(action("Book processing started successfully", book))
}

/// POST /v1/books/{id}/pause
pub async fn pause_book(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<BookActionResponse>, ApiError> {
    let book = state.service.pause_processing(&BookId::from(id)).await?;
    Ok(action("Book processing paused successfully", book))
}

/// POST /v1/books/{id}/cancel
pub async fn cancel_book(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<BookActionResponse>, ApiError> {
    let book = state.service.cancel_processing(&BookId::from(id)).await?;
    Ok(action("Book processing canceled successfully", book))
}

fn action(message: &str, book: Book) -> Json<BookActionResponse> {
    Json(BookActionResponse {
        message: message.to_string(),
        book,
    })
}

/// GET|POST /v1/books/{id}/progress
///
/// Each call advances a processing book by one simulated step.
pub async fn check_progress(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<ProgressResponse>, ApiError> {
    let id = BookId::from(id);
    let before = state.service.get_book(&id).await?;
    let report = state.service.check_progress(&id).await?;
    let message = if report.book.revision == before.revision {
        "Book progress checked"
    } else {
        "Book progress updated"
    };
    Ok(Json(ProgressResponse {
        message: message.to_string(),
        book: report.book,
        progress: report.progress,
    }))
}

/// GET /v1/books/{id}/export
///
/// Writes the CSV into the export directory and returns the questions.
pub async fn export_questions(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Json<ExportResponse>, ApiError> {
    let export = state.service.export_questions(&BookId::from(id)).await?;
    Ok(Json(ExportResponse {
        message: "Questions exported successfully".to_string(),
        filename: export.file_name,
        path: export.path.display().to_string(),
        questions: export.questions,
    }))
}

/// GET /v1/books/{id}/export.csv
pub async fn download_csv(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let csv = state.service.render_csv(&BookId::from(id)).await?;
    let disposition = format!(
        "attachment; filename=\"{}\"",
        csv.file_name.replace(['"', '\\'], "_")
    );
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        csv.body,
    )
        .into_response())
}

/// GET /v1/stats
pub async fn get_stats(State(state): State<GatewayState>) -> Result<Json<BookStats>, ApiError> {
    Ok(Json(state.service.stats().await?))
}
