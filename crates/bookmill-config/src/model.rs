// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Bookmill configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BookmillConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Where the PDF files live.
    #[serde(default)]
    pub library: LibraryConfig,

    /// Metadata extraction and classification settings.
    #[serde(default)]
    pub extraction: ExtractionConfig,

    /// Progress simulation bounds.
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// CSV export settings.
    #[serde(default)]
    pub export: ExportConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind. 0 picks an ephemeral port.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Bearer token required on `/v1` routes. `None` leaves them open.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Largest accepted upload body in bytes.
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            bearer_token: None,
            max_upload_bytes: default_max_upload_bytes(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_upload_bytes() -> usize {
    50 * 1024 * 1024
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn data_path(file: &str) -> String {
    dirs::data_dir()
        .map(|p| p.join("bookmill").join(file))
        .unwrap_or_else(|| PathBuf::from(file))
        .to_string_lossy()
        .into_owned()
}

fn default_database_path() -> String {
    data_path("bookmill.db")
}

fn default_wal_mode() -> bool {
    true
}

/// Book library configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LibraryConfig {
    /// Directory scanned for PDFs and where uploads are stored.
    #[serde(default = "default_books_dir")]
    pub books_dir: String,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            books_dir: default_books_dir(),
        }
    }
}

fn default_books_dir() -> String {
    data_path("books")
}

/// Metadata extraction configuration.
///
/// Page counts always come from the PDF itself. Classification (grade,
/// subject, semester) is only attempted when `api_key` is set.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// API key for the OpenAI-compatible chat completions endpoint.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the endpoint, without the `/chat/completions` suffix.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model used for classification.
    #[serde(default = "default_model")]
    pub model: String,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Maximum characters of book text sent in the prompt.
    #[serde(default = "default_max_prompt_chars")]
    pub max_prompt_chars: usize,

    /// How many leading pages are read for the prompt.
    #[serde(default = "default_sample_pages")]
    pub sample_pages: u32,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_prompt_chars: default_max_prompt_chars(),
            sample_pages: default_sample_pages(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_prompt_chars() -> usize {
    1000
}

fn default_sample_pages() -> u32 {
    3
}

/// Upper bound for `processing.max_page_step`.
pub const MAX_PAGE_STEP: u32 = 100;

/// Upper bound for `processing.question_factor`.
pub const MAX_QUESTION_FACTOR: u32 = 100;

/// Bounds of the simulated processing.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Largest number of pages one progress check may advance.
    #[serde(default = "default_max_page_step")]
    pub max_page_step: u32,

    /// Questions per page upper factor: a step of `p` pages yields between
    /// `p` and `(factor + 1) * p - 1` questions.
    #[serde(default = "default_question_factor")]
    pub question_factor: u32,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_page_step: default_max_page_step(),
            question_factor: default_question_factor(),
        }
    }
}

fn default_max_page_step() -> u32 {
    5
}

fn default_question_factor() -> u32 {
    3
}

/// CSV export configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExportConfig {
    /// Directory the CSV files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// File name template. `{stem}` is replaced with the book name up to its
    /// first dot.
    #[serde(default = "default_file_name_format")]
    pub file_name_format: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            file_name_format: default_file_name_format(),
        }
    }
}

fn default_output_dir() -> String {
    data_path("exports")
}

fn default_file_name_format() -> String {
    "{stem}_questions.csv".to_string()
}
