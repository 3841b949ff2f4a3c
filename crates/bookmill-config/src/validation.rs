// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks the constraints serde attributes cannot express. All failures are
//! collected; validation does not stop at the first one.

use crate::diagnostic::ConfigError;
use crate::model::{BookmillConfig, MAX_PAGE_STEP, MAX_QUESTION_FACTOR};

/// Validate a deserialized configuration for semantic correctness.
pub fn validate_config(config: &BookmillConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_valid_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_valid_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-' || c == ':');
        if !is_valid_ip && !is_valid_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.max_upload_bytes == 0 {
        fail("server.max_upload_bytes must be greater than 0".to_string());
    }

    if let Some(token) = &config.server.bearer_token {
        if token.trim().is_empty() {
            fail("server.bearer_token must not be blank when set".to_string());
        }
    }

    for (key, value) in [
        ("storage.database_path", &config.storage.database_path),
        ("library.books_dir", &config.library.books_dir),
        ("export.output_dir", &config.export.output_dir),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    if !(1..=MAX_PAGE_STEP).contains(&config.processing.max_page_step) {
        fail(format!(
            "processing.max_page_step must be between 1 and {MAX_PAGE_STEP}"
        ));
    }
    if !(1..=MAX_QUESTION_FACTOR).contains(&config.processing.question_factor) {
        fail(format!(
            "processing.question_factor must be between 1 and {MAX_QUESTION_FACTOR}"
        ));
    }

    let format = &config.export.file_name_format;
    if !format.contains("{stem}") {
        fail(format!(
            "export.file_name_format `{format}` must contain the `{{stem}}` placeholder"
        ));
    }
    if !format.ends_with(".csv") {
        fail(format!("export.file_name_format `{format}` must end with `.csv`"));
    }
    if format.contains('/') || format.contains('\\') {
        fail(format!(
            "export.file_name_format `{format}` must be a file name, not a path"
        ));
    }

    if config.extraction.timeout_secs < 1 {
        fail("extraction.timeout_secs must be at least 1".to_string());
    }
    if config.extraction.base_url.trim().is_empty() {
        fail("extraction.base_url must not be empty".to_string());
    }
    if config.extraction.sample_pages < 1 {
        fail("extraction.sample_pages must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
