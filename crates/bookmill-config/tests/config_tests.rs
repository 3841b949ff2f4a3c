// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the Bookmill configuration system.

use std::io::Write;

use bookmill_config::diagnostic::ConfigError;
use bookmill_config::model::BookmillConfig;
use bookmill_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

/// Valid TOML with all known fields deserializes successfully.
#[test]
fn valid_toml_deserializes_into_bookmill_config() {
    let toml = r#"
[server]
host = "0.0.0.0"
port = 9000
bearer_token = "secret"
max_upload_bytes = 1024
log_level = "debug"

[storage]
database_path = "/tmp/test.db"
wal_mode = false

[library]
books_dir = "/srv/books"

[extraction]
api_key = "sk-test"
base_url = "http://localhost:4000/v1"
model = "gpt-4o"
timeout_secs = 5
max_prompt_chars = 200
sample_pages = 1

[processing]
max_page_step = 2
question_factor = 4

[export]
output_dir = "/srv/exports"
file_name_format = "{stem}-qa.csv"
"#;

    let config = load_config_from_str(toml).expect("valid TOML should deserialize");
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 9000);
    assert_eq!(config.server.bearer_token.as_deref(), Some("secret"));
    assert_eq!(config.server.max_upload_bytes, 1024);
    assert_eq!(config.server.log_level, "debug");
    assert_eq!(config.storage.database_path, "/tmp/test.db");
    assert!(!config.storage.wal_mode);
    assert_eq!(config.library.books_dir, "/srv/books");
    assert_eq!(config.extraction.api_key.as_deref(), Some("sk-test"));
    assert_eq!(config.extraction.base_url, "http://localhost:4000/v1");
    assert_eq!(config.extraction.model, "gpt-4o");
    assert_eq!(config.extraction.timeout_secs, 5);
    assert_eq!(config.extraction.max_prompt_chars, 200);
    assert_eq!(config.extraction.sample_pages, 1);
    assert_eq!(config.processing.max_page_step, 2);
    assert_eq!(config.processing.question_factor, 4);
    assert_eq!(config.export.output_dir, "/srv/exports");
    assert_eq!(config.export.file_name_format, "{stem}-qa.csv");
}

/// Missing optional sections use defaults without error.
#[test]
fn missing_optional_sections_use_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.server.host, "127.0.0.1");
    assert_eq!(config.server.port, 8080);
    assert!(config.server.bearer_token.is_none());
    assert_eq!(config.server.max_upload_bytes, 50 * 1024 * 1024);
    assert_eq!(config.server.log_level, "info");
    assert!(config.storage.database_path.ends_with("bookmill.db"));
    assert!(config.storage.wal_mode);
    assert!(config.library.books_dir.ends_with("books"));
    assert!(config.extraction.api_key.is_none());
    assert_eq!(config.extraction.base_url, "https://api.openai.com/v1");
    assert_eq!(config.extraction.model, "gpt-4o-mini");
    assert_eq!(config.extraction.timeout_secs, 60);
    assert_eq!(config.extraction.max_prompt_chars, 1000);
    assert_eq!(config.extraction.sample_pages, 3);
    assert_eq!(config.processing.max_page_step, 5);
    assert_eq!(config.processing.question_factor, 3);
    assert_eq!(config.export.file_name_format, "{stem}_questions.csv");
}

#[test]
fn unknown_field_in_section_produces_error() {
    let toml = r#"
[processing]
max_page_stpe = 3
"#;

    let err = load_config_from_str(toml).expect_err("should reject unknown field");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("max_page_stpe"),
        "error should mention unknown field or the bad key, got: {err_str}"
    );
}

#[test]
fn deny_unknown_fields_at_top_level() {
    let toml = r#"
[logging]
level = "debug"
"#;

    let err = load_config_from_str(toml).expect_err("unknown top-level section should be rejected");
    let err_str = err.to_string();
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "error should mention unknown field, got: {err_str}"
    );
}

/// Env-style dotted overrides win over the TOML file.
#[test]
fn dotted_override_beats_toml() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let toml_content = r#"
[extraction]
api_key = "from-toml"
"#;

    let config: BookmillConfig = Figment::new()
        .merge(Serialized::defaults(BookmillConfig::default()))
        .merge(Toml::string(toml_content))
        .merge(("extraction.api_key", "from-env"))
        .extract()
        .expect("should merge override");

    assert_eq!(config.extraction.api_key.as_deref(), Some("from-env"));
}

#[test]
fn missing_hierarchy_files_are_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: BookmillConfig = Figment::new()
        .merge(Serialized::defaults(BookmillConfig::default()))
        .merge(Toml::file("/nonexistent/path/bookmill.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.server.port, 8080);
}

#[test]
fn unknown_key_diagnostic_carries_suggestion_and_valid_keys() {
    let toml = r#"
[server]
prot = 9000
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let found = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, .. } if {
            key == "prot"
                && suggestion.as_deref() == Some("port")
                && valid_keys.contains("max_upload_bytes")
        })
    });
    assert!(found, "expected UnknownKey for `prot`, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[processing]
max_page_step = "many"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("max_page_step"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_runs_after_successful_parse() {
    let toml = r#"
[export]
file_name_format = "questions.csv"
"#;

    let errors = load_and_validate_str(toml).expect_err("format without {stem} should fail");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::Validation { message } if message.contains("file_name_format"))
    }));
}

#[test]
fn explicit_path_is_loaded_and_validated() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[server]\nport = 0\n\n[library]\nbooks_dir = \"/tmp/b\"").expect("write");

    let config = load_and_validate_path(file.path()).expect("explicit file should load");
    assert_eq!(config.server.port, 0);
    assert_eq!(config.library.books_dir, "/tmp/b");
}

#[test]
fn explicit_path_errors_point_at_the_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[library]\nbokos_dir = \"/tmp/b\"").expect("write");

    let errors = load_and_validate_path(file.path()).expect_err("typo should be rejected");
    assert!(errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, .. }
            if key == "bokos_dir" && suggestion.as_deref() == Some("books_dir"))
    }));
}

#[test]
fn config_error_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "prot".to_string(),
        suggestion: Some("port".to_string()),
        valid_keys: "host, port".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `port`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render without error");
    assert!(buf.contains("prot"));
}

#[test]
fn config_round_trips_through_toml() {
    let config = BookmillConfig::default();
    let rendered = bookmill_config::to_toml(&config).expect("config should serialize");
    let parsed = load_config_from_str(&rendered).expect("rendered config should parse");
    assert_eq!(parsed.server.port, config.server.port);
    assert_eq!(parsed.export.file_name_format, config.export.file_name_format);
}

#[test]
fn huge_question_factor_is_rejected_at_load() {
    let toml = r#"
[processing]
question_factor = 1000000000
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject oversized factor");
    assert!(
        errors.iter().any(|e| matches!(
            e,
            ConfigError::Validation { message } if message.contains("question_factor")
        )),
        "got: {errors:?}"
    );
}
