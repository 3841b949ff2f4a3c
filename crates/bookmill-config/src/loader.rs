// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./bookmill.toml` > `~/.config/bookmill/bookmill.toml` > `/etc/bookmill/bookmill.toml`
//! with environment variable overrides via `BOOKMILL_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::BookmillConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/bookmill/bookmill.toml";

/// Config file in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "bookmill.toml";

/// Top-level sections, used to turn `BOOKMILL_<SECTION>_<KEY>` into `<section>.<key>`.
const SECTIONS: &[&str] = &[
    "server",
    "storage",
    "library",
    "extraction",
    "processing",
    "export",
];

/// The user config file under the XDG config dir, if one can be determined.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bookmill/bookmill.toml"))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/bookmill/bookmill.toml` (system-wide)
/// 3. `~/.config/bookmill/bookmill.toml` (user XDG config)
/// 4. `./bookmill.toml` (local directory)
/// 5. `BOOKMILL_*` environment variables
pub fn load_config() -> Result<BookmillConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
///
/// Used for testing and explicit configuration.
pub fn load_config_from_str(toml_content: &str) -> Result<BookmillConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BookmillConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
///
/// The XDG hierarchy is skipped entirely. Unlike the hierarchy files, a
/// missing explicit file is an error.
pub fn load_config_from_path(path: &Path) -> Result<BookmillConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(BookmillConfig::default()))
        .merge(Toml::file_exact(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
///
/// Returns the Figment before extraction so callers can inspect metadata.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(BookmillConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(env_provider())
}

/// Map a prefix-stripped env var name to its dotted config key.
///
/// Only the first underscore after a known section name becomes a dot, so
/// `extraction_api_key` maps to `extraction.api_key`, not `extraction.api.key`.
pub fn env_key_to_path(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section) {
            if let Some(field) = rest.strip_prefix('_') {
                return format!("{section}.{field}");
            }
        }
    }
    key
}

/// Environment variable provider using explicit section mapping.
///
/// `Env::split("_")` cannot be used: key names themselves contain underscores.
fn env_provider() -> Env {
    Env::prefixed("BOOKMILL_").map(|key| env_key_to_path(key.as_str()).into())
}
