// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The directory holding the PDF files that books point at.
//!
//! Book records store paths relative to the library root, with `/`
//! separators, so the root can move without rewriting the database.

use std::path::{Component, Path, PathBuf};

use bookmill_core::{BookmillError, Classification};
use walkdir::WalkDir;

/// Leading bytes of every PDF file.
pub const PDF_MAGIC: &[u8] = b"%PDF-";

/// Display name used when sanitizing leaves nothing behind.
pub const FALLBACK_NAME: &str = "book.pdf";

/// A PDF found on disk during a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredFile {
    /// File name, used as the display name.
    pub name: String,
    /// Root-relative path with `/` separators.
    pub file_path: String,
}

#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
}

impl Library {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute location of a stored book file.
    ///
    /// Paths that would escape the root are rejected.
    pub fn resolve(&self, file_path: &str) -> Result<PathBuf, BookmillError> {
        let relative = Path::new(file_path);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if file_path.is_empty() || escapes {
            return Err(BookmillError::InvalidInput(format!(
                "file path `{file_path}` is outside the library"
            )));
        }
        Ok(self.root.join(relative))
    }

    /// Every `.pdf` file under the root, in a stable order.
    ///
    /// A missing root is treated as an empty library. Unreadable entries are
    /// skipped.
    pub fn discover(&self) -> Result<Vec<DiscoveredFile>, BookmillError> {
        if !self.root.exists() {
            return Ok(Vec::new());
        }

        let mut found = Vec::new();
        for entry in WalkDir::new(&self.root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter()
            .filter_map(Result::ok)
        {
            if !entry.file_type().is_file() || !is_pdf(entry.path()) {
                continue;
            }
            let Ok(relative) = entry.path().strip_prefix(&self.root) else {
                continue;
            };
            let file_path = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            found.push(DiscoveredFile {
                name: entry.file_name().to_string_lossy().into_owned(),
                file_path,
            });
        }
        Ok(found)
    }

    /// Writes uploaded bytes under a fresh `<uuid>.<ext>` name and returns
    /// the root-relative path.
    pub async fn store(&self, extension: &str, bytes: &[u8]) -> Result<String, BookmillError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let file_path = format!("{}.{extension}", uuid::Uuid::new_v4());
        tokio::fs::write(self.root.join(&file_path), bytes).await?;
        Ok(file_path)
    }

    /// Deletes a stored file, ignoring files that are already gone.
    pub async fn remove(&self, file_path: &str) -> Result<(), BookmillError> {
        match tokio::fs::remove_file(self.resolve(file_path)?).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("pdf"))
}

/// Strips non-ASCII and control characters from an uploaded file name.
pub fn sanitize_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let cleaned: String = base
        .chars()
        .filter(|c| c.is_ascii() && !c.is_ascii_control())
        .collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        FALLBACK_NAME.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Lowercased extension of a sanitized name, `pdf` when there is none.
pub fn storage_extension(name: &str) -> String {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty() && e.chars().all(|c| c.is_ascii_alphanumeric()))
        .map(str::to_ascii_lowercase)
        .unwrap_or_else(|| "pdf".to_string())
}

/// Checks an upload before anything is written.
pub fn validate_upload(
    bytes: &[u8],
    classification: &Classification,
    max_bytes: usize,
) -> Result<(), BookmillError> {
    if bytes.is_empty() {
        return Err(BookmillError::InvalidInput("uploaded file is empty".into()));
    }
    if bytes.len() > max_bytes {
        return Err(BookmillError::InvalidInput(format!(
            "uploaded file is {} bytes, the limit is {max_bytes}",
            bytes.len()
        )));
    }
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(BookmillError::InvalidInput(
            "uploaded file is not a PDF".into(),
        ));
    }
    if let Some(grade) = classification.grade {
        if !(1..=12).contains(&grade) {
            return Err(BookmillError::InvalidInput(format!(
                "grade must be between 1 and 12, got {grade}"
            )));
        }
    }
    if let Some(semester) = classification.semester {
        if !(1..=2).contains(&semester) {
            return Err(BookmillError::InvalidInput(format!(
                "semester must be 1 or 2, got {semester}"
            )));
        }
    }
    Ok(())
}
