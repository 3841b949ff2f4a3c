// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests that run the `bookmill` binary against a temp config.
//!
//! Each test gets its own database, library and export directory.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use bookmill_test_utils::sample_pdf;
use serde_json::Value;
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        let config = root.join("bookmill.toml");
        let toml = format!(
            r#"
[storage]
database_path = "{db}"

[library]
books_dir = "{books}"

[export]
output_dir = "{exports}"
"#,
            db = toml_path(&root.join("bookmill.db")),
            books = toml_path(&root.join("books")),
            exports = toml_path(&root.join("exports")),
        );
        std::fs::write(&config, toml).unwrap();
        Self { dir, config }
    }

    fn books_dir(&self) -> PathBuf {
        self.dir.path().join("books")
    }

    fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_bookmill"))
            .arg("--config")
            .arg(&self.config)
            .args(args)
            .env("RUST_LOG", "off")
            .output()
            .unwrap()
    }

    fn run_ok(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            output.status.success(),
            "bookmill {args:?} failed: {}",
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8(output.stdout).unwrap()
    }

    fn run_json(&self, args: &[&str]) -> Value {
        serde_json::from_str(&self.run_ok(args)).unwrap()
    }
}

fn toml_path(path: &Path) -> String {
    path.display().to_string().replace('\\', "/")
}

#[test]
fn scan_start_progress_export_round() {
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.books_dir()).unwrap();
    std::fs::write(
        ws.books_dir().join("fractions.pdf"),
        sample_pdf(&["Fractions", "Decimals", "Percentages"]),
    )
    .unwrap();

    let scanned = ws.run_ok(&["scan"]);
    assert!(scanned.contains("Found and added 1 new PDF files"));

    let listed = ws.run_ok(&["list"]);
    let line = listed.lines().next().unwrap();
    assert!(line.contains("idle"));
    assert!(line.ends_with("fractions.pdf"));
    let id = line.split_whitespace().next().unwrap().to_string();

    let started = ws.run_json(&["start", &id]);
    assert_eq!(started["status"], "processing");
    assert_eq!(started["total_pages"], 3);

    let mut last_questions = 0;
    for _ in 0..3 {
        let report = ws.run_json(&["progress", &id]);
        let questions = report["book"]["questions_count"].as_u64().unwrap();
        assert!(questions > last_questions);
        last_questions = questions;
        if report["book"]["status"] == "completed" {
            assert_eq!(report["progress"]["percentage"], 100);
            break;
        }
    }
    assert_eq!(ws.run_json(&["show", &id])["status"], "completed");

    let exported = ws.run_ok(&["export", &id]);
    assert!(exported.contains("fractions_questions.csv"));
    assert!(ws.dir.path().join("exports/fractions_questions.csv").exists());

    let stats = ws.run_json(&["stats"]);
    assert_eq!(stats["total_books"], 1);
    assert_eq!(stats["completed_books"], 1);
    assert_eq!(stats["total_questions"], last_questions);
}

#[test]
fn rejected_command_exits_with_message() {
    let ws = Workspace::new();
    std::fs::create_dir_all(ws.books_dir()).unwrap();
    std::fs::write(ws.books_dir().join("a.pdf"), sample_pdf(&["a"])).unwrap();
    ws.run_ok(&["scan"]);
    let id = ws
        .run_ok(&["list"])
        .split_whitespace()
        .next()
        .unwrap()
        .to_string();

    let output = ws.run(&["pause", &id]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("cannot pause"), "stderr: {stderr}");

    let output = ws.run(&["show", "no-such-book"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("book not found"));
}

#[test]
fn config_prints_effective_toml() {
    let ws = Workspace::new();
    let printed = ws.run_ok(&["config"]);
    assert!(printed.contains("[server]"));
    assert!(printed.contains(&toml_path(&ws.dir.path().join("bookmill.db"))));
    assert!(printed.contains("{stem}_questions.csv"));
}

#[test]
fn invalid_config_exits_with_diagnostic() {
    let ws = Workspace::new();
    std::fs::write(&ws.config, "[server]\nprot = 8080\n").unwrap();

    let output = ws.run(&["list"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("prot"), "stderr: {stderr}");
}

#[test]
fn missing_config_file_is_an_error() {
    let ws = Workspace::new();
    std::fs::remove_file(&ws.config).unwrap();
    assert_eq!(ws.run(&["list"]).status.code(), Some(1));
}

#[test]
fn empty_library_lists_hint() {
    let ws = Workspace::new();
    let listed = ws.run_ok(&["list"]);
    assert!(listed.contains("no books tracked"));
}
