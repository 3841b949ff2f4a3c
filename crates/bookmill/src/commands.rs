// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! One-shot book commands run against the configured database and library.

use std::sync::Arc;

use bookmill_config::BookmillConfig;
use bookmill_core::{Book, BookId, BookmillError, StorageAdapter};
use bookmill_processing::{BookService, LlmClassifier, Library, PdfMetadataExtractor};
use bookmill_storage::SqliteStorage;
use serde::Serialize;

use crate::Commands;
use crate::serve::init_tracing;

/// Opens storage and builds the book service from configuration.
pub(crate) async fn open_service(
    config: &BookmillConfig,
) -> Result<(Arc<BookService>, Arc<SqliteStorage>), BookmillError> {
    let storage = Arc::new(SqliteStorage::new(config.storage.clone()));
    storage.initialize().await?;

    let classifier = LlmClassifier::from_config(&config.extraction)?;
    let extractor = PdfMetadataExtractor::new(
        Library::new(&config.library.books_dir),
        classifier,
        config.extraction.sample_pages,
    );

    let service = BookService::from_config(config, storage.clone(), Arc::new(extractor));
    Ok((Arc::new(service), storage))
}

pub(crate) fn print_config(config: &BookmillConfig) -> Result<(), BookmillError> {
    let rendered =
        bookmill_config::to_toml(config).map_err(|e| BookmillError::Config(e.to_string()))?;
    print!("{rendered}");
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), BookmillError> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| BookmillError::Internal(format!("failed to render output: {e}")))?;
    println!("{json}");
    Ok(())
}

/// One line per book: id, status, pages, questions, name.
pub(crate) fn format_book_line(book: &Book) -> String {
    let progress = book.progress();
    let pages = match book.total_pages {
        Some(total) => format!("{}/{total}", book.processed_pages),
        None => format!("{}/?", book.processed_pages),
    };
    format!(
        "{}  {:<10} {:>9} {:>4}%  {:>5} questions  {}",
        book.id, book.status, pages, progress.percentage, book.questions_count, book.name
    )
}

/// Runs every subcommand except `serve` and `config`.
pub(crate) async fn run(config: BookmillConfig, command: Commands) -> Result<(), BookmillError> {
    init_tracing("bookmill=warn,warn");

    let (service, storage) = open_service(&config).await?;
    let result = dispatch(&service, command).await;
    storage.close().await?;
    result
}

async fn dispatch(service: &BookService, command: Commands) -> Result<(), BookmillError> {
    match command {
        Commands::Scan => {
            let added = service.scan().await?;
            println!("Scan complete. Found and added {added} new PDF files.");
        }
        Commands::List => {
            let books = service.list_books().await?;
            if books.is_empty() {
                println!("no books tracked, run `bookmill scan` first");
            }
            for book in &books {
                println!("{}", format_book_line(book));
            }
        }
        Commands::Show { id } => print_json(&service.get_book(&BookId::from(id)).await?)?,
        Commands::Start { id } => {
            print_json(&service.start_processing(&BookId::from(id)).await?)?;
        }
        Commands::Pause { id } => {
            print_json(&service.pause_processing(&BookId::from(id)).await?)?;
        }
        Commands::Cancel { id } => {
            print_json(&service.cancel_processing(&BookId::from(id)).await?)?;
        }
        Commands::Progress { id } => {
            print_json(&service.check_progress(&BookId::from(id)).await?)?;
        }
        Commands::Export { id } => {
            let export = service.export_questions(&BookId::from(id)).await?;
            println!(
                "Exported {} questions to {}",
                export.questions.len(),
                export.path.display()
            );
        }
        Commands::Stats => print_json(&service.stats().await?)?,
        Commands::Serve | Commands::Config => {
            return Err(BookmillError::Internal(
                "serve and config are handled by main".to_string(),
            ));
        }
    }
    Ok(())
}
