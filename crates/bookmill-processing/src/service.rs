// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Book operations, as used by the HTTP gateway and the CLI.

use std::collections::HashSet;
use std::sync::Arc;

use bookmill_config::BookmillConfig;
use bookmill_core::{
    Book, BookId, BookStats, BookStatus, BookmillError, Classification, MetadataExtractor,
    ProcessingCommand, Progress, ProgressEvent, StorageAdapter,
};
use serde::Serialize;
use tokio::sync::{Mutex, broadcast};
use tracing::{debug, info, warn};

use crate::export::{self, ExportResult, ExportSettings};
use crate::library::{self, Library};
use crate::simulator::ProgressSimulator;
use crate::transitions;

/// Buffered progress events per subscriber before the slowest one lags.
const EVENT_CAPACITY: usize = 256;

/// An uploaded file and the metadata supplied with it.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub classification: Classification,
}

/// Book state after a progress check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressReport {
    pub book: Book,
    pub progress: Progress,
}

/// A rendered CSV ready to be sent to a client.
#[derive(Debug, Clone)]
pub struct CsvExport {
    pub file_name: String,
    pub body: Vec<u8>,
}

pub struct BookService {
    storage: Arc<dyn StorageAdapter>,
    extractor: Arc<dyn MetadataExtractor>,
    library: Library,
    simulator: Mutex<ProgressSimulator>,
    export: ExportSettings,
    max_upload_bytes: usize,
    events: broadcast::Sender<ProgressEvent>,
}

impl BookService {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        extractor: Arc<dyn MetadataExtractor>,
        library: Library,
        simulator: ProgressSimulator,
        export: ExportSettings,
        max_upload_bytes: usize,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            storage,
            extractor,
            library,
            simulator: Mutex::new(simulator),
            export,
            max_upload_bytes,
            events,
        }
    }

    /// Wires the service from configuration around already-built adapters.
    pub fn from_config(
        config: &BookmillConfig,
        storage: Arc<dyn StorageAdapter>,
        extractor: Arc<dyn MetadataExtractor>,
    ) -> Self {
        Self::new(
            storage,
            extractor,
            Library::new(&config.library.books_dir),
            ProgressSimulator::new(&config.processing),
            ExportSettings::from(&config.export),
            config.server.max_upload_bytes,
        )
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    /// Receives an event for every status or counter change from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ProgressEvent> {
        self.events.subscribe()
    }

    fn publish(&self, book: &Book) {
        // No subscribers is not an error.
        let _ = self.events.send(ProgressEvent::from_book(book));
    }

    async fn load(&self, id: &BookId) -> Result<Book, BookmillError> {
        self.storage
            .get_book(id)
            .await?
            .ok_or_else(|| BookmillError::NotFound { id: id.to_string() })
    }

    /// Registers every untracked PDF in the library as an idle book.
    ///
    /// Returns how many books were added.
    pub async fn scan(&self) -> Result<usize, BookmillError> {
        let tracked: HashSet<String> = self.storage.tracked_file_paths().await?.into_iter().collect();
        let library = self.library.clone();
        let discovered = tokio::task::spawn_blocking(move || library.discover())
            .await
            .map_err(|e| BookmillError::Internal(format!("library scan task failed: {e}")))??;

        let mut added = 0;
        for file in discovered {
            if tracked.contains(&file.file_path) {
                continue;
            }
            let book = Book::new(file.name, file.file_path, Classification::default());
            match self.storage.insert_book(&book).await {
                Ok(()) => {
                    debug!(book_id = %book.id, file_path = %book.file_path, "tracked new book");
                    self.publish(&book);
                    added += 1;
                }
                // Another scan got there first.
                Err(BookmillError::InvalidInput(reason)) => {
                    debug!(file_path = %book.file_path, %reason, "skipping already tracked file");
                }
                Err(e) => return Err(e),
            }
        }

        info!(added, "library scan finished");
        Ok(added)
    }

    /// All books, newest first.
    pub async fn list_books(&self) -> Result<Vec<Book>, BookmillError> {
        self.storage.list_books().await
    }

    pub async fn get_book(&self, id: &BookId) -> Result<Book, BookmillError> {
        self.load(id).await
    }

    /// Stores an uploaded PDF and registers it as an idle book.
    pub async fn upload_book(&self, upload: UploadRequest) -> Result<Book, BookmillError> {
        library::validate_upload(&upload.bytes, &upload.classification, self.max_upload_bytes)?;

        let name = library::sanitize_name(&upload.file_name);
        let extension = library::storage_extension(&name);
        let file_path = self.library.store(&extension, &upload.bytes).await?;

        let book = Book::new(name, file_path, upload.classification);
        if let Err(e) = self.storage.insert_book(&book).await {
            if let Err(cleanup) = self.library.remove(&book.file_path).await {
                warn!(file_path = %book.file_path, error = %cleanup, "failed to remove orphaned upload");
            }
            return Err(e);
        }

        info!(book_id = %book.id, name = %book.name, bytes = upload.bytes.len(), "book uploaded");
        self.publish(&book);
        Ok(book)
    }

    /// `idle`/`paused` to `processing`. The first start extracts the page
    /// count (and classification where still missing) before anything is written.
    pub async fn start_processing(&self, id: &BookId) -> Result<Book, BookmillError> {
        self.apply(id, ProcessingCommand::Start).await
    }

    /// `processing` to `paused`. Counters are kept for the next start.
    pub async fn pause_processing(&self, id: &BookId) -> Result<Book, BookmillError> {
        self.apply(id, ProcessingCommand::Pause).await
    }

    /// `processing` to `canceled`.
    pub async fn cancel_processing(&self, id: &BookId) -> Result<Book, BookmillError> {
        self.apply(id, ProcessingCommand::Cancel).await
    }

    async fn apply(&self, id: &BookId, command: ProcessingCommand) -> Result<Book, BookmillError> {
        let mut book = self.load(id).await?;
        let next = transitions::transition(&book, command)?;

        if transitions::needs_extraction(&book, command) {
            let meta = self.extractor.extract(&book).await?;
            if meta.total_pages == 0 {
                return Err(BookmillError::dependency(format!(
                    "extractor reported no pages for book {id}"
                )));
            }
            book.total_pages = Some(meta.total_pages);
            book.fill_classification(meta.classification);
        }

        let previous = book.status;
        book.status = next;
        let stored = self.storage.update_book(&book).await?;

        info!(
            book_id = %stored.id,
            %command,
            from = %previous,
            to = %stored.status,
            total_pages = ?stored.total_pages,
            "book status changed"
        );
        self.publish(&stored);
        Ok(stored)
    }

    /// Advances a processing book by one simulated step and reports progress.
    ///
    /// Books in any other status are returned unchanged.
    pub async fn check_progress(&self, id: &BookId) -> Result<ProgressReport, BookmillError> {
        let book = self.load(id).await?;

        let advance = {
            let mut simulator = self.simulator.lock().await;
            simulator.advance(&book)
        };
        let Some(advance) = advance else {
            let progress = book.progress();
            return Ok(ProgressReport { book, progress });
        };

        let stored = self
            .storage
            .record_progress(&advance.book, &advance.questions)
            .await?;

        debug!(
            book_id = %stored.id,
            pages_added = advance.pages_added,
            questions_added = advance.questions.len(),
            processed_pages = stored.processed_pages,
            total_pages = ?stored.total_pages,
            "simulated progress advance"
        );
        if stored.status == BookStatus::Completed {
            info!(book_id = %stored.id, questions = stored.questions_count, "book processing completed");
        }
        self.publish(&stored);

        let progress = stored.progress();
        Ok(ProgressReport {
            book: stored,
            progress,
        })
    }

    /// Writes the book's questions to a CSV file under the export directory.
    pub async fn export_questions(&self, id: &BookId) -> Result<ExportResult, BookmillError> {
        let book = self.load(id).await?;
        let questions = self.storage.list_questions(id).await?;
        let body = export::render_csv(&book, &questions)?;

        let file_name = self.export.file_name(&book.name);
        tokio::fs::create_dir_all(&self.export.output_dir).await?;
        let path = self.export.output_dir.join(&file_name);
        tokio::fs::write(&path, body).await?;

        info!(book_id = %book.id, questions = questions.len(), path = %path.display(), "questions exported");
        Ok(ExportResult {
            book,
            questions,
            file_name,
            path,
        })
    }

    /// Renders the book's questions as CSV without touching the disk.
    pub async fn render_csv(&self, id: &BookId) -> Result<CsvExport, BookmillError> {
        let book = self.load(id).await?;
        let questions = self.storage.list_questions(id).await?;
        Ok(CsvExport {
            file_name: self.export.file_name(&book.name),
            body: export::render_csv(&book, &questions)?,
        })
    }

    pub async fn stats(&self) -> Result<BookStats, BookmillError> {
        self.storage.book_stats().await
    }
}
