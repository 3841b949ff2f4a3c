// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! BookService behavior against real SQLite storage.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use bookmill_config::model::{ProcessingConfig, StorageConfig};
use bookmill_core::{
    AdapterType, Book, BookId, BookStatus, BookmillError, Classification, ExtractedMetadata,
    HealthStatus, MetadataExtractor, PluginAdapter, StorageAdapter,
};
use bookmill_processing::testing::sample_pdf;
use bookmill_processing::{
    BookService, ExportSettings, Library, PdfMetadataExtractor, ProgressSimulator, UploadRequest,
};
use bookmill_storage::SqliteStorage;
use tempfile::TempDir;

const FAKE_PDF: &[u8] = b"%PDF-1.4\n% fixture\n";

/// Returns the same metadata (or failure) for every book.
struct FixedExtractor {
    result: Result<ExtractedMetadata, String>,
    calls: AtomicUsize,
}

impl FixedExtractor {
    fn pages(total_pages: u32, classification: Classification) -> Arc<Self> {
        Arc::new(Self {
            result: Ok(ExtractedMetadata {
                total_pages,
                classification,
            }),
            calls: AtomicUsize::new(0),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            result: Err(message.to_string()),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl PluginAdapter for FixedExtractor {
    fn name(&self) -> &str {
        "fixed"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Extractor
    }

    async fn health_check(&self) -> Result<HealthStatus, BookmillError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), BookmillError> {
        Ok(())
    }
}

#[async_trait]
impl MetadataExtractor for FixedExtractor {
    async fn extract(&self, _book: &Book) -> Result<ExtractedMetadata, BookmillError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone().map_err(BookmillError::dependency)
    }
}

struct Setup {
    service: BookService,
    dir: TempDir,
}

async fn setup(extractor: Arc<dyn MetadataExtractor>) -> Setup {
    setup_with(|_| extractor).await
}

async fn setup_with(
    extractor: impl FnOnce(&Library) -> Arc<dyn MetadataExtractor>,
) -> Setup {
    let dir = tempfile::tempdir().unwrap();
    let library = Library::new(dir.path().join("books"));
    let extractor = extractor(&library);
    let storage = SqliteStorage::new(StorageConfig {
        database_path: dir.path().join("bookmill.db").display().to_string(),
        wal_mode: true,
    });
    storage.initialize().await.unwrap();

    let service = BookService::new(
        Arc::new(storage),
        extractor,
        library,
        ProgressSimulator::seeded(&ProcessingConfig::default(), 11),
        ExportSettings {
            output_dir: dir.path().join("exports"),
            file_name_format: "{stem}_questions.csv".to_string(),
        },
        1024 * 1024,
    );
    Setup { service, dir }
}

fn upload(name: &str, classification: Classification) -> UploadRequest {
    UploadRequest {
        file_name: name.to_string(),
        bytes: FAKE_PDF.to_vec(),
        classification,
    }
}

async fn processing_book(service: &BookService) -> Book {
    let book = service
        .upload_book(upload("book.pdf", Classification::default()))
        .await
        .unwrap();
    service.start_processing(&book.id).await.unwrap()
}

#[tokio::test]
async fn book_with_thirty_pages_runs_to_completion() {
    let s = setup(FixedExtractor::pages(30, Classification::default())).await;
    let book = s
        .service
        .upload_book(upload("thirty.pdf", Classification::default()))
        .await
        .unwrap();

    let started = s.service.start_processing(&book.id).await.unwrap();
    assert_eq!(started.status, BookStatus::Processing);
    assert_eq!(started.total_pages, Some(30));

    let mut last_questions = 0;
    let mut checks = 0;
    loop {
        let report = s.service.check_progress(&book.id).await.unwrap();
        assert!(report.book.processed_pages <= 30);
        assert!(report.book.questions_count > last_questions);
        last_questions = report.book.questions_count;
        checks += 1;
        if report.book.status == BookStatus::Completed {
            assert_eq!(report.book.processed_pages, 30);
            assert_eq!(report.progress.percentage, 100);
            break;
        }
        assert!(checks < 30, "should finish within 30 checks");
    }

    let questions = s.service.storage().list_questions(&book.id).await.unwrap();
    assert_eq!(questions.len() as u32, last_questions);
}

#[tokio::test]
async fn upload_keeps_supplied_metadata_and_start_fills_only_gaps() {
    let extracted = Classification {
        grade: Some(7),
        subject: Some("Science".to_string()),
        semester: Some(2),
    };
    let s = setup(FixedExtractor::pages(12, extracted)).await;

    let book = s
        .service
        .upload_book(upload(
            "Математика 5.pdf",
            Classification {
                grade: Some(5),
                subject: Some("Mathematics".to_string()),
                semester: None,
            },
        ))
        .await
        .unwrap();
    assert_eq!(book.status, BookStatus::Idle);
    assert_eq!(book.processed_pages, 0);
    assert_eq!(book.questions_count, 0);
    assert_eq!(book.name, "5.pdf");
    assert!(s.dir.path().join("books").join(&book.file_path).exists());

    let started = s.service.start_processing(&book.id).await.unwrap();
    assert_eq!(started.grade, Some(5));
    assert_eq!(started.subject.as_deref(), Some("Mathematics"));
    assert_eq!(started.semester, Some(2));
}

#[tokio::test]
async fn start_is_rejected_from_processing_completed_and_canceled() {
    let s = setup(FixedExtractor::pages(1, Classification::default())).await;

    let running = processing_book(&s.service).await;
    let err = s.service.start_processing(&running.id).await.unwrap_err();
    assert_eq!(err.current_status(), Some(BookStatus::Processing));

    let done = s.service.check_progress(&running.id).await.unwrap().book;
    assert_eq!(done.status, BookStatus::Completed);
    let err = s.service.start_processing(&done.id).await.unwrap_err();
    assert_eq!(err.current_status(), Some(BookStatus::Completed));
    let unchanged = s.service.get_book(&done.id).await.unwrap();
    assert_eq!(unchanged, done);

    let other = processing_book(&s.service).await;
    let canceled = s.service.cancel_processing(&other.id).await.unwrap();
    assert_eq!(canceled.status, BookStatus::Canceled);
    let err = s.service.start_processing(&other.id).await.unwrap_err();
    assert!(matches!(err, BookmillError::InvalidTransition { .. }));
}

#[tokio::test]
async fn pause_requires_processing_and_resume_keeps_counters() {
    let s = setup(FixedExtractor::pages(100, Classification::default())).await;
    let idle = s
        .service
        .upload_book(upload("idle.pdf", Classification::default()))
        .await
        .unwrap();
    let err = s.service.pause_processing(&idle.id).await.unwrap_err();
    assert_eq!(err.current_status(), Some(BookStatus::Idle));
    let err = s.service.cancel_processing(&idle.id).await.unwrap_err();
    assert_eq!(err.current_status(), Some(BookStatus::Idle));

    let book = processing_book(&s.service).await;
    let advanced = s.service.check_progress(&book.id).await.unwrap().book;
    let paused = s.service.pause_processing(&book.id).await.unwrap();
    assert_eq!(paused.status, BookStatus::Paused);

    // Polling a paused book changes nothing.
    let report = s.service.check_progress(&book.id).await.unwrap();
    assert_eq!(report.book, paused);

    let resumed = s.service.start_processing(&book.id).await.unwrap();
    assert_eq!(resumed.status, BookStatus::Processing);
    assert_eq!(resumed.processed_pages, advanced.processed_pages);
    assert_eq!(resumed.questions_count, advanced.questions_count);
}

#[tokio::test]
async fn progress_on_completed_book_is_idempotent() {
    let s = setup(FixedExtractor::pages(2, Classification::default())).await;
    let book = processing_book(&s.service).await;
    let mut report = s.service.check_progress(&book.id).await.unwrap();
    while report.book.status != BookStatus::Completed {
        report = s.service.check_progress(&book.id).await.unwrap();
    }

    let again = s.service.check_progress(&book.id).await.unwrap();
    assert_eq!(again, report);
    assert_eq!(again.progress.percentage, 100);
}

#[tokio::test]
async fn extraction_failure_aborts_start_without_changes() {
    let extractor = FixedExtractor::failing("pdf unreadable");
    let s = setup(extractor.clone()).await;
    let book = s
        .service
        .upload_book(upload("broken.pdf", Classification::default()))
        .await
        .unwrap();

    let err = s.service.start_processing(&book.id).await.unwrap_err();
    assert!(matches!(err, BookmillError::Dependency { .. }));
    assert_eq!(s.service.get_book(&book.id).await.unwrap(), book);
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn extraction_runs_only_until_page_count_is_known() {
    let extractor = FixedExtractor::pages(50, Classification::default());
    let s = setup(extractor.clone()).await;
    let book = processing_book(&s.service).await;
    s.service.pause_processing(&book.id).await.unwrap();
    s.service.start_processing(&book.id).await.unwrap();
    assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn unknown_book_is_not_found() {
    let s = setup(FixedExtractor::pages(1, Classification::default())).await;
    let missing = BookId::from("does-not-exist");
    assert!(matches!(
        s.service.get_book(&missing).await,
        Err(BookmillError::NotFound { .. })
    ));
    assert!(matches!(
        s.service.start_processing(&missing).await,
        Err(BookmillError::NotFound { .. })
    ));
    assert!(matches!(
        s.service.check_progress(&missing).await,
        Err(BookmillError::NotFound { .. })
    ));
}

#[tokio::test]
async fn invalid_uploads_leave_nothing_behind() {
    let s = setup(FixedExtractor::pages(1, Classification::default())).await;
    let mut not_pdf = upload("notes.pdf", Classification::default());
    not_pdf.bytes = b"hello".to_vec();
    assert!(matches!(
        s.service.upload_book(not_pdf).await,
        Err(BookmillError::InvalidInput(_))
    ));

    let bad_grade = upload(
        "g.pdf",
        Classification {
            grade: Some(0),
            ..Classification::default()
        },
    );
    assert!(s.service.upload_book(bad_grade).await.is_err());
    assert!(s.service.list_books().await.unwrap().is_empty());
}

#[tokio::test]
async fn scan_tracks_new_pdfs_once() {
    let s = setup(FixedExtractor::pages(1, Classification::default())).await;
    let books_dir = s.dir.path().join("books");
    std::fs::create_dir_all(books_dir.join("grade5")).unwrap();
    std::fs::write(books_dir.join("algebra.pdf"), FAKE_PDF).unwrap();
    std::fs::write(books_dir.join("grade5/geometry.PDF"), FAKE_PDF).unwrap();
    std::fs::write(books_dir.join("readme.txt"), b"not a book").unwrap();

    assert_eq!(s.service.scan().await.unwrap(), 2);
    assert_eq!(s.service.scan().await.unwrap(), 0);

    let books = s.service.list_books().await.unwrap();
    let mut paths: Vec<_> = books.iter().map(|b| b.file_path.clone()).collect();
    paths.sort();
    assert_eq!(paths, vec!["algebra.pdf", "grade5/geometry.PDF"]);
    assert!(books.iter().all(|b| b.status == BookStatus::Idle));
}

#[tokio::test]
async fn export_writes_ordered_questions_to_csv() {
    let s = setup(FixedExtractor::pages(8, Classification::default())).await;
    let book = s
        .service
        .upload_book(upload("history.grade5.pdf", Classification::default()))
        .await
        .unwrap();
    s.service.start_processing(&book.id).await.unwrap();
    s.service.check_progress(&book.id).await.unwrap();
    s.service.check_progress(&book.id).await.unwrap();

    let export = s.service.export_questions(&book.id).await.unwrap();
    assert_eq!(export.file_name, "history_questions.csv");
    assert_eq!(export.path, s.dir.path().join("exports/history_questions.csv"));
    assert!(!export.questions.is_empty());
    let pages: Vec<_> = export.questions.iter().map(|q| (q.page_number, q.ordinal)).collect();
    let mut sorted = pages.clone();
    sorted.sort();
    assert_eq!(pages, sorted);

    let written = std::fs::read_to_string(&export.path).unwrap();
    assert_eq!(written.lines().count(), export.questions.len() + 1);

    let csv = s.service.render_csv(&book.id).await.unwrap();
    assert_eq!(csv.file_name, export.file_name);
    assert_eq!(String::from_utf8(csv.body).unwrap(), written);
}

#[tokio::test]
async fn stats_reflect_books_and_questions() {
    let s = setup(FixedExtractor::pages(40, Classification::default())).await;
    let book = processing_book(&s.service).await;
    s.service
        .upload_book(upload("other.pdf", Classification::default()))
        .await
        .unwrap();
    let report = s.service.check_progress(&book.id).await.unwrap();

    let stats = s.service.stats().await.unwrap();
    assert_eq!(stats.total_books, 2);
    assert_eq!(stats.processing_books, 1);
    assert_eq!(stats.completed_books, 0);
    assert_eq!(stats.total_questions, u64::from(report.book.questions_count));
}

#[tokio::test]
async fn subscribers_see_status_and_progress_events() {
    let s = setup(FixedExtractor::pages(10, Classification::default())).await;
    let mut events = s.service.subscribe();

    let book = processing_book(&s.service).await;
    s.service.check_progress(&book.id).await.unwrap();

    let uploaded = events.recv().await.unwrap();
    assert_eq!(uploaded.status, BookStatus::Idle);
    let started = events.recv().await.unwrap();
    assert_eq!(started.status, BookStatus::Processing);
    assert_eq!(started.total_pages, 10);
    let progressed = events.recv().await.unwrap();
    assert_eq!(progressed.book_id, book.id);
    assert!(progressed.processed_pages > 0);
}

#[tokio::test]
async fn pdf_extractor_reads_page_count_from_uploaded_file() {
    let s = setup_with(|library| Arc::new(PdfMetadataExtractor::new(library.clone(), None, 3))).await;

    let book = s
        .service
        .upload_book(UploadRequest {
            file_name: "real.pdf".to_string(),
            bytes: sample_pdf(&["one", "two", "three"]),
            classification: Classification::default(),
        })
        .await
        .unwrap();

    let started = s.service.start_processing(&book.id).await.unwrap();
    assert_eq!(started.total_pages, Some(3));
    assert!(started.classification().is_empty());
}

#[tokio::test]
async fn pdf_extractor_rejects_unparseable_upload_on_start() {
    let s = setup_with(|library| Arc::new(PdfMetadataExtractor::new(library.clone(), None, 3))).await;
    let book = s
        .service
        .upload_book(upload("fake.pdf", Classification::default()))
        .await
        .unwrap();

    let err = s.service.start_processing(&book.id).await.unwrap_err();
    assert!(matches!(err, BookmillError::Dependency { .. }));
    assert_eq!(s.service.get_book(&book.id).await.unwrap().status, BookStatus::Idle);
}
