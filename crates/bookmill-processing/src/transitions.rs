// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Status state machine for external processing commands.
//!
//! | command | allowed from     | result     |
//! |---------|------------------|------------|
//! | start   | idle, paused     | processing |
//! | pause   | processing       | paused     |
//! | cancel  | processing       | canceled   |
//!
//! `completed` and `error` are only ever entered by the progress simulator
//! (or not at all), and `canceled` is terminal.

use bookmill_core::{Book, BookStatus, BookmillError, ProcessingCommand};

/// The status `command` leads to from `current`, or `None` if not allowed.
pub fn next_status(current: BookStatus, command: ProcessingCommand) -> Option<BookStatus> {
    use BookStatus::*;
    use ProcessingCommand::*;

    match (command, current) {
        (Start, Idle | Paused) => Some(Processing),
        (Pause, Processing) => Some(Paused),
        (Cancel, Processing) => Some(Canceled),
        _ => None,
    }
}

/// Checks `command` against the book's current status.
///
/// The error carries the status the book is in so callers can report it.
pub fn transition(book: &Book, command: ProcessingCommand) -> Result<BookStatus, BookmillError> {
    next_status(book.status, command).ok_or_else(|| BookmillError::InvalidTransition {
        book_id: book.id.to_string(),
        command,
        status: book.status,
    })
}

/// Whether applying `command` must first extract the book's metadata.
pub fn needs_extraction(book: &Book, command: ProcessingCommand) -> bool {
    command == ProcessingCommand::Start && book.total_pages.is_none()
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookmill_core::Classification;

    fn book_in(status: BookStatus) -> Book {
        let mut book = Book::new("t.pdf", "t.pdf", Classification::default());
        book.status = status;
        book
    }

    #[test]
    fn start_is_allowed_from_idle_and_paused_only() {
        for status in BookStatus::ALL {
            let expected = matches!(status, BookStatus::Idle | BookStatus::Paused);
            assert_eq!(
                next_status(status, ProcessingCommand::Start).is_some(),
                expected,
                "start from {status}"
            );
        }
    }

    #[test]
    fn pause_and_cancel_require_processing() {
        for status in BookStatus::ALL {
            let pause = next_status(status, ProcessingCommand::Pause);
            let cancel = next_status(status, ProcessingCommand::Cancel);
            if status == BookStatus::Processing {
                assert_eq!(pause, Some(BookStatus::Paused));
                assert_eq!(cancel, Some(BookStatus::Canceled));
            } else {
                assert_eq!(pause, None, "pause from {status}");
                assert_eq!(cancel, None, "cancel from {status}");
            }
        }
    }

    #[test]
    fn rejected_transition_reports_current_status() {
        let book = book_in(BookStatus::Completed);
        let err = transition(&book, ProcessingCommand::Start).unwrap_err();
        assert_eq!(err.current_status(), Some(BookStatus::Completed));
        assert!(err.to_string().contains("cannot start"));
    }

    #[test]
    fn extraction_only_on_start_without_page_count() {
        let mut book = book_in(BookStatus::Idle);
        assert!(needs_extraction(&book, ProcessingCommand::Start));
        assert!(!needs_extraction(&book, ProcessingCommand::Pause));
        book.total_pages = Some(12);
        assert!(!needs_extraction(&book, ProcessingCommand::Start));
    }
}
