// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Simulated page-by-page processing.
//!
//! There is no real processing engine. Every progress check on a book that is
//! `processing` advances it by a random number of pages and produces a
//! proportional number of placeholder questions.

use bookmill_config::model::{MAX_PAGE_STEP, MAX_QUESTION_FACTOR, ProcessingConfig};
use bookmill_core::{Book, BookStatus, Question, now_timestamp};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// The outcome of one simulated step, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advance {
    /// The book with updated counters and, possibly, `completed` status.
    pub book: Book,
    /// Placeholder questions generated for the newly processed pages.
    pub questions: Vec<Question>,
    pub pages_added: u32,
}

/// Draws progress steps from an injectable random source.
#[derive(Debug)]
pub struct ProgressSimulator {
    rng: StdRng,
    max_page_step: u32,
    question_factor: u32,
}

impl ProgressSimulator {
    /// A simulator seeded from OS entropy.
    pub fn new(config: &ProcessingConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// A reproducible simulator.
    pub fn seeded(config: &ProcessingConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    pub fn with_rng(config: &ProcessingConfig, rng: StdRng) -> Self {
        Self {
            rng,
            max_page_step: config.max_page_step.clamp(1, MAX_PAGE_STEP),
            question_factor: config.question_factor.clamp(1, MAX_QUESTION_FACTOR),
        }
    }

    /// Computes the next step for `book`.
    ///
    /// Returns `None` when nothing changes: the book is not processing, or its
    /// page count is unknown.
    pub fn advance(&mut self, book: &Book) -> Option<Advance> {
        if book.status != BookStatus::Processing {
            return None;
        }
        let total = book.total_pages?;

        let remaining = total.saturating_sub(book.processed_pages);
        let mut next = book.clone();

        if remaining == 0 {
            next.status = BookStatus::Completed;
            return Some(Advance {
                book: next,
                questions: Vec::new(),
                pages_added: 0,
            });
        }

        let page_step = self.rng.gen_range(1..=self.max_page_step).min(remaining);
        let question_step = self
            .rng
            .gen_range(0..self.question_factor.saturating_mul(page_step))
            .saturating_add(page_step);

        let questions = placeholder_questions(book, page_step, question_step);

        next.processed_pages += page_step;
        next.questions_count = next.questions_count.saturating_add(question_step);
        if next.processed_pages >= total {
            next.processed_pages = total;
            next.status = BookStatus::Completed;
        }

        Some(Advance {
            book: next,
            questions,
            pages_added: page_step,
        })
    }
}

/// Spreads `count` questions evenly over the `pages` pages after the ones
/// already processed. Ordinals continue from the book's question count.
fn placeholder_questions(book: &Book, pages: u32, count: u32) -> Vec<Question> {
    let created_at = now_timestamp();
    (0..count)
        .map(|i| {
            let page_number = book.processed_pages + 1 + (i * pages) / count;
            let ordinal = book.questions_count.saturating_add(1).saturating_add(i);
            Question {
                id: uuid::Uuid::new_v4().to_string(),
                book_id: book.id.clone(),
                page_number,
                ordinal,
                text: format!(
                    "Simulated question {ordinal} for page {page_number} of {}",
                    book.name
                ),
                created_at: created_at.clone(),
            }
        })
        .collect()
}
