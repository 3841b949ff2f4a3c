// SPDX-FileCopyrightText: 2026 Bookmill Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Server-Sent Events stream of one book's progress.
//!
//! The first event is the book's current state. Every later status or
//! counter change is sent as it happens:
//!
//! ```text
//! event: progress
//! data: {"book_id":"...","status":"processing","processed_pages":5,...}
//! ```
//!
//! Progress only moves when someone polls the progress endpoint; this
//! stream observes it and never drives it.

use axum::extract::{Path, State};
use axum::response::sse::{Event, KeepAlive, Sse};
use bookmill_core::{BookId, ProgressEvent};
use futures::stream::{self, Stream, StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};

use crate::error::ApiError;
use crate::server::GatewayState;

const EVENT_NAME: &str = "progress";

fn to_event(event: &ProgressEvent) -> Result<Event, axum::Error> {
    Event::default().event(EVENT_NAME).json_data(event)
}

/// Next event for `id`, skipping other books. `None` once the sender is gone.
async fn next_for(
    rx: &mut broadcast::Receiver<ProgressEvent>,
    id: &BookId,
) -> Option<ProgressEvent> {
    loop {
        match rx.recv().await {
            Ok(event) if &event.book_id == id => return Some(event),
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                tracing::debug!(book_id = %id, skipped, "progress stream lagged");
            }
            Err(RecvError::Closed) => return None,
        }
    }
}

/// GET /v1/books/{id}/events
pub async fn book_events(
    State(state): State<GatewayState>,
    Path(id): Path<String>,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>> + Send>, ApiError> {
    let id = BookId::from(id);
    // Subscribe before reading so no change slips between the two.
    let rx = state.service.subscribe();
    let book = state.service.get_book(&id).await?;
    let initial = to_event(&ProgressEvent::from_book(&book));

    let updates = stream::unfold((rx, id), |(mut rx, id)| async move {
        let event = next_for(&mut rx, &id).await?;
        Some((to_event(&event), (rx, id)))
    });

    let events = stream::once(async move { initial }).chain(updates);
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
