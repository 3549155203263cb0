//! Event Stream Routes
//!
//! The live event stream (SSE) and the recent-events polling endpoint.

use std::convert::Infallible;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::sse::{Event as SseEvent, KeepAlive, Sse},
    routing::get,
    Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use serde_json::json;

use crate::hub::{Event, EventHub, StreamMessage};

// ==================
// Shared State
// ==================

/// Event stream state shared across handlers
#[derive(Clone)]
pub struct EventsState {
    pub hub: Arc<EventHub>,

    /// Idle interval between SSE keep-alive comments
    pub keep_alive: Duration,
}

impl EventsState {
    pub fn new(hub: Arc<EventHub>, keep_alive: Duration) -> Self {
        Self { hub, keep_alive }
    }
}

// ==================
// Query Parameters
// ==================

/// Query parameters for the event stream
#[derive(Debug, Deserialize)]
pub struct StreamQuery {
    /// Resume after this sequence number: retained events with a higher
    /// sequence are replayed before live delivery. The `Last-Event-ID`
    /// header takes precedence when both are present. Kept as a string so
    /// an unparsable value degrades to a live tail exactly like an
    /// unparsable header, instead of failing extraction.
    #[serde(default)]
    pub resume_from: Option<String>,
}

/// Query parameters for the recent-events listing
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    /// Maximum number of events to return (default 50, capped at 1000)
    #[serde(default)]
    pub limit: Option<usize>,
}

const DEFAULT_RECENT_LIMIT: usize = 50;
const MAX_RECENT_LIMIT: usize = 1000;

// ==================
// Event Routes
// ==================

/// Create event routes
pub fn events_routes(state: EventsState) -> Router {
    Router::new()
        .route("/events", get(stream_events_handler))
        .route("/events/recent", get(recent_events_handler))
        .with_state(state)
}

// ==================
// Handlers
// ==================

/// GET /events - live event stream (SSE)
///
/// Each event becomes one SSE record with `id:` = sequence, `event:` =
/// event name and `data:` = the event as JSON, so a standard EventSource
/// reconnect resumes via `Last-Event-ID` without client-side bookkeeping.
async fn stream_events_handler(
    State(state): State<EventsState>,
    headers: HeaderMap,
    Query(query): Query<StreamQuery>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let resume_from = resume_cursor(&headers, &query);
    tracing::debug!(resume_from = ?resume_from, "event stream client attached");

    // Dropping the stream drops the subscription, which detaches the
    // subscriber from the hub.
    let subscription = Arc::clone(&state.hub).subscribe(resume_from);
    let stream = stream::unfold(subscription, |mut subscription| async move {
        let message = subscription.next_message().await?;
        Some((Ok::<_, Infallible>(sse_record(&message)), subscription))
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(state.keep_alive)
            .text("keep-alive"),
    )
}

/// GET /events/recent - newest retained events as JSON, newest first
async fn recent_events_handler(
    State(state): State<EventsState>,
    Query(query): Query<RecentQuery>,
) -> Json<Vec<Event>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_RECENT_LIMIT)
        .min(MAX_RECENT_LIMIT);

    let events: Vec<Event> = state
        .hub
        .recent(limit)
        .iter()
        .map(|event| event.as_ref().clone())
        .collect();
    Json(events)
}

// ==================
// Helper Functions
// ==================

/// Resolve the resume cursor: `Last-Event-ID` header first, then the
/// `resume_from` query parameter. Values that do not parse as a sequence
/// number are ignored.
fn resume_cursor(headers: &HeaderMap, query: &StreamQuery) -> Option<u64> {
    headers
        .get("last-event-id")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
        .or_else(|| {
            query
                .resume_from
                .as_deref()
                .and_then(|value| value.trim().parse().ok())
        })
}

/// Render one stream message as an SSE record.
///
/// The resync marker deliberately carries no `id:` line: it must not
/// disturb the cursor an EventSource client tracks for reconnects.
fn sse_record(message: &StreamMessage) -> SseEvent {
    match message {
        StreamMessage::Event(event) => SseEvent::default()
            .id(event.sequence.to_string())
            .event(&event.name)
            .data(event_json(event)),
        StreamMessage::ResyncRequired {
            requested,
            oldest_retained,
        } => SseEvent::default().event("resync-required").data(
            json!({
                "requested": requested,
                "oldest_retained": oldest_retained,
            })
            .to_string(),
        ),
    }
}

fn event_json(event: &Event) -> String {
    serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string())
}
