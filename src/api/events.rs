//! Content event stream
//!
//! Exposes the in-process event bus as a server-sent events feed so list
//! views can refresh without polling. A subscriber that falls behind the
//! broadcast backlog skips the missed events and keeps receiving.

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use futures::stream::Stream;
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

use crate::api::middleware::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(stream_events))
}

/// GET /api/v1/events - SSE stream of content change events
async fn stream_events(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let receiver = state.events.subscribe();
    let stream = BroadcastStream::new(receiver).filter_map(|result| {
        let event = result.ok()?;
        let data = serde_json::to_string(&event).ok()?;
        Some(Ok(Event::default().event("content").data(data)))
    });

    Sse::new(stream).keep_alive(KeepAlive::default())
}
