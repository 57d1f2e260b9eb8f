//! Progress feed as Server-Sent Events.
//!
//! `GET /events` sends a `connected` event, then one event per progress log
//! entry this connection has not seen yet: `workflow_update` for workflow
//! owners and `discovery_event` for the discovery buffer.

use std::convert::Infallible;
use std::time::Duration;

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::get,
    Router,
};
use tokio_stream::StreamExt as _;

use conductor_core::events::{self, DISCOVERY_OWNER};
use conductor_core::models::ProgressUpdate;
use conductor_core::state::{AppState, SERVICE_NAME};

/// Re-scan period when no append wakes the feed earlier.
const FEED_TICK: Duration = Duration::from_secs(1);

pub fn router() -> Router<AppState> {
    Router::new().route("/events", get(progress_feed))
}

async fn progress_feed(
    State(state): State<AppState>,
) -> Sse<impl tokio_stream::Stream<Item = Result<Event, Infallible>>> {
    let connected = serde_json::json!({
        "type": "connected",
        "agent": SERVICE_NAME,
        "timestamp": chrono::Utc::now().to_rfc3339(),
    });
    let initial = tokio_stream::once(Ok::<_, Infallible>(
        Event::default().event("connected").data(connected.to_string()),
    ));

    let updates = events::feed(state.progress.clone(), FEED_TICK).map(|u| Ok(to_event(&u)));

    Sse::new(initial.chain(updates)).keep_alive(KeepAlive::default())
}

fn to_event(update: &ProgressUpdate) -> Event {
    let kind = if update.owner_id == DISCOVERY_OWNER {
        "discovery_event"
    } else {
        "workflow_update"
    };
    let body = serde_json::json!({
        "type": kind,
        "ownerId": update.owner_id,
        "sequence": update.sequence,
        "update": update,
    });
    Event::default()
        .event(kind)
        .id(format!("{}:{}", update.owner_id, update.sequence))
        .data(body.to_string())
}
