//! Weather endpoints.
//!
//! `/weather` runs the agent to completion and returns the summary as plain
//! text. `/weather-streaming` streams the summary incrementally: agent events
//! are filtered through the summary gate, so lookup chatter and tool traffic
//! never reach the client, only the post-gate summary text does.

use async_stream::stream;
use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use futures::{Stream, StreamExt};
use tracing::{info, warn};

use crate::agents::weather::{self, SummaryGate};
use crate::models::{AppState, PromptRequest};
use crate::relay::AgentEvent;
use crate::routes::text_stream_response;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/weather", post(get_weather))
        .route("/weather-streaming", post(weather_streaming))
        .with_state(state)
}

/// Single-shot weather lookup, plain-text summary body.
async fn get_weather(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> AppResult<String> {
    let prompt = request.validated()?;
    info!(prompt_len = prompt.len(), "weather request");

    let agent = weather::agent(&state)?;
    agent.invoke(prompt).await
}

/// Streaming weather lookup: only the final summary text reaches the wire.
async fn weather_streaming(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> AppResult<Response> {
    let prompt = request.validated()?.to_string();
    info!(prompt_len = prompt.len(), "streaming weather request");

    let (agent, gate) = weather::streaming_agent(&state)?;
    let events = agent.into_event_stream(prompt);
    Ok(text_stream_response(summary_text(events, gate)))
}

/// Hold events back until the gate arms, then forward only `data` text.
/// A producer fault becomes one trailing error line so the client never
/// sees a silently truncated body.
fn summary_text<S>(events: S, gate: SummaryGate) -> impl Stream<Item = String> + Send
where
    S: Stream<Item = AppResult<AgentEvent>> + Send + 'static,
{
    stream! {
        futures::pin_mut!(events);
        while let Some(item) = events.next().await {
            match item {
                Ok(event) => {
                    if !gate.armed() {
                        continue;
                    }
                    if let Some(text) = event.data_text() {
                        yield text.to_string();
                    }
                }
                Err(e) => {
                    warn!(error = %e, "weather stream failed");
                    yield format!("Error: {e}");
                    break;
                }
            }
        }
    }
}
