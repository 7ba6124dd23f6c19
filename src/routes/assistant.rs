//! Coordinator assistant endpoints.
//!
//! Three presentations of the same agent:
//! - `/assistant` - run to completion, plain-text answer
//! - `/assistant-streaming` - the agent's native event stream relayed to
//!   NDJSON lines
//! - `/assistant-events` - the agent run as a sink-style producer behind a
//!   relay session queue, same NDJSON wire format
//!
//! Both streaming variants end with exactly one terminal line. Dropping the
//! connection drops the stream, which cancels the in-flight agent run.

use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use tracing::info;

use crate::agents::coordinator;
use crate::models::{AppState, PromptRequest};
use crate::relay::{relay_lines, RelaySession};
use crate::routes::ndjson_response;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/assistant", post(assistant))
        .route("/assistant-streaming", post(assistant_streaming))
        .route("/assistant-events", post(assistant_events))
        .with_state(state)
}

/// Single-shot assistant answer, plain-text body.
async fn assistant(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> AppResult<String> {
    let prompt = request.validated()?;
    info!(prompt_len = prompt.len(), "assistant request");

    let agent = coordinator::agent(&state)?;
    agent.invoke(prompt).await
}

/// Assistant over the native event stream relay.
async fn assistant_streaming(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> AppResult<Response> {
    let prompt = request.validated()?.to_string();
    info!(prompt_len = prompt.len(), "streaming assistant request");

    let agent = coordinator::agent(&state)?;
    Ok(ndjson_response(relay_lines(agent.into_event_stream(prompt))))
}

/// Assistant over the queue relay: the agent runs as a background producer
/// pushing into the session's sink while the response drains it.
async fn assistant_events(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> AppResult<Response> {
    let prompt = request.validated()?.to_string();
    info!(prompt_len = prompt.len(), "assistant event-relay request");

    let agent = coordinator::agent(&state)?;
    let session =
        RelaySession::spawn(move |sink| async move { agent.run_with_sink(&prompt, sink).await });
    Ok(ndjson_response(session.into_line_stream()))
}
