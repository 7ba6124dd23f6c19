//! Card research endpoints.
//!
//! Both call the research API directly, no agent loop in between. The
//! streaming variant re-segments the single-shot answer into fixed-stride
//! chunks, a presentational stream over a pull-only source. Research
//! failures (missing key, exhausted quota, upstream errors) come back as
//! descriptive text through the normal body, mirroring how the tools report
//! them to the model.

use std::time::Duration;

use axum::extract::State;
use axum::response::Response;
use axum::routing::post;
use axum::{Json, Router};
use tracing::{info, warn};

use crate::models::{AppState, PromptRequest};
use crate::relay::chunk_stream;
use crate::routes::text_stream_response;
use crate::tools::research::card_identification_prompt;
use crate::types::AppResult;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/card-search", post(card_search))
        .route("/card-search-streaming", post(card_search_streaming))
        .with_state(state)
}

async fn research_text(state: &AppState, prompt: &str) -> String {
    let query = card_identification_prompt(prompt);
    match state.research.research(&query).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(error = %e, "card research failed");
            format!("Error: {e}")
        }
    }
}

/// Single-shot card lookup, plain-text body.
async fn card_search(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> AppResult<String> {
    let prompt = request.validated()?;
    info!(prompt_len = prompt.len(), "card search");

    Ok(research_text(&state, prompt).await)
}

/// Card lookup with a chunked streaming presentation.
async fn card_search_streaming(
    State(state): State<AppState>,
    Json(request): Json<PromptRequest>,
) -> AppResult<Response> {
    let prompt = request.validated()?;
    info!(prompt_len = prompt.len(), "streaming card search");

    let text = research_text(&state, prompt).await;
    let chunks = chunk_stream(
        text,
        state.config.relay.chunk_size,
        Duration::from_millis(state.config.relay.chunk_delay_ms),
    );
    Ok(text_stream_response(chunks))
}
