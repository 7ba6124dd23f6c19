//! API Routes
//!
//! HTTP surface of the assistant backend:
//! - `GET  /health` - liveness probe
//! - `POST /weather` / `/weather-streaming` - weather agent
//! - `POST /card-search` / `/card-search-streaming` - direct card research
//! - `POST /assistant` / `/assistant-streaming` / `/assistant-events` -
//!   coordinator agent (single-shot, native stream relay, queue relay)
//!
//! Streaming bodies are built here: NDJSON event lines for the assistant
//! endpoints, raw text chunks for the presentational text streams. Chunks
//! are handed to hyper as they are produced, nothing is buffered.

pub mod assistant;
pub mod cards;
pub mod health;
pub mod weather;

use std::convert::Infallible;

use axum::body::Body;
use axum::http::header;
use axum::response::{IntoResponse, Response};
use axum::Router;
use bytes::Bytes;
use futures::{Stream, StreamExt};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    Router::new()
        .merge(health::router())
        .merge(weather::router(state.clone()))
        .merge(cards::router(state.clone()))
        .merge(assistant::router(state))
        .layer(TraceLayer::new_for_http())
}

/// Streaming NDJSON response; the stream items are complete wire lines.
pub(crate) fn ndjson_response<S>(lines: S) -> Response
where
    S: Stream<Item = String> + Send + 'static,
{
    let body = Body::from_stream(lines.map(|line| Ok::<_, Infallible>(Bytes::from(line))));
    ([(header::CONTENT_TYPE, "application/x-ndjson")], body).into_response()
}

/// Streaming plain-text response for the presentational text endpoints.
pub(crate) fn text_stream_response<S>(chunks: S) -> Response
where
    S: Stream<Item = String> + Send + 'static,
{
    let body = Body::from_stream(chunks.map(|chunk| Ok::<_, Infallible>(Bytes::from(chunk))));
    (
        [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
        body,
    )
        .into_response()
}
