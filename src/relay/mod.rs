//! Event Relay
//!
//! Bridges agent event production onto streaming HTTP responses:
//!
//! - **Event**: one unit of producer output, an open JSON mapping with two
//!   reserved control fields (`complete`, `error`/`message`)
//! - **Relay Session**: per-request queue bridge for sink-style producers
//!   (the producer pushes, the relay drains to NDJSON lines)
//! - **Line relay**: direct iteration of a producer's native event stream
//! - **Chunker**: fixed-stride re-segmentation of single-shot responses for
//!   endpoints that want a streamed presentation
//!
//! Every streaming response produced here ends with exactly one terminal
//! event line (completion or error), no matter how the producer behaved.

pub mod chunked;
pub mod event;
pub mod session;

pub use chunked::{chunk_stream, chunk_text};
pub use event::AgentEvent;
pub use session::{relay_lines, EventSink, RelaySession};
