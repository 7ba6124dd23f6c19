// Relay session: queue bridge between event producers and the wire

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_stream::stream;
use futures::{Future, Stream, StreamExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::relay::event::AgentEvent;
use crate::types::AppResult;

/// Write half handed to sink-style producers.
///
/// Cloneable so a producer may fan out internally; the relay end stays the
/// single reader. Pushes after the reader has gone away are dropped.
#[derive(Clone)]
pub struct EventSink {
    tx: mpsc::UnboundedSender<AgentEvent>,
    terminal_sent: Arc<AtomicBool>,
}

impl EventSink {
    /// Push one event; returns false once the consumer is gone.
    pub fn push(&self, event: AgentEvent) -> bool {
        if event.is_terminal() {
            self.terminal_sent.store(true, Ordering::Relaxed);
        }
        self.tx.send(event).is_ok()
    }

    fn terminal_sent(&self) -> bool {
        self.terminal_sent.load(Ordering::Relaxed)
    }
}

/// Per-request bridge that runs a sink-style producer concurrently and
/// drains its events to NDJSON lines.
///
/// The producer runs as a background task that writes into the session's
/// queue. The wrapper guarantees a terminal event even when the producer
/// itself never pushes one: a clean return yields a completion event, a
/// failed return an error event. Dropping the session aborts the producer,
/// which is how client disconnects cancel in-flight work.
pub struct RelaySession {
    id: Uuid,
    rx: mpsc::UnboundedReceiver<AgentEvent>,
    producer: JoinHandle<()>,
}

impl RelaySession {
    /// Spawn `produce` with a fresh sink bound to this session's queue.
    pub fn spawn<F, Fut>(produce: F) -> Self
    where
        F: FnOnce(EventSink) -> Fut + Send + 'static,
        Fut: Future<Output = AppResult<()>> + Send,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        let sink = EventSink {
            tx,
            terminal_sent: Arc::new(AtomicBool::new(false)),
        };
        let id = Uuid::new_v4();

        let producer = tokio::spawn(async move {
            match produce(sink.clone()).await {
                Ok(()) => {
                    if !sink.terminal_sent() {
                        sink.push(AgentEvent::completion());
                    }
                }
                Err(e) => {
                    warn!(session = %id, error = %e, "sink producer failed");
                    if !sink.terminal_sent() {
                        sink.push(AgentEvent::error(e.to_string()));
                    }
                }
            }
        });

        debug!(session = %id, "relay session started");
        Self { id, rx, producer }
    }

    /// Drain the queue into NDJSON lines.
    ///
    /// Stops after relaying the first terminal event, then flushes whatever
    /// the producer had already enqueued, skipping any extra terminals so at
    /// most one reaches the wire. A queue that closes without any terminal
    /// (producer panic, aborted task) yields one synthetic error line; the
    /// connection never ends without a terminal signal.
    pub fn into_line_stream(self) -> impl Stream<Item = String> + Send {
        stream! {
            let mut session = self;
            let mut terminal_seen = false;

            while let Some(event) = session.rx.recv().await {
                let terminal = event.is_terminal();
                yield event.to_line();
                if terminal {
                    terminal_seen = true;
                    break;
                }
            }

            if terminal_seen {
                // Producers can enqueue several events in one scheduling
                // turn; flush the stragglers that beat the stop decision.
                while let Ok(event) = session.rx.try_recv() {
                    if event.is_terminal() {
                        continue;
                    }
                    yield event.to_line();
                }
                debug!(session = %session.id, "relay session complete");
            } else {
                warn!(session = %session.id, "event queue closed without a terminal event");
                yield AgentEvent::error("agent stream ended without a terminal event").to_line();
            }
        }
    }
}

impl Drop for RelaySession {
    fn drop(&mut self) {
        self.producer.abort();
    }
}

/// Relay a producer's native event stream to NDJSON lines.
///
/// Same wire guarantees as [`RelaySession::into_line_stream`]: the output
/// ends strictly after one terminal line. A stream that ends without a
/// terminal gets a synthetic completion appended; an `Err` item becomes the
/// terminal error line and nothing past it is polled.
pub fn relay_lines<S>(events: S) -> impl Stream<Item = String> + Send
where
    S: Stream<Item = AppResult<AgentEvent>> + Send + 'static,
{
    stream! {
        futures::pin_mut!(events);
        let mut terminal_seen = false;

        while let Some(next) = events.next().await {
            match next {
                Ok(event) => {
                    let terminal = event.is_terminal();
                    yield event.to_line();
                    if terminal {
                        terminal_seen = true;
                        break;
                    }
                }
                Err(e) => {
                    yield AgentEvent::error(e.to_string()).to_line();
                    terminal_seen = true;
                    break;
                }
            }
        }

        if !terminal_seen {
            yield AgentEvent::completion().to_line();
        }
    }
}
