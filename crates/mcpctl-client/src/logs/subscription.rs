//! Background consumer of one log stream

use std::cell::Cell;
use std::sync::Arc;

use futures::{Stream, StreamExt};
use mcpctl_core::{LogLine, ServerId};
use parking_lot::ReentrantMutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace, warn};

use super::decoder::FrameDecoder;
use crate::error::StreamError;

/// Receiver of decoded log lines
///
/// Any `FnMut(LogLine)` closure is a sink that ignores errors.
pub trait LogSink: Send + 'static {
    fn on_line(&mut self, line: LogLine);

    /// Called at most once, after which the sink receives nothing more
    fn on_error(&mut self, error: StreamError) {
        let _ = error;
    }
}

impl<F> LogSink for F
where
    F: FnMut(LogLine) + Send + 'static,
{
    fn on_line(&mut self, line: LogLine) {
        self(line)
    }
}

/// Sink built from a line callback and an error callback
pub struct Callbacks<L, E> {
    on_line: L,
    on_error: E,
}

pub fn callbacks<L, E>(on_line: L, on_error: E) -> Callbacks<L, E>
where
    L: FnMut(LogLine) + Send + 'static,
    E: FnMut(StreamError) + Send + 'static,
{
    Callbacks { on_line, on_error }
}

impl<L, E> LogSink for Callbacks<L, E>
where
    L: FnMut(LogLine) + Send + 'static,
    E: FnMut(StreamError) + Send + 'static,
{
    fn on_line(&mut self, line: LogLine) {
        (self.on_line)(line)
    }

    fn on_error(&mut self, error: StreamError) {
        (self.on_error)(error)
    }
}

/// Delivery gate shared by the consumer task and the handle
///
/// Every callback runs with the gate held and only while it is open. `cancel`
/// closes it under the same lock, so once `cancel` returns no callback can
/// start. Reentrant so a sink may cancel from inside its own callback.
type Gate = Arc<ReentrantMutex<Cell<bool>>>;

/// Handle to a running log stream; dropping it cancels the stream
pub struct LogSubscription {
    server_id: ServerId,
    token: CancellationToken,
    gate: Gate,
    task: Option<JoinHandle<()>>,
}

impl LogSubscription {
    pub fn server_id(&self) -> &ServerId {
        &self.server_id
    }

    /// Stop the stream. Idempotent, and harmless after the stream has ended.
    pub fn cancel(&self) {
        let open = self.gate.lock();
        if open.replace(false) {
            debug!(server_id = %self.server_id, "[LogSubscription] Cancelled");
        }
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// True once the consumer task has stopped for any reason
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }

    /// Wait for the consumer task to stop
    ///
    /// Returns false if the task panicked, which only happens when a sink
    /// callback panics.
    pub async fn finished(&mut self) -> bool {
        let Some(task) = self.task.take() else {
            return true;
        };
        match task.await {
            Ok(()) => true,
            Err(err) if err.is_panic() => {
                warn!(server_id = %self.server_id, "[LogSubscription] Consumer panicked in a sink callback");
                false
            }
            Err(_) => true,
        }
    }
}

impl Drop for LogSubscription {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Spawn a consumer for `stream` on the current tokio runtime
///
/// The stream is read one chunk at a time; the next read is only polled once
/// every line of the previous chunk has been delivered.
pub fn subscribe<St, B, E, S>(server_id: ServerId, stream: St, sink: S) -> LogSubscription
where
    St: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: std::fmt::Display + Send + 'static,
    S: LogSink,
{
    let token = CancellationToken::new();
    let gate: Gate = Arc::new(ReentrantMutex::new(Cell::new(true)));

    let task = tokio::spawn(consume(
        server_id.clone(),
        stream,
        sink,
        token.clone(),
        gate.clone(),
    ));

    LogSubscription {
        server_id,
        token,
        gate,
        task: Some(task),
    }
}

async fn consume<St, B, E, S>(
    server_id: ServerId,
    stream: St,
    mut sink: S,
    token: CancellationToken,
    gate: Gate,
) where
    St: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
    E: std::fmt::Display,
    S: LogSink,
{
    let mut stream = std::pin::pin!(stream);
    let mut decoder = FrameDecoder::new();
    let mut delivered = 0usize;

    loop {
        let next = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            next = stream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                for line in decoder.feed(chunk.as_ref()) {
                    let open = gate.lock();
                    if !open.get() {
                        break;
                    }
                    sink.on_line(line);
                    delivered += 1;
                }
            }
            Some(Err(err)) => {
                let open = gate.lock();
                if open.replace(false) {
                    debug!(server_id = %server_id, error = %err, "[LogSubscription] Read failed");
                    sink.on_error(StreamError::read(err));
                }
                break;
            }
            None => {
                let discarded = decoder.finish();
                debug!(
                    server_id = %server_id,
                    delivered,
                    discarded,
                    "[LogSubscription] Stream ended"
                );
                return;
            }
        }
    }

    trace!(server_id = %server_id, delivered, "[LogSubscription] Consumer stopped");
}
