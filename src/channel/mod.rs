//! Event channel between notification callbacks and consumers.
//!
//! An unbounded FIFO queue with an explicit terminal close:
//!   - **Enqueue** never blocks and never fails while open; after close it is a no-op
//!   - **Close** is idempotent; buffered events stay readable
//!   - **Consume** yields events lazily and ends once the channel is closed and drained
//!
//! Delivery is queue-style: each event reaches exactly one consumer. Several
//! streams obtained from [`EventChannel::consume`] share the queue and split
//! the events between them, each seeing its share in enqueue order. A consumer
//! holds no lock while it waits, so an idle stream never holds up the others.

use futures::stream::{self, BoxStream, Fuse, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use crate::events::DirectoryChangeEvent;

/// Lazy, ordered sequence of events.
///
/// Ends after close once drained, and keeps returning `None` if polled again.
pub type EventStream = Fuse<BoxStream<'static, DirectoryChangeEvent>>;

/// Counters about channel usage.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelStats {
    pub enqueued: u64,
    pub rejected_after_close: u64,
    pub buffered: usize,
    pub closed: bool,
}

#[derive(Debug, Default)]
struct Queue {
    buffer: VecDeque<DirectoryChangeEvent>,
    closed: bool,
}

/// State shared by the channel and every consumer stream.
#[derive(Debug, Default)]
struct Shared {
    queue: Mutex<Queue>,
    /// Woken on every enqueue and on close.
    available: Notify,
}

impl Shared {
    async fn recv(&self) -> Option<DirectoryChangeEvent> {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Registered before the check so a concurrent enqueue cannot be missed.
            notified.as_mut().enable();

            {
                let mut queue = self.queue.lock();
                if let Some(event) = queue.buffer.pop_front() {
                    return Some(event);
                }
                if queue.closed {
                    return None;
                }
            }

            notified.await;
        }
    }
}

/// Multi-producer, multi-consumer event queue.
pub struct EventChannel {
    shared: Arc<Shared>,
    enqueued: AtomicU64,
    rejected_after_close: AtomicU64,
}

impl EventChannel {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared::default()),
            enqueued: AtomicU64::new(0),
            rejected_after_close: AtomicU64::new(0),
        }
    }

    /// Append an event. Returns `false` if the channel is already closed.
    pub fn enqueue(&self, event: DirectoryChangeEvent) -> bool {
        let mut queue = self.shared.queue.lock();
        if queue.closed {
            drop(queue);
            self.rejected_after_close.fetch_add(1, Ordering::Relaxed);
            tracing::debug!("Dropped {} event: channel closed", event.kind());
            return false;
        }
        queue.buffer.push_back(event);
        self.enqueued.fetch_add(1, Ordering::Relaxed);
        drop(queue);

        self.shared.available.notify_waiters();
        true
    }

    /// Close the channel. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        let mut queue = self.shared.queue.lock();
        if queue.closed {
            return false;
        }
        queue.closed = true;
        let buffered = queue.buffer.len();
        drop(queue);

        self.shared.available.notify_waiters();
        tracing::debug!(
            buffered,
            "Event channel closed after {} events",
            self.enqueued.load(Ordering::Relaxed)
        );
        true
    }

    pub fn is_closed(&self) -> bool {
        self.shared.queue.lock().closed
    }

    /// A new lazy consumer over the shared queue.
    ///
    /// Each poll suspends until an event is available or the channel is
    /// closed and drained, at which point the stream ends.
    pub fn consume(&self) -> EventStream {
        stream::unfold(self.shared.clone(), |shared| async move {
            let event = shared.recv().await?;
            Some((event, shared))
        })
        .boxed()
        .fuse()
    }

    /// Pop the next buffered event without suspending.
    ///
    /// Returns `None` when nothing is buffered right now.
    pub fn try_next(&self) -> Option<DirectoryChangeEvent> {
        self.shared.queue.lock().buffer.pop_front()
    }

    pub fn stats(&self) -> ChannelStats {
        let (buffered, closed) = {
            let queue = self.shared.queue.lock();
            (queue.buffer.len(), queue.closed)
        };
        ChannelStats {
            enqueued: self.enqueued.load(Ordering::Relaxed),
            rejected_after_close: self.rejected_after_close.load(Ordering::Relaxed),
            buffered,
            closed,
        }
    }
}

impl Default for EventChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EventChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventChannel")
            .field("stats", &self.stats())
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
