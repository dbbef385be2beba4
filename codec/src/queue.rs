//! Bounded hand-off of decoded messages to the tick.
//!
//! Network threads decode and push; the tick drains. Pushing never blocks:
//! a full queue rejects the message instead of stalling a connection.

use crossbeam_channel::{bounded, Receiver, Sender, TryRecvError, TrySendError};
use tracing::warn;

use crate::error::QueueError;
use crate::message::Message;
use crate::types::ConnectionId;

/// Inbound queue sizing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct QueueConfig {
    /// Messages buffered across all connections between two ticks.
    pub capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self { capacity: 10_000 }
    }
}

impl QueueConfig {
    #[must_use]
    pub const fn for_testing() -> Self {
        Self { capacity: 8 }
    }
}

/// A decoded message tagged with its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inbound {
    pub connection: ConnectionId,
    pub message: Message,
}

/// Creates a bounded inbound queue.
#[must_use]
pub fn inbound_queue(config: &QueueConfig) -> (InboundSender, InboundReceiver) {
    let (tx, rx) = bounded(config.capacity);
    (InboundSender { tx }, InboundReceiver { rx })
}

/// Network-side handle. Cheap to clone, one per connection task.
#[derive(Debug, Clone)]
pub struct InboundSender {
    tx: Sender<Inbound>,
}

impl InboundSender {
    /// Queues a message without blocking.
    pub fn try_send(&self, connection: ConnectionId, message: Message) -> Result<(), QueueError> {
        match self.tx.try_send(Inbound {
            connection,
            message,
        }) {
            Ok(()) => Ok(()),
            Err(TrySendError::Full(inbound)) => {
                warn!(
                    connection = %inbound.connection,
                    name = inbound.message.name(),
                    "inbound queue full, message rejected"
                );
                Err(QueueError::Full)
            }
            Err(TrySendError::Disconnected(_)) => Err(QueueError::Disconnected),
        }
    }
}

/// Tick-side handle.
#[derive(Debug)]
pub struct InboundReceiver {
    rx: Receiver<Inbound>,
}

impl InboundReceiver {
    /// Moves up to `max` queued messages into `out`, oldest first.
    pub fn drain_into(&self, max: usize, out: &mut Vec<Inbound>) -> usize {
        let mut drained = 0;
        while drained < max {
            match self.rx.try_recv() {
                Ok(inbound) => {
                    out.push(inbound);
                    drained += 1;
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => break,
            }
        }
        drained
    }

    /// Takes up to `max` queued messages, oldest first.
    #[must_use]
    pub fn drain(&self, max: usize) -> Vec<Inbound> {
        let mut out = Vec::with_capacity(max.min(self.rx.len()));
        self.drain_into(max, &mut out);
        out
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
