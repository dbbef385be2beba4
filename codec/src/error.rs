//! Error types for message encoding and dispatch.

use bytestream::StreamError;
use schema::FieldKind;
use wire::{Opcode, WireError};

/// Result type for codec operations.
pub type CodecResult<T> = Result<T, CodecError>;

/// Errors that can occur while encoding or decoding messages.
///
/// [`UnknownOpcode`](Self::UnknownOpcode),
/// [`FrameTooLarge`](Self::FrameTooLarge) and
/// [`PendingOverflow`](Self::PendingOverflow) are fatal to a connection.
/// Everything else is scoped to one message.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CodecError {
    #[error(transparent)]
    Wire(#[from] WireError),

    /// No inbound specification claims the opcode; the stream cannot be
    /// realigned.
    #[error("unknown opcode {opcode}")]
    UnknownOpcode { opcode: Opcode },

    #[error("opcode {opcode} announces a {len} byte body, limit is {max}")]
    FrameTooLarge { opcode: Opcode, len: usize, max: usize },

    #[error("{actual} bytes pending without a complete frame, limit is {limit}")]
    PendingOverflow { limit: usize, actual: usize },

    #[error("no outbound message named {name}")]
    UnknownMessage { name: String },

    #[error("message {message} has no value for field {field}")]
    MissingField { message: String, field: String },

    #[error("message {message} has no field {field}")]
    UnknownField { message: String, field: String },

    #[error("field {field} expects a {expected} value")]
    FieldShape { field: String, expected: FieldKind },

    #[error("field {field}: {source}")]
    Field { field: String, source: StreamError },

    #[error("{remaining} bytes left after the last field")]
    TrailingBytes { remaining: usize },

    #[error("expected message {expected}, got {found}")]
    UnexpectedMessage {
        expected: &'static str,
        found: String,
    },

    #[error("value {value} is out of range for {field}")]
    ValueOutOfRange { field: &'static str, value: i64 },

    /// A raw field whose length is not a whole number of records.
    #[error("field {field} holds {len} bytes, not a multiple of {record}")]
    FieldLength {
        field: &'static str,
        len: usize,
        record: usize,
    },
}

impl CodecError {
    /// Returns `true` if the error leaves the connection's stream unusable.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::UnknownOpcode { .. } | Self::FrameTooLarge { .. } | Self::PendingOverflow { .. }
        )
    }
}

/// Errors from the inbound tick queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum QueueError {
    /// The queue is at capacity; the message was not queued.
    #[error("inbound queue is full")]
    Full,

    /// The tick side has gone away.
    #[error("inbound queue is disconnected")]
    Disconnected,
}
