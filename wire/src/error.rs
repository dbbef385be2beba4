//! Error types for frame encoding and decoding.

use crate::framing::FramingKind;
use crate::Opcode;

/// Result type for wire operations.
pub type WireResult<T> = Result<T, WireError>;

/// Errors raised while framing or unframing a message body.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum WireError {
    /// A fixed-length body does not have its declared length.
    #[error("opcode {opcode}: fixed body must be {expected} bytes, got {actual}")]
    FixedLengthMismatch {
        opcode: Opcode,
        expected: usize,
        actual: usize,
    },

    /// A body is too long for its length prefix.
    #[error("opcode {opcode}: {len}-byte body does not fit a {framing} prefix (max {max})")]
    BodyTooLarge {
        opcode: Opcode,
        framing: FramingKind,
        len: usize,
        max: usize,
    },

    /// A configured limit was exceeded.
    #[error("{kind} limit exceeded: {actual} > {limit}")]
    LimitsExceeded {
        kind: LimitKind,
        limit: usize,
        actual: usize,
    },
}

/// Specific wire limits that can be exceeded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitKind {
    FrameBody,
    PendingBytes,
}

impl std::fmt::Display for LimitKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::FrameBody => "frame body",
            Self::PendingBytes => "pending bytes",
        };
        write!(f, "{name}")
    }
}
