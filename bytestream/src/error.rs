//! Error types for field-level reads and writes.

use crate::layout::{ByteOrder, DataType, Transform};

/// Result type for bytestream operations.
pub type StreamResult<T> = Result<T, StreamError>;

/// Errors that can occur while encoding or decoding a single field.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StreamError {
    /// Attempted to read past the end of the buffer.
    #[error("buffer underflow: requested {requested} bytes but only {available} available")]
    BufferUnderflow {
        /// Number of bytes requested.
        requested: usize,
        /// Number of bytes available.
        available: usize,
    },

    /// Value has no bit pattern in the field width.
    #[error("value {value} does not fit in a {data_type} field")]
    ValueOutOfRange { value: i64, data_type: DataType },

    /// Width, byte order and transform cannot be combined.
    #[error("byte order {order} with transform {transform} is not defined for {data_type}")]
    UnsupportedLayout {
        data_type: DataType,
        order: ByteOrder,
        transform: Transform,
    },

    /// Text contains a character outside the single-byte range.
    #[error("character {ch:?} cannot be encoded as a single byte")]
    UnencodableChar { ch: char },

    /// Text contains the terminator byte.
    #[error("text contains an embedded terminator at character {position}")]
    EmbeddedTerminator { position: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_underflow() {
        let err = StreamError::BufferUnderflow {
            requested: 4,
            available: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("underflow"));
        assert!(msg.contains('4'));
        assert!(msg.contains('1'));
    }

    #[test]
    fn error_display_out_of_range() {
        let err = StreamError::ValueOutOfRange {
            value: 300,
            data_type: DataType::Byte,
        };
        let msg = err.to_string();
        assert!(msg.contains("300"));
        assert!(msg.contains("BYTE"));
    }

    #[test]
    fn error_display_layout() {
        let err = StreamError::UnsupportedLayout {
            data_type: DataType::Short,
            order: ByteOrder::Middle,
            transform: Transform::None,
        };
        let msg = err.to_string();
        assert!(msg.contains("MIDDLE"));
        assert!(msg.contains("SHORT"));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_error<E: std::error::Error>() {}
        assert_error::<StreamError>();
    }
}
