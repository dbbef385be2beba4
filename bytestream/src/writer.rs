//! Byte writer for encoding wire fields.

use crate::error::{StreamError, StreamResult};
use crate::layout::{validate_layout, ByteOrder, DataType, Transform};

/// A growable writer for wire fields.
///
/// Writes are accumulated in an internal buffer. Call [`finish`](Self::finish)
/// to get the final byte buffer. A failed write leaves the buffer unchanged.
#[derive(Debug, Default, Clone)]
pub struct ByteWriter {
    bytes: Vec<u8>,
}

impl ByteWriter {
    /// Creates a new empty `ByteWriter`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new `ByteWriter` with pre-allocated capacity.
    #[must_use]
    pub fn with_capacity(bytes: usize) -> Self {
        Self {
            bytes: Vec::with_capacity(bytes),
        }
    }

    /// Returns the number of bytes written so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if nothing has been written.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes written so far.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.bytes
    }

    /// Discards everything written, keeping the allocation.
    pub fn clear(&mut self) {
        self.bytes.clear();
    }

    /// Writes an integer with the given width, byte order and transform.
    ///
    /// The transform applies to the least significant byte wherever the byte
    /// order places it.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnsupportedLayout`] for an undefined combination
    /// and [`StreamError::ValueOutOfRange`] if `value` doesn't fit the width.
    pub fn put(
        &mut self,
        data_type: DataType,
        order: ByteOrder,
        transform: Transform,
        value: i64,
    ) -> StreamResult<()> {
        validate_layout(data_type, order, transform)?;
        if !data_type.fits(value) {
            return Err(StreamError::ValueOutOfRange { value, data_type });
        }

        let width = data_type.width();
        let mut natural = [0u8; 4];
        for (i, byte) in natural[..width].iter_mut().enumerate() {
            *byte = (value >> (8 * (width - 1 - i))) as u8;
        }
        natural[width - 1] = transform.encode(natural[width - 1]);

        for i in 0..width {
            self.bytes.push(natural[order.natural_index(width, i)]);
        }
        Ok(())
    }

    /// Writes a plain byte.
    pub fn put_u8(&mut self, value: u8) {
        self.bytes.push(value);
    }

    /// Writes a plain big-endian `u16`.
    pub fn put_u16(&mut self, value: u16) {
        self.bytes.extend_from_slice(&value.to_be_bytes());
    }

    /// Writes raw bytes.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Writes terminated single-byte text.
    ///
    /// # Errors
    ///
    /// Returns [`StreamError::UnencodableChar`] for characters above U+00FF
    /// and [`StreamError::EmbeddedTerminator`] for U+0000.
    pub fn put_string(&mut self, text: &str) -> StreamResult<()> {
        for (position, ch) in text.chars().enumerate() {
            if ch == '\0' {
                return Err(StreamError::EmbeddedTerminator { position });
            }
            if u8::try_from(u32::from(ch)).is_err() {
                return Err(StreamError::UnencodableChar { ch });
            }
        }
        self.bytes.extend(text.chars().map(|ch| u32::from(ch) as u8));
        self.bytes.push(0);
        Ok(())
    }

    /// Finishes writing and returns the byte buffer.
    #[must_use]
    pub fn finish(self) -> Vec<u8> {
        self.bytes
    }

    /// Finishes writing and appends to the provided buffer.
    pub fn finish_into(mut self, buf: &mut Vec<u8>) {
        buf.append(&mut self.bytes);
    }
}
