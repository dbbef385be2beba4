//! Byte reader with bounded operations.

use crate::error::{StreamError, StreamResult};
use crate::layout::{validate_layout, ByteOrder, DataType, Signedness, Transform};

/// A cursor for decoding wire fields.
///
/// All read operations are bounds-checked and return errors on failure.
/// A failed read does not advance the cursor.
#[derive(Debug, Clone)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    /// Creates a new `ByteReader` from a byte slice.
    #[must_use]
    pub const fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Returns the number of bytes remaining to read.
    #[must_use]
    pub const fn remaining(&self) -> usize {
        self.data.len().saturating_sub(self.pos)
    }

    /// Returns `true` if there are no more bytes to read.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current byte position.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn take(&mut self, count: usize) -> StreamResult<&'a [u8]> {
        let available = self.remaining();
        if count > available {
            return Err(StreamError::BufferUnderflow {
                requested: count,
                available,
            });
        }
        let slice = &self.data[self.pos..self.pos + count];
        self.pos += count;
        Ok(slice)
    }

    /// Reads an integer with the given width, byte order, transform and
    /// signedness.
    pub fn get(
        &mut self,
        data_type: DataType,
        order: ByteOrder,
        transform: Transform,
        sign: Signedness,
    ) -> StreamResult<i64> {
        validate_layout(data_type, order, transform)?;
        let width = data_type.width();
        let wire = self.take(width)?;

        let mut natural = [0u8; 4];
        for (i, byte) in wire.iter().enumerate() {
            natural[order.natural_index(width, i)] = *byte;
        }
        natural[width - 1] = transform.decode(natural[width - 1]);

        let raw = natural[..width]
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | u64::from(*byte));
        Ok(sign.extend(raw, data_type))
    }

    /// Reads a plain byte.
    pub fn get_u8(&mut self) -> StreamResult<u8> {
        Ok(self.take(1)?[0])
    }

    /// Reads a plain big-endian `u16`.
    pub fn get_u16(&mut self) -> StreamResult<u16> {
        let bytes = self.take(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    /// Reads exactly `count` raw bytes.
    pub fn get_bytes(&mut self, count: usize) -> StreamResult<&'a [u8]> {
        self.take(count)
    }

    /// Reads every remaining byte.
    pub fn get_remaining(&mut self) -> &'a [u8] {
        let slice = &self.data[self.pos..];
        self.pos = self.data.len();
        slice
    }

    /// Skips `count` bytes.
    pub fn skip(&mut self, count: usize) -> StreamResult<()> {
        self.take(count).map(|_| ())
    }

    /// Reads single-byte text up to and including the terminator.
    ///
    /// Input that ends before a terminator yields whatever was read, so an
    /// exhausted reader decodes to empty text.
    pub fn get_string(&mut self) -> String {
        let rest = &self.data[self.pos..];
        let (text, consumed) = match rest.iter().position(|byte| *byte == 0) {
            Some(end) => (&rest[..end], end + 1),
            None => (rest, rest.len()),
        };
        self.pos += consumed;
        text.iter().map(|byte| char::from(*byte)).collect()
    }
}
