//! Entity update frame layout.
//!
//! Body: entity index (big-endian short), flag mask, then block bodies in
//! application order. A mask above one byte is written low byte first with
//! the excess bit set in the low byte, under the large opcode if declared.

use bytestream::ByteWriter;
use schema::UpdateBlockSet;
use wire::{encode_frame, Limits};

use crate::error::{SyncError, SyncResult};
use crate::types::EntityKey;

/// Appends one complete update frame to `out`, returning its length.
pub fn encode_update(
    set: &UpdateBlockSet,
    entity: EntityKey,
    mask: u16,
    blocks: &[u8],
    limits: &Limits,
    out: &mut Vec<u8>,
) -> SyncResult<usize> {
    let mut body = ByteWriter::with_capacity(4 + blocks.len());
    body.put_u16(entity.index);
    write_mask(set, mask, &mut body);
    body.put_bytes(blocks);

    encode_frame(
        set.opcode_for(mask),
        set.framing(),
        body.as_slice(),
        limits,
        out,
    )
    .map_err(|source| SyncError::Frame { entity, source })
}

/// Writes the flag mask in one or two bytes.
pub fn write_mask(set: &UpdateBlockSet, mask: u16, writer: &mut ByteWriter) {
    let [high, low] = mask.to_be_bytes();
    match set.excess_mask() {
        Some(excess) if set.is_large(mask) => {
            writer.put_u8(low | excess as u8);
            writer.put_u8(high);
        }
        _ => writer.put_u8(low),
    }
}
