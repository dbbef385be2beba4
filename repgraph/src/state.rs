//! Per-entity dirty block state.

use bytestream::ByteWriter;
use codec::{encode_fields, CodecError, FieldValue};
use schema::UpdateBlockSet;

use crate::error::{SyncError, SyncResult};

/// Dirty blocks accumulated for one entity since its last flush.
///
/// Block bodies are encoded when marked, so encoding errors reach the caller
/// that supplied the values. Marking a block again replaces its body.
#[derive(Debug, Clone, Default)]
pub struct UpdateState {
    mask: u16,
    /// Encoded bodies by application position; only dirty slots are read.
    bodies: Vec<Vec<u8>>,
}

impl UpdateState {
    #[must_use]
    pub fn new(set: &UpdateBlockSet) -> Self {
        Self {
            mask: 0,
            bodies: vec![Vec::new(); set.len()],
        }
    }

    /// Flag bits of every dirty block.
    #[must_use]
    pub const fn mask(&self) -> u16 {
        self.mask
    }

    #[must_use]
    pub const fn is_dirty(&self) -> bool {
        self.mask != 0
    }

    /// Flags `block` dirty with the given field values.
    pub fn mark_dirty(
        &mut self,
        set: &UpdateBlockSet,
        block: &str,
        values: &[FieldValue],
    ) -> SyncResult<()> {
        let (position, spec) = set.block(block).ok_or_else(|| SyncError::UnknownBlock {
            kind: set.kind(),
            block: block.to_owned(),
        })?;
        let block_error = |source: CodecError| SyncError::Block {
            block: block.to_owned(),
            source,
        };
        if values.len() != spec.fields().len() {
            let field = spec
                .fields()
                .get(values.len())
                .map_or_else(String::new, |field| field.name.clone());
            return Err(block_error(CodecError::MissingField {
                message: block.to_owned(),
                field,
            }));
        }

        let mut writer = ByteWriter::new();
        encode_fields(spec.fields(), values, &mut writer).map_err(block_error)?;
        if self.bodies.len() < set.len() {
            self.bodies.resize(set.len(), Vec::new());
        }
        self.bodies[position] = writer.finish();
        self.mask |= spec.bit();
        Ok(())
    }

    /// Appends dirty bodies in application order to `out`, resets the state
    /// and returns the mask that was drained.
    pub fn drain_dirty(&mut self, set: &UpdateBlockSet, out: &mut Vec<u8>) -> u16 {
        let mask = self.mask;
        if mask == 0 {
            return 0;
        }
        for (block, body) in set.blocks().iter().zip(&mut self.bodies) {
            if mask & block.bit() != 0 {
                out.append(body);
            }
        }
        self.mask = 0;
        mask
    }
}
