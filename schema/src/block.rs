//! Update block specifications per entity kind.

use std::collections::HashMap;
use std::fmt;

use wire::{Framing, FramingKind, Opcode};

use crate::error::{SchemaError, SchemaResult, SpecIssue};
use crate::field::{FieldLayout, FieldSpec};

/// Entity kinds with their own block namespace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Player,
    Npc,
}

impl EntityKind {
    pub const ALL: [Self; 2] = [Self::Player, Self::Npc];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Player => "player",
            Self::Npc => "npc",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named, independently flaggable unit of entity state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BlockSpec {
    name: String,
    bit: u16,
    fields: Vec<FieldSpec>,
}

impl BlockSpec {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The single flag bit announcing this block.
    #[must_use]
    pub const fn bit(&self) -> u16 {
        self.bit
    }

    /// Fields written when the block is dirty. Empty for pure flags.
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Position of the named field.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }
}

/// The blocks of one entity kind, stored in application order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateBlockSet {
    kind: EntityKind,
    opcode: Opcode,
    large_opcode: Option<Opcode>,
    excess_mask: Option<u16>,
    framing: Framing,
    blocks: Vec<BlockSpec>,
    by_name: HashMap<String, usize>,
}

impl UpdateBlockSet {
    #[must_use]
    pub fn builder(kind: EntityKind, opcode: Opcode) -> UpdateBlockSetBuilder {
        UpdateBlockSetBuilder {
            kind,
            opcode,
            large_opcode: None,
            excess_mask: None,
            framing: FramingKind::VariableShort,
            blocks: Vec::new(),
            order: None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> EntityKind {
        self.kind
    }

    /// Opcode announcing an update whose mask fits one byte.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    #[must_use]
    pub const fn large_opcode(&self) -> Option<Opcode> {
        self.large_opcode
    }

    /// Bit in the low mask byte announcing a second mask byte.
    #[must_use]
    pub const fn excess_mask(&self) -> Option<u16> {
        self.excess_mask
    }

    #[must_use]
    pub const fn framing(&self) -> Framing {
        self.framing
    }

    /// Blocks in the order their bodies appear on the wire.
    #[must_use]
    pub fn blocks(&self) -> &[BlockSpec] {
        &self.blocks
    }

    /// Looks up a block and its position in application order.
    #[must_use]
    pub fn block(&self, name: &str) -> Option<(usize, &BlockSpec)> {
        let index = *self.by_name.get(name)?;
        Some((index, &self.blocks[index]))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Returns `true` if `mask` needs the second mask byte.
    #[must_use]
    pub const fn is_large(&self, mask: u16) -> bool {
        mask > 0xFF
    }

    /// Opcode announcing an update carrying `mask`.
    #[must_use]
    pub fn opcode_for(&self, mask: u16) -> Opcode {
        match self.large_opcode {
            Some(large) if self.is_large(mask) => large,
            _ => self.opcode,
        }
    }
}

/// Builder for [`UpdateBlockSet`].
#[derive(Debug, Clone)]
pub struct UpdateBlockSetBuilder {
    kind: EntityKind,
    opcode: Opcode,
    large_opcode: Option<Opcode>,
    excess_mask: Option<u32>,
    framing: FramingKind,
    blocks: Vec<(String, u32, Vec<FieldSpec>)>,
    order: Option<Vec<String>>,
}

impl UpdateBlockSetBuilder {
    #[must_use]
    pub fn large_opcode(mut self, opcode: Opcode) -> Self {
        self.large_opcode = Some(opcode);
        self
    }

    #[must_use]
    pub fn excess_mask(mut self, mask: u32) -> Self {
        self.excess_mask = Some(mask);
        self
    }

    #[must_use]
    pub fn framing(mut self, framing: FramingKind) -> Self {
        self.framing = framing;
        self
    }

    /// Adds a block. Without an explicit order, blocks apply in the order
    /// they are added.
    #[must_use]
    pub fn block(
        mut self,
        name: impl Into<String>,
        bit: u32,
        fields: impl IntoIterator<Item = FieldSpec>,
    ) -> Self {
        self.blocks.push((name.into(), bit, fields.into_iter().collect()));
        self
    }

    /// Sets the application order, a permutation of the block names.
    #[must_use]
    pub fn order<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.order = Some(names.into_iter().map(Into::into).collect());
        self
    }

    /// Validates bits, the excess mask and the order, then builds the set.
    pub fn build(self) -> SchemaResult<UpdateBlockSet> {
        let kind = self.kind;
        let set_error = |reason: SpecIssue| SchemaError::InvalidBlockSet { kind, reason };

        if self.framing == FramingKind::Fixed {
            return Err(set_error(SpecIssue::FixedUpdateFraming));
        }
        let framing = match self.framing {
            FramingKind::VariableByte => Framing::VariableByte,
            _ => Framing::VariableShort,
        };
        let excess_mask = match self.excess_mask {
            Some(mask) if mask.count_ones() != 1 || mask > 0x80 => {
                return Err(set_error(SpecIssue::InvalidExcessMask { mask }));
            }
            Some(mask) => Some(mask as u16),
            None => None,
        };
        if self.large_opcode.is_some() && excess_mask.is_none() {
            return Err(set_error(SpecIssue::LargeOpcodeWithoutMask));
        }

        let mut declared: Vec<BlockSpec> = Vec::with_capacity(self.blocks.len());
        for (name, bit, fields) in self.blocks {
            if declared.iter().any(|block| block.name == name) {
                return Err(set_error(SpecIssue::DuplicateBlock { name }));
            }
            let checked = check_bit(bit, excess_mask, &declared)
                .and_then(|bit| FieldLayout::of(&fields).map(|_| bit));
            match checked {
                Ok(bit) => declared.push(BlockSpec { name, bit, fields }),
                Err(reason) => return Err(SchemaError::InvalidBlock { kind, name, reason }),
            }
        }

        let blocks = match self.order {
            Some(order) => apply_order(declared, &order).map_err(set_error)?,
            None => declared,
        };
        let by_name = blocks
            .iter()
            .enumerate()
            .map(|(index, block)| (block.name.clone(), index))
            .collect();

        Ok(UpdateBlockSet {
            kind,
            opcode: self.opcode,
            large_opcode: self.large_opcode,
            excess_mask,
            framing,
            blocks,
            by_name,
        })
    }
}

fn check_bit(
    bit: u32,
    excess_mask: Option<u16>,
    declared: &[BlockSpec],
) -> Result<u16, SpecIssue> {
    if bit.count_ones() != 1 {
        return Err(SpecIssue::BitNotSingle { bit });
    }
    let bit = u16::try_from(bit).map_err(|_| SpecIssue::BitOutOfRange { bit })?;
    if Some(bit) == excess_mask {
        return Err(SpecIssue::BitIsExcessMask { bit });
    }
    if bit > 0xFF && excess_mask.is_none() {
        return Err(SpecIssue::MissingExcessMask { bit });
    }
    if let Some(other) = declared.iter().find(|block| block.bit == bit) {
        return Err(SpecIssue::DuplicateBit {
            bit,
            other: other.name.clone(),
        });
    }
    Ok(bit)
}

fn apply_order(
    mut declared: Vec<BlockSpec>,
    order: &[String],
) -> Result<Vec<BlockSpec>, SpecIssue> {
    let mut ordered = Vec::with_capacity(declared.len());
    for name in order {
        match declared.iter().position(|block| &block.name == name) {
            Some(index) => ordered.push(declared.swap_remove(index)),
            None if ordered.iter().any(|block: &BlockSpec| &block.name == name) => {
                return Err(SpecIssue::RepeatedOrderEntry { name: name.clone() });
            }
            None => return Err(SpecIssue::UnknownOrderEntry { name: name.clone() }),
        }
    }
    if let Some(missing) = declared.first() {
        return Err(SpecIssue::MissingOrderEntry {
            name: missing.name.clone(),
        });
    }
    Ok(ordered)
}

/// The player and NPC block sets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRegistry {
    player: UpdateBlockSet,
    npc: UpdateBlockSet,
}

impl BlockRegistry {
    /// Pairs the two sets. Each must have been built for its own kind.
    #[must_use]
    pub fn new(player: UpdateBlockSet, npc: UpdateBlockSet) -> Self {
        debug_assert_eq!(player.kind(), EntityKind::Player);
        debug_assert_eq!(npc.kind(), EntityKind::Npc);
        Self { player, npc }
    }

    #[must_use]
    pub const fn get(&self, kind: EntityKind) -> &UpdateBlockSet {
        match kind {
            EntityKind::Player => &self.player,
            EntityKind::Npc => &self.npc,
        }
    }

    #[must_use]
    pub const fn player(&self) -> &UpdateBlockSet {
        &self.player
    }

    #[must_use]
    pub const fn npc(&self) -> &UpdateBlockSet {
        &self.npc
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytestream::DataType;

    fn npc() -> UpdateBlockSetBuilder {
        UpdateBlockSet::builder(EntityKind::Npc, 65)
    }

    #[test]
    fn order_is_applied_not_bit_order() {
        let set = npc()
            .block("c", 0x01, [])
            .block("a", 0x40, [FieldSpec::int("id", DataType::Short)])
            .block("b", 0x08, [])
            .order(["a", "b", "c"])
            .build()
            .unwrap();
        let names: Vec<_> = set.blocks().iter().map(BlockSpec::name).collect();
        assert_eq!(names, ["a", "b", "c"]);
        assert_eq!(set.block("c").map(|(index, _)| index), Some(2));
        assert_eq!(set.block("a").unwrap().1.bit(), 0x40);
    }

    #[test]
    fn declaration_order_without_explicit_order() {
        let set = npc().block("x", 0x02, []).block("y", 0x01, []).build().unwrap();
        assert_eq!(set.blocks()[0].name(), "x");
    }

    #[test]
    fn bits_must_be_single_and_unique() {
        let err = npc().block("a", 0x03, []).build().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidBlock {
                reason: SpecIssue::BitNotSingle { bit: 3 },
                ..
            }
        ));

        let err = npc()
            .block("a", 0x04, [])
            .block("b", 0x04, [])
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("already used by a"));
    }

    #[test]
    fn wide_bits_need_excess_mask() {
        let err = npc().block("a", 0x100, []).build().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidBlock {
                reason: SpecIssue::MissingExcessMask { bit: 0x100 },
                ..
            }
        ));

        let err = npc().excess_mask(0x40).block("a", 0x40, []).build().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidBlock {
                reason: SpecIssue::BitIsExcessMask { bit: 0x40 },
                ..
            }
        ));

        let err = npc().block("a", 0x1_0000, []).build().unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidBlock {
                reason: SpecIssue::BitOutOfRange { .. },
                ..
            }
        ));
    }

    #[test]
    fn excess_mask_rules() {
        assert!(matches!(
            npc().excess_mask(0x100).build(),
            Err(SchemaError::InvalidBlockSet {
                reason: SpecIssue::InvalidExcessMask { mask: 0x100 },
                ..
            })
        ));
        assert!(matches!(
            npc().large_opcode(66).build(),
            Err(SchemaError::InvalidBlockSet {
                reason: SpecIssue::LargeOpcodeWithoutMask,
                ..
            })
        ));
    }

    #[test]
    fn large_opcode_selection() {
        let set = npc()
            .large_opcode(66)
            .excess_mask(0x80)
            .block("low", 0x01, [])
            .block("high", 0x200, [])
            .build()
            .unwrap();
        assert_eq!(set.opcode_for(0x01), 65);
        assert_eq!(set.opcode_for(0x281), 66);
        assert!(set.is_large(0x200));
    }

    #[test]
    fn order_must_be_a_permutation() {
        let base = || npc().block("a", 1, []).block("b", 2, []);
        assert!(matches!(
            base().order(["a"]).build(),
            Err(SchemaError::InvalidBlockSet {
                reason: SpecIssue::MissingOrderEntry { .. },
                ..
            })
        ));
        assert!(matches!(
            base().order(["a", "b", "a"]).build(),
            Err(SchemaError::InvalidBlockSet {
                reason: SpecIssue::RepeatedOrderEntry { .. },
                ..
            })
        ));
        assert!(matches!(
            base().order(["a", "z"]).build(),
            Err(SchemaError::InvalidBlockSet {
                reason: SpecIssue::UnknownOrderEntry { .. },
                ..
            })
        ));
    }

    #[test]
    fn fixed_framing_rejected() {
        assert!(matches!(
            npc().framing(FramingKind::Fixed).build(),
            Err(SchemaError::InvalidBlockSet {
                reason: SpecIssue::FixedUpdateFraming,
                ..
            })
        ));
    }
}
