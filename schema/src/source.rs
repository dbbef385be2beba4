//! TOML definition documents.
//!
//! Messages:
//!
//! ```toml
//! [[inbound]]
//! name = "walk"
//! opcode = 164
//! framing = "VARIABLE_BYTE"
//! fields = [
//!     { name = "x", type = "SHORT", order = "LITTLE", transform = "ADD" },
//!     { name = "run", type = "BYTE", transform = "NEGATE" },
//! ]
//! ```
//!
//! Blocks, one table per entity kind:
//!
//! ```toml
//! [npc]
//! opcode = 65
//! order = ["animation", "hit"]
//!
//! [[npc.blocks]]
//! name = "animation"
//! bit = 0x10
//! fields = [{ name = "id", type = "SHORT", order = "LITTLE" }]
//! ```

use bytestream::{ByteOrder, DataType, Signedness, Transform};
use serde::Deserialize;
use wire::{FramingKind, Opcode};

use crate::block::{BlockRegistry, EntityKind, UpdateBlockSet};
use crate::error::{SchemaError, SchemaResult, SpecIssue};
use crate::field::{FieldKind, FieldSpec};
use crate::message::{Direction, MessageRegistry, MessageSpec};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct MessagesDocument {
    #[serde(default)]
    inbound: Vec<RawMessage>,
    #[serde(default)]
    outbound: Vec<RawMessage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawMessage {
    name: String,
    opcode: Option<Opcode>,
    opcodes: Option<Vec<Opcode>>,
    #[serde(default = "default_message_framing")]
    framing: FramingKind,
    /// Negative values mean "unspecified".
    length: Option<i64>,
    #[serde(default)]
    ignored: bool,
    #[serde(default)]
    fields: Vec<RawField>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawField {
    name: String,
    #[serde(rename = "type")]
    kind: RawFieldKind,
    #[serde(default)]
    order: ByteOrder,
    #[serde(default)]
    sign: Signedness,
    #[serde(default)]
    transform: Transform,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum RawFieldKind {
    Byte,
    Short,
    Medium,
    Int,
    Bytes,
    String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct BlocksDocument {
    player: RawBlockSet,
    npc: RawBlockSet,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawBlockSet {
    opcode: Opcode,
    large_opcode: Option<Opcode>,
    excess_mask: Option<u32>,
    #[serde(default = "default_update_framing")]
    framing: FramingKind,
    order: Option<Vec<String>>,
    #[serde(default)]
    blocks: Vec<RawBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
struct RawBlock {
    name: String,
    bit: u32,
    #[serde(default)]
    fields: Vec<RawField>,
}

const fn default_message_framing() -> FramingKind {
    FramingKind::Fixed
}

const fn default_update_framing() -> FramingKind {
    FramingKind::VariableShort
}

impl From<RawField> for FieldSpec {
    fn from(raw: RawField) -> Self {
        let kind = match raw.kind {
            RawFieldKind::Byte => FieldKind::Int(DataType::Byte),
            RawFieldKind::Short => FieldKind::Int(DataType::Short),
            RawFieldKind::Medium => FieldKind::Int(DataType::Medium),
            RawFieldKind::Int => FieldKind::Int(DataType::Int),
            RawFieldKind::Bytes => FieldKind::Bytes,
            RawFieldKind::String => FieldKind::String,
        };
        Self {
            name: raw.name,
            kind,
            order: raw.order,
            sign: raw.sign,
            transform: raw.transform,
        }
    }
}

impl RawMessage {
    fn into_spec(self, direction: Direction) -> SchemaResult<MessageSpec> {
        let opcodes = match (self.opcode, self.opcodes) {
            (Some(_), Some(_)) => {
                return Err(SchemaError::InvalidMessage {
                    direction,
                    name: self.name,
                    reason: SpecIssue::ConflictingOpcodes,
                });
            }
            (Some(opcode), None) => vec![opcode],
            (None, Some(opcodes)) => opcodes,
            (None, None) => Vec::new(),
        };
        let length = self.length.and_then(|length| usize::try_from(length).ok());

        MessageSpec::builder(self.name, direction)
            .opcodes(opcodes)
            .framing(self.framing, length)
            .fields(self.fields.into_iter().map(FieldSpec::from))
            .ignored(self.ignored)
            .build()
    }
}

impl RawBlockSet {
    fn into_set(self, kind: EntityKind) -> SchemaResult<UpdateBlockSet> {
        let mut builder = UpdateBlockSet::builder(kind, self.opcode).framing(self.framing);
        if let Some(opcode) = self.large_opcode {
            builder = builder.large_opcode(opcode);
        }
        if let Some(mask) = self.excess_mask {
            builder = builder.excess_mask(mask);
        }
        for block in self.blocks {
            builder = builder.block(
                block.name,
                block.bit,
                block.fields.into_iter().map(FieldSpec::from),
            );
        }
        if let Some(order) = self.order {
            builder = builder.order(order);
        }
        builder.build()
    }
}

impl MessageRegistry {
    /// Parses and validates a message definition document.
    pub fn from_toml_str(text: &str) -> SchemaResult<Self> {
        let document: MessagesDocument =
            toml::from_str(text).map_err(|source| SchemaError::Parse {
                document: "message",
                source,
            })?;
        let inbound = document
            .inbound
            .into_iter()
            .map(|raw| raw.into_spec(Direction::Inbound));
        let outbound = document
            .outbound
            .into_iter()
            .map(|raw| raw.into_spec(Direction::Outbound));
        let specs = inbound.chain(outbound).collect::<SchemaResult<Vec<_>>>()?;
        Self::new(specs)
    }
}

impl BlockRegistry {
    /// Parses and validates an update block definition document.
    pub fn from_toml_str(text: &str) -> SchemaResult<Self> {
        let document: BlocksDocument =
            toml::from_str(text).map_err(|source| SchemaError::Parse {
                document: "block",
                source,
            })?;
        Ok(Self::new(
            document.player.into_set(EntityKind::Player)?,
            document.npc.into_set(EntityKind::Npc)?,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wire::Framing;

    #[test]
    fn parses_messages_with_defaults() {
        let registry = MessageRegistry::from_toml_str(
            r#"
            [[inbound]]
            name = "walk"
            opcode = 164
            framing = "VARIABLE_BYTE"
            fields = [
                { name = "x", type = "SHORT", order = "LITTLE", transform = "ADD" },
                { name = "run", type = "BYTE", sign = "UNSIGNED", transform = "NEGATE" },
            ]

            [[inbound]]
            name = "button"
            opcodes = [10, 20]
            length = 2
            fields = [{ name = "widget", type = "SHORT" }]

            [[outbound]]
            name = "logout"
            opcode = 86
            length = 0
            "#,
        )
        .unwrap();

        let walk = registry.inbound(164).unwrap();
        assert_eq!(walk.framing(), Framing::VariableByte);
        assert_eq!(walk.fields()[0].order, ByteOrder::Little);
        assert_eq!(walk.fields()[1].sign, Signedness::Unsigned);
        assert_eq!(walk.fields()[1].transform, Transform::Negate);

        let button = registry.inbound(20).unwrap();
        assert_eq!(button.framing(), Framing::Fixed(2));
        assert_eq!(button.fields()[0].sign, Signedness::Signed);

        assert_eq!(registry.outbound("logout").unwrap().framing(), Framing::Fixed(0));
    }

    #[test]
    fn negative_length_means_unspecified() {
        let err = MessageRegistry::from_toml_str(
            r#"
            [[inbound]]
            name = "mystery"
            opcode = 77
            length = -1
            "#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            SchemaError::InvalidMessage {
                reason: SpecIssue::MissingLength,
                ..
            }
        ));

        let registry = MessageRegistry::from_toml_str(
            r#"
            [[inbound]]
            name = "mystery"
            opcode = 77
            length = -1
            ignored = true
            fields = [{ name = "a", type = "INT" }, { name = "b", type = "BYTE" }]
            "#,
        )
        .unwrap();
        assert_eq!(registry.inbound(77).unwrap().framing(), Framing::Fixed(5));
    }

    #[test]
    fn opcode_and_opcodes_conflict() {
        let err = MessageRegistry::from_toml_str(
            r#"
            [[inbound]]
            name = "twice"
            opcode = 1
            opcodes = [2]
            length = 0
            "#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("twice"));
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = MessageRegistry::from_toml_str(
            r#"
            [[inbound]]
            name = "typo"
            opcode = 1
            lenght = 0
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Parse { .. }));
    }

    #[test]
    fn bad_token_rejected() {
        let err = MessageRegistry::from_toml_str(
            r#"
            [[inbound]]
            name = "walk"
            opcode = 1
            framing = "VARIABLE_LONG"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Parse { .. }));
    }

    #[test]
    fn parses_blocks() {
        let registry = BlockRegistry::from_toml_str(
            r#"
            [player]
            opcode = 81
            excess-mask = 0x40
            order = ["chat", "anim"]

            [[player.blocks]]
            name = "anim"
            bit = 0x8
            fields = [{ name = "id", type = "SHORT", order = "LITTLE" }]

            [[player.blocks]]
            name = "chat"
            bit = 0x80
            fields = [{ name = "text", type = "STRING" }]

            [npc]
            opcode = 65
            framing = "VARIABLE_BYTE"

            [[npc.blocks]]
            name = "hit"
            bit = 0x40
            "#,
        )
        .unwrap();

        let player = registry.get(EntityKind::Player);
        assert_eq!(player.excess_mask(), Some(0x40));
        assert_eq!(player.blocks()[0].name(), "chat");
        assert_eq!(player.framing(), Framing::VariableShort);
        let npc = registry.npc();
        assert_eq!(npc.framing(), Framing::VariableByte);
        assert!(npc.block("hit").unwrap().1.fields().is_empty());
    }

    #[test]
    fn missing_kind_rejected() {
        let err = BlockRegistry::from_toml_str("[player]\nopcode = 81\n").unwrap_err();
        assert!(matches!(err, SchemaError::Parse { document: "block", .. }));
    }
}
