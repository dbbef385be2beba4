//! Message and update-block registries for the tickwire codec.
//!
//! This crate turns declarative definitions into immutable lookup tables:
//! - [`MessageRegistry`]: inbound messages by opcode (with aliases),
//!   outbound messages by kind name
//! - [`BlockRegistry`]: per entity kind, update blocks in application order
//! - Deterministic fingerprinting of the loaded tables
//!
//! # Design Principles
//!
//! - **Fail at startup** - Every authoring error is caught while loading, never per message.
//! - **Immutable after load** - Registries hand out shared, read-only specifications.
//! - **Errors name the culprit** - Each load error carries the message or block name.

mod block;
mod error;
mod field;
mod hash;
mod message;
mod source;

use std::fs;
use std::path::Path;

use tracing::info;

pub use block::{BlockRegistry, BlockSpec, EntityKind, UpdateBlockSet, UpdateBlockSetBuilder};
pub use error::{SchemaError, SchemaResult, SpecIssue};
pub use field::{trailing_width, FieldKind, FieldLayout, FieldSpec};
pub use hash::fingerprint;
pub use message::{Direction, MessageRegistry, MessageSpec, MessageSpecBuilder};
pub use wire::{Framing, FramingKind, Opcode};

/// Both registries, loaded together.
#[derive(Debug, Clone)]
pub struct ProtocolDefs {
    pub messages: MessageRegistry,
    pub blocks: BlockRegistry,
}

impl ProtocolDefs {
    /// Parses and validates both definition documents.
    pub fn from_toml_strs(messages: &str, blocks: &str) -> SchemaResult<Self> {
        let defs = Self {
            messages: MessageRegistry::from_toml_str(messages)?,
            blocks: BlockRegistry::from_toml_str(blocks)?,
        };
        info!(
            inbound = defs.messages.len(Direction::Inbound),
            outbound = defs.messages.len(Direction::Outbound),
            player_blocks = defs.blocks.player().len(),
            npc_blocks = defs.blocks.npc().len(),
            fingerprint = %format!("{:016x}", defs.fingerprint()),
            "loaded protocol definitions"
        );
        Ok(defs)
    }

    /// Reads both definition files and loads them.
    pub fn from_paths(messages: &Path, blocks: &Path) -> SchemaResult<Self> {
        let read = |path: &Path| {
            fs::read_to_string(path).map_err(|source| SchemaError::Io {
                path: path.to_path_buf(),
                source,
            })
        };
        Self::from_toml_strs(&read(messages)?, &read(blocks)?)
    }

    /// Deterministic fingerprint of both registries.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        fingerprint(&self.messages, &self.blocks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MESSAGES: &str = r#"
        [[inbound]]
        name = "idle"
        opcode = 0
        length = 0

        [[outbound]]
        name = "logout"
        opcode = 86
        length = 0
    "#;

    const BLOCKS: &str = r#"
        [player]
        opcode = 81

        [npc]
        opcode = 65
    "#;

    #[test]
    fn loads_both_documents() {
        let defs = ProtocolDefs::from_toml_strs(MESSAGES, BLOCKS).unwrap();
        assert!(defs.messages.inbound(0).is_some());
        assert!(defs.blocks.player().is_empty());
        assert_eq!(
            defs.fingerprint(),
            ProtocolDefs::from_toml_strs(MESSAGES, BLOCKS)
                .unwrap()
                .fingerprint()
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = ProtocolDefs::from_paths(
            Path::new("/nonexistent/messages.toml"),
            Path::new("/nonexistent/blocks.toml"),
        )
        .unwrap_err();
        assert!(err.to_string().contains("/nonexistent/messages.toml"));
    }
}
