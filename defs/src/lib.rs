//! Bundled protocol definitions.
//!
//! `data/messages.toml` and `data/blocks.toml` are compiled into the crate;
//! [`load`] validates them into [`ProtocolDefs`]. Typed wrappers in
//! [`inbound`], [`outbound`] and [`blocks`] convert between game-side
//! structs and generic messages or block values.

pub mod blocks;
pub mod inbound;
pub mod outbound;

use schema::{ProtocolDefs, SchemaResult};

/// Message definitions document.
pub const MESSAGES: &str = include_str!("../data/messages.toml");

/// Update block definitions document.
pub const BLOCKS: &str = include_str!("../data/blocks.toml");

/// Loads the bundled definitions.
pub fn load() -> SchemaResult<ProtocolDefs> {
    ProtocolDefs::from_toml_strs(MESSAGES, BLOCKS)
}
