//! Definition loading and validation errors.

use std::io;
use std::path::PathBuf;

use bytestream::StreamError;
use wire::Opcode;

use crate::block::EntityKind;
use crate::message::Direction;

/// Result type for schema operations.
pub type SchemaResult<T> = Result<T, SchemaError>;

/// Errors raised while building registries. All of them are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse {document} definitions: {source}")]
    Parse {
        document: &'static str,
        #[source]
        source: toml::de::Error,
    },

    #[error("{direction} message {name}: {reason}")]
    InvalidMessage {
        direction: Direction,
        name: String,
        reason: SpecIssue,
    },

    #[error("{kind} block {name}: {reason}")]
    InvalidBlock {
        kind: EntityKind,
        name: String,
        reason: SpecIssue,
    },

    #[error("{kind} update blocks: {reason}")]
    InvalidBlockSet { kind: EntityKind, reason: SpecIssue },

    #[error("{direction} opcode {opcode} is claimed by both {first} and {second}")]
    DuplicateOpcode {
        direction: Direction,
        opcode: Opcode,
        first: String,
        second: String,
    },

    #[error("{direction} message {name} is defined twice")]
    DuplicateMessage { direction: Direction, name: String },
}

/// What is wrong with a single message, block or block set.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SpecIssue {
    #[error("no opcode declared")]
    MissingOpcode,

    #[error("both opcode and opcodes are declared")]
    ConflictingOpcodes,

    #[error("opcode {opcode} is listed more than once")]
    RepeatedAlias { opcode: Opcode },

    #[error("outbound messages take exactly one opcode, found {count}")]
    OutboundAlias { count: usize },

    #[error("FIXED framing without a length")]
    MissingLength,

    #[error("length {length} is only meaningful for FIXED framing")]
    UnexpectedLength { length: usize },

    #[error("FIXED length cannot be derived from a variable-width field list")]
    UnderivableLength,

    #[error("declared length {declared} but fields occupy {fields} bytes")]
    LengthMismatch { declared: usize, fields: usize },

    #[error("field {field} is declared twice")]
    DuplicateField { field: String },

    #[error("field {field}: {source}")]
    Layout { field: String, source: StreamError },

    #[error("field {field}: byte order and transform apply to integers only")]
    NonIntegerLayout { field: String },

    #[error("more than one BYTES field")]
    MultipleBytes,

    #[error("field {field} follows a BYTES field but is not fixed width")]
    VariableAfterBytes { field: String },

    #[error("bit {bit:#x} is not a single set bit")]
    BitNotSingle { bit: u32 },

    #[error("bit {bit:#x} does not fit in 16 bits")]
    BitOutOfRange { bit: u32 },

    #[error("bit {bit:#x} is already used by {other}")]
    DuplicateBit { bit: u16, other: String },

    #[error("bit {bit:#x} collides with the excess mask")]
    BitIsExcessMask { bit: u16 },

    #[error("bit {bit:#x} needs a second mask byte but no excess mask is declared")]
    MissingExcessMask { bit: u16 },

    #[error("excess mask {mask:#x} must be a single bit in the low byte")]
    InvalidExcessMask { mask: u32 },

    #[error("large opcode declared without an excess mask")]
    LargeOpcodeWithoutMask,

    #[error("update frames cannot use FIXED framing")]
    FixedUpdateFraming,

    #[error("block {name} is declared twice")]
    DuplicateBlock { name: String },

    #[error("order names unknown block {name}")]
    UnknownOrderEntry { name: String },

    #[error("order lists block {name} more than once")]
    RepeatedOrderEntry { name: String },

    #[error("block {name} is missing from the order")]
    MissingOrderEntry { name: String },
}
