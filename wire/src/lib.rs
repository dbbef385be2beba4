//! Opcode framing for the tickwire codec.
//!
//! Every message on the wire is an opcode byte followed by a body whose
//! length is fixed, prefixed by one unsigned byte, or prefixed by one
//! unsigned big-endian short. This crate frames and unframes bodies; it does
//! not know which opcode means what.
//!
//! # Design Principles
//!
//! - **Stable wire format** - Frame layout is dictated by the remote client.
//! - **Bounded decoding** - Length prefixes are checked against [`Limits`] before buffering.
//! - **Partial input is normal** - [`probe_frame`] reports how many bytes are still missing.

mod error;
mod framing;
mod limits;

pub use error::{LimitKind, WireError, WireResult};
pub use framing::{encode_frame, probe_frame, FrameProbe, Framing, FramingKind};
pub use limits::Limits;

/// Leading identifier byte of every frame.
pub type Opcode = u8;
