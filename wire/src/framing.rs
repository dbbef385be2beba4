//! Opcode framing: fixed, byte-prefixed and short-prefixed bodies.

use std::fmt;

use bytestream::ByteWriter;

use crate::error::{LimitKind, WireError, WireResult};
use crate::limits::Limits;
use crate::Opcode;

/// Framing strategy without the fixed length, as written in definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum FramingKind {
    Fixed,
    VariableByte,
    VariableShort,
}

impl fmt::Display for FramingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Fixed => "FIXED",
            Self::VariableByte => "VARIABLE_BYTE",
            Self::VariableShort => "VARIABLE_SHORT",
        };
        f.write_str(name)
    }
}

/// How the body length of a frame is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Framing {
    /// Body has exactly this many bytes; zero means opcode only.
    Fixed(usize),
    /// One unsigned length byte precedes the body.
    VariableByte,
    /// One unsigned big-endian length short precedes the body.
    VariableShort,
}

impl Framing {
    /// Returns the strategy without its length.
    #[must_use]
    pub const fn kind(self) -> FramingKind {
        match self {
            Self::Fixed(_) => FramingKind::Fixed,
            Self::VariableByte => FramingKind::VariableByte,
            Self::VariableShort => FramingKind::VariableShort,
        }
    }

    /// Number of length-prefix bytes between opcode and body.
    #[must_use]
    pub const fn prefix_len(self) -> usize {
        match self {
            Self::Fixed(_) => 0,
            Self::VariableByte => 1,
            Self::VariableShort => 2,
        }
    }

    /// Largest body this framing can describe.
    #[must_use]
    pub const fn max_body(self) -> usize {
        match self {
            Self::Fixed(len) => len,
            Self::VariableByte => u8::MAX as usize,
            Self::VariableShort => u16::MAX as usize,
        }
    }
}

impl fmt::Display for Framing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(len) => write!(f, "FIXED({len})"),
            other => write!(f, "{}", other.kind()),
        }
    }
}

/// Result of inspecting the bytes that follow an opcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameProbe {
    /// At least `needed` more bytes must arrive before the frame is complete.
    Incomplete { needed: usize },
    /// The frame is complete: `header_len` prefix bytes then `body_len` body bytes.
    Complete { header_len: usize, body_len: usize },
}

impl FrameProbe {
    /// Total bytes after the opcode for a complete frame.
    #[must_use]
    pub const fn frame_len(self) -> Option<usize> {
        match self {
            Self::Complete {
                header_len,
                body_len,
            } => Some(header_len + body_len),
            Self::Incomplete { .. } => None,
        }
    }
}

/// Inspects `buf` (the bytes after an opcode) for a complete frame.
///
/// A partial frame is not an error: the caller keeps the bytes and probes
/// again once more input arrives.
pub fn probe_frame(
    buf: &[u8],
    framing: Framing,
    limits: &Limits,
) -> WireResult<FrameProbe> {
    let header_len = framing.prefix_len();
    if buf.len() < header_len {
        return Ok(FrameProbe::Incomplete {
            needed: header_len - buf.len(),
        });
    }

    let body_len = match framing {
        Framing::Fixed(len) => len,
        Framing::VariableByte => usize::from(buf[0]),
        Framing::VariableShort => usize::from(u16::from_be_bytes([buf[0], buf[1]])),
    };
    check_body_limit(body_len, limits)?;

    let available = buf.len() - header_len;
    if available < body_len {
        return Ok(FrameProbe::Incomplete {
            needed: body_len - available,
        });
    }
    Ok(FrameProbe::Complete {
        header_len,
        body_len,
    })
}

/// Appends a complete frame (opcode, length prefix, body) to `out`.
///
/// Returns the number of bytes appended. Nothing is appended on error.
pub fn encode_frame(
    opcode: Opcode,
    framing: Framing,
    body: &[u8],
    limits: &Limits,
    out: &mut Vec<u8>,
) -> WireResult<usize> {
    match framing {
        Framing::Fixed(expected) if body.len() != expected => {
            return Err(WireError::FixedLengthMismatch {
                opcode,
                expected,
                actual: body.len(),
            });
        }
        Framing::VariableByte | Framing::VariableShort if body.len() > framing.max_body() => {
            return Err(WireError::BodyTooLarge {
                opcode,
                framing: framing.kind(),
                len: body.len(),
                max: framing.max_body(),
            });
        }
        _ => {}
    }
    check_body_limit(body.len(), limits)?;

    let mut writer = ByteWriter::with_capacity(1 + framing.prefix_len() + body.len());
    writer.put_u8(opcode);
    match framing {
        Framing::Fixed(_) => {}
        Framing::VariableByte => writer.put_u8(body.len() as u8),
        Framing::VariableShort => writer.put_u16(body.len() as u16),
    }
    writer.put_bytes(body);
    let written = writer.len();
    writer.finish_into(out);
    Ok(written)
}

fn check_body_limit(body_len: usize, limits: &Limits) -> WireResult<()> {
    if body_len > limits.max_frame_body {
        return Err(WireError::LimitsExceeded {
            kind: LimitKind::FrameBody,
            limit: limits.max_frame_body,
            actual: body_len,
        });
    }
    Ok(())
}
