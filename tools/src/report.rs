//! Serializable reports for loaded definitions and decoded captures.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::Arc;

use codec::{ConnectionId, Dispatch, FieldValue, InboundDecoder};
use schema::{Direction, EntityKind, MessageRegistry, ProtocolDefs};
use serde::Serialize;
use wire::Limits;

/// Bytes handed to the decoder per call, like reads off a socket.
const FEED_CHUNK: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    pub inbound: usize,
    pub outbound: usize,
    pub ignored: Vec<String>,
    pub player_blocks: Vec<String>,
    pub npc_blocks: Vec<String>,
    pub fingerprint: String,
}

impl CheckReport {
    #[must_use]
    pub fn new(defs: &ProtocolDefs) -> Self {
        let block_names = |kind: EntityKind| -> Vec<String> {
            defs.blocks
                .get(kind)
                .blocks()
                .iter()
                .map(|block| block.name().to_owned())
                .collect()
        };
        Self {
            inbound: defs.messages.len(Direction::Inbound),
            outbound: defs.messages.len(Direction::Outbound),
            ignored: defs
                .messages
                .inbound_specs()
                .filter(|spec| spec.is_ignored())
                .map(|spec| spec.name().to_owned())
                .collect(),
            player_blocks: block_names(EntityKind::Player),
            npc_blocks: block_names(EntityKind::Npc),
            fingerprint: format!("{:016x}", defs.fingerprint()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameStatus {
    Decoded,
    Ignored,
    Dropped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameReport {
    pub opcode: u8,
    pub name: String,
    pub status: FrameStatus,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub fields: BTreeMap<String, serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DecodeReport {
    pub bytes: usize,
    pub frames: Vec<FrameReport>,
    /// Bytes left over at the end of the capture, part of an unfinished frame.
    pub pending: usize,
    /// The fatal error that stopped decoding, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fatal: Option<String>,
}

impl DecodeReport {
    #[must_use]
    pub fn count(&self, status: FrameStatus) -> usize {
        self.frames
            .iter()
            .filter(|frame| frame.status == status)
            .count()
    }
}

fn field_json(value: &FieldValue) -> serde_json::Value {
    match value {
        FieldValue::Int(value) => serde_json::Value::from(*value),
        FieldValue::Bytes(bytes) => {
            let mut hex = String::with_capacity(bytes.len() * 2);
            for byte in bytes {
                let _ = write!(hex, "{byte:02x}");
            }
            serde_json::Value::String(hex)
        }
        FieldValue::Text(text) => serde_json::Value::String(text.clone()),
    }
}

fn frame_report(dispatch: Dispatch) -> FrameReport {
    match dispatch {
        Dispatch::Message(message) => FrameReport {
            opcode: message.opcode(),
            name: message.name().to_owned(),
            status: FrameStatus::Decoded,
            fields: message
                .spec()
                .fields()
                .iter()
                .zip(message.values())
                .map(|(spec, value)| (spec.name.clone(), field_json(value)))
                .collect(),
            error: None,
        },
        Dispatch::Ignored { spec, opcode } => FrameReport {
            opcode,
            name: spec.name().to_owned(),
            status: FrameStatus::Ignored,
            fields: BTreeMap::new(),
            error: None,
        },
        Dispatch::Dropped {
            spec,
            opcode,
            error,
        } => FrameReport {
            opcode,
            name: spec.name().to_owned(),
            status: FrameStatus::Dropped,
            fields: BTreeMap::new(),
            error: Some(error.to_string()),
        },
    }
}

/// Runs a captured client byte stream through an inbound decoder.
///
/// Decoding stops at the first fatal error, which is reported rather than
/// returned so the frames before it are kept.
#[must_use]
pub fn decode_capture(
    bytes: &[u8],
    registry: Arc<MessageRegistry>,
    limits: &Limits,
) -> DecodeReport {
    let mut decoder = InboundDecoder::new(ConnectionId::default(), registry, limits.clone());
    let mut frames = Vec::new();
    let mut dispatches = Vec::new();
    let mut fatal = None;

    for chunk in bytes.chunks(FEED_CHUNK) {
        let step = decoder
            .feed(chunk)
            .and_then(|()| decoder.drain(&mut dispatches));
        frames.extend(dispatches.drain(..).map(frame_report));
        if let Err(err) = step {
            fatal = Some(err.to_string());
            break;
        }
    }

    DecodeReport {
        bytes: bytes.len(),
        frames,
        pending: decoder.pending_len(),
        fatal,
    }
}

/// One line per frame, then a summary line.
#[must_use]
pub fn format_decode_pretty(report: &DecodeReport) -> String {
    let mut out = String::new();
    for frame in &report.frames {
        let _ = write!(out, "{:>3} {:<16}", frame.opcode, frame.name);
        match frame.status {
            FrameStatus::Decoded => {
                for (name, value) in &frame.fields {
                    let _ = write!(out, " {name}={value}");
                }
            }
            FrameStatus::Ignored => out.push_str(" (ignored)"),
            FrameStatus::Dropped => {
                let _ = write!(
                    out,
                    " (dropped: {})",
                    frame.error.as_deref().unwrap_or("unknown")
                );
            }
        }
        out.push('\n');
    }
    let _ = write!(
        out,
        "{} bytes, {} decoded, {} ignored, {} dropped, {} pending",
        report.bytes,
        report.count(FrameStatus::Decoded),
        report.count(FrameStatus::Ignored),
        report.count(FrameStatus::Dropped),
        report.pending
    );
    if let Some(fatal) = &report.fatal {
        let _ = write!(out, "\nstopped: {fatal}");
    }
    out
}
