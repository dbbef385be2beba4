//! Deterministic definition fingerprints.

use blake3::Hasher;
use bytestream::{ByteOrder, DataType, Signedness, Transform};
use wire::Framing;

use crate::block::{BlockRegistry, EntityKind, UpdateBlockSet};
use crate::field::{FieldKind, FieldSpec};
use crate::message::{MessageRegistry, MessageSpec};

/// Computes a deterministic fingerprint of validated definitions.
///
/// Two processes agree on the wire format iff their fingerprints match.
#[must_use]
pub fn fingerprint(messages: &MessageRegistry, blocks: &BlockRegistry) -> u64 {
    let mut hasher = Hasher::new();

    write_len(&mut hasher, messages.inbound_specs().count());
    for spec in messages.inbound_specs() {
        write_message(&mut hasher, spec);
    }
    write_len(&mut hasher, messages.outbound_specs().count());
    for spec in messages.outbound_specs() {
        write_message(&mut hasher, spec);
    }
    for kind in EntityKind::ALL {
        write_block_set(&mut hasher, blocks.get(kind));
    }

    let hash = hasher.finalize();
    let mut head = [0u8; 8];
    head.copy_from_slice(&hash.as_bytes()[..8]);
    u64::from_le_bytes(head)
}

fn write_message(hasher: &mut Hasher, spec: &MessageSpec) {
    write_str(hasher, spec.name());
    write_len(hasher, spec.opcodes().len());
    hasher.update(spec.opcodes());
    write_framing(hasher, spec.framing());
    write_u8(hasher, u8::from(spec.is_ignored()));
    write_fields(hasher, spec.fields());
}

fn write_block_set(hasher: &mut Hasher, set: &UpdateBlockSet) {
    write_u8(hasher, set.opcode());
    write_option_u16(hasher, set.large_opcode().map(u16::from));
    write_option_u16(hasher, set.excess_mask());
    write_framing(hasher, set.framing());
    write_len(hasher, set.len());
    for block in set.blocks() {
        write_str(hasher, block.name());
        write_u16(hasher, block.bit());
        write_fields(hasher, block.fields());
    }
}

fn write_fields(hasher: &mut Hasher, fields: &[FieldSpec]) {
    write_len(hasher, fields.len());
    for field in fields {
        write_str(hasher, &field.name);
        let kind = match field.kind {
            FieldKind::Int(DataType::Byte) => 0,
            FieldKind::Int(DataType::Short) => 1,
            FieldKind::Int(DataType::Medium) => 2,
            FieldKind::Int(DataType::Int) => 3,
            FieldKind::Bytes => 4,
            FieldKind::String => 5,
        };
        let order = match field.order {
            ByteOrder::Big => 0,
            ByteOrder::Little => 1,
            ByteOrder::Middle => 2,
            ByteOrder::InversedMiddle => 3,
        };
        let sign = match field.sign {
            Signedness::Signed => 0,
            Signedness::Unsigned => 1,
        };
        let transform = match field.transform {
            Transform::None => 0,
            Transform::Add => 1,
            Transform::Subtract => 2,
            Transform::Negate => 3,
        };
        hasher.update(&[kind, order, sign, transform]);
    }
}

fn write_framing(hasher: &mut Hasher, framing: Framing) {
    match framing {
        Framing::Fixed(len) => {
            write_u8(hasher, 0);
            write_len(hasher, len);
        }
        Framing::VariableByte => write_u8(hasher, 1),
        Framing::VariableShort => write_u8(hasher, 2),
    }
}

fn write_option_u16(hasher: &mut Hasher, value: Option<u16>) {
    match value {
        Some(value) => {
            write_u8(hasher, 1);
            write_u16(hasher, value);
        }
        None => write_u8(hasher, 0),
    }
}

fn write_str(hasher: &mut Hasher, value: &str) {
    write_len(hasher, value.len());
    hasher.update(value.as_bytes());
}

fn write_len(hasher: &mut Hasher, value: usize) {
    hasher.update(&(value as u64).to_le_bytes());
}

fn write_u8(hasher: &mut Hasher, value: u8) {
    hasher.update(&[value]);
}

fn write_u16(hasher: &mut Hasher, value: u16) {
    hasher.update(&value.to_le_bytes());
}
