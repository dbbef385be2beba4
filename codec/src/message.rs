//! Decoded inbound messages and outbound message construction.

use std::sync::Arc;

use bytestream::ByteWriter;
use schema::{FieldKind, MessageRegistry, MessageSpec};
use wire::{encode_frame, Limits, Opcode};

use crate::error::{CodecError, CodecResult};
use crate::fields::{decode_fields, encode_fields};
use crate::value::FieldValue;

/// An immutable decoded message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    spec: Arc<MessageSpec>,
    opcode: Opcode,
    values: Vec<FieldValue>,
}

impl Message {
    /// Decodes a complete frame body against `spec`.
    pub fn decode(spec: Arc<MessageSpec>, opcode: Opcode, body: &[u8]) -> CodecResult<Self> {
        let values = decode_fields(spec.fields(), body)?;
        Ok(Self {
            spec,
            opcode,
            values,
        })
    }

    /// The message kind name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.spec.name()
    }

    /// The opcode that carried this message.
    #[must_use]
    pub const fn opcode(&self) -> Opcode {
        self.opcode
    }

    /// Which alias carried this message; zero when there is only one.
    #[must_use]
    pub fn opcode_index(&self) -> usize {
        self.spec.opcode_index(self.opcode).unwrap_or(0)
    }

    #[must_use]
    pub fn spec(&self) -> &MessageSpec {
        &self.spec
    }

    /// Values in field declaration order.
    #[must_use]
    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    #[must_use]
    pub fn value(&self, field: &str) -> Option<&FieldValue> {
        self.spec
            .field_index(field)
            .and_then(|index| self.values.get(index))
    }

    fn require(&self, field: &str) -> CodecResult<(&FieldValue, FieldKind)> {
        self.spec
            .field_index(field)
            .and_then(|index| Some((self.values.get(index)?, self.spec.fields()[index].kind)))
            .ok_or_else(|| CodecError::UnknownField {
                message: self.name().to_owned(),
                field: field.to_owned(),
            })
    }

    /// Reads an integer field.
    pub fn int(&self, field: &str) -> CodecResult<i64> {
        let (value, kind) = self.require(field)?;
        value.as_int().ok_or_else(|| shape_error(field, kind))
    }

    /// Reads a BYTES field.
    pub fn bytes(&self, field: &str) -> CodecResult<&[u8]> {
        let (value, kind) = self.require(field)?;
        value.as_bytes().ok_or_else(|| shape_error(field, kind))
    }

    /// Reads a STRING field.
    pub fn text(&self, field: &str) -> CodecResult<&str> {
        let (value, kind) = self.require(field)?;
        value.as_text().ok_or_else(|| shape_error(field, kind))
    }

    /// Converts into a typed message.
    pub fn to_typed<T: FromMessage>(&self) -> CodecResult<T> {
        if self.name() != T::NAME {
            return Err(CodecError::UnexpectedMessage {
                expected: T::NAME,
                found: self.name().to_owned(),
            });
        }
        T::from_message(self)
    }
}

fn shape_error(field: &str, expected: FieldKind) -> CodecError {
    CodecError::FieldShape {
        field: field.to_owned(),
        expected,
    }
}

/// An outbound message under construction, keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    name: String,
    values: Vec<(String, FieldValue)>,
}

impl OutboundMessage {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: Vec::new(),
        }
    }

    /// Sets a field, replacing any earlier value.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(field, value);
        self
    }

    /// Sets a field, replacing any earlier value.
    pub fn set(&mut self, field: impl Into<String>, value: impl Into<FieldValue>) {
        let field = field.into();
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| *name == field) {
            Some(slot) => slot.1 = value,
            None => self.values.push((field, value)),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Orders the values to match `spec`, rejecting missing or unknown fields.
    pub fn resolve(&self, spec: &MessageSpec) -> CodecResult<Vec<FieldValue>> {
        if let Some((field, _)) = self
            .values
            .iter()
            .find(|(field, _)| spec.field_index(field).is_none())
        {
            return Err(CodecError::UnknownField {
                message: self.name.clone(),
                field: field.clone(),
            });
        }
        spec.fields()
            .iter()
            .map(|field| {
                self.values
                    .iter()
                    .find(|(name, _)| *name == field.name)
                    .map(|(_, value)| value.clone())
                    .ok_or_else(|| CodecError::MissingField {
                        message: self.name.clone(),
                        field: field.name.clone(),
                    })
            })
            .collect()
    }
}

/// Encodes an outbound message as a complete frame appended to `out`.
///
/// Returns the number of bytes appended. Nothing is appended on error.
pub fn encode_message(
    registry: &MessageRegistry,
    message: &OutboundMessage,
    limits: &Limits,
    out: &mut Vec<u8>,
) -> CodecResult<usize> {
    let spec = registry
        .outbound(message.name())
        .ok_or_else(|| CodecError::UnknownMessage {
            name: message.name().to_owned(),
        })?;
    let values = message.resolve(spec)?;
    encode_values(spec, spec.opcode(), &values, limits, out)
}

/// Encodes values in field order as a frame with the given opcode.
///
/// Works for either direction, which lets clients and tests build inbound
/// frames.
pub fn encode_values(
    spec: &MessageSpec,
    opcode: Opcode,
    values: &[FieldValue],
    limits: &Limits,
    out: &mut Vec<u8>,
) -> CodecResult<usize> {
    if values.len() != spec.fields().len() {
        let field = spec
            .fields()
            .get(values.len())
            .map_or_else(String::new, |field| field.name.clone());
        return Err(CodecError::MissingField {
            message: spec.name().to_owned(),
            field,
        });
    }
    let mut body = ByteWriter::new();
    encode_fields(spec.fields(), values, &mut body)?;
    Ok(encode_frame(opcode, spec.framing(), body.as_slice(), limits, out)?)
}

/// Builds a typed value from a decoded message.
pub trait FromMessage: Sized {
    /// Kind name of the message this type is decoded from.
    const NAME: &'static str;

    fn from_message(message: &Message) -> CodecResult<Self>;
}

/// Turns a typed value into an outbound message.
pub trait IntoMessage {
    fn into_message(self) -> OutboundMessage;
}

impl IntoMessage for OutboundMessage {
    fn into_message(self) -> OutboundMessage {
        self
    }
}
