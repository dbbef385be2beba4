//! Message specifications and the opcode registry.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::warn;
use wire::{Framing, FramingKind, Opcode};

use crate::error::{SchemaError, SchemaResult, SpecIssue};
use crate::field::{FieldLayout, FieldSpec};

/// Which side of the connection produces a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Client to server.
    Inbound,
    /// Server to client.
    Outbound,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        })
    }
}

/// A validated message specification.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MessageSpec {
    name: String,
    direction: Direction,
    opcodes: Vec<Opcode>,
    framing: Framing,
    fields: Vec<FieldSpec>,
    ignored: bool,
}

impl MessageSpec {
    /// Starts a specification for the named message kind.
    #[must_use]
    pub fn builder(name: impl Into<String>, direction: Direction) -> MessageSpecBuilder {
        MessageSpecBuilder {
            name: name.into(),
            direction,
            opcodes: Vec::new(),
            framing: FramingKind::Fixed,
            length: None,
            fields: Vec::new(),
            ignored: false,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }

    /// Every opcode resolving to this specification, in declared order.
    #[must_use]
    pub fn opcodes(&self) -> &[Opcode] {
        &self.opcodes
    }

    /// The first declared opcode; the only one for outbound messages.
    #[must_use]
    pub fn opcode(&self) -> Opcode {
        self.opcodes[0]
    }

    /// Position of `opcode` among the aliases.
    #[must_use]
    pub fn opcode_index(&self, opcode: Opcode) -> Option<usize> {
        self.opcodes.iter().position(|candidate| *candidate == opcode)
    }

    #[must_use]
    pub const fn framing(&self) -> Framing {
        self.framing
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Position of the named field.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name == name)
    }

    /// Ignored frames are consumed but never decoded.
    #[must_use]
    pub const fn is_ignored(&self) -> bool {
        self.ignored
    }
}

/// Builder for [`MessageSpec`].
///
/// Framing defaults to FIXED with no length, which only an ignored
/// specification may leave unresolved.
#[derive(Debug, Clone)]
pub struct MessageSpecBuilder {
    name: String,
    direction: Direction,
    opcodes: Vec<Opcode>,
    framing: FramingKind,
    length: Option<usize>,
    fields: Vec<FieldSpec>,
    ignored: bool,
}

impl MessageSpecBuilder {
    #[must_use]
    pub fn opcode(mut self, opcode: Opcode) -> Self {
        self.opcodes.push(opcode);
        self
    }

    #[must_use]
    pub fn opcodes(mut self, opcodes: impl IntoIterator<Item = Opcode>) -> Self {
        self.opcodes.extend(opcodes);
        self
    }

    /// FIXED framing with a declared length; zero means opcode only.
    #[must_use]
    pub fn fixed(mut self, length: usize) -> Self {
        self.framing = FramingKind::Fixed;
        self.length = Some(length);
        self
    }

    /// Sets the framing kind and an optional declared length.
    #[must_use]
    pub fn framing(mut self, framing: FramingKind, length: Option<usize>) -> Self {
        self.framing = framing;
        self.length = length;
        self
    }

    #[must_use]
    pub fn variable_byte(self) -> Self {
        self.framing(FramingKind::VariableByte, None)
    }

    #[must_use]
    pub fn variable_short(self) -> Self {
        self.framing(FramingKind::VariableShort, None)
    }

    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldSpec>) -> Self {
        self.fields.extend(fields);
        self
    }

    #[must_use]
    pub fn ignored(mut self, ignored: bool) -> Self {
        self.ignored = ignored;
        self
    }

    /// Validates and builds the specification.
    pub fn build(self) -> SchemaResult<MessageSpec> {
        let (direction, name) = (self.direction, self.name.clone());
        self.build_inner().map_err(|reason| SchemaError::InvalidMessage {
            direction,
            name,
            reason,
        })
    }

    fn build_inner(self) -> Result<MessageSpec, SpecIssue> {
        if self.opcodes.is_empty() {
            return Err(SpecIssue::MissingOpcode);
        }
        if self.direction == Direction::Outbound && self.opcodes.len() > 1 {
            return Err(SpecIssue::OutboundAlias {
                count: self.opcodes.len(),
            });
        }
        for (i, opcode) in self.opcodes.iter().enumerate() {
            if self.opcodes[..i].contains(opcode) {
                return Err(SpecIssue::RepeatedAlias { opcode: *opcode });
            }
        }

        let layout = FieldLayout::of(&self.fields)?;
        let framing = match (self.framing, self.length) {
            (FramingKind::Fixed, Some(length)) => {
                match layout.check_fixed_len(length) {
                    Ok(()) => {}
                    Err(issue) if self.ignored => {
                        warn!(
                            name = %self.name,
                            %issue,
                            "ignored message disagrees with its fields"
                        );
                    }
                    Err(issue) => return Err(issue),
                }
                Framing::Fixed(length)
            }
            (FramingKind::Fixed, None) if !self.ignored => return Err(SpecIssue::MissingLength),
            (FramingKind::Fixed, None) if layout.is_fixed() => Framing::Fixed(layout.fixed_width),
            (FramingKind::Fixed, None) => return Err(SpecIssue::UnderivableLength),
            (_, Some(length)) => return Err(SpecIssue::UnexpectedLength { length }),
            (FramingKind::VariableByte, None) => Framing::VariableByte,
            (FramingKind::VariableShort, None) => Framing::VariableShort,
        };

        Ok(MessageSpec {
            name: self.name,
            direction: self.direction,
            opcodes: self.opcodes,
            framing,
            fields: self.fields,
            ignored: self.ignored,
        })
    }
}

/// Immutable lookup tables for both directions.
///
/// Inbound messages are keyed by every opcode they claim, outbound
/// messages by kind name and opcode.
#[derive(Debug, Clone)]
pub struct MessageRegistry {
    inbound: Vec<Arc<MessageSpec>>,
    outbound: Vec<Arc<MessageSpec>>,
    inbound_by_opcode: Vec<Option<Arc<MessageSpec>>>,
    outbound_by_opcode: Vec<Option<Arc<MessageSpec>>>,
    inbound_by_name: HashMap<String, Arc<MessageSpec>>,
    outbound_by_name: HashMap<String, Arc<MessageSpec>>,
}

impl MessageRegistry {
    /// Builds the registry, failing on any opcode or name collision within
    /// a direction.
    pub fn new(specs: impl IntoIterator<Item = MessageSpec>) -> SchemaResult<Self> {
        let mut registry = Self {
            inbound: Vec::new(),
            outbound: Vec::new(),
            inbound_by_opcode: vec![None; 256],
            outbound_by_opcode: vec![None; 256],
            inbound_by_name: HashMap::new(),
            outbound_by_name: HashMap::new(),
        };
        for spec in specs {
            registry.insert(Arc::new(spec))?;
        }
        Ok(registry)
    }

    fn insert(&mut self, spec: Arc<MessageSpec>) -> SchemaResult<()> {
        let direction = spec.direction();
        let (list, by_opcode, by_name) = match direction {
            Direction::Inbound => (
                &mut self.inbound,
                &mut self.inbound_by_opcode,
                &mut self.inbound_by_name,
            ),
            Direction::Outbound => (
                &mut self.outbound,
                &mut self.outbound_by_opcode,
                &mut self.outbound_by_name,
            ),
        };

        if by_name.contains_key(spec.name()) {
            return Err(SchemaError::DuplicateMessage {
                direction,
                name: spec.name().to_owned(),
            });
        }
        for &opcode in spec.opcodes() {
            if let Some(existing) = &by_opcode[usize::from(opcode)] {
                return Err(SchemaError::DuplicateOpcode {
                    direction,
                    opcode,
                    first: existing.name().to_owned(),
                    second: spec.name().to_owned(),
                });
            }
        }

        for &opcode in spec.opcodes() {
            by_opcode[usize::from(opcode)] = Some(Arc::clone(&spec));
        }
        by_name.insert(spec.name().to_owned(), Arc::clone(&spec));
        list.push(spec);
        Ok(())
    }

    /// Resolves an inbound opcode.
    #[must_use]
    pub fn inbound(&self, opcode: Opcode) -> Option<&Arc<MessageSpec>> {
        self.inbound_by_opcode[usize::from(opcode)].as_ref()
    }

    /// Resolves an outbound message kind.
    #[must_use]
    pub fn outbound(&self, name: &str) -> Option<&Arc<MessageSpec>> {
        self.outbound_by_name.get(name)
    }

    #[must_use]
    pub fn inbound_by_name(&self, name: &str) -> Option<&Arc<MessageSpec>> {
        self.inbound_by_name.get(name)
    }

    #[must_use]
    pub fn outbound_by_opcode(&self, opcode: Opcode) -> Option<&Arc<MessageSpec>> {
        self.outbound_by_opcode[usize::from(opcode)].as_ref()
    }

    /// Inbound specifications in declaration order.
    pub fn inbound_specs(&self) -> impl Iterator<Item = &Arc<MessageSpec>> {
        self.inbound.iter()
    }

    /// Outbound specifications in declaration order.
    pub fn outbound_specs(&self) -> impl Iterator<Item = &Arc<MessageSpec>> {
        self.outbound.iter()
    }

    /// Number of specifications per direction.
    #[must_use]
    pub fn len(&self, direction: Direction) -> usize {
        match direction {
            Direction::Inbound => self.inbound.len(),
            Direction::Outbound => self.outbound.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inbound.is_empty() && self.outbound.is_empty()
    }
}
