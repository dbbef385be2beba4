//! Typed views of inbound messages.

use codec::{CodecError, CodecResult, FromMessage, Message};

fn short(message: &Message, field: &'static str) -> CodecResult<u16> {
    let value = message.int(field)?;
    u16::try_from(value).map_err(|_| CodecError::ValueOutOfRange { field, value })
}

fn byte(message: &Message, field: &'static str) -> CodecResult<u8> {
    let value = message.int(field)?;
    u8::try_from(value).map_err(|_| CodecError::ValueOutOfRange { field, value })
}

/// Which client action produced a walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalkKind {
    Ground,
    Minimap,
    Interaction,
}

/// A path request: an absolute first tile, then signed deltas from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Walk {
    pub kind: WalkKind,
    pub first: (u16, u16),
    pub steps: Vec<(i8, i8)>,
    pub run: bool,
}

impl Walk {
    /// Absolute tiles of the whole path, first tile included.
    pub fn tiles(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (x, y) = (i32::from(self.first.0), i32::from(self.first.1));
        std::iter::once((x, y)).chain(
            self.steps
                .iter()
                .map(move |(dx, dy)| (x + i32::from(*dx), y + i32::from(*dy))),
        )
    }
}

impl FromMessage for Walk {
    const NAME: &'static str = "walk";

    fn from_message(message: &Message) -> CodecResult<Self> {
        let kind = match message.opcode_index() {
            0 => WalkKind::Ground,
            1 => WalkKind::Minimap,
            _ => WalkKind::Interaction,
        };
        let raw = message.bytes("steps")?;
        if raw.len() % 2 != 0 {
            return Err(CodecError::FieldLength {
                field: "steps",
                len: raw.len(),
                record: 2,
            });
        }
        let steps = raw
            .chunks_exact(2)
            .map(|pair| (pair[0] as i8, pair[1] as i8))
            .collect();
        Ok(Self {
            kind,
            first: (short(message, "first-x")?, short(message, "first-y")?),
            steps,
            run: message.int("run")? == 1,
        })
    }
}

/// Chat typed into the public chat box. The text stays packed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicChat {
    pub effects: u8,
    pub color: u8,
    pub packed: Vec<u8>,
}

impl FromMessage for PublicChat {
    const NAME: &'static str = "public-chat";

    fn from_message(message: &Message) -> CodecResult<Self> {
        Ok(Self {
            effects: byte(message, "effects")?,
            color: byte(message, "color")?,
            packed: message.bytes("text")?.to_vec(),
        })
    }
}

/// A `::command arg arg` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    pub name: String,
    pub arguments: Vec<String>,
}

impl FromMessage for Command {
    const NAME: &'static str = "command";

    fn from_message(message: &Message) -> CodecResult<Self> {
        let mut words = message.text("line")?.split_whitespace();
        let name = words.next().unwrap_or_default().to_ascii_lowercase();
        Ok(Self {
            name,
            arguments: words.map(str::to_owned).collect(),
        })
    }
}

/// One of the five item options on an inventory slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemOption {
    /// 1 through 5.
    pub option: u8,
    pub interface: u16,
    pub slot: u16,
    pub item: u16,
}

impl FromMessage for ItemOption {
    const NAME: &'static str = "item-option";

    fn from_message(message: &Message) -> CodecResult<Self> {
        let option = u8::try_from(message.opcode_index() + 1).map_err(|_| {
            CodecError::ValueOutOfRange {
                field: "option",
                value: i64::from(message.opcode()),
            }
        })?;
        Ok(Self {
            option,
            interface: short(message, "interface")?,
            slot: short(message, "slot")?,
            item: short(message, "item")?,
        })
    }
}
