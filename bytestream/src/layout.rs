//! Integer widths, byte orders, signedness and value transforms.

use std::fmt;

use crate::error::{StreamError, StreamResult};

/// Width of an integer field on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum DataType {
    /// One byte.
    Byte,
    /// Two bytes.
    Short,
    /// Three bytes.
    Medium,
    /// Four bytes.
    Int,
}

impl DataType {
    /// Number of bytes this type occupies on the wire.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::Byte => 1,
            Self::Short => 2,
            Self::Medium => 3,
            Self::Int => 4,
        }
    }

    /// Number of bits this type occupies on the wire.
    #[must_use]
    pub const fn bits(self) -> u32 {
        (self.width() * 8) as u32
    }

    /// Largest value representable when read unsigned.
    #[must_use]
    pub const fn unsigned_max(self) -> i64 {
        (1i64 << self.bits()) - 1
    }

    /// Smallest value representable when read signed.
    #[must_use]
    pub const fn signed_min(self) -> i64 {
        -(1i64 << (self.bits() - 1))
    }

    /// Returns `true` if `value` has a bit pattern in this width under either
    /// signed or unsigned interpretation.
    #[must_use]
    pub const fn fits(self, value: i64) -> bool {
        value >= self.signed_min() && value <= self.unsigned_max()
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Byte => "BYTE",
            Self::Short => "SHORT",
            Self::Medium => "MEDIUM",
            Self::Int => "INT",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Order in which the bytes of a multi-byte integer appear on the wire.
///
/// Orders are described relative to the big-endian bytes `b0 b1 b2 b3`
/// (most significant first).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum ByteOrder {
    /// `b0 b1 b2 b3`.
    #[default]
    Big,
    /// `b3 b2 b1 b0`.
    Little,
    /// `b2 b3 b0 b1`. Four-byte integers only.
    Middle,
    /// `b1 b0 b3 b2`. Four-byte integers only.
    InversedMiddle,
}

impl ByteOrder {
    /// Returns `true` for the two mixed orders.
    #[must_use]
    pub const fn is_middle(self) -> bool {
        matches!(self, Self::Middle | Self::InversedMiddle)
    }

    /// Returns `true` if this order is defined for `data_type`.
    #[must_use]
    pub const fn supports(self, data_type: DataType) -> bool {
        match self {
            Self::Big | Self::Little => true,
            Self::Middle | Self::InversedMiddle => matches!(data_type, DataType::Int),
        }
    }

    /// Maps wire position `index` to the big-endian byte it carries.
    ///
    /// Every order is its own inverse, so the same mapping serves both
    /// directions.
    pub(crate) const fn natural_index(self, width: usize, index: usize) -> usize {
        match self {
            Self::Big => index,
            Self::Little => width - 1 - index,
            Self::Middle => [2, 3, 0, 1][index],
            Self::InversedMiddle => [1, 0, 3, 2][index],
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::Big => "BIG",
            Self::Little => "LITTLE",
            Self::Middle => "MIDDLE",
            Self::InversedMiddle => "INVERSED_MIDDLE",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a decoded raw value is widened to `i64`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Signedness {
    #[default]
    Signed,
    Unsigned,
}

impl Signedness {
    /// Widens the low `data_type.bits()` bits of `raw`.
    #[must_use]
    pub const fn extend(self, raw: u64, data_type: DataType) -> i64 {
        match self {
            Self::Unsigned => raw as i64,
            Self::Signed => {
                let shift = 64 - data_type.bits();
                ((raw << shift) as i64) >> shift
            }
        }
    }
}

/// Obfuscating transform applied to the least significant byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum Transform {
    #[default]
    None,
    /// Writes `value + 128`.
    Add,
    /// Writes `128 - value`.
    Subtract,
    /// Writes `-value`.
    Negate,
}

impl Transform {
    /// Applies the transform to a byte about to be written.
    #[must_use]
    pub const fn encode(self, byte: u8) -> u8 {
        match self {
            Self::None => byte,
            Self::Add => byte.wrapping_add(128),
            Self::Subtract => 128u8.wrapping_sub(byte),
            Self::Negate => byte.wrapping_neg(),
        }
    }

    /// Inverts [`encode`](Self::encode) for a byte read from the wire.
    #[must_use]
    pub const fn decode(self, byte: u8) -> u8 {
        match self {
            Self::None => byte,
            Self::Add => byte.wrapping_sub(128),
            Self::Subtract => 128u8.wrapping_sub(byte),
            Self::Negate => byte.wrapping_neg(),
        }
    }

    const fn name(self) -> &'static str {
        match self {
            Self::None => "NONE",
            Self::Add => "ADD",
            Self::Subtract => "SUBTRACT",
            Self::Negate => "NEGATE",
        }
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Checks that a width, order and transform can be combined.
///
/// Mixed orders exist only for four-byte integers and never carry a
/// transform.
pub fn validate_layout(
    data_type: DataType,
    order: ByteOrder,
    transform: Transform,
) -> StreamResult<()> {
    if !order.supports(data_type) || (order.is_middle() && transform != Transform::None) {
        return Err(StreamError::UnsupportedLayout {
            data_type,
            order,
            transform,
        });
    }
    Ok(())
}
