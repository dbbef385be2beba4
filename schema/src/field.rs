//! Field specifications shared by messages and update blocks.

use std::collections::HashSet;
use std::fmt;

use bytestream::{validate_layout, ByteOrder, DataType, Signedness, Transform};

use crate::error::SpecIssue;

/// The wire shape of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Fixed-width integer.
    Int(DataType),
    /// Opaque bytes, sized by the frame.
    Bytes,
    /// Zero-terminated single-byte text.
    String,
}

impl FieldKind {
    /// Width on the wire, or `None` when it depends on the value.
    #[must_use]
    pub const fn fixed_width(self) -> Option<usize> {
        match self {
            Self::Int(data_type) => Some(data_type.width()),
            Self::Bytes | Self::String => None,
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(data_type) => data_type.fmt(f),
            Self::Bytes => f.write_str("BYTES"),
            Self::String => f.write_str("STRING"),
        }
    }
}

/// A named field in a message or update block.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub order: ByteOrder,
    pub sign: Signedness,
    pub transform: Transform,
}

impl FieldSpec {
    fn with_kind(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            order: ByteOrder::Big,
            sign: Signedness::Signed,
            transform: Transform::None,
        }
    }

    /// A big-endian, signed, untransformed integer field.
    #[must_use]
    pub fn int(name: impl Into<String>, data_type: DataType) -> Self {
        Self::with_kind(name, FieldKind::Int(data_type))
    }

    #[must_use]
    pub fn bytes(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::Bytes)
    }

    #[must_use]
    pub fn string(name: impl Into<String>) -> Self {
        Self::with_kind(name, FieldKind::String)
    }

    #[must_use]
    pub fn order(mut self, order: ByteOrder) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn unsigned(mut self) -> Self {
        self.sign = Signedness::Unsigned;
        self
    }

    #[must_use]
    pub fn transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Width on the wire, or `None` for BYTES and STRING.
    #[must_use]
    pub const fn fixed_width(&self) -> Option<usize> {
        self.kind.fixed_width()
    }

    fn validate(&self) -> Result<(), SpecIssue> {
        match self.kind {
            FieldKind::Int(data_type) => validate_layout(data_type, self.order, self.transform)
                .map_err(|source| SpecIssue::Layout {
                    field: self.name.clone(),
                    source,
                }),
            FieldKind::Bytes | FieldKind::String => {
                if self.order != ByteOrder::Big || self.transform != Transform::None {
                    return Err(SpecIssue::NonIntegerLayout {
                        field: self.name.clone(),
                    });
                }
                Ok(())
            }
        }
    }
}

/// Summary of a validated field list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FieldLayout {
    /// Sum of the fixed-width fields.
    pub fixed_width: usize,
    /// Number of STRING fields. Each needs at least its terminator.
    pub strings: usize,
    /// Whether a BYTES field is present.
    pub has_bytes: bool,
}

impl FieldLayout {
    /// Checks a field list and summarizes its widths.
    ///
    /// Names must be unique, integer layouts must be defined, at most one
    /// BYTES field may appear and everything after it must be fixed width.
    pub fn of(fields: &[FieldSpec]) -> Result<Self, SpecIssue> {
        let mut layout = Self::default();
        let mut names = HashSet::with_capacity(fields.len());
        for field in fields {
            if !names.insert(field.name.as_str()) {
                return Err(SpecIssue::DuplicateField {
                    field: field.name.clone(),
                });
            }
            field.validate()?;
            match field.kind {
                FieldKind::Int(data_type) => layout.fixed_width += data_type.width(),
                FieldKind::String if layout.has_bytes => {
                    return Err(SpecIssue::VariableAfterBytes {
                        field: field.name.clone(),
                    });
                }
                FieldKind::String => layout.strings += 1,
                FieldKind::Bytes if layout.has_bytes => return Err(SpecIssue::MultipleBytes),
                FieldKind::Bytes => layout.has_bytes = true,
            }
        }
        Ok(layout)
    }

    /// Returns `true` if every field has a fixed width.
    #[must_use]
    pub const fn is_fixed(&self) -> bool {
        self.strings == 0 && !self.has_bytes
    }

    /// Smallest body that can hold these fields.
    #[must_use]
    pub const fn min_len(&self) -> usize {
        self.fixed_width + self.strings
    }

    /// Checks the list against a declared FIXED length.
    pub fn check_fixed_len(&self, declared: usize) -> Result<(), SpecIssue> {
        let consistent = if self.is_fixed() {
            self.fixed_width == declared
        } else {
            self.min_len() <= declared
        };
        if consistent {
            Ok(())
        } else {
            Err(SpecIssue::LengthMismatch {
                declared,
                fields: self.min_len(),
            })
        }
    }
}

/// Width of the fixed fields after `index`, which a BYTES field at
/// `index` must leave unread.
#[must_use]
pub fn trailing_width(fields: &[FieldSpec], index: usize) -> usize {
    fields
        .iter()
        .skip(index + 1)
        .filter_map(FieldSpec::fixed_width)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_layout_sums_widths() {
        let fields = [
            FieldSpec::int("x", DataType::Short).order(ByteOrder::Little),
            FieldSpec::int("y", DataType::Short).transform(Transform::Add),
            FieldSpec::int("run", DataType::Byte).transform(Transform::Negate),
        ];
        let layout = FieldLayout::of(&fields).unwrap();
        assert!(layout.is_fixed());
        assert_eq!(layout.fixed_width, 5);
        assert!(layout.check_fixed_len(5).is_ok());
        assert_eq!(
            layout.check_fixed_len(6),
            Err(SpecIssue::LengthMismatch {
                declared: 6,
                fields: 5
            })
        );
    }

    #[test]
    fn variable_layout_needs_room() {
        let fields = [
            FieldSpec::int("slot", DataType::Short),
            FieldSpec::string("text"),
        ];
        let layout = FieldLayout::of(&fields).unwrap();
        assert_eq!(layout.min_len(), 3);
        assert!(layout.check_fixed_len(8).is_ok());
        assert!(layout.check_fixed_len(2).is_err());
    }

    #[test]
    fn rejects_duplicate_names() {
        let fields = [
            FieldSpec::int("id", DataType::Short),
            FieldSpec::int("id", DataType::Byte),
        ];
        assert_eq!(
            FieldLayout::of(&fields),
            Err(SpecIssue::DuplicateField {
                field: "id".to_owned()
            })
        );
    }

    #[test]
    fn rejects_middle_on_short() {
        let fields = [FieldSpec::int("id", DataType::Short).order(ByteOrder::Middle)];
        assert!(matches!(
            FieldLayout::of(&fields),
            Err(SpecIssue::Layout { .. })
        ));
    }

    #[test]
    fn rejects_transformed_text() {
        let fields = [FieldSpec::string("name").transform(Transform::Add)];
        assert!(matches!(
            FieldLayout::of(&fields),
            Err(SpecIssue::NonIntegerLayout { .. })
        ));
    }

    #[test]
    fn bytes_rules() {
        let two = [FieldSpec::bytes("a"), FieldSpec::bytes("b")];
        assert_eq!(FieldLayout::of(&two), Err(SpecIssue::MultipleBytes));

        let text_after = [FieldSpec::bytes("a"), FieldSpec::string("b")];
        assert!(matches!(
            FieldLayout::of(&text_after),
            Err(SpecIssue::VariableAfterBytes { .. })
        ));

        let int_after = [
            FieldSpec::int("len", DataType::Byte),
            FieldSpec::bytes("payload"),
            FieldSpec::int("crc", DataType::Int),
        ];
        let layout = FieldLayout::of(&int_after).unwrap();
        assert!(layout.has_bytes);
        assert_eq!(trailing_width(&int_after, 1), 4);
    }
}
