//! Encoding and decoding of ordered field lists.
//!
//! Messages and update blocks share these routines so both go through the
//! same byte-level layouts.

use bytestream::{ByteReader, ByteWriter, StreamError};
use schema::{trailing_width, FieldKind, FieldSpec};

use crate::error::{CodecError, CodecResult};
use crate::value::FieldValue;

/// Writes `values` (aligned with `specs`) to `writer`.
///
/// On error the writer may hold a partial list; callers encode into a
/// scratch writer.
pub fn encode_fields(
    specs: &[FieldSpec],
    values: &[FieldValue],
    writer: &mut ByteWriter,
) -> CodecResult<()> {
    debug_assert_eq!(specs.len(), values.len());
    for (spec, value) in specs.iter().zip(values) {
        let result = match (spec.kind, value) {
            (FieldKind::Int(data_type), FieldValue::Int(value)) => {
                writer.put(data_type, spec.order, spec.transform, *value)
            }
            (FieldKind::Bytes, FieldValue::Bytes(bytes)) => {
                writer.put_bytes(bytes);
                Ok(())
            }
            (FieldKind::String, FieldValue::Text(text)) => writer.put_string(text),
            _ => {
                return Err(CodecError::FieldShape {
                    field: spec.name.clone(),
                    expected: spec.kind,
                });
            }
        };
        result.map_err(|source| CodecError::Field {
            field: spec.name.clone(),
            source,
        })?;
    }
    Ok(())
}

/// Decodes a complete body into one value per spec.
///
/// A BYTES field takes everything except what the fixed fields after it
/// need. Bytes left over after the last field make the body malformed.
pub fn decode_fields(specs: &[FieldSpec], body: &[u8]) -> CodecResult<Vec<FieldValue>> {
    let mut reader = ByteReader::new(body);
    let mut values = Vec::with_capacity(specs.len());
    for (index, spec) in specs.iter().enumerate() {
        let field_error = |source: StreamError| CodecError::Field {
            field: spec.name.clone(),
            source,
        };
        let value = match spec.kind {
            FieldKind::Int(data_type) => FieldValue::Int(
                reader
                    .get(data_type, spec.order, spec.transform, spec.sign)
                    .map_err(field_error)?,
            ),
            FieldKind::String => FieldValue::Text(reader.get_string()),
            FieldKind::Bytes => {
                let count = reader
                    .remaining()
                    .saturating_sub(trailing_width(specs, index));
                FieldValue::Bytes(reader.get_bytes(count).map_err(field_error)?.to_vec())
            }
        };
        values.push(value);
    }
    if !reader.is_empty() {
        return Err(CodecError::TrailingBytes {
            remaining: reader.remaining(),
        });
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytestream::{ByteOrder, DataType, Transform};

    fn walk_fields() -> Vec<FieldSpec> {
        vec![
            FieldSpec::int("x", DataType::Short)
                .order(ByteOrder::Little)
                .transform(Transform::Add)
                .unsigned(),
            FieldSpec::bytes("steps"),
            FieldSpec::int("run", DataType::Byte).transform(Transform::Negate),
        ]
    }

    #[test]
    fn bytes_leave_room_for_trailing_fields() {
        let specs = walk_fields();
        let values = vec![
            FieldValue::Int(3200),
            FieldValue::Bytes(vec![1, 2, 3, 4]),
            FieldValue::Int(1),
        ];
        let mut writer = ByteWriter::new();
        encode_fields(&specs, &values, &mut writer).unwrap();
        let body = writer.finish();
        // 3200 = 0x0C80: low byte 0x80 + 128 wraps to 0x00
        assert_eq!(body, [0x00, 0x0C, 1, 2, 3, 4, 0xFF]);
        assert_eq!(decode_fields(&specs, &body).unwrap(), values);
    }

    #[test]
    fn shape_mismatch_names_field() {
        let specs = [FieldSpec::string("name")];
        let err = encode_fields(&specs, &[FieldValue::Int(1)], &mut ByteWriter::new()).unwrap_err();
        assert_eq!(
            err,
            CodecError::FieldShape {
                field: "name".to_owned(),
                expected: FieldKind::String
            }
        );
    }

    #[test]
    fn short_body_is_field_error() {
        let specs = [
            FieldSpec::int("a", DataType::Byte),
            FieldSpec::int("b", DataType::Int),
        ];
        let err = decode_fields(&specs, &[1, 2]).unwrap_err();
        assert_eq!(
            err,
            CodecError::Field {
                field: "b".to_owned(),
                source: StreamError::BufferUnderflow {
                    requested: 4,
                    available: 1
                }
            }
        );
    }

    #[test]
    fn bytes_short_of_trailing_width_underflows() {
        let err = decode_fields(&walk_fields(), &[0x00, 0x0C]).unwrap_err();
        assert!(matches!(err, CodecError::Field { ref field, .. } if field == "run"));
    }

    #[test]
    fn trailing_bytes_are_malformed() {
        let specs = [FieldSpec::int("a", DataType::Byte)];
        assert_eq!(
            decode_fields(&specs, &[1, 2, 3]),
            Err(CodecError::TrailingBytes { remaining: 2 })
        );
    }

    #[test]
    fn text_fields() {
        let specs = [FieldSpec::string("a"), FieldSpec::string("b")];
        let values = vec![FieldValue::from("hello"), FieldValue::from("")];
        let mut writer = ByteWriter::new();
        encode_fields(&specs, &values, &mut writer).unwrap();
        assert_eq!(decode_fields(&specs, writer.as_slice()).unwrap(), values);
    }

    #[test]
    fn empty_body_yields_empty_text() {
        let specs = [FieldSpec::string("a")];
        assert_eq!(
            decode_fields(&specs, &[]).unwrap(),
            vec![FieldValue::Text(String::new())]
        );
    }

    #[test]
    fn out_of_range_value() {
        let specs = [FieldSpec::int("a", DataType::Byte)];
        let err = encode_fields(&specs, &[FieldValue::Int(300)], &mut ByteWriter::new()).unwrap_err();
        assert!(matches!(err, CodecError::Field { .. }));
    }
}
