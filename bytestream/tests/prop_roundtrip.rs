use bytestream::{ByteOrder, ByteReader, ByteWriter, DataType, Signedness, Transform};
use proptest::prelude::*;

#[derive(Clone, Debug)]
enum Op {
    Int {
        data_type: DataType,
        order: ByteOrder,
        transform: Transform,
        sign: Signedness,
        value: i64,
    },
    Text(String),
    Raw(Vec<u8>),
}

fn data_type_strategy() -> impl Strategy<Value = DataType> {
    prop_oneof![
        Just(DataType::Byte),
        Just(DataType::Short),
        Just(DataType::Medium),
        Just(DataType::Int),
    ]
}

fn transform_strategy() -> impl Strategy<Value = Transform> {
    prop_oneof![
        Just(Transform::None),
        Just(Transform::Add),
        Just(Transform::Subtract),
        Just(Transform::Negate),
    ]
}

fn order_for(data_type: DataType, transform: Transform) -> BoxedStrategy<ByteOrder> {
    if data_type == DataType::Int && transform == Transform::None {
        prop_oneof![
            Just(ByteOrder::Big),
            Just(ByteOrder::Little),
            Just(ByteOrder::Middle),
            Just(ByteOrder::InversedMiddle),
        ]
        .boxed()
    } else {
        prop_oneof![Just(ByteOrder::Big), Just(ByteOrder::Little)].boxed()
    }
}

fn int_strategy() -> impl Strategy<Value = Op> {
    (data_type_strategy(), transform_strategy(), any::<bool>())
        .prop_flat_map(|(data_type, transform, signed)| {
            let sign = if signed {
                Signedness::Signed
            } else {
                Signedness::Unsigned
            };
            let values = if signed {
                (data_type.signed_min()..=-data_type.signed_min() - 1).boxed()
            } else {
                (0..=data_type.unsigned_max()).boxed()
            };
            (order_for(data_type, transform), values).prop_map(move |(order, value)| Op::Int {
                data_type,
                order,
                transform,
                sign,
                value,
            })
        })
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => int_strategy(),
        1 => "[a-zA-Z0-9 \u{a0}-\u{ff}]{0,12}".prop_map(Op::Text),
        1 => prop::collection::vec(any::<u8>(), 0..8).prop_map(Op::Raw),
    ]
}

proptest! {
    #[test]
    fn prop_roundtrip_ops(ops in prop::collection::vec(op_strategy(), 1..48)) {
        let mut writer = ByteWriter::new();
        for op in &ops {
            match op {
                Op::Int { data_type, order, transform, value, .. } => {
                    writer.put(*data_type, *order, *transform, *value).unwrap();
                }
                Op::Text(text) => writer.put_string(text).unwrap(),
                Op::Raw(bytes) => writer.put_bytes(bytes),
            }
        }
        let bytes = writer.finish();

        let mut reader = ByteReader::new(&bytes);
        for op in &ops {
            match op {
                Op::Int { data_type, order, transform, sign, value } => {
                    let decoded = reader.get(*data_type, *order, *transform, *sign).unwrap();
                    prop_assert_eq!(decoded, *value);
                }
                Op::Text(text) => prop_assert_eq!(&reader.get_string(), text),
                Op::Raw(raw) => prop_assert_eq!(reader.get_bytes(raw.len()).unwrap(), raw.as_slice()),
            }
        }
        prop_assert!(reader.is_empty());
    }

    #[test]
    fn prop_reader_never_panics(data in prop::collection::vec(any::<u8>(), 0..32)) {
        let mut reader = ByteReader::new(&data);
        while !reader.is_empty() {
            let _ = reader.get(DataType::Medium, ByteOrder::Little, Transform::Subtract, Signedness::Signed);
            let _ = reader.get_string();
            let _ = reader.get_u16();
        }
        prop_assert!(reader.get_u8().is_err());
    }
}
