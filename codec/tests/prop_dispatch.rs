//! Property tests: chunking never changes what the decoder dispatches.

use std::sync::Arc;

use bytestream::{ByteOrder, DataType, Transform};
use codec::{encode_values, ConnectionId, Dispatch, FieldValue, InboundDecoder, WireLimits};
use proptest::prelude::*;
use schema::{Direction, FieldSpec, MessageRegistry, MessageSpec};

fn registry() -> Arc<MessageRegistry> {
    let specs = [
        MessageSpec::builder("say", Direction::Inbound)
            .opcode(1)
            .variable_byte()
            .field(FieldSpec::string("text"))
            .build()
            .unwrap(),
        MessageSpec::builder("move", Direction::Inbound)
            .opcode(2)
            .fixed(7)
            .field(FieldSpec::int("x", DataType::Int).order(ByteOrder::InversedMiddle))
            .field(FieldSpec::int("y", DataType::Short).transform(Transform::Subtract))
            .field(FieldSpec::int("z", DataType::Byte).transform(Transform::Add))
            .build()
            .unwrap(),
        MessageSpec::builder("blob", Direction::Inbound)
            .opcode(3)
            .variable_short()
            .field(FieldSpec::bytes("data"))
            .build()
            .unwrap(),
    ];
    Arc::new(MessageRegistry::new(specs).unwrap())
}

#[derive(Debug, Clone)]
enum Op {
    Say(String),
    Move(i64, i64, i64),
    Blob(Vec<u8>),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        "[a-z ]{0,40}".prop_map(Op::Say),
        (any::<i32>(), any::<i16>(), any::<i8>())
            .prop_map(|(x, y, z)| Op::Move(i64::from(x), i64::from(y), i64::from(z))),
        prop::collection::vec(any::<u8>(), 0..300).prop_map(Op::Blob),
    ]
}

fn encode(registry: &MessageRegistry, op: &Op, out: &mut Vec<u8>) {
    let (opcode, values) = match op {
        Op::Say(text) => (1, vec![FieldValue::from(text.as_str())]),
        Op::Move(x, y, z) => (
            2,
            vec![FieldValue::Int(*x), FieldValue::Int(*y), FieldValue::Int(*z)],
        ),
        Op::Blob(data) => (3, vec![FieldValue::Bytes(data.clone())]),
    };
    let spec = registry.inbound(opcode).unwrap();
    encode_values(spec, opcode, &values, &WireLimits::default(), out).unwrap();
}

proptest! {
    #[test]
    fn chunking_is_invisible(
        ops in prop::collection::vec(op_strategy(), 1..20),
        cuts in prop::collection::vec(1usize..64, 0..40),
    ) {
        let registry = registry();
        let mut stream = Vec::new();
        for op in &ops {
            encode(&registry, op, &mut stream);
        }

        let mut decoder =
            InboundDecoder::new(ConnectionId::new(1), registry, WireLimits::default());
        let mut dispatched = Vec::new();
        let mut rest = stream.as_slice();
        let mut cuts = cuts.into_iter();
        while !rest.is_empty() {
            let take = cuts.next().unwrap_or(rest.len()).min(rest.len());
            decoder.feed(&rest[..take]).unwrap();
            decoder.drain(&mut dispatched).unwrap();
            rest = &rest[take..];
        }

        prop_assert_eq!(dispatched.len(), ops.len());
        for (dispatch, op) in dispatched.iter().zip(&ops) {
            let Dispatch::Message(message) = dispatch else {
                return Err(TestCaseError::fail(format!("not a message: {dispatch:?}")));
            };
            match op {
                Op::Say(text) => {
                    prop_assert_eq!(message.text("text").unwrap(), text.as_str());
                }
                Op::Move(x, y, z) => {
                    prop_assert_eq!(message.int("x").unwrap(), *x);
                    prop_assert_eq!(message.int("y").unwrap(), *y);
                    prop_assert_eq!(message.int("z").unwrap(), *z);
                }
                Op::Blob(data) => {
                    prop_assert_eq!(message.bytes("data").unwrap(), data.as_slice());
                }
            }
        }
        prop_assert_eq!(decoder.pending_len(), 0);
    }

    #[test]
    fn garbage_never_panics(bytes in prop::collection::vec(any::<u8>(), 0..512)) {
        let mut decoder =
            InboundDecoder::new(ConnectionId::new(1), registry(), WireLimits::for_testing());
        let mut out = Vec::new();
        if decoder.feed(&bytes).is_ok() {
            let _ = decoder.drain(&mut out);
        }
    }
}
