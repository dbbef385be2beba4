#![no_main]

use bytestream::{ByteOrder, ByteReader, DataType, Signedness, Transform};
use libfuzzer_sys::fuzz_target;

const TYPES: [DataType; 4] = [DataType::Byte, DataType::Short, DataType::Medium, DataType::Int];
const ORDERS: [ByteOrder; 4] = [
    ByteOrder::Big,
    ByteOrder::Little,
    ByteOrder::Middle,
    ByteOrder::InversedMiddle,
];
const TRANSFORMS: [Transform; 4] = [
    Transform::None,
    Transform::Add,
    Transform::Subtract,
    Transform::Negate,
];

fuzz_target!(|data: &[u8]| {
    let Some((&control, data)) = data.split_first() else {
        return;
    };
    let mut reader = ByteReader::new(data);
    let mut op = control;

    // Use input bytes to drive a bounded sequence of operations.
    for _ in 0..256 {
        if reader.is_empty() {
            break;
        }
        let before = reader.position();
        match op % 5 {
            0 => {
                let data_type = TYPES[usize::from(op >> 3) % 4];
                let order = ORDERS[usize::from(op >> 5) % 4];
                let transform = TRANSFORMS[usize::from(op >> 1) % 4];
                let sign = if op & 0x80 == 0 {
                    Signedness::Signed
                } else {
                    Signedness::Unsigned
                };
                if reader.get(data_type, order, transform, sign).is_err() {
                    assert_eq!(reader.position(), before);
                }
            }
            1 => {
                let _ = reader.get_u16();
            }
            2 => {
                let _ = reader.get_string();
            }
            3 => {
                let _ = reader.get_bytes(usize::from(op >> 4));
            }
            _ => {
                let _ = reader.skip(1);
            }
        }
        op = op.wrapping_mul(31).wrapping_add(reader.get_u8().unwrap_or(0));
    }
});
