use std::sync::Arc;

use codec::{
    encode_message, encode_values, CodecError, ConnectionId, Dispatch, FieldValue,
    InboundDecoder, IntoMessage, Message, WireLimits,
};
use defs::blocks::npc::{NpcAnimation, NpcHit, Transform};
use defs::blocks::player::{Appearance, Chat};
use defs::blocks::{mark, Animation, Hit};
use defs::inbound::{Command, ItemOption, Walk, WalkKind};
use defs::outbound::{GameMessage, Logout, Region, Skill};
use repgraph::{EntityKey, ObserverId, SyncEngine, SyncError, SyncLimits};
use schema::ProtocolDefs;

fn defs() -> ProtocolDefs {
    defs::load().unwrap()
}

fn decode(defs: &ProtocolDefs, opcode: u8, values: &[FieldValue]) -> Message {
    let spec = defs.messages.inbound(opcode).unwrap();
    let mut frame = Vec::new();
    encode_values(spec, opcode, values, &WireLimits::default(), &mut frame).unwrap();

    let mut decoder = InboundDecoder::new(
        ConnectionId::new(1),
        Arc::new(defs.messages.clone()),
        WireLimits::default(),
    );
    decoder.feed(&frame).unwrap();
    match decoder.next_dispatch().unwrap() {
        Some(Dispatch::Message(message)) => message,
        other => panic!("expected a message, got {other:?}"),
    }
}

#[test]
fn minimap_walk() {
    let defs = defs();
    let message = decode(
        &defs,
        248,
        &[
            FieldValue::Int(3200),
            FieldValue::Bytes(vec![1, 0, 2, 0xFF]),
            FieldValue::Int(3201),
            FieldValue::Int(1),
        ],
    );
    let walk: Walk = message.to_typed().unwrap();
    assert_eq!(walk.kind, WalkKind::Minimap);
    assert_eq!(walk.first, (3200, 3201));
    assert_eq!(walk.steps, [(1, 0), (2, -1)]);
    assert!(walk.run);
    let tiles: Vec<_> = walk.tiles().collect();
    assert_eq!(tiles, [(3200, 3201), (3201, 3201), (3202, 3200)]);
}

#[test]
fn walk_steps_must_be_pairs() {
    let defs = defs();
    let message = decode(
        &defs,
        164,
        &[
            FieldValue::Int(3200),
            FieldValue::Bytes(vec![1, 0, 2]),
            FieldValue::Int(3201),
            FieldValue::Int(0),
        ],
    );
    let err = message.to_typed::<Walk>().unwrap_err();
    assert_eq!(
        err,
        CodecError::FieldLength {
            field: "steps",
            len: 3,
            record: 2
        }
    );
}

#[test]
fn item_option_number_comes_from_alias() {
    let defs = defs();
    let message = decode(
        &defs,
        43,
        &[
            FieldValue::Int(3214),
            FieldValue::Int(5),
            FieldValue::Int(995),
        ],
    );
    let option: ItemOption = message.to_typed().unwrap();
    assert_eq!(
        option,
        ItemOption {
            option: 3,
            interface: 3214,
            slot: 5,
            item: 995
        }
    );
}

#[test]
fn command_splits_words() {
    let defs = defs();
    let message = decode(&defs, 103, &[FieldValue::from("Tele 3200 3200")]);
    let command: Command = message.to_typed().unwrap();
    assert_eq!(command.name, "tele");
    assert_eq!(command.arguments, ["3200", "3200"]);
    assert!(message.to_typed::<Walk>().is_err());
}

#[test]
fn outbound_frames() {
    let defs = defs();
    let limits = WireLimits::default();
    let mut out = Vec::new();

    encode_message(
        &defs.messages,
        &Region { x: 400, y: 400 }.into_message(),
        &limits,
        &mut out,
    )
    .unwrap();
    assert_eq!(out, [73, 0x01, 0x10, 0x01, 0x90]);

    out.clear();
    encode_message(
        &defs.messages,
        &Skill {
            id: 2,
            experience: 0x0102_0304,
            level: 99,
        }
        .into_message(),
        &limits,
        &mut out,
    )
    .unwrap();
    assert_eq!(out, [134, 2, 0x03, 0x04, 0x01, 0x02, 99]);

    out.clear();
    encode_message(
        &defs.messages,
        &GameMessage("hi".to_owned()).into_message(),
        &limits,
        &mut out,
    )
    .unwrap();
    assert_eq!(out, [253, 3, b'h', b'i', 0]);

    out.clear();
    encode_message(&defs.messages, &Logout.into_message(), &limits, &mut out).unwrap();
    assert_eq!(out, [109]);
}

#[test]
fn typed_blocks_drive_the_engine() {
    let defs = defs();
    let mut engine = SyncEngine::new(defs.blocks, SyncLimits::default(), WireLimits::default());
    let npc = EntityKey::npc(7);
    let player = EntityKey::player(1);
    let observer = ObserverId::new(1);
    engine.register_entity(npc).unwrap();
    engine.register_entity(player).unwrap();
    engine.add_observer(observer).unwrap();
    engine.track(observer, player).unwrap();
    engine.track(observer, npc).unwrap();

    mark(&mut engine, 7, &Transform(0x0102)).unwrap();
    mark(
        &mut engine,
        7,
        &NpcHit(Hit {
            damage: 3,
            kind: 1,
            current: 7,
            maximum: 10,
        }),
    )
    .unwrap();
    mark(&mut engine, 7, &NpcAnimation(Animation { id: 0x0203, delay: 0 })).unwrap();
    mark(
        &mut engine,
        1,
        &Chat {
            effects: 0,
            rights: 2,
            text: "yo".to_owned(),
        },
    )
    .unwrap();

    let output = engine.tick();
    let npc_frame = &output.updates[&npc];
    // animation, hit, transform; mask 0x250 written as (0x50 | 0x80), 0x02
    assert_eq!(
        npc_frame.as_slice(),
        [
            66, 0, 13, 0, 7, 0xD0, 0x02, 0x03, 0x02, 0, 131, 255, 135, 10, 0x82, 0x01
        ]
    );
    let player_frame = &output.updates[&player];
    assert_eq!(
        player_frame.as_slice(),
        [81, 0, 9, 0, 1, 0x80, 0, 0, 2, b'y', b'o', 0]
    );
    assert_eq!(
        output.payload(observer),
        [player_frame.as_slice(), npc_frame.as_slice()].concat()
    );
}

#[test]
fn oversized_appearance_is_rejected() {
    let defs = defs();
    let mut engine = SyncEngine::new(defs.blocks, SyncLimits::default(), WireLimits::default());
    let player = EntityKey::player(1);
    engine.register_entity(player).unwrap();

    let err = mark(&mut engine, 1, &Appearance(vec![7; 300])).unwrap_err();
    assert!(matches!(
        err,
        SyncError::Block {
            ref block,
            source: CodecError::ValueOutOfRange {
                field: "size",
                value: 300
            },
        } if block == "appearance"
    ));
    assert_eq!(engine.dirty_mask(player), Some(0));
    assert!(engine.tick().updates.is_empty());

    // the largest size that still fits its byte
    mark(&mut engine, 1, &Appearance(vec![7; 255])).unwrap();
    let output = engine.tick();
    let frame = &output.updates[&player];
    assert_eq!(frame[..7], [81, 0x01, 0x03, 0, 1, 0x10, 0x01]);
    assert_eq!(frame.len(), 3 + 259);
}
