//! Tick cost: marking plus flush and broadcast, and the full scenario step.

use std::sync::Arc;

use codec::{encode_values, ConnectionId, FieldValue, InboundDecoder};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use defs::blocks::npc::{NpcAnimation, NpcHit};
use defs::blocks::{mark, Animation, Hit};
use repgraph::{EntityKey, ObserverId, SyncEngine, SyncLimits};
use simbench::{Scenario, ScenarioConfig};
use wire::Limits;

const OBSERVERS: u32 = 32;

fn engine(npcs: u16) -> SyncEngine {
    let defs = defs::load().unwrap();
    let mut engine = SyncEngine::new(defs.blocks, SyncLimits::default(), Limits::default());
    for index in 0..npcs {
        engine.register_entity(EntityKey::npc(index)).unwrap();
    }
    for observer in 0..OBSERVERS {
        let observer = ObserverId::new(observer);
        engine.add_observer(observer).unwrap();
        for index in (0..npcs).step_by(2) {
            engine.track(observer, EntityKey::npc(index)).unwrap();
        }
    }
    engine
}

fn bench_engine_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("sync_tick");

    for npcs in [128u16, 1024, 4096] {
        let mut engine = engine(npcs);
        let hit = NpcHit(Hit {
            damage: 12,
            kind: 1,
            current: 40,
            maximum: 99,
        });
        let animation = NpcAnimation(Animation { id: 422, delay: 0 });

        group.throughput(Throughput::Elements(u64::from(npcs)));
        group.bench_with_input(BenchmarkId::new("all_dirty", npcs), &npcs, |b, &npcs| {
            b.iter(|| {
                for index in 0..npcs {
                    mark(&mut engine, index, &hit).unwrap();
                    mark(&mut engine, index, &animation).unwrap();
                }
                black_box(engine.tick());
            });
        });
    }

    group.finish();
}

fn bench_scenario(c: &mut Criterion) {
    let mut group = c.benchmark_group("scenario");

    for players in [16u16, 64] {
        let config = ScenarioConfig {
            players,
            npcs: players * 8,
            ..ScenarioConfig::default()
        };
        let mut scenario = Scenario::new(config, defs::load().unwrap()).unwrap();
        group.bench_with_input(BenchmarkId::new("run_tick", players), &players, |b, _| {
            b.iter(|| black_box(scenario.run_tick().unwrap()));
        });
    }

    group.finish();
}

fn bench_inbound_decode(c: &mut Criterion) {
    let defs = defs::load().unwrap();
    let registry = Arc::new(defs.messages);
    let spec = registry.inbound(164).unwrap();
    let mut stream = Vec::new();
    for step in 0..256i64 {
        encode_values(
            spec,
            164,
            &[
                FieldValue::Int(3200 + step),
                FieldValue::Bytes(vec![1, 1, 1, 0]),
                FieldValue::Int(3200),
                FieldValue::Int(0),
            ],
            &Limits::default(),
            &mut stream,
        )
        .unwrap();
    }

    let mut group = c.benchmark_group("inbound");
    group.throughput(Throughput::Bytes(stream.len() as u64));
    group.bench_function("walk_stream", |b| {
        b.iter(|| {
            let mut decoder =
                InboundDecoder::new(ConnectionId::new(1), Arc::clone(&registry), Limits::default());
            let mut out = Vec::with_capacity(256);
            for chunk in stream.chunks(512) {
                decoder.feed(chunk).unwrap();
                decoder.drain(&mut out).unwrap();
            }
            black_box(out.len())
        });
    });
    group.finish();
}

criterion_group!(benches, bench_engine_tick, bench_scenario, bench_inbound_decode);
criterion_main!(benches);
