//! Deterministic load scenario for the tickwire tick.
//!
//! Players walk around a small map sending client frames; NPCs animate, take
//! hits and occasionally transform. Every tick the scenario:
//!
//! - decodes the players' inbound frames into the inbound queue
//! - drains the queue and applies walks and commands
//! - marks NPC and player update blocks
//! - runs the synchronization tick
//!
//! # Design Principles
//!
//! - **Reproducible** - Everything is driven by one seeded [`Rng`].
//! - **Whole pipeline** - Inbound decode, queue hand-off and broadcast all run.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use codec::{
    encode_values, inbound_queue, ConnectionId, Dispatch, FieldValue, FromMessage,
    InboundDecoder, InboundReceiver, InboundSender, QueueConfig, QueueError,
};
use defs::blocks::npc::{NpcAnimation, NpcHit, Transform};
use defs::blocks::player::{PlayerAnimation, PlayerGraphic};
use defs::blocks::{mark, Animation, Graphic, Hit};
use defs::inbound::{Command, Walk};
use repgraph::{EntityKey, ObserverId, SyncEngine, SyncLimits, TickOutput};
use schema::{MessageRegistry, ProtocolDefs};
use serde::Serialize;
use wire::Limits;

const MAP_SIZE: i64 = 64;
const WALK_OPCODE: u8 = 164;
const COMMAND_OPCODE: u8 = 103;

/// Linear congruential generator; good enough for scenarios, never for keys.
#[derive(Debug, Clone)]
pub struct Rng {
    state: u64,
}

impl Rng {
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1);
        (self.state >> 32) as u32
    }

    /// Uniform in `min..=max`.
    pub fn range_i64(&mut self, min: i64, max: i64) -> i64 {
        let span = (max - min).unsigned_abs().max(1) + 1;
        let value = u64::from(self.next_u32()) % span;
        min + value as i64
    }

    /// True with probability `1 / n`.
    pub fn one_in(&mut self, n: u32) -> bool {
        n <= 1 || self.next_u32() % n == 0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScenarioConfig {
    pub players: u16,
    pub npcs: u16,
    /// Chebyshev distance within which an observer tracks entities.
    pub view_distance: i64,
    /// Every n-th tick every NPC is hit at once.
    pub burst_every: Option<u32>,
    pub seed: u64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            players: 16,
            npcs: 128,
            view_distance: 15,
            burst_every: None,
            seed: 1,
        }
    }
}

/// Counters for one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TickStats {
    pub tick: u64,
    pub updates: usize,
    pub large_updates: usize,
    pub inbound: usize,
    pub rejected: usize,
    pub payload_bytes: usize,
}

pub struct Scenario {
    config: ScenarioConfig,
    rng: Rng,
    engine: SyncEngine,
    registry: Arc<MessageRegistry>,
    wire_limits: Limits,
    positions: BTreeMap<EntityKey, (i64, i64)>,
    decoders: Vec<InboundDecoder>,
    sender: InboundSender,
    receiver: InboundReceiver,
    queue_capacity: usize,
}

impl Scenario {
    pub fn new(config: ScenarioConfig, defs: ProtocolDefs) -> Result<Self> {
        let wire_limits = Limits::default();
        let queue = QueueConfig::default();
        let (sender, receiver) = inbound_queue(&queue);
        let registry = Arc::new(defs.messages);
        let engine = SyncEngine::new(defs.blocks, SyncLimits::default(), wire_limits.clone());

        let mut scenario = Self {
            rng: Rng::new(config.seed),
            engine,
            decoders: (0..config.players)
                .map(|index| {
                    InboundDecoder::new(
                        ConnectionId::new(u32::from(index)),
                        Arc::clone(&registry),
                        wire_limits.clone(),
                    )
                })
                .collect(),
            registry,
            wire_limits,
            positions: BTreeMap::new(),
            sender,
            receiver,
            queue_capacity: queue.capacity,
            config,
        };
        scenario.populate()?;
        Ok(scenario)
    }

    #[must_use]
    pub const fn engine(&self) -> &SyncEngine {
        &self.engine
    }

    fn populate(&mut self) -> Result<()> {
        let players = (0..self.config.players).map(EntityKey::player);
        let npcs = (0..self.config.npcs).map(EntityKey::npc);
        for entity in players.chain(npcs) {
            self.engine.register_entity(entity)?;
            let position = (
                self.rng.range_i64(0, MAP_SIZE - 1),
                self.rng.range_i64(0, MAP_SIZE - 1),
            );
            self.positions.insert(entity, position);
        }
        for index in 0..self.config.players {
            self.engine.add_observer(ObserverId::new(u32::from(index)))?;
            self.refresh_viewport(index)?;
        }
        Ok(())
    }

    /// Untracks entities out of view and tracks those in view, nearest
    /// first, until the viewport is full.
    fn refresh_viewport(&mut self, player: u16) -> Result<()> {
        let observer = ObserverId::new(u32::from(player));
        let Some(&(x, y)) = self.positions.get(&EntityKey::player(player)) else {
            return Ok(());
        };
        let distance = |(ox, oy): (i64, i64)| (ox - x).abs().max((oy - y).abs());

        let mut in_view: Vec<_> = self
            .positions
            .iter()
            .filter(|(entity, _)| **entity != EntityKey::player(player))
            .map(|(entity, position)| (distance(*position), *entity))
            .filter(|(d, _)| *d <= self.config.view_distance)
            .collect();
        in_view.sort_unstable();

        let tracked: Vec<_> = self
            .engine
            .viewport(observer)
            .map(|viewport| viewport.iter().collect())
            .unwrap_or_default();
        for entity in tracked {
            if !in_view.iter().any(|(_, visible)| *visible == entity) {
                self.engine.untrack(observer, entity)?;
            }
        }
        for (_, entity) in in_view {
            if self.engine.viewport(observer).is_some_and(|v| v.is_full()) {
                break;
            }
            self.engine.track(observer, entity)?;
        }
        Ok(())
    }

    /// Builds this tick's client frames and runs them through each
    /// connection's decoder into the inbound queue.
    fn client_input(&mut self, stats: &mut TickStats) -> Result<()> {
        for player in 0..self.config.players {
            let mut frame = Vec::new();
            if self.rng.one_in(4) {
                let (x, y) = self.positions[&EntityKey::player(player)];
                let steps: Vec<u8> = (0..self.rng.range_i64(0, 4))
                    .flat_map(|_| {
                        [
                            self.rng.range_i64(-2, 2) as u8,
                            self.rng.range_i64(-2, 2) as u8,
                        ]
                    })
                    .collect();
                let spec = self
                    .registry
                    .inbound(WALK_OPCODE)
                    .context("walk is not defined")?;
                encode_values(
                    spec,
                    WALK_OPCODE,
                    &[
                        FieldValue::Int(3200 + x),
                        FieldValue::Bytes(steps),
                        FieldValue::Int(3200 + y),
                        FieldValue::Int(i64::from(self.rng.one_in(2))),
                    ],
                    &self.wire_limits,
                    &mut frame,
                )?;
            }
            if self.rng.one_in(20) {
                let spec = self
                    .registry
                    .inbound(COMMAND_OPCODE)
                    .context("command is not defined")?;
                let line = format!("anim {}", self.rng.range_i64(0, 900));
                encode_values(
                    spec,
                    COMMAND_OPCODE,
                    &[FieldValue::Text(line)],
                    &self.wire_limits,
                    &mut frame,
                )?;
            }
            if frame.is_empty() {
                continue;
            }

            let decoder = &mut self.decoders[usize::from(player)];
            let mut dispatches = Vec::new();
            decoder.feed(&frame)?;
            decoder.drain(&mut dispatches)?;
            for dispatch in dispatches {
                if let Dispatch::Message(message) = dispatch {
                    match self.sender.try_send(decoder.connection(), message) {
                        Ok(()) => {}
                        Err(QueueError::Full) => stats.rejected += 1,
                        Err(QueueError::Disconnected) => anyhow::bail!("inbound queue closed"),
                    }
                }
            }
        }
        Ok(())
    }

    fn apply_inbound(&mut self, stats: &mut TickStats) -> Result<()> {
        let mut moved = false;
        for inbound in self.receiver.drain(self.queue_capacity) {
            stats.inbound += 1;
            let player = u16::try_from(inbound.connection.raw())?;
            let message = &inbound.message;
            if message.name() == Walk::NAME {
                let walk: Walk = message.to_typed()?;
                if let Some((x, y)) = walk.tiles().last() {
                    let position = (
                        (i64::from(x) - 3200).clamp(0, MAP_SIZE - 1),
                        (i64::from(y) - 3200).clamp(0, MAP_SIZE - 1),
                    );
                    self.positions.insert(EntityKey::player(player), position);
                    moved = true;
                }
            } else if message.name() == Command::NAME {
                let command: Command = message.to_typed()?;
                let id = command
                    .arguments
                    .first()
                    .and_then(|arg| arg.parse().ok())
                    .unwrap_or_default();
                mark(
                    &mut self.engine,
                    player,
                    &PlayerAnimation(Animation { id, delay: 0 }),
                )?;
            }
        }
        if moved {
            for player in 0..self.config.players {
                self.refresh_viewport(player)?;
            }
        }
        Ok(())
    }

    fn world_activity(&mut self, tick: u64) -> Result<()> {
        let burst = self
            .config
            .burst_every
            .is_some_and(|every| every > 0 && tick % u64::from(every) == 0);
        for npc in 0..self.config.npcs {
            if self.rng.one_in(8) {
                let id = self.rng.range_i64(0, 5000) as u16;
                mark(&mut self.engine, npc, &NpcAnimation(Animation { id, delay: 0 }))?;
            }
            if burst || self.rng.one_in(16) {
                let hit = Hit {
                    damage: self.rng.range_i64(0, 20) as u8,
                    kind: 1,
                    current: 50,
                    maximum: 100,
                };
                mark(&mut self.engine, npc, &NpcHit(hit))?;
            }
            if self.rng.one_in(200) {
                mark(&mut self.engine, npc, &Transform(self.rng.range_i64(0, 5000) as u16))?;
            }
        }
        for player in 0..self.config.players {
            if self.rng.one_in(10) {
                let graphic = Graphic {
                    id: self.rng.range_i64(0, 1000) as u16,
                    delay: 0,
                };
                mark(&mut self.engine, player, &PlayerGraphic(graphic))?;
            }
        }
        Ok(())
    }

    /// Runs one full tick and returns its output and counters.
    pub fn run_tick(&mut self) -> Result<(TickOutput, TickStats)> {
        let mut stats = TickStats::default();
        self.client_input(&mut stats)?;
        self.apply_inbound(&mut stats)?;
        self.world_activity(self.engine.tick_count() + 1)?;

        let output = self.engine.tick();
        stats.tick = output.tick;
        stats.updates = output.updates.len();
        stats.large_updates = output
            .updates
            .iter()
            .filter(|(entity, frame)| {
                let set = self.engine.blocks().get(entity.kind);
                frame.first().copied() == set.large_opcode()
            })
            .count();
        stats.payload_bytes = output.payloads.values().map(Vec::len).sum();
        Ok((output, stats))
    }
}
