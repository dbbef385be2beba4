//! The per-tick synchronization engine.

use std::collections::BTreeMap;

use codec::FieldValue;
use schema::{BlockRegistry, EntityKind, UpdateBlockSet};
use tracing::{debug, error, trace, warn};
use wire::Limits;

use crate::encode::encode_update;
use crate::error::{SyncError, SyncResult};
use crate::limits::SyncLimits;
use crate::state::UpdateState;
use crate::types::{EntityKey, ObserverId};
use crate::viewport::Viewport;

/// Frames produced by one tick.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutput {
    /// Tick number, starting at 1.
    pub tick: u64,
    /// One complete update frame per entity that had dirty blocks.
    pub updates: BTreeMap<EntityKey, Vec<u8>>,
    /// Concatenated frames per observer, in viewport insertion order.
    /// Observers with nothing to receive are absent.
    pub payloads: BTreeMap<ObserverId, Vec<u8>>,
}

impl TickOutput {
    #[must_use]
    pub fn payload(&self, observer: ObserverId) -> &[u8] {
        self.payloads.get(&observer).map_or(&[], Vec::as_slice)
    }
}

/// Tracks entity dirty state and observer viewports, and turns them into
/// per-observer payloads once per tick.
///
/// Mutation (marking blocks, tracking entities) happens between ticks.
/// [`tick`](Self::tick) takes `&mut self`, so no mutation can interleave
/// with a flush or a broadcast.
#[derive(Debug)]
pub struct SyncEngine {
    blocks: BlockRegistry,
    limits: SyncLimits,
    wire_limits: Limits,
    entities: BTreeMap<EntityKey, UpdateState>,
    observers: BTreeMap<ObserverId, Viewport>,
    tick: u64,
    scratch: Vec<u8>,
}

impl SyncEngine {
    #[must_use]
    pub fn new(blocks: BlockRegistry, limits: SyncLimits, wire_limits: Limits) -> Self {
        Self {
            blocks,
            limits,
            wire_limits,
            entities: BTreeMap::new(),
            observers: BTreeMap::new(),
            tick: 0,
            scratch: Vec::new(),
        }
    }

    #[must_use]
    pub const fn blocks(&self) -> &BlockRegistry {
        &self.blocks
    }

    #[must_use]
    pub const fn limits(&self) -> &SyncLimits {
        &self.limits
    }

    /// Number of completed ticks.
    #[must_use]
    pub const fn tick_count(&self) -> u64 {
        self.tick
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    #[must_use]
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_registered(&self, entity: EntityKey) -> bool {
        self.entities.contains_key(&entity)
    }

    #[must_use]
    pub fn viewport(&self, observer: ObserverId) -> Option<&Viewport> {
        self.observers.get(&observer)
    }

    /// Dirty mask accumulated for `entity` this tick.
    #[must_use]
    pub fn dirty_mask(&self, entity: EntityKey) -> Option<u16> {
        self.entities.get(&entity).map(UpdateState::mask)
    }

    const fn max_index(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Player => self.limits.max_players,
            EntityKind::Npc => self.limits.max_npcs,
        }
    }

    /// Allocates update state for a new entity.
    pub fn register_entity(&mut self, entity: EntityKey) -> SyncResult<()> {
        let max = self.max_index(entity.kind);
        if usize::from(entity.index) >= max {
            return Err(SyncError::IndexOutOfRange { entity, max });
        }
        if self.entities.contains_key(&entity) {
            return Err(SyncError::DuplicateEntity { entity });
        }
        let state = UpdateState::new(self.blocks.get(entity.kind));
        self.entities.insert(entity, state);
        trace!(%entity, "registered entity");
        Ok(())
    }

    /// Discards an entity's state and removes it from every viewport.
    pub fn unregister_entity(&mut self, entity: EntityKey) -> SyncResult<()> {
        if self.entities.remove(&entity).is_none() {
            return Err(SyncError::UnknownEntity { entity });
        }
        for viewport in self.observers.values_mut() {
            viewport.remove(entity);
        }
        trace!(%entity, "unregistered entity");
        Ok(())
    }

    /// Flags a block dirty with its field values, in declared field order.
    ///
    /// Marking the same block twice before a tick keeps only the last
    /// values.
    pub fn mark_dirty(
        &mut self,
        entity: EntityKey,
        block: &str,
        values: &[FieldValue],
    ) -> SyncResult<()> {
        let state = self
            .entities
            .get_mut(&entity)
            .ok_or(SyncError::UnknownEntity { entity })?;
        state.mark_dirty(self.blocks.get(entity.kind), block, values)
    }

    pub fn add_observer(&mut self, observer: ObserverId) -> SyncResult<()> {
        if self.observers.contains_key(&observer) {
            return Err(SyncError::DuplicateObserver { observer });
        }
        self.observers
            .insert(observer, Viewport::new(self.limits.viewport_capacity));
        Ok(())
    }

    pub fn remove_observer(&mut self, observer: ObserverId) -> SyncResult<()> {
        self.observers
            .remove(&observer)
            .map(|_| ())
            .ok_or(SyncError::UnknownObserver { observer })
    }

    /// Adds `entity` to the observer's viewport. Returns `false` if it was
    /// already tracked.
    pub fn track(&mut self, observer: ObserverId, entity: EntityKey) -> SyncResult<bool> {
        if !self.entities.contains_key(&entity) {
            return Err(SyncError::UnknownEntity { entity });
        }
        let viewport = self
            .observers
            .get_mut(&observer)
            .ok_or(SyncError::UnknownObserver { observer })?;
        let capacity = viewport.capacity();
        viewport.insert(entity).map_err(|()| {
            warn!(%observer, %entity, capacity, "viewport full");
            SyncError::CapacityExceeded { observer, capacity }
        })
    }

    /// Removes `entity` from the observer's viewport. Returns `false` if it
    /// was not tracked.
    pub fn untrack(&mut self, observer: ObserverId, entity: EntityKey) -> SyncResult<bool> {
        let viewport = self
            .observers
            .get_mut(&observer)
            .ok_or(SyncError::UnknownObserver { observer })?;
        Ok(viewport.remove(entity))
    }

    /// Runs one tick: flushes every dirty entity into an update frame, then
    /// builds each observer's payload from its viewport.
    ///
    /// An entity whose frame cannot be built is logged and skipped; its
    /// dirty state is still reset.
    pub fn tick(&mut self) -> TickOutput {
        self.tick += 1;
        let updates = self.flush();
        let payloads = self.broadcast(&updates);
        debug!(
            tick = self.tick,
            updates = updates.len(),
            observers = payloads.len(),
            bytes = payloads.values().map(Vec::len).sum::<usize>(),
            "tick complete"
        );
        TickOutput {
            tick: self.tick,
            updates,
            payloads,
        }
    }

    fn flush(&mut self) -> BTreeMap<EntityKey, Vec<u8>> {
        let mut updates = BTreeMap::new();
        for (&entity, state) in &mut self.entities {
            if !state.is_dirty() {
                continue;
            }
            let set: &UpdateBlockSet = self.blocks.get(entity.kind);
            self.scratch.clear();
            let mask = state.drain_dirty(set, &mut self.scratch);

            let mut frame = Vec::new();
            match encode_update(set, entity, mask, &self.scratch, &self.wire_limits, &mut frame) {
                Ok(_) => {
                    updates.insert(entity, frame);
                }
                Err(err) => error!(%entity, mask, error = %err, "dropping entity update"),
            }
        }
        updates
    }

    fn broadcast(&self, updates: &BTreeMap<EntityKey, Vec<u8>>) -> BTreeMap<ObserverId, Vec<u8>> {
        let mut payloads = BTreeMap::new();
        if updates.is_empty() {
            return payloads;
        }
        for (&observer, viewport) in &self.observers {
            let mut payload = Vec::new();
            for entity in viewport.iter() {
                if let Some(frame) = updates.get(&entity) {
                    payload.extend_from_slice(frame);
                }
            }
            if !payload.is_empty() {
                payloads.insert(observer, payload);
            }
        }
        payloads
    }
}
