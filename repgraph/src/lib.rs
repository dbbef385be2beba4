//! Per-tick entity synchronization.
//!
//! Game logic marks update blocks dirty on players and NPCs between ticks.
//! Each [`SyncEngine::tick`] then:
//!
//! 1. flushes every dirty entity into one update frame (index, flag mask,
//!    block bodies in application order), and
//! 2. concatenates, for every observer, the frames of the entities in its
//!    viewport, in the order they were tracked.
//!
//! Block layouts come from a [`schema::BlockRegistry`]; this crate decides
//! what goes into a frame, not how fields are encoded.

mod encode;
mod engine;
mod error;
mod limits;
mod state;
mod types;
mod viewport;

pub use encode::{encode_update, write_mask};
pub use engine::{SyncEngine, TickOutput};
pub use error::{SyncError, SyncResult};
pub use limits::SyncLimits;
pub use state::UpdateState;
pub use types::{EntityKey, ObserverId};
pub use viewport::Viewport;

pub use codec::FieldValue;
pub use schema::EntityKind;
