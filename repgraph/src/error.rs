//! Error types for entity synchronization.

use codec::CodecError;
use schema::EntityKind;
use wire::WireError;

use crate::types::{EntityKey, ObserverId};

/// Result type for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;

/// Errors raised by the synchronization engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    #[error("{entity} is already registered")]
    DuplicateEntity { entity: EntityKey },

    #[error("{entity} is not registered")]
    UnknownEntity { entity: EntityKey },

    #[error("{entity} is outside the {max} slots for its kind")]
    IndexOutOfRange { entity: EntityKey, max: usize },

    #[error("{kind} has no block named {block}")]
    UnknownBlock { kind: EntityKind, block: String },

    #[error("block {block}: {source}")]
    Block { block: String, source: CodecError },

    #[error("{observer} is already registered")]
    DuplicateObserver { observer: ObserverId },

    #[error("{observer} is not registered")]
    UnknownObserver { observer: ObserverId },

    /// The observer's viewport is full; the entity was not added.
    #[error("viewport of {observer} is full ({capacity} entities)")]
    CapacityExceeded {
        observer: ObserverId,
        capacity: usize,
    },

    #[error("update frame for {entity}: {source}")]
    Frame { entity: EntityKey, source: WireError },
}
