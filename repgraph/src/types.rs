//! Identifiers for synchronized entities and their observers.

use std::fmt;

use codec::ConnectionId;
use schema::EntityKind;

/// A player or NPC slot.
///
/// Ordering is by kind, then index, which is also the flush order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityKey {
    pub kind: EntityKind,
    pub index: u16,
}

impl EntityKey {
    #[must_use]
    pub const fn player(index: u16) -> Self {
        Self {
            kind: EntityKind::Player,
            index,
        }
    }

    #[must_use]
    pub const fn npc(index: u16) -> Self {
        Self {
            kind: EntityKind::Npc,
            index,
        }
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.kind, self.index)
    }
}

/// A connection receiving update broadcasts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ObserverId(u32);

impl ObserverId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<ConnectionId> for ObserverId {
    fn from(connection: ConnectionId) -> Self {
        Self(connection.raw())
    }
}

impl fmt::Display for ObserverId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "observer#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_order_by_kind_then_index() {
        let mut keys = vec![EntityKey::npc(1), EntityKey::player(9), EntityKey::player(2)];
        keys.sort();
        assert_eq!(
            keys,
            [EntityKey::player(2), EntityKey::player(9), EntityKey::npc(1)]
        );
    }

    #[test]
    fn display() {
        assert_eq!(EntityKey::npc(12).to_string(), "npc#12");
        assert_eq!(ObserverId::from(ConnectionId::new(4)).to_string(), "observer#4");
    }
}
