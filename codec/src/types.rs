//! Core types for the codec.

use std::fmt;

/// Identifies one client connection.
///
/// Assigned by the network layer and stable for the lifetime of the
/// connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct ConnectionId(u32);

impl ConnectionId {
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for ConnectionId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl From<ConnectionId> for u32 {
    fn from(id: ConnectionId) -> Self {
        id.0
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn connection_id_roundtrip() {
        let id: ConnectionId = 42u32.into();
        assert_eq!(id.raw(), 42);
        assert_eq!(u32::from(id), 42);
    }

    #[test]
    fn connection_id_display() {
        assert_eq!(ConnectionId::new(7).to_string(), "conn#7");
    }

    #[test]
    fn connection_id_const() {
        const ID: ConnectionId = ConnectionId::new(999);
        assert_eq!(ID.raw(), 999);
    }
}
