//! Capacity limits for synchronization.

/// Entity and viewport limits.
///
/// Exceeding any of them is a configuration or scale error and fails the
/// registration; nothing is silently truncated.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct SyncLimits {
    /// Entities a single observer may track.
    pub viewport_capacity: usize,
    /// Player slots; valid indices are `0..max_players`.
    pub max_players: usize,
    /// NPC slots; valid indices are `0..max_npcs`.
    pub max_npcs: usize,
}

impl Default for SyncLimits {
    fn default() -> Self {
        Self {
            viewport_capacity: 2048,
            max_players: 2048,
            max_npcs: 32_768,
        }
    }
}

impl SyncLimits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            viewport_capacity: 4,
            max_players: 16,
            max_npcs: 16,
        }
    }

    /// Creates limits bounded only by the 16-bit entity index.
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            viewport_capacity: usize::MAX,
            max_players: 1 << 16,
            max_npcs: 1 << 16,
        }
    }
}
