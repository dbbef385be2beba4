//! Configurable limits for bounded framing.

/// Wire-level limits for frame encoding and decoding.
///
/// These limits are enforced before any body byte is interpreted, so a
/// hostile length prefix can never make a connection buffer unbounded input.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "kebab-case"))]
pub struct Limits {
    /// Maximum body size of a single frame in bytes.
    pub max_frame_body: usize,

    /// Maximum number of bytes a connection may buffer while waiting for a
    /// frame to complete.
    pub max_pending_bytes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // Large enough for a region rebuild with every key attached
            max_frame_body: 40_000,
            max_pending_bytes: 64 * 1024,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_frame_body: 512,
            max_pending_bytes: 2048,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_frame_body: usize::MAX,
            max_pending_bytes: usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits_cover_short_frames() {
        let limits = Limits::default();
        assert!(limits.max_frame_body >= 5000);
        assert!(limits.max_pending_bytes >= limits.max_frame_body);
    }

    #[test]
    fn testing_limits_smaller() {
        let test_limits = Limits::for_testing();
        let default_limits = Limits::default();

        assert!(test_limits.max_frame_body < default_limits.max_frame_body);
        assert!(test_limits.max_pending_bytes < default_limits.max_pending_bytes);
    }

    #[test]
    fn unlimited_limits() {
        let limits = Limits::unlimited();
        assert_eq!(limits.max_frame_body, usize::MAX);
        assert_eq!(limits.max_pending_bytes, usize::MAX);
    }

    #[test]
    fn limits_const_constructible() {
        const LIMITS: Limits = Limits::for_testing();
        assert_eq!(LIMITS.max_frame_body, 512);
    }
}
