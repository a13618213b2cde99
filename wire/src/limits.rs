//! Limits enforced while decoding untrusted buffers.

/// Limits applied to length prefixes, container counts, and nesting depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum bytes in a single string/binary value.
    pub max_length_bytes: usize,
    /// Maximum number of items in a single list/set/map.
    pub max_container_items: usize,
    /// Maximum nesting depth of composite values.
    pub max_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_length_bytes: 16 * 1024 * 1024,
            max_container_items: 1024 * 1024,
            max_depth: 64,
        }
    }
}

impl Limits {
    /// Creates limits suitable for testing with smaller values.
    #[must_use]
    pub const fn for_testing() -> Self {
        Self {
            max_length_bytes: 4096,
            max_container_items: 256,
            max_depth: 16,
        }
    }

    /// Creates limits with no restrictions (use with caution).
    #[must_use]
    pub const fn unlimited() -> Self {
        Self {
            max_length_bytes: usize::MAX,
            max_container_items: usize::MAX,
            max_depth: usize::MAX,
        }
    }
}
