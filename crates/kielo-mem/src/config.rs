//! Per-arena growth tuning.

use crate::align::{KILOBYTE, is_valid_alignment};

/// Default size quantum for blocks chained onto a dynamic arena (1 KiB).
pub const DEFAULT_GROWTH_QUANTUM: usize = KILOBYTE;

/// Default chunk committed at a time by a virtual arena (16 KiB).
pub const DEFAULT_COMMIT_GRANULARITY: usize = 16 * KILOBYTE;

/// Growth parameters for dynamic and virtual arenas.
///
/// Buffer arenas never grow and ignore both values.
///
/// # Examples
///
/// ```
/// use kielo_mem::ArenaConfig;
///
/// let config = ArenaConfig::default()
///     .with_growth_quantum(4096)
///     .with_commit_granularity(64 * 1024);
///
/// assert_eq!(config.growth_quantum(), 4096);
/// assert_eq!(config.commit_granularity(), 64 * 1024);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    growth_quantum: usize,
    commit_granularity: usize,
}

impl ArenaConfig {
    /// Creates a configuration with the default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            growth_quantum: DEFAULT_GROWTH_QUANTUM,
            commit_granularity: DEFAULT_COMMIT_GRANULARITY,
        }
    }

    /// Sets the quantum that new dynamic blocks are rounded up to.
    ///
    /// # Panics
    ///
    /// Panics unless `bytes` is a power of two greater than zero.
    #[must_use]
    #[track_caller]
    pub fn with_growth_quantum(mut self, bytes: usize) -> Self {
        contract!(
            is_valid_alignment(bytes),
            "growth quantum {bytes} must be a power of two greater than zero"
        );
        self.growth_quantum = bytes;
        self
    }

    /// Sets how much a virtual arena commits at a time.
    ///
    /// Values below the OS page size are raised to the page size when the
    /// arena is created.
    ///
    /// # Panics
    ///
    /// Panics unless `bytes` is a power of two greater than zero.
    #[must_use]
    #[track_caller]
    pub fn with_commit_granularity(mut self, bytes: usize) -> Self {
        contract!(
            is_valid_alignment(bytes),
            "commit granularity {bytes} must be a power of two greater than zero"
        );
        self.commit_granularity = bytes;
        self
    }

    /// Quantum that new dynamic blocks are rounded up to.
    #[inline]
    #[must_use]
    pub const fn growth_quantum(&self) -> usize {
        self.growth_quantum
    }

    /// Bytes a virtual arena commits at a time.
    #[inline]
    #[must_use]
    pub const fn commit_granularity(&self) -> usize {
        self.commit_granularity
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new()
    }
}
