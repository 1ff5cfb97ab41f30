//! Checkpoint-and-rollback scopes over an arena.
//!
//! [`Arena::begin_region`] records the current position and returns a
//! [`Region`] token; [`Arena::end_region`] rolls the arena back to that
//! position, discarding everything allocated in between in O(1). Regions
//! nest and must end in the reverse order they began.
//!
//! [`Arena::scope`] wraps the pair in a guard that ends the region when it
//! goes out of scope:
//!
//! ```
//! use kielo_mem::{Arena, ArenaConfig};
//!
//! let mut arena = Arena::dynamic(ArenaConfig::default())?;
//! let keep = arena.alloc(64, 8)?;
//! let before = arena.offset();
//!
//! {
//!     let mut scratch = arena.scope();
//!     scratch.alloc(512, 8)?;
//!     assert!(scratch.offset() > before);
//! }
//!
//! assert_eq!(arena.offset(), before);
//! assert!(arena.resize_in_place(keep, 96));
//! # Ok::<(), kielo_mem::Error>(())
//! ```

use std::ops::{Deref, DerefMut};

use kielo_log::trace;

use crate::arena::{Arena, Position};

/// Token for an open region, returned by [`Arena::begin_region`].
///
/// Must be handed back to [`Arena::end_region`] on the arena that created
/// it. Dropping it without ending the region leaves the arena's region count
/// raised, which makes a later [`Arena::reset`] fatal.
#[derive(Debug)]
#[must_use = "a region must be ended with `Arena::end_region`"]
pub struct Region {
    arena: u64,
    saved: Position,
    last_allocation: Option<usize>,
    depth: u32,
}

impl Region {
    /// Offset the arena returns to when this region ends.
    #[inline]
    #[must_use]
    pub fn saved_offset(&self) -> usize {
        self.saved.offset
    }

    /// Nesting depth, starting at 1 for the outermost region.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> u32 {
        self.depth
    }
}

impl<'buf> Arena<'buf> {
    /// Opens a region at the current position.
    ///
    /// The allocation that was most recent before the region cannot be
    /// resized while the region is open; that ability returns when the
    /// region ends.
    pub fn begin_region(&mut self) -> Region {
        let region = Region {
            arena: self.id(),
            saved: self.position(),
            last_allocation: self.last_allocation(),
            depth: self.region_count + 1,
        };
        self.seal_last_allocation();
        self.region_count = region.depth;
        trace!(
            "region {} opened at offset {}",
            region.depth, region.saved.offset
        );
        region
    }

    /// Ends `region`, discarding every allocation made since it began.
    ///
    /// # Panics
    ///
    /// Panics if `region` belongs to another arena, is not the innermost
    /// open region, or if the arena has moved below the region's saved
    /// position.
    #[track_caller]
    pub fn end_region(&mut self, region: Region) {
        contract!(
            region.arena == self.id(),
            "region ended on an arena that did not open it"
        );
        contract!(self.region_count > 0, "no region is open on this arena");
        contract!(
            region.depth == self.region_count,
            "region {} ended while region {} is still open",
            region.depth,
            self.region_count
        );
        contract!(
            self.position() >= region.saved,
            "arena offset {} is below the region's saved offset {}",
            self.offset(),
            region.saved.offset
        );

        trace!(
            "region {} closed, releasing back to offset {}",
            region.depth, region.saved.offset
        );
        self.rewind(region.saved, region.last_allocation);
        self.region_count -= 1;
    }

    /// Opens a region that ends when the returned guard is dropped.
    ///
    /// The guard dereferences to the arena, so allocations go through it.
    pub fn scope(&mut self) -> RegionScope<'_, 'buf> {
        let region = self.begin_region();
        RegionScope {
            arena: self,
            region: Some(region),
        }
    }

    fn is_innermost(&self, region: &Region) -> bool {
        region.arena == self.id()
            && region.depth == self.region_count
            && self.position() >= region.saved
    }
}

/// Guard returned by [`Arena::scope`].
#[must_use = "the region ends as soon as the guard is dropped"]
pub struct RegionScope<'a, 'buf> {
    arena: &'a mut Arena<'buf>,
    region: Option<Region>,
}

impl RegionScope<'_, '_> {
    /// Ends the region now.
    #[track_caller]
    pub fn end(mut self) {
        if let Some(region) = self.region.take() {
            self.arena.end_region(region);
        }
    }
}

impl<'buf> Deref for RegionScope<'_, 'buf> {
    type Target = Arena<'buf>;

    fn deref(&self) -> &Self::Target {
        self.arena
    }
}

impl DerefMut for RegionScope<'_, '_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.arena
    }
}

impl Drop for RegionScope<'_, '_> {
    fn drop(&mut self) {
        let Some(region) = self.region.take() else {
            return;
        };
        // A second panic while unwinding would abort.
        if std::thread::panicking() && !self.arena.is_innermost(&region) {
            return;
        }
        self.arena.end_region(region);
    }
}
