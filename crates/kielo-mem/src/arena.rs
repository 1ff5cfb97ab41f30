//! Single-owner bump allocator with three growth strategies.
//!
//! An [`Arena`] hands out memory by advancing an offset through a contiguous
//! backing range. What happens when the range runs out depends on its
//! [`ArenaKind`]:
//!
//! - [`ArenaKind::Buffer`]: the caller's buffer is all there is; the request
//!   fails with [`Error::ArenaFull`].
//! - [`ArenaKind::Dynamic`]: the arena moves its frontier to the next block
//!   of its chain, allocating a fresh heap block sized to the request
//!   (rounded up to the configured growth quantum) when the chain ends.
//! - [`ArenaKind::Virtual`]: the arena owns one large address space
//!   reservation and commits another chunk of it, so the range never moves.
//!
//! Every allocation is zero-filled. Only the most recent allocation can be
//! resized in place; arenas never free individual allocations. Memory comes
//! back either through [`Arena::reset`] or by ending a
//! [`Region`](crate::region::Region).
//!
//! # Examples
//!
//! ```
//! use kielo_mem::{Arena, Error};
//!
//! let mut storage = [0u8; 256];
//! let mut arena = Arena::from_buffer(&mut storage);
//!
//! let header = arena.alloc(16, 8)?;
//! assert_eq!(header.as_ptr().addr() % 8, 0);
//!
//! assert!(matches!(arena.alloc(1024, 1), Err(Error::ArenaFull { .. })));
//! # Ok::<(), kielo_mem::Error>(())
//! ```

use std::fmt;
use std::marker::PhantomData;
use std::mem;
use std::ptr::NonNull;
use std::sync::atomic::{AtomicU64, Ordering};

use kielo_log::{debug, trace, warn};

use crate::align::{align_forward, align_padding, is_valid_alignment, mem_copy_no_overlap, mem_set};
use crate::config::ArenaConfig;
use crate::error::{Error, Result};
use crate::heap::{heap_alloc, heap_free};
use crate::vm::{Reservation, page_size};

static NEXT_ARENA_ID: AtomicU64 = AtomicU64::new(1);

/// Growth strategy of an [`Arena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArenaKind {
    /// Fixed caller-owned buffer; never grows.
    Buffer,
    /// Chains additional heap blocks on overflow.
    Dynamic,
    /// Commits pages of a single reservation on demand.
    Virtual,
}

/// Snapshot of an arena's bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArenaStats {
    /// Growth strategy.
    pub kind: ArenaKind,
    /// Bump offset within the current backing range.
    pub offset: usize,
    /// Size of the current backing range.
    pub capacity: usize,
    /// Bytes of the current range that are safe to touch.
    pub committed: usize,
    /// Backing ranges owned or borrowed by the arena.
    pub block_count: usize,
    /// Regions begun and not yet ended.
    pub region_count: u32,
    /// Commit calls made by a virtual arena.
    pub commit_count: usize,
}

/// A location in an arena: which block of the chain, and how far into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct Position {
    pub(crate) block: usize,
    pub(crate) offset: usize,
}

/// One backing range of a dynamic arena.
struct Block {
    base: NonNull<u8>,
    capacity: usize,
    /// Heap blocks are released on drop; the caller's buffer is not.
    owned: bool,
}

impl Block {
    fn borrowed(buf: &mut [u8]) -> Self {
        let capacity = buf.len();
        Self {
            base: NonNull::from(buf).cast(),
            capacity,
            owned: false,
        }
    }

    fn from_heap(capacity: usize, align: usize) -> Result<Self> {
        Ok(Self {
            base: heap_alloc(capacity, align)?,
            capacity,
            owned: true,
        })
    }

    fn contains(&self, addr: usize) -> bool {
        let base = self.base.as_ptr().addr();
        addr >= base && addr - base <= self.capacity
    }
}

impl Drop for Block {
    fn drop(&mut self) {
        if self.owned {
            // SAFETY: owned blocks come from heap_alloc and are dropped once.
            unsafe { heap_free(self.base) }
        }
    }
}

enum Backing {
    Buffer,
    Dynamic {
        blocks: Vec<Block>,
    },
    Virtual {
        reservation: Reservation,
        granularity: usize,
        commits: usize,
    },
}

/// Commits enough of `reservation` past `committed` to cover `end`.
///
/// Commits at least `granularity` bytes, or the whole shortfall rounded up to
/// pages when that is larger, capped at what is left of the reservation.
/// Returns the number of bytes committed.
fn commit_chunk(
    reservation: &mut Reservation,
    granularity: usize,
    committed: usize,
    end: usize,
) -> Result<usize> {
    let remaining = reservation.len() - committed;
    let shortfall = align_forward(end - committed, page_size()).ok_or(Error::SizeOverflow)?;
    let chunk = granularity.max(shortfall).min(remaining);
    reservation.commit(committed, chunk)?;
    debug!(
        "committed {chunk} bytes at offset {committed} ({} of {} reserved)",
        committed + chunk,
        reservation.len()
    );
    Ok(chunk)
}

/// Single-owner bump allocator.
///
/// `'buf` is the lifetime of a caller-provided buffer; arenas that own all
/// of their memory are `Arena<'static>`.
///
/// # Thread Safety
///
/// An arena may be moved to another thread but is never shared: every
/// allocating method takes `&mut self`. Give each thread its own arena, or
/// serialize access externally.
pub struct Arena<'buf> {
    /// Base of the current backing range.
    data: NonNull<u8>,
    /// Bump cursor, `offset <= committed`.
    offset: usize,
    /// Size of the current backing range (reserved size for virtual arenas).
    capacity: usize,
    /// Bytes from `data` that are backed by memory, `committed <= capacity`.
    committed: usize,
    /// Offset of the most recent allocation in the current range.
    last_allocation: Option<usize>,
    /// Regions begun and not yet ended.
    pub(crate) region_count: u32,
    /// Index of the current block in a dynamic chain; zero otherwise.
    block: usize,
    backing: Backing,
    config: ArenaConfig,
    id: u64,
    _buffer: PhantomData<&'buf mut [u8]>,
}

// SAFETY: the arena exclusively owns its heap blocks and reservation, and a
// borrowed buffer is a `&mut [u8]`, which is Send. Nothing is shared.
unsafe impl Send for Arena<'_> {}

impl<'buf> Arena<'buf> {
    fn from_parts(
        data: NonNull<u8>,
        capacity: usize,
        committed: usize,
        backing: Backing,
        config: ArenaConfig,
    ) -> Self {
        Self {
            data,
            offset: 0,
            capacity,
            committed,
            last_allocation: None,
            region_count: 0,
            block: 0,
            backing,
            config,
            id: NEXT_ARENA_ID.fetch_add(1, Ordering::Relaxed),
            _buffer: PhantomData,
        }
    }

    /// Creates a fixed-size arena over `buf`.
    ///
    /// Requests that do not fit in what is left of `buf` fail with
    /// [`Error::ArenaFull`]. The buffer is only borrowed and is never freed
    /// by the arena.
    #[must_use]
    pub fn from_buffer(buf: &'buf mut [u8]) -> Self {
        let capacity = buf.len();
        Self::from_parts(
            NonNull::from(buf).cast(),
            capacity,
            capacity,
            Backing::Buffer,
            ArenaConfig::default(),
        )
    }

    /// Creates a dynamic arena that starts in `buf` and chains heap blocks
    /// once it is full.
    #[must_use]
    pub fn dynamic_from_buffer(buf: &'buf mut [u8], config: ArenaConfig) -> Self {
        let first = Block::borrowed(buf);
        let (data, capacity) = (first.base, first.capacity);
        Self::from_parts(
            data,
            capacity,
            capacity,
            Backing::Dynamic {
                blocks: vec![first],
            },
            config,
        )
    }

    /// Returns the growth strategy.
    #[inline]
    #[must_use]
    pub fn kind(&self) -> ArenaKind {
        match self.backing {
            Backing::Buffer => ArenaKind::Buffer,
            Backing::Dynamic { .. } => ArenaKind::Dynamic,
            Backing::Virtual { .. } => ArenaKind::Virtual,
        }
    }

    /// Bump offset within the current backing range.
    #[inline]
    #[must_use]
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Size of the current backing range.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes of the current backing range that are backed by memory.
    #[inline]
    #[must_use]
    pub fn committed(&self) -> usize {
        self.committed
    }

    /// Bytes left in the current backing range, committed or not.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.capacity - self.offset
    }

    /// Number of regions begun and not yet ended.
    #[inline]
    #[must_use]
    pub fn region_count(&self) -> u32 {
        self.region_count
    }

    /// Growth configuration.
    #[inline]
    #[must_use]
    pub fn config(&self) -> &ArenaConfig {
        &self.config
    }

    /// Returns allocation statistics for this arena.
    #[must_use]
    pub fn stats(&self) -> ArenaStats {
        let (block_count, commit_count) = match &self.backing {
            Backing::Buffer => (1, 0),
            Backing::Dynamic { blocks } => (blocks.len(), 0),
            Backing::Virtual { commits, .. } => (1, *commits),
        };
        ArenaStats {
            kind: self.kind(),
            offset: self.offset,
            capacity: self.capacity,
            committed: self.committed,
            block_count,
            region_count: self.region_count,
            commit_count,
        }
    }

    /// Allocates `size` zeroed bytes aligned to `align`.
    ///
    /// # Errors
    ///
    /// - [`Error::ArenaFull`] when a buffer arena has no room left.
    /// - [`Error::HeapExhausted`] when a dynamic arena cannot get a new block.
    /// - [`Error::ReservationExhausted`] or [`Error::CommitFailed`] when a
    ///   virtual arena cannot grow.
    ///
    /// On error the arena is left unchanged, apart from a dynamic arena
    /// possibly having moved to a later block.
    ///
    /// # Panics
    ///
    /// Panics if `align` is not a power of two greater than zero.
    #[track_caller]
    pub fn alloc(&mut self, size: usize, align: usize) -> Result<NonNull<u8>> {
        contract!(
            is_valid_alignment(align),
            "alignment {align} must be a power of two greater than zero"
        );

        loop {
            let current = self.data.as_ptr().addr().wrapping_add(self.offset);
            let padding = align_padding(current, align);
            let required = padding.checked_add(size).ok_or(Error::SizeOverflow)?;

            if required <= self.committed - self.offset {
                return Ok(self.bump(padding, size));
            }

            self.grow(required, size, align)?;
        }
    }

    #[inline(always)]
    fn bump(&mut self, padding: usize, size: usize) -> NonNull<u8> {
        let start = self.offset + padding;
        // SAFETY: start + size <= committed, so the range lies inside the
        // committed part of the current block.
        let ptr = unsafe { self.data.add(start) };
        // SAFETY: same range as above; it is writable memory we own.
        unsafe { mem_set(ptr.as_ptr(), 0, size) };
        self.offset = start + size;
        self.last_allocation = Some(start);
        ptr
    }

    #[cold]
    fn grow(&mut self, required: usize, size: usize, align: usize) -> Result<()> {
        match &mut self.backing {
            Backing::Buffer => Err(Error::ArenaFull {
                requested: required,
                available: self.capacity - self.offset,
            }),
            Backing::Dynamic { blocks } => {
                let next = self.block + 1;
                if next == blocks.len() {
                    let capacity = align_forward(size.max(1), self.config.growth_quantum())
                        .ok_or(Error::SizeOverflow)?;
                    let block_align = align.max(2 * mem::size_of::<usize>());
                    blocks.push(Block::from_heap(capacity, block_align)?);
                    debug!(
                        "dynamic arena chained block #{next} of {capacity} bytes for a {size} byte request"
                    );
                }
                self.enter_block(next);
                self.last_allocation = None;
                self.offset = 0;
                Ok(())
            }
            Backing::Virtual { .. } => {
                let available = self.capacity - self.offset;
                if required > available {
                    return Err(Error::ReservationExhausted {
                        requested: required,
                        available,
                    });
                }
                self.ensure_committed(self.offset + required)
            }
        }
    }

    /// Makes `[0, end)` of the current range safe to touch.
    fn ensure_committed(&mut self, end: usize) -> Result<()> {
        if end <= self.committed {
            return Ok(());
        }
        match &mut self.backing {
            Backing::Virtual {
                reservation,
                granularity,
                commits,
            } => {
                let chunk = commit_chunk(reservation, *granularity, self.committed, end)?;
                self.committed += chunk;
                *commits += 1;
                Ok(())
            }
            Backing::Buffer | Backing::Dynamic { .. } => Err(Error::ArenaFull {
                requested: end - self.offset,
                available: self.committed - self.offset,
            }),
        }
    }

    fn enter_block(&mut self, index: usize) {
        if let Backing::Dynamic { blocks } = &self.backing {
            let block = &blocks[index];
            self.data = block.base;
            self.capacity = block.capacity;
            self.committed = block.capacity;
            self.block = index;
        }
    }

    fn owns(&self, addr: usize) -> bool {
        match &self.backing {
            Backing::Dynamic { blocks } => blocks.iter().any(|block| block.contains(addr)),
            Backing::Buffer | Backing::Virtual { .. } => {
                let base = self.data.as_ptr().addr();
                addr >= base && addr - base <= self.capacity
            }
        }
    }

    /// Grows or shrinks the most recent allocation to `new_size` bytes
    /// without moving it.
    ///
    /// Returns `false`, changing nothing, when `ptr` is not the most recent
    /// allocation or the new size does not fit in the current range. Bytes
    /// gained by growing are zeroed.
    ///
    /// An allocation made before the innermost open region counts as not
    /// the most recent one until that region ends.
    ///
    /// # Panics
    ///
    /// Panics if `ptr` does not point into memory owned by this arena.
    #[track_caller]
    pub fn resize_in_place(&mut self, ptr: NonNull<u8>, new_size: usize) -> bool {
        let addr = ptr.as_ptr().addr();
        contract!(
            self.owns(addr),
            "pointer {addr:#x} is not owned by this arena"
        );

        let base = self.data.as_ptr().addr();
        let Some(last) = self.last_allocation.filter(|&last| base + last == addr) else {
            trace!("cannot resize {addr:#x} in place: not the most recent allocation");
            return false;
        };
        let Some(end) = last.checked_add(new_size).filter(|&end| end <= self.capacity) else {
            trace!("cannot resize {addr:#x} in place to {new_size} bytes: range exhausted");
            return false;
        };
        if self.ensure_committed(end).is_err() {
            return false;
        }

        if end > self.offset {
            // SAFETY: [offset, end) is committed memory of the current block.
            unsafe { mem_set(self.data.as_ptr().add(self.offset), 0, end - self.offset) };
        }
        trace!(
            "resized {addr:#x} in place from {} to {new_size} bytes",
            self.offset - last
        );
        self.offset = end;
        true
    }

    /// Resizes an allocation, moving it only when it cannot be resized in
    /// place.
    ///
    /// With `ptr == None` this is [`Arena::alloc`]. Otherwise the
    /// allocation is first resized in place; failing that, a fresh block of
    /// `new_size` bytes is allocated and the first `min(old_size, new_size)`
    /// bytes are copied over. The old block is not reclaimed.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc`].
    ///
    /// # Panics
    ///
    /// Panics if `new_size` is zero, if `ptr` is given with an `old_size` of
    /// zero, if `ptr` is not owned by this arena, or if `align` is invalid.
    #[track_caller]
    pub fn realloc(
        &mut self,
        ptr: Option<NonNull<u8>>,
        old_size: usize,
        new_size: usize,
        align: usize,
    ) -> Result<NonNull<u8>> {
        contract!(new_size > 0, "cannot reallocate to zero bytes");
        let Some(ptr) = ptr else {
            return self.alloc(new_size, align);
        };
        contract!(old_size > 0, "cannot reallocate a zero-sized allocation");

        if self.resize_in_place(ptr, new_size) {
            return Ok(ptr);
        }

        let fresh = self.alloc(new_size, align)?;
        // SAFETY: `ptr` is a live allocation of at least `old_size` bytes and
        // `fresh` was just carved out past every existing allocation.
        unsafe { mem_copy_no_overlap(fresh.as_ptr(), ptr.as_ptr(), old_size.min(new_size)) };
        Ok(fresh)
    }

    /// Rewinds the arena to its start, making all memory reusable.
    ///
    /// Pointers handed out before the reset must no longer be used. Chained
    /// blocks and committed pages are kept for reuse.
    ///
    /// # Panics
    ///
    /// Panics if any region is still open.
    #[track_caller]
    pub fn reset(&mut self) {
        contract!(
            self.region_count == 0,
            "arena reset with {} open region(s)",
            self.region_count
        );
        self.enter_block(0);
        self.offset = 0;
        self.last_allocation = None;
    }

    /// Moves `value` into the arena.
    ///
    /// The value is never dropped; the arena does not run destructors.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc`].
    pub fn alloc_value<T>(&mut self, value: T) -> Result<NonNull<T>> {
        let ptr = self
            .alloc(mem::size_of::<T>(), mem::align_of::<T>())?
            .cast::<T>();
        // SAFETY: freshly allocated, sized and aligned for T.
        unsafe { ptr.write(value) };
        Ok(ptr)
    }

    /// Allocates zeroed storage for `count` values of `T`.
    ///
    /// The storage is only initialized if all-zero bytes are a valid `T`.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc`], plus [`Error::SizeOverflow`] when the total
    /// size overflows.
    pub fn alloc_array<T>(&mut self, count: usize) -> Result<NonNull<T>> {
        let size = mem::size_of::<T>()
            .checked_mul(count)
            .ok_or(Error::SizeOverflow)?;
        Ok(self.alloc(size, mem::align_of::<T>())?.cast())
    }

    /// Copies `s` into the arena.
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc`].
    pub fn alloc_str(&mut self, s: &str) -> Result<NonNull<str>> {
        let ptr = self.alloc(s.len(), 1)?;
        // SAFETY: `ptr` is a fresh allocation of s.len() bytes.
        unsafe { mem_copy_no_overlap(ptr.as_ptr(), s.as_ptr(), s.len()) };
        Ok(str_ptr(ptr, s.len()))
    }

    /// Formats `args` directly into arena memory.
    ///
    /// The text grows as the most recent allocation, so formatting does not
    /// leave partial copies behind unless the current range runs out midway.
    /// If a `Display` implementation reports an error, the text written up to
    /// that point is returned. If the arena runs out of memory midway, the
    /// partial text is released again.
    ///
    /// ```
    /// use kielo_mem::{Arena, ArenaConfig};
    ///
    /// let mut arena = Arena::dynamic(ArenaConfig::default())?;
    /// let line = arena.alloc_fmt(format_args!("{}:{}: {}", "main.k", 12, "unclosed string"))?;
    /// assert_eq!(unsafe { line.as_ref() }, "main.k:12: unclosed string");
    /// # Ok::<(), kielo_mem::Error>(())
    /// ```
    ///
    /// # Errors
    ///
    /// Same as [`Arena::alloc`].
    pub fn alloc_fmt(&mut self, args: fmt::Arguments<'_>) -> Result<NonNull<str>> {
        if let Some(s) = args.as_str() {
            return self.alloc_str(s);
        }

        let (saved, saved_last) = (self.position(), self.last_allocation());
        let mut writer = ArenaWriter {
            arena: &mut *self,
            start: None,
            len: 0,
            error: None,
        };
        // A formatting error without a recorded allocation error came from
        // a Display impl; keep what was written.
        let _ = fmt::write(&mut writer, args);

        let ArenaWriter {
            start, len, error, ..
        } = writer;
        if let Some(err) = error {
            self.rewind(saved, saved_last);
            return Err(err);
        }
        match start {
            Some(ptr) => Ok(str_ptr(ptr, len)),
            None => self.alloc_str(""),
        }
    }

    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn position(&self) -> Position {
        Position {
            block: self.block,
            offset: self.offset,
        }
    }

    pub(crate) fn last_allocation(&self) -> Option<usize> {
        self.last_allocation
    }

    /// Hides the most recent allocation from resizing.
    pub(crate) fn seal_last_allocation(&mut self) {
        self.last_allocation = None;
    }

    /// Moves the cursor back to `to` and restores the allocation that was
    /// most recent there.
    pub(crate) fn rewind(&mut self, to: Position, last_allocation: Option<usize>) {
        if to.block != self.block {
            self.enter_block(to.block);
        }
        self.offset = to.offset;
        self.last_allocation = last_allocation;
    }
}

impl Arena<'static> {
    /// Creates a dynamic arena that owns all of its memory.
    ///
    /// The first block holds one growth quantum.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HeapExhausted`] if the first block cannot be
    /// allocated.
    pub fn dynamic(config: ArenaConfig) -> Result<Self> {
        let first = Block::from_heap(config.growth_quantum(), 2 * mem::size_of::<usize>())?;
        let (data, capacity) = (first.base, first.capacity);
        Ok(Self::from_parts(
            data,
            capacity,
            capacity,
            Backing::Dynamic {
                blocks: vec![first],
            },
            config,
        ))
    }

    /// Creates a virtual memory arena over a reservation of at least
    /// `reserve` bytes.
    ///
    /// Nothing is committed up front. Each time the committed part runs out
    /// the arena commits another `commit_granularity` bytes (at least one
    /// page, more if a single request needs it).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReserveFailed`] if the OS refuses the reservation.
    ///
    /// # Panics
    ///
    /// Panics if `reserve` is zero.
    #[track_caller]
    pub fn virtual_memory(reserve: usize, config: ArenaConfig) -> Result<Self> {
        let reservation = Reservation::new(reserve)?;
        let granularity = config.commit_granularity().max(page_size());
        let (data, capacity) = (reservation.base(), reservation.len());
        Ok(Self::from_parts(
            data,
            capacity,
            0,
            Backing::Virtual {
                reservation,
                granularity,
                commits: 0,
            },
            config,
        ))
    }
}

impl Drop for Arena<'_> {
    fn drop(&mut self) {
        if self.region_count > 0 {
            warn!("arena dropped with {} open region(s)", self.region_count);
        }
        if let Backing::Dynamic { blocks } = &self.backing {
            let owned = blocks.iter().filter(|block| block.owned).count();
            if owned > 0 {
                debug!("releasing {owned} chained block(s) of a dynamic arena");
            }
        }
    }
}

impl fmt::Debug for Arena<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena")
            .field("kind", &self.kind())
            .field("offset", &self.offset)
            .field("capacity", &self.capacity)
            .field("committed", &self.committed)
            .field("block", &self.block)
            .field("region_count", &self.region_count)
            .finish_non_exhaustive()
    }
}

fn str_ptr(ptr: NonNull<u8>, len: usize) -> NonNull<str> {
    let bytes = NonNull::slice_from_raw_parts(ptr, len);
    // SAFETY: derived from a non-null pointer; callers only pass bytes
    // copied from valid UTF-8.
    unsafe { NonNull::new_unchecked(bytes.as_ptr() as *mut str) }
}

/// Appends formatted text to a growing arena allocation.
struct ArenaWriter<'a, 'buf> {
    arena: &'a mut Arena<'buf>,
    start: Option<NonNull<u8>>,
    len: usize,
    error: Option<Error>,
}

impl fmt::Write for ArenaWriter<'_, '_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if s.is_empty() {
            return Ok(());
        }
        let Some(new_len) = self.len.checked_add(s.len()) else {
            self.error = Some(Error::SizeOverflow);
            return Err(fmt::Error);
        };

        match self.arena.realloc(self.start, self.len, new_len, 1) {
            Ok(ptr) => {
                // SAFETY: `ptr` holds new_len bytes; the tail is ours.
                unsafe {
                    mem_copy_no_overlap(ptr.as_ptr().add(self.len), s.as_ptr(), s.len());
                }
                self.start = Some(ptr);
                self.len = new_len;
                Ok(())
            }
            Err(err) => {
                self.error = Some(err);
                Err(fmt::Error)
            }
        }
    }
}
