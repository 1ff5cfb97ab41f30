//! Aligned heap allocation with a hidden header.
//!
//! [`heap_alloc`] over-allocates from the platform allocator, rounds the
//! result up to the requested alignment and stores a small header right
//! before the returned address. [`heap_free`] reads that header back, so the
//! caller never has to remember the size or alignment of the block.
//!
//! ```text
//! base                       returned (aligned)
//! |<- padding ->|<- header ->|<----------- size ----------->|
//!               [size][base ]
//! ```
//!
//! The block address is always the word immediately before the returned
//! pointer.
//!
//! Only pointers returned by [`heap_alloc`] may be passed to [`heap_free`].

use std::alloc::{self, Layout};
use std::mem;
use std::ptr::NonNull;

use crate::align::{align_padding, is_valid_alignment};
use crate::error::{Error, Result};

#[repr(C)]
#[derive(Clone, Copy)]
struct HeapHeader {
    /// Total size of the underlying block.
    size: usize,
    /// Address returned by the platform allocator.
    base: *mut u8,
}

const HEADER_SIZE: usize = mem::size_of::<HeapHeader>();
const HEADER_ALIGN: usize = mem::align_of::<HeapHeader>();

/// Allocates `size` zeroed bytes aligned to `align`.
///
/// Alignment is raised to at least pointer alignment.
///
/// # Errors
///
/// Returns [`Error::HeapExhausted`] if the platform allocator fails and
/// [`Error::SizeOverflow`] if the padded size does not fit in a `usize`.
///
/// # Panics
///
/// Panics if `align` is not a power of two greater than zero.
///
/// # Examples
///
/// ```
/// use kielo_mem::{heap_alloc, heap_free};
///
/// let ptr = heap_alloc(100, 64)?;
/// assert_eq!(ptr.as_ptr().addr() % 64, 0);
/// unsafe { heap_free(ptr) };
/// # Ok::<(), kielo_mem::Error>(())
/// ```
#[track_caller]
pub fn heap_alloc(size: usize, align: usize) -> Result<NonNull<u8>> {
    contract!(
        is_valid_alignment(align),
        "heap alignment {align} must be a power of two greater than zero"
    );
    let align = align.max(HEADER_ALIGN);

    let space = size
        .checked_add(align - 1)
        .and_then(|s| s.checked_add(HEADER_SIZE))
        .ok_or(Error::SizeOverflow)?;
    let layout =
        Layout::from_size_align(space, HEADER_ALIGN).map_err(|_| Error::SizeOverflow)?;

    // SAFETY: `space` is at least HEADER_SIZE, so the layout is non-zero.
    let base = unsafe { alloc::alloc_zeroed(layout) };
    let base = NonNull::new(base).ok_or(Error::HeapExhausted { size: space })?;

    let after_header = base.as_ptr().addr() + HEADER_SIZE;
    let offset = HEADER_SIZE + align_padding(after_header, align);

    // SAFETY: offset <= HEADER_SIZE + align - 1, so `offset + size <= space`
    // and the aligned block lies inside the allocation. The header sits in
    // the HEADER_SIZE bytes before it; the aligned address is a multiple of
    // HEADER_ALIGN, so the header is aligned as well.
    unsafe {
        let aligned = base.add(offset);
        aligned
            .cast::<HeapHeader>()
            .sub(1)
            .write(HeapHeader {
                size: space,
                base: base.as_ptr(),
            });
        Ok(aligned)
    }
}

/// Releases a block obtained from [`heap_alloc`].
///
/// # Safety
///
/// `ptr` must have been returned by [`heap_alloc`] and not freed since.
pub unsafe fn heap_free(ptr: NonNull<u8>) {
    // SAFETY: the caller guarantees `ptr` came from heap_alloc, which wrote
    // a header immediately before it describing the original allocation.
    unsafe {
        let header = ptr.cast::<HeapHeader>().sub(1).read();
        let layout = Layout::from_size_align_unchecked(header.size, HEADER_ALIGN);
        alloc::dealloc(header.base, layout);
    }
}
