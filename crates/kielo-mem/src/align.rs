//! Alignment math and raw memory primitives.
//!
//! Alignments are always non-zero powers of two, which lets rounding use a
//! mask instead of a division.

use std::cmp::Ordering;
use std::ptr;

/// One kibibyte.
pub const KILOBYTE: usize = 1024;
/// One mebibyte.
pub const MEGABYTE: usize = 1024 * KILOBYTE;
/// One gibibyte.
pub const GIGABYTE: usize = 1024 * MEGABYTE;

/// Whether `align` is a power of two greater than zero.
#[inline(always)]
#[must_use]
pub const fn is_valid_alignment(align: usize) -> bool {
    align.is_power_of_two()
}

/// Whether `value` is a multiple of `align`.
///
/// # Panics
///
/// Panics if `align` is not a valid alignment.
#[inline]
#[must_use]
#[track_caller]
pub fn is_aligned(value: usize, align: usize) -> bool {
    contract!(
        is_valid_alignment(align),
        "alignment {align} must be a power of two greater than zero"
    );
    value & (align - 1) == 0
}

/// Bytes needed to move `addr` forward to the next multiple of `align`.
///
/// Never overflows: the result is always below `align`.
///
/// # Panics
///
/// Panics if `align` is not a valid alignment.
#[inline]
#[must_use]
#[track_caller]
pub fn align_padding(addr: usize, align: usize) -> usize {
    contract!(
        is_valid_alignment(align),
        "alignment {align} must be a power of two greater than zero"
    );
    addr.wrapping_neg() & (align - 1)
}

/// Rounds `value` up to the next multiple of `align`.
///
/// Returns `None` if the rounded value does not fit in a `usize`.
///
/// ```
/// use kielo_mem::align::align_forward;
///
/// assert_eq!(align_forward(0, 8), Some(0));
/// assert_eq!(align_forward(9, 8), Some(16));
/// assert_eq!(align_forward(usize::MAX, 2), None);
/// ```
///
/// # Panics
///
/// Panics if `align` is not a valid alignment.
#[inline]
#[must_use]
#[track_caller]
pub fn align_forward(value: usize, align: usize) -> Option<usize> {
    value.checked_add(align_padding(value, align))
}

/// Rounds a pointer up to the next multiple of `align`, keeping its
/// provenance.
///
/// # Panics
///
/// Panics if `align` is not a valid alignment.
#[inline]
#[must_use]
#[track_caller]
pub fn align_forward_ptr(ptr: *mut u8, align: usize) -> *mut u8 {
    ptr.wrapping_add(align_padding(ptr.addr(), align))
}

/// Copies `count` bytes from `src` to `dst`. The ranges may overlap.
///
/// # Safety
///
/// `src` must be valid for reads and `dst` valid for writes of `count` bytes.
#[inline]
pub unsafe fn mem_copy(dst: *mut u8, src: *const u8, count: usize) {
    // SAFETY: forwarded from the caller.
    unsafe { ptr::copy(src, dst, count) }
}

/// Copies `count` bytes from `src` to `dst`.
///
/// # Safety
///
/// `src` must be valid for reads and `dst` valid for writes of `count`
/// bytes, and the two ranges must not overlap.
#[inline]
pub unsafe fn mem_copy_no_overlap(dst: *mut u8, src: *const u8, count: usize) {
    // SAFETY: forwarded from the caller.
    unsafe { ptr::copy_nonoverlapping(src, dst, count) }
}

/// Sets `count` bytes starting at `dst` to `value`.
///
/// # Safety
///
/// `dst` must be valid for writes of `count` bytes.
#[inline]
pub unsafe fn mem_set(dst: *mut u8, value: u8, count: usize) {
    // SAFETY: forwarded from the caller.
    unsafe { ptr::write_bytes(dst, value, count) }
}

/// Lexicographically compares `count` bytes at `left` and `right`.
///
/// # Safety
///
/// Both pointers must be valid for reads of `count` bytes.
#[inline]
#[must_use]
pub unsafe fn mem_compare(left: *const u8, right: *const u8, count: usize) -> Ordering {
    if count == 0 {
        return Ordering::Equal;
    }
    // SAFETY: both ranges are readable for `count` bytes per the caller.
    let (left, right) = unsafe {
        (
            std::slice::from_raw_parts(left, count),
            std::slice::from_raw_parts(right, count),
        )
    };
    left.cmp(right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_alignment() {
        assert!(is_valid_alignment(1));
        assert!(is_valid_alignment(2));
        assert!(is_valid_alignment(4096));
        assert!(!is_valid_alignment(0));
        assert!(!is_valid_alignment(3));
        assert!(!is_valid_alignment(24));
    }

    #[test]
    fn test_align_forward() {
        assert_eq!(align_forward(0, 8), Some(0));
        assert_eq!(align_forward(1, 8), Some(8));
        assert_eq!(align_forward(8, 8), Some(8));
        assert_eq!(align_forward(9, 8), Some(16));
        assert_eq!(align_forward(1000, 1024), Some(1024));
        assert_eq!(align_forward(usize::MAX - 3, 8), None);
    }

    #[test]
    fn test_align_padding() {
        assert_eq!(align_padding(0, 16), 0);
        assert_eq!(align_padding(1, 16), 15);
        assert_eq!(align_padding(17, 16), 15);
        assert_eq!(align_padding(usize::MAX, 2), 1);
        assert_eq!(align_padding(7, 1), 0);
    }

    #[test]
    fn test_align_forward_ptr_preserves_buffer() {
        let mut buf = [0u8; 64];
        let base = buf.as_mut_ptr();
        let aligned = align_forward_ptr(base.wrapping_add(1), 16);
        assert!(is_aligned(aligned.addr(), 16));
        assert!(aligned.addr() - base.addr() <= 16);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_zero_alignment_is_fatal() {
        let _ = align_forward(10, 0);
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_non_power_of_two_is_fatal() {
        let _ = is_aligned(10, 6);
    }

    #[test]
    fn test_mem_primitives() {
        let mut a = [1u8, 2, 3, 4, 5, 6];
        let b = [9u8; 6];

        unsafe {
            mem_copy_no_overlap(a.as_mut_ptr(), b.as_ptr(), 2);
            assert_eq!(a, [9, 9, 3, 4, 5, 6]);

            // Overlapping shift right by one.
            mem_copy(a.as_mut_ptr().add(1), a.as_ptr(), 5);
            assert_eq!(a, [9, 9, 9, 3, 4, 5]);

            mem_set(a.as_mut_ptr(), 0, 3);
            assert_eq!(a, [0, 0, 0, 3, 4, 5]);

            assert_eq!(mem_compare(a.as_ptr(), b.as_ptr(), 6), Ordering::Less);
            assert_eq!(mem_compare(b.as_ptr(), a.as_ptr(), 6), Ordering::Greater);
            assert_eq!(mem_compare(a.as_ptr(), a.as_ptr(), 6), Ordering::Equal);
            assert_eq!(mem_compare(a.as_ptr(), b.as_ptr(), 0), Ordering::Equal);
        }
    }
}
