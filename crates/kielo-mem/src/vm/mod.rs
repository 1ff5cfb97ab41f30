//! Virtual memory backend.
//!
//! Thin wrappers over the OS paging interface: reserve address space without
//! backing it, commit pages inside a reservation, decommit them again, change
//! their protection, and release the whole reservation. The POSIX backend uses
//! `mmap`/`mprotect`/`madvise`/`munmap`; the Windows backend uses
//! `VirtualAlloc`/`VirtualProtect`/`VirtualFree`.
//!
//! OS failures are reported as errors and never panic. Passing an address
//! that is not page aligned to [`commit`], [`decommit`], [`protect`] or
//! [`free`] is a contract violation; sizes are rounded up to whole pages by
//! the OS.
//!
//! Most callers want [`Reservation`], which owns a range and releases it on
//! drop.

use std::ptr::NonNull;
use std::sync::OnceLock;

use bitflags::bitflags;
use kielo_log::debug;

use crate::align::{align_forward, is_aligned};
use crate::error::{Error, Result};

#[cfg(unix)]
mod unix;
#[cfg(unix)]
use unix as sys;

#[cfg(windows)]
mod windows;
#[cfg(windows)]
use windows as sys;

bitflags! {
    /// Access rights for a range of pages.
    ///
    /// The empty set is [`Protection::NO_ACCESS`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Protection: u8 {
        /// Pages may be read.
        const READ = 1 << 0;
        /// Pages may be written.
        const WRITE = 1 << 1;
        /// Pages may be executed.
        const EXECUTE = 1 << 2;
    }
}

impl Protection {
    /// Any access faults.
    pub const NO_ACCESS: Protection = Protection::empty();
    /// Read and write access.
    pub const READ_WRITE: Protection = Protection::READ.union(Protection::WRITE);
}

/// Size of a virtual memory page on this system.
#[must_use]
pub fn page_size() -> usize {
    static PAGE_SIZE: OnceLock<usize> = OnceLock::new();
    *PAGE_SIZE.get_or_init(sys::page_size)
}

#[track_caller]
fn check_range(ptr: NonNull<u8>, size: usize) {
    let page = page_size();
    contract!(
        is_aligned(ptr.as_ptr().addr(), page),
        "address {:#x} is not aligned to the {page} byte page size",
        ptr.as_ptr().addr()
    );
    contract!(size > 0, "virtual memory range must not be empty");
}

/// Reserves `size` bytes of address space with no access rights and no
/// physical backing.
///
/// # Errors
///
/// Returns [`Error::ReserveFailed`] if the OS refuses the reservation.
///
/// # Panics
///
/// Panics if `size` is zero.
#[track_caller]
pub fn reserve(size: usize) -> Result<NonNull<u8>> {
    contract!(size > 0, "cannot reserve an empty range");
    sys::reserve(size).ok_or(Error::ReserveFailed { size })
}

/// Backs `[ptr, ptr + size)` with readable, writable memory.
///
/// # Errors
///
/// Returns [`Error::CommitFailed`] if the OS cannot commit the pages, for
/// example under memory pressure.
///
/// # Safety
///
/// The range must lie inside a live reservation.
///
/// # Panics
///
/// Panics if `ptr` is not page aligned or `size` is zero.
#[track_caller]
pub unsafe fn commit(ptr: NonNull<u8>, size: usize) -> Result<NonNull<u8>> {
    check_range(ptr, size);
    // SAFETY: forwarded from the caller.
    if unsafe { sys::commit(ptr, size) } {
        Ok(ptr)
    } else {
        Err(Error::CommitFailed { size })
    }
}

/// Releases the physical backing of `[ptr, ptr + size)` while keeping the
/// addresses reserved. The pages become inaccessible until committed again.
///
/// # Safety
///
/// The range must lie inside a live reservation and must not be accessed
/// until it is committed again.
///
/// # Panics
///
/// Panics if `ptr` is not page aligned or `size` is zero.
#[track_caller]
pub unsafe fn decommit(ptr: NonNull<u8>, size: usize) {
    check_range(ptr, size);
    // SAFETY: forwarded from the caller.
    unsafe { sys::decommit(ptr, size) }
}

/// Changes the access rights of `[ptr, ptr + size)`.
///
/// # Errors
///
/// Returns [`Error::ProtectFailed`] if the OS rejects the change.
///
/// # Safety
///
/// The range must lie inside a live reservation, and no live reference may
/// rely on access rights being removed.
///
/// # Panics
///
/// Panics if `ptr` is not page aligned or `size` is zero.
#[track_caller]
pub unsafe fn protect(ptr: NonNull<u8>, size: usize, protection: Protection) -> Result<()> {
    check_range(ptr, size);
    // SAFETY: forwarded from the caller.
    if unsafe { sys::protect(ptr, size, protection) } {
        Ok(())
    } else {
        Err(Error::ProtectFailed { size })
    }
}

/// Releases a whole reservation, including anything committed inside it.
///
/// # Safety
///
/// `ptr` and `size` must be exactly the values of a prior [`reserve`] call,
/// and nothing inside the range may be used afterwards.
///
/// # Panics
///
/// Panics if `ptr` is not page aligned or `size` is zero.
#[track_caller]
pub unsafe fn free(ptr: NonNull<u8>, size: usize) {
    check_range(ptr, size);
    // SAFETY: forwarded from the caller.
    unsafe { sys::free(ptr, size) }
}

/// An owned range of reserved address space.
///
/// The length is rounded up to a whole number of pages. Offsets passed to
/// the range operations are relative to [`Reservation::base`] and must be
/// page aligned. The reservation is released when dropped.
#[derive(Debug)]
pub struct Reservation {
    base: NonNull<u8>,
    len: usize,
}

impl Reservation {
    /// Reserves at least `size` bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ReserveFailed`] if the OS refuses the reservation and
    /// [`Error::SizeOverflow`] if rounding to the page size overflows.
    ///
    /// # Panics
    ///
    /// Panics if `size` is zero.
    #[track_caller]
    pub fn new(size: usize) -> Result<Self> {
        contract!(size > 0, "cannot reserve an empty range");
        let len = align_forward(size, page_size()).ok_or(Error::SizeOverflow)?;
        let base = reserve(len)?;
        debug!("reserved {len} bytes at {:#x}", base.as_ptr().addr());
        Ok(Self { base, len })
    }

    /// First reserved address.
    #[inline]
    #[must_use]
    pub const fn base(&self) -> NonNull<u8> {
        self.base
    }

    /// Reserved length in bytes.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Always false; reservations are never empty.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[track_caller]
    fn range(&self, offset: usize, size: usize) -> NonNull<u8> {
        contract!(
            offset <= self.len && size <= self.len - offset,
            "range {offset}+{size} exceeds the {} byte reservation",
            self.len
        );
        // SAFETY: offset is within the reservation (checked above).
        unsafe { self.base.add(offset) }
    }

    /// Commits `size` bytes starting `offset` bytes into the reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::CommitFailed`] if the OS cannot back the pages.
    #[track_caller]
    pub fn commit(&mut self, offset: usize, size: usize) -> Result<()> {
        let ptr = self.range(offset, size);
        // SAFETY: the range lies inside this live reservation.
        unsafe { commit(ptr, size) }.map(drop)
    }

    /// Decommits `size` bytes starting `offset` bytes into the reservation.
    ///
    /// # Safety
    ///
    /// Nothing may access the range until it is committed again.
    #[track_caller]
    pub unsafe fn decommit(&mut self, offset: usize, size: usize) {
        let ptr = self.range(offset, size);
        // SAFETY: the range lies inside this reservation; the caller
        // guarantees it is not accessed while decommitted.
        unsafe { decommit(ptr, size) }
    }

    /// Changes the protection of `size` bytes starting `offset` bytes into
    /// the reservation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ProtectFailed`] if the OS rejects the change.
    ///
    /// # Safety
    ///
    /// No live reference into the range may rely on rights being removed.
    #[track_caller]
    pub unsafe fn protect(&mut self, offset: usize, size: usize, protection: Protection) -> Result<()> {
        let ptr = self.range(offset, size);
        // SAFETY: the range lies inside this reservation; the caller upholds
        // the aliasing requirement.
        unsafe { protect(ptr, size, protection) }
    }
}

impl Drop for Reservation {
    fn drop(&mut self) {
        debug!(
            "releasing {} reserved bytes at {:#x}",
            self.len,
            self.base.as_ptr().addr()
        );
        // SAFETY: base/len are exactly what `reserve` returned, and the
        // reservation is being dropped so nothing else refers to it.
        unsafe { free(self.base, self.len) }
    }
}

// SAFETY: a reservation is plain owned address space with no thread affinity.
unsafe impl Send for Reservation {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_size_is_power_of_two() {
        let page = page_size();
        assert!(page.is_power_of_two());
        assert!(page >= 4096);
    }

    #[test]
    fn test_reservation_rounds_to_pages() {
        let reservation = Reservation::new(1).unwrap();
        assert_eq!(reservation.len(), page_size());
        assert!(!reservation.is_empty());
        assert!(is_aligned(reservation.base().as_ptr().addr(), page_size()));
    }

    #[test]
    fn test_commit_write_decommit_recommit() {
        let page = page_size();
        let mut reservation = Reservation::new(4 * page).unwrap();

        reservation.commit(page, 2 * page).unwrap();
        unsafe {
            let p = reservation.base().add(page).as_ptr();
            p.write(0x5A);
            p.add(2 * page - 1).write(0xA5);
            assert_eq!(p.read(), 0x5A);

            reservation.decommit(page, 2 * page);
        }

        reservation.commit(page, page).unwrap();
        unsafe {
            reservation.base().add(page).as_ptr().write(1);
        }
    }

    #[test]
    fn test_protect_read_only_then_writable() {
        let page = page_size();
        let mut reservation = Reservation::new(page).unwrap();
        reservation.commit(0, page).unwrap();

        unsafe {
            reservation.base().as_ptr().write(7);
            reservation.protect(0, page, Protection::READ).unwrap();
            assert_eq!(reservation.base().as_ptr().read(), 7);
            reservation.protect(0, page, Protection::READ_WRITE).unwrap();
            reservation.base().as_ptr().write(8);
            reservation.protect(0, page, Protection::NO_ACCESS).unwrap();
        }
    }

    #[test]
    fn test_raw_reserve_and_free() {
        let page = page_size();
        let ptr = reserve(2 * page).unwrap();
        unsafe {
            commit(ptr, page).unwrap();
            ptr.as_ptr().write(42);
            free(ptr, 2 * page);
        }
    }

    #[test]
    fn test_protection_flags_compose() {
        let rwx = Protection::READ | Protection::WRITE | Protection::EXECUTE;
        assert!(rwx.contains(Protection::READ_WRITE));
        assert!(Protection::NO_ACCESS.is_empty());
        assert!(!Protection::READ.contains(Protection::WRITE));
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_unaligned_commit_is_fatal() {
        let page = page_size();
        let reservation = Reservation::new(2 * page).unwrap();
        unsafe {
            let _ = commit(reservation.base().add(1), page);
        }
    }

    #[test]
    #[should_panic(expected = "contract violation")]
    fn test_range_outside_reservation_is_fatal() {
        let page = page_size();
        let mut reservation = Reservation::new(page).unwrap();
        let _ = reservation.commit(0, 2 * page);
    }
}
