//! POSIX virtual memory via `mmap`.

use std::ptr::{self, NonNull};

use super::Protection;

pub(super) fn page_size() -> usize {
    // SAFETY: sysconf has no preconditions.
    let size = unsafe { libc::sysconf(libc::_SC_PAGESIZE) };
    if size < 1 { 4096 } else { size as usize }
}

pub(super) fn reserve(size: usize) -> Option<NonNull<u8>> {
    // SAFETY: an anonymous private mapping at an address of the kernel's
    // choosing does not alias any existing memory.
    let ptr = unsafe {
        libc::mmap(
            ptr::null_mut(),
            size,
            libc::PROT_NONE,
            libc::MAP_PRIVATE | libc::MAP_ANONYMOUS,
            -1,
            0,
        )
    };
    if ptr == libc::MAP_FAILED {
        return None;
    }
    NonNull::new(ptr.cast())
}

pub(super) unsafe fn commit(ptr: NonNull<u8>, size: usize) -> bool {
    // SAFETY: the caller guarantees the range is inside a live mapping.
    unsafe { libc::mprotect(ptr.as_ptr().cast(), size, libc::PROT_READ | libc::PROT_WRITE) == 0 }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
const RELEASE_ADVICE: libc::c_int = libc::MADV_FREE;
#[cfg(not(any(target_os = "linux", target_os = "android")))]
const RELEASE_ADVICE: libc::c_int = libc::MADV_DONTNEED;

pub(super) unsafe fn decommit(ptr: NonNull<u8>, size: usize) {
    // SAFETY: the caller guarantees the range is inside a live mapping and
    // unused. Both calls are advisory for our purposes; a failure leaves the
    // pages resident, which is harmless.
    unsafe {
        libc::mprotect(ptr.as_ptr().cast(), size, libc::PROT_NONE);
        libc::madvise(ptr.as_ptr().cast(), size, RELEASE_ADVICE);
    }
}

pub(super) unsafe fn protect(ptr: NonNull<u8>, size: usize, protection: Protection) -> bool {
    let mut flags = libc::PROT_NONE;
    if protection.contains(Protection::READ) {
        flags |= libc::PROT_READ;
    }
    if protection.contains(Protection::WRITE) {
        flags |= libc::PROT_WRITE;
    }
    if protection.contains(Protection::EXECUTE) {
        flags |= libc::PROT_EXEC;
    }
    // SAFETY: the caller guarantees the range is inside a live mapping.
    unsafe { libc::mprotect(ptr.as_ptr().cast(), size, flags) == 0 }
}

pub(super) unsafe fn free(ptr: NonNull<u8>, size: usize) {
    // SAFETY: the caller passes exactly a range returned by `reserve`.
    unsafe {
        libc::munmap(ptr.as_ptr().cast(), size);
    }
}
