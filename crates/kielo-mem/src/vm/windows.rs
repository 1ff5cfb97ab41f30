//! Windows virtual memory via `VirtualAlloc`.

use std::ffi::c_void;
use std::mem;
use std::ptr::{self, NonNull};

use windows_sys::Win32::System::Memory::{
    MEM_COMMIT, MEM_DECOMMIT, MEM_RELEASE, MEM_RESERVE, PAGE_EXECUTE, PAGE_EXECUTE_READ,
    PAGE_EXECUTE_READWRITE, PAGE_NOACCESS, PAGE_PROTECTION_FLAGS, PAGE_READONLY, PAGE_READWRITE,
    VirtualAlloc, VirtualFree, VirtualProtect,
};
use windows_sys::Win32::System::SystemInformation::{GetSystemInfo, SYSTEM_INFO};

use super::Protection;

pub(super) fn page_size() -> usize {
    // SAFETY: SYSTEM_INFO is plain data and GetSystemInfo fills it in.
    let info = unsafe {
        let mut info: SYSTEM_INFO = mem::zeroed();
        GetSystemInfo(&mut info);
        info
    };
    info.dwPageSize as usize
}

pub(super) fn reserve(size: usize) -> Option<NonNull<u8>> {
    // SAFETY: reserving at an address of the system's choosing does not
    // alias any existing memory.
    let ptr = unsafe { VirtualAlloc(ptr::null(), size, MEM_RESERVE, PAGE_NOACCESS) };
    NonNull::new(ptr.cast())
}

pub(super) unsafe fn commit(ptr: NonNull<u8>, size: usize) -> bool {
    // SAFETY: the caller guarantees the range is inside a live reservation.
    let committed =
        unsafe { VirtualAlloc(ptr.as_ptr().cast::<c_void>(), size, MEM_COMMIT, PAGE_READWRITE) };
    !committed.is_null()
}

pub(super) unsafe fn decommit(ptr: NonNull<u8>, size: usize) {
    // SAFETY: the caller guarantees the range is inside a live reservation
    // and unused.
    unsafe {
        VirtualFree(ptr.as_ptr().cast::<c_void>(), size, MEM_DECOMMIT);
    }
}

/// Windows has no write-only pages; write access implies read access.
fn page_flags(protection: Protection) -> PAGE_PROTECTION_FLAGS {
    let read = protection.intersects(Protection::READ | Protection::WRITE);
    let write = protection.contains(Protection::WRITE);
    let execute = protection.contains(Protection::EXECUTE);

    match (execute, write, read) {
        (false, false, false) => PAGE_NOACCESS,
        (false, false, true) => PAGE_READONLY,
        (false, true, _) => PAGE_READWRITE,
        (true, false, false) => PAGE_EXECUTE,
        (true, false, true) => PAGE_EXECUTE_READ,
        (true, true, _) => PAGE_EXECUTE_READWRITE,
    }
}

pub(super) unsafe fn protect(ptr: NonNull<u8>, size: usize, protection: Protection) -> bool {
    let mut old: PAGE_PROTECTION_FLAGS = 0;
    // SAFETY: the caller guarantees the range is inside a live reservation.
    unsafe { VirtualProtect(ptr.as_ptr().cast::<c_void>(), size, page_flags(protection), &mut old) != 0 }
}

pub(super) unsafe fn free(ptr: NonNull<u8>, _size: usize) {
    // SAFETY: the caller passes the base of a reservation; MEM_RELEASE
    // requires a size of zero and frees the whole reservation.
    unsafe {
        VirtualFree(ptr.as_ptr().cast::<c_void>(), 0, MEM_RELEASE);
    }
}
