// Shared helpers for kielo-mem integration tests.

#![allow(dead_code)]

use std::ptr::NonNull;

use kielo_mem::Arena;

/// Views `len` bytes at `ptr`.
pub fn bytes<'a>(ptr: NonNull<u8>, len: usize) -> &'a [u8] {
    unsafe { std::slice::from_raw_parts(ptr.as_ptr(), len) }
}

/// Fills `len` bytes at `ptr` with `value`.
pub fn fill(ptr: NonNull<u8>, len: usize, value: u8) {
    unsafe { ptr.as_ptr().write_bytes(value, len) }
}

/// Whether every byte at `ptr` is zero.
pub fn is_zeroed(ptr: NonNull<u8>, len: usize) -> bool {
    bytes(ptr, len).iter().all(|&b| b == 0)
}

/// Allocates `count` blocks of `size` bytes, returning their addresses.
pub fn alloc_many(arena: &mut Arena<'_>, count: usize, size: usize, align: usize) -> Vec<usize> {
    (0..count)
        .map(|_| arena.alloc(size, align).unwrap().as_ptr().addr())
        .collect()
}
