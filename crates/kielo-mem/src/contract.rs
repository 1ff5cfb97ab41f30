//! Fatal checks for API misuse.
//!
//! A broken allocator invariant cannot be recovered from without risking
//! silent corruption, so these checks stay enabled in release builds.

use std::fmt;
use std::panic::Location;

/// Panics with a contract violation unless `$cond` holds.
macro_rules! contract {
    ($cond:expr, $($arg:tt)+) => {
        if !$cond {
            $crate::contract::violation(format_args!($($arg)+));
        }
    };
}

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn violation(args: fmt::Arguments<'_>) -> ! {
    let location = Location::caller();
    kielo_log::error!("({location}) contract violation: {args}");
    panic!("contract violation: {args}");
}
