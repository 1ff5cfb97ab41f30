//! Recoverable failures of the memory core.
//!
//! Only resource exhaustion is reported through [`Error`]. Misuse of the API
//! is a contract violation and panics instead.

/// Errors that can occur while acquiring memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A buffer arena cannot fit the request.
    #[error("arena full: requested {requested} bytes, available {available} bytes")]
    ArenaFull {
        /// Bytes needed, including alignment padding.
        requested: usize,
        /// Bytes left in the backing buffer.
        available: usize,
    },

    /// A virtual arena request does not fit in what is left of its
    /// reservation, however much is committed.
    #[error("reservation exhausted: requested {requested} bytes, {available} bytes left in reservation")]
    ReservationExhausted {
        /// Bytes needed, including alignment padding.
        requested: usize,
        /// Reserved bytes past the current offset.
        available: usize,
    },

    /// The platform heap could not satisfy an allocation.
    #[error("heap exhausted: could not allocate {size} bytes")]
    HeapExhausted {
        /// Total bytes requested from the platform allocator.
        size: usize,
    },

    /// The OS refused to reserve address space.
    #[error("failed to reserve {size} bytes of address space")]
    ReserveFailed {
        /// Requested reservation size.
        size: usize,
    },

    /// The OS refused to back reserved pages with memory.
    #[error("failed to commit {size} bytes of reserved memory")]
    CommitFailed {
        /// Requested commit size.
        size: usize,
    },

    /// The OS refused to change page protection.
    #[error("failed to change protection of {size} bytes")]
    ProtectFailed {
        /// Size of the range.
        size: usize,
    },

    /// Size or alignment arithmetic overflowed `usize`.
    #[error("allocation size overflows the address space")]
    SizeOverflow,
}

impl Error {
    /// Whether this error means the allocation could not be satisfied.
    ///
    /// Every variant except [`Error::ProtectFailed`] is an out-of-memory
    /// condition.
    #[must_use]
    pub const fn is_out_of_memory(&self) -> bool {
        !matches!(self, Error::ProtectFailed { .. })
    }
}

/// Result alias for memory operations.
pub type Result<T> = std::result::Result<T, Error>;
