//! Kielo memory core.
//!
//! Every other Kielo subsystem (lexer, parser, error lists, formatted
//! strings) allocates through this crate. It provides:
//!
//! - **Arena allocators**: single-owner bump allocation over a fixed buffer, a
//!   heap-chained dynamic range, or a lazily committed virtual memory
//!   reservation ([`arena`])
//! - **Regions**: LIFO checkpoints that roll an arena back to an earlier
//!   offset ([`region`])
//! - **Heap allocator**: aligned allocation with a hidden header ([`heap`])
//! - **Virtual memory**: reserve/commit/decommit/protect/free over the OS
//!   paging interface ([`vm`])
//!
//! Running out of memory is reported as an [`Error`]. Misusing the API (bad
//! alignment, foreign pointers, out-of-order regions, resetting with open
//! regions) is a contract violation and panics immediately.
//!
//! # Example
//!
//! ```
//! use kielo_mem::{Arena, ArenaConfig};
//!
//! let mut arena = Arena::dynamic(ArenaConfig::default())?;
//!
//! let tokens = arena.alloc_array::<u32>(64)?;
//! {
//!     let mut scratch = arena.scope();
//!     scratch.alloc(4096, 16)?;
//! }
//! let name = arena.alloc_fmt(format_args!("token #{}", 7))?;
//!
//! assert_eq!(unsafe { name.as_ref() }, "token #7");
//! assert_eq!(unsafe { *tokens.as_ptr() }, 0);
//! # Ok::<(), kielo_mem::Error>(())
//! ```

#[macro_use]
mod contract;

pub mod align;
pub mod arena;
pub mod config;
pub mod error;
pub mod heap;
pub mod region;
pub mod vm;

pub use align::{GIGABYTE, KILOBYTE, MEGABYTE};
pub use arena::{Arena, ArenaKind, ArenaStats};
pub use config::ArenaConfig;
pub use error::{Error, Result};
pub use heap::{heap_alloc, heap_free};
pub use region::{Region, RegionScope};
