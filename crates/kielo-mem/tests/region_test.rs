// Region integration tests
//
// Covers rollback, LIFO nesting, scope guards and the contract checks that
// reject misuse.

mod common;

use common::{fill, is_zeroed};
use kielo_mem::{Arena, ArenaConfig, Region};

// ============================================================================
// Rollback
// ============================================================================

#[test]
fn test_region_discards_allocations() {
    let mut arena = Arena::dynamic(ArenaConfig::default()).unwrap();
    arena.alloc(100, 8).unwrap();
    let saved = arena.offset();

    let region = arena.begin_region();
    let scratch = arena.alloc(500, 8).unwrap();
    fill(scratch, 500, 0xCD);
    arena.end_region(region);

    assert_eq!(arena.offset(), saved);

    // The same memory comes back zeroed.
    let reused = arena.alloc(500, 8).unwrap();
    assert_eq!(reused, scratch);
    assert!(is_zeroed(reused, 500));
}

#[test]
fn test_nested_regions_unwind_in_order() {
    let mut storage = [0u8; 1024];
    let mut arena = Arena::from_buffer(&mut storage);

    let r1 = arena.begin_region();
    arena.alloc(10, 1).unwrap();
    let r2 = arena.begin_region();
    arena.alloc(20, 1).unwrap();
    let r3 = arena.begin_region();
    arena.alloc(30, 1).unwrap();

    assert_eq!(arena.region_count(), 3);
    assert_eq!((r1.depth(), r2.depth(), r3.depth()), (1, 2, 3));

    arena.end_region(r3);
    assert_eq!(arena.offset(), 30);
    arena.end_region(r2);
    assert_eq!(arena.offset(), 10);
    arena.end_region(r1);
    assert_eq!(arena.offset(), 0);
    assert_eq!(arena.region_count(), 0);

    arena.reset();
}

#[test]
fn test_region_on_virtual_arena() {
    let mut arena = Arena::virtual_memory(1 << 20, ArenaConfig::default()).unwrap();
    arena.alloc(64, 8).unwrap();

    let committed_before = arena.committed();
    let region = arena.begin_region();
    arena.alloc(256 * 1024, 8).unwrap();
    assert!(arena.committed() > committed_before);
    arena.end_region(region);

    assert_eq!(arena.offset(), 64);
    // Committed pages stay committed.
    assert!(arena.committed() > committed_before);
}

#[test]
fn test_scope_ends_on_early_return() {
    fn parse_with_scratch(arena: &mut Arena<'_>, fail: bool) -> Result<(), kielo_mem::Error> {
        let mut scratch = arena.scope();
        scratch.alloc(128, 8)?;
        if fail {
            return Err(kielo_mem::Error::SizeOverflow);
        }
        scratch.alloc(128, 8)?;
        Ok(())
    }

    let mut arena = Arena::dynamic(ArenaConfig::default()).unwrap();
    assert!(parse_with_scratch(&mut arena, true).is_err());
    assert!(parse_with_scratch(&mut arena, false).is_ok());
    assert_eq!(arena.offset(), 0);
    assert_eq!(arena.region_count(), 0);
}

#[test]
fn test_region_token_outlives_scope_of_allocation() {
    fn open(arena: &mut Arena<'_>) -> Region {
        let region = arena.begin_region();
        arena.alloc(16, 1).unwrap();
        region
    }

    let mut storage = [0u8; 64];
    let mut arena = Arena::from_buffer(&mut storage);
    let region = open(&mut arena);
    assert_eq!(region.saved_offset(), 0);
    arena.end_region(region);
    assert_eq!(arena.offset(), 0);
}

// ============================================================================
// Contract Violations
// ============================================================================

#[test]
#[should_panic(expected = "contract violation")]
fn test_ending_outer_before_inner_is_fatal() {
    let mut storage = [0u8; 64];
    let mut arena = Arena::from_buffer(&mut storage);
    let r1 = arena.begin_region();
    let _r2 = arena.begin_region();
    arena.end_region(r1);
}

#[test]
#[should_panic(expected = "contract violation")]
fn test_reset_inside_region_is_fatal() {
    let mut arena = Arena::dynamic(ArenaConfig::default()).unwrap();
    let _region = arena.begin_region();
    arena.alloc(8, 8).unwrap();
    arena.reset();
}

#[test]
#[should_panic(expected = "contract violation")]
fn test_region_from_another_arena_is_fatal() {
    let mut first = [0u8; 64];
    let mut second = [0u8; 64];
    let mut a = Arena::from_buffer(&mut first);
    let mut b = Arena::from_buffer(&mut second);

    let region = a.begin_region();
    let _open = b.begin_region();
    b.end_region(region);
}
