// Arena allocator benchmarks for Kielo
//
// These benchmarks measure bump allocation on each arena kind, chain growth
// of dynamic arenas, lazy commits of virtual arenas and region rollback.

use criterion::{
    BenchmarkId, Criterion, black_box, criterion_group, criterion_main,
};
use kielo_mem::{Arena, ArenaConfig, MEGABYTE, heap_alloc, heap_free};

/// Benchmark sequential allocations of different sizes.
///
/// Each iteration allocates from a buffer arena that is reset when full, so
/// this measures the pure bump path without growth.
fn bench_sequential_allocations(c: &mut Criterion) {
    let mut group = c.benchmark_group("sequential_alloc");

    for size in &[8, 64, 256, 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(size),
            size,
            |b, &size| {
                let mut storage = vec![0u8; 64 * 1024];
                let mut arena = Arena::from_buffer(&mut storage);
                b.iter(|| {
                    if arena.alloc(black_box(size), 8).is_err() {
                        arena.reset();
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark dynamic arenas that keep chaining new blocks.
fn bench_chain_growth(c: &mut Criterion) {
    let mut group = c.benchmark_group("chain_growth");
    group.sample_size(100);

    for quantum in &[1024, 16 * 1024] {
        group.bench_with_input(
            BenchmarkId::from_parameter(quantum),
            quantum,
            |b, &quantum| {
                b.iter(|| {
                    let config = ArenaConfig::default().with_growth_quantum(quantum);
                    let mut arena = Arena::dynamic(config).unwrap();
                    for _ in 0..1000 {
                        black_box(arena.alloc(black_box(96), 8).unwrap());
                    }
                });
            },
        );
    }

    group.finish();
}

/// Benchmark a virtual arena committing its way through a reservation.
fn bench_virtual_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("virtual_commit");
    group.sample_size(50);

    group.bench_function("fill_4mb", |b| {
        b.iter(|| {
            let mut arena =
                Arena::virtual_memory(4 * MEGABYTE, ArenaConfig::default()).unwrap();
            for _ in 0..4096 {
                black_box(arena.alloc(1000, 8).unwrap());
            }
        });
    });

    group.finish();
}

/// Benchmark region begin/end around a burst of scratch allocations.
fn bench_region_rollback(c: &mut Criterion) {
    let mut group = c.benchmark_group("region_rollback");

    group.bench_function("scope_16_allocs", |b| {
        let mut arena = Arena::dynamic(ArenaConfig::default()).unwrap();
        b.iter(|| {
            let mut scratch = arena.scope();
            for _ in 0..16 {
                black_box(scratch.alloc(32, 8).unwrap());
            }
        });
    });

    group.finish();
}

/// Benchmark growing formatted strings in place.
fn bench_alloc_fmt(c: &mut Criterion) {
    let mut group = c.benchmark_group("alloc_fmt");

    group.bench_function("diagnostic_line", |b| {
        let mut arena = Arena::dynamic(ArenaConfig::default()).unwrap();
        let mut line = 0u32;
        b.iter(|| {
            let mut scratch = arena.scope();
            line = line.wrapping_add(1);
            black_box(
                scratch
                    .alloc_fmt(format_args!("{}:{}:{}: {}", "main.k", line, 7, "unexpected token"))
                    .unwrap(),
            );
        });
    });

    group.finish();
}

/// Arena allocation compared with the hidden-header heap allocator.
fn bench_arena_vs_heap(c: &mut Criterion) {
    let mut group = c.benchmark_group("arena_vs_heap");

    group.bench_function("arena", |b| {
        let mut arena = Arena::dynamic(ArenaConfig::default()).unwrap();
        b.iter(|| {
            let mut scratch = arena.scope();
            black_box(scratch.alloc(black_box(48), 16).unwrap());
        });
    });

    group.bench_function("heap", |b| {
        b.iter(|| {
            let ptr = heap_alloc(black_box(48), 16).unwrap();
            unsafe { heap_free(black_box(ptr)) };
        });
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_sequential_allocations,
    bench_chain_growth,
    bench_virtual_commit,
    bench_region_rollback,
    bench_alloc_fmt,
    bench_arena_vs_heap,
);
criterion_main!(benches);
