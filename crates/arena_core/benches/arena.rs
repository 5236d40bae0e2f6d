//! Generation and pathfinding benchmarks for arena_core.
//!
//! Run with: `cargo bench -p arena_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use arena_core::grid::Cell;
use arena_core::map_generation::{generate_arena, MapGenConfig};
use arena_core::pathfinding::find_path;

/// Full three-phase arena generation on the default layout.
pub fn generation_benchmark(c: &mut Criterion) {
    c.bench_function("generate_arena_medium", |b| {
        b.iter(|| {
            let arena = generate_arena(MapGenConfig::medium(), Some(black_box(42))).unwrap();
            black_box(arena.occupied_cell_count())
        })
    });
}

/// Corner-to-corner A* across a generated layout.
pub fn pathfinding_benchmark(c: &mut Criterion) {
    let arena = generate_arena(MapGenConfig::medium(), Some(42)).unwrap();
    let grid = arena.build_grid();
    let start = grid
        .nearest_free_cell(Cell::new(1, 1))
        .expect("free start cell");
    let goal = grid
        .nearest_free_cell(Cell::new(grid.cols() as i32 - 2, grid.rows() as i32 - 2))
        .expect("free goal cell");

    c.bench_function("find_path_corner_to_corner", |b| {
        b.iter(|| black_box(find_path(&grid, black_box(start), black_box(goal))))
    });
}

criterion_group!(benches, generation_benchmark, pathfinding_benchmark);
criterion_main!(benches);
