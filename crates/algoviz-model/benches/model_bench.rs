//! Benchmarks for Algoviz structures
//!
//! Measures performance of:
//! - Tree insertion with layout recomputation
//! - Grid neighbor lookups
//! - Heap push
//! - N-Queens legality checks

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use algoviz_model::{BinaryTree, Board, Coord, Grid, Heap, Polarity};

/// Benchmark tree insertion (every insert re-lays out the whole tree)
fn bench_tree_insert(c: &mut Criterion) {
    let mut group = c.benchmark_group("tree_insert");

    for &count in &[16i64, 64, 256] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, &n| {
            b.iter(|| {
                let mut tree = BinaryTree::default();
                // Interleave low and high keys to keep the tree shallow
                for i in 0..n {
                    let key = if i % 2 == 0 { i } else { n * 2 - i };
                    let _ = tree.insert(black_box(key));
                }
                tree.len()
            })
        });
    }
    group.finish();
}

/// Benchmark walkable neighbor lookup on the default grid
fn bench_grid_neighbors(c: &mut Criterion) {
    let mut group = c.benchmark_group("grid_neighbors");

    let mut grid = Grid::default();
    for row in 0..grid.rows() {
        if row % 3 == 0 {
            let _ = grid.paint_wall(Coord::new(row, 10));
        }
    }

    for at in [Coord::new(0, 0), Coord::new(10, 10), Coord::new(19, 39)] {
        group.bench_with_input(BenchmarkId::new("cell", at.to_string()), &at, |b, &c| {
            b.iter(|| grid.neighbors(black_box(c)))
        });
    }
    group.finish();
}

/// Benchmark heap push for both polarities
fn bench_heap_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("heap_push");

    for polarity in [Polarity::Min, Polarity::Max] {
        group.throughput(Throughput::Elements(1000));
        group.bench_with_input(
            BenchmarkId::from_parameter(polarity.to_string()),
            &polarity,
            |b, &p| {
                b.iter(|| {
                    let mut heap = Heap::new(p);
                    for v in 0..1000i64 {
                        heap.push(black_box((v * 7919) % 1000));
                    }
                    heap.peek()
                })
            },
        );
    }
    group.finish();
}

/// Benchmark the queen safety check on a half-filled board
fn bench_queen_safety(c: &mut Criterion) {
    let mut group = c.benchmark_group("queen_safety");

    for &size in &[4usize, 8, 12] {
        let mut board = Board::new(size);
        let _ = board.place(Coord::new(0, 0));
        group.bench_with_input(BenchmarkId::from_parameter(size), &board, |b, board| {
            b.iter(|| board.is_safe(black_box(Coord::new(size - 1, size / 2))))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_tree_insert,
    bench_grid_neighbors,
    bench_heap_push,
    bench_queen_safety,
);
criterion_main!(benches);
