//! Property-based tests for the algorithm library.
//!
//! Invariants that must hold for any input:
//!
//! 1. Every sort yields an ascending permutation of its input.
//! 2. Bubble sort compares at most n(n-1)/2 times.
//! 3. BST in-order traversal is the sorted set of inserted keys.
//! 4. BST search finds exactly the inserted keys.
//! 5. BFS never finds a longer path than DFS, and both agree on reachability.
//! 6. Dijkstra on a grid matches a plain BFS distance.
//! 7. The heap invariant holds after every insert; extraction is ordered.
//! 8. N-Queens solutions are legal.
//! 9. Cancelling after step k leaves the structure at step k's snapshot, for
//!    every algorithm family, and no step follows the cancel.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use algoviz_engine::algorithms::{bst, heap, pathfinding, queens, sort, traversal};
use algoviz_engine::{Algorithm, Error, Outcome, RunControl, Step, StepEmitter, StepKind};
use algoviz_model::{
    attacks, BinaryTree, Body, BodyParams, Board, Coord, Graph, Grid, Heap, NodeId, PendulumParams, Point,
    Polarity, Sequence, Structure, DEFAULT_CANVAS_WIDTH,
};
use proptest::prelude::*;

// ── Helpers ─────────────────────────────────────────────────────────────

fn values() -> impl Strategy<Value = Vec<i64>> {
    proptest::collection::vec(-50i64..50, 0..40)
}

fn sorted_copy(values: &[i64]) -> Vec<i64> {
    let mut sorted = values.to_vec();
    sorted.sort_unstable();
    sorted
}

fn hops(outcome: &Outcome) -> Option<usize> {
    outcome.path().map(|p| p.hops())
}

fn build_graph(nodes: u32, edges: &[(u32, u32)]) -> Graph {
    let mut graph = Graph::new();
    for i in 0..nodes {
        graph.add_node(Point::new(f64::from(i) * 60.0, 0.0));
    }
    for &(a, b) in edges {
        // Self loops and repeats are rejected; that is fine here.
        let _ = graph.add_edge(NodeId(a % nodes), NodeId(b % nodes));
    }
    graph
}

fn reference_distance(grid: &Grid, start: Coord, end: Coord) -> Option<usize> {
    let mut dist = HashMap::from([(start, 0usize)]);
    let mut queue = VecDeque::from([start]);
    while let Some(at) = queue.pop_front() {
        if at == end {
            return dist.get(&at).copied();
        }
        let d = dist[&at];
        for next in grid.neighbors(at) {
            if !dist.contains_key(&next) {
                dist.insert(next, d + 1);
                queue.push_back(next);
            }
        }
    }
    None
}

fn walled_grid(rows: usize, cols: usize, walls: &[(usize, usize)]) -> Grid {
    let mut grid = Grid::new(rows, cols);
    grid.set_start(Coord::new(0, 0)).unwrap();
    grid.set_end(Coord::new(rows - 1, cols - 1)).unwrap();
    for &(r, c) in walls {
        // Start and end cells refuse walls.
        let _ = grid.paint_wall(Coord::new(r % rows, c % cols));
    }
    grid
}

// ═════════════════════════════════════════════════════════════════════════
// 1-2. Sorting
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn sorts_produce_ascending_permutations(input in values()) {
        let expected = sorted_copy(&input);
        for which in 0..3 {
            let mut seq = Sequence::from_values(input.clone());
            let mut emitter = StepEmitter::unpaced();
            tokio_test::block_on(async {
                match which {
                    0 => sort::bubble_sort(&mut seq, &mut emitter).await,
                    1 => sort::quick_sort(&mut seq, &mut emitter).await,
                    _ => sort::merge_sort(&mut seq, &mut emitter).await,
                }
            })
            .unwrap();
            prop_assert_eq!(seq.values(), expected.as_slice());
        }
    }

    #[test]
    fn bubble_comparisons_are_bounded(input in values()) {
        let n = input.len() as u64;
        let mut seq = Sequence::from_values(input);
        let mut emitter = StepEmitter::unpaced();
        tokio_test::block_on(sort::bubble_sort(&mut seq, &mut emitter)).unwrap();
        prop_assert!(emitter.stats().comparisons <= n * n.saturating_sub(1) / 2);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3-4. Binary search tree
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bst_in_order_is_sorted_key_set(keys in values()) {
        let mut tree = BinaryTree::new(DEFAULT_CANVAS_WIDTH);
        let mut emitter = StepEmitter::unpaced();
        for &key in &keys {
            let outcome = tokio_test::block_on(bst::insert(&mut tree, key, &mut emitter)).unwrap();
            prop_assert!(matches!(outcome, Outcome::Inserted { .. } | Outcome::DuplicateKey { .. }), "unexpected outcome: {:?}", outcome);
        }

        let mut expected = sorted_copy(&keys);
        expected.dedup();
        prop_assert_eq!(tree.in_order(), expected.clone());

        if !expected.is_empty() {
            let traversed = tokio_test::block_on(bst::in_order(&tree, &mut emitter)).unwrap();
            prop_assert_eq!(traversed, Outcome::Traversed { values: expected });
        }
    }

    #[test]
    fn bst_search_finds_exactly_inserted_keys(keys in values(), target in -60i64..60) {
        let mut tree = BinaryTree::new(DEFAULT_CANVAS_WIDTH);
        for &key in &keys {
            let _ = tree.insert(key);
        }
        let mut emitter = StepEmitter::unpaced();
        let outcome = tokio_test::block_on(bst::search(&tree, target, &mut emitter)).unwrap();
        match outcome {
            Outcome::Found { path } => {
                prop_assert!(keys.contains(&target));
                prop_assert_eq!(path.last().copied(), Some(target));
            }
            Outcome::NotFound { value } => {
                prop_assert!(!keys.contains(&target));
                prop_assert_eq!(value, target);
            }
            other => prop_assert!(false, "unexpected outcome {:?}", other),
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5-6. Graph and grid search
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn bfs_is_never_longer_than_dfs(
        nodes in 2u32..10,
        edges in proptest::collection::vec((0u32..10, 0u32..10), 0..25),
    ) {
        let graph = build_graph(nodes, &edges);
        let (start, end) = (NodeId(0), NodeId(nodes - 1));
        let mut emitter = StepEmitter::unpaced();
        let bfs = tokio_test::block_on(traversal::bfs(&graph, start, end, &mut emitter)).unwrap();
        let dfs = tokio_test::block_on(traversal::dfs(&graph, start, end, &mut emitter)).unwrap();

        match (hops(&bfs), hops(&dfs)) {
            (Some(b), Some(d)) => prop_assert!(b <= d),
            (None, None) => {}
            (b, d) => prop_assert!(false, "reachability disagrees: bfs {:?}, dfs {:?}", b, d),
        }
    }

    #[test]
    fn dijkstra_matches_reference_distance(
        rows in 2usize..10,
        cols in 2usize..10,
        walls in proptest::collection::vec((0usize..10, 0usize..10), 0..30),
    ) {
        let mut grid = walled_grid(rows, cols, &walls);
        let (start, end) = (Coord::new(0, 0), Coord::new(rows - 1, cols - 1));
        let expected = reference_distance(&grid, start, end);

        let mut emitter = StepEmitter::unpaced();
        let outcome = tokio_test::block_on(pathfinding::dijkstra(&mut grid, start, end, &mut emitter)).unwrap();
        prop_assert_eq!(hops(&outcome), expected);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7-8. Heap and N-Queens
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn heap_stays_ordered(input in values(), min in any::<bool>()) {
        let polarity = if min { Polarity::Min } else { Polarity::Max };
        let mut target = Heap::new(polarity);
        let mut emitter = StepEmitter::unpaced();
        for &v in &input {
            tokio_test::block_on(heap::insert(&mut target, v, &mut emitter)).unwrap();
            prop_assert!(target.check_invariant());
        }

        let mut drained = Vec::new();
        while !target.is_empty() {
            match tokio_test::block_on(heap::extract(&mut target, &mut emitter)).unwrap() {
                Outcome::Extracted { value } => drained.push(value),
                other => prop_assert!(false, "unexpected outcome {:?}", other),
            }
            prop_assert!(target.check_invariant());
        }

        let mut expected = sorted_copy(&input);
        if !min {
            expected.reverse();
        }
        prop_assert_eq!(drained, expected);
    }

    #[test]
    fn n_queens_solutions_are_legal(size in 4usize..=8) {
        let mut board = Board::new(size);
        let mut emitter = StepEmitter::unpaced();
        let outcome = tokio_test::block_on(queens::solve(&mut board, &mut emitter)).unwrap();
        let Outcome::Solved { queens } = outcome else {
            return Err(TestCaseError::fail("expected a solution"));
        };
        prop_assert_eq!(queens.len(), size);
        for (i, &a) in queens.iter().enumerate() {
            for &b in &queens[i + 1..] {
                prop_assert!(!attacks(a, b));
            }
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 9. Cancellation determinism
// ═════════════════════════════════════════════════════════════════════════

fn record(structure: &mut Structure, algorithm: &Algorithm, cancel_at: Option<u64>) -> (Vec<Step>, Result<Outcome, Error>) {
    let steps = Arc::new(Mutex::new(Vec::new()));
    let control = RunControl::new(Duration::ZERO);
    let sink_steps = Arc::clone(&steps);
    let canceller = control.clone();
    let mut emitter = StepEmitter::new(control, move |step: Step| {
        if Some(step.seq) == cancel_at {
            canceller.cancel();
        }
        sink_steps.lock().unwrap().push(step);
    });
    let result = tokio_test::block_on(algorithm.execute(structure, &mut emitter));
    let steps = steps.lock().unwrap().clone();
    (steps, result)
}

/// One run per algorithm family, built from the generated inputs.
fn cancellable_run(
    family: usize,
    values: &[i64],
    edges: &[(u32, u32)],
    walls: &[(usize, usize)],
    board_size: usize,
) -> (Structure, Algorithm) {
    match family {
        0 => (Structure::Sequence(Sequence::from_values(values.to_vec())), Algorithm::BubbleSort),
        1 => (Structure::Sequence(Sequence::from_values(values.to_vec())), Algorithm::QuickSort),
        2 => (Structure::Sequence(Sequence::from_values(values.to_vec())), Algorithm::MergeSort),
        3 | 4 => {
            let mut graph = build_graph(6, edges);
            graph.set_start(NodeId(0)).unwrap();
            graph.set_end(NodeId(5)).unwrap();
            let algorithm = if family == 3 { Algorithm::Bfs } else { Algorithm::Dfs };
            (Structure::Graph(graph), algorithm)
        }
        5 => (Structure::Grid(walled_grid(6, 6, walls)), Algorithm::Dijkstra),
        6 => {
            let mut heap = Heap::new(Polarity::Min);
            for &v in values {
                heap.push(v);
            }
            (Structure::Heap(heap), Algorithm::HeapExtract)
        }
        7 => (Structure::Board(Board::new(board_size)), Algorithm::NQueens),
        _ => {
            let body = Body::new(BodyParams::Pendulum(PendulumParams::default())).unwrap();
            let algorithm = Algorithm::Simulate {
                dt: None,
                max_ticks: Some(40),
            };
            (Structure::Body(body), algorithm)
        }
    }
}

proptest! {
    #[test]
    fn cancel_after_step_k_keeps_step_k_state(
        family in 0usize..9,
        values in proptest::collection::vec(0i64..100, 2..20),
        edges in proptest::collection::vec((0u32..6, 0u32..6), 0..15),
        walls in proptest::collection::vec((0usize..6, 0usize..6), 0..12),
        board_size in 4usize..=6,
        pick in any::<prop::sample::Index>(),
    ) {
        let (mut full, algorithm) = cancellable_run(family, &values, &edges, &walls, board_size);
        let (steps, result) = record(&mut full, &algorithm, None);
        prop_assert!(result.is_ok(), "{} failed: {:?}", algorithm.name(), result);
        prop_assume!(!steps.is_empty());

        let k = pick.index(steps.len());
        let (mut partial, _) = cancellable_run(family, &values, &edges, &walls, board_size);
        let (partial_steps, result) = record(&mut partial, &algorithm, Some(steps[k].seq));

        prop_assert_eq!(result, Err(Error::Aborted));
        prop_assert_eq!(partial_steps.len(), k + 1);
        prop_assert_eq!(partial_steps.last().map(|s| s.seq), Some(steps[k].seq));
        prop_assert_eq!(partial.snapshot(), steps[k].snapshot.clone());
    }
}

// ── Example scenarios ───────────────────────────────────────────────────

#[test]
fn scenario_bubble_sort_three_values() {
    let mut structure = Structure::Sequence(Sequence::from_values(vec![5, 1, 4]));
    let (steps, result) = record(&mut structure, &Algorithm::BubbleSort, None);
    assert_eq!(result, Ok(Outcome::Sorted));
    assert_eq!(steps.len(), 5);
    assert_eq!(structure, Structure::Sequence(Sequence::from_values(vec![1, 4, 5])));
}

#[test]
fn scenario_bubble_sort_four_values() {
    let mut structure = Structure::Sequence(Sequence::from_values(vec![5, 3, 8, 1]));
    let (steps, result) = record(&mut structure, &Algorithm::BubbleSort, None);
    assert_eq!(result, Ok(Outcome::Sorted));
    assert_eq!(structure, Structure::Sequence(Sequence::from_values(vec![1, 3, 5, 8])));

    // Passes of 3, 2 and 1 comparisons: 6 in total, 4 exchanges.
    let compares = steps.iter().filter(|s| s.kind == StepKind::Compare).count();
    let swaps = steps.iter().filter(|s| s.kind == StepKind::Swap).count();
    assert_eq!((compares, swaps), (6, 4));
    assert_eq!(steps.len(), 10);
    assert_eq!(steps[1].snapshot, Structure::Sequence(Sequence::from_values(vec![3, 5, 8, 1])));
}

#[test]
fn scenario_bst_insert_sequence() {
    let mut structure = Structure::Tree(BinaryTree::new(DEFAULT_CANVAS_WIDTH));
    let mut per_insert = Vec::new();
    for value in [5, 3, 8, 1, 4] {
        let (steps, result) = record(&mut structure, &Algorithm::BstInsert { value }, None);
        assert_eq!(result, Ok(Outcome::Inserted { value }));
        let visits = steps.iter().filter(|s| s.kind == StepKind::Visit).count();
        assert_eq!(steps.last().map(|s| s.kind), Some(StepKind::Place));
        per_insert.push((visits, steps.len()));
    }
    // Visits grow with the depth of the slot each key lands in.
    assert_eq!(per_insert, vec![(0, 1), (1, 2), (1, 2), (2, 3), (2, 3)]);

    let Structure::Tree(tree) = &structure else {
        panic!("expected a tree");
    };
    assert_eq!(tree.in_order(), vec![1, 3, 4, 5, 8]);
    assert_eq!(tree.height(), 3);

    let before = structure.clone();
    let (steps, result) = record(&mut structure, &Algorithm::BstInsert { value: 3 }, None);
    assert_eq!(result, Ok(Outcome::DuplicateKey { value: 3 }));
    assert_eq!(steps.len(), 2);
    assert_eq!(structure, before);
}

#[test]
fn scenario_queens_without_solution() {
    for size in [2, 3] {
        let mut structure = Structure::Board(Board::new(size));
        let (steps, result) = record(&mut structure, &Algorithm::NQueens, None);
        assert_eq!(result, Ok(Outcome::NoSolution { size }));
        assert!(!steps.is_empty());
        let Structure::Board(board) = structure else {
            panic!("expected a board");
        };
        assert_eq!(board.queen_count(), 0);
    }
}

#[test]
fn scenario_bst_search_path() {
    let mut tree = BinaryTree::new(DEFAULT_CANVAS_WIDTH);
    for key in [50, 30, 70, 20, 40] {
        tree.insert(key).unwrap();
    }
    let mut structure = Structure::Tree(tree);
    let (steps, result) = record(&mut structure, &Algorithm::BstSearch { value: 40 }, None);
    assert_eq!(result, Ok(Outcome::Found { path: vec![50, 30, 40] }));
    assert_eq!(steps.len(), 3);
}

#[test]
fn scenario_grid_detour_around_wall() {
    let grid = walled_grid(5, 5, &[(0, 2), (1, 2), (2, 2), (3, 2)]);
    let mut structure = Structure::Grid(grid);
    let (_, result) = record(&mut structure, &Algorithm::Dijkstra, None);
    let outcome = result.unwrap();
    assert_eq!(hops(&outcome), Some(8));
    let Structure::Grid(grid) = structure else {
        panic!("expected a grid");
    };
    assert_eq!(grid.get(Coord::new(4, 2)), Some(algoviz_model::CellRole::Path));
}
