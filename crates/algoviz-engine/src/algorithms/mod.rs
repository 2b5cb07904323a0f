//! Algorithm Library
//!
//! One parameterized library of stepwise algorithms. Each algorithm takes a
//! structure, its parameters and a [`StepEmitter`], mutates the structure in
//! place and returns an [`Outcome`]. Runs share no state and are
//! deterministic for a given input.
//!
//! ```text
//! Algorithm::check(structure)     preconditions, never mutates
//!        │
//!        ▼
//! Algorithm::execute(structure, emitter)
//!        │  emit ─► observer, suspend
//!        ▼
//!     Outcome
//! ```

pub mod bst;
pub mod heap;
pub mod pathfinding;
pub mod physics;
pub mod queens;
pub mod sort;
pub mod traversal;

use algoviz_model::{Coord, Graph, Grid, MutationError, NodeId, Structure, StructureKind, MAX_TREE_KEYS};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::emitter::StepEmitter;
use crate::error::{Error, Precondition, Result};

pub use physics::StopReason;

/// An algorithm together with its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", rename_all = "snake_case")]
pub enum Algorithm {
    BubbleSort,
    QuickSort,
    MergeSort,
    BstInsert { value: i64 },
    BstSearch { value: i64 },
    BstInOrder,
    Bfs,
    Dfs,
    Dijkstra,
    HeapInsert { value: i64 },
    HeapExtract,
    NQueens,
    /// Integrate the body; `dt` defaults per body kind.
    Simulate {
        #[serde(default)]
        dt: Option<f64>,
        #[serde(default)]
        max_ticks: Option<u64>,
    },
}

impl Algorithm {
    /// Short name for messages and logs.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::BubbleSort => "bubble_sort",
            Algorithm::QuickSort => "quick_sort",
            Algorithm::MergeSort => "merge_sort",
            Algorithm::BstInsert { .. } => "bst_insert",
            Algorithm::BstSearch { .. } => "bst_search",
            Algorithm::BstInOrder => "bst_in_order",
            Algorithm::Bfs => "bfs",
            Algorithm::Dfs => "dfs",
            Algorithm::Dijkstra => "dijkstra",
            Algorithm::HeapInsert { .. } => "heap_insert",
            Algorithm::HeapExtract => "heap_extract",
            Algorithm::NQueens => "n_queens",
            Algorithm::Simulate { .. } => "simulate",
        }
    }

    /// Kind of structure the algorithm operates on.
    pub fn structure_kind(&self) -> StructureKind {
        match self {
            Algorithm::BubbleSort | Algorithm::QuickSort | Algorithm::MergeSort => StructureKind::Sequence,
            Algorithm::BstInsert { .. } | Algorithm::BstSearch { .. } | Algorithm::BstInOrder => StructureKind::Tree,
            Algorithm::Bfs | Algorithm::Dfs => StructureKind::Graph,
            Algorithm::Dijkstra => StructureKind::Grid,
            Algorithm::HeapInsert { .. } | Algorithm::HeapExtract => StructureKind::Heap,
            Algorithm::NQueens => StructureKind::Board,
            Algorithm::Simulate { .. } => StructureKind::Body,
        }
    }

    fn refuse(&self, missing: Precondition) -> Error {
        Error::MissingPrecondition {
            algorithm: self.name(),
            missing,
        }
    }

    /// Check that the run may start. Never mutates.
    pub fn check(&self, structure: &Structure) -> Result<()> {
        let expected = self.structure_kind();
        if structure.kind() != expected {
            return Err(self.refuse(Precondition::WrongStructure {
                expected,
                actual: structure.kind(),
            }));
        }

        match (self, structure) {
            (Algorithm::BstInOrder, Structure::Tree(tree)) if tree.is_empty() => {
                Err(self.refuse(Precondition::EmptyStructure))
            }
            (Algorithm::BstInsert { .. }, Structure::Tree(tree)) if tree.len() >= MAX_TREE_KEYS => {
                Err(MutationError::TreeFull(MAX_TREE_KEYS).into())
            }
            (Algorithm::Bfs | Algorithm::Dfs, Structure::Graph(graph)) => self.graph_endpoints(graph).map(|_| ()),
            (Algorithm::Dijkstra, Structure::Grid(grid)) => self.grid_endpoints(grid).map(|_| ()),
            (Algorithm::HeapExtract, Structure::Heap(heap)) if heap.is_empty() => {
                Err(self.refuse(Precondition::EmptyStructure))
            }
            (Algorithm::Simulate { dt: Some(dt), .. }, _) if !(dt.is_finite() && *dt > 0.0) => {
                Err(MutationError::InvalidParameter("time step must be positive").into())
            }
            _ => Ok(()),
        }
    }

    fn graph_endpoints(&self, graph: &Graph) -> Result<(NodeId, NodeId)> {
        if graph.node_count() == 0 {
            return Err(self.refuse(Precondition::EmptyStructure));
        }
        let start = graph.start().ok_or_else(|| self.refuse(Precondition::MissingStart))?;
        let end = graph.end().ok_or_else(|| self.refuse(Precondition::MissingEnd))?;
        Ok((start, end))
    }

    fn grid_endpoints(&self, grid: &Grid) -> Result<(Coord, Coord)> {
        let start = grid.start().ok_or_else(|| self.refuse(Precondition::MissingStart))?;
        let end = grid.end().ok_or_else(|| self.refuse(Precondition::MissingEnd))?;
        Ok((start, end))
    }

    /// Check preconditions, then run to completion against `structure`.
    ///
    /// Returns [`Error::Aborted`] if the run is cancelled; the structure keeps
    /// whatever state it had reached.
    pub async fn execute(&self, structure: &mut Structure, emitter: &mut StepEmitter) -> Result<Outcome> {
        self.check(structure)?;
        debug!(algorithm = self.name(), kind = %structure.kind(), "Starting run");

        let outcome = match (self, structure) {
            (Algorithm::BubbleSort, Structure::Sequence(seq)) => {
                sort::bubble_sort(seq, emitter).await?;
                Outcome::Sorted
            }
            (Algorithm::QuickSort, Structure::Sequence(seq)) => {
                sort::quick_sort(seq, emitter).await?;
                Outcome::Sorted
            }
            (Algorithm::MergeSort, Structure::Sequence(seq)) => {
                sort::merge_sort(seq, emitter).await?;
                Outcome::Sorted
            }
            (Algorithm::BstInsert { value }, Structure::Tree(tree)) => bst::insert(tree, *value, emitter).await?,
            (Algorithm::BstSearch { value }, Structure::Tree(tree)) => bst::search(tree, *value, emitter).await?,
            (Algorithm::BstInOrder, Structure::Tree(tree)) => bst::in_order(tree, emitter).await?,
            (Algorithm::Bfs, Structure::Graph(graph)) => {
                let (start, end) = self.graph_endpoints(graph)?;
                traversal::bfs(graph, start, end, emitter).await?
            }
            (Algorithm::Dfs, Structure::Graph(graph)) => {
                let (start, end) = self.graph_endpoints(graph)?;
                traversal::dfs(graph, start, end, emitter).await?
            }
            (Algorithm::Dijkstra, Structure::Grid(grid)) => {
                let (start, end) = self.grid_endpoints(grid)?;
                pathfinding::dijkstra(grid, start, end, emitter).await?
            }
            (Algorithm::HeapInsert { value }, Structure::Heap(heap)) => heap::insert(heap, *value, emitter).await?,
            (Algorithm::HeapExtract, Structure::Heap(heap)) => heap::extract(heap, emitter).await?,
            (Algorithm::NQueens, Structure::Board(board)) => queens::solve(board, emitter).await?,
            (Algorithm::Simulate { dt, max_ticks }, Structure::Body(body)) => {
                let dt = dt.unwrap_or_else(|| physics::default_dt(body));
                physics::simulate(body, dt, *max_ticks, emitter).await?
            }
            (_, structure) => {
                return Err(self.refuse(Precondition::WrongStructure {
                    expected: self.structure_kind(),
                    actual: structure.kind(),
                }))
            }
        };

        debug!(algorithm = self.name(), steps = emitter.stats().steps, outcome = %outcome.message(), "Run finished");
        Ok(outcome)
    }
}

/// A discovered path, start first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "path", rename_all = "snake_case")]
pub enum Path {
    Nodes(Vec<NodeId>),
    Cells(Vec<Coord>),
}

impl Path {
    /// Number of edges along the path.
    pub fn hops(&self) -> usize {
        let len = match self {
            Path::Nodes(nodes) => nodes.len(),
            Path::Cells(cells) => cells.len(),
        };
        len.saturating_sub(1)
    }
}

/// How a completed run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Outcome {
    Sorted,
    Inserted { value: i64 },
    DuplicateKey { value: i64 },
    /// Keys visited from the root down to the match
    Found { path: Vec<i64> },
    NotFound { value: i64 },
    Traversed { values: Vec<i64> },
    PathFound { path: Path },
    NoPath,
    HeapInserted { value: i64, index: usize },
    Extracted { value: i64 },
    Solved { queens: Vec<Coord> },
    NoSolution { size: usize },
    Simulated { ticks: u64, stop: StopReason },
}

impl Outcome {
    /// Path found by a search, if any.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Outcome::PathFound { path } => Some(path),
            _ => None,
        }
    }

    /// Short user-facing message.
    pub fn message(&self) -> String {
        match self {
            Outcome::Sorted => "Sorted".to_string(),
            Outcome::Inserted { value } => format!("Inserted {value}"),
            Outcome::DuplicateKey { value } => format!("{value} is already in the tree"),
            Outcome::Found { path } => format!("Found after visiting {} nodes", path.len()),
            Outcome::NotFound { value } => format!("{value} not found"),
            Outcome::Traversed { values } => format!("Visited {} nodes in order", values.len()),
            Outcome::PathFound { path } => format!("Path found: {} hops", path.hops()),
            Outcome::NoPath => "No path".to_string(),
            Outcome::HeapInserted { value, index } => format!("Inserted {value} at index {index}"),
            Outcome::Extracted { value } => format!("Extracted {value}"),
            Outcome::Solved { queens } => format!("Solved with {} queens", queens.len()),
            Outcome::NoSolution { size } => format!("No solution for {size} queens"),
            Outcome::Simulated { ticks, stop } => match stop {
                StopReason::Landed => format!("Landed after {ticks} ticks"),
                StopReason::OutOfBounds => format!("Left the canvas after {ticks} ticks"),
                StopReason::TickBudget => format!("Stopped after {ticks} ticks"),
            },
        }
    }
}
