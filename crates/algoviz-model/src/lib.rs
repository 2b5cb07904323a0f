//! Algoviz Structure Model
//!
//! Typed in-memory structures driven by the algorithm visualizers.
//!
//! # Structures
//!
//! - [`Sequence`]: integer array for the sorting family
//! - [`BinaryTree`]: search tree with derived canvas layout
//! - [`Graph`]: click-drawn undirected graph with start/end nodes
//! - [`Grid`]: pathfinding cells (walls, start, end, visited, path)
//! - [`Heap`]: array-backed binary heap with fixed polarity
//! - [`Board`]: N-Queens board
//! - [`Body`]: projectile, pendulum and spring states
//!
//! # Contract
//!
//! Every structure is created from a [`StructureSpec`], changed by one
//! [`Mutation`] at a time and observed through [`Structure::snapshot`].
//! A mutation that would break an invariant fails with a [`MutationError`]
//! and leaves the structure untouched.

mod board;
mod body;
mod error;
mod graph;
mod grid;
mod heap;
mod point;
mod sequence;
mod structure;
mod tree;

pub use board::{attacks, Board, DEFAULT_SIZE as DEFAULT_BOARD_SIZE, MAX_SIZE as MAX_BOARD_SIZE, MIN_SIZE as MIN_BOARD_SIZE};
pub use body::{
    Body, BodyParams, PendulumParams, PendulumState, ProjectileParams, ProjectileState, SpringParams,
    SpringState,
};
pub use error::{MutationError, Result};
pub use graph::{Edge, Graph, GraphNode, NodeId, NODE_RADIUS};
pub use grid::{CellRole, Coord, Grid, DEFAULT_COLS, DEFAULT_ROWS, MAX_DIM as MAX_GRID_DIM};
pub use heap::{left_child, parent, right_child, Heap, Polarity};
pub use point::Point;
pub use sequence::{Sequence, DEFAULT_LEN as DEFAULT_SEQUENCE_LEN, DEFAULT_RANGE as DEFAULT_VALUE_RANGE, MAX_LEN as MAX_SEQUENCE_LEN};
pub use structure::{Applied, Mutation, Snapshot, Structure, StructureKind, StructureSpec};
pub use tree::{BinaryTree, Side, TreeNode, DEFAULT_WIDTH as DEFAULT_CANVAS_WIDTH, MAX_KEYS as MAX_TREE_KEYS};
