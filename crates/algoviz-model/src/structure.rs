//! Uniform create / mutate / snapshot / reset contract over every structure kind.

use std::ops::Range;

use rand::Rng;

use crate::board::{self, Board};
use crate::body::{Body, BodyParams};
use crate::error::{MutationError, Result};
use crate::graph::{Edge, Graph, NodeId};
use crate::grid::{self, Coord, Grid};
use crate::heap::{Heap, Polarity};
use crate::sequence::{self, Sequence};
use crate::tree::{self, BinaryTree};
use crate::Point;

/// The kinds of structure a visualizer can own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StructureKind {
    Sequence,
    Tree,
    Graph,
    Grid,
    Heap,
    Board,
    Body,
}

impl std::fmt::Display for StructureKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StructureKind::Sequence => "sequence",
            StructureKind::Tree => "tree",
            StructureKind::Graph => "graph",
            StructureKind::Grid => "grid",
            StructureKind::Heap => "heap",
            StructureKind::Board => "board",
            StructureKind::Body => "body",
        };
        f.write_str(name)
    }
}

/// Parameters for creating (and re-creating on reset) a structure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum StructureSpec {
    /// `len` random values in `[min, max)`
    Sequence { len: usize, min: i64, max: i64 },
    /// Empty tree laid out on a canvas of `width`
    Tree { width: f64 },
    /// Empty graph
    Graph,
    /// `rows`×`cols` empty cells
    Grid { rows: usize, cols: usize },
    /// Empty heap
    Heap { polarity: Polarity },
    /// Empty `size`×`size` board
    Board { size: usize },
    /// Body in its initial state
    Body { params: BodyParams },
}

impl StructureSpec {
    /// Kind of structure this spec creates.
    pub fn kind(&self) -> StructureKind {
        match self {
            StructureSpec::Sequence { .. } => StructureKind::Sequence,
            StructureSpec::Tree { .. } => StructureKind::Tree,
            StructureSpec::Graph => StructureKind::Graph,
            StructureSpec::Grid { .. } => StructureKind::Grid,
            StructureSpec::Heap { .. } => StructureKind::Heap,
            StructureSpec::Board { .. } => StructureKind::Board,
            StructureSpec::Body { .. } => StructureKind::Body,
        }
    }

    /// Spec with the platform defaults for `kind`.
    pub fn default_for(kind: StructureKind) -> Self {
        match kind {
            StructureKind::Sequence => StructureSpec::Sequence {
                len: sequence::DEFAULT_LEN,
                min: sequence::DEFAULT_RANGE.start,
                max: sequence::DEFAULT_RANGE.end,
            },
            StructureKind::Tree => StructureSpec::Tree {
                width: tree::DEFAULT_WIDTH,
            },
            StructureKind::Graph => StructureSpec::Graph,
            StructureKind::Grid => StructureSpec::Grid {
                rows: grid::DEFAULT_ROWS,
                cols: grid::DEFAULT_COLS,
            },
            StructureKind::Heap => StructureSpec::Heap {
                polarity: Polarity::default(),
            },
            StructureKind::Board => StructureSpec::Board {
                size: board::DEFAULT_SIZE,
            },
            StructureKind::Body => StructureSpec::Body {
                params: Body::default().params(),
            },
        }
    }
}

/// One user-driven change to a structure.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "op", rename_all = "snake_case"))]
pub enum Mutation {
    /// Replace the sequence with `len` fresh random values.
    Regenerate { len: usize },
    SetValue { index: usize, value: i64 },
    InsertKey { value: i64 },
    AddNode { x: f64, y: f64 },
    AddEdge { a: NodeId, b: NodeId },
    SetStartNode { id: NodeId },
    SetEndNode { id: NodeId },
    ToggleWall { at: Coord },
    /// Drag painting: always makes a wall.
    PaintWall { at: Coord },
    SetStartCell { at: Coord },
    SetEndCell { at: Coord },
    ClearSearch,
    ToggleQueen { at: Coord },
    ResizeBoard { size: usize },
    Push { value: i64 },
    SetPolarity { polarity: Polarity },
    SetBodyParams { params: BodyParams },
}

impl Mutation {
    /// Short operation name for messages.
    pub fn name(&self) -> &'static str {
        match self {
            Mutation::Regenerate { .. } => "regenerate",
            Mutation::SetValue { .. } => "set_value",
            Mutation::InsertKey { .. } => "insert_key",
            Mutation::AddNode { .. } => "add_node",
            Mutation::AddEdge { .. } => "add_edge",
            Mutation::SetStartNode { .. } => "set_start_node",
            Mutation::SetEndNode { .. } => "set_end_node",
            Mutation::ToggleWall { .. } => "toggle_wall",
            Mutation::PaintWall { .. } => "paint_wall",
            Mutation::SetStartCell { .. } => "set_start_cell",
            Mutation::SetEndCell { .. } => "set_end_cell",
            Mutation::ClearSearch => "clear_search",
            Mutation::ToggleQueen { .. } => "toggle_queen",
            Mutation::ResizeBoard { .. } => "resize_board",
            Mutation::Push { .. } => "push",
            Mutation::SetPolarity { .. } => "set_polarity",
            Mutation::SetBodyParams { .. } => "set_body_params",
        }
    }
}

/// What a successful mutation did.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Applied {
    Done,
    NodeAdded { id: NodeId },
    EdgeAdded { edge: Edge },
    /// Cell is now (`true`) or no longer (`false`) a wall
    Wall { at: Coord, wall: bool },
    /// Cell now holds (`true`) or no longer holds (`false`) a queen
    Queen { at: Coord, placed: bool },
}

/// A structure owned by one visualizer instance.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "data", rename_all = "snake_case"))]
pub enum Structure {
    Sequence(Sequence),
    Tree(BinaryTree),
    Graph(Graph),
    Grid(Grid),
    Heap(Heap),
    Board(Board),
    Body(Body),
}

impl Structure {
    /// Build a new structure from `spec`.
    pub fn create<R: Rng + ?Sized>(spec: &StructureSpec, rng: &mut R) -> Result<Self> {
        Ok(match spec {
            StructureSpec::Sequence { len, min, max } => {
                Structure::Sequence(Sequence::random(*len, *min..*max, rng)?)
            }
            StructureSpec::Tree { width } => Structure::Tree(BinaryTree::new(*width)),
            StructureSpec::Graph => Structure::Graph(Graph::new()),
            StructureSpec::Grid { rows, cols } => Structure::Grid(Grid::sized(*rows, *cols)?),
            StructureSpec::Heap { polarity } => Structure::Heap(Heap::new(*polarity)),
            StructureSpec::Board { size } => Structure::Board(Board::interactive(*size)?),
            StructureSpec::Body { params } => Structure::Body(Body::new(*params)?),
        })
    }

    /// Kind of this structure.
    pub fn kind(&self) -> StructureKind {
        match self {
            Structure::Sequence(_) => StructureKind::Sequence,
            Structure::Tree(_) => StructureKind::Tree,
            Structure::Graph(_) => StructureKind::Graph,
            Structure::Grid(_) => StructureKind::Grid,
            Structure::Heap(_) => StructureKind::Heap,
            Structure::Board(_) => StructureKind::Board,
            Structure::Body(_) => StructureKind::Body,
        }
    }

    /// Immutable deep copy for rendering.
    pub fn snapshot(&self) -> Structure {
        self.clone()
    }

    /// Apply one user change. On error the structure is unchanged.
    pub fn apply<R: Rng + ?Sized>(&mut self, mutation: &Mutation, rng: &mut R) -> Result<Applied> {
        let kind = self.kind();
        let wrong = || MutationError::WrongStructure {
            mutation: mutation.name(),
            kind,
        };

        match (self, mutation) {
            (Structure::Sequence(seq), Mutation::Regenerate { len }) => {
                let range = regenerate_range(seq);
                *seq = Sequence::random(*len, range, rng)?;
            }
            (Structure::Sequence(seq), Mutation::SetValue { index, value }) => {
                seq.set(*index, *value)?;
            }
            (Structure::Tree(tree), Mutation::InsertKey { value }) => tree.insert(*value)?,
            (Structure::Graph(graph), Mutation::AddNode { x, y }) => {
                let id = graph.add_node(Point::new(*x, *y));
                return Ok(Applied::NodeAdded { id });
            }
            (Structure::Graph(graph), Mutation::AddEdge { a, b }) => {
                let edge = graph.add_edge(*a, *b)?;
                return Ok(Applied::EdgeAdded { edge });
            }
            (Structure::Graph(graph), Mutation::SetStartNode { id }) => graph.set_start(*id)?,
            (Structure::Graph(graph), Mutation::SetEndNode { id }) => graph.set_end(*id)?,
            (Structure::Grid(grid), Mutation::ToggleWall { at }) => {
                let wall = grid.toggle_wall(*at)?;
                return Ok(Applied::Wall { at: *at, wall });
            }
            (Structure::Grid(grid), Mutation::PaintWall { at }) => {
                grid.paint_wall(*at)?;
                return Ok(Applied::Wall { at: *at, wall: true });
            }
            (Structure::Grid(grid), Mutation::SetStartCell { at }) => grid.set_start(*at)?,
            (Structure::Grid(grid), Mutation::SetEndCell { at }) => grid.set_end(*at)?,
            (Structure::Grid(grid), Mutation::ClearSearch) => grid.clear_search(),
            (Structure::Board(board), Mutation::ToggleQueen { at }) => {
                let placed = board.toggle(*at)?;
                return Ok(Applied::Queen { at: *at, placed });
            }
            (Structure::Board(board), Mutation::ResizeBoard { size }) => {
                *board = Board::interactive(*size)?;
            }
            (Structure::Heap(heap), Mutation::Push { value }) => heap.push(*value),
            (Structure::Heap(heap), Mutation::SetPolarity { polarity }) => heap.set_polarity(*polarity),
            (Structure::Body(body), Mutation::SetBodyParams { params }) => {
                *body = Body::new(*params)?;
            }
            _ => return Err(wrong()),
        }
        Ok(Applied::Done)
    }
}

/// Value range to reuse when regenerating: the observed min/max of the
/// current values, or the default range for an empty sequence. The end
/// saturates at `i64::MAX`.
fn regenerate_range(seq: &Sequence) -> Range<i64> {
    let min = seq.values().iter().min();
    let max = seq.values().iter().max();
    match (min, max) {
        (Some(&lo), Some(&hi)) if lo < hi => lo..hi.saturating_add(1),
        _ => sequence::DEFAULT_RANGE,
    }
}

/// Anything that can produce a render snapshot of itself.
///
/// Algorithms operate on the concrete structure types; this lets the step
/// emitter capture them without knowing which one it was handed.
pub trait Snapshot {
    fn snapshot(&self) -> Structure;
}

macro_rules! impl_snapshot {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Snapshot for $ty {
                fn snapshot(&self) -> Structure {
                    Structure::$variant(self.clone())
                }
            }
        )*
    };
}

impl_snapshot! {
    Sequence => Sequence,
    BinaryTree => Tree,
    Graph => Graph,
    Grid => Grid,
    Heap => Heap,
    Board => Board,
    Body => Body,
}

impl Snapshot for Structure {
    fn snapshot(&self) -> Structure {
        self.clone()
    }
}
