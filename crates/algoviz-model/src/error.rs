//! Mutation errors for algoviz-model.

use thiserror::Error;

use crate::{Coord, NodeId, StructureKind};

/// Result type for structure mutations.
pub type Result<T> = std::result::Result<T, MutationError>;

/// A user-driven change that would violate a structural invariant.
///
/// Every variant is recoverable: the mutation is discarded and the structure
/// is left exactly as it was.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MutationError {
    /// Key already present in the search tree.
    #[error("value {0} is already in the tree")]
    DuplicateKey(i64),

    /// Edge already present in the graph.
    #[error("nodes {0} and {1} are already connected")]
    DuplicateEdge(NodeId, NodeId),

    /// Edge from a node to itself.
    #[error("node {0} cannot be connected to itself")]
    SelfLoop(NodeId),

    /// Edge endpoint or start/end references a node that does not exist.
    #[error("node {0} does not exist")]
    UnknownNode(NodeId),

    /// Cell outside the grid or board.
    #[error("cell {0} is outside the {1}x{2} grid")]
    OutOfBounds(Coord, usize, usize),

    /// Sequence index outside the current length.
    #[error("index {index} is outside a sequence of length {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Cell already holds a start or end marker, or a wall.
    #[error("cell {0} is occupied")]
    CellOccupied(Coord),

    /// Queen would share a row, column or diagonal with another queen.
    #[error("a queen at {at} would be attacked by the queen at {attacker}")]
    QueenConflict { at: Coord, attacker: Coord },

    /// Search tree already holds its maximum number of keys.
    #[error("the tree already holds the maximum of {0} keys")]
    TreeFull(usize),

    /// Size parameter outside the accepted range.
    #[error("size {value} is outside {min}..={max}")]
    InvalidSize { value: usize, min: usize, max: usize },

    /// Physics parameter that would make the integration meaningless.
    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    /// Mutation addressed to a different kind of structure.
    #[error("{mutation} does not apply to a {kind} structure")]
    WrongStructure {
        mutation: &'static str,
        kind: StructureKind,
    },
}
