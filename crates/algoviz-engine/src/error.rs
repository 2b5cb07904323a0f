//! Error types for algoviz-engine.

use algoviz_model::{MutationError, StructureKind};
use thiserror::Error;

/// Result type for algoviz-engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// What a run needs before it may start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Precondition {
    /// No start node or start cell has been placed.
    #[error("no start has been set")]
    MissingStart,

    /// No end node or end cell has been placed.
    #[error("no end has been set")]
    MissingEnd,

    /// The structure holds nothing to operate on.
    #[error("the structure is empty")]
    EmptyStructure,

    /// The algorithm does not apply to this kind of structure.
    #[error("expected a {expected} structure, got a {actual}")]
    WrongStructure {
        expected: StructureKind,
        actual: StructureKind,
    },
}

/// Recoverable failures surfaced to the interaction controller.
///
/// None of these are fatal: each maps to a short message and the visualizer
/// stays usable.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum Error {
    /// A mutation would have violated a structural invariant.
    #[error("invalid mutation: {0}")]
    InvalidMutation(#[from] MutationError),

    /// The run was refused before it started.
    #[error("cannot run {algorithm}: {missing}")]
    MissingPrecondition {
        algorithm: &'static str,
        missing: Precondition,
    },

    /// An algorithm is already running on this structure.
    #[error("an algorithm is already running")]
    Busy,

    /// The run was cancelled mid-flight; partial state is retained.
    #[error("run was cancelled")]
    Aborted,
}

