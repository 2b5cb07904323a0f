//! Error types for algoviz-vis.

use thiserror::Error;

use crate::session::SessionId;

/// Result type for algoviz-vis operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the server and session registry.
#[derive(Debug, Error)]
pub enum Error {
    /// No visualizer with this id
    #[error("visualizer {0} not found")]
    NotFound(SessionId),

    /// Pause, resume or cancel with nothing running
    #[error("no run is active")]
    NotRunning,

    /// Refused by the engine
    #[error(transparent)]
    Engine(#[from] algoviz_engine::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
