//! Events streamed to visualizer clients, and timeline frames rebuilt from a
//! recorded run.

use algoviz_engine::{ElementRef, RunReport, RunStats, Step, StepKind};
use algoviz_model::{Applied, Structure};
use serde::{Deserialize, Serialize};

use crate::playback::TimelineView;
use crate::session::{SessionId, SessionStatus};

/// Everything a WebSocket client can receive.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Current structure, sent on connect, on request and after edits
    Snapshot { id: SessionId, structure: Structure },

    /// A user edit was applied
    Mutated { id: SessionId, applied: Applied },

    /// One step of the active run
    Step { id: SessionId, step: Step },

    /// The active run ended
    Finished { id: SessionId, report: RunReport },

    /// Reply to a status request
    Status { status: SessionStatus },

    /// Timeline position after a seek or step
    Timeline(TimelineView),

    /// Reply to a command that could not be carried out
    Error { message: String },
}

/// State of a recorded run at one timeline position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineFrame {
    /// 0 is the structure before the first step
    pub frame: usize,
    pub kind: Option<StepKind>,
    pub highlight: Vec<ElementRef>,
    pub structure: Structure,
    /// Counters accumulated over the steps up to this frame
    pub stats: RunStats,
}

impl TimelineFrame {
    /// Rebuild the frame after the first `up_to` steps.
    pub fn from_steps(initial: &Structure, steps: &[Step], up_to: usize) -> Self {
        let up_to = up_to.min(steps.len());
        let mut stats = RunStats::default();
        for step in &steps[..up_to] {
            stats.record(step.kind);
        }

        match up_to.checked_sub(1).map(|i| &steps[i]) {
            Some(step) => Self {
                frame: up_to,
                kind: Some(step.kind),
                highlight: step.highlight.clone(),
                structure: step.snapshot.clone(),
                stats,
            },
            None => Self {
                frame: 0,
                kind: None,
                highlight: Vec::new(),
                structure: initial.clone(),
                stats,
            },
        }
    }
}
