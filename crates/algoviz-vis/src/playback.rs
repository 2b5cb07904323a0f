//! Playback of the last recorded run.
//!
//! Live runs are paced by the engine; once a run has ended its steps can be
//! scrubbed back and forth here without touching the visualizer's structure.

use algoviz_engine::Step;
use algoviz_model::Structure;
use serde::{Deserialize, Serialize};

use crate::events::TimelineFrame;

/// Where the playhead sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    /// Nothing recorded yet
    Empty,
    /// Before the first step
    AtStart,
    /// Somewhere inside the run
    Scrubbing,
    /// After the last step
    Finished,
}

/// Direction for single-frame stepping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepDirection {
    Forward,
    Backward,
}

/// Scrubbable timeline over one recorded run.
#[derive(Debug, Clone)]
pub struct Playback {
    initial: Structure,
    steps: Vec<Step>,
    current_frame: usize,
    truncated: bool,
}

impl Playback {
    /// Timeline with nothing recorded, showing `initial`.
    pub fn empty(initial: Structure) -> Self {
        Self::new(initial, Vec::new(), false)
    }

    /// Timeline over `steps`, recorded from `initial`. `truncated` marks a
    /// run whose later steps were not kept.
    pub fn new(initial: Structure, steps: Vec<Step>, truncated: bool) -> Self {
        Self {
            initial,
            steps,
            current_frame: 0,
            truncated,
        }
    }

    /// Get the current frame number.
    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    /// Get the total number of frames.
    pub fn total_frames(&self) -> usize {
        self.steps.len()
    }

    pub fn state(&self) -> PlaybackState {
        if self.steps.is_empty() {
            PlaybackState::Empty
        } else if self.current_frame == 0 {
            PlaybackState::AtStart
        } else if self.current_frame >= self.steps.len() {
            PlaybackState::Finished
        } else {
            PlaybackState::Scrubbing
        }
    }

    /// Seek to a specific frame, clamped to the recording.
    pub fn seek(&mut self, frame: usize) {
        self.current_frame = frame.min(self.steps.len());
    }

    /// Step forward one frame, returning the step passed over.
    pub fn step_forward(&mut self) -> Option<&Step> {
        let step = self.steps.get(self.current_frame)?;
        self.current_frame += 1;
        Some(step)
    }

    /// Step backward one frame.
    pub fn step_backward(&mut self) {
        self.current_frame = self.current_frame.saturating_sub(1);
    }

    pub fn step(&mut self, direction: StepDirection) {
        match direction {
            StepDirection::Forward => {
                self.step_forward();
            }
            StepDirection::Backward => self.step_backward(),
        }
    }

    /// Calculate progress as a fraction (0.0 - 1.0).
    pub fn progress(&self) -> f64 {
        if self.steps.is_empty() {
            0.0
        } else {
            self.current_frame as f64 / self.steps.len() as f64
        }
    }

    /// Structure and highlight at the playhead.
    pub fn frame(&self) -> TimelineFrame {
        TimelineFrame::from_steps(&self.initial, &self.steps, self.current_frame)
    }

    pub fn view(&self) -> TimelineView {
        TimelineView {
            status: self.into(),
            frame: self.frame(),
        }
    }
}

/// Status plus the frame at the playhead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimelineView {
    pub status: PlaybackStatus,
    pub frame: TimelineFrame,
}

/// Playback status for sending to clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaybackStatus {
    pub current_frame: usize,
    pub total_frames: usize,
    pub state: PlaybackState,
    pub progress: f64,
    pub truncated: bool,
}

impl From<&Playback> for PlaybackStatus {
    fn from(playback: &Playback) -> Self {
        Self {
            current_frame: playback.current_frame,
            total_frames: playback.total_frames(),
            state: playback.state(),
            progress: playback.progress(),
            truncated: playback.truncated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_engine::{ElementRef, StepKind};
    use algoviz_model::Sequence;

    fn make_steps(count: usize) -> Vec<Step> {
        (0..count)
            .map(|i| Step {
                seq: i as u64 + 1,
                kind: StepKind::Place,
                highlight: vec![ElementRef::Index(i)],
                snapshot: Structure::Sequence(Sequence::from_values(vec![i as i64])),
            })
            .collect()
    }

    fn playback(count: usize) -> Playback {
        Playback::new(Structure::Sequence(Sequence::default()), make_steps(count), false)
    }

    #[test]
    fn playback_starts_at_zero() {
        let playback = playback(10);
        assert_eq!(playback.current_frame(), 0);
        assert_eq!(playback.state(), PlaybackState::AtStart);
        assert_eq!(playback.frame().structure, Structure::Sequence(Sequence::default()));
    }

    #[test]
    fn seek_clamps_to_bounds() {
        let mut playback = playback(10);

        playback.seek(5);
        assert_eq!(playback.current_frame(), 5);
        assert_eq!(playback.state(), PlaybackState::Scrubbing);

        playback.seek(100);
        assert_eq!(playback.current_frame(), 10);
        assert_eq!(playback.state(), PlaybackState::Finished);

        playback.seek(0);
        assert_eq!(playback.current_frame(), 0);
    }

    #[test]
    fn step_forward_stops_at_end() {
        let mut playback = playback(2);
        assert!(playback.step_forward().is_some());
        assert!(playback.step_forward().is_some());
        assert!(playback.step_forward().is_none());
        assert_eq!(playback.current_frame(), 2);
    }

    #[test]
    fn step_backward_shows_earlier_snapshot() {
        let mut playback = playback(3);
        playback.seek(3);
        playback.step(StepDirection::Backward);
        let frame = playback.frame();
        assert_eq!(frame.frame, 2);
        assert_eq!(frame.structure, Structure::Sequence(Sequence::from_values(vec![1])));

        playback.seek(0);
        playback.step(StepDirection::Backward);
        assert_eq!(playback.current_frame(), 0);
    }

    #[test]
    fn progress_calculation() {
        let mut playback = playback(10);
        assert_eq!(playback.progress(), 0.0);
        playback.seek(5);
        assert_eq!(playback.progress(), 0.5);
        assert_eq!(Playback::empty(Structure::Sequence(Sequence::default())).progress(), 0.0);
    }

    #[test]
    fn status_conversion() {
        let mut playback = Playback::new(Structure::Sequence(Sequence::default()), make_steps(4), true);
        playback.seek(3);
        let status: PlaybackStatus = (&playback).into();
        assert_eq!(status.current_frame, 3);
        assert_eq!(status.total_frames, 4);
        assert!(status.truncated);
    }
}
