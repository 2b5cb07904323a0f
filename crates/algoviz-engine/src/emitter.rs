//! Step Emitter - cooperative pacing between an algorithm and its observer.
//!
//! Algorithms call [`StepEmitter::emit`] after every observable micro-step.
//! The emitter hands a [`Step`] (with a snapshot of the structure) to the
//! observer, then suspends the algorithm for the configured delay. This is the
//! only place an algorithm ever suspends.
//!
//! # Transport controls
//!
//! A [`RunControl`] handle adjusts the run from outside:
//!
//! - **Delay**: read at the start of every suspension, so a change affects only
//!   steps emitted after it
//! - **Pause**: `emit` does not return until resumed
//! - **Cancel**: `emit` returns [`Error::Aborted`], which algorithms propagate
//!   with `?`; a paused run is woken and terminates
//!
//! Because cancellation arrives as an `Err` from the suspension point itself, a
//! step can never be swallowed by a deep recursive call that forgot to check.

use std::time::Duration;

use algoviz_model::{Coord, NodeId, Snapshot, Structure};
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch};
use tracing::trace;

use crate::error::{Error, Result};

/// Slowest slider position.
pub const MIN_SPEED: u8 = 1;

/// Fastest slider position.
pub const MAX_SPEED: u8 = 100;

/// Delay at the slowest slider position.
pub const SLOWEST_DELAY: Duration = Duration::from_millis(1000);

/// Map a 1..=100 speed slider to a step delay: 1 → 1000 ms, 100 → 10 ms.
///
/// Out-of-range speeds are clamped.
pub fn delay_for_speed(speed: u8) -> Duration {
    let speed = speed.clamp(MIN_SPEED, MAX_SPEED) as u64;
    Duration::from_millis(1000 - (speed - 1) * 10)
}

/// What a step represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// Two elements were compared
    Compare,
    /// An element was visited or settled
    Visit,
    /// Two elements were exchanged
    Swap,
    /// An element was written or placed
    Place,
    /// A physics frame advanced
    Tick,
}

/// An element highlighted by a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "at", rename_all = "snake_case")]
pub enum ElementRef {
    /// Position in a sequence or heap
    Index(usize),
    /// Tree node by key
    Key(i64),
    /// Graph node
    Node(NodeId),
    /// Grid or board cell
    Cell(Coord),
}

/// One observable micro-step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// 1-based position in the run; strictly increasing
    pub seq: u64,
    pub kind: StepKind,
    pub highlight: Vec<ElementRef>,
    /// Structure state right after the micro-step
    pub snapshot: Structure,
}

/// Counters accumulated over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    pub steps: u64,
    pub comparisons: u64,
    pub swaps: u64,
    pub visits: u64,
    pub placements: u64,
    pub ticks: u64,
}

impl RunStats {
    /// Count one step of `kind`.
    pub fn record(&mut self, kind: StepKind) {
        self.steps += 1;
        match kind {
            StepKind::Compare => self.comparisons += 1,
            StepKind::Visit => self.visits += 1,
            StepKind::Swap => self.swaps += 1,
            StepKind::Place => self.placements += 1,
            StepKind::Tick => self.ticks += 1,
        }
    }
}

/// Transport state shared between a run and its controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlState {
    pub delay: Duration,
    pub paused: bool,
    pub cancelled: bool,
}

/// Handle for pausing, resuming, re-timing and cancelling one run.
///
/// Cheap to clone; every clone controls the same run.
#[derive(Debug, Clone)]
pub struct RunControl {
    state: std::sync::Arc<watch::Sender<ControlState>>,
}

impl RunControl {
    /// Create a control for a run pacing steps at `delay`.
    pub fn new(delay: Duration) -> Self {
        let (tx, _rx) = watch::channel(ControlState {
            delay,
            paused: false,
            cancelled: false,
        });
        Self {
            state: std::sync::Arc::new(tx),
        }
    }

    /// Current transport state.
    #[must_use]
    pub fn state(&self) -> ControlState {
        *self.state.borrow()
    }

    #[must_use]
    pub fn delay(&self) -> Duration {
        self.state().delay
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.state().paused
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state().cancelled
    }

    /// Change the delay for steps emitted from now on.
    pub fn set_delay(&self, delay: Duration) {
        self.state.send_modify(|s| s.delay = delay);
    }

    pub fn pause(&self) {
        self.state.send_modify(|s| s.paused = true);
    }

    pub fn resume(&self) {
        self.state.send_modify(|s| s.paused = false);
    }

    /// Request cancellation. Observed at the next step boundary, or
    /// immediately by a run that is sleeping or paused.
    pub fn cancel(&self) {
        self.state.send_modify(|s| s.cancelled = true);
    }

    fn subscribe(&self) -> watch::Receiver<ControlState> {
        self.state.subscribe()
    }
}

/// Receives steps in emission order.
pub trait StepSink: Send {
    fn accept(&mut self, step: Step);
}

impl<F> StepSink for F
where
    F: FnMut(Step) + Send,
{
    fn accept(&mut self, step: Step) {
        self(step)
    }
}

impl StepSink for mpsc::UnboundedSender<Step> {
    fn accept(&mut self, step: Step) {
        // A dropped receiver only means nobody is watching; the run goes on.
        let _ = self.send(step);
    }
}

/// Paces one algorithm run.
pub struct StepEmitter {
    control: RunControl,
    rx: watch::Receiver<ControlState>,
    sink: Box<dyn StepSink>,
    seq: u64,
    stats: RunStats,
}

impl StepEmitter {
    /// Create an emitter reporting to `sink` under `control`.
    pub fn new(control: RunControl, sink: impl StepSink + 'static) -> Self {
        let rx = control.subscribe();
        Self {
            control,
            rx,
            sink: Box::new(sink),
            seq: 0,
            stats: RunStats::default(),
        }
    }

    /// Emitter with no observer and no delay (tests, headless runs).
    pub fn unpaced() -> Self {
        Self::new(RunControl::new(Duration::ZERO), |_step: Step| {})
    }

    pub fn control(&self) -> &RunControl {
        &self.control
    }

    /// Counters so far.
    pub fn stats(&self) -> RunStats {
        self.stats
    }

    pub fn is_cancelled(&self) -> bool {
        self.control.is_cancelled()
    }

    /// Publish one micro-step and suspend until the algorithm may continue.
    ///
    /// Returns [`Error::Aborted`] once the run has been cancelled.
    pub async fn emit<S>(
        &mut self,
        kind: StepKind,
        highlight: impl IntoIterator<Item = ElementRef>,
        structure: &S,
    ) -> Result<()>
    where
        S: Snapshot + ?Sized,
    {
        self.seq += 1;
        self.stats.record(kind);
        let step = Step {
            seq: self.seq,
            kind,
            highlight: highlight.into_iter().collect(),
            snapshot: structure.snapshot(),
        };
        trace!(seq = step.seq, kind = ?step.kind, highlight = ?step.highlight, "Emitting step");
        self.sink.accept(step);
        self.pace().await
    }

    async fn pace(&mut self) -> Result<()> {
        let state = *self.rx.borrow_and_update();
        if state.cancelled {
            return Err(Error::Aborted);
        }

        if state.delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            // Wake early if cancelled mid-sleep.
            tokio::select! {
                _ = tokio::time::sleep(state.delay) => {}
                _ = self.rx.wait_for(|s| s.cancelled) => {}
            }
        }

        loop {
            let state = *self.rx.borrow_and_update();
            if state.cancelled {
                return Err(Error::Aborted);
            }
            if !state.paused {
                return Ok(());
            }
            if self.rx.changed().await.is_err() {
                // Every control handle is gone; nobody can resume us.
                return Err(Error::Aborted);
            }
        }
    }
}

impl std::fmt::Debug for StepEmitter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StepEmitter")
            .field("control", &self.control)
            .field("seq", &self.seq)
            .field("stats", &self.stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use algoviz_model::Sequence;

    use super::*;

    fn recording() -> (Arc<Mutex<Vec<Step>>>, impl StepSink + 'static) {
        let steps = Arc::new(Mutex::new(Vec::new()));
        let sink_steps = Arc::clone(&steps);
        (steps, move |step: Step| sink_steps.lock().unwrap().push(step))
    }

    #[test]
    fn speed_slider_maps_to_delay() {
        assert_eq!(delay_for_speed(1), Duration::from_millis(1000));
        assert_eq!(delay_for_speed(50), Duration::from_millis(510));
        assert_eq!(delay_for_speed(100), Duration::from_millis(10));
        assert_eq!(delay_for_speed(0), SLOWEST_DELAY);
        assert_eq!(delay_for_speed(255), Duration::from_millis(10));
    }

    #[tokio::test]
    async fn steps_are_numbered_in_order() {
        let (steps, sink) = recording();
        let mut emitter = StepEmitter::new(RunControl::new(Duration::ZERO), sink);
        let seq = Sequence::from_values(vec![2, 1]);

        emitter.emit(StepKind::Compare, [ElementRef::Index(0), ElementRef::Index(1)], &seq).await.unwrap();
        emitter.emit(StepKind::Swap, [ElementRef::Index(0), ElementRef::Index(1)], &seq).await.unwrap();

        let steps = steps.lock().unwrap();
        assert_eq!(steps.iter().map(|s| s.seq).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(steps[0].kind, StepKind::Compare);
        assert_eq!(emitter.stats().comparisons, 1);
        assert_eq!(emitter.stats().swaps, 1);
        assert_eq!(emitter.stats().steps, 2);
    }

    #[tokio::test]
    async fn cancel_aborts_at_next_boundary() {
        let control = RunControl::new(Duration::ZERO);
        let canceller = control.clone();
        let mut emitter = StepEmitter::new(control, move |_step: Step| canceller.cancel());
        let seq = Sequence::default();

        let result = emitter.emit(StepKind::Visit, [], &seq).await;
        assert_eq!(result, Err(Error::Aborted));
        assert_eq!(emitter.stats().steps, 1);
    }

    #[tokio::test]
    async fn pause_blocks_until_resume() {
        let control = RunControl::new(Duration::ZERO);
        control.pause();
        let mut emitter = StepEmitter::new(control.clone(), |_step: Step| {});

        let handle = tokio::spawn(async move {
            let seq = Sequence::default();
            emitter.emit(StepKind::Visit, [], &seq).await
        });

        tokio::task::yield_now().await;
        assert!(!handle.is_finished());

        control.resume();
        assert_eq!(handle.await.unwrap(), Ok(()));
    }

    #[tokio::test]
    async fn cancel_while_paused_terminates() {
        let control = RunControl::new(Duration::ZERO);
        control.pause();
        let mut emitter = StepEmitter::new(control.clone(), |_step: Step| {});

        let handle = tokio::spawn(async move {
            let seq = Sequence::default();
            emitter.emit(StepKind::Visit, [], &seq).await
        });

        tokio::task::yield_now().await;
        control.cancel();
        assert_eq!(handle.await.unwrap(), Err(Error::Aborted));
    }

    #[tokio::test]
    async fn cancel_wakes_a_long_sleep() {
        let control = RunControl::new(Duration::from_secs(3600));
        let mut emitter = StepEmitter::new(control.clone(), |_step: Step| {});

        let handle = tokio::spawn(async move {
            let seq = Sequence::default();
            emitter.emit(StepKind::Visit, [], &seq).await
        });

        tokio::task::yield_now().await;
        control.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), handle).await;
        assert_eq!(result.unwrap().unwrap(), Err(Error::Aborted));
    }

    #[test]
    fn set_delay_is_visible_to_later_steps() {
        let control = RunControl::new(Duration::from_millis(500));
        control.set_delay(Duration::from_millis(20));
        assert_eq!(control.delay(), Duration::from_millis(20));
        assert!(!control.is_paused());
    }

    #[test]
    fn step_serializes_with_tagged_refs() {
        let step = Step {
            seq: 1,
            kind: StepKind::Visit,
            highlight: vec![ElementRef::Cell(Coord::new(1, 2))],
            snapshot: Structure::Sequence(Sequence::from_values(vec![1])),
        };
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["kind"], "visit");
        assert_eq!(json["highlight"][0]["type"], "cell");
        assert_eq!(json["highlight"][0]["at"]["row"], 1);
    }
}
