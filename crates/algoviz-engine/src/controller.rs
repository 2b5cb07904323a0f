//! Interaction Controller - one visualizer instance.
//!
//! A [`Visualizer`] owns one structure and at most one active run. It
//! serializes user edits against runs:
//!
//! ```text
//!  Idle ──mutate──► Editing ──run──► Running ──finish──► Idle
//!    ▲                 ▲                │
//!    └──────run────────┘             cancel
//!                                       ▼
//!                                   Cancelled ──collect──► Idle
//! ```
//!
//! While a run is active, edits and a second run are refused with
//! [`Error::Busy`]; transport controls (pause, resume, delay, cancel) are
//! accepted. Observers receive every step through a [`RunStream`].

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use algoviz_model::{Applied, Mutation, MutationError, NodeId, Point, Structure, StructureKind, StructureSpec};
use futures::{FutureExt, Stream};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::algorithms::{Algorithm, Outcome};
use crate::config::EngineConfig;
use crate::emitter::{delay_for_speed, RunControl, RunStats, Step, StepEmitter};
use crate::error::{Error, Result};

/// Lifecycle phase of a visualizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    /// Nothing has happened since creation, reset or the last run
    Idle,
    /// The user has changed the structure since the last run
    Editing,
    Running,
    /// Cancel requested; the run has not been collected yet
    Cancelled,
}

/// What clicking on the graph canvas does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    /// Place a new node
    #[default]
    Add,
    /// Select two nodes in turn to join them
    Connect,
    /// Mark the clicked node as start
    Start,
    /// Mark the clicked node as end
    End,
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunResult {
    Completed { outcome: Outcome },
    Cancelled,
    Failed { error: String },
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    pub algorithm: Algorithm,
    pub result: RunResult,
    pub stats: RunStats,
    pub message: String,
}

impl RunReport {
    fn new(algorithm: Algorithm, result: Result<Outcome>, stats: RunStats) -> Self {
        let (result, message) = match result {
            Ok(outcome) => {
                let message = outcome.message();
                (RunResult::Completed { outcome }, message)
            }
            Err(Error::Aborted) => (RunResult::Cancelled, "Cancelled".to_string()),
            Err(err) => {
                let message = err.to_string();
                (RunResult::Failed { error: message.clone() }, message)
            }
        };
        Self {
            algorithm,
            result,
            stats,
            message,
        }
    }

    fn failed(algorithm: Algorithm, error: String) -> Self {
        Self {
            algorithm,
            message: error.clone(),
            result: RunResult::Failed { error },
            stats: RunStats::default(),
        }
    }

    /// Outcome of a completed run.
    pub fn outcome(&self) -> Option<&Outcome> {
        match &self.result {
            RunResult::Completed { outcome } => Some(outcome),
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.result == RunResult::Cancelled
    }
}

/// Event delivered to a run's observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RunEvent {
    Step(Step),
    Finished(RunReport),
}

/// Steps of one run in emission order, terminated by
/// [`RunEvent::Finished`].
#[derive(Debug)]
pub struct RunStream {
    rx: mpsc::UnboundedReceiver<RunEvent>,
}

impl RunStream {
    /// Next event, or `None` once the run is over and drained.
    pub async fn next_event(&mut self) -> Option<RunEvent> {
        self.rx.recv().await
    }

    /// Drain the stream, returning every step and the final report.
    pub async fn collect_run(mut self) -> (Vec<Step>, Option<RunReport>) {
        let mut steps = Vec::new();
        while let Some(event) = self.rx.recv().await {
            match event {
                RunEvent::Step(step) => steps.push(step),
                RunEvent::Finished(report) => return (steps, Some(report)),
            }
        }
        (steps, None)
    }
}

impl Stream for RunStream {
    type Item = RunEvent;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.rx.poll_recv(cx)
    }
}

struct ActiveRun {
    algorithm: Algorithm,
    control: RunControl,
    task: JoinHandle<RunReport>,
}

/// One visualizer instance: a structure plus the run driving it.
pub struct Visualizer {
    spec: StructureSpec,
    structure: Arc<Mutex<Structure>>,
    /// Latest observable state: the structure when idle, the most recent
    /// step's snapshot while running.
    view: Arc<watch::Sender<Structure>>,
    phase: Phase,
    active: Option<ActiveRun>,
    last_report: Option<RunReport>,
    config: EngineConfig,
    delay: Duration,
    rng: StdRng,
    edit_mode: EditMode,
    selected: Option<NodeId>,
    message: String,
}

impl Visualizer {
    /// Create a visualizer owning a fresh structure built from `spec`.
    pub fn new(spec: StructureSpec, config: EngineConfig) -> Result<Self> {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let structure = Structure::create(&spec, &mut rng)?;
        let (view, _) = watch::channel(structure.snapshot());
        debug!(kind = %spec.kind(), "Created visualizer");
        Ok(Self {
            spec,
            structure: Arc::new(Mutex::new(structure)),
            view: Arc::new(view),
            phase: Phase::Idle,
            active: None,
            last_report: None,
            delay: config.delay(),
            config,
            rng,
            edit_mode: EditMode::default(),
            selected: None,
            message: String::new(),
        })
    }

    /// Create a visualizer of `kind` with the configured defaults.
    pub fn with_kind(kind: StructureKind, config: EngineConfig) -> Result<Self> {
        let spec = config.spec_for(kind);
        Self::new(spec, config)
    }

    pub fn spec(&self) -> &StructureSpec {
        &self.spec
    }

    pub fn kind(&self) -> StructureKind {
        self.spec.kind()
    }

    /// Current phase, after collecting a run that has finished.
    pub fn phase(&mut self) -> Phase {
        self.reap();
        self.phase
    }

    pub fn is_running(&mut self) -> bool {
        self.reap();
        self.active.is_some()
    }

    /// Algorithm of the active run, if any.
    pub fn running_algorithm(&self) -> Option<&Algorithm> {
        self.active.as_ref().map(|a| &a.algorithm)
    }

    /// Short message describing the latest outcome or rejection.
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn last_report(&self) -> Option<&RunReport> {
        self.last_report.as_ref()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Render snapshot. While running this is the snapshot carried by the most
    /// recent step, so a structure is never observed mid-step.
    pub fn snapshot(&mut self) -> Structure {
        self.reap();
        self.view.borrow().clone()
    }

    /// Watch the observable snapshot as it changes.
    pub fn subscribe(&self) -> watch::Receiver<Structure> {
        self.view.subscribe()
    }

    fn reject(&mut self, err: Error) -> Error {
        warn!(kind = %self.kind(), error = %err, "Rejected request");
        self.message = err.to_string();
        err
    }

    /// Apply one user edit. Refused with [`Error::Busy`] while a run is active.
    pub fn mutate(&mut self, mutation: &Mutation) -> Result<Applied> {
        self.reap();
        if self.active.is_some() {
            return Err(self.reject(Error::Busy));
        }
        let result = match self.structure.try_lock() {
            Ok(mut structure) => {
                let result = structure.apply(mutation, &mut self.rng);
                if result.is_ok() {
                    self.view.send_replace(structure.snapshot());
                }
                result.map_err(Error::from)
            }
            Err(_) => Err(Error::Busy),
        };

        match result {
            Ok(applied) => {
                debug!(op = mutation.name(), ?applied, "Applied mutation");
                self.phase = Phase::Editing;
                self.message.clear();
                Ok(applied)
            }
            Err(err) => Err(self.reject(err)),
        }
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    /// Switch graph editing mode, dropping any pending selection.
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.edit_mode = mode;
        self.selected = None;
    }

    /// Node awaiting a second click in connect mode.
    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    /// Handle a click on the graph canvas according to the edit mode.
    /// Refused with [`Error::Busy`] while a run is active.
    pub fn click_graph(&mut self, point: Point) -> Result<Applied> {
        self.reap();
        if self.active.is_some() {
            return Err(self.reject(Error::Busy));
        }
        let hit = match &*self.view.borrow() {
            Structure::Graph(graph) => Ok(graph.node_at(point)),
            other => Err(other.kind()),
        };
        let hit = match hit {
            Ok(hit) => hit,
            Err(kind) => {
                let err = MutationError::WrongStructure {
                    mutation: "click_graph",
                    kind,
                };
                return Err(self.reject(err.into()));
            }
        };

        match (self.edit_mode, hit) {
            (EditMode::Add, _) => self.mutate(&Mutation::AddNode { x: point.x, y: point.y }),
            (_, None) => {
                self.message = "Click on a node".to_string();
                Ok(Applied::Done)
            }
            (EditMode::Connect, Some(id)) => match self.selected.take() {
                None => {
                    self.selected = Some(id);
                    self.message = format!("Selected node {id}");
                    Ok(Applied::Done)
                }
                Some(first) if first == id => {
                    self.message.clear();
                    Ok(Applied::Done)
                }
                Some(first) => self.mutate(&Mutation::AddEdge { a: first, b: id }),
            },
            (EditMode::Start, Some(id)) => self.mutate(&Mutation::SetStartNode { id }),
            (EditMode::End, Some(id)) => self.mutate(&Mutation::SetEndNode { id }),
        }
    }

    /// Start `algorithm` on the structure.
    ///
    /// Preconditions are checked here; a refused run never mutates. The run
    /// itself proceeds on a tokio task and reports through the returned
    /// stream.
    pub fn run(&mut self, algorithm: Algorithm) -> Result<RunStream> {
        self.reap();
        if self.active.is_some() {
            return Err(self.reject(Error::Busy));
        }

        let checked = match self.structure.try_lock() {
            Ok(structure) => algorithm.check(&structure),
            Err(_) => Err(Error::Busy),
        };
        if let Err(err) = checked {
            return Err(self.reject(err));
        }

        let control = RunControl::new(self.delay);
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let view = Arc::clone(&self.view);
        let step_events = events_tx.clone();
        let sink = move |step: Step| {
            view.send_replace(step.snapshot.clone());
            // The observer may have gone away; the run continues regardless.
            let _ = step_events.send(RunEvent::Step(step));
        };
        let mut emitter = StepEmitter::new(control.clone(), sink);

        let shared = Arc::clone(&self.structure);
        let view = Arc::clone(&self.view);
        let task_algorithm = algorithm.clone();
        let task = tokio::spawn(async move {
            let mut structure = shared.lock().await;
            let result = task_algorithm.execute(&mut structure, &mut emitter).await;
            view.send_replace(structure.snapshot());
            let report = RunReport::new(task_algorithm, result, emitter.stats());
            debug!(algorithm = report.algorithm.name(), steps = report.stats.steps, message = %report.message, "Run collected");
            let _ = events_tx.send(RunEvent::Finished(report.clone()));
            report
        });

        debug!(algorithm = algorithm.name(), delay_ms = control.delay().as_millis() as u64, "Run started");
        self.phase = Phase::Running;
        self.selected = None;
        self.message = format!("Running {}", algorithm.name());
        self.active = Some(ActiveRun {
            algorithm,
            control,
            task,
        });
        Ok(RunStream { rx: events_rx })
    }

    fn finish(&mut self, report: RunReport) {
        self.message = report.message.clone();
        self.last_report = Some(report);
        self.phase = Phase::Idle;
    }

    fn collected(algorithm: Algorithm, joined: std::result::Result<RunReport, tokio::task::JoinError>) -> RunReport {
        joined.unwrap_or_else(|err| {
            warn!(algorithm = algorithm.name(), error = %err, "Run task failed");
            RunReport::failed(algorithm, err.to_string())
        })
    }

    /// Collect a run that has already finished.
    fn reap(&mut self) {
        let finished = self.active.as_ref().is_some_and(|active| active.task.is_finished());
        if !finished {
            return;
        }
        if let Some(active) = self.active.take() {
            let algorithm = active.algorithm;
            let report = match active.task.now_or_never() {
                Some(joined) => Self::collected(algorithm, joined),
                None => RunReport::failed(algorithm, "run result was lost".to_string()),
            };
            self.finish(report);
        }
    }

    /// Wait for the active run to end and collect its report.
    pub async fn wait(&mut self) -> Option<RunReport> {
        let active = self.active.take()?;
        let report = Self::collected(active.algorithm, active.task.await);
        self.finish(report.clone());
        Some(report)
    }

    /// Pause the active run. Returns whether a run was active.
    pub fn pause(&mut self) -> bool {
        self.reap();
        match &self.active {
            Some(active) => {
                active.control.pause();
                true
            }
            None => false,
        }
    }

    /// Resume a paused run. Returns whether a run was active.
    pub fn resume(&mut self) -> bool {
        self.reap();
        match &self.active {
            Some(active) => {
                active.control.resume();
                true
            }
            None => false,
        }
    }

    /// Request cancellation of the active run; partial state is kept.
    /// Returns whether a run was active.
    pub fn cancel(&mut self) -> bool {
        self.reap();
        match &self.active {
            Some(active) => {
                active.control.cancel();
                self.phase = Phase::Cancelled;
                true
            }
            None => false,
        }
    }

    /// Whether the active run is paused.
    pub fn is_paused(&self) -> bool {
        self.active.as_ref().is_some_and(|a| a.control.is_paused())
    }

    /// Change the step delay for this and future runs. Zero only yields
    /// between steps.
    pub fn set_delay(&mut self, delay: Duration) {
        self.delay = delay;
        if let Some(active) = &self.active {
            active.control.set_delay(delay);
        }
    }

    /// Change the speed slider (1..=100) for this and future runs.
    pub fn set_speed(&mut self, speed: u8) {
        self.config.speed = speed;
        self.set_delay(delay_for_speed(speed));
    }

    /// Current step delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Cancel any active run, then rebuild the structure from its creation
    /// parameters. A body keeps its current parameters and only returns to its
    /// initial state.
    pub async fn reset(&mut self) -> Result<()> {
        if let Some(active) = &self.active {
            active.control.cancel();
        }
        self.wait().await;

        let mut structure = self.structure.lock().await;
        match &mut *structure {
            Structure::Body(body) => body.reset(),
            other => *other = Structure::create(&self.spec, &mut self.rng)?,
        }
        self.view.send_replace(structure.snapshot());
        drop(structure);

        self.phase = Phase::Idle;
        self.selected = None;
        self.message = "Reset".to_string();
        debug!(kind = %self.kind(), "Reset visualizer");
        Ok(())
    }
}

impl Drop for Visualizer {
    fn drop(&mut self) {
        if let Some(active) = &self.active {
            active.control.cancel();
        }
    }
}

impl std::fmt::Debug for Visualizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Visualizer")
            .field("kind", &self.spec.kind())
            .field("phase", &self.phase)
            .field("running", &self.active.as_ref().map(|a| a.algorithm.name()))
            .field("edit_mode", &self.edit_mode)
            .field("message", &self.message)
            .finish()
    }
}
