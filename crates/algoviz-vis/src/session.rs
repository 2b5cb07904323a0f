//! Visualizer sessions: one engine [`Visualizer`] per client-created id, with
//! a broadcast channel for live events and the timeline of the last run.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use algoviz_engine::{Algorithm, EditMode, Phase, RunEvent, RunReport, RunStream, Step, Visualizer};
use algoviz_model::{Applied, Mutation, NodeId, Point, Structure, StructureKind, StructureSpec};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, Mutex, MutexGuard, RwLock};
use tracing::{debug, info};

use crate::config::VisConfig;
use crate::error::{Error, Result};
use crate::events::ServerEvent;
use crate::playback::{Playback, PlaybackStatus};

/// Identifier handed out by [`Sessions::create`].
pub type SessionId = u64;

/// Shared handle to one session.
pub type SessionHandle = Arc<Mutex<Session>>;

/// One visualizer and everything observing it.
pub struct Session {
    id: SessionId,
    visualizer: Visualizer,
    timeline: Arc<Mutex<Playback>>,
    /// Bumped on every run start and reset; a recorder only installs its
    /// timeline if no newer run or reset happened meanwhile.
    generation: Arc<AtomicU64>,
    events: broadcast::Sender<ServerEvent>,
    max_recorded_steps: usize,
}

/// Everything a client needs to draw controls for a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionStatus {
    pub id: SessionId,
    pub kind: StructureKind,
    pub phase: Phase,
    pub paused: bool,
    pub running: Option<Algorithm>,
    pub delay_ms: u64,
    pub speed: u8,
    pub edit_mode: EditMode,
    pub selected: Option<NodeId>,
    pub message: String,
    pub last_report: Option<RunReport>,
    pub timeline: PlaybackStatus,
}

impl Session {
    fn new(id: SessionId, mut visualizer: Visualizer, config: &VisConfig) -> Self {
        let (events, _) = broadcast::channel(config.event_buffer);
        let timeline = Playback::empty(visualizer.snapshot());
        Self {
            id,
            visualizer,
            timeline: Arc::new(Mutex::new(timeline)),
            generation: Arc::new(AtomicU64::new(0)),
            events,
            max_recorded_steps: config.max_recorded_steps,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn visualizer(&self) -> &Visualizer {
        &self.visualizer
    }

    /// Timeline of the last finished run.
    pub async fn timeline(&self) -> MutexGuard<'_, Playback> {
        self.timeline.lock().await
    }

    /// Receive every event published for this session from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.events.subscribe()
    }

    fn publish(&self, event: ServerEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }

    /// Latest observable structure.
    pub fn snapshot(&mut self) -> Structure {
        self.visualizer.snapshot()
    }

    pub async fn status(&mut self) -> SessionStatus {
        let phase = self.visualizer.phase();
        let timeline = PlaybackStatus::from(&*self.timeline.lock().await);
        SessionStatus {
            id: self.id,
            kind: self.visualizer.kind(),
            phase,
            paused: self.visualizer.is_paused(),
            running: self.visualizer.running_algorithm().cloned(),
            delay_ms: self.visualizer.delay().as_millis() as u64,
            speed: self.visualizer.config().speed,
            edit_mode: self.visualizer.edit_mode(),
            selected: self.visualizer.selected(),
            message: self.visualizer.message().to_string(),
            last_report: self.visualizer.last_report().cloned(),
            timeline,
        }
    }

    fn publish_snapshot(&mut self) {
        let structure = self.visualizer.snapshot();
        self.publish(ServerEvent::Snapshot { id: self.id, structure });
    }

    /// Apply one edit and tell subscribers.
    pub fn mutate(&mut self, mutation: &Mutation) -> Result<Applied> {
        let applied = self.visualizer.mutate(mutation)?;
        self.publish(ServerEvent::Mutated { id: self.id, applied });
        self.publish_snapshot();
        Ok(applied)
    }

    /// Canvas click on a graph, interpreted by the current edit mode.
    pub fn click(&mut self, point: Point) -> Result<Applied> {
        let applied = self.visualizer.click_graph(point)?;
        self.publish(ServerEvent::Mutated { id: self.id, applied });
        self.publish_snapshot();
        Ok(applied)
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.visualizer.set_edit_mode(mode);
    }

    /// Start `algorithm`.
    ///
    /// Steps are broadcast to subscribers as they happen and recorded; when
    /// the run ends the recording becomes this session's timeline.
    pub async fn run(&mut self, algorithm: Algorithm) -> Result<()> {
        let initial = self.visualizer.snapshot();
        let stream = self.visualizer.run(algorithm)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        *self.timeline.lock().await = Playback::empty(initial.clone());

        let recorder = Recorder {
            id: self.id,
            generation,
            current: Arc::clone(&self.generation),
            timeline: Arc::clone(&self.timeline),
            initial,
            steps: Vec::new(),
            max_steps: self.max_recorded_steps,
            truncated: false,
            events: self.events.clone(),
        };
        tokio::spawn(recorder.record(stream));
        Ok(())
    }

    pub fn pause(&mut self) -> Result<()> {
        self.visualizer.pause().then_some(()).ok_or(Error::NotRunning)
    }

    pub fn resume(&mut self) -> Result<()> {
        self.visualizer.resume().then_some(()).ok_or(Error::NotRunning)
    }

    pub fn cancel(&mut self) -> Result<()> {
        self.visualizer.cancel().then_some(()).ok_or(Error::NotRunning)
    }

    pub fn set_delay(&mut self, delay: Duration) {
        self.visualizer.set_delay(delay);
    }

    pub fn set_speed(&mut self, speed: u8) {
        self.visualizer.set_speed(speed);
    }

    /// Cancel any run and tell subscribers the session is gone.
    fn close(&mut self, reason: &str) {
        let _ = self.visualizer.cancel();
        self.publish(ServerEvent::Error {
            message: format!("visualizer {} closed: {reason}", self.id),
        });
    }

    /// Cancel any run, rebuild the structure and clear the timeline.
    pub async fn reset(&mut self) -> Result<()> {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.visualizer.reset().await?;
        *self.timeline.lock().await = Playback::empty(self.visualizer.snapshot());
        self.publish_snapshot();
        Ok(())
    }
}

/// Forwards one run's events to subscribers while recording its steps.
struct Recorder {
    id: SessionId,
    generation: u64,
    current: Arc<AtomicU64>,
    timeline: Arc<Mutex<Playback>>,
    initial: Structure,
    steps: Vec<Step>,
    max_steps: usize,
    truncated: bool,
    events: broadcast::Sender<ServerEvent>,
}

impl Recorder {
    async fn record(mut self, mut stream: RunStream) {
        while let Some(event) = stream.next_event().await {
            match event {
                RunEvent::Step(step) => {
                    if self.steps.len() < self.max_steps {
                        self.steps.push(step.clone());
                    } else if !self.truncated {
                        debug!(id = self.id, max_steps = self.max_steps, "Timeline full, dropping later steps");
                        self.truncated = true;
                    }
                    let _ = self.events.send(ServerEvent::Step { id: self.id, step });
                }
                RunEvent::Finished(report) => {
                    let mut timeline = self.timeline.lock().await;
                    if self.current.load(Ordering::SeqCst) == self.generation {
                        *timeline = Playback::new(self.initial, self.steps, self.truncated);
                    }
                    drop(timeline);
                    let _ = self.events.send(ServerEvent::Finished { id: self.id, report });
                    return;
                }
            }
        }
    }
}

/// All live sessions.
pub struct Sessions {
    config: VisConfig,
    next_id: AtomicU64,
    sessions: RwLock<HashMap<SessionId, SessionHandle>>,
}

impl Sessions {
    pub fn new(config: VisConfig) -> Self {
        Self {
            config,
            next_id: AtomicU64::new(1),
            sessions: RwLock::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &VisConfig {
        &self.config
    }

    /// Create a visualizer from explicit creation parameters.
    ///
    /// At `max_sessions` live sessions the oldest one is evicted first.
    pub async fn create(&self, spec: StructureSpec) -> Result<(SessionId, SessionHandle)> {
        let visualizer = Visualizer::new(spec, self.config.engine.clone())?;
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let kind = visualizer.kind();
        let handle = Arc::new(Mutex::new(Session::new(id, visualizer, &self.config)));

        let evicted = {
            let mut sessions = self.sessions.write().await;
            let evicted = if sessions.len() >= self.config.max_sessions {
                let oldest = sessions.keys().min().copied();
                oldest.and_then(|oldest| sessions.remove_entry(&oldest))
            } else {
                None
            };
            sessions.insert(id, Arc::clone(&handle));
            evicted
        };
        if let Some((old_id, old)) = evicted {
            old.lock().await.close("evicted to make room");
            info!(id = old_id, max_sessions = self.config.max_sessions, "Evicted oldest visualizer session");
        }

        info!(id, %kind, "Created visualizer session");
        Ok((id, handle))
    }

    /// Create a visualizer of `kind` with the configured defaults.
    pub async fn create_kind(&self, kind: StructureKind) -> Result<(SessionId, SessionHandle)> {
        self.create(self.config.engine.spec_for(kind)).await
    }

    pub async fn get(&self, id: SessionId) -> Result<SessionHandle> {
        self.sessions.read().await.get(&id).cloned().ok_or(Error::NotFound(id))
    }

    /// Status of every session, ordered by id.
    pub async fn list(&self) -> Vec<SessionStatus> {
        let mut handles: Vec<(SessionId, SessionHandle)> = self
            .sessions
            .read()
            .await
            .iter()
            .map(|(id, handle)| (*id, Arc::clone(handle)))
            .collect();
        handles.sort_by_key(|(id, _)| *id);

        let mut statuses = Vec::with_capacity(handles.len());
        for (_, handle) in handles {
            statuses.push(handle.lock().await.status().await);
        }
        statuses
    }

    /// Drop a session, cancelling its run.
    pub async fn remove(&self, id: SessionId) -> Result<()> {
        let handle = self.sessions.write().await.remove(&id).ok_or(Error::NotFound(id))?;
        handle.lock().await.close("removed");
        info!(id, "Removed visualizer session");
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }
}
