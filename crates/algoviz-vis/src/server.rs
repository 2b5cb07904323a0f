//! Axum web server with WebSocket streaming for visualizers.

use std::sync::Arc;
use std::time::Duration;

use algoviz_engine::{Algorithm, EditMode};
use algoviz_model::{Applied, Mutation, Point, Structure, StructureKind, StructureSpec};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tokio::sync::broadcast::error::RecvError;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{debug, info, warn};

use crate::config::VisConfig;
use crate::error::{Error, Result};
use crate::events::ServerEvent;
use crate::playback::{StepDirection, TimelineView};
use crate::session::{SessionHandle, SessionId, SessionStatus, Sessions};

/// Shared application state.
pub struct AppState {
    sessions: Sessions,
}

type SharedState = Arc<AppState>;

/// Visualization server.
pub struct VisServer {
    state: SharedState,
}

impl VisServer {
    pub fn new(config: VisConfig) -> Self {
        Self {
            state: Arc::new(AppState {
                sessions: Sessions::new(config),
            }),
        }
    }

    pub fn sessions(&self) -> &Sessions {
        &self.state.sessions
    }

    /// Build the router for the server.
    pub fn router(&self) -> Router {
        Router::new()
            .route("/health", get(health))
            // Visualizer lifecycle
            .route("/api/visualizers", get(list_visualizers).post(create_visualizer))
            .route("/api/visualizers/{id}", get(get_status).delete(delete_visualizer))
            .route("/api/visualizers/{id}/snapshot", get(get_snapshot))
            // Editing
            .route("/api/visualizers/{id}/mutate", post(mutate))
            .route("/api/visualizers/{id}/click", post(click))
            .route("/api/visualizers/{id}/mode", post(set_mode))
            .route("/api/visualizers/{id}/reset", post(reset))
            // Runs
            .route("/api/visualizers/{id}/run", post(run))
            .route("/api/visualizers/{id}/pause", post(pause))
            .route("/api/visualizers/{id}/resume", post(resume))
            .route("/api/visualizers/{id}/cancel", post(cancel))
            .route("/api/visualizers/{id}/delay", post(set_delay))
            // Timeline of the last run
            .route("/api/visualizers/{id}/timeline", get(get_timeline))
            .route("/api/visualizers/{id}/timeline/seek", post(seek))
            .route("/api/visualizers/{id}/timeline/step", post(step))
            // Live events
            .route("/ws/{id}", get(ws_handler))
            .layer(CorsLayer::permissive())
            .layer(TraceLayer::new_for_http())
            .with_state(Arc::clone(&self.state))
    }

    /// Listen on the configured address until the process exits.
    pub async fn serve(self) -> Result<()> {
        let addr = self.state.sessions.config().addr;
        let listener = tokio::net::TcpListener::bind(addr).await?;
        info!(%addr, "Visualization server listening");
        axum::serve(listener, self.router()).await?;
        Ok(())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::NotRunning => StatusCode::CONFLICT,
            Error::Engine(err) => match err {
                algoviz_engine::Error::InvalidMutation(_) | algoviz_engine::Error::MissingPrecondition { .. } => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                algoviz_engine::Error::Busy | algoviz_engine::Error::Aborted => StatusCode::CONFLICT,
            },
            Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        debug!(status = status.as_u16(), error = %self, "Request refused");
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn session(state: &AppState, id: SessionId) -> Result<SessionHandle> {
    state.sessions.get(id).await
}

async fn status_of(handle: &SessionHandle) -> Json<SessionStatus> {
    Json(handle.lock().await.status().await)
}

/// Either full creation parameters or just a kind, which gets the
/// configured defaults.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CreateRequest {
    Spec(StructureSpec),
    Kind { kind: StructureKind },
}

async fn create_visualizer(
    State(state): State<SharedState>,
    Json(req): Json<CreateRequest>,
) -> Result<(StatusCode, Json<SessionStatus>)> {
    let (_, handle) = match req {
        CreateRequest::Spec(spec) => state.sessions.create(spec).await?,
        CreateRequest::Kind { kind } => state.sessions.create_kind(kind).await?,
    };
    Ok((StatusCode::CREATED, status_of(&handle).await))
}

async fn list_visualizers(State(state): State<SharedState>) -> Json<Vec<SessionStatus>> {
    Json(state.sessions.list().await)
}

async fn get_status(State(state): State<SharedState>, Path(id): Path<SessionId>) -> Result<Json<SessionStatus>> {
    let handle = session(&state, id).await?;
    Ok(status_of(&handle).await)
}

async fn delete_visualizer(State(state): State<SharedState>, Path(id): Path<SessionId>) -> Result<StatusCode> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_snapshot(State(state): State<SharedState>, Path(id): Path<SessionId>) -> Result<Json<Structure>> {
    let handle = session(&state, id).await?;
    let structure = handle.lock().await.snapshot();
    Ok(Json(structure))
}

async fn mutate(
    State(state): State<SharedState>,
    Path(id): Path<SessionId>,
    Json(mutation): Json<Mutation>,
) -> Result<Json<Applied>> {
    let handle = session(&state, id).await?;
    let applied = handle.lock().await.mutate(&mutation)?;
    Ok(Json(applied))
}

async fn click(
    State(state): State<SharedState>,
    Path(id): Path<SessionId>,
    Json(point): Json<Point>,
) -> Result<Json<Applied>> {
    let handle = session(&state, id).await?;
    let applied = handle.lock().await.click(point)?;
    Ok(Json(applied))
}

#[derive(Debug, Deserialize)]
struct ModeRequest {
    mode: EditMode,
}

async fn set_mode(
    State(state): State<SharedState>,
    Path(id): Path<SessionId>,
    Json(req): Json<ModeRequest>,
) -> Result<Json<SessionStatus>> {
    let handle = session(&state, id).await?;
    handle.lock().await.set_edit_mode(req.mode);
    Ok(status_of(&handle).await)
}

async fn reset(State(state): State<SharedState>, Path(id): Path<SessionId>) -> Result<Json<SessionStatus>> {
    let handle = session(&state, id).await?;
    handle.lock().await.reset().await?;
    Ok(status_of(&handle).await)
}

async fn run(
    State(state): State<SharedState>,
    Path(id): Path<SessionId>,
    Json(algorithm): Json<Algorithm>,
) -> Result<(StatusCode, Json<SessionStatus>)> {
    let handle = session(&state, id).await?;
    handle.lock().await.run(algorithm).await?;
    Ok((StatusCode::ACCEPTED, status_of(&handle).await))
}

async fn pause(State(state): State<SharedState>, Path(id): Path<SessionId>) -> Result<Json<SessionStatus>> {
    let handle = session(&state, id).await?;
    handle.lock().await.pause()?;
    Ok(status_of(&handle).await)
}

async fn resume(State(state): State<SharedState>, Path(id): Path<SessionId>) -> Result<Json<SessionStatus>> {
    let handle = session(&state, id).await?;
    handle.lock().await.resume()?;
    Ok(status_of(&handle).await)
}

async fn cancel(State(state): State<SharedState>, Path(id): Path<SessionId>) -> Result<Json<SessionStatus>> {
    let handle = session(&state, id).await?;
    handle.lock().await.cancel()?;
    Ok(status_of(&handle).await)
}

/// Either an explicit delay or a speed slider position; the delay wins.
#[derive(Debug, Deserialize)]
struct DelayRequest {
    delay_ms: Option<u64>,
    speed: Option<u8>,
}

async fn set_delay(
    State(state): State<SharedState>,
    Path(id): Path<SessionId>,
    Json(req): Json<DelayRequest>,
) -> Result<Json<SessionStatus>> {
    let handle = session(&state, id).await?;
    {
        let mut session = handle.lock().await;
        match (req.delay_ms, req.speed) {
            (Some(ms), _) => session.set_delay(Duration::from_millis(ms)),
            (None, Some(speed)) => session.set_speed(speed),
            (None, None) => {}
        }
    }
    Ok(status_of(&handle).await)
}

async fn get_timeline(State(state): State<SharedState>, Path(id): Path<SessionId>) -> Result<Json<TimelineView>> {
    let handle = session(&state, id).await?;
    let session = handle.lock().await;
    let view = session.timeline().await.view();
    Ok(Json(view))
}

#[derive(Debug, Deserialize)]
struct SeekRequest {
    frame: usize,
}

async fn seek(
    State(state): State<SharedState>,
    Path(id): Path<SessionId>,
    Json(req): Json<SeekRequest>,
) -> Result<Json<TimelineView>> {
    let handle = session(&state, id).await?;
    let session = handle.lock().await;
    let mut timeline = session.timeline().await;
    timeline.seek(req.frame);
    Ok(Json(timeline.view()))
}

#[derive(Debug, Deserialize)]
struct StepRequest {
    direction: StepDirection,
}

async fn step(
    State(state): State<SharedState>,
    Path(id): Path<SessionId>,
    Json(req): Json<StepRequest>,
) -> Result<Json<TimelineView>> {
    let handle = session(&state, id).await?;
    let session = handle.lock().await;
    let mut timeline = session.timeline().await;
    timeline.step(req.direction);
    Ok(Json(timeline.view()))
}

async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<SharedState>,
    Path(id): Path<SessionId>,
) -> Result<Response> {
    let handle = session(&state, id).await?;
    Ok(ws.on_upgrade(move |socket| handle_socket(socket, id, handle)))
}

async fn handle_socket(mut socket: WebSocket, id: SessionId, handle: SessionHandle) {
    info!(id, "WebSocket client connected");

    let (mut events, initial) = {
        let mut session = handle.lock().await;
        let structure = session.snapshot();
        (session.subscribe(), ServerEvent::Snapshot { id, structure })
    };
    if let Err(e) = send_event(&mut socket, &initial).await {
        warn!(id, error = %e, "Failed to send initial snapshot");
        return;
    }

    loop {
        tokio::select! {
            msg = socket.recv() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let reply = match serde_json::from_str::<WsCommand>(text.as_str()) {
                            Ok(cmd) => handle_command(&handle, id, cmd).await,
                            Err(e) => ServerEvent::Error { message: format!("invalid command: {e}") },
                        };
                        if let Err(e) = send_event(&mut socket, &reply).await {
                            warn!(id, error = %e, "Failed to send reply");
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!(id, "WebSocket client disconnected");
                        break;
                    }
                    Some(Ok(Message::Ping(data))) => {
                        if let Err(e) = socket.send(Message::Pong(data)).await {
                            warn!(id, error = %e, "Failed to send pong");
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(id, error = %e, "WebSocket error");
                        break;
                    }
                    _ => {}
                }
            }
            event = events.recv() => {
                match event {
                    Ok(event) => {
                        if let Err(e) = send_event(&mut socket, &event).await {
                            warn!(id, error = %e, "Failed to forward event");
                            break;
                        }
                    }
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(id, skipped, "WebSocket client lagging, events dropped");
                    }
                    Err(RecvError::Closed) => break,
                }
            }
        }
    }
}

/// Commands a WebSocket client can send.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum WsCommand {
    GetSnapshot,
    GetStatus,
    GetTimeline,
    Mutate { mutation: Mutation },
    Run { algorithm: Algorithm },
    Pause,
    Resume,
    Cancel,
    SetSpeed { speed: u8 },
    Seek { frame: usize },
    Step { direction: StepDirection },
}

async fn handle_command(handle: &SessionHandle, id: SessionId, cmd: WsCommand) -> ServerEvent {
    match apply_command(handle, id, cmd).await {
        Ok(reply) => reply,
        Err(e) => ServerEvent::Error { message: e.to_string() },
    }
}

async fn apply_command(handle: &SessionHandle, id: SessionId, cmd: WsCommand) -> Result<ServerEvent> {
    let mut session = handle.lock().await;
    match cmd {
        WsCommand::GetSnapshot => {
            let structure = session.snapshot();
            return Ok(ServerEvent::Snapshot { id, structure });
        }
        WsCommand::GetStatus => {}
        WsCommand::GetTimeline => return Ok(ServerEvent::Timeline(session.timeline().await.view())),
        WsCommand::Mutate { mutation } => {
            session.mutate(&mutation)?;
        }
        WsCommand::Run { algorithm } => session.run(algorithm).await?,
        WsCommand::Pause => session.pause()?,
        WsCommand::Resume => session.resume()?,
        WsCommand::Cancel => session.cancel()?,
        WsCommand::SetSpeed { speed } => session.set_speed(speed),
        WsCommand::Seek { frame } => {
            let mut timeline = session.timeline().await;
            timeline.seek(frame);
            return Ok(ServerEvent::Timeline(timeline.view()));
        }
        WsCommand::Step { direction } => {
            let mut timeline = session.timeline().await;
            timeline.step(direction);
            return Ok(ServerEvent::Timeline(timeline.view()));
        }
    }
    Ok(ServerEvent::Status {
        status: session.status().await,
    })
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> std::result::Result<(), axum::Error> {
    let json = serde_json::to_string(event).map_err(axum::Error::new)?;
    socket.send(Message::Text(json.into())).await
}
