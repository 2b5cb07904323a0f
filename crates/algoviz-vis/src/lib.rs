//! Algoviz Visualization Server
//!
//! HTTP and WebSocket surface over [`algoviz_engine`] visualizers, with a
//! scrubbable timeline of each finished run.
//!
//! # Architecture
//!
//! - **Sessions**: one engine `Visualizer` per id, created over REST
//! - **Events**: steps, edits and run results broadcast to WebSocket clients
//! - **Playback**: the last run's steps, recorded for seeking and stepping
//! - **REST API**: create, edit, run, pause, resume, cancel and reset
//!
//! # Usage
//!
//! ```ignore
//! let server = VisServer::new(VisConfig::from_env().with_port(3000));
//! server.serve().await?;
//! ```

mod config;
mod error;
mod events;
mod playback;
mod server;
mod session;

pub use config::VisConfig;
pub use error::{Error, Result};
pub use events::{ServerEvent, TimelineFrame};
pub use playback::{Playback, PlaybackState, PlaybackStatus, StepDirection, TimelineView};
pub use server::VisServer;
pub use session::{Session, SessionHandle, SessionId, SessionStatus, Sessions};

#[cfg(test)]
mod tests {
    use super::*;
    use algoviz_engine::{Algorithm, EngineConfig};
    use algoviz_model::{Coord, Mutation, StructureKind};
    use std::time::Duration;

    #[tokio::test]
    async fn session_records_grid_search() {
        let engine = EngineConfig::default().with_grid(5, 5);
        let sessions = Sessions::new(VisConfig::default().with_engine(engine));
        let (_, handle) = sessions.create_kind(StructureKind::Grid).await.unwrap();

        let mut events = {
            let mut session = handle.lock().await;
            session.set_delay(Duration::ZERO);
            session.mutate(&Mutation::SetStartCell { at: Coord::new(0, 0) }).unwrap();
            session.mutate(&Mutation::SetEndCell { at: Coord::new(4, 4) }).unwrap();
            let events = session.subscribe();
            session.run(Algorithm::Dijkstra).await.unwrap();
            events
        };

        let mut steps = 0;
        loop {
            match events.recv().await.unwrap() {
                ServerEvent::Step { .. } => steps += 1,
                ServerEvent::Finished { report, .. } => {
                    assert_eq!(report.stats.steps, steps);
                    break;
                }
                _ => {}
            }
        }

        let session = handle.lock().await;
        let mut timeline = session.timeline().await;
        assert_eq!(timeline.total_frames() as u64, steps);

        // Can't seek past end
        timeline.seek(usize::MAX);
        assert_eq!(timeline.state(), PlaybackState::Finished);

        // Can't seek before start
        timeline.seek(0);
        assert_eq!(timeline.current_frame(), 0);
        assert_eq!(timeline.frame().kind, None);
    }

    #[tokio::test]
    async fn refused_run_leaves_timeline_empty() {
        let sessions = Sessions::new(VisConfig::default());
        let (_, handle) = sessions.create_kind(StructureKind::Graph).await.unwrap();

        let mut session = handle.lock().await;
        let refused = session.run(Algorithm::Bfs).await;
        assert!(matches!(refused, Err(Error::Engine(algoviz_engine::Error::MissingPrecondition { .. }))));
        assert_eq!(session.status().await.timeline.state, PlaybackState::Empty);
    }
}
