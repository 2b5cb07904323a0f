//! Server configuration.

use std::net::SocketAddr;

use algoviz_engine::EngineConfig;
use tracing::warn;

/// Default listen port.
pub const DEFAULT_PORT: u16 = 3000;

/// Steps kept per recorded run before the timeline is truncated.
pub const DEFAULT_MAX_RECORDED_STEPS: usize = 100_000;

/// Events buffered per session for slow WebSocket clients.
pub const DEFAULT_EVENT_BUFFER: usize = 1024;

/// Live sessions kept before the oldest is evicted.
pub const DEFAULT_MAX_SESSIONS: usize = 256;

/// Configuration for the visualization server.
#[derive(Debug, Clone, PartialEq)]
pub struct VisConfig {
    /// Address to listen on
    pub addr: SocketAddr,

    /// Defaults for every visualizer the server creates
    pub engine: EngineConfig,

    pub max_recorded_steps: usize,

    pub event_buffer: usize,

    /// Creating a session beyond this evicts the oldest one
    pub max_sessions: usize,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)),
            engine: EngineConfig::default(),
            max_recorded_steps: DEFAULT_MAX_RECORDED_STEPS,
            event_buffer: DEFAULT_EVENT_BUFFER,
            max_sessions: DEFAULT_MAX_SESSIONS,
        }
    }
}

impl VisConfig {
    /// Create config from environment variables.
    ///
    /// `ALGOVIZ_ADDR`, `ALGOVIZ_MAX_RECORDED_STEPS`, `ALGOVIZ_EVENT_BUFFER` and
    /// `ALGOVIZ_MAX_SESSIONS` configure the server; engine defaults come from
    /// [`EngineConfig::from_env`].
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            addr: env_or("ALGOVIZ_ADDR", defaults.addr),
            engine: EngineConfig::from_env(),
            max_recorded_steps: env_or("ALGOVIZ_MAX_RECORDED_STEPS", defaults.max_recorded_steps),
            event_buffer: env_or("ALGOVIZ_EVENT_BUFFER", defaults.event_buffer).max(1),
            max_sessions: env_or("ALGOVIZ_MAX_SESSIONS", defaults.max_sessions).max(1),
        }
    }

    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.addr.set_port(port);
        self
    }

    #[must_use]
    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }

    #[must_use]
    pub fn with_max_recorded_steps(mut self, max: usize) -> Self {
        self.max_recorded_steps = max;
        self
    }

    #[must_use]
    pub fn with_max_sessions(mut self, max: usize) -> Self {
        self.max_sessions = max.max(1);
        self
    }
}

fn env_or<T: std::str::FromStr>(key: &str, default: T) -> T {
    let Ok(raw) = std::env::var(key) else {
        return default;
    };
    match raw.trim().parse() {
        Ok(value) => value,
        Err(_) => {
            warn!(key, value = %raw, "Ignoring unparsable config value");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_listens_on_all_interfaces() {
        let config = VisConfig::default();
        assert_eq!(config.addr.port(), 3000);
        assert!(config.addr.ip().is_unspecified());
    }

    #[test]
    fn with_port_keeps_host() {
        let config = VisConfig::default().with_port(8080).with_max_recorded_steps(10);
        assert_eq!(config.addr, SocketAddr::from(([0, 0, 0, 0], 8080)));
        assert_eq!(config.max_recorded_steps, 10);
    }

    #[test]
    fn session_cap_is_at_least_one() {
        assert_eq!(VisConfig::default().max_sessions, DEFAULT_MAX_SESSIONS);
        assert_eq!(VisConfig::default().with_max_sessions(0).max_sessions, 1);
    }
}
