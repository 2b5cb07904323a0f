//! Engine configuration.

use std::str::FromStr;
use std::time::Duration;

use algoviz_model::{
    Body, Polarity, StructureKind, StructureSpec, DEFAULT_BOARD_SIZE, DEFAULT_CANVAS_WIDTH, DEFAULT_COLS,
    DEFAULT_ROWS, DEFAULT_SEQUENCE_LEN, DEFAULT_VALUE_RANGE,
};
use tracing::warn;

use crate::emitter::delay_for_speed;

/// Default speed slider position.
pub const DEFAULT_SPEED: u8 = 50;

/// Defaults applied when creating visualizers.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Speed slider position, 1..=100
    pub speed: u8,

    /// Length of freshly generated sequences
    pub sequence_len: usize,

    /// Inclusive lower bound of generated values
    pub value_min: i64,

    /// Exclusive upper bound of generated values
    pub value_max: i64,

    pub grid_rows: usize,
    pub grid_cols: usize,

    /// N-Queens board size
    pub board_size: usize,

    /// Canvas width used for tree layout
    pub canvas_width: f64,

    /// Fixed RNG seed for reproducible sequences
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            speed: DEFAULT_SPEED,
            sequence_len: DEFAULT_SEQUENCE_LEN,
            value_min: DEFAULT_VALUE_RANGE.start,
            value_max: DEFAULT_VALUE_RANGE.end,
            grid_rows: DEFAULT_ROWS,
            grid_cols: DEFAULT_COLS,
            board_size: DEFAULT_BOARD_SIZE,
            canvas_width: DEFAULT_CANVAS_WIDTH,
            seed: None,
        }
    }
}

impl EngineConfig {
    /// Create config from `ALGOVIZ_*` environment variables, falling back to
    /// defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            speed: env_or("ALGOVIZ_SPEED", defaults.speed),
            sequence_len: env_or("ALGOVIZ_SEQUENCE_LEN", defaults.sequence_len),
            value_min: env_or("ALGOVIZ_VALUE_MIN", defaults.value_min),
            value_max: env_or("ALGOVIZ_VALUE_MAX", defaults.value_max),
            grid_rows: env_or("ALGOVIZ_GRID_ROWS", defaults.grid_rows),
            grid_cols: env_or("ALGOVIZ_GRID_COLS", defaults.grid_cols),
            board_size: env_or("ALGOVIZ_BOARD_SIZE", defaults.board_size),
            canvas_width: env_or("ALGOVIZ_CANVAS_WIDTH", defaults.canvas_width),
            seed: std::env::var("ALGOVIZ_SEED").ok().and_then(|raw| parse_or_warn("ALGOVIZ_SEED", &raw)),
        }
    }

    #[must_use]
    pub fn with_speed(mut self, speed: u8) -> Self {
        self.speed = speed;
        self
    }

    #[must_use]
    pub fn with_sequence(mut self, len: usize, min: i64, max: i64) -> Self {
        self.sequence_len = len;
        self.value_min = min;
        self.value_max = max;
        self
    }

    #[must_use]
    pub fn with_grid(mut self, rows: usize, cols: usize) -> Self {
        self.grid_rows = rows;
        self.grid_cols = cols;
        self
    }

    #[must_use]
    pub fn with_board_size(mut self, size: usize) -> Self {
        self.board_size = size;
        self
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Step delay for the configured speed.
    pub fn delay(&self) -> Duration {
        delay_for_speed(self.speed)
    }

    /// Creation parameters for a new structure of `kind`.
    pub fn spec_for(&self, kind: StructureKind) -> StructureSpec {
        match kind {
            StructureKind::Sequence => StructureSpec::Sequence {
                len: self.sequence_len,
                min: self.value_min,
                max: self.value_max,
            },
            StructureKind::Tree => StructureSpec::Tree {
                width: self.canvas_width,
            },
            StructureKind::Graph => StructureSpec::Graph,
            StructureKind::Grid => StructureSpec::Grid {
                rows: self.grid_rows,
                cols: self.grid_cols,
            },
            StructureKind::Heap => StructureSpec::Heap {
                polarity: Polarity::default(),
            },
            StructureKind::Board => StructureSpec::Board { size: self.board_size },
            StructureKind::Body => StructureSpec::Body {
                params: Body::default().params(),
            },
        }
    }
}

fn env_or<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(raw) => parse_or_warn(key, &raw).unwrap_or(default),
        Err(_) => default,
    }
}

fn parse_or_warn<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = raw, "Ignoring unparsable config value");
            None
        }
    }
}
