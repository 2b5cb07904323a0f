//! Fixed-step physics integration (semi-implicit Euler).
//!
//! Velocity is updated from the current acceleration first, then position
//! from the new velocity. This keeps the undamped pendulum and spring from
//! gaining energy over long runs.

use algoviz_model::Body;
use serde::{Deserialize, Serialize};

use super::Outcome;
use crate::emitter::{StepEmitter, StepKind};
use crate::error::Result;

/// Default time step for projectiles.
pub const PROJECTILE_DT: f64 = 0.1;

/// Default time step for pendulums.
pub const PENDULUM_DT: f64 = 0.02;

/// Default time step for springs.
pub const SPRING_DT: f64 = 0.5;

/// Why a simulation stopped on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Projectile came back down to the ground
    Landed,
    /// Projectile crossed the right edge of the canvas
    OutOfBounds,
    /// The requested number of ticks elapsed
    TickBudget,
}

/// Time step used when a run does not specify one.
pub fn default_dt(body: &Body) -> f64 {
    match body {
        Body::Projectile { .. } => PROJECTILE_DT,
        Body::Pendulum { .. } => PENDULUM_DT,
        Body::Spring { .. } => SPRING_DT,
    }
}

/// Advance `body` by one step of `dt`.
///
/// Returns a stop reason when a projectile lands or leaves the canvas;
/// pendulums and springs never stop on their own.
pub fn integrate(body: &mut Body, dt: f64) -> Option<StopReason> {
    match body {
        Body::Projectile { state, params } => {
            state.vy -= params.gravity * dt;
            state.x += state.vx * dt;
            state.y += state.vy * dt;
            state.t += dt;
            state.max_height = state.max_height.max(state.y);
            state.distance = state.x;

            if state.y <= 0.0 && state.t > 0.0 {
                state.y = 0.0;
                Some(StopReason::Landed)
            } else if state.x > params.bound_x {
                Some(StopReason::OutOfBounds)
            } else {
                None
            }
        }
        Body::Pendulum { state, params } => {
            let acceleration = -(params.gravity / params.length) * state.angle.sin();
            state.angular_velocity += acceleration * dt;
            state.angular_velocity *= params.damping;
            state.angle += state.angular_velocity * dt;
            None
        }
        Body::Spring { state, params } => {
            let acceleration = (-params.stiffness * state.position - params.damping * state.velocity) / params.mass;
            state.velocity += acceleration * dt;
            state.position += state.velocity * dt;
            None
        }
    }
}

/// Integrate frame by frame, emitting a `tick` step per frame.
///
/// Runs until the body stops on its own, `max_ticks` frames have elapsed, or
/// the run is cancelled.
pub async fn simulate(body: &mut Body, dt: f64, max_ticks: Option<u64>, emitter: &mut StepEmitter) -> Result<Outcome> {
    let mut ticks = 0;
    loop {
        if max_ticks.is_some_and(|max| ticks >= max) {
            return Ok(Outcome::Simulated {
                ticks,
                stop: StopReason::TickBudget,
            });
        }
        let stop = integrate(body, dt);
        ticks += 1;
        emitter.emit(StepKind::Tick, [], &*body).await?;
        if let Some(stop) = stop {
            return Ok(Outcome::Simulated { ticks, stop });
        }
    }
}
