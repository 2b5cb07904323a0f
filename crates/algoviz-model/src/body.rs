//! Physics bodies for the science simulations.
//!
//! A body pairs the evolving state with the parameters the user set on the
//! sliders. Integration itself lives in the algorithm library.

use crate::error::{MutationError, Result};

/// Launch parameters for a projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileParams {
    /// Launch speed
    pub velocity: f64,
    /// Launch angle above the horizon, degrees
    pub angle_deg: f64,
    pub gravity: f64,
    /// Horizontal distance after which the projectile has left the canvas
    pub bound_x: f64,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            velocity: 50.0,
            angle_deg: 45.0,
            gravity: 9.8,
            bound_x: 750.0,
        }
    }
}

/// Projectile state plus the statistics shown next to the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileState {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Elapsed simulated time
    pub t: f64,
    pub max_height: f64,
    pub distance: f64,
}

impl ProjectileState {
    /// State at launch from the origin.
    pub fn launch(params: &ProjectileParams) -> Self {
        let radians = params.angle_deg.to_radians();
        Self {
            vx: params.velocity * radians.cos(),
            vy: params.velocity * radians.sin(),
            ..Self::default()
        }
    }
}

/// Pendulum parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendulumParams {
    pub length: f64,
    pub gravity: f64,
    pub initial_angle_deg: f64,
    /// Multiplicative angular velocity retention per tick (1.0 = undamped)
    pub damping: f64,
    pub mass: f64,
}

impl Default for PendulumParams {
    fn default() -> Self {
        Self {
            length: 4.0,
            gravity: 9.8,
            initial_angle_deg: 30.0,
            damping: 0.999,
            mass: 1.0,
        }
    }
}

/// Pendulum angle (radians from vertical) and angular velocity.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PendulumState {
    pub angle: f64,
    pub angular_velocity: f64,
}

impl PendulumState {
    /// Released from rest at the initial angle.
    pub fn release(params: &PendulumParams) -> Self {
        Self {
            angle: params.initial_angle_deg.to_radians(),
            angular_velocity: 0.0,
        }
    }

    pub fn kinetic_energy(&self, params: &PendulumParams) -> f64 {
        let speed = self.angular_velocity * params.length;
        0.5 * params.mass * speed * speed
    }

    pub fn potential_energy(&self, params: &PendulumParams) -> f64 {
        params.mass * params.gravity * params.length * (1.0 - self.angle.cos())
    }
}

/// Damped spring parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringParams {
    pub stiffness: f64,
    pub damping: f64,
    pub mass: f64,
    pub initial_displacement: f64,
}

impl Default for SpringParams {
    fn default() -> Self {
        Self {
            stiffness: 0.1,
            damping: 0.01,
            mass: 1.0,
            initial_displacement: 100.0,
        }
    }
}

/// Displacement from equilibrium and velocity of the spring mass.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpringState {
    pub position: f64,
    pub velocity: f64,
}

impl SpringState {
    /// Pulled to the initial displacement and released.
    pub fn release(params: &SpringParams) -> Self {
        Self {
            position: params.initial_displacement,
            velocity: 0.0,
        }
    }

    /// Kinetic plus elastic potential energy.
    pub fn energy(&self, params: &SpringParams) -> f64 {
        0.5 * params.mass * self.velocity * self.velocity
            + 0.5 * params.stiffness * self.position * self.position
    }
}

/// A simulated body with its parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum Body {
    Projectile {
        state: ProjectileState,
        params: ProjectileParams,
    },
    Pendulum {
        state: PendulumState,
        params: PendulumParams,
    },
    Spring {
        state: SpringState,
        params: SpringParams,
    },
}

/// Parameter set selecting which body to simulate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum BodyParams {
    Projectile(ProjectileParams),
    Pendulum(PendulumParams),
    Spring(SpringParams),
}

impl BodyParams {
    fn validate(&self) -> Result<()> {
        let ok = match self {
            BodyParams::Projectile(p) => p.gravity > 0.0 && p.velocity >= 0.0 && p.bound_x > 0.0,
            BodyParams::Pendulum(p) => p.length > 0.0 && p.mass > 0.0 && (0.0..=1.0).contains(&p.damping),
            BodyParams::Spring(p) => p.mass > 0.0 && p.stiffness >= 0.0 && p.damping >= 0.0,
        };
        if ok {
            Ok(())
        } else {
            Err(MutationError::InvalidParameter("physics parameters out of range"))
        }
    }
}

impl Body {
    /// Body in its initial state for the given parameters.
    pub fn new(params: BodyParams) -> Result<Self> {
        params.validate()?;
        Ok(match params {
            BodyParams::Projectile(params) => Body::Projectile {
                state: ProjectileState::launch(&params),
                params,
            },
            BodyParams::Pendulum(params) => Body::Pendulum {
                state: PendulumState::release(&params),
                params,
            },
            BodyParams::Spring(params) => Body::Spring {
                state: SpringState::release(&params),
                params,
            },
        })
    }

    /// Current parameters.
    pub fn params(&self) -> BodyParams {
        match *self {
            Body::Projectile { params, .. } => BodyParams::Projectile(params),
            Body::Pendulum { params, .. } => BodyParams::Pendulum(params),
            Body::Spring { params, .. } => BodyParams::Spring(params),
        }
    }

    /// Return to the initial state, keeping parameters.
    pub fn reset(&mut self) {
        match self {
            Body::Projectile { state, params } => *state = ProjectileState::launch(params),
            Body::Pendulum { state, params } => *state = PendulumState::release(params),
            Body::Spring { state, params } => *state = SpringState::release(params),
        }
    }
}

impl Default for Body {
    fn default() -> Self {
        let params = ProjectileParams::default();
        Body::Projectile {
            state: ProjectileState::launch(&params),
            params,
        }
    }
}
