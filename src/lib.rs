//! Disk Gas - an event-aware 2D hard-disk simulation
//!
//! Core modules:
//! - `sim`: Deterministic simulation (free flight, wall and pair collisions)
//! - `control`: Pause/resume/reset signals and the frame driver
//! - `config`: Simulation parameters and variant presets
//! - `renderer`: Drawing surface abstraction for an external renderer

pub mod config;
pub mod control;
pub mod renderer;
pub mod sim;

pub use config::{BoundaryShape, CollisionMode, ConfigError, InitialMotion, SimConfig, Variant};
pub use control::{ControlEvent, ControlQueue, ControlSender, FrameDriver, channel};
pub use sim::{Boundary, Particle, Simulation, StepStats};

use glam::DVec2;

/// Simulation constants
pub mod consts {
    /// Upper bound on simulated time per frame
    pub const MAX_FRAME_DT: f64 = 100.0;
    /// Upper bound on pair collisions resolved inside one step
    pub const MAX_COLLISIONS_PER_STEP: usize = 10_000;
    /// Rejection sampling attempts per particle on reset
    pub const PLACEMENT_ATTEMPTS: usize = 1_000;

    /// Horizontal offset applied after a circular wall bounce
    pub const ARC_NUDGE: f64 = 1.0;

    /// Default particle radius
    pub const PARTICLE_RADIUS: f64 = 5.0;

    /// Color of the tracer particle in the cold gas
    pub const TRACER_COLOR: u32 = 0xd0_30_30;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Root of `a·t² + b·t + c = 0` taken with the given sign on the square root.
///
/// Returns `None` for a degenerate quadratic (zero leading coefficient,
/// negative discriminant, or a non-finite result).
#[inline]
pub fn quadratic_root(a: f64, b: f64, c: f64, sign: f64) -> Option<f64> {
    if a == 0.0 {
        return None;
    }
    let disc = b * b - 4.0 * a * c;
    if disc < 0.0 || disc.is_nan() {
        return None;
    }
    let t = (-b + sign * disc.sqrt()) / (2.0 * a);
    if t.is_finite() { Some(t) } else { None }
}
