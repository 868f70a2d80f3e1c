//! Particle data model and free flight

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A rigid disk. The radius is shared by every particle of a simulation and
/// lives on the simulation, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub pos: DVec2,
    pub vel: DVec2,
    /// Display color (0xRRGGBB); physics ignores it
    #[serde(default)]
    pub color: Option<u32>,
}

impl Particle {
    pub fn new(pos: DVec2, vel: DVec2) -> Self {
        Self {
            pos,
            vel,
            color: None,
        }
    }

    pub fn with_color(mut self, color: u32) -> Self {
        self.color = Some(color);
        self
    }

    /// Free flight: `pos += vel * dt`. Callers guarantee `dt >= 0`.
    #[inline]
    pub fn advance(&mut self, dt: f64) {
        debug_assert!(dt >= 0.0, "advance called with negative dt {dt}");
        self.pos += self.vel * dt;
    }

    #[inline]
    pub fn speed(&self) -> f64 {
        self.vel.length()
    }

    /// Kinetic energy for unit mass
    #[inline]
    pub fn kinetic_energy(&self) -> f64 {
        0.5 * self.vel.length_squared()
    }
}
