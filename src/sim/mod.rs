//! Deterministic simulation module
//!
//! All physics lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Collisions resolved in time order, ties in index order
//! - No rendering or platform dependencies

pub mod boundary;
pub mod collision;
pub mod particle;
pub mod state;
pub mod tick;

pub use boundary::{Axis, Boundary, OutlineSegment, circular_collision_point, reflect_circular, reflect_flat};
pub use collision::{PairCollision, collide, next_collision, resolve_collision, time_to_collision};
pub use particle::Particle;
pub use state::{Simulation, Snapshot, Violation, boundary_for};
pub use tick::{StepStats, step};
