//! Event-driven step
//!
//! Within one step the interacting gas jumps from pair collision to pair
//! collision in time order, then spends the leftover budget in free flight
//! and settles wall bounces once at the end.

use serde::{Deserialize, Serialize};

use super::collision::{next_collision, resolve_collision};
use super::particle::Particle;
use super::state::Simulation;
use crate::config::CollisionMode;

/// What one step did
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StepStats {
    /// Time simulated
    pub elapsed: f64,
    pub pair_collisions: usize,
    pub wall_bounces: usize,
    /// The per-step collision cap was reached
    pub capped: bool,
}

/// Advance the simulation by `dt` time units
pub fn step(sim: &mut Simulation, dt: f64) -> StepStats {
    let mut remaining = if dt.is_finite() && dt >= 0.0 {
        dt
    } else {
        log::warn!("Ignoring invalid step dt {dt}");
        0.0
    };

    let mut stats = StepStats {
        elapsed: remaining,
        ..Default::default()
    };
    let r = sim.config.radius;

    if sim.config.collisions == CollisionMode::PairwiseElastic {
        let cap = sim.config.max_collisions_per_step;
        while let Some(next) = next_collision(&sim.particles, r) {
            if next.t > remaining {
                break;
            }
            if stats.pair_collisions >= cap {
                log::warn!(
                    "Collision cap {cap} hit with {remaining} time left; finishing step in free flight"
                );
                stats.capped = true;
                break;
            }

            advance_all(&mut sim.particles, next.t);
            resolve_collision(&mut sim.particles, next.i, next.j);
            log::trace!("t+{:.4}: particles {} and {} collide", next.t, next.i, next.j);

            remaining -= next.t;
            stats.pair_collisions += 1;
        }
    }

    let boundary = sim.boundary;
    let mut bounced = Vec::new();
    for (index, p) in sim.particles.iter_mut().enumerate() {
        p.advance(remaining);
        if boundary.bounce(p, r) {
            bounced.push(index);
        }
    }
    stats.wall_bounces = bounced.len();
    sim.track_wall_overlaps(&bounced);

    sim.time += stats.elapsed;
    sim.pair_collisions += stats.pair_collisions as u64;
    stats
}

fn advance_all(particles: &mut [Particle], dt: f64) {
    for p in particles.iter_mut() {
        p.advance(dt);
    }
}
