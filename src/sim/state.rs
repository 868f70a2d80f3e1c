//! Simulation context
//!
//! Owns everything a running gas needs: the particles, the static boundary,
//! the seeded RNG used by `reset`, and the play/pause state with the last
//! frame timestamp. The host drives it one frame at a time.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::boundary::Boundary;
use super::particle::Particle;
use super::tick::{self, StepStats};
use crate::config::{BoundaryShape, CollisionMode, ConfigError, InitialMotion, SimConfig};
use crate::consts::TRACER_COLOR;
use crate::polar_to_cartesian;

/// A broken physical invariant found by [`Simulation::check_invariants`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Violation {
    /// Particle edge is past the boundary
    OutsideBoundary { index: usize, pos: DVec2 },
    /// Two particle centres are closer than `2R`
    Overlap { i: usize, j: usize, distance: f64 },
    /// An overlap left by the end-of-step wall pass, which can drop a
    /// reflected particle onto a neighbour. Later steps resolve the pair as a
    /// zero-time collision and it separates.
    WallOverlap { i: usize, j: usize, distance: f64 },
}

impl Violation {
    /// Whether the engine is still settling this violation on its own
    pub fn is_transient(&self) -> bool {
        matches!(self, Violation::WallOverlap { .. })
    }
}

/// Read-only view of the simulation for renderers and reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub time: f64,
    pub radius: f64,
    pub boundary: Boundary,
    pub particles: Vec<Particle>,
    pub kinetic_energy: f64,
    pub pair_collisions: u64,
}

pub struct Simulation {
    pub(crate) config: SimConfig,
    pub(crate) boundary: Boundary,
    pub(crate) particles: Vec<Particle>,
    rng: Pcg32,
    seed: u64,
    playing: bool,
    last_frame_time: Option<f64>,
    /// Simulated time since the last reset
    pub(crate) time: f64,
    /// Pair collisions resolved since the last reset
    pub(crate) pair_collisions: u64,
    /// Overlapping pairs `(i, j)`, `i < j`, created by a wall bounce and not
    /// yet separated
    wall_overlaps: Vec<(usize, usize)>,
}

impl Simulation {
    /// Validate `config`, build the boundary and place the particles
    pub fn new(config: SimConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let seed = config.seed.unwrap_or_else(rand::random);
        let boundary = boundary_for(&config);

        let mut sim = Self {
            config,
            boundary,
            particles: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            seed,
            playing: true,
            last_frame_time: None,
            time: 0.0,
            pair_collisions: 0,
            wall_overlaps: Vec::new(),
        };
        sim.reset();
        Ok(sim)
    }

    /// Discard all particles and place a fresh randomized set
    pub fn reset(&mut self) {
        let count = self.config.count;
        let speed = self.config.speed;
        let motion = self.config.initial_motion;

        let mut particles = Vec::with_capacity(count);
        for index in 0..count {
            let pos = match motion {
                InitialMotion::Centered => self.boundary.center(),
                _ => self.sample_position(&particles),
            };
            let vel = match motion {
                InitialMotion::SingleMover if index > 0 => DVec2::ZERO,
                _ => self.random_velocity(speed),
            };

            let mut particle = Particle::new(pos, vel);
            if motion == InitialMotion::SingleMover && index == 0 {
                particle = particle.with_color(TRACER_COLOR);
            }
            particles.push(particle);
        }

        self.particles = particles;
        self.time = 0.0;
        self.pair_collisions = 0;
        self.wall_overlaps.clear();
        log::info!(
            "Reset {} particles ({:?}, {:?}, seed {})",
            count,
            self.config.boundary,
            self.config.collisions,
            self.seed
        );
    }

    /// Uniform position inside the boundary. Interacting particles are also
    /// kept `2R` away from those already placed; if no such spot is found the
    /// last candidate is used anyway and the overlap is reported.
    fn sample_position(&mut self, placed: &[Particle]) -> DVec2 {
        let r = self.config.radius;
        let (min, max) = self.boundary.inset_bounds(r);
        let separate = self.config.collisions == CollisionMode::PairwiseElastic;
        let min_dist_sq = 4.0 * r * r;

        let mut candidate = self.boundary.center();
        for _ in 0..self.config.placement_attempts.max(1) {
            candidate = DVec2::new(
                self.rng.random_range(min.x..=max.x),
                self.rng.random_range(min.y..=max.y),
            );
            if !self.boundary.contains(candidate, r, 0.0) {
                continue;
            }
            if !separate
                || placed
                    .iter()
                    .all(|p| p.pos.distance_squared(candidate) >= min_dist_sq)
            {
                return candidate;
            }
        }

        log::warn!(
            "No free spot for particle {} after {} attempts; placing it overlapping at {:?}",
            placed.len(),
            self.config.placement_attempts,
            candidate
        );
        candidate
    }

    fn random_velocity(&mut self, speed: f64) -> DVec2 {
        let angle = self.rng.random_range(0.0..std::f64::consts::TAU);
        polar_to_cartesian(speed, angle)
    }

    /// Advance by `dt` time units, resolving every collision inside the step
    pub fn step(&mut self, dt: f64) -> StepStats {
        tick::step(self, dt)
    }

    /// Advance by the time elapsed since the previous frame, clamped to
    /// `max_frame_dt`. `now` comes from a monotonic clock. Returns `None`
    /// while paused.
    pub fn frame(&mut self, now: f64) -> Option<StepStats> {
        if !self.playing {
            return None;
        }

        let last = self.last_frame_time.replace(now).unwrap_or(now);
        let elapsed = now - last;
        let dt = elapsed.clamp(0.0, self.config.max_frame_dt);
        if elapsed > dt {
            log::debug!("Frame delta {elapsed} clamped to {dt}");
        }
        Some(self.step(dt))
    }

    pub fn pause(&mut self) {
        self.playing = false;
    }

    /// Resume stepping. The time baseline restarts at `now` so the first
    /// frame after a pause does not see the whole pause as elapsed time.
    pub fn resume(&mut self, now: f64) {
        self.playing = true;
        self.last_frame_time = Some(now);
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn boundary(&self) -> &Boundary {
        &self.boundary
    }

    pub fn radius(&self) -> f64 {
        self.config.radius
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn time(&self) -> f64 {
        self.time
    }

    pub fn pair_collisions(&self) -> u64 {
        self.pair_collisions
    }

    /// Total kinetic energy (unit masses)
    pub fn kinetic_energy(&self) -> f64 {
        self.particles.iter().map(Particle::kinetic_energy).sum()
    }

    /// Total momentum (unit masses)
    pub fn momentum(&self) -> DVec2 {
        self.particles.iter().map(|p| p.vel).sum()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            time: self.time,
            radius: self.config.radius,
            boundary: self.boundary,
            particles: self.particles.clone(),
            kinetic_energy: self.kinetic_energy(),
            pair_collisions: self.pair_collisions,
        }
    }

    /// Record the overlaps the wall pass just created. `bounced` lists the
    /// particles reflected in the step just taken; pairs that no longer
    /// overlap are dropped.
    pub(crate) fn track_wall_overlaps(&mut self, bounced: &[usize]) {
        if self.config.collisions != CollisionMode::PairwiseElastic {
            return;
        }
        let particles = &self.particles;
        let min_dist_sq = 4.0 * self.config.radius * self.config.radius;
        let overlapping =
            |i: usize, j: usize| particles[i].pos.distance_squared(particles[j].pos) < min_dist_sq;

        self.wall_overlaps.retain(|&(i, j)| overlapping(i, j));
        for &a in bounced {
            for b in (0..particles.len()).filter(|&b| b != a) {
                let pair = (a.min(b), a.max(b));
                if overlapping(pair.0, pair.1) && !self.wall_overlaps.contains(&pair) {
                    log::debug!("Wall bounce left particles {} and {} overlapping", pair.0, pair.1);
                    self.wall_overlaps.push(pair);
                }
            }
        }
    }

    /// Every particle inside the boundary and, when particles interact, no
    /// pair closer than `2R`, both up to `tolerance`. Overlaps left by a wall
    /// bounce are reported as [`Violation::WallOverlap`].
    pub fn check_invariants(&self, tolerance: f64) -> Vec<Violation> {
        let r = self.config.radius;
        let mut violations: Vec<Violation> = self
            .particles
            .iter()
            .enumerate()
            .filter(|(_, p)| !self.boundary.contains(p.pos, r, tolerance))
            .map(|(index, p)| Violation::OutsideBoundary { index, pos: p.pos })
            .collect();

        if self.config.collisions == CollisionMode::PairwiseElastic {
            for (i, pi) in self.particles.iter().enumerate() {
                for (j, pj) in self.particles.iter().enumerate().skip(i + 1) {
                    let distance = pi.pos.distance(pj.pos);
                    if distance >= 2.0 * r - tolerance {
                        continue;
                    }
                    if self.wall_overlaps.contains(&(i, j)) {
                        violations.push(Violation::WallOverlap { i, j, distance });
                    } else {
                        violations.push(Violation::Overlap { i, j, distance });
                    }
                }
            }
        }

        violations
    }

    /// Replace the particle set, e.g. to set up a specific scenario
    pub fn set_particles(&mut self, particles: Vec<Particle>) {
        self.particles = particles;
        self.wall_overlaps.clear();
    }
}

/// Boundary geometry for a config
pub fn boundary_for(config: &SimConfig) -> Boundary {
    let (width, height) = (config.width, config.height);
    match config.boundary {
        BoundaryShape::Rectangle => Boundary::Rectangle { width, height },
        BoundaryShape::Stadium => Boundary::Stadium { width, height },
        BoundaryShape::Circle => Boundary::Circle {
            center: DVec2::new(width / 2.0, height / 2.0),
            radius: width.min(height) / 2.0,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Variant;

    #[test]
    fn test_reset_places_particles_inside() {
        for variant in Variant::ALL {
            let sim = Simulation::new(variant.config().with_seed(7)).unwrap();
            assert_eq!(sim.particles().len(), variant.config().count);
            assert!(sim.check_invariants(1e-9).is_empty(), "{variant:?}");
        }
    }

    #[test]
    fn test_reset_speeds() {
        let sim = Simulation::new(Variant::NonInteracting.config().with_seed(1)).unwrap();
        for p in sim.particles() {
            assert!((p.speed() - 0.2).abs() < 1e-12);
        }
    }

    #[test]
    fn test_cold_gas_single_tracer() {
        let sim = Simulation::new(Variant::Cold.config().with_seed(3)).unwrap();
        let particles = sim.particles();
        assert!((particles[0].speed() - 0.1).abs() < 1e-12);
        assert_eq!(particles[0].color, Some(TRACER_COLOR));
        assert!(particles[1..].iter().all(|p| p.vel == DVec2::ZERO && p.color.is_none()));
    }

    #[test]
    fn test_bunimovich_starts_centered() {
        let sim = Simulation::new(Variant::Bunimovich.config().with_seed(3)).unwrap();
        assert_eq!(sim.particles()[0].pos, DVec2::new(300.0, 200.0));
    }

    #[test]
    fn test_same_seed_same_start() {
        let a = Simulation::new(Variant::Circle.config().with_seed(42)).unwrap();
        let b = Simulation::new(Variant::Circle.config().with_seed(42)).unwrap();
        assert_eq!(a.particles(), b.particles());
    }

    #[test]
    fn test_reset_rerandomizes() {
        let mut sim = Simulation::new(Variant::NonInteracting.config().with_seed(42)).unwrap();
        let before = sim.particles().to_vec();
        sim.step(50.0);
        sim.reset();
        assert_ne!(sim.particles(), &before[..]);
        assert_eq!(sim.time(), 0.0);
    }

    #[test]
    fn test_crowded_placement_still_completes() {
        // Far more disks than fit; placement gives up per particle and overlaps
        let config = SimConfig {
            width: 40.0,
            height: 40.0,
            count: 40,
            collisions: CollisionMode::PairwiseElastic,
            placement_attempts: 10,
            seed: Some(5),
            ..SimConfig::default()
        };
        let sim = Simulation::new(config).unwrap();
        assert_eq!(sim.particles().len(), 40);
        assert!(
            sim.check_invariants(0.0)
                .iter()
                .any(|v| matches!(v, Violation::Overlap { .. }))
        );
    }

    #[test]
    fn test_frame_clamps_and_pauses() {
        let mut sim = Simulation::new(Variant::NonInteracting.config().with_seed(9)).unwrap();

        // First frame only sets the baseline
        assert_eq!(sim.frame(1000.0).unwrap().elapsed, 0.0);
        assert_eq!(sim.frame(1016.0).unwrap().elapsed, 16.0);
        // A long gap is clamped
        assert_eq!(sim.frame(5000.0).unwrap().elapsed, 100.0);

        sim.pause();
        assert!(sim.frame(5016.0).is_none());

        // Resuming restarts the baseline, so the pause is not simulated
        sim.resume(90_000.0);
        assert_eq!(sim.frame(90_010.0).unwrap().elapsed, 10.0);
        assert_eq!(sim.time(), 126.0);
    }

    #[test]
    fn test_circle_boundary_geometry() {
        let config = SimConfig {
            width: 600.0,
            height: 400.0,
            boundary: BoundaryShape::Circle,
            ..SimConfig::default()
        };
        assert_eq!(
            boundary_for(&config),
            Boundary::Circle {
                center: DVec2::new(300.0, 200.0),
                radius: 200.0
            }
        );
    }
}
