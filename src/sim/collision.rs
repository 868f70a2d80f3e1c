//! Pairwise disk collisions
//!
//! The tricky part of the interacting gas: finding the exact instant two
//! disks first touch, and exchanging momentum along the line of centres
//! when they do.

use super::particle::Particle;
use crate::quadratic_root;

/// The earliest upcoming contact between two particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairCollision {
    /// Time from now until contact
    pub t: f64,
    pub i: usize,
    pub j: usize,
}

/// Time until `pi` and `pj` (both of radius `r`) first touch on their
/// current straight-line paths.
///
/// Solves `|Δr + Δv·t| = 2r` and keeps the earlier root. Pairs that are not
/// closing (parallel, receding, or already touching and separating), pairs
/// that miss, and pairs whose contact lies in the past give `None`.
///
/// A pair that already overlaps and is still closing collides immediately
/// (`Some(0.0)`), so overlapping disks bounce apart instead of passing
/// through each other. The plain earlier-root rule would give a negative
/// time here and skip the pair.
pub fn time_to_collision(pi: &Particle, pj: &Particle, r: f64) -> Option<f64> {
    let dr = pi.pos - pj.pos;
    let dv = pi.vel - pj.vel;

    let a = dv.length_squared();
    let b = 2.0 * dv.dot(dr);
    let c = dr.length_squared() - 4.0 * r * r;

    if b >= 0.0 {
        return None;
    }
    if c < 0.0 {
        return Some(0.0);
    }

    quadratic_root(a, b, c, -1.0).filter(|t| *t >= 0.0)
}

/// Earliest collision over all unordered pairs. Exact ties keep the pair
/// that comes first in `(i, j)` order.
pub fn next_collision(particles: &[Particle], r: f64) -> Option<PairCollision> {
    let mut best: Option<PairCollision> = None;

    for (i, pi) in particles.iter().enumerate() {
        for (j, pj) in particles.iter().enumerate().skip(i + 1) {
            let Some(t) = time_to_collision(pi, pj, r) else {
                continue;
            };
            if best.is_none_or(|b| t < b.t) {
                best = Some(PairCollision { t, i, j });
            }
        }
    }

    best
}

/// Apply the equal-mass elastic impulse between particles `i` and `j`.
pub fn resolve_collision(particles: &mut [Particle], i: usize, j: usize) {
    let (pi, pj) = pair_mut(particles, i, j);
    collide(pi, pj);
}

/// Equal-mass elastic collision between two touching disks:
/// `Δv = ((v_i - v_j)·r) r / |r|²`, subtracted from `i` and added to `j`.
pub fn collide(pi: &mut Particle, pj: &mut Particle) {
    let r = pi.pos - pj.pos;
    let r2 = r.length_squared();
    if r2 == 0.0 {
        log::debug!("coincident particles at {:?}, skipping impulse", pi.pos);
        return;
    }

    let dv = (pi.vel - pj.vel).dot(r) * r / r2;
    pi.vel -= dv;
    pj.vel += dv;
}

/// Exclusive access to two distinct slots of a slice
fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    assert_ne!(i, j, "a particle cannot collide with itself");
    if i < j {
        let (lo, hi) = items.split_at_mut(j);
        (&mut lo[i], &mut hi[0])
    } else {
        let (lo, hi) = items.split_at_mut(i);
        (&mut hi[0], &mut lo[j])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::DVec2;
    use proptest::prelude::*;

    fn particle(x: f64, y: f64, vx: f64, vy: f64) -> Particle {
        Particle::new(DVec2::new(x, y), DVec2::new(vx, vy))
    }

    #[test]
    fn test_head_on_time_of_impact() {
        // Centres 10 apart, radius 1, closing at speed 1: touch at distance 2
        let a = particle(0.0, 0.0, 1.0, 0.0);
        let b = particle(10.0, 0.0, 0.0, 0.0);
        let t = time_to_collision(&a, &b, 1.0).unwrap();
        assert!((t - 8.0).abs() < 1e-12);
        // Symmetric in argument order
        let t2 = time_to_collision(&b, &a, 1.0).unwrap();
        assert!((t - t2).abs() < 1e-12);
    }

    #[test]
    fn test_stationary_pair_never_collides() {
        let a = particle(0.0, 0.0, 0.0, 0.0);
        let b = particle(20.0, 0.0, 0.0, 0.0);
        assert_eq!(time_to_collision(&a, &b, 5.0), None);

        // Same velocity: relative motion is zero
        let a = particle(0.0, 0.0, 0.3, 0.3);
        let b = particle(20.0, 0.0, 0.3, 0.3);
        assert_eq!(time_to_collision(&a, &b, 5.0), None);
    }

    #[test]
    fn test_receding_pair_never_collides() {
        let a = particle(0.0, 0.0, -1.0, 0.0);
        let b = particle(20.0, 0.0, 1.0, 0.0);
        assert_eq!(time_to_collision(&a, &b, 5.0), None);
    }

    #[test]
    fn test_near_miss() {
        // Offset 11 perpendicular to motion with radius 5: gap stays above 10
        let a = particle(0.0, 0.0, 1.0, 0.0);
        let b = particle(50.0, 11.0, 0.0, 0.0);
        assert_eq!(time_to_collision(&a, &b, 5.0), None);
    }

    #[test]
    fn test_overlapping_pair() {
        // Still closing: bounce now
        let a = particle(0.0, 0.0, 1.0, 0.0);
        let b = particle(4.0, 0.0, 0.0, 0.0);
        assert_eq!(time_to_collision(&a, &b, 5.0), Some(0.0));

        // Already separating: leave alone
        let a = particle(0.0, 0.0, -1.0, 0.0);
        assert_eq!(time_to_collision(&a, &b, 5.0), None);
    }

    #[test]
    fn test_touching_and_approaching_is_immediate() {
        let a = particle(0.0, 0.0, 1.0, 0.0);
        let b = particle(10.0, 0.0, 0.0, 0.0);
        assert_eq!(time_to_collision(&a, &b, 5.0), Some(0.0));
    }

    #[test]
    fn test_next_collision_picks_earliest() {
        let particles = vec![
            particle(0.0, 0.0, 1.0, 0.0),
            particle(100.0, 0.0, 0.0, 0.0),
            particle(0.0, 50.0, 0.0, 0.0),
            particle(20.0, 50.0, -1.0, 0.0),
        ];
        let next = next_collision(&particles, 5.0).unwrap();
        assert_eq!((next.i, next.j), (2, 3));
        assert!((next.t - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_next_collision_tie_keeps_first_pair() {
        let particles = vec![
            particle(0.0, 0.0, 1.0, 0.0),
            particle(20.0, 0.0, 0.0, 0.0),
            particle(0.0, 100.0, 1.0, 0.0),
            particle(20.0, 100.0, 0.0, 0.0),
        ];
        let next = next_collision(&particles, 5.0).unwrap();
        assert_eq!((next.i, next.j), (0, 1));
    }

    #[test]
    fn test_next_collision_none() {
        let particles = vec![particle(0.0, 0.0, 0.0, 0.0), particle(50.0, 0.0, 0.0, 0.0)];
        assert_eq!(next_collision(&particles, 5.0), None);
        assert_eq!(next_collision(&[], 5.0), None);
    }

    #[test]
    fn test_head_on_equal_mass_swaps_velocities() {
        let mut particles = vec![particle(0.0, 0.0, 1.0, 0.0), particle(10.0, 0.0, -0.5, 0.0)];
        resolve_collision(&mut particles, 0, 1);
        assert!((particles[0].vel - DVec2::new(-0.5, 0.0)).length() < 1e-12);
        assert!((particles[1].vel - DVec2::new(1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_resolved_pair_separates() {
        let mut particles = vec![particle(0.0, 0.0, 1.0, 0.3), particle(6.0, 8.0, -0.2, -0.4)];
        resolve_collision(&mut particles, 1, 0);
        assert_eq!(time_to_collision(&particles[0], &particles[1], 5.0), None);
    }

    #[test]
    #[should_panic]
    fn test_self_collision_panics() {
        let mut particles = vec![particle(0.0, 0.0, 1.0, 0.0)];
        resolve_collision(&mut particles, 0, 0);
    }

    proptest! {
        #[test]
        fn prop_collision_conserves_momentum_and_energy(
            angle in 0.0f64..std::f64::consts::TAU,
            vix in -1.0f64..1.0, viy in -1.0f64..1.0,
            vjx in -1.0f64..1.0, vjy in -1.0f64..1.0,
        ) {
            let offset = DVec2::new(angle.cos(), angle.sin()) * 10.0;
            let mut particles = vec![
                particle(100.0, 100.0, vix, viy),
                Particle::new(DVec2::new(100.0, 100.0) + offset, DVec2::new(vjx, vjy)),
            ];

            let momentum = particles[0].vel + particles[1].vel;
            let energy = particles[0].kinetic_energy() + particles[1].kinetic_energy();

            resolve_collision(&mut particles, 0, 1);

            let momentum_after = particles[0].vel + particles[1].vel;
            let energy_after = particles[0].kinetic_energy() + particles[1].kinetic_energy();
            prop_assert!((momentum - momentum_after).length() < 1e-12);
            prop_assert!((energy - energy_after).abs() < 1e-12);
        }

        #[test]
        fn prop_time_of_impact_lands_at_contact(
            x in 20.0f64..200.0, y in -9.0f64..9.0,
            speed in 0.01f64..2.0,
        ) {
            let a = particle(0.0, 0.0, speed, 0.0);
            let b = particle(x, y, 0.0, 0.0);
            let t = time_to_collision(&a, &b, 5.0).unwrap();
            let contact = a.pos + a.vel * t;
            prop_assert!((contact.distance(b.pos) - 10.0).abs() < 1e-9);
        }
    }
}
