//! Static boundaries and wall reflection
//!
//! A boundary answers one question at the end of a step: has the particle's
//! edge crossed the wall, and if so, where would it be had it bounced at the
//! right instant? Flat walls mirror the overshoot exactly; circular walls
//! solve for the crossing point and reflect about the surface normal there.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::particle::Particle;
use crate::consts::ARC_NUDGE;
use crate::quadratic_root;

/// Spatial axis for flat-wall reflection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl Axis {
    #[inline]
    fn get(self, v: DVec2) -> f64 {
        match self {
            Axis::X => v.x,
            Axis::Y => v.y,
        }
    }

    #[inline]
    fn set(self, v: &mut DVec2, value: f64) {
        match self {
            Axis::X => v.x = value,
            Axis::Y => v.y = value,
        }
    }
}

/// Immutable description of the playable region
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Boundary {
    /// Axis-aligned box `[0, width] × [0, height]`
    Rectangle { width: f64, height: f64 },
    /// Box of the given size with both short ends replaced by semicircles of
    /// radius `height / 2` (requires `width >= height`)
    Stadium { width: f64, height: f64 },
    /// Bare circle
    Circle { center: DVec2, radius: f64 },
}

/// One piece of a boundary outline, in world coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutlineSegment {
    Line { a: DVec2, b: DVec2 },
    /// Arc swept counter-clockwise from `start` to `end` (radians)
    Arc {
        center: DVec2,
        radius: f64,
        start: f64,
        end: f64,
    },
}

impl Boundary {
    /// Reflect `p` off whichever wall it has crossed during the last advance.
    /// Returns true if the particle was reflected.
    pub fn bounce(&self, p: &mut Particle, r: f64) -> bool {
        match *self {
            Boundary::Rectangle { width, height } => {
                let bx = reflect_flat(p, Axis::X, 0.0, width, r);
                let by = reflect_flat(p, Axis::Y, 0.0, height, r);
                bx || by
            }
            Boundary::Stadium { width, height } => {
                let (left, right) = stadium_caps(width, height);
                let cap_radius = height / 2.0;
                if p.pos.x < left.x {
                    reflect_circular(p, left, cap_radius, r)
                } else if p.pos.x > right.x {
                    reflect_circular(p, right, cap_radius, r)
                } else {
                    reflect_flat(p, Axis::Y, 0.0, height, r)
                }
            }
            Boundary::Circle { center, radius } => reflect_circular(p, center, radius, r),
        }
    }

    /// Whether a disk of radius `r` centred at `pos` lies inside the region,
    /// allowing `tolerance` of penetration.
    pub fn contains(&self, pos: DVec2, r: f64, tolerance: f64) -> bool {
        match *self {
            Boundary::Rectangle { width, height } => {
                pos.x >= r - tolerance
                    && pos.x <= width - r + tolerance
                    && pos.y >= r - tolerance
                    && pos.y <= height - r + tolerance
            }
            Boundary::Stadium { width, height } => {
                // A stadium is a capsule around the segment joining the cap centres
                let (left, right) = stadium_caps(width, height);
                let nearest = DVec2::new(pos.x.clamp(left.x, right.x), left.y);
                pos.distance(nearest) <= height / 2.0 - r + tolerance
            }
            Boundary::Circle { center, radius } => pos.distance(center) <= radius - r + tolerance,
        }
    }

    /// Bounding box of admissible particle centres: `(min, max)`
    pub fn inset_bounds(&self, r: f64) -> (DVec2, DVec2) {
        match *self {
            Boundary::Rectangle { width, height } | Boundary::Stadium { width, height } => {
                (DVec2::splat(r), DVec2::new(width - r, height - r))
            }
            Boundary::Circle { center, radius } => {
                let reach = DVec2::splat(radius - r);
                (center - reach, center + reach)
            }
        }
    }

    pub fn center(&self) -> DVec2 {
        match *self {
            Boundary::Rectangle { width, height } | Boundary::Stadium { width, height } => {
                DVec2::new(width / 2.0, height / 2.0)
            }
            Boundary::Circle { center, .. } => center,
        }
    }

    /// Outline geometry for a renderer
    pub fn outline(&self) -> Vec<OutlineSegment> {
        use std::f64::consts::{FRAC_PI_2, PI};

        match *self {
            Boundary::Rectangle { width, height } => {
                let corners = [
                    DVec2::ZERO,
                    DVec2::new(width, 0.0),
                    DVec2::new(width, height),
                    DVec2::new(0.0, height),
                ];
                (0..4)
                    .map(|i| OutlineSegment::Line {
                        a: corners[i],
                        b: corners[(i + 1) % 4],
                    })
                    .collect()
            }
            Boundary::Stadium { width, height } => {
                let (left, right) = stadium_caps(width, height);
                let cap_radius = height / 2.0;
                vec![
                    OutlineSegment::Arc {
                        center: left,
                        radius: cap_radius,
                        start: FRAC_PI_2,
                        end: 3.0 * FRAC_PI_2,
                    },
                    OutlineSegment::Line {
                        a: DVec2::new(left.x, 0.0),
                        b: DVec2::new(right.x, 0.0),
                    },
                    OutlineSegment::Arc {
                        center: right,
                        radius: cap_radius,
                        start: -FRAC_PI_2,
                        end: FRAC_PI_2,
                    },
                    OutlineSegment::Line {
                        a: DVec2::new(right.x, height),
                        b: DVec2::new(left.x, height),
                    },
                ]
            }
            Boundary::Circle { center, radius } => vec![OutlineSegment::Arc {
                center,
                radius,
                start: -PI,
                end: PI,
            }],
        }
    }
}

/// Centres of the left and right stadium caps
#[inline]
fn stadium_caps(width: f64, height: f64) -> (DVec2, DVec2) {
    let half = height / 2.0;
    (DVec2::new(half, half), DVec2::new(width - half, half))
}

/// Mirror the particle back across a flat wall on one axis.
///
/// If the coordinate has passed `hi - r` it becomes `2(hi - r) - coord` and
/// the velocity component flips; symmetrically for `lo + r`. Checked once:
/// a particle that overshoots by more than the box width is not re-checked.
pub fn reflect_flat(p: &mut Particle, axis: Axis, lo: f64, hi: f64, r: f64) -> bool {
    let coord = axis.get(p.pos);
    let wall = if coord > hi - r {
        hi - r
    } else if coord < lo + r {
        lo + r
    } else {
        return false;
    };

    let flipped = -axis.get(p.vel);
    axis.set(&mut p.pos, 2.0 * wall - coord);
    axis.set(&mut p.vel, flipped);
    true
}

/// Point where the particle's centre crossed the circle of radius
/// `arc_radius - r`, found by running its current velocity backwards from
/// its (already outside) position. The later root is the crossing nearest
/// to now.
pub fn circular_collision_point(p: &Particle, center: DVec2, arc_radius: f64, r: f64) -> Option<DVec2> {
    let reach = arc_radius - r;
    let d = p.pos - center;

    let a = p.vel.length_squared();
    let b = 2.0 * p.vel.dot(d);
    let c = d.length_squared() - reach * reach;

    quadratic_root(a, b, c, 1.0).map(|t| p.pos + p.vel * t)
}

/// Reflect a particle off the inside of a circular wall.
///
/// The particle is placed at the crossing point, nudged one unit
/// horizontally toward the circle's centre line, and its velocity is
/// mirrored about the wall normal. The time left after the crossing is not
/// re-advanced. A particle outside the wall but already moving inward is
/// left alone.
pub fn reflect_circular(p: &mut Particle, center: DVec2, arc_radius: f64, r: f64) -> bool {
    let reach = arc_radius - r;
    let d = p.pos - center;
    if d.length_squared() <= reach * reach {
        return false;
    }
    // Already heading back in (left just outside by a previous nudge)
    if p.vel.dot(d) < 0.0 {
        return false;
    }

    let contact = match circular_collision_point(p, center, arc_radius, r) {
        Some(point) => point,
        None => {
            // Only reachable from a stationary or overlapping start; project
            // radially back onto the admissible circle instead.
            log::debug!("circular bounce fallback at {:?} vel {:?}", p.pos, p.vel);
            center + (p.pos - center).normalize_or_zero() * reach
        }
    };

    let normal = (center - contact) / reach;
    p.vel -= 2.0 * p.vel.dot(normal) * normal;

    let nudge = if contact.x < center.x { ARC_NUDGE } else { -ARC_NUDGE };
    p.pos = contact + DVec2::new(nudge, 0.0);
    true
}
