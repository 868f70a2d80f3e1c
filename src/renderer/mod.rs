//! Rendering surface abstraction
//!
//! The simulation never draws. Anything that can clear itself, fill a
//! circle and stroke arcs and lines can show it.

pub mod ascii;

pub use ascii::AsciiSurface;

use glam::DVec2;

use crate::sim::{OutlineSegment, Simulation};

/// A 2D drawing target in world coordinates
pub trait Surface {
    fn clear(&mut self);
    /// Filled disk; `color` is 0xRRGGBB, `None` for the default ink
    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Option<u32>);
    /// Arc swept counter-clockwise from `start` to `end` (radians)
    fn stroke_arc(&mut self, center: DVec2, radius: f64, start: f64, end: f64);
    fn stroke_line(&mut self, a: DVec2, b: DVec2);
}

/// Draw the boundary outline and every particle
pub fn draw<S: Surface + ?Sized>(sim: &Simulation, surface: &mut S) {
    surface.clear();

    for segment in sim.boundary().outline() {
        match segment {
            OutlineSegment::Line { a, b } => surface.stroke_line(a, b),
            OutlineSegment::Arc {
                center,
                radius,
                start,
                end,
            } => surface.stroke_arc(center, radius, start, end),
        }
    }

    let r = sim.radius();
    for p in sim.particles() {
        surface.fill_circle(p.pos, r, p.color);
    }
}
