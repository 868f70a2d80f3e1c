//! Text-mode surface for terminals and tests

use std::fmt;

use glam::DVec2;

use super::Surface;
use crate::polar_to_cartesian;

const EMPTY: char = ' ';
const WALL: char = '.';
const DISK: char = 'o';
const TRACER: char = '@';

/// Character grid covering a `world_width × world_height` region
#[derive(Debug, Clone)]
pub struct AsciiSurface {
    cols: usize,
    rows: usize,
    /// World units per cell on each axis
    cell: DVec2,
    cells: Vec<char>,
}

impl AsciiSurface {
    pub fn new(cols: usize, rows: usize, world_width: f64, world_height: f64) -> Self {
        let cols = cols.max(1);
        let rows = rows.max(1);
        Self {
            cols,
            rows,
            cell: DVec2::new(world_width / cols as f64, world_height / rows as f64),
            cells: vec![EMPTY; cols * rows],
        }
    }

    /// Character at grid position, `None` off the grid
    pub fn get(&self, col: usize, row: usize) -> Option<char> {
        (col < self.cols && row < self.rows).then(|| self.cells[row * self.cols + col])
    }

    pub fn count(&self, ch: char) -> usize {
        self.cells.iter().filter(|c| **c == ch).count()
    }

    fn to_cell(&self, p: DVec2) -> Option<(usize, usize)> {
        let g = (p / self.cell).floor();
        if g.x < 0.0 || g.y < 0.0 {
            return None;
        }
        let (col, row) = (g.x as usize, g.y as usize);
        (col < self.cols && row < self.rows).then_some((col, row))
    }

    fn plot(&mut self, p: DVec2, ch: char) {
        if let Some((col, row)) = self.to_cell(p) {
            let cell = &mut self.cells[row * self.cols + col];
            // Disks draw over walls, never the reverse
            if ch != WALL || *cell == EMPTY {
                *cell = ch;
            }
        }
    }

    /// Sample spacing along strokes: half a cell
    fn stroke_step(&self) -> f64 {
        0.5 * self.cell.min_element()
    }
}

impl Surface for AsciiSurface {
    fn clear(&mut self) {
        self.cells.fill(EMPTY);
    }

    fn fill_circle(&mut self, center: DVec2, radius: f64, color: Option<u32>) {
        let ch = if color.is_some() { TRACER } else { DISK };
        self.plot(center, ch);

        let min = ((center - radius) / self.cell).floor().max(DVec2::ZERO);
        let max = ((center + radius) / self.cell).ceil();
        let cols = (max.x.max(0.0) as usize).min(self.cols);
        let rows = (max.y.max(0.0) as usize).min(self.rows);
        for row in min.y as usize..rows {
            for col in min.x as usize..cols {
                let mid = (DVec2::new(col as f64, row as f64) + 0.5) * self.cell;
                if mid.distance_squared(center) <= radius * radius {
                    self.plot(mid, ch);
                }
            }
        }
    }

    fn stroke_arc(&mut self, center: DVec2, radius: f64, start: f64, end: f64) {
        let sweep = end - start;
        let samples = ((sweep.abs() * radius / self.stroke_step()).ceil() as usize).max(1);
        for i in 0..=samples {
            let theta = start + sweep * i as f64 / samples as f64;
            self.plot(center + polar_to_cartesian(radius, theta), WALL);
        }
    }

    fn stroke_line(&mut self, a: DVec2, b: DVec2) {
        let samples = ((a.distance(b) / self.stroke_step()).ceil() as usize).max(1);
        for i in 0..=samples {
            self.plot(a.lerp(b, i as f64 / samples as f64), WALL);
        }
    }
}

impl fmt::Display for AsciiSurface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.cells.chunks(self.cols) {
            let line: String = row.iter().collect();
            writeln!(f, "{}", line.trim_end())?;
        }
        Ok(())
    }
}
