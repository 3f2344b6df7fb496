//! Discrete Moore grid.

use std::collections::HashMap;

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::{Extent, Space};
use crate::components::EnvironmentOccupant;
use crate::config::RandomWalk;
use crate::math::{compass_sign, wrapped_delta, COMPASS};
use crate::rules::VariantRules;

/// Integer grid coordinate.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Cell {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Cell {
    /// Create a cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Grid of cells with 8-connected moves and Chebyshev distance.
///
/// The occupancy index maps each non-empty cell to its occupants in
/// insertion order.
#[derive(Debug, Clone)]
pub struct GridSpace {
    extent: Extent,
    cells: HashMap<Cell, Vec<EnvironmentOccupant>>,
}

impl GridSpace {
    fn width(&self) -> i32 {
        self.extent.width as i32
    }

    fn height(&self) -> i32 {
        self.extent.height as i32
    }

    /// Coordinates covered along one axis by a square of half-size `r`,
    /// each visited once.
    fn axis_span(center: i32, r: i64, len: i32, torus: bool) -> Vec<i32> {
        let (center, len) = (i64::from(center), i64::from(len));
        if torus {
            if 2 * r + 1 >= len {
                (0..len).map(|v| v as i32).collect()
            } else {
                (center - r..=center + r)
                    .map(|v| v.rem_euclid(len) as i32)
                    .collect()
            }
        } else {
            (0.max(center - r)..=(len - 1).min(center + r))
                .map(|v| v as i32)
                .collect()
        }
    }

    /// Number of coordinates [`Self::axis_span`] would produce.
    fn axis_span_len(center: i32, r: i64, len: i32, torus: bool) -> i64 {
        let (center, len) = (i64::from(center), i64::from(len));
        if torus {
            (2 * r + 1).min(len)
        } else {
            ((len - 1).min(center + r) - 0.max(center - r) + 1).max(0)
        }
    }

    /// Move `v` by the whole-cell offset `delta` along an axis of `len`
    /// cells.
    fn step_axis(v: i32, delta: f64, len: i32, torus: bool) -> i32 {
        if torus {
            // Reduced first so arbitrarily long moves stay in range
            let delta = delta.rem_euclid(f64::from(len)) as i64;
            (i64::from(v) + delta).rem_euclid(i64::from(len)) as i32
        } else {
            (f64::from(v) + delta).clamp(0.0, f64::from(len - 1)) as i32
        }
    }

    /// Number of cells holding at least one occupant.
    #[must_use]
    pub fn occupied_cells(&self) -> usize {
        self.cells.len()
    }
}

impl Space for GridSpace {
    type Pos = Cell;

    const NAME: &'static str = "grid";

    fn new(extent: Extent) -> Self {
        Self {
            extent,
            cells: HashMap::new(),
        }
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn default_rules() -> VariantRules {
        VariantRules::grid()
    }

    fn distance(&self, a: Cell, b: Cell) -> f64 {
        let mut dx = (a.x - b.x).abs();
        let mut dy = (a.y - b.y).abs();
        if self.extent.torus {
            dx = dx.min(self.width() - dx);
            dy = dy.min(self.height() - dy);
        }
        f64::from(dx.max(dy))
    }

    fn displacement(&self, from: Cell, to: Cell) -> DVec2 {
        let (fx, fy) = (f64::from(from.x), f64::from(from.y));
        let (tx, ty) = (f64::from(to.x), f64::from(to.y));
        if self.extent.torus {
            DVec2::new(
                wrapped_delta(fx, tx, self.extent.w()),
                wrapped_delta(fy, ty, self.extent.h()),
            )
        } else {
            DVec2::new(tx - fx, ty - fy)
        }
    }

    fn direction_to(&self, from: Cell, to: Cell) -> DVec2 {
        compass_sign(self.displacement(from, to))
    }

    fn quantize(&self, v: DVec2) -> DVec2 {
        compass_sign(v)
    }

    fn advance(&self, pos: Cell, heading: DVec2, speed: f64) -> Cell {
        let step = (heading * speed).round();
        let torus = self.extent.torus;
        Cell::new(
            Self::step_axis(pos.x, step.x, self.width(), torus),
            Self::step_axis(pos.y, step.y, self.height(), torus),
        )
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Cell {
        Cell::new(rng.gen_range(0..self.width()), rng.gen_range(0..self.height()))
    }

    fn random_heading<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        COMPASS[rng.gen_range(0..COMPASS.len())]
    }

    fn wander<R: Rng + ?Sized>(&self, heading: DVec2, walk: &RandomWalk, rng: &mut R) -> DVec2 {
        if heading == DVec2::ZERO || rng.gen_bool(walk.turn_probability) {
            self.random_heading(rng)
        } else {
            heading
        }
    }

    fn point(&self, pos: Cell) -> DVec2 {
        DVec2::new(f64::from(pos.x), f64::from(pos.y))
    }

    fn insert(&mut self, occupant: EnvironmentOccupant, pos: Cell) {
        self.cells.entry(pos).or_default().push(occupant);
    }

    fn remove(&mut self, occupant: EnvironmentOccupant, pos: Cell) {
        if let Some(occupants) = self.cells.get_mut(&pos) {
            if let Some(index) = occupants.iter().position(|o| *o == occupant) {
                occupants.remove(index);
            }
            if occupants.is_empty() {
                self.cells.remove(&pos);
            }
        }
    }

    fn neighborhood(
        &self,
        center: Cell,
        radius: f64,
        include_center: bool,
    ) -> Vec<EnvironmentOccupant> {
        let mut found = Vec::new();
        if radius.is_nan() || radius < 0.0 {
            return found;
        }
        let longest = self.width().max(self.height());
        let r = radius.floor().min(f64::from(longest)) as i64;
        let torus = self.extent.torus;

        let area = Self::axis_span_len(center.x, r, self.width(), torus)
            * Self::axis_span_len(center.y, r, self.height(), torus);
        if area > self.cells.len() as i64 {
            // Fewer occupied cells than cells in the square
            let mut hits: Vec<(&Cell, &Vec<EnvironmentOccupant>)> = self
                .cells
                .iter()
                .filter(|(cell, _)| {
                    (include_center || **cell != center)
                        && self.distance(center, **cell) <= r as f64
                })
                .collect();
            hits.sort_unstable_by_key(|(cell, _)| **cell);
            for (_, occupants) in hits {
                found.extend_from_slice(occupants);
            }
            return found;
        }

        let xs = Self::axis_span(center.x, r, self.width(), torus);
        let ys = Self::axis_span(center.y, r, self.height(), torus);

        for &x in &xs {
            for &y in &ys {
                let cell = Cell::new(x, y);
                if !include_center && cell == center {
                    continue;
                }
                if let Some(occupants) = self.cells.get(&cell) {
                    found.extend_from_slice(occupants);
                }
            }
        }
        found
    }
}
