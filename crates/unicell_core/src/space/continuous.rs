//! Continuous plane.

use std::f64::consts::TAU;

use glam::DVec2;
use rand::Rng;

use super::{Extent, Space};
use crate::components::EnvironmentOccupant;
use crate::config::RandomWalk;
use crate::math::{axis_separation, rotate, wrapped_delta};
use crate::rules::VariantRules;

/// Real-valued plane with free headings and Euclidean distance.
///
/// Occupants live in a flat list; neighbourhood queries scan it.
#[derive(Debug, Clone)]
pub struct ContinuousSpace {
    extent: Extent,
    occupants: Vec<(EnvironmentOccupant, DVec2)>,
}

impl ContinuousSpace {
    fn wrap_axis(v: f64, len: f64) -> f64 {
        let wrapped = v.rem_euclid(len);
        // rem_euclid can round up to `len` for tiny negative inputs
        if wrapped >= len {
            0.0
        } else {
            wrapped
        }
    }

    /// Number of indexed occupants.
    #[must_use]
    pub fn len(&self) -> usize {
        self.occupants.len()
    }

    /// Whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.occupants.is_empty()
    }
}

impl Space for ContinuousSpace {
    type Pos = DVec2;

    const NAME: &'static str = "continuous";

    fn new(extent: Extent) -> Self {
        Self {
            extent,
            occupants: Vec::new(),
        }
    }

    fn extent(&self) -> Extent {
        self.extent
    }

    fn default_rules() -> VariantRules {
        VariantRules::continuous()
    }

    fn distance(&self, a: DVec2, b: DVec2) -> f64 {
        let torus = self.extent.torus;
        let dx = axis_separation(a.x, b.x, self.extent.w(), torus);
        let dy = axis_separation(a.y, b.y, self.extent.h(), torus);
        dx.hypot(dy)
    }

    fn displacement(&self, from: DVec2, to: DVec2) -> DVec2 {
        if self.extent.torus {
            DVec2::new(
                wrapped_delta(from.x, to.x, self.extent.w()),
                wrapped_delta(from.y, to.y, self.extent.h()),
            )
        } else {
            to - from
        }
    }

    fn direction_to(&self, from: DVec2, to: DVec2) -> DVec2 {
        self.displacement(from, to).normalize_or_zero()
    }

    fn quantize(&self, v: DVec2) -> DVec2 {
        v.normalize_or_zero()
    }

    fn advance(&self, pos: DVec2, heading: DVec2, speed: f64) -> DVec2 {
        let next = pos + heading * speed;
        let (w, h) = (self.extent.w(), self.extent.h());
        if self.extent.torus {
            DVec2::new(Self::wrap_axis(next.x, w), Self::wrap_axis(next.y, h))
        } else {
            DVec2::new(next.x.clamp(0.0, w), next.y.clamp(0.0, h))
        }
    }

    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        DVec2::new(
            rng.gen_range(0.0..self.extent.w()),
            rng.gen_range(0.0..self.extent.h()),
        )
    }

    fn random_heading<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2 {
        DVec2::from_angle(rng.gen_range(0.0..TAU))
    }

    fn wander<R: Rng + ?Sized>(&self, heading: DVec2, walk: &RandomWalk, rng: &mut R) -> DVec2 {
        if heading == DVec2::ZERO {
            return self.random_heading(rng);
        }
        let angle = rng.gen_range(-walk.max_turn..=walk.max_turn);
        let turned = rotate(heading, angle).normalize_or_zero();
        if turned == DVec2::ZERO {
            self.random_heading(rng)
        } else {
            turned
        }
    }

    fn point(&self, pos: DVec2) -> DVec2 {
        pos
    }

    fn insert(&mut self, occupant: EnvironmentOccupant, pos: DVec2) {
        self.occupants.push((occupant, pos));
    }

    fn remove(&mut self, occupant: EnvironmentOccupant, _pos: DVec2) {
        if let Some(index) = self.occupants.iter().position(|(o, _)| *o == occupant) {
            self.occupants.remove(index);
        }
    }

    fn relocate(&mut self, occupant: EnvironmentOccupant, _from: DVec2, to: DVec2) {
        if let Some(entry) = self.occupants.iter_mut().find(|(o, _)| *o == occupant) {
            entry.1 = to;
        }
    }

    fn neighborhood(
        &self,
        center: DVec2,
        radius: f64,
        include_center: bool,
    ) -> Vec<EnvironmentOccupant> {
        self.occupants
            .iter()
            .filter(|(_, pos)| include_center || *pos != center)
            .filter(|(_, pos)| self.distance(center, *pos) <= radius)
            .map(|(occupant, _)| *occupant)
            .collect()
    }
}
