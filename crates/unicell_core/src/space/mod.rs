//! Spatial strategies.
//!
//! A [`Space`] answers every geometric question the simulation asks
//! (distance, direction, movement, random placement) and owns the
//! occupancy index used for neighbourhood queries. Two interchangeable
//! implementations exist:
//!
//! - [`GridSpace`]: integer cells, 8-connected moves, Chebyshev distance.
//! - [`ContinuousSpace`]: real-valued plane, free headings, Euclidean
//!   distance.
//!
//! Both honour the torus flag of their [`Extent`].

mod continuous;
mod grid;

use std::fmt;

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::components::EnvironmentOccupant;
use crate::config::RandomWalk;
use crate::rules::VariantRules;

pub use continuous::ContinuousSpace;
pub use grid::{Cell, GridSpace};

/// Size and edge behaviour of a space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Extent {
    /// Width in cells (grid) or world units (plane).
    pub width: u32,
    /// Height in cells (grid) or world units (plane).
    pub height: u32,
    /// Whether movement and distance wrap around the edges.
    pub torus: bool,
}

impl Extent {
    /// Create an extent.
    #[must_use]
    pub const fn new(width: u32, height: u32, torus: bool) -> Self {
        Self {
            width,
            height,
            torus,
        }
    }

    /// Width as a float.
    #[must_use]
    pub fn w(self) -> f64 {
        f64::from(self.width)
    }

    /// Height as a float.
    #[must_use]
    pub fn h(self) -> f64 {
        f64::from(self.height)
    }
}

/// Geometry plus occupancy index for one environment representation.
pub trait Space: Clone + fmt::Debug + Send {
    /// Location type stored on entities.
    type Pos: Copy + PartialEq + fmt::Debug + Send;

    /// Short name used in logs.
    const NAME: &'static str;

    /// Create an empty space.
    fn new(extent: Extent) -> Self;

    /// Size and edge behaviour.
    fn extent(&self) -> Extent;

    /// Behavioural rules this representation runs with by default.
    fn default_rules() -> VariantRules;

    /// Distance between two positions, respecting the torus flag.
    fn distance(&self, a: Self::Pos, b: Self::Pos) -> f64;

    /// Shortest signed offset from `from` to `to`.
    fn displacement(&self, from: Self::Pos, to: Self::Pos) -> DVec2;

    /// Direction from `from` toward `to`; zero when they coincide.
    fn direction_to(&self, from: Self::Pos, to: Self::Pos) -> DVec2;

    /// Turn an accumulated steering vector into a heading.
    fn quantize(&self, v: DVec2) -> DVec2;

    /// Position reached by moving `speed` along `heading`.
    fn advance(&self, pos: Self::Pos, heading: DVec2, speed: f64) -> Self::Pos;

    /// Uniformly random position.
    fn random_position<R: Rng + ?Sized>(&self, rng: &mut R) -> Self::Pos;

    /// Uniformly random heading.
    fn random_heading<R: Rng + ?Sized>(&self, rng: &mut R) -> DVec2;

    /// Random-walk update of `heading`. Never returns zero.
    fn wander<R: Rng + ?Sized>(&self, heading: DVec2, walk: &RandomWalk, rng: &mut R) -> DVec2;

    /// Position as a plane point, for metrics and renderers.
    fn point(&self, pos: Self::Pos) -> DVec2;

    /// Register an occupant at `pos`.
    fn insert(&mut self, occupant: EnvironmentOccupant, pos: Self::Pos);

    /// Unregister an occupant previously inserted at `pos`.
    fn remove(&mut self, occupant: EnvironmentOccupant, pos: Self::Pos);

    /// Move an occupant from `from` to `to`.
    fn relocate(&mut self, occupant: EnvironmentOccupant, from: Self::Pos, to: Self::Pos) {
        if from != to {
            self.remove(occupant, from);
            self.insert(occupant, to);
        }
    }

    /// Occupants within `radius` of `center`, in a deterministic order.
    ///
    /// With `include_center == false` occupants located exactly at
    /// `center` are skipped.
    fn neighborhood(
        &self,
        center: Self::Pos,
        radius: f64,
        include_center: bool,
    ) -> Vec<EnvironmentOccupant>;

    /// Occupants located exactly at `pos`.
    fn occupants_at(&self, pos: Self::Pos) -> Vec<EnvironmentOccupant> {
        self.neighborhood(pos, 0.0, true)
    }
}
