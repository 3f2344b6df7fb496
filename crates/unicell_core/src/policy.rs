//! Steering decisions.
//!
//! An agent's choice of heading is a strict priority list: flee hazards,
//! then spread out from crowding neighbours, then seek resources, and
//! otherwise random-walk. A tier only counts when its summed steering vector
//! is non-zero after quantisation; otherwise the next tier is evaluated.

use glam::DVec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::config::RandomWalk;
use crate::rules::{VariantRules, NEIGHBOR_FORCE_THRESHOLD, WEIGHT_SOFTENING};
use crate::space::Space;

/// One sensed entity, described relative to the sensing agent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stimulus {
    /// Direction toward the entity as the space reports it.
    pub direction: DVec2,
    /// Shortest offset from the agent to the entity.
    pub offset: DVec2,
    /// Distance to the entity.
    pub distance: f64,
    /// Damage radius for hazards, 0 otherwise.
    pub radius: f64,
}

/// Everything an agent sensed this tick.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Perception {
    /// Hazards in sensing range.
    pub hazards: Vec<Stimulus>,
    /// Other agents within the avoidance threshold.
    pub neighbors: Vec<Stimulus>,
    /// Undepleted resources in sensing range.
    pub resources: Vec<Stimulus>,
}

impl Perception {
    /// Whether nothing was sensed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hazards.is_empty() && self.neighbors.is_empty() && self.resources.is_empty()
    }
}

/// The tier that chose the heading, carrying the heading itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Decision {
    /// Fleeing sensed hazards.
    AvoidHazards(DVec2),
    /// Moving away from crowding neighbours.
    AvoidNeighbors(DVec2),
    /// Heading toward sensed resources.
    SeekResources(DVec2),
    /// Random walk.
    Wander(DVec2),
}

impl Decision {
    /// The chosen heading.
    #[must_use]
    pub const fn heading(self) -> DVec2 {
        match self {
            Self::AvoidHazards(h)
            | Self::AvoidNeighbors(h)
            | Self::SeekResources(h)
            | Self::Wander(h) => h,
        }
    }

    /// Short label for logs and tallies.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::AvoidHazards(_) => "avoid_hazards",
            Self::AvoidNeighbors(_) => "avoid_neighbors",
            Self::SeekResources(_) => "seek_resources",
            Self::Wander(_) => "wander",
        }
    }
}

/// Summed hazard repulsion, before quantisation.
#[must_use]
pub fn hazard_repulsion(perception: &Perception, rules: &VariantRules) -> DVec2 {
    perception
        .hazards
        .iter()
        .map(|h| -h.direction * rules.hazard_falloff.weight(h.distance, h.radius))
        .sum()
}

/// Summed neighbour repulsion, before thresholding.
#[must_use]
pub fn neighbor_repulsion(perception: &Perception) -> DVec2 {
    perception
        .neighbors
        .iter()
        .map(|n| -n.offset / (n.distance + WEIGHT_SOFTENING))
        .sum()
}

/// Summed resource attraction, before quantisation.
#[must_use]
pub fn resource_attraction(perception: &Perception, rules: &VariantRules) -> DVec2 {
    perception
        .resources
        .iter()
        .map(|r| r.direction * rules.resource_falloff.weight(r.distance))
        .sum()
}

/// Pick a heading for an agent currently moving along `heading`.
///
/// Only the wander tier draws from `rng`.
pub fn decide<S: Space, R: Rng + ?Sized>(
    space: &S,
    perception: &Perception,
    heading: DVec2,
    rules: &VariantRules,
    walk: &RandomWalk,
    rng: &mut R,
) -> Decision {
    let flee = space.quantize(hazard_repulsion(perception, rules));
    if flee != DVec2::ZERO {
        return Decision::AvoidHazards(flee);
    }

    if rules.neighbor_avoidance {
        let push = neighbor_repulsion(perception);
        if push.length() > NEIGHBOR_FORCE_THRESHOLD {
            let spread = space.quantize(push);
            if spread != DVec2::ZERO {
                return Decision::AvoidNeighbors(spread);
            }
        }
    }

    let seek = space.quantize(resource_attraction(perception, rules));
    if seek != DVec2::ZERO {
        return Decision::SeekResources(seek);
    }

    Decision::Wander(space.wander(heading, walk, rng))
}
