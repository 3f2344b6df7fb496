//! Behavioural differences between the grid and continuous variants.
//!
//! The two representations do not just differ in geometry. Their steering
//! weights, hazard handling and resource bookkeeping differ as well, and
//! comparison runs depend on those differences staying visible. Each one is
//! a named switch here; [`VariantRules::grid`] and
//! [`VariantRules::continuous`] are the stock presets.

use serde::{Deserialize, Serialize};

/// Lower bound on the edge distance used for hazard weighting.
pub const EDGE_DISTANCE_FLOOR: f64 = 0.1;

/// Softening term added to distances before inverting them.
pub const WEIGHT_SOFTENING: f64 = 0.1;

/// Minimum magnitude of the summed neighbour repulsion that triggers a turn.
pub const NEIGHBOR_FORCE_THRESHOLD: f64 = 0.1;

/// How hazard repulsion falls off with distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardFalloff {
    /// `1 / (max(0.1, distance - radius) + 0.1)`: measured from the edge of
    /// the damage area.
    EdgeDistance,
    /// `1 / (distance + 0.1)`: measured from the hazard centre.
    CenterDistance,
}

impl HazardFalloff {
    /// Repulsion weight for a hazard at `distance` with damage `radius`.
    #[must_use]
    pub fn weight(self, distance: f64, radius: f64) -> f64 {
        match self {
            Self::EdgeDistance => {
                let effective = (distance - radius).max(EDGE_DISTANCE_FLOOR);
                1.0 / (effective + WEIGHT_SOFTENING)
            }
            Self::CenterDistance => 1.0 / (distance + WEIGHT_SOFTENING),
        }
    }
}

/// How resource attraction falls off with distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResourceFalloff {
    /// `1 / (distance + 1)`.
    Inverse,
    /// `1 / sqrt(distance + 1)`.
    InverseSqrt,
}

impl ResourceFalloff {
    /// Attraction weight for a resource at `distance`.
    #[must_use]
    pub fn weight(self, distance: f64) -> f64 {
        match self {
            Self::Inverse => 1.0 / (distance + 1.0),
            Self::InverseSqrt => 1.0 / (distance + 1.0).sqrt(),
        }
    }
}

/// Which overlapping hazards hurt an agent in a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardDamage {
    /// Every hazard covering the agent deals its damage.
    Cumulative,
    /// Only the first covering hazard, in id order, deals damage.
    FirstOnly,
}

/// How far an agent looks for hazards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HazardSensing {
    /// Search `sensing_radius` plus the largest hazard radius and keep hazards
    /// whose damage area comes within `sensing_radius`.
    ExtendedByReach,
    /// Keep hazards whose centre lies within `sensing_radius`.
    SensingRadiusOnly,
}

/// What happens to a resource once it is used up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DepletedResources {
    /// Taken out of the environment immediately.
    Remove,
    /// Left in place, inert forever.
    KeepInert,
}

/// The full set of variant-specific behaviour switches.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariantRules {
    /// Hazard repulsion weighting.
    pub hazard_falloff: HazardFalloff,
    /// Resource attraction weighting.
    pub resource_falloff: ResourceFalloff,
    /// Damage from overlapping hazards.
    pub hazard_damage: HazardDamage,
    /// Hazard detection range.
    pub hazard_sensing: HazardSensing,
    /// Fate of depleted resources.
    pub depleted_resources: DepletedResources,
    /// Whether agents steer away from crowding neighbours.
    pub neighbor_avoidance: bool,
    /// Distance within which an agent collects from resources after moving.
    pub collection_radius: f64,
}

impl VariantRules {
    /// Discrete-grid behaviour. Neighbour avoidance is switched off so runs
    /// can be compared against the continuous variant.
    #[must_use]
    pub const fn grid() -> Self {
        Self {
            hazard_falloff: HazardFalloff::EdgeDistance,
            resource_falloff: ResourceFalloff::Inverse,
            hazard_damage: HazardDamage::Cumulative,
            hazard_sensing: HazardSensing::ExtendedByReach,
            depleted_resources: DepletedResources::Remove,
            neighbor_avoidance: false,
            collection_radius: 0.0,
        }
    }

    /// Continuous-plane behaviour.
    #[must_use]
    pub const fn continuous() -> Self {
        Self {
            hazard_falloff: HazardFalloff::CenterDistance,
            resource_falloff: ResourceFalloff::InverseSqrt,
            hazard_damage: HazardDamage::FirstOnly,
            hazard_sensing: HazardSensing::SensingRadiusOnly,
            depleted_resources: DepletedResources::KeepInert,
            neighbor_avoidance: true,
            collection_radius: 0.5,
        }
    }

    /// Toggle neighbour avoidance.
    #[must_use]
    pub const fn with_neighbor_avoidance(mut self, enabled: bool) -> Self {
        self.neighbor_avoidance = enabled;
        self
    }

    /// Select the hazard damage mode.
    #[must_use]
    pub const fn with_hazard_damage(mut self, mode: HazardDamage) -> Self {
        self.hazard_damage = mode;
        self
    }
}
