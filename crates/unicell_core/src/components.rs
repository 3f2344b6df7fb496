//! Entity definitions.
//!
//! Agents, resources and hazards are plain data owned by the
//! [`Environment`](crate::environment::Environment). The spatial index never
//! holds entities directly, only [`EnvironmentOccupant`] tags.

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub u64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

entity_id!(
    /// Unique identifier for agents.
    AgentId,
    "agent"
);
entity_id!(
    /// Unique identifier for resources.
    ResourceId,
    "resource"
);
entity_id!(
    /// Unique identifier for hazards.
    HazardId,
    "hazard"
);

/// Anything that can occupy a location in a space.
///
/// Spatial queries return these tags; callers dispatch on the variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnvironmentOccupant {
    /// A living agent.
    Agent(AgentId),
    /// A resource patch (possibly depleted under inert-resource rules).
    Resource(ResourceId),
    /// A stationary hazard.
    Hazard(HazardId),
}

// ============================================================================
// Agent
// ============================================================================

/// Per-agent behavioural parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AgentParams {
    /// Detection range for resources and hazards.
    pub sensing_radius: f64,
    /// Distance moved per tick.
    pub movement_speed: f64,
    /// Range at which other agents are repelled (continuous variant).
    pub avoidance_threshold: f64,
}

/// A foraging agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent<P> {
    /// Unique identifier.
    pub id: AgentId,
    /// Current location.
    pub position: P,
    /// Last movement direction. Compass offset on the grid, unit vector on
    /// the plane.
    pub heading: DVec2,
    /// Remaining energy; the agent is removed once this reaches zero.
    pub energy: i32,
    /// Total resource units gathered over the agent's life.
    pub resources_collected: u32,
    /// Behavioural parameters.
    pub params: AgentParams,
}

impl<P> Agent<P> {
    /// Create an agent with full energy.
    #[must_use]
    pub fn new(id: AgentId, position: P, heading: DVec2, energy: i32, params: AgentParams) -> Self {
        Self {
            id,
            position,
            heading,
            energy,
            resources_collected: 0,
            params,
        }
    }

    /// Whether the agent still has energy left.
    #[must_use]
    pub const fn is_alive(&self) -> bool {
        self.energy > 0
    }

    /// Credit collected resource units to both energy and the tally.
    pub fn absorb(&mut self, collected: u32) {
        self.energy = self.energy.saturating_add_unsigned(collected);
        self.resources_collected = self.resources_collected.saturating_add(collected);
    }

    /// Subtract energy (hazard damage or the per-tick cost).
    pub fn drain(&mut self, amount: i32) {
        self.energy = self.energy.saturating_sub(amount);
    }
}

// ============================================================================
// Resource
// ============================================================================

/// A depletable resource patch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource<P> {
    /// Unique identifier.
    pub id: ResourceId,
    /// Location of the patch.
    pub position: P,
    /// Units remaining.
    amount: u32,
    /// Units at creation.
    initial_amount: u32,
}

impl<P> Resource<P> {
    /// Create a resource holding `amount` units.
    #[must_use]
    pub const fn new(id: ResourceId, position: P, amount: u32) -> Self {
        Self {
            id,
            position,
            amount,
            initial_amount: amount,
        }
    }

    /// Units remaining.
    #[must_use]
    pub const fn amount(&self) -> u32 {
        self.amount
    }

    /// Units at creation.
    #[must_use]
    pub const fn initial_amount(&self) -> u32 {
        self.initial_amount
    }

    /// Check if this resource is used up.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.amount == 0
    }

    /// Take up to `requested` units.
    ///
    /// Returns the amount actually taken, which is 0 once depleted.
    pub fn collect(&mut self, requested: u32) -> u32 {
        let collected = requested.min(self.amount);
        self.amount -= collected;
        collected
    }
}

// ============================================================================
// Hazard
// ============================================================================

/// A stationary area that damages agents inside its radius.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hazard<P> {
    /// Unique identifier.
    pub id: HazardId,
    /// Centre of the hazard.
    pub position: P,
    /// Range of the damage effect.
    pub radius: f64,
    /// Energy removed per tick from each agent inside the radius.
    pub damage: i32,
}

impl<P> Hazard<P> {
    /// Create a hazard.
    #[must_use]
    pub const fn new(id: HazardId, position: P, radius: f64, damage: i32) -> Self {
        Self {
            id,
            position,
            radius,
            damage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> AgentParams {
        AgentParams {
            sensing_radius: 15.0,
            movement_speed: 1.0,
            avoidance_threshold: 3.0,
        }
    }

    #[test]
    fn test_resource_collect_caps_at_remaining() {
        let mut resource = Resource::new(ResourceId(1), (0, 0), 7);
        assert_eq!(resource.collect(5), 5);
        assert_eq!(resource.collect(5), 2);
        assert!(resource.is_depleted());
        assert_eq!(resource.initial_amount(), 7);
    }

    #[test]
    fn test_depleted_resource_yields_nothing() {
        let mut resource = Resource::new(ResourceId(1), (0, 0), 5);
        resource.collect(5);
        for _ in 0..3 {
            assert_eq!(resource.collect(5), 0);
            assert_eq!(resource.amount(), 0);
        }
    }

    #[test]
    fn test_agent_absorb_and_drain() {
        let mut agent = Agent::new(AgentId(1), (0, 0), DVec2::X, 100, params());
        agent.absorb(5);
        assert_eq!(agent.energy, 105);
        assert_eq!(agent.resources_collected, 5);

        agent.drain(105);
        assert!(!agent.is_alive());
    }

    #[test]
    fn test_id_display() {
        assert_eq!(AgentId(3).to_string(), "agent#3");
        assert_eq!(ResourceId(4).to_string(), "resource#4");
        assert_eq!(HazardId(5).to_string(), "hazard#5");
    }

    #[test]
    fn test_occupant_ordering_is_stable() {
        let mut tags = vec![
            EnvironmentOccupant::Hazard(HazardId(1)),
            EnvironmentOccupant::Agent(AgentId(2)),
            EnvironmentOccupant::Resource(ResourceId(1)),
            EnvironmentOccupant::Agent(AgentId(1)),
        ];
        tags.sort();
        assert_eq!(tags[0], EnvironmentOccupant::Agent(AgentId(1)));
        assert_eq!(tags[3], EnvironmentOccupant::Hazard(HazardId(1)));
    }
}
