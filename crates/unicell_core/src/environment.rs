//! Entity storage and spatial bookkeeping.
//!
//! The [`Environment`] exclusively owns every agent, resource and hazard,
//! keyed by id for deterministic iteration, and keeps the space's occupancy
//! index in step with entity positions. Agents only hold position values.

use std::collections::BTreeMap;

use glam::DVec2;

use crate::components::{
    Agent, AgentId, AgentParams, EnvironmentOccupant, Hazard, HazardId, Resource, ResourceId,
};
use crate::rules::{DepletedResources, HazardDamage};
use crate::space::{Extent, Space};

/// Result of collecting from every resource in reach.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Collection {
    /// Units gathered across all resources.
    pub total: u32,
    /// Resources that ran out during this collection.
    pub depleted: Vec<ResourceId>,
}

/// Owner of all entities and the spatial index.
#[derive(Debug, Clone)]
pub struct Environment<S: Space> {
    space: S,
    agents: BTreeMap<AgentId, Agent<S::Pos>>,
    resources: BTreeMap<ResourceId, Resource<S::Pos>>,
    hazards: BTreeMap<HazardId, Hazard<S::Pos>>,
    /// Largest hazard radius seen so far. Hazards never move or change.
    hazard_reach: f64,
    next_id: u64,
}

impl<S: Space> Environment<S> {
    /// Create an empty environment.
    #[must_use]
    pub fn new(extent: Extent) -> Self {
        Self {
            space: S::new(extent),
            agents: BTreeMap::new(),
            resources: BTreeMap::new(),
            hazards: BTreeMap::new(),
            hazard_reach: 0.0,
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The underlying space.
    #[must_use]
    pub fn space(&self) -> &S {
        &self.space
    }

    // ------------------------------------------------------------------------
    // Spawning and removal
    // ------------------------------------------------------------------------

    /// Add an agent and return its id.
    pub fn spawn_agent(
        &mut self,
        position: S::Pos,
        heading: DVec2,
        energy: i32,
        params: AgentParams,
    ) -> AgentId {
        let id = AgentId(self.allocate_id());
        self.space.insert(EnvironmentOccupant::Agent(id), position);
        self.agents
            .insert(id, Agent::new(id, position, heading, energy, params));
        id
    }

    /// Add a resource and return its id.
    pub fn spawn_resource(&mut self, position: S::Pos, amount: u32) -> ResourceId {
        let id = ResourceId(self.allocate_id());
        self.space.insert(EnvironmentOccupant::Resource(id), position);
        self.resources.insert(id, Resource::new(id, position, amount));
        id
    }

    /// Add a hazard and return its id.
    pub fn spawn_hazard(&mut self, position: S::Pos, radius: f64, damage: i32) -> HazardId {
        let id = HazardId(self.allocate_id());
        self.space.insert(EnvironmentOccupant::Hazard(id), position);
        self.hazards
            .insert(id, Hazard::new(id, position, radius, damage));
        self.hazard_reach = self.hazard_reach.max(radius);
        id
    }

    /// Take an agent out of the environment.
    pub fn remove_agent(&mut self, id: AgentId) -> Option<Agent<S::Pos>> {
        let agent = self.agents.remove(&id)?;
        self.space
            .remove(EnvironmentOccupant::Agent(id), agent.position);
        Some(agent)
    }

    /// Take a resource out of the environment.
    pub fn remove_resource(&mut self, id: ResourceId) -> Option<Resource<S::Pos>> {
        let resource = self.resources.remove(&id)?;
        self.space
            .remove(EnvironmentOccupant::Resource(id), resource.position);
        Some(resource)
    }

    // ------------------------------------------------------------------------
    // Read access
    // ------------------------------------------------------------------------

    /// Get an agent by id.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent<S::Pos>> {
        self.agents.get(&id)
    }

    /// Get a mutable reference to an agent.
    pub fn agent_mut(&mut self, id: AgentId) -> Option<&mut Agent<S::Pos>> {
        self.agents.get_mut(&id)
    }

    /// Check if an agent is still alive.
    #[must_use]
    pub fn contains_agent(&self, id: AgentId) -> bool {
        self.agents.contains_key(&id)
    }

    /// Live agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent<S::Pos>> {
        self.agents.values()
    }

    /// Sorted ids of live agents.
    #[must_use]
    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.agents.keys().copied().collect()
    }

    /// Number of live agents.
    #[must_use]
    pub fn agent_count(&self) -> usize {
        self.agents.len()
    }

    /// Get a resource by id.
    #[must_use]
    pub fn resource(&self, id: ResourceId) -> Option<&Resource<S::Pos>> {
        self.resources.get(&id)
    }

    /// Resources in id order, depleted ones included when they are kept.
    pub fn resources(&self) -> impl Iterator<Item = &Resource<S::Pos>> {
        self.resources.values()
    }

    /// Resources that still hold units.
    pub fn active_resources(&self) -> impl Iterator<Item = &Resource<S::Pos>> {
        self.resources.values().filter(|r| !r.is_depleted())
    }

    /// Get a hazard by id.
    #[must_use]
    pub fn hazard(&self, id: HazardId) -> Option<&Hazard<S::Pos>> {
        self.hazards.get(&id)
    }

    /// Hazards in id order.
    pub fn hazards(&self) -> impl Iterator<Item = &Hazard<S::Pos>> {
        self.hazards.values()
    }

    /// Largest hazard radius in the environment, 0 without hazards.
    #[must_use]
    pub fn hazard_reach(&self) -> f64 {
        self.hazard_reach
    }

    // ------------------------------------------------------------------------
    // Spatial queries
    // ------------------------------------------------------------------------

    /// Undepleted resources within `radius` of `center`.
    #[must_use]
    pub fn resources_near(&self, center: S::Pos, radius: f64) -> Vec<&Resource<S::Pos>> {
        self.space
            .neighborhood(center, radius, true)
            .into_iter()
            .filter_map(|occupant| match occupant {
                EnvironmentOccupant::Resource(id) => self.resources.get(&id),
                EnvironmentOccupant::Agent(_) | EnvironmentOccupant::Hazard(_) => None,
            })
            .filter(|r| !r.is_depleted() && self.space.distance(center, r.position) <= radius)
            .collect()
    }

    /// Hazards whose centre lies within `radius` of `center`.
    #[must_use]
    pub fn hazards_near(&self, center: S::Pos, radius: f64) -> Vec<&Hazard<S::Pos>> {
        self.space
            .neighborhood(center, radius, true)
            .into_iter()
            .filter_map(|occupant| match occupant {
                EnvironmentOccupant::Hazard(id) => self.hazards.get(&id),
                EnvironmentOccupant::Agent(_) | EnvironmentOccupant::Resource(_) => None,
            })
            .filter(|h| self.space.distance(center, h.position) <= radius)
            .collect()
    }

    /// Other agents within `radius` of `center`.
    #[must_use]
    pub fn agents_near(
        &self,
        center: S::Pos,
        radius: f64,
        exclude: AgentId,
    ) -> Vec<&Agent<S::Pos>> {
        self.space
            .neighborhood(center, radius, true)
            .into_iter()
            .filter_map(|occupant| match occupant {
                EnvironmentOccupant::Agent(id) if id != exclude => self.agents.get(&id),
                EnvironmentOccupant::Agent(_)
                | EnvironmentOccupant::Resource(_)
                | EnvironmentOccupant::Hazard(_) => None,
            })
            .filter(|a| self.space.distance(center, a.position) <= radius)
            .collect()
    }

    /// Distance from `pos` to the closest undepleted resource.
    #[must_use]
    pub fn nearest_active_resource(&self, pos: S::Pos) -> Option<f64> {
        self.active_resources()
            .map(|r| self.space.distance(pos, r.position))
            .min_by(f64::total_cmp)
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Move an agent `speed` along `heading`, recording the heading.
    ///
    /// Returns the new position, or `None` if the agent is gone.
    pub fn move_agent(&mut self, id: AgentId, heading: DVec2, speed: f64) -> Option<S::Pos> {
        let agent = self.agents.get_mut(&id)?;
        let from = agent.position;
        let to = self.space.advance(from, heading, speed);
        agent.heading = heading;
        agent.position = to;
        self.space.relocate(EnvironmentOccupant::Agent(id), from, to);
        Some(to)
    }

    /// Let an agent collect from every undepleted resource within `radius`
    /// of its position, taking at most `per_resource` units from each.
    ///
    /// Gathered units are credited to the agent.
    pub fn collect_for(
        &mut self,
        id: AgentId,
        radius: f64,
        per_resource: u32,
        depleted_rule: DepletedResources,
    ) -> Collection {
        let mut collection = Collection::default();
        let Some(position) = self.agents.get(&id).map(|a| a.position) else {
            return collection;
        };

        let in_reach: Vec<ResourceId> = self
            .resources_near(position, radius)
            .into_iter()
            .map(|r| r.id)
            .collect();

        for resource_id in in_reach {
            let Some(resource) = self.resources.get_mut(&resource_id) else {
                continue;
            };
            let taken = resource.collect(per_resource);
            collection.total += taken;
            if resource.is_depleted() {
                collection.depleted.push(resource_id);
                if depleted_rule == DepletedResources::Remove {
                    self.remove_resource(resource_id);
                }
            }
        }

        if let Some(agent) = self.agents.get_mut(&id) {
            agent.absorb(collection.total);
        }
        collection
    }

    /// Damage dealt this tick to an agent standing at `pos`.
    ///
    /// Hazards count when `pos` lies within their radius.
    #[must_use]
    pub fn hazard_damage_at(&self, pos: S::Pos, mode: HazardDamage) -> i32 {
        let mut covering: Vec<&Hazard<S::Pos>> = self
            .hazards_near(pos, self.hazard_reach)
            .into_iter()
            .filter(|h| self.space.distance(pos, h.position) <= h.radius)
            .collect();
        covering.sort_by_key(|h| h.id);

        match mode {
            HazardDamage::Cumulative => covering
                .iter()
                .fold(0i32, |acc, h| acc.saturating_add(h.damage)),
            HazardDamage::FirstOnly => covering.first().map_or(0, |h| h.damage),
        }
    }
}
