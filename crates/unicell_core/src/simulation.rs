//! Core simulation loop.
//!
//! A [`Simulation`] owns the environment, the single seeded RNG and the
//! metrics history. Each tick steps every living agent once in a freshly
//! shuffled order, then records metrics.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use glam::DVec2;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::components::{Agent, AgentId, Hazard, HazardId, Resource, ResourceId};
use crate::config::SimConfig;
use crate::environment::Environment;
use crate::error::{Result, SimError};
use crate::metrics::{MetricsHistory, ModelMetrics, TickRecord};
use crate::rules::VariantRules;
use crate::space::{ContinuousSpace, GridSpace, Space};
use crate::systems::{self, StepOutcome};

/// Simulation on the discrete grid.
pub type GridSimulation = Simulation<GridSpace>;

/// Simulation on the continuous plane.
pub type ContinuousSimulation = Simulation<ContinuousSpace>;

/// Events generated during a simulation tick.
#[derive(Debug, Clone, Default)]
pub struct TickEvents {
    /// Tick number just completed.
    pub tick: u64,
    /// Per-agent outcomes in the order agents stepped.
    pub outcomes: Vec<StepOutcome>,
    /// Agents removed this tick.
    pub removed: Vec<AgentId>,
    /// Resources used up this tick.
    pub depleted: Vec<ResourceId>,
    /// Resource units gathered this tick.
    pub collected: u64,
}

/// The foraging simulation.
///
/// # Tick Order
///
/// 1. Snapshot the sorted ids of living agents and shuffle them
/// 2. Step each agent still present (sense, decide, move, interact,
///    metabolise, remove when exhausted)
/// 3. Advance the tick counter and record metrics
///
/// All randomness, including placement, comes from one `ChaCha8Rng`
/// seeded from [`SimConfig::seed`].
#[derive(Debug, Clone)]
pub struct Simulation<S: Space> {
    /// Current simulation tick.
    tick: u64,
    config: SimConfig,
    rules: VariantRules,
    env: Environment<S>,
    rng: ChaCha8Rng,
    /// Agents placed at construction plus any spawned since.
    initial_population: usize,
    /// Units gathered by all agents, removed ones included.
    lifetime_collected: u64,
    history: MetricsHistory,
}

impl<S: Space> Simulation<S> {
    /// Create a simulation with the default rules of `S`.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if the configuration is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use unicell_core::config::SimConfig;
    /// use unicell_core::simulation::GridSimulation;
    ///
    /// let mut sim = GridSimulation::new(SimConfig::default().with_seed(7)).unwrap();
    /// sim.step();
    /// assert_eq!(sim.tick(), 1);
    /// assert_eq!(sim.history().len(), 1);
    /// ```
    pub fn new(config: SimConfig) -> Result<Self> {
        Self::with_rules(config, S::default_rules())
    }

    /// Create a simulation with explicit variant rules.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if the configuration or the rules
    /// are invalid.
    pub fn with_rules(config: SimConfig, rules: VariantRules) -> Result<Self> {
        config.validate()?;
        if !rules.collection_radius.is_finite() || rules.collection_radius < 0.0 {
            return Err(SimError::invalid(
                "collection_radius",
                format!("must be finite and >= 0, got {}", rules.collection_radius),
            ));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(config.seed);
        let mut env = Environment::<S>::new(config.extent());
        let params = config.agent_params();

        for _ in 0..config.population_size {
            let position = env.space().random_position(&mut rng);
            let heading = env.space().random_heading(&mut rng);
            env.spawn_agent(position, heading, config.initial_energy, params);
        }

        for _ in 0..config.num_resources {
            let position = env.space().random_position(&mut rng);
            let amount = rng.gen_range(config.resource_amount.min..=config.resource_amount.max);
            env.spawn_resource(position, amount);
        }

        for _ in 0..config.num_hazards {
            let position = env.space().random_position(&mut rng);
            let radius = rng.gen_range(config.hazard_radius.min..=config.hazard_radius.max);
            let damage = rng.gen_range(config.hazard_damage.min..=config.hazard_damage.max);
            env.spawn_hazard(position, f64::from(radius), damage);
        }

        tracing::info!(
            space = S::NAME,
            population = config.population_size,
            resources = config.num_resources,
            hazards = config.num_hazards,
            seed = config.seed,
            "Simulation initialised"
        );

        Ok(Self {
            tick: 0,
            initial_population: config.population_size,
            config,
            rules,
            env,
            rng,
            lifetime_collected: 0,
            history: MetricsHistory::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Ticks completed so far.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.tick
    }

    /// Construction parameters.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Variant rules in effect.
    #[must_use]
    pub const fn rules(&self) -> &VariantRules {
        &self.rules
    }

    /// The environment, for renderers and analysis.
    #[must_use]
    pub const fn environment(&self) -> &Environment<S> {
        &self.env
    }

    /// The underlying space.
    #[must_use]
    pub fn space(&self) -> &S {
        self.env.space()
    }

    /// Recorded metrics, one record per completed tick.
    #[must_use]
    pub const fn history(&self) -> &MetricsHistory {
        &self.history
    }

    /// Number of living agents.
    #[must_use]
    pub fn population(&self) -> usize {
        self.env.agent_count()
    }

    /// Whether every agent has been removed.
    #[must_use]
    pub fn is_extinct(&self) -> bool {
        self.env.agent_count() == 0
    }

    /// Agents placed at construction plus any spawned since.
    #[must_use]
    pub const fn initial_population(&self) -> usize {
        self.initial_population
    }

    /// Units gathered by every agent so far, removed ones included.
    #[must_use]
    pub const fn lifetime_resources_collected(&self) -> u64 {
        self.lifetime_collected
    }

    /// Look up a living agent.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::AgentNotFound`] once the agent has been removed.
    pub fn agent(&self, id: AgentId) -> Result<&Agent<S::Pos>> {
        self.env.agent(id).ok_or(SimError::AgentNotFound(id))
    }

    /// Living agents in id order.
    pub fn agents(&self) -> impl Iterator<Item = &Agent<S::Pos>> {
        self.env.agents()
    }

    /// Resources in id order.
    pub fn resources(&self) -> impl Iterator<Item = &Resource<S::Pos>> {
        self.env.resources()
    }

    /// Hazards in id order.
    pub fn hazards(&self) -> impl Iterator<Item = &Hazard<S::Pos>> {
        self.env.hazards()
    }

    /// Metrics for the current state, including before the first tick.
    #[must_use]
    pub fn current_metrics(&self) -> ModelMetrics {
        ModelMetrics::collect(&self.env, self.initial_population, self.lifetime_collected)
    }

    // ========================================================================
    // Scenario hooks
    // ========================================================================

    /// Place an agent with a random heading and the configured energy.
    ///
    /// The agent counts toward the initial population.
    pub fn spawn_agent(&mut self, position: S::Pos) -> AgentId {
        let heading = self.env.space().random_heading(&mut self.rng);
        self.spawn_agent_with_heading(position, heading)
    }

    /// Place an agent moving along `heading`.
    pub fn spawn_agent_with_heading(&mut self, position: S::Pos, heading: DVec2) -> AgentId {
        self.initial_population += 1;
        self.env.spawn_agent(
            position,
            heading,
            self.config.initial_energy,
            self.config.agent_params(),
        )
    }

    /// Place a resource holding `amount` units.
    pub fn spawn_resource(&mut self, position: S::Pos, amount: u32) -> ResourceId {
        self.env.spawn_resource(position, amount)
    }

    /// Place a hazard.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::InvalidConfig`] if `radius` is negative or not
    /// finite.
    pub fn spawn_hazard(
        &mut self,
        position: S::Pos,
        radius: f64,
        damage: i32,
    ) -> Result<HazardId> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SimError::invalid(
                "hazard_radius",
                format!("must be finite and >= 0, got {radius}"),
            ));
        }
        Ok(self.env.spawn_hazard(position, radius, damage))
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance the simulation by exactly one tick.
    ///
    /// A tick with no agents still advances the counter and records
    /// metrics.
    pub fn step(&mut self) -> TickEvents {
        let mut events = TickEvents::default();

        let mut order = self.env.agent_ids();
        order.shuffle(&mut self.rng);

        for id in order {
            let Some(outcome) =
                systems::step_agent(&mut self.env, id, &self.config, &self.rules, &mut self.rng)
            else {
                continue;
            };
            events.collected += u64::from(outcome.collected);
            events.depleted.extend_from_slice(&outcome.depleted);
            if !outcome.survived {
                events.removed.push(id);
            }
            events.outcomes.push(outcome);
        }

        self.lifetime_collected += events.collected;
        self.tick += 1;
        events.tick = self.tick;

        self.history.push(TickRecord::capture(
            self.tick,
            &self.env,
            self.initial_population,
            self.lifetime_collected,
        ));

        #[cfg(debug_assertions)]
        {
            let hash = self.state_hash();
            tracing::debug!(tick = self.tick, state_hash = hash, "Simulation state hash");
        }

        events
    }

    /// Step up to `ticks` times, stopping early once the population is
    /// extinct. Returns the number of ticks executed.
    pub fn run(&mut self, ticks: u64) -> u64 {
        let mut executed = 0;
        while executed < ticks && !self.is_extinct() {
            self.step();
            executed += 1;
        }
        if self.is_extinct() {
            tracing::info!(tick = self.tick, "Population extinct");
        }
        executed
    }

    /// Hash of the tick counter and all entity state in id order.
    ///
    /// Two simulations with identical state produce identical hashes.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        let space = self.env.space();

        self.tick.hash(&mut hasher);

        self.env.agent_count().hash(&mut hasher);
        for agent in self.env.agents() {
            agent.id.hash(&mut hasher);
            hash_point(space.point(agent.position), &mut hasher);
            hash_point(agent.heading, &mut hasher);
            agent.energy.hash(&mut hasher);
            agent.resources_collected.hash(&mut hasher);
        }

        for resource in self.env.resources() {
            resource.id.hash(&mut hasher);
            hash_point(space.point(resource.position), &mut hasher);
            resource.amount().hash(&mut hasher);
        }

        for hazard in self.env.hazards() {
            hazard.id.hash(&mut hasher);
            hash_point(space.point(hazard.position), &mut hasher);
            hazard.radius.to_bits().hash(&mut hasher);
            hazard.damage.hash(&mut hasher);
        }

        hasher.finish()
    }
}

fn hash_point<H: Hasher>(p: DVec2, hasher: &mut H) {
    p.x.to_bits().hash(hasher);
    p.y.to_bits().hash(hasher);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::Cell;

    #[test]
    fn test_construction_places_entities() {
        let sim = GridSimulation::new(SimConfig::default()).unwrap();
        assert_eq!(sim.population(), 50);
        assert_eq!(sim.resources().count(), 30);
        assert_eq!(sim.hazards().count(), 5);
        assert_eq!(sim.tick(), 0);
        assert!(sim.history().is_empty());

        for r in sim.resources() {
            assert!((20..=100).contains(&r.amount()));
        }
        for h in sim.hazards() {
            assert!((1.0..=4.0).contains(&h.radius));
            assert!((2..=10).contains(&h.damage));
        }
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = ContinuousSimulation::new(SimConfig::default().with_size(0, 10));
        assert!(matches!(result, Err(SimError::InvalidConfig { field: "width", .. })));
    }

    #[test]
    fn test_negative_collection_radius_rejected() {
        let mut rules = VariantRules::continuous();
        rules.collection_radius = -1.0;
        assert!(ContinuousSimulation::with_rules(SimConfig::default(), rules).is_err());
    }

    #[test]
    fn test_step_records_history() {
        let mut sim = GridSimulation::new(SimConfig::default()).unwrap();
        let events = sim.step();
        assert_eq!(events.tick, 1);
        assert_eq!(events.outcomes.len(), 50);
        assert_eq!(sim.history().len(), 1);
        let record = sim.history().latest().unwrap();
        assert_eq!(record.agents.len(), sim.population());
        assert_eq!(record.model.population, sim.population());
    }

    #[test]
    fn test_empty_world_still_ticks() {
        let mut sim = GridSimulation::new(SimConfig::empty(10, 10)).unwrap();
        sim.step();
        assert_eq!(sim.tick(), 1);
        let m = sim.history().latest().unwrap().model;
        assert_eq!(m.population, 0);
        assert!(m.survival_rate.is_nan());
        assert_eq!(sim.run(10), 0);
    }

    #[test]
    fn test_same_seed_same_hash() {
        let config = SimConfig::default().with_seed(99);
        let mut a = ContinuousSimulation::new(config.clone()).unwrap();
        let mut b = ContinuousSimulation::new(config).unwrap();
        assert_eq!(a.state_hash(), b.state_hash());
        a.run(25);
        b.run(25);
        assert_eq!(a.state_hash(), b.state_hash());
    }

    #[test]
    fn test_spawned_agents_count_toward_initial_population() {
        let mut sim = GridSimulation::new(SimConfig::empty(10, 10)).unwrap();
        let id = sim.spawn_agent(Cell::new(2, 2));
        assert_eq!(sim.initial_population(), 1);
        assert_eq!(sim.agent(id).unwrap().energy, 100);
        assert!(sim.spawn_hazard(Cell::new(0, 0), f64::NAN, 3).is_err());
    }

    #[test]
    fn test_removed_agent_lookup_fails() {
        let mut sim = GridSimulation::new(SimConfig::empty(5, 5)).unwrap();
        let id = sim.spawn_agent(Cell::new(2, 2));
        let executed = sim.run(500);
        assert_eq!(executed, 100);
        assert!(matches!(sim.agent(id), Err(SimError::AgentNotFound(gone)) if gone == id));
    }
}
