//! Per-tick metrics collection.
//!
//! After every tick the simulation records model-level aggregates and a
//! snapshot of every living agent. Aggregates over empty sets use NaN
//! rather than failing.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::components::AgentId;
use crate::environment::Environment;
use crate::space::Space;

/// Model-level aggregates for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    /// Living agents.
    pub population: usize,
    /// Mean energy of living agents, 0 with no agents.
    pub mean_energy: f64,
    /// Resource units gathered by the agents still alive.
    pub total_resources_collected: u64,
    /// Resource units gathered by every agent that ever lived.
    pub lifetime_resources_collected: u64,
    /// Resources that still hold units.
    pub active_resources: usize,
    /// Living agents over the initial population, NaN if that was 0.
    pub survival_rate: f64,
    /// Mean distance from each agent to its nearest active resource.
    ///
    /// 0 with no agents, NaN when no resource is active.
    pub mean_distance_to_resource: f64,
}

impl ModelMetrics {
    /// Measure the current state of `env`.
    #[must_use]
    pub fn collect<S: Space>(
        env: &Environment<S>,
        initial_population: usize,
        lifetime_resources_collected: u64,
    ) -> Self {
        let population = env.agent_count();

        let mean_energy = if population == 0 {
            0.0
        } else {
            let total: i64 = env.agents().map(|a| i64::from(a.energy)).sum();
            total as f64 / population as f64
        };

        let total_resources_collected = env
            .agents()
            .map(|a| u64::from(a.resources_collected))
            .sum();

        let active_resources = env.active_resources().count();

        let survival_rate = if initial_population == 0 {
            f64::NAN
        } else {
            population as f64 / initial_population as f64
        };

        let mean_distance_to_resource = if population == 0 {
            0.0
        } else if active_resources == 0 {
            f64::NAN
        } else {
            let total: f64 = env
                .agents()
                .filter_map(|a| env.nearest_active_resource(a.position))
                .sum();
            total / population as f64
        };

        Self {
            population,
            mean_energy,
            total_resources_collected,
            lifetime_resources_collected,
            active_resources,
            survival_rate,
            mean_distance_to_resource,
        }
    }
}

/// Per-agent values recorded each tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AgentSnapshot {
    /// Agent id.
    pub id: AgentId,
    /// Energy at the end of the tick.
    pub energy: i32,
    /// Lifetime resource tally.
    pub resources_collected: u32,
}

/// Everything recorded for one tick.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickRecord {
    /// Tick number, starting at 1 for the first step.
    pub tick: u64,
    /// Model aggregates.
    pub model: ModelMetrics,
    /// Living agents in id order.
    pub agents: Vec<AgentSnapshot>,
}

impl TickRecord {
    /// Record the state of `env` after `tick`.
    #[must_use]
    pub fn capture<S: Space>(
        tick: u64,
        env: &Environment<S>,
        initial_population: usize,
        lifetime_resources_collected: u64,
    ) -> Self {
        Self {
            tick,
            model: ModelMetrics::collect(env, initial_population, lifetime_resources_collected),
            agents: env
                .agents()
                .map(|a| AgentSnapshot {
                    id: a.id,
                    energy: a.energy,
                    resources_collected: a.resources_collected,
                })
                .collect(),
        }
    }
}

/// Append-only log of tick records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MetricsHistory {
    records: Vec<TickRecord>,
}

impl MetricsHistory {
    /// Create an empty history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record.
    pub fn push(&mut self, record: TickRecord) {
        self.records.push(record);
    }

    /// All records in tick order.
    #[must_use]
    pub fn records(&self) -> &[TickRecord] {
        &self.records
    }

    /// The most recent record.
    #[must_use]
    pub fn latest(&self) -> Option<&TickRecord> {
        self.records.last()
    }

    /// Number of recorded ticks.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One model metric across all ticks.
    ///
    /// ```
    /// use unicell_core::metrics::MetricsHistory;
    ///
    /// let history = MetricsHistory::new();
    /// let population: Vec<usize> = history.series(|m| m.population);
    /// assert!(population.is_empty());
    /// ```
    pub fn series<T>(&self, metric: impl Fn(&ModelMetrics) -> T) -> Vec<T> {
        self.records.iter().map(|r| metric(&r.model)).collect()
    }

    /// Hash of every recorded value, floats by bit pattern.
    ///
    /// Two histories with the same fingerprint recorded the same numbers,
    /// NaN sentinels included.
    #[must_use]
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = DefaultHasher::new();
        self.records.len().hash(&mut hasher);
        for record in &self.records {
            record.tick.hash(&mut hasher);
            let m = &record.model;
            m.population.hash(&mut hasher);
            m.mean_energy.to_bits().hash(&mut hasher);
            m.total_resources_collected.hash(&mut hasher);
            m.lifetime_resources_collected.hash(&mut hasher);
            m.active_resources.hash(&mut hasher);
            m.survival_rate.to_bits().hash(&mut hasher);
            m.mean_distance_to_resource.to_bits().hash(&mut hasher);
            record.agents.hash(&mut hasher);
        }
        hasher.finish()
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::components::AgentParams;
    use crate::space::{Cell, Extent, GridSpace};

    fn params() -> AgentParams {
        AgentParams {
            sensing_radius: 15.0,
            movement_speed: 1.0,
            avoidance_threshold: 3.0,
        }
    }

    fn env() -> Environment<GridSpace> {
        Environment::new(Extent::new(100, 100, true))
    }

    #[test]
    fn test_empty_population_sentinels() {
        let mut env = env();
        env.spawn_resource(Cell::new(1, 1), 20);
        let m = ModelMetrics::collect(&env, 10, 0);
        assert_eq!(m.population, 0);
        assert_eq!(m.mean_energy, 0.0);
        assert_eq!(m.survival_rate, 0.0);
        assert_eq!(m.mean_distance_to_resource, 0.0);
        assert_eq!(m.active_resources, 1);
    }

    #[test]
    fn test_no_active_resources_is_nan() {
        let mut env = env();
        env.spawn_agent(Cell::new(0, 0), DVec2::X, 100, params());
        let m = ModelMetrics::collect(&env, 1, 0);
        assert!(m.mean_distance_to_resource.is_nan());
        assert_eq!(m.survival_rate, 1.0);
    }

    #[test]
    fn test_zero_initial_population_is_nan() {
        let m = ModelMetrics::collect(&env(), 0, 0);
        assert!(m.survival_rate.is_nan());
    }

    #[test]
    fn test_mean_energy_and_distance() {
        let mut env = env();
        let a = env.spawn_agent(Cell::new(0, 0), DVec2::X, 100, params());
        env.spawn_agent(Cell::new(10, 0), DVec2::X, 50, params());
        env.spawn_resource(Cell::new(4, 0), 20);
        env.agent_mut(a).unwrap().absorb(6);

        let m = ModelMetrics::collect(&env, 4, 9);
        assert_eq!(m.mean_energy, 78.0);
        assert_eq!(m.total_resources_collected, 6);
        assert_eq!(m.lifetime_resources_collected, 9);
        assert_eq!(m.survival_rate, 0.5);
        assert_eq!(m.mean_distance_to_resource, 5.0);
    }

    #[test]
    fn test_history_series_and_fingerprint() {
        let mut env = env();
        env.spawn_agent(Cell::new(0, 0), DVec2::X, 100, params());

        let mut a = MetricsHistory::new();
        let mut b = MetricsHistory::new();
        for tick in 1..=3 {
            a.push(TickRecord::capture(tick, &env, 1, 0));
            b.push(TickRecord::capture(tick, &env, 1, 0));
        }
        assert_eq!(a.series(|m| m.population), vec![1, 1, 1]);
        assert_eq!(a.latest().map(|r| r.tick), Some(3));
        // NaN distances still fingerprint identically
        assert_eq!(a.fingerprint(), b.fingerprint());

        b.push(TickRecord::capture(4, &env, 1, 0));
        assert_ne!(a.fingerprint(), b.fingerprint());
    }
}
