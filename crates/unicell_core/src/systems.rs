//! Per-agent step logic.
//!
//! One call to [`step_agent`] runs the whole lifecycle of a living agent for
//! a tick: sense, decide, move, interact, metabolise, and removal once
//! energy runs out. Effects are applied to the environment immediately, so
//! agents stepped later in the same tick see them.

use rand::Rng;

use crate::components::{Agent, AgentId, ResourceId};
use crate::config::SimConfig;
use crate::environment::Environment;
use crate::policy::{decide, Decision, Perception, Stimulus};
use crate::rules::{HazardSensing, VariantRules};
use crate::space::Space;

/// What happened to one agent during its step.
#[derive(Debug, Clone, PartialEq)]
pub struct StepOutcome {
    /// The agent that stepped.
    pub agent: AgentId,
    /// Steering tier and heading chosen.
    pub decision: Decision,
    /// Resource units gathered this step.
    pub collected: u32,
    /// Resources this agent used up.
    pub depleted: Vec<ResourceId>,
    /// Hazard damage taken this step.
    pub damage: i32,
    /// Energy left after the step.
    pub energy: i32,
    /// Whether the agent is still in the environment.
    pub survived: bool,
}

/// Gather what `agent` can sense from its current position.
#[must_use]
pub fn sense<S: Space>(
    env: &Environment<S>,
    agent: &Agent<S::Pos>,
    rules: &VariantRules,
    config: &SimConfig,
) -> Perception {
    let space = env.space();
    let here = agent.position;
    let sensing = agent.params.sensing_radius;

    let stimulus = |target: S::Pos, radius: f64| Stimulus {
        direction: space.direction_to(here, target),
        offset: space.displacement(here, target),
        distance: space.distance(here, target),
        radius,
    };

    let hazards = match rules.hazard_sensing {
        HazardSensing::ExtendedByReach => {
            let reach = env.hazard_reach().max(config.max_hazard_radius);
            env.hazards_near(here, sensing + reach)
                .into_iter()
                .filter(|h| space.distance(here, h.position) <= sensing + h.radius)
                .map(|h| stimulus(h.position, h.radius))
                .collect()
        }
        HazardSensing::SensingRadiusOnly => env
            .hazards_near(here, sensing)
            .into_iter()
            .map(|h| stimulus(h.position, h.radius))
            .collect(),
    };

    let neighbors = if rules.neighbor_avoidance {
        env.agents_near(here, agent.params.avoidance_threshold, agent.id)
            .into_iter()
            .map(|other| stimulus(other.position, 0.0))
            .collect()
    } else {
        Vec::new()
    };

    let resources = env
        .resources_near(here, sensing)
        .into_iter()
        .map(|r| stimulus(r.position, 0.0))
        .collect();

    Perception {
        hazards,
        neighbors,
        resources,
    }
}

/// Run one tick of the agent lifecycle for `id`.
///
/// Returns `None` when the agent is no longer in the environment, which
/// happens when it was removed earlier in the same tick.
pub fn step_agent<S: Space, R: Rng + ?Sized>(
    env: &mut Environment<S>,
    id: AgentId,
    config: &SimConfig,
    rules: &VariantRules,
    rng: &mut R,
) -> Option<StepOutcome> {
    let agent = env.agent(id)?;
    let perception = sense(env, agent, rules, config);
    let decision = decide(
        env.space(),
        &perception,
        agent.heading,
        rules,
        &config.random_walk,
        rng,
    );
    let speed = agent.params.movement_speed;

    let position = env.move_agent(id, decision.heading(), speed)?;

    let collection = env.collect_for(
        id,
        rules.collection_radius,
        config.collect_per_tick,
        rules.depleted_resources,
    );
    for resource in &collection.depleted {
        tracing::trace!(agent = %id, resource = %resource, "Resource depleted");
    }

    let damage = env.hazard_damage_at(position, rules.hazard_damage);

    let agent = env.agent_mut(id)?;
    agent.drain(damage);
    agent.drain(config.metabolic_cost);
    let energy = agent.energy;
    let survived = agent.is_alive();

    if !survived {
        env.remove_agent(id);
        tracing::trace!(agent = %id, energy, "Agent removed");
    }

    Some(StepOutcome {
        agent: id,
        decision,
        collected: collection.total,
        depleted: collection.depleted,
        damage,
        energy,
        survived,
    })
}

#[cfg(test)]
mod tests {
    use glam::DVec2;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::*;
    use crate::components::AgentParams;
    use crate::space::{Cell, ContinuousSpace, GridSpace};

    fn config() -> SimConfig {
        SimConfig::empty(20, 20).with_sensing_radius(5.0)
    }

    fn params(config: &SimConfig) -> AgentParams {
        config.agent_params()
    }

    #[test]
    fn test_grid_hazard_sensed_by_damage_area() {
        let config = config();
        let mut env: Environment<GridSpace> = Environment::new(config.extent());
        let a = env.spawn_agent(Cell::new(0, 0), DVec2::X, 100, params(&config));
        // Centre 8 cells away but the damage area comes within 5
        env.spawn_hazard(Cell::new(8, 0), 4.0, 3);

        let grid_view = sense(&env, env.agent(a).unwrap(), &VariantRules::grid(), &config);
        assert_eq!(grid_view.hazards.len(), 1);
        assert_eq!(grid_view.hazards[0].direction, DVec2::new(1.0, 0.0));
        assert_eq!(grid_view.hazards[0].radius, 4.0);

        let plane_rules = VariantRules::continuous();
        let narrow = sense(&env, env.agent(a).unwrap(), &plane_rules, &config);
        assert!(narrow.hazards.is_empty());
    }

    #[test]
    fn test_depleted_resources_not_sensed() {
        let config = config();
        let mut env: Environment<ContinuousSpace> = Environment::new(config.extent());
        let a = env.spawn_agent(DVec2::new(5.0, 5.0), DVec2::X, 100, params(&config));
        env.spawn_resource(DVec2::new(7.0, 5.0), 0);
        env.spawn_resource(DVec2::new(9.0, 5.0), 10);

        let view = sense(&env, env.agent(a).unwrap(), &VariantRules::continuous(), &config);
        assert_eq!(view.resources.len(), 1);
        assert!((view.resources[0].distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_step_moves_toward_resource_and_pays_cost() {
        let config = config();
        let mut env: Environment<GridSpace> = Environment::new(config.extent());
        let a = env.spawn_agent(Cell::new(5, 5), DVec2::Y, 100, params(&config));
        env.spawn_resource(Cell::new(6, 6), 50);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let outcome = step_agent(&mut env, a, &config, &VariantRules::grid(), &mut rng).unwrap();
        assert_eq!(outcome.decision, Decision::SeekResources(DVec2::new(1.0, 1.0)));
        assert_eq!(outcome.collected, 5);
        assert_eq!(outcome.energy, 104);
        assert!(outcome.survived);
        assert_eq!(env.agent(a).unwrap().position, Cell::new(6, 6));
    }

    #[test]
    fn test_damage_applied_before_cost_and_agent_removed() {
        let config = config();
        let mut env: Environment<GridSpace> = Environment::new(config.extent());
        let a = env.spawn_agent(Cell::new(10, 10), DVec2::X, 5, params(&config));
        // Hazard covering the whole grid, so any move lands inside it
        env.spawn_hazard(Cell::new(10, 10), 20.0, 4);
        let mut rng = ChaCha8Rng::seed_from_u64(2);

        let outcome = step_agent(&mut env, a, &config, &VariantRules::grid(), &mut rng).unwrap();
        assert_eq!(outcome.damage, 4);
        assert_eq!(outcome.energy, 0);
        assert!(!outcome.survived);
        assert!(!env.contains_agent(a));
        assert!(step_agent(&mut env, a, &config, &VariantRules::grid(), &mut rng).is_none());
    }

    #[test]
    fn test_neighbors_only_sensed_with_avoidance() {
        let config = config();
        let mut env: Environment<ContinuousSpace> = Environment::new(config.extent());
        let a = env.spawn_agent(DVec2::new(5.0, 5.0), DVec2::X, 100, params(&config));
        env.spawn_agent(DVec2::new(6.0, 5.0), DVec2::X, 100, params(&config));
        env.spawn_agent(DVec2::new(15.0, 5.0), DVec2::X, 100, params(&config));

        let rules = VariantRules::continuous();
        let view = sense(&env, env.agent(a).unwrap(), &rules, &config);
        assert_eq!(view.neighbors.len(), 1);

        let view = sense(
            &env,
            env.agent(a).unwrap(),
            &rules.with_neighbor_avoidance(false),
            &config,
        );
        assert!(view.neighbors.is_empty());
    }
}
