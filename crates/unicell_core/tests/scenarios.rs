//! Hand-built scenarios with outcomes that can be worked out on paper.

use glam::DVec2;
use unicell_core::prelude::*;
use unicell_test_utils::fixtures;
use unicell_test_utils::init_tracing;

#[test]
fn lone_agent_starves_at_tick_100() {
    init_tracing();
    let mut sim = fixtures::lone_agent(20, 20).unwrap();
    let id = sim.agents().next().unwrap().id;

    assert_eq!(sim.run(99), 99);
    let agent = sim.agent(id).unwrap();
    assert_eq!(agent.energy, 1);
    assert_eq!(agent.resources_collected, 0);

    let events = sim.step();
    assert_eq!(events.removed, vec![id]);
    assert_eq!(sim.tick(), 100);
    assert!(sim.is_extinct());
    assert!(matches!(sim.agent(id), Err(SimError::AgentNotFound(_))));

    let last = sim.history().latest().unwrap();
    assert_eq!(last.model.population, 0);
    assert_eq!(last.model.survival_rate, 0.0);
    assert_eq!(last.model.lifetime_resources_collected, 0);
}

#[test]
fn resource_under_agent_is_drained_in_four_ticks() {
    let mut sim = fixtures::agent_on_resource(20).unwrap();
    let id = sim.agents().next().unwrap().id;

    for tick in 1..=4 {
        let events = sim.step();
        assert_eq!(events.collected, 5, "tick {tick}");
    }

    let agent = sim.agent(id).unwrap();
    assert_eq!(agent.resources_collected, 20);
    assert_eq!(agent.energy, 100 + 20 - 4);
    // Grid rules sweep the empty resource away
    assert_eq!(sim.resources().count(), 0);

    let events = sim.step();
    assert_eq!(events.collected, 0);
    assert_eq!(sim.agent(id).unwrap().resources_collected, 20);
}

#[test]
fn hazard_field_kills_within_ten_ticks() {
    let mut sim = fixtures::hazard_field(10).unwrap();
    let executed = sim.run(50);
    assert!(executed <= 10, "took {executed} ticks");
    assert!(sim.is_extinct());

    let energies: Vec<i32> = sim
        .history()
        .records()
        .iter()
        .filter_map(|r| r.agents.first().map(|a| a.energy))
        .collect();
    assert_eq!(energies, vec![89, 78, 67, 56, 45, 34, 23, 12, 1]);
}

#[test]
fn grid_damage_is_cumulative() {
    let mut sim = fixtures::overlapping_hazards_grid(3, 4).unwrap();
    sim.spawn_agent(Cell::new(0, 0));
    let events = sim.step();
    assert_eq!(events.outcomes[0].damage, 7);
    assert_eq!(events.outcomes[0].energy, 100 - 7 - 1);
}

#[test]
fn continuous_damage_takes_first_hazard_only() {
    let mut sim = fixtures::overlapping_hazards_plane(3, 4).unwrap();
    sim.spawn_agent(DVec2::new(1.0, 1.0));
    let events = sim.step();
    assert_eq!(events.outcomes[0].damage, 3);
    assert_eq!(events.outcomes[0].energy, 100 - 3 - 1);
}

#[test]
fn damage_mode_is_a_rule_not_a_geometry() {
    let config = fixtures::empty_config(5, 5);
    let rules = VariantRules::continuous().with_hazard_damage(HazardDamage::Cumulative);
    let mut sim = ContinuousSimulation::with_rules(config, rules).unwrap();
    sim.spawn_hazard(DVec2::new(2.5, 2.5), 4.0, 3).unwrap();
    sim.spawn_hazard(DVec2::new(2.5, 2.5), 4.0, 4).unwrap();
    sim.spawn_agent(DVec2::new(1.0, 1.0));
    assert_eq!(sim.step().outcomes[0].damage, 7);
}

#[test]
fn continuous_keeps_depleted_resources_inert() {
    let config = fixtures::empty_config(10, 10).with_movement_speed(1e-6);
    let mut sim = ContinuousSimulation::new(config).unwrap();
    let id = sim.spawn_agent(DVec2::new(5.0, 5.0));
    let resource = sim.spawn_resource(DVec2::new(5.0, 5.0), 7);

    let first = sim.step();
    assert_eq!(first.collected, 5);
    let second = sim.step();
    assert_eq!(second.collected, 2);
    assert_eq!(second.depleted, vec![resource]);

    let third = sim.step();
    assert_eq!(third.collected, 0);
    assert_eq!(sim.resources().count(), 1);
    assert!(sim.resources().all(|r| r.is_depleted()));
    assert_eq!(sim.agent(id).unwrap().resources_collected, 7);

    let metrics = sim.history().latest().unwrap().model;
    assert_eq!(metrics.active_resources, 0);
    assert!(metrics.mean_distance_to_resource.is_nan());
}

#[test]
fn neighbours_push_each_other_apart_on_the_plane() {
    let mut sim = fixtures::crowded_pair().unwrap();
    let events = sim.step();
    for outcome in &events.outcomes {
        assert!(matches!(outcome.decision, Decision::AvoidNeighbors(_)));
    }

    let positions: Vec<DVec2> = sim.agents().map(|a| a.position).collect();
    let gap = sim.space().distance(positions[0], positions[1]);
    assert!(gap > 2.9, "agents only {gap} apart");
}

#[test]
fn neighbour_avoidance_switched_off_means_wandering() {
    let config = fixtures::empty_config(50, 50);
    let rules = VariantRules::continuous().with_neighbor_avoidance(false);
    let mut sim = ContinuousSimulation::with_rules(config, rules).unwrap();
    sim.spawn_agent_with_heading(DVec2::new(25.0, 25.0), DVec2::Y);
    sim.spawn_agent_with_heading(DVec2::new(26.0, 25.0), DVec2::Y);

    let events = sim.step();
    assert!(events
        .outcomes
        .iter()
        .all(|o| matches!(o.decision, Decision::Wander(_))));
}

#[test]
fn grid_agents_ignore_each_other() {
    let mut sim = GridSimulation::new(fixtures::empty_config(10, 10)).unwrap();
    sim.spawn_agent(Cell::new(4, 4));
    sim.spawn_agent(Cell::new(4, 4));
    let events = sim.step();
    assert_eq!(events.outcomes.len(), 2);
    assert!(events
        .outcomes
        .iter()
        .all(|o| matches!(o.decision, Decision::Wander(_))));
}

#[test]
fn agent_steers_toward_sensed_resource() {
    let mut sim = GridSimulation::new(fixtures::empty_config(30, 30)).unwrap();
    let id = sim.spawn_agent(Cell::new(10, 10));
    sim.spawn_resource(Cell::new(14, 10), 50);

    for _ in 0..4 {
        let events = sim.step();
        assert!(matches!(events.outcomes[0].decision, Decision::SeekResources(_)));
    }
    assert_eq!(sim.agent(id).unwrap().position, Cell::new(14, 10));
    assert_eq!(sim.agent(id).unwrap().resources_collected, 5);
}

#[test]
fn agent_flees_hazard_even_next_to_food() {
    let mut sim = GridSimulation::new(fixtures::empty_config(30, 30)).unwrap();
    sim.spawn_hazard(Cell::new(12, 10), 1.0, 5).unwrap();
    sim.spawn_resource(Cell::new(11, 10), 50);
    let id = sim.spawn_agent(Cell::new(10, 10));

    let events = sim.step();
    assert_eq!(
        events.outcomes[0].decision,
        Decision::AvoidHazards(DVec2::new(-1.0, 0.0))
    );
    assert_eq!(sim.agent(id).unwrap().position, Cell::new(9, 10));
}

#[test]
fn bounded_grid_clamps_at_edges() {
    let config = fixtures::empty_config(10, 10).with_torus(false);
    let mut sim = GridSimulation::new(config).unwrap();
    let id = sim.spawn_agent(Cell::new(0, 0));
    sim.spawn_hazard(Cell::new(3, 3), 1.0, 1).unwrap();

    for _ in 0..5 {
        sim.step();
        let pos = sim.agent(id).unwrap().position;
        assert!((0..10).contains(&pos.x) && (0..10).contains(&pos.y));
    }
    assert_eq!(sim.agent(id).unwrap().position, Cell::new(0, 0));
}

#[test]
fn extreme_speed_grid_steps_cleanly() {
    for torus in [true, false] {
        let config = fixtures::empty_config(10, 10)
            .with_torus(torus)
            .with_movement_speed(1e10);
        let mut sim = GridSimulation::new(config).unwrap();
        let id = sim.spawn_agent(Cell::new(5, 5));
        sim.step();

        let pos = sim.agent(id).unwrap().position;
        assert!((0..10).contains(&pos.x) && (0..10).contains(&pos.y));
    }
}

#[test]
fn very_wide_grid_senses_across_the_seam() {
    let config = fixtures::empty_config(i32::MAX as u32, 4).with_sensing_radius(1.5e9);
    let mut sim = GridSimulation::new(config).unwrap();
    let id = sim.spawn_agent(Cell::new(5, 2));
    sim.spawn_resource(Cell::new(2_000_000_000, 2), 50);

    let events = sim.step();
    assert_eq!(
        events.outcomes[0].decision,
        Decision::SeekResources(DVec2::new(-1.0, 0.0))
    );
    assert_eq!(sim.agent(id).unwrap().position, Cell::new(4, 2));
}

#[test]
fn baseline_config_file_loads() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/baseline.ron");
    let config = SimConfig::load(path).unwrap();
    assert_eq!(config, SimConfig::default());

    let small = concat!(env!("CARGO_MANIFEST_DIR"), "/configs/small_plane.ron");
    let config = SimConfig::load(small).unwrap();
    let mut sim = ContinuousSimulation::new(config).unwrap();
    assert_eq!(sim.population(), 10);
    sim.run(20);
    assert_eq!(sim.history().len() as u64, sim.tick());
}
