//! Test fixtures and helpers.
//!
//! Pre-built simulations with hand-placed entities, for tests whose
//! expected outcome can be worked out by hand.

use glam::DVec2;
use unicell_core::config::SimConfig;
use unicell_core::error::Result;
use unicell_core::simulation::{ContinuousSimulation, GridSimulation};
use unicell_core::space::Cell;

/// Empty grid configuration with a fixed seed.
#[must_use]
pub fn empty_config(width: u32, height: u32) -> SimConfig {
    SimConfig::empty(width, height).with_seed(7)
}

/// One agent in the middle of an otherwise empty torus grid.
///
/// With the default energy and cost it is removed at tick 100.
pub fn lone_agent(width: u32, height: u32) -> Result<GridSimulation> {
    let mut sim = GridSimulation::new(empty_config(width, height))?;
    sim.spawn_agent(Cell::new((width / 2) as i32, (height / 2) as i32));
    Ok(sim)
}

/// One agent sitting on a resource of `amount` units in a 1x1 torus.
///
/// Every move wraps back onto the same cell, so the agent collects on
/// every tick until the resource is gone.
pub fn agent_on_resource(amount: u32) -> Result<GridSimulation> {
    let mut sim = GridSimulation::new(empty_config(1, 1))?;
    sim.spawn_agent(Cell::new(0, 0));
    sim.spawn_resource(Cell::new(0, 0), amount);
    Ok(sim)
}

/// One agent inside a 5x5 torus fully covered by a single hazard.
pub fn hazard_field(damage: i32) -> Result<GridSimulation> {
    let mut sim = GridSimulation::new(empty_config(5, 5))?;
    sim.spawn_hazard(Cell::new(2, 2), 2.0, damage)?;
    sim.spawn_agent(Cell::new(2, 2));
    Ok(sim)
}

/// Two overlapping hazards covering a 5x5 torus, for comparing damage
/// modes. The caller adds agents.
pub fn overlapping_hazards_grid(first: i32, second: i32) -> Result<GridSimulation> {
    let mut sim = GridSimulation::new(empty_config(5, 5))?;
    sim.spawn_hazard(Cell::new(2, 2), 2.0, first)?;
    sim.spawn_hazard(Cell::new(2, 2), 2.0, second)?;
    Ok(sim)
}

/// Same layout as [`overlapping_hazards_grid`] on a 5x5 plane.
///
/// Radius 4 reaches every point of the torus from the centre.
pub fn overlapping_hazards_plane(first: i32, second: i32) -> Result<ContinuousSimulation> {
    let mut sim = ContinuousSimulation::new(empty_config(5, 5))?;
    sim.spawn_hazard(DVec2::new(2.5, 2.5), 4.0, first)?;
    sim.spawn_hazard(DVec2::new(2.5, 2.5), 4.0, second)?;
    Ok(sim)
}

/// Two agents close together on an empty plane, heading the same way.
pub fn crowded_pair() -> Result<ContinuousSimulation> {
    let mut sim = ContinuousSimulation::new(empty_config(50, 50))?;
    sim.spawn_agent_with_heading(DVec2::new(25.0, 25.0), DVec2::Y);
    sim.spawn_agent_with_heading(DVec2::new(26.0, 25.0), DVec2::Y);
    Ok(sim)
}

/// Default-sized grid run with the given seed.
pub fn default_grid(seed: u64) -> Result<GridSimulation> {
    GridSimulation::new(SimConfig::default().with_seed(seed))
}

/// Default-sized continuous run with the given seed.
pub fn default_plane(seed: u64) -> Result<ContinuousSimulation> {
    ContinuousSimulation::new(SimConfig::default().with_seed(seed))
}
