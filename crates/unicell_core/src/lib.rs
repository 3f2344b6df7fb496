//! # Unicell Core
//!
//! Deterministic simulation of unicellular agents foraging for resources
//! and avoiding hazards in a bounded 2D environment.
//!
//! The same agent pipeline runs on two interchangeable representations:
//! - a discrete grid with 8-connected moves and Chebyshev distance
//! - a continuous plane with free headings and Euclidean distance
//!
//! Given the same configuration and seed, a run is reproducible tick for
//! tick. Nothing here performs IO except loading configuration files, and
//! all randomness comes from one seeded generator per simulation.
//!
//! ## Crate Structure
//!
//! - [`space`] - Grid and continuous geometry behind the [`space::Space`] trait
//! - [`environment`] - Entity storage, spatial queries, interactions
//! - [`policy`] - Prioritised steering decisions
//! - [`systems`] - Per-agent step lifecycle
//! - [`simulation`] - Seeded tick loop and metrics history
//! - [`rules`] - Behavioural differences between the two variants

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod components;
pub mod config;
pub mod environment;
pub mod error;
pub mod math;
pub mod metrics;
pub mod policy;
pub mod rules;
pub mod simulation;
pub mod space;
pub mod systems;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::components::*;
    pub use crate::config::{RandomWalk, SimConfig, Span};
    pub use crate::environment::Environment;
    pub use crate::error::{Result, SimError};
    pub use crate::metrics::{AgentSnapshot, MetricsHistory, ModelMetrics, TickRecord};
    pub use crate::policy::{Decision, Perception, Stimulus};
    pub use crate::rules::{
        DepletedResources, HazardDamage, HazardFalloff, HazardSensing, ResourceFalloff,
        VariantRules,
    };
    pub use crate::simulation::{ContinuousSimulation, GridSimulation, Simulation, TickEvents};
    pub use crate::space::{Cell, ContinuousSpace, Extent, GridSpace, Space};
    pub use crate::systems::StepOutcome;
}
