//! Simulation configuration.
//!
//! Every construction parameter has a default. Configurations can be built
//! in code with the `with_*` helpers or loaded from RON files; either way
//! [`SimConfig::validate`] runs before a simulation is created.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::components::AgentParams;
use crate::error::{Result, SimError};
use crate::space::Extent;

/// Inclusive range of values drawn uniformly at placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span<T> {
    /// Smallest value.
    pub min: T,
    /// Largest value.
    pub max: T,
}

impl<T> Span<T> {
    /// Create a span.
    #[must_use]
    pub const fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
}

/// Fallback movement when no resource, hazard or neighbour is sensed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomWalk {
    /// Chance per tick that a grid agent picks a new compass direction.
    pub turn_probability: f64,
    /// Largest heading perturbation per tick on the plane, in radians.
    pub max_turn: f64,
}

impl Default for RandomWalk {
    fn default() -> Self {
        Self {
            turn_probability: 0.2,
            max_turn: 0.3,
        }
    }
}

/// Construction parameters for a simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Number of agents placed at start.
    pub population_size: usize,
    /// Environment width.
    pub width: u32,
    /// Environment height.
    pub height: u32,
    /// Whether the environment wraps at its edges.
    pub torus: bool,
    /// Number of resources placed at start.
    pub num_resources: usize,
    /// Number of hazards placed at start.
    pub num_hazards: usize,
    /// Agent detection range.
    pub sensing_radius: f64,
    /// Agent movement per tick.
    pub movement_speed: f64,
    /// Agent neighbour-repulsion range.
    pub avoidance_threshold: f64,
    /// Seed for the single simulation RNG.
    pub seed: u64,
    /// Energy each agent starts with.
    pub initial_energy: i32,
    /// Energy every agent loses per tick.
    pub metabolic_cost: i32,
    /// Most units an agent takes from one resource per tick.
    pub collect_per_tick: u32,
    /// Initial resource amounts.
    pub resource_amount: Span<u32>,
    /// Per-tick hazard damage.
    pub hazard_damage: Span<i32>,
    /// Hazard damage radii.
    pub hazard_radius: Span<u32>,
    /// Minimum extra search range when sensing hazards on the grid.
    pub max_hazard_radius: f64,
    /// Random-walk parameters.
    pub random_walk: RandomWalk,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            population_size: 50,
            width: 100,
            height: 100,
            torus: true,
            num_resources: 30,
            num_hazards: 5,
            sensing_radius: 15.0,
            movement_speed: 1.0,
            avoidance_threshold: 3.0,
            seed: 42,
            initial_energy: 100,
            metabolic_cost: 1,
            collect_per_tick: 5,
            resource_amount: Span::new(20, 100),
            hazard_damage: Span::new(2, 10),
            hazard_radius: Span::new(1, 4),
            max_hazard_radius: 5.0,
            random_walk: RandomWalk::default(),
        }
    }
}

impl SimConfig {
    /// An environment with nothing in it, for hand-built scenarios.
    #[must_use]
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            population_size: 0,
            width,
            height,
            num_resources: 0,
            num_hazards: 0,
            ..Default::default()
        }
    }

    /// Set the random seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Set the starting population.
    #[must_use]
    pub const fn with_population(mut self, population_size: usize) -> Self {
        self.population_size = population_size;
        self
    }

    /// Set the environment size.
    #[must_use]
    pub const fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Enable or disable wraparound.
    #[must_use]
    pub const fn with_torus(mut self, torus: bool) -> Self {
        self.torus = torus;
        self
    }

    /// Set the number of resources and hazards placed at start.
    #[must_use]
    pub const fn with_entities(mut self, num_resources: usize, num_hazards: usize) -> Self {
        self.num_resources = num_resources;
        self.num_hazards = num_hazards;
        self
    }

    /// Set the agent sensing radius.
    #[must_use]
    pub const fn with_sensing_radius(mut self, sensing_radius: f64) -> Self {
        self.sensing_radius = sensing_radius;
        self
    }

    /// Set the agent movement speed.
    #[must_use]
    pub const fn with_movement_speed(mut self, movement_speed: f64) -> Self {
        self.movement_speed = movement_speed;
        self
    }

    /// Set the neighbour-repulsion range.
    #[must_use]
    pub const fn with_avoidance_threshold(mut self, avoidance_threshold: f64) -> Self {
        self.avoidance_threshold = avoidance_threshold;
        self
    }

    /// Size and edge behaviour of the environment.
    #[must_use]
    pub const fn extent(&self) -> Extent {
        Extent::new(self.width, self.height, self.torus)
    }

    /// Parameters handed to every agent.
    #[must_use]
    pub const fn agent_params(&self) -> AgentParams {
        AgentParams {
            sensing_radius: self.sensing_radius,
            movement_speed: self.movement_speed,
            avoidance_threshold: self.avoidance_threshold,
        }
    }

    /// Check every parameter, failing on the first bad one.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 {
            return Err(SimError::invalid("width", "must be greater than 0"));
        }
        if self.height == 0 {
            return Err(SimError::invalid("height", "must be greater than 0"));
        }
        if self.width > i32::MAX as u32 || self.height > i32::MAX as u32 {
            return Err(SimError::invalid("width/height", "exceeds the i32 cell range"));
        }

        positive("sensing_radius", self.sensing_radius)?;
        positive("movement_speed", self.movement_speed)?;
        positive("avoidance_threshold", self.avoidance_threshold)?;
        if !self.max_hazard_radius.is_finite() || self.max_hazard_radius < 0.0 {
            return Err(SimError::invalid(
                "max_hazard_radius",
                format!("must be finite and >= 0, got {}", self.max_hazard_radius),
            ));
        }

        if self.initial_energy <= 0 {
            return Err(SimError::invalid(
                "initial_energy",
                format!("must be greater than 0, got {}", self.initial_energy),
            ));
        }
        if self.metabolic_cost < 0 {
            return Err(SimError::invalid(
                "metabolic_cost",
                format!("must be >= 0, got {}", self.metabolic_cost),
            ));
        }

        ordered("resource_amount", self.resource_amount)?;
        ordered("hazard_damage", self.hazard_damage)?;
        ordered("hazard_radius", self.hazard_radius)?;
        if self.hazard_damage.min < 0 {
            return Err(SimError::invalid("hazard_damage", "must be >= 0"));
        }
        if self.hazard_radius.min == 0 {
            return Err(SimError::invalid("hazard_radius", "must be greater than 0"));
        }

        let walk = &self.random_walk;
        if !(0.0..=1.0).contains(&walk.turn_probability) {
            return Err(SimError::invalid(
                "random_walk.turn_probability",
                format!("must be within [0, 1], got {}", walk.turn_probability),
            ));
        }
        if !walk.max_turn.is_finite() || walk.max_turn < 0.0 {
            return Err(SimError::invalid(
                "random_walk.max_turn",
                format!("must be finite and >= 0, got {}", walk.max_turn),
            ));
        }

        Ok(())
    }

    /// Load a configuration from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SimError::ConfigNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Parse a configuration from a RON string. Missing fields take their
    /// defaults.
    pub fn from_ron_str(ron: &str) -> Result<Self> {
        let config: SimConfig = ron::from_str(ron)?;
        Ok(config)
    }
}

fn positive(field: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(
            field,
            format!("must be finite and greater than 0, got {value}"),
        ))
    }
}

fn ordered<T: PartialOrd + std::fmt::Display>(field: &'static str, span: Span<T>) -> Result<()> {
    if span.min <= span.max {
        Ok(())
    } else {
        Err(SimError::invalid(
            field,
            format!("min {} is greater than max {}", span.min, span.max),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
        assert!(SimConfig::empty(1, 1).validate().is_ok());
    }

    #[test]
    fn test_zero_dimension_rejected() {
        let err = SimConfig::default().with_size(0, 10).validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { field: "width", .. }));

        let err = SimConfig::default().with_size(10, 0).validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { field: "height", .. }));
    }

    #[test]
    fn test_non_positive_radii_and_speed_rejected() {
        let err = SimConfig::default().with_sensing_radius(0.0).validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { field: "sensing_radius", .. }));

        let err = SimConfig::default().with_movement_speed(-1.0).validate().unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { field: "movement_speed", .. }));

        let err = SimConfig::default()
            .with_avoidance_threshold(f64::NAN)
            .validate()
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfig { field: "avoidance_threshold", .. }));
    }

    #[test]
    fn test_unordered_span_rejected() {
        let config = SimConfig {
            resource_amount: Span::new(100, 20),
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("resource_amount"));
    }

    #[test]
    fn test_turn_probability_bounds() {
        let mut config = SimConfig::default();
        config.random_walk.turn_probability = 1.5;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_ron_str_fills_defaults() {
        let config = SimConfig::from_ron_str("(population_size: 3, width: 20, height: 10, seed: 7)")
            .unwrap();
        assert_eq!(config.population_size, 3);
        assert_eq!(config.width, 20);
        assert_eq!(config.seed, 7);
        assert_eq!(config.num_resources, 30);
        assert_eq!(config.collect_per_tick, 5);
    }

    #[test]
    fn test_negative_count_fails_to_parse() {
        let err = SimConfig::from_ron_str("(population_size: -1)").unwrap_err();
        assert!(matches!(err, SimError::ConfigParse(_)));
    }

    #[test]
    fn test_ron_round_trip_of_defaults() {
        let text = ron::to_string(&SimConfig::default()).unwrap();
        let parsed = SimConfig::from_ron_str(&text).unwrap();
        assert_eq!(parsed, SimConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = SimConfig::load("/definitely/not/here.ron").unwrap_err();
        assert!(matches!(err, SimError::ConfigNotFound(_)));
    }
}
