//! Determinism testing utilities.
//!
//! Provides a harness for verifying that the simulation
//! produces identical results given identical inputs.
//!
//! # Testing Strategy
//!
//! A run must be a pure function of its configuration and seed. Sources of
//! non-determinism include:
//!
//! - **HashMap iteration order**: Rust's default hasher is randomized.
//!   Entities live in id-keyed `BTreeMap`s and every tick starts from the
//!   sorted id list.
//!
//! - **Unseeded randomness**: Placement, shuffling and random walks all
//!   draw from the simulation's own `ChaCha8Rng`.
//!
//! - **Float comparison**: Hashes use `f64::to_bits`, so NaN sentinels in
//!   metrics compare equal to themselves.
//!
//! # Test Levels
//!
//! 1. **Unit tests**: Individual steps (decisions, collection, damage)
//! 2. **Property tests**: Random configurations still replay exactly
//! 3. **Integration tests**: Full scenarios are reproducible
//! 4. **Parallel tests**: Running N simulations on threads all match

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::thread;

use unicell_core::simulation::Simulation;
use unicell_core::space::Space;

/// Result of a determinism test.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeterminismResult {
    /// Whether all runs produced identical results.
    pub is_deterministic: bool,
    /// Hashes from each run.
    pub hashes: Vec<u64>,
    /// Number of ticks simulated.
    pub ticks: u64,
}

impl DeterminismResult {
    /// Get all unique hashes (should be 1 for deterministic simulation).
    #[must_use]
    pub fn unique_hashes(&self) -> Vec<u64> {
        let mut unique: Vec<u64> = self.hashes.clone();
        unique.sort_unstable();
        unique.dedup();
        unique
    }

    /// Assert that the simulation was deterministic, with a detailed error message.
    ///
    /// # Panics
    ///
    /// Panics if the simulation produced different hashes across runs.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic {
            let unique = self.unique_hashes();
            panic!(
                "Simulation is non-deterministic!\n\
                 Runs: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {} (expected 1)\n\
                 All hashes: {:?}",
                self.hashes.len(),
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run a simulation multiple times and verify determinism.
///
/// # Arguments
///
/// * `runs` - Number of times to run the simulation
/// * `ticks` - Number of ticks to simulate per run
/// * `setup` - Function to create initial simulation state
/// * `step` - Function to advance simulation by one tick
/// * `hash` - Function to compute state hash
///
/// # Example
///
/// ```
/// use unicell_core::config::SimConfig;
/// use unicell_core::simulation::GridSimulation;
/// use unicell_test_utils::determinism::verify_determinism;
///
/// let result = verify_determinism(
///     3,
///     20,
///     || GridSimulation::new(SimConfig::default().with_population(10)).unwrap(),
///     |sim| {
///         sim.step();
///     },
///     |sim| sim.state_hash(),
/// );
/// result.assert_deterministic();
/// ```
pub fn verify_determinism<T, Setup, Step, HashFn>(
    runs: usize,
    ticks: u64,
    setup: Setup,
    step: Step,
    hash: HashFn,
) -> DeterminismResult
where
    Setup: Fn() -> T,
    Step: Fn(&mut T),
    HashFn: Fn(&T) -> u64,
{
    let mut hashes = Vec::with_capacity(runs);

    for _ in 0..runs {
        let mut state = setup();

        for _ in 0..ticks {
            step(&mut state);
        }

        hashes.push(hash(&state));
    }

    let is_deterministic = hashes.windows(2).all(|w| w[0] == w[1]);

    DeterminismResult {
        is_deterministic,
        hashes,
        ticks,
    }
}

/// Run a [`Simulation`] several times and compare both the final state
/// and the whole metrics history.
pub fn verify_simulation_determinism<S, F>(
    setup_fn: F,
    runs: usize,
    num_ticks: u64,
) -> DeterminismResult
where
    S: Space,
    F: Fn() -> Simulation<S>,
{
    verify_determinism(
        runs,
        num_ticks,
        setup_fn,
        |sim| {
            sim.step();
        },
        |sim| compute_hash(&(sim.state_hash(), sim.history().fingerprint())),
    )
}

/// Result of parallel simulation runs.
#[derive(Debug, Clone)]
pub struct ParallelSimResult {
    /// Final state hash from each simulation.
    pub hashes: Vec<u64>,
    /// Number of ticks each simulation ran.
    pub ticks: u64,
    /// Number of simulations run.
    pub num_sims: usize,
}

impl ParallelSimResult {
    /// Check if all simulations produced identical results.
    #[must_use]
    pub fn is_deterministic(&self) -> bool {
        self.hashes.windows(2).all(|w| w[0] == w[1])
    }

    /// Assert all simulations matched.
    ///
    /// # Panics
    ///
    /// Panics if simulations produced different hashes.
    pub fn assert_deterministic(&self) {
        if !self.is_deterministic() {
            let mut unique: Vec<u64> = self.hashes.clone();
            unique.sort_unstable();
            unique.dedup();
            panic!(
                "Parallel simulations diverged!\n\
                 Simulations: {}\n\
                 Ticks: {}\n\
                 Unique hashes: {}\n\
                 All hashes: {:?}",
                self.num_sims,
                self.ticks,
                unique.len(),
                self.hashes
            );
        }
    }
}

/// Run N simulations on scoped threads and collect their final hashes.
///
/// Every thread builds its own simulation from `setup_fn`, so nothing is
/// shared between runs.
pub fn run_parallel_simulations_scoped<S, F>(
    setup_fn: F,
    num_sims: usize,
    num_ticks: u64,
) -> ParallelSimResult
where
    S: Space,
    F: Fn() -> Simulation<S> + Sync,
{
    let hashes = thread::scope(|s| {
        let handles: Vec<_> = (0..num_sims)
            .map(|_| {
                s.spawn(|| {
                    let mut sim = setup_fn();
                    sim.run(num_ticks);
                    sim.state_hash()
                })
            })
            .collect();

        handles
            .into_iter()
            .map(|h| h.join().unwrap_or_else(|panic| std::panic::resume_unwind(panic)))
            .collect()
    });

    ParallelSimResult {
        hashes,
        ticks: num_ticks,
        num_sims,
    }
}

/// Compare two simulation runs tick-by-tick, finding first divergence.
///
/// Useful for debugging non-determinism by finding exactly when
/// simulations start to differ.
///
/// # Returns
///
/// `None` if simulations are deterministic, `Some(tick)` if they diverge
/// at that tick.
pub fn find_first_divergence<S, F>(setup_fn: F, num_ticks: u64) -> Option<u64>
where
    S: Space,
    F: Fn() -> Simulation<S>,
{
    find_divergence_between(setup_fn(), setup_fn(), num_ticks)
}

/// Step two given simulations side by side and report the first tick at
/// which their state hashes differ.
pub fn find_divergence_between<S: Space>(
    mut sim1: Simulation<S>,
    mut sim2: Simulation<S>,
    num_ticks: u64,
) -> Option<u64> {
    if sim1.state_hash() != sim2.state_hash() {
        return Some(0);
    }

    for tick in 1..=num_ticks {
        sim1.step();
        sim2.step();

        if sim1.state_hash() != sim2.state_hash() {
            return Some(tick);
        }
    }

    None
}

/// Compute a simple hash for any hashable value.
pub fn compute_hash<T: Hash>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Proptest strategies for determinism testing.
///
/// These strategies generate random but reproducible inputs for
/// property-based testing of simulation determinism.
pub mod strategies {
    use glam::DVec2;
    use proptest::prelude::*;
    use unicell_core::config::SimConfig;
    use unicell_core::space::Cell;

    /// Generate a small, valid configuration.
    ///
    /// Sizes stay small so a few dozen ticks run quickly.
    pub fn arb_config() -> impl Strategy<Value = SimConfig> {
        (
            (4u32..40, 4u32..40, any::<bool>()),
            (0usize..20, 0usize..20, 0usize..5),
            (1.0f64..20.0, 0.5f64..3.0, 0.5f64..5.0),
            any::<u64>(),
        )
            .prop_map(|(shape, counts, agent, seed)| {
                let (width, height, torus) = shape;
                let (agents, resources, hazards) = counts;
                let (sensing, speed, threshold) = agent;
                SimConfig::default()
                    .with_size(width, height)
                    .with_torus(torus)
                    .with_population(agents)
                    .with_entities(resources, hazards)
                    .with_sensing_radius(sensing)
                    .with_movement_speed(speed)
                    .with_avoidance_threshold(threshold)
                    .with_seed(seed)
            })
    }

    /// Generate a cell inside a `width` x `height` grid.
    pub fn arb_cell(width: i32, height: i32) -> impl Strategy<Value = Cell> {
        (0..width, 0..height).prop_map(|(x, y)| Cell::new(x, y))
    }

    /// Generate a point inside a `width` x `height` plane.
    pub fn arb_point(width: f64, height: f64) -> impl Strategy<Value = DVec2> {
        (0.0..width, 0.0..height).prop_map(|(x, y)| DVec2::new(x, y))
    }

    /// Generate a grid heading from the eight compass offsets.
    pub fn arb_compass_heading() -> impl Strategy<Value = DVec2> {
        prop::sample::select(unicell_core::math::COMPASS.to_vec())
    }
}
