//! Ablation runs.
//!
//! Runs batches of seeded simulations under two rule sets and compares
//! survival and foraging, e.g. with and without neighbour avoidance, or
//! cumulative against first-only hazard damage.

use serde::{Deserialize, Serialize};
use unicell_core::config::SimConfig;
use unicell_core::error::Result;
use unicell_core::rules::VariantRules;
use unicell_core::simulation::Simulation;
use unicell_core::space::Space;

/// Outcome of one seeded run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    /// Seed the run used.
    pub seed: u64,
    /// Ticks executed before the tick limit or extinction.
    pub ticks: u64,
    /// Agents alive at the end.
    pub final_population: usize,
    /// Survival rate at the end, NaN with no initial population.
    pub survival_rate: f64,
    /// Units gathered by every agent over the run.
    pub lifetime_collected: u64,
}

impl RunSummary {
    /// Whether every agent was removed.
    #[must_use]
    pub fn extinct(&self) -> bool {
        self.final_population == 0
    }
}

/// Statistics for a set of runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AblationStats {
    /// Total runs.
    pub runs: u32,
    /// Runs that ended with no agents.
    pub extinctions: u32,
    /// Mean final survival rate, ignoring NaN.
    pub mean_survival: f64,
    /// Mean units gathered per run.
    pub mean_collected: f64,
    /// Mean ticks per run.
    pub mean_ticks: f64,
}

impl AblationStats {
    /// Aggregate a batch of run summaries.
    #[must_use]
    pub fn from_runs(summaries: &[RunSummary]) -> Self {
        if summaries.is_empty() {
            return Self::default();
        }
        let n = summaries.len() as f64;
        let rates: Vec<f64> = summaries
            .iter()
            .map(|s| s.survival_rate)
            .filter(|r| !r.is_nan())
            .collect();
        let mean_survival = if rates.is_empty() {
            f64::NAN
        } else {
            rates.iter().sum::<f64>() / rates.len() as f64
        };

        Self {
            runs: summaries.len() as u32,
            extinctions: summaries.iter().filter(|s| s.extinct()).count() as u32,
            mean_survival,
            mean_collected: summaries.iter().map(|s| s.lifetime_collected as f64).sum::<f64>() / n,
            mean_ticks: summaries.iter().map(|s| s.ticks as f64).sum::<f64>() / n,
        }
    }

    /// Fraction of runs that went extinct (0.0 to 1.0).
    #[must_use]
    pub fn extinction_rate(&self) -> f64 {
        if self.runs == 0 {
            return 0.0;
        }
        f64::from(self.extinctions) / f64::from(self.runs)
    }
}

/// Baseline against variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    /// Stats under the baseline rules.
    pub baseline: AblationStats,
    /// Stats under the variant rules.
    pub variant: AblationStats,
}

impl Comparison {
    /// Variant survival minus baseline survival.
    #[must_use]
    pub fn survival_delta(&self) -> f64 {
        self.variant.mean_survival - self.baseline.mean_survival
    }

    /// Variant foraging minus baseline foraging.
    #[must_use]
    pub fn collected_delta(&self) -> f64 {
        self.variant.mean_collected - self.baseline.mean_collected
    }

    /// Render as RON for saving alongside experiment notes.
    pub fn to_ron(&self) -> std::result::Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }
}

/// Run one simulation per seed for up to `ticks` ticks.
pub fn run_batch<S: Space>(
    config: &SimConfig,
    rules: VariantRules,
    seeds: impl IntoIterator<Item = u64>,
    ticks: u64,
) -> Result<Vec<RunSummary>> {
    seeds
        .into_iter()
        .map(|seed| {
            let mut sim = Simulation::<S>::with_rules(config.clone().with_seed(seed), rules)?;
            let executed = sim.run(ticks);
            let metrics = sim.current_metrics();
            Ok(RunSummary {
                seed,
                ticks: executed,
                final_population: metrics.population,
                survival_rate: metrics.survival_rate,
                lifetime_collected: metrics.lifetime_resources_collected,
            })
        })
        .collect()
}

/// Run the same seeds under two rule sets.
pub fn compare<S: Space>(
    config: &SimConfig,
    baseline: VariantRules,
    variant: VariantRules,
    seeds: &[u64],
    ticks: u64,
) -> Result<Comparison> {
    let base_runs = run_batch::<S>(config, baseline, seeds.iter().copied(), ticks)?;
    let variant_runs = run_batch::<S>(config, variant, seeds.iter().copied(), ticks)?;
    let comparison = Comparison {
        baseline: AblationStats::from_runs(&base_runs),
        variant: AblationStats::from_runs(&variant_runs),
    };
    tracing::debug!(
        space = S::NAME,
        runs = seeds.len(),
        survival_delta = comparison.survival_delta(),
        collected_delta = comparison.collected_delta(),
        "Ablation comparison"
    );
    Ok(comparison)
}
