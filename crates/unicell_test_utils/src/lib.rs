//! # Unicell Test Utilities
//!
//! Shared testing utilities for the simulation crates:
//! - Determinism test harness
//! - Scenario fixtures
//! - Ablation comparison runs
//! - Property-based testing strategies

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod ablation;
pub mod determinism;
pub mod fixtures;

/// Re-export proptest for convenience.
pub use proptest;

/// Install a test-friendly tracing subscriber.
///
/// Output goes through the test harness writer and is filtered by
/// `RUST_LOG` (default `warn`). Safe to call from every test; only the
/// first call installs anything.
pub fn init_tracing() {
    use tracing_subscriber::prelude::*;
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_test_writer())
        .try_init();
}
