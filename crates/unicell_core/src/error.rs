//! Error types for the foraging simulation.

use thiserror::Error;

use crate::components::AgentId;

/// Result type alias using [`SimError`].
pub type Result<T> = std::result::Result<T, SimError>;

/// Top-level error type for all simulation errors.
///
/// Only construction and configuration loading can fail. Advancing a
/// constructed simulation never returns an error.
#[derive(Debug, Error)]
pub enum SimError {
    /// A construction parameter is out of range.
    #[error("Invalid configuration for '{field}': {reason}")]
    InvalidConfig {
        /// Name of the offending parameter.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Configuration file does not exist.
    #[error("Configuration file not found: {0}")]
    ConfigNotFound(String),

    /// Failed to read a configuration file.
    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse RON configuration.
    #[error("Failed to parse configuration: {0}")]
    ConfigParse(#[from] ron::error::SpannedError),

    /// The agent was removed or never existed.
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),
}

impl SimError {
    /// Shorthand for an [`SimError::InvalidConfig`] error.
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
