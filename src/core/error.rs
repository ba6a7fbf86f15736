//! Error handling logic

use std::fmt;
use thiserror::Error;

/// Index of a qubit inside a circuit's quantum register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QubitId(pub usize);

impl QubitId {
    /// Position of this qubit within its register.
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for QubitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, BvError>;

/// Failures surfaced by circuit construction, execution and configuration.
///
/// Degenerate measurement results (an empty set of counts) are deliberately
/// absent: they are scored as fidelity 0 rather than reported as errors.
#[derive(Debug, Error)]
pub enum BvError {
    /// Malformed secret, qubit count or construction method handed to a builder.
    /// Never recovered.
    #[error("Contract Violation: {message}")]
    ContractViolation {
        /// ContractViolation failure message
        message: String,
    },

    /// The execution target failed to produce a result for a submitted trial.
    #[error("Execution Failure: {message}")]
    ExecutionFailure {
        /// ExecutionFailure failure message
        message: String,
    },

    /// The simulator reached an inconsistent internal state.
    #[error("Simulation Process Error: {message}")]
    Simulation {
        /// Simulation failure message
        message: String,
    },

    /// Benchmark configuration was rejected.
    #[error("Invalid Configuration: {message}")]
    Configuration {
        /// Configuration failure message
        message: String,
    },

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A configuration file was not valid TOML for [`BenchmarkConfig`](crate::config::BenchmarkConfig).
    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),
}

impl BvError {
    pub(crate) fn contract(message: impl Into<String>) -> Self {
        BvError::ContractViolation { message: message.into() }
    }

    pub(crate) fn execution(message: impl Into<String>) -> Self {
        BvError::ExecutionFailure { message: message.into() }
    }

    pub(crate) fn simulation(message: impl Into<String>) -> Self {
        BvError::Simulation { message: message.into() }
    }

    pub(crate) fn configuration(message: impl Into<String>) -> Self {
        BvError::Configuration { message: message.into() }
    }
}
