// src/config.rs

//! Benchmark configuration, loadable from a TOML file.
//!
//! Every field has a default, so a file only needs the values it changes:
//!
//! ```toml
//! min_qubits = 3
//! max_qubits = 8
//! max_circuits = 10
//! method = 2
//! backend_id = "noisy_simulator"
//!
//! [device_credentials]
//! readout_error = "0.05"
//! ```

use crate::benchmark::Construction;
use crate::core::{BvError, Result, MIN_QUBITS};
use crate::execution::DeviceCredentials;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Options of one benchmark run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkConfig {
    /// Lower bound of the qubit sweep (clamped to 3).
    #[serde(default = "default_min_qubits")]
    pub min_qubits: usize,
    /// Upper bound of the qubit sweep, inclusive.
    #[serde(default = "default_max_qubits")]
    pub max_qubits: usize,
    /// Most circuits executed per group.
    #[serde(default = "default_max_circuits")]
    pub max_circuits: usize,
    /// Shots per circuit.
    #[serde(default = "default_num_shots")]
    pub num_shots: u64,
    /// Circuit construction: 1 (parallel) or 2 (sequential).
    #[serde(default = "default_method")]
    pub method: Construction,
    /// Execution target, see `bvbench::execution::select_backend`.
    #[serde(default = "default_backend_id")]
    pub backend_id: String,
    /// Opaque, backend specific credentials.
    #[serde(default)]
    pub device_credentials: Option<DeviceCredentials>,
    /// Seed for secret sampling in large groups.
    #[serde(default)]
    pub seed: u64,
    /// Log per-trial counts and fidelities.
    #[serde(default)]
    pub verbose: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self {
            min_qubits: default_min_qubits(),
            max_qubits: default_max_qubits(),
            max_circuits: default_max_circuits(),
            num_shots: default_num_shots(),
            method: default_method(),
            backend_id: default_backend_id(),
            device_credentials: None,
            seed: 0,
            verbose: false,
        }
    }
}

fn default_min_qubits() -> usize {
    MIN_QUBITS
}
fn default_max_qubits() -> usize {
    6
}
fn default_max_circuits() -> usize {
    30
}
fn default_num_shots() -> u64 {
    1024
}
fn default_method() -> Construction {
    Construction::Parallel
}
fn default_backend_id() -> String {
    "local_simulator".to_string()
}

impl BenchmarkConfig {
    /// Loads a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Checks values that have no sensible clamp. The construction method is
    /// already restricted to 1 or 2 when parsed.
    ///
    /// # Errors
    /// `BvError::Configuration` for zero `max_circuits` or zero `num_shots`.
    pub fn validate(&self) -> Result<()> {
        if self.max_circuits == 0 {
            return Err(BvError::configuration("max_circuits must be at least 1"));
        }
        if self.num_shots == 0 {
            return Err(BvError::configuration("num_shots must be at least 1"));
        }
        Ok(())
    }

    /// The qubit sweep actually run: both bounds raised to 3, and the lower
    /// bound never above the upper one.
    pub fn clamped_bounds(&self) -> (usize, usize) {
        let max_qubits = self.max_qubits.max(MIN_QUBITS);
        let min_qubits = self.min_qubits.max(MIN_QUBITS).min(max_qubits);
        (min_qubits, max_qubits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() -> Result<()> {
        let config: BenchmarkConfig = toml::from_str("")?;
        assert_eq!(config, BenchmarkConfig::default());
        assert_eq!(config.min_qubits, 3);
        assert_eq!(config.max_qubits, 6);
        assert_eq!(config.max_circuits, 30);
        assert_eq!(config.num_shots, 1024);
        assert_eq!(config.method, Construction::Parallel);
        assert_eq!(config.backend_id, "local_simulator");
        assert!(config.device_credentials.is_none());
        config.validate()
    }

    #[test]
    fn test_parse_overrides() -> Result<()> {
        let toml_str = r#"
            max_qubits = 8
            max_circuits = 10
            method = 2
            backend_id = "noisy_simulator"
            seed = 42

            [device_credentials]
            readout_error = "0.05"
        "#;
        let config: BenchmarkConfig = toml::from_str(toml_str)?;
        assert_eq!(config.max_qubits, 8);
        assert_eq!(config.min_qubits, 3);
        assert_eq!(config.method, Construction::Sequential);
        assert_eq!(config.seed, 42);
        let creds = config.device_credentials.unwrap_or_default();
        assert_eq!(creds.get("readout_error").map(String::as_str), Some("0.05"));
        Ok(())
    }

    #[test]
    fn test_invalid_method_fails_to_parse() {
        assert!(toml::from_str::<BenchmarkConfig>("method = 3").is_err());
    }

    #[test]
    fn test_validate_rejects_zero_budgets() {
        let config = BenchmarkConfig {
            max_circuits: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(BvError::Configuration { .. })));
        let config = BenchmarkConfig {
            num_shots: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_clamped_bounds() {
        let mut config = BenchmarkConfig {
            min_qubits: 1,
            max_qubits: 2,
            ..Default::default()
        };
        assert_eq!(config.clamped_bounds(), (3, 3));
        config.min_qubits = 9;
        config.max_qubits = 5;
        assert_eq!(config.clamped_bounds(), (5, 5));
        config.min_qubits = 4;
        config.max_qubits = 7;
        assert_eq!(config.clamped_bounds(), (4, 7));
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let path = std::env::temp_dir().join(format!("bvbench-config-{}.toml", std::process::id()));
        std::fs::write(&path, "max_qubits = 4\nverbose = true\n")?;
        let config = BenchmarkConfig::load(&path)?;
        std::fs::remove_file(&path)?;
        assert_eq!(config.max_qubits, 4);
        assert!(config.verbose);
        assert!(matches!(
            BenchmarkConfig::load("/nonexistent/bvbench.toml"),
            Err(BvError::Io(_))
        ));
        Ok(())
    }
}
