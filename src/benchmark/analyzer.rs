// src/benchmark/analyzer.rs

use crate::core::{Result, Secret};
use crate::metrics::{polarization_fidelity, ExpectedDistribution, FidelityScore};
use crate::simulation::Counts;
use tracing::info;

/// The ideal outcome of a circuit hiding `secret_int`: the secret's bit-string,
/// zero-padded to `num_qubits - 1` bits, with probability 1.
pub fn expected_distribution(num_qubits: usize, secret_int: u64) -> Result<ExpectedDistribution> {
    let secret = Secret::for_qubits(secret_int, num_qubits)?;
    Ok(ExpectedDistribution::point_mass(secret.to_bitstring()))
}

/// Scores `counts` against the ideal single-peak distribution.
///
/// Empty counts are a valid degenerate observation and score 0.
///
/// # Errors
/// `BvError::ContractViolation` if the secret does not fit in `num_qubits - 1` bits.
pub fn analyze(counts: Counts, num_qubits: usize, secret_int: u64, verbose: bool) -> Result<(Counts, FidelityScore)> {
    let expected = expected_distribution(num_qubits, secret_int)?;
    let score = polarization_fidelity(&counts, &expected);
    if verbose {
        info!("For secret {}, measured: {}", secret_int, counts);
        if let Some((key, _)) = expected.iter().next() {
            info!("Expected: {{'{}': 1.0}}, {}", key, score);
        }
    }
    Ok((counts, score))
}
