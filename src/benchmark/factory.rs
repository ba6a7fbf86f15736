// src/benchmark/factory.rs

//! Construction of the full Bernstein-Vazirani circuit.

use super::oracle::build_oracle;
use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{BvError, Result, Secret, MAIN_CIRCUIT_NAME};
use serde::{Deserialize, Serialize};
use std::fmt;

/// How the algorithm circuit is laid out.
///
/// Both constructions recover the secret with certainty on an ideal backend.
/// Configuration files and the command line select them as `1` and `2`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Construction {
    /// Method 1: one qubit per secret bit plus the ancilla; a single oracle query.
    Parallel,
    /// Method 2: two qubits reused once per secret bit, measured round by round.
    Sequential,
}

impl TryFrom<u8> for Construction {
    type Error = BvError;

    fn try_from(method: u8) -> Result<Self> {
        match method {
            1 => Ok(Construction::Parallel),
            2 => Ok(Construction::Sequential),
            other => Err(BvError::contract(format!(
                "Unsupported construction method {} (expected 1 or 2)",
                other
            ))),
        }
    }
}

impl From<Construction> for u8 {
    fn from(method: Construction) -> u8 {
        match method {
            Construction::Parallel => 1,
            Construction::Sequential => 2,
        }
    }
}

impl fmt::Display for Construction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construction::Parallel => write!(f, "method 1, parallel"),
            Construction::Sequential => write!(f, "method 2, sequential"),
        }
    }
}

/// A freshly built algorithm circuit and, for the parallel construction, the
/// oracle embedded in it.
#[derive(Debug, Clone, PartialEq)]
pub struct BuiltCircuit {
    pub circuit: Circuit,
    pub oracle: Option<Circuit>,
}

/// Builds the algorithm circuit for `secret_int` on `num_qubits` qubits
/// (`num_qubits - 1` secret bits plus one ancilla).
///
/// The result is named `"main"`; the parallel construction embeds the oracle
/// as a nested `"Uf"` circuit that must be decomposed before execution.
///
/// # Errors
/// `BvError::ContractViolation` if `num_qubits < 2` or the secret does not fit.
pub fn build_circuit(num_qubits: usize, secret_int: u64, method: Construction) -> Result<BuiltCircuit> {
    let secret = Secret::for_qubits(secret_int, num_qubits)?;
    match method {
        Construction::Parallel => build_parallel(num_qubits, &secret),
        Construction::Sequential => build_sequential(&secret),
    }
}

fn build_parallel(num_qubits: usize, secret: &Secret) -> Result<BuiltCircuit> {
    let input_size = secret.width();
    let ancilla = input_size;
    let oracle = build_oracle(num_qubits, input_size, secret.value())?;
    let register: Vec<usize> = (0..num_qubits).collect();

    let circuit = CircuitBuilder::new(MAIN_CIRCUIT_NAME, num_qubits, input_size)
        .x(ancilla)
        .h_all()
        .barrier()
        .append(oracle.clone(), &register)
        .barrier()
        .h_all()
        .x(ancilla)
        .barrier();
    let circuit = (0..input_size).fold(circuit, |b, i| b.measure(i, i)).build()?;

    Ok(BuiltCircuit {
        circuit,
        oracle: Some(oracle),
    })
}

fn build_sequential(secret: &Secret) -> Result<BuiltCircuit> {
    let input_size = secret.width();
    // q0 is the work qubit, q1 holds |-> for the phase kickback
    let mut builder = CircuitBuilder::new(MAIN_CIRCUIT_NAME, 2, input_size).x(1).h(1).barrier();
    for i in 0..input_size {
        if secret.bit(i) {
            builder = builder.h(0).cx(0, 1).h(0);
        }
        builder = builder.measure(0, i);
        if i + 1 < input_size {
            builder = builder.reset(0);
        }
    }
    Ok(BuiltCircuit {
        circuit: builder.build()?,
        oracle: None,
    })
}
