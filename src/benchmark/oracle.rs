// src/benchmark/oracle.rs

use crate::circuits::{Circuit, CircuitBuilder};
use crate::core::{BvError, Result, Secret, ORACLE_NAME};

/// Builds the oracle `U_f|x>|y> = |x>|y ⊕ s·x>` for `secret_int`.
///
/// For every input qubit `i` (ascending) whose secret bit is set, a controlled
/// flip from qubit `i` onto the ancilla (qubit `input_size`) is emitted.
///
/// # Errors
/// `BvError::ContractViolation` if `input_size != num_qubits - 1` or the
/// secret does not fit in `input_size` bits.
pub fn build_oracle(num_qubits: usize, input_size: usize, secret_int: u64) -> Result<Circuit> {
    if num_qubits < 2 || input_size != num_qubits - 1 {
        return Err(BvError::contract(format!(
            "Oracle over {} qubits needs input_size {}, got {}",
            num_qubits,
            num_qubits.saturating_sub(1),
            input_size
        )));
    }
    let secret = Secret::new(secret_int, input_size)?;
    let ancilla = input_size;

    (0..input_size)
        .filter(|&i| secret.bit(i))
        .fold(CircuitBuilder::new(ORACLE_NAME, num_qubits, 0), |b, i| b.cx(i, ancilla))
        .build()
}
