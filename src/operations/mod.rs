// src/operations/mod.rs

//! Defines the operations a benchmark circuit is made of.
//!
//! The vocabulary is the minimum the Bernstein-Vazirani construction needs:
//! the bit flip and Hadamard single-qubit gates, the controlled flip used by
//! the oracle, barriers, measurement, reset and an embedded sub-circuit.

use crate::circuits::Circuit;
use crate::core::QubitId;

/// A single step of a [`Circuit`].
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Bit flip (Pauli X). Used to mark the ancilla.
    Flip {
        /// Qubit being flipped.
        target: QubitId,
    },

    /// Hadamard transform of one qubit.
    ///
    /// Applied to every qubit it forms the uniform superposition transform.
    Hadamard {
        /// Qubit being transformed.
        target: QubitId,
    },

    /// Controlled flip (CNOT): flips `target` when `control` is 1.
    ControlledFlip {
        /// The qubit whose value decides whether `target` flips.
        control: QubitId,
        /// The qubit that is flipped.
        target: QubitId,
    },

    /// Synchronization marker. Has no effect on the state.
    Barrier {
        /// Qubits the barrier spans.
        qubits: Vec<QubitId>,
    },

    /// Projective measurement of `qubit` in the computational basis,
    /// written into classical bit `clbit`.
    Measure {
        /// Measured qubit.
        qubit: QubitId,
        /// Index of the classical bit receiving the outcome.
        clbit: usize,
    },

    /// Returns `target` to |0> regardless of its current value.
    Reset {
        /// Qubit being reset.
        target: QubitId,
    },

    /// A nested circuit applied to `qubits`; sub-circuit qubit `i` maps to `qubits[i]`.
    ///
    /// Backends only run flat circuits, see [`Circuit::decompose`].
    SubCircuit {
        /// The embedded circuit.
        circuit: Box<Circuit>,
        /// Outer qubits bound to the sub-circuit's register, in order.
        qubits: Vec<QubitId>,
    },
}

impl Operation {
    /// Returns every qubit named by the operation's parameters.
    pub fn involved_qubits(&self) -> Vec<QubitId> {
        match self {
            Operation::Flip { target } => vec![*target],
            Operation::Hadamard { target } => vec![*target],
            Operation::ControlledFlip { control, target } => vec![*control, *target],
            Operation::Barrier { qubits } => qubits.clone(),
            Operation::Measure { qubit, .. } => vec![*qubit],
            Operation::Reset { target } => vec![*target],
            Operation::SubCircuit { qubits, .. } => qubits.clone(),
        }
    }

    /// Short mnemonic used by circuit renderers.
    pub fn symbol(&self) -> &str {
        match self {
            Operation::Flip { .. } => "X",
            Operation::Hadamard { .. } => "H",
            Operation::ControlledFlip { .. } => "CX",
            Operation::Barrier { .. } => "░",
            Operation::Measure { .. } => "M",
            Operation::Reset { .. } => "|0>",
            Operation::SubCircuit { circuit, .. } => circuit.name(),
        }
    }
}
