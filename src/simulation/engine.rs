// src/simulation/engine.rs
use crate::core::constants::bv_constants::AMPLITUDE_TOLERANCE;
use crate::core::{BvError, QubitId, Result, StateVector};
use crate::operations::Operation;
use num_complex::Complex;
use num_traits::Zero;
use rand::Rng;
use std::f64::consts::FRAC_1_SQRT_2;

type Matrix2 = [[Complex<f64>; 2]; 2];

/// Ideal state-vector engine that evolves a register gate by gate.
/// (Internal visibility)
#[derive(Debug, Clone)]
pub(crate) struct SimulationEngine {
    /// Global state over `2^num_qubits` basis states.
    state: StateVector,
    num_qubits: usize,
}

impl SimulationEngine {
    /// Initializes the engine in |0...0>.
    pub(crate) fn init(num_qubits: usize) -> Result<Self> {
        if num_qubits == 0 {
            return Err(BvError::simulation("Cannot initialize simulation engine with zero qubits"));
        }
        if num_qubits > super::MAX_SIMULATED_QUBITS {
            return Err(BvError::simulation(format!(
                "{} qubits exceed the simulator limit of {}",
                num_qubits,
                super::MAX_SIMULATED_QUBITS
            )));
        }
        Ok(Self {
            state: StateVector::zero(num_qubits),
            num_qubits,
        })
    }

    #[cfg(test)]
    pub(crate) fn set_state(&mut self, state: StateVector) -> Result<()> {
        if state.dim() != self.state.dim() {
            return Err(BvError::simulation(format!(
                "Cannot set state: provided dimension {} does not match engine dimension {}",
                state.dim(),
                self.state.dim()
            )));
        }
        self.state = state;
        Ok(())
    }

    pub(crate) fn get_state(&self) -> &StateVector {
        &self.state
    }

    /// Applies a single unitary operation or barrier to the global state.
    ///
    /// Measurement and reset go through [`Self::measure`] and [`Self::reset`];
    /// nested circuits must be flattened beforehand.
    pub(crate) fn apply_operation(&mut self, op: &Operation) -> Result<()> {
        match op {
            Operation::Flip { target } => {
                let idx = self.check_qubit(target)?;
                self.apply_single_qubit_gate(idx, &flip_matrix());
            }
            Operation::Hadamard { target } => {
                let idx = self.check_qubit(target)?;
                self.apply_single_qubit_gate(idx, &hadamard_matrix());
            }
            Operation::ControlledFlip { control, target } => {
                let c = self.check_qubit(control)?;
                let t = self.check_qubit(target)?;
                if c == t {
                    return Err(BvError::simulation(
                        "Control and target qubits cannot be the same for controlled operation",
                    ));
                }
                self.apply_controlled_flip(c, t);
            }
            Operation::Barrier { .. } => {}
            Operation::Measure { .. } | Operation::Reset { .. } => {
                return Err(BvError::simulation(
                    "Measure and Reset must not be passed directly to apply_operation",
                ));
            }
            Operation::SubCircuit { circuit, .. } => {
                return Err(BvError::simulation(format!(
                    "Nested circuit '{}' reached the engine; decompose the circuit first",
                    circuit.name()
                )));
            }
        }
        Ok(())
    }

    /// Projectively measures `qubit`, collapsing the state onto the observed value.
    pub(crate) fn measure<R: Rng + ?Sized>(&mut self, qubit: &QubitId, rng: &mut R) -> Result<bool> {
        let idx = self.check_qubit(qubit)?;
        let p_one = self.state.probability_of_one(idx);
        let outcome = rng.random::<f64>() < p_one;
        let p_outcome = if outcome { p_one } else { 1.0 - p_one };
        if p_outcome < AMPLITUDE_TOLERANCE {
            return Err(BvError::simulation(format!(
                "Measurement of {} selected an outcome with negligible probability {:e}",
                qubit, p_outcome
            )));
        }

        let mask = 1usize << idx;
        let scale = 1.0 / p_outcome.sqrt();
        for (k, amp) in self.state.amplitudes_mut().iter_mut().enumerate() {
            if (k & mask != 0) == outcome {
                *amp *= scale;
            } else {
                *amp = Complex::zero();
            }
        }
        Ok(outcome)
    }

    /// Measures `qubit` and flips it back to |0> if it was found in |1>.
    pub(crate) fn reset<R: Rng + ?Sized>(&mut self, qubit: &QubitId, rng: &mut R) -> Result<()> {
        if self.measure(qubit, rng)? {
            let idx = self.check_qubit(qubit)?;
            self.apply_single_qubit_gate(idx, &flip_matrix());
        }
        Ok(())
    }

    fn check_qubit(&self, qubit: &QubitId) -> Result<usize> {
        let idx = qubit.index();
        if idx >= self.num_qubits {
            return Err(BvError::simulation(format!(
                "{} not found in a register of {} qubits",
                qubit, self.num_qubits
            )));
        }
        Ok(idx)
    }

    /// Applies a 2x2 matrix to one qubit, pairing basis states that differ only
    /// at that qubit's bit.
    fn apply_single_qubit_gate(&mut self, target: usize, matrix: &Matrix2) {
        let mask = 1usize << target;
        let amps = self.state.amplitudes_mut();
        for i0 in 0..amps.len() {
            if i0 & mask != 0 {
                continue;
            }
            let i1 = i0 | mask;
            let (psi_0, psi_1) = (amps[i0], amps[i1]);
            amps[i0] = matrix[0][0] * psi_0 + matrix[0][1] * psi_1;
            amps[i1] = matrix[1][0] * psi_0 + matrix[1][1] * psi_1;
        }
    }

    /// Swaps the target's 0/1 amplitudes inside the control=1 subspace.
    fn apply_controlled_flip(&mut self, control: usize, target: usize) {
        let c_mask = 1usize << control;
        let t_mask = 1usize << target;
        let amps = self.state.amplitudes_mut();
        for i in 0..amps.len() {
            if i & c_mask != 0 && i & t_mask == 0 {
                amps.swap(i, i | t_mask);
            }
        }
    }
}

fn flip_matrix() -> Matrix2 {
    [
        [Complex::zero(), Complex::new(1.0, 0.0)],
        [Complex::new(1.0, 0.0), Complex::zero()],
    ]
}

fn hadamard_matrix() -> Matrix2 {
    [
        [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(FRAC_1_SQRT_2, 0.0)],
        [Complex::new(FRAC_1_SQRT_2, 0.0), Complex::new(-FRAC_1_SQRT_2, 0.0)],
    ]
}
