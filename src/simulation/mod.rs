// src/simulation/mod.rs

//! Ideal, noiseless execution of `bvbench::circuits::Circuit`.
//!
//! This module contains the `Simulator` entry point and the internal
//! `SimulationEngine` that evolves the state vector. Circuits whose
//! measurements are all terminal are evolved once and sampled `shots` times;
//! circuits that reuse a measured qubit (or reset one) are replayed shot by shot.

mod results;
pub(crate) mod engine;

pub use results::Counts;

use crate::circuits::Circuit;
use crate::core::{BvError, Result, StateVector};
use crate::operations::Operation;
use crate::validation::check_normalization;
use engine::SimulationEngine;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Largest register the state-vector engine accepts.
pub const MAX_SIMULATED_QUBITS: usize = 24;

/// Noiseless state-vector simulator producing measurement counts.
#[derive(Debug, Clone, Default)]
pub struct Simulator {
    seed: u64,
}

impl Simulator {
    /// Creates a simulator with seed 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a simulator whose sampling is driven by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self { seed }
    }

    /// Runs `circuit` for `shots` repetitions.
    ///
    /// Repeated runs of the same circuit on the same simulator produce the same counts.
    ///
    /// # Errors
    /// `BvError::Simulation` for an empty register, a register above
    /// [`MAX_SIMULATED_QUBITS`], or a circuit that still contains sub-circuits.
    pub fn run(&self, circuit: &Circuit, shots: u64) -> Result<Counts> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        self.run_with_rng(circuit, shots, &mut rng)
    }

    /// Same as [`Simulator::run`] with caller-provided randomness.
    pub fn run_with_rng<R: Rng + ?Sized>(&self, circuit: &Circuit, shots: u64, rng: &mut R) -> Result<Counts> {
        if circuit.has_sub_circuits() {
            return Err(BvError::simulation(format!(
                "Circuit '{}' contains nested circuits; decompose it before execution",
                circuit.name()
            )));
        }
        let engine = SimulationEngine::init(circuit.num_qubits())?;
        if circuit.has_mid_circuit_measurement() {
            run_shot_by_shot(&engine, circuit, shots, rng)
        } else {
            run_sampled(engine, circuit, shots, rng)
        }
    }

    /// Evolves the unitary part of `circuit` and returns the state before any
    /// measurement. Measurements and barriers are skipped.
    pub fn final_state(&self, circuit: &Circuit) -> Result<StateVector> {
        let mut engine = SimulationEngine::init(circuit.num_qubits())?;
        for op in circuit.decompose().operations() {
            match op {
                Operation::Measure { .. } => {}
                Operation::Reset { .. } => {
                    return Err(BvError::simulation("final_state does not support Reset"));
                }
                _ => engine.apply_operation(op)?,
            }
        }
        Ok(engine.get_state().clone())
    }
}

/// Renders classical bits with bit 0 rightmost.
fn format_clbits(clbits: &[bool]) -> String {
    clbits.iter().rev().map(|b| if *b { '1' } else { '0' }).collect()
}

/// All measurements are terminal: evolve once, then sample basis states.
fn run_sampled<R: Rng + ?Sized>(
    mut engine: SimulationEngine,
    circuit: &Circuit,
    shots: u64,
    rng: &mut R,
) -> Result<Counts> {
    // clbit -> measured qubit; a later measurement into the same clbit wins
    let mut clbit_source: Vec<Option<usize>> = vec![None; circuit.num_clbits()];
    for op in circuit.operations() {
        match op {
            Operation::Measure { qubit, clbit } => clbit_source[*clbit] = Some(qubit.index()),
            _ => engine.apply_operation(op)?,
        }
    }

    check_normalization(engine.get_state(), None)?;
    let probabilities = engine.get_state().probabilities();
    let mut cumulative = Vec::with_capacity(probabilities.len());
    let mut running = 0.0;
    for p in &probabilities {
        running += p;
        cumulative.push(running);
    }

    let mut counts = Counts::new();
    let mut clbits = vec![false; circuit.num_clbits()];
    for _ in 0..shots {
        let sample = rng.random::<f64>() * running;
        let k = cumulative
            .partition_point(|c| *c <= sample)
            .min(probabilities.len() - 1);
        for (bit, source) in clbits.iter_mut().zip(&clbit_source) {
            *bit = source.is_some_and(|q| (k >> q) & 1 == 1);
        }
        counts.record(format_clbits(&clbits));
    }
    Ok(counts)
}

/// Measured qubits are reused: replay the whole circuit for every shot.
fn run_shot_by_shot<R: Rng + ?Sized>(
    initial: &SimulationEngine,
    circuit: &Circuit,
    shots: u64,
    rng: &mut R,
) -> Result<Counts> {
    let mut counts = Counts::new();
    for _ in 0..shots {
        let mut engine = initial.clone();
        let mut clbits = vec![false; circuit.num_clbits()];
        for op in circuit.operations() {
            match op {
                Operation::Measure { qubit, clbit } => clbits[*clbit] = engine.measure(qubit, rng)?,
                Operation::Reset { target } => engine.reset(target, rng)?,
                _ => engine.apply_operation(op)?,
            }
        }
        counts.record(format_clbits(&clbits));
    }
    Ok(counts)
}
