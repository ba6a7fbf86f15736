// src/execution/backend.rs

//! Execution targets and their results.

use crate::circuits::Circuit;
use crate::core::{BvError, Result};
use crate::simulation::{Counts, MAX_SIMULATED_QUBITS, Simulator};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use std::time::{Duration, Instant};
use tracing::info;

/// Opaque credential bundle handed to [`select_backend`]; keys are backend specific.
pub type DeviceCredentials = BTreeMap<String, String>;

/// Readout error applied by `noisy_simulator` when credentials do not set one.
pub const DEFAULT_READOUT_ERROR: f64 = 0.02;

/// What a backend can run.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendCapabilities {
    /// Widest circuit accepted.
    pub max_qubits: usize,
    /// Whether a measured qubit may be reused (needed by the sequential construction).
    pub mid_circuit_measurement: bool,
}

/// Outcome of running one circuit on a backend.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    circuit_name: String,
    counts: Counts,
    /// Shots requested.
    pub shots: u64,
    /// Name of the backend that produced the result.
    pub backend_name: String,
    /// Wall-clock time spent executing.
    pub execution_time: Duration,
}

impl ExecutionResult {
    pub fn new(circuit: &Circuit, counts: Counts, shots: u64, backend_name: impl Into<String>, execution_time: Duration) -> Self {
        Self {
            circuit_name: circuit.name().to_string(),
            counts,
            shots,
            backend_name: backend_name.into(),
            execution_time,
        }
    }

    /// Measurement counts for `circuit`.
    ///
    /// # Errors
    /// `BvError::ExecutionFailure` if this result belongs to a differently named circuit.
    pub fn get_counts(&self, circuit: &Circuit) -> Result<&Counts> {
        if circuit.name() != self.circuit_name {
            return Err(BvError::execution(format!(
                "Result holds counts for circuit '{}', not '{}'",
                self.circuit_name,
                circuit.name()
            )));
        }
        Ok(&self.counts)
    }

    /// Measurement counts regardless of circuit name.
    pub fn counts(&self) -> &Counts {
        &self.counts
    }
}

/// Trait for circuit execution targets.
///
/// Backends are shared across the worker threads of a batch, so they must be
/// `Send + Sync`.
pub trait Backend: Send + Sync {
    /// Backend identifier.
    fn name(&self) -> &str;

    /// Limits of this backend.
    fn capabilities(&self) -> &BackendCapabilities;

    /// Executes `circuit` for `shots` repetitions. The circuit must be flat.
    fn run(&self, circuit: &Circuit, shots: u64) -> Result<ExecutionResult>;

    /// Checks that `circuit` fits this backend.
    fn validate_circuit(&self, circuit: &Circuit) -> Result<()> {
        let caps = self.capabilities();
        if circuit.num_qubits() > caps.max_qubits {
            return Err(BvError::execution(format!(
                "Circuit requires {} qubits, backend '{}' supports max {}",
                circuit.num_qubits(),
                self.name(),
                caps.max_qubits
            )));
        }
        if circuit.has_sub_circuits() {
            return Err(BvError::execution(format!(
                "Backend '{}' only runs flat circuits; decompose '{}' first",
                self.name(),
                circuit.name()
            )));
        }
        if !caps.mid_circuit_measurement && circuit.has_mid_circuit_measurement() {
            return Err(BvError::execution(format!(
                "Backend '{}' does not support mid-circuit measurement",
                self.name()
            )));
        }
        Ok(())
    }
}

/// In-process state-vector backend with an optional symmetric readout error.
#[derive(Debug, Clone)]
pub struct LocalSimulator {
    name: String,
    seed: u64,
    readout_error: f64,
    capabilities: BackendCapabilities,
}

impl LocalSimulator {
    /// An ideal, noiseless simulator.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            seed: 0,
            readout_error: 0.0,
            capabilities: BackendCapabilities {
                max_qubits: MAX_SIMULATED_QUBITS,
                mid_circuit_measurement: true,
            },
        }
    }

    /// Sets the base seed used for sampling.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Flips each measured bit independently with probability `p`.
    ///
    /// # Errors
    /// `BvError::Configuration` unless `0 <= p <= 0.5`.
    pub fn with_readout_error(mut self, p: f64) -> Result<Self> {
        if !(0.0..=0.5).contains(&p) {
            return Err(BvError::configuration(format!(
                "Readout error must lie in [0, 0.5], got {}",
                p
            )));
        }
        self.readout_error = p;
        Ok(self)
    }

    /// Probability of a flipped readout bit.
    pub fn readout_error(&self) -> f64 {
        self.readout_error
    }

    /// Per-circuit seed so results do not depend on batch scheduling.
    fn circuit_seed(&self, circuit: &Circuit) -> u64 {
        mix_seed(self.seed, circuit.name(), &format!("{:?}", circuit.operations()))
    }

    fn apply_readout_error<R: Rng + ?Sized>(&self, counts: Counts, rng: &mut R) -> Counts {
        let mut noisy = Counts::new();
        for (bitstring, n) in counts.iter() {
            for _ in 0..n {
                let flipped: String = bitstring
                    .chars()
                    .map(|b| match (b, rng.random::<f64>() < self.readout_error) {
                        ('0', true) => '1',
                        ('1', true) => '0',
                        (other, _) => other,
                    })
                    .collect();
                noisy.record(flipped);
            }
        }
        noisy
    }
}

impl Backend for LocalSimulator {
    fn name(&self) -> &str {
        &self.name
    }

    fn capabilities(&self) -> &BackendCapabilities {
        &self.capabilities
    }

    fn run(&self, circuit: &Circuit, shots: u64) -> Result<ExecutionResult> {
        self.validate_circuit(circuit)?;
        let start = Instant::now();
        let mut rng = StdRng::seed_from_u64(self.circuit_seed(circuit));
        let mut counts = Simulator::new().run_with_rng(circuit, shots, &mut rng)?;
        if self.readout_error > 0.0 {
            counts = self.apply_readout_error(counts, &mut rng);
        }
        Ok(ExecutionResult::new(circuit, counts, shots, self.name.clone(), start.elapsed()))
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

/// FNV-1a over `seed` (little-endian), `name`, a 0xff separator and `ops`.
/// Fixed so that seeded runs reproduce across toolchains.
fn mix_seed(seed: u64, name: &str, ops: &str) -> u64 {
    seed.to_le_bytes()
        .iter()
        .chain(name.as_bytes())
        .chain(&[0xff])
        .chain(ops.as_bytes())
        .fold(FNV_OFFSET_BASIS, |h, b| (h ^ u64::from(*b)).wrapping_mul(FNV_PRIME))
}

/// Resolves `backend_id` to an execution target.
///
/// Recognised ids: `local_simulator`, `qasm_simulator` and
/// `statevector_simulator` (ideal), and `noisy_simulator`, which reads an
/// optional `readout_error` from the credentials.
///
/// # Errors
/// `BvError::ExecutionFailure` for an unknown id; `BvError::Configuration`
/// for an unparsable or out-of-range `readout_error`.
pub fn select_backend(backend_id: &str, credentials: Option<&DeviceCredentials>) -> Result<Box<dyn Backend>> {
    let backend: Box<dyn Backend> = match backend_id {
        "local_simulator" | "qasm_simulator" | "statevector_simulator" => Box::new(LocalSimulator::new(backend_id)),
        "noisy_simulator" => {
            let p = match credentials.and_then(|c| c.get("readout_error")) {
                Some(raw) => raw.trim().parse::<f64>().map_err(|e| {
                    BvError::configuration(format!("readout_error '{}' is not a number: {}", raw, e))
                })?,
                None => DEFAULT_READOUT_ERROR,
            };
            Box::new(LocalSimulator::new(backend_id).with_readout_error(p)?)
        }
        other => {
            return Err(BvError::execution(format!("Unknown execution target '{}'", other)));
        }
    };
    info!("Execution target set to '{}'", backend.name());
    Ok(backend)
}
