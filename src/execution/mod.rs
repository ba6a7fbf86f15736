// src/execution/mod.rs

//! Batch execution of benchmark circuits.
//!
//! The [`Executor`] behaves like a batch future: circuits are queued with
//! [`Executor::submit_circuit`] (non-blocking) and run together by
//! [`Executor::execute_circuits`], which executes them in parallel on the
//! selected [`Backend`] and then hands every completed trial to the
//! registered [`ResultHandler`], once, in submission order.

mod backend;

pub use backend::{
    select_backend, Backend, BackendCapabilities, DeviceCredentials, ExecutionResult, LocalSimulator,
    DEFAULT_READOUT_ERROR,
};

use crate::circuits::Circuit;
use crate::core::{BvError, Result};
use rayon::prelude::*;
use std::fmt;
use tracing::{debug, info};

/// Identifies a submitted trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrialHandle(u64);

impl TrialHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TrialHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "trial#{}", self.0)
    }
}

/// A trial whose result is available, as seen by the result handler.
#[derive(Debug, Clone)]
pub struct CompletedTrial {
    pub handle: TrialHandle,
    /// The circuit exactly as it was submitted.
    pub circuit: Circuit,
    pub result: ExecutionResult,
    /// Group key of the trial.
    pub num_qubits: usize,
    /// Trial key: the secret integer encoded by the circuit.
    pub secret_int: u64,
}

/// Receives completed trials.
pub trait ResultHandler {
    fn handle(&mut self, trial: &CompletedTrial) -> Result<()>;
}

impl<F> ResultHandler for F
where
    F: FnMut(&CompletedTrial) -> Result<()>,
{
    fn handle(&mut self, trial: &CompletedTrial) -> Result<()> {
        self(trial)
    }
}

struct PendingTrial {
    handle: TrialHandle,
    circuit: Circuit,
    num_qubits: usize,
    secret_int: u64,
    shots: u64,
}

/// Queues circuits and runs them in batches against one backend.
pub struct Executor {
    backend: Box<dyn Backend>,
    handler: Option<Box<dyn ResultHandler>>,
    pending: Vec<PendingTrial>,
    next_handle: u64,
}

impl Executor {
    /// Creates an executor targeting `backend`, with no handler registered.
    pub fn new(backend: Box<dyn Backend>) -> Self {
        Self {
            backend,
            handler: None,
            pending: Vec::new(),
            next_handle: 0,
        }
    }

    /// Switches the execution target; see [`select_backend`] for the recognised ids.
    pub fn set_execution_target(&mut self, backend_id: &str, credentials: Option<&DeviceCredentials>) -> Result<()> {
        self.backend = select_backend(backend_id, credentials)?;
        Ok(())
    }

    /// Name of the current execution target.
    pub fn backend_name(&self) -> &str {
        self.backend.name()
    }

    /// Registers the handler for completed trials, replacing any previous one.
    /// Trials still queued are discarded.
    pub fn init_execution(&mut self, handler: impl ResultHandler + 'static) {
        self.handler = Some(Box::new(handler));
        self.pending.clear();
    }

    /// Queues `circuit` for execution and returns immediately.
    pub fn submit_circuit(&mut self, circuit: Circuit, num_qubits: usize, secret_int: u64, shots: u64) -> TrialHandle {
        let handle = TrialHandle(self.next_handle);
        self.next_handle += 1;
        debug!(
            "Submitted {} (circuit '{}', num_qubits = {}, secret = {})",
            handle,
            circuit.name(),
            num_qubits,
            secret_int
        );
        self.pending.push(PendingTrial {
            handle,
            circuit,
            num_qubits,
            secret_int,
            shots,
        });
        handle
    }

    /// Number of trials waiting for [`Executor::execute_circuits`].
    pub fn pending(&self) -> usize {
        self.pending.len()
    }

    /// Runs every queued trial and delivers the results to the handler.
    ///
    /// Returns the handles resolved, in submission order. The queue is drained
    /// even on failure, so no trial is delivered twice.
    ///
    /// # Errors
    /// `BvError::ExecutionFailure` if no handler is registered or a trial fails
    /// to execute; any error returned by the handler. Either aborts the batch.
    pub fn execute_circuits(&mut self) -> Result<Vec<TrialHandle>> {
        let batch = std::mem::take(&mut self.pending);
        if batch.is_empty() {
            return Ok(Vec::new());
        }
        let handler = self
            .handler
            .as_mut()
            .ok_or_else(|| BvError::execution("execute_circuits called before init_execution"))?;

        info!("Running {} trials on '{}'", batch.len(), self.backend.name());
        let backend = self.backend.as_ref();
        let outcomes: Vec<Result<ExecutionResult>> = batch
            .par_iter()
            .map(|trial| backend.run(&trial.circuit, trial.shots))
            .collect();

        let mut resolved = Vec::with_capacity(batch.len());
        for (trial, outcome) in batch.into_iter().zip(outcomes) {
            let result = outcome.map_err(|e| match e {
                BvError::ExecutionFailure { .. } => e,
                other => BvError::execution(format!("{} failed: {}", trial.handle, other)),
            })?;
            let completed = CompletedTrial {
                handle: trial.handle,
                circuit: trial.circuit,
                result,
                num_qubits: trial.num_qubits,
                secret_int: trial.secret_int,
            };
            handler.handle(&completed)?;
            resolved.push(completed.handle);
        }
        Ok(resolved)
    }
}

impl fmt::Debug for Executor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Executor")
            .field("backend", &self.backend.name())
            .field("pending", &self.pending.len())
            .field("has_handler", &self.handler.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circuits::CircuitBuilder;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn basis_circuit(name: &str, value: usize, width: usize) -> Result<Circuit> {
        (0..width)
            .fold(CircuitBuilder::new(name, width, width), |b, q| {
                let b = if (value >> q) & 1 == 1 { b.x(q) } else { b };
                b.measure(q, q)
            })
            .build()
    }

    #[test]
    fn test_results_delivered_once_in_submission_order() -> Result<()> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);

        let mut executor = Executor::new(Box::new(LocalSimulator::new("local_simulator")));
        executor.init_execution(move |trial: &CompletedTrial| -> Result<()> {
            let counts = trial.result.get_counts(&trial.circuit)?;
            sink.borrow_mut().push((trial.secret_int, counts.most_frequent().map(|(k, _)| k.to_string())));
            Ok(())
        });

        let mut handles = Vec::new();
        for v in 0..6u64 {
            handles.push(executor.submit_circuit(basis_circuit("main", v as usize, 3)?, 3, v, 64));
        }
        assert_eq!(executor.pending(), 6);

        let resolved = executor.execute_circuits()?;
        assert_eq!(resolved, handles);
        assert_eq!(executor.pending(), 0);

        let seen = seen.borrow();
        assert_eq!(seen.len(), 6);
        for (v, (secret, top)) in seen.iter().enumerate() {
            assert_eq!(*secret, v as u64);
            assert_eq!(top.as_deref(), Some(format!("{:03b}", v).as_str()));
        }

        assert!(executor.execute_circuits()?.is_empty());
        Ok(())
    }

    #[test]
    fn test_execute_without_handler_fails() -> Result<()> {
        let mut executor = Executor::new(Box::new(LocalSimulator::new("local_simulator")));
        executor.submit_circuit(basis_circuit("main", 1, 2)?, 2, 1, 8);
        assert!(matches!(executor.execute_circuits(), Err(BvError::ExecutionFailure { .. })));
        Ok(())
    }

    #[test]
    fn test_handler_error_aborts_batch() -> Result<()> {
        let calls = Rc::new(RefCell::new(0usize));
        let counter = Rc::clone(&calls);
        let mut executor = Executor::new(Box::new(LocalSimulator::new("local_simulator")));
        executor.init_execution(move |_: &CompletedTrial| -> Result<()> {
            *counter.borrow_mut() += 1;
            Err(BvError::contract("rejected"))
        });
        executor.submit_circuit(basis_circuit("main", 0, 2)?, 2, 0, 8);
        executor.submit_circuit(basis_circuit("main", 1, 2)?, 2, 1, 8);

        assert!(matches!(executor.execute_circuits(), Err(BvError::ContractViolation { .. })));
        assert_eq!(*calls.borrow(), 1);
        assert_eq!(executor.pending(), 0);
        Ok(())
    }

    #[test]
    fn test_backend_failure_propagates() -> Result<()> {
        let mut executor = Executor::new(Box::new(LocalSimulator::new("local_simulator")));
        executor.init_execution(|_: &CompletedTrial| -> Result<()> { Ok(()) });
        let inner = CircuitBuilder::new("Uf", 2, 0).cx(0, 1).build()?;
        let nested = CircuitBuilder::new("main", 2, 2).append(inner, &[0, 1]).build()?;
        executor.submit_circuit(nested, 2, 1, 8);
        assert!(matches!(executor.execute_circuits(), Err(BvError::ExecutionFailure { .. })));

        executor.set_execution_target("statevector_simulator", None)?;
        assert_eq!(executor.backend_name(), "statevector_simulator");
        assert!(executor.set_execution_target("nowhere", None).is_err());
        Ok(())
    }
}
