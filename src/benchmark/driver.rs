// src/benchmark/driver.rs

//! The benchmark sweep: one group of trials per qubit count, run strictly one
//! group after another.

use super::analyzer::analyze;
use super::factory::{build_circuit, Construction};
use super::recorder::SampleRecorder;
use super::sampling::select_secrets;
use crate::circuits::Circuit;
use crate::config::BenchmarkConfig;
use crate::core::Result;
use crate::execution::{select_backend, Backend, CompletedTrial, Executor};
use crate::metrics::{GroupSummary, MetricsStore, SharedMetrics};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Lifecycle of one qubit-count group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupState {
    Pending,
    Submitting,
    Executing,
    Aggregating,
    Reported,
}

/// Outcome of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupReport {
    pub num_qubits: usize,
    pub state: GroupState,
    /// Secrets tested, in submission order.
    pub secrets: Vec<u64>,
    pub summary: Option<GroupSummary>,
}

impl GroupReport {
    fn pending(num_qubits: usize) -> Self {
        Self {
            num_qubits,
            state: GroupState::Pending,
            secrets: Vec::new(),
            summary: None,
        }
    }
}

/// Everything a finished run produced.
#[derive(Debug, Clone)]
pub struct BenchmarkReport {
    pub method: Construction,
    pub backend: String,
    pub groups: Vec<GroupReport>,
    pub sample_circuit: Option<Circuit>,
    pub sample_oracle: Option<Circuit>,
    /// Text chart across all groups.
    pub plot: String,
}

impl BenchmarkReport {
    /// The report of the group with `num_qubits` qubits.
    pub fn group(&self, num_qubits: usize) -> Option<&GroupReport> {
        self.groups.iter().find(|g| g.num_qubits == num_qubits)
    }
}

impl fmt::Display for BenchmarkReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sample Circuit:")?;
        match &self.sample_circuit {
            Some(circuit) => writeln!(f, "{}", circuit)?,
            None => writeln!(f, "  ... too large!")?,
        }
        writeln!(f, "\nQuantum Oracle 'Uf' =")?;
        match (&self.sample_oracle, self.method) {
            (Some(oracle), _) => writeln!(f, "{}", oracle)?,
            (None, Construction::Sequential) => writeln!(f, "  ... applied bit by bit, no separate oracle")?,
            (None, Construction::Parallel) => writeln!(f, "  ... too large!")?,
        }
        writeln!(f)?;
        write!(f, "{}", self.plot)
    }
}

/// Runs the Bernstein-Vazirani benchmark described by a [`BenchmarkConfig`].
#[derive(Debug)]
pub struct BenchmarkDriver {
    config: BenchmarkConfig,
    metrics: SharedMetrics,
    recorder: SampleRecorder,
}

impl BenchmarkDriver {
    /// # Errors
    /// `BvError::Configuration` if the configuration does not validate.
    pub fn new(config: BenchmarkConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            metrics: MetricsStore::shared(),
            recorder: SampleRecorder::new(),
        })
    }

    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// The metrics store written by the last run.
    pub fn metrics(&self) -> SharedMetrics {
        Arc::clone(&self.metrics)
    }

    /// Runs the sweep on the backend named in the configuration.
    pub fn run(&mut self) -> Result<BenchmarkReport> {
        let backend = select_backend(&self.config.backend_id, self.config.device_credentials.as_ref())?;
        self.run_with_backend(backend)
    }

    /// Runs the sweep on `backend`.
    ///
    /// # Errors
    /// Any construction, execution or metrics failure aborts the run. No
    /// trial is skipped, so a group is either fully reported or not at all.
    pub fn run_with_backend(&mut self, backend: Box<dyn Backend>) -> Result<BenchmarkReport> {
        let method = self.config.method;
        let (min_qubits, max_qubits) = self.config.clamped_bounds();
        info!("Bernstein-Vazirani Benchmark Program ({}) on '{}'", method, backend.name());

        self.metrics.lock().init_metrics();
        self.recorder = SampleRecorder::new();

        let mut executor = Executor::new(backend);
        let metrics = Arc::clone(&self.metrics);
        let verbose = self.config.verbose;
        executor.init_execution(move |trial: &CompletedTrial| -> Result<()> {
            let counts = trial.result.get_counts(&trial.circuit)?.clone();
            let (_, score) = analyze(counts, trial.num_qubits, trial.secret_int, verbose)?;
            let mut store = metrics.lock();
            store.store_metric(trial.num_qubits, trial.secret_int, "fidelity", score.fidelity)?;
            store.store_metric(trial.num_qubits, trial.secret_int, "hf_fidelity", score.hf_fidelity)?;
            store.store_metric(
                trial.num_qubits,
                trial.secret_int,
                "exec_time",
                trial.result.execution_time.as_secs_f64(),
            )?;
            Ok(())
        });

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut groups: Vec<GroupReport> = (min_qubits..=max_qubits).map(GroupReport::pending).collect();
        for group in groups.iter_mut() {
            self.run_group(&mut executor, group, &mut rng)?;
        }

        let plot = self
            .metrics
            .lock()
            .plot_metrics(&format!("Benchmark Results - Bernstein-Vazirani ({})", u8::from(method)));
        Ok(BenchmarkReport {
            method,
            backend: executor.backend_name().to_string(),
            groups,
            sample_circuit: self.recorder.circuit().cloned(),
            sample_oracle: self.recorder.oracle().cloned(),
            plot,
        })
    }

    fn run_group(&mut self, executor: &mut Executor, group: &mut GroupReport, rng: &mut StdRng) -> Result<()> {
        let num_qubits = group.num_qubits;
        let input_size = num_qubits - 1;
        let secrets = select_secrets(input_size, self.config.max_circuits, rng)?;
        info!("Executing [{}] circuits with num_qubits = {}", secrets.len(), num_qubits);

        group.state = GroupState::Submitting;
        for &secret in &secrets {
            let start = Instant::now();
            let built = build_circuit(num_qubits, secret, self.config.method)?;
            let create_time = start.elapsed().as_secs_f64();
            self.metrics
                .lock()
                .store_metric(num_qubits, secret, "create_time", create_time)?;

            self.recorder.offer_circuit(num_qubits, &built.circuit);
            if let Some(oracle) = &built.oracle {
                self.recorder.offer_oracle(num_qubits, oracle);
            }
            let handle = executor.submit_circuit(built.circuit.decompose(), num_qubits, secret, self.config.num_shots);
            debug!("Secret {} submitted as {}", secret, handle);
        }
        group.secrets = secrets;

        group.state = GroupState::Executing;
        executor.execute_circuits()?;

        group.state = GroupState::Aggregating;
        let mut store = self.metrics.lock();
        let summary = store.aggregate_metrics_for_group(num_qubits)?;
        store.report_metrics_for_group(num_qubits)?;
        group.summary = Some(summary);
        group.state = GroupState::Reported;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::BvError;
    use crate::execution::{BackendCapabilities, ExecutionResult, LocalSimulator};
    use parking_lot::Mutex;

    fn config(min_qubits: usize, max_qubits: usize, max_circuits: usize) -> BenchmarkConfig {
        BenchmarkConfig {
            min_qubits,
            max_qubits,
            max_circuits,
            num_shots: 128,
            ..Default::default()
        }
    }

    #[test]
    fn test_groups_reach_reported_with_ideal_fidelity() -> Result<()> {
        let mut driver = BenchmarkDriver::new(config(3, 4, 30))?;
        let report = driver.run()?;
        assert_eq!(report.groups.len(), 2);
        for group in &report.groups {
            assert_eq!(group.state, GroupState::Reported);
            let mean = group.summary.as_ref().and_then(|s| s.mean("fidelity"));
            assert!(mean.is_some_and(|m| (m - 1.0).abs() < 1e-9));
        }
        assert_eq!(report.group(3).map(|g| g.secrets.clone()), Some(vec![0, 1, 2, 3]));
        assert_eq!(report.group(4).map(|g| g.secrets.len()), Some(8));

        let metrics = driver.metrics();
        let store = metrics.lock();
        for secret in 0..8 {
            assert_eq!(store.get_metric(4, secret, "fidelity"), Some(1.0));
            assert!(store.get_metric(4, secret, "create_time").is_some());
            assert!(store.get_metric(4, secret, "exec_time").is_some());
        }
        Ok(())
    }

    #[test]
    fn test_bounds_are_clamped() -> Result<()> {
        let report = BenchmarkDriver::new(config(1, 2, 4))?.run()?;
        assert_eq!(report.groups.len(), 1);
        assert_eq!(report.groups[0].num_qubits, 3);
        Ok(())
    }

    #[test]
    fn test_large_groups_are_subsampled_reproducibly() -> Result<()> {
        let first = BenchmarkDriver::new(config(6, 6, 5))?.run()?;
        let second = BenchmarkDriver::new(config(6, 6, 5))?.run()?;
        let secrets = &first.groups[0].secrets;
        assert_eq!(secrets.len(), 5);
        assert_eq!(secrets, &second.groups[0].secrets);
        assert_eq!(first.groups[0].summary.as_ref().map(|s| s.num_trials), Some(5));
        Ok(())
    }

    #[test]
    fn test_report_carries_display_samples() -> Result<()> {
        let report = BenchmarkDriver::new(config(3, 5, 4))?.run()?;
        assert_eq!(report.sample_circuit.as_ref().map(|c| c.num_qubits()), Some(5));
        assert_eq!(report.sample_oracle.as_ref().map(|c| c.name()), Some("Uf"));
        let rendered = report.to_string();
        assert!(rendered.starts_with("Sample Circuit:"));
        assert!(rendered.contains("Benchmark Results - Bernstein-Vazirani (1)"));
        Ok(())
    }

    #[test]
    fn test_groups_run_one_after_another() -> Result<()> {
        let mut driver = BenchmarkDriver::new(config(3, 5, 4))?;
        let arrivals = Arc::new(Mutex::new(Vec::new()));
        let backend = RecordingBackend {
            inner: LocalSimulator::new("recording"),
            metrics: driver.metrics(),
            arrivals: Arc::clone(&arrivals),
        };
        let report = driver.run_with_backend(Box::new(backend))?;
        assert!(report.groups.iter().all(|g| g.state == GroupState::Reported));

        let arrivals = arrivals.lock();
        assert_eq!(arrivals.len(), 12);
        let order: Vec<usize> = arrivals.iter().map(|a| a.num_qubits).collect();
        assert_eq!(order, [vec![3usize; 4], vec![4; 4], vec![5; 4]].concat());
        for arrival in arrivals.iter() {
            assert_eq!(arrival.previous_reported, arrival.num_qubits > 3, "{:?}", arrival);
            assert_eq!(arrival.submitted, 4, "{:?}", arrival);
            assert_eq!(arrival.scored, 0, "{:?}", arrival);
            assert!(!arrival.next_started, "{:?}", arrival);
        }
        Ok(())
    }

    #[test]
    fn test_execution_failure_propagates() -> Result<()> {
        let mut driver = BenchmarkDriver::new(config(3, 3, 4))?;
        let result = driver.run_with_backend(Box::new(TwoQubitBackend::default()));
        assert!(matches!(result, Err(BvError::ExecutionFailure { .. })));

        let unknown = BenchmarkConfig {
            backend_id: "ibmq_jakarta".to_string(),
            ..config(3, 3, 4)
        };
        assert!(BenchmarkDriver::new(unknown)?.run().is_err());
        Ok(())
    }

    /// What the metrics store looked like when a trial reached the backend.
    #[derive(Debug)]
    struct Arrival {
        num_qubits: usize,
        previous_reported: bool,
        submitted: usize,
        scored: usize,
        next_started: bool,
    }

    /// Ideal backend that snapshots the metrics store on every run.
    struct RecordingBackend {
        inner: LocalSimulator,
        metrics: SharedMetrics,
        arrivals: Arc<Mutex<Vec<Arrival>>>,
    }

    impl Backend for RecordingBackend {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn capabilities(&self) -> &BackendCapabilities {
            self.inner.capabilities()
        }

        fn run(&self, circuit: &Circuit, shots: u64) -> Result<ExecutionResult> {
            let n = circuit.num_qubits();
            let arrival = {
                let store = self.metrics.lock();
                let trials = store.trials(n);
                Arrival {
                    num_qubits: n,
                    previous_reported: store.group_summary(n - 1).is_some(),
                    submitted: trials.len(),
                    scored: trials
                        .iter()
                        .filter(|s| store.get_metric(n, **s, "fidelity").is_some())
                        .count(),
                    next_started: !store.trials(n + 1).is_empty(),
                }
            };
            self.arrivals.lock().push(arrival);
            self.inner.run(circuit, shots)
        }
    }

    /// Too narrow for any benchmark circuit of the parallel construction.
    struct TwoQubitBackend {
        inner: LocalSimulator,
        capabilities: BackendCapabilities,
    }

    impl Default for TwoQubitBackend {
        fn default() -> Self {
            Self {
                inner: LocalSimulator::new("two_qubit"),
                capabilities: BackendCapabilities {
                    max_qubits: 2,
                    mid_circuit_measurement: true,
                },
            }
        }
    }

    impl Backend for TwoQubitBackend {
        fn name(&self) -> &str {
            self.inner.name()
        }

        fn capabilities(&self) -> &BackendCapabilities {
            &self.capabilities
        }

        fn run(&self, circuit: &Circuit, shots: u64) -> Result<ExecutionResult> {
            self.validate_circuit(circuit)?;
            self.inner.run(circuit, shots)
        }
    }
}
