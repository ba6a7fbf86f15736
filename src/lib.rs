// src/lib.rs

//! `bvbench` - A benchmark of the Bernstein-Vazirani algorithm
//!
//! The library builds the oracle and the algorithm circuit for a hidden
//! bit-string, executes batches of them on a backend, scores the measured
//! distributions with the polarization fidelity and aggregates the scores per
//! problem size.

pub mod core;
pub mod operations;
pub mod circuits;
pub mod simulation;
pub mod validation;
pub mod execution;
pub mod metrics;
pub mod benchmark;
pub mod config;

// Re-export the most common types for easier top-level use
pub use crate::core::{BvError, QubitId, Result, Secret};
pub use operations::Operation;
pub use circuits::{Circuit, CircuitBuilder};
pub use simulation::{Counts, Simulator};
pub use execution::{select_backend, Backend, Executor, LocalSimulator};
pub use metrics::{polarization_fidelity, ExpectedDistribution, FidelityScore, MetricsStore};
pub use benchmark::{analyze, build_circuit, build_oracle, BenchmarkDriver, BenchmarkReport, Construction};
pub use config::BenchmarkConfig;

// Example 1: Recovering a single secret
// Builds the parallel circuit for s = 101 on four qubits, runs it on the
// ideal simulator and scores the result.
/// ```
/// use bvbench::{analyze, build_circuit, Construction, Simulator, BvError};
///
/// let built = build_circuit(4, 5, Construction::Parallel)?;
/// println!("Circuit:\n{}", built.circuit);
///
/// // The oracle is nested; flatten it before simulation
/// let counts = Simulator::new().run(&built.circuit.decompose(), 1000)?;
/// assert_eq!(counts.get("101"), 1000);
///
/// let (_, score) = analyze(counts, 4, 5, false)?;
/// assert!((score.fidelity - 1.0).abs() < 1e-12);
/// # Ok::<(), BvError>(())
/// ```
#[doc(hidden)]
const _: () = (); // Attaches the preceding doc comment block to a hidden item

// Example 2: A small sweep
// Runs the benchmark for 3 and 4 qubits with the sequential construction and
// checks that both groups were aggregated.
/// ```
/// use bvbench::{BenchmarkConfig, BenchmarkDriver, Construction, BvError};
/// use bvbench::benchmark::GroupState;
///
/// let config = BenchmarkConfig {
///     min_qubits: 3,
///     max_qubits: 4,
///     num_shots: 100,
///     method: Construction::Sequential,
///     ..Default::default()
/// };
/// let report = BenchmarkDriver::new(config)?.run()?;
/// assert!(report.groups.iter().all(|g| g.state == GroupState::Reported));
/// println!("{}", report.plot);
/// # Ok::<(), BvError>(())
/// ```
#[doc(hidden)]
const _: () = ();
