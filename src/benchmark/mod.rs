// src/benchmark/mod.rs

//! The Bernstein-Vazirani benchmark.
//!
//! * [`build_oracle`] encodes a secret as controlled flips onto the ancilla.
//! * [`build_circuit`] wraps the oracle into the full algorithm, in one of two
//!   [`Construction`]s.
//! * [`analyze`] scores measurement counts against the ideal single peak.
//! * [`BenchmarkDriver`] sweeps qubit counts, submits one batch per group and
//!   aggregates the metrics of each group before moving on.

mod analyzer;
mod driver;
mod factory;
mod oracle;
mod recorder;
mod sampling;

pub use analyzer::{analyze, expected_distribution};
pub use driver::{BenchmarkDriver, BenchmarkReport, GroupReport, GroupState};
pub use factory::{build_circuit, BuiltCircuit, Construction};
pub use oracle::build_oracle;
pub use recorder::{should_replace, SampleRecorder};
pub use sampling::select_secrets;
