// src/metrics/mod.rs

//! Metric storage, per-group aggregation, reporting and a text plot.
//!
//! Metrics are keyed by `(group, trial, name)`: for the benchmark the group is
//! the qubit count and the trial is the secret integer. Each key is written
//! once; the store is shared with the execution result handler behind a mutex.

mod fidelity;

pub use fidelity::{hellinger_fidelity, polarization_fidelity, ExpectedDistribution, FidelityScore};

use crate::core::{BvError, Result};
use parking_lot::Mutex;
use statrs::statistics::Statistics;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Group key: problem size (number of qubits).
pub type GroupKey = usize;
/// Trial key: the secret integer tested.
pub type TrialKey = u64;

/// A metrics store shared between the driver and the result handler.
pub type SharedMetrics = Arc<Mutex<MetricsStore>>;

/// Summary statistics of one metric across the trials of a group.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MetricSummary {
    pub count: usize,
    pub mean: f64,
    /// Population standard deviation.
    pub std_dev: f64,
    pub min: f64,
    pub max: f64,
}

impl MetricSummary {
    fn from_values(values: &[f64]) -> Self {
        Self {
            count: values.len(),
            mean: Statistics::mean(values.iter()),
            std_dev: Statistics::population_std_dev(values.iter()),
            min: Statistics::min(values.iter()),
            max: Statistics::max(values.iter()),
        }
    }
}

/// Aggregated metrics of one group.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupSummary {
    pub group: GroupKey,
    pub num_trials: usize,
    pub metrics: BTreeMap<String, MetricSummary>,
}

impl GroupSummary {
    /// Mean of `metric` across the group, if it was recorded.
    pub fn mean(&self, metric: &str) -> Option<f64> {
        self.metrics.get(metric).map(|m| m.mean)
    }
}

impl fmt::Display for GroupSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Group {} ({} trials):", self.group, self.num_trials)?;
        for (name, m) in &self.metrics {
            writeln!(
                f,
                "  {:<12} mean={:.4} std={:.4} min={:.4} max={:.4} (n={})",
                name, m.mean, m.std_dev, m.min, m.max, m.count
            )?;
        }
        Ok(())
    }
}

/// Append-only metric records plus the summaries computed from them.
#[derive(Debug, Default)]
pub struct MetricsStore {
    records: BTreeMap<GroupKey, BTreeMap<TrialKey, BTreeMap<String, f64>>>,
    summaries: BTreeMap<GroupKey, GroupSummary>,
}

impl MetricsStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store ready to be shared with a result handler.
    pub fn shared() -> SharedMetrics {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Clears every record and summary for a fresh run.
    pub fn init_metrics(&mut self) {
        self.records.clear();
        self.summaries.clear();
    }

    /// Records `value` under `(group, trial, name)`.
    ///
    /// # Errors
    /// `BvError::ContractViolation` if the key was already written.
    pub fn store_metric(&mut self, group: GroupKey, trial: TrialKey, name: &str, value: f64) -> Result<()> {
        let trial_metrics = self.records.entry(group).or_default().entry(trial).or_default();
        if trial_metrics.contains_key(name) {
            return Err(BvError::contract(format!(
                "Metric '{}' already stored for group {} trial {}",
                name, group, trial
            )));
        }
        trial_metrics.insert(name.to_string(), value);
        Ok(())
    }

    /// Looks up a single stored value.
    pub fn get_metric(&self, group: GroupKey, trial: TrialKey, name: &str) -> Option<f64> {
        self.records.get(&group)?.get(&trial)?.get(name).copied()
    }

    /// Trials with at least one metric in `group`, in ascending order.
    pub fn trials(&self, group: GroupKey) -> Vec<TrialKey> {
        self.records
            .get(&group)
            .map(|trials| trials.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Groups with at least one metric, in ascending order.
    pub fn groups(&self) -> Vec<GroupKey> {
        self.records.keys().copied().collect()
    }

    /// Summarizes every metric name recorded for `group` and keeps the result.
    ///
    /// # Errors
    /// `BvError::ContractViolation` when nothing was recorded for `group`.
    pub fn aggregate_metrics_for_group(&mut self, group: GroupKey) -> Result<GroupSummary> {
        let trials = self
            .records
            .get(&group)
            .ok_or_else(|| BvError::contract(format!("No metrics recorded for group {}", group)))?;

        let mut by_name: BTreeMap<String, Vec<f64>> = BTreeMap::new();
        for metrics in trials.values() {
            for (name, value) in metrics {
                by_name.entry(name.clone()).or_default().push(*value);
            }
        }
        let summary = GroupSummary {
            group,
            num_trials: trials.len(),
            metrics: by_name
                .into_iter()
                .map(|(name, values)| (name, MetricSummary::from_values(&values)))
                .collect(),
        };
        self.summaries.insert(group, summary.clone());
        Ok(summary)
    }

    /// The summary computed by the last aggregation of `group`.
    pub fn group_summary(&self, group: GroupKey) -> Option<&GroupSummary> {
        self.summaries.get(&group)
    }

    /// Logs the aggregated metrics of `group` and returns the rendered report.
    ///
    /// # Errors
    /// `BvError::ContractViolation` when the group has not been aggregated.
    pub fn report_metrics_for_group(&self, group: GroupKey) -> Result<String> {
        let summary = self.summaries.get(&group).ok_or_else(|| {
            BvError::contract(format!("Group {} must be aggregated before it is reported", group))
        })?;
        let report = summary.to_string();
        for line in report.lines() {
            info!("{}", line);
        }
        Ok(report)
    }

    /// Renders a text chart of every aggregated group: a bar for the mean
    /// fidelity plus mean creation and execution times.
    pub fn plot_metrics(&self, title: &str) -> String {
        const BAR_WIDTH: usize = 40;
        let mut out = format!("{}\n{}\n", title, "=".repeat(title.chars().count()));
        if self.summaries.is_empty() {
            out.push_str("  (no aggregated groups)\n");
            return out;
        }
        for (group, summary) in &self.summaries {
            let fidelity = summary.mean("fidelity").unwrap_or(0.0).clamp(0.0, 1.0);
            let filled = (fidelity * BAR_WIDTH as f64).round() as usize;
            out.push_str(&format!(
                "  {:>3} qubits |{}{}| fidelity {:.3}",
                group,
                "█".repeat(filled),
                " ".repeat(BAR_WIDTH - filled),
                fidelity
            ));
            if let Some(create) = summary.mean("create_time") {
                out.push_str(&format!("  create {:.3} ms", create * 1e3));
            }
            if let Some(exec) = summary.mean("exec_time") {
                out.push_str(&format!("  exec {:.3} ms", exec * 1e3));
            }
            out.push('\n');
        }
        out
    }
}
