// src/benchmark/recorder.rs

use crate::circuits::Circuit;
use crate::core::{DISPLAY_CEILING_QUBITS, DISPLAY_REPLACE_MAX_QUBITS};

/// Whether a circuit of `candidate` qubits should replace the cached display
/// sample built for `current` qubits (`None` when nothing is cached).
///
/// Small circuits keep replacing the sample; larger ones are only taken when
/// the cache is empty; nothing at or above the display ceiling is kept.
pub fn should_replace(current: Option<usize>, candidate: usize) -> bool {
    (current.is_none() || candidate <= DISPLAY_REPLACE_MAX_QUBITS) && candidate < DISPLAY_CEILING_QUBITS
}

#[derive(Debug, Clone)]
struct Sample {
    num_qubits: usize,
    circuit: Circuit,
}

/// Keeps one representative algorithm circuit and one oracle for the final
/// summary. Presentation only.
#[derive(Debug, Clone, Default)]
pub struct SampleRecorder {
    circuit: Option<Sample>,
    oracle: Option<Sample>,
}

impl SampleRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offers an algorithm circuit; returns whether it was kept.
    pub fn offer_circuit(&mut self, num_qubits: usize, circuit: &Circuit) -> bool {
        offer(&mut self.circuit, num_qubits, circuit)
    }

    /// Offers an oracle; returns whether it was kept.
    pub fn offer_oracle(&mut self, num_qubits: usize, oracle: &Circuit) -> bool {
        offer(&mut self.oracle, num_qubits, oracle)
    }

    pub fn circuit(&self) -> Option<&Circuit> {
        self.circuit.as_ref().map(|s| &s.circuit)
    }

    pub fn oracle(&self) -> Option<&Circuit> {
        self.oracle.as_ref().map(|s| &s.circuit)
    }

    /// Qubit count of the cached algorithm circuit.
    pub fn circuit_qubits(&self) -> Option<usize> {
        self.circuit.as_ref().map(|s| s.num_qubits)
    }
}

fn offer(slot: &mut Option<Sample>, num_qubits: usize, circuit: &Circuit) -> bool {
    if !should_replace(slot.as_ref().map(|s| s.num_qubits), num_qubits) {
        return false;
    }
    *slot = Some(Sample {
        num_qubits,
        circuit: circuit.clone(),
    });
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy() {
        assert!(should_replace(None, 3));
        assert!(should_replace(None, 8));
        assert!(!should_replace(None, 9));
        assert!(should_replace(Some(8), 6));
        assert!(!should_replace(Some(6), 7));
        assert!(!should_replace(Some(3), 12));
    }

    #[test]
    fn test_recorder_keeps_last_small_circuit() {
        let mut recorder = SampleRecorder::new();
        assert!(recorder.circuit().is_none());

        assert!(recorder.offer_circuit(8, &Circuit::new("main", 8, 7)));
        assert!(recorder.offer_circuit(5, &Circuit::new("main", 5, 4)));
        assert!(recorder.offer_circuit(6, &Circuit::new("main", 6, 5)));
        assert!(!recorder.offer_circuit(7, &Circuit::new("main", 7, 6)));
        assert_eq!(recorder.circuit_qubits(), Some(6));
        assert_eq!(recorder.circuit().map(|c| c.num_qubits()), Some(6));

        assert!(!recorder.offer_oracle(10, &Circuit::new("Uf", 10, 0)));
        assert!(recorder.oracle().is_none());
        assert!(recorder.offer_oracle(4, &Circuit::new("Uf", 4, 0)));
        assert_eq!(recorder.oracle().map(|o| o.name()), Some("Uf"));
    }
}
