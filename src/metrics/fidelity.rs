// src/metrics/fidelity.rs

//! Polarization fidelity: agreement between observed counts and the ideal
//! outcome distribution, rescaled so that random guessing scores 0.

use crate::core::constants::bv_constants::MAX_RESCALED_BITS;
use crate::simulation::Counts;
use std::collections::BTreeMap;
use std::fmt;

/// The ideal outcome distribution of a circuit, keyed by fixed-width bit-strings.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpectedDistribution {
    probabilities: BTreeMap<String, f64>,
}

impl ExpectedDistribution {
    /// All probability on `key`.
    pub fn point_mass(key: impl Into<String>) -> Self {
        let mut probabilities = BTreeMap::new();
        probabilities.insert(key.into(), 1.0);
        Self { probabilities }
    }

    /// Number of measured bits, taken from the width of the keys.
    pub fn width(&self) -> usize {
        self.probabilities.keys().next().map(|k| k.len()).unwrap_or(0)
    }

    /// Probability assigned to `key`.
    pub fn get(&self, key: &str) -> f64 {
        self.probabilities.get(key).copied().unwrap_or(0.0)
    }

    /// Iterates `(bit-string, probability)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.probabilities.iter().map(|(k, v)| (k.as_str(), *v))
    }

    fn normalized(&self) -> BTreeMap<String, f64> {
        normalize(self.probabilities.iter().map(|(k, v)| (k.clone(), *v)))
    }
}

/// Score returned by [`polarization_fidelity`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FidelityScore {
    /// Rescaled fidelity: 1 for the ideal distribution, 0 for uniform noise (or worse).
    pub fidelity: f64,
    /// Raw Hellinger fidelity before rescaling.
    pub hf_fidelity: f64,
}

impl FidelityScore {
    /// Score of a degenerate (empty) observation.
    pub const ZERO: FidelityScore = FidelityScore { fidelity: 0.0, hf_fidelity: 0.0 };
}

impl fmt::Display for FidelityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fidelity={:.4} (hellinger={:.4})", self.fidelity, self.hf_fidelity)
    }
}

/// Sums weights per key (keys that collide after padding are merged), then
/// scales them to a total of 1.
fn normalize(entries: impl Iterator<Item = (String, f64)>) -> BTreeMap<String, f64> {
    let mut merged: BTreeMap<String, f64> = BTreeMap::new();
    for (k, v) in entries {
        *merged.entry(k).or_insert(0.0) += v;
    }
    let total: f64 = merged.values().sum();
    if total <= 0.0 {
        return BTreeMap::new();
    }
    merged.values_mut().for_each(|v| *v /= total);
    merged
}

/// Hellinger fidelity `(Σ_k sqrt(p_k q_k))²` of two normalized distributions.
pub fn hellinger_fidelity(p: &BTreeMap<String, f64>, q: &BTreeMap<String, f64>) -> f64 {
    let overlap: f64 = p
        .iter()
        .filter_map(|(k, pv)| q.get(k).map(|qv| (pv * qv).sqrt()))
        .sum();
    (overlap * overlap).clamp(0.0, 1.0)
}

/// Hellinger fidelity of the uniform distribution over `2^width` outcomes
/// against `expected`, computed without enumerating the outcomes.
fn uniform_floor(expected: &BTreeMap<String, f64>, width: usize) -> f64 {
    let uniform_p = 0.5f64.powi(width as i32);
    let overlap: f64 = expected.values().map(|q| (uniform_p * q).sqrt()).sum();
    (overlap * overlap).clamp(0.0, 1.0)
}

/// Maps `fidelity` linearly so that `floor` lands on `new_floor` and 1 stays 1,
/// clamped into [0, 1].
fn rescale_fidelity(fidelity: f64, floor: f64, new_floor: f64) -> f64 {
    let rescaled = (1.0 - new_floor) / (1.0 - floor) * (fidelity - 1.0) + 1.0;
    rescaled.clamp(0.0, 1.0)
}

/// Polarization fidelity of `counts` against `expected`.
///
/// Count keys shorter than the expected width are zero-filled on the left.
/// Empty counts score 0. Above 16 measured bits the rescale is skipped and
/// the raw Hellinger fidelity is returned as the fidelity.
pub fn polarization_fidelity(counts: &Counts, expected: &ExpectedDistribution) -> FidelityScore {
    let width = expected.width();
    let observed = normalize(
        counts
            .iter()
            .map(|(k, v)| (format!("{:0>width$}", k, width = width), v as f64)),
    );
    let ideal = expected.normalized();
    if observed.is_empty() || ideal.is_empty() {
        return FidelityScore::ZERO;
    }

    let hf_fidelity = hellinger_fidelity(&observed, &ideal);
    if width > MAX_RESCALED_BITS {
        return FidelityScore { fidelity: hf_fidelity, hf_fidelity };
    }

    let floor = uniform_floor(&ideal, width);
    if floor >= 1.0 {
        return FidelityScore { fidelity: hf_fidelity, hf_fidelity };
    }
    FidelityScore {
        fidelity: rescale_fidelity(hf_fidelity, floor, 0.0),
        hf_fidelity,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_perfect_counts_score_one() {
        let counts: Counts = [("101", 1024)].into_iter().collect();
        let score = polarization_fidelity(&counts, &ExpectedDistribution::point_mass("101"));
        assert!((score.fidelity - 1.0).abs() < TOL);
        assert!((score.hf_fidelity - 1.0).abs() < TOL);
    }

    #[test]
    fn test_uniform_counts_score_zero() {
        let counts: Counts = (0..8u32).map(|k| (format!("{:03b}", k), 100u64)).collect();
        let score = polarization_fidelity(&counts, &ExpectedDistribution::point_mass("011"));
        assert!(score.fidelity.abs() < 1e-9, "{}", score);
        assert!((score.hf_fidelity - 0.125).abs() < 1e-9);
    }

    #[test]
    fn test_total_disagreement_clamps_to_zero() {
        let counts: Counts = [("000", 10)].into_iter().collect();
        let score = polarization_fidelity(&counts, &ExpectedDistribution::point_mass("111"));
        assert_eq!(score.fidelity, 0.0);
        assert_eq!(score.hf_fidelity, 0.0);
    }

    #[test]
    fn test_spreading_lowers_fidelity() {
        let expected = ExpectedDistribution::point_mass("00");
        let sharp: Counts = [("00", 90), ("01", 10)].into_iter().collect();
        let broad: Counts = [("00", 50), ("01", 20), ("10", 20), ("11", 10)].into_iter().collect();
        let f_sharp = polarization_fidelity(&sharp, &expected).fidelity;
        let f_broad = polarization_fidelity(&broad, &expected).fidelity;
        assert!(f_sharp > f_broad && f_broad > 0.0, "{} vs {}", f_sharp, f_broad);
    }

    #[test]
    fn test_empty_counts_and_short_keys() {
        let expected = ExpectedDistribution::point_mass("0011");
        assert_eq!(polarization_fidelity(&Counts::new(), &expected), FidelityScore::ZERO);

        let short: Counts = [("11", 5)].into_iter().collect();
        assert!((polarization_fidelity(&short, &expected).fidelity - 1.0).abs() < TOL);
    }

    #[test]
    fn test_mixed_width_keys_are_merged() {
        let expected = ExpectedDistribution::point_mass("011");
        let counts: Counts = [("11", 5), ("011", 5)].into_iter().collect();
        let score = polarization_fidelity(&counts, &expected);
        assert!((score.fidelity - 1.0).abs() < TOL, "{}", score);
        assert!((score.hf_fidelity - 1.0).abs() < TOL, "{}", score);

        let split: Counts = [("1", 3), ("001", 3), ("10", 2)].into_iter().collect();
        let score = polarization_fidelity(&split, &ExpectedDistribution::point_mass("001"));
        assert!((score.hf_fidelity - 0.75).abs() < TOL, "{}", score);
    }

    #[test]
    fn test_wide_outcomes_skip_rescale() {
        let key = "1".repeat(17);
        let mut counts = Counts::new();
        counts.add(key.clone(), 3);
        counts.add("0".repeat(17), 1);
        let score = polarization_fidelity(&counts, &ExpectedDistribution::point_mass(key));
        assert_eq!(score.fidelity, score.hf_fidelity);
        assert!((score.hf_fidelity - 0.75).abs() < 1e-9);
    }
}
