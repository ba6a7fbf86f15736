// src/validation/mod.rs

//! Sanity checks on simulated state vectors.

use crate::core::{BvError, Result, StateVector};

const DEFAULT_NORM_TOLERANCE: f64 = 1e-9;

/// Checks that the squared amplitudes sum to 1 within `tolerance`
/// (default 1e-9).
///
/// # Errors
/// `BvError::Simulation` when the state has drifted away from unit norm.
pub fn check_normalization(state: &StateVector, tolerance: Option<f64>) -> Result<()> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    let norm_sq: f64 = state.amplitudes().iter().map(|c| c.norm_sqr()).sum();
    if (norm_sq - 1.0).abs() > effective_tolerance {
        Err(BvError::simulation(format!(
            "State vector normalization failed. Sum(|c_i|^2) = {} (Deviation > {})",
            norm_sq, effective_tolerance
        )))
    } else {
        Ok(())
    }
}

/// Returns the basis index holding (almost) all of the probability mass, if any.
///
/// Used to confirm that an ideal Bernstein-Vazirani run ends in a single
/// computational basis state.
pub fn dominant_basis_state(state: &StateVector, tolerance: Option<f64>) -> Option<usize> {
    let effective_tolerance = tolerance.unwrap_or(DEFAULT_NORM_TOLERANCE);
    state
        .probabilities()
        .iter()
        .position(|p| (p - 1.0).abs() <= effective_tolerance)
}
