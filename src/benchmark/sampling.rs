// src/benchmark/sampling.rs

use crate::core::{BvError, Result};
use rand::Rng;
use rand::seq::index;

/// Picks the secrets tested for one group of `input_size`-bit secrets.
///
/// When all `2^input_size` secrets fit within `max_circuits` they are returned
/// in ascending order. Otherwise `max_circuits` distinct secrets are drawn
/// uniformly without replacement from `rng`, in draw order.
///
/// # Errors
/// `BvError::ContractViolation` if `2^input_size` does not fit in `usize`.
pub fn select_secrets<R: Rng + ?Sized>(input_size: usize, max_circuits: usize, rng: &mut R) -> Result<Vec<u64>> {
    if input_size >= usize::BITS as usize - 1 {
        return Err(BvError::contract(format!(
            "Cannot enumerate secrets of {} bits",
            input_size
        )));
    }
    let population = 1usize << input_size;
    let num_circuits = population.min(max_circuits);
    if population <= max_circuits {
        return Ok((0..num_circuits as u64).collect());
    }
    Ok(index::sample(rng, population, num_circuits)
        .into_iter()
        .map(|s| s as u64)
        .collect())
}
