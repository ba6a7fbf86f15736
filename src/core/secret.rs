// src/core/secret.rs

use super::error::{BvError, Result};
use std::fmt;

/// The hidden bit-string the algorithm recovers with a single oracle query.
///
/// Stored canonically as an integer together with its width (`input_size`).
/// Bit `i` of `value` belongs to input qubit `i`; rendered as a string the
/// most significant bit is printed first, so character `width - 1 - i`
/// holds the bit of qubit `i`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Secret {
    value: u64,
    width: usize,
}

impl Secret {
    /// Creates a secret of `width` bits.
    ///
    /// # Errors
    /// `BvError::ContractViolation` when `width` is zero or wider than 63 bits,
    /// or when `value >= 2^width`. Out-of-range values are rejected rather
    /// than silently truncated.
    pub fn new(value: u64, width: usize) -> Result<Self> {
        if width == 0 || width > 63 {
            return Err(BvError::contract(format!(
                "Secret width must be within 1..=63 bits, got {}",
                width
            )));
        }
        if value >= 1u64 << width {
            return Err(BvError::contract(format!(
                "Secret {} does not fit in {} bits (must be < {})",
                value,
                width,
                1u64 << width
            )));
        }
        Ok(Self { value, width })
    }

    /// Creates the secret for a circuit of `num_qubits` (one ancilla included).
    pub fn for_qubits(value: u64, num_qubits: usize) -> Result<Self> {
        if num_qubits < 2 {
            return Err(BvError::contract(format!(
                "A Bernstein-Vazirani circuit needs at least 2 qubits, got {}",
                num_qubits
            )));
        }
        Self::new(value, num_qubits - 1)
    }

    /// The canonical integer form.
    pub fn value(&self) -> u64 {
        self.value
    }

    /// Number of bits (`input_size`).
    pub fn width(&self) -> usize {
        self.width
    }

    /// Whether the bit belonging to input qubit `qubit` is set.
    pub fn bit(&self, qubit: usize) -> bool {
        qubit < self.width && (self.value >> qubit) & 1 == 1
    }

    /// Number of set bits, i.e. the number of oracle links.
    pub fn popcount(&self) -> u32 {
        self.value.count_ones()
    }

    /// Zero-padded binary rendering, most significant bit first.
    pub fn to_bitstring(&self) -> String {
        format!("{:0width$b}", self.value, width = self.width)
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_bitstring())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitstring_is_msb_first() -> Result<()> {
        let s = Secret::new(5, 3)?;
        assert_eq!(s.to_bitstring(), "101");
        assert!(s.bit(0));
        assert!(!s.bit(1));
        assert!(s.bit(2));
        assert!(!s.bit(3));

        let padded = Secret::new(1, 4)?;
        assert_eq!(padded.to_bitstring(), "0001");
        Ok(())
    }

    #[test]
    fn test_rejects_out_of_range_value() {
        let err = Secret::new(8, 3).unwrap_err();
        assert!(matches!(err, BvError::ContractViolation { .. }));
        assert!(Secret::new(7, 3).is_ok());
    }

    #[test]
    fn test_for_qubits_uses_one_ancilla() -> Result<()> {
        let s = Secret::for_qubits(3, 3)?;
        assert_eq!(s.width(), 2);
        assert!(Secret::for_qubits(4, 3).is_err());
        assert!(Secret::for_qubits(0, 1).is_err());
        Ok(())
    }
}
