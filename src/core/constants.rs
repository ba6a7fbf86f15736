//! Constants shared by circuit construction, sampling and display.

/// Fixed sizes of the Bernstein-Vazirani benchmark.
pub mod bv_constants {
    /// Smallest circuit the benchmark builds: two input qubits plus the ancilla.
    pub const MIN_QUBITS: usize = 3;
    /// Circuits at or below this size always replace the cached display sample.
    pub const DISPLAY_REPLACE_MAX_QUBITS: usize = 6;
    /// Circuits at or above this size are never cached for display.
    pub const DISPLAY_CEILING_QUBITS: usize = 9;
    /// Above this many measured bits the polarization rescale is skipped.
    pub const MAX_RESCALED_BITS: usize = 16;
    /// Display name of the full algorithm circuit.
    pub const MAIN_CIRCUIT_NAME: &str = "main";
    /// Display name of the oracle sub-circuit.
    pub const ORACLE_NAME: &str = "Uf";
    /// Amplitudes below this squared norm are treated as zero.
    pub const AMPLITUDE_TOLERANCE: f64 = 1e-12;
}
