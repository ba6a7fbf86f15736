// src/core/mod.rs

//! Core data structures and types

pub mod error;
pub mod secret;
pub mod state;

// Re-export public types for convenient access via `bvbench::core::TypeName`
pub use error::{BvError, QubitId, Result};
pub use secret::Secret;
pub use state::StateVector;

pub mod constants;
pub use constants::bv_constants::{
    DISPLAY_CEILING_QUBITS, DISPLAY_REPLACE_MAX_QUBITS, MAIN_CIRCUIT_NAME, MIN_QUBITS, ORACLE_NAME,
};
