// tests/simulation_tests.rs

use bvbench::{
    simulation::Counts, BvError, Circuit, CircuitBuilder, Operation, QubitId, Simulator,
};
use std::f64::consts::FRAC_1_SQRT_2;

// Helper to check that every shot landed on one bit-string
fn check_single_outcome(counts: &Counts, expected: &str, shots: u64) {
    assert_eq!(counts.len(), 1, "Expected a single outcome, got {}", counts);
    assert_eq!(counts.get(expected), shots, "Mismatch for outcome {}: {}", expected, counts);
}

#[test]
fn test_unmeasured_circuit_records_empty_strings() -> Result<(), BvError> {
    let circuit = Circuit::new("idle", 2, 0);
    let counts = Simulator::new().run(&circuit, 10)?;
    check_single_outcome(&counts, "", 10);
    Ok(())
}

#[test]
fn test_initial_state_measures_zero() -> Result<(), BvError> {
    let circuit = CircuitBuilder::new("zero", 3, 3)
        .measure(0, 0)
        .measure(1, 1)
        .measure(2, 2)
        .build()?;
    check_single_outcome(&Simulator::new().run(&circuit, 50)?, "000", 50);
    Ok(())
}

#[test]
fn test_flip_and_controlled_flip() -> Result<(), BvError> {
    // X(q0), CX(q0 -> q2): q0 = 1, q1 = 0, q2 = 1
    let circuit = CircuitBuilder::new("cx", 3, 3)
        .x(0)
        .cx(0, 2)
        .measure(0, 0)
        .measure(1, 1)
        .measure(2, 2)
        .build()?;
    check_single_outcome(&Simulator::new().run(&circuit, 20)?, "101", 20);
    Ok(())
}

#[test]
fn test_hadamard_twice_is_identity() -> Result<(), BvError> {
    let circuit = CircuitBuilder::new("hh", 1, 1).h(0).barrier().h(0).measure(0, 0).build()?;
    check_single_outcome(&Simulator::new().run(&circuit, 20)?, "0", 20);
    Ok(())
}

#[test]
fn test_phase_kickback_onto_minus_state() -> Result<(), BvError> {
    // ancilla in |->; H CX H on the work qubit flips it to |1>
    let circuit = CircuitBuilder::new("kickback", 2, 1)
        .x(1)
        .h(1)
        .h(0)
        .cx(0, 1)
        .h(0)
        .measure(0, 0)
        .build()?;
    check_single_outcome(&Simulator::new().run(&circuit, 64)?, "1", 64);
    Ok(())
}

#[test]
fn test_final_state_of_bell_pair() -> Result<(), BvError> {
    let circuit = CircuitBuilder::new("bell", 2, 2).h(0).cx(0, 1).measure(0, 0).measure(1, 1).build()?;
    let state = Simulator::new().final_state(&circuit)?;
    let amps = state.amplitudes();
    assert!((amps[0].re - FRAC_1_SQRT_2).abs() < 1e-12);
    assert!(amps[1].norm() < 1e-12);
    assert!(amps[2].norm() < 1e-12);
    assert!((amps[3].re - FRAC_1_SQRT_2).abs() < 1e-12);

    // Measured outcomes are perfectly correlated
    let counts = Simulator::with_seed(3).run(&circuit, 500)?;
    assert_eq!(counts.get("00") + counts.get("11"), 500);
    assert!(counts.get("00") > 150 && counts.get("11") > 150, "{}", counts);
    Ok(())
}

#[test]
fn test_nested_circuit_runs_after_decompose() -> Result<(), BvError> {
    let inner = CircuitBuilder::new("inner", 2, 0).x(0).cx(0, 1).build()?;
    // inner qubit 0 -> outer qubit 2, inner qubit 1 -> outer qubit 0
    let outer = CircuitBuilder::new("outer", 3, 3)
        .append(inner, &[2, 0])
        .measure(0, 0)
        .measure(1, 1)
        .measure(2, 2)
        .build()?;

    assert!(matches!(Simulator::new().run(&outer, 1), Err(BvError::Simulation { .. })));
    let flat = outer.decompose();
    assert_eq!(flat.name(), "outer");
    assert!(!flat.has_sub_circuits());
    assert_eq!(
        flat.operations()[1],
        Operation::ControlledFlip { control: QubitId(2), target: QubitId(0) }
    );
    check_single_outcome(&Simulator::new().run(&flat, 8)?, "101", 8);
    Ok(())
}

#[test]
fn test_invalid_operations_are_rejected_by_builder() {
    assert!(CircuitBuilder::new("bad", 2, 1).x(2).build().is_err());
    assert!(CircuitBuilder::new("bad", 2, 1).cx(1, 1).build().is_err());
    assert!(CircuitBuilder::new("bad", 2, 1).measure(0, 1).build().is_err());
    assert!(CircuitBuilder::new("bad", 2, 1).append(Circuit::new("w", 3, 0), &[0, 1]).build().is_err());
}
