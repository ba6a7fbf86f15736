// src/circuits/mod.rs

//! Defines structures for representing and building ordered sequences of
//! operations (`bvbench::operations::Operation`).
//!
//! A [`Circuit`] owns a fixed-size quantum register, a classical register for
//! measurement outcomes and a display name. Circuits can be nested through
//! [`Operation::SubCircuit`]; [`Circuit::decompose`] flattens the nesting before
//! a circuit is handed to a backend.

use crate::core::{BvError, QubitId, Result};
use crate::operations::Operation;
use std::fmt;

/// An ordered sequence of operations over `num_qubits` qubits and
/// `num_clbits` classical bits.
///
/// Analogy: the equivalent of `qiskit.QuantumCircuit` with one quantum and one
/// classical register.
#[derive(Clone, PartialEq)]
pub struct Circuit {
    /// Display/debug name ("main", "Uf", ...).
    name: String,
    num_qubits: usize,
    num_clbits: usize,
    /// The order is significant; operations are applied front to back.
    operations: Vec<Operation>,
}

impl Circuit {
    /// Creates an empty circuit.
    pub fn new(name: impl Into<String>, num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            name: name.into(),
            num_qubits,
            num_clbits,
            operations: Vec::new(),
        }
    }

    /// Appends an operation after checking that every qubit and classical bit
    /// it references exists in this circuit.
    ///
    /// # Errors
    /// `BvError::ContractViolation` for out-of-range references, a controlled
    /// flip whose control equals its target, or a sub-circuit whose width does
    /// not match the number of bound qubits.
    pub fn add_operation(&mut self, op: Operation) -> Result<()> {
        for qubit in op.involved_qubits() {
            if qubit.index() >= self.num_qubits {
                return Err(BvError::contract(format!(
                    "Operation {} references {} but circuit '{}' has {} qubits",
                    op.symbol(),
                    qubit,
                    self.name,
                    self.num_qubits
                )));
            }
        }
        match &op {
            Operation::ControlledFlip { control, target } if control == target => {
                return Err(BvError::contract(format!(
                    "Control and target of a controlled flip must differ ({})",
                    control
                )));
            }
            Operation::Measure { clbit, .. } if *clbit >= self.num_clbits => {
                return Err(BvError::contract(format!(
                    "Measurement into clbit {} but circuit '{}' has {} classical bits",
                    clbit, self.name, self.num_clbits
                )));
            }
            Operation::SubCircuit { circuit, qubits } if circuit.num_qubits() != qubits.len() => {
                return Err(BvError::contract(format!(
                    "Sub-circuit '{}' acts on {} qubits but {} were bound",
                    circuit.name(),
                    circuit.num_qubits(),
                    qubits.len()
                )));
            }
            _ => {}
        }
        self.operations.push(op);
        Ok(())
    }

    /// Display name of the circuit.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Width of the quantum register.
    pub fn num_qubits(&self) -> usize {
        self.num_qubits
    }

    /// Width of the classical register.
    pub fn num_clbits(&self) -> usize {
        self.num_clbits
    }

    /// The ordered operations.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Number of top-level operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Returns `true` if the circuit contains no operations.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    /// Whether any operation embeds another circuit.
    pub fn has_sub_circuits(&self) -> bool {
        self.operations
            .iter()
            .any(|op| matches!(op, Operation::SubCircuit { .. }))
    }

    /// Number of top-level operations matching `pred`.
    pub fn count_ops(&self, pred: impl Fn(&Operation) -> bool) -> usize {
        self.operations.iter().filter(|op| pred(op)).count()
    }

    /// Returns a flat copy of the circuit: every [`Operation::SubCircuit`] is
    /// replaced, recursively, by its operations with qubits remapped onto the
    /// outer register. The name and registers are preserved.
    pub fn decompose(&self) -> Circuit {
        let mut flat = Circuit::new(self.name.clone(), self.num_qubits, self.num_clbits);
        let identity: Vec<QubitId> = (0..self.num_qubits).map(QubitId).collect();
        inline_into(&mut flat.operations, &self.operations, &identity);
        flat
    }

    /// True when some qubit is acted on after it was measured, or when a reset
    /// appears. Such circuits need shot-by-shot simulation.
    pub fn has_mid_circuit_measurement(&self) -> bool {
        let mut measured = vec![false; self.num_qubits];
        for op in &self.operations {
            match op {
                Operation::Measure { qubit, .. } => measured[qubit.index()] = true,
                Operation::Reset { .. } => return true,
                Operation::Barrier { .. } => {}
                other => {
                    if other.involved_qubits().iter().any(|q| measured[q.index()]) {
                        return true;
                    }
                }
            }
        }
        false
    }
}

/// Copies `ops` into `out`, mapping sub-circuit qubit `i` to `mapping[i]`.
fn inline_into(out: &mut Vec<Operation>, ops: &[Operation], mapping: &[QubitId]) {
    let map = |q: &QubitId| mapping[q.index()];
    for op in ops {
        match op {
            Operation::SubCircuit { circuit, qubits } => {
                let inner: Vec<QubitId> = qubits.iter().map(map).collect();
                inline_into(out, circuit.operations(), &inner);
            }
            Operation::Flip { target } => out.push(Operation::Flip { target: map(target) }),
            Operation::Hadamard { target } => out.push(Operation::Hadamard { target: map(target) }),
            Operation::ControlledFlip { control, target } => out.push(Operation::ControlledFlip {
                control: map(control),
                target: map(target),
            }),
            Operation::Barrier { qubits } => out.push(Operation::Barrier {
                qubits: qubits.iter().map(map).collect(),
            }),
            Operation::Measure { qubit, clbit } => out.push(Operation::Measure {
                qubit: map(qubit),
                clbit: *clbit,
            }),
            Operation::Reset { target } => out.push(Operation::Reset { target: map(target) }),
        }
    }
}

//-------------------------------------------------------------------------
// Circuit Builder
//-------------------------------------------------------------------------

/// A helper struct for programmatically constructing `Circuit` instances using method chaining.
///
/// The first invalid operation is remembered and reported by [`CircuitBuilder::build`].
pub struct CircuitBuilder {
    circuit: Circuit,
    error: Option<BvError>,
}

impl CircuitBuilder {
    /// Starts a circuit named `name` with the given register sizes.
    pub fn new(name: impl Into<String>, num_qubits: usize, num_clbits: usize) -> Self {
        Self {
            circuit: Circuit::new(name, num_qubits, num_clbits),
            error: None,
        }
    }

    /// Adds a single operation to the circuit being built.
    pub fn add_op(mut self, op: Operation) -> Self {
        if self.error.is_none() {
            if let Err(e) = self.circuit.add_operation(op) {
                self.error = Some(e);
            }
        }
        self
    }

    /// Bit flip on qubit `q`.
    pub fn x(self, q: usize) -> Self {
        self.add_op(Operation::Flip { target: QubitId(q) })
    }

    /// Hadamard on qubit `q`.
    pub fn h(self, q: usize) -> Self {
        self.add_op(Operation::Hadamard { target: QubitId(q) })
    }

    /// Hadamard on every qubit of the register.
    pub fn h_all(self) -> Self {
        let n = self.circuit.num_qubits();
        (0..n).fold(self, |b, q| b.h(q))
    }

    /// Controlled flip of `target` by `control`.
    pub fn cx(self, control: usize, target: usize) -> Self {
        self.add_op(Operation::ControlledFlip {
            control: QubitId(control),
            target: QubitId(target),
        })
    }

    /// Barrier across the whole register.
    pub fn barrier(self) -> Self {
        let qubits = (0..self.circuit.num_qubits()).map(QubitId).collect();
        self.add_op(Operation::Barrier { qubits })
    }

    /// Measures qubit `q` into classical bit `clbit`.
    pub fn measure(self, q: usize, clbit: usize) -> Self {
        self.add_op(Operation::Measure { qubit: QubitId(q), clbit })
    }

    /// Resets qubit `q` to |0>.
    pub fn reset(self, q: usize) -> Self {
        self.add_op(Operation::Reset { target: QubitId(q) })
    }

    /// Embeds `circuit`, binding its qubit `i` to `qubits[i]`.
    pub fn append(self, circuit: Circuit, qubits: &[usize]) -> Self {
        self.add_op(Operation::SubCircuit {
            circuit: Box::new(circuit),
            qubits: qubits.iter().copied().map(QubitId).collect(),
        })
    }

    /// Finalizes the construction process and returns the built `Circuit`.
    pub fn build(self) -> Result<Circuit> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(self.circuit),
        }
    }
}

impl fmt::Display for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ops = &self.operations;
        let num_ops = ops.len();
        let num_qubits = self.num_qubits;
        writeln!(
            f,
            "Circuit '{}' [{} operations on {} qubits, {} clbits]",
            self.name, num_ops, num_qubits, self.num_clbits
        )?;
        if num_ops == 0 || num_qubits == 0 {
            return Ok(());
        }

        let labels: Vec<String> = (0..num_qubits).map(|q| format!("{}: ", QubitId(q))).collect();
        let label_width = labels.iter().map(|l| l.len()).max().unwrap_or(0);
        let label_padding = " ".repeat(label_width);

        const GATE_WIDTH: usize = 7; // e.g., "───H───"
        const WIRE: &str = "───────";
        const V_WIRE: char = '│';
        const H_WIRE: char = '─';

        // op_grid[row][time] holds the segment drawn on that qubit's wire
        let mut op_grid: Vec<Vec<String>> = vec![vec![WIRE.to_string(); num_ops]; num_qubits];
        // v_connect[row][time] holds the connector drawn below that row
        let mut v_connect: Vec<Vec<char>> = vec![vec![' '; num_ops]; num_qubits];

        fn format_gate(symbol: &str) -> String {
            let slen = symbol.chars().count();
            if slen >= GATE_WIDTH {
                symbol.chars().take(GATE_WIDTH).collect()
            } else {
                let total_dashes = GATE_WIDTH - slen;
                let pre_dashes = total_dashes / 2;
                let post_dashes = total_dashes - pre_dashes;
                format!(
                    "{}{}{}",
                    H_WIRE.to_string().repeat(pre_dashes),
                    symbol,
                    H_WIRE.to_string().repeat(post_dashes)
                )
            }
        }

        for (t, op) in ops.iter().enumerate() {
            match op {
                Operation::Flip { target } => op_grid[target.index()][t] = format_gate("X"),
                Operation::Hadamard { target } => op_grid[target.index()][t] = format_gate("H"),
                Operation::Reset { target } => op_grid[target.index()][t] = format_gate("|0>"),
                Operation::Measure { qubit, clbit } => {
                    op_grid[qubit.index()][t] = format_gate(&format!("M{}", clbit));
                }
                Operation::ControlledFlip { control, target } => {
                    let (rc, rt) = (control.index(), target.index());
                    op_grid[rc][t] = format_gate("@");
                    op_grid[rt][t] = format_gate("X");
                    for row in v_connect.iter_mut().take(rc.max(rt)).skip(rc.min(rt)) {
                        row[t] = V_WIRE;
                    }
                }
                Operation::Barrier { qubits } => {
                    for q in qubits {
                        op_grid[q.index()][t] = format_gate("░");
                    }
                }
                Operation::SubCircuit { circuit, qubits } => {
                    let rows: Vec<usize> = qubits.iter().map(|q| q.index()).collect();
                    let (Some(&r_min), Some(&r_max)) = (rows.iter().min(), rows.iter().max()) else {
                        continue;
                    };
                    for &r in &rows {
                        op_grid[r][t] = format_gate(&format!("[{}]", circuit.name()));
                    }
                    for row in v_connect.iter_mut().take(r_max).skip(r_min) {
                        row[t] = V_WIRE;
                    }
                }
            }
        }

        for r in 0..num_qubits {
            write!(f, "{:<width$}", labels[r], width = label_width)?;
            writeln!(f, "{}", op_grid[r].join(""))?;

            if r < num_qubits - 1 {
                write!(f, "{}", label_padding)?;
                for t in 0..num_ops {
                    let padding_needed = GATE_WIDTH.saturating_sub(1);
                    let pre_pad = padding_needed / 2;
                    let post_pad = padding_needed - pre_pad;
                    write!(f, "{}{}{}", " ".repeat(pre_pad), v_connect[r][t], " ".repeat(post_pad))?;
                }
                writeln!(f)?;
            }
        }
        Ok(())
    }
}

// Keep the Debug impl delegating to Display
impl fmt::Debug for Circuit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bell_with_sub() -> Result<Circuit> {
        let inner = CircuitBuilder::new("pair", 2, 0).h(0).cx(0, 1).build()?;
        CircuitBuilder::new("outer", 3, 2)
            .append(inner, &[2, 0])
            .measure(2, 0)
            .measure(0, 1)
            .build()
    }

    #[test]
    fn test_builder_rejects_out_of_range_qubit() {
        let result = CircuitBuilder::new("bad", 2, 1).h(0).x(5).h(1).build();
        assert!(matches!(result, Err(BvError::ContractViolation { .. })));
    }

    #[test]
    fn test_builder_rejects_bad_clbit_and_self_control() {
        assert!(CircuitBuilder::new("m", 2, 1).measure(0, 1).build().is_err());
        assert!(CircuitBuilder::new("c", 2, 0).cx(1, 1).build().is_err());
    }

    #[test]
    fn test_decompose_remaps_sub_circuit_qubits() -> Result<()> {
        let circuit = bell_with_sub()?;
        assert!(circuit.has_sub_circuits());

        let flat = circuit.decompose();
        assert!(!flat.has_sub_circuits());
        assert_eq!(flat.name(), "outer");
        assert_eq!(flat.num_qubits(), 3);
        assert_eq!(
            flat.operations()[..2],
            [
                Operation::Hadamard { target: QubitId(2) },
                Operation::ControlledFlip { control: QubitId(2), target: QubitId(0) },
            ]
        );
        assert_eq!(flat.len(), 4);
        Ok(())
    }

    #[test]
    fn test_mid_circuit_measurement_detection() -> Result<()> {
        let terminal = CircuitBuilder::new("t", 2, 2).h(0).barrier().measure(0, 0).measure(1, 1).build()?;
        assert!(!terminal.has_mid_circuit_measurement());

        let reused = CircuitBuilder::new("r", 2, 2).measure(0, 0).h(0).measure(0, 1).build()?;
        assert!(reused.has_mid_circuit_measurement());

        let reset = CircuitBuilder::new("z", 1, 1).measure(0, 0).reset(0).build()?;
        assert!(reset.has_mid_circuit_measurement());
        Ok(())
    }

    #[test]
    fn test_display_renders_each_qubit_row() -> Result<()> {
        let rendered = format!("{}", bell_with_sub()?);
        assert!(rendered.starts_with("Circuit 'outer' [3 operations on 3 qubits, 2 clbits]"));
        assert!(rendered.contains("q0: "));
        assert!(rendered.contains("q2: "));
        assert!(rendered.contains("[pair]"));
        assert!(rendered.contains("M1"));
        Ok(())
    }
}
