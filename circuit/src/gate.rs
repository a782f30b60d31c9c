//! Define the structure of gates and circuits.

use crate::errors::{CircuitEvalError, CircuitLoadError};
use anyhow::anyhow;

/// Wire identifier. Non-negative ids are circuit wires; [`CONSTANT_WIRE`] is
/// the reserved wire that always carries `1`.
pub type WireId = i64;

/// The reserved wire paired with every NOT gate.
pub const CONSTANT_WIRE: WireId = -1;

pub const XOR_GATE: u8 = 6;
pub const XOR_NOT_GATE: u8 = 9;
pub const AND_GATE: u8 = 1;
pub const ONE_GATE: u8 = 15;

/// How a gate is garbled.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateKind {
    /// Single-input gate, stored as XOR with [`CONSTANT_WIRE`].
    Not,
    Xor,
    Xnor,
    /// Any other two-input function.
    NonLinear,
}

/// A two-input gate with its 4-bit truth table.
///
/// Row `r` of the truth table is the output for `(input0, input1) = (r >> 1, r & 1)`.
/// `truth_table_bits` caches every row so garbling never has to shift.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    pub input0: WireId,
    pub input1: WireId,
    pub output: WireId,
    pub truth_table: u8,
    pub truth_table_bits: [bool; 4],
}

impl Gate {
    pub fn new(input0: WireId, input1: WireId, output: WireId, truth_table: u8) -> Self {
        let truth_table = truth_table & 0xf;
        Gate {
            input0,
            input1,
            output,
            truth_table,
            truth_table_bits: std::array::from_fn(|r| (truth_table >> (3 - r)) & 1 == 1),
        }
    }

    /// A NOT gate, i.e. `input0 XOR 1`.
    pub fn not(input0: WireId, output: WireId) -> Self {
        Gate::new(input0, CONSTANT_WIRE, output, XOR_GATE)
    }

    #[inline]
    pub fn is_not(&self) -> bool {
        self.input1 == CONSTANT_WIRE
    }

    #[inline]
    pub fn kind(&self) -> GateKind {
        match self.truth_table {
            _ if self.is_not() => GateKind::Not,
            XOR_GATE => GateKind::Xor,
            XOR_NOT_GATE => GateKind::Xnor,
            _ => GateKind::NonLinear,
        }
    }

    /// Plaintext output for the given input bits.
    #[inline]
    pub fn eval(&self, a: bool, b: bool) -> bool {
        self.truth_table_bits[2 * a as usize + b as usize]
    }
}

/// An immutable, topologically sorted boolean circuit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Circuit {
    /// All gates, in evaluation order
    pub gates: Vec<Gate>,
    /// Number of parties providing inputs
    pub number_of_parties: usize,
    /// Input wires of each party, party 1 first
    pub party_inputs: Vec<Vec<WireId>>,
    /// All input wires, in party order
    pub input_indices: Vec<WireId>,
    /// Output wires
    pub output_indices: Vec<WireId>,
    /// Largest wire id in use
    pub last_wire_index: WireId,
    /// Number of two-input XOR and XNOR gates
    pub num_of_xor_gates: usize,
    /// Number of NOT gates
    pub num_of_not_gates: usize,
}

impl Circuit {
    /// Assemble a circuit and check that it is a well-formed netlist: every
    /// wire is assigned exactly once, before it is read.
    pub fn new(
        party_inputs: Vec<Vec<WireId>>,
        output_indices: Vec<WireId>,
        gates: Vec<Gate>,
    ) -> Result<Self, CircuitLoadError> {
        let input_indices: Vec<WireId> = party_inputs.iter().flatten().copied().collect();
        if input_indices.is_empty() {
            return Err(anyhow!("circuit has no input wires").into());
        }
        if output_indices.is_empty() {
            return Err(anyhow!("circuit has no output wires").into());
        }

        let mut last_wire_index = 0;
        for w in input_indices
            .iter()
            .chain(gates.iter().map(|g| &g.output))
            .chain(output_indices.iter())
        {
            if *w < 0 {
                return Err(anyhow!("negative wire id {}", w).into());
            }
            last_wire_index = last_wire_index.max(*w);
        }

        // Every wire is assigned once, so ids are dense in 0..nwires.
        let nwires = input_indices.len().saturating_add(gates.len());
        let nslots = usize::try_from(last_wire_index)
            .ok()
            .and_then(|n| n.checked_add(1))
            .filter(|n| *n <= nwires)
            .ok_or_else(|| anyhow!("wire id {} out of range for {} wires", last_wire_index, nwires))?;
        let mut defined = vec![false; nslots];

        for w in input_indices.iter() {
            let slot = &mut defined[*w as usize];
            if *slot {
                return Err(anyhow!("input wire {} listed twice", w).into());
            }
            *slot = true;
        }

        let mut num_of_xor_gates = 0;
        let mut num_of_not_gates = 0;
        for (i, gate) in gates.iter().enumerate() {
            if gate.is_not() && gate.truth_table != XOR_GATE {
                return Err(anyhow!(
                    "gate {} reads the constant wire with truth table {:04b}",
                    i,
                    gate.truth_table
                )
                .into());
            }
            let mut reads = vec![gate.input0];
            if !gate.is_not() {
                reads.push(gate.input1);
            }
            for w in reads {
                let ok = usize::try_from(w)
                    .ok()
                    .and_then(|w| defined.get(w).copied())
                    .unwrap_or(false);
                if !ok {
                    return Err(anyhow!("gate {} reads undefined wire {}", i, w).into());
                }
            }
            let slot = &mut defined[gate.output as usize];
            if *slot {
                return Err(anyhow!("gate {} reassigns wire {}", i, gate.output).into());
            }
            *slot = true;

            match gate.kind() {
                GateKind::Not => num_of_not_gates += 1,
                GateKind::Xor | GateKind::Xnor => num_of_xor_gates += 1,
                GateKind::NonLinear => {}
            }
        }

        for w in output_indices.iter() {
            if !defined[*w as usize] {
                return Err(anyhow!("output wire {} is never assigned", w).into());
            }
        }

        Ok(Circuit {
            gates,
            number_of_parties: party_inputs.len(),
            party_inputs,
            input_indices,
            output_indices,
            last_wire_index,
            num_of_xor_gates,
            num_of_not_gates,
        })
    }

    pub fn number_of_gates(&self) -> usize {
        self.gates.len()
    }

    pub fn number_of_inputs(&self) -> usize {
        self.input_indices.len()
    }

    pub fn number_of_outputs(&self) -> usize {
        self.output_indices.len()
    }

    /// Number of gates that are neither XOR, XNOR nor NOT.
    pub fn num_of_non_xor_gates(&self) -> usize {
        self.gates.len() - self.num_of_xor_gates - self.num_of_not_gates
    }

    /// Evaluate the circuit in plaintext. `inputs` follows `input_indices`.
    pub fn eval(&self, inputs: &[bool]) -> Result<Vec<bool>, CircuitEvalError> {
        if inputs.len() != self.input_indices.len() {
            return Err(CircuitEvalError::InputLength {
                expected: self.input_indices.len(),
                actual: inputs.len(),
            });
        }

        // Slot 0 holds the constant wire.
        let mut wires: Vec<Option<bool>> = vec![None; self.last_wire_index as usize + 2];
        wires[0] = Some(true);
        for (id, value) in self.input_indices.iter().zip(inputs.iter()) {
            wires[(*id + 1) as usize] = Some(*value);
        }

        let read = |wires: &[Option<bool>], w: WireId| {
            wires[(w + 1) as usize].ok_or(CircuitEvalError::UninitializedValue(w))
        };

        for gate in self.gates.iter() {
            let a = read(&wires, gate.input0)?;
            let b = read(&wires, gate.input1)?;
            wires[(gate.output + 1) as usize] = Some(gate.eval(a, b));
        }

        self.output_indices
            .iter()
            .map(|w| read(&wires, *w))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truth_table_bits() {
        let and = Gate::new(0, 1, 2, AND_GATE);
        assert_eq!(and.truth_table_bits, [false, false, false, true]);
        assert_eq!(and.kind(), GateKind::NonLinear);

        let xor = Gate::new(0, 1, 2, XOR_GATE);
        assert_eq!(xor.truth_table_bits, [false, true, true, false]);
        assert_eq!(xor.kind(), GateKind::Xor);

        let xnor = Gate::new(0, 1, 2, XOR_NOT_GATE);
        assert_eq!(xnor.kind(), GateKind::Xnor);

        let not = Gate::not(0, 2);
        assert_eq!(not.kind(), GateKind::Not);
        assert!(not.eval(false, true));
        assert!(!not.eval(true, true));

        // "0010" is a AND NOT b
        let andn = Gate::new(0, 1, 2, 0b0010);
        assert!(andn.eval(true, false));
        assert!(!andn.eval(true, true));
        assert!(!andn.eval(false, false));
    }

    #[test]
    fn rejects_forward_reference() {
        let gates = vec![Gate::new(0, 3, 2, AND_GATE), Gate::new(0, 1, 3, XOR_GATE)];
        assert!(Circuit::new(vec![vec![0], vec![1]], vec![2], gates).is_err());
    }

    #[test]
    fn rejects_reassignment() {
        let gates = vec![Gate::new(0, 1, 2, AND_GATE), Gate::new(0, 1, 1, XOR_GATE)];
        assert!(Circuit::new(vec![vec![0], vec![1]], vec![2], gates).is_err());
    }

    #[test]
    fn rejects_undefined_output() {
        let gates = vec![Gate::new(0, 1, 2, AND_GATE)];
        assert!(Circuit::new(vec![vec![0], vec![1]], vec![5], gates).is_err());
    }

    #[test]
    fn rejects_sparse_wire_ids() {
        let gates = vec![Gate::new(0, 1, 1 << 44, AND_GATE)];
        assert!(Circuit::new(vec![vec![0], vec![1]], vec![1 << 44], gates).is_err());
        let gates = vec![Gate::new(0, 1, 3, AND_GATE)];
        assert!(Circuit::new(vec![vec![0], vec![1]], vec![3], gates).is_err());
    }

    #[test]
    fn constant_wire_only_in_not_gates() {
        for tt in (0u8..16).filter(|tt| *tt != XOR_GATE) {
            let gates = vec![Gate::new(0, CONSTANT_WIRE, 1, tt)];
            assert!(Circuit::new(vec![vec![0]], vec![1], gates).is_err(), "{:04b}", tt);
        }
        let circ = Circuit::new(vec![vec![0]], vec![1], vec![Gate::new(0, CONSTANT_WIRE, 1, XOR_GATE)]).unwrap();
        assert_eq!(circ.eval(&[true]).unwrap(), vec![false]);
    }

    #[test]
    fn eval_counts_and_values() {
        let gates = vec![
            Gate::new(0, 1, 2, XOR_GATE),
            Gate::new(0, 1, 3, AND_GATE),
            Gate::not(3, 4),
        ];
        let circ = Circuit::new(vec![vec![0], vec![1]], vec![2, 3, 4], gates).unwrap();
        assert_eq!(circ.num_of_xor_gates, 1);
        assert_eq!(circ.num_of_not_gates, 1);
        assert_eq!(circ.num_of_non_xor_gates(), 1);
        assert_eq!(circ.last_wire_index, 4);

        assert_eq!(circ.eval(&[true, false]).unwrap(), vec![true, false, true]);
        assert_eq!(circ.eval(&[true, true]).unwrap(), vec![false, true, false]);
        assert!(matches!(
            circ.eval(&[true]),
            Err(CircuitEvalError::InputLength { expected: 2, actual: 1 })
        ));
    }
}
