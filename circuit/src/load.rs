//! Load circuits from the SCAPI text netlist format.
//!
//! ```text
//! <#gates> <#parties>
//! <partyId> <#inputs> <inputWireId>*      (once per party, ids 1..=#parties)
//! <#outputs> <outputWireId>*
//! <inFanIn> <outFanOut> <input0> [<input1>] <output> <truthTable>   (once per gate)
//! ```
//!
//! `input1` is omitted when `inFanIn == 1` (a NOT gate). A two-input truth
//! table is written as four binary digits, rows `00 01 10 11` from left to
//! right; the table of a NOT gate is implied and only checked to be binary.

use crate::errors::CircuitLoadError;
use crate::gate::{Circuit, Gate, WireId};
use anyhow::{anyhow, Context};
use regex::Regex;
use std::{
    fs::File,
    io::{BufReader, Read},
    path::Path,
};
use tracing::{debug, trace};

/// Parse captures into a Vec
fn parse_to_vec<'a>(re: &Regex, text: &'a str) -> Vec<&'a str> {
    re.captures_iter(text)
        .filter_map(|cap| cap.get(1))
        .map(|m| m.as_str())
        .collect()
}

/// Whitespace-separated tokens of a circuit file.
struct Tokens<'a> {
    tokens: Vec<&'a str>,
    pos: usize,
}

impl<'a> Tokens<'a> {
    fn next(&mut self, what: &str) -> anyhow::Result<&'a str> {
        let tok = self
            .tokens
            .get(self.pos)
            .copied()
            .ok_or_else(|| anyhow!("unexpected end of file while reading {}", what))?;
        self.pos += 1;
        Ok(tok)
    }

    fn next_usize(&mut self, what: &str) -> anyhow::Result<usize> {
        let tok = self.next(what)?;
        tok.parse()
            .with_context(|| format!("Failed to parse {}: {}", what, tok))
    }

    fn next_wire(&mut self, what: &str) -> anyhow::Result<WireId> {
        let tok = self.next(what)?;
        let w: WireId = tok
            .parse()
            .with_context(|| format!("Failed to parse {}: {}", what, tok))?;
        if w < 0 {
            return Err(anyhow!("{} is negative: {}", what, w));
        }
        Ok(w)
    }

    /// A truth table of `digits` binary digits, or of 1 to 4 if `None`.
    fn next_truth_table(&mut self, what: &str, digits: Option<usize>) -> anyhow::Result<u8> {
        let tok = self.next(what)?;
        let ok = match digits {
            Some(n) => tok.len() == n,
            None => !tok.is_empty() && tok.len() <= 4,
        };
        if !ok {
            return Err(anyhow!("{} has the wrong number of digits: {}", what, tok));
        }
        tok.chars().try_fold(0u8, |acc, c| match c {
            '0' => Ok(acc << 1),
            '1' => Ok((acc << 1) | 1),
            _ => Err(anyhow!("{} is not binary: {}", what, tok)),
        })
    }

    fn remaining(&self) -> usize {
        self.tokens.len() - self.pos
    }
}

impl Circuit {
    /// Load and parse a circuit file.
    pub fn load<P: AsRef<Path>>(filename: P) -> Result<Self, CircuitLoadError> {
        let filename = filename.as_ref();
        let f = File::open(filename)?;
        let mut reader = BufReader::new(f);
        let mut text = String::new();
        reader.read_to_string(&mut text)?;

        let circ = Self::parse(&text).map_err(|e| match e {
            CircuitLoadError::Malformed(err) => {
                CircuitLoadError::Malformed(err.context(format!("in {}", filename.display())))
            }
            other => other,
        })?;
        debug!(
            path = %filename.display(),
            gates = circ.number_of_gates(),
            inputs = circ.number_of_inputs(),
            outputs = circ.number_of_outputs(),
            "loaded circuit"
        );
        Ok(circ)
    }

    /// Parse a circuit description held in memory.
    pub fn parse(text: &str) -> Result<Self, CircuitLoadError> {
        let re = Regex::new(r"(\S+)").context("Failed to compile regex")?;
        let mut tokens = Tokens {
            tokens: parse_to_vec(&re, text),
            pos: 0,
        };

        let ngates = tokens.next_usize("number of gates")?;
        let nparties = tokens.next_usize("number of parties")?;
        if nparties == 0 {
            return Err(anyhow!("circuit has no parties").into());
        }
        // Each party line holds at least an id and an input count.
        if nparties > tokens.remaining() / 2 {
            return Err(anyhow!("{} parties declared but the file is shorter", nparties).into());
        }

        let mut party_inputs: Vec<Option<Vec<WireId>>> = vec![None; nparties];
        for _ in 0..nparties {
            let party = tokens.next_usize("party id")?;
            if party == 0 || party > nparties {
                return Err(anyhow!("party id {} out of range 1..={}", party, nparties).into());
            }
            let ninputs = tokens.next_usize("number of party inputs")?;
            if ninputs > tokens.remaining() {
                return Err(anyhow!(
                    "party {} declares {} inputs but the file is shorter",
                    party,
                    ninputs
                )
                .into());
            }
            let wires = (0..ninputs)
                .map(|_| tokens.next_wire("input wire"))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let slot = &mut party_inputs[party - 1];
            if slot.is_some() {
                return Err(anyhow!("party {} listed twice", party).into());
            }
            *slot = Some(wires);
        }
        // Every slot is filled: nparties distinct ids in 1..=nparties.
        let party_inputs: Vec<Vec<WireId>> = party_inputs.into_iter().flatten().collect();

        let noutputs = tokens.next_usize("number of outputs")?;
        if noutputs > tokens.remaining() {
            return Err(anyhow!("{} outputs declared but the file is shorter", noutputs).into());
        }
        let output_indices = (0..noutputs)
            .map(|_| tokens.next_wire("output wire"))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let mut gates = Vec::with_capacity(ngates.min(tokens.remaining()));
        for i in 0..ngates {
            let gate = parse_gate(&mut tokens).with_context(|| format!("gate {}", i))?;
            trace!(gate = i, ?gate, "parsed gate");
            gates.push(gate);
        }
        if tokens.remaining() != 0 {
            return Err(anyhow!(
                "Expecting {} gates, found {} trailing tokens",
                ngates,
                tokens.remaining()
            )
            .into());
        }

        Circuit::new(party_inputs, output_indices, gates)
    }
}

fn parse_gate(tokens: &mut Tokens) -> anyhow::Result<Gate> {
    let in_fan = tokens.next_usize("fan-in")?;
    let out_fan = tokens.next_usize("fan-out")?;
    if out_fan != 1 {
        return Err(anyhow!("unsupported fan-out {}", out_fan));
    }
    match in_fan {
        1 => {
            let input0 = tokens.next_wire("input0")?;
            let output = tokens.next_wire("output")?;
            // The truth table of a NOT gate is implied.
            tokens.next_truth_table("truth table", None)?;
            Ok(Gate::not(input0, output))
        }
        2 => {
            let input0 = tokens.next_wire("input0")?;
            let input1 = tokens.next_wire("input1")?;
            let output = tokens.next_wire("output")?;
            let tt = tokens.next_truth_table("truth table", Some(4))?;
            Ok(Gate::new(input0, input1, output, tt))
        }
        _ => Err(anyhow!("unsupported fan-in {}", in_fan)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::{GateKind, AND_GATE, XOR_GATE};

    #[test]
    fn test_parse_half_adder() {
        let circ = Circuit::load("circuit_files/scapi/half_adder.txt").unwrap();

        assert_eq!(circ.number_of_gates(), 2);
        assert_eq!(circ.number_of_parties, 2);
        assert_eq!(circ.party_inputs, vec![vec![0], vec![1]]);
        assert_eq!(circ.output_indices, vec![2, 3]);
        assert_eq!(circ.gates[0].truth_table, XOR_GATE);
        assert_eq!(circ.gates[1].truth_table, AND_GATE);
        assert_eq!(circ.num_of_xor_gates, 1);
        assert_eq!(circ.num_of_not_gates, 0);

        for (a, b) in [(false, false), (false, true), (true, false), (true, true)] {
            assert_eq!(circ.eval(&[a, b]).unwrap(), vec![a ^ b, a & b]);
        }
    }

    #[test]
    fn test_parse_adder4() {
        let circ = Circuit::load("circuit_files/scapi/adder4.txt").unwrap();
        assert_eq!(circ.number_of_inputs(), 8);
        assert_eq!(circ.number_of_outputs(), 5);

        let bits = |x: u32, n: usize| (0..n).map(|i| (x >> i) & 1 == 1).collect::<Vec<_>>();
        for a in 0..16u32 {
            for b in 0..16u32 {
                let inputs = [bits(a, 4), bits(b, 4)].concat();
                assert_eq!(circ.eval(&inputs).unwrap(), bits(a + b, 5));
            }
        }
    }

    #[test]
    fn test_parse_not_gate() {
        let circ = Circuit::load("circuit_files/scapi/mixed.txt").unwrap();
        let not = circ.gates[0];
        assert!(not.is_not());
        assert_eq!(not.kind(), GateKind::Not);
        assert_eq!(circ.num_of_not_gates, 2);
        assert_eq!(circ.num_of_xor_gates, 2);
        assert_eq!(circ.num_of_non_xor_gates(), 4);
    }

    #[test]
    fn test_parties_out_of_order() {
        let text = "1 2\n2 1 1\n1 1 0\n1 2\n2 1 0 1 2 0001\n";
        let circ = Circuit::parse(text).unwrap();
        assert_eq!(circ.input_indices, vec![0, 1]);
    }

    fn assert_malformed(text: &str) {
        match Circuit::parse(text) {
            Err(CircuitLoadError::Malformed(_)) => {}
            other => panic!("expected malformed circuit, got {:?}", other),
        }
    }

    #[test]
    fn test_malformed() {
        // short read
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 2\n2 1 0 1");
        // gate count larger than the gate list
        assert_malformed("2 2\n1 1 0\n2 1 1\n1 2\n2 1 0 1 2 0001\n");
        // trailing gate
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 2\n2 1 0 1 2 0001\n2 1 0 1 3 0110\n");
        // input count larger than the file
        assert_malformed("1 2\n1 9 0\n");
        // party id out of range and duplicated
        assert_malformed("1 2\n3 1 0\n2 1 1\n1 2\n2 1 0 1 2 0001\n");
        assert_malformed("1 2\n1 1 0\n1 1 1\n1 2\n2 1 0 1 2 0001\n");
        // undefined and negative wires
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 2\n2 1 0 7 2 0001\n");
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 2\n2 1 0 -1 2 0001\n");
        // undefined output
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 5\n2 1 0 1 2 0001\n");
        // bad truth table and fan-in
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 2\n2 1 0 1 2 0201\n");
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 2\n2 1 0 1 2 00011\n");
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 2\n2 1 0 1 2 011\n");
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 2\n3 1 0 1 2 0001\n");
        // party count larger than the file
        assert_malformed("1 18446744073709551615\n");
        assert_malformed("1 3\n1 1 0\n2 1 1\n");
        // wire id far beyond the number of wires
        assert_malformed("1 2\n1 1 0\n2 1 1\n1 17592186044416\n2 1 0 1 17592186044416 0001\n");
        // not a number
        assert_malformed("x 2\n");
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            Circuit::load("circuit_files/scapi/does_not_exist.txt"),
            Err(CircuitLoadError::IoError(_))
        ));
    }
}
