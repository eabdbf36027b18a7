// langur-vm - Property-based tests for instruction encoding
// Copyright (c) 2025 Tom Waddington. MIT licensed.

//! Property-based tests for the encode/decode round trip.
//!
//! For every opcode and any valid operand tuple, decoding what `make`
//! produced must give back the same operands and consume exactly
//! `1 + sum(widths)` bytes.

use langur_vm::code::{self, Instructions, Op};
use proptest::prelude::*;

/// Build a valid operand tuple for `op` from two random seeds.
fn operands_for(op: Op, wide: usize, narrow: usize) -> Vec<usize> {
    code::lookup(op)
        .operand_widths
        .iter()
        .map(|width| match *width {
            2 => wide % 65536,
            _ => narrow % 256,
        })
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn make_then_decode_round_trips(
        op_index in 0usize..Op::all().len(),
        wide in 0usize..=65535,
        narrow in 0usize..=255,
    ) {
        let op = Op::all()[op_index];
        let def = code::lookup(op);
        let operands = operands_for(op, wide, narrow);

        let encoded = code::make(op, &operands);
        let total_width: usize = def.operand_widths.iter().sum();

        prop_assert_eq!(encoded.len(), 1 + total_width);
        prop_assert_eq!(encoded.as_bytes()[0], op as u8);

        let (decoded, read) = code::read_operands(def, &encoded.as_bytes()[1..]);
        prop_assert_eq!(read, total_width);
        prop_assert_eq!(decoded, operands);
    }

    #[test]
    fn flattened_streams_disassemble_with_monotonic_offsets(
        op_indices in proptest::collection::vec(0usize..Op::all().len(), 1..16),
        wide in 0usize..=65535,
        narrow in 0usize..=255,
    ) {
        let parts: Vec<Instructions> = op_indices
            .iter()
            .map(|&i| {
                let op = Op::all()[i];
                code::make(op, &operands_for(op, wide, narrow))
            })
            .collect();
        let flat = Instructions::flatten(&parts);

        let listing = flat.to_string();
        let offsets: Vec<usize> = listing
            .lines()
            .map(|line| {
                line.split_whitespace()
                    .next()
                    .and_then(|o| o.parse().ok())
                    .expect("line starts with an offset")
            })
            .collect();

        // One line per instruction, starting at zero, strictly increasing.
        prop_assert_eq!(offsets.len(), parts.len());
        prop_assert_eq!(offsets[0], 0);
        prop_assert!(offsets.windows(2).all(|w| w[0] < w[1]));

        // The whole-stream listing is the concatenation of per-instruction
        // listings, re-offset.
        let mut expected = String::new();
        let mut offset = 0;
        for part in &parts {
            let line = part.to_string();
            let rest = line.split_once(' ').map(|(_, rest)| rest).unwrap_or("");
            expected.push_str(&format!("{:04} {}", offset, rest));
            offset += part.len();
        }
        prop_assert_eq!(listing, expected);
    }

    #[test]
    fn opcode_bytes_are_stable(op_index in 0usize..Op::all().len()) {
        let op = Op::all()[op_index];
        prop_assert_eq!(Op::try_from(op as u8), Ok(op));
        prop_assert_eq!(op as usize, op_index);
    }
}
