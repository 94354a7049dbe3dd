use crate::opcode;
use bitvec::prelude::{bitvec, BitVec, Lsb0};
use std::sync::Arc;

/// A map of valid `JUMPDEST` byte offsets in a piece of code.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct JumpMap(Arc<BitVec<u8>>);

impl JumpMap {
    /// Analyze the code and build the jump map: a linear scan that marks
    /// every `JUMPDEST` byte not hidden inside a PUSH immediate.
    pub fn analyze(code: &[u8]) -> Self {
        let mut jumps: BitVec<u8> = bitvec![u8, Lsb0; 0; code.len()];

        let mut i = 0;
        while i < code.len() {
            let op = code[i];
            if op == opcode::JUMPDEST {
                jumps.set(i, true);
                i += 1;
            } else {
                let push_offset = op.wrapping_sub(opcode::PUSH1);
                if push_offset < 32 {
                    // skip the PUSH immediate bytes
                    i += push_offset as usize + 2;
                } else {
                    i += 1;
                }
            }
        }

        Self(Arc::new(jumps))
    }

    /// Returns `true` if `pc` is a valid jump destination.
    #[inline]
    pub fn is_valid(&self, pc: usize) -> bool {
        pc < self.0.len() && self.0[pc]
    }
}
