//! Linear-scan disassembler. Touches no state: it walks the code once,
//! decoding PUSH immediates and rendering everything else one byte per
//! instruction.

use crate::opcode::OpCode;
use alloy_primitives::U256;
use core::fmt;

/// One decoded instruction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InsnView {
    /// Byte offset of the instruction.
    pub pc: usize,
    /// The raw opcode byte.
    pub opcode: u8,
    /// Decoded opcode, `None` for bytes outside the instruction set.
    pub op: Option<OpCode>,
    /// PUSH immediate, zero-padded to its declared width when the code
    /// ends inside it.
    pub immediate: Option<Vec<u8>>,
}

impl fmt::Display for InsnView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self.op {
            Some(op) => op.as_str(),
            None => "INVALID",
        };
        match &self.immediate {
            Some(immediate) => {
                let value = U256::from_be_slice(immediate);
                write!(f, "{:04x}  {:<20} {:#x}", self.pc, name, value)
            }
            None => write!(f, "{:04x}  {}", self.pc, name),
        }
    }
}

/// Iterator over the instructions of a code blob.
#[derive(Clone, Debug)]
pub struct Disasm<'a> {
    code: &'a [u8],
    pc: usize,
}

impl<'a> Disasm<'a> {
    pub fn new(code: &'a [u8]) -> Self {
        Self { code, pc: 0 }
    }
}

impl Iterator for Disasm<'_> {
    type Item = InsnView;

    fn next(&mut self) -> Option<InsnView> {
        let opcode = *self.code.get(self.pc)?;
        let pc = self.pc;
        let op = OpCode::new(opcode);
        let width = op.map_or(0, |op| op.immediate_size());

        let immediate = if width > 0 {
            let start = pc + 1;
            let end = (start + width).min(self.code.len());
            let mut imm = vec![0; width];
            if start < self.code.len() {
                imm[..end - start].copy_from_slice(&self.code[start..end]);
            }
            Some(imm)
        } else {
            None
        };

        self.pc += 1 + width;
        Some(InsnView {
            pc,
            opcode,
            op,
            immediate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_push_and_invalid() {
        // PUSH2 0x0102, INVALID byte, STOP
        let insns: Vec<_> = Disasm::new(&[0x61, 0x01, 0x02, 0xFE, 0x00]).collect();
        assert_eq!(insns.len(), 3);

        assert_eq!(insns[0].pc, 0);
        assert_eq!(insns[0].immediate.as_deref(), Some(&[0x01, 0x02][..]));
        assert_eq!(insns[0].to_string(), "0000  PUSH2                0x102");

        assert_eq!(insns[1].pc, 3);
        assert_eq!(insns[1].op, None);
        assert_eq!(insns[1].to_string(), "0003  INVALID");

        assert_eq!(insns[2].to_string(), "0005  STOP");
    }

    #[test]
    fn pads_truncated_push() {
        let insns: Vec<_> = Disasm::new(&[0x63, 0xAA]).collect();
        assert_eq!(insns.len(), 1);
        assert_eq!(insns[0].immediate.as_deref(), Some(&[0xAA, 0, 0, 0][..]));
    }
}
