use super::Control;
use crate::{Host, Interpreter};
use alloy_primitives::U256;
use core::cmp::min;

pub fn pop<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter.stack.pop()?;
    Ok(None)
}

/// EIP-3855: PUSH0 instruction
pub fn push0<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter.stack.push(U256::ZERO)?;
    Ok(None)
}

/// PUSH1..PUSH32. Reads the `N`-byte immediate, zero-padded on the
/// right when the code ends inside it, and advances the pc over the
/// immediate; the dispatch loop advances over the opcode itself.
pub fn push<const N: usize, H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Control {
    let code = &interpreter.contract.code;
    let start = interpreter.pc + 1;
    let mut word = [0u8; 32];
    if start < code.len() {
        let end = min(start + N, code.len());
        word[32 - N..32 - N + (end - start)].copy_from_slice(&code[start..end]);
    }
    interpreter.stack.push(U256::from_be_bytes(word))?;
    interpreter.pc += N;
    Ok(None)
}

pub fn dup<const N: usize, H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Control {
    interpreter.stack.dup::<N>()?;
    Ok(None)
}

pub fn swap<const N: usize, H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Control {
    interpreter.stack.swap::<N>()?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Contract, DummyHost};
    use alloy_primitives::{Address, Bytes};

    #[test]
    fn push_pads_truncated_immediate() {
        let mut host = DummyHost::default();
        // PUSH4 with only two immediate bytes in the code
        let mut interpreter = Interpreter {
            contract: Contract::new(
                Bytes::new(),
                Bytes::from_static(&[0x63, 0xAA, 0xBB]),
                None,
                Address::ZERO,
                Address::ZERO,
                U256::ZERO,
            ),
            ..Default::default()
        };
        push::<4, _>(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.peek(0), Ok(U256::from(0xAABB0000u64)));
        assert_eq!(interpreter.pc, 4);
    }
}
