use super::utility::{address_to_u256, as_usize_saturated};
use super::Control;
use crate::interpreter::KECCAK_EMPTY;
use crate::{Host, InstructionResult, Interpreter};
use alloy_primitives::{keccak256, B256, U256};

pub fn keccak256_op<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let (offset, len_ptr) = interpreter.stack.pop_top()?;
    let len = as_usize_saturated(*len_ptr);
    let hash = if len == 0 {
        KECCAK_EMPTY
    } else {
        let from = as_usize_saturated(offset);
        let data = interpreter.memory.slice(from, len);
        let hash = keccak256(data);
        if host.env().cfg.enable_preimage_recording {
            let data = data.to_vec();
            host.add_preimage(hash, &data);
        }
        hash
    };
    *len_ptr = hash.into();
    Ok(None)
}

pub fn address<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter
        .stack
        .push(address_to_u256(interpreter.contract.address))?;
    Ok(None)
}

pub fn caller<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter
        .stack
        .push(address_to_u256(interpreter.contract.caller))?;
    Ok(None)
}

pub fn callvalue<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter.stack.push(interpreter.contract.value)?;
    Ok(None)
}

pub fn calldataload<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let offset_ptr = interpreter.stack.top()?;
    let input = &interpreter.contract.input;
    let mut word = B256::ZERO;
    let offset = as_usize_saturated(*offset_ptr);
    if offset < input.len() {
        let count = 32.min(input.len() - offset);
        word[..count].copy_from_slice(&input[offset..offset + count]);
    }
    *offset_ptr = word.into();
    Ok(None)
}

pub fn calldatasize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter
        .stack
        .push(U256::from(interpreter.contract.input.len()))?;
    Ok(None)
}

pub fn calldatacopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let memory_offset = interpreter.stack.pop()?;
    let data_offset = interpreter.stack.pop()?;
    let len = as_usize_saturated(interpreter.stack.pop()?);
    if len != 0 {
        let memory_offset = as_usize_saturated(memory_offset);
        let data_offset = as_usize_saturated(data_offset);
        let input = interpreter.contract.input.clone();
        interpreter
            .memory
            .set_data(memory_offset, data_offset, len, &input);
    }
    Ok(None)
}

pub fn codesize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter
        .stack
        .push(U256::from(interpreter.contract.code.len()))?;
    Ok(None)
}

pub fn codecopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let memory_offset = interpreter.stack.pop()?;
    let code_offset = interpreter.stack.pop()?;
    let len = as_usize_saturated(interpreter.stack.pop()?);
    if len != 0 {
        let memory_offset = as_usize_saturated(memory_offset);
        let code_offset = as_usize_saturated(code_offset);
        let code = interpreter.contract.code.clone();
        interpreter
            .memory
            .set_data(memory_offset, code_offset, len, &code);
    }
    Ok(None)
}

/// EIP-211: RETURNDATASIZE
pub fn returndatasize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter
        .stack
        .push(U256::from(interpreter.return_data.len()))?;
    Ok(None)
}

/// EIP-211: RETURNDATACOPY. Unlike the other copy opcodes, reading past
/// the end of the buffer is a hard error rather than zero fill.
pub fn returndatacopy<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let memory_offset = interpreter.stack.pop()?;
    let data_offset = interpreter.stack.pop()?;
    let len = as_usize_saturated(interpreter.stack.pop()?);
    let data_offset = as_usize_saturated(data_offset);
    let data_end = data_offset.saturating_add(len);
    if data_end > interpreter.return_data.len() {
        return Err(InstructionResult::ReturnDataOutOfBounds);
    }
    if len != 0 {
        let memory_offset = as_usize_saturated(memory_offset);
        let data = interpreter.return_data.clone();
        interpreter
            .memory
            .set(memory_offset, &data[data_offset..data_end]);
    }
    Ok(None)
}

pub fn gas<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter
        .stack
        .push(U256::from(interpreter.gas.remaining()))?;
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Contract, DummyHost};
    use alloy_primitives::{Address, Bytes};

    fn interpreter_with_input(input: &[u8]) -> Interpreter {
        Interpreter {
            contract: Contract::new(
                Bytes::copy_from_slice(input),
                Bytes::new(),
                None,
                Address::ZERO,
                Address::ZERO,
                U256::ZERO,
            ),
            ..Default::default()
        }
    }

    #[test]
    fn calldataload_zero_pads() {
        let mut host = DummyHost::default();
        let mut interpreter = interpreter_with_input(&[0x11, 0x22]);

        interpreter.stack.push(U256::ZERO).unwrap();
        calldataload(&mut interpreter, &mut host).unwrap();
        let word = interpreter.stack.pop().unwrap();
        assert_eq!(word.to_be_bytes::<32>()[..2], [0x11, 0x22]);
        assert_eq!(word.to_be_bytes::<32>()[2..], [0u8; 30]);

        // fully past the end
        interpreter.stack.push(U256::from(100)).unwrap();
        calldataload(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.pop(), Ok(U256::ZERO));
    }

    #[test]
    fn returndatacopy_bounds() {
        let mut host = DummyHost::default();
        let mut interpreter = Interpreter::default();
        interpreter.return_data = Bytes::from_static(&[1, 2, 3, 4]);
        interpreter.memory.resize(32);

        // len 2 at offset 3 overruns a 4-byte buffer
        interpreter.stack.push(U256::from(2)).unwrap();
        interpreter.stack.push(U256::from(3)).unwrap();
        interpreter.stack.push(U256::ZERO).unwrap();
        assert_eq!(
            returndatacopy(&mut interpreter, &mut host),
            Err(InstructionResult::ReturnDataOutOfBounds)
        );

        // a zero-length copy still validates its offset
        interpreter.stack.push(U256::ZERO).unwrap();
        interpreter.stack.push(U256::from(5)).unwrap();
        interpreter.stack.push(U256::ZERO).unwrap();
        assert_eq!(
            returndatacopy(&mut interpreter, &mut host),
            Err(InstructionResult::ReturnDataOutOfBounds)
        );

        // in-bounds copy
        interpreter.stack.push(U256::from(4)).unwrap();
        interpreter.stack.push(U256::ZERO).unwrap();
        interpreter.stack.push(U256::ZERO).unwrap();
        returndatacopy(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.memory.slice(0, 4), &[1, 2, 3, 4]);
    }

    #[test]
    fn keccak_of_empty_range() {
        let mut host = DummyHost::default();
        let mut interpreter = Interpreter::default();
        interpreter.stack.push(U256::ZERO).unwrap(); // len
        interpreter.stack.push(U256::ZERO).unwrap(); // offset
        keccak256_op(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.pop(), Ok(KECCAK_EMPTY.into()));
    }
}
