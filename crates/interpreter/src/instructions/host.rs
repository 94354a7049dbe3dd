use super::utility::{as_address, as_u64_saturated, as_usize_saturated};
use super::Control;
use crate::gas::SELFDESTRUCT_REFUND;
use crate::{Host, Interpreter, Log, SpecId};
use alloy_primitives::{Bytes, B256, U256};

/// Number of block hashes the BLOCKHASH oracle serves.
pub const BLOCK_HASH_HISTORY: u64 = 256;

pub fn balance<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let top = interpreter.stack.top()?;
    let address = as_address(*top);
    *top = host.balance(address);
    Ok(None)
}

/// EIP-1884: SELFBALANCE opcode
pub fn selfbalance<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let balance = host.balance(interpreter.contract.address);
    interpreter.stack.push(balance)?;
    Ok(None)
}

pub fn extcodesize<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let top = interpreter.stack.top()?;
    let address = as_address(*top);
    *top = U256::from(host.code_size(address));
    Ok(None)
}

/// EIP-1052: EXTCODEHASH opcode
pub fn extcodehash<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let top = interpreter.stack.top()?;
    let address = as_address(*top);
    *top = host.code_hash(address).into();
    Ok(None)
}

pub fn extcodecopy<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let address = as_address(interpreter.stack.pop()?);
    let memory_offset = interpreter.stack.pop()?;
    let code_offset = interpreter.stack.pop()?;
    let len = as_usize_saturated(interpreter.stack.pop()?);
    if len != 0 {
        let memory_offset = as_usize_saturated(memory_offset);
        let code_offset = as_usize_saturated(code_offset);
        let code = host.code(address);
        interpreter
            .memory
            .set_data(memory_offset, code_offset, len, &code);
    }
    Ok(None)
}

pub fn blockhash<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let number = interpreter.stack.top()?;
    let requested = *number;
    let block_number = host.env().block.number;

    *number = U256::ZERO;
    if let Some(diff) = block_number.checked_sub(requested) {
        let diff = as_u64_saturated(diff);
        // hash of the current block is not available to it
        if diff > 0 && diff <= BLOCK_HASH_HISTORY {
            let hash = host.block_hash(as_u64_saturated(requested));
            *interpreter.stack.top()? = hash.into();
        }
    }
    Ok(None)
}

pub fn sload<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let top = interpreter.stack.top()?;
    let (value, _) = host.sload(interpreter.contract.address, *top);
    *top = value;
    Ok(None)
}

pub fn sstore<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let index = interpreter.stack.pop()?;
    let value = interpreter.stack.pop()?;
    host.sstore(interpreter.contract.address, index, value);
    Ok(None)
}

pub fn log<const N: usize, H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Control {
    let offset = interpreter.stack.pop()?;
    let len = as_usize_saturated(interpreter.stack.pop()?);
    let data = if len == 0 {
        Bytes::new()
    } else {
        let offset = as_usize_saturated(offset);
        Bytes::copy_from_slice(interpreter.memory.slice(offset, len))
    };

    let mut topics = Vec::with_capacity(N);
    for _ in 0..N {
        topics.push(B256::from(interpreter.stack.pop()?));
    }

    host.log(Log {
        address: interpreter.contract.address,
        topics,
        data,
    });
    Ok(None)
}

pub fn selfdestruct<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let target = as_address(interpreter.stack.pop()?);
    let res = host.selfdestruct(interpreter.contract.address, target);

    // EIP-3529 removed the refund
    if !interpreter.spec_id.is_enabled_in(SpecId::London) && !res.previously_destroyed {
        interpreter.gas.record_refund(SELFDESTRUCT_REFUND);
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DummyHost, Env};

    #[test]
    fn blockhash_window() {
        let mut env = Env::default();
        env.block.number = U256::from(1000);
        let mut host = DummyHost::new(env);
        let mut interpreter = Interpreter::default();

        // within the window
        interpreter.stack.push(U256::from(999)).unwrap();
        blockhash(&mut interpreter, &mut host).unwrap();
        assert_eq!(
            interpreter.stack.pop().unwrap(),
            U256::from_be_bytes(B256::with_last_byte(231).0)
        );

        // current block
        interpreter.stack.push(U256::from(1000)).unwrap();
        blockhash(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.pop(), Ok(U256::ZERO));

        // too old
        interpreter.stack.push(U256::from(1000 - 257)).unwrap();
        blockhash(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.pop(), Ok(U256::ZERO));

        // future block
        interpreter.stack.push(U256::from(1001)).unwrap();
        blockhash(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.pop(), Ok(U256::ZERO));
    }

    #[test]
    fn log_topics_in_stack_order() {
        let mut host = DummyHost::default();
        let mut interpreter = Interpreter::default();
        interpreter.memory.resize(32);
        interpreter.memory.set(0, &[0xAB]);

        interpreter.stack.push(U256::from(2)).unwrap(); // topic2
        interpreter.stack.push(U256::from(1)).unwrap(); // topic1
        interpreter.stack.push(U256::from(1)).unwrap(); // len
        interpreter.stack.push(U256::ZERO).unwrap(); // offset
        log::<2, _>(&mut interpreter, &mut host).unwrap();

        let log = &host.logs[0];
        assert_eq!(log.data.as_ref(), &[0xAB]);
        assert_eq!(log.topics[0], B256::with_last_byte(1));
        assert_eq!(log.topics[1], B256::with_last_byte(2));
    }
}
