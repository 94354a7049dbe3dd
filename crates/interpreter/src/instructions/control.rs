use super::utility::as_usize_saturated;
use super::Control;
use crate::{Host, InstructionResult, Interpreter};
use alloy_primitives::{Bytes, U256};

pub fn jump<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let target = interpreter.stack.pop()?;
    jump_inner(interpreter, target)?;
    Ok(None)
}

pub fn jumpi<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let target = interpreter.stack.pop()?;
    let cond = interpreter.stack.pop()?;
    if !cond.is_zero() {
        jump_inner(interpreter, target)?;
    } else {
        interpreter.pc += 1;
    }
    Ok(None)
}

#[inline]
fn jump_inner(interpreter: &mut Interpreter, target: U256) -> Result<(), InstructionResult> {
    let target = usize::try_from(target).map_err(|_| InstructionResult::InvalidJump)?;
    if !interpreter.contract.is_valid_jump(target) {
        return Err(InstructionResult::InvalidJump);
    }
    interpreter.pc = target;
    Ok(())
}

pub fn jumpdest<H: Host + ?Sized>(_interpreter: &mut Interpreter, _host: &mut H) -> Control {
    Ok(None)
}

pub fn pc<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter.stack.push(U256::from(interpreter.pc))?;
    Ok(None)
}

#[inline]
fn return_inner(interpreter: &mut Interpreter) -> Result<Option<Bytes>, InstructionResult> {
    let offset = interpreter.stack.pop()?;
    let len = interpreter.stack.pop()?;
    let len = as_usize_saturated(len);
    // offset is ignored when len is zero
    let mut output = Bytes::new();
    if len != 0 {
        let offset = as_usize_saturated(offset);
        output = Bytes::copy_from_slice(interpreter.memory.slice(offset, len));
    }
    Ok(Some(output))
}

pub fn ret<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    return_inner(interpreter)
}

/// EIP-140: REVERT instruction
pub fn revert<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    return_inner(interpreter)
}

pub fn stop<H: Host + ?Sized>(_interpreter: &mut Interpreter, _host: &mut H) -> Control {
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Contract, DummyHost};
    use alloy_primitives::{Address, Bytes};

    fn interpreter_for(code: &[u8]) -> Interpreter {
        Interpreter {
            contract: Contract::new(
                Bytes::new(),
                Bytes::copy_from_slice(code),
                None,
                Address::ZERO,
                Address::ZERO,
                U256::ZERO,
            ),
            ..Default::default()
        }
    }

    #[test]
    fn jump_validates_target() {
        let mut host = DummyHost::default();
        // JUMPDEST at 0, data byte at 1
        let mut interpreter = interpreter_for(&[0x5B, 0x00]);

        interpreter.stack.push(U256::ZERO).unwrap();
        assert!(jump(&mut interpreter, &mut host).is_ok());
        assert_eq!(interpreter.pc, 0);

        interpreter.stack.push(U256::from(1)).unwrap();
        assert_eq!(
            jump(&mut interpreter, &mut host),
            Err(InstructionResult::InvalidJump)
        );

        // targets beyond usize are invalid, not a panic
        interpreter.stack.push(U256::MAX).unwrap();
        assert_eq!(
            jump(&mut interpreter, &mut host),
            Err(InstructionResult::InvalidJump)
        );
    }

    #[test]
    fn jumpi_falls_through_on_zero() {
        let mut host = DummyHost::default();
        let mut interpreter = interpreter_for(&[0x5B, 0x5B]);
        interpreter.pc = 1;

        interpreter.stack.push(U256::ZERO).unwrap(); // cond
        interpreter.stack.push(U256::ZERO).unwrap(); // target
        jumpi(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.pc, 2, "untaken JUMPI advances past itself");

        interpreter.stack.push(U256::from(1)).unwrap();
        interpreter.stack.push(U256::ZERO).unwrap();
        jumpi(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.pc, 0);
    }
}
