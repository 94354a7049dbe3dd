use super::utility::as_usize_saturated;
use super::Control;
use crate::{Host, Interpreter};
use alloy_primitives::U256;

pub fn mload<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let top = interpreter.stack.top()?;
    let offset = as_usize_saturated(*top);
    *top = interpreter.memory.get_u256(offset);
    Ok(None)
}

pub fn mstore<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let offset = interpreter.stack.pop()?;
    let value = interpreter.stack.pop()?;
    interpreter
        .memory
        .set_u256(as_usize_saturated(offset), value);
    Ok(None)
}

pub fn mstore8<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let offset = interpreter.stack.pop()?;
    let value = interpreter.stack.pop()?;
    interpreter
        .memory
        .set_byte(as_usize_saturated(offset), value.byte(0));
    Ok(None)
}

pub fn msize<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    interpreter
        .stack
        .push(U256::from(interpreter.memory.len()))?;
    Ok(None)
}
