use super::i256::i256_cmp;
use super::utility::as_usize_saturated;
use super::Control;
use crate::{Host, Interpreter};
use alloy_primitives::U256;
use core::cmp::Ordering;

pub fn lt<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = U256::from(op1 < *op2);
    Ok(None)
}

pub fn gt<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = U256::from(op1 > *op2);
    Ok(None)
}

pub fn slt<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = U256::from(i256_cmp(op1, *op2) == Ordering::Less);
    Ok(None)
}

pub fn sgt<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = U256::from(i256_cmp(op1, *op2) == Ordering::Greater);
    Ok(None)
}

pub fn eq<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = U256::from(op1 == *op2);
    Ok(None)
}

pub fn iszero<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let op1 = interpreter.stack.top()?;
    *op1 = U256::from(op1.is_zero());
    Ok(None)
}

pub fn bitand<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = op1 & *op2;
    Ok(None)
}

pub fn bitor<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = op1 | *op2;
    Ok(None)
}

pub fn bitxor<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = op1 ^ *op2;
    Ok(None)
}

pub fn not<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let op1 = interpreter.stack.top()?;
    *op1 = !*op1;
    Ok(None)
}

pub fn byte<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    let o1 = as_usize_saturated(op1);
    *op2 = if o1 < 32 {
        // `byte` indexes from the low end, the opcode from the high end
        U256::from(op2.byte(31 - o1))
    } else {
        U256::ZERO
    };
    Ok(None)
}

/// EIP-145: Bitwise shifting instructions in EVM
pub fn shl<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    let shift = as_usize_saturated(op1);
    *op2 = if shift < 256 { *op2 << shift } else { U256::ZERO };
    Ok(None)
}

/// EIP-145: Bitwise shifting instructions in EVM
pub fn shr<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    let shift = as_usize_saturated(op1);
    *op2 = if shift < 256 { *op2 >> shift } else { U256::ZERO };
    Ok(None)
}

/// EIP-145: Bitwise shifting instructions in EVM
pub fn sar<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    let shift = as_usize_saturated(op1);
    *op2 = if shift < 256 {
        op2.arithmetic_shr(shift)
    } else if op2.bit(255) {
        U256::MAX
    } else {
        U256::ZERO
    };
    Ok(None)
}
