use super::i256::{i256_div, i256_mod};
use super::Control;
use crate::{Host, Interpreter};
use alloy_primitives::U256;

pub fn add<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = op1.wrapping_add(*op2);
    Ok(None)
}

pub fn mul<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = op1.wrapping_mul(*op2);
    Ok(None)
}

pub fn sub<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = op1.wrapping_sub(*op2);
    Ok(None)
}

pub fn div<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    if !op2.is_zero() {
        *op2 = op1.wrapping_div(*op2);
    }
    Ok(None)
}

pub fn sdiv<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = i256_div(op1, *op2);
    Ok(None)
}

pub fn rem<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    if !op2.is_zero() {
        *op2 = op1.wrapping_rem(*op2);
    }
    Ok(None)
}

pub fn smod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = i256_mod(op1, *op2);
    Ok(None)
}

pub fn addmod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2, op3) = interpreter.stack.pop2_top()?;
    *op3 = op1.add_mod(op2, *op3);
    Ok(None)
}

pub fn mulmod<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2, op3) = interpreter.stack.pop2_top()?;
    *op3 = op1.mul_mod(op2, *op3);
    Ok(None)
}

pub fn exp<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (op1, op2) = interpreter.stack.pop_top()?;
    *op2 = op1.pow(*op2);
    Ok(None)
}

/// SIGNEXTEND extends the sign bit of the `ext`-th byte (counted from
/// the low end) of `x` over the higher bytes. `ext >= 31` leaves the
/// word unchanged.
pub fn signextend<H: Host + ?Sized>(interpreter: &mut Interpreter, _host: &mut H) -> Control {
    let (ext, x) = interpreter.stack.pop_top()?;
    if ext < U256::from(31) {
        let ext = ext.as_limbs()[0];
        let bit_index = (8 * ext + 7) as usize;
        let bit = x.bit(bit_index);
        let mask = (U256::from(1) << bit_index) - U256::from(1);
        *x = if bit { *x | !mask } else { *x & mask };
    }
    Ok(None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DummyHost;
    use alloy_primitives::uint;

    fn interpreter_with(values: &[U256]) -> Interpreter {
        let mut interpreter = Interpreter::default();
        for value in values {
            interpreter.stack.push(*value).unwrap();
        }
        interpreter
    }

    #[test]
    fn div_by_zero_is_zero() {
        let mut host = DummyHost::default();
        let mut interpreter = interpreter_with(&[U256::ZERO, U256::from(10)]);
        div(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.peek(0), Ok(U256::ZERO));

        let mut interpreter = interpreter_with(&[U256::ZERO, U256::from(10)]);
        rem(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.peek(0), Ok(U256::ZERO));
    }

    #[test]
    fn wrapping_add_mod_2_256() {
        let mut host = DummyHost::default();
        let mut interpreter = interpreter_with(&[U256::from(1), U256::MAX]);
        add(&mut interpreter, &mut host).unwrap();
        assert_eq!(interpreter.stack.peek(0), Ok(U256::ZERO));
    }

    #[test]
    fn signextend_cases() {
        let mut host = DummyHost::default();
        uint! {
            let cases = [
                // (x, ext, expected)
                (0xff_U256, 0_U256, U256::MAX),
                (0x7f_U256, 0_U256, 0x7f_U256),
                (0xff00_U256, 0_U256, 0_U256),
                (0x80ff_U256, 1_U256,
                 0xffffffffffffffffffffffffffffffffffffffffffffffffffffffffffff80ff_U256),
                (0xff_U256, 31_U256, 0xff_U256),
                (0xff_U256, U256::MAX, 0xff_U256),
            ];
        }
        for (x, ext, expected) in cases {
            let mut interpreter = interpreter_with(&[x, ext]);
            signextend(&mut interpreter, &mut host).unwrap();
            assert_eq!(interpreter.stack.peek(0), Ok(expected), "x={x} ext={ext}");
        }
    }
}
