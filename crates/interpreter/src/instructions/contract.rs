use super::utility::{as_address, as_u64_saturated, as_usize_saturated};
use super::Control;
use crate::gas::CALL_STIPEND;
use crate::{
    return_ok, return_revert, CallContext, CallInputs, CallScheme, CreateInputs, CreateScheme,
    Host, InstructionResult, Interpreter, InterpreterResult, SpecId, Transfer,
};
use alloy_primitives::{Address, Bytes, U256};
use core::cmp::min;
use core::ops::Range;

/// Reads the input range and the return-memory range of a call. Both
/// ranges were resized into existence by the operation's memory-size
/// function.
#[inline]
fn get_memory_input_and_out_ranges(
    interpreter: &mut Interpreter,
) -> Result<(Bytes, Range<usize>), InstructionResult> {
    let in_offset = interpreter.stack.pop()?;
    let in_len = as_usize_saturated(interpreter.stack.pop()?);
    let input = if in_len != 0 {
        let in_offset = as_usize_saturated(in_offset);
        Bytes::copy_from_slice(interpreter.memory.slice(in_offset, in_len))
    } else {
        Bytes::new()
    };

    let out_offset = interpreter.stack.pop()?;
    let out_len = as_usize_saturated(interpreter.stack.pop()?);
    let out_offset = if out_len != 0 {
        as_usize_saturated(out_offset)
    } else {
        0
    };

    Ok((input, out_offset..out_offset + out_len))
}

/// Gas forwarded to a child call. EIP-150 caps it at all but one 64th
/// of the remaining gas; before that, asking for more than is available
/// runs the frame out of gas.
#[inline]
fn forward_gas(interpreter: &mut Interpreter, requested: U256) -> Result<u64, InstructionResult> {
    let requested = as_u64_saturated(requested);
    let gas_limit = if interpreter.spec_id.is_enabled_in(SpecId::Tangerine) {
        let remaining = interpreter.gas.remaining();
        min(remaining - remaining / 64, requested)
    } else {
        requested
    };
    if !interpreter.gas.record_cost(gas_limit) {
        return Err(InstructionResult::OutOfGas);
    }
    Ok(gas_limit)
}

/// Applies a finished call frame to the parent: return the unspent gas,
/// copy the output into the requested memory window, push the status.
#[inline]
fn insert_call_outcome(
    interpreter: &mut Interpreter,
    outcome: InterpreterResult,
    out_range: Range<usize>,
) -> Control {
    let output = outcome.output.clone();
    let target_len = min(out_range.len(), output.len());
    match outcome.result {
        return_ok!() => {
            interpreter.gas.erase_cost(outcome.gas.remaining());
            interpreter.gas.record_refund(outcome.gas.refunded());
            interpreter.memory.set(out_range.start, &output[..target_len]);
            interpreter.stack.push(U256::from(1))?;
        }
        return_revert!() => {
            interpreter.gas.erase_cost(outcome.gas.remaining());
            interpreter.memory.set(out_range.start, &output[..target_len]);
            interpreter.stack.push(U256::ZERO)?;
        }
        _ => {
            interpreter.stack.push(U256::ZERO)?;
        }
    }
    Ok(Some(output))
}

pub fn call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let local_gas_limit = interpreter.stack.pop()?;
    let to = as_address(interpreter.stack.pop()?);
    let value = interpreter.stack.pop()?;
    let has_transfer = !value.is_zero();
    if interpreter.is_static && has_transfer {
        return Err(InstructionResult::WriteProtection);
    }
    let (input, out_range) = get_memory_input_and_out_ranges(interpreter)?;

    let mut gas_limit = forward_gas(interpreter, local_gas_limit)?;
    if has_transfer {
        // the callee can always do a little work on a plain transfer
        gas_limit += CALL_STIPEND;
    }

    let outcome = host.call(CallInputs {
        code_address: to,
        transfer: Transfer {
            source: interpreter.contract.address,
            target: to,
            value,
        },
        input,
        gas_limit,
        context: CallContext {
            address: to,
            caller: interpreter.contract.address,
            code_address: to,
            apparent_value: value,
            scheme: CallScheme::Call,
        },
        is_static: interpreter.is_static,
    });
    insert_call_outcome(interpreter, outcome, out_range)
}

pub fn call_code<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let local_gas_limit = interpreter.stack.pop()?;
    let to = as_address(interpreter.stack.pop()?);
    let value = interpreter.stack.pop()?;
    let has_transfer = !value.is_zero();
    let (input, out_range) = get_memory_input_and_out_ranges(interpreter)?;

    let mut gas_limit = forward_gas(interpreter, local_gas_limit)?;
    if has_transfer {
        gas_limit += CALL_STIPEND;
    }

    // executes `to`'s code against our own storage and balance
    let outcome = host.call(CallInputs {
        code_address: to,
        transfer: Transfer {
            source: interpreter.contract.address,
            target: interpreter.contract.address,
            value,
        },
        input,
        gas_limit,
        context: CallContext {
            address: interpreter.contract.address,
            caller: interpreter.contract.address,
            code_address: to,
            apparent_value: value,
            scheme: CallScheme::CallCode,
        },
        is_static: interpreter.is_static,
    });
    insert_call_outcome(interpreter, outcome, out_range)
}

/// EIP-7: DELEGATECALL. Runs foreign code with our storage, caller and
/// value.
pub fn delegate_call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let local_gas_limit = interpreter.stack.pop()?;
    let to = as_address(interpreter.stack.pop()?);
    let (input, out_range) = get_memory_input_and_out_ranges(interpreter)?;

    let gas_limit = forward_gas(interpreter, local_gas_limit)?;

    let outcome = host.call(CallInputs {
        code_address: to,
        transfer: Transfer {
            source: interpreter.contract.address,
            target: interpreter.contract.address,
            value: U256::ZERO,
        },
        input,
        gas_limit,
        context: CallContext {
            address: interpreter.contract.address,
            caller: interpreter.contract.caller,
            code_address: to,
            apparent_value: interpreter.contract.value,
            scheme: CallScheme::DelegateCall,
        },
        is_static: interpreter.is_static,
    });
    insert_call_outcome(interpreter, outcome, out_range)
}

/// EIP-214: STATICCALL. The callee and everything below it run read
/// only.
pub fn static_call<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    let local_gas_limit = interpreter.stack.pop()?;
    let to = as_address(interpreter.stack.pop()?);
    let (input, out_range) = get_memory_input_and_out_ranges(interpreter)?;

    let gas_limit = forward_gas(interpreter, local_gas_limit)?;

    let outcome = host.call(CallInputs {
        code_address: to,
        transfer: Transfer {
            source: interpreter.contract.address,
            target: to,
            value: U256::ZERO,
        },
        input,
        gas_limit,
        context: CallContext {
            address: to,
            caller: interpreter.contract.address,
            code_address: to,
            apparent_value: U256::ZERO,
            scheme: CallScheme::StaticCall,
        },
        is_static: true,
    });
    insert_call_outcome(interpreter, outcome, out_range)
}

pub fn create<const IS_CREATE2: bool, H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Control {
    let value = interpreter.stack.pop()?;
    let code_offset = interpreter.stack.pop()?;
    let len = as_usize_saturated(interpreter.stack.pop()?);

    let mut init_code = Bytes::new();
    if len != 0 {
        let code_offset = as_usize_saturated(code_offset);
        init_code = Bytes::copy_from_slice(interpreter.memory.slice(code_offset, len));
    }

    let scheme = if IS_CREATE2 {
        let salt = interpreter.stack.pop()?;
        CreateScheme::Create2 { salt }
    } else {
        CreateScheme::Create
    };

    // EIP-150 applies to creates as well, without a caller-chosen limit
    let mut gas_limit = interpreter.gas.remaining();
    if interpreter.spec_id.is_enabled_in(SpecId::Tangerine) {
        gas_limit -= gas_limit / 64;
    }
    if !interpreter.gas.record_cost(gas_limit) {
        return Err(InstructionResult::OutOfGas);
    }

    let outcome = host.create(CreateInputs {
        caller: interpreter.contract.address,
        scheme,
        value,
        init_code,
        gas_limit,
    });

    match outcome.result.result {
        return_ok!() => {
            interpreter.gas.erase_cost(outcome.gas().remaining());
            interpreter.gas.record_refund(outcome.gas().refunded());
            interpreter
                .stack
                .push(outcome.address.unwrap_or(Address::ZERO).into_word().into())?;
        }
        return_revert!() => {
            interpreter.gas.erase_cost(outcome.gas().remaining());
            interpreter.stack.push(U256::ZERO)?;
        }
        _ => {
            interpreter.stack.push(U256::ZERO)?;
        }
    }

    // only revert data is observable through RETURNDATA*
    let output = if outcome.result.is_revert() {
        outcome.result.output
    } else {
        Bytes::new()
    };
    Ok(Some(output))
}
