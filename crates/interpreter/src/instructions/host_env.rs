use super::utility::address_to_u256;
use super::Control;
use crate::{Host, Interpreter};
use alloy_primitives::U256;

pub fn origin<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter.stack.push(address_to_u256(host.env().tx.origin))?;
    Ok(None)
}

pub fn gasprice<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter.stack.push(host.env().tx.gas_price)?;
    Ok(None)
}

pub fn coinbase<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter
        .stack
        .push(address_to_u256(host.env().block.coinbase))?;
    Ok(None)
}

pub fn timestamp<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter.stack.push(host.env().block.timestamp)?;
    Ok(None)
}

pub fn block_number<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter.stack.push(host.env().block.number)?;
    Ok(None)
}

pub fn difficulty<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter.stack.push(host.env().block.difficulty)?;
    Ok(None)
}

pub fn gaslimit<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter.stack.push(host.env().block.gas_limit)?;
    Ok(None)
}

/// EIP-1344: ChainID opcode
pub fn chainid<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter
        .stack
        .push(U256::from(host.env().cfg.chain_id))?;
    Ok(None)
}

/// EIP-3198: BASEFEE opcode
pub fn basefee<H: Host + ?Sized>(interpreter: &mut Interpreter, host: &mut H) -> Control {
    interpreter.stack.push(host.env().block.basefee)?;
    Ok(None)
}
