//! Per-fork operation tables.
//!
//! Every opcode slot holds an [`Operation`] record: the handler, its
//! constant gas, stack bounds derived from the declared arity, optional
//! dynamic-gas and memory-size functions, and the dispatch flags. A
//! fork's table is derived from its predecessor's by applying the
//! fork's EIP patches, Frontier through London.

use crate::gas::{self, calc};
use crate::instructions::utility::{as_address, as_u64_saturated};
use crate::instructions::{arithmetic, bitwise, contract, control, host, host_env, memory, stack, system};
use crate::opcode::{self, OPCODE_INFO};
use crate::{Host, InstructionResult, Interpreter, SpecId, Stack, STACK_LIMIT};
use alloy_primitives::U256;
use core::cmp::max;

/// An opcode handler. Returns the bytes the operation surfaces, if any.
pub type Instruction<H> = fn(&mut Interpreter, &mut H) -> crate::instructions::Control;

/// Computes the operation's dynamic gas from the stack and state. May
/// record refunds and warm accessed state as a side effect.
pub type DynamicGas<H> = fn(&mut Interpreter, &mut H) -> Result<u64, InstructionResult>;

/// Computes the highest memory byte the operation touches.
pub type MemorySize = fn(&Stack) -> Result<u64, InstructionResult>;

/// A single slot of the jump table.
pub struct Operation<H: ?Sized> {
    pub execute: Instruction<H>,
    pub constant_gas: u64,
    /// Stack size the operation requires.
    pub min_stack: usize,
    /// Stack size above which the operation would overflow.
    pub max_stack: usize,
    pub dynamic_gas: Option<DynamicGas<H>>,
    pub memory_size: Option<MemorySize>,
    /// Operation ends execution of the frame.
    pub halts: bool,
    /// Operation reverts the frame.
    pub reverts: bool,
    /// Operation sets the pc itself.
    pub jumps: bool,
    /// Operation mutates state and traps in read-only frames.
    pub writes: bool,
    /// Operation's result populates the return-data buffer.
    pub returns: bool,
}

impl<H: ?Sized> Clone for Operation<H> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<H: ?Sized> Copy for Operation<H> {}

impl<H: Host + ?Sized> Operation<H> {
    pub const fn new(execute: Instruction<H>, constant_gas: u64, inputs: usize, outputs: usize) -> Self {
        Self {
            execute,
            constant_gas,
            min_stack: inputs,
            max_stack: STACK_LIMIT + inputs - outputs,
            dynamic_gas: None,
            memory_size: None,
            halts: false,
            reverts: false,
            jumps: false,
            writes: false,
            returns: false,
        }
    }

    pub const fn dynamic(mut self, f: DynamicGas<H>) -> Self {
        self.dynamic_gas = Some(f);
        self
    }

    pub const fn memory(mut self, f: MemorySize) -> Self {
        self.memory_size = Some(f);
        self
    }

    pub const fn halts(mut self) -> Self {
        self.halts = true;
        self
    }

    pub const fn reverts(mut self) -> Self {
        self.reverts = true;
        self
    }

    pub const fn jumps(mut self) -> Self {
        self.jumps = true;
        self
    }

    pub const fn writes(mut self) -> Self {
        self.writes = true;
        self
    }

    pub const fn returns(mut self) -> Self {
        self.returns = true;
        self
    }
}

/// Builds an operation, pulling the stack arity from the opcode
/// metadata so the bounds cannot drift from it.
fn op<H: Host + ?Sized>(opcode: u8, constant_gas: u64, execute: Instruction<H>) -> Operation<H> {
    let info = match OPCODE_INFO[opcode as usize] {
        Some(info) => info,
        None => panic!("table entry for an opcode without metadata"),
    };
    Operation::new(execute, constant_gas, info.inputs as usize, info.outputs as usize)
}

/// The 256-slot dispatch table of one hard fork. Undefined opcodes are
/// `None` and fail with `InvalidOpcode`.
pub struct JumpTable<H: ?Sized>(Box<[Option<Operation<H>>; 256]>);

impl<H: Host + ?Sized> JumpTable<H> {
    /// Builds the table for the given fork by patching its way up from
    /// Frontier.
    pub fn new(spec_id: SpecId) -> Self {
        let mut table = Self::frontier();
        if spec_id.is_enabled_in(SpecId::Homestead) {
            table.apply_homestead();
        }
        if spec_id.is_enabled_in(SpecId::Tangerine) {
            table.apply_tangerine();
        }
        // Spurious Dragon changed only dynamic pricing (EIP-160 EXP
        // bytes), which keys off the frame's spec id.
        if spec_id.is_enabled_in(SpecId::Byzantium) {
            table.apply_byzantium();
        }
        if spec_id.is_enabled_in(SpecId::Constantinople) {
            table.apply_constantinople();
        }
        if spec_id.is_enabled_in(SpecId::Istanbul) {
            table.apply_istanbul();
        }
        if spec_id.is_enabled_in(SpecId::Berlin) {
            table.apply_berlin();
        }
        if spec_id.is_enabled_in(SpecId::London) {
            table.apply_london();
        }
        table
    }

    /// Builds a fork table and layers extra EIPs on top.
    pub fn new_with_eips(spec_id: SpecId, extra_eips: &[u64]) -> Result<Self, UnknownEip> {
        let mut table = Self::new(spec_id);
        for &eip in extra_eips {
            table.enable_eip(eip)?;
        }
        Ok(table)
    }

    /// Looks up the operation for an opcode byte.
    #[inline]
    pub fn get(&self, opcode: u8) -> Option<&Operation<H>> {
        self.0[opcode as usize].as_ref()
    }

    #[inline]
    pub fn set(&mut self, opcode: u8, operation: Operation<H>) {
        self.0[opcode as usize] = Some(operation);
    }

    fn entry_mut(&mut self, opcode: u8) -> &mut Operation<H> {
        match self.0[opcode as usize].as_mut() {
            Some(operation) => operation,
            None => panic!("patched opcode is not in the table"),
        }
    }

    fn reprice(&mut self, opcode: u8, constant_gas: u64) {
        self.entry_mut(opcode).constant_gas = constant_gas;
    }

    /// The original instruction set.
    fn frontier() -> Self {
        use crate::opcode::*;
        let mut t = Self(Box::new([None; 256]));

        t.set(STOP, op(STOP, gas::ZERO, control::stop).halts());

        t.set(ADD, op(ADD, gas::VERYLOW, arithmetic::add));
        t.set(MUL, op(MUL, gas::LOW, arithmetic::mul));
        t.set(SUB, op(SUB, gas::VERYLOW, arithmetic::sub));
        t.set(DIV, op(DIV, gas::LOW, arithmetic::div));
        t.set(SDIV, op(SDIV, gas::LOW, arithmetic::sdiv));
        t.set(MOD, op(MOD, gas::LOW, arithmetic::rem));
        t.set(SMOD, op(SMOD, gas::LOW, arithmetic::smod));
        t.set(ADDMOD, op(ADDMOD, gas::MID, arithmetic::addmod));
        t.set(MULMOD, op(MULMOD, gas::MID, arithmetic::mulmod));
        t.set(EXP, op(EXP, gas::ZERO, arithmetic::exp).dynamic(gas_exp));
        t.set(SIGNEXTEND, op(SIGNEXTEND, gas::LOW, arithmetic::signextend));

        t.set(LT, op(LT, gas::VERYLOW, bitwise::lt));
        t.set(GT, op(GT, gas::VERYLOW, bitwise::gt));
        t.set(SLT, op(SLT, gas::VERYLOW, bitwise::slt));
        t.set(SGT, op(SGT, gas::VERYLOW, bitwise::sgt));
        t.set(EQ, op(EQ, gas::VERYLOW, bitwise::eq));
        t.set(ISZERO, op(ISZERO, gas::VERYLOW, bitwise::iszero));
        t.set(AND, op(AND, gas::VERYLOW, bitwise::bitand));
        t.set(OR, op(OR, gas::VERYLOW, bitwise::bitor));
        t.set(XOR, op(XOR, gas::VERYLOW, bitwise::bitxor));
        t.set(NOT, op(NOT, gas::VERYLOW, bitwise::not));
        t.set(BYTE, op(BYTE, gas::VERYLOW, bitwise::byte));

        t.set(
            KECCAK256,
            op(KECCAK256, gas::KECCAK256, system::keccak256_op)
                .dynamic(gas_keccak256)
                .memory(mem_keccak256),
        );

        t.set(ADDRESS, op(ADDRESS, gas::BASE, system::address));
        t.set(BALANCE, op(BALANCE, 20, host::balance));
        t.set(ORIGIN, op(ORIGIN, gas::BASE, host_env::origin));
        t.set(CALLER, op(CALLER, gas::BASE, system::caller));
        t.set(CALLVALUE, op(CALLVALUE, gas::BASE, system::callvalue));
        t.set(CALLDATALOAD, op(CALLDATALOAD, gas::VERYLOW, system::calldataload));
        t.set(CALLDATASIZE, op(CALLDATASIZE, gas::BASE, system::calldatasize));
        t.set(
            CALLDATACOPY,
            op(CALLDATACOPY, gas::VERYLOW, system::calldatacopy)
                .dynamic(gas_calldatacopy)
                .memory(mem_calldatacopy),
        );
        t.set(CODESIZE, op(CODESIZE, gas::BASE, system::codesize));
        t.set(
            CODECOPY,
            op(CODECOPY, gas::VERYLOW, system::codecopy)
                .dynamic(gas_codecopy)
                .memory(mem_codecopy),
        );
        t.set(GASPRICE, op(GASPRICE, gas::BASE, host_env::gasprice));
        t.set(EXTCODESIZE, op(EXTCODESIZE, 20, host::extcodesize));
        t.set(
            EXTCODECOPY,
            op(EXTCODECOPY, 20, host::extcodecopy)
                .dynamic(gas_extcodecopy)
                .memory(mem_extcodecopy),
        );

        t.set(BLOCKHASH, op(BLOCKHASH, gas::BLOCKHASH, host::blockhash));
        t.set(COINBASE, op(COINBASE, gas::BASE, host_env::coinbase));
        t.set(TIMESTAMP, op(TIMESTAMP, gas::BASE, host_env::timestamp));
        t.set(NUMBER, op(NUMBER, gas::BASE, host_env::block_number));
        t.set(DIFFICULTY, op(DIFFICULTY, gas::BASE, host_env::difficulty));
        t.set(GASLIMIT, op(GASLIMIT, gas::BASE, host_env::gaslimit));

        t.set(POP, op(POP, gas::BASE, stack::pop));
        t.set(MLOAD, op(MLOAD, gas::VERYLOW, memory::mload).memory(mem_mload));
        t.set(MSTORE, op(MSTORE, gas::VERYLOW, memory::mstore).memory(mem_mstore));
        t.set(MSTORE8, op(MSTORE8, gas::VERYLOW, memory::mstore8).memory(mem_mstore8));
        t.set(SLOAD, op(SLOAD, 50, host::sload));
        t.set(SSTORE, op(SSTORE, gas::ZERO, host::sstore).dynamic(gas_sstore).writes());
        t.set(JUMP, op(JUMP, gas::MID, control::jump).jumps());
        t.set(JUMPI, op(JUMPI, gas::HIGH, control::jumpi).jumps());
        t.set(PC, op(PC, gas::BASE, control::pc));
        t.set(MSIZE, op(MSIZE, gas::BASE, memory::msize));
        t.set(GAS, op(GAS, gas::BASE, system::gas));
        t.set(JUMPDEST, op(JUMPDEST, gas::JUMPDEST, control::jumpdest));

        t.set(PUSH1, op(PUSH1, gas::VERYLOW, stack::push::<1, H>));
        t.set(PUSH2, op(PUSH2, gas::VERYLOW, stack::push::<2, H>));
        t.set(PUSH3, op(PUSH3, gas::VERYLOW, stack::push::<3, H>));
        t.set(PUSH4, op(PUSH4, gas::VERYLOW, stack::push::<4, H>));
        t.set(PUSH5, op(PUSH5, gas::VERYLOW, stack::push::<5, H>));
        t.set(PUSH6, op(PUSH6, gas::VERYLOW, stack::push::<6, H>));
        t.set(PUSH7, op(PUSH7, gas::VERYLOW, stack::push::<7, H>));
        t.set(PUSH8, op(PUSH8, gas::VERYLOW, stack::push::<8, H>));
        t.set(PUSH9, op(PUSH9, gas::VERYLOW, stack::push::<9, H>));
        t.set(PUSH10, op(PUSH10, gas::VERYLOW, stack::push::<10, H>));
        t.set(PUSH11, op(PUSH11, gas::VERYLOW, stack::push::<11, H>));
        t.set(PUSH12, op(PUSH12, gas::VERYLOW, stack::push::<12, H>));
        t.set(PUSH13, op(PUSH13, gas::VERYLOW, stack::push::<13, H>));
        t.set(PUSH14, op(PUSH14, gas::VERYLOW, stack::push::<14, H>));
        t.set(PUSH15, op(PUSH15, gas::VERYLOW, stack::push::<15, H>));
        t.set(PUSH16, op(PUSH16, gas::VERYLOW, stack::push::<16, H>));
        t.set(PUSH17, op(PUSH17, gas::VERYLOW, stack::push::<17, H>));
        t.set(PUSH18, op(PUSH18, gas::VERYLOW, stack::push::<18, H>));
        t.set(PUSH19, op(PUSH19, gas::VERYLOW, stack::push::<19, H>));
        t.set(PUSH20, op(PUSH20, gas::VERYLOW, stack::push::<20, H>));
        t.set(PUSH21, op(PUSH21, gas::VERYLOW, stack::push::<21, H>));
        t.set(PUSH22, op(PUSH22, gas::VERYLOW, stack::push::<22, H>));
        t.set(PUSH23, op(PUSH23, gas::VERYLOW, stack::push::<23, H>));
        t.set(PUSH24, op(PUSH24, gas::VERYLOW, stack::push::<24, H>));
        t.set(PUSH25, op(PUSH25, gas::VERYLOW, stack::push::<25, H>));
        t.set(PUSH26, op(PUSH26, gas::VERYLOW, stack::push::<26, H>));
        t.set(PUSH27, op(PUSH27, gas::VERYLOW, stack::push::<27, H>));
        t.set(PUSH28, op(PUSH28, gas::VERYLOW, stack::push::<28, H>));
        t.set(PUSH29, op(PUSH29, gas::VERYLOW, stack::push::<29, H>));
        t.set(PUSH30, op(PUSH30, gas::VERYLOW, stack::push::<30, H>));
        t.set(PUSH31, op(PUSH31, gas::VERYLOW, stack::push::<31, H>));
        t.set(PUSH32, op(PUSH32, gas::VERYLOW, stack::push::<32, H>));

        t.set(DUP1, op(DUP1, gas::VERYLOW, stack::dup::<1, H>));
        t.set(DUP2, op(DUP2, gas::VERYLOW, stack::dup::<2, H>));
        t.set(DUP3, op(DUP3, gas::VERYLOW, stack::dup::<3, H>));
        t.set(DUP4, op(DUP4, gas::VERYLOW, stack::dup::<4, H>));
        t.set(DUP5, op(DUP5, gas::VERYLOW, stack::dup::<5, H>));
        t.set(DUP6, op(DUP6, gas::VERYLOW, stack::dup::<6, H>));
        t.set(DUP7, op(DUP7, gas::VERYLOW, stack::dup::<7, H>));
        t.set(DUP8, op(DUP8, gas::VERYLOW, stack::dup::<8, H>));
        t.set(DUP9, op(DUP9, gas::VERYLOW, stack::dup::<9, H>));
        t.set(DUP10, op(DUP10, gas::VERYLOW, stack::dup::<10, H>));
        t.set(DUP11, op(DUP11, gas::VERYLOW, stack::dup::<11, H>));
        t.set(DUP12, op(DUP12, gas::VERYLOW, stack::dup::<12, H>));
        t.set(DUP13, op(DUP13, gas::VERYLOW, stack::dup::<13, H>));
        t.set(DUP14, op(DUP14, gas::VERYLOW, stack::dup::<14, H>));
        t.set(DUP15, op(DUP15, gas::VERYLOW, stack::dup::<15, H>));
        t.set(DUP16, op(DUP16, gas::VERYLOW, stack::dup::<16, H>));

        t.set(SWAP1, op(SWAP1, gas::VERYLOW, stack::swap::<1, H>));
        t.set(SWAP2, op(SWAP2, gas::VERYLOW, stack::swap::<2, H>));
        t.set(SWAP3, op(SWAP3, gas::VERYLOW, stack::swap::<3, H>));
        t.set(SWAP4, op(SWAP4, gas::VERYLOW, stack::swap::<4, H>));
        t.set(SWAP5, op(SWAP5, gas::VERYLOW, stack::swap::<5, H>));
        t.set(SWAP6, op(SWAP6, gas::VERYLOW, stack::swap::<6, H>));
        t.set(SWAP7, op(SWAP7, gas::VERYLOW, stack::swap::<7, H>));
        t.set(SWAP8, op(SWAP8, gas::VERYLOW, stack::swap::<8, H>));
        t.set(SWAP9, op(SWAP9, gas::VERYLOW, stack::swap::<9, H>));
        t.set(SWAP10, op(SWAP10, gas::VERYLOW, stack::swap::<10, H>));
        t.set(SWAP11, op(SWAP11, gas::VERYLOW, stack::swap::<11, H>));
        t.set(SWAP12, op(SWAP12, gas::VERYLOW, stack::swap::<12, H>));
        t.set(SWAP13, op(SWAP13, gas::VERYLOW, stack::swap::<13, H>));
        t.set(SWAP14, op(SWAP14, gas::VERYLOW, stack::swap::<14, H>));
        t.set(SWAP15, op(SWAP15, gas::VERYLOW, stack::swap::<15, H>));
        t.set(SWAP16, op(SWAP16, gas::VERYLOW, stack::swap::<16, H>));

        t.set(LOG0, op(LOG0, gas::LOG, host::log::<0, H>).dynamic(gas_log::<0, H>).memory(mem_log).writes());
        t.set(LOG1, op(LOG1, gas::LOG, host::log::<1, H>).dynamic(gas_log::<1, H>).memory(mem_log).writes());
        t.set(LOG2, op(LOG2, gas::LOG, host::log::<2, H>).dynamic(gas_log::<2, H>).memory(mem_log).writes());
        t.set(LOG3, op(LOG3, gas::LOG, host::log::<3, H>).dynamic(gas_log::<3, H>).memory(mem_log).writes());
        t.set(LOG4, op(LOG4, gas::LOG, host::log::<4, H>).dynamic(gas_log::<4, H>).memory(mem_log).writes());

        t.set(
            CREATE,
            op(CREATE, gas::CREATE, contract::create::<false, H>)
                .memory(mem_create)
                .writes()
                .returns(),
        );
        t.set(
            CALL,
            op(CALL, 40, contract::call)
                .dynamic(gas_call)
                .memory(mem_call)
                .returns(),
        );
        t.set(
            CALLCODE,
            op(CALLCODE, 40, contract::call_code)
                .dynamic(gas_call_code)
                .memory(mem_call)
                .returns(),
        );
        t.set(RETURN, op(RETURN, gas::ZERO, control::ret).memory(mem_return).halts().returns());
        t.set(
            SELFDESTRUCT,
            op(SELFDESTRUCT, gas::ZERO, host::selfdestruct)
                .dynamic(gas_selfdestruct)
                .halts()
                .writes(),
        );

        t
    }

    /// EIP-7: DELEGATECALL.
    fn apply_homestead(&mut self) {
        use crate::opcode::*;
        self.set(
            DELEGATECALL,
            op(DELEGATECALL, 40, contract::delegate_call)
                .dynamic(gas_delegate_call)
                .memory(mem_delegate_call)
                .returns(),
        );
    }

    /// EIP-150: repricing of IO-heavy operations.
    fn apply_tangerine(&mut self) {
        use crate::opcode::*;
        self.reprice(BALANCE, 400);
        self.reprice(EXTCODESIZE, 700);
        self.reprice(EXTCODECOPY, 700);
        self.reprice(SLOAD, 200);
        self.reprice(CALL, 700);
        self.reprice(CALLCODE, 700);
        self.reprice(DELEGATECALL, 700);
        self.reprice(SELFDESTRUCT, 5000);
    }

    /// EIP-140 REVERT, EIP-211 RETURNDATA*, EIP-214 STATICCALL.
    fn apply_byzantium(&mut self) {
        use crate::opcode::*;
        self.set(
            REVERT,
            op(REVERT, gas::ZERO, control::revert)
                .memory(mem_return)
                .reverts()
                .returns(),
        );
        self.set(RETURNDATASIZE, op(RETURNDATASIZE, gas::BASE, system::returndatasize));
        self.set(
            RETURNDATACOPY,
            op(RETURNDATACOPY, gas::VERYLOW, system::returndatacopy)
                .dynamic(gas_returndatacopy)
                .memory(mem_returndatacopy),
        );
        self.set(
            STATICCALL,
            op(STATICCALL, 700, contract::static_call)
                .dynamic(gas_static_call)
                .memory(mem_delegate_call)
                .returns(),
        );
    }

    /// EIP-145 shifts, EIP-1014 CREATE2, EIP-1052 EXTCODEHASH.
    fn apply_constantinople(&mut self) {
        use crate::opcode::*;
        self.set(SHL, op(SHL, gas::VERYLOW, bitwise::shl));
        self.set(SHR, op(SHR, gas::VERYLOW, bitwise::shr));
        self.set(SAR, op(SAR, gas::VERYLOW, bitwise::sar));
        self.set(EXTCODEHASH, op(EXTCODEHASH, 400, host::extcodehash));
        self.set(
            CREATE2,
            op(CREATE2, gas::CREATE, contract::create::<true, H>)
                .dynamic(gas_create2)
                .memory(mem_create2)
                .writes()
                .returns(),
        );
    }

    /// EIP-1344 CHAINID, EIP-1884 repricings and SELFBALANCE.
    fn apply_istanbul(&mut self) {
        use crate::opcode::*;
        self.set(CHAINID, op(CHAINID, gas::BASE, host_env::chainid));
        self.set(SELFBALANCE, op(SELFBALANCE, gas::LOW, host::selfbalance));
        self.reprice(SLOAD, gas::ISTANBUL_SLOAD_GAS);
        self.reprice(BALANCE, 700);
        self.reprice(EXTCODEHASH, 700);
    }

    /// EIP-2929: warm base costs; the cold surcharges live in the
    /// dynamic-gas functions.
    fn apply_berlin(&mut self) {
        use crate::opcode::*;
        self.reprice(SLOAD, gas::ZERO);
        self.entry_mut(SLOAD).dynamic_gas = Some(gas_sload);
        for opcode in [BALANCE, EXTCODESIZE, EXTCODEHASH] {
            self.reprice(opcode, gas::WARM_STORAGE_READ_COST);
            self.entry_mut(opcode).dynamic_gas = Some(gas_account_access);
        }
        self.reprice(EXTCODECOPY, gas::WARM_STORAGE_READ_COST);
        for opcode in [CALL, CALLCODE, DELEGATECALL, STATICCALL] {
            self.reprice(opcode, gas::WARM_STORAGE_READ_COST);
        }
    }

    /// EIP-3198: BASEFEE.
    fn apply_london(&mut self) {
        use crate::opcode::*;
        self.set(BASEFEE, op(BASEFEE, gas::BASE, host_env::basefee));
    }

    /// Applies a single EIP on top of the table, geth style. Only EIPs
    /// that are pure instruction-set patches are supported.
    pub fn enable_eip(&mut self, eip: u64) -> Result<(), UnknownEip> {
        use crate::opcode::*;
        match eip {
            1344 => self.set(CHAINID, op(CHAINID, gas::BASE, host_env::chainid)),
            1884 => {
                self.set(SELFBALANCE, op(SELFBALANCE, gas::LOW, host::selfbalance));
                self.reprice(SLOAD, gas::ISTANBUL_SLOAD_GAS);
                self.reprice(BALANCE, 700);
                self.reprice(EXTCODEHASH, 700);
            }
            3198 => self.set(BASEFEE, op(BASEFEE, gas::BASE, host_env::basefee)),
            3855 => self.set(PUSH0, op(PUSH0, gas::BASE, stack::push0)),
            _ => return Err(UnknownEip(eip)),
        }
        Ok(())
    }
}

/// Returned by [`JumpTable::enable_eip`] for EIPs that are not
/// instruction-set patches.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct UnknownEip(pub u64);

impl core::fmt::Display for UnknownEip {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "eip {} is not a known instruction-set patch", self.0)
    }
}

impl std::error::Error for UnknownEip {}

// -- memory-size functions ----------------------------------------------

#[inline]
fn calc_mem_size(offset: U256, len: U256) -> Result<u64, InstructionResult> {
    if len.is_zero() {
        return Ok(0);
    }
    let offset = u64::try_from(offset).map_err(|_| InstructionResult::GasUintOverflow)?;
    let len = u64::try_from(len).map_err(|_| InstructionResult::GasUintOverflow)?;
    offset
        .checked_add(len)
        .ok_or(InstructionResult::GasUintOverflow)
}

fn mem_keccak256(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, stack.peek(1)?)
}

fn mem_mload(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, U256::from(32))
}

fn mem_mstore(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, U256::from(32))
}

fn mem_mstore8(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, U256::from(1))
}

fn mem_calldatacopy(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, stack.peek(2)?)
}

fn mem_codecopy(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, stack.peek(2)?)
}

fn mem_extcodecopy(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(1)?, stack.peek(3)?)
}

fn mem_returndatacopy(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, stack.peek(2)?)
}

fn mem_log(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, stack.peek(1)?)
}

fn mem_create(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(1)?, stack.peek(2)?)
}

fn mem_create2(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(1)?, stack.peek(2)?)
}

fn mem_call(stack: &Stack) -> Result<u64, InstructionResult> {
    let input = calc_mem_size(stack.peek(3)?, stack.peek(4)?)?;
    let output = calc_mem_size(stack.peek(5)?, stack.peek(6)?)?;
    Ok(max(input, output))
}

fn mem_delegate_call(stack: &Stack) -> Result<u64, InstructionResult> {
    let input = calc_mem_size(stack.peek(2)?, stack.peek(3)?)?;
    let output = calc_mem_size(stack.peek(4)?, stack.peek(5)?)?;
    Ok(max(input, output))
}

fn mem_return(stack: &Stack) -> Result<u64, InstructionResult> {
    calc_mem_size(stack.peek(0)?, stack.peek(1)?)
}

// -- dynamic-gas functions ----------------------------------------------

fn gas_exp<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Result<u64, InstructionResult> {
    let power = interpreter.stack.peek(1)?;
    calc::exp_cost(interpreter.spec_id, power).ok_or(InstructionResult::GasUintOverflow)
}

fn gas_keccak256<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Result<u64, InstructionResult> {
    let len = as_u64_saturated(interpreter.stack.peek(1)?);
    // the base 30 is the operation's constant gas
    calc::cost_per_word(len, gas::KECCAK256WORD).ok_or(InstructionResult::GasUintOverflow)
}

fn copy_words(len: U256) -> Result<u64, InstructionResult> {
    calc::cost_per_word(as_u64_saturated(len), gas::COPY)
        .ok_or(InstructionResult::GasUintOverflow)
}

fn gas_calldatacopy<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Result<u64, InstructionResult> {
    copy_words(interpreter.stack.peek(2)?)
}

fn gas_codecopy<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Result<u64, InstructionResult> {
    copy_words(interpreter.stack.peek(2)?)
}

fn gas_returndatacopy<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Result<u64, InstructionResult> {
    copy_words(interpreter.stack.peek(2)?)
}

fn gas_extcodecopy<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let address = as_address(interpreter.stack.peek(0)?);
    let words = copy_words(interpreter.stack.peek(3)?)?;
    let load = host.load_account(address);
    words
        .checked_add(calc::cold_account_extra(interpreter.spec_id, load.is_cold))
        .ok_or(InstructionResult::GasUintOverflow)
}

/// Berlin dynamic cost of BALANCE/EXTCODESIZE/EXTCODEHASH.
fn gas_account_access<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let address = as_address(interpreter.stack.peek(0)?);
    let load = host.load_account(address);
    Ok(calc::cold_account_extra(interpreter.spec_id, load.is_cold))
}

fn gas_log<const N: usize, H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Result<u64, InstructionResult> {
    let len = as_u64_saturated(interpreter.stack.peek(1)?);
    // LOG's base 375 is the constant gas; topics and data are dynamic
    gas::LOGDATA
        .checked_mul(len)
        .and_then(|data| data.checked_add(gas::LOGTOPIC * N as u64))
        .ok_or(InstructionResult::GasUintOverflow)
}

/// Berlin dynamic cost of SLOAD; warms the slot.
fn gas_sload<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let index = interpreter.stack.peek(0)?;
    let (_, is_cold) = host.sload(interpreter.contract.address, index);
    Ok(calc::sload_cost(interpreter.spec_id, is_cold))
}

/// SSTORE pricing. Reads the slot's current and original value, records
/// the refund delta, and enforces the EIP-2200 sentry.
fn gas_sstore<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let index = interpreter.stack.peek(0)?;
    let new = interpreter.stack.peek(1)?;
    let address = interpreter.contract.address;

    let (current, is_cold) = host.sload(address, index);
    let original = host.committed_state(address, index);
    let spec_id = interpreter.spec_id;

    let Some(cost) = calc::sstore_cost(
        spec_id,
        original,
        current,
        new,
        interpreter.gas.remaining(),
        is_cold,
    ) else {
        return Err(InstructionResult::OutOfGas);
    };
    interpreter
        .gas
        .record_refund(calc::sstore_refund(spec_id, original, current, new));
    Ok(cost)
}

fn load_call_target<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<crate::AccountLoad, InstructionResult> {
    let to = as_address(interpreter.stack.peek(1)?);
    Ok(host.load_account(to))
}

fn gas_call<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let load = load_call_target(interpreter, host)?;
    let transfers_value = !interpreter.stack.peek(2)?.is_zero();
    Ok(calc::call_extra_cost(
        interpreter.spec_id,
        transfers_value,
        load.is_cold,
        load.is_dead(),
        true,
    ))
}

fn gas_call_code<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let load = load_call_target(interpreter, host)?;
    let transfers_value = !interpreter.stack.peek(2)?.is_zero();
    // CALLCODE pays the transfer surcharge but never creates accounts
    Ok(calc::call_extra_cost(
        interpreter.spec_id,
        transfers_value,
        load.is_cold,
        false,
        false,
    ))
}

fn gas_delegate_call<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let load = load_call_target(interpreter, host)?;
    Ok(calc::cold_account_extra(interpreter.spec_id, load.is_cold))
}

fn gas_static_call<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let load = load_call_target(interpreter, host)?;
    Ok(calc::cold_account_extra(interpreter.spec_id, load.is_cold))
}

fn gas_create2<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    _host: &mut H,
) -> Result<u64, InstructionResult> {
    let len = as_u64_saturated(interpreter.stack.peek(2)?);
    calc::cost_per_word(len, gas::KECCAK256WORD).ok_or(InstructionResult::GasUintOverflow)
}

fn gas_selfdestruct<H: Host + ?Sized>(
    interpreter: &mut Interpreter,
    host: &mut H,
) -> Result<u64, InstructionResult> {
    let target = as_address(interpreter.stack.peek(0)?);
    let load = host.load_account(target);
    let had_value = !host.balance(interpreter.contract.address).is_zero();
    let target_is_dead = if interpreter.spec_id.is_enabled_in(SpecId::SpuriousDragon) {
        load.is_empty
    } else {
        !load.exists
    };
    Ok(calc::selfdestruct_cost(
        interpreter.spec_id,
        had_value,
        target_is_dead,
        load.is_cold,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DummyHost;
    use crate::opcode::{BASEFEE, CHAINID, CREATE2, DELEGATECALL, PUSH0, REVERT, SHL, STATICCALL};

    fn assert_defined(table: &JumpTable<DummyHost>, opcode: u8, defined: bool) {
        assert_eq!(table.get(opcode).is_some(), defined, "opcode {opcode:#04x}");
    }

    #[test]
    fn fork_availability() {
        let frontier = JumpTable::<DummyHost>::new(SpecId::Frontier);
        assert_defined(&frontier, DELEGATECALL, false);
        assert_defined(&frontier, REVERT, false);
        assert_defined(&frontier, SHL, false);

        let homestead = JumpTable::<DummyHost>::new(SpecId::Homestead);
        assert_defined(&homestead, DELEGATECALL, true);
        assert_defined(&homestead, STATICCALL, false);

        let byzantium = JumpTable::<DummyHost>::new(SpecId::Byzantium);
        assert_defined(&byzantium, REVERT, true);
        assert_defined(&byzantium, STATICCALL, true);
        assert_defined(&byzantium, CREATE2, false);

        let istanbul = JumpTable::<DummyHost>::new(SpecId::Istanbul);
        assert_defined(&istanbul, CREATE2, true);
        assert_defined(&istanbul, CHAINID, true);
        assert_defined(&istanbul, BASEFEE, false);

        let london = JumpTable::<DummyHost>::new(SpecId::London);
        assert_defined(&london, BASEFEE, true);
        assert_defined(&london, PUSH0, false);
    }

    #[test]
    fn repricing_ladder() {
        use crate::opcode::SLOAD;
        assert_eq!(JumpTable::<DummyHost>::new(SpecId::Frontier).get(SLOAD).unwrap().constant_gas, 50);
        assert_eq!(JumpTable::<DummyHost>::new(SpecId::Tangerine).get(SLOAD).unwrap().constant_gas, 200);
        assert_eq!(JumpTable::<DummyHost>::new(SpecId::Istanbul).get(SLOAD).unwrap().constant_gas, 800);
        let berlin = JumpTable::<DummyHost>::new(SpecId::Berlin);
        assert_eq!(berlin.get(SLOAD).unwrap().constant_gas, 0);
        assert!(berlin.get(SLOAD).unwrap().dynamic_gas.is_some());
    }

    #[test]
    fn stack_bounds_follow_arity() {
        use crate::opcode::{ADD, DUP16, PUSH1};
        let table = JumpTable::<DummyHost>::new(SpecId::London);
        let add = table.get(ADD).unwrap();
        assert_eq!(add.min_stack, 2);
        assert_eq!(add.max_stack, STACK_LIMIT + 1);
        let push = table.get(PUSH1).unwrap();
        assert_eq!(push.min_stack, 0);
        assert_eq!(push.max_stack, STACK_LIMIT - 1);
        let dup = table.get(DUP16).unwrap();
        assert_eq!(dup.min_stack, 16);
        assert_eq!(dup.max_stack, STACK_LIMIT - 1);
    }

    #[test]
    fn extra_eips() {
        let mut table = JumpTable::<DummyHost>::new(SpecId::London);
        assert!(table.get(PUSH0).is_none());
        table.enable_eip(3855).unwrap();
        assert!(table.get(PUSH0).is_some());
        assert_eq!(table.enable_eip(2929), Err(UnknownEip(2929)));

        let istanbulish =
            JumpTable::<DummyHost>::new_with_eips(SpecId::Petersburg, &[1344, 1884]).unwrap();
        assert!(istanbulish.get(CHAINID).is_some());
        assert_eq!(istanbulish.get(crate::opcode::SLOAD).unwrap().constant_gas, 800);
    }
}
