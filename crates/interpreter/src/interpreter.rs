mod analysis;
mod contract;
mod memory;
mod stack;

pub use analysis::JumpMap;
pub use contract::{Contract, KECCAK_EMPTY};
pub use memory::{next_multiple_of_32, num_words, Memory};
pub use stack::{Stack, STACK_LIMIT};

use crate::{
    gas,
    table::{JumpTable, Operation},
    Gas, Host, InstructionResult, SpecId,
};
use alloy_primitives::Bytes;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single execution frame: bytecode plus the stack, memory and gas it
/// drives. Created by the orchestrator for every call/create and
/// discarded when the frame returns.
#[derive(Debug, Default)]
pub struct Interpreter {
    /// Contract context of the frame.
    pub contract: Contract,
    /// The gas state.
    pub gas: Gas,
    pub stack: Stack,
    pub memory: Memory,
    /// Byte offset into `contract.code` of the next instruction.
    pub pc: usize,
    /// Output of the most recent inner call; overwritten by every
    /// CALL-family opcode.
    pub return_data: Bytes,
    /// Set by STATICCALL; any state-mutating opcode traps.
    pub is_static: bool,
    /// Active hard fork.
    pub spec_id: SpecId,
    /// Externally settable abort flag, polled at the top of the loop.
    pub(crate) abort: Arc<AtomicBool>,
}

impl Interpreter {
    pub fn new(
        contract: Contract,
        gas_limit: u64,
        is_static: bool,
        spec_id: SpecId,
        abort: Arc<AtomicBool>,
    ) -> Self {
        Self {
            contract,
            gas: Gas::new(gas_limit),
            stack: Stack::new(),
            memory: Memory::new(),
            pc: 0,
            return_data: Bytes::new(),
            is_static,
            spec_id,
            abort,
        }
    }

    /// Executes the frame to completion against the given operation
    /// table and host.
    pub fn run<H: Host + ?Sized>(&mut self, table: &JumpTable<H>, host: &mut H) -> InterpreterResult {
        loop {
            if self.abort.load(Ordering::Acquire) {
                return self.halt(InstructionResult::Aborted);
            }

            // Running off the end of the code is an implicit STOP.
            let Some(&op) = self.contract.code.get(self.pc) else {
                return self.halt(InstructionResult::Stop);
            };
            let Some(operation) = table.get(op) else {
                return self.halt(InstructionResult::InvalidOpcode);
            };

            if let Err(result) = self.step(operation, host) {
                return self.halt(result);
            }

            let output = match (operation.execute)(self, host) {
                Ok(output) => output,
                Err(result) => return self.halt(result),
            };

            if operation.returns {
                self.return_data = output.clone().unwrap_or_default();
            }
            if operation.reverts {
                return InterpreterResult::new(
                    InstructionResult::Revert,
                    output.unwrap_or_default(),
                    self.gas,
                );
            }
            if operation.halts {
                let result = if operation.returns {
                    InstructionResult::Return
                } else {
                    InstructionResult::Stop
                };
                return InterpreterResult::new(result, output.unwrap_or_default(), self.gas);
            }
            if !operation.jumps {
                self.pc += 1;
            }
        }
    }

    /// Pre-execution validation and gas charge for one operation: stack
    /// bounds, write protection, constant + dynamic + memory expansion
    /// gas, and the memory resize itself.
    fn step<H: Host + ?Sized>(
        &mut self,
        operation: &Operation<H>,
        host: &mut H,
    ) -> Result<(), InstructionResult> {
        let len = self.stack.len();
        if len < operation.min_stack {
            return Err(InstructionResult::StackUnderflow);
        }
        if len > operation.max_stack {
            return Err(InstructionResult::StackOverflow);
        }
        if self.is_static && operation.writes {
            return Err(InstructionResult::WriteProtection);
        }

        let mut cost = operation.constant_gas;

        // Memory expansion is charged as the difference between the new
        // and current quadratic cost.
        let mut new_mem_len: usize = 0;
        if let Some(memory_size) = operation.memory_size {
            let size = memory_size(&self.stack)?;
            if size > 0 {
                let words = num_words(size);
                let new_len = words
                    .checked_mul(32)
                    .ok_or(InstructionResult::GasUintOverflow)?;
                if new_len > self.memory.len() as u64 {
                    let current_words = num_words(self.memory.len() as u64);
                    let expansion = gas::memory_gas(words) - gas::memory_gas(current_words);
                    cost = cost
                        .checked_add(expansion)
                        .ok_or(InstructionResult::GasUintOverflow)?;
                    new_mem_len = new_len as usize;
                }
            }
        }

        if let Some(dynamic_gas) = operation.dynamic_gas {
            let dynamic = dynamic_gas(self, host)?;
            cost = cost
                .checked_add(dynamic)
                .ok_or(InstructionResult::GasUintOverflow)?;
        }

        if !self.gas.record_cost(cost) {
            return Err(InstructionResult::OutOfGas);
        }
        if new_mem_len > 0 {
            self.memory.resize(new_mem_len);
        }
        Ok(())
    }

    #[inline]
    fn halt(&self, result: InstructionResult) -> InterpreterResult {
        InterpreterResult::new(result, Bytes::new(), self.gas)
    }
}

/// The result of an interpreter frame.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterpreterResult {
    /// The halt reason.
    pub result: InstructionResult,
    /// The output of the frame.
    pub output: Bytes,
    /// The gas state after execution.
    pub gas: Gas,
}

impl InterpreterResult {
    pub fn new(result: InstructionResult, output: Bytes, gas: Gas) -> Self {
        Self {
            result,
            output,
            gas,
        }
    }

    /// Returns whether the frame halted cleanly.
    #[inline]
    pub const fn is_ok(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns whether the frame belongs to the revert class.
    #[inline]
    pub const fn is_revert(&self) -> bool {
        self.result.is_revert()
    }

    /// Returns whether the frame failed with a gas-consuming error.
    #[inline]
    pub const fn is_error(&self) -> bool {
        self.result.is_error()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DummyHost, JumpTable};
    use alloy_primitives::{Address, U256};

    fn run_code(code: &[u8], gas_limit: u64) -> (InterpreterResult, Interpreter) {
        let contract = Contract::new(
            Bytes::new(),
            Bytes::copy_from_slice(code),
            None,
            Address::ZERO,
            Address::ZERO,
            U256::ZERO,
        );
        let mut interpreter = Interpreter::new(
            contract,
            gas_limit,
            false,
            SpecId::London,
            Arc::new(AtomicBool::new(false)),
        );
        let mut host = DummyHost::default();
        let table = JumpTable::new(SpecId::London);
        let result = interpreter.run(&table, &mut host);
        (result, interpreter)
    }

    #[test]
    fn implicit_stop_past_code_end() {
        // PUSH1 1
        let (result, interpreter) = run_code(&[0x60, 0x01], 100);
        assert_eq!(result.result, InstructionResult::Stop);
        assert_eq!(interpreter.stack.data(), &vec![U256::from(1)]);
        assert_eq!(result.gas.spent(), 3);
    }

    #[test]
    fn stack_underflow_checked_by_dispatch() {
        // ADD on an empty stack
        let (result, _) = run_code(&[0x01], 100);
        assert_eq!(result.result, InstructionResult::StackUnderflow);
    }

    #[test]
    fn undefined_opcode() {
        let (result, _) = run_code(&[0x0C], 100);
        assert_eq!(result.result, InstructionResult::InvalidOpcode);
        let (result, _) = run_code(&[0xFE], 100);
        assert_eq!(result.result, InstructionResult::InvalidOpcode);
    }

    #[test]
    fn out_of_gas_charges_nothing_more() {
        // PUSH1 0 MLOAD with too little gas for the expansion
        let (result, _) = run_code(&[0x60, 0x00, 0x51], 5);
        assert_eq!(result.result, InstructionResult::OutOfGas);
    }

    #[test]
    fn memory_grows_in_words() {
        // PUSH1 1 PUSH1 33 MSTORE8: one byte at offset 33 extends to 64
        let (result, interpreter) = run_code(&[0x60, 0x01, 0x60, 0x21, 0x53], 100);
        assert_eq!(result.result, InstructionResult::Stop);
        assert_eq!(interpreter.memory.len(), 64);
        // 3 + 3 + 3 constant, 6 for two words of expansion
        assert_eq!(result.gas.spent(), 15);
    }

    #[test]
    fn abort_flag_stops_the_loop() {
        let abort = Arc::new(AtomicBool::new(false));
        // JUMPDEST PUSH1 0 JUMP: infinite loop
        let contract = Contract::new(
            Bytes::new(),
            Bytes::from_static(&[0x5B, 0x60, 0x00, 0x56]),
            None,
            Address::ZERO,
            Address::ZERO,
            U256::ZERO,
        );
        let mut interpreter = Interpreter::new(
            contract,
            u64::MAX,
            false,
            SpecId::London,
            Arc::clone(&abort),
        );
        abort.store(true, Ordering::Release);
        let mut host = DummyHost::default();
        let table = JumpTable::new(SpecId::London);
        let result = interpreter.run(&table, &mut host);
        assert_eq!(result.result, InstructionResult::Aborted);
    }
}
