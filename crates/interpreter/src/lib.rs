//! # zevm-interpreter
//!
//! Bytecode interpreter for the zevm virtual machine: the 256-bit stack,
//! the word-granular expanding memory, per-fork operation tables and the
//! dispatch loop that drives them. State access and call/create
//! re-entry go through the [`Host`] trait, implemented by the
//! orchestrator in the `zevm` crate.

pub mod disasm;
mod env;
pub mod gas;
mod host;
mod inner_models;
mod instruction_result;
pub mod instructions;
pub mod interpreter;
pub mod opcode;
mod spec_id;
pub mod table;

pub use disasm::{Disasm, InsnView};
pub use env::{BlockEnv, CfgEnv, Env, TxEnv};
pub use gas::Gas;
pub use host::{DummyHost, Host};
pub use inner_models::{
    AccountLoad, CallContext, CallInputs, CallScheme, CreateInputs, CreateOutcome, CreateScheme,
    Log, SelfDestructResult, Transfer,
};
pub use instruction_result::InstructionResult;
pub use interpreter::{
    num_words, Contract, Interpreter, InterpreterResult, JumpMap, Memory, Stack, STACK_LIMIT,
};
pub use opcode::OpCode;
pub use spec_id::{SpecId, UnknownSpec};
pub use table::{JumpTable, Operation, UnknownEip};

/// EVM call stack depth limit.
pub const CALL_STACK_LIMIT: u64 = 1024;

/// EIP-170: Contract code size limit of `0x6000` (~24kb).
pub const MAX_CODE_SIZE: usize = 0x6000;
