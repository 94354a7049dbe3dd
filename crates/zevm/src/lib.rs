//! # zevm
//!
//! An Ethereum virtual machine. The [`Evm`] orchestrator builds frames
//! for calls and creates, runs them through the `zevm-interpreter`
//! dispatch loop, and stages every state change against snapshots of a
//! pluggable [`StateDB`].

pub mod db;
mod evm;
pub mod precompile;

pub use db::{DbAccount, InMemoryDB, StateDB};
pub use evm::Evm;
pub use precompile::{Precompile, PrecompileError, PrecompileOutput, Precompiles};

// The interpreter layer is part of the public API surface.
pub use zevm_interpreter as interpreter;
pub use zevm_interpreter::{
    BlockEnv, CfgEnv, CreateOutcome, Env, Gas, InstructionResult, InterpreterResult, Log, SpecId,
    TxEnv, CALL_STACK_LIMIT, MAX_CODE_SIZE,
};

pub use alloy_primitives as primitives;
