//! Opcode handler implementations.
//!
//! Handlers hold pure semantics: stack validation, gas (constant,
//! dynamic and memory expansion) and the memory resize all happen in the
//! dispatch layer before a handler runs. A handler returns the bytes the
//! operation surfaces (RETURN/REVERT payloads, inner-call output) or an
//! error status.

pub mod arithmetic;
pub mod bitwise;
pub mod contract;
pub mod control;
pub mod host;
pub mod host_env;
pub mod i256;
pub mod memory;
pub mod stack;
pub mod system;
pub mod utility;

use crate::InstructionResult;
use alloy_primitives::Bytes;

/// Outcome of a single opcode handler.
pub type Control = Result<Option<Bytes>, InstructionResult>;
