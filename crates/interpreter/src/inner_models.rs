use crate::{Gas, InterpreterResult};
use alloy_primitives::{Address, Bytes, B256, U256};

/// Inputs for a call re-entering the orchestrator.
#[derive(Clone, Debug)]
pub struct CallInputs {
    /// The account whose code will run.
    pub code_address: Address,
    /// The value moved by this call, if any.
    pub transfer: Transfer,
    /// Calldata of the frame.
    pub input: Bytes,
    /// Gas forwarded to the frame (stipend included).
    pub gas_limit: u64,
    /// Frame context: storage target, caller, apparent value, scheme.
    pub context: CallContext,
    /// Whether this frame (and everything below it) is read only.
    pub is_static: bool,
}

/// Context of a call frame.
#[derive(Clone, Debug, Default)]
pub struct CallContext {
    /// The account whose storage and balance the frame operates on.
    pub address: Address,
    /// Caller visible to the frame.
    pub caller: Address,
    /// Where the executed code lives.
    pub code_address: Address,
    /// Value visible to the frame via CALLVALUE.
    pub apparent_value: U256,
    pub scheme: CallScheme,
}

/// Which call-family opcode produced a frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallScheme {
    #[default]
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

/// A balance movement.
#[derive(Clone, Debug, Default)]
pub struct Transfer {
    pub source: Address,
    pub target: Address,
    pub value: U256,
}

/// Inputs for a create re-entering the orchestrator.
#[derive(Clone, Debug)]
pub struct CreateInputs {
    pub caller: Address,
    pub scheme: CreateScheme,
    pub value: U256,
    pub init_code: Bytes,
    pub gas_limit: u64,
}

/// Address derivation scheme of a create.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreateScheme {
    /// `keccak256(rlp([caller, nonce]))`
    Create,
    /// `keccak256(0xff ++ caller ++ salt ++ keccak256(init_code))`
    Create2 { salt: U256 },
}

/// Result of a create frame, as observed by the calling frame.
#[derive(Clone, Debug)]
pub struct CreateOutcome {
    pub result: InterpreterResult,
    /// Address of the created contract, when derivation got that far.
    pub address: Option<Address>,
}

impl CreateOutcome {
    pub fn new(result: InterpreterResult, address: Option<Address>) -> Self {
        Self { result, address }
    }

    #[inline]
    pub fn output(&self) -> &Bytes {
        &self.result.output
    }

    #[inline]
    pub fn gas(&self) -> Gas {
        self.result.gas
    }
}

/// Account presence info needed for gas metering of account-touching
/// opcodes.
#[derive(Clone, Copy, Debug, Default)]
pub struct AccountLoad {
    /// Cold under EIP-2929 access-list rules.
    pub is_cold: bool,
    pub exists: bool,
    /// Empty per EIP-161 (zero balance, zero nonce, no code).
    pub is_empty: bool,
}

impl AccountLoad {
    /// Dead accounts are charged the new-account cost on value transfer.
    #[inline]
    pub fn is_dead(&self) -> bool {
        !self.exists || self.is_empty
    }
}

/// Result of a SELFDESTRUCT registration.
#[derive(Clone, Copy, Debug, Default)]
pub struct SelfDestructResult {
    pub had_value: bool,
    pub target_exists: bool,
    pub target_is_empty: bool,
    pub is_cold: bool,
    pub previously_destroyed: bool,
}

/// A log emitted by LOG0..LOG4.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Log {
    pub address: Address,
    pub topics: Vec<B256>,
    pub data: Bytes,
}
