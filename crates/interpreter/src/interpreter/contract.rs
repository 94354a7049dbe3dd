use super::analysis::JumpMap;
use crate::{CallContext, CallScheme};
use alloy_primitives::{b256, keccak256, Address, Bytes, B256, U256};

/// Per-frame contract context. Immutable for the lifetime of the frame;
/// the jump map is computed once at construction.
#[derive(Clone, Debug, Default)]
pub struct Contract {
    /// Input calldata.
    pub input: Bytes,
    /// Code executed by this frame.
    pub code: Bytes,
    /// Hash of `code`.
    pub code_hash: B256,
    /// Address whose storage and balance this frame operates on.
    pub address: Address,
    /// Address the code was loaded from. Differs from `address` under
    /// CALLCODE and DELEGATECALL.
    pub code_address: Address,
    /// Caller of this frame.
    pub caller: Address,
    /// Value apparent to the frame (not necessarily transferred, see
    /// DELEGATECALL).
    pub value: U256,
    /// Valid jump destinations of `code`.
    jumpdests: JumpMap,
}

impl Contract {
    pub fn new(
        input: Bytes,
        code: Bytes,
        code_hash: Option<B256>,
        address: Address,
        caller: Address,
        value: U256,
    ) -> Self {
        let code_hash = code_hash.unwrap_or_else(|| keccak256(&code));
        let jumpdests = JumpMap::analyze(&code);
        Self {
            input,
            code,
            code_hash,
            address,
            code_address: address,
            caller,
            value,
            jumpdests,
        }
    }

    /// Builds a frame context for a call, honoring the scheme's
    /// storage-context and value semantics.
    pub fn new_with_context(
        input: Bytes,
        code: Bytes,
        code_hash: Option<B256>,
        context: &CallContext,
    ) -> Self {
        let mut contract = Self::new(
            input,
            code,
            code_hash,
            context.address,
            context.caller,
            context.apparent_value,
        );
        if matches!(context.scheme, CallScheme::CallCode | CallScheme::DelegateCall) {
            contract.code_address = context.code_address;
        }
        contract
    }

    /// Returns `true` if `pc` is a valid jump destination.
    #[inline]
    pub fn is_valid_jump(&self, pc: usize) -> bool {
        self.jumpdests.is_valid(pc)
    }

    /// Returns `true` if the frame runs no code.
    #[inline]
    pub fn is_empty_code(&self) -> bool {
        self.code.is_empty()
    }
}

/// Keccak-256 of the empty byte string, the code hash of accounts
/// without code.
pub const KECCAK_EMPTY: B256 =
    b256!("c5d2460186f7233c927e7db2dcc703c0e500b653ca82273b7bfad8045d85a470");
