use crate::SpecId;
use alloy_primitives::{Address, U256};

/// The whole execution environment: configuration, block and
/// transaction context.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Env {
    pub cfg: CfgEnv,
    pub block: BlockEnv,
    pub tx: TxEnv,
}

/// VM configuration.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CfgEnv {
    pub chain_id: u64,
    /// Active hard fork.
    pub spec_id: SpecId,
    /// EIPs enabled on top of the hard fork's instruction set.
    pub extra_eips: Vec<u64>,
    /// Disables execution of nested calls and creates; they return
    /// success without running. Tracing aid.
    pub no_recursion: bool,
    /// Records SHA3/KECCAK256 preimages into the state store.
    pub enable_preimage_recording: bool,
}

impl Default for CfgEnv {
    fn default() -> Self {
        Self {
            chain_id: 1,
            spec_id: SpecId::default(),
            extra_eips: Vec::new(),
            no_recursion: false,
            enable_preimage_recording: false,
        }
    }
}

/// Read-only block context.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BlockEnv {
    pub coinbase: Address,
    pub number: U256,
    pub timestamp: U256,
    pub gas_limit: U256,
    pub difficulty: U256,
    /// EIP-1559 base fee, zero before London.
    pub basefee: U256,
}

/// Read-only transaction context for ORIGIN and GASPRICE.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TxEnv {
    pub origin: Address,
    pub gas_price: U256,
}
