//! Gas cost constants. Names follow the yellow paper tiers and the EIPs
//! that introduced them.

pub const ZERO: u64 = 0;
pub const BASE: u64 = 2;
pub const VERYLOW: u64 = 3;
pub const LOW: u64 = 5;
pub const MID: u64 = 8;
pub const HIGH: u64 = 10;
pub const JUMPDEST: u64 = 1;

pub const CREATE: u64 = 32000;
pub const CALLVALUE: u64 = 9000;
pub const CALL_STIPEND: u64 = 2300;
pub const NEWACCOUNT: u64 = 25000;
pub const SELFDESTRUCT_REFUND: i64 = 24000;

pub const EXP: u64 = 10;
/// Per exponent byte, until EIP-160 raised it.
pub const EXP_BYTE: u64 = 10;
/// EIP-160: EXP cost increase.
pub const EXP_BYTE_EIP160: u64 = 50;

pub const MEMORY: u64 = 3;
pub const QUAD_COEFF_DIV: u64 = 512;
pub const COPY: u64 = 3;

pub const KECCAK256: u64 = 30;
pub const KECCAK256WORD: u64 = 6;

pub const LOG: u64 = 375;
pub const LOGDATA: u64 = 8;
pub const LOGTOPIC: u64 = 375;

pub const BLOCKHASH: u64 = 20;
pub const CODEDEPOSIT: u64 = 200;

pub const SSTORE_SET: u64 = 20000;
pub const SSTORE_RESET: u64 = 5000;
pub const REFUND_SSTORE_CLEARS: i64 = 15000;
/// EIP-1884: Repricing for trie-size-dependent opcodes.
pub const ISTANBUL_SLOAD_GAS: u64 = 800;

// Berlin, EIP-2929.
pub const ACCESS_LIST_ADDRESS: u64 = 2400;
pub const ACCESS_LIST_STORAGE_KEY: u64 = 1900;
pub const COLD_SLOAD_COST: u64 = 2100;
pub const COLD_ACCOUNT_ACCESS_COST: u64 = 2600;
pub const WARM_STORAGE_READ_COST: u64 = 100;
pub const WARM_SSTORE_RESET: u64 = SSTORE_RESET - COLD_SLOAD_COST;
