use crate::{
    AccountLoad, CallInputs, CreateInputs, CreateOutcome, Env, Gas, InstructionResult,
    InterpreterResult, Log, SelfDestructResult,
};
use alloy_primitives::{Address, Bytes, B256, U256};
use std::collections::HashMap;

/// The interpreter's window onto the world: account state, block
/// context, and re-entry into the call/create orchestrator.
///
/// Gas for every method is charged by the dispatch layer before the
/// opcode handler runs; implementations only answer.
pub trait Host {
    /// Execution environment (configuration, block, transaction).
    fn env(&self) -> &Env;

    /// Loads presence info of an account and warms it under EIP-2929.
    fn load_account(&mut self, address: Address) -> AccountLoad;

    /// Hash of one of the 256 most recent blocks; the range check is the
    /// BLOCKHASH handler's job.
    fn block_hash(&mut self, number: u64) -> B256;

    /// Balance of the account.
    fn balance(&mut self, address: Address) -> U256;

    /// Code of the account, empty when absent.
    fn code(&mut self, address: Address) -> Bytes;

    /// Code hash of the account; zero for accounts that are dead per
    /// EIP-161.
    fn code_hash(&mut self, address: Address) -> B256;

    /// Code size of the account.
    fn code_size(&mut self, address: Address) -> usize;

    /// Storage value at `index` and whether the slot was cold. Warms the
    /// slot.
    fn sload(&mut self, address: Address, index: U256) -> (U256, bool);

    /// Storage value at `index` as of the start of the transaction.
    fn committed_state(&mut self, address: Address, index: U256) -> U256;

    /// Sets the storage value at `index`.
    fn sstore(&mut self, address: Address, index: U256, value: U256);

    /// Emits a log.
    fn log(&mut self, log: Log);

    /// Registers `address` for destruction, moving its balance to
    /// `target`.
    fn selfdestruct(&mut self, address: Address, target: Address) -> SelfDestructResult;

    /// Records a hash preimage. Only called when preimage recording is
    /// enabled in the configuration.
    fn add_preimage(&mut self, hash: B256, preimage: &[u8]);

    /// Runs a nested call frame to completion.
    fn call(&mut self, inputs: CallInputs) -> InterpreterResult;

    /// Runs a nested create frame to completion.
    fn create(&mut self, inputs: CreateInputs) -> CreateOutcome;
}

/// A no-state [`Host`] for unit-testing handlers in isolation. Storage
/// is a flat map; nested frames succeed immediately without executing.
#[derive(Clone, Debug, Default)]
pub struct DummyHost {
    pub env: Env,
    pub storage: HashMap<(Address, U256), U256>,
    pub committed: HashMap<(Address, U256), U256>,
    pub logs: Vec<Log>,
}

impl DummyHost {
    pub fn new(env: Env) -> Self {
        Self {
            env,
            ..Default::default()
        }
    }

    /// Clears the storage and logs between test cases.
    pub fn clear(&mut self) {
        self.storage.clear();
        self.committed.clear();
        self.logs.clear();
    }
}

impl Host for DummyHost {
    fn env(&self) -> &Env {
        &self.env
    }

    fn load_account(&mut self, _address: Address) -> AccountLoad {
        AccountLoad {
            is_cold: false,
            exists: true,
            is_empty: false,
        }
    }

    fn block_hash(&mut self, number: u64) -> B256 {
        B256::with_last_byte(number as u8)
    }

    fn balance(&mut self, _address: Address) -> U256 {
        U256::ZERO
    }

    fn code(&mut self, _address: Address) -> Bytes {
        Bytes::new()
    }

    fn code_hash(&mut self, _address: Address) -> B256 {
        crate::interpreter::KECCAK_EMPTY
    }

    fn code_size(&mut self, _address: Address) -> usize {
        0
    }

    fn sload(&mut self, address: Address, index: U256) -> (U256, bool) {
        let value = self.storage.get(&(address, index)).copied();
        (value.unwrap_or_default(), value.is_none())
    }

    fn committed_state(&mut self, address: Address, index: U256) -> U256 {
        self.committed.get(&(address, index)).copied().unwrap_or_default()
    }

    fn sstore(&mut self, address: Address, index: U256, value: U256) {
        self.storage.insert((address, index), value);
    }

    fn log(&mut self, log: Log) {
        self.logs.push(log);
    }

    fn selfdestruct(&mut self, _address: Address, _target: Address) -> SelfDestructResult {
        SelfDestructResult::default()
    }

    fn add_preimage(&mut self, _hash: B256, _preimage: &[u8]) {}

    fn call(&mut self, inputs: CallInputs) -> InterpreterResult {
        InterpreterResult::new(InstructionResult::Stop, Bytes::new(), Gas::new(inputs.gas_limit))
    }

    fn create(&mut self, inputs: CreateInputs) -> CreateOutcome {
        CreateOutcome::new(
            InterpreterResult::new(
                InstructionResult::Stop,
                Bytes::new(),
                Gas::new(inputs.gas_limit),
            ),
            Some(Address::ZERO),
        )
    }
}
