//! The account-state boundary of the VM.

mod in_memory;

pub use in_memory::{DbAccount, InMemoryDB, StorageSlot};

use alloy_primitives::{Address, Bytes, B256, U256};
use zevm_interpreter::Log;

/// Abstract account/storage store the orchestrator executes against.
///
/// The store is transactional: [`StateDB::snapshot`] marks a point in
/// its undo log and [`StateDB::revert_to_snapshot`] restores every
/// account field — balance, nonce, code, storage, suicide flags, logs,
/// access list — to that point. Snapshots form a stack; reverting to an
/// id discards every later one.
pub trait StateDB {
    /// Whether the account exists in state.
    fn exist(&self, address: Address) -> bool;

    /// Whether the account is missing or empty per EIP-161 (zero
    /// balance, zero nonce, no code).
    fn empty(&self, address: Address) -> bool;

    fn balance(&self, address: Address) -> U256;
    fn add_balance(&mut self, address: Address, amount: U256);
    fn sub_balance(&mut self, address: Address, amount: U256);
    fn set_balance(&mut self, address: Address, balance: U256);

    fn nonce(&self, address: Address) -> u64;
    fn set_nonce(&mut self, address: Address, nonce: u64);

    fn code(&self, address: Address) -> Bytes;
    /// Hash of the account's code; zero for accounts that do not exist.
    fn code_hash(&self, address: Address) -> B256;
    fn code_size(&self, address: Address) -> usize;
    fn set_code(&mut self, address: Address, code: Bytes);

    /// Current value of a storage slot.
    fn state(&self, address: Address, key: U256) -> U256;
    /// Value of the slot as of the start of the transaction.
    fn committed_state(&self, address: Address, key: U256) -> U256;
    fn set_state(&mut self, address: Address, key: U256, value: U256);

    /// Creates a fresh account, carrying over any balance already sent
    /// to the address.
    fn create_account(&mut self, address: Address);

    /// Marks the account for deletion at the end of the transaction and
    /// zeroes its balance. Returns whether the account existed.
    fn suicide(&mut self, address: Address) -> bool;
    fn has_suicided(&self, address: Address) -> bool;

    fn add_log(&mut self, log: Log);
    fn add_preimage(&mut self, hash: B256, preimage: Bytes);

    fn snapshot(&mut self) -> usize;
    fn revert_to_snapshot(&mut self, id: usize);

    // EIP-2929 access list.
    fn address_in_access_list(&self, address: Address) -> bool;
    /// Returns `(address_present, slot_present)`.
    fn slot_in_access_list(&self, address: Address, key: U256) -> (bool, bool);
    fn add_address_to_access_list(&mut self, address: Address);
    fn add_slot_to_access_list(&mut self, address: Address, key: U256);

    /// Hash oracle for the 256 most recent ancestor blocks.
    fn block_hash(&self, number: u64) -> B256;
}
