use super::StateDB;
use alloy_primitives::{keccak256, Address, Bytes, B256, U256};
use hashbrown::{HashMap, HashSet};
use zevm_interpreter::interpreter::KECCAK_EMPTY;
use zevm_interpreter::Log;

/// A storage slot: the value as of the start of the transaction and the
/// current one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct StorageSlot {
    pub original: U256,
    pub present: U256,
}

impl StorageSlot {
    pub fn new(value: U256) -> Self {
        Self {
            original: value,
            present: value,
        }
    }
}

/// An account held by [`InMemoryDB`].
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DbAccount {
    pub balance: U256,
    pub nonce: u64,
    pub code: Bytes,
    pub code_hash: B256,
    pub storage: HashMap<U256, StorageSlot>,
    pub suicided: bool,
}

impl Default for DbAccount {
    fn default() -> Self {
        Self {
            balance: U256::ZERO,
            nonce: 0,
            code: Bytes::new(),
            code_hash: KECCAK_EMPTY,
            storage: HashMap::new(),
            suicided: false,
        }
    }
}

impl DbAccount {
    /// An account holding only a balance.
    pub fn with_balance(balance: U256) -> Self {
        Self {
            balance,
            ..Default::default()
        }
    }

    /// A contract account; the code hash is derived.
    pub fn with_code(code: Bytes) -> Self {
        let code_hash = keccak256(&code);
        Self {
            code,
            code_hash,
            ..Default::default()
        }
    }

    /// Empty per EIP-161.
    pub fn is_empty(&self) -> bool {
        self.balance.is_zero() && self.nonce == 0 && self.code.is_empty()
    }
}

/// One reversible state change. The journal is an undo log: reverting a
/// snapshot pops entries and applies them backwards.
#[derive(Clone, Debug)]
enum JournalEntry {
    AccountCreated {
        address: Address,
        prev: Option<Box<DbAccount>>,
    },
    BalanceChange {
        address: Address,
        prev: U256,
    },
    NonceChange {
        address: Address,
        prev: u64,
    },
    CodeChange {
        address: Address,
        prev_code: Bytes,
        prev_hash: B256,
    },
    StorageChange {
        address: Address,
        key: U256,
        prev: Option<StorageSlot>,
    },
    SuicideChange {
        address: Address,
        prev_suicided: bool,
        prev_balance: U256,
    },
    LogAdded,
    PreimageAdded {
        hash: B256,
    },
    AccessListAddAccount {
        address: Address,
    },
    AccessListAddSlot {
        address: Address,
        key: U256,
    },
}

/// An in-memory [`StateDB`] with a journaled undo log, suitable for
/// tests and single-transaction execution.
#[derive(Clone, Debug, Default)]
pub struct InMemoryDB {
    accounts: HashMap<Address, DbAccount>,
    logs: Vec<Log>,
    preimages: HashMap<B256, Bytes>,
    block_hashes: HashMap<u64, B256>,
    access_list_addresses: HashSet<Address>,
    access_list_slots: HashSet<(Address, U256)>,
    journal: Vec<JournalEntry>,
    snapshots: Vec<usize>,
}

impl InMemoryDB {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an account as pre-state, outside the journal.
    pub fn insert_account(&mut self, address: Address, account: DbAccount) {
        self.accounts.insert(address, account);
    }

    /// Seeds a storage slot as pre-state (original == present).
    pub fn insert_storage(&mut self, address: Address, key: U256, value: U256) {
        self.accounts
            .entry(address)
            .or_default()
            .storage
            .insert(key, StorageSlot::new(value));
    }

    /// Seeds an ancestor block hash for the BLOCKHASH oracle.
    pub fn insert_block_hash(&mut self, number: u64, hash: B256) {
        self.block_hashes.insert(number, hash);
    }

    pub fn account(&self, address: Address) -> Option<&DbAccount> {
        self.accounts.get(&address)
    }

    pub fn logs(&self) -> &[Log] {
        &self.logs
    }

    pub fn preimages(&self) -> &HashMap<B256, Bytes> {
        &self.preimages
    }

    fn get_or_create(&mut self, address: Address) -> &mut DbAccount {
        if !self.accounts.contains_key(&address) {
            self.journal
                .push(JournalEntry::AccountCreated { address, prev: None });
            self.accounts.insert(address, DbAccount::default());
        }
        self.account_mut(address)
    }

    fn account_mut(&mut self, address: Address) -> &mut DbAccount {
        // journal ordering guarantees the account exists
        self.accounts
            .get_mut(&address)
            .expect("account loaded before mutation")
    }

    fn undo(&mut self, entry: JournalEntry) {
        match entry {
            JournalEntry::AccountCreated { address, prev } => match prev {
                Some(account) => {
                    self.accounts.insert(address, *account);
                }
                None => {
                    self.accounts.remove(&address);
                }
            },
            JournalEntry::BalanceChange { address, prev } => {
                self.account_mut(address).balance = prev;
            }
            JournalEntry::NonceChange { address, prev } => {
                self.account_mut(address).nonce = prev;
            }
            JournalEntry::CodeChange {
                address,
                prev_code,
                prev_hash,
            } => {
                let account = self.account_mut(address);
                account.code = prev_code;
                account.code_hash = prev_hash;
            }
            JournalEntry::StorageChange { address, key, prev } => {
                let storage = &mut self.account_mut(address).storage;
                match prev {
                    Some(slot) => {
                        storage.insert(key, slot);
                    }
                    None => {
                        storage.remove(&key);
                    }
                }
            }
            JournalEntry::SuicideChange {
                address,
                prev_suicided,
                prev_balance,
            } => {
                let account = self.account_mut(address);
                account.suicided = prev_suicided;
                account.balance = prev_balance;
            }
            JournalEntry::LogAdded => {
                self.logs.pop();
            }
            JournalEntry::PreimageAdded { hash } => {
                self.preimages.remove(&hash);
            }
            JournalEntry::AccessListAddAccount { address } => {
                self.access_list_addresses.remove(&address);
            }
            JournalEntry::AccessListAddSlot { address, key } => {
                self.access_list_slots.remove(&(address, key));
            }
        }
    }
}

impl StateDB for InMemoryDB {
    fn exist(&self, address: Address) -> bool {
        self.accounts.contains_key(&address)
    }

    fn empty(&self, address: Address) -> bool {
        self.accounts
            .get(&address)
            .map_or(true, DbAccount::is_empty)
    }

    fn balance(&self, address: Address) -> U256 {
        self.accounts
            .get(&address)
            .map_or(U256::ZERO, |account| account.balance)
    }

    fn add_balance(&mut self, address: Address, amount: U256) {
        let account = self.get_or_create(address);
        let prev = account.balance;
        account.balance = prev.saturating_add(amount);
        self.journal
            .push(JournalEntry::BalanceChange { address, prev });
    }

    fn sub_balance(&mut self, address: Address, amount: U256) {
        let account = self.get_or_create(address);
        let prev = account.balance;
        account.balance = prev.saturating_sub(amount);
        self.journal
            .push(JournalEntry::BalanceChange { address, prev });
    }

    fn set_balance(&mut self, address: Address, balance: U256) {
        let account = self.get_or_create(address);
        let prev = account.balance;
        account.balance = balance;
        self.journal
            .push(JournalEntry::BalanceChange { address, prev });
    }

    fn nonce(&self, address: Address) -> u64 {
        self.accounts
            .get(&address)
            .map_or(0, |account| account.nonce)
    }

    fn set_nonce(&mut self, address: Address, nonce: u64) {
        let account = self.get_or_create(address);
        let prev = account.nonce;
        account.nonce = nonce;
        self.journal.push(JournalEntry::NonceChange { address, prev });
    }

    fn code(&self, address: Address) -> Bytes {
        self.accounts
            .get(&address)
            .map_or_else(Bytes::new, |account| account.code.clone())
    }

    fn code_hash(&self, address: Address) -> B256 {
        self.accounts
            .get(&address)
            .map_or(B256::ZERO, |account| account.code_hash)
    }

    fn code_size(&self, address: Address) -> usize {
        self.accounts
            .get(&address)
            .map_or(0, |account| account.code.len())
    }

    fn set_code(&mut self, address: Address, code: Bytes) {
        let code_hash = keccak256(&code);
        let account = self.get_or_create(address);
        let prev_code = core::mem::replace(&mut account.code, code);
        let prev_hash = core::mem::replace(&mut account.code_hash, code_hash);
        self.journal.push(JournalEntry::CodeChange {
            address,
            prev_code,
            prev_hash,
        });
    }

    fn state(&self, address: Address, key: U256) -> U256 {
        self.accounts
            .get(&address)
            .and_then(|account| account.storage.get(&key))
            .map_or(U256::ZERO, |slot| slot.present)
    }

    fn committed_state(&self, address: Address, key: U256) -> U256 {
        self.accounts
            .get(&address)
            .and_then(|account| account.storage.get(&key))
            .map_or(U256::ZERO, |slot| slot.original)
    }

    fn set_state(&mut self, address: Address, key: U256, value: U256) {
        let account = self.get_or_create(address);
        let prev = account.storage.get(&key).copied();
        match account.storage.get_mut(&key) {
            Some(slot) => slot.present = value,
            None => {
                // first write to a slot that was never committed
                account.storage.insert(
                    key,
                    StorageSlot {
                        original: U256::ZERO,
                        present: value,
                    },
                );
            }
        }
        self.journal
            .push(JournalEntry::StorageChange { address, key, prev });
    }

    fn create_account(&mut self, address: Address) {
        let prev = self.accounts.get(&address).cloned();
        // any balance already sent to the address is carried over
        let balance = prev.as_ref().map_or(U256::ZERO, |account| account.balance);
        self.accounts.insert(
            address,
            DbAccount {
                balance,
                ..Default::default()
            },
        );
        self.journal.push(JournalEntry::AccountCreated {
            address,
            prev: prev.map(Box::new),
        });
    }

    fn suicide(&mut self, address: Address) -> bool {
        let Some(account) = self.accounts.get_mut(&address) else {
            return false;
        };
        self.journal.push(JournalEntry::SuicideChange {
            address,
            prev_suicided: account.suicided,
            prev_balance: account.balance,
        });
        account.suicided = true;
        account.balance = U256::ZERO;
        true
    }

    fn has_suicided(&self, address: Address) -> bool {
        self.accounts
            .get(&address)
            .is_some_and(|account| account.suicided)
    }

    fn add_log(&mut self, log: Log) {
        self.logs.push(log);
        self.journal.push(JournalEntry::LogAdded);
    }

    fn add_preimage(&mut self, hash: B256, preimage: Bytes) {
        if let hashbrown::hash_map::Entry::Vacant(entry) = self.preimages.entry(hash) {
            entry.insert(preimage);
            self.journal.push(JournalEntry::PreimageAdded { hash });
        }
    }

    fn snapshot(&mut self) -> usize {
        self.snapshots.push(self.journal.len());
        self.snapshots.len() - 1
    }

    fn revert_to_snapshot(&mut self, id: usize) {
        let mark = self.snapshots[id];
        while self.journal.len() > mark {
            let entry = self.journal.pop().expect("journal length checked");
            self.undo(entry);
        }
        self.snapshots.truncate(id);
    }

    fn address_in_access_list(&self, address: Address) -> bool {
        self.access_list_addresses.contains(&address)
    }

    fn slot_in_access_list(&self, address: Address, key: U256) -> (bool, bool) {
        (
            self.access_list_addresses.contains(&address),
            self.access_list_slots.contains(&(address, key)),
        )
    }

    fn add_address_to_access_list(&mut self, address: Address) {
        if self.access_list_addresses.insert(address) {
            self.journal
                .push(JournalEntry::AccessListAddAccount { address });
        }
    }

    fn add_slot_to_access_list(&mut self, address: Address, key: U256) {
        if self.access_list_slots.insert((address, key)) {
            self.journal
                .push(JournalEntry::AccessListAddSlot { address, key });
        }
    }

    fn block_hash(&self, number: u64) -> B256 {
        self.block_hashes
            .get(&number)
            .copied()
            .unwrap_or(B256::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::address;

    const A: Address = address!("1000000000000000000000000000000000000001");
    const B: Address = address!("2000000000000000000000000000000000000002");

    #[test]
    fn snapshot_restores_every_field() {
        let mut db = InMemoryDB::new();
        db.insert_account(A, DbAccount::with_balance(U256::from(100)));
        db.insert_storage(A, U256::from(1), U256::from(11));

        let snapshot = db.snapshot();

        db.sub_balance(A, U256::from(40));
        db.set_nonce(A, 7);
        db.set_code(A, Bytes::from_static(&[0x60]));
        db.set_state(A, U256::from(1), U256::from(22));
        db.set_state(A, U256::from(2), U256::from(33));
        db.add_balance(B, U256::from(40));
        db.add_log(Log::default());
        db.add_address_to_access_list(B);
        db.add_slot_to_access_list(B, U256::from(9));
        db.suicide(A);

        db.revert_to_snapshot(snapshot);

        assert_eq!(db.balance(A), U256::from(100));
        assert_eq!(db.nonce(A), 0);
        assert!(db.code(A).is_empty());
        assert_eq!(db.state(A, U256::from(1)), U256::from(11));
        assert_eq!(db.state(A, U256::from(2)), U256::ZERO);
        assert!(!db.exist(B), "account created inside the window is gone");
        assert!(db.logs().is_empty());
        assert!(!db.address_in_access_list(B));
        assert_eq!(db.slot_in_access_list(B, U256::from(9)), (false, false));
        assert!(!db.has_suicided(A));
    }

    #[test]
    fn nested_snapshots_unwind_in_order() {
        let mut db = InMemoryDB::new();
        db.insert_account(A, DbAccount::with_balance(U256::from(1)));

        let outer = db.snapshot();
        db.set_balance(A, U256::from(2));
        let inner = db.snapshot();
        db.set_balance(A, U256::from(3));

        db.revert_to_snapshot(inner);
        assert_eq!(db.balance(A), U256::from(2));

        db.revert_to_snapshot(outer);
        assert_eq!(db.balance(A), U256::from(1));
    }

    #[test]
    fn committed_state_survives_writes() {
        let mut db = InMemoryDB::new();
        db.insert_storage(A, U256::from(1), U256::from(5));
        db.set_state(A, U256::from(1), U256::from(6));
        db.set_state(A, U256::from(1), U256::from(7));
        assert_eq!(db.state(A, U256::from(1)), U256::from(7));
        assert_eq!(db.committed_state(A, U256::from(1)), U256::from(5));
    }

    #[test]
    fn create_account_carries_balance() {
        let mut db = InMemoryDB::new();
        db.insert_account(A, DbAccount::with_balance(U256::from(9)));
        db.create_account(A);
        assert_eq!(db.balance(A), U256::from(9));
        assert_eq!(db.nonce(A), 0);
    }

    #[test]
    fn suicide_zeroes_balance() {
        let mut db = InMemoryDB::new();
        assert!(!db.suicide(A), "missing account cannot be destructed");
        db.insert_account(A, DbAccount::with_balance(U256::from(5)));
        assert!(db.suicide(A));
        assert!(db.has_suicided(A));
        assert_eq!(db.balance(A), U256::ZERO);
    }
}
