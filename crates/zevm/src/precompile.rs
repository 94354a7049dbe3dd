//! Precompiled-contract dispatch.
//!
//! The orchestrator intercepts calls to the reserved low addresses and
//! runs them natively instead of entering the interpreter. Only the
//! identity contract ships built in; the cryptographic precompiles are
//! external collaborators the embedder registers with
//! [`Precompiles::insert`].

use alloy_primitives::{Address, Bytes};
use hashbrown::HashMap;
use zevm_interpreter::{gas::cost_per_word, SpecId};

/// A native contract: `(input, gas_limit) -> (gas_used, output)`.
pub type Precompile = fn(&[u8], u64) -> Result<PrecompileOutput, PrecompileError>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PrecompileOutput {
    pub gas_used: u64,
    pub output: Bytes,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PrecompileError {
    OutOfGas,
    /// Any other failure; consumes all forwarded gas.
    Error(&'static str),
}

/// The set of precompile addresses active for a fork, with the
/// registered implementations.
#[derive(Clone, Debug, Default)]
pub struct Precompiles {
    fns: HashMap<Address, Precompile>,
    addresses: Vec<Address>,
}

impl Precompiles {
    /// The canonical address set of the fork: 0x01..=0x04 from
    /// Frontier, ..=0x08 from Byzantium, ..=0x09 from Istanbul. The
    /// identity contract is pre-registered.
    pub fn new(spec_id: SpecId) -> Self {
        let count: u8 = if spec_id.is_enabled_in(SpecId::Istanbul) {
            9
        } else if spec_id.is_enabled_in(SpecId::Byzantium) {
            8
        } else {
            4
        };
        let addresses = (1..=count).map(Address::with_last_byte).collect();
        let mut precompiles = Self {
            fns: HashMap::new(),
            addresses,
        };
        precompiles.insert(Address::with_last_byte(4), identity_run);
        precompiles
    }

    /// Registers (or replaces) an implementation.
    pub fn insert(&mut self, address: Address, precompile: Precompile) {
        if !self.addresses.contains(&address) {
            self.addresses.push(address);
        }
        self.fns.insert(address, precompile);
    }

    /// Implementation registered for `address`, if any.
    #[inline]
    pub fn get(&self, address: Address) -> Option<Precompile> {
        self.fns.get(&address).copied()
    }

    /// All reserved addresses of the fork, registered or not. Used for
    /// EIP-2929 warm-up.
    pub fn addresses(&self) -> impl Iterator<Item = Address> + '_ {
        self.addresses.iter().copied()
    }
}

const IDENTITY_BASE: u64 = 15;
const IDENTITY_PER_WORD: u64 = 3;

/// The 0x04 "datacopy" contract: output equals input.
fn identity_run(input: &[u8], gas_limit: u64) -> Result<PrecompileOutput, PrecompileError> {
    let gas_used = cost_per_word(input.len() as u64, IDENTITY_PER_WORD)
        .and_then(|words| words.checked_add(IDENTITY_BASE))
        .ok_or(PrecompileError::OutOfGas)?;
    if gas_used > gas_limit {
        return Err(PrecompileError::OutOfGas);
    }
    Ok(PrecompileOutput {
        gas_used,
        output: Bytes::copy_from_slice(input),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity() {
        let out = identity_run(&[1, 2, 3], 100).unwrap();
        assert_eq!(out.gas_used, 18);
        assert_eq!(out.output.as_ref(), &[1, 2, 3]);

        assert_eq!(identity_run(&[1, 2, 3], 17), Err(PrecompileError::OutOfGas));
    }

    #[test]
    fn fork_address_sets() {
        assert_eq!(Precompiles::new(SpecId::Frontier).addresses().count(), 4);
        assert_eq!(Precompiles::new(SpecId::Byzantium).addresses().count(), 8);
        assert_eq!(Precompiles::new(SpecId::London).addresses().count(), 9);
    }
}
