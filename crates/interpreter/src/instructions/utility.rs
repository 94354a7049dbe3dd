use alloy_primitives::{Address, B256, U256};

/// Converts a `U256` to `usize`, saturating at `usize::MAX`.
#[inline]
pub fn as_usize_saturated(value: U256) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

/// Converts a `U256` to `u64`, saturating at `u64::MAX`.
#[inline]
pub fn as_u64_saturated(value: U256) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

/// Low 160 bits of the word, as an address.
#[inline]
pub fn as_address(value: U256) -> Address {
    Address::from_word(B256::from(value))
}

/// Widens an address into a word.
#[inline]
pub fn address_to_u256(address: Address) -> U256 {
    address.into_word().into()
}
