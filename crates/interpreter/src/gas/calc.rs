use super::constants::*;
use crate::{num_words, SpecId};
use alloy_primitives::U256;

/// Memory expansion cost for a memory of `num_words` 32-byte words:
/// `3 * w + w * w / 512`.
#[inline]
pub const fn memory_gas(num_words: u64) -> u64 {
    MEMORY
        .saturating_mul(num_words)
        .saturating_add(num_words.saturating_mul(num_words) / QUAD_COEFF_DIV)
}

#[inline]
fn log2floor(value: U256) -> u64 {
    debug_assert!(value != U256::ZERO);
    let mut l: u64 = 256;
    for i in 0..4 {
        let i = 3 - i;
        if value.as_limbs()[i] == 0u64 {
            l -= 64;
        } else {
            l -= value.as_limbs()[i].leading_zeros() as u64;
            if l == 0 {
                return l;
            } else {
                return l - 1;
            }
        }
    }
    l
}

/// EXP cost: `10 + per_byte * byte_len(power)`. EIP-160 raised the
/// per-byte cost from 10 to 50.
#[inline]
pub fn exp_cost(spec_id: SpecId, power: U256) -> Option<u64> {
    if power == U256::ZERO {
        return Some(EXP);
    }
    let gas_byte = if spec_id.is_enabled_in(SpecId::SpuriousDragon) {
        EXP_BYTE_EIP160
    } else {
        EXP_BYTE
    };
    EXP.checked_add(gas_byte.checked_mul(log2floor(power) / 8 + 1)?)
}

/// `multiple` per 32-byte word of `len`, rounded up.
#[inline]
pub const fn cost_per_word(len: u64, multiple: u64) -> Option<u64> {
    multiple.checked_mul(num_words(len))
}

/// `VERYLOW + 3 * ceil(len / 32)`, the cost of the *COPY family.
#[inline]
pub const fn copy_cost_verylow(len: u64) -> Option<u64> {
    match cost_per_word(len, COPY) {
        Some(words_cost) => VERYLOW.checked_add(words_cost),
        None => None,
    }
}

/// `KECCAK256 + 6 * ceil(len / 32)`.
#[inline]
pub const fn keccak256_cost(len: u64) -> Option<u64> {
    match cost_per_word(len, KECCAK256WORD) {
        Some(words_cost) => KECCAK256.checked_add(words_cost),
        None => None,
    }
}

/// `375 + 375 * topics + 8 * len`.
#[inline]
pub const fn log_cost(n: u8, len: u64) -> Option<u64> {
    match LOGDATA.checked_mul(len) {
        Some(data_cost) => match LOG.checked_add(data_cost) {
            Some(cost) => cost.checked_add(LOGTOPIC * n as u64),
            None => None,
        },
        None => None,
    }
}

/// SLOAD cost ladder: 50, EIP-150 200, EIP-1884 800, EIP-2929 warm/cold.
#[inline]
pub fn sload_cost(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::Berlin) {
        if is_cold {
            COLD_SLOAD_COST
        } else {
            WARM_STORAGE_READ_COST
        }
    } else if spec_id.is_enabled_in(SpecId::Istanbul) {
        ISTANBUL_SLOAD_GAS
    } else if spec_id.is_enabled_in(SpecId::Tangerine) {
        200
    } else {
        50
    }
}

/// SSTORE cost.
///
/// Returns `None` when the EIP-2200 reentrancy sentry trips (gas left at
/// or below the call stipend); the dispatch layer turns that into
/// OutOfGas.
#[inline]
pub fn sstore_cost(
    spec_id: SpecId,
    original: U256,
    current: U256,
    new: U256,
    gas_remaining: u64,
    is_cold: bool,
) -> Option<u64> {
    if spec_id.is_enabled_in(SpecId::Istanbul) && gas_remaining <= CALL_STIPEND {
        return None;
    }

    if spec_id.is_enabled_in(SpecId::Berlin) {
        let mut gas_cost =
            net_sstore_cost(original, current, new, WARM_STORAGE_READ_COST, WARM_SSTORE_RESET);
        if is_cold {
            gas_cost += COLD_SLOAD_COST;
        }
        Some(gas_cost)
    } else if spec_id.is_enabled_in(SpecId::Istanbul) {
        Some(net_sstore_cost(original, current, new, ISTANBUL_SLOAD_GAS, SSTORE_RESET))
    } else {
        Some(frontier_sstore_cost(current, new))
    }
}

/// EIP-2200: Structured Definitions for Net Gas Metering.
#[inline]
fn net_sstore_cost(original: U256, current: U256, new: U256, sload_gas: u64, reset_gas: u64) -> u64 {
    if new == current {
        sload_gas
    } else if original == current && original == U256::ZERO {
        SSTORE_SET
    } else if original == current {
        reset_gas
    } else {
        sload_gas
    }
}

/// Frontier SSTORE had two cases: set a zero slot, or reset a live one.
#[inline]
fn frontier_sstore_cost(current: U256, new: U256) -> u64 {
    if current == U256::ZERO && new != U256::ZERO {
        SSTORE_SET
    } else {
        SSTORE_RESET
    }
}

/// SSTORE refund counter delta for the active fork (EIP-2200 net
/// metering, EIP-3529 reduction).
pub fn sstore_refund(spec_id: SpecId, original: U256, current: U256, new: U256) -> i64 {
    if !spec_id.is_enabled_in(SpecId::Istanbul) {
        return if current != U256::ZERO && new == U256::ZERO {
            REFUND_SSTORE_CLEARS
        } else {
            0
        };
    }

    // EIP-3529 redefined the clear refund in terms of the warm reset cost.
    let sstore_clears_schedule = if spec_id.is_enabled_in(SpecId::London) {
        (SSTORE_RESET - COLD_SLOAD_COST + ACCESS_LIST_STORAGE_KEY) as i64
    } else {
        REFUND_SSTORE_CLEARS
    };

    if current == new {
        return 0;
    }
    if original == current && new == U256::ZERO {
        return sstore_clears_schedule;
    }

    let mut refund = 0;
    if original != U256::ZERO {
        if current == U256::ZERO {
            refund -= sstore_clears_schedule;
        } else if new == U256::ZERO {
            refund += sstore_clears_schedule;
        }
    }
    if original == new {
        let (reset_gas, sload_gas) = if spec_id.is_enabled_in(SpecId::Berlin) {
            (WARM_SSTORE_RESET, WARM_STORAGE_READ_COST)
        } else {
            (SSTORE_RESET, ISTANBUL_SLOAD_GAS)
        };
        if original == U256::ZERO {
            refund += (SSTORE_SET - sload_gas) as i64;
        } else {
            refund += (reset_gas - sload_gas) as i64;
        }
    }
    refund
}

/// EIP-2929 surcharge for touching a cold account from an opcode whose
/// constant gas already covers the warm cost.
#[inline]
pub fn cold_account_extra(spec_id: SpecId, is_cold: bool) -> u64 {
    if spec_id.is_enabled_in(SpecId::Berlin) && is_cold {
        COLD_ACCOUNT_ACCESS_COST - WARM_STORAGE_READ_COST
    } else {
        0
    }
}

/// Dynamic part of the CALL-family cost: cold-account surcharge, value
/// transfer surcharge, and the new-account charge.
///
/// `charges_new_account` is true for CALL only; since EIP-161 the charge
/// applies just when value is actually transferred to a dead account.
#[inline]
pub fn call_extra_cost(
    spec_id: SpecId,
    transfers_value: bool,
    is_cold: bool,
    is_dead: bool,
    charges_new_account: bool,
) -> u64 {
    let mut cost = cold_account_extra(spec_id, is_cold);
    if transfers_value {
        cost += CALLVALUE;
    }
    if charges_new_account && is_dead {
        if !spec_id.is_enabled_in(SpecId::SpuriousDragon) || transfers_value {
            cost += NEWACCOUNT;
        }
    }
    cost
}

/// SELFDESTRUCT dynamic cost: EIP-150 new-account top-up (EIP-161
/// narrows it to value-bearing sends to dead accounts) plus the EIP-2929
/// cold surcharge. The 5000 base is the opcode's constant gas from
/// Tangerine on.
#[inline]
pub fn selfdestruct_cost(spec_id: SpecId, had_value: bool, target_is_dead: bool, is_cold: bool) -> u64 {
    let should_charge_topup = if spec_id.is_enabled_in(SpecId::SpuriousDragon) {
        had_value && target_is_dead
    } else {
        target_is_dead
    };

    let mut gas = 0;
    if spec_id.is_enabled_in(SpecId::Tangerine) && should_charge_topup {
        gas += NEWACCOUNT;
    }
    if spec_id.is_enabled_in(SpecId::Berlin) && is_cold {
        gas += COLD_ACCOUNT_ACCESS_COST;
    }
    gas
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_quadratic() {
        assert_eq!(memory_gas(0), 0);
        assert_eq!(memory_gas(1), 3);
        assert_eq!(memory_gas(32), 32 * 3 + 2);
        // 1 MiB = 32768 words
        assert_eq!(memory_gas(32768), 32768 * 3 + 32768u64 * 32768 / 512);
    }

    #[test]
    fn exp_byte_len_pricing() {
        assert_eq!(exp_cost(SpecId::London, U256::ZERO), Some(EXP));
        assert_eq!(exp_cost(SpecId::London, U256::from(255)), Some(EXP + 50));
        assert_eq!(exp_cost(SpecId::London, U256::from(256)), Some(EXP + 100));
        // pre-EIP-160
        assert_eq!(exp_cost(SpecId::Homestead, U256::from(256)), Some(EXP + 20));
        assert_eq!(exp_cost(SpecId::London, U256::MAX), Some(EXP + 50 * 32));
    }

    #[test]
    fn keccak_words() {
        assert_eq!(keccak256_cost(0), Some(30));
        assert_eq!(keccak256_cost(32), Some(36));
        assert_eq!(keccak256_cost(33), Some(42));
    }

    #[test]
    fn sload_ladder() {
        assert_eq!(sload_cost(SpecId::Frontier, false), 50);
        assert_eq!(sload_cost(SpecId::Tangerine, false), 200);
        assert_eq!(sload_cost(SpecId::Istanbul, false), 800);
        assert_eq!(sload_cost(SpecId::Berlin, false), 100);
        assert_eq!(sload_cost(SpecId::Berlin, true), 2100);
    }

    #[test]
    fn sstore_sentry() {
        let zero = U256::ZERO;
        let one = U256::from(1);
        assert_eq!(sstore_cost(SpecId::Istanbul, zero, zero, one, CALL_STIPEND, false), None);
        assert!(sstore_cost(SpecId::Istanbul, zero, zero, one, CALL_STIPEND + 1, false).is_some());
        // the sentry is an Istanbul rule
        assert!(sstore_cost(SpecId::Byzantium, zero, zero, one, 0, false).is_some());
    }

    #[test]
    fn sstore_net_metering() {
        let zero = U256::ZERO;
        let one = U256::from(1);
        let two = U256::from(2);
        let gas = 1_000_000;

        // fresh write
        assert_eq!(sstore_cost(SpecId::Istanbul, zero, zero, one, gas, false), Some(SSTORE_SET));
        // no-op
        assert_eq!(sstore_cost(SpecId::Istanbul, one, one, one, gas, false), Some(800));
        // dirty write
        assert_eq!(sstore_cost(SpecId::Istanbul, one, two, one, gas, false), Some(800));
        // clean reset
        assert_eq!(sstore_cost(SpecId::Istanbul, one, one, two, gas, false), Some(SSTORE_RESET));
        // Berlin cold adds the sload surcharge
        assert_eq!(
            sstore_cost(SpecId::Berlin, one, one, two, gas, true),
            Some(WARM_SSTORE_RESET + COLD_SLOAD_COST)
        );
    }

    #[test]
    fn sstore_clear_refunds() {
        let zero = U256::ZERO;
        let one = U256::from(1);
        assert_eq!(sstore_refund(SpecId::Byzantium, one, one, zero), REFUND_SSTORE_CLEARS);
        assert_eq!(sstore_refund(SpecId::Istanbul, one, one, zero), REFUND_SSTORE_CLEARS);
        assert_eq!(sstore_refund(SpecId::London, one, one, zero), 4800);
        // un-clearing takes the refund back
        assert_eq!(sstore_refund(SpecId::London, one, zero, one), -4800 + (2900 - 100));
    }
}
