//! Gas accounting: the per-frame counter and the cost functions.

pub mod calc;
pub mod constants;

pub use calc::*;
pub use constants::*;

/// Represents the state of gas during execution.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Gas {
    /// The initial gas limit. This is constant throughout execution.
    limit: u64,
    /// The remaining gas.
    remaining: u64,
    /// Refunded gas. This is used only at the end of execution.
    refunded: i64,
}

impl Gas {
    /// Creates a new `Gas` struct with the given gas limit.
    #[inline]
    pub const fn new(limit: u64) -> Self {
        Self {
            limit,
            remaining: limit,
            refunded: 0,
        }
    }

    /// Creates a new `Gas` struct with the given gas limit, but without
    /// any gas remaining.
    #[inline]
    pub const fn new_spent(limit: u64) -> Self {
        Self {
            limit,
            remaining: 0,
            refunded: 0,
        }
    }

    /// Returns the gas limit.
    #[inline]
    pub const fn limit(&self) -> u64 {
        self.limit
    }

    /// Returns the amount of gas remaining.
    #[inline]
    pub const fn remaining(&self) -> u64 {
        self.remaining
    }

    /// Returns the total amount of gas spent.
    #[inline]
    pub const fn spent(&self) -> u64 {
        self.limit - self.remaining
    }

    /// Returns the total amount of gas that was refunded.
    #[inline]
    pub const fn refunded(&self) -> i64 {
        self.refunded
    }

    /// Records a cost, returning `false` on exhaustion. On `false` the
    /// counter is left unchanged.
    #[inline]
    #[must_use = "the caller must surface OutOfGas when this returns false"]
    pub fn record_cost(&mut self, cost: u64) -> bool {
        let Some(new_remaining) = self.remaining.checked_sub(cost) else {
            return false;
        };
        self.remaining = new_remaining;
        true
    }

    /// Returns gas from a finished child frame.
    #[inline]
    pub fn erase_cost(&mut self, returned: u64) {
        self.remaining += returned;
    }

    /// Consumes all remaining gas.
    #[inline]
    pub fn spend_all(&mut self) {
        self.remaining = 0;
    }

    /// Records a refund value.
    ///
    /// `refund` can be negative (EIP-3529 removed refunds previously
    /// granted within the same frame) but the counter must be
    /// non-negative when the transaction settles.
    #[inline]
    pub fn record_refund(&mut self, refund: i64) {
        self.refunded += refund;
    }

    /// Caps the refund to the fork's quotient of gas spent.
    ///
    /// EIP-3529 lowered the cap from `spent / 2` to `spent / 5`.
    #[inline]
    pub fn set_final_refund(&mut self, is_london: bool) {
        let max_refund_quotient = if is_london { 5 } else { 2 };
        self.refunded = (self.refunded as u64).min(self.spent() / max_refund_quotient) as i64;
    }
}
