//! Two's-complement reinterpretation of `U256` for the signed opcodes.

use alloy_primitives::U256;
use core::cmp::Ordering;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Sign {
    Plus,
    Minus,
    Zero,
}

pub const MIN_NEGATIVE_VALUE: U256 = U256::from_limbs([
    0x0000000000000000,
    0x0000000000000000,
    0x0000000000000000,
    0x8000000000000000,
]);

const FLIPH_BITMASK_U64: u64 = 0x7FFFFFFFFFFFFFFF;

/// Classifies the sign of `val` and, when `DO_TWO_COMPL` is set,
/// rewrites a negative value to its magnitude.
#[inline]
pub fn i256_sign<const DO_TWO_COMPL: bool>(val: &mut U256) -> Sign {
    if !val.bit(255) {
        if val.is_zero() {
            Sign::Zero
        } else {
            Sign::Plus
        }
    } else {
        if DO_TWO_COMPL {
            two_compl_mut(val);
        }
        Sign::Minus
    }
}

#[inline]
fn u256_remove_sign(val: &mut U256) {
    unsafe {
        val.as_limbs_mut()[3] &= FLIPH_BITMASK_U64;
    }
}

#[inline]
pub fn two_compl_mut(op: &mut U256) {
    *op = two_compl(*op);
}

#[inline]
pub fn two_compl(op: U256) -> U256 {
    op.wrapping_neg()
}

#[inline]
pub fn i256_cmp(mut first: U256, mut second: U256) -> Ordering {
    let first_sign = i256_sign::<false>(&mut first);
    let second_sign = i256_sign::<false>(&mut second);
    match (first_sign, second_sign) {
        (Sign::Zero, Sign::Zero) => Ordering::Equal,
        (Sign::Zero, Sign::Plus) => Ordering::Less,
        (Sign::Zero, Sign::Minus) => Ordering::Greater,
        (Sign::Minus, Sign::Zero) => Ordering::Less,
        (Sign::Minus, Sign::Plus) => Ordering::Less,
        (Sign::Minus, Sign::Minus) => first.cmp(&second),
        (Sign::Plus, Sign::Minus) => Ordering::Greater,
        (Sign::Plus, Sign::Zero) => Ordering::Greater,
        (Sign::Plus, Sign::Plus) => first.cmp(&second),
    }
}

#[inline]
pub fn i256_div(mut first: U256, mut second: U256) -> U256 {
    let second_sign = i256_sign::<true>(&mut second);
    if second_sign == Sign::Zero {
        return U256::ZERO;
    }
    let first_sign = i256_sign::<true>(&mut first);
    if first_sign == Sign::Minus && first == MIN_NEGATIVE_VALUE && second == U256::from(1) {
        // MIN / -1 wraps back to MIN
        return two_compl(MIN_NEGATIVE_VALUE);
    }

    let mut d = first.wrapping_div(second);
    u256_remove_sign(&mut d);

    if d.is_zero() {
        return U256::ZERO;
    }

    match (first_sign, second_sign) {
        (Sign::Zero, Sign::Plus)
        | (Sign::Plus, Sign::Zero)
        | (Sign::Zero, Sign::Zero)
        | (Sign::Plus, Sign::Plus)
        | (Sign::Minus, Sign::Minus) => d,
        (Sign::Zero, Sign::Minus)
        | (Sign::Plus, Sign::Minus)
        | (Sign::Minus, Sign::Zero)
        | (Sign::Minus, Sign::Plus) => two_compl(d),
    }
}

#[inline]
pub fn i256_mod(mut first: U256, mut second: U256) -> U256 {
    let first_sign = i256_sign::<true>(&mut first);
    if first_sign == Sign::Zero {
        return U256::ZERO;
    }

    let second_sign = i256_sign::<true>(&mut second);
    if second_sign == Sign::Zero {
        return U256::ZERO;
    }

    let mut r = first.wrapping_rem(second);
    u256_remove_sign(&mut r);
    if r.is_zero() {
        return U256::ZERO;
    }
    if first_sign == Sign::Minus {
        two_compl(r)
    } else {
        r
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::num::Wrapping;

    #[test]
    fn div_i256() {
        // Sanity checks based on i8. `Wrapping` because Rust panics on
        // the overflow the EVM defines.
        assert_eq!(Wrapping(i8::MIN) / Wrapping(-1), Wrapping(i8::MIN));
        assert_eq!(i8::MAX / -1, -i8::MAX);

        let one = U256::from(1);
        let one_hundred = U256::from(100);
        let fifty = U256::from(50);
        let two = U256::from(2);
        let neg_one = two_compl(one);
        let neg_one_hundred = two_compl(one_hundred);
        let max_value = MIN_NEGATIVE_VALUE - one;
        let neg_max_value = two_compl(max_value);

        assert_eq!(i256_div(MIN_NEGATIVE_VALUE, neg_one), MIN_NEGATIVE_VALUE);
        assert_eq!(i256_div(MIN_NEGATIVE_VALUE, one), MIN_NEGATIVE_VALUE);
        assert_eq!(i256_div(max_value, one), max_value);
        assert_eq!(i256_div(max_value, neg_one), neg_max_value);
        assert_eq!(i256_div(one_hundred, neg_one), neg_one_hundred);
        assert_eq!(i256_div(one_hundred, two), fifty);
        assert_eq!(i256_div(neg_one_hundred, neg_one), one_hundred);
        assert_eq!(i256_div(one, U256::ZERO), U256::ZERO);
    }

    #[test]
    fn mod_i256() {
        let three = U256::from(3);
        let seven = U256::from(7);
        let neg_seven = two_compl(seven);

        assert_eq!(i256_mod(seven, three), U256::from(1));
        assert_eq!(i256_mod(neg_seven, three), two_compl(U256::from(1)));
        assert_eq!(i256_mod(seven, U256::ZERO), U256::ZERO);
    }

    #[test]
    fn cmp_i256() {
        let one = U256::from(1);
        let neg_one = two_compl(one);
        assert_eq!(i256_cmp(neg_one, one), Ordering::Less);
        assert_eq!(i256_cmp(one, neg_one), Ordering::Greater);
        assert_eq!(i256_cmp(neg_one, neg_one), Ordering::Equal);
        assert_eq!(i256_cmp(U256::ZERO, neg_one), Ordering::Greater);
    }
}
