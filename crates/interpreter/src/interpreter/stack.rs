use crate::InstructionResult;
use alloy_primitives::{B256, U256};
use core::fmt;

/// EVM interpreter stack limit.
pub const STACK_LIMIT: usize = 1024;

/// EVM stack of 256-bit words.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stack {
    data: Vec<U256>,
}

impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, x) in self.data.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{x}")?;
        }
        f.write_str("]")
    }
}

impl Stack {
    /// Instantiate a new stack with the [default stack limit][STACK_LIMIT]
    /// preallocated.
    #[inline]
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(STACK_LIMIT),
        }
    }

    /// Returns the length of the stack in words.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns whether the stack is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns the underlying data of the stack.
    #[inline]
    pub fn data(&self) -> &Vec<U256> {
        &self.data
    }

    /// Removes the topmost element from the stack and returns it, or
    /// `StackUnderflow` if it is empty.
    #[inline]
    pub fn pop(&mut self) -> Result<U256, InstructionResult> {
        self.data.pop().ok_or(InstructionResult::StackUnderflow)
    }

    /// Push a new value onto the stack.
    ///
    /// If it would exceed the stack limit, returns `StackOverflow` and
    /// leaves the stack unchanged.
    #[inline]
    pub fn push(&mut self, value: U256) -> Result<(), InstructionResult> {
        if self.data.len() == STACK_LIMIT {
            return Err(InstructionResult::StackOverflow);
        }
        self.data.push(value);
        Ok(())
    }

    /// Push a 32-byte word onto the stack, interpreted big-endian.
    #[inline]
    pub fn push_b256(&mut self, value: B256) -> Result<(), InstructionResult> {
        self.push(value.into())
    }

    /// Peek a value at given index from the top of the stack, where the
    /// top is at index `0`.
    #[inline]
    pub fn peek(&self, no_from_top: usize) -> Result<U256, InstructionResult> {
        if self.data.len() > no_from_top {
            Ok(self.data[self.data.len() - no_from_top - 1])
        } else {
            Err(InstructionResult::StackUnderflow)
        }
    }

    /// Returns a mutable reference to the topmost value.
    #[inline]
    pub fn top(&mut self) -> Result<&mut U256, InstructionResult> {
        let len = self.data.len();
        if len == 0 {
            return Err(InstructionResult::StackUnderflow);
        }
        Ok(&mut self.data[len - 1])
    }

    /// Pops one value and returns it together with the new topmost value.
    #[inline]
    pub fn pop_top(&mut self) -> Result<(U256, &mut U256), InstructionResult> {
        if self.data.len() < 2 {
            return Err(InstructionResult::StackUnderflow);
        }
        let pop = self.data.pop().unwrap_or_default();
        let len = self.data.len();
        Ok((pop, &mut self.data[len - 1]))
    }

    /// Pops two values and returns them with the new topmost value.
    #[inline]
    pub fn pop2_top(&mut self) -> Result<(U256, U256, &mut U256), InstructionResult> {
        if self.data.len() < 3 {
            return Err(InstructionResult::StackUnderflow);
        }
        let pop1 = self.data.pop().unwrap_or_default();
        let pop2 = self.data.pop().unwrap_or_default();
        let len = self.data.len();
        Ok((pop1, pop2, &mut self.data[len - 1]))
    }

    /// Duplicates the `N`th value from the top of the stack.
    #[inline]
    pub fn dup<const N: usize>(&mut self) -> Result<(), InstructionResult> {
        let len = self.data.len();
        if len < N {
            Err(InstructionResult::StackUnderflow)
        } else if len + 1 > STACK_LIMIT {
            Err(InstructionResult::StackOverflow)
        } else {
            self.data.push(self.data[len - N]);
            Ok(())
        }
    }

    /// Swaps the topmost value with the `N`th value from the top.
    #[inline]
    pub fn swap<const N: usize>(&mut self) -> Result<(), InstructionResult> {
        let len = self.data.len();
        if len <= N {
            return Err(InstructionResult::StackUnderflow);
        }
        let last = len - 1;
        self.data.swap(last, last - N);
        Ok(())
    }

    /// Set a value at given index from the top of the stack, where the
    /// top is at index `0`.
    #[inline]
    pub fn set(&mut self, no_from_top: usize, val: U256) -> Result<(), InstructionResult> {
        if self.data.len() > no_from_top {
            let len = self.data.len();
            self.data[len - no_from_top - 1] = val;
            Ok(())
        } else {
            Err(InstructionResult::StackUnderflow)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_pop() {
        let mut stack = Stack::new();
        assert_eq!(stack.pop(), Err(InstructionResult::StackUnderflow));

        stack.push(U256::from(1)).unwrap();
        stack.push(U256::from(2)).unwrap();
        assert_eq!(stack.len(), 2);
        assert_eq!(stack.peek(0), Ok(U256::from(2)));
        assert_eq!(stack.peek(1), Ok(U256::from(1)));
        assert_eq!(stack.pop(), Ok(U256::from(2)));
    }

    #[test]
    fn overflow_leaves_stack_unchanged() {
        let mut stack = Stack::new();
        for i in 0..STACK_LIMIT {
            stack.push(U256::from(i)).unwrap();
        }
        assert_eq!(stack.push(U256::ZERO), Err(InstructionResult::StackOverflow));
        assert_eq!(stack.len(), STACK_LIMIT);
        assert_eq!(stack.dup::<1>(), Err(InstructionResult::StackOverflow));
    }

    #[test]
    fn dup_swap() {
        let mut stack = Stack::new();
        stack.push(U256::from(10)).unwrap();
        stack.push(U256::from(20)).unwrap();

        stack.dup::<2>().unwrap();
        assert_eq!(stack.peek(0), Ok(U256::from(10)));

        stack.swap::<2>().unwrap();
        assert_eq!(stack.peek(0), Ok(U256::from(20)));
        assert_eq!(stack.peek(2), Ok(U256::from(10)));

        let mut short = Stack::new();
        short.push(U256::from(1)).unwrap();
        assert_eq!(short.swap::<1>(), Err(InstructionResult::StackUnderflow));
        assert_eq!(short.dup::<2>(), Err(InstructionResult::StackUnderflow));
    }
}
