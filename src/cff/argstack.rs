//! Operand stack for charstrings.

use super::stack::Stack;
use super::{CffError, MAX_ARGUMENTS_STACK_LEN};
use crate::parser::{Fixed, Stream};

/// A charstring operand.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Number {
    Int(i32),
    Fixed(Fixed),
}

impl Number {
    #[inline]
    pub fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => f64::from(n),
            Number::Fixed(n) => n.to_f64(),
        }
    }

    #[inline]
    pub fn to_f32(self) -> f32 {
        self.to_f64() as f32
    }

    #[inline]
    pub fn to_fixed(self) -> Fixed {
        match self {
            Number::Int(n) => Fixed::from_i32(n),
            Number::Fixed(n) => n,
        }
    }

    /// Returns the value as an integer.
    ///
    /// Fixed-point values are accepted only without a fractional part.
    #[inline]
    pub fn to_int(self) -> Option<i32> {
        match self {
            Number::Int(n) => Some(n),
            Number::Fixed(n) => n.to_integer(),
        }
    }

    #[inline]
    pub fn is_zero(self) -> bool {
        match self {
            Number::Int(n) => n == 0,
            Number::Fixed(n) => n == Fixed::ZERO,
        }
    }
}

impl Default for Number {
    #[inline]
    fn default() -> Self {
        Number::Int(0)
    }
}

impl From<i32> for Number {
    #[inline]
    fn from(n: i32) -> Self {
        Number::Int(n)
    }
}

impl From<Fixed> for Number {
    #[inline]
    fn from(n: Fixed) -> Self {
        Number::Fixed(n)
    }
}

/// The operand stack.
#[derive(Clone, Default)]
pub struct ArgStack {
    stack: Stack<Number, MAX_ARGUMENTS_STACK_LEN>,
}

impl ArgStack {
    #[inline]
    pub fn new() -> Self {
        ArgStack::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[inline]
    pub fn clear(&mut self) {
        self.stack.clear()
    }

    /// Operands in the order they were pushed.
    #[inline]
    pub fn as_slice(&self) -> &[Number] {
        self.stack.as_slice()
    }

    #[inline]
    pub(crate) fn as_mut_slice(&mut self) -> &mut [Number] {
        self.stack.as_mut_slice()
    }

    #[inline]
    pub fn push(&mut self, n: impl Into<Number>) -> Result<(), CffError> {
        self.stack
            .push(n.into())
            .ok_or(CffError::ArgumentsStackLimitReached)
    }

    #[inline]
    pub fn push_int(&mut self, n: i32) -> Result<(), CffError> {
        self.push(Number::Int(n))
    }

    #[inline]
    pub fn push_fixed(&mut self, n: Fixed) -> Result<(), CffError> {
        self.push(Number::Fixed(n))
    }

    /// Reads a 16.16 literal from the stream and pushes it.
    pub fn push_fixed_from_stream(&mut self, s: &mut Stream) -> Result<(), CffError> {
        let n: Fixed = s.read().ok_or(CffError::ReadOutOfBounds)?;
        self.push_fixed(n)
    }

    #[inline]
    pub fn pop_num(&mut self) -> Result<Number, CffError> {
        self.stack.pop().ok_or(CffError::ArgumentsStackUnderflow)
    }

    /// Pops an operand that must be an integer.
    #[inline]
    pub fn pop_int(&mut self) -> Result<i32, CffError> {
        self.pop_num()?.to_int().ok_or(CffError::InvalidOperand)
    }

    /// Number of complete operand pairs, as used by stem hints.
    #[inline]
    pub fn stem_pairs(&self) -> u32 {
        (self.len() / 2) as u32
    }

    #[inline]
    pub fn last(&self) -> Option<Number> {
        self.stack.last()
    }
}

impl core::fmt::Debug for ArgStack {
    fn fmt(&self, f: &mut core::fmt::Formatter) -> core::fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow() {
        let mut stack = ArgStack::new();
        for i in 0..MAX_ARGUMENTS_STACK_LEN {
            stack.push_int(i as i32).unwrap();
        }
        assert_eq!(stack.push_int(0), Err(CffError::ArgumentsStackLimitReached));
        assert_eq!(stack.len(), MAX_ARGUMENTS_STACK_LEN);
    }

    #[test]
    fn typed_pop() {
        let mut stack = ArgStack::new();
        stack.push_fixed(Fixed::from_f64(2.5)).unwrap();
        stack.push_fixed(Fixed::from_i32(-4)).unwrap();
        stack.push_int(9).unwrap();
        assert_eq!(stack.pop_int(), Ok(9));
        assert_eq!(stack.pop_int(), Ok(-4));
        assert_eq!(stack.pop_int(), Err(CffError::InvalidOperand));
        assert_eq!(stack.pop_int(), Err(CffError::ArgumentsStackUnderflow));
    }

    #[test]
    fn fixed_literal() {
        let mut stack = ArgStack::new();
        let mut s = Stream::new(&[0xFF, 0xFF, 0x80, 0x00, 0x00]);
        stack.push_fixed_from_stream(&mut s).unwrap();
        assert_eq!(stack.as_slice(), &[Number::Fixed(Fixed::from_f64(-0.5))]);
        assert_eq!(
            stack.push_fixed_from_stream(&mut s),
            Err(CffError::ReadOutOfBounds)
        );
        assert_eq!(stack.len(), 1);
    }
}
