//! Mutable state of a single charstring interpretation.

use core::convert::TryFrom;

use super::argstack::{ArgStack, Number};
use super::index::Index;
use super::operator::{self, OpCode};
use super::stack::Stack;
use super::{calc_subroutine_bias, CffError, CALL_STACK_LIMIT, TRANSIENT_ARRAY_LEN};
use crate::parser::Stream;

/// A subroutine INDEX paired with its bias.
#[derive(Clone, Copy, Default, Debug)]
pub struct BiasedSubrs<'a> {
    subrs: Index<'a>,
    bias: i32,
}

impl<'a> BiasedSubrs<'a> {
    pub fn new(subrs: Index<'a>) -> Self {
        BiasedSubrs {
            subrs,
            bias: calc_subroutine_bias(subrs.len()),
        }
    }

    #[inline]
    pub fn bias(&self) -> i32 {
        self.bias
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.subrs.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.subrs.is_empty()
    }

    /// Resolves a raw subroutine operand into an index.
    pub fn resolve(&self, raw_index: i32) -> Result<u32, CffError> {
        let n = raw_index
            .checked_add(self.bias)
            .ok_or(CffError::InvalidSubroutineIndex)?;
        match u32::try_from(n) {
            Ok(n) if n < self.subrs.len() => Ok(n),
            _ => Err(CffError::InvalidSubroutineIndex),
        }
    }

    /// Returns the subroutine referenced by a raw operand.
    pub fn lookup(&self, raw_index: i32) -> Result<&'a [u8], CffError> {
        let n = self.resolve(raw_index)?;
        self.subrs.get(n).ok_or(CffError::InvalidSubroutineIndex)
    }
}

/// Saved return positions of nested subroutine calls.
#[derive(Clone, Default, Debug)]
pub struct CallStack<'a> {
    stack: Stack<Stream<'a>, CALL_STACK_LIMIT>,
}

impl<'a> CallStack<'a> {
    #[inline]
    pub fn len(&self) -> usize {
        self.stack.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }

    #[inline]
    pub fn has_room(&self) -> bool {
        !self.stack.is_full()
    }

    #[inline]
    pub fn push(&mut self, s: Stream<'a>) -> Result<(), CffError> {
        self.stack.push(s).ok_or(CffError::NestingLimitReached)
    }

    #[inline]
    pub fn pop(&mut self) -> Result<Stream<'a>, CffError> {
        self.stack.pop().ok_or(CffError::ReturnWithoutCall)
    }
}

/// The charstring execution environment.
///
/// Created per glyph and dropped once interpretation is finished.
#[derive(Clone, Debug)]
pub struct CharStringEnv<'a> {
    /// The active cursor.
    pub stream: Stream<'a>,
    pub arg_stack: ArgStack,
    pub call_stack: CallStack<'a>,
    pub global_subrs: BiasedSubrs<'a>,
    pub local_subrs: BiasedSubrs<'a>,
    pub transient: [Number; TRANSIENT_ARRAY_LEN],
    pub endchar_flag: bool,
    pub stack_cleared: bool,
    pub seen_moveto: bool,
    pub seen_hintmask: bool,
    pub hstem_count: u32,
    pub vstem_count: u32,
    /// Mask length in bytes. Valid once `seen_hintmask` is set.
    pub hintmask_size: u32,
    random_seed: u32,
}

impl<'a> CharStringEnv<'a> {
    pub fn new(charstring: &'a [u8], global_subrs: Index<'a>, local_subrs: Index<'a>) -> Self {
        CharStringEnv {
            stream: Stream::new(charstring),
            arg_stack: ArgStack::new(),
            call_stack: CallStack::default(),
            global_subrs: BiasedSubrs::new(global_subrs),
            local_subrs: BiasedSubrs::new(local_subrs),
            transient: [Number::default(); TRANSIENT_ARRAY_LEN],
            endchar_flag: false,
            stack_cleared: false,
            // Kept as true: implicit vstems are only finalized on the first
            // moveto when the caller resets this before interpreting.
            seen_moveto: true,
            seen_hintmask: false,
            hstem_count: 0,
            vstem_count: 0,
            hintmask_size: 0,
            random_seed: 0x2545_F491,
        }
    }

    #[inline]
    pub fn fetch_op(&mut self) -> Result<OpCode, CffError> {
        operator::fetch_op(&mut self.stream)
    }

    /// Pops a subroutine operand and resolves it against `subrs`.
    pub fn pop_subr_num(&mut self, subrs: &BiasedSubrs) -> Result<u32, CffError> {
        if !self.call_stack.has_room() {
            return Err(CffError::NestingLimitReached);
        }

        let n = self.arg_stack.pop_int()?;
        subrs.resolve(n)
    }

    /// Enters a subroutine from `subrs`, saving the current position.
    pub fn call_subr(&mut self, subrs: BiasedSubrs<'a>) -> Result<(), CffError> {
        let n = self.pop_subr_num(&subrs)?;
        let data = subrs.subrs.get(n).ok_or(CffError::InvalidSubroutineIndex)?;
        self.call_stack.push(self.stream)?;
        self.stream = Stream::new(data);
        Ok(())
    }

    pub fn return_from_subr(&mut self) -> Result<(), CffError> {
        self.stream = self.call_stack.pop()?;
        Ok(())
    }

    /// Computes the hint mask length on the first call.
    ///
    /// Operand pairs left on the stack are implicit vstem hints.
    pub fn determine_hintmask_size(&mut self) {
        if self.seen_hintmask {
            return;
        }

        self.vstem_count = self.vstem_count.saturating_add(self.arg_stack.stem_pairs());
        self.hintmask_size = self
            .hstem_count
            .saturating_add(self.vstem_count)
            .saturating_add(7)
            >> 3;
        self.seen_hintmask = true;
    }

    #[inline]
    pub fn clear_stack(&mut self) {
        self.stack_cleared = true;
        self.arg_stack.clear();
    }

    #[inline]
    pub fn set_endchar(&mut self, flag: bool) {
        self.endchar_flag = flag;
    }

    #[inline]
    pub fn is_endchar(&self) -> bool {
        self.endchar_flag
    }

    #[inline]
    pub fn is_stack_cleared(&self) -> bool {
        self.stack_cleared
    }

    /// Returns a pseudo-random number in the (0, 1] range.
    ///
    /// The sequence is the same for every interpretation.
    pub(crate) fn next_random(&mut self) -> Number {
        // xorshift32
        let mut x = self.random_seed;
        x ^= x << 13;
        x ^= x >> 17;
        x ^= x << 5;
        self.random_seed = x;
        let bits = (x & 0xFFFF) as i32 + 1;
        Number::Fixed(crate::parser::Fixed::from_bits(bits))
    }
}
