//! Type 2 charstring interpretation.

// Useful links:
// https://adobe-type-tools.github.io/font-tech-notes/pdfs/5176.CFF.pdf
// https://adobe-type-tools.github.io/font-tech-notes/pdfs/5177.Type2.pdf
// https://learn.microsoft.com/en-us/typography/opentype/spec/cff2charstr

mod arith;
pub mod argstack;
pub mod env;
pub mod index;
pub mod interpreter;
pub mod operator;
pub mod opset;
pub mod stack;

use core::fmt;

pub use argstack::{ArgStack, Number};
pub use env::{BiasedSubrs, CallStack, CharStringEnv};
pub use index::Index;
pub use interpreter::{hint_info, CharStringInterpreter, HintInfo, State};
pub use operator::{is_arg_op, is_hint_op, is_subr_op, OpCode};
pub use opset::{process_op, CharStringOps, NoopOps};

// Limits according to the Adobe Technical Note #5177 Appendix B,
// with the operand limit raised to what CFF2 allows.
pub const MAX_ARGUMENTS_STACK_LEN: usize = 513;
pub const CALL_STACK_LIMIT: usize = 10;
pub const TRANSIENT_ARRAY_LEN: usize = 32;

/// A list of errors that can occur during charstring interpretation.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CffError {
    /// An operand or literal needed more bytes than were left.
    ReadOutOfBounds,
    /// An escape byte was the last byte of the charstring.
    TruncatedOperator,
    /// The charstring ended before an `endchar`.
    MissingEndChar,
    /// An unknown or reserved operator.
    InvalidOperator(u16),
    ArgumentsStackLimitReached,
    ArgumentsStackUnderflow,
    /// An operand had a wrong type or value for its operator.
    InvalidOperand,
    NestingLimitReached,
    /// A `return` outside of any subroutine.
    ReturnWithoutCall,
    InvalidSubroutineIndex,
    NotEnoughHintMaskData,
}

impl CffError {
    /// Checks that the error comes from a badly encoded byte sequence.
    pub fn is_malformed_encoding(&self) -> bool {
        matches!(
            self,
            CffError::ReadOutOfBounds | CffError::TruncatedOperator | CffError::MissingEndChar
        )
    }
}

impl fmt::Display for CffError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            CffError::ReadOutOfBounds => write!(f, "read out of bounds"),
            CffError::TruncatedOperator => write!(f, "truncated two-byte operator"),
            CffError::MissingEndChar => write!(f, "'endchar' operator is missing"),
            CffError::InvalidOperator(op) => match OpCode(op).name() {
                Some(name) => write!(f, "unsupported operator '{}'", name),
                None => write!(f, "an invalid operator {} occurred", op),
            },
            CffError::ArgumentsStackLimitReached => write!(f, "arguments stack limit reached"),
            CffError::ArgumentsStackUnderflow => write!(f, "arguments stack underflow"),
            CffError::InvalidOperand => write!(f, "an invalid operand occurred"),
            CffError::NestingLimitReached => write!(f, "subroutines nesting limit reached"),
            CffError::ReturnWithoutCall => write!(f, "'return' operator outside of a subroutine"),
            CffError::InvalidSubroutineIndex => write!(f, "an invalid subroutine index"),
            CffError::NotEnoughHintMaskData => write!(f, "not enough data for a hint mask"),
        }
    }
}

impl std::error::Error for CffError {}

// Adobe Technical Note #5176, Chapter 16 "Local / Global Subrs INDEXes"
#[inline]
pub fn calc_subroutine_bias(len: u32) -> i32 {
    if len < 1240 {
        107
    } else if len < 33900 {
        1131
    } else {
        32768
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subroutine_bias_boundaries() {
        assert_eq!(calc_subroutine_bias(0), 107);
        assert_eq!(calc_subroutine_bias(1239), 107);
        assert_eq!(calc_subroutine_bias(1240), 1131);
        assert_eq!(calc_subroutine_bias(33899), 1131);
        assert_eq!(calc_subroutine_bias(33900), 32768);
        assert_eq!(calc_subroutine_bias(u32::MAX), 32768);
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            CffError::NestingLimitReached.to_string(),
            "subroutines nesting limit reached"
        );
        assert_eq!(
            CffError::InvalidOperator(operator::VSINDEX.0).to_string(),
            "unsupported operator 'vsindex'"
        );
        assert_eq!(
            CffError::InvalidOperator(0).to_string(),
            "an invalid operator 0 occurred"
        );
    }

    #[test]
    fn malformed_encoding_class() {
        assert!(CffError::TruncatedOperator.is_malformed_encoding());
        assert!(CffError::ReadOutOfBounds.is_malformed_encoding());
        assert!(!CffError::InvalidSubroutineIndex.is_malformed_encoding());
    }
}
