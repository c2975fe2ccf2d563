//! Charstring operators defined in the Adobe Technical Note #5177.

use core::fmt;

use phf::phf_map;

use super::CffError;
use crate::parser::Stream;

pub const TWO_BYTE_OPERATOR_MARK: u8 = 12;

/// A decoded charstring opcode.
///
/// One-byte operators keep their byte value. Two-byte operators,
/// prefixed with the escape byte 12, are stored as `256 + second byte`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OpCode(pub u16);

const fn escaped(b1: u8) -> OpCode {
    OpCode(256 + b1 as u16)
}

pub const HSTEM: OpCode = OpCode(1);
pub const VSTEM: OpCode = OpCode(3);
pub const VMOVETO: OpCode = OpCode(4);
pub const RLINETO: OpCode = OpCode(5);
pub const HLINETO: OpCode = OpCode(6);
pub const VLINETO: OpCode = OpCode(7);
pub const RRCURVETO: OpCode = OpCode(8);
pub const CALLSUBR: OpCode = OpCode(10);
pub const RETURN: OpCode = OpCode(11);
pub const ENDCHAR: OpCode = OpCode(14);
pub const VSINDEX: OpCode = OpCode(15);
pub const BLEND: OpCode = OpCode(16);
pub const HSTEMHM: OpCode = OpCode(18);
pub const HINTMASK: OpCode = OpCode(19);
pub const CNTRMASK: OpCode = OpCode(20);
pub const RMOVETO: OpCode = OpCode(21);
pub const HMOVETO: OpCode = OpCode(22);
pub const VSTEMHM: OpCode = OpCode(23);
pub const RCURVELINE: OpCode = OpCode(24);
pub const RLINECURVE: OpCode = OpCode(25);
pub const VVCURVETO: OpCode = OpCode(26);
pub const HHCURVETO: OpCode = OpCode(27);
pub const SHORTINT: OpCode = OpCode(28);
pub const CALLGSUBR: OpCode = OpCode(29);
pub const VHCURVETO: OpCode = OpCode(30);
pub const HVCURVETO: OpCode = OpCode(31);
pub const FIXED_16_16: OpCode = OpCode(255);

pub const DOTSECTION: OpCode = escaped(0);
pub const AND: OpCode = escaped(3);
pub const OR: OpCode = escaped(4);
pub const NOT: OpCode = escaped(5);
pub const ABS: OpCode = escaped(9);
pub const ADD: OpCode = escaped(10);
pub const SUB: OpCode = escaped(11);
pub const DIV: OpCode = escaped(12);
pub const NEG: OpCode = escaped(14);
pub const EQ: OpCode = escaped(15);
pub const DROP: OpCode = escaped(18);
pub const PUT: OpCode = escaped(20);
pub const GET: OpCode = escaped(21);
pub const IFELSE: OpCode = escaped(22);
pub const RANDOM: OpCode = escaped(23);
pub const MUL: OpCode = escaped(24);
pub const SQRT: OpCode = escaped(26);
pub const DUP: OpCode = escaped(27);
pub const EXCH: OpCode = escaped(28);
pub const INDEX: OpCode = escaped(29);
pub const ROLL: OpCode = escaped(30);
pub const HFLEX: OpCode = escaped(34);
pub const FLEX: OpCode = escaped(35);
pub const HFLEX1: OpCode = escaped(36);
pub const FLEX1: OpCode = escaped(37);

// Number encodings, see "3.2 Charstring Number Encoding".
pub const ONE_BYTE_INT_FIRST: u16 = 32;
pub const ONE_BYTE_INT_LAST: u16 = 246;
pub const TWO_BYTE_POS_INT_FIRST: u16 = 247;
pub const TWO_BYTE_POS_INT_LAST: u16 = 250;
pub const TWO_BYTE_NEG_INT_FIRST: u16 = 251;
pub const TWO_BYTE_NEG_INT_LAST: u16 = 254;

static OPERATORS: phf::Map<&'static str, u16> = phf_map! {
    "hstem" => 1,
    "vstem" => 3,
    "vmoveto" => 4,
    "rlineto" => 5,
    "hlineto" => 6,
    "vlineto" => 7,
    "rrcurveto" => 8,
    "callsubr" => 10,
    "return" => 11,
    "endchar" => 14,
    "vsindex" => 15,
    "blend" => 16,
    "hstemhm" => 18,
    "hintmask" => 19,
    "cntrmask" => 20,
    "rmoveto" => 21,
    "hmoveto" => 22,
    "vstemhm" => 23,
    "rcurveline" => 24,
    "rlinecurve" => 25,
    "vvcurveto" => 26,
    "hhcurveto" => 27,
    "callgsubr" => 29,
    "vhcurveto" => 30,
    "hvcurveto" => 31,
    "dotsection" => 256,
    "and" => 259,
    "or" => 260,
    "not" => 261,
    "abs" => 265,
    "add" => 266,
    "sub" => 267,
    "div" => 268,
    "neg" => 270,
    "eq" => 271,
    "drop" => 274,
    "put" => 276,
    "get" => 277,
    "ifelse" => 278,
    "random" => 279,
    "mul" => 280,
    "sqrt" => 282,
    "dup" => 283,
    "exch" => 284,
    "index" => 285,
    "roll" => 286,
    "hflex" => 290,
    "flex" => 291,
    "hflex1" => 292,
    "flex1" => 293,
};

impl OpCode {
    /// Looks up an operator by its mnemonic, like `rmoveto`.
    pub fn from_name(name: &str) -> Option<OpCode> {
        OPERATORS.get(name).copied().map(OpCode)
    }

    /// Returns the operator mnemonic.
    ///
    /// Number encodings have no mnemonic.
    pub fn name(self) -> Option<&'static str> {
        OPERATORS
            .entries()
            .find(|(_, op)| **op == self.0)
            .map(|(name, _)| *name)
    }

    /// Checks that this is a two-byte operator.
    #[inline]
    pub fn is_escaped(self) -> bool {
        self.0 >= 256
    }
}

impl fmt::Display for OpCode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.name() {
            Some(name) => f.write_str(name),
            None if self.is_escaped() => write!(f, "12 {}", self.0 - 256),
            None => write!(f, "{}", self.0),
        }
    }
}

/// Reads the next opcode.
///
/// Operand bytes of number encodings are left in the stream.
pub fn fetch_op(s: &mut Stream) -> Result<OpCode, CffError> {
    let b0: u8 = s.read().ok_or(CffError::MissingEndChar)?;
    if b0 == TWO_BYTE_OPERATOR_MARK {
        let b1: u8 = s.read().ok_or(CffError::TruncatedOperator)?;
        Ok(escaped(b1))
    } else {
        Ok(OpCode(u16::from(b0)))
    }
}

/// Checks that an operator produces arguments
/// (numbers and arithmetic, logical or stack operators).
pub fn is_arg_op(op: OpCode) -> bool {
    match op {
        SHORTINT | FIXED_16_16 | AND | OR | NOT | ABS | ADD | SUB | DIV | NEG | EQ | DROP | PUT
        | GET | IFELSE | RANDOM | MUL | SQRT | DUP | EXCH | INDEX | ROLL => true,
        OpCode(n) => (ONE_BYTE_INT_FIRST..=TWO_BYTE_NEG_INT_LAST).contains(&n),
    }
}

/// Checks that an operator is a stem hint or a flex.
///
/// Hint and counter masks are not included.
pub fn is_hint_op(op: OpCode) -> bool {
    matches!(
        op,
        HSTEM | VSTEM | HSTEMHM | VSTEMHM | HFLEX | FLEX | HFLEX1 | FLEX1
    )
}

pub fn is_subr_op(op: OpCode) -> bool {
    matches!(op, CALLSUBR | CALLGSUBR | RETURN)
}

#[cfg(test)]
mod tests {
    use super::*;

    macro_rules! assert_fetch {
        ($stream:expr, $op:expr) => {
            assert_eq!(fetch_op(&mut $stream), Ok($op))
        };
    }

    #[test]
    fn fetch_one_and_two_byte() {
        let mut s = Stream::new(&[21, 12, 35, 14]);
        assert_fetch!(s, RMOVETO);
        assert_fetch!(s, FLEX);
        assert_fetch!(s, ENDCHAR);
        assert_eq!(fetch_op(&mut s), Err(CffError::MissingEndChar));
    }

    #[test]
    fn fetch_truncated_escape() {
        let mut s = Stream::new(&[12]);
        assert_eq!(fetch_op(&mut s), Err(CffError::TruncatedOperator));
    }

    #[test]
    fn names() {
        assert_eq!(OpCode::from_name("hintmask"), Some(HINTMASK));
        assert_eq!(OpCode::from_name("roll"), Some(ROLL));
        assert_eq!(OpCode::from_name("moveto"), None);
        assert_eq!(HFLEX1.name(), Some("hflex1"));
        assert_eq!(OpCode(139).name(), None);
        assert_eq!(DOTSECTION.to_string(), "dotsection");
        assert_eq!(OpCode(256 + 38).to_string(), "12 38");
        assert_eq!(OpCode(2).to_string(), "2");
    }

    #[test]
    fn names_match_constants() {
        for (name, op) in OPERATORS.entries() {
            assert_eq!(OpCode(*op).name(), Some(*name));
        }
        assert_eq!(OpCode::from_name("vhcurveto"), Some(VHCURVETO));
        assert_eq!(OpCode::from_name("and"), Some(AND));
        assert_eq!(OpCode::from_name("flex1"), Some(FLEX1));
    }

    #[test]
    fn arg_ops() {
        assert!(is_arg_op(OpCode(32)));
        assert!(is_arg_op(OpCode(139)));
        assert!(is_arg_op(OpCode(254)));
        assert!(is_arg_op(SHORTINT));
        assert!(is_arg_op(FIXED_16_16));
        assert!(is_arg_op(ROLL));
        assert!(is_arg_op(ADD));
        assert!(!is_arg_op(OpCode(31)));
        assert!(!is_arg_op(RMOVETO));
        assert!(!is_arg_op(DOTSECTION));
    }

    #[test]
    fn hint_ops() {
        assert!(is_hint_op(HSTEM));
        assert!(is_hint_op(VSTEMHM));
        assert!(is_hint_op(FLEX1));
        assert!(!is_hint_op(HINTMASK));
        assert!(!is_hint_op(CNTRMASK));
        assert!(!is_hint_op(RRCURVETO));
    }

    #[test]
    fn subr_ops() {
        assert!(is_subr_op(CALLSUBR));
        assert!(is_subr_op(CALLGSUBR));
        assert!(is_subr_op(RETURN));
        assert!(!is_subr_op(ENDCHAR));
    }
}
