//! Number literals and the arithmetic, logical and stack operators.
//!
//! See "4.4 Arithmetic Operators", "4.5 Storage Operators" and
//! "4.6 Conditional Operators" in the Adobe Technical Note #5177.

use core::convert::TryFrom;

use log::debug;

use super::argstack::Number;
use super::env::CharStringEnv;
use super::operator::{self, *};
use super::CffError;
use crate::parser::Fixed;

/// Executes an operator that only touches the operand stack.
pub(crate) fn process_op(op: OpCode, env: &mut CharStringEnv) -> Result<(), CffError> {
    match op {
        operator::SHORTINT => {
            let n: i16 = env.stream.read().ok_or(CffError::ReadOutOfBounds)?;
            env.arg_stack.push_int(i32::from(n))
        }
        OpCode(b0 @ ONE_BYTE_INT_FIRST..=ONE_BYTE_INT_LAST) => {
            env.arg_stack.push_int(i32::from(b0) - 139)
        }
        OpCode(b0 @ TWO_BYTE_POS_INT_FIRST..=TWO_BYTE_POS_INT_LAST) => {
            let b1: u8 = env.stream.read().ok_or(CffError::ReadOutOfBounds)?;
            let n = (i32::from(b0) - 247) * 256 + i32::from(b1) + 108;
            env.arg_stack.push_int(n)
        }
        OpCode(b0 @ TWO_BYTE_NEG_INT_FIRST..=TWO_BYTE_NEG_INT_LAST) => {
            let b1: u8 = env.stream.read().ok_or(CffError::ReadOutOfBounds)?;
            let n = -(i32::from(b0) - 251) * 256 - i32::from(b1) - 108;
            env.arg_stack.push_int(n)
        }
        DOTSECTION => {
            debug!("deprecated 'dotsection' operator is ignored");
            env.clear_stack();
            Ok(())
        }
        AND => {
            let (a, b) = pop2(env)?;
            env.arg_stack.push_int(bool_to_int(!a.is_zero() && !b.is_zero()))
        }
        OR => {
            let (a, b) = pop2(env)?;
            env.arg_stack.push_int(bool_to_int(!a.is_zero() || !b.is_zero()))
        }
        NOT => {
            let a = env.arg_stack.pop_num()?;
            env.arg_stack.push_int(bool_to_int(a.is_zero()))
        }
        EQ => {
            let (a, b) = pop2(env)?;
            env.arg_stack.push_int(bool_to_int(a.to_f64() == b.to_f64()))
        }
        ABS => {
            let a = env.arg_stack.pop_num()?;
            let n = match a {
                Number::Int(n) => n.checked_abs().map(Number::Int),
                Number::Fixed(_) => None,
            };
            env.arg_stack.push(n.unwrap_or_else(|| to_number(a.to_f64().abs(), false)))
        }
        NEG => {
            let a = env.arg_stack.pop_num()?;
            let n = match a {
                Number::Int(n) => n.checked_neg().map(Number::Int),
                Number::Fixed(_) => None,
            };
            env.arg_stack.push(n.unwrap_or_else(|| to_number(-a.to_f64(), false)))
        }
        ADD => {
            let (a, b) = pop2(env)?;
            let n = match (a, b) {
                (Number::Int(a), Number::Int(b)) => a.checked_add(b).map(Number::Int),
                _ => None,
            };
            env.arg_stack.push(n.unwrap_or_else(|| to_number(a.to_f64() + b.to_f64(), false)))
        }
        SUB => {
            let (a, b) = pop2(env)?;
            let n = match (a, b) {
                (Number::Int(a), Number::Int(b)) => a.checked_sub(b).map(Number::Int),
                _ => None,
            };
            env.arg_stack.push(n.unwrap_or_else(|| to_number(a.to_f64() - b.to_f64(), false)))
        }
        MUL => {
            let (a, b) = pop2(env)?;
            let n = match (a, b) {
                (Number::Int(a), Number::Int(b)) => a.checked_mul(b).map(Number::Int),
                _ => None,
            };
            env.arg_stack.push(n.unwrap_or_else(|| to_number(a.to_f64() * b.to_f64(), false)))
        }
        DIV => {
            let (a, b) = pop2(env)?;
            if b.is_zero() {
                return Err(CffError::InvalidOperand);
            }

            let ints = matches!((a, b), (Number::Int(_), Number::Int(_)));
            env.arg_stack.push(to_number(a.to_f64() / b.to_f64(), ints))
        }
        SQRT => {
            let a = env.arg_stack.pop_num()?;
            let v = a.to_f64();
            if v < 0.0 {
                return Err(CffError::InvalidOperand);
            }

            let ints = matches!(a, Number::Int(_));
            env.arg_stack.push(to_number(v.sqrt(), ints))
        }
        DROP => env.arg_stack.pop_num().map(|_| ()),
        DUP => {
            let a = env.arg_stack.last().ok_or(CffError::ArgumentsStackUnderflow)?;
            env.arg_stack.push(a)
        }
        EXCH => {
            let (a, b) = pop2(env)?;
            env.arg_stack.push(b)?;
            env.arg_stack.push(a)
        }
        INDEX => {
            let i = env.arg_stack.pop_int()?;
            let args = env.arg_stack.as_slice();
            let top = args.len().checked_sub(1).ok_or(CffError::ArgumentsStackUnderflow)?;
            // A negative index copies the top element.
            let n = match usize::try_from(i) {
                Ok(i) => top.checked_sub(i).ok_or(CffError::InvalidOperand)?,
                Err(_) => top,
            };
            let value = args[n];
            env.arg_stack.push(value)
        }
        ROLL => {
            let j = env.arg_stack.pop_int()?;
            let n = env.arg_stack.pop_int()?;
            let n = usize::try_from(n).map_err(|_| CffError::InvalidOperand)?;
            let args = env.arg_stack.as_mut_slice();
            if n > args.len() {
                return Err(CffError::InvalidOperand);
            }

            if n != 0 {
                let start = args.len() - n;
                // Positive shifts move elements towards the top.
                let shift = i64::from(j).rem_euclid(n as i64) as usize;
                args[start..].rotate_right(shift);
            }

            Ok(())
        }
        PUT => {
            let i = env.arg_stack.pop_int()?;
            let value = env.arg_stack.pop_num()?;
            let slot = usize::try_from(i)
                .ok()
                .and_then(|i| env.transient.get_mut(i))
                .ok_or(CffError::InvalidOperand)?;
            *slot = value;
            Ok(())
        }
        GET => {
            let i = env.arg_stack.pop_int()?;
            let value = usize::try_from(i)
                .ok()
                .and_then(|i| env.transient.get(i).copied())
                .ok_or(CffError::InvalidOperand)?;
            env.arg_stack.push(value)
        }
        IFELSE => {
            let v2 = env.arg_stack.pop_num()?;
            let v1 = env.arg_stack.pop_num()?;
            let (s1, s2) = pop2(env)?;
            env.arg_stack
                .push(if v1.to_f64() <= v2.to_f64() { s1 } else { s2 })
        }
        RANDOM => {
            debug!("charstring operator 'random' found");
            let n = env.next_random();
            env.arg_stack.push(n)
        }
        _ => Err(CffError::InvalidOperator(op.0)),
    }
}

/// Pops two operands, returning them in push order.
#[inline]
fn pop2(env: &mut CharStringEnv) -> Result<(Number, Number), CffError> {
    if env.arg_stack.len() < 2 {
        return Err(CffError::ArgumentsStackUnderflow);
    }

    let b = env.arg_stack.pop_num()?;
    let a = env.arg_stack.pop_num()?;
    Ok((a, b))
}

#[inline]
fn bool_to_int(b: bool) -> i32 {
    if b {
        1
    } else {
        0
    }
}

/// Converts a computed value back into an operand.
///
/// Integral results of integer operands stay integers.
fn to_number(v: f64, ints: bool) -> Number {
    if ints && v.fract() == 0.0 && v >= f64::from(i32::MIN) && v <= f64::from(i32::MAX) {
        Number::Int(v as i32)
    } else {
        Number::Fixed(Fixed::from_f64(v))
    }
}
