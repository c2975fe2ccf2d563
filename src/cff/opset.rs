//! Charstring operator dispatch.

use log::trace;

use super::argstack::Number;
use super::arith;
use super::env::CharStringEnv;
use super::operator::*;
use super::CffError;

/// Callbacks for the meaningful charstring operators.
///
/// The implementing type is the caller's accumulator. Path construction
/// operators, stems and masks reach it through `flush_args` and
/// `hint_mask`; the remaining methods keep the hint bookkeeping of the
/// environment up to date and usually don't need to be overridden.
#[allow(unused_variables)]
pub trait CharStringOps {
    /// Receives the operands of `op` right before they are cleared.
    fn flush_args(&mut self, op: OpCode, args: &[Number]) {}

    /// Receives the payload of a `hintmask` or `cntrmask` operator.
    fn hint_mask(&mut self, op: OpCode, mask: &[u8]) {}

    fn flush_stack(&mut self, op: OpCode, env: &mut CharStringEnv) {
        self.flush_args(op, env.arg_stack.as_slice());
        env.clear_stack();
    }

    fn process_hstem(&mut self, op: OpCode, env: &mut CharStringEnv) {
        env.hstem_count = env.hstem_count.saturating_add(env.arg_stack.stem_pairs());
        self.flush_stack(op, env);
    }

    fn process_vstem(&mut self, op: OpCode, env: &mut CharStringEnv) {
        env.vstem_count = env.vstem_count.saturating_add(env.arg_stack.stem_pairs());
        self.flush_stack(op, env);
    }

    fn process_moveto(&mut self, op: OpCode, env: &mut CharStringEnv) {
        if !env.seen_moveto {
            env.determine_hintmask_size();
            env.seen_moveto = true;
        }

        self.flush_stack(op, env);
    }
}

/// An operation set that only does the hint bookkeeping.
#[derive(Clone, Copy, Default, Debug)]
pub struct NoopOps;

impl CharStringOps for NoopOps {}

/// Applies a single operator to the environment.
pub fn process_op<O: CharStringOps + ?Sized>(
    ops: &mut O,
    op: OpCode,
    env: &mut CharStringEnv,
) -> Result<(), CffError> {
    trace!("{} {:?}", op, env.arg_stack);

    match op {
        RETURN => env.return_from_subr(),
        ENDCHAR => {
            env.set_endchar(true);
            Ok(())
        }
        FIXED_16_16 => env.arg_stack.push_fixed_from_stream(&mut env.stream),
        CALLSUBR => env.call_subr(env.local_subrs),
        CALLGSUBR => env.call_subr(env.global_subrs),
        HSTEM | HSTEMHM => {
            ops.process_hstem(op, env);
            Ok(())
        }
        VSTEM | VSTEMHM => {
            ops.process_vstem(op, env);
            Ok(())
        }
        HINTMASK | CNTRMASK => {
            env.determine_hintmask_size();
            ops.flush_stack(op, env);
            let size = env.hintmask_size as usize;
            let mask = env
                .stream
                .read_bytes(size)
                .ok_or(CffError::NotEnoughHintMaskData)?;
            ops.hint_mask(op, mask);
            Ok(())
        }
        RMOVETO | HMOVETO | VMOVETO | RLINETO | HLINETO | VLINETO => {
            ops.process_moveto(op, env);
            Ok(())
        }
        RRCURVETO | RCURVELINE | RLINECURVE | VVCURVETO | HHCURVETO | VHCURVETO | HVCURVETO
        | HFLEX | FLEX | HFLEX1 | FLEX1 => {
            ops.flush_stack(op, env);
            Ok(())
        }
        _ => arith::process_op(op, env),
    }
}
