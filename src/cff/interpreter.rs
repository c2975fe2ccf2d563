//! The fetch-dispatch loop.

use log::warn;

use super::env::CharStringEnv;
use super::index::Index;
use super::operator::OpCode;
use super::opset::{process_op, CharStringOps};
use super::CffError;

/// Interpretation state.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum State {
    Running,
    Done,
    Failed(CffError),
}

/// Runs a single charstring.
///
/// # Example
///
/// ```
/// use cff_charstring::cff::{CharStringInterpreter, Index, NoopOps, State};
///
/// // 10 20 hstem 5 5 rmoveto endchar
/// let charstring = [149, 159, 1, 144, 144, 21, 14];
/// let mut interpreter =
///     CharStringInterpreter::new(&charstring, Index::default(), Index::default());
/// interpreter.interpret(&mut NoopOps).unwrap();
/// assert_eq!(interpreter.state(), State::Done);
/// assert_eq!(interpreter.env().hstem_count, 1);
/// ```
#[derive(Clone, Debug)]
pub struct CharStringInterpreter<'a> {
    env: CharStringEnv<'a>,
    state: State,
}

impl<'a> CharStringInterpreter<'a> {
    pub fn new(charstring: &'a [u8], global_subrs: Index<'a>, local_subrs: Index<'a>) -> Self {
        CharStringInterpreter {
            env: CharStringEnv::new(charstring, global_subrs, local_subrs),
            state: State::Running,
        }
    }

    /// Interprets operators until `endchar` or the first error.
    ///
    /// Nothing produced by `ops` should be trusted after a failure.
    pub fn interpret<O: CharStringOps + ?Sized>(&mut self, ops: &mut O) -> Result<(), CffError> {
        self.env.set_endchar(false);
        self.state = State::Running;

        match self.run(ops) {
            Ok(()) => {
                self.state = State::Done;
                Ok(())
            }
            Err(e) => {
                warn!("failed to interpret a charstring: {}", e);
                self.state = State::Failed(e);
                Err(e)
            }
        }
    }

    fn run<O: CharStringOps + ?Sized>(&mut self, ops: &mut O) -> Result<(), CffError> {
        loop {
            let op = self.env.fetch_op()?;
            process_op(ops, op, &mut self.env)?;
            if self.env.is_endchar() {
                return Ok(());
            }
        }
    }

    #[inline]
    pub fn state(&self) -> State {
        self.state
    }

    #[inline]
    pub fn env(&self) -> &CharStringEnv<'a> {
        &self.env
    }

    /// Gives access to the environment, e.g. to adjust the hint state
    /// before interpreting.
    #[inline]
    pub fn env_mut(&mut self) -> &mut CharStringEnv<'a> {
        &mut self.env
    }

    #[inline]
    pub fn into_env(self) -> CharStringEnv<'a> {
        self.env
    }
}

/// Hint metadata of a charstring.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct HintInfo {
    pub hstem_count: u32,
    pub vstem_count: u32,
    /// Hint mask length in bytes, if any mask or implicit vstems were seen.
    pub hintmask_size: Option<u32>,
    /// Number of `hintmask` and `cntrmask` operators.
    pub mask_count: u32,
}

#[derive(Default)]
struct MaskCounter(u32);

impl CharStringOps for MaskCounter {
    fn hint_mask(&mut self, _: OpCode, _: &[u8]) {
        self.0 += 1;
    }
}

/// Collects hint metadata without building an outline.
pub fn hint_info<'a>(
    charstring: &'a [u8],
    global_subrs: Index<'a>,
    local_subrs: Index<'a>,
) -> Result<HintInfo, CffError> {
    let mut counter = MaskCounter::default();
    let mut interpreter = CharStringInterpreter::new(charstring, global_subrs, local_subrs);
    interpreter.interpret(&mut counter)?;

    let env = interpreter.env();
    Ok(HintInfo {
        hstem_count: env.hstem_count,
        vstem_count: env.vstem_count,
        hintmask_size: if env.seen_hintmask {
            Some(env.hintmask_size)
        } else {
            None
        },
        mask_count: counter.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cff::NoopOps;

    #[test]
    fn empty_charstring() {
        let mut interpreter = CharStringInterpreter::new(&[], Index::default(), Index::default());
        assert_eq!(
            interpreter.interpret(&mut NoopOps),
            Err(CffError::MissingEndChar)
        );
        assert_eq!(interpreter.state(), State::Failed(CffError::MissingEndChar));
    }

    #[test]
    fn stops_at_endchar() {
        // endchar followed by garbage that is never read
        let data = [14, 0xFF];
        let mut interpreter = CharStringInterpreter::new(&data, Index::default(), Index::default());
        interpreter.interpret(&mut NoopOps).unwrap();
        assert_eq!(interpreter.state(), State::Done);
        assert_eq!(interpreter.env().stream.offset(), 1);
    }

    #[test]
    fn hint_info_counts_masks() {
        // 1 2 hstem hintmask 0x80 cntrmask 0x40 endchar
        let data = [140, 141, 1, 19, 0x80, 20, 0x40, 14];
        let info = hint_info(&data, Index::default(), Index::default()).unwrap();
        assert_eq!(
            info,
            HintInfo {
                hstem_count: 1,
                vstem_count: 0,
                hintmask_size: Some(1),
                mask_count: 2,
            }
        );
    }

    #[test]
    fn hint_info_without_masks() {
        let data = [14];
        let info = hint_info(&data, Index::default(), Index::default()).unwrap();
        assert_eq!(info, HintInfo::default());
    }
}
