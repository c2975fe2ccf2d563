/*!
An interpreter for Type 2 charstrings, the glyph programs of CFF and CFF2 fonts.

The interpreter replays a charstring against a global and a local subroutine
INDEX and reports the path and hint operators to a [`cff::CharStringOps`]
implementation. Along the way it enforces the structural limits of the format:
operand stack depth, subroutine nesting and the number of bytes available
for every operand and hint mask.

The crate doesn't build outlines by itself. An outline builder, a hint
collector or a plain validator are all just different `CharStringOps`.

Nothing here allocates and no input can cause a panic.
*/

#![forbid(unsafe_code)]
#![warn(missing_debug_implementations)]

pub mod cff;
mod parser;

pub use parser::{Fixed, Stream};
