//! The opaque downstream grammar parser collaborator (`spec.md` §1, §6).
//!
//! The grammar productions themselves are explicitly out of scope
//! (`spec.md` §1). What the facade needs from the grammar is exactly two
//! re-entrant calls: parse a `pragma` directive, and parse a
//! block-reference argument list. Both are expressed as one trait so the
//! facade can be constructed generically over whichever grammar a caller
//! plugs in, mirroring how the teacher's pipeline keeps transformation
//! steps behind a `Box<dyn StreamMapper>` seam instead of hard-coding one
//! implementation.

use crate::argmap::ArgMap;
use crate::error::LexResult;
use crate::facade::LexerFacade;

/// Re-entrant collaborator the facade calls into for the two
/// sub-grammars it cannot resolve on its own (`spec.md` §6).
pub trait GrammarParser {
    /// Parse a `pragma` directive immediately after the `@` marker.
    /// Called with the facade positioned so that `facade.next()` yields
    /// the first token of the pragma body.
    fn parse_pragma(&mut self, facade: &mut LexerFacade) -> LexResult<()>;

    /// Parse a block-reference argument list, `(k1(v1) k2(v2) …)`,
    /// immediately after a block-reference identifier. Returns the
    /// parsed arguments.
    fn parse_block_ref_args(&mut self, facade: &mut LexerFacade) -> LexResult<ArgMap>;
}
