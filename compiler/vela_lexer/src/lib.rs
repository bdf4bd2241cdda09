//! Lexer for the Vela language.
//!
//! Turns a source buffer into a complete, position-accurate [`TokenList`]:
//! concatenating the text of every emitted token reproduces the input
//! byte-for-byte, and scan-time faults surface as `Error` tokens carrying
//! a diagnostic instead of aborting the scan.
//!
//! The scanner is context-sensitive: it threads a [`vela_ir::LexState`]
//! value between tokens to disambiguate glyphs like `<<` (shift operator
//! vs. heredoc opener) and records the state on every token for
//! downstream consumers. Heredoc bodies — including squiggly dedenting
//! and heredocs opened from inside another heredoc's interpolation — are
//! resolved at line boundaries through a shared pending queue.
//!
//! # Example
//!
//! ```
//! let tokens = vela_lexer::lex("x = 1\n");
//! assert_eq!(tokens.reconstruct("x = 1\n"), "x = 1\n");
//! assert!(!tokens.has_errors());
//! ```

mod escape;
mod heredoc;
mod keywords;
mod lex_error;
mod literal;
mod scanner;
mod state;

use vela_ir::TokenList;
use vela_lexer_core::SourceBuffer;

use crate::scanner::Scanner;

/// Scan `source` into a token list.
///
/// The list contains every token, error tokens included, sorted by byte
/// position. Never fails: malformed input produces `Error` tokens and
/// scanning continues.
pub fn lex(source: &str) -> TokenList {
    let buf = SourceBuffer::new(source);
    Scanner::new(buf.cursor()).run()
}

/// Scan `source` and return the texts of all non-error tokens.
///
/// This is the round-trip view: for inputs without end-of-script
/// markers, joining the result reproduces the input exactly.
pub fn tokenize(source: &str) -> Vec<&str> {
    lex(source).texts(source)
}
