//! Shared data model for the Vela compiler front end.
//!
//! Defines source spans, line/column coordinates, the token vocabulary,
//! lexer states, and the materialized token list produced by `vela_lexer`.
//! Everything here is plain data: no scanning logic, no I/O.

mod pos;
mod span;
mod state;
mod token;

pub use pos::LineCol;
pub use span::Span;
pub use state::LexState;
pub use token::{Diagnostic, Keyword, Token, TokenKind, TokenList};
