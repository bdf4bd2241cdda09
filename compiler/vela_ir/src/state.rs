//! Lexer disambiguation state.
//!
//! The scanner carries one of these values between tokens and uses it to
//! resolve glyphs whose meaning depends on what came immediately before
//! (`<<` as shift vs. heredoc opener, `ident:` as label, and so on).
//! Every emitted token records the state that held *after* it.

use std::fmt;

/// Scanner context after the most recently emitted token.
///
/// Deliberately an opaque enum rather than a bitset of independent flags:
/// exactly one context holds at a time.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum LexState {
    /// Beginning of an expression — a value is expected next.
    #[default]
    Beg,
    /// A complete value was just produced.
    End,
    /// A definition-name-like token just completed (symbol content,
    /// sigil variable after `:`). Distinct from `End` so downstream
    /// consumers can tell `:@a` apart from a bare `@a`.
    EndFn,
    /// Argument position: a value token appeared where a bare command
    /// argument may follow.
    Arg,
    /// Immediately after `.` or `::` — a method name is expected.
    Dot,
    /// After `class`/`module` — a constant path is expected.
    Class,
    /// After `def`/`alias`/`undef` or a symbol introducer — an
    /// identifier-or-operator method name is expected.
    Fname,
}

impl LexState {
    /// States in which a value is expected and `<<` always opens a heredoc.
    #[inline]
    pub fn is_beg_like(self) -> bool {
        matches!(self, LexState::Beg | LexState::Class)
    }

    /// States in which the previous construct is complete and `<<` can
    /// only be an operator.
    #[inline]
    pub fn is_end_like(self) -> bool {
        matches!(self, LexState::End | LexState::EndFn)
    }
}

impl fmt::Display for LexState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LexState::Beg => "BEG",
            LexState::End => "END",
            LexState::EndFn => "ENDFN",
            LexState::Arg => "ARG",
            LexState::Dot => "DOT",
            LexState::Class => "CLASS",
            LexState::Fname => "FNAME",
        };
        f.write_str(name)
    }
}
