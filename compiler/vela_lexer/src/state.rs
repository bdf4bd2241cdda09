//! Lexer state transitions.
//!
//! One table, keyed by the kind of the token just classified (plus a
//! little context), decides the state recorded on that token and read by
//! the classifier for the next one. The literal scanner overrides the
//! table in the few places where the surrounding literal freezes the
//! state (body content) or forces it (`}` closing a real interpolation).

use vela_ir::{Keyword, LexState, TokenKind};

/// State after an ordinarily-classified token.
///
/// `prev` is the state the token was classified in; `prev_kind` is the
/// kind of the token immediately before it (used for the symbol-sigil
/// distinction: `:@a` ends in a different state than a bare `@a`).
pub(crate) fn after_token(
    kind: TokenKind,
    prev: LexState,
    prev_kind: Option<TokenKind>,
) -> LexState {
    match kind {
        TokenKind::Ident | TokenKind::Const => match prev {
            LexState::Fname => LexState::EndFn,
            _ => LexState::Arg,
        },
        TokenKind::Keyword(kw) => after_keyword(kw),
        TokenKind::Int | TokenKind::Float => LexState::End,
        TokenKind::Ivar | TokenKind::Cvar | TokenKind::Gvar => {
            if prev_kind == Some(TokenKind::SymbolBeg) {
                LexState::EndFn
            } else {
                LexState::End
            }
        }
        TokenKind::Period => LexState::Dot,
        TokenKind::Label => LexState::Beg,
        TokenKind::SymbolBeg => LexState::Fname,
        TokenKind::TstringEnd => LexState::End,
        // The terminator line swallows its newline, so a heredoc end is
        // also a line end.
        TokenKind::HeredocEnd => LexState::Beg,
        TokenKind::Newline => LexState::Beg,
        TokenKind::EmbexprBeg => LexState::Beg,
        TokenKind::LParen
        | TokenKind::LBracket
        | TokenKind::LBrace
        | TokenKind::Comma
        | TokenKind::Semicolon
        | TokenKind::Op => LexState::Beg,
        TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => LexState::End,
        // Trivia and literal-interior tokens leave the state alone; a
        // stray `}` (EmbexprEnd at depth zero) does too — the scanner
        // forces `End` itself when a real interpolation closes.
        TokenKind::Sp
        | TokenKind::IgnoredSp
        | TokenKind::Comment
        | TokenKind::TstringBeg
        | TokenKind::TstringContent
        | TokenKind::HeredocBeg
        | TokenKind::EmbexprEnd
        | TokenKind::Error => prev,
    }
}

/// State after a keyword.
pub(crate) fn after_keyword(kw: Keyword) -> LexState {
    match kw {
        Keyword::Def | Keyword::Alias | Keyword::Undef => LexState::Fname,
        Keyword::Class | Keyword::Module => LexState::Class,
        Keyword::End
        | Keyword::Nil
        | Keyword::True
        | Keyword::False
        | Keyword::SelfKw => LexState::End,
        Keyword::Super | Keyword::Yield => LexState::Arg,
        _ => LexState::Beg,
    }
}

#[cfg(test)]
mod tests;
