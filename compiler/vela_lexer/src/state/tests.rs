use pretty_assertions::assert_eq;
use vela_ir::{Keyword, LexState, TokenKind};

use super::{after_keyword, after_token};

#[test]
fn ident_after_fname_ends_a_name() {
    assert_eq!(
        after_token(TokenKind::Ident, LexState::Fname, None),
        LexState::EndFn
    );
    assert_eq!(
        after_token(TokenKind::Ident, LexState::Beg, None),
        LexState::Arg
    );
    assert_eq!(
        after_token(TokenKind::Ident, LexState::Dot, None),
        LexState::Arg
    );
}

#[test]
fn sigil_variables_distinguish_symbol_context() {
    // `@a` completes a value; `:@a` completes a name.
    assert_eq!(
        after_token(TokenKind::Ivar, LexState::Beg, None),
        LexState::End
    );
    assert_eq!(
        after_token(TokenKind::Ivar, LexState::Fname, Some(TokenKind::SymbolBeg)),
        LexState::EndFn
    );
    assert_eq!(
        after_token(TokenKind::Cvar, LexState::Fname, Some(TokenKind::SymbolBeg)),
        LexState::EndFn
    );
}

#[test]
fn period_expects_a_method_name() {
    assert_eq!(
        after_token(TokenKind::Period, LexState::End, None),
        LexState::Dot
    );
}

#[test]
fn trivia_leaves_state_alone() {
    for kind in [
        TokenKind::Sp,
        TokenKind::IgnoredSp,
        TokenKind::Comment,
        TokenKind::TstringBeg,
        TokenKind::TstringContent,
        TokenKind::HeredocBeg,
        TokenKind::Error,
    ] {
        assert_eq!(after_token(kind, LexState::Arg, None), LexState::Arg);
        assert_eq!(after_token(kind, LexState::Fname, None), LexState::Fname);
    }
}

#[test]
fn line_enders_reset_to_beg() {
    assert_eq!(
        after_token(TokenKind::Newline, LexState::End, None),
        LexState::Beg
    );
    assert_eq!(
        after_token(TokenKind::HeredocEnd, LexState::End, None),
        LexState::Beg
    );
}

#[test]
fn keyword_states() {
    assert_eq!(after_keyword(Keyword::Def), LexState::Fname);
    assert_eq!(after_keyword(Keyword::Alias), LexState::Fname);
    assert_eq!(after_keyword(Keyword::Class), LexState::Class);
    assert_eq!(after_keyword(Keyword::End), LexState::End);
    assert_eq!(after_keyword(Keyword::Nil), LexState::End);
    assert_eq!(after_keyword(Keyword::If), LexState::Beg);
    assert_eq!(after_keyword(Keyword::Do), LexState::Beg);
    assert_eq!(after_keyword(Keyword::Yield), LexState::Arg);
}
