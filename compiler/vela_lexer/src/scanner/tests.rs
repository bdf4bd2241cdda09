use pretty_assertions::assert_eq;
use proptest::prelude::*;
use vela_ir::{Keyword, LexState, TokenKind};

use crate::lex;

/// Kinds of every token, error tokens included.
fn kinds(source: &str) -> Vec<TokenKind> {
    lex(source).iter().map(|t| t.kind).collect()
}

/// Kinds of non-error tokens.
fn event_kinds(source: &str) -> Vec<TokenKind> {
    lex(source)
        .iter()
        .filter(|t| !t.kind.is_error())
        .map(|t| t.kind)
        .collect()
}

/// `(line, col, kind, text, state)` for every token.
fn rows(source: &str) -> Vec<(u32, u32, TokenKind, String, LexState)> {
    lex(source)
        .iter()
        .map(|t| {
            (
                t.pos.line,
                t.pos.col,
                t.kind,
                t.text(source).to_string(),
                t.state,
            )
        })
        .collect()
}

fn assert_round_trip(source: &str) {
    assert_eq!(
        lex(source).reconstruct(source),
        source,
        "round trip for {source:?}"
    );
}

// ─── Basics ──────────────────────────────────────────────────────────

#[test]
fn empty_source_yields_no_tokens() {
    assert!(lex("").is_empty());
}

#[test]
fn assignment_stream() {
    assert_eq!(
        rows("x = 42"),
        vec![
            (1, 0, TokenKind::Ident, "x".into(), LexState::Arg),
            (1, 1, TokenKind::Sp, " ".into(), LexState::Arg),
            (1, 2, TokenKind::Op, "=".into(), LexState::Beg),
            (1, 3, TokenKind::Sp, " ".into(), LexState::Beg),
            (1, 4, TokenKind::Int, "42".into(), LexState::End),
        ]
    );
}

#[test]
fn round_trip_assorted_sources() {
    let sources = [
        "",
        "x",
        "x = 1 + 2\ny = x * 3\n",
        "def greet(name)\n  \"hi #{name}\"\nend\n",
        "# comment\nfoo. bar(1, 2)\n",
        "a << b << c",
        "%w is not a thing % 5",
        "  \t\n  \r\n  ",
        "@a @@b $c :d ::E",
        "'raw \\' string' + \"cooked\"",
    ];
    for source in sources {
        assert_round_trip(source);
    }
}

#[test]
fn positions_are_monotonic_and_newlines_reset_columns() {
    let source = "foo\n  bar baz\nqux";
    let list = lex(source);
    let mut prev = (0u32, 0u32);
    for tok in &list {
        let here = (tok.pos.line, tok.pos.col);
        assert!(here >= prev, "position went backwards at {tok:?}");
        prev = here;
    }
    let bar = &list[3];
    assert_eq!((bar.pos.line, bar.pos.col), (2, 2));
    let qux = list.last().unwrap();
    assert_eq!((qux.pos.line, qux.pos.col), (3, 0));
}

// ─── Sigil variables & symbol context ────────────────────────────────

#[test]
fn state_after_ivar() {
    let t = lex("@a");
    let last = t.last().unwrap();
    assert_eq!(
        (last.pos.col, last.kind, last.state),
        (0, TokenKind::Ivar, LexState::End)
    );

    let t = lex(":@a");
    let last = t.last().unwrap();
    assert_eq!(
        (last.pos.col, last.kind, last.state),
        (1, TokenKind::Ivar, LexState::EndFn)
    );

    // `@1` is not a variable name: the sigil errors, the digit scans on.
    let t = lex("@1");
    assert!(t.has_errors());
    let last = t.last().unwrap();
    assert_eq!(
        (last.pos.col, last.kind, last.state),
        (1, TokenKind::Int, LexState::End)
    );

    let t = lex(":@1");
    let last = t.last().unwrap();
    assert_eq!((last.pos.col, last.kind), (2, TokenKind::Int));
}

#[test]
fn state_after_cvar() {
    let t = lex("@@a");
    let last = t.last().unwrap();
    assert_eq!(
        (last.pos.col, last.kind, last.state),
        (0, TokenKind::Cvar, LexState::End)
    );

    let t = lex(":@@a");
    let last = t.last().unwrap();
    assert_eq!(
        (last.pos.col, last.kind, last.state),
        (1, TokenKind::Cvar, LexState::EndFn)
    );

    let t = lex("@@1");
    let last = t.last().unwrap();
    assert_eq!((last.pos.col, last.kind), (2, TokenKind::Int));

    let t = lex(":@@1");
    let last = t.last().unwrap();
    assert_eq!((last.pos.col, last.kind), (3, TokenKind::Int));
}

#[test]
fn global_variables() {
    assert_eq!(kinds("$x"), vec![TokenKind::Gvar]);
    assert_eq!(lex("$x").last().unwrap().state, LexState::End);
    assert_eq!(
        kinds(":$x"),
        vec![TokenKind::SymbolBeg, TokenKind::Gvar]
    );
    assert_eq!(lex(":$x").last().unwrap().state, LexState::EndFn);
}

#[test]
fn bare_symbol_is_introducer_plus_name() {
    assert_eq!(
        rows(":foo"),
        vec![
            (1, 0, TokenKind::SymbolBeg, ":".into(), LexState::Fname),
            (1, 1, TokenKind::Ident, "foo".into(), LexState::EndFn),
        ]
    );
}

// ─── Heredoc opener gate ─────────────────────────────────────────────

#[test]
fn heredoc_after_command_name_with_space() {
    // `a <<b` reads as a command argument: the opener wins.
    assert_eq!(
        event_kinds("a <<b"),
        vec![TokenKind::Ident, TokenKind::Sp, TokenKind::HeredocBeg]
    );
    let list = lex("a <<b");
    let err = list.errors().next().unwrap();
    assert_eq!(
        err.diagnostic.as_deref().unwrap().message,
        "can't find string \"b\" anywhere before EOF"
    );
}

#[test]
fn shift_after_completed_value() {
    assert_eq!(
        kinds("1 <<b"),
        vec![TokenKind::Int, TokenKind::Sp, TokenKind::Op, TokenKind::Ident]
    );
}

#[test]
fn shift_without_separating_space() {
    assert_eq!(
        kinds("a<<b"),
        vec![TokenKind::Ident, TokenKind::Op, TokenKind::Ident]
    );
}

#[test]
fn shift_when_space_follows() {
    assert_eq!(
        kinds("a << b"),
        vec![
            TokenKind::Ident,
            TokenKind::Sp,
            TokenKind::Op,
            TokenKind::Sp,
            TokenKind::Ident
        ]
    );
}

#[test]
fn operator_method_name_after_def() {
    let k = kinds("def <<(other)");
    assert_eq!(k[0], TokenKind::Keyword(Keyword::Def));
    assert_eq!(k[2], TokenKind::Op);
    assert_eq!(k[3], TokenKind::LParen);
}

// ─── Error recovery ──────────────────────────────────────────────────

#[test]
fn token_after_error_heredoc() {
    // The terminator `A` is never found: the error is reported against
    // the terminator text inside the opener, and scanning resumes with
    // the rest of the line intact.
    let source = "<<A.upcase\n";
    assert_eq!(
        rows(source),
        vec![
            (1, 0, TokenKind::HeredocBeg, "<<A".into(), LexState::Beg),
            (1, 2, TokenKind::Error, "A".into(), LexState::Beg),
            (1, 3, TokenKind::Period, ".".into(), LexState::Dot),
            (1, 4, TokenKind::Ident, "upcase".into(), LexState::Arg),
            (1, 10, TokenKind::Newline, "\n".into(), LexState::Beg),
        ]
    );
    let list = lex(source);
    let err = list.errors().next().unwrap();
    assert_eq!(
        err.diagnostic.as_deref().unwrap().message,
        "can't find string \"A\" anywhere before EOF"
    );
    // The error token overlaps the opener; the next token starts at the
    // byte right after the error's text and nothing is lost.
    assert_round_trip(source);
}

#[test]
fn error_token_is_followed_by_a_different_kind() {
    let list = lex("<<A.upcase\n");
    let idx = list
        .iter()
        .position(|t| t.kind.is_error())
        .unwrap();
    assert_ne!(list[idx + 1].kind, TokenKind::Error);
}

#[test]
fn stray_backslash_errors_and_scanning_continues() {
    let list = lex("\\x");
    assert_eq!(kinds("\\x"), vec![TokenKind::Error, TokenKind::Ident]);
    assert_eq!(
        list.errors().next().unwrap().diagnostic.as_deref().unwrap().message,
        "unexpected backslash"
    );
    assert_round_trip("\\x");
}

#[test]
fn line_continuation_is_whitespace() {
    assert_eq!(
        kinds("a \\\n b"),
        vec![
            TokenKind::Ident,
            TokenKind::Sp,
            TokenKind::Sp,
            TokenKind::Sp,
            TokenKind::Ident
        ]
    );
    assert_round_trip("a \\\n b");
}

#[test]
fn invalid_control_byte_errors() {
    let list = lex("\u{1}x");
    assert!(list.has_errors());
    assert_eq!(list.last().unwrap().kind, TokenKind::Ident);
}

// ─── End-of-script markers ───────────────────────────────────────────

#[test]
fn end_of_script_chars_stop_the_scan() {
    for (src, append) in [("a", ""), ("[a", "]"), ("{,", "}"), ("if", "")] {
        let expected = kinds(src);
        for eof in ["\0b", "\u{4}b", "\u{1a}b"] {
            let full = format!("{src}{eof}{append}");
            assert_eq!(kinds(&full), expected, "for {full:?}");
        }
    }
}

// ─── Whitespace & newline states ─────────────────────────────────────

#[test]
fn spaces_at_end_of_input_are_reported_in_end_state() {
    assert_eq!(
        rows("1\n\t \t"),
        vec![
            (1, 0, TokenKind::Int, "1".into(), LexState::End),
            (1, 1, TokenKind::Newline, "\n".into(), LexState::Beg),
            (2, 0, TokenKind::Sp, "\t \t".into(), LexState::End),
        ]
    );
}

#[test]
fn crlf_is_one_newline_token() {
    let r = rows("a\r\nb");
    assert_eq!(r[1], (1, 1, TokenKind::Newline, "\r\n".into(), LexState::Beg));
    assert_eq!(r[2].0, 2);
}

// ─── Stray closing brace ─────────────────────────────────────────────

#[test]
fn trailing_embexpr_end_keeps_state() {
    // Scanning a template-engine fragment whose body works like
    // trailing method arguments.
    let list = lex("a( foo, bar: baz }");
    let last = list.last().unwrap();
    assert_eq!(
        (last.pos.line, last.pos.col, last.kind, last.state),
        (1, 17, TokenKind::EmbexprEnd, LexState::Arg)
    );
    assert!(list.iter().any(|t| t.kind == TokenKind::Label));
}

// ─── Names, labels, keywords ─────────────────────────────────────────

#[test]
fn constants_are_distinct_from_identifiers() {
    assert_eq!(
        kinds("Foo::bar"),
        vec![TokenKind::Const, TokenKind::Op, TokenKind::Ident]
    );
    let list = lex("Foo::bar");
    assert_eq!(list[1].state, LexState::Dot);
}

#[test]
fn labels_in_argument_position() {
    assert_eq!(
        kinds("f key: 1"),
        vec![
            TokenKind::Ident,
            TokenKind::Sp,
            TokenKind::Label,
            TokenKind::Sp,
            TokenKind::Int
        ]
    );
    // Keywords label too: `if: 1` is a hash entry.
    let k = kinds("{ if: 1 }");
    assert_eq!(k[2], TokenKind::Label);
}

#[test]
fn keyword_states_flow_through_definitions() {
    let list = lex("def req(true) end");
    assert_eq!(list[0].kind, TokenKind::Keyword(Keyword::Def));
    assert_eq!(list[0].state, LexState::Fname);
    assert_eq!(list[2].state, LexState::EndFn); // method name
    let last = list.last().unwrap();
    assert_eq!(last.kind, TokenKind::Keyword(Keyword::End));
    assert_eq!(last.state, LexState::End);
}

#[test]
fn dot_call_state_chain() {
    let r = rows("x.upcase");
    assert_eq!(r[1], (1, 1, TokenKind::Period, ".".into(), LexState::Dot));
    assert_eq!(r[2].4, LexState::Arg);
}

// ─── Numbers & operators ─────────────────────────────────────────────

#[test]
fn numeric_literals() {
    assert_eq!(kinds("1_000"), vec![TokenKind::Int]);
    assert_eq!(kinds("3.14"), vec![TokenKind::Float]);
    assert_eq!(kinds("1.0e-5"), vec![TokenKind::Float]);
    assert_eq!(kinds("1e5"), vec![TokenKind::Float]);
    assert_eq!(kinds("0xFF"), vec![TokenKind::Int]);
    assert_eq!(kinds("0b1010"), vec![TokenKind::Int]);
    assert_eq!(kinds("0o755"), vec![TokenKind::Int]);
}

#[test]
fn dot_after_int_is_not_a_fraction() {
    assert_eq!(
        kinds("42.foo"),
        vec![TokenKind::Int, TokenKind::Period, TokenKind::Ident]
    );
    assert_eq!(kinds("42..43"), vec![TokenKind::Int, TokenKind::Op, TokenKind::Int]);
}

#[test]
fn exponent_needs_a_digit() {
    assert_eq!(kinds("1e"), vec![TokenKind::Int, TokenKind::Ident]);
}

#[test]
fn compound_operators_are_single_tokens() {
    for op in [
        "==", "===", "!=", "=~", "!~", "<=", "<=>", ">=", ">>", "**", "&&", "||", "+=",
        "-=", "||=", "&&=", "<<=", "->", "=>", "..", "...", "&.",
    ] {
        let source = format!("a {op} b");
        let list = lex(&source);
        assert_eq!(list[2].kind, TokenKind::Op, "{op}");
        assert_eq!(list[2].text(&source), op, "{op}");
    }
}

#[test]
fn shift_assign_is_not_a_heredoc() {
    // `=` cannot start a terminator, so the opener probe backs off.
    assert_eq!(
        kinds("a <<= b"),
        vec![
            TokenKind::Ident,
            TokenKind::Sp,
            TokenKind::Op,
            TokenKind::Sp,
            TokenKind::Ident
        ]
    );
}

#[test]
fn comments_leave_state_alone() {
    let r = rows("# note\nx");
    assert_eq!(r[0], (1, 0, TokenKind::Comment, "# note".into(), LexState::Beg));
    assert_eq!(r[1].2, TokenKind::Newline);
    assert_eq!(r[2].2, TokenKind::Ident);
}

#[test]
fn multibyte_identifiers_count_byte_columns() {
    let source = "あ = 1";
    let r = rows(source);
    assert_eq!(r[0].2, TokenKind::Ident);
    assert_eq!(r[1], (1, 3, TokenKind::Sp, " ".into(), LexState::Arg));
}

// ─── Properties ──────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn round_trip_holds_for_arbitrary_printable_input(
        source in "[ -~\n\t]{0,120}"
    ) {
        prop_assert_eq!(lex(&source).reconstruct(&source), source);
    }

    #[test]
    fn positions_never_go_backwards(source in "[ -~\n]{0,100}") {
        let list = lex(&source);
        let mut prev = (0u32, 0u32);
        for tok in &list {
            let here = (tok.pos.line, tok.pos.col);
            prop_assert!(here >= prev, "{:?} after {:?}", here, prev);
            prev = here;
        }
    }
}
