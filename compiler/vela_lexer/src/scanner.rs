//! Main token driver.
//!
//! A hand-written byte-dispatch scanner over a sentinel-terminated
//! [`Cursor`]. Each dispatch arm consumes one token's bytes, emits the
//! token with its coordinate and the lexer state that holds after it,
//! and returns to the loop. String-like literal bodies are handled by
//! the methods in `literal.rs` and `heredoc.rs`, which share this
//! scanner's cursor, state, and pending-heredoc queue.

use std::collections::VecDeque;

use vela_ir::{Diagnostic, LexState, LineCol, Span, Token, TokenKind, TokenList};
use vela_lexer_core::{Cursor, PositionTracker};

use crate::heredoc::Heredoc;
use crate::literal::StringDelim;
use crate::{lex_error, state};

pub(crate) struct Scanner<'a> {
    pub(crate) cursor: Cursor<'a>,
    pub(crate) tracker: PositionTracker,
    /// Disambiguation context after the most recently emitted token.
    pub(crate) state: LexState,
    /// Kind of the most recently emitted token (trivia included).
    pub(crate) prev_kind: Option<TokenKind>,
    /// Heredocs opened on the current logical line, awaiting their
    /// bodies. FIFO: bodies resolve in open order at the next newline.
    pub(crate) pending: VecDeque<Heredoc>,
    /// Entries below this index belong to an enclosing body scan and are
    /// not ours to resolve; see [`drain_pending`](Self::drain_pending).
    pub(crate) pending_floor: usize,
    /// Brace depth per open interpolation, innermost last.
    pub(crate) embexpr_depth: Vec<u32>,
    pub(crate) tokens: Vec<Token>,
    /// Set when an end-of-script marker stops the scan.
    pub(crate) halted: bool,
}

impl<'a> Scanner<'a> {
    pub(crate) fn new(cursor: Cursor<'a>) -> Self {
        Self {
            cursor,
            tracker: PositionTracker::new(),
            state: LexState::Beg,
            prev_kind: None,
            pending: VecDeque::new(),
            pending_floor: 0,
            embexpr_depth: Vec::new(),
            tokens: Vec::new(),
            halted: false,
        }
    }

    /// Scan to end of input and return the position-sorted token list.
    pub(crate) fn run(mut self) -> TokenList {
        while self.scan_one() {}
        // Heredocs whose line never ended (no trailing newline) are
        // resolved — and reported — against the empty remainder.
        if !self.halted {
            self.drain_pending();
        }
        TokenList::from_vec(self.tokens)
    }

    // ─── Emission ────────────────────────────────────────────────────

    pub(crate) fn here(&self) -> LineCol {
        LineCol::new(self.tracker.line(), self.tracker.col())
    }

    /// Emit the bytes `[start, cursor)` with the table-derived state.
    pub(crate) fn emit(&mut self, kind: TokenKind, start: u32) {
        let next = state::after_token(kind, self.state, self.prev_kind);
        self.emit_with_state(kind, start, next);
    }

    /// Emit the bytes `[start, cursor)` with an explicit state.
    pub(crate) fn emit_with_state(&mut self, kind: TokenKind, start: u32, next: LexState) {
        let span = Span::new(start, self.cursor.pos());
        let pos = self.here();
        self.tracker.advance(self.cursor.bytes_from(start));
        self.state = next;
        self.prev_kind = Some(kind);
        self.tokens.push(Token::new(kind, span, pos, next));
    }

    /// Emit an error token for freshly consumed bytes. The state is left
    /// untouched: recovery continues as if the bytes had not been there.
    pub(crate) fn emit_error(&mut self, start: u32, diagnostic: Diagnostic) {
        let span = Span::new(start, self.cursor.pos());
        let pos = self.here();
        self.tracker.advance(self.cursor.bytes_from(start));
        self.prev_kind = Some(TokenKind::Error);
        self.tokens
            .push(Token::new(TokenKind::Error, span, pos, self.state).with_diagnostic(diagnostic));
    }

    /// Push an error token detected after the fact, pointing at bytes
    /// that were already emitted (or at end of input). Does not touch
    /// the tracker — the final position sort files it where it belongs.
    pub(crate) fn push_error(&mut self, span: Span, pos: LineCol, diagnostic: Diagnostic) {
        self.tokens
            .push(Token::new(TokenKind::Error, span, pos, self.state).with_diagnostic(diagnostic));
    }

    // ─── Dispatch ────────────────────────────────────────────────────

    /// Scan one token. Returns `false` at end of input or when an
    /// end-of-script marker halts the scan.
    pub(crate) fn scan_one(&mut self) -> bool {
        let start = self.cursor.pos();
        match self.cursor.current() {
            0 => {
                if !self.cursor.is_eof() {
                    // Interior NUL: end-of-script marker.
                    self.halted = true;
                }
                return false;
            }
            // ^D and ^Z also end the script.
            0x04 | 0x1a => {
                self.halted = true;
                return false;
            }
            b' ' | b'\t' | b'\x0b' | b'\x0c' => self.whitespace(start),
            b'\r' => self.carriage_return(start),
            b'\n' => self.newline(start),
            b'#' => self.comment(start),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' | 0x80..=0xFF => self.identifier(start),
            b'0'..=b'9' => self.number(start),
            b'@' => self.at_variable(start),
            b'$' => self.global_variable(start),
            b'"' => self.double_quote(start),
            b'\'' => self.single_quote(start),
            b':' => self.colon(start),
            b'%' => self.percent(start),
            b'<' => self.less(start),
            b'.' => self.dot(start),
            b'{' => self.left_brace(start),
            b'}' => self.right_brace(start),
            b'(' => self.single(start, TokenKind::LParen),
            b')' => self.single(start, TokenKind::RParen),
            b'[' => self.single(start, TokenKind::LBracket),
            b']' => self.single(start, TokenKind::RBracket),
            b',' => self.single(start, TokenKind::Comma),
            b';' => self.single(start, TokenKind::Semicolon),
            b'\\' => self.backslash(start),
            b'=' | b'!' | b'>' | b'+' | b'-' | b'*' | b'/' | b'&' | b'|' | b'^' | b'~'
            | b'?' => self.operator(start),
            b => self.invalid_byte(start, b),
        }
        true
    }

    /// Run the main dispatch inside an open interpolation until its
    /// closing brace pops the depth entry the caller pushed.
    pub(crate) fn scan_embexpr_body(&mut self) {
        let level = self.embexpr_depth.len();
        while self.embexpr_depth.len() >= level {
            if !self.scan_one() {
                if self.embexpr_depth.len() >= level {
                    self.embexpr_depth.truncate(level - 1);
                    if !self.halted {
                        let pos = self.here();
                        self.push_error(
                            Span::point(self.cursor.pos()),
                            pos,
                            lex_error::unterminated_embexpr(pos),
                        );
                    }
                }
                return;
            }
        }
    }

    /// Resolve every heredoc opened on the line that just ended, in
    /// open order. Entries below `pending_floor` were opened on an
    /// *enclosing* line (two openers on one line: the second body starts
    /// only after the first one's terminator) and are left for the
    /// enclosing drain. Bodies may open further heredocs through their
    /// interpolations; the body scanner raises the floor so it resolves
    /// exactly those before its outer body continues.
    pub(crate) fn drain_pending(&mut self) {
        while self.pending.len() > self.pending_floor {
            if let Some(h) = self.pending.remove(self.pending_floor) {
                self.scan_heredoc_body(&h);
                if self.halted {
                    return;
                }
            }
        }
    }

    // ─── Trivia ──────────────────────────────────────────────────────

    fn whitespace(&mut self, start: u32) {
        self.cursor
            .eat_while(|b| matches!(b, b' ' | b'\t' | b'\x0b' | b'\x0c'));
        // A whitespace run that meets end of input closes the program:
        // it is reported in the end state, not the running one.
        let next = if self.cursor.is_eof() {
            LexState::End
        } else {
            self.state
        };
        self.emit_with_state(TokenKind::Sp, start, next);
    }

    fn carriage_return(&mut self, start: u32) {
        self.cursor.advance();
        if self.cursor.current() == b'\n' {
            self.cursor.advance();
            self.emit_with_state(TokenKind::Newline, start, LexState::Beg);
            self.drain_pending();
        } else {
            // Lone CR: horizontal whitespace.
            self.emit_with_state(TokenKind::Sp, start, self.state);
        }
    }

    fn newline(&mut self, start: u32) {
        self.cursor.advance();
        self.emit_with_state(TokenKind::Newline, start, LexState::Beg);
        self.drain_pending();
    }

    fn comment(&mut self, start: u32) {
        self.cursor.advance();
        self.cursor.eat_until_newline_or_eof();
        self.emit_with_state(TokenKind::Comment, start, self.state);
    }

    fn backslash(&mut self, start: u32) {
        self.cursor.advance();
        if self.cursor.current() == b'\n' {
            // Line continuation: the newline does not end the logical
            // line, so pending heredocs keep waiting.
            self.cursor.advance();
            self.emit_with_state(TokenKind::Sp, start, self.state);
        } else if self.cursor.current() == b'\r' && self.cursor.peek() == b'\n' {
            self.cursor.advance_n(2);
            self.emit_with_state(TokenKind::Sp, start, self.state);
        } else {
            let pos = self.here();
            self.emit_error(start, lex_error::stray_backslash(pos));
        }
    }

    fn invalid_byte(&mut self, start: u32, byte: u8) {
        self.cursor.advance();
        let pos = self.here();
        self.emit_error(start, lex_error::invalid_byte(byte, pos));
    }

    // ─── Names ───────────────────────────────────────────────────────

    fn identifier(&mut self, start: u32) {
        let first = self.cursor.current();
        self.cursor.advance_char();
        self.eat_ident_continue();
        let text = self.cursor.slice_from(start);

        // `name:` in value/argument position is a label, keywords
        // included (`if: 1` is a hash entry, not a conditional).
        if matches!(self.state, LexState::Beg | LexState::Arg)
            && self.cursor.current() == b':'
            && self.cursor.peek() != b':'
        {
            self.cursor.advance();
            self.emit_with_state(TokenKind::Label, start, LexState::Beg);
            return;
        }

        if let Some(kw) = crate::keywords::lookup(text) {
            self.emit(TokenKind::Keyword(kw), start);
            return;
        }

        let kind = if first.is_ascii_uppercase() {
            TokenKind::Const
        } else {
            TokenKind::Ident
        };
        self.emit(kind, start);
    }

    pub(crate) fn eat_ident_continue(&mut self) {
        self.cursor.eat_while(is_ident_continue);
    }

    fn at_variable(&mut self, start: u32) {
        self.cursor.advance();
        let (kind, what) = if self.cursor.current() == b'@' {
            self.cursor.advance();
            (TokenKind::Cvar, "a class")
        } else {
            (TokenKind::Ivar, "an instance")
        };
        if is_ident_start(self.cursor.current()) {
            self.cursor.advance_char();
            self.eat_ident_continue();
            self.emit(kind, start);
        } else {
            // `@1` and friends: the sigil is the malformed part; the
            // digits re-enter the scan as an ordinary number.
            let mut spelling = self.cursor.slice_from(start).to_string();
            if self.cursor.current().is_ascii_digit() {
                spelling.push(char::from(self.cursor.current()));
            }
            let pos = self.here();
            self.emit_error(start, lex_error::malformed_variable(&spelling, what, pos));
        }
    }

    fn global_variable(&mut self, start: u32) {
        self.cursor.advance();
        let b = self.cursor.current();
        if is_ident_start(b) || b.is_ascii_digit() {
            self.cursor.advance_char();
            self.eat_ident_continue();
            self.emit(TokenKind::Gvar, start);
        } else {
            self.emit(TokenKind::Op, start);
        }
    }

    // ─── Numbers ─────────────────────────────────────────────────────

    fn number(&mut self, start: u32) {
        let first = self.cursor.current();
        self.cursor.advance();

        if first == b'0' {
            match self.cursor.current() {
                b'x' | b'X' if self.cursor.peek().is_ascii_hexdigit() => {
                    self.cursor.advance();
                    self.cursor.eat_while(|b| b.is_ascii_hexdigit() || b == b'_');
                    self.emit(TokenKind::Int, start);
                    return;
                }
                b'b' | b'B' if matches!(self.cursor.peek(), b'0' | b'1') => {
                    self.cursor.advance();
                    self.cursor
                        .eat_while(|b| b == b'0' || b == b'1' || b == b'_');
                    self.emit(TokenKind::Int, start);
                    return;
                }
                b'o' | b'O' if matches!(self.cursor.peek(), b'0'..=b'7') => {
                    self.cursor.advance();
                    self.cursor
                        .eat_while(|b| matches!(b, b'0'..=b'7') || b == b'_');
                    self.emit(TokenKind::Int, start);
                    return;
                }
                _ => {}
            }
        }

        self.eat_decimal_digits();

        // Fraction: a dot only joins the number when a digit follows —
        // `42.foo` is a method call, `42..` a range.
        if self.cursor.current() == b'.' && self.cursor.peek().is_ascii_digit() {
            self.cursor.advance();
            self.eat_decimal_digits();
            self.eat_exponent();
            self.emit(TokenKind::Float, start);
            return;
        }

        if matches!(self.cursor.current(), b'e' | b'E') && self.exponent_ahead() {
            self.eat_exponent();
            self.emit(TokenKind::Float, start);
            return;
        }

        self.emit(TokenKind::Int, start);
    }

    fn eat_decimal_digits(&mut self) {
        self.cursor.eat_while(|b| b.is_ascii_digit() || b == b'_');
    }

    fn exponent_ahead(&self) -> bool {
        let next = self.cursor.peek();
        next.is_ascii_digit()
            || (matches!(next, b'+' | b'-') && self.cursor.peek2().is_ascii_digit())
    }

    fn eat_exponent(&mut self) {
        if matches!(self.cursor.current(), b'e' | b'E') && self.exponent_ahead() {
            self.cursor.advance();
            if matches!(self.cursor.current(), b'+' | b'-') {
                self.cursor.advance();
            }
            self.eat_decimal_digits();
        }
    }

    // ─── Strings & symbols ───────────────────────────────────────────

    fn double_quote(&mut self, start: u32) {
        self.cursor.advance();
        self.emit_with_state(TokenKind::TstringBeg, start, self.state);
        self.scan_string_body(StringDelim::interpolated(b'"'));
    }

    fn single_quote(&mut self, start: u32) {
        self.cursor.advance();
        self.emit_with_state(TokenKind::TstringBeg, start, self.state);
        self.scan_string_body(StringDelim::raw(b'\''));
    }

    fn colon(&mut self, start: u32) {
        self.cursor.advance();
        match self.cursor.current() {
            b':' => {
                self.cursor.advance();
                self.emit_with_state(TokenKind::Op, start, LexState::Dot);
            }
            b'"' => {
                self.cursor.advance();
                self.emit_with_state(TokenKind::SymbolBeg, start, LexState::Fname);
                self.scan_string_body(StringDelim::interpolated(b'"'));
            }
            b'\'' => {
                self.cursor.advance();
                self.emit_with_state(TokenKind::SymbolBeg, start, LexState::Fname);
                self.scan_string_body(StringDelim::raw(b'\''));
            }
            b if is_ident_start(b) || b == b'@' || b == b'$' => {
                // Bare symbol: the introducer is its own token and the
                // name is scanned as whatever it is, in FNAME state.
                self.emit_with_state(TokenKind::SymbolBeg, start, LexState::Fname);
            }
            _ => self.emit(TokenKind::Op, start),
        }
    }

    fn percent(&mut self, start: u32) {
        if self.percent_literal_allowed() {
            let next = self.cursor.peek();
            if matches!(next, b'q' | b'Q') && is_percent_delim(self.cursor.peek2()) {
                let raw = next == b'q';
                self.cursor.advance_n(2);
                self.percent_literal(start, raw);
                return;
            }
            if is_percent_delim(next) {
                self.cursor.advance();
                self.percent_literal(start, false);
                return;
            }
        }
        self.cursor.advance();
        if self.cursor.current() == b'=' {
            self.cursor.advance();
        }
        self.emit(TokenKind::Op, start);
    }

    fn percent_literal_allowed(&self) -> bool {
        self.state.is_beg_like()
            || (self.state == LexState::Arg && self.prev_kind == Some(TokenKind::Sp))
    }

    /// Body of a `%`/`%Q`/`%q` literal. The cursor sits on the opening
    /// delimiter.
    fn percent_literal(&mut self, start: u32, raw: bool) {
        let open = self.cursor.current();
        self.cursor.advance();
        self.emit_with_state(TokenKind::TstringBeg, start, self.state);
        let close = matching_close(open);
        let delim = if raw {
            StringDelim::raw(close)
        } else {
            StringDelim::interpolated(close)
        };
        let delim = if open == close {
            delim
        } else {
            delim.nesting(open)
        };
        self.scan_string_body(delim);
    }

    // ─── Context-sensitive glyphs ────────────────────────────────────

    fn less(&mut self, start: u32) {
        if self.cursor.peek() == b'<' && self.heredoc_allowed() && self.try_heredoc(start) {
            return;
        }
        self.cursor.advance();
        match self.cursor.current() {
            b'=' => {
                self.cursor.advance();
                if self.cursor.current() == b'>' {
                    self.cursor.advance();
                }
            }
            b'<' => {
                self.cursor.advance();
                if self.cursor.current() == b'=' {
                    self.cursor.advance();
                }
            }
            _ => {}
        }
        self.emit(TokenKind::Op, start);
    }

    /// Whether `<<` may open a heredoc here: never after a completed
    /// value; in argument position only when whitespace separated it
    /// from the receiver-to-be (`a <<b` reads as a command argument,
    /// `a<<b` as a shift).
    fn heredoc_allowed(&self) -> bool {
        if self.state.is_end_like() {
            return false;
        }
        self.state.is_beg_like()
            || (self.state == LexState::Arg && self.prev_kind == Some(TokenKind::Sp))
    }

    fn dot(&mut self, start: u32) {
        self.cursor.advance();
        if self.cursor.current() == b'.' {
            self.cursor.advance();
            if self.cursor.current() == b'.' {
                self.cursor.advance();
            }
            self.emit(TokenKind::Op, start);
        } else {
            self.emit(TokenKind::Period, start);
        }
    }

    fn left_brace(&mut self, start: u32) {
        if let Some(depth) = self.embexpr_depth.last_mut() {
            *depth += 1;
        }
        self.cursor.advance();
        self.emit(TokenKind::LBrace, start);
    }

    fn right_brace(&mut self, start: u32) {
        if let Some(depth) = self.embexpr_depth.last_mut() {
            if *depth == 0 {
                // Closes the interpolation: the literal expression is a
                // complete value.
                self.embexpr_depth.pop();
                self.cursor.advance();
                self.emit_with_state(TokenKind::EmbexprEnd, start, LexState::End);
                return;
            }
            *depth -= 1;
            self.cursor.advance();
            self.emit(TokenKind::RBrace, start);
            return;
        }
        // Stray `}` with no interpolation open. Reported the way a
        // closing interpolation would be, state untouched — callers
        // scanning fragments rely on this.
        self.cursor.advance();
        self.emit_with_state(TokenKind::EmbexprEnd, start, self.state);
    }

    // ─── Operators ───────────────────────────────────────────────────

    fn single(&mut self, start: u32, kind: TokenKind) {
        self.cursor.advance();
        self.emit(kind, start);
    }

    fn operator(&mut self, start: u32) {
        let b = self.cursor.current();
        self.cursor.advance();
        match b {
            b'=' => match self.cursor.current() {
                b'=' => {
                    self.cursor.advance();
                    if self.cursor.current() == b'=' {
                        self.cursor.advance();
                    }
                }
                b'~' | b'>' => self.cursor.advance(),
                _ => {}
            },
            b'!' => {
                if matches!(self.cursor.current(), b'=' | b'~') {
                    self.cursor.advance();
                }
            }
            b'>' => match self.cursor.current() {
                b'=' => self.cursor.advance(),
                b'>' => {
                    self.cursor.advance();
                    self.eat_op_assign();
                }
                _ => {}
            },
            b'-' => {
                if self.cursor.current() == b'>' {
                    self.cursor.advance();
                } else {
                    self.eat_op_assign();
                }
            }
            b'+' | b'/' | b'^' => self.eat_op_assign(),
            b'*' => {
                if self.cursor.current() == b'*' {
                    self.cursor.advance();
                }
                self.eat_op_assign();
            }
            b'&' => match self.cursor.current() {
                b'&' => {
                    self.cursor.advance();
                    self.eat_op_assign();
                }
                b'.' => self.cursor.advance(),
                b'=' => self.cursor.advance(),
                _ => {}
            },
            b'|' => match self.cursor.current() {
                b'|' => {
                    self.cursor.advance();
                    self.eat_op_assign();
                }
                b'=' => self.cursor.advance(),
                _ => {}
            },
            _ => {} // `~`, `?`
        }
        self.emit(TokenKind::Op, start);
    }

    fn eat_op_assign(&mut self) {
        if self.cursor.current() == b'=' {
            self.cursor.advance();
        }
    }
}

/// 256-byte lookup table for identifier continuation bytes.
/// `true` for a-z, A-Z, 0-9, underscore, and all multi-byte lead and
/// continuation bytes. The sentinel (`0x00`) maps to `false`,
/// naturally terminating loops.
static IS_IDENT_CONTINUE_TABLE: [bool; 256] = {
    let mut table = [false; 256];
    let mut i = 0usize;
    while i < 256 {
        table[i] = matches!(
            i as u8,
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_' | 0x80..=0xFF
        );
        i += 1;
    }
    table
};

/// Returns `true` if `b` can continue an identifier.
#[inline]
pub(crate) fn is_ident_continue(b: u8) -> bool {
    IS_IDENT_CONTINUE_TABLE[b as usize]
}

/// Returns `true` if `b` can begin an identifier.
#[inline]
pub(crate) fn is_ident_start(b: u8) -> bool {
    matches!(b, b'a'..=b'z' | b'A'..=b'Z' | b'_' | 0x80..=0xFF)
}

/// Delimiters usable after `%`/`%q`/`%Q`: any ASCII punctuation except
/// `=` (which belongs to the modulo-assign operator).
fn is_percent_delim(b: u8) -> bool {
    b.is_ascii_punctuation() && b != b'=' && b != b'_'
}

/// Closing delimiter paired with `open`; identical for non-brackets.
fn matching_close(open: u8) -> u8 {
    match open {
        b'(' => b')',
        b'[' => b']',
        b'{' => b'}',
        b'<' => b'>',
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, reason = "test assertions use unwrap for clarity")]
mod tests;
