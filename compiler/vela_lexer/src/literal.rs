//! String-like literal bodies: quoted strings, quoted symbols, and
//! `%`-delimited literals.
//!
//! Content is emitted as runs, split only where downstream consumers
//! need a boundary: at interpolations and at peculiar escape units.
//! Newlines are ordinary content bytes — a quoted literal may span
//! lines, and the position tracker accounts for that when the run is
//! flushed. Tokens emitted inside a body carry the state that held when
//! the literal opened; only the closing delimiter moves it (to `End`).

use vela_ir::{LexState, Span, TokenKind};

use crate::escape::{self, EscapeUnit};
use crate::lex_error;
use crate::scanner::Scanner;

/// Delimiter description for one string-like body.
#[derive(Copy, Clone, Debug)]
pub(crate) struct StringDelim {
    /// Byte that closes the literal.
    pub(crate) close: u8,
    /// Opening byte, when it nests (`%(a (b) c)`).
    pub(crate) open: Option<u8>,
    /// Whether `#{...}` and escape sequences are live.
    pub(crate) interp: bool,
}

impl StringDelim {
    pub(crate) fn interpolated(close: u8) -> Self {
        StringDelim {
            close,
            open: None,
            interp: true,
        }
    }

    pub(crate) fn raw(close: u8) -> Self {
        StringDelim {
            close,
            open: None,
            interp: false,
        }
    }

    /// Enable bracket nesting for a distinct opening delimiter.
    pub(crate) fn nesting(mut self, open: u8) -> Self {
        self.open = Some(open);
        self
    }
}

impl Scanner<'_> {
    /// Scan a literal body up to and including its closing delimiter.
    ///
    /// The opening token has already been emitted and the cursor sits on
    /// the first body byte. An unterminated body produces its content
    /// tokens followed by an empty error token at end of input.
    pub(crate) fn scan_string_body(&mut self, d: StringDelim) {
        // Body tokens carry the state the literal opened in (a quoted
        // symbol keeps FNAME through its whole body), and scanning
        // returns to it after every interpolation.
        let body_state = self.state;
        let mut nest: u32 = 0;
        let mut run_start = self.cursor.pos();
        loop {
            let found = match (d.open, d.interp) {
                (Some(open), true) => self.cursor.skip_to_delim4(d.close, open, b'\\', b'#'),
                (Some(open), false) => self.cursor.skip_to_delim3(d.close, open, b'\\'),
                (None, true) => self.cursor.skip_to_delim3(d.close, b'\\', b'#'),
                (None, false) => self.cursor.skip_to_delim2(d.close, b'\\'),
            };
            match found {
                0 => {
                    self.flush_content(run_start, body_state);
                    if !self.halted {
                        let pos = self.here();
                        self.push_error(
                            Span::point(self.cursor.pos()),
                            pos,
                            lex_error::unterminated_string(pos),
                        );
                    }
                    return;
                }
                b if b == d.close => {
                    if nest == 0 {
                        self.flush_content(run_start, body_state);
                        let end_start = self.cursor.pos();
                        self.cursor.advance();
                        self.emit_with_state(TokenKind::TstringEnd, end_start, LexState::End);
                        return;
                    }
                    nest -= 1;
                    self.cursor.advance();
                }
                b'#' if d.interp && self.cursor.peek() == b'{' => {
                    self.flush_content(run_start, body_state);
                    self.open_embexpr();
                    if self.halted {
                        return;
                    }
                    self.state = body_state;
                    run_start = self.cursor.pos();
                }
                b'#' => self.cursor.advance(),
                b'\\' => {
                    if d.interp {
                        match escape::classify(self.cursor) {
                            EscapeUnit::Plain(len) => self.cursor.advance_n(len),
                            EscapeUnit::Split(len) => {
                                self.flush_content(run_start, body_state);
                                let unit_start = self.cursor.pos();
                                self.cursor.advance_n(len);
                                self.emit_with_state(
                                    TokenKind::TstringContent,
                                    unit_start,
                                    body_state,
                                );
                                run_start = self.cursor.pos();
                            }
                        }
                    } else {
                        // Raw literal: a backslash only escapes the
                        // closing delimiter and itself, and both stay in
                        // the content verbatim.
                        self.cursor.advance();
                        let c = self.cursor.current();
                        if c == d.close || c == b'\\' {
                            self.cursor.advance();
                        }
                    }
                }
                b => {
                    debug_assert_eq!(Some(b), d.open);
                    nest += 1;
                    self.cursor.advance();
                }
            }
        }
    }

    /// Emit the pending content run, if any, in the frozen literal state.
    pub(crate) fn flush_content(&mut self, run_start: u32, body_state: LexState) {
        if self.cursor.pos() > run_start {
            self.emit_with_state(TokenKind::TstringContent, run_start, body_state);
        }
    }

    /// Emit `#{`, scan the embedded expression, and return with the
    /// cursor after its closing brace.
    pub(crate) fn open_embexpr(&mut self) {
        let start = self.cursor.pos();
        self.cursor.advance_n(2);
        self.emit_with_state(TokenKind::EmbexprBeg, start, LexState::Beg);
        self.embexpr_depth.push(0);
        self.scan_embexpr_body();
    }
}
