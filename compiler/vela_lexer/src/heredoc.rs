//! Heredoc openers, pending-body resolution, and squiggly dedenting.
//!
//! An opener only records a descriptor; the body is scanned when the
//! logical line it was opened on ends. Bodies are line-oriented: each
//! line is first tested against the terminator, then scanned for
//! content, interpolations, and escapes. A heredoc opened *inside* a
//! body line's interpolation lands on the same pending queue and is
//! resolved at that line's end, before the outer body continues — which
//! is how an inner terminator can appear textually before the outer one.
//!
//! Squiggly bodies take two passes: the first buffers per-line content
//! tokens and records each line's leading-blank width, the second marks
//! exactly the minimum width off every line's leading run as ignored
//! whitespace. The bytes all survive — only token boundaries move.

use vela_ir::{LexState, LineCol, Span, TokenKind};

use crate::escape::{self, EscapeUnit};
use crate::lex_error;
use crate::scanner::{is_ident_start, Scanner};

/// A heredoc that has been opened but whose body is not yet consumed.
#[derive(Clone, Debug)]
pub(crate) struct Heredoc {
    /// Terminator text (without any quoting).
    pub(crate) term: String,
    /// Span of the terminator text inside the opener token. Unterminated
    /// heredocs are reported against this span.
    pub(crate) term_span: Span,
    /// Coordinate of `term_span`.
    pub(crate) term_pos: LineCol,
    pub(crate) indent: Indent,
    pub(crate) quote: QuoteMode,
}

/// How body and terminator indentation is treated.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum Indent {
    /// Terminator at column 0; body indentation is content.
    Plain,
    /// Terminator may be indented; body indentation is content.
    Dash,
    /// Terminator may be indented; the common leading-blank width of the
    /// body is marked ignored.
    Squiggly,
}

/// Whether the body recognizes interpolation and escapes.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub(crate) enum QuoteMode {
    Interpolated,
    Raw,
}

/// Dedent bookkeeping for one squiggly body (pass one of two).
#[derive(Default)]
struct DedentBuffer {
    /// Minimum leading-blank width over lines that carry content.
    width: Option<u32>,
    lines: Vec<DedentLine>,
    /// The next flushed content token starts the current line.
    awaiting_first: bool,
}

struct DedentLine {
    /// Leading-blank byte count of the line.
    ws: u32,
    /// Index of the line's first content token, once flushed.
    first_token: Option<usize>,
}

impl DedentBuffer {
    /// Record a body line about to be scanned. `line` excludes the
    /// newline.
    fn observe_line(&mut self, line: &[u8]) {
        let ws = line
            .iter()
            .take_while(|&&b| b == b' ' || b == b'\t')
            .count();
        let ws = u32::try_from(ws).unwrap_or(u32::MAX);
        let blank = ws as usize == line.len();
        if blank && ws == 0 {
            // Truly empty line: nothing to dedent, does not affect the
            // minimum.
            self.awaiting_first = false;
            return;
        }
        if !blank {
            self.width = Some(self.width.map_or(ws, |w| w.min(ws)));
        }
        self.lines.push(DedentLine {
            ws,
            first_token: None,
        });
        self.awaiting_first = true;
    }

    /// A content token was flushed; if it is the first on its line, it
    /// owns the line's leading blanks.
    fn note_token(&mut self, idx: usize) {
        if self.awaiting_first {
            if let Some(line) = self.lines.last_mut() {
                line.first_token = Some(idx);
            }
            self.awaiting_first = false;
        }
    }
}

impl Scanner<'_> {
    /// Try to scan a heredoc opener at `start` (cursor on the first
    /// `<`). On failure the cursor is restored and the caller lexes an
    /// operator instead.
    pub(crate) fn try_heredoc(&mut self, start: u32) -> bool {
        let snapshot = self.cursor;
        self.cursor.advance_n(2);
        let indent = match self.cursor.current() {
            b'~' => {
                self.cursor.advance();
                Indent::Squiggly
            }
            b'-' => {
                self.cursor.advance();
                Indent::Dash
            }
            _ => Indent::Plain,
        };
        let (term_span, quote) = match self.cursor.current() {
            q @ (b'"' | b'\'') => {
                self.cursor.advance();
                let term_start = self.cursor.pos();
                self.cursor
                    .eat_while(move |b| b != q && b != b'\n' && b != 0);
                if self.cursor.current() != q || self.cursor.pos() == term_start {
                    self.cursor = snapshot;
                    return false;
                }
                let span = Span::new(term_start, self.cursor.pos());
                self.cursor.advance();
                let quote = if q == b'\'' {
                    QuoteMode::Raw
                } else {
                    QuoteMode::Interpolated
                };
                (span, quote)
            }
            b if is_ident_start(b) => {
                let term_start = self.cursor.pos();
                self.cursor.advance_char();
                self.eat_ident_continue();
                (
                    Span::new(term_start, self.cursor.pos()),
                    QuoteMode::Interpolated,
                )
            }
            _ => {
                self.cursor = snapshot;
                return false;
            }
        };

        let term_pos = LineCol::new(
            self.tracker.line(),
            self.tracker.col() + (term_span.start - start),
        );
        let term = self.cursor.slice(term_span.start, term_span.end).to_string();
        self.pending.push_back(Heredoc {
            term,
            term_span,
            term_pos,
            indent,
            quote,
        });
        self.emit_with_state(TokenKind::HeredocBeg, start, self.state);
        true
    }

    /// Scan one heredoc body. The cursor sits at the start of the line
    /// following the opener's logical line (or following an inner
    /// heredoc's terminator line).
    ///
    /// Raises the pending floor for the duration, so newline handling
    /// inside this body (and its interpolations) resolves only heredocs
    /// this body opened — siblings queued on the enclosing line wait for
    /// our terminator.
    pub(crate) fn scan_heredoc_body(&mut self, h: &Heredoc) {
        let saved_floor = self.pending_floor;
        self.pending_floor = self.pending.len();
        self.heredoc_body(h);
        self.pending_floor = saved_floor;
    }

    fn heredoc_body(&mut self, h: &Heredoc) {
        let interp = h.quote == QuoteMode::Interpolated;
        let squiggly = h.indent == Indent::Squiggly;
        // Body tokens carry the state that held when the body began
        // (BEG, since a newline just ended the opener's line), and
        // scanning returns to it after every interpolation.
        let body_state = self.state;
        let mut dedent = DedentBuffer::default();
        let mut run_start = self.cursor.pos();
        let mut at_line_start = true;

        loop {
            if at_line_start {
                if self.cursor.is_eof() || self.halted {
                    self.finish_unterminated(h, run_start, body_state, squiggly, &mut dedent);
                    return;
                }
                if self.is_terminator_line(h) {
                    self.flush_body_run(run_start, body_state, squiggly, &mut dedent);
                    let end_start = self.cursor.pos();
                    self.cursor.eat_until_newline_or_eof();
                    if self.cursor.current() == b'\n' {
                        self.cursor.advance();
                    }
                    self.emit_with_state(TokenKind::HeredocEnd, end_start, LexState::Beg);
                    if squiggly {
                        self.apply_dedent(&dedent);
                    }
                    return;
                }
                if squiggly {
                    dedent.observe_line(self.cursor.rest_of_line());
                }
                at_line_start = false;
            }

            let found = if interp {
                self.cursor.skip_to_delim3(b'\\', b'#', b'\n')
            } else {
                self.cursor.skip_to_delim2(b'\\', b'\n')
            };
            match found {
                0 => {
                    self.finish_unterminated(h, run_start, body_state, squiggly, &mut dedent);
                    return;
                }
                b'\n' => {
                    self.cursor.advance();
                    // Squiggly bodies buffer per line; the others only
                    // break the run when an inner heredoc must be
                    // resolved before the next line.
                    if squiggly || self.pending.len() > self.pending_floor {
                        self.flush_body_run(run_start, body_state, squiggly, &mut dedent);
                        run_start = self.cursor.pos();
                    }
                    if self.pending.len() > self.pending_floor {
                        self.drain_pending();
                        if self.halted {
                            return;
                        }
                        run_start = self.cursor.pos();
                    }
                    at_line_start = true;
                }
                b'#' => {
                    if interp && self.cursor.peek() == b'{' {
                        self.flush_body_run(run_start, body_state, squiggly, &mut dedent);
                        self.open_embexpr();
                        if self.halted {
                            return;
                        }
                        self.state = body_state;
                        run_start = self.cursor.pos();
                    } else {
                        self.cursor.advance();
                    }
                }
                b'\\' => {
                    if interp {
                        match escape::classify(self.cursor) {
                            EscapeUnit::Plain(len) => self.cursor.advance_n(len),
                            EscapeUnit::Split(len) => {
                                self.flush_body_run(run_start, body_state, squiggly, &mut dedent);
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
                        // Raw body: the backslash is plain content.
                        self.cursor.advance();
                    }
                }
                _ => unreachable!("delimiter skip stopped on a non-needle byte"),
            }
        }
    }

    /// End of input with the terminator still missing: flush what was
    /// scanned, report against the opener's terminator text, resume.
    fn finish_unterminated(
        &mut self,
        h: &Heredoc,
        run_start: u32,
        body_state: LexState,
        squiggly: bool,
        dedent: &mut DedentBuffer,
    ) {
        self.flush_body_run(run_start, body_state, squiggly, dedent);
        if !self.halted {
            self.push_error(
                h.term_span,
                h.term_pos,
                lex_error::unterminated_heredoc(&h.term, h.term_pos),
            );
        }
        if squiggly {
            self.apply_dedent(dedent);
        }
    }

    /// Does the line under the cursor terminate `h`?
    fn is_terminator_line(&self, h: &Heredoc) -> bool {
        let mut line = self.cursor.rest_of_line();
        if let [rest @ .., b'\r'] = line {
            line = rest;
        }
        let body = match h.indent {
            Indent::Plain => line,
            Indent::Dash | Indent::Squiggly => {
                let ws = line
                    .iter()
                    .take_while(|&&b| b == b' ' || b == b'\t')
                    .count();
                &line[ws..]
            }
        };
        body == h.term.as_bytes()
    }

    /// Emit the pending body run, if any, and record it for dedenting.
    fn flush_body_run(
        &mut self,
        run_start: u32,
        body_state: LexState,
        squiggly: bool,
        dedent: &mut DedentBuffer,
    ) {
        if self.cursor.pos() > run_start {
            self.emit_with_state(TokenKind::TstringContent, run_start, body_state);
            if squiggly {
                dedent.note_token(self.tokens.len() - 1);
            }
        }
    }

    /// Pass two of squiggly dedenting: split the computed width off each
    /// line-leading content token as `IgnoredSp`.
    fn apply_dedent(&mut self, dedent: &DedentBuffer) {
        let Some(width) = dedent.width else { return };
        if width == 0 {
            return;
        }
        let mut shift = 0usize;
        for line in &dedent.lines {
            let Some(first) = line.first_token else {
                continue;
            };
            let idx = first + shift;
            let k = line.ws.min(width);
            if k == 0 {
                continue;
            }
            debug_assert_eq!(self.tokens[idx].kind, TokenKind::TstringContent);
            if self.tokens[idx].span.len() <= k {
                // The token is nothing but leading blanks (the line went
                // straight into an interpolation).
                self.tokens[idx].kind = TokenKind::IgnoredSp;
            } else {
                let mut rest = self.tokens[idx].clone();
                rest.span.start += k;
                rest.pos.col += k;
                {
                    let tok = &mut self.tokens[idx];
                    tok.kind = TokenKind::IgnoredSp;
                    tok.span.end = rest.span.start;
                }
                self.tokens.insert(idx + 1, rest);
                shift += 1;
            }
        }
    }
}
