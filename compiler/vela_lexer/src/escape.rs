//! Escape-unit recognition for interpolated literal bodies.
//!
//! The literal scanner asks this module how many bytes the escape at the
//! cursor spans and whether it stays inside the current content run
//! ([`EscapeUnit::Plain`]) or must be flushed as its own content token
//! ([`EscapeUnit::Split`]). Nothing here is an error: escapes the
//! language does not recognize are still data, preserved verbatim —
//! downstream escape processing consumes them incrementally, and the
//! split boundary is what lets it do so.

use vela_lexer_core::Cursor;

/// Classification of one escape sequence.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum EscapeUnit {
    /// Recognized: `len` bytes (backslash included) stay in the current
    /// content run.
    Plain(u32),
    /// Peculiar: the current run is flushed and these `len` bytes form
    /// their own content token.
    Split(u32),
}

impl EscapeUnit {
    pub(crate) fn len(self) -> u32 {
        match self {
            EscapeUnit::Plain(len) | EscapeUnit::Split(len) => len,
        }
    }
}

/// Classify the escape starting at `cur`, which must sit on a backslash.
///
/// Operates on a cursor copy — the caller advances by the returned
/// length.
pub(crate) fn classify(mut cur: Cursor<'_>) -> EscapeUnit {
    let start = cur.pos();
    debug_assert_eq!(cur.current(), b'\\');
    cur.advance();
    let c = cur.current();
    match c {
        // Trailing backslash at EOF: one byte of plain content.
        0 if cur.is_eof() => EscapeUnit::Plain(1),
        // Single-letter escapes.
        b'n' | b't' | b'r' | b's' | b'a' | b'b' | b'e' | b'f' | b'v' => EscapeUnit::Plain(2),
        // Escaped line terminator (continuation).
        b'\n' | b'\r' => EscapeUnit::Plain(2),
        // Octal: up to three digits.
        b'0'..=b'7' => {
            cur.advance();
            let mut digits = 1;
            while digits < 3 && matches!(cur.current(), b'0'..=b'7') {
                cur.advance();
                digits += 1;
            }
            EscapeUnit::Plain(cur.pos() - start)
        }
        b'x' => {
            cur.advance();
            if cur.current().is_ascii_hexdigit() {
                cur.advance();
                if cur.current().is_ascii_hexdigit() {
                    cur.advance();
                }
                EscapeUnit::Plain(cur.pos() - start)
            } else {
                // `\x` with no digit: preserved verbatim, split off.
                EscapeUnit::Split(2)
            }
        }
        b'u' => classify_unicode(cur, start),
        b'C' | b'M' => {
            cur.advance();
            if cur.current() == b'-' {
                cur.advance();
                classify_ctrl_meta_target(cur, start)
            } else {
                // Missing dash: the letter consumed one operand anyway.
                EscapeUnit::Split(2 + operand_len(cur))
            }
        }
        b'c' => {
            cur.advance();
            classify_ctrl_short_target(cur, start)
        }
        // Unrecognized letters (and the digits 8/9 have no octal
        // meaning, but pass through unsplit like punctuation does).
        b'A'..=b'Z' | b'a'..=b'z' => EscapeUnit::Split(2),
        // Escaped punctuation, whitespace, or a multi-byte character:
        // the escape resolves to the character itself.
        _ => EscapeUnit::Plain(1 + Cursor::utf8_char_width(c)),
    }
}

/// `\uXXXX` or `\u{...}`; anything malformed splits as bare `\u`.
fn classify_unicode(mut cur: Cursor<'_>, start: u32) -> EscapeUnit {
    cur.advance(); // past 'u'
    if cur.current() == b'{' {
        let mut probe = cur;
        probe.advance();
        probe.eat_while(|b| b.is_ascii_hexdigit() || b == b' ');
        if probe.current() == b'}' {
            probe.advance();
            return EscapeUnit::Plain(probe.pos() - start);
        }
        return EscapeUnit::Split(2);
    }
    for _ in 0..4 {
        if !cur.current().is_ascii_hexdigit() {
            return EscapeUnit::Split(2);
        }
        cur.advance();
    }
    EscapeUnit::Plain(cur.pos() - start)
}

/// Target of a dashed `\C-` / `\M-`.
///
/// The target may itself be an escape (`\M-\C-x` chains); whatever it
/// is, the whole sequence is consumed into the current run — a
/// multi-byte target has no control/meta form, but the bytes are still
/// plain content.
fn classify_ctrl_meta_target(cur: Cursor<'_>, start: u32) -> EscapeUnit {
    let prefix = cur.pos() - start;
    match cur.current() {
        0 if cur.is_eof() => EscapeUnit::Plain(prefix),
        b'\\' => EscapeUnit::Plain(prefix + classify(cur).len()),
        b => EscapeUnit::Plain(prefix + Cursor::utf8_char_width(b)),
    }
}

/// Target of `\c`.
///
/// An ASCII target is a valid control escape. An escaped target is only
/// valid when the inner escape resolves to a single character (`\c\\`);
/// an inner letter escape (`\c\c`) is consumed but split off.
fn classify_ctrl_short_target(cur: Cursor<'_>, start: u32) -> EscapeUnit {
    let prefix = cur.pos() - start;
    match cur.current() {
        0 if cur.is_eof() => EscapeUnit::Split(prefix),
        b'\\' => {
            let mut probe = cur;
            probe.advance();
            let inner = probe.current();
            if inner.is_ascii_alphabetic() {
                EscapeUnit::Split(prefix + 2)
            } else {
                EscapeUnit::Plain(prefix + 1 + Cursor::utf8_char_width(inner))
            }
        }
        b if b < 0x80 => EscapeUnit::Plain(prefix + 1),
        b => EscapeUnit::Split(prefix + Cursor::utf8_char_width(b)),
    }
}

/// One operand after a dashless `\C`/`\M`: an escaped pair or a single
/// character. Zero at EOF.
fn operand_len(cur: Cursor<'_>) -> u32 {
    match cur.current() {
        0 if cur.is_eof() => 0,
        b'\\' => {
            let mut probe = cur;
            probe.advance();
            1 + Cursor::utf8_char_width(probe.current())
        }
        b => Cursor::utf8_char_width(b),
    }
}
