//! Zero-cost cursor over a sentinel-terminated buffer.
//!
//! The cursor advances through the buffer byte-by-byte. EOF is detected
//! when the current byte equals the sentinel (`0x00`) and the position
//! has reached the source length; a null byte *before* the source length
//! is ordinary content (the scanner treats it as an end-of-script
//! marker). The sentinel guarantees that `current()`/`peek()` never need
//! bounds checks.

/// Returns the earliest (minimum) of two optional positions.
///
/// Combines results from separate memchr calls when more needles are
/// needed than `memchr3` supports.
fn earliest_of(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(x), Some(y)) => Some(x.min(y)),
        (Some(x), None) | (None, Some(x)) => Some(x),
        (None, None) => None,
    }
}

/// Zero-cost cursor over a sentinel-terminated byte buffer.
///
/// Created via [`SourceBuffer::cursor()`](crate::SourceBuffer::cursor).
/// The cursor is [`Copy`], enabling cheap snapshots for backtracking —
/// the scanner uses this to probe a heredoc opener and fall back to
/// operator lexing if the probe fails.
///
/// # Invariant
///
/// `buf` must be sentinel-terminated: `buf[source_len] == 0x00`, and all
/// bytes after `source_len` are `0x00` (cache-line padding). This is
/// guaranteed by [`SourceBuffer`](crate::SourceBuffer) construction.
#[derive(Clone, Copy, Debug)]
pub struct Cursor<'a> {
    /// Sentinel-terminated buffer (source + sentinel + padding).
    buf: &'a [u8],
    /// Current read position (byte index into `buf`).
    pos: u32,
    /// Length of actual source content (excludes sentinel and padding).
    source_len: u32,
}

impl<'a> Cursor<'a> {
    /// Create a new cursor at position 0 over a sentinel-terminated buffer.
    pub(crate) fn new(buf: &'a [u8], source_len: u32) -> Self {
        debug_assert!(
            (source_len as usize) < buf.len(),
            "sentinel must be within buffer bounds"
        );
        debug_assert!(buf[source_len as usize] == 0, "sentinel byte must be 0x00");
        Self {
            buf,
            pos: 0,
            source_len,
        }
    }

    /// The byte at the current position.
    ///
    /// Returns `0x00` at EOF (the sentinel). Interior null bytes also
    /// return `0x00`; use [`is_eof()`](Self::is_eof) to distinguish.
    #[inline]
    pub fn current(&self) -> u8 {
        self.buf[self.pos as usize]
    }

    /// The byte one position ahead.
    ///
    /// Safe at any position: the padding guarantees valid reads beyond
    /// the source content.
    #[inline]
    pub fn peek(&self) -> u8 {
        self.buf[self.pos as usize + 1]
    }

    /// The byte two positions ahead.
    #[inline]
    pub fn peek2(&self) -> u8 {
        self.buf[self.pos as usize + 2]
    }

    /// Advance by one byte.
    #[inline]
    pub fn advance(&mut self) {
        self.pos += 1;
    }

    /// Advance by `n` bytes.
    #[inline]
    pub fn advance_n(&mut self, n: u32) {
        self.pos += n;
    }

    /// Returns `true` if the cursor has reached EOF.
    ///
    /// EOF is the sentinel at or past the source length; this
    /// distinguishes it from interior null bytes.
    #[inline]
    pub fn is_eof(&self) -> bool {
        self.current() == 0 && self.pos >= self.source_len
    }

    /// Current byte offset in the source.
    #[inline]
    pub fn pos(&self) -> u32 {
        self.pos
    }

    /// Length of the source content.
    #[inline]
    pub fn source_len(&self) -> u32 {
        self.source_len
    }

    /// Extract a source substring as `&str`.
    ///
    /// # Contract
    ///
    /// `start..end` must fall within the source content and on UTF-8
    /// character boundaries. Both hold when the offsets come from token
    /// boundary tracking, since the source was originally a `&str`.
    #[allow(
        unsafe_code,
        reason = "from_utf8_unchecked on source originally validated as &str"
    )]
    pub fn slice(&self, start: u32, end: u32) -> &'a str {
        debug_assert!(
            end <= self.source_len,
            "slice end {end} exceeds source length {}",
            self.source_len
        );
        debug_assert!(start <= end, "slice start {start} exceeds end {end}");
        // SAFETY: The buffer was constructed from `&str` (valid UTF-8) and
        // the scanner only produces boundaries on character edges.
        unsafe { std::str::from_utf8_unchecked(&self.buf[start as usize..end as usize]) }
    }

    /// Source substring from `start` to the current position.
    pub fn slice_from(&self, start: u32) -> &'a str {
        self.slice(start, self.pos)
    }

    /// Source bytes from `start` to the current position.
    pub fn bytes_from(&self, start: u32) -> &'a [u8] {
        &self.buf[start as usize..self.pos as usize]
    }

    /// Advance while `pred` returns `true` for the current byte.
    ///
    /// `pred(0)` must return `false` so the sentinel terminates the loop;
    /// all standard byte classifiers satisfy this.
    #[inline]
    pub fn eat_while(&mut self, pred: impl Fn(u8) -> bool) {
        while pred(self.buf[self.pos as usize]) {
            self.pos += 1;
        }
    }

    /// Advance past horizontal whitespace (spaces and tabs).
    ///
    /// A simple byte loop beats vectorized search for the short runs
    /// (1–4 bytes) that dominate real source text.
    #[inline]
    pub fn eat_whitespace(&mut self) {
        loop {
            let b = self.buf[self.pos as usize];
            if b == b' ' || b == b'\t' {
                self.pos += 1;
            } else {
                break;
            }
        }
    }

    /// Advance to the next `\n` byte or EOF using SIMD-accelerated search.
    ///
    /// Used by the comment scanner. The newline itself is not consumed.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn eat_until_newline_or_eof(&mut self) {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        if let Some(offset) = memchr::memchr(b'\n', remaining) {
            self.pos += offset as u32;
        } else {
            self.pos = self.source_len;
        }
    }

    /// The rest of the current line, excluding the `\n`, without consuming.
    ///
    /// Used by the heredoc scanner to test whether a body line is the
    /// terminator line before committing to consume it.
    pub fn rest_of_line(&self) -> &'a [u8] {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        match memchr::memchr(b'\n', remaining) {
            Some(offset) => &remaining[..offset],
            None => remaining,
        }
    }

    /// Advance past ordinary bytes to the nearest of two interesting ones.
    /// Returns the byte found, or 0 at EOF.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn skip_to_delim2(&mut self, n1: u8, n2: u8) -> u8 {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        match memchr::memchr2(n1, n2, remaining) {
            Some(off) => {
                self.pos += off as u32;
                self.buf[self.pos as usize]
            }
            None => {
                self.pos = self.source_len;
                0
            }
        }
    }

    /// Advance past ordinary bytes to the nearest of three interesting ones.
    /// Returns the byte found, or 0 at EOF.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn skip_to_delim3(&mut self, n1: u8, n2: u8, n3: u8) -> u8 {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        match memchr::memchr3(n1, n2, n3, remaining) {
            Some(off) => {
                self.pos += off as u32;
                self.buf[self.pos as usize]
            }
            None => {
                self.pos = self.source_len;
                0
            }
        }
    }

    /// Advance past ordinary bytes to the nearest of four interesting ones.
    /// Returns the byte found, or 0 at EOF.
    ///
    /// memchr handles at most three needles, so this combines a
    /// `memchr3` with a secondary `memchr` and takes the earliest hit.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "remaining.len() <= source_len which fits in u32"
    )]
    pub fn skip_to_delim4(&mut self, n1: u8, n2: u8, n3: u8, n4: u8) -> u8 {
        let remaining = &self.buf[self.pos as usize..self.source_len as usize];
        let primary = memchr::memchr3(n1, n2, n3, remaining);
        let secondary = memchr::memchr(n4, remaining);
        match earliest_of(primary, secondary) {
            Some(off) => {
                self.pos += off as u32;
                self.buf[self.pos as usize]
            }
            None => {
                self.pos = self.source_len;
                0
            }
        }
    }

    /// Number of bytes in the UTF-8 character starting with `byte`.
    ///
    /// - `0xC0..=0xDF`: 2 bytes
    /// - `0xE0..=0xEF`: 3 bytes
    /// - `0xF0..=0xF7`: 4 bytes
    /// - Everything else (ASCII, continuation, invalid): 1 byte
    #[inline]
    pub fn utf8_char_width(byte: u8) -> u32 {
        match byte {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        }
    }

    /// Advance past one full UTF-8 character.
    #[inline]
    pub fn advance_char(&mut self) {
        let width = Self::utf8_char_width(self.current());
        self.advance_n(width);
    }
}
