//! Byte-exact line/column accounting.

/// Tracks the (line, column) coordinate of the scan cursor.
///
/// Pure function of the bytes fed to [`advance`](Self::advance): every
/// consumed `\n` increments the line and resets the column to 0; every
/// other byte adds one column per byte (multi-byte characters count as
/// multiple columns, matching byte-oriented diagnostics).
#[derive(Clone, Copy, Debug)]
pub struct PositionTracker {
    line: u32,
    col: u32,
}

impl PositionTracker {
    /// Start of the buffer: line 1, column 0.
    pub fn new() -> Self {
        Self { line: 1, col: 0 }
    }

    /// Current line (1-based).
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Current column (0-based byte offset within the line).
    #[inline]
    pub fn col(&self) -> u32 {
        self.col
    }

    /// Account for a consumed run of bytes.
    ///
    /// Uses memchr to find the final newline; only the tail after it
    /// contributes to the column.
    #[allow(
        clippy::cast_possible_truncation,
        reason = "token lengths are bounded by source_len which fits in u32"
    )]
    pub fn advance(&mut self, bytes: &[u8]) {
        match memchr::memrchr(b'\n', bytes) {
            Some(last_nl) => {
                self.line += memchr::memchr_iter(b'\n', bytes).count() as u32;
                self.col = (bytes.len() - last_nl - 1) as u32;
            }
            None => {
                self.col += bytes.len() as u32;
            }
        }
    }
}

impl Default for PositionTracker {
    fn default() -> Self {
        Self::new()
    }
}
