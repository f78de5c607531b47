/// A byte cursor over escaped text used by the math splitter.
///
/// Delimiters are ASCII, so every position the splitter stops at is a char
/// boundary.
#[derive(Clone)]
pub struct Cursor<'a> {
    /// The string being scanned.
    pub s: &'a str,
    /// Current byte index into `s`.
    pub i: usize,
}

impl<'a> Cursor<'a> {
    pub fn new(s: &'a str) -> Self {
        Self { s, i: 0 }
    }

    pub fn pos(&self) -> usize {
        self.i
    }

    pub fn eof(&self) -> bool {
        self.i >= self.s.len()
    }

    /// Peeks at the current byte without advancing.
    pub fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.i).copied()
    }

    /// Checks if the remaining input starts with the given byte pattern.
    pub fn starts_with(&self, pat: &[u8]) -> bool {
        self.s.as_bytes()[self.i.min(self.s.len())..].starts_with(pat)
    }

    /// Advances by one byte, returning the consumed byte.
    pub fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.i += 1;
        Some(b)
    }

    /// Advances by `n` bytes.
    pub fn bump_n(&mut self, n: usize) {
        self.i += n;
    }

    /// Byte offset of the next occurrence of `pat` at or after the cursor,
    /// without moving.
    pub fn find(&self, pat: &[u8]) -> Option<usize> {
        if pat.is_empty() || self.eof() {
            return None;
        }
        self.s.as_bytes()[self.i..]
            .windows(pat.len())
            .position(|w| w == pat)
            .map(|offset| self.i + offset)
    }
}
