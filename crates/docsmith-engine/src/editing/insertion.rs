/// Where inserted content lands in a section's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertionPoint {
    /// Append to the end of the text.
    #[default]
    End,
    /// Insert before the character at this index (counted in chars, not
    /// bytes). Offsets past the end append.
    Cursor(usize),
}

/// Splice `insert` into `text` at `at`.
pub fn splice(text: &str, insert: &str, at: InsertionPoint) -> String {
    let byte_index = match at {
        InsertionPoint::End => text.len(),
        InsertionPoint::Cursor(chars) => text
            .char_indices()
            .nth(chars)
            .map(|(i, _)| i)
            .unwrap_or(text.len()),
    };

    let mut out = String::with_capacity(text.len() + insert.len());
    out.push_str(&text[..byte_index]);
    out.push_str(insert);
    out.push_str(&text[byte_index..]);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::append("abc", InsertionPoint::End, "abcX")]
    #[case::start("abc", InsertionPoint::Cursor(0), "Xabc")]
    #[case::middle("abc", InsertionPoint::Cursor(1), "aXbc")]
    #[case::at_end("abc", InsertionPoint::Cursor(3), "abcX")]
    #[case::past_end("abc", InsertionPoint::Cursor(99), "abcX")]
    #[case::empty("", InsertionPoint::Cursor(0), "X")]
    #[case::multibyte("héllo", InsertionPoint::Cursor(2), "héXllo")]
    fn splice_cases(#[case] text: &str, #[case] at: InsertionPoint, #[case] expected: &str) {
        assert_eq!(splice(text, "X", at), expected);
    }
}
