use std::ops::Range;

/// Text that has been through the escape pass.
///
/// The only constructor is [`escape`], so any `Escaped` value is known to
/// contain no raw `&`, `<`, `>`, `"` or `'` from user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Escaped(String);

impl Escaped {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Sub-range of already escaped text.
    ///
    /// Callers cut only at ASCII delimiters, which never occur inside an
    /// entity, so the slice is still fully escaped.
    pub(crate) fn slice(&self, range: Range<usize>) -> Escaped {
        Escaped(self.0[range].to_string())
    }

    /// Undo the `<` and `>` entities only. Used to hand math source to the
    /// math renderer; the result is not safe to emit as markup.
    pub fn unescape_angles(&self) -> String {
        self.0.replace("&lt;", "<").replace("&gt;", ">")
    }

    /// Escaped text with line breaks turned into `<br>`.
    pub fn with_line_breaks(&self) -> String {
        self.0.replace('\n', "<br>")
    }
}

/// First pass: replace `&`, `<`, `>`, `"` and `'` with markup entities.
pub fn escape(raw: &str) -> Escaped {
    Escaped(html_escape::encode_quoted_attribute(raw).into_owned())
}
