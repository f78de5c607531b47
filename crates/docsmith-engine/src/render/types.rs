use super::escape::Escaped;

/// A piece of section text after image resolution and math segmentation.
///
/// Everything user-controlled is carried as [`Escaped`]; only the payload of
/// a resolved image comes from the attachment store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Plain escaped text. Line breaks are still `\n`.
    Text(Escaped),
    /// A reference to an attachment present in the store.
    Image { alt: Escaped, payload: String },
    /// A reference to an attachment id the store does not know.
    BrokenImage { alt: Escaped, id: Escaped },
    /// Display math, source without the `$$` fences.
    MathBlock(Escaped),
    /// Inline math, source without the `$` delimiters.
    MathInline(Escaped),
}

impl Token {
    pub fn is_math(&self) -> bool {
        matches!(self, Token::MathBlock(_) | Token::MathInline(_))
    }
}
