use super::{
    cursor::Cursor,
    escape::Escaped,
    kinds::{MathBlock, MathInline},
    types::Token,
};

/// How a math expression is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathMode {
    Inline,
    Display,
}

#[derive(Debug, thiserror::Error)]
pub enum MathError {
    #[error("math rendering is not available")]
    Unavailable,
    #[error("invalid math expression: {0}")]
    Invalid(String),
}

/// Injected capability that turns math source into markup.
///
/// The returned markup is emitted verbatim, so implementations must escape
/// anything they echo back from `source`. Errors never reach the caller of
/// the pipeline; the raw source is shown instead.
pub trait MathRenderer {
    fn render_math(&self, source: &str, mode: MathMode) -> Result<String, MathError>;
}

impl<F> MathRenderer for F
where
    F: Fn(&str, MathMode) -> Result<String, MathError>,
{
    fn render_math(&self, source: &str, mode: MathMode) -> Result<String, MathError> {
        self(source, mode)
    }
}

/// Used when no math engine is present in the environment.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoMath;

impl MathRenderer for NoMath {
    fn render_math(&self, _source: &str, _mode: MathMode) -> Result<String, MathError> {
        Err(MathError::Unavailable)
    }
}

/// Third pass: split every text token into text and math tokens.
///
/// Image tokens pass through unchanged, so math never spans an image.
pub fn segment_math(tokens: Vec<Token>) -> Vec<Token> {
    let mut out = Vec::with_capacity(tokens.len());
    for token in tokens {
        match token {
            Token::Text(text) => out.extend(split_math(&text)),
            other => out.push(other),
        }
    }
    out
}

/// Split one run of escaped text on `$$..$$` and `$..$`.
///
/// The first closing delimiter ends a segment and block math is tried
/// before inline math. Unterminated or empty delimiters stay literal text.
pub fn split_math(text: &Escaped) -> Vec<Token> {
    let mut cur = Cursor::new(text.as_str());
    let mut out = vec![];
    let mut text_start = cur.pos();

    fn flush_text(out: &mut Vec<Token>, text: &Escaped, start: usize, end: usize) {
        if end > start {
            out.push(Token::Text(text.slice(start..end)));
        }
    }

    while !cur.eof() {
        let start = cur.pos();
        if let Some(token) = try_parse_block(&mut cur, text) {
            flush_text(&mut out, text, text_start, start);
            out.push(token);
            text_start = cur.pos();
            continue;
        }
        if let Some(token) = try_parse_inline(&mut cur, text) {
            flush_text(&mut out, text, text_start, start);
            out.push(token);
            text_start = cur.pos();
            continue;
        }
        cur.bump();
    }

    flush_text(&mut out, text, text_start, cur.pos().min(text.as_str().len()));
    out
}

/// Attempts to parse `$$..$$` at the cursor. On failure the cursor is left
/// where it was.
fn try_parse_block(cur: &mut Cursor<'_>, text: &Escaped) -> Option<Token> {
    if !cur.starts_with(MathBlock::FENCE) {
        return None;
    }

    let saved = cur.clone();
    cur.bump_n(MathBlock::FENCE.len());
    let inner_start = cur.pos();

    match cur.find(MathBlock::FENCE) {
        Some(inner_end) if inner_end > inner_start => {
            cur.bump_n(inner_end - inner_start + MathBlock::FENCE.len());
            Some(Token::MathBlock(text.slice(inner_start..inner_end)))
        }
        _ => {
            *cur = saved;
            None
        }
    }
}

/// Attempts to parse `$..$` at the cursor, without crossing a line break.
fn try_parse_inline(cur: &mut Cursor<'_>, text: &Escaped) -> Option<Token> {
    if cur.peek() != Some(MathInline::DOLLAR) {
        return None;
    }

    let saved = cur.clone();
    cur.bump();
    let inner_start = cur.pos();

    while let Some(b) = cur.peek() {
        if b == MathInline::DOLLAR || b == MathInline::LINE_BREAK {
            break;
        }
        cur.bump();
    }
    let inner_end = cur.pos();

    if cur.peek() != Some(MathInline::DOLLAR) || inner_end == inner_start {
        *cur = saved;
        return None;
    }
    cur.bump();

    Some(Token::MathInline(text.slice(inner_start..inner_end)))
}
