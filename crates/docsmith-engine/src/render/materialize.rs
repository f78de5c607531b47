use std::fmt;

use super::{
    math::{MathMode, MathRenderer},
    types::Token,
};

/// Markup produced by the render pipeline, safe to inject into a page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SafeMarkup(String);

impl SafeMarkup {
    pub(crate) fn from_trusted(markup: String) -> Self {
        Self(markup)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for SafeMarkup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Fourth pass: turn tokens into final markup.
pub fn materialize(tokens: &[Token], math: &dyn MathRenderer) -> SafeMarkup {
    let mut out = String::new();
    for token in tokens {
        match token {
            Token::Text(text) => out.push_str(&text.with_line_breaks()),
            Token::Image { alt, payload } => {
                out.push_str("<figure class=\"attachment\"><img src=\"");
                out.push_str(&html_escape::encode_double_quoted_attribute(payload));
                out.push_str("\" alt=\"");
                out.push_str(alt.as_str());
                out.push_str("\"><figcaption>");
                out.push_str(alt.as_str());
                out.push_str("</figcaption></figure>");
            }
            Token::BrokenImage { alt, .. } => {
                out.push_str("<span class=\"broken-image\">[image not found: ");
                out.push_str(alt.as_str());
                out.push_str("]</span>");
            }
            Token::MathBlock(source) => {
                match math.render_math(&source.unescape_angles(), MathMode::Display) {
                    Ok(markup) => {
                        out.push_str("<div class=\"math-display\">");
                        out.push_str(&markup);
                        out.push_str("</div>");
                    }
                    // Raw source, still escaped, delimiters included.
                    Err(_) => {
                        out.push_str("$$");
                        out.push_str(&source.with_line_breaks());
                        out.push_str("$$");
                    }
                }
            }
            Token::MathInline(source) => {
                match math.render_math(&source.unescape_angles(), MathMode::Inline) {
                    Ok(markup) => {
                        out.push_str("<span class=\"math-inline\">");
                        out.push_str(&markup);
                        out.push_str("</span>");
                    }
                    Err(_) => {
                        out.push('$');
                        out.push_str(source.as_str());
                        out.push('$');
                    }
                }
            }
        }
    }
    SafeMarkup(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{
        escape::escape,
        math::{MathError, NoMath},
    };
    use pretty_assertions::assert_eq;

    #[test]
    fn image_becomes_captioned_figure() {
        let tokens = [Token::Image {
            alt: escape("Flow"),
            payload: "data:image/png;base64,AA==".to_string(),
        }];
        assert_eq!(
            materialize(&tokens, &NoMath).as_str(),
            "<figure class=\"attachment\"><img src=\"data:image/png;base64,AA==\" alt=\"Flow\">\
             <figcaption>Flow</figcaption></figure>"
        );
    }

    #[test]
    fn payload_cannot_break_out_of_attribute() {
        let tokens = [Token::Image {
            alt: escape("x"),
            payload: "data:x\" onerror=\"alert(1)".to_string(),
        }];
        let markup = materialize(&tokens, &NoMath);
        assert!(!markup.as_str().contains("\" onerror"));
    }

    #[test]
    fn broken_image_is_bracketed_text() {
        let tokens = [Token::BrokenImage {
            alt: escape("Gone"),
            id: escape("img_9"),
        }];
        assert_eq!(
            materialize(&tokens, &NoMath).as_str(),
            "<span class=\"broken-image\">[image not found: Gone]</span>"
        );
    }

    #[test]
    fn math_goes_through_renderer_with_angles_unescaped() {
        let renderer = |source: &str, mode: MathMode| -> Result<String, MathError> {
            Ok(format!("[{mode:?} {}]", source.len()))
        };
        let tokens = [
            Token::MathBlock(escape("a<b")),
            Token::MathInline(escape("c>d")),
        ];
        assert_eq!(
            materialize(&tokens, &renderer).as_str(),
            "<div class=\"math-display\">[Display 3]</div><span class=\"math-inline\">[Inline 3]</span>"
        );
    }

    #[test]
    fn failed_math_shows_escaped_source() {
        let tokens = [
            Token::MathBlock(escape("a<b\nc")),
            Token::MathInline(escape("x")),
        ];
        assert_eq!(
            materialize(&tokens, &NoMath).as_str(),
            "$$a&lt;b<br>c$$$x$"
        );
    }
}
