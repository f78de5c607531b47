//! # Content Rendering
//!
//! Turns untrusted section text into safe markup as an explicit staged
//! pipeline. Each pass consumes the representation produced by the one
//! before it, so the ordering is enforced by types:
//!
//! 1. **`escape`**: `&str` → [`Escaped`]. Markup characters become entities.
//! 2. **`images`**: [`Escaped`] → `Vec<Token>`. `![alt](attachment:id)`
//!    references resolve against the attachment store.
//! 3. **`math`**: text tokens split into `$$..$$` / `$..$` math tokens.
//! 4. **`materialize`**: `Vec<Token>` → [`SafeMarkup`]. Math goes through the
//!    injected [`MathRenderer`]; images become captioned figures.
//!
//! Malformed syntax never fails the pipeline: unterminated delimiters stay
//! literal text, unknown attachment ids render a visible marker, and math
//! that cannot be rendered shows its escaped source.

pub mod cursor;
pub mod escape;
pub mod images;
pub mod kinds;
pub mod materialize;
pub mod math;
pub mod types;

pub use escape::{Escaped, escape};
pub use images::resolve_images;
pub use materialize::{SafeMarkup, materialize};
pub use math::{MathError, MathMode, MathRenderer, NoMath, segment_math};
pub use types::Token;

use crate::models::{AttachmentStore, Document, Template};

/// Run passes 1-3 and return the token sequence.
pub fn tokenize(text: &str, attachments: &AttachmentStore) -> Vec<Token> {
    let escaped = escape(text);
    let tokens = resolve_images(&escaped, attachments);
    segment_math(tokens)
}

/// Render one section's text to safe markup.
pub fn render(text: &str, attachments: &AttachmentStore, math: &dyn MathRenderer) -> SafeMarkup {
    materialize(&tokenize(text, attachments), math)
}

/// Render every section of a document into a standalone preview page.
pub fn render_document(
    template: &Template,
    document: &Document,
    math: &dyn MathRenderer,
) -> SafeMarkup {
    let mut page = String::from("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    page.push_str(&format!(
        "<title>{}</title>\n</head>\n<body>\n",
        escape(&template.name).as_str()
    ));
    for section in &template.sections {
        let body = render(document.value(&section.id), document.attachments(), math);
        page.push_str(&format!(
            "<section id=\"{}\">\n<h2>{}</h2>\n<div class=\"section-body\">{}</div>\n</section>\n",
            escape(&section.id).as_str(),
            escape(&section.label).as_str(),
            body
        ));
    }
    page.push_str("</body>\n</html>\n");
    // Every interpolated piece above is either escaped or pipeline output.
    SafeMarkup::from_trusted(page)
}
