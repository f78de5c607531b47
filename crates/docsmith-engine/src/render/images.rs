use regex::Regex;
use std::sync::OnceLock;

use super::{escape::Escaped, kinds::ImageRef, types::Token};
use crate::models::{AttachmentStore, is_data_uri};

fn image_ref_regex() -> &'static Regex {
    static IMAGE_REF_REGEX: OnceLock<Regex> = OnceLock::new();
    IMAGE_REF_REGEX.get_or_init(|| Regex::new(ImageRef::PATTERN).expect("Invalid image ref regex"))
}

/// Second pass: split escaped text into text and image tokens.
///
/// References to ids present in `attachments` with a `data:` payload become
/// [`Token::Image`], anything else becomes [`Token::BrokenImage`].
pub fn resolve_images(text: &Escaped, attachments: &AttachmentStore) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut text_start = 0;

    for caps in image_ref_regex().captures_iter(text.as_str()) {
        let (Some(whole), Some(alt), Some(id)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            continue;
        };

        if whole.start() > text_start {
            tokens.push(Token::Text(text.slice(text_start..whole.start())));
        }

        let alt = text.slice(alt.range());
        let token = match attachments.get(id.as_str()) {
            Some(payload) if is_data_uri(payload) => Token::Image {
                alt,
                payload: payload.to_string(),
            },
            _ => Token::BrokenImage {
                alt,
                id: text.slice(id.range()),
            },
        };
        tokens.push(token);
        text_start = whole.end();
    }

    if text_start < text.as_str().len() {
        tokens.push(Token::Text(text.slice(text_start..text.as_str().len())));
    }
    tokens
}
