use base64::{Engine, engine::general_purpose::STANDARD};
use serde::{Deserialize, Deserializer, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use uuid::Uuid;

use super::document::lenient_string_map;

/// Scheme prefix used inside reference tags: `![alt](attachment:<id>)`.
pub const ATTACHMENT_SCHEME: &str = "attachment:";

const DATA_SCHEME: &str = "data:";

/// Opaque identifier of an attachment within a document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(String);

impl AttachmentId {
    pub fn generate() -> Self {
        Self(format!("img_{}", Uuid::new_v4().simple()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for AttachmentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for AttachmentId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for AttachmentId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Append-only map of attachment id to data URI payload.
///
/// Entries are never edited or removed once inserted; unreferenced payloads
/// are kept for the lifetime of the document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttachmentStore {
    entries: BTreeMap<AttachmentId, String>,
}

impl<'de> Deserialize<'de> for AttachmentStore {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            entries: lenient_string_map(deserializer, "attachment")?,
        })
    }
}

impl AttachmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a payload under a freshly generated id.
    pub fn insert(&mut self, payload: impl Into<String>) -> AttachmentId {
        let mut id = AttachmentId::generate();
        while self.entries.contains_key(&id) {
            id = AttachmentId::generate();
        }
        self.entries.insert(id.clone(), payload.into());
        id
    }

    pub fn get(&self, id: &str) -> Option<&str> {
        self.entries.get(id).map(String::as_str)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&AttachmentId, &str)> {
        self.entries.iter().map(|(id, payload)| (id, payload.as_str()))
    }
}

impl<I: Into<AttachmentId>, P: Into<String>> FromIterator<(I, P)> for AttachmentStore {
    fn from_iter<T: IntoIterator<Item = (I, P)>>(iter: T) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(id, payload)| (id.into(), payload.into()))
                .collect(),
        }
    }
}

/// Compose the inline reference tag for an attachment.
///
/// Brackets and line breaks are stripped from the alt text so the tag stays
/// parseable.
pub fn reference_tag(alt: &str, id: &AttachmentId) -> String {
    let alt: String = alt
        .chars()
        .map(|c| match c {
            '[' | ']' | '\n' | '\r' => ' ',
            other => other,
        })
        .collect();
    format!("![{}]({ATTACHMENT_SCHEME}{id})", alt.trim())
}

/// Whether a payload is an inline `data:` URI. Only these are ever placed in
/// an image source.
pub fn is_data_uri(payload: &str) -> bool {
    payload
        .get(..DATA_SCHEME.len())
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case(DATA_SCHEME))
}

/// Encode raw bytes as a base64 data URI.
pub fn data_uri(mime: &str, bytes: &[u8]) -> String {
    format!("data:{mime};base64,{}", STANDARD.encode(bytes))
}

/// Read a file and encode it as a data URI, guessing the MIME type from its
/// extension.
pub fn data_uri_from_path(path: &Path) -> std::io::Result<String> {
    let bytes = std::fs::read(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Ok(data_uri(mime.essence_str(), &bytes))
}
