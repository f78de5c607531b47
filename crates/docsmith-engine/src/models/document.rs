use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use super::{AttachmentId, AttachmentStore, Version, VersionHistory};

/// Section id to current text. Absent sections read as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct SectionValues {
    values: BTreeMap<String, String>,
}

impl SectionValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, section_id: &str) -> &str {
        self.values.get(section_id).map(String::as_str).unwrap_or("")
    }

    pub fn set(&mut self, section_id: &str, text: impl Into<String>) {
        self.values.insert(section_id.to_string(), text.into());
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for SectionValues {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl<'de> Deserialize<'de> for SectionValues {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Self {
            values: lenient_string_map(deserializer, "section value")?,
        })
    }
}

/// A document authored against one template.
///
/// The serialized form is the persisted record: every field defaults when
/// absent so partially-shaped records still load.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Document {
    #[serde(deserialize_with = "null_as_default")]
    template_id: String,
    #[serde(deserialize_with = "null_as_default")]
    last_modified: u64,
    #[serde(deserialize_with = "null_as_default")]
    values: SectionValues,
    #[serde(deserialize_with = "null_as_default")]
    attachments: AttachmentStore,
    #[serde(deserialize_with = "null_as_default")]
    history: VersionHistory,
}

/// Treat an explicit `null` the same as an absent field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Read a string-valued map, skipping entries whose value is not a string.
///
/// `null` (or a non-object) reads as an empty map.
pub(crate) fn lenient_string_map<'de, D, K>(
    deserializer: D,
    what: &str,
) -> Result<BTreeMap<K, String>, D::Error>
where
    D: Deserializer<'de>,
    K: Ord + From<String>,
{
    let entries = match Value::deserialize(deserializer)? {
        Value::Object(entries) => entries,
        Value::Null => return Ok(BTreeMap::new()),
        other => {
            log::warn!("Ignoring {what} map: expected an object, found {other}");
            return Ok(BTreeMap::new());
        }
    };
    Ok(entries
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(text) => Some((K::from(key), text)),
            Value::Null => None,
            other => {
                log::warn!("Skipping {what} {key:?}: expected a string, found {other}");
                None
            }
        })
        .collect())
}

impl Document {
    pub fn new(template_id: &str, now_ms: u64) -> Self {
        Self {
            template_id: template_id.to_string(),
            last_modified: now_ms,
            ..Self::default()
        }
    }

    pub fn template_id(&self) -> &str {
        &self.template_id
    }

    pub fn last_modified(&self) -> u64 {
        self.last_modified
    }

    pub fn values(&self) -> &SectionValues {
        &self.values
    }

    pub fn value(&self, section_id: &str) -> &str {
        self.values.get(section_id)
    }

    pub fn attachments(&self) -> &AttachmentStore {
        &self.attachments
    }

    pub fn history(&self) -> &VersionHistory {
        &self.history
    }

    /// Advance last-modified, strictly increasing even if the clock stalls
    /// or steps backwards.
    pub fn touch(&mut self, now_ms: u64) {
        self.last_modified = now_ms.max(self.last_modified.saturating_add(1));
    }

    pub fn set_section_value(&mut self, section_id: &str, text: impl Into<String>, now_ms: u64) {
        self.values.set(section_id, text);
        self.touch(now_ms);
    }

    pub fn insert_attachment(&mut self, payload: impl Into<String>, now_ms: u64) -> AttachmentId {
        let id = self.attachments.insert(payload);
        self.touch(now_ms);
        id
    }

    /// Snapshot values and attachments into a new version at the head of the
    /// history.
    pub fn save_version(&mut self, name: Option<String>, now_ms: u64) -> &Version {
        let version = Version::new(
            now_ms,
            name,
            self.values.clone(),
            self.attachments.clone(),
        );
        self.history.push(version)
    }

    /// Replace values and attachments with a version's snapshot.
    ///
    /// Returns `false` if no version has that id. The history is untouched.
    pub fn restore_version(&mut self, version_id: &str, now_ms: u64) -> bool {
        let Some(version) = self.history.get(version_id) else {
            return false;
        };
        self.values = version.values.clone();
        self.attachments = version.attachments.clone();
        self.touch(now_ms);
        true
    }

    pub(crate) fn enforce_invariants(&mut self) {
        self.history.enforce_cap();
    }
}
