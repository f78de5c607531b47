use chrono::{Local, TimeZone};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::document::null_as_default;
use super::{AttachmentStore, SectionValues};

/// Maximum number of versions kept per document.
pub const MAX_VERSIONS: usize = 30;

/// An immutable snapshot of a document's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Version {
    #[serde(default = "new_version_id")]
    pub id: String,
    #[serde(default)]
    pub timestamp: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub values: SectionValues,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attachments: AttachmentStore,
}

impl Version {
    pub fn new(
        timestamp: u64,
        name: Option<String>,
        values: SectionValues,
        attachments: AttachmentStore,
    ) -> Self {
        Self {
            id: new_version_id(),
            timestamp,
            name: name.filter(|n| !n.trim().is_empty()),
            values,
            attachments,
        }
    }

    /// The user-supplied name, or the creation time in local time.
    pub fn display_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("Version {}", format_timestamp(self.timestamp)),
        }
    }
}

fn new_version_id() -> String {
    Uuid::new_v4().to_string()
}

fn format_timestamp(ms: u64) -> String {
    match Local.timestamp_millis_opt(ms as i64).single() {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => ms.to_string(),
    }
}

/// Newest-first list of versions capped at [`MAX_VERSIONS`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct VersionHistory {
    versions: Vec<Version>,
}

/// Entries that do not read as a version are dropped one by one so the rest
/// of the record survives.
impl<'de> Deserialize<'de> for VersionHistory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let entries = match Value::deserialize(deserializer)? {
            Value::Array(entries) => entries,
            Value::Null => Vec::new(),
            other => {
                log::warn!("Ignoring version history: expected an array, found {other}");
                Vec::new()
            }
        };
        let versions = entries
            .into_iter()
            .enumerate()
            .filter_map(|(index, entry)| match serde_json::from_value::<Version>(entry) {
                Ok(version) => Some(version),
                Err(e) => {
                    log::warn!("Skipping unreadable version at index {index}: {e}");
                    None
                }
            })
            .collect();
        Ok(Self { versions })
    }
}

impl VersionHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a version, evicting the oldest entries beyond the cap.
    pub fn push(&mut self, version: Version) -> &Version {
        self.versions.insert(0, version);
        self.versions.truncate(MAX_VERSIONS);
        &self.versions[0]
    }

    pub fn get(&self, id: &str) -> Option<&Version> {
        self.versions.iter().find(|v| v.id == id)
    }

    pub fn latest(&self) -> Option<&Version> {
        self.versions.first()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Version> {
        self.versions.iter()
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// Drop entries beyond the cap; used after loading foreign records.
    pub(crate) fn enforce_cap(&mut self) {
        self.versions.truncate(MAX_VERSIONS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn version_at(ts: u64) -> Version {
        Version::new(
            ts,
            Some(format!("v{ts}")),
            SectionValues::default(),
            AttachmentStore::default(),
        )
    }

    #[test]
    fn push_is_newest_first() {
        let mut history = VersionHistory::new();
        history.push(version_at(1));
        history.push(version_at(2));

        let names: Vec<_> = history.iter().map(|v| v.display_name()).collect();
        assert_eq!(names, vec!["v2", "v1"]);
        assert_eq!(history.latest().unwrap().timestamp, 2);
    }

    #[test]
    fn push_evicts_oldest_beyond_cap() {
        let mut history = VersionHistory::new();
        for ts in 1..=35 {
            history.push(version_at(ts));
        }

        assert_eq!(history.len(), MAX_VERSIONS);
        let stamps: Vec<_> = history.iter().map(|v| v.timestamp).collect();
        let expected: Vec<u64> = (6..=35).rev().collect();
        assert_eq!(stamps, expected);
    }

    #[test]
    fn blank_names_are_dropped() {
        let version = Version::new(
            0,
            Some("   ".to_string()),
            SectionValues::default(),
            AttachmentStore::default(),
        );
        assert!(version.name.is_none());
        assert!(version.display_name().starts_with("Version "));
    }

    #[test]
    fn version_ids_are_unique() {
        assert_ne!(version_at(1).id, version_at(1).id);
    }

    #[test]
    fn lookup_by_id() {
        let mut history = VersionHistory::new();
        let version = version_at(7);
        let id = version.id.clone();
        history.push(version);

        assert_eq!(history.get(&id).unwrap().timestamp, 7);
        assert!(history.get("missing").is_none());
    }

    #[test]
    fn missing_attachments_default_to_empty() {
        let json = r#"{"id":"a","timestamp":5,"values":{"title":"x"}}"#;
        let version: Version = serde_json::from_str(json).unwrap();
        assert!(version.attachments.is_empty());
        assert!(version.name.is_none());
        assert_eq!(version.values.get("title"), "x");
    }

    #[test]
    fn version_without_id_or_timestamp_still_loads() {
        let version: Version = serde_json::from_str(r#"{"values":{"a":"x"}}"#).unwrap();
        assert!(!version.id.is_empty());
        assert_eq!(version.timestamp, 0);
        assert_eq!(version.values.get("a"), "x");
    }

    #[test]
    fn unreadable_history_entries_are_skipped() {
        let json = r#"[
            {"id":"keep","timestamp":2,"values":{"a":"x"}},
            "not a version",
            {"id":"bad","timestamp":"yesterday"},
            42,
            {"values":{"a":"y"}}
        ]"#;
        let history: VersionHistory = serde_json::from_str(json).unwrap();

        assert_eq!(history.len(), 2);
        assert_eq!(history.latest().unwrap().id, "keep");
        let values: Vec<_> = history.iter().map(|v| v.values.get("a")).collect();
        assert_eq!(values, vec!["x", "y"]);
    }

    #[test]
    fn non_array_history_reads_as_empty() {
        let history: VersionHistory = serde_json::from_str(r#"{"id":"a"}"#).unwrap();
        assert!(history.is_empty());
    }

    #[test]
    fn null_attachments_default_to_empty() {
        let json = r#"{"id":"a","timestamp":5,"values":{},"attachments":null}"#;
        let version: Version = serde_json::from_str(json).unwrap();
        assert!(version.attachments.is_empty());
    }
}
