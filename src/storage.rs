/// Hidden-set storage model and legacy-entry migration for chrome.storage.sync

use crate::video_data::{StoredEntry, VideoRecord};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Synced-storage key holding the hidden set.
pub const HIDDEN_VIDEOS_KEY: &str = "hiddenVideos";
/// Synced-storage key holding the show-hidden override flag.
pub const SHOW_HIDDEN_KEY: &str = "showHiddenVideos";

/// The persisted hidden set. Insertion order is preserved but carries no
/// meaning; id uniqueness is the one invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct HiddenList {
    pub videos: Vec<VideoRecord>,
}

impl HiddenList {
    pub fn new() -> Self {
        HiddenList { videos: Vec::new() }
    }

    pub fn contains(&self, id: &str) -> bool {
        self.videos.iter().any(|v| v.id == id)
    }

    pub fn ids(&self) -> HashSet<String> {
        self.videos.iter().map(|v| v.id.clone()).collect()
    }

    /// Add a record, replacing any existing entry with the same id.
    pub fn insert(&mut self, record: VideoRecord) {
        self.videos.retain(|v| v.id != record.id);
        self.videos.push(record);
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let original_len = self.videos.len();
        self.videos.retain(|v| v.id != id);
        self.videos.len() < original_len
    }

    pub fn is_empty(&self) -> bool {
        self.videos.is_empty()
    }
}

/// Result of normalizing raw stored entries; `changed` decides whether the
/// caller writes the list back.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationOutcome {
    pub list: HiddenList,
    pub changed: bool,
}

/// Normalize raw stored entries into the current record shape.
///
/// `lookup` resolves a bare id to a full record from the live page, when the
/// video is still on it. Rules:
/// - bare id, live match      -> full record
/// - bare id, no match        -> id-only record
/// - record with an id        -> kept as-is
/// - record, no id, a title   -> title adopted as the id
/// - record, no id, no title  -> dropped
pub fn normalize_entries<F>(entries: Vec<StoredEntry>, lookup: F) -> MigrationOutcome
where
    F: Fn(&str) -> Option<VideoRecord>,
{
    let mut list = HiddenList::new();
    let mut changed = false;

    for entry in entries {
        let record = match entry {
            StoredEntry::Id(id) => {
                changed = true;
                match lookup(&id) {
                    Some(record) => record,
                    None => VideoRecord::id_only(id),
                }
            }
            StoredEntry::Record(record) if !record.id.is_empty() => record,
            StoredEntry::Record(mut record) => {
                changed = true;
                if record.title.is_empty() {
                    continue;
                }
                record.id = record.title.clone();
                record
            }
        };
        if record.id.is_empty() {
            changed = true;
            continue;
        }
        list.insert(record);
    }

    MigrationOutcome { list, changed }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_record(id: &str, title: &str) -> VideoRecord {
        VideoRecord::new(
            id.to_string(),
            title.to_string(),
            "Some Channel".to_string(),
            "3 hours ago".to_string(),
            format!("https://www.youtube.com/watch?v={id}"),
        )
    }

    #[test]
    fn test_insert_and_contains() {
        let mut list = HiddenList::new();
        list.insert(create_test_record("abc", "A Video"));

        assert!(list.contains("abc"));
        assert!(!list.contains("xyz"));
        assert_eq!(list.videos.len(), 1);
    }

    #[test]
    fn test_insert_deduplicates_by_id() {
        let mut list = HiddenList::new();
        list.insert(create_test_record("abc", "Old Title"));
        list.insert(create_test_record("abc", "New Title"));

        assert_eq!(list.videos.len(), 1);
        assert_eq!(list.videos[0].title, "New Title");
    }

    #[test]
    fn test_remove() {
        let mut list = HiddenList::new();
        list.insert(create_test_record("abc", "A Video"));
        list.insert(create_test_record("def", "Another"));

        assert!(list.remove("abc"));
        assert_eq!(list.videos.len(), 1);
        assert_eq!(list.videos[0].id, "def");
    }

    #[test]
    fn test_remove_nonexistent() {
        let mut list = HiddenList::new();
        list.insert(create_test_record("abc", "A Video"));

        assert!(!list.remove("nope"));
        assert_eq!(list.videos.len(), 1);
    }

    #[test]
    fn test_migration_upgrades_bare_id_with_live_match() {
        let entries = vec![StoredEntry::Id("abc".to_string())];

        let outcome = normalize_entries(entries, |id| {
            (id == "abc").then(|| create_test_record("abc", "A Video"))
        });

        assert!(outcome.changed);
        assert_eq!(outcome.list.videos.len(), 1);
        assert_eq!(outcome.list.videos[0].id, "abc");
        assert_eq!(outcome.list.videos[0].title, "A Video");
    }

    #[test]
    fn test_migration_downgrades_bare_id_without_match() {
        let entries = vec![StoredEntry::Id("gone".to_string())];

        let outcome = normalize_entries(entries, |_| None);

        assert!(outcome.changed);
        assert_eq!(
            outcome.list.videos[0],
            VideoRecord::id_only("gone".to_string())
        );
    }

    #[test]
    fn test_migration_keeps_complete_records_unchanged() {
        let record = create_test_record("abc", "A Video");
        let entries = vec![StoredEntry::Record(record.clone())];

        let outcome = normalize_entries(entries, |_| None);

        assert!(!outcome.changed);
        assert_eq!(outcome.list.videos, vec![record]);
    }

    #[test]
    fn test_migration_adopts_title_as_fallback_id() {
        let mut record = create_test_record("", "A Video");
        record.id = String::new();
        let entries = vec![StoredEntry::Record(record)];

        let outcome = normalize_entries(entries, |_| None);

        assert!(outcome.changed);
        assert_eq!(outcome.list.videos[0].id, "A Video");
    }

    #[test]
    fn test_migration_drops_entry_with_no_id_and_no_title() {
        let entries = vec![
            StoredEntry::Record(VideoRecord::id_only(String::new())),
            StoredEntry::Record(create_test_record("abc", "A Video")),
        ];

        let outcome = normalize_entries(entries, |_| None);

        assert!(outcome.changed);
        assert_eq!(outcome.list.videos.len(), 1);
        assert_eq!(outcome.list.videos[0].id, "abc");
    }

    #[test]
    fn test_migration_mixed_entries() {
        let entries = vec![
            StoredEntry::Id("legacy1".to_string()),
            StoredEntry::Record(create_test_record("abc", "A Video")),
            StoredEntry::Id("legacy2".to_string()),
        ];

        let outcome = normalize_entries(entries, |id| {
            (id == "legacy1").then(|| create_test_record("legacy1", "Found Live"))
        });

        assert!(outcome.changed);
        let ids: Vec<&str> = outcome.list.videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["legacy1", "abc", "legacy2"]);
        assert_eq!(outcome.list.videos[0].title, "Found Live");
        assert_eq!(outcome.list.videos[2].title, "");
    }

    #[test]
    fn test_migration_deduplicates_legacy_and_record_pair() {
        // A bare id and a full record for the same video collapse to one entry.
        let entries = vec![
            StoredEntry::Id("abc".to_string()),
            StoredEntry::Record(create_test_record("abc", "A Video")),
        ];

        let outcome = normalize_entries(entries, |_| None);

        assert_eq!(outcome.list.videos.len(), 1);
        assert_eq!(outcome.list.videos[0].title, "A Video");
    }

    #[test]
    fn test_serialization_is_a_plain_array() {
        let mut list = HiddenList::new();
        list.insert(create_test_record("abc", "A Video"));

        let json = serde_json::to_string(&list).unwrap();

        assert!(json.starts_with('['));
        let back: HiddenList = serde_json::from_str(&json).unwrap();
        assert_eq!(back, list);
    }
}
