/// Data structures for Vid Hider
use serde::{Deserialize, Serialize};

/// One hidden video, as extracted from the subscriptions feed.
///
/// Only `id` matters for visibility decisions; the metadata fields exist so
/// the popup can show something readable. All fields default to empty so
/// partially-formed stored objects still deserialize and can be repaired (or
/// dropped) by migration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VideoRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default, rename = "uploadTime")]
    pub upload_time: String,
    #[serde(default)]
    pub url: String,
}

impl VideoRecord {
    pub fn new(
        id: String,
        title: String,
        author: String,
        upload_time: String,
        url: String,
    ) -> VideoRecord {
        VideoRecord {
            id,
            title,
            author,
            upload_time,
            url,
        }
    }

    /// Fallback record for a video that is no longer on the page.
    pub fn id_only(id: String) -> VideoRecord {
        VideoRecord {
            id,
            title: String::new(),
            author: String::new(),
            upload_time: String::new(),
            url: String::new(),
        }
    }

    /// Title to show in the popup; legacy entries only carry an id.
    pub fn display_title(&self) -> &str {
        if self.title.is_empty() {
            &self.id
        } else {
            &self.title
        }
    }
}

/// One persisted hidden-set entry. Early versions of the extension stored
/// bare video-id strings; current versions store full records. The untagged
/// enum captures both shapes at the storage boundary so migration can resolve
/// them once, and nothing downstream has to branch on the shape again.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum StoredEntry {
    Id(String),
    Record(VideoRecord),
}
