use serde::Deserialize;

use crate::storage::CollectionId;

/// A remote book as listed by the catalog.
///
/// On the wire this is a positional array `[id, title, author, coverUrlOrEmpty]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(CollectionId, String, String, Option<String>)")]
pub struct RemoteCollection {
    pub id: CollectionId,
    pub title: String,
    pub author: String,
    pub cover_url: String,
}

impl From<(CollectionId, String, String, Option<String>)> for RemoteCollection {
    fn from((id, title, author, cover_url): (CollectionId, String, String, Option<String>)) -> Self {
        Self {
            id,
            title,
            author,
            cover_url: cover_url.unwrap_or_default(),
        }
    }
}

impl RemoteCollection {
    /// Cover links are only rendered when the field looks like a URL
    pub fn has_cover(&self) -> bool {
        self.cover_url.contains("http")
    }
}

/// New highlights for one collection, starting at the requested cursor.
///
/// On the wire this is `[contentBlock, nextCursorOrZero]`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "(String, u64)")]
pub struct RemoteIncrement {
    pub content: String,
    pub next_cursor: u64,
}

impl From<(String, u64)> for RemoteIncrement {
    fn from((content, next_cursor): (String, u64)) -> Self {
        Self {
            content,
            next_cursor,
        }
    }
}

impl RemoteIncrement {
    /// The cursor to store, or `None` when the server sent the `0` sentinel
    pub fn advance_to(&self) -> Option<u64> {
        (self.next_cursor != 0).then_some(self.next_cursor)
    }
}
