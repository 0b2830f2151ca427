//! The normalized, consumer-facing bookmark model.
//!
//! Exactly two levels: categories own their items. Values are built once per
//! normalization pass and never mutated afterwards.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a category, fresh for every normalization run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryId(Uuid);

/// Identifier of an item, unique across all categories of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(Uuid);

impl CategoryId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl ItemId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for CategoryId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A top-level grouping of bookmarks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkCategory {
    /// Unique within one normalization run
    pub id: CategoryId,

    /// Display name, never empty
    pub title: String,

    /// Items in source order, unique by id
    pub items: Vec<BookmarkItem>,
}

/// A single bookmark
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookmarkItem {
    /// Unique across every category of a run
    pub id: ItemId,

    /// Display text, never empty
    pub title: String,

    /// Destination as written by the author; always parses as a URL
    pub link: String,

    /// Resolved icon, serialized as `null` when unknown
    pub icon: Option<String>,

    /// Description, empty when the source had none
    pub desc: String,
}

impl BookmarkCategory {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Total number of items across categories
pub fn total_items(categories: &[BookmarkCategory]) -> usize {
    categories.iter().map(BookmarkCategory::len).sum()
}
