//! Domain types for bookmark import.
//!
//! This module contains the two data shapes of the pipeline:
//! - Tree: the intermediate folder/link parse tree
//! - Bookmark: the normalized category/item model

pub mod bookmark;
pub mod tree;

// Re-export commonly used types
pub use bookmark::{total_items, BookmarkCategory, BookmarkItem, CategoryId, ItemId};
pub use tree::{TempBookmarkItem, TempFolder, TempLink};
