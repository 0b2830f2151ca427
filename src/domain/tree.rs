//! Intermediate parse tree produced by the tree parsers.
//!
//! The tree mirrors the source document one-to-one: folders nest to any
//! depth and children keep document order. No defaulting happens here.

use serde::{Deserialize, Serialize};

/// A node of the intermediate tree: either a folder or a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TempBookmarkItem {
    /// Container node with ordered children
    Folder(TempFolder),

    /// Leaf node pointing at a destination
    Link(TempLink),
}

/// A folder in the intermediate tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempFolder {
    /// Display text (may be empty in malformed input)
    pub title: String,

    /// Children in document order
    #[serde(default)]
    pub items: Vec<TempBookmarkItem>,
}

/// A link in the intermediate tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TempLink {
    /// Display text (may be empty in malformed input)
    pub title: String,

    /// Raw destination as written in the source, never empty
    pub link: String,

    /// Favicon reference or inline data URI
    #[serde(default)]
    pub icon: Option<String>,

    /// Free-form description attached to the link
    #[serde(default)]
    pub desc: Option<String>,
}

impl TempBookmarkItem {
    /// Create a link node without icon or description
    pub fn link(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self::Link(TempLink::new(title, link))
    }

    /// Display text of the node
    pub fn title(&self) -> &str {
        match self {
            Self::Folder(folder) => &folder.title,
            Self::Link(link) => &link.title,
        }
    }

    pub fn as_folder(&self) -> Option<&TempFolder> {
        match self {
            Self::Folder(folder) => Some(folder),
            Self::Link(_) => None,
        }
    }
}

impl TempFolder {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            items: Vec::new(),
        }
    }

    /// Builder-style child append
    pub fn with_item(mut self, item: TempBookmarkItem) -> Self {
        self.items.push(item);
        self
    }
}

impl From<TempFolder> for TempBookmarkItem {
    fn from(folder: TempFolder) -> Self {
        Self::Folder(folder)
    }
}

impl From<TempLink> for TempBookmarkItem {
    fn from(link: TempLink) -> Self {
        Self::Link(link)
    }
}

// Children are released through an explicit stack so that dropping a very
// deep tree never recurses once per nesting level.
impl Drop for TempFolder {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.items);
        while let Some(item) = pending.pop() {
            if let TempBookmarkItem::Folder(mut folder) = item {
                pending.append(&mut folder.items);
            }
        }
    }
}

impl TempLink {
    pub fn new(title: impl Into<String>, link: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            icon: None,
            desc: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }
}
