//! Tree parsers: raw bookmark exports to the intermediate tree.
//!
//! Parsers are tolerant: missing per-entry fields never fail a parse. Only a
//! document whose container structure cannot be recovered is rejected.
//! Both parsers build the tree with an explicit stack of open folders.

mod chromium;
mod netscape;

use serde::Serialize;
use tracing::debug;

use crate::domain::{TempBookmarkItem, TempFolder};

use super::error::ParseError;

pub use chromium::ChromiumParser;
pub use netscape::NetscapeParser;

/// Core trait implemented by every source grammar
pub trait TreeParser: Send + Sync {
    /// Parse a raw document into a root folder plus parse statistics
    fn parse(&self, raw: &str) -> Result<ParsedTree, ParseError>;
}

/// Concrete grammar of a bookmark export
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceFormat {
    /// `<!DOCTYPE NETSCAPE-Bookmark-file-1>` HTML export
    NetscapeHtml,

    /// Chromium profile `Bookmarks` JSON file
    ChromiumJson,
}

impl SourceFormat {
    /// Guess the format from the first meaningful character
    pub fn detect(raw: &str) -> Self {
        let trimmed = raw.trim_start_matches('\u{feff}').trim_start();
        if trimmed.starts_with('{') {
            SourceFormat::ChromiumJson
        } else {
            SourceFormat::NetscapeHtml
        }
    }

    /// Parser for this format
    pub fn parser(self) -> &'static dyn TreeParser {
        match self {
            SourceFormat::NetscapeHtml => &NetscapeParser,
            SourceFormat::ChromiumJson => &ChromiumParser,
        }
    }
}

impl std::fmt::Display for SourceFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SourceFormat::NetscapeHtml => write!(f, "netscape-html"),
            SourceFormat::ChromiumJson => write!(f, "chromium-json"),
        }
    }
}

/// Counters collected while parsing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParseStats {
    /// Folders below the root
    pub folders: usize,
    /// Links kept in the tree
    pub links: usize,
    /// Entries dropped because they had no destination
    pub links_without_href: usize,
    /// Nodes ignored because their kind was not recognized
    pub skipped_nodes: usize,
    /// Deepest folder nesting (root = 0)
    pub max_depth: usize,
}

/// Output of a tree parser
#[derive(Debug)]
pub struct ParsedTree {
    /// Root folder of the document
    pub root: TempBookmarkItem,
    /// Grammar that produced the tree
    pub format: SourceFormat,
    /// Parse counters
    pub stats: ParseStats,
}

/// Detect the format of `raw` and parse it
pub fn parse_document(raw: &str) -> Result<ParsedTree, ParseError> {
    let format = SourceFormat::detect(raw);
    debug!(%format, bytes = raw.len(), "Parsing bookmark document");
    format.parser().parse(raw)
}

/// View raw export bytes as text; exports must be UTF-8
pub fn decode_source(raw: &[u8]) -> Result<&str, ParseError> {
    std::str::from_utf8(raw).map_err(|e| ParseError::InvalidEncoding {
        valid_up_to: e.valid_up_to(),
    })
}

/// Parse `raw` into the root folder of its intermediate tree
pub fn parse(raw: &str) -> Result<TempBookmarkItem, ParseError> {
    parse_document(raw).map(|tree| tree.root)
}

/// Stack of folders that are still open during a parse.
///
/// Closing a folder attaches it to its parent; closing the last one yields
/// the root.
pub(crate) struct FolderStack {
    open: Vec<TempFolder>,
    stats: ParseStats,
}

impl FolderStack {
    pub(crate) fn new() -> Self {
        Self {
            open: Vec::new(),
            stats: ParseStats::default(),
        }
    }

    pub(crate) fn depth(&self) -> usize {
        self.open.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.open.is_empty()
    }

    pub(crate) fn stats_mut(&mut self) -> &mut ParseStats {
        &mut self.stats
    }

    pub(crate) fn open(&mut self, title: String) {
        if !self.open.is_empty() {
            self.stats.folders += 1;
            self.stats.max_depth = self.stats.max_depth.max(self.open.len());
        }
        self.open.push(TempFolder::new(title));
    }

    /// Close the innermost folder; returns the root once the last one closes
    pub(crate) fn close(&mut self) -> Option<TempFolder> {
        let folder = self.open.pop()?;
        match self.open.last_mut() {
            Some(parent) => {
                parent.items.push(folder.into());
                None
            }
            None => Some(folder),
        }
    }

    /// Append a link to the innermost folder; false when nothing is open
    pub(crate) fn push_link(&mut self, item: TempBookmarkItem) -> bool {
        match self.open.last_mut() {
            Some(folder) => {
                self.stats.links += 1;
                folder.items.push(item);
                true
            }
            None => false,
        }
    }

    /// Most recently appended child of the innermost folder
    pub(crate) fn last_item_mut(&mut self) -> Option<&mut TempBookmarkItem> {
        self.open.last_mut().and_then(|folder| folder.items.last_mut())
    }

    pub(crate) fn into_stats(self) -> ParseStats {
        self.stats
    }
}
