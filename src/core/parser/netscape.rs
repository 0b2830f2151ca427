//! Parser for Netscape bookmark HTML exports.
//!
//! The format is HTML in name only: `<DT>` and `<p>` are never closed and
//! every browser writes it slightly differently. Containers are `<DL>`
//! blocks; a folder is an `<H3>` heading followed by its `<DL>`, a link is an
//! `<A HREF=…>` optionally followed by a `<DD>` description.
//!
//! ```text
//! <!DOCTYPE NETSCAPE-Bookmark-file-1>
//! <H1>Bookmarks</H1>
//! <DL><p>
//!     <DT><H3>Work</H3>
//!     <DL><p>
//!         <DT><A HREF="https://mail.example.com" ICON="data:…">Mail</A>
//!         <DD>Team inbox
//!     </DL><p>
//! </DL><p>
//! ```

use std::cell::RefCell;

use html5ever::tendril::StrTendril;
use html5ever::tokenizer::{
    BufferQueue, Tag, TagKind, Token, TokenSink, TokenSinkResult, Tokenizer, TokenizerOpts,
};
use tracing::{debug, warn};

use crate::domain::{TempBookmarkItem, TempFolder, TempLink};

use super::{FolderStack, ParseStats, ParsedTree, SourceFormat, TreeParser};
use crate::core::error::ParseError;

/// Tree parser for `NETSCAPE-Bookmark-file-1` documents
#[derive(Debug, Clone, Copy, Default)]
pub struct NetscapeParser;

impl TreeParser for NetscapeParser {
    fn parse(&self, raw: &str) -> Result<ParsedTree, ParseError> {
        let state = RefCell::new(SinkState::new());

        let tokenizer = Tokenizer::new(BookmarkSink { state: &state }, TokenizerOpts::default());
        let input = BufferQueue::default();
        input.push_back(StrTendril::from_slice(raw));
        let _ = tokenizer.feed(&input);
        tokenizer.end();
        drop(tokenizer);

        let SinkState { builder, error, .. } = state.into_inner();
        if let Some(error) = error {
            return Err(error);
        }

        let (root, stats) = builder.finish()?;
        debug!(
            folders = stats.folders,
            links = stats.links,
            dropped = stats.links_without_href,
            "Parsed Netscape bookmark document"
        );

        Ok(ParsedTree {
            root: root.into(),
            format: SourceFormat::NetscapeHtml,
            stats,
        })
    }
}

// ============================================================================
// Token sink
// ============================================================================

struct SinkState {
    builder: TreeBuilder,
    /// Set once the root container closed or the structure broke
    stopped: bool,
    error: Option<ParseError>,
}

impl SinkState {
    fn new() -> Self {
        Self {
            builder: TreeBuilder::new(),
            stopped: false,
            error: None,
        }
    }
}

/// Feeds html5ever tokens into the tree builder
struct BookmarkSink<'a> {
    state: &'a RefCell<SinkState>,
}

impl TokenSink for BookmarkSink<'_> {
    type Handle = ();

    fn process_token(&self, token: Token, line_number: u64) -> TokenSinkResult<()> {
        let mut state = self.state.borrow_mut();
        if state.stopped {
            return TokenSinkResult::Continue;
        }

        let step = match token {
            Token::TagToken(tag) => match tag.kind {
                TagKind::StartTag => Ok(state.builder.start_tag(&tag)),
                TagKind::EndTag => state.builder.end_tag(&tag.name, line_number),
            },
            Token::CharacterTokens(text) => {
                state.builder.push_text(&text);
                Ok(false)
            }
            // Doctype, comments, NULs and recoverable tokenizer complaints
            _ => Ok(false),
        };

        match step {
            Ok(false) => {}
            Ok(true) => state.stopped = true,
            Err(error) => {
                state.error = Some(error);
                state.stopped = true;
            }
        }
        TokenSinkResult::Continue
    }
}

/// Value of attribute `name`; the tokenizer has already lower-cased names
/// and decoded character references
fn attribute(tag: &Tag, name: &str) -> Option<String> {
    tag.attrs
        .iter()
        .find(|attr| &*attr.name.local == name)
        .map(|attr| attr.value.trim().to_string())
}

/// Collapse runs of whitespace and trim
fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Tree builder
// ============================================================================

struct LinkDraft {
    href: String,
    icon: Option<String>,
    title: String,
}

/// What the text currently being read belongs to
enum Capture {
    Nothing,
    DocumentTitle(String),
    FolderTitle(String),
    Link(LinkDraft),
    Description { text: String, attach: bool },
}

struct TreeBuilder {
    stack: FolderStack,
    capture: Capture,
    /// `<H3>` seen, its `<DL>` not yet
    pending_folder: Option<String>,
    document_title: Option<String>,
    link_just_closed: bool,
    root: Option<TempFolder>,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: FolderStack::new(),
            capture: Capture::Nothing,
            pending_folder: None,
            document_title: None,
            link_just_closed: false,
            root: None,
        }
    }

    /// Handle an opening tag; returns true once the rest of the input is
    /// irrelevant
    fn start_tag(&mut self, tag: &Tag) -> bool {
        match &*tag.name {
            "h1" => {
                self.finish_capture();
                self.capture = Capture::DocumentTitle(String::new());
            }
            "h3" => {
                self.finish_capture();
                self.flush_pending_folder();
                self.link_just_closed = false;
                self.capture = Capture::FolderTitle(String::new());
            }
            "a" => {
                self.finish_capture();
                self.flush_pending_folder();
                let icon = attribute(tag, "icon")
                    .filter(|icon| !icon.is_empty())
                    .or_else(|| attribute(tag, "icon_uri"))
                    .filter(|icon| !icon.is_empty());
                self.capture = Capture::Link(LinkDraft {
                    href: attribute(tag, "href").unwrap_or_default(),
                    icon,
                    title: String::new(),
                });
            }
            "dd" => {
                self.finish_capture();
                let attach = self.link_just_closed && self.pending_folder.is_none();
                self.capture = Capture::Description {
                    text: String::new(),
                    attach,
                };
            }
            "dt" => {
                self.finish_capture();
                self.flush_pending_folder();
                self.link_just_closed = false;
            }
            "dl" => {
                self.finish_capture();
                self.link_just_closed = false;
                if self.root.is_some() {
                    warn!("Ignoring content after the root bookmark container");
                    return true;
                }
                let title = match self.pending_folder.take() {
                    Some(title) => title,
                    None if self.stack.is_empty() => {
                        self.document_title.clone().unwrap_or_default()
                    }
                    None => String::new(),
                };
                self.stack.open(title);
            }
            _ => {}
        }
        false
    }

    /// Handle a closing tag; returns true once the rest of the input is
    /// irrelevant
    fn end_tag(&mut self, name: &str, line: u64) -> Result<bool, ParseError> {
        match name {
            "h1" | "h3" | "a" => self.finish_capture(),
            "dl" => {
                self.finish_capture();
                self.flush_pending_folder();
                self.link_just_closed = false;
                if self.root.is_some() {
                    return Ok(true);
                }
                if self.stack.is_empty() {
                    return Err(ParseError::UnbalancedClose {
                        tag: name.to_string(),
                        line,
                    });
                }
                if let Some(root) = self.stack.close() {
                    self.root = Some(root);
                }
            }
            _ => {}
        }
        Ok(false)
    }

    fn push_text(&mut self, text: &str) {
        let buffer = match &mut self.capture {
            Capture::Nothing => return,
            Capture::DocumentTitle(text) | Capture::FolderTitle(text) => text,
            Capture::Link(draft) => &mut draft.title,
            Capture::Description { text, .. } => text,
        };
        buffer.push_str(text);
    }

    /// Close whatever text capture is in progress
    fn finish_capture(&mut self) {
        match std::mem::replace(&mut self.capture, Capture::Nothing) {
            Capture::Nothing => {}
            Capture::DocumentTitle(text) => {
                self.document_title = Some(clean_text(&text));
            }
            Capture::FolderTitle(text) => {
                self.pending_folder = Some(clean_text(&text));
            }
            Capture::Link(draft) => self.finish_link(draft),
            Capture::Description { text, attach } => {
                let desc = clean_text(&text);
                if !attach || desc.is_empty() {
                    return;
                }
                if let Some(TempBookmarkItem::Link(link)) = self.stack.last_item_mut() {
                    if link.desc.is_none() {
                        link.desc = Some(desc);
                    }
                }
            }
        }
    }

    fn finish_link(&mut self, draft: LinkDraft) {
        let title = clean_text(&draft.title);

        if draft.href.is_empty() {
            debug!(%title, "Dropping bookmark without a destination");
            self.stack.stats_mut().links_without_href += 1;
            return;
        }

        let mut link = TempLink::new(title, draft.href);
        link.icon = draft.icon;

        if self.stack.push_link(link.into()) {
            self.link_just_closed = true;
        } else {
            warn!("Ignoring bookmark outside of any container");
            self.stack.stats_mut().skipped_nodes += 1;
        }
    }

    /// An `<H3>` with no `<DL>` of its own is an empty folder
    fn flush_pending_folder(&mut self) {
        let Some(title) = self.pending_folder.take() else {
            return;
        };
        if self.stack.is_empty() {
            self.stack.stats_mut().skipped_nodes += 1;
            return;
        }
        self.stack.open(title);
        self.stack.close();
    }

    fn finish(mut self) -> Result<(TempFolder, ParseStats), ParseError> {
        self.finish_capture();

        if let Some(root) = self.root.take() {
            return Ok((root, self.stack.into_stats()));
        }
        if !self.stack.is_empty() {
            return Err(ParseError::UnterminatedContainer {
                open: self.stack.depth(),
            });
        }
        Err(ParseError::MissingRootContainer {
            format: "Netscape HTML",
        })
    }
}
