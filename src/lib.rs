//! marknav - Browser bookmark export importer
//!
//! Converts a browser bookmark export (a nested folder/link document) into a
//! flat list of categories, each holding an ordered list of bookmarks.
//!
//! # Architecture
//!
//! The import is a pure, synchronous two-pass pipeline:
//! - Parse: raw text to an intermediate folder/link tree, tolerant of
//!   missing fields, strict about container structure
//! - Normalize: tree to categories, hoisting nested folders, assigning fresh
//!   ids, defaulting titles/icons/descriptions and dropping duplicates
//!
//! # Modules
//!
//! - `core`: Parsers, normalizer, limits and the composed importer
//! - `domain`: Data structures (intermediate tree, categories, items)
//! - `config`: Config file and environment resolution
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Import an export file
//! marknav import --input bookmarks.html --pretty
//!
//! # Show the parsed tree
//! marknav inspect --input bookmarks.html
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;

// Re-export main types at crate root for convenience
pub use crate::core::{
    import_bookmarks, normalize, parse, ImportError, ImportOutcome, ImportReport, Importer,
    NormalizationError, ParseError,
};
pub use crate::domain::{BookmarkCategory, BookmarkItem, TempBookmarkItem, TempFolder, TempLink};
