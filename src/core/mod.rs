//! Core import pipeline.
//!
//! This module contains:
//! - Parser: raw export to intermediate tree (Netscape HTML, Chromium JSON)
//! - Normalizer: intermediate tree to categories
//! - LinkKey: duplicate and title-defaulting rules
//! - Limits: input size limits
//! - Importer: the composed pipeline

pub mod error;
pub mod importer;
pub mod limits;
pub mod link_key;
pub mod normalizer;
pub mod parser;

// Re-export commonly used types
pub use error::{ImportError, NormalizationError, ParseError};
pub use importer::{import_bookmarks, source_digest, ImportOutcome, ImportReport, Importer};
pub use limits::{ImportLimits, LimitViolation};
pub use link_key::{link_key, DEDUP_KEY_POLICY};
pub use normalizer::{
    normalize, NormalizeSettings, NormalizeStats, Normalized, Normalizer, UNCATEGORIZED_TITLE,
    UNTITLED_TITLE,
};
pub use parser::{
    decode_source, parse, parse_document, ChromiumParser, NetscapeParser, ParseStats, ParsedTree, SourceFormat,
    TreeParser,
};
