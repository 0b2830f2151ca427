//! Import facade: raw export text in, categories out.
//!
//! An import is all-or-nothing. Either the full category list is returned
//! or an [`ImportError`] and nothing else.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};
use tracing::{info, instrument};

use crate::domain::BookmarkCategory;

use super::error::ImportError;
use super::limits::ImportLimits;
use super::normalizer::{NormalizeSettings, NormalizeStats, Normalizer};
use super::parser::{decode_source, parse_document, ParseStats, SourceFormat};

/// Summary of one import, for logging and for the persistence layer
#[derive(Debug, Clone, Serialize)]
pub struct ImportReport {
    /// Grammar the source was parsed with
    pub format: SourceFormat,

    /// First 16 hex chars of SHA256 of the raw source
    pub source_digest: String,

    /// When the import ran
    pub imported_at: DateTime<Utc>,

    /// Parser counters
    pub parse: ParseStats,

    /// Normalizer counters
    pub normalize: NormalizeStats,
}

/// Categories plus the report describing how they were produced
#[derive(Debug, Clone)]
pub struct ImportOutcome {
    pub categories: Vec<BookmarkCategory>,
    pub report: ImportReport,
}

/// Runs the parse and normalize passes with fixed settings
#[derive(Debug, Clone, Default)]
pub struct Importer {
    normalizer: Normalizer,
    limits: ImportLimits,
}

impl Importer {
    pub fn new(settings: NormalizeSettings, limits: ImportLimits) -> Self {
        Self {
            normalizer: Normalizer::new(settings),
            limits,
        }
    }

    /// Import a raw bookmark export
    #[instrument(skip(self, raw), fields(bytes = raw.len()))]
    pub fn import(&self, raw: &str) -> Result<ImportOutcome, ImportError> {
        self.limits.validate_input(raw.as_bytes())?;

        let tree = parse_document(raw)?;
        let normalized = self.normalizer.run(&tree.root)?;

        let report = ImportReport {
            format: tree.format,
            source_digest: source_digest(raw),
            imported_at: Utc::now(),
            parse: tree.stats,
            normalize: normalized.stats,
        };

        info!(
            format = %report.format,
            digest = %report.source_digest,
            categories = report.normalize.categories,
            items = report.normalize.items,
            dropped = report.parse.links_without_href
                + report.normalize.invalid_links
                + report.normalize.duplicates_dropped,
            "Bookmark import complete"
        );

        Ok(ImportOutcome {
            categories: normalized.categories,
            report,
        })
    }

    /// Import an export as read from disk; anything but UTF-8 is corrupt input
    pub fn import_bytes(&self, raw: &[u8]) -> Result<ImportOutcome, ImportError> {
        self.limits.validate_input(raw)?;
        self.import(decode_source(raw)?)
    }
}

/// Import with default settings and limits
pub fn import_bookmarks(raw: &str) -> Result<Vec<BookmarkCategory>, ImportError> {
    Importer::default()
        .import(raw)
        .map(|outcome| outcome.categories)
}

/// Digest of the raw source (first 16 chars of SHA256)
pub fn source_digest(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    let result = hasher.finalize();
    hex::encode(&result[..8])
}
