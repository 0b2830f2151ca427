//! Error taxonomy for the import pipeline.
//!
//! Only structural failures are errors. Data-quality problems (missing
//! titles, duplicate links, empty folders) are resolved by policy and show
//! up as counters in the stats instead.

use thiserror::Error;

use super::limits::LimitViolation;

/// The raw source is not a structurally valid nested container document
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("No root container found in {format} document")]
    MissingRootContainer { format: &'static str },

    #[error("Unterminated container: {open} still open at end of input")]
    UnterminatedContainer { open: usize },

    #[error("Unbalanced closing tag </{tag}> on line {line}")]
    UnbalancedClose { tag: String, line: u64 },

    #[error("Input is not valid UTF-8 (first bad byte at {valid_up_to})")]
    InvalidEncoding { valid_up_to: usize },

    #[error("Invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("Unexpected JSON shape: {0}")]
    UnexpectedShape(String),
}

/// The caller handed the normalizer something it cannot accept
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("Root node must be a folder, got a link titled {title:?}")]
    RootNotFolder { title: String },
}

/// Any failure that aborts an import
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to parse bookmark document: {0}")]
    Parse(#[from] ParseError),

    #[error("Internal error while normalizing bookmarks: {0}")]
    Normalization(#[from] NormalizationError),

    #[error("Import rejected: {0}")]
    Limit(#[from] LimitViolation),
}

impl ImportError {
    /// True when the input itself is unreadable or corrupt, as opposed to a
    /// programming error upstream
    pub fn is_corrupt_input(&self) -> bool {
        matches!(self, ImportError::Parse(_) | ImportError::Limit(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ParseError::UnterminatedContainer { open: 2 };
        assert_eq!(
            err.to_string(),
            "Unterminated container: 2 still open at end of input"
        );

        let err = NormalizationError::RootNotFolder {
            title: "Mail".to_string(),
        };
        assert!(err.to_string().contains("\"Mail\""));
    }

    #[test]
    fn test_corrupt_input_classification() {
        let parse: ImportError = ParseError::InvalidEncoding { valid_up_to: 4 }.into();
        assert!(parse.is_corrupt_input());

        let internal: ImportError = NormalizationError::RootNotFolder {
            title: String::new(),
        }
        .into();
        assert!(!internal.is_corrupt_input());
    }
}
