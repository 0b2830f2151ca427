//! Resource limits applied before an import starts.
//!
//! The pipeline itself is a single pass over memory, so the only thing worth
//! bounding up front is how much raw text we accept.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Limits for a single import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportLimits {
    /// Maximum raw input size in bytes (default: 16MB)
    #[serde(default = "default_max_input_bytes")]
    pub max_input_bytes: u64,
}

fn default_max_input_bytes() -> u64 {
    16 * 1024 * 1024
} // 16MB

impl Default for ImportLimits {
    fn default() -> Self {
        Self {
            max_input_bytes: default_max_input_bytes(),
        }
    }
}

impl ImportLimits {
    /// Validate raw input against size limits
    pub fn validate_input(&self, input: &[u8]) -> Result<(), LimitViolation> {
        let size = input.len() as u64;
        if size > self.max_input_bytes {
            return Err(LimitViolation::MaxInputBytes {
                actual: size,
                limit: self.max_input_bytes,
            });
        }
        Ok(())
    }
}

/// Limit violation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LimitViolation {
    #[error("Maximum input bytes exceeded: {actual} > {limit}")]
    MaxInputBytes { actual: u64, limit: u64 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = ImportLimits::default();
        assert_eq!(limits.max_input_bytes, 16 * 1024 * 1024);
    }

    #[test]
    fn test_input_validation() {
        let limits = ImportLimits {
            max_input_bytes: 100,
        };

        assert!(limits.validate_input(b"short").is_ok());
        assert!(limits.validate_input("x".repeat(100).as_bytes()).is_ok());

        let result = limits.validate_input("x".repeat(200).as_bytes());
        assert_eq!(
            result,
            Err(LimitViolation::MaxInputBytes {
                actual: 200,
                limit: 100
            })
        );
    }
}
