//! Import Limits Integration Tests
//!
//! Tests for input size enforcement and how failures are classified.

use marknav::core::{
    ImportError, ImportLimits, Importer, LimitViolation, NormalizeSettings, ParseError,
};

fn importer_with_limit(max_input_bytes: u64) -> Importer {
    Importer::new(NormalizeSettings::default(), ImportLimits { max_input_bytes })
}

const SMALL_EXPORT: &str = "<DL><DT><A HREF=\"https://a.example.com\">A</A></DL>";

#[test]
fn test_input_within_limit() {
    let importer = importer_with_limit(1024);
    let outcome = importer.import(SMALL_EXPORT).unwrap();
    assert_eq!(outcome.categories.len(), 1);
}

#[test]
fn test_input_at_exact_limit() {
    let importer = importer_with_limit(SMALL_EXPORT.len() as u64);
    assert!(importer.import(SMALL_EXPORT).is_ok());
}

#[test]
fn test_input_exceeding_limit() {
    let importer = importer_with_limit(10);
    let result = importer.import(SMALL_EXPORT);

    match result {
        Err(ImportError::Limit(LimitViolation::MaxInputBytes { actual, limit })) => {
            assert_eq!(actual, SMALL_EXPORT.len() as u64);
            assert_eq!(limit, 10);
        }
        other => panic!("Expected MaxInputBytes violation, got {:?}", other.map(|o| o.categories)),
    }
}

#[test]
fn test_limit_checked_before_structure() {
    // Oversized and malformed: the size limit is reported, not the parse error
    let importer = importer_with_limit(4);
    let err = importer.import("<DL><DL>").unwrap_err();
    assert!(matches!(err, ImportError::Limit(_)));
}

#[test]
fn test_structural_errors_are_corrupt_input() {
    let importer = Importer::default();

    for raw in ["no containers at all", "<DL><DT>", "</DL>", "<DL><A HREF=\"x", "{\"roots\": "] {
        let err = importer.import(raw).unwrap_err();
        assert!(err.is_corrupt_input(), "{:?} should be corrupt input", raw);
        assert!(matches!(err, ImportError::Parse(_)));
    }
}

#[test]
fn test_parse_error_messages_name_the_problem() {
    let err = Importer::default().import("<DL><DL></DL>").unwrap_err();
    match err {
        ImportError::Parse(ParseError::UnterminatedContainer { open }) => assert_eq!(open, 1),
        other => panic!("Expected unterminated container, got {}", other),
    }
}
