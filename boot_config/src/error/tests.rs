//! Unit tests for error rendering and aggregation behaviour.

use rstest::rstest;
use std::sync::Arc;

use super::{BootError, SessionFailure};

#[test]
fn no_failures_yield_no_error() {
    assert!(BootError::from_sessions(Vec::new()).is_none());
}

#[test]
fn single_failure_is_passed_through() {
    let original = BootError::not_found("a.js", None);
    let outcome = BootError::from_sessions(vec![SessionFailure::new("a.js", Arc::clone(&original))]);
    assert!(
        outcome.is_some_and(|err| Arc::ptr_eq(&err, &original)),
        "single failure should be returned as is"
    );
}

#[test]
fn aggregate_lists_each_root_in_order() {
    let outcome = BootError::from_sessions(vec![
        SessionFailure::new("a.js", BootError::not_found("a.js", None)),
        SessionFailure::new("b.js", BootError::cycle(["b.js", "c.js"], "b.js")),
    ]);
    let Some(err) = outcome else {
        panic!("expected an aggregate error");
    };
    assert_eq!(
        err.to_string(),
        "multiple composition errors:\n  1. a.js: document 'a.js' not found\n  2. b.js: cyclic reference detected: b.js -> c.js -> b.js"
    );
}

#[rstest]
#[case(None, "document 'x.js' not found")]
#[case(Some("boot.js"), "document 'x.js' not found (referenced from 'boot.js')")]
fn not_found_mentions_referencing_document(
    #[case] referenced_from: Option<&str>,
    #[case] expected: &str,
) {
    let err = BootError::not_found("x.js", referenced_from);
    assert_eq!(err.to_string(), expected);
}

#[test]
fn malformed_renders_location() {
    let err = BootError::malformed("a.js", "line 3, column 7", "expected ':'");
    assert_eq!(
        err.to_string(),
        "malformed document 'a.js' at line 3, column 7: expected ':'"
    );
}
