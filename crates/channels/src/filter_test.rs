//! Tests for line filters

use super::*;

// ============================================================================
// Matching
// ============================================================================

#[test]
fn test_none_matches_everything() {
    let filter = LineFilter::none();
    assert!(filter.is_none());
    assert!(filter.matches(""));
    assert!(filter.matches("anything at all"));
}

#[test]
fn test_anchored_pattern() {
    let filter = LineFilter::compile("^ERR").unwrap();
    assert!(filter.matches("ERR disk full"));
    assert!(!filter.matches("info: ok"));
    assert!(!filter.matches("an ERR in the middle"));
}

#[test]
fn test_unanchored_pattern_matches_anywhere() {
    let filter = LineFilter::compile("timeout").unwrap();
    assert!(filter.matches("request timeout after 30s"));
    assert!(!filter.matches("request ok"));
}

#[test]
fn test_empty_pattern_matches_everything() {
    let filter = LineFilter::compile("").unwrap();
    assert!(!filter.is_none());
    assert!(filter.matches("x"));
    assert!(filter.matches(""));
}

// ============================================================================
// Compilation
// ============================================================================

#[test]
fn test_invalid_pattern() {
    let result = LineFilter::compile("(unclosed");
    match result {
        Err(ChannelError::InvalidPattern { pattern, .. }) => assert_eq!(pattern, "(unclosed"),
        other => panic!("expected InvalidPattern, got {other:?}"),
    }
}

#[test]
fn test_parse_empty_is_none() {
    let filter = LineFilter::parse("").unwrap();
    assert!(filter.is_none());
    assert!(filter.matches("x"));
}

#[test]
fn test_parse_compiles_non_empty() {
    let filter = LineFilter::parse("^a").unwrap();
    assert!(!filter.is_none());
    assert!(!filter.matches("ba"));
    assert!(LineFilter::parse("(").is_err());
}

#[test]
fn test_as_str_is_source_pattern() {
    assert_eq!(LineFilter::compile(r"\d+ms").unwrap().as_str(), r"\d+ms");
    assert_eq!(LineFilter::none().as_str(), "");
}

#[test]
fn test_same_as() {
    let a = LineFilter::compile("^ERR").unwrap();
    let b = LineFilter::compile("^ERR").unwrap();
    let c = LineFilter::compile("^WARN").unwrap();

    assert!(a.same_as(&b));
    assert!(!a.same_as(&c));
    assert!(LineFilter::none().same_as(&LineFilter::compile("").unwrap()));
}

// ============================================================================
// Rewrite
// ============================================================================

#[test]
fn test_rewrite_with_groups() {
    let filter = LineFilter::compile(r"user=(\w+)").unwrap();
    assert_eq!(filter.rewrite("login user=alice ok", "[$1]"), "login [alice] ok");
}

#[test]
fn test_rewrite_named_group() {
    let filter = LineFilter::compile(r"(?P<code>\d{3})").unwrap();
    assert_eq!(filter.rewrite("status 404", "code=${code}"), "status code=404");
}

#[test]
fn test_rewrite_empty_template_is_noop() {
    let filter = LineFilter::compile("a").unwrap();
    assert!(matches!(filter.rewrite("banana", ""), Cow::Borrowed("banana")));
}

#[test]
fn test_rewrite_none_filter_is_noop() {
    assert_eq!(LineFilter::none().rewrite("banana", "x"), "banana");
}
