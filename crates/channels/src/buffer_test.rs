//! Tests for the history ring

use super::*;

fn texts(lines: &[Line]) -> Vec<&str> {
    lines.iter().map(|l| l.text.as_str()).collect()
}

// ============================================================================
// Basic operations
// ============================================================================

#[test]
fn test_new_ring_is_empty() {
    let ring = HistoryRing::new();
    assert!(ring.is_empty());
    assert_eq!(ring.len(), 0);
    assert_eq!(ring.total_written(), 0);
    assert!(ring.snapshot().is_empty());
}

#[test]
fn test_push_increments_count() {
    let mut ring = HistoryRing::new();

    ring.push(Line::content("a"));
    assert_eq!(ring.len(), 1);

    ring.push(Line::content("b"));
    assert_eq!(ring.len(), 2);
    assert_eq!(ring.total_written(), 2);
}

#[test]
fn test_snapshot_before_full_is_insertion_order() {
    let mut ring = HistoryRing::with_capacity(5);
    for text in ["a", "b", "c"] {
        ring.push(Line::content(text));
    }

    assert_eq!(texts(&ring.snapshot()), ["a", "b", "c"]);
}

#[test]
fn test_last_n_zero() {
    let mut ring = HistoryRing::new();
    ring.push(Line::content("a"));
    assert!(ring.last_n(0).is_empty());
}

// ============================================================================
// Ring behavior
// ============================================================================

#[test]
fn test_overwrite_oldest() {
    let mut ring = HistoryRing::with_capacity(3);
    for text in ["A", "B", "C", "D"] {
        ring.push(Line::content(text));
    }

    assert_eq!(ring.len(), 3);
    assert_eq!(ring.total_written(), 4);
    assert_eq!(texts(&ring.snapshot()), ["B", "C", "D"]);
}

#[test]
fn test_many_wraps_keep_last_capacity() {
    let capacity = 7;

    for n in [0usize, 1, 6, 7, 8, 20, 50] {
        let mut ring = HistoryRing::with_capacity(capacity);
        for i in 0..n {
            ring.push(Line::content(i.to_string()));
        }

        let expected: Vec<String> = (n.saturating_sub(capacity)..n).map(|i| i.to_string()).collect();
        let got: Vec<String> = ring.snapshot().into_iter().map(|l| l.text).collect();
        assert_eq!(got, expected, "after {n} pushes");
    }
}

#[test]
fn test_last_n_partial_after_wrap() {
    let mut ring = HistoryRing::with_capacity(5);
    for i in 0..8 {
        ring.push(Line::content(i.to_string()));
    }

    assert_eq!(texts(&ring.last_n(3)), ["5", "6", "7"]);
}

#[test]
fn test_snapshot_is_detached() {
    let mut ring = HistoryRing::with_capacity(2);
    ring.push(Line::content("a"));
    ring.push(Line::content("b"));

    let snapshot = ring.snapshot();
    ring.push(Line::content("c"));

    assert_eq!(texts(&snapshot), ["a", "b"]);
    assert_eq!(texts(&ring.snapshot()), ["b", "c"]);
}

// ============================================================================
// Capacity tests
// ============================================================================

#[test]
fn test_default_capacity() {
    assert_eq!(HistoryRing::new().capacity(), 1000);
}

#[test]
fn test_zero_capacity_clamped() {
    let mut ring = HistoryRing::with_capacity(0);
    assert_eq!(ring.capacity(), 1);

    ring.push(Line::content("a"));
    ring.push(Line::content("b"));
    assert_eq!(texts(&ring.snapshot()), ["b"]);
}
