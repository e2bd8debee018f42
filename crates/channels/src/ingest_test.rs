//! Tests for the ingestion driver

use std::io::{self, Write};

use super::*;
use crate::channel::{Channel, ChannelOptions};
use crate::filter::LineFilter;
use crate::registry::STDIN_ID;

struct BrokenSink;

impl Write for BrokenSink {
    fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed"))
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn registry() -> Registry {
    Registry::bootstrap("", Box::new(io::sink()), ChannelOptions::default()).unwrap()
}

fn stdin_texts(registry: &Registry) -> Vec<String> {
    registry
        .lookup(STDIN_ID)
        .unwrap()
        .history()
        .into_iter()
        .map(|l| l.text)
        .collect()
}

#[tokio::test]
async fn test_drive_reads_every_line_in_order() {
    let registry = registry();
    let input: &[u8] = b"one\ntwo\nthree\n";

    let stats = drive(input, &registry).await.unwrap();

    assert_eq!(stats, IngestStats { lines: 3, truncated: 0, sink_failures: 0 });
    assert_eq!(stdin_texts(&registry), ["one", "two", "three"]);
}

#[tokio::test]
async fn test_drive_handles_crlf_and_missing_final_newline() {
    let registry = registry();
    let input: &[u8] = b"a\r\n\nb";

    let stats = drive(input, &registry).await.unwrap();

    assert_eq!(stats.lines, 3);
    assert_eq!(stdin_texts(&registry), ["a", "", "b"]);
}

#[tokio::test]
async fn test_drive_replaces_invalid_utf8() {
    let registry = registry();
    let input: &[u8] = b"ok \xff\n";

    drive(input, &registry).await.unwrap();

    assert_eq!(stdin_texts(&registry), ["ok \u{fffd}"]);
}

#[tokio::test]
async fn test_drive_fans_out_to_filtered_channels() {
    let registry = registry();
    let errors = registry
        .add(Channel::new("errors", LineFilter::compile("^ERR").unwrap()))
        .unwrap();
    let input: &[u8] = b"ERR a\ninfo\nERR b\n";

    drive(input, &registry).await.unwrap();

    let texts: Vec<String> = errors.history().into_iter().map(|l| l.text).collect();
    assert_eq!(texts, ["ERR a", "ERR b"]);
}

#[tokio::test]
async fn test_drive_continues_after_sink_failures() {
    let registry = Registry::bootstrap("", Box::new(BrokenSink), ChannelOptions::default()).unwrap();
    let input: &[u8] = b"x\ny\n";

    let stats = drive(input, &registry).await.unwrap();

    assert_eq!(stats, IngestStats { lines: 2, truncated: 0, sink_failures: 2 });
    assert_eq!(stdin_texts(&registry), ["x", "y"]);
}

#[tokio::test]
async fn test_drive_empty_input() {
    let registry = registry();
    let stats = drive(&b""[..], &registry).await.unwrap();
    assert_eq!(stats, IngestStats::default());
}

#[tokio::test]
async fn test_drive_truncates_overlong_line() {
    let registry = registry();
    let mut input = vec![b'a'; MAX_LINE_BYTES + 4464];
    input.extend_from_slice(b"\nnext\n");

    let stats = drive(&input[..], &registry).await.unwrap();

    assert_eq!(stats.lines, 2);
    assert_eq!(stats.truncated, 1);
    let texts = stdin_texts(&registry);
    assert_eq!(texts[0].len(), MAX_LINE_BYTES);
    assert_eq!(texts[1], "next");
}

#[tokio::test]
async fn test_drive_line_exactly_at_limit_is_whole() {
    let registry = registry();
    let mut input = vec![b'b'; MAX_LINE_BYTES];
    input.extend_from_slice(b"\nafter\n");

    let stats = drive(&input[..], &registry).await.unwrap();

    assert_eq!(stats.lines, 2);
    assert_eq!(stats.truncated, 0);
    assert_eq!(stdin_texts(&registry)[1], "after");
}
