//! Ingestion driver
//!
//! Reads the external line source and pushes each line into every channel
//! of a [`Registry`]. Lines are fanned out one at a time, in input order:
//! the next line is not read until the previous one has reached every
//! channel. Sink failures are logged and counted, never fatal.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt};
use tracing::{debug, warn};

use crate::registry::Registry;

/// Longest line kept, in bytes; the rest of a longer line is discarded
pub const MAX_LINE_BYTES: usize = 64 * 1024;

/// Counters from one ingestion run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct IngestStats {
    /// Lines read from the source
    pub lines: u64,
    /// Lines cut at [`MAX_LINE_BYTES`]
    pub truncated: u64,
    /// Per-channel sink write failures
    pub sink_failures: u64,
}

/// Drive `reader` to end-of-input, broadcasting every line
///
/// Trailing `\n` / `\r\n` are stripped. Invalid UTF-8 is replaced rather
/// than rejected, so binary noise on the input never stops ingestion.
/// A line longer than [`MAX_LINE_BYTES`] is delivered truncated and the
/// remainder up to its newline is skipped.
///
/// # Errors
///
/// Returns an I/O error only if reading the source fails.
pub async fn drive<R>(mut reader: R, registry: &Registry) -> std::io::Result<IngestStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut stats = IngestStats::default();
    let mut buf = Vec::with_capacity(4096);

    loop {
        buf.clear();
        let read = (&mut reader)
            .take(MAX_LINE_BYTES as u64)
            .read_until(b'\n', &mut buf)
            .await?;
        if read == 0 {
            break;
        }

        if buf.len() == MAX_LINE_BYTES && buf.last() != Some(&b'\n') {
            let skipped = skip_line(&mut reader).await?;
            if skipped > 0 {
                warn!(kept = MAX_LINE_BYTES, skipped, "line too long, truncated");
                stats.truncated += 1;
            }
        }

        let line = String::from_utf8_lossy(trim_newline(&buf));
        stats.lines += 1;

        if let Err(e) = registry.ingest_all(&line) {
            for failure in &e.failures {
                warn!(error = %failure, "sink write failed");
            }
            stats.sink_failures += e.failures.len() as u64;
        }
    }

    debug!(
        lines = stats.lines,
        truncated = stats.truncated,
        sink_failures = stats.sink_failures,
        "end of input"
    );

    Ok(stats)
}

/// Consume through the next newline (or end-of-input), returning the
/// number of bytes dropped before it
async fn skip_line<R>(reader: &mut R) -> std::io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut skipped = 0;
    loop {
        let available = reader.fill_buf().await?;
        if available.is_empty() {
            return Ok(skipped);
        }

        match available.iter().position(|&b| b == b'\n') {
            Some(pos) => {
                reader.consume(pos + 1);
                return Ok(skipped + pos);
            }
            None => {
                let len = available.len();
                reader.consume(len);
                skipped += len;
            }
        }
    }
}

fn trim_newline(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}

#[cfg(test)]
#[path = "ingest_test.rs"]
mod tests;
