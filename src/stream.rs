use std::io::{self, BufRead, Write};

use crate::error::{ExtractError, LoadError};
use crate::models::CommitRecord;

/// Serialize records to a line-delimited JSON stream, one record per line.
///
/// Each line is flushed as it is written so a piped consumer sees records
/// incrementally. A consumer closing the pipe early is not an error: the
/// stream stops cleanly and the count of records already handed over is
/// returned. A record that fails to normalize aborts the stream before
/// anything partial is emitted for it.
pub fn write_records<W, I>(records: I, mut out: W) -> anyhow::Result<usize>
where
    W: Write,
    I: IntoIterator<Item = Result<CommitRecord, ExtractError>>,
{
    let mut written = 0;

    for record in records {
        let record = record?;
        let line = serde_json::to_string(&record)?;
        if let Err(e) = writeln!(out, "{line}").and_then(|_| out.flush()) {
            if e.kind() == io::ErrorKind::BrokenPipe {
                tracing::debug!("Output closed after {} records, stopping early", written);
                return Ok(written);
            }
            return Err(e.into());
        }
        written += 1;
    }

    Ok(written)
}

/// Parse a record stream line by line.
///
/// Blank lines are skipped; a line that does not parse into the record shape
/// fails with the 1-based line number rather than being silently dropped.
pub fn read_records<R: BufRead>(input: R) -> impl Iterator<Item = Result<CommitRecord, LoadError>> {
    input
        .lines()
        .enumerate()
        .filter_map(|(idx, line)| match line {
            Ok(line) if line.trim().is_empty() => None,
            Ok(line) => Some(
                serde_json::from_str(&line).map_err(|source| LoadError::MalformedRecord {
                    line: idx + 1,
                    source,
                }),
            ),
            Err(e) => Some(Err(LoadError::Io(e))),
        })
}
