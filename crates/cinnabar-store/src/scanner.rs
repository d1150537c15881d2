//! Streaming index scanner.
//!
//! Reads an index file top to bottom and yields one parsed [`Record`] per
//! header line, reconstructing each record's byte-accurate placement as it
//! goes. The scanner maintains a byte cursor into the index file: inline
//! payloads (and sidecar annotations) start exactly where the header line
//! ends, so their offsets are known only to the reader, never written to
//! disk.
//!
//! Empty lines are skipped but still advance the cursor. The final line may
//! lack its LF and is still valid. An empty file yields no records.

use std::io::BufRead;
use std::sync::Arc;

use bytes::Bytes;
use cinnabar_types::Placement;

use crate::record::{HeaderPlacement, Record, parse_header};
use crate::{Result, StoreError};

/// One scanned index entry: the record plus any bytes that followed its
/// header line (inline payloads and sidecar annotations), captured so the
/// caller can hand them to an observer without a second read.
#[derive(Debug)]
pub(crate) struct ScannedRecord {
    pub record: Record,
    pub inline: Option<Bytes>,
}

/// Streaming scanner over an index file.
///
/// Yields `Result<ScannedRecord>` lazily via [`Iterator`]. The kind hook
/// lets the caller intern kind strings so duplicate kinds share storage.
pub(crate) struct IndexScanner<R, F> {
    reader: R,
    intern: F,
    /// Byte cursor into the index file.
    pos: u64,
    /// 1-based line number, for error reporting.
    line_no: u64,
    buf: Vec<u8>,
}

impl<R, F> IndexScanner<R, F>
where
    R: BufRead,
    F: FnMut(&str) -> Arc<str>,
{
    pub fn new(reader: R, intern: F) -> Self {
        Self {
            reader,
            intern,
            pos: 0,
            line_no: 0,
            buf: Vec::new(),
        }
    }

    /// Returns the current byte position; after the iterator is exhausted
    /// this is the index file's total length.
    pub fn position(&self) -> u64 {
        self.pos
    }

    /// Consumes the scanner, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }

    fn next_entry(&mut self) -> Result<Option<ScannedRecord>> {
        loop {
            self.buf.clear();
            let n = self
                .reader
                .read_until(b'\n', &mut self.buf)
                .map_err(|source| StoreError::Open { source })?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;
            self.pos += n as u64;

            let line_bytes = match self.buf.last() {
                Some(b'\n') => &self.buf[..self.buf.len() - 1],
                _ => &self.buf[..],
            };
            if line_bytes.is_empty() {
                continue;
            }

            let text = std::str::from_utf8(line_bytes).map_err(|_| StoreError::MalformedHeader {
                line: self.line_no,
                reason: "header line is not valid UTF-8".to_string(),
            })?;
            let header = parse_header(text, self.line_no)?;

            // For inline and sidecar records the payload starts right where
            // the header line ended.
            let payload_start = self.pos;
            let kind = (self.intern)(header.kind);
            let record = match header.placement {
                HeaderPlacement::Extern(offset) => Record::new(
                    kind,
                    header.meta.to_string(),
                    header.timestamp,
                    header.size,
                    header.size_in_file,
                    offset,
                    Placement::Extern,
                ),
                HeaderPlacement::Inline => Record::new(
                    kind,
                    header.meta.to_string(),
                    header.timestamp,
                    header.size,
                    header.size_in_file,
                    payload_start,
                    Placement::Inline,
                ),
                HeaderPlacement::Sidecar(file_name) => Record::new(
                    kind,
                    String::new(),
                    header.timestamp,
                    header.size,
                    header.size_in_file,
                    payload_start,
                    Placement::Sidecar {
                        file_name: file_name.to_string(),
                    },
                ),
            };

            let inline = if record.placement().is_extern() {
                None
            } else {
                let payload = read_payload(&mut self.reader, record.size(), self.line_no)?;
                self.pos += record.size();
                // The writer pads non-LF-terminated payloads with one LF for
                // readability; it is not part of the payload.
                if consume_pad_lf(&mut self.reader)? {
                    self.pos += 1;
                }
                Some(Bytes::from(payload))
            };

            return Ok(Some(ScannedRecord { record, inline }));
        }
    }
}

impl<R, F> Iterator for IndexScanner<R, F>
where
    R: BufRead,
    F: FnMut(&str) -> Arc<str>,
{
    type Item = Result<ScannedRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_entry().transpose()
    }
}

/// Reads exactly `size` payload bytes, reporting how far it got on EOF.
fn read_payload<R: BufRead>(reader: &mut R, size: u64, line: u64) -> Result<Vec<u8>> {
    let mut payload = vec![0u8; size as usize];
    let mut filled = 0;
    while filled < payload.len() {
        let n = reader
            .read(&mut payload[filled..])
            .map_err(|source| StoreError::Open { source })?;
        if n == 0 {
            return Err(StoreError::TruncatedInlineData {
                line,
                expected: size,
                actual: filled as u64,
            });
        }
        filled += n;
    }
    Ok(payload)
}

/// Consumes a single LF pad byte if one follows; returns whether it did.
fn consume_pad_lf<R: BufRead>(reader: &mut R) -> Result<bool> {
    let next = reader
        .fill_buf()
        .map_err(|source| StoreError::Open { source })?;
    if next.first() == Some(&b'\n') {
        reader.consume(1);
        return Ok(true);
    }
    Ok(false)
}
