//! Record type and the index header line codec.
//!
//! Each record occupies exactly one LF-terminated line in the index file.
//! Fields are separated by single spaces; the fifth field captures the
//! remainder of the line so meta may contain spaces.
//!
//! # Header Format
//!
//! ```text
//! <offset_tag> <size_field> <timestamp_ms> <kind> [<meta_or_filename>]\n
//!
//! offset_tag  := decimal     payload in the data file at that offset
//!              | '_'         payload inline in the index, after this line
//!              | 'f'         payload in a sidecar file; fifth field = name
//! size_field  := N           payload length, no reserved room
//!              | N ':' M     payload length N, M >= N bytes reserved on disk
//! ```
//!
//! For inline records the writer does not know the payload's final byte
//! position; the index scanner reconstructs it while reading. Sidecar
//! headers carry the file name in the fifth field, and `size` counts the
//! supplemental annotation bytes written inline after the header, not the
//! sidecar file's length.

use std::sync::Arc;

use cinnabar_types::{Placement, Timestamp};

use crate::{Result, StoreError};

/// A single record in the store.
///
/// Records are created by an append or overwrite call, or reconstructed
/// from the index on open. They are mutated only by the recovery pass
/// (which sets the overwritten flag) and never destroyed; public getters
/// on a snapshot stay valid for the life of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    kind: Arc<str>,
    meta: String,
    timestamp: Timestamp,
    size: u64,
    size_in_file: u64,
    offset: u64,
    placement: Placement,
    overwritten: bool,
}

impl Record {
    /// Creates a new record. Kinds arrive pre-interned from the store.
    pub(crate) fn new(
        kind: Arc<str>,
        meta: String,
        timestamp: Timestamp,
        size: u64,
        size_in_file: u64,
        offset: u64,
        placement: Placement,
    ) -> Self {
        // Invariant from the header grammar: reserved room covers the payload.
        debug_assert!(size_in_file == 0 || size_in_file >= size);

        Self {
            kind,
            meta,
            timestamp,
            size,
            size_in_file,
            offset,
            placement,
            overwritten: false,
        }
    }

    /// Returns the record's kind.
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the interned kind. Records with the same textual kind share
    /// one allocation, so `Arc::ptr_eq` holds across them.
    pub fn kind_shared(&self) -> Arc<str> {
        Arc::clone(&self.kind)
    }

    /// Returns the single-line meta annotation (empty for sidecar records,
    /// whose fifth header field carries the file name instead).
    pub fn meta(&self) -> &str {
        &self.meta
    }

    /// Returns the record's timestamp.
    pub fn timestamp(&self) -> Timestamp {
        self.timestamp
    }

    /// Returns the payload length in bytes. Zero means no payload. For
    /// sidecar records this counts the inline annotation, not the file.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Returns the room reserved on disk for in-place overwrite, or zero
    /// when none was reserved. Never less than [`size`](Self::size) when set.
    pub fn size_in_file(&self) -> u64 {
        self.size_in_file
    }

    /// Returns the payload's byte position in its host file: the data file
    /// for extern records, the index file for inline payloads and sidecar
    /// annotations.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Returns where the payload lives.
    pub fn placement(&self) -> &Placement {
        &self.placement
    }

    /// Returns the sidecar file name, if this is a sidecar record.
    pub fn file_name(&self) -> Option<&str> {
        self.placement.file_name()
    }

    /// Returns true if a later record supersedes this one.
    pub fn is_overwritten(&self) -> bool {
        self.overwritten
    }

    pub(crate) fn set_offset(&mut self, offset: u64) {
        self.offset = offset;
    }

    pub(crate) fn mark_overwritten(&mut self) {
        self.overwritten = true;
    }

    /// Serializes this record's header line, including the trailing LF.
    pub(crate) fn encode_header(&self) -> String {
        let offset_tag = match self.placement {
            Placement::Extern => self.offset.to_string(),
            Placement::Inline => "_".to_string(),
            Placement::Sidecar { .. } => "f".to_string(),
        };
        let size_field = if self.size_in_file != 0 {
            format!("{}:{}", self.size, self.size_in_file)
        } else {
            self.size.to_string()
        };
        let tail = match &self.placement {
            Placement::Sidecar { file_name } => format!(" {file_name}"),
            _ if self.meta.is_empty() => String::new(),
            _ => format!(" {}", self.meta),
        };
        format!(
            "{offset_tag} {size_field} {} {}{tail}\n",
            self.timestamp.as_millis(),
            self.kind
        )
    }
}

/// Placement parsed from a header line, before offsets are reconstructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum HeaderPlacement<'a> {
    Extern(u64),
    Inline,
    Sidecar(&'a str),
}

/// One parsed header line, borrowing from the line text.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderLine<'a> {
    pub placement: HeaderPlacement<'a>,
    pub size: u64,
    pub size_in_file: u64,
    pub timestamp: Timestamp,
    pub kind: &'a str,
    pub meta: &'a str,
}

fn malformed(line: u64, reason: impl Into<String>) -> StoreError {
    StoreError::MalformedHeader {
        line,
        reason: reason.into(),
    }
}

fn parse_number(text: &str, line: u64, field: &str) -> Result<u64> {
    text.parse::<u64>()
        .map_err(|_| malformed(line, format!("{field} field {text:?} is not a non-negative integer")))
}

/// Parses one header line (without its trailing LF).
///
/// `line` is the 1-based line number, used only for error reporting.
pub(crate) fn parse_header(text: &str, line: u64) -> Result<HeaderLine<'_>> {
    let mut fields = text.splitn(5, ' ');
    let (Some(tag), Some(size_field), Some(ts_field), Some(kind)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed(line, "header has fewer than four fields"));
    };
    let rest = fields.next().unwrap_or("");

    let (size, size_in_file) = match size_field.split_once(':') {
        None => (parse_number(size_field, line, "size")?, 0),
        Some((n, m)) => {
            let size = parse_number(n, line, "size")?;
            let reserved = parse_number(m, line, "reserved size")?;
            if reserved < size {
                return Err(malformed(
                    line,
                    format!("reserved size {reserved} is smaller than size {size}"),
                ));
            }
            (size, reserved)
        }
    };

    let timestamp = Timestamp::from_millis(parse_number(ts_field, line, "timestamp")?);

    if kind.is_empty() {
        return Err(malformed(line, "kind field is empty"));
    }

    let (placement, meta) = match tag {
        "_" => (HeaderPlacement::Inline, rest),
        "f" => {
            if rest.is_empty() {
                return Err(malformed(line, "sidecar header is missing its file name"));
            }
            (HeaderPlacement::Sidecar(rest), "")
        }
        _ => (
            HeaderPlacement::Extern(parse_number(tag, line, "offset")?),
            rest,
        ),
    };

    Ok(HeaderLine {
        placement,
        size,
        size_in_file,
        timestamp,
        kind,
        meta,
    })
}
