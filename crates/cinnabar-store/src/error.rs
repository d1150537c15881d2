//! Error types for the record store.

use std::io;

use thiserror::Error;

/// Errors produced by the record store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Record kind is empty or contains a space or newline.
    #[error("invalid kind {kind:?}: kinds must be non-empty and contain no space or newline")]
    InvalidKind {
        /// The rejected kind string.
        kind: String,
    },

    /// Record meta contains a newline.
    #[error("invalid meta: meta must not contain a newline")]
    InvalidMeta,

    /// Sidecar file name is empty or contains a newline.
    #[error("invalid sidecar file name {name:?}: names must be non-empty and contain no newline")]
    InvalidFileName {
        /// The rejected file name.
        name: String,
    },

    /// Invalid store configuration.
    #[error("invalid store config: {reason}")]
    Config {
        /// What the configuration got wrong.
        reason: String,
    },

    /// An index header line could not be parsed.
    #[error("malformed header at index line {line}: {reason}")]
    MalformedHeader {
        /// 1-based line number in the index file.
        line: u64,
        /// What the line got wrong.
        reason: String,
    },

    /// The index file ended in the middle of an inline payload.
    #[error(
        "index ended mid inline payload after line {line}: expected {expected} bytes, got {actual}"
    )]
    TruncatedInlineData {
        /// 1-based line number of the header the payload belongs to.
        line: u64,
        /// Payload length declared by the header.
        expected: u64,
        /// Bytes actually present before end of file.
        actual: u64,
    },

    /// The store could not be opened.
    #[error("failed to open store: {source}")]
    Open {
        #[source]
        source: io::Error,
    },

    /// A write to the index, data, or a sidecar file failed.
    #[error("write failed: {source}")]
    Write {
        #[source]
        source: io::Error,
    },

    /// A payload read failed.
    #[error("read failed: {source}")]
    Read {
        #[source]
        source: io::Error,
    },
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
