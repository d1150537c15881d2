//! # cinnabar-types: Core types for the cinnabar record store
//!
//! This crate contains the small value types shared across the store:
//! - Temporal types ([`Timestamp`])
//! - Payload placement ([`Placement`])

use std::{
    fmt::Display,
    time::{SystemTime, UNIX_EPOCH},
};

use serde::{Deserialize, Serialize};

// ============================================================================
// Timestamp
// ============================================================================

/// A point in time, stored as UTC milliseconds since the Unix epoch.
///
/// Record headers persist timestamps as non-negative decimal milliseconds,
/// so the type is a thin `u64` newtype. Callers that do not supply a
/// timestamp get [`Timestamp::now`] at write time.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Timestamp(u64);

impl Timestamp {
    /// The Unix epoch (1970-01-01 00:00:00 UTC).
    pub const EPOCH: Timestamp = Timestamp(0);

    /// Creates a timestamp from milliseconds since the Unix epoch.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Returns the timestamp as milliseconds since the Unix epoch.
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp as whole seconds since the Unix epoch.
    pub fn as_secs(&self) -> u64 {
        self.0 / 1000
    }

    /// Creates a timestamp for the current time.
    ///
    /// # Panics
    ///
    /// Panics if the system clock is before the Unix epoch (should never happen).
    pub fn now() -> Self {
        let duration = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("system clock is before Unix epoch");
        Self(duration.as_millis() as u64)
    }
}

impl Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Timestamp {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<Timestamp> for u64 {
    fn from(ts: Timestamp) -> Self {
        ts.0
    }
}

// ============================================================================
// Placement
// ============================================================================

/// Where a record's payload lives on disk.
///
/// The store keeps two files per directory: a human-readable index and a
/// binary data file. A payload is either appended to the data file
/// (`Extern`), embedded in the index directly after its header line
/// (`Inline`), or written to a separate named file in the data directory
/// (`Sidecar`).
///
/// An explicit enum (instead of tagging sizes with a sign bit) means a
/// zero-length inline payload stays distinguishable from a zero-length
/// external one, and `size` is non-negative everywhere.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Placement {
    /// Payload bytes live in the data file at the record's offset.
    Extern,
    /// Payload bytes live in the index file, directly after the header line.
    Inline,
    /// Payload lives in a named file in the data directory.
    Sidecar {
        /// File name relative to the data directory. Never empty, never
        /// contains a newline; spaces are allowed.
        file_name: String,
    },
}

impl Placement {
    /// Returns true for [`Placement::Extern`].
    pub fn is_extern(&self) -> bool {
        matches!(self, Placement::Extern)
    }

    /// Returns true for [`Placement::Inline`].
    pub fn is_inline(&self) -> bool {
        matches!(self, Placement::Inline)
    }

    /// Returns true for [`Placement::Sidecar`].
    pub fn is_sidecar(&self) -> bool {
        matches!(self, Placement::Sidecar { .. })
    }

    /// Returns the sidecar file name, if this is a sidecar placement.
    pub fn file_name(&self) -> Option<&str> {
        match self {
            Placement::Sidecar { file_name } => Some(file_name),
            _ => None,
        }
    }
}

impl Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Placement::Extern => write!(f, "extern"),
            Placement::Inline => write!(f, "inline"),
            Placement::Sidecar { file_name } => write!(f, "sidecar({file_name})"),
        }
    }
}
