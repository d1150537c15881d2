//! # cinnabar-store: file-backed append-only record store
//!
//! Persists a sequence of records, each carrying a kind tag, an optional
//! single-line meta annotation, a timestamp, and an opaque payload. Records
//! survive restarts: the full set is recovered by replaying one
//! human-readable index file.
//!
//! # On-Disk Layout
//!
//! ```text
//! {data_dir}/
//! ├── index.txt    <- one header line per record, LF-terminated
//! ├── data.bin     <- concatenated extern payloads
//! └── *.dat        <- sidecar files named by their records
//! ```
//!
//! A payload lives in one of three places ([`Placement`]): appended to the
//! data file, inline in the index directly after its header line, or in a
//! named sidecar file. The index is the single source of truth; data-file
//! bytes no header points at (e.g. left by a crash between a payload write
//! and its header write) are tolerated and invisible.
//!
//! # Example
//!
//! ```no_run
//! use cinnabar_store::{Store, StoreConfig};
//!
//! # fn main() -> cinnabar_store::Result<()> {
//! let store = Store::open(StoreConfig::new("records"))?;
//! store.append_extern("user", "id:1234", b"profile bytes", None)?;
//! for record in store.records() {
//!     let payload = store.read(&record)?;
//!     println!("{} {} {} bytes", record.kind(), record.meta(), payload.len());
//! }
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod record;
mod scanner;
mod store;

pub use cinnabar_types::{Placement, Timestamp};
pub use config::{DEFAULT_DATA_FILE_NAME, DEFAULT_INDEX_FILE_NAME, StoreConfig};
pub use error::{Result, StoreError};
pub use record::Record;
pub use store::{Observer, Store};
