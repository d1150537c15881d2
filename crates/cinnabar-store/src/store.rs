//! The append-only store engine.
//!
//! A [`Store`] owns one data directory containing a human-readable index
//! file and a binary data file, plus any sidecar files:
//!
//! ```text
//! {data_dir}/
//! ├── index.txt    <- one LF-terminated header line per record
//! ├── data.bin     <- concatenated extern payloads (plus reserved padding)
//! └── doc1.dat     <- sidecar files, one per sidecar record
//! ```
//!
//! The data file has no structure of its own; it is only readable through
//! the index. Bytes in the data file that no header refers to are tolerated
//! and invisible: appends seek to the real end of the file, so a crash
//! between a payload write and its header write leaves harmless orphan
//! bytes behind.
//!
//! # Invariants
//!
//! - `all_records` is strictly append-only and in write order
//! - Within one append, payload bytes reach the data file before the header
//!   reaches the index
//! - A failed validation leaves the record lists untouched
//! - Two extern records with equal offsets and non-zero size mean the later
//!   one reused the earlier one's reserved room; the earlier is overwritten
//!
//! # Locking
//!
//! One mutex serializes the whole append/overwrite/read path. Observer
//! callbacks run with that lock held and must not call back into the store.

use std::collections::{HashMap, HashSet, hash_map::Entry};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufReader, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use cinnabar_types::{Placement, Timestamp};

use crate::record::Record;
use crate::scanner::{IndexScanner, ScannedRecord};
use crate::{Result, StoreConfig, StoreError};

/// Callback invoked once per appended record and once per record
/// reconstructed on open. For records whose payload lives in the index file
/// (inline payloads, sidecar annotations) the bytes are passed along so the
/// observer never has to re-read them.
///
/// Runs while the store lock is held; it must not call back into the store.
pub type Observer = Box<dyn FnMut(&Record, Option<&[u8]>) + Send>;

/// A file-backed append-only record store.
///
/// All operations take `&self`; an internal mutex serializes concurrent
/// callers. Getters return snapshot copies that stay valid after further
/// appends.
pub struct Store {
    inner: Mutex<StoreInner>,
}

struct StoreInner {
    config: StoreConfig,
    index_path: PathBuf,
    data_path: PathBuf,

    /// Lazily opened append handles. `None` is the Closed state; any write
    /// error drops the handle so the next call reopens it.
    index_file: Option<File>,
    data_file: Option<File>,

    /// Cached end-of-file offsets, so appends don't re-stat.
    index_end: u64,
    data_end: u64,

    /// Every record in write order. Append-only; indices are stable.
    records: Vec<Record>,
    /// Indices into `records` of entries not marked overwritten.
    live: Vec<usize>,

    /// Interning table: records sharing a textual kind share one `Arc<str>`.
    kinds: HashSet<Arc<str>>,

    observer: Option<Observer>,
}

impl Store {
    /// Opens (or creates) the store described by `config`.
    ///
    /// Creates the data directory and an empty index file when missing,
    /// then replays the index to rebuild the in-memory record list and
    /// marks superseded records.
    ///
    /// # Errors
    ///
    /// - [`StoreError::Config`] for an invalid configuration
    /// - [`StoreError::Open`] for I/O failures
    /// - [`StoreError::MalformedHeader`] / [`StoreError::TruncatedInlineData`]
    ///   when the index cannot be parsed; the store is left closed
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::open_inner(config, None)
    }

    /// Opens the store with an observer that is invoked for every record
    /// reconstructed now and appended later.
    pub fn open_with_observer(config: StoreConfig, observer: Observer) -> Result<Self> {
        Self::open_inner(config, Some(observer))
    }

    fn open_inner(config: StoreConfig, mut observer: Option<Observer>) -> Result<Self> {
        config.validate()?;

        fs::create_dir_all(&config.data_dir).map_err(|source| StoreError::Open { source })?;
        let index_path = config.data_dir.join(&config.index_file_name);
        let data_path = config.data_dir.join(&config.data_file_name);

        // One handle serves both the initial scan and later appends; it is
        // created here so an empty store leaves an empty index behind.
        let index_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&index_path)
            .map_err(|source| StoreError::Open { source })?;

        let mut kinds: HashSet<Arc<str>> = HashSet::new();
        let mut records: Vec<Record> = Vec::new();
        let mut scanner =
            IndexScanner::new(BufReader::new(index_file), |kind| intern(&mut kinds, kind));
        for entry in &mut scanner {
            let ScannedRecord { record, inline } = entry?;
            records.push(record);
            if let Some(observer) = observer.as_mut() {
                let record = records.last().expect("record just pushed");
                observer(record, inline.as_deref());
            }
        }
        let index_end = scanner.position();
        let index_file = scanner.into_inner().into_inner();

        let superseded = mark_superseded(&mut records);

        let data_end = match fs::metadata(&data_path) {
            Ok(meta) => meta.len(),
            Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
            Err(source) => return Err(StoreError::Open { source }),
        };

        tracing::info!(
            path = %config.data_dir.display(),
            records = records.len(),
            superseded,
            "opened store"
        );

        let mut inner = StoreInner {
            config,
            index_path,
            data_path,
            index_file: Some(index_file),
            data_file: None,
            index_end,
            data_end,
            records,
            live: Vec::new(),
            kinds,
            observer,
        };
        inner.rebuild_live();

        Ok(Store {
            inner: Mutex::new(inner),
        })
    }

    /// Appends a record whose payload goes to the data file.
    ///
    /// A `None` timestamp (or [`Timestamp::EPOCH`]) means "now". With a
    /// non-zero `overwrite_expand_percent`, padding is reserved after the
    /// payload so a later [`overwrite`](Self::overwrite) can reuse the slot.
    pub fn append_extern(
        &self,
        kind: &str,
        meta: &str,
        payload: &[u8],
        timestamp: Option<Timestamp>,
    ) -> Result<()> {
        self.lock().append_extern(kind, meta, payload, timestamp)
    }

    /// Appends a record whose payload is embedded in the index file,
    /// directly after its header line.
    ///
    /// A payload that does not end with LF gets one pad LF after it for
    /// readability; the pad is never counted in the record's size.
    pub fn append_inline(
        &self,
        kind: &str,
        meta: &str,
        payload: &[u8],
        timestamp: Option<Timestamp>,
    ) -> Result<()> {
        self.lock().append_inline(kind, meta, payload, timestamp)
    }

    /// Appends a record whose payload is written to `<data_dir>/<file_name>`
    /// as a complete replacement.
    ///
    /// `sidecar_meta` is a small annotation written inline after the header
    /// (same pad rule as inline payloads); the record's `size` counts these
    /// annotation bytes, not the sidecar file's length.
    pub fn append_sidecar(
        &self,
        kind: &str,
        file_name: &str,
        payload: &[u8],
        sidecar_meta: &[u8],
        timestamp: Option<Timestamp>,
    ) -> Result<()> {
        self.lock()
            .append_sidecar(kind, file_name, payload, sidecar_meta, timestamp)
    }

    /// Overwrites the payload of the first extern record matching
    /// `(kind, meta)` that has enough reserved room, in place; the matched
    /// record is marked overwritten and a fresh header describing the new
    /// version is appended. Without a suitable predecessor this is a plain
    /// extern append (reserving expansion room for next time). An empty
    /// payload degenerates to [`append_extern`](Self::append_extern).
    pub fn overwrite(
        &self,
        kind: &str,
        meta: &str,
        payload: &[u8],
        timestamp: Option<Timestamp>,
    ) -> Result<()> {
        self.lock().overwrite(kind, meta, payload, timestamp)
    }

    /// Reads a record's payload: from the data file for extern records,
    /// from the index file for inline records, or the whole sidecar file
    /// for sidecar records. A zero-size record reads as empty.
    pub fn read(&self, record: &Record) -> Result<Bytes> {
        self.lock().read(record)
    }

    /// Reads the inline annotation bytes of a sidecar record. Returns empty
    /// for records that are not sidecars or carry no annotation.
    pub fn read_sidecar_meta(&self, record: &Record) -> Result<Bytes> {
        self.lock().read_sidecar_meta(record)
    }

    /// Reads the entire sidecar file of a sidecar record.
    pub fn read_sidecar_file(&self, record: &Record) -> Result<Bytes> {
        self.lock().read_sidecar_file(record)
    }

    /// Returns a snapshot of all live (not overwritten) records, in write
    /// order.
    pub fn records(&self) -> Vec<Record> {
        let inner = self.lock();
        inner
            .live
            .iter()
            .map(|&i| inner.records[i].clone())
            .collect()
    }

    /// Returns a snapshot of every record ever written, in write order,
    /// including overwritten ones.
    pub fn all_records(&self) -> Vec<Record> {
        self.lock().records.clone()
    }

    /// Returns a snapshot of the live records with the given kind.
    pub fn records_of_kind(&self, kind: &str) -> Vec<Record> {
        let inner = self.lock();
        inner
            .live
            .iter()
            .map(|&i| &inner.records[i])
            .filter(|r| r.kind() == kind)
            .cloned()
            .collect()
    }

    /// Returns the total number of records, including overwritten ones.
    pub fn record_count(&self) -> usize {
        self.lock().records.len()
    }

    /// Returns the store's data directory.
    pub fn data_dir(&self) -> PathBuf {
        self.lock().config.data_dir.clone()
    }

    /// Flushes both files to disk without closing the handles. Safe to call
    /// repeatedly.
    pub fn flush(&self) -> Result<()> {
        self.lock().flush()
    }

    /// Flushes and closes both file handles. The store stays usable; the
    /// next write reopens them. Safe to call repeatedly.
    pub fn close(&self) -> Result<()> {
        self.lock().close()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        // A poisoned lock means an observer panicked; the store state it
        // guards is still consistent, so recover rather than propagate.
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl Drop for Store {
    fn drop(&mut self) {
        if let Err(e) = self.close() {
            tracing::error!(error = %e, "failed to flush store during drop");
        }
    }
}

impl StoreInner {
    // ========================================================================
    // Append paths
    // ========================================================================

    fn append_extern(
        &mut self,
        kind: &str,
        meta: &str,
        payload: &[u8],
        timestamp: Option<Timestamp>,
    ) -> Result<()> {
        validate_kind(kind)?;
        validate_meta(meta)?;
        let timestamp = resolve_timestamp(timestamp);
        let kind = self.intern_kind(kind);

        let size = payload.len() as u64;
        let (offset, size_in_file) = if payload.is_empty() {
            (self.data_end, 0)
        } else {
            let percent = u64::from(self.config.overwrite_expand_percent);
            let additional = (size * percent) / 100;
            let offset = if additional > 0 {
                let mut buf = Vec::with_capacity(payload.len() + additional as usize);
                buf.extend_from_slice(payload);
                buf.resize(payload.len() + additional as usize, b' ');
                self.data_append(&buf)?
            } else {
                self.data_append(payload)?
            };
            self.sync_data()?;
            let size_in_file = if percent > 0 { size + additional } else { 0 };
            (offset, size_in_file)
        };

        let record = Record::new(
            kind,
            meta.to_string(),
            timestamp,
            size,
            size_in_file,
            offset,
            Placement::Extern,
        );
        self.append_header(&record)?;

        tracing::debug!(
            kind = record.kind(),
            offset,
            bytes = size,
            "appended extern record"
        );
        self.push_record(record, None);
        Ok(())
    }

    fn append_inline(
        &mut self,
        kind: &str,
        meta: &str,
        payload: &[u8],
        timestamp: Option<Timestamp>,
    ) -> Result<()> {
        validate_kind(kind)?;
        validate_meta(meta)?;
        let timestamp = resolve_timestamp(timestamp);
        let kind = self.intern_kind(kind);

        let size = payload.len() as u64;
        let mut record = Record::new(
            kind,
            meta.to_string(),
            timestamp,
            size,
            0,
            0,
            Placement::Inline,
        );
        let payload_start = self.write_header_and_inline(&record, payload)?;
        record.set_offset(payload_start);

        tracing::debug!(
            kind = record.kind(),
            offset = record.offset(),
            bytes = size,
            "appended inline record"
        );
        self.push_record(record, Some(payload));
        Ok(())
    }

    fn append_sidecar(
        &mut self,
        kind: &str,
        file_name: &str,
        payload: &[u8],
        sidecar_meta: &[u8],
        timestamp: Option<Timestamp>,
    ) -> Result<()> {
        validate_kind(kind)?;
        validate_file_name(file_name)?;
        let timestamp = resolve_timestamp(timestamp);
        let kind = self.intern_kind(kind);

        // The sidecar file is written first: a crash before the header is
        // appended leaves a file no reader will ever look at.
        let sidecar_path = self.config.data_dir.join(file_name);
        let write_file = || -> io::Result<()> {
            let mut file = File::create(&sidecar_path)?;
            file.write_all(payload)?;
            if self.config.sync_write {
                file.sync_all()?;
            }
            Ok(())
        };
        write_file().map_err(|source| StoreError::Write { source })?;

        let mut record = Record::new(
            kind,
            String::new(),
            timestamp,
            sidecar_meta.len() as u64,
            0,
            0,
            Placement::Sidecar {
                file_name: file_name.to_string(),
            },
        );
        let payload_start = self.write_header_and_inline(&record, sidecar_meta)?;
        record.set_offset(payload_start);

        tracing::debug!(
            kind = record.kind(),
            file = file_name,
            bytes = payload.len(),
            "appended sidecar record"
        );
        self.push_record(record, Some(sidecar_meta));
        Ok(())
    }

    fn overwrite(
        &mut self,
        kind: &str,
        meta: &str,
        payload: &[u8],
        timestamp: Option<Timestamp>,
    ) -> Result<()> {
        validate_kind(kind)?;
        validate_meta(meta)?;

        if payload.is_empty() {
            return self.append_extern(kind, meta, payload, timestamp);
        }

        let needed = payload.len() as u64;
        let target = self.records.iter().position(|r| {
            r.placement().is_extern()
                && r.size_in_file() >= needed
                && r.kind() == kind
                && r.meta() == meta
        });
        let Some(target) = target else {
            self.append_extern(kind, meta, payload, timestamp)?;
            self.rebuild_live();
            return Ok(());
        };

        let timestamp = resolve_timestamp(timestamp);
        let offset = self.records[target].offset();
        self.data_write_at(offset, payload)?;
        self.sync_data()?;

        let kind = self.intern_kind(kind);
        let record = Record::new(
            kind,
            meta.to_string(),
            timestamp,
            needed,
            0,
            offset,
            Placement::Extern,
        );
        self.append_header(&record)?;
        self.records[target].mark_overwritten();

        tracing::debug!(
            kind = record.kind(),
            offset,
            bytes = needed,
            "overwrote record in place"
        );
        self.push_record(record, None);
        // Re-running the supersession pass keeps the in-memory view equal to
        // what a reopen would reconstruct: chained overwrites of one slot
        // leave intermediate versions at the same offset, and those must be
        // marked too, not just the record whose room was reused.
        mark_superseded(&mut self.records);
        self.rebuild_live();
        Ok(())
    }

    /// Writes a header line followed by its inline bytes as one index
    /// append, padding with a single LF when the payload does not already
    /// end with one. Returns the byte position just past the header line,
    /// i.e. where the inline bytes start.
    fn write_header_and_inline(&mut self, record: &Record, payload: &[u8]) -> Result<u64> {
        let header = record.encode_header();
        let pad = !payload.is_empty() && payload.last() != Some(&b'\n');

        let mut buf = Vec::with_capacity(header.len() + payload.len() + 1);
        buf.extend_from_slice(header.as_bytes());
        buf.extend_from_slice(payload);
        if pad {
            buf.push(b'\n');
        }

        let start = self.index_append(&buf)?;
        self.sync_index()?;
        Ok(start + header.len() as u64)
    }

    /// Appends a bare header line to the index. Returns its byte position.
    fn append_header(&mut self, record: &Record) -> Result<u64> {
        let line = record.encode_header();
        let start = self.index_append(line.as_bytes())?;
        self.sync_index()?;
        Ok(start)
    }

    fn push_record(&mut self, record: Record, inline: Option<&[u8]>) {
        self.live.push(self.records.len());
        self.records.push(record);
        if let Some(observer) = self.observer.as_mut() {
            let record = self.records.last().expect("record just pushed");
            observer(record, inline);
        }
    }

    fn rebuild_live(&mut self) {
        self.live = self
            .records
            .iter()
            .enumerate()
            .filter(|(_, r)| !r.is_overwritten())
            .map(|(i, _)| i)
            .collect();
    }

    fn intern_kind(&mut self, kind: &str) -> Arc<str> {
        intern(&mut self.kinds, kind)
    }

    // ========================================================================
    // Read paths
    // ========================================================================

    fn read(&self, record: &Record) -> Result<Bytes> {
        if record.size() == 0 {
            return Ok(Bytes::new());
        }
        match record.placement() {
            Placement::Inline => read_at(&self.index_path, record.offset(), record.size()),
            Placement::Sidecar { file_name } => {
                let path = self.config.data_dir.join(file_name);
                fs::read(path)
                    .map(Bytes::from)
                    .map_err(|source| StoreError::Read { source })
            }
            Placement::Extern => read_at(&self.data_path, record.offset(), record.size()),
        }
    }

    fn read_sidecar_meta(&self, record: &Record) -> Result<Bytes> {
        if !record.placement().is_sidecar() || record.size() == 0 {
            return Ok(Bytes::new());
        }
        read_at(&self.index_path, record.offset(), record.size())
    }

    fn read_sidecar_file(&self, record: &Record) -> Result<Bytes> {
        let Some(file_name) = record.file_name() else {
            return Err(StoreError::Read {
                source: io::Error::new(io::ErrorKind::InvalidInput, "record has no sidecar file"),
            });
        };
        fs::read(self.config.data_dir.join(file_name))
            .map(Bytes::from)
            .map_err(|source| StoreError::Read { source })
    }

    // ========================================================================
    // File handles
    // ========================================================================

    /// Appends bytes at the end of the data file, returning the byte
    /// position they were written at.
    ///
    /// The end position comes from seeking, not from the cached offset, so
    /// unindexed trailing bytes left by a crash (or written behind the
    /// store's back) are skipped over rather than clobbered.
    fn data_append(&mut self, bytes: &[u8]) -> Result<u64> {
        self.ensure_data_file()?;
        let file = self.data_file.as_mut().expect("data handle just opened");
        let result = (|| -> io::Result<u64> {
            let start = file.seek(SeekFrom::End(0))?;
            file.write_all(bytes)?;
            Ok(start)
        })();
        match result {
            Ok(start) => {
                self.data_end = start + bytes.len() as u64;
                Ok(start)
            }
            Err(source) => {
                self.data_file = None;
                Err(StoreError::Write { source })
            }
        }
    }

    /// Writes bytes at a fixed position inside the data file (in-place
    /// overwrite into previously reserved room).
    fn data_write_at(&mut self, offset: u64, bytes: &[u8]) -> Result<()> {
        self.ensure_data_file()?;
        let file = self.data_file.as_mut().expect("data handle just opened");
        let result = (|| -> io::Result<()> {
            file.seek(SeekFrom::Start(offset))?;
            file.write_all(bytes)
        })();
        if let Err(source) = result {
            self.data_file = None;
            return Err(StoreError::Write { source });
        }
        Ok(())
    }

    fn index_append(&mut self, bytes: &[u8]) -> Result<u64> {
        self.ensure_index_file()?;
        let file = self.index_file.as_mut().expect("index handle just opened");
        let result = (|| -> io::Result<u64> {
            let start = file.seek(SeekFrom::End(0))?;
            file.write_all(bytes)?;
            Ok(start)
        })();
        match result {
            Ok(start) => {
                self.index_end = start + bytes.len() as u64;
                Ok(start)
            }
            Err(source) => {
                self.index_file = None;
                Err(StoreError::Write { source })
            }
        }
    }

    fn ensure_data_file(&mut self) -> Result<()> {
        if self.data_file.is_none() {
            // Read+write, not append: in-place overwrites must seek, and
            // O_APPEND would send every write to the end regardless.
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(&self.data_path)
                .map_err(|source| StoreError::Open { source })?;
            self.data_file = Some(file);
        }
        Ok(())
    }

    fn ensure_index_file(&mut self) -> Result<()> {
        if self.index_file.is_none() {
            let file = OpenOptions::new()
                .read(true)
                .write(true)
                .create(true)
                .open(&self.index_path)
                .map_err(|source| StoreError::Open { source })?;
            self.index_file = Some(file);
        }
        Ok(())
    }

    fn sync_data(&mut self) -> Result<()> {
        if !self.config.sync_write {
            return Ok(());
        }
        if let Some(file) = self.data_file.as_mut() {
            if let Err(source) = file.sync_all() {
                self.data_file = None;
                return Err(StoreError::Write { source });
            }
        }
        Ok(())
    }

    fn sync_index(&mut self) -> Result<()> {
        if !self.config.sync_write {
            return Ok(());
        }
        if let Some(file) = self.index_file.as_mut() {
            if let Err(source) = file.sync_all() {
                self.index_file = None;
                return Err(StoreError::Write { source });
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        if let Some(file) = self.index_file.as_mut() {
            if let Err(source) = file.sync_all() {
                self.index_file = None;
                return Err(StoreError::Write { source });
            }
        }
        if let Some(file) = self.data_file.as_mut() {
            if let Err(source) = file.sync_all() {
                self.data_file = None;
                return Err(StoreError::Write { source });
            }
        }
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        let mut first_error = None;
        if let Some(file) = self.index_file.take() {
            if let Err(source) = file.sync_all() {
                first_error.get_or_insert(StoreError::Write { source });
            }
        }
        if let Some(file) = self.data_file.take() {
            if let Err(source) = file.sync_all() {
                first_error.get_or_insert(StoreError::Write { source });
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

// ============================================================================
// Recovery
// ============================================================================

/// Marks records superseded by later writes at the same data-file offset.
///
/// Walks the records in write order with a map from offset to the most
/// recent extern record seen there; on a collision the mapped record is
/// marked overwritten and the entry advances, so every intermediate version
/// of a repeatedly overwritten slot ends up marked. Inline and sidecar
/// records, and records without payload, stand on their own.
///
/// Returns the number of records marked.
fn mark_superseded(records: &mut [Record]) -> usize {
    let mut latest_at: HashMap<u64, usize> = HashMap::new();
    let mut superseded = 0;

    for i in 0..records.len() {
        if !records[i].placement().is_extern() || records[i].size() == 0 {
            continue;
        }
        match latest_at.entry(records[i].offset()) {
            Entry::Occupied(mut entry) => {
                let earlier = *entry.get();
                records[earlier].mark_overwritten();
                superseded += 1;
                entry.insert(i);
            }
            Entry::Vacant(entry) => {
                entry.insert(i);
            }
        }
    }

    superseded
}

// ============================================================================
// Validation & helpers
// ============================================================================

fn validate_kind(kind: &str) -> Result<()> {
    if kind.is_empty() || kind.contains(' ') || kind.contains('\n') {
        return Err(StoreError::InvalidKind {
            kind: kind.to_string(),
        });
    }
    Ok(())
}

fn validate_meta(meta: &str) -> Result<()> {
    if meta.contains('\n') {
        return Err(StoreError::InvalidMeta);
    }
    Ok(())
}

fn validate_file_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('\n') {
        return Err(StoreError::InvalidFileName {
            name: name.to_string(),
        });
    }
    Ok(())
}

/// Resolves the caller-supplied timestamp: absent or epoch means "now".
fn resolve_timestamp(timestamp: Option<Timestamp>) -> Timestamp {
    timestamp
        .filter(|ts| *ts != Timestamp::EPOCH)
        .unwrap_or_else(Timestamp::now)
}

fn intern(kinds: &mut HashSet<Arc<str>>, kind: &str) -> Arc<str> {
    if let Some(existing) = kinds.get(kind) {
        Arc::clone(existing)
    } else {
        let interned: Arc<str> = Arc::from(kind);
        kinds.insert(Arc::clone(&interned));
        interned
    }
}

fn read_at(path: &Path, offset: u64, size: u64) -> Result<Bytes> {
    let result = (|| -> io::Result<Vec<u8>> {
        let mut file = File::open(path)?;
        file.seek(SeekFrom::Start(offset))?;
        let mut buf = vec![0u8; size as usize];
        file.read_exact(&mut buf)?;
        Ok(buf)
    })();
    result
        .map(Bytes::from)
        .map_err(|source| StoreError::Read { source })
}
