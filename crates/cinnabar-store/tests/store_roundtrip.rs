//! Append/read round-trips across close and reopen, for all three payload
//! placements, plus validation, interning, and observer behavior.

use std::fs;
use std::sync::{Arc, Mutex};

use cinnabar_store::{Placement, Store, StoreConfig, StoreError, Timestamp};
use proptest::prelude::*;
use tempfile::TempDir;

fn config(dir: &TempDir) -> StoreConfig {
    StoreConfig::new(dir.path())
}

#[test]
fn append_and_read_extern() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    store.append_extern("cfg", "", &[0x61, 0x62], None).unwrap();

    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].size(), 2);
    assert_eq!(records[0].offset(), 0);
    assert_eq!(&store.read(&records[0]).unwrap()[..], &[0x61, 0x62]);

    store.close().unwrap();
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind(), "cfg");
    assert_eq!(records[0].meta(), "");
    assert_eq!(records[0].size(), 2);
    assert_eq!(records[0].offset(), 0);
    assert_eq!(&store.read(&records[0]).unwrap()[..], &[0x61, 0x62]);
}

#[test]
fn inline_record_persists() {
    let dir = tempfile::tempdir().unwrap();
    let ts = Timestamp::from_millis(1_704_067_200_000);

    let store = Store::open(config(&dir)).unwrap();
    store
        .append_inline("log", "entry1", b"log message here", Some(ts))
        .unwrap();
    assert_eq!(&store.read(&store.records()[0]).unwrap()[..], b"log message here");
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].placement(), &Placement::Inline);
    assert_eq!(records[0].timestamp(), ts);
    assert_eq!(records[0].meta(), "entry1");
    assert_eq!(&store.read(&records[0]).unwrap()[..], b"log message here");
}

#[test]
fn sidecar_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let pdf_bytes = b"%PDF-1.4 not really a pdf but close enough";

    let store = Store::open(config(&dir)).unwrap();
    store
        .append_sidecar("attachment", "doc1.dat", pdf_bytes, &[], None)
        .unwrap();
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].file_name(), Some("doc1.dat"));
    assert_eq!(records[0].size(), 0);
    assert_eq!(&store.read_sidecar_file(&records[0]).unwrap()[..], pdf_bytes);

    // The sidecar is a plain file in the data directory.
    let on_disk = fs::read(dir.path().join("doc1.dat")).unwrap();
    assert_eq!(on_disk, pdf_bytes);
}

#[test]
fn sidecar_meta_annotation() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    store
        .append_sidecar("attachment", "doc2.dat", b"payload", b"pages:3", None)
        .unwrap();

    let records = store.records();
    assert_eq!(records[0].size(), 7);
    assert_eq!(&store.read_sidecar_meta(&records[0]).unwrap()[..], b"pages:3");
    // A non-zero-size sidecar read returns the whole file.
    assert_eq!(&store.read(&records[0]).unwrap()[..], b"payload");
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.records();
    assert_eq!(records[0].size(), 7);
    assert_eq!(&store.read_sidecar_meta(&records[0]).unwrap()[..], b"pages:3");
    assert_eq!(&store.read_sidecar_file(&records[0]).unwrap()[..], b"payload");
}

#[test]
fn sidecar_file_name_may_contain_spaces() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    store
        .append_sidecar("attachment", "quarterly report.txt", b"q3", &[], None)
        .unwrap();
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.records();
    assert_eq!(records[0].file_name(), Some("quarterly report.txt"));
    assert_eq!(&store.read_sidecar_file(&records[0]).unwrap()[..], b"q3");
}

#[test]
fn inline_pad_is_not_counted_in_size() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    store
        .append_inline("log", "", b"no trailing newline", None)
        .unwrap();
    store
        .append_inline("log", "", b"ends with newline\n", None)
        .unwrap();
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.records();
    assert_eq!(records[0].size(), b"no trailing newline".len() as u64);
    assert_eq!(&store.read(&records[0]).unwrap()[..], b"no trailing newline");
    assert_eq!(records[1].size(), b"ends with newline\n".len() as u64);
    assert_eq!(&store.read(&records[1]).unwrap()[..], b"ends with newline\n");
}

#[test]
fn zero_length_inline_stays_inline_after_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    store.append_inline("marker", "note", &[], None).unwrap();
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.records();
    assert_eq!(records[0].placement(), &Placement::Inline);
    assert_eq!(records[0].size(), 0);
    assert!(store.read(&records[0]).unwrap().is_empty());
}

#[test]
fn validation_errors_leave_record_lists_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();

    let invalid_kind = store.append_extern("", "", b"x", None).unwrap_err();
    assert!(matches!(invalid_kind, StoreError::InvalidKind { .. }));
    let invalid_kind = store.append_extern("a b", "", b"x", None).unwrap_err();
    assert!(matches!(invalid_kind, StoreError::InvalidKind { .. }));
    let invalid_kind = store.append_inline("a\nb", "", b"x", None).unwrap_err();
    assert!(matches!(invalid_kind, StoreError::InvalidKind { .. }));

    let invalid_meta = store.append_extern("k", "a\nb", b"x", None).unwrap_err();
    assert!(matches!(invalid_meta, StoreError::InvalidMeta));
    let invalid_meta = store.overwrite("k", "a\nb", b"x", None).unwrap_err();
    assert!(matches!(invalid_meta, StoreError::InvalidMeta));

    let invalid_name = store
        .append_sidecar("k", "", b"x", &[], None)
        .unwrap_err();
    assert!(matches!(invalid_name, StoreError::InvalidFileName { .. }));
    let invalid_name = store
        .append_sidecar("k", "a\nb", b"x", &[], None)
        .unwrap_err();
    assert!(matches!(invalid_name, StoreError::InvalidFileName { .. }));

    assert!(store.records().is_empty());
    assert!(store.all_records().is_empty());
    // Nothing reached the index either.
    assert_eq!(fs::read(dir.path().join("index.txt")).unwrap().len(), 0);

    // The store stays usable after refusals.
    store.append_extern("k", "m:1", b"ok", None).unwrap();
    assert_eq!(store.records().len(), 1);
}

#[test]
fn kinds_are_interned_across_appends_and_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    store.append_extern("user", "id:1", b"a", None).unwrap();
    store.append_inline("user", "id:2", b"b", None).unwrap();
    store.append_extern("cfg", "", b"c", None).unwrap();

    let records = store.all_records();
    assert!(Arc::ptr_eq(
        &records[0].kind_shared(),
        &records[1].kind_shared()
    ));
    assert!(!Arc::ptr_eq(
        &records[0].kind_shared(),
        &records[2].kind_shared()
    ));
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.all_records();
    assert!(Arc::ptr_eq(
        &records[0].kind_shared(),
        &records[1].kind_shared()
    ));
}

#[test]
fn observer_sees_appends_and_reopen() {
    type Seen = Arc<Mutex<Vec<(String, Option<Vec<u8>>)>>>;

    let dir = tempfile::tempdir().unwrap();
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let store = Store::open_with_observer(
        config(&dir),
        Box::new(move |record, inline| {
            sink.lock()
                .unwrap()
                .push((record.kind().to_string(), inline.map(<[u8]>::to_vec)));
        }),
    )
    .unwrap();

    store.append_extern("cfg", "", b"ab", None).unwrap();
    store.append_inline("log", "", b"hello", None).unwrap();
    drop(store);

    {
        let events = seen.lock().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0], ("cfg".to_string(), None));
        assert_eq!(events[1], ("log".to_string(), Some(b"hello".to_vec())));
    }

    // On reopen the observer replays every reconstructed record, inline
    // payload bytes included.
    let seen: Seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let _store = Store::open_with_observer(
        config(&dir),
        Box::new(move |record, inline| {
            sink.lock()
                .unwrap()
                .push((record.kind().to_string(), inline.map(<[u8]>::to_vec)));
        }),
    )
    .unwrap();

    let events = seen.lock().unwrap();
    assert_eq!(events.len(), 2);
    assert_eq!(events[0], ("cfg".to_string(), None));
    assert_eq!(events[1], ("log".to_string(), Some(b"hello".to_vec())));
}

#[test]
fn meta_roundtrips_through_kv_codec() {
    let dir = tempfile::tempdir().unwrap();
    let meta = cinnabar_kv::encode(&["name", "Jo Ann", "note", "line1\nline2"]).unwrap();

    let store = Store::open(config(&dir)).unwrap();
    store.append_extern("user", &meta, b"payload", None).unwrap();
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    let records = store.records();
    assert_eq!(records[0].meta(), meta);
    let pairs = cinnabar_kv::decode(records[0].meta()).unwrap();
    assert_eq!(
        pairs,
        vec![
            ("name".to_string(), "Jo Ann".to_string()),
            ("note".to_string(), "line1\nline2".to_string()),
        ]
    );
}

#[test]
fn records_of_kind_filters_live_records() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    store.append_extern("user", "id:1", b"a", None).unwrap();
    store.append_extern("cfg", "", b"b", None).unwrap();
    store.append_inline("user", "id:2", b"c", None).unwrap();

    let users = store.records_of_kind("user");
    assert_eq!(users.len(), 2);
    assert!(users.iter().all(|r| r.kind() == "user"));
    assert_eq!(store.records_of_kind("missing").len(), 0);
}

#[test]
fn empty_directory_opens_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    assert!(store.records().is_empty());
    assert_eq!(store.record_count(), 0);
    // The index file is created eagerly so reopen finds a valid store.
    assert!(dir.path().join("index.txt").exists());
    drop(store);

    let store = Store::open(config(&dir)).unwrap();
    assert!(store.records().is_empty());
}

#[test]
fn timestamp_defaults_to_now() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();

    let before = Timestamp::now();
    store.append_extern("k", "", b"x", None).unwrap();
    let after = Timestamp::now();

    let ts = store.records()[0].timestamp();
    assert!(ts >= before && ts <= after);
}

#[test]
fn sync_write_store_roundtrips() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoreConfig::new(dir.path());
    config.sync_write = true;

    let store = Store::open(config.clone()).unwrap();
    store.append_extern("k", "m:1", b"durable", None).unwrap();
    store.append_inline("k", "", b"also durable", None).unwrap();
    drop(store);

    let store = Store::open(config).unwrap();
    assert_eq!(store.records().len(), 2);
    assert_eq!(&store.read(&store.records()[0]).unwrap()[..], b"durable");
}

#[test]
fn close_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let store = Store::open(config(&dir)).unwrap();
    store.append_extern("k", "", b"x", None).unwrap();
    store.close().unwrap();
    store.close().unwrap();
    // The store reopens its handles on the next write.
    store.append_extern("k", "", b"y", None).unwrap();
    assert_eq!(store.records().len(), 2);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any append sequence survives close and reopen with identical
    /// records and byte-identical payloads.
    #[test]
    fn random_append_sequences_roundtrip(
        ops in prop::collection::vec(
            (
                0u8..3,
                "[a-z]{1,6}",
                "[ -~]{0,12}",
                prop::collection::vec(any::<u8>(), 0..40),
            ),
            1..12,
        )
    ) {
        let dir = tempfile::tempdir().unwrap();
        let store = Store::open(StoreConfig::new(dir.path())).unwrap();

        for (i, (placement, kind, meta, payload)) in ops.iter().enumerate() {
            let ts = Some(Timestamp::from_millis(1_700_000_000_000 + i as u64));
            match *placement {
                0 => store.append_extern(kind, meta, payload, ts).unwrap(),
                1 => store.append_inline(kind, meta, payload, ts).unwrap(),
                _ => store
                    .append_sidecar(kind, &format!("side{i}.bin"), payload, &[], ts)
                    .unwrap(),
            }
        }

        let written = store.all_records();
        drop(store);

        let store = Store::open(StoreConfig::new(dir.path())).unwrap();
        let reloaded = store.all_records();
        prop_assert_eq!(reloaded.len(), written.len());

        for (i, ((before, after), (placement, _, _, payload))) in
            written.iter().zip(&reloaded).zip(&ops).enumerate()
        {
            prop_assert_eq!(before.kind(), after.kind());
            prop_assert_eq!(before.meta(), after.meta());
            prop_assert_eq!(before.size(), after.size());
            prop_assert_eq!(before.timestamp(), after.timestamp());
            prop_assert_eq!(before.placement(), after.placement());
            prop_assert_eq!(before.offset(), after.offset(), "record {}", i);

            let bytes = match *placement {
                2 => store.read_sidecar_file(after).unwrap(),
                _ => store.read(after).unwrap(),
            };
            prop_assert_eq!(&bytes[..], &payload[..]);
        }
    }
}
