//! End-to-end tests
//!
//! Export through a directory, reopen, and compare every query against an
//! in-memory model of the same data.

use std::collections::BTreeMap;
use std::io;

use pagekv::store::prefix_upper_bound;
use pagekv::{export_to_dir, Cursor, Store, WriterConfig};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

fn export_store(temp: &TempDir, entries: &BTreeMap<Vec<u8>, Vec<u8>>, config: &WriterConfig) -> Store {
    let dir = temp.path().join("index");
    export_to_dir(
        entries.iter().map(|(k, v)| Ok::<_, io::Error>((k, v))),
        &dir,
        config,
    )
    .unwrap();
    Store::open_dir(&dir).unwrap()
}

fn drain(mut cursor: Cursor<'_>) -> Vec<(Vec<u8>, Vec<u8>)> {
    let mut out = Vec::new();
    while let Some((key, value)) = cursor.current() {
        out.push((key.to_vec(), value.to_vec()));
        cursor.next();
    }
    assert!(cursor.error().is_none());
    cursor.close();
    out
}

/// A model with shared prefixes, empty values and high bytes
fn model() -> BTreeMap<Vec<u8>, Vec<u8>> {
    let mut entries = BTreeMap::new();
    for word in ["", "a", "ab", "abc", "abd", "b", "ba", "bb", "c"] {
        entries.insert(word.as_bytes().to_vec(), format!("v:{}", word).into_bytes());
    }
    for i in 0..300u32 {
        entries.insert(format!("doc/{:04}", i).into_bytes(), i.to_le_bytes().to_vec());
        entries.insert(format!("term/{:03}/x", i % 50).into_bytes(), Vec::new());
    }
    entries.insert(vec![0xFF], b"ff".to_vec());
    entries.insert(vec![0xFF, 0x00], b"ff00".to_vec());
    entries.insert(vec![0xFF, 0xFF, 0xFF], b"ffffff".to_vec());
    entries
}

// =============================================================================
// Scenario Tests
// =============================================================================

#[test]
fn test_small_store_scenario() {
    let temp = TempDir::new().unwrap();
    let mut entries = BTreeMap::new();
    entries.insert(b"a".to_vec(), b"1".to_vec());
    entries.insert(b"ab".to_vec(), b"2".to_vec());
    entries.insert(b"b".to_vec(), b"3".to_vec());

    let store = export_store(&temp, &entries, &WriterConfig::default());
    let reader = store.reader();

    assert_eq!(reader.get(b"ab").unwrap().as_deref(), Some(b"2".as_slice()));
    assert_eq!(reader.get(b"abc").unwrap(), None);

    let prefix_a = drain(reader.prefix_iterator(b"a"));
    assert_eq!(
        prefix_a,
        vec![(b"a".to_vec(), b"1".to_vec()), (b"ab".to_vec(), b"2".to_vec())]
    );

    let range = drain(reader.range_iterator(b"ab", Some(b"b".as_slice())));
    assert_eq!(range, vec![(b"ab".to_vec(), b"2".to_vec())]);

    assert!(drain(reader.range_iterator(b"a", Some(b"".as_slice()))).is_empty());
    assert_eq!(drain(reader.range_iterator(b"ab", None)).len(), 2);

    assert_eq!(reader.get(b"c").unwrap(), None);

    let mut writer = store.writer();
    let batch = writer.new_batch();
    assert!(writer.execute_batch(batch).unwrap_err().is_unsupported());

    store.close().unwrap();
}

// =============================================================================
// Model Comparison Tests
// =============================================================================

#[test]
fn test_queries_match_model_for_all_page_sizes() {
    let entries = model();

    for per_page in [1, 2, 3, 7, 50, 10_000] {
        let temp = TempDir::new().unwrap();
        let config = WriterConfig::builder().max_rows_per_page(per_page).build();
        let store = export_store(&temp, &entries, &config);
        let reader = store.reader();

        // Every stored key, plus a key just past each one
        for (key, value) in &entries {
            assert_eq!(reader.get(key).unwrap().as_deref(), Some(value.as_slice()));

            let mut longer = key.clone();
            longer.push(0x01);
            assert_eq!(
                reader.get(&longer).unwrap().as_deref(),
                entries.get(&longer).map(|v| v.as_slice())
            );
        }

        // Prefix scans
        let prefixes: [&[u8]; 8] = [b"", b"a", b"ab", b"doc/01", b"term/", b"z", b"\xff", b"\xff\xff"];
        for prefix in prefixes {
            let expected: Vec<(Vec<u8>, Vec<u8>)> = entries
                .iter()
                .filter(|(k, _)| k.starts_with(prefix))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            assert_eq!(
                drain(reader.prefix_iterator(prefix)),
                expected,
                "prefix {:?} with {} rows/page",
                prefix,
                per_page
            );
        }

        // Range scans, including an open-ended one and an empty one
        let ranges: [(&[u8], Option<&[u8]>); 6] = [
            (b"a", Some(b"b".as_slice())),
            (b"abc", Some(b"doc/0100".as_slice())),
            (b"doc/0299", Some(b"term/".as_slice())),
            (b"bb", None),
            (b"", Some(b"a".as_slice())),
            (b"a", Some(b"".as_slice())),
        ];
        for (start, end) in ranges {
            let expected: Vec<(Vec<u8>, Vec<u8>)> = entries
                .iter()
                .filter(|(k, _)| k.as_slice() >= start && end.map_or(true, |end| k.as_slice() < end))
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect();
            assert_eq!(
                drain(reader.range_iterator(start, end)),
                expected,
                "range {:?}..{:?} with {} rows/page",
                start,
                end,
                per_page
            );
        }
    }
}

#[test]
fn test_prefix_scan_equals_range_to_upper_bound() {
    let entries = model();
    let temp = TempDir::new().unwrap();
    let store = export_store(&temp, &entries, &WriterConfig::builder().max_rows_per_page(5).build());
    let reader = store.reader();

    let prefixes: [&[u8]; 3] = [b"a", b"doc/", b"term/04"];
    for prefix in prefixes {
        let end = prefix_upper_bound(prefix).unwrap();
        assert_eq!(
            drain(reader.prefix_iterator(prefix)),
            drain(reader.range_iterator(prefix, Some(end.as_slice())))
        );
    }
}
