//! Tests for point lookups
//!
//! These tests verify:
//! - Every stored key is found, across page boundaries
//! - Absent keys between, before and after stored keys
//! - Exact-match semantics when one key is a prefix of another
//! - MultiGet ordering and failure handling

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bytes::Bytes;
use pagekv::error::ReadError;
use pagekv::{export, Container, ReadAt, Reader, WriterConfig};

// =============================================================================
// Helper Functions
// =============================================================================

fn rows_per_page(rows: usize) -> WriterConfig {
    WriterConfig::builder().max_rows_per_page(rows).build()
}

fn build_bytes(entries: &[(&str, &str)], config: &WriterConfig) -> Vec<u8> {
    let mut buf = Vec::new();
    export(
        entries.iter().map(|&(k, v)| Ok::<_, io::Error>((k, v))),
        &mut buf,
        config,
    )
    .unwrap();
    buf
}

fn open_bytes(buf: Vec<u8>) -> Container {
    let len = buf.len() as u64;
    Container::open(Arc::new(buf), len).unwrap()
}

fn build(entries: &[(&str, &str)], config: &WriterConfig) -> Container {
    open_bytes(build_bytes(entries, config))
}

fn numbered(count: usize) -> Vec<(String, String)> {
    // Even numbers only, so odd keys are known gaps
    (0..count)
        .map(|i| (format!("key{:05}", i * 2), format!("value{}", i * 2)))
        .collect()
}

fn as_refs(entries: &[(String, String)]) -> Vec<(&str, &str)> {
    entries.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect()
}

fn value(s: &str) -> Option<Bytes> {
    Some(Bytes::copy_from_slice(s.as_bytes()))
}

/// In-memory source whose reads can be switched off
struct Switchable {
    data: Vec<u8>,
    failing: AtomicBool,
}

impl ReadAt for Switchable {
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(io::Error::new(io::ErrorKind::Other, "device lost"));
        }
        self.data.read_exact_at(buf, offset)
    }
}

/// Open entries over a source that fails every read once opened
fn build_failing(entries: &[(&str, &str)], config: &WriterConfig) -> Container {
    let buf = build_bytes(entries, config);
    let len = buf.len() as u64;
    let source = Arc::new(Switchable {
        data: buf,
        failing: AtomicBool::new(false),
    });
    let container = Container::open(source.clone(), len).unwrap();
    source.failing.store(true, Ordering::SeqCst);
    container
}

// =============================================================================
// Get Tests
// =============================================================================

#[test]
fn test_get_every_key_across_pages() {
    let entries = numbered(500);
    for per_page in [1, 3, 64, 1_000] {
        let container = build(&as_refs(&entries), &rows_per_page(per_page));
        let reader = Reader::from(&container);

        for (key, expected) in &entries {
            let found = reader.get(key.as_bytes()).unwrap();
            assert_eq!(found, value(expected), "key {} with {} rows/page", key, per_page);
        }
    }
}

#[test]
fn test_get_missing_between_keys() {
    let entries = numbered(100);
    let container = build(&as_refs(&entries), &rows_per_page(4));
    let reader = Reader::from(&container);

    for i in 0..99 {
        let missing = format!("key{:05}", i * 2 + 1);
        assert_eq!(reader.get(missing.as_bytes()).unwrap(), None, "{}", missing);
    }
}

#[test]
fn test_get_before_first_and_after_last() {
    let container = build(&[("b", "1"), ("c", "2"), ("d", "3")], &rows_per_page(1));
    let reader = Reader::from(&container);

    assert_eq!(reader.get(b"a").unwrap(), None);
    assert_eq!(reader.get(b"").unwrap(), None);
    assert_eq!(reader.get(b"e").unwrap(), None);
    assert_eq!(reader.get(b"dd").unwrap(), None);
}

#[test]
fn test_get_longer_key_sharing_stored_prefix() {
    // "ab" matches "abc" under the page comparator, but is not the key
    for per_page in [1, 2, 10] {
        let container = build(&[("a", "1"), ("ab", "2"), ("b", "3")], &rows_per_page(per_page));
        let reader = Reader::from(&container);

        assert_eq!(reader.get(b"abc").unwrap(), None);
        assert_eq!(reader.get(b"ab").unwrap(), value("2"));
    }
}

#[test]
fn test_get_exact_match_when_key_is_prefix_of_another() {
    for per_page in [1, 2, 10] {
        let container = build(&[("ab", "short"), ("abc", "long")], &rows_per_page(per_page));
        let reader = Reader::from(&container);

        assert_eq!(reader.get(b"ab").unwrap(), value("short"));
        assert_eq!(reader.get(b"abc").unwrap(), value("long"));
        assert_eq!(reader.get(b"a").unwrap(), None);
        assert_eq!(reader.get(b"abcd").unwrap(), None);
    }
}

#[test]
fn test_get_empty_key() {
    let container = build(&[("", "root"), ("a", "1")], &rows_per_page(1));
    let reader = Reader::from(&container);

    assert_eq!(reader.get(b"").unwrap(), value("root"));
    assert_eq!(reader.get(b"a").unwrap(), value("1"));
}

#[test]
fn test_get_empty_value_is_found() {
    let container = build(&[("a", ""), ("b", "x")], &WriterConfig::default());
    let reader = Reader::from(&container);

    assert_eq!(reader.get(b"a").unwrap(), Some(Bytes::new()));
}

#[test]
fn test_get_duplicate_key_returns_first() {
    let container = build(&[("a", "1"), ("b", "first"), ("b", "second"), ("c", "3")], &rows_per_page(2));
    let reader = Reader::from(&container);

    assert_eq!(reader.get(b"b").unwrap(), value("first"));
}

#[test]
fn test_get_without_container() {
    let reader = Reader::new(None);

    assert_eq!(reader.get(b"anything").unwrap(), None);
}

#[test]
fn test_get_read_failure_is_an_error() {
    let container = build_failing(&[("apple", "1"), ("banana", "2")], &rows_per_page(1));
    let reader = Reader::from(&container);

    assert!(matches!(reader.get(b"apple"), Err(ReadError::Io(_))));
    assert!(matches!(reader.get(b"banana"), Err(ReadError::Io(_))));
}

#[test]
fn test_get_outside_page_bounds_reads_no_rows() {
    // Pages: [a, b] [d, e]; every row read fails
    let container = build_failing(&[("a", "1"), ("b", "2"), ("d", "3"), ("e", "4")], &rows_per_page(2));
    let reader = Reader::from(&container);

    assert_eq!(reader.get(b"c").unwrap(), None);
    assert_eq!(reader.get(b"bb").unwrap(), None);
    assert_eq!(reader.get(b"f").unwrap(), None);
    assert_eq!(reader.get(b"0").unwrap(), None);
    assert!(reader.get(b"d").is_err());
}

// =============================================================================
// MultiGet Tests
// =============================================================================

#[test]
fn test_multi_get_preserves_order() {
    let container = build(&[("a", "1"), ("b", "2"), ("c", "3")], &rows_per_page(1));
    let reader = Reader::from(&container);

    let found = reader.multi_get(&["c", "missing", "a", "c"]).unwrap();

    assert_eq!(found, vec![value("3"), None, value("1"), value("3")]);
}

#[test]
fn test_multi_get_empty_input() {
    let container = build(&[("a", "1")], &WriterConfig::default());
    let reader = Reader::from(&container);

    let found = reader.multi_get::<&[u8]>(&[]).unwrap();

    assert!(found.is_empty());
}

#[test]
fn test_multi_get_aborts_on_failure() {
    let container = build_failing(&[("apple", "1"), ("banana", "2")], &rows_per_page(1));
    let reader = Reader::from(&container);

    // The absent key needs no rows; the stored one fails the batch
    assert_eq!(reader.multi_get(&["zebra"]).unwrap(), vec![None]);
    assert!(reader.multi_get(&["zebra", "apple"]).is_err());
}

// =============================================================================
// Concurrency Tests
// =============================================================================

#[test]
fn test_concurrent_readers_share_container() {
    let entries = numbered(1_000);
    let container = build(&as_refs(&entries), &rows_per_page(16));

    std::thread::scope(|scope| {
        for t in 0..4 {
            let container = &container;
            let entries = &entries;
            scope.spawn(move || {
                let reader = Reader::from(container);
                for (key, expected) in entries.iter().skip(t).step_by(4) {
                    assert_eq!(reader.get(key.as_bytes()).unwrap(), value(expected));
                }
            });
        }
    });
}
