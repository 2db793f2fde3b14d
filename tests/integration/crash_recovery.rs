//! Integration tests for crash survivability
//!
//! A session that is never closed has no zip central directory, but every
//! appended entry must already be on disk as a complete local file record.

use debug_archive::DebugHandle;
use tempfile::TempDir;

const LOCAL_HEADER_SIGNATURE: &[u8] = b"PK\x03\x04";
const LOCAL_HEADER_LEN: usize = 30;
const CRC_OFFSET: usize = 14;
const COMPRESSED_SIZE_OFFSET: usize = 18;

/// Bytes that deflate cannot shrink, so the on-disk size bounds the payload.
fn incompressible(len: usize) -> Vec<u8> {
    let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            (state >> 24) as u8
        })
        .collect()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Test that entry bytes are on disk before the archive is closed
#[test]
fn test_unclosed_session_keeps_entry_bytes() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let handle = DebugHandle::create(dir.path()).unwrap();
    let path = handle.archive().unwrap().path().to_path_buf();

    handle.append_graph("plan", "digraph{}").unwrap();
    let after_first = std::fs::read(&path).unwrap();
    handle.append_blob("result", &[1, 2, 3]).unwrap();
    let after_second = std::fs::read(&path).unwrap();

    // Simulate the process dying: the archive is never finalized.
    std::mem::forget(handle);

    assert!(after_first.starts_with(LOCAL_HEADER_SIGNATURE));
    assert_eq!(
        &after_first[LOCAL_HEADER_LEN..LOCAL_HEADER_LEN + "debug/0-plan.dot".len()],
        b"debug/0-plan.dot"
    );
    assert!(after_second.len() > after_first.len());
    assert!(find(&after_second, b"debug/1-result").is_some());

    // No trailer yet, so a standard reader cannot open it.
    let file = std::fs::File::open(&path).unwrap();
    assert!(zip::ZipArchive::new(file).is_err());
}

/// Test that the previous entry's header is complete once the next one starts
#[test]
fn test_earlier_entries_survive_later_appends() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let handle = DebugHandle::create(dir.path()).unwrap();
    let path = handle.archive().unwrap().path().to_path_buf();

    for i in 0..3 {
        handle
            .append_blob(&format!("chunk{i}"), format!("payload {i}").as_bytes())
            .unwrap();
    }
    let bytes = std::fs::read(&path).unwrap();
    std::mem::forget(handle);

    let headers = bytes
        .windows(LOCAL_HEADER_SIGNATURE.len())
        .filter(|w| *w == LOCAL_HEADER_SIGNATURE)
        .count();
    assert!(headers >= 3, "expected three local headers, found {headers}");
    for i in 0..3 {
        let name = format!("debug/{i}-chunk{i}");
        assert!(find(&bytes, name.as_bytes()).is_some(), "missing {name}");
    }
}

/// Test that the payload of the last entry is flushed past the compressor
#[test]
fn test_last_entry_payload_is_on_disk() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let handle = DebugHandle::create(dir.path()).unwrap();
    let path = handle.archive().unwrap().path().to_path_buf();
    let payload = incompressible(8 * 1024);

    handle.append_blob("state", &payload).unwrap();
    let bytes = std::fs::read(&path).unwrap();
    std::mem::forget(handle);

    assert!(bytes.starts_with(LOCAL_HEADER_SIGNATURE));
    assert!(
        bytes.len() >= LOCAL_HEADER_LEN + payload.len(),
        "only {} bytes on disk",
        bytes.len()
    );

    // CRC and sizes of the newest entry are patched in when the next entry
    // starts or the archive closes; until then they read as zero, and
    // recovery has to scan for the next header instead.
    assert_eq!(&bytes[CRC_OFFSET..CRC_OFFSET + 4], &[0, 0, 0, 0]);
    assert_eq!(
        &bytes[COMPRESSED_SIZE_OFFSET..COMPRESSED_SIZE_OFFSET + 4],
        &[0, 0, 0, 0]
    );
}
