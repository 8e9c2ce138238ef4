//! Sample Store Codec Integration Tests
//!
//! Covers encode/decode fidelity, deterministic output, corruption
//! detection, and the presence-based CSV export.

use loadsight::codec::csv_export::export_csv;
use loadsight::codec::reader::Artifact;
use loadsight::codec::writer::{write_artifact, write_artifact_file};
use loadsight::error::Error;
use loadsight::model::Sample;
use loadsight::parsing::csv_source::decode_samples;
use std::fs;
use std::path::Path;

const TEST_DIR: &str = "target/test_data/codec";

const SOURCE: &str = "\
timeStamp,elapsed,label,responseCode,responseMessage,threadName,success,bytes,sentBytes,allThreads
1483224444000,302,Homepage,200,OK,pool-1-thread-1,true,14000,120,8
1483224444100,94,Login,401,Challenge accepted,pool-1-thread-2,false,512,80,8
1483224445000,150,Homepage,200,OK,pool-1-thread-1,true,13500,120,8
";

#[test]
fn test_round_trip_preserves_samples() {
    let original = decode_samples(SOURCE.as_bytes()).unwrap();

    let mut bytes = Vec::new();
    write_artifact(&original, &mut bytes).unwrap();

    let artifact = Artifact::open(bytes.as_slice()).unwrap();
    assert_eq!(artifact.header().num_rows, 3);
    assert_eq!(artifact.header().labels, vec!["Homepage", "Login"]);
    // 401 with a nonstandard message lands in the custom range.
    assert_eq!(artifact.header().custom_codes, vec!["401"]);
    assert_eq!(artifact.header().custom_messages, vec!["Challenge accepted"]);

    let rebuilt = artifact.read_samples().unwrap();
    assert_eq!(rebuilt.earliest_millis, original.earliest_millis);
    assert_eq!(rebuilt.latest_millis, original.latest_millis);
    assert_eq!(rebuilt.len(), original.len());
    for (a, b) in original.samples.iter().zip(rebuilt.samples.iter()) {
        assert_eq!(a.offset_millis, b.offset_millis);
        assert_eq!(a.duration_millis, b.duration_millis);
        assert_eq!(&*a.label, &*b.label);
        assert_eq!(&*a.thread_name, &*b.thread_name);
        assert_eq!(&*a.status_code, &*b.status_code);
        assert_eq!(&*a.status_message, &*b.status_message);
        assert_eq!(a.success, b.success);
        assert_eq!(a.response_bytes, b.response_bytes);
        assert_eq!(a.sent_bytes, b.sent_bytes);
        assert_eq!(a.total_threads, b.total_threads);
    }
}

#[test]
fn test_encoding_is_deterministic() {
    let batch = decode_samples(SOURCE.as_bytes()).unwrap();

    let mut first = Vec::new();
    let first_hash = write_artifact(&batch, &mut first).unwrap();
    let mut second = Vec::new();
    let second_hash = write_artifact(&batch, &mut second).unwrap();

    assert_eq!(first, second);
    assert_eq!(first_hash, second_hash);
    assert_eq!(first_hash.len(), 64);
}

#[test]
fn test_artifact_file_round_trip() {
    fs::create_dir_all(TEST_DIR).unwrap();
    let path = Path::new(TEST_DIR).join("round_trip.bin");

    let mut batch = decode_samples(SOURCE.as_bytes()).unwrap();
    batch.samples.sort_by(Sample::cmp_temporal);
    let hash = write_artifact_file(&batch, &path).unwrap();
    assert_eq!(hash.len(), 64);

    let rebuilt = Artifact::open_file(&path).unwrap().read_samples().unwrap();
    assert_eq!(rebuilt.len(), 3);
}

#[test]
fn test_bad_magic_is_corruption() {
    let err = Artifact::open(&b"NOTANART\x00\x01garbage"[..]).unwrap_err();
    assert!(matches!(err, Error::Corrupted(_)));
}

#[test]
fn test_unsupported_version_is_corruption() {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(b"LDSAMPLE");
    bytes.extend_from_slice(&99u16.to_be_bytes());
    let err = Artifact::open(bytes.as_slice()).unwrap_err();
    assert!(matches!(err, Error::Corrupted(_)));
}

#[test]
fn test_export_emits_only_populated_columns() {
    let batch = decode_samples(SOURCE.as_bytes()).unwrap();
    let mut artifact_bytes = Vec::new();
    write_artifact(&batch, &mut artifact_bytes).unwrap();

    let mut csv_bytes = Vec::new();
    let hash =
        export_csv(Artifact::open(artifact_bytes.as_slice()).unwrap(), &mut csv_bytes).unwrap();
    assert_eq!(hash.len(), 64);

    let text = String::from_utf8(csv_bytes).unwrap();
    let mut lines = text.lines();
    assert_eq!(
        lines.next().unwrap(),
        "timeStamp,elapsed,label,responseCode,responseMessage,threadName,success,bytes,sentBytes,allThreads"
    );
    // Absolute timestamps are reconstructed from the stored earliest.
    assert!(text.contains("1483224444000,302,Homepage,200,OK,pool-1-thread-1,true,14000,120,8"));
}

#[test]
fn test_export_drops_absent_columns() {
    // No sentBytes column and allThreads never above zero.
    let source = "\
timeStamp,elapsed,label,responseCode,threadName,success,bytes,allThreads
1000,5,home,200,t1,true,10,0
2000,7,home,200,t1,true,12,0
";
    let batch = decode_samples(source.as_bytes()).unwrap();
    let mut artifact_bytes = Vec::new();
    write_artifact(&batch, &mut artifact_bytes).unwrap();

    let mut csv_bytes = Vec::new();
    export_csv(Artifact::open(artifact_bytes.as_slice()).unwrap(), &mut csv_bytes).unwrap();

    let text = String::from_utf8(csv_bytes).unwrap();
    let header = text.lines().next().unwrap();
    assert_eq!(
        header,
        "timeStamp,elapsed,label,responseCode,responseMessage,threadName,success,bytes"
    );
}

#[test]
fn test_exported_csv_decodes_again() {
    let batch = decode_samples(SOURCE.as_bytes()).unwrap();
    let mut artifact_bytes = Vec::new();
    write_artifact(&batch, &mut artifact_bytes).unwrap();

    let mut csv_bytes = Vec::new();
    export_csv(Artifact::open(artifact_bytes.as_slice()).unwrap(), &mut csv_bytes).unwrap();

    let redecoded = decode_samples(csv_bytes.as_slice()).unwrap();
    assert_eq!(redecoded.len(), batch.len());
    assert_eq!(redecoded.earliest_millis, batch.earliest_millis);
}
