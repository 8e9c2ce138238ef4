//! Row Decoder Integration Tests
//!
//! Verifies header detection, the headerless fallback layout, the row skip
//! policy, and offset normalization against files on disk.

use loadsight::parsing::csv_source::{decode_file, decode_samples};
use std::fs;
use std::path::Path;

const TEST_DIR: &str = "target/test_data/decoder";

fn write_fixture(name: &str, content: &str) -> std::path::PathBuf {
    fs::create_dir_all(TEST_DIR).unwrap();
    let path = Path::new(TEST_DIR).join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_decode_file_with_header() {
    let path = write_fixture(
        "headered.jtl",
        "\
timeStamp,elapsed,label,responseCode,responseMessage,threadName,dataType,success,bytes,grpThreads,allThreads,Latency
1483224444000,302,Homepage,200,OK,pool-1-thread-1,text,true,14000,8,8,290
1483224445000,94,Login,200,OK,pool-1-thread-2,text,true,512,8,8,88
1483224446000,1502,Report,500,Internal Server Error,pool-1-thread-3,text,false,275,8,8,1500
",
    );
    let batch = decode_file(&path).unwrap();
    assert_eq!(batch.len(), 3);
    assert_eq!(batch.earliest_millis, 1_483_224_444_000);
    // Latest accounts for the duration of the last sample.
    assert_eq!(batch.latest_millis, 1_483_224_446_000 + 1502);
    assert_eq!(batch.samples[0].offset_millis, 0);
    assert_eq!(batch.samples[2].offset_millis, 2000);
    assert_eq!(&*batch.samples[2].status_message, "Internal Server Error");
    assert!(!batch.samples[2].success);
}

#[test]
fn test_decode_headerless_uses_default_layout() {
    let path = write_fixture(
        "headerless.jtl",
        "\
1483224444000,302,Homepage,200,OK,pool-1-thread-1,text,true,14000,8,8,290
1483224445000,94,Login,200,OK,pool-1-thread-2,text,true,512,8,8,88
",
    );
    let batch = decode_file(&path).unwrap();
    assert_eq!(batch.len(), 2);
    assert_eq!(&*batch.samples[0].label, "Homepage");
    assert_eq!(batch.samples[0].duration_millis, 302);
    assert_eq!(batch.samples[0].total_threads, 8);
    // Headerless exports have no sentBytes column.
    assert_eq!(batch.samples[0].sent_bytes, -1);
}

#[test]
fn test_header_matching_ignores_case_and_order() {
    let csv = "\
ELAPSED,TIMESTAMP,label,RESPONSECODE,threadname,SUCCESS,Bytes,ALLTHREADS
250,5000,search,404,worker-1,false,99,3
";
    let batch = decode_samples(csv.as_bytes()).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.samples[0].duration_millis, 250);
    assert_eq!(&*batch.samples[0].status_code, "404");
    assert_eq!(batch.samples[0].total_threads, 3);
}

#[test]
fn test_malformed_rows_are_skipped_not_fatal() {
    let csv = "\
timeStamp,elapsed,label,responseCode,threadName,success,bytes,allThreads
1000,5,home,200,t1,true,10,1
99999999999999999999999999,5,home,200,t1,true,10,1
2000,abc,home,200,t1,true,10,1
3000,5,home,200,t1,true,10,1,extra
4000,5,home,200,t1,true,10,1
";
    let batch = decode_samples(csv.as_bytes()).unwrap();
    // Overflow, bad integer, and wrong column count rows all dropped.
    assert_eq!(batch.len(), 2);
    assert_eq!(batch.samples[0].offset_millis, 0);
    assert_eq!(batch.samples[1].offset_millis, 3000);
}

#[test]
fn test_unknown_first_row_is_rejected() {
    let err = decode_samples("what,is,this\n1,2,3\n".as_bytes()).unwrap_err();
    assert!(err.is_client_fault());
}

#[test]
fn test_all_rows_bad_is_client_fault() {
    let csv = "\
timeStamp,elapsed,label,responseCode,threadName,success,bytes,allThreads
abc,5,home,200,t1,true,10,1
";
    let err = decode_samples(csv.as_bytes()).unwrap_err();
    assert!(err.is_client_fault());
}
