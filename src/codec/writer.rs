//! Encodes a sample batch into the binary artifact format.

use crate::codec::status::StatusCodeLookup;
use crate::codec::{ArtifactHeader, EncodedRow, HashingWriter, FORMAT_VERSION, MAGIC};
use crate::error::Result;
use crate::model::{Sample, Samples};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::debug;

/// Writes `batch` as an artifact and returns the SHA-256 of the bytes
/// written, as lowercase hex.
pub fn write_artifact<W: Write>(batch: &Samples, writer: W) -> Result<String> {
    // Custom status references are allocated in row order, so the same batch
    // always yields the same custom lists.
    let mut statuses = StatusCodeLookup::new();
    let status_refs: Vec<i32> = batch
        .samples
        .iter()
        .map(|s| statuses.resolve(&s.status_code, &s.status_message))
        .collect();

    let header = ArtifactHeader {
        earliest_millis: batch.earliest_millis,
        latest_millis: batch.latest_millis,
        num_rows: batch.len() as u64,
        labels: dictionary_of(batch, label_of),
        thread_names: dictionary_of(batch, thread_name_of),
        custom_codes: statuses.custom_codes().to_vec(),
        custom_messages: statuses.custom_messages().to_vec(),
    };
    let label_refs = ref_map(&header.labels);
    let thread_refs = ref_map(&header.thread_names);

    let mut out = HashingWriter::new(writer);
    out.write_all(&MAGIC)?;
    out.write_all(&FORMAT_VERSION.to_be_bytes())?;
    bincode::serialize_into(&mut out, &header)?;

    for (sample, &status_ref) in batch.samples.iter().zip(status_refs.iter()) {
        let row = EncodedRow {
            offset_millis: sample.offset_millis,
            duration_millis: sample.duration_millis,
            label_ref: *label_refs.get(&*sample.label).unwrap_or(&0),
            status_ref,
            thread_ref: *thread_refs.get(&*sample.thread_name).unwrap_or(&0),
            success: sample.success,
            response_bytes: sample.response_bytes,
            sent_bytes: sample.sent_bytes,
            total_threads: sample.total_threads,
        };
        bincode::serialize_into(&mut out, &row)?;
    }

    out.flush()?;
    let (_, digest) = out.finish();
    debug!("encoded {} rows, sha256={}", batch.len(), digest);
    Ok(digest)
}

/// Writes an artifact file, creating parent directories as needed.
pub fn write_artifact_file(batch: &Samples, path: &Path) -> Result<String> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = BufWriter::new(File::create(path)?);
    write_artifact(batch, file)
}

fn label_of(sample: &Sample) -> &str {
    &sample.label
}

fn thread_name_of(sample: &Sample) -> &str {
    &sample.thread_name
}

/// Sorted distinct non-empty values of one string field across the batch.
fn dictionary_of(batch: &Samples, field: for<'a> fn(&'a Sample) -> &'a str) -> Vec<String> {
    let mut values: Vec<String> = batch
        .samples
        .iter()
        .map(|s| field(s).to_string())
        .filter(|v| !v.is_empty())
        .collect();
    values.sort();
    values.dedup();
    values
}

fn ref_map(dictionary: &[String]) -> HashMap<&str, u32> {
    dictionary
        .iter()
        .enumerate()
        .map(|(i, value)| (value.as_str(), i as u32 + 1))
        .collect()
}
