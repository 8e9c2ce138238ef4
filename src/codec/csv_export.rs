//! Converts a binary artifact back into a JTL-style CSV file.
//!
//! Only columns that actually carry data are emitted: an artifact whose rows
//! never recorded sent bytes produces a CSV without a sentBytes column. The
//! surviving columns keep the canonical catalog order.

use crate::codec::reader::Artifact;
use crate::codec::HashingWriter;
use crate::error::{Error, Result};
use crate::model::Samples;
use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

struct ColumnPresence {
    label: bool,
    status: bool,
    thread_name: bool,
    bytes: bool,
    sent_bytes: bool,
    threads: bool,
}

impl ColumnPresence {
    fn inspect(batch: &Samples) -> Self {
        Self {
            label: batch.samples.iter().any(|s| !s.label.is_empty()),
            status: batch
                .samples
                .iter()
                .any(|s| !s.status_code.is_empty() || !s.status_message.is_empty()),
            thread_name: batch.samples.iter().any(|s| !s.thread_name.is_empty()),
            bytes: batch.samples.iter().any(|s| s.response_bytes != -1),
            sent_bytes: batch.samples.iter().any(|s| s.sent_bytes != -1),
            threads: batch.samples.iter().any(|s| s.total_threads > 0),
        }
    }
}

/// Writes the artifact's rows as CSV and returns the SHA-256 of the CSV
/// bytes as lowercase hex.
pub fn export_csv<R: Read, W: Write>(artifact: Artifact<R>, out: W) -> Result<String> {
    let batch = artifact.read_samples()?;
    let presence = ColumnPresence::inspect(&batch);

    let mut csv_writer = csv::Writer::from_writer(HashingWriter::new(out));

    let mut header: Vec<&str> = vec!["timeStamp", "elapsed"];
    if presence.label {
        header.push("label");
    }
    if presence.status {
        header.push("responseCode");
        header.push("responseMessage");
    }
    if presence.thread_name {
        header.push("threadName");
    }
    header.push("success");
    if presence.bytes {
        header.push("bytes");
    }
    if presence.sent_bytes {
        header.push("sentBytes");
    }
    if presence.threads {
        header.push("allThreads");
    }
    csv_writer.write_record(&header)?;

    for sample in &batch.samples {
        let mut record: Vec<String> = Vec::with_capacity(header.len());
        record.push((batch.earliest_millis + sample.offset_millis).to_string());
        record.push(sample.duration_millis.to_string());
        if presence.label {
            record.push(sample.label.to_string());
        }
        if presence.status {
            record.push(sample.status_code.to_string());
            record.push(sample.status_message.to_string());
        }
        if presence.thread_name {
            record.push(sample.thread_name.to_string());
        }
        record.push(sample.success.to_string());
        if presence.bytes {
            record.push(sample.response_bytes.to_string());
        }
        if presence.sent_bytes {
            record.push(sample.sent_bytes.to_string());
        }
        if presence.threads {
            record.push(sample.total_threads.to_string());
        }
        csv_writer.write_record(&record)?;
    }

    csv_writer.flush()?;
    let hashing = csv_writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("flushing csv output: {}", e)))?;
    let (_, digest) = hashing.finish();
    Ok(digest)
}

/// File-to-file convenience wrapper.
pub fn export_csv_file(artifact_path: &Path, csv_path: &Path) -> Result<String> {
    let artifact = Artifact::open_file(artifact_path)?;
    if let Some(parent) = csv_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let out = BufWriter::new(File::create(csv_path)?);
    export_csv(artifact, out)
}
