//! Binary sample artifact format.
//!
//! An artifact is: an 8-byte magic, a big-endian u16 format version, a
//! bincode header carrying the batch metadata and dictionaries, then
//! `num_rows` bincode rows. Everything about the layout is deterministic:
//! dictionaries are sorted, custom status references are allocated in row
//! order, and nothing time- or machine-dependent is written. Encoding the
//! same batch twice produces byte-identical files.

pub mod csv_export;
pub mod reader;
pub mod status;
pub mod writer;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::io::Write;

/// Identifies a loadsight sample artifact.
pub const MAGIC: [u8; 8] = *b"LDSAMPLE";

/// Current artifact format version.
pub const FORMAT_VERSION: u16 = 1;

/// Batch metadata written once, ahead of the rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub earliest_millis: i64,
    pub latest_millis: i64,
    pub num_rows: u64,
    /// Sorted distinct labels. Row references are 1-based; 0 means unset.
    pub labels: Vec<String>,
    /// Sorted distinct thread names, referenced like `labels`.
    pub thread_names: Vec<String>,
    pub custom_codes: Vec<String>,
    pub custom_messages: Vec<String>,
}

/// One sample row as stored on disk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodedRow {
    pub offset_millis: i64,
    pub duration_millis: i64,
    pub label_ref: u32,
    pub status_ref: i32,
    pub thread_ref: u32,
    pub success: bool,
    pub response_bytes: i64,
    pub sent_bytes: i64,
    pub total_threads: i32,
}

/// A `Write` adapter that feeds every written byte through SHA-256 so the
/// caller gets a content fingerprint of exactly what landed in the stream.
pub struct HashingWriter<W: Write> {
    inner: W,
    hasher: Sha256,
}

impl<W: Write> HashingWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, hasher: Sha256::new() }
    }

    /// Returns the wrapped writer and the lowercase hex digest of all bytes
    /// written through this adapter.
    pub fn finish(self) -> (W, String) {
        (self.inner, hex::encode(self.hasher.finalize()))
    }
}

impl<W: Write> Write for HashingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let written = self.inner.write(buf)?;
        self.hasher.update(&buf[..written]);
        Ok(written)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.inner.flush()
    }
}
