//! Reads binary sample artifacts back into batches.

use crate::codec::status::StatusCodeLookup;
use crate::codec::{ArtifactHeader, EncodedRow, FORMAT_VERSION, MAGIC};
use crate::error::{Error, Result};
use crate::model::{Sample, Samples};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

/// An open artifact: validated header plus a cursor over the rows.
#[derive(Debug)]
pub struct Artifact<R: Read> {
    header: ArtifactHeader,
    statuses: StatusCodeLookup,
    reader: R,
    remaining: u64,
}

impl Artifact<BufReader<File>> {
    pub fn open_file(path: &Path) -> Result<Self> {
        Self::open(BufReader::new(File::open(path)?))
    }
}

impl<R: Read> Artifact<R> {
    /// Validates the magic and version, then reads the header.
    pub fn open(mut reader: R) -> Result<Self> {
        let mut magic = [0u8; 8];
        reader.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(Error::Corrupted("bad magic".to_string()));
        }
        let mut version_bytes = [0u8; 2];
        reader.read_exact(&mut version_bytes)?;
        let version = u16::from_be_bytes(version_bytes);
        if version != FORMAT_VERSION {
            return Err(Error::Corrupted(format!(
                "unsupported format version {}",
                version
            )));
        }
        let header: ArtifactHeader = bincode::deserialize_from(&mut reader)?;
        let statuses = StatusCodeLookup::with_custom(
            header.custom_codes.clone(),
            header.custom_messages.clone(),
        )
        .map_err(|_| Error::Corrupted("custom status lists are uneven".to_string()))?;
        let remaining = header.num_rows;
        Ok(Self { header, statuses, reader, remaining })
    }

    pub fn header(&self) -> &ArtifactHeader {
        &self.header
    }

    /// The next stored row, or `None` past the last one.
    pub fn next_row(&mut self) -> Result<Option<EncodedRow>> {
        if self.remaining == 0 {
            return Ok(None);
        }
        let row: EncodedRow = bincode::deserialize_from(&mut self.reader)?;
        self.remaining -= 1;
        Ok(Some(row))
    }

    /// Reads every remaining row and resolves dictionary references back
    /// into a full sample batch.
    pub fn read_samples(mut self) -> Result<Samples> {
        let labels: Vec<Arc<str>> =
            self.header.labels.iter().map(|s| Arc::from(s.as_str())).collect();
        let thread_names: Vec<Arc<str>> =
            self.header.thread_names.iter().map(|s| Arc::from(s.as_str())).collect();
        let empty: Arc<str> = Arc::from("");
        let mut status_cache: std::collections::HashMap<i32, (Arc<str>, Arc<str>)> =
            std::collections::HashMap::new();

        let mut samples = Vec::with_capacity(self.header.num_rows as usize);
        while let Some(row) = self.next_row()? {
            let label = resolve_ref(row.label_ref, &labels, &empty, "label")?;
            let thread_name =
                resolve_ref(row.thread_ref, &thread_names, &empty, "thread name")?;
            let (status_code, status_message) = match status_cache.get(&row.status_ref) {
                Some(pair) => pair.clone(),
                None => {
                    let code = self.statuses.code_of(row.status_ref).ok_or_else(|| {
                        Error::Corrupted(format!(
                            "status reference {} out of range",
                            row.status_ref
                        ))
                    })?;
                    let message =
                        self.statuses.message_of(row.status_ref).ok_or_else(|| {
                            Error::Corrupted(format!(
                                "status reference {} out of range",
                                row.status_ref
                            ))
                        })?;
                    let pair: (Arc<str>, Arc<str>) =
                        (Arc::from(code), Arc::from(message));
                    status_cache.insert(row.status_ref, pair.clone());
                    pair
                }
            };
            samples.push(Sample {
                offset_millis: row.offset_millis,
                duration_millis: row.duration_millis,
                label,
                thread_name,
                status_code,
                status_message,
                success: row.success,
                response_bytes: row.response_bytes,
                sent_bytes: row.sent_bytes,
                total_threads: row.total_threads,
            });
        }

        Ok(Samples {
            samples,
            earliest_millis: self.header.earliest_millis,
            latest_millis: self.header.latest_millis,
        })
    }
}

fn resolve_ref(
    reference: u32,
    dictionary: &[Arc<str>],
    empty: &Arc<str>,
    what: &str,
) -> Result<Arc<str>> {
    if reference == 0 {
        Ok(Arc::clone(empty))
    } else {
        dictionary
            .get(reference as usize - 1)
            .cloned()
            .ok_or_else(|| {
                Error::Corrupted(format!("{} reference {} out of range", what, reference))
            })
    }
}
