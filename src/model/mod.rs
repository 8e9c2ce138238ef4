//! Core data model: decoded samples, logs, and import jobs

pub mod stats;

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

/// One load-test result row after decoding.
///
/// String fields are interned `Arc<str>` handles so a batch of millions of
/// samples shares one allocation per distinct label/thread/status.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Milliseconds since the earliest sample in the batch.
    pub offset_millis: i64,
    /// How long the sampled request took, in milliseconds.
    pub duration_millis: i64,
    pub label: Arc<str>,
    pub thread_name: Arc<str>,
    pub status_code: Arc<str>,
    pub status_message: Arc<str>,
    pub success: bool,
    /// Response body size in bytes, or -1 when the source had no bytes column.
    pub response_bytes: i64,
    /// Sent payload size in bytes, or -1 when the source had no sentBytes column.
    pub sent_bytes: i64,
    /// Total threads active across all groups when the sample was taken.
    pub total_threads: i32,
}

impl Sample {
    /// Full ordering used before encoding: offset, duration, label, thread
    /// name, response bytes, status code, status message, success, total
    /// threads, all ascending.
    pub fn cmp_temporal(a: &Sample, b: &Sample) -> Ordering {
        a.offset_millis
            .cmp(&b.offset_millis)
            .then_with(|| a.duration_millis.cmp(&b.duration_millis))
            .then_with(|| a.label.cmp(&b.label))
            .then_with(|| a.thread_name.cmp(&b.thread_name))
            .then_with(|| a.response_bytes.cmp(&b.response_bytes))
            .then_with(|| a.status_code.cmp(&b.status_code))
            .then_with(|| a.status_message.cmp(&b.status_message))
            .then_with(|| a.success.cmp(&b.success))
            .then_with(|| a.total_threads.cmp(&b.total_threads))
    }

    /// Ordering used to group samples by label while keeping each group in
    /// time order.
    pub fn cmp_label_offset(a: &Sample, b: &Sample) -> Ordering {
        a.label.cmp(&b.label).then_with(|| a.offset_millis.cmp(&b.offset_millis))
    }

    /// Ordering by request duration, for percentile extraction.
    pub fn cmp_duration(a: &Sample, b: &Sample) -> Ordering {
        a.duration_millis.cmp(&b.duration_millis)
    }
}

/// A decoded batch of samples plus the batch-level timing metadata.
#[derive(Debug, Clone, Default)]
pub struct Samples {
    pub samples: Vec<Sample>,
    /// Absolute timestamp (epoch millis) of the earliest sample.
    pub earliest_millis: i64,
    /// Absolute timestamp (epoch millis) at which the last sample finished.
    pub latest_millis: i64,
}

impl Samples {
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Distinct labels across the batch, sorted.
    pub fn label_set(&self) -> Vec<String> {
        let mut labels: Vec<String> =
            self.samples.iter().map(|s| s.label.to_string()).collect();
        labels.sort();
        labels.dedup();
        labels
    }
}

/// Lifecycle of a log, from upload through conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogStatus {
    Unspecified,
    AwaitingUpload,
    Uploading,
    UploadFailed,
    Queued,
    Importing,
    ImportFailed,
    Complete,
}

/// A log known to the system. Storage and retrieval of logs is an external
/// concern; the importer only moves `status` forward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Log {
    pub id: i64,
    pub name: String,
    pub status: LogStatus,
}

/// A unit of work for the import queue: where the uploaded rows live and
/// which log they belong to.
#[derive(Debug, Clone)]
pub struct ImportJob {
    pub log_id: i64,
    pub source_path: PathBuf,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(offset: i64, duration: i64, label: &str, success: bool) -> Sample {
        Sample {
            offset_millis: offset,
            duration_millis: duration,
            label: label.into(),
            thread_name: "t1".into(),
            status_code: "200".into(),
            status_message: "OK".into(),
            success,
            response_bytes: 100,
            sent_bytes: -1,
            total_threads: 1,
        }
    }

    #[test]
    fn test_temporal_order_breaks_ties_on_duration() {
        let a = sample(10, 5, "home", true);
        let b = sample(10, 7, "home", true);
        assert_eq!(Sample::cmp_temporal(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_temporal_order_failure_sorts_before_success() {
        let a = sample(10, 5, "home", false);
        let b = sample(10, 5, "home", true);
        assert_eq!(Sample::cmp_temporal(&a, &b), Ordering::Less);
    }

    #[test]
    fn test_label_set_is_sorted_and_distinct() {
        let batch = Samples {
            samples: vec![sample(0, 1, "b", true), sample(1, 1, "a", true), sample(2, 1, "b", true)],
            earliest_millis: 0,
            latest_millis: 3,
        };
        assert_eq!(batch.label_set(), vec!["a".to_string(), "b".to_string()]);
    }
}
