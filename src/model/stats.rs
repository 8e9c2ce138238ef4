//! Statistical summary types produced by the aggregator

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

/// Summary statistics for one group of samples (a whole batch, one label, or
/// one time bucket). Percentile fields are `None` when the group is empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
    /// Start of the group relative to the batch start, in milliseconds.
    pub offset_millis: i64,
    pub min: Option<i64>,
    pub p25: Option<i64>,
    pub p50: Option<i64>,
    pub p75: Option<i64>,
    pub p90: Option<i64>,
    pub p95: Option<i64>,
    pub p99: Option<i64>,
    pub max: Option<i64>,
    pub avg: Option<i64>,
    pub num_samples: i64,
    pub total_response_bytes: i64,
    pub num_errors: i64,
}

impl Stats {
    /// An empty group: counts are zero and every measurement is absent.
    pub fn empty(offset_millis: i64) -> Self {
        Self {
            offset_millis,
            min: None,
            p25: None,
            p50: None,
            p75: None,
            p90: None,
            p95: None,
            p99: None,
            max: None,
            avg: None,
            num_samples: 0,
            total_response_bytes: 0,
            num_errors: 0,
        }
    }
}

/// Stats rows at a fixed bucket width.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeseries {
    pub span_millis: i64,
    pub rows: Vec<Stats>,
}

/// Response-duration histogram with logarithmically spaced buckets.
/// `counts[i]` samples fell at or below `bucket_maximums[i]`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Histogram {
    pub counts: Vec<i64>,
    pub bucket_maximums: Vec<i64>,
}

/// Percentile table: at percentile `percentiles[i]`, `counts[i]` samples
/// (cumulative) finished within `values[i]` milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Percentiles {
    pub counts: Vec<i64>,
    pub values: Vec<i64>,
    pub percentiles: Vec<f64>,
}

/// Occurrence counts of response status codes, bucketed by time.
/// `span_millis == 0` means a single bin covering the whole batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeCounts {
    pub span_millis: i64,
    /// Distinct codes seen, sorted. Each bin vector is indexed in this order.
    pub codes: Vec<String>,
    pub counts: Vec<Vec<i64>>,
}

impl CodeCounts {
    pub fn builder(span_millis: i64) -> CodeCountsBuilder {
        CodeCountsBuilder { span_millis, bins: Vec::new(), current: HashMap::new() }
    }

    /// Re-projects the counts onto a caller-supplied code list so several
    /// CodeCounts can be charted against one shared axis. Codes missing from
    /// `code_list` are dropped; codes this instance never saw get zero columns.
    pub fn normalize_using(&self, code_list: &[String]) -> CodeCounts {
        let index_of: HashMap<&str, usize> =
            self.codes.iter().enumerate().map(|(i, c)| (c.as_str(), i)).collect();
        let counts = self
            .counts
            .iter()
            .map(|bin| {
                code_list
                    .iter()
                    .map(|code| index_of.get(code.as_str()).map_or(0, |&i| bin[i]))
                    .collect()
            })
            .collect();
        CodeCounts { span_millis: self.span_millis, codes: code_list.to_vec(), counts }
    }
}

/// Accumulates code occurrences one bin at a time.
pub struct CodeCountsBuilder {
    span_millis: i64,
    bins: Vec<HashMap<String, i64>>,
    current: HashMap<String, i64>,
}

impl CodeCountsBuilder {
    pub fn increment(&mut self, code: &str) {
        *self.current.entry(code.to_string()).or_insert(0) += 1;
    }

    /// Closes the bin under construction. Every bucket must be committed,
    /// including empty ones, so bin indexes line up with time buckets.
    pub fn commit_bin(&mut self) {
        self.bins.push(std::mem::take(&mut self.current));
    }

    /// Finishes the matrix. An uncommitted partial bin is committed first
    /// when it holds any counts.
    pub fn build(mut self) -> CodeCounts {
        if !self.current.is_empty() {
            self.commit_bin();
        }
        let codes: Vec<String> = self
            .bins
            .iter()
            .flat_map(|bin| bin.keys().cloned())
            .collect::<BTreeSet<String>>()
            .into_iter()
            .collect();
        let counts = self
            .bins
            .iter()
            .map(|bin| codes.iter().map(|code| *bin.get(code).unwrap_or(&0)).collect())
            .collect();
        CodeCounts { span_millis: self.span_millis, codes, counts }
    }
}
