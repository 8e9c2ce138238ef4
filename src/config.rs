//! Configuration structures for the importer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Settings for the import worker and eager stats calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImporterConfig {
    /// Directory where converted binary artifacts are written.
    pub converted_dir: PathBuf,
    /// Bucket width for timeseries stats and code counts, in milliseconds.
    pub span_millis: i64,
    /// Sort decoded samples before encoding. Keeps artifacts byte-identical
    /// for re-imports of the same data regardless of source row order.
    pub sort_samples: bool,
}

impl Default for ImporterConfig {
    fn default() -> Self {
        Self {
            converted_dir: PathBuf::from("data/converted"),
            span_millis: 60_000,
            sort_samples: true,
        }
    }
}
