//! # Loadsight
//!
//! Loadsight turns raw load-test result logs into compact binary sample
//! artifacts and derives statistics from them.
//!
//! A CSV "JTL"-style export goes in one end; out the other come a
//! deterministic, dictionary-encoded artifact (same batch in, same bytes
//! out, with a SHA-256 fingerprint), aggregate and time-bucketed stats per
//! label, response-duration histograms and percentile tables, and status
//! code distributions. A background import service drives the whole
//! pipeline per uploaded log.
//!
//! ## Example
//!
//! ```no_run
//! use loadsight::parsing::csv_source::decode_file;
//! use loadsight::stats::builder::calc_aggregate_stats;
//! use std::path::Path;
//!
//! fn example() -> loadsight::Result<()> {
//!     let mut batch = decode_file(Path::new("results.jtl"))?;
//!     let stats = calc_aggregate_stats(&mut batch.samples);
//!     println!("{} samples, {} errors", stats.num_samples, stats.num_errors);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_docs_in_private_items)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::doc_markdown)]
#![allow(clippy::module_name_repetitions)]
#![allow(missing_docs)]

/// Binary sample artifact encoding and decoding
pub mod codec;

/// Importer configuration
pub mod config;

/// Error types and result definitions
pub mod error;

/// Background import queue and worker
pub mod importer;

/// Samples, logs, and statistics models
pub mod model;

/// CSV result-log decoding
pub mod parsing;

/// Statistics calculation
pub mod stats;

// Re-export commonly used types
pub use error::{Error, Result};
