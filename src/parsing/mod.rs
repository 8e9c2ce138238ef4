//! Decoding of raw result logs into sample batches

pub mod columns;
pub mod csv_source;
