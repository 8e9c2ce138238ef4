//! Statistics derived from sample batches

pub mod builder;
pub mod unify;
