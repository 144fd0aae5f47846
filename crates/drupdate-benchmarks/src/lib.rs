//! drupdate benchmarking suite
//!
//! Benchmarks for version parsing and pinning, release selection, catalog
//! decoding and the composer.json codec.

pub mod common;

pub use common::*;
