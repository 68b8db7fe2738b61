//! Suffix array indexing module
//!
//! This module provides O(m log n) exact n-gram counting using suffix arrays.
//!
//! ## Architecture
//!
//! - `builder`: Constructs suffix arrays from token corpora
//! - `sais`: Linear-time induced sorting used by the builder
//! - `table`: Binary-search queries over a corpus and its suffix array
//! - `writer`: Persists suffix arrays to disk

pub mod builder;
mod sais;
pub mod table;
pub mod writer;

// Re-exports for convenience
pub use builder::SuffixArrayBuilder;
pub use table::SuffixTable;
pub use writer::SuffixArrayWriter;
