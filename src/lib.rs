//! # gramidx - Suffix-array n-gram index
//!
//! gramidx answers two questions about any n-gram (a sequence of token
//! ids) over corpora of up to billions of tokens: does it occur, and how
//! many times.
//!
//! ## Architecture
//!
//! The crate is organized into these main modules:
//!
//! - [`index`] - Token files, suffix array construction, queries, the
//!   in-memory and memory-mapped indexes, and n-gram sampling
//! - [`error`] - Error taxonomy for loading, building and opening
//! - [`utils`] - Record encoding and progress reporting
//!
//! ## Quick Start
//!
//! ```no_run
//! use gramidx::{InMemoryIndex, MemmapIndex, NgramIndex};
//! use std::path::Path;
//!
//! // Index tokens held in memory
//! let index = InMemoryIndex::new(vec![1u16, 2, 1, 2, 3]);
//! assert_eq!(index.count(&[1, 2]), 2);
//!
//! // Persist once, then open as often as needed
//! index.save_tokens(Path::new("corpus.bin")).unwrap();
//! MemmapIndex::build(Path::new("corpus.bin"), Path::new("corpus.idx")).unwrap();
//! let mapped = MemmapIndex::open(Path::new("corpus.bin"), Path::new("corpus.idx")).unwrap();
//! assert!(mapped.contains(&[2, 3]));
//! ```
//!
//! ## Formats
//!
//! Token files hold 2-byte little-endian token ids; index files hold 8-byte
//! little-endian suffix offsets. Neither has a header.

pub mod error;
pub mod index;
pub mod utils;

pub use error::{Error, Result};
pub use index::{
    BuildConfig, InMemoryIndex, KneserNey, KneserNeyCache, MemmapIndex, NgramIndex, Sample,
    SortAlgorithm,
};
