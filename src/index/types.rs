//! Core types and on-disk constants for the n-gram index.
//!
//! ## File Formats
//!
//! Both files are headerless, flat arrays of little-endian records:
//!
//! - token file: one `u16` per token (2 bytes), token count = len / 2
//! - index file: one `u64` per suffix array entry (8 bytes), entry count = len / 8
//!
//! An index file is only valid next to the token file it was built from,
//! so the entry count must equal the token count.

use serde::{Deserialize, Serialize};

/// A single corpus token (vocabulary id)
pub type Token = u16;

/// Suffix array entry - offset of a suffix in the corpus
pub type SuffixEntry = u64;

/// Bytes per token record
pub const TOKEN_WIDTH: usize = std::mem::size_of::<Token>();

/// Bytes per suffix array record
pub const OFFSET_WIDTH: usize = std::mem::size_of::<SuffixEntry>();

/// Suffix array construction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortAlgorithm {
    /// Linear-time induced sorting (SA-IS)
    #[default]
    InducedSort,
    /// Sort offsets by comparing suffixes directly, in parallel for large
    /// inputs. O(n log n) comparisons of unbounded length; used as a
    /// reference for small corpora.
    Comparison,
}

/// Configuration for suffix array building
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Construction algorithm (default: induced sort)
    pub algorithm: SortAlgorithm,
    /// Show a progress spinner while building (default: false)
    pub progress: bool,
    /// Inputs at least this long are sorted in parallel by the comparison
    /// algorithm (default: 100_000)
    pub parallel_threshold: usize,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            algorithm: SortAlgorithm::InducedSort,
            progress: false,
            parallel_threshold: 100_000,
        }
    }
}

/// Summary of an index, printed by `gramidx stats`
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct IndexStats {
    /// Number of tokens in the corpus (equals suffix count)
    pub token_count: u64,
    /// Size of the token data in bytes
    pub token_bytes: u64,
    /// Size of the suffix array in bytes
    pub index_bytes: u64,
    /// Number of distinct token ids in the corpus
    pub distinct_tokens: u64,
}
