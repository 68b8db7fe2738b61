//! Suffix array builder
//!
//! Sorts every start offset of a token corpus by the suffix beginning
//! there. Two strategies are available:
//!
//! - induced sorting (SA-IS), linear time, the default
//! - a parallel comparison sort, kept as a simple reference
//!
//! Both produce the same array: tokens are compared pairwise and a suffix
//! that runs out first sorts first.

use super::sais;
use crate::index::types::{BuildConfig, SortAlgorithm, SuffixEntry, Token};
use crate::utils::progress::build_spinner;
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

/// Builder for constructing suffix arrays from token corpora
pub struct SuffixArrayBuilder {
    config: BuildConfig,
}

impl SuffixArrayBuilder {
    /// Create a new suffix array builder with the given configuration
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    /// Create a builder with default configuration
    pub fn with_defaults() -> Self {
        Self::new(BuildConfig::default())
    }

    /// Build the suffix array of `text`
    ///
    /// Blocks until the whole array is sorted.
    pub fn build(&self, text: &[Token]) -> Vec<SuffixEntry> {
        let started = Instant::now();
        let spinner = build_spinner(self.config.progress);
        spinner.set_message(format!("sorting {} suffixes", text.len()));

        let sa = match self.config.algorithm {
            SortAlgorithm::InducedSort => sais::suffix_array(text),
            SortAlgorithm::Comparison => {
                build_suffix_array_comparison(text, self.config.parallel_threshold)
            }
        };

        spinner.finish_and_clear();
        info!(
            tokens = text.len(),
            algorithm = ?self.config.algorithm,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built suffix array"
        );
        sa
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }
}

impl Default for SuffixArrayBuilder {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Build suffix array by sorting offsets on the suffixes they point to
///
/// Time: O(n log n) comparisons, each up to O(n) tokens long
/// Space: O(n) for the suffix array
fn build_suffix_array_comparison(text: &[Token], parallel_threshold: usize) -> Vec<SuffixEntry> {
    let n = text.len();
    let mut sa: Vec<SuffixEntry> = (0..n as SuffixEntry).collect();

    // Unstable sorting needs no extra memory; offsets are unique anyway
    if n >= parallel_threshold {
        sa.par_sort_unstable_by_key(|&i| &text[i as usize..]);
    } else {
        sa.sort_unstable_by_key(|&i| &text[i as usize..]);
    }

    sa
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison() -> SuffixArrayBuilder {
        SuffixArrayBuilder::new(BuildConfig {
            algorithm: SortAlgorithm::Comparison,
            ..Default::default()
        })
    }

    #[test]
    fn test_suffix_array_correctness() {
        let text = [1, 2, 1, 2, 3];

        // 0: 1 2 1 2 3
        // 2: 1 2 3
        // 1: 2 1 2 3
        // 3: 2 3
        // 4: 3
        let expected = vec![0, 2, 1, 3, 4];
        assert_eq!(SuffixArrayBuilder::with_defaults().build(&text), expected);
        assert_eq!(comparison().build(&text), expected);
    }

    #[test]
    fn test_shorter_suffix_sorts_first() {
        let text = [4, 4, 4];
        assert_eq!(SuffixArrayBuilder::with_defaults().build(&text), vec![2, 1, 0]);
    }

    #[test]
    fn test_empty_corpus() {
        assert!(SuffixArrayBuilder::with_defaults().build(&[]).is_empty());
        assert!(comparison().build(&[]).is_empty());
    }

    #[test]
    fn test_parallel_comparison_matches_induced_sort() {
        let text: Vec<Token> = (0..5000u32).map(|i| ((i * 7919) % 13) as Token).collect();
        let parallel = SuffixArrayBuilder::new(BuildConfig {
            algorithm: SortAlgorithm::Comparison,
            parallel_threshold: 1,
            ..Default::default()
        });
        assert_eq!(
            parallel.build(&text),
            SuffixArrayBuilder::with_defaults().build(&text)
        );
    }
}
