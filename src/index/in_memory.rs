//! Fully resident n-gram index
//!
//! Holds the corpus and its suffix array in memory. The suffix array is
//! built eagerly when the index is created.

use super::countable::NgramIndex;
use super::suffix_array::{SuffixArrayBuilder, SuffixTable};
use super::tokens::{read_token_file, tokens_from_wide, write_token_file};
use super::types::{BuildConfig, SuffixEntry, Token};
use crate::error::Result;
use std::path::Path;

/// An n-gram index whose corpus and suffix array live in memory
pub struct InMemoryIndex {
    table: SuffixTable<Box<[Token]>, Box<[SuffixEntry]>>,
}

impl InMemoryIndex {
    /// Index `tokens` with the default build configuration
    pub fn new(tokens: impl Into<Box<[Token]>>) -> Self {
        Self::with_config(tokens, &BuildConfig::default())
    }

    /// Index `tokens` using `config`
    pub fn with_config(tokens: impl Into<Box<[Token]>>, config: &BuildConfig) -> Self {
        let text = tokens.into();
        let sa = SuffixArrayBuilder::new(config.clone()).build(&text);
        Self {
            table: SuffixTable::from_sorted_parts(text, sa.into_boxed_slice()),
        }
    }

    /// Index wide token ids, failing if any does not fit a token record
    pub fn from_wide(tokens: &[u32]) -> Result<Self> {
        Ok(Self::new(tokens_from_wide(tokens)?))
    }

    /// Load a token file, keeping only the first `limit` tokens if given,
    /// and index it
    pub fn from_token_file(path: &Path, limit: Option<usize>) -> Result<Self> {
        Self::from_token_file_with_config(path, limit, &BuildConfig::default())
    }

    pub fn from_token_file_with_config(
        path: &Path,
        limit: Option<usize>,
        config: &BuildConfig,
    ) -> Result<Self> {
        let tokens = read_token_file(path, limit)?;
        Ok(Self::with_config(tokens, config))
    }

    /// Write the corpus to `path` in the token file format
    pub fn save_tokens(&self, path: &Path) -> Result<()> {
        write_token_file(path, self.tokens().iter().map(|&t| t as u32))?;
        Ok(())
    }

    /// The indexed corpus
    pub fn tokens(&self) -> &[Token] {
        self.table.text()
    }

    /// Consume the index, returning the corpus and its suffix array
    pub fn into_parts(self) -> (Box<[Token]>, Box<[SuffixEntry]>) {
        self.table.into_parts()
    }
}

impl NgramIndex for InMemoryIndex {
    type Text = Box<[Token]>;
    type Table = Box<[SuffixEntry]>;

    fn suffix_table(&self) -> &SuffixTable<Box<[Token]>, Box<[SuffixEntry]>> {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::index::types::SortAlgorithm;
    use tempfile::tempdir;

    #[test]
    fn test_example_corpus() {
        let index = InMemoryIndex::new(vec![1u16, 2, 1, 2, 3]);
        assert!(index.is_sorted());
        assert_eq!(index.count(&[1]), 2);
        assert_eq!(index.count(&[2, 1]), 1);
        assert_eq!(index.count(&[1, 2, 3]), 1);
        assert!(!index.contains(&[3, 1]));
    }

    #[test]
    fn test_comparison_config_agrees() {
        let tokens: Vec<Token> = (0..500u32).map(|i| (i * i % 7) as Token).collect();
        let config = BuildConfig {
            algorithm: SortAlgorithm::Comparison,
            ..Default::default()
        };
        let a = InMemoryIndex::new(tokens.clone());
        let b = InMemoryIndex::with_config(tokens, &config);
        assert_eq!(a.into_parts(), b.into_parts());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("tokens.bin");

        let index = InMemoryIndex::new(vec![7u16, 8, 7, 8, 9, 65535]);
        index.save_tokens(&path).unwrap();

        let reloaded = InMemoryIndex::from_token_file(&path, None).unwrap();
        assert_eq!(reloaded.tokens(), index.tokens());
        assert_eq!(reloaded.count(&[7, 8]), 2);
        assert_eq!(reloaded.count(&[65535]), 1);

        let prefix = InMemoryIndex::from_token_file(&path, Some(3)).unwrap();
        assert_eq!(prefix.tokens(), &[7, 8, 7]);
        assert_eq!(prefix.count(&[7, 8]), 1);
    }

    #[test]
    fn test_from_wide_range_error() {
        assert!(matches!(
            InMemoryIndex::from_wide(&[1, 2, 65536]),
            Err(Error::Range { position: 2, .. })
        ));
        assert_eq!(InMemoryIndex::from_wide(&[4, 4]).unwrap().count(&[4]), 2);
    }

    #[test]
    fn test_stats() {
        let stats = InMemoryIndex::new(vec![1u16, 1, 2]).stats();
        assert_eq!(stats.token_count, 3);
        assert_eq!(stats.token_bytes, 6);
        assert_eq!(stats.index_bytes, 24);
        assert_eq!(stats.distinct_tokens, 2);
    }
}
