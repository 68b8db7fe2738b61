//! Query interface shared by the in-memory and memory-mapped indexes

use super::suffix_array::SuffixTable;
use super::types::{IndexStats, OFFSET_WIDTH, SuffixEntry, TOKEN_WIDTH, Token};
use std::collections::HashMap;
use std::ops::Deref;

/// An immutable n-gram index backed by a [`SuffixTable`].
///
/// Every query is a pure read, so an index can be shared across threads
/// and queried concurrently.
pub trait NgramIndex: Sync {
    type Text: Deref<Target = [Token]> + Sync;
    type Table: Deref<Target = [SuffixEntry]> + Sync;

    fn suffix_table(&self) -> &SuffixTable<Self::Text, Self::Table>;

    /// Number of tokens in the corpus
    fn len(&self) -> usize {
        self.suffix_table().len()
    }

    fn is_empty(&self) -> bool {
        self.suffix_table().is_empty()
    }

    /// Re-check that the suffix array is sorted
    fn is_sorted(&self) -> bool {
        self.suffix_table().is_sorted()
    }

    /// Whether `query` occurs in the corpus. The empty query is contained
    /// in every non-empty corpus.
    fn contains(&self, query: &[Token]) -> bool {
        self.suffix_table().contains(query)
    }

    /// Number of occurrences of `query`. The empty query counts every
    /// position.
    fn count(&self, query: &[Token]) -> usize {
        self.suffix_table().count(query)
    }

    /// Corpus offsets where `query` starts, in suffix order
    fn positions(&self, query: &[Token]) -> &[SuffixEntry] {
        self.suffix_table().positions(query)
    }

    /// Occurrence counts of each token id in `0..=vocab` directly after
    /// `query`
    fn count_next(&self, query: &[Token], vocab: Option<Token>) -> Vec<usize> {
        self.suffix_table().count_next(query, vocab)
    }

    fn batch_count(&self, queries: &[Vec<Token>]) -> Vec<usize> {
        self.suffix_table().batch_count(queries)
    }

    fn batch_contains(&self, queries: &[Vec<Token>]) -> Vec<bool> {
        self.suffix_table().batch_contains(queries)
    }

    fn batch_count_next(&self, queries: &[Vec<Token>], vocab: Option<Token>) -> Vec<Vec<usize>> {
        self.suffix_table().batch_count_next(queries, vocab)
    }

    /// Number of distinct n-grams of length `n` per occurrence count
    fn count_ngrams(&self, n: usize) -> HashMap<usize, usize> {
        self.suffix_table().count_ngrams(n)
    }

    /// Size summary of the index
    fn stats(&self) -> IndexStats {
        let table = self.suffix_table();
        let len = table.len() as u64;
        IndexStats {
            token_count: len,
            token_bytes: len * TOKEN_WIDTH as u64,
            index_bytes: len * OFFSET_WIDTH as u64,
            distinct_tokens: table.distinct_tokens() as u64,
        }
    }
}
