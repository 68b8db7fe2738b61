//! Suffix table: a corpus paired with its suffix array
//!
//! All queries run two binary searches over the suffix array, comparing the
//! query against at most `query.len()` tokens of each candidate suffix:
//!
//! - `lower_bound`: first entry whose suffix prefix is `>= query`
//! - `upper_bound`: first entry whose suffix prefix is `> query`
//!
//! Entries in between are exactly the occurrences of `query`, so a query
//! costs O(m log n) token comparisons for `m == query.len()`.
//!
//! The table is generic over its storage, so the same code serves boxed
//! slices held in memory and memory-mapped files.
//!
//! An empty query is a prefix of every suffix: it occurs `len()` times.

use crate::error::{Error, Result};
use crate::index::types::{SuffixEntry, Token};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::ops::Deref;

/// A corpus and the lexicographically sorted offsets of its suffixes
pub struct SuffixTable<T = Box<[Token]>, U = Box<[SuffixEntry]>> {
    text: T,
    table: U,
}

impl<T, U> SuffixTable<T, U>
where
    T: Deref<Target = [Token]> + Sync,
    U: Deref<Target = [SuffixEntry]> + Sync,
{
    /// Pair a corpus with a suffix array, checking that the array has one
    /// in-range entry per token.
    ///
    /// Sortedness is not checked here; see [`SuffixTable::is_sorted`].
    pub fn from_parts(text: T, table: U) -> Result<Self> {
        if text.len() != table.len() {
            return Err(Error::Format(format!(
                "suffix array has {} entries but the corpus has {} tokens",
                table.len(),
                text.len()
            )));
        }

        let len = text.len();
        if let Some(position) = table[..].par_iter().position_any(|&offset| offset >= len as u64) {
            return Err(Error::Validation {
                position,
                offset: table[position],
                len,
            });
        }

        Ok(SuffixTable { text, table })
    }

    /// Pair a corpus with a suffix array produced by the builder.
    pub(crate) fn from_sorted_parts(text: T, table: U) -> Self {
        debug_assert_eq!(text.len(), table.len());
        SuffixTable { text, table }
    }

    /// Consumes the suffix table and returns the underlying text and table.
    pub fn into_parts(self) -> (T, U) {
        (self.text, self.table)
    }

    /// Returns the number of suffixes in the table, which is the number of
    /// tokens in the corpus.
    #[inline]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns `true` iff `self.len() == 0`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The corpus tokens
    #[inline]
    pub fn text(&self) -> &[Token] {
        &self.text
    }

    /// The sorted suffix offsets
    #[inline]
    pub fn table(&self) -> &[SuffixEntry] {
        &self.table
    }

    /// Returns the suffix at rank `i`.
    #[inline]
    pub fn suffix(&self, i: usize) -> &[Token] {
        &self.text[self.table[i] as usize..]
    }

    /// Checks that every adjacent pair of suffixes is in order.
    ///
    /// This is always true for a table built by this crate; a `false`
    /// result means a corrupt or tampered index file.
    pub fn is_sorted(&self) -> bool {
        self.table[..]
            .par_windows(2)
            .all(|pair| self.text[pair[0] as usize..] <= self.text[pair[1] as usize..])
    }

    /// Returns true if and only if `query` occurs in the corpus.
    ///
    /// An empty query is contained in any non-empty corpus.
    pub fn contains(&self, query: &[Token]) -> bool {
        let (start, end) = self.boundaries(query);
        start < end
    }

    /// Number of (possibly overlapping) occurrences of `query`.
    ///
    /// An empty query counts `self.len()`.
    pub fn count(&self, query: &[Token]) -> usize {
        let (start, end) = self.boundaries(query);
        end - start
    }

    /// Returns the corpus offsets where `query` starts, in suffix order
    /// (not corpus order).
    pub fn positions(&self, query: &[Token]) -> &[SuffixEntry] {
        let (start, end) = self.boundaries(query);
        &self.table[start..end]
    }

    /// Count how often each token directly follows `query`.
    ///
    /// The result has one slot per token id in `0..=vocab` (all of `u16`
    /// when `vocab` is `None`). Successors above `vocab` are not counted,
    /// and an occurrence of `query` at the very end of the corpus has no
    /// successor.
    pub fn count_next(&self, query: &[Token], vocab: Option<Token>) -> Vec<usize> {
        let vocab_size = vocab.unwrap_or(Token::MAX) as usize + 1;
        let mut counts = vec![0usize; vocab_size];

        let (start, end) = self.boundaries(query);
        let m = query.len();

        // Within the match range, suffixes that are exactly `query` sort
        // first; the rest are grouped by their next token.
        let mut i = start + self.table[start..end].partition_point(|&s| self.text.len() - s as usize == m);
        while i < end {
            let token = self.suffix(i)[m];
            let group_end = i + self.table[i..end]
                .partition_point(|&s| self.text[s as usize + m] <= token);
            if let Some(slot) = counts.get_mut(token as usize) {
                *slot = group_end - i;
            }
            i = group_end;
        }

        counts
    }

    /// Count each query in parallel.
    pub fn batch_count(&self, queries: &[Vec<Token>]) -> Vec<usize> {
        queries.par_iter().map(|query| self.count(query)).collect()
    }

    /// Test each query for containment in parallel.
    pub fn batch_contains(&self, queries: &[Vec<Token>]) -> Vec<bool> {
        queries.par_iter().map(|query| self.contains(query)).collect()
    }

    /// Run [`SuffixTable::count_next`] for each query in parallel.
    pub fn batch_count_next(&self, queries: &[Vec<Token>], vocab: Option<Token>) -> Vec<Vec<usize>> {
        queries
            .par_iter()
            .map(|query| self.count_next(query, vocab))
            .collect()
    }

    /// Number of distinct token ids in the corpus
    pub fn distinct_tokens(&self) -> usize {
        // Suffixes sharing a first token are contiguous in the table
        let mut distinct = 0;
        let mut i = 0;
        while i < self.len() {
            let token = self.suffix(i)[0];
            i += self.table[i..].partition_point(|&s| self.text[s as usize] <= token);
            distinct += 1;
        }
        distinct
    }

    /// Frequency of frequencies for n-grams of length `n`: maps each
    /// occurrence count to the number of distinct n-grams seen that often.
    ///
    /// Suffixes sharing their first `n` tokens are contiguous in the table,
    /// so each distinct n-gram costs one bound search.
    pub fn count_ngrams(&self, n: usize) -> HashMap<usize, usize> {
        let mut frequencies = HashMap::new();
        if n == 0 {
            if !self.is_empty() {
                frequencies.insert(self.len(), 1);
            }
            return frequencies;
        }

        let mut i = 0;
        while i < self.len() {
            let suffix = self.suffix(i);
            if suffix.len() < n {
                i += 1;
                continue;
            }
            let count = self.upper_bound(&suffix[..n], i);
            *frequencies.entry(count).or_insert(0) += 1;
            i += count;
        }
        frequencies
    }

    /// Suffix-array range `[start, end)` of suffixes beginning with `query`.
    fn boundaries(&self, query: &[Token]) -> (usize, usize) {
        let start = self.lower_bound(query);
        let end = start + self.upper_bound(query, start);
        (start, end)
    }

    /// First rank whose truncated suffix is `>= query`
    fn lower_bound(&self, query: &[Token]) -> usize {
        self.table
            .partition_point(|&s| self.compare_prefix(s, query) == Ordering::Less)
    }

    /// Number of ranks from `start` whose truncated suffix equals `query`
    fn upper_bound(&self, query: &[Token], start: usize) -> usize {
        self.table[start..]
            .partition_point(|&s| self.compare_prefix(s, query) != Ordering::Greater)
    }

    /// Compare the first `query.len()` tokens of the suffix at `offset`
    /// with `query`. A suffix shorter than `query` compares as if padded
    /// with a value below every token.
    #[inline]
    fn compare_prefix(&self, offset: SuffixEntry, query: &[Token]) -> Ordering {
        let suffix = &self.text[offset as usize..];
        let prefix = &suffix[..suffix.len().min(query.len())];
        prefix.cmp(query)
    }
}

impl<T, U> fmt::Debug for SuffixTable<T, U>
where
    T: Deref<Target = [Token]>,
    U: Deref<Target = [SuffixEntry]>,
{
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("SuffixTable")
            .field("tokens", &self.text.len())
            .field("suffixes", &self.table.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::suffix_array::SuffixArrayBuilder;

    fn table(text: &[Token]) -> SuffixTable {
        let sa = SuffixArrayBuilder::with_defaults().build(text);
        SuffixTable::from_parts(text.into(), sa.into()).unwrap()
    }

    #[test]
    fn test_counts() {
        let t = table(&[1, 2, 1, 2, 3]);
        assert!(t.is_sorted());
        assert_eq!(t.count(&[1]), 2);
        assert_eq!(t.count(&[2]), 2);
        assert_eq!(t.count(&[1, 2]), 2);
        assert_eq!(t.count(&[2, 1]), 1);
        assert_eq!(t.count(&[1, 2, 3]), 1);
        assert_eq!(t.count(&[3, 1]), 0);
        assert!(!t.contains(&[3, 1]));
        assert!(t.contains(&[2, 1, 2, 3]));
    }

    #[test]
    fn test_single_token_corpus() {
        let t = table(&[5]);
        assert!(t.is_sorted());
        assert_eq!(t.count(&[5]), 1);
        assert_eq!(t.count(&[5, 5]), 0);
        assert!(!t.contains(&[4]));
        assert!(!t.contains(&[6]));
    }

    #[test]
    fn test_query_longer_than_corpus() {
        let t = table(&[1, 2]);
        assert_eq!(t.count(&[1, 2, 3]), 0);
        assert_eq!(t.count(&[1, 2, 0]), 0);
    }

    #[test]
    fn test_empty_query_matches_everywhere() {
        let t = table(&[3, 3, 1]);
        assert_eq!(t.count(&[]), 3);
        assert!(t.contains(&[]));

        let empty = table(&[]);
        assert_eq!(empty.count(&[]), 0);
        assert!(!empty.contains(&[]));
        assert!(!empty.contains(&[1]));
        assert!(empty.is_sorted());
    }

    #[test]
    fn test_overlapping_occurrences() {
        let t = table(&[9, 9, 9, 9]);
        assert_eq!(t.count(&[9, 9]), 3);
        assert_eq!(t.count(&[9, 9, 9, 9]), 1);
        assert_eq!(t.count(&[9, 9, 9, 9, 9]), 0);
    }

    #[test]
    fn test_positions() {
        let t = table(&[1, 2, 1, 2, 3]);
        let mut positions = t.positions(&[1, 2]).to_vec();
        positions.sort();
        assert_eq!(positions, vec![0, 2]);
        assert!(t.positions(&[7]).is_empty());
    }

    #[test]
    fn test_count_next() {
        let t = table(&[1, 1, 1, 2]);
        let counts = t.count_next(&[1], None);
        assert_eq!(counts.len(), 65536);
        assert_eq!(counts[1], 2);
        assert_eq!(counts[2], 1);
        assert_eq!(counts.iter().sum::<usize>(), 3);

        // Final token has no successor
        assert_eq!(t.count_next(&[2], Some(3)), vec![0, 0, 0, 0]);

        // Empty query counts unigrams
        assert_eq!(t.count_next(&[], Some(2)), vec![0, 3, 1]);

        // Successors above the vocabulary are dropped
        assert_eq!(t.count_next(&[1], Some(1)), vec![0, 2]);
    }

    #[test]
    fn test_batch_queries() {
        let t = table(&[1, 2, 1, 2, 3]);
        let queries = vec![vec![1], vec![1, 2], vec![3, 1]];
        assert_eq!(t.batch_count(&queries), vec![2, 2, 0]);
        assert_eq!(t.batch_contains(&queries), vec![true, true, false]);
        let next = t.batch_count_next(&queries, Some(3));
        assert_eq!(next[0], vec![0, 0, 2, 0]);
        assert_eq!(next[1], vec![0, 1, 0, 1]);
    }

    #[test]
    fn test_count_ngrams() {
        let t = table(&[1, 2, 1, 2, 3]);
        // 1, 2 twice; 3 once
        assert_eq!(t.count_ngrams(1), HashMap::from([(2, 2), (1, 1)]));
        // [1, 2] twice; [2, 1] and [2, 3] once
        assert_eq!(t.count_ngrams(2), HashMap::from([(2, 1), (1, 2)]));
        assert_eq!(t.count_ngrams(5), HashMap::from([(1, 1)]));
        assert!(t.count_ngrams(6).is_empty());
        assert_eq!(t.count_ngrams(0), HashMap::from([(5, 1)]));
        assert!(table(&[]).count_ngrams(0).is_empty());
    }

    #[test]
    fn test_count_ngrams_matches_scan() {
        let text: Vec<Token> = (0..400u32).map(|i| ((i * i + 3 * i) % 5) as Token).collect();
        let t = table(&text);
        for n in 1..6 {
            let mut ngrams: HashMap<&[Token], usize> = HashMap::new();
            for w in text.windows(n) {
                *ngrams.entry(w).or_default() += 1;
            }
            let mut expected: HashMap<usize, usize> = HashMap::new();
            for &c in ngrams.values() {
                *expected.entry(c).or_default() += 1;
            }
            assert_eq!(t.count_ngrams(n), expected, "n = {n}");
        }
    }

    #[test]
    fn test_distinct_tokens() {
        assert_eq!(table(&[4, 1, 4, 9, 1]).distinct_tokens(), 3);
        assert_eq!(table(&[]).distinct_tokens(), 0);
    }

    #[test]
    fn test_from_parts_rejects_bad_tables() {
        let text: Box<[Token]> = vec![1, 2, 3].into();

        let short: Box<[SuffixEntry]> = vec![0, 1].into();
        assert!(matches!(
            SuffixTable::from_parts(text.clone(), short),
            Err(Error::Format(_))
        ));

        let out_of_range: Box<[SuffixEntry]> = vec![0, 7, 1].into();
        assert!(matches!(
            SuffixTable::from_parts(text.clone(), out_of_range),
            Err(Error::Validation {
                position: 1,
                offset: 7,
                len: 3
            })
        ));

        let unsorted: Box<[SuffixEntry]> = vec![2, 1, 0].into();
        assert!(!SuffixTable::from_parts(text, unsorted).unwrap().is_sorted());
    }
}
