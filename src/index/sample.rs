//! N-gram language models over an index
//!
//! [`Sample`] draws continuations straight from `count_next`, so every
//! sampled n-gram occurs in the corpus. [`KneserNey`] interpolates each
//! order with the next lower one using absolute discounting (Ney, Essen,
//! Kneser 1994), bottoming out in additively smoothed unigram
//! probabilities, and can therefore continue any context.

use super::countable::NgramIndex;
use super::types::Token;
use crate::error::Result;
use rand::distributions::{Distribution, WeightedIndex};
use rand::{Rng, thread_rng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Discount used for orders whose delta has not been estimated
pub const DEFAULT_DELTA: f64 = 0.5;

/// Additive smoothing applied to unigram counts
const UNIGRAM_EPSILON: f64 = 1e-9;

/// The last `n - 1` tokens of `sequence`, which an n-gram model conditions on
fn context(sequence: &[Token], n: usize) -> &[Token] {
    &sequence[sequence.len().saturating_sub(n.saturating_sub(1))..]
}

/// Unsmoothed autoregressive sampling, available on every index
pub trait Sample: NgramIndex {
    /// Extend `query` by `k` tokens, each drawn in proportion to how often
    /// it follows the previous `n - 1` tokens.
    ///
    /// Fails if a context is never followed by a token, which happens when
    /// its only occurrence ends the corpus.
    fn sample(&self, query: &[Token], n: usize, k: usize) -> Result<Vec<Token>> {
        self.sample_with_rng(&mut thread_rng(), query, n, k)
    }

    fn sample_with_rng<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        query: &[Token],
        n: usize,
        k: usize,
    ) -> Result<Vec<Token>> {
        let mut sequence = query.to_vec();
        for _ in 0..k {
            let counts = self.count_next(context(&sequence, n), None);
            let dist = WeightedIndex::<usize>::new(&counts)?;
            sequence.push(dist.sample(rng) as Token);
        }
        Ok(sequence)
    }

    /// Draw `num_samples` independent samples in parallel
    fn batch_sample(
        &self,
        query: &[Token],
        n: usize,
        k: usize,
        num_samples: usize,
    ) -> Result<Vec<Vec<Token>>> {
        (0..num_samples)
            .into_par_iter()
            .map(|_| self.sample(query, n, k))
            .collect()
    }
}

impl<I: NgramIndex> Sample for I {}

/// Estimates shared by every smoothed query over one index.
///
/// Building them scans the whole index, so they can be saved with serde
/// and handed back to [`KneserNey::with_cache`].
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct KneserNeyCache {
    unigram_probs: Option<Vec<f64>>,
    n_delta: HashMap<usize, f64>,
}

impl KneserNeyCache {
    /// Discount for n-grams of length `n`
    pub fn delta(&self, n: usize) -> f64 {
        self.n_delta.get(&n).copied().unwrap_or(DEFAULT_DELTA)
    }
}

/// Interpolated Kneser-Ney model over an index
pub struct KneserNey<'a, I> {
    index: &'a I,
    vocab: Option<Token>,
    cache: KneserNeyCache,
}

impl<'a, I: NgramIndex> KneserNey<'a, I> {
    /// A model over token ids `0..=vocab` (every `u16` when `None`)
    pub fn new(index: &'a I, vocab: Option<Token>) -> Self {
        Self::with_cache(index, vocab, KneserNeyCache::default())
    }

    /// Reuse estimates computed earlier for the same index and vocabulary
    pub fn with_cache(index: &'a I, vocab: Option<Token>, cache: KneserNeyCache) -> Self {
        Self {
            index,
            vocab,
            cache,
        }
    }

    pub fn cache(&self) -> &KneserNeyCache {
        &self.cache
    }

    pub fn into_cache(self) -> KneserNeyCache {
        self.cache
    }

    /// Replace the default discounts for orders `1..=n` with estimates over
    /// the whole index (Chen and Goodman 1998, p. 16).
    ///
    /// Counts every distinct n-gram of each order, so high orders are slow.
    pub fn estimate_deltas(&mut self, n: usize) {
        for order in 1..=n {
            if self.cache.n_delta.contains_key(&order) {
                continue;
            }

            let frequencies = self.index.count_ngrams(order);
            let n1 = frequencies.get(&1).copied().unwrap_or(0) as f64;
            let n2 = frequencies.get(&2).copied().unwrap_or(0) as f64;
            let delta = if n1 == 0.0 || n2 == 0.0 {
                1.0
            } else {
                n1 / (n1 + 2.0 * n2)
            };
            self.cache.n_delta.insert(order, delta);
        }
    }

    /// Smoothed distribution of the token following `query`, conditioned
    /// on all of `query`
    pub fn smoothed_probs(&mut self, query: &[Token]) -> Vec<f64> {
        self.prepare().probs(query)
    }

    pub fn batch_smoothed_probs(&mut self, queries: &[Vec<Token>]) -> Vec<Vec<f64>> {
        let model = self.prepare();
        queries.par_iter().map(|query| model.probs(query)).collect()
    }

    /// Draw `num_samples` sequences in parallel, each extending `query` by
    /// `k` tokens conditioned on the previous `n - 1`
    pub fn sample(
        &mut self,
        query: &[Token],
        n: usize,
        k: usize,
        num_samples: usize,
    ) -> Result<Vec<Vec<Token>>> {
        let model = self.prepare();
        (0..num_samples)
            .into_par_iter()
            .map(|_| model.sample(&mut thread_rng(), query, n, k))
            .collect()
    }

    pub fn sample_with_rng<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        query: &[Token],
        n: usize,
        k: usize,
    ) -> Result<Vec<Token>> {
        self.prepare().sample(rng, query, n, k)
    }

    /// Fill the cache with the unigram distribution and unigram discount
    fn prepare(&mut self) -> Interpolation<'_, I> {
        self.estimate_deltas(1);

        let (index, vocab) = (self.index, self.vocab);
        let cache = &mut self.cache;
        let unigram = cache.unigram_probs.get_or_insert_with(|| {
            let counts = index.count_next(&[], vocab);
            let total = counts.iter().sum::<usize>() as f64
                + UNIGRAM_EPSILON * counts.len() as f64;
            counts
                .iter()
                .map(|&count| (count as f64 + UNIGRAM_EPSILON) / total)
                .collect()
        });

        Interpolation {
            index,
            vocab,
            unigram,
            deltas: &cache.n_delta,
        }
    }
}

/// Read-only view of a prepared model, shared across sampling threads
struct Interpolation<'m, I> {
    index: &'m I,
    vocab: Option<Token>,
    unigram: &'m [f64],
    deltas: &'m HashMap<usize, f64>,
}

impl<I: NgramIndex> Interpolation<'_, I> {
    fn probs(&self, query: &[Token]) -> Vec<f64> {
        let lower = match query.split_first() {
            None => self.unigram.to_vec(),
            Some((_, shorter)) => self.probs(shorter),
        };

        let counts = self.index.count_next(query, self.vocab);
        let total: usize = counts.iter().sum();
        if total == 0 {
            return lower;
        }

        let total = total as f64;
        let seen = counts.iter().filter(|&&c| c > 0).count() as f64;
        let delta = self
            .deltas
            .get(&(query.len() + 1))
            .copied()
            .unwrap_or(DEFAULT_DELTA);

        // Mass removed by discounting goes to the lower order
        let lambda = delta * seen / total;
        counts
            .iter()
            .zip(&lower)
            .map(|(&count, &p)| (count as f64 - delta).max(0.0) / total + lambda * p)
            .collect()
    }

    fn sample<R: Rng + ?Sized>(
        &self,
        rng: &mut R,
        query: &[Token],
        n: usize,
        k: usize,
    ) -> Result<Vec<Token>> {
        let mut sequence = query.to_vec();
        for _ in 0..k {
            let probs = self.probs(context(&sequence, n));
            let dist = WeightedIndex::<f64>::new(&probs)?;
            sequence.push(dist.sample(rng) as Token);
        }
        Ok(sequence)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::InMemoryIndex;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn corpus() -> InMemoryIndex {
        let pattern = [0u16, 1, 2, 0, 2, 1, 0, 1, 1, 2];
        let tokens: Vec<Token> = pattern.iter().copied().cycle().take(500).collect();
        InMemoryIndex::new(tokens)
    }

    #[test]
    fn test_samples_occur_in_corpus() {
        let index = corpus();
        for sample in index.batch_sample(&[0], 3, 20, 16).unwrap() {
            assert_eq!(sample.len(), 21);
            assert_eq!(sample[0], 0);
            for window in sample.windows(3) {
                assert!(index.count(window) > 0, "{window:?}");
            }
        }
    }

    #[test]
    fn test_seeded_sampling_is_repeatable() {
        let index = corpus();
        let mut rng = StdRng::seed_from_u64(7);
        let a = index.sample_with_rng(&mut rng, &[1], 2, 30).unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let b = index.sample_with_rng(&mut rng, &[1], 2, 30).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_dead_end_context_fails() {
        // 3 only ends the corpus, so nothing can follow it
        let index = InMemoryIndex::new(vec![1u16, 2, 3]);
        assert!(matches!(
            index.sample(&[3], 2, 1),
            Err(crate::error::Error::Sample(_))
        ));
        assert_eq!(index.sample(&[3], 2, 0).unwrap(), vec![3]);
    }

    #[test]
    fn test_estimate_deltas() {
        let index = InMemoryIndex::new(vec![1u16, 2, 1, 2, 3]);
        let mut model = KneserNey::new(&index, Some(3));
        model.estimate_deltas(2);

        // Unigrams: one seen once, two seen twice
        assert!((model.cache().delta(1) - 1.0 / 5.0).abs() < 1e-12);
        // Bigrams: two seen once, one seen twice
        assert!((model.cache().delta(2) - 2.0 / 4.0).abs() < 1e-12);
        assert_eq!(model.cache().delta(3), DEFAULT_DELTA);
    }

    #[test]
    fn test_smoothed_probs_are_distributions() {
        let index = corpus();
        let mut model = KneserNey::new(&index, Some(4));
        let queries = vec![vec![], vec![0], vec![2, 1], vec![1, 1, 1], vec![4, 4]];
        for probs in model.batch_smoothed_probs(&queries) {
            assert_eq!(probs.len(), 5);
            let sum: f64 = probs.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9, "sum {sum}");
            assert!(probs.iter().all(|&p| p > 0.0));
        }
    }

    #[test]
    fn test_smoothing_favors_observed_continuations() {
        let index = corpus();
        let mut model = KneserNey::new(&index, Some(4));
        // 1 1 is always followed by 2 in the corpus
        let probs = model.smoothed_probs(&[1, 1]);
        let best = (0..probs.len())
            .max_by(|&a, &b| probs[a].total_cmp(&probs[b]))
            .unwrap();
        assert_eq!(best, 2);
        // Token 3 never occurs and only gets the unigram floor
        assert!(probs[3] < 1e-6);
    }

    #[test]
    fn test_smoothed_sampling_continues_any_context() {
        let index = InMemoryIndex::new(vec![1u16, 2, 3]);
        let mut model = KneserNey::new(&index, Some(3));
        for sample in model.sample(&[3], 2, 5, 4).unwrap() {
            assert_eq!(sample.len(), 6);
            assert!(sample.iter().all(|&t| t <= 3));
        }
    }

    #[test]
    fn test_cache_round_trips_through_json() {
        let index = corpus();
        let mut model = KneserNey::new(&index, Some(4));
        let probs = model.smoothed_probs(&[0, 1]);

        let json = serde_json::to_string(model.cache()).unwrap();
        let cache: KneserNeyCache = serde_json::from_str(&json).unwrap();
        assert_eq!(&cache, model.cache());

        let mut restored = KneserNey::with_cache(&index, Some(4), cache);
        assert_eq!(restored.smoothed_probs(&[0, 1]), probs);
    }
}
