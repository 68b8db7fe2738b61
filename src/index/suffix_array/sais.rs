//! SA-IS: suffix array construction by induced sorting
//!
//! Linear time, linear space. The input is a string over `0..alphabet`
//! whose last symbol is a unique `0` sentinel, smaller than every other
//! symbol. Corpus tokens are shifted up by one to make room for it.
//!
//! Outline:
//!
//! 1. Classify every position as S-type (suffix smaller than the next one)
//!    or L-type. An LMS position is an S-type preceded by an L-type.
//! 2. Induce-sort the LMS substrings, name them, and recurse on the string
//!    of names when two LMS substrings are equal.
//! 3. Seed the buckets with the LMS suffixes in sorted order and induce the
//!    final order of every other suffix from them.
//!
//! Nong, Zhang, Chan (2009): "Linear Suffix Array Construction by Almost
//! Pure Induced-Sorting".

use crate::index::types::{SuffixEntry, Token};

const EMPTY: usize = usize::MAX;

/// Build the suffix array of a token corpus.
pub fn suffix_array(text: &[Token]) -> Vec<SuffixEntry> {
    if text.is_empty() {
        return Vec::new();
    }

    let mut shifted: Vec<u32> = Vec::with_capacity(text.len() + 1);
    shifted.extend(text.iter().map(|&t| t as u32 + 1));
    shifted.push(0);

    let sa = sais(&shifted, Token::MAX as usize + 2);
    drop(shifted);

    // The sentinel suffix always sorts first
    debug_assert_eq!(sa[0], text.len());
    sa[1..].iter().map(|&i| i as SuffixEntry).collect()
}

/// Core SA-IS over a sentinel-terminated string.
fn sais(s: &[u32], alphabet: usize) -> Vec<usize> {
    let n = s.len();
    if n == 1 {
        return vec![0];
    }

    let stype = classify(s);
    let buckets = bucket_sizes(s, alphabet);
    let is_lms = |i: usize| i > 0 && stype[i] && !stype[i - 1];

    // Sort LMS substrings; seeding in text order is enough for this pass
    let lms: Vec<usize> = (1..n).filter(|&i| is_lms(i)).collect();
    let sa = induced_sort(s, &stype, &buckets, &lms);

    // Name LMS substrings in sorted order
    let mut names = vec![u32::MAX; n];
    let mut name = 0u32;
    let mut prev = EMPTY;
    for &pos in sa.iter().filter(|&&p| p != EMPTY && is_lms(p)) {
        if prev != EMPTY && !lms_substrings_equal(s, &stype, prev, pos) {
            name += 1;
        }
        names[pos] = name;
        prev = pos;
    }
    let distinct = name as usize + 1;
    drop(sa);

    let reduced: Vec<u32> = lms.iter().map(|&p| names[p]).collect();
    drop(names);

    // Order of the LMS suffixes, as indices into `lms`
    let reduced_sa = if distinct == reduced.len() {
        let mut order = vec![0usize; reduced.len()];
        for (j, &r) in reduced.iter().enumerate() {
            order[r as usize] = j;
        }
        order
    } else {
        sais(&reduced, distinct)
    };

    let sorted_lms: Vec<usize> = reduced_sa.iter().map(|&j| lms[j]).collect();
    induced_sort(s, &stype, &buckets, &sorted_lms)
}

/// `true` marks an S-type position. The sentinel is S-type.
fn classify(s: &[u32]) -> Vec<bool> {
    let n = s.len();
    let mut stype = vec![false; n];
    stype[n - 1] = true;
    for i in (0..n - 1).rev() {
        stype[i] = s[i] < s[i + 1] || (s[i] == s[i + 1] && stype[i + 1]);
    }
    stype
}

fn bucket_sizes(s: &[u32], alphabet: usize) -> Vec<usize> {
    let mut sizes = vec![0usize; alphabet];
    for &c in s {
        sizes[c as usize] += 1;
    }
    sizes
}

fn bucket_heads(sizes: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    sizes
        .iter()
        .map(|&size| {
            let head = sum;
            sum += size;
            head
        })
        .collect()
}

fn bucket_tails(sizes: &[usize]) -> Vec<usize> {
    let mut sum = 0;
    sizes
        .iter()
        .map(|&size| {
            sum += size;
            sum
        })
        .collect()
}

/// Place `lms` at the tails of their buckets (keeping their relative
/// order), then induce L-type positions left to right and S-type positions
/// right to left.
fn induced_sort(s: &[u32], stype: &[bool], buckets: &[usize], lms: &[usize]) -> Vec<usize> {
    let n = s.len();
    let mut sa = vec![EMPTY; n];

    let mut tails = bucket_tails(buckets);
    for &pos in lms.iter().rev() {
        let c = s[pos] as usize;
        tails[c] -= 1;
        sa[tails[c]] = pos;
    }

    let mut heads = bucket_heads(buckets);
    for i in 0..n {
        let j = sa[i];
        if j != EMPTY && j > 0 && !stype[j - 1] {
            let c = s[j - 1] as usize;
            sa[heads[c]] = j - 1;
            heads[c] += 1;
        }
    }

    let mut tails = bucket_tails(buckets);
    for i in (0..n).rev() {
        let j = sa[i];
        if j != EMPTY && j > 0 && stype[j - 1] {
            let c = s[j - 1] as usize;
            tails[c] -= 1;
            sa[tails[c]] = j - 1;
        }
    }

    sa
}

/// Compare the LMS substrings starting at `a` and `b` (each running to the
/// next LMS position, inclusive).
fn lms_substrings_equal(s: &[u32], stype: &[bool], a: usize, b: usize) -> bool {
    let n = s.len();
    if a == n - 1 || b == n - 1 {
        return a == b;
    }
    let is_lms = |i: usize| i > 0 && stype[i] && !stype[i - 1];

    let mut i = 0;
    loop {
        let (x, y) = (a + i, b + i);
        if s[x] != s[y] || stype[x] != stype[y] {
            return false;
        }
        if i > 0 && (is_lms(x) || is_lms(y)) {
            return is_lms(x) && is_lms(y);
        }
        i += 1;
    }
}
