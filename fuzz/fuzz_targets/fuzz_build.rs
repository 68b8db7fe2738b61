#![no_main]

use gramidx::index::suffix_array::SuffixArrayBuilder;
use gramidx::{BuildConfig, InMemoryIndex, NgramIndex, SortAlgorithm};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|tokens: Vec<u16>| {
    // Induced sorting must agree with the comparison sort on any corpus
    let sais = SuffixArrayBuilder::with_defaults().build(&tokens);
    let reference = SuffixArrayBuilder::new(BuildConfig {
        algorithm: SortAlgorithm::Comparison,
        ..Default::default()
    })
    .build(&tokens);
    assert_eq!(sais, reference);

    let index = InMemoryIndex::new(tokens.clone());
    assert!(index.is_sorted());
    if !tokens.is_empty() {
        let window = &tokens[..tokens.len().min(3)];
        assert!(index.contains(window));
        assert_eq!(index.count(&[]), tokens.len());
    }
});
