//! Disk-backed n-gram index
//!
//! Building and opening are separate steps: [`MemmapIndex::build`] sorts
//! the suffixes of a token file once and persists them to an index file;
//! [`MemmapIndex::open`] maps an existing token file/index file pair
//! read-only, any number of times, without rebuilding.
//!
//! Both mappings are released when the index is dropped. Files must not be
//! modified while an index over them is open, and an index file must not be
//! opened while a build to the same path is still running.

use super::countable::NgramIndex;
use super::mmap_slice::MmapSlice;
use super::suffix_array::{SuffixArrayBuilder, SuffixArrayWriter, SuffixTable};
use super::types::{BuildConfig, SuffixEntry, Token};
use crate::error::Result;
use std::path::Path;
use std::time::Instant;
use tracing::info;

/// An n-gram index over memory-mapped token and index files
pub struct MemmapIndex {
    table: SuffixTable<MmapSlice<Token>, MmapSlice<SuffixEntry>>,
}

impl MemmapIndex {
    /// Build the suffix array of `tokens_path` and write it to `index_path`
    /// with the default build configuration.
    ///
    /// The token file is read through a read-only mapping. This does not
    /// open an index; call [`MemmapIndex::open`] afterwards.
    pub fn build(tokens_path: &Path, index_path: &Path) -> Result<()> {
        Self::build_with_config(tokens_path, index_path, &BuildConfig::default())
    }

    pub fn build_with_config(
        tokens_path: &Path,
        index_path: &Path,
        config: &BuildConfig,
    ) -> Result<()> {
        let started = Instant::now();
        let text = MmapSlice::<Token>::open(tokens_path)?;
        let sa = SuffixArrayBuilder::new(config.clone()).build(&text);
        SuffixArrayWriter::write(index_path, &sa)?;

        info!(
            tokens = %tokens_path.display(),
            index = %index_path.display(),
            suffixes = sa.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "persisted suffix array"
        );
        Ok(())
    }

    /// [`MemmapIndex::build`] followed by [`MemmapIndex::open`]
    pub fn build_and_open(tokens_path: &Path, index_path: &Path) -> Result<Self> {
        Self::build(tokens_path, index_path)?;
        Self::open(tokens_path, index_path)
    }

    /// Map an existing token file and index file read-only.
    ///
    /// Fails with a format error if either file is not a whole number of
    /// records or their record counts differ, and with a validation error
    /// if any offset lies outside the corpus.
    pub fn open(tokens_path: &Path, index_path: &Path) -> Result<Self> {
        let text = MmapSlice::<Token>::open(tokens_path)?;
        let table = MmapSlice::<SuffixEntry>::open(index_path)?;
        let table = SuffixTable::from_parts(text, table)?;

        info!(
            tokens = %tokens_path.display(),
            index = %index_path.display(),
            suffixes = table.len(),
            "opened index"
        );
        Ok(Self { table })
    }

    /// The mapped corpus
    pub fn tokens(&self) -> &[Token] {
        self.table.text()
    }
}

impl NgramIndex for MemmapIndex {
    type Text = MmapSlice<Token>;
    type Table = MmapSlice<SuffixEntry>;

    fn suffix_table(&self) -> &SuffixTable<MmapSlice<Token>, MmapSlice<SuffixEntry>> {
        &self.table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::index::tokens::write_token_file;
    use crate::utils::write_records;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_build_then_open() {
        let dir = tempdir().unwrap();
        let tokens = dir.path().join("tokens.bin");
        let index = dir.path().join("tokens.idx");
        write_token_file(&tokens, [1u32, 2, 1, 2, 3]).unwrap();

        MemmapIndex::build(&tokens, &index).unwrap();
        assert_eq!(fs::metadata(&index).unwrap().len(), 5 * 8);

        let opened = MemmapIndex::open(&tokens, &index).unwrap();
        assert!(opened.is_sorted());
        assert_eq!(opened.count(&[1, 2]), 2);
        assert_eq!(opened.count(&[2, 1]), 1);
        assert!(!opened.contains(&[3, 1]));

        // Reopening does not rebuild and sees the same data
        let again = MemmapIndex::open(&tokens, &index).unwrap();
        assert_eq!(again.tokens(), opened.tokens());
    }

    #[test]
    fn test_length_mismatch() {
        let dir = tempdir().unwrap();
        let tokens = dir.path().join("tokens.bin");
        let index = dir.path().join("tokens.idx");
        write_token_file(&tokens, [1u32, 2, 3]).unwrap();

        let mut bytes = Vec::new();
        write_records(&mut bytes, [0u64, 1]).unwrap();
        fs::write(&index, bytes).unwrap();

        assert!(matches!(
            MemmapIndex::open(&tokens, &index),
            Err(Error::Format(_))
        ));
    }

    #[test]
    fn test_out_of_range_offset() {
        let dir = tempdir().unwrap();
        let tokens = dir.path().join("tokens.bin");
        let index = dir.path().join("tokens.idx");
        write_token_file(&tokens, [1u32, 2, 3]).unwrap();

        let mut bytes = Vec::new();
        write_records(&mut bytes, [0u64, 1, 99]).unwrap();
        fs::write(&index, bytes).unwrap();

        assert!(matches!(
            MemmapIndex::open(&tokens, &index),
            Err(Error::Validation { offset: 99, .. })
        ));
    }

    #[test]
    fn test_tampered_order_detected() {
        let dir = tempdir().unwrap();
        let tokens = dir.path().join("tokens.bin");
        let index = dir.path().join("tokens.idx");
        write_token_file(&tokens, [1u32, 2, 3]).unwrap();

        let mut bytes = Vec::new();
        write_records(&mut bytes, [2u64, 1, 0]).unwrap();
        fs::write(&index, bytes).unwrap();

        assert!(!MemmapIndex::open(&tokens, &index).unwrap().is_sorted());
    }

    #[test]
    fn test_empty_files() {
        let dir = tempdir().unwrap();
        let tokens = dir.path().join("tokens.bin");
        let index = dir.path().join("tokens.idx");
        fs::write(&tokens, b"").unwrap();

        let opened = MemmapIndex::build_and_open(&tokens, &index).unwrap();
        assert!(opened.is_empty());
        assert!(opened.is_sorted());
        assert_eq!(opened.count(&[0]), 0);
    }

    #[test]
    fn test_missing_files() {
        let dir = tempdir().unwrap();
        let tokens = dir.path().join("tokens.bin");
        let index = dir.path().join("tokens.idx");

        assert!(matches!(
            MemmapIndex::build(&tokens, &index),
            Err(Error::Io { .. })
        ));
        assert!(matches!(
            MemmapIndex::open(&tokens, &index),
            Err(Error::Io { .. })
        ));
    }
}
