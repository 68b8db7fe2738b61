//! Suffix array writer
//!
//! Writes a suffix array to disk as a headerless run of 8-byte
//! little-endian offsets, ready to be memory-mapped.

use crate::error::{Error, Result};
use crate::index::types::SuffixEntry;
use crate::utils::atomic_file::replace_file;
use crate::utils::write_records;
use std::path::Path;
use tracing::debug;

/// Writes suffix array index files
pub struct SuffixArrayWriter;

impl SuffixArrayWriter {
    /// Write `sa` to `path`, replacing any existing file.
    ///
    /// The data is synced and renamed into place before returning, so the
    /// file can be opened by readers as soon as this succeeds and an
    /// interrupted write never leaves a truncated index at `path`.
    pub fn write(path: &Path, sa: &[SuffixEntry]) -> Result<()> {
        replace_file(path, |writer| {
            write_records(writer, sa.iter().copied()).map_err(|e| Error::io(path, e))
        })?;

        debug!(path = %path.display(), entries = sa.len(), "wrote suffix array");
        Ok(())
    }
}
