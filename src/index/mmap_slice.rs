//! Read-only memory-mapped views of record files
//!
//! A mapped token or index file is exposed as `&[u16]` / `&[u64]` directly,
//! which is only sound because records are little-endian and mapped regions
//! are page aligned. The mapping is released when the view is dropped.

use crate::error::{Error, Result};
use crate::utils::Record;
use memmap2::Mmap;
use std::fs::File;
use std::marker::PhantomData;
use std::ops::Deref;
use std::path::Path;

#[cfg(not(target_endian = "little"))]
compile_error!("gramidx maps little-endian record files and requires a little-endian target");

/// A typed, read-only view over a memory-mapped file of records
pub struct MmapSlice<T: Record> {
    /// `None` for an empty file, which cannot be mapped
    mmap: Option<Mmap>,
    _marker: PhantomData<T>,
}

impl<T: Record> MmapSlice<T> {
    /// Map `path` read-only.
    ///
    /// Fails with a format error if the file length is not a whole number
    /// of records.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| Error::io(path, e))?;
        let byte_len = file.metadata().map_err(|e| Error::io(path, e))?.len();

        if byte_len % T::WIDTH as u64 != 0 {
            return Err(Error::Format(format!(
                "{}: length {} is not a multiple of the {}-byte record width",
                path.display(),
                byte_len,
                T::WIDTH
            )));
        }

        let mmap = if byte_len == 0 {
            None
        } else {
            // SAFETY: the file is opened read-only and callers must not
            // modify it while it is mapped.
            let mmap = unsafe { Mmap::map(&file) }.map_err(|e| Error::io(path, e))?;
            if mmap.as_ptr() as usize % std::mem::align_of::<T>() != 0 {
                return Err(Error::Format(format!(
                    "{}: mapping is not aligned for {}-byte records",
                    path.display(),
                    T::WIDTH
                )));
            }
            Some(mmap)
        };

        Ok(Self {
            mmap,
            _marker: PhantomData,
        })
    }

    /// Size of the mapped file in bytes
    pub fn byte_len(&self) -> usize {
        self.mmap.as_ref().map_or(0, |m| m.len())
    }
}

impl<T: Record> Deref for MmapSlice<T> {
    type Target = [T];

    fn deref(&self) -> &[T] {
        match &self.mmap {
            // SAFETY: alignment and length were checked in `open`, every bit
            // pattern is a valid `u16`/`u64`, and records are little-endian on
            // a little-endian target.
            Some(mmap) => unsafe {
                std::slice::from_raw_parts(mmap.as_ptr() as *const T, mmap.len() / T::WIDTH)
            },
            None => &[],
        }
    }
}
