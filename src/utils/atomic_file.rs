//! Write-then-rename file replacement
//!
//! Output goes to a `.partial` file next to the destination, which is
//! synced and renamed into place only once the whole write succeeded. A
//! failed write removes the partial file and leaves any existing file at
//! the destination untouched.

use crate::error::{Error, Result};
use std::ffi::OsString;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Path of the staging file used while `path` is being written
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(OsString::from).unwrap_or_default();
    name.push(".partial");
    path.with_file_name(name)
}

/// Replace the file at `path` with whatever `write` produces.
pub fn replace_file<T, F>(path: &Path, write: F) -> Result<T>
where
    F: FnOnce(&mut BufWriter<File>) -> Result<T>,
{
    let partial = partial_path(path);

    let staged = File::create(&partial)
        .map_err(|e| Error::io(path, e))
        .and_then(|file| {
            let mut writer = BufWriter::with_capacity(65536, file);
            let value = write(&mut writer)?;
            let file = writer
                .into_inner()
                .map_err(|e| Error::io(path, e.into_error()))?;
            file.sync_all().map_err(|e| Error::io(path, e))?;
            Ok(value)
        })
        .and_then(|value| {
            fs::rename(&partial, path).map_err(|e| Error::io(path, e))?;
            Ok(value)
        });

    if staged.is_err() {
        let _ = fs::remove_file(&partial);
    }
    staged
}
