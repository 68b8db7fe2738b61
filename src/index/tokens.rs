//! Token store: loading and saving corpora in the token file format
//!
//! A token file is a headerless sequence of 2-byte little-endian token ids.

use super::types::{TOKEN_WIDTH, Token};
use crate::error::{Error, Result};
use crate::utils::atomic_file::replace_file;
use crate::utils::{read_records, write_records};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::debug;

/// Convert wide token ids into corpus tokens, rejecting any that do not fit
pub fn tokens_from_wide(tokens: &[u32]) -> Result<Box<[Token]>> {
    tokens
        .iter()
        .enumerate()
        .map(|(position, &value)| {
            Token::try_from(value).map_err(|_| Error::Range { position, value })
        })
        .collect()
}

/// Read a token file, stopping after `limit` tokens when given.
///
/// Fails with a format error if the file is not a whole number of token
/// records, unless the partial record lies beyond `limit`.
pub fn read_token_file(path: &Path, limit: Option<usize>) -> Result<Box<[Token]>> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let byte_len = file.metadata().map_err(|e| Error::io(path, e))?.len();

    let needed = limit.map_or(byte_len, |l| {
        byte_len.min((l as u64).saturating_mul(TOKEN_WIDTH as u64))
    });
    if needed % TOKEN_WIDTH as u64 != 0 {
        return Err(Error::Format(format!(
            "{}: length {} is not a multiple of the {}-byte token width",
            path.display(),
            byte_len,
            TOKEN_WIDTH
        )));
    }

    let mut reader = BufReader::with_capacity(1 << 20, file);
    let tokens: Vec<Token> = read_records(&mut reader, limit).map_err(|e| Error::io(path, e))?;

    debug!(path = %path.display(), tokens = tokens.len(), ?limit, "read token file");
    Ok(tokens.into_boxed_slice())
}

/// Write tokens to `path`, replacing any existing file.
///
/// Each value is range-checked as it is written. An out-of-range token
/// fails with a range error, and neither a partial file nor a changed
/// destination is left behind.
pub fn write_token_file<I>(path: &Path, tokens: I) -> Result<u64>
where
    I: IntoIterator<Item = u32>,
{
    let written = replace_file(path, |writer| {
        let mut range_error = None;
        let checked = tokens
            .into_iter()
            .enumerate()
            .map_while(|(position, value)| match Token::try_from(value) {
                Ok(token) => Some(token),
                Err(_) => {
                    range_error = Some(Error::Range { position, value });
                    None
                }
            });

        let written = write_records(writer, checked).map_err(|e| Error::io(path, e))?;
        match range_error {
            Some(err) => Err(err),
            None => Ok(written),
        }
    })?;

    debug!(path = %path.display(), tokens = written, "wrote token file");
    Ok(written)
}
