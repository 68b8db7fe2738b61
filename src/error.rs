//! Error types for gramidx.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading, building, persisting or opening an index.
///
/// Counting queries never fail once an index exists. Apart from `Sample`,
/// every variant here is surfaced at construction or open time.
#[derive(Error, Debug)]
pub enum Error {
    /// A file was missing, unreadable or unwritable.
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file's length does not fit the fixed record layout.
    #[error("format error: {0}")]
    Format(String),

    /// A token value does not fit in a token record.
    #[error("token {value} at position {position} exceeds the maximum token id {max}", max = u16::MAX)]
    Range { position: usize, value: u32 },

    /// An offset read from an index file points outside the corpus.
    #[error("suffix array entry {position} holds offset {offset}, corpus has {len} tokens")]
    Validation {
        position: usize,
        offset: u64,
        len: usize,
    },

    /// No continuation could be drawn, e.g. a context that is never
    /// followed by another token.
    #[error("cannot sample a continuation: {0}")]
    Sample(#[from] rand::distributions::WeightedError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type for gramidx operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_path() {
        let err = Error::io(
            "/tmp/missing.bin",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let msg = err.to_string();
        assert!(msg.contains("/tmp/missing.bin"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn test_range_error_message() {
        let err = Error::Range {
            position: 3,
            value: 70_000,
        };
        assert_eq!(
            err.to_string(),
            "token 70000 at position 3 exceeds the maximum token id 65535"
        );
    }

    #[test]
    fn test_sample_error_from_weights() {
        let err: Error = rand::distributions::WeightedError::AllWeightsZero.into();
        assert!(matches!(err, Error::Sample(_)));
        assert!(err.to_string().starts_with("cannot sample a continuation"));
    }
}
