//! Utility functions shared by the index modules.
//!
//! ## Modules
//!
//! - [`encoding`] - Fixed-width little-endian record encoding
//! - [`atomic_file`] - Write-then-rename file replacement
//! - [`progress`] - Progress spinner (no-op without the `progress` feature)

pub mod atomic_file;
pub mod encoding;
pub mod progress;

pub use encoding::*;
