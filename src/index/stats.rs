use crate::index::countable::NgramIndex;
use crate::index::memmap::MemmapIndex;
use anyhow::{Context, Result};
use std::path::Path;

/// Display statistics for a token file/index file pair
pub fn show_stats(tokens_path: &Path, index_path: &Path, json: bool) -> Result<()> {
    let index = MemmapIndex::open(tokens_path, index_path).with_context(|| {
        format!(
            "Failed to open index {} over {}",
            index_path.display(),
            tokens_path.display()
        )
    })?;
    let stats = index.stats();

    if json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!("Index Statistics");
    println!("================");
    println!();
    println!("Token file:       {}", tokens_path.display());
    println!("Index file:       {}", index_path.display());
    println!("Tokens:           {}", stats.token_count);
    println!("Distinct tokens:  {}", stats.distinct_tokens);
    println!();
    println!("Token data:       {}", format_size(stats.token_bytes));
    println!("Suffix array:     {}", format_size(stats.index_bytes));

    Ok(())
}

/// Format byte size to human readable
fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} bytes", bytes)
    }
}
