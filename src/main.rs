use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use gramidx::index::stats::show_stats;
use gramidx::{BuildConfig, KneserNey, MemmapIndex, NgramIndex, Sample, SortAlgorithm};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "gramidx")]
#[command(about = "Suffix-array n-gram index over token corpora")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log build and open progress (overridden by GRAMIDX_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a suffix array index for a token file
    Build {
        /// Token file (2-byte little-endian token ids)
        tokens: PathBuf,
        /// Index file to write
        index: PathBuf,
        /// Suffix array construction algorithm
        #[arg(short, long, value_enum, default_value_t = Algorithm::InducedSort)]
        algorithm: Algorithm,
    },
    /// Count occurrences of an n-gram
    Count {
        tokens: PathBuf,
        index: PathBuf,
        /// Token ids of the n-gram
        #[arg(required = true)]
        query: Vec<u16>,
    },
    /// Check whether an n-gram occurs
    Contains {
        tokens: PathBuf,
        index: PathBuf,
        /// Token ids of the n-gram
        #[arg(required = true)]
        query: Vec<u16>,
    },
    /// Sample continuations of a prompt from an n-gram model
    Sample {
        tokens: PathBuf,
        index: PathBuf,
        /// Prompt token ids
        prompt: Vec<u16>,
        /// Model order: condition on the previous n - 1 tokens
        #[arg(short, default_value_t = 3)]
        n: usize,
        /// Tokens to generate per sample
        #[arg(short, default_value_t = 20)]
        k: usize,
        /// Number of samples
        #[arg(short = 's', long, default_value_t = 1)]
        samples: usize,
        /// Use the Kneser-Ney smoothed model
        #[arg(long)]
        smoothed: bool,
        /// Largest token id of the smoothed model's vocabulary
        #[arg(long)]
        vocab: Option<u16>,
    },
    /// Verify that an index file is sorted
    Verify { tokens: PathBuf, index: PathBuf },
    /// Show index statistics
    Stats {
        tokens: PathBuf,
        index: PathBuf,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Algorithm {
    InducedSort,
    Comparison,
}

impl From<Algorithm> for SortAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::InducedSort => SortAlgorithm::InducedSort,
            Algorithm::Comparison => SortAlgorithm::Comparison,
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            tokens,
            index,
            algorithm,
        } => {
            let config = BuildConfig {
                algorithm: algorithm.into(),
                progress: true,
                ..Default::default()
            };
            MemmapIndex::build_with_config(&tokens, &index, &config)
                .with_context(|| format!("Failed to build index for {}", tokens.display()))?;
            println!("Wrote {}", index.display());
        }
        Commands::Count {
            tokens,
            index,
            query,
        } => {
            let index = open(tokens, index)?;
            println!("{}", index.count(&query));
        }
        Commands::Contains {
            tokens,
            index,
            query,
        } => {
            let index = open(tokens, index)?;
            println!("{}", index.contains(&query));
        }
        Commands::Sample {
            tokens,
            index,
            prompt,
            n,
            k,
            samples,
            smoothed,
            vocab,
        } => {
            let index = open(tokens, index)?;
            let sequences = if smoothed {
                KneserNey::new(&index, vocab).sample(&prompt, n, k, samples)
            } else {
                index.batch_sample(&prompt, n, k, samples)
            }
            .context("Failed to sample")?;
            for sequence in sequences {
                let line: Vec<String> = sequence.iter().map(|t| t.to_string()).collect();
                println!("{}", line.join(" "));
            }
        }
        Commands::Verify { tokens, index } => {
            let index = open(tokens, index)?;
            if !index.is_sorted() {
                anyhow::bail!("Index is not sorted; rebuild it with 'gramidx build'");
            }
            println!("Index is sorted ({} suffixes)", index.len());
        }
        Commands::Stats {
            tokens,
            index,
            json,
        } => {
            show_stats(&tokens, &index, json)?;
        }
    }

    Ok(())
}

fn open(tokens: PathBuf, index: PathBuf) -> Result<MemmapIndex> {
    MemmapIndex::open(&tokens, &index).with_context(|| {
        format!(
            "Failed to open index {} over {}",
            index.display(),
            tokens.display()
        )
    })
}

fn init_logging(verbose: bool) {
    let default = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_env("GRAMIDX_LOG").unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
