//! CLI argument parsing and configuration

use crate::curator::MatchStrategy;
use crate::types::MashupType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// mixmash - Harmonic mashup planning for song libraries
///
/// Curates compatible song pairs from an analyzed library, recommends a mashup
/// strategy for each pair, and drives the create pipeline from ingestion
/// through to a build plan for the engineering service.
#[derive(Parser, Debug)]
#[command(name = "mixmash")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the song library JSON file
    #[arg(short, long, value_name = "FILE", default_value = "library.json")]
    pub library: PathBuf,

    /// Output directory for build plans
    #[arg(short, long, value_name = "DIR", default_value = "./output")]
    pub output: PathBuf,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Quiet mode (suppress progress bars)
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the full pipeline: ingest, analyze, match, recommend, plan
    Create {
        /// First input song (audio file path)
        song_a: String,

        /// Second input song; omit to let the curator pick a partner
        song_b: Option<String>,

        /// Mashup type to use, skipping the recommendation step
        #[arg(short = 't', long, value_name = "TYPE")]
        mashup_type: Option<MashupType>,

        /// Pause for confirmation at match selection and type approval
        #[arg(short, long, default_value = "false")]
        interactive: bool,
    },

    /// Rank compatible partners for a song already in the library
    FindMatches {
        /// Target song id
        song_id: String,

        /// Matching strategy
        #[arg(short, long, default_value = "hybrid")]
        strategy: MatchStrategy,

        /// Only candidates with this primary genre
        #[arg(short, long, value_name = "GENRE")]
        genre: Option<String>,

        /// Free-text vibe query for semantic/hybrid matching
        #[arg(long, value_name = "TEXT")]
        vibe: Option<String>,

        /// Maximum number of candidates
        #[arg(short = 'n', long, default_value = "5")]
        max_results: usize,
    },

    /// Recommend a mashup type for a song pair
    Recommend {
        song_a_id: String,
        song_b_id: String,
    },

    /// Discover the best pairs across the whole library
    Pairs {
        /// Maximum number of pairs to show
        #[arg(short = 'n', long, default_value = "20")]
        max_pairs: usize,

        /// Drop pairs scoring below this threshold
        #[arg(short, long, default_value = "0.6")]
        min_score: f64,

        /// Only consider songs with this primary genre
        #[arg(short, long, value_name = "GENRE")]
        genre: Option<String>,
    },

    /// List songs in the library
    List,

    /// Ingest and analyze audio files from a directory into the library
    Add {
        /// Directory to scan for audio files
        #[arg(value_name = "DIR")]
        path: PathBuf,
    },
}

impl Cli {
    /// Get the log level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        match self.verbose {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        }
    }
}
