//! CLI interface for the skill matcher

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::input::cleaner::{DEFAULT_CHUNK_OVERLAP, DEFAULT_CHUNK_SIZE};

#[derive(Parser)]
#[command(name = "skill-matcher")]
#[command(about = "Match candidate skills against job requirements")]
#[command(long_about = "Score how well a candidate's skills cover a job's required and optional skills using embeddings and fuzzy token matching")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path (TOML or JSON)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Match a candidate skill list against a job description
    Match {
        /// JSON array of candidate skills
        #[arg(long)]
        candidate_skills: PathBuf,

        /// JSON object with required_skills and optional_skills
        #[arg(long)]
        job_description: PathBuf,

        /// Results file (defaults to <job>_matching_results.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Directory for the run metadata file
        #[arg(long, default_value = ".")]
        metadata_dir: PathBuf,

        /// Output format: console, json
        #[arg(short, long, default_value = "console")]
        format: String,

        /// Show similarity components per skill
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract cleaned, chunked text from a resume document
    Extract {
        /// Path to document (PDF, TXT, MD)
        #[arg(short, long)]
        input: PathBuf,

        /// Chunk size in characters
        #[arg(long, default_value_t = DEFAULT_CHUNK_SIZE)]
        chunk_size: usize,

        /// Overlap between consecutive chunks
        #[arg(long, default_value_t = DEFAULT_CHUNK_OVERLAP)]
        chunk_overlap: usize,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Embedding cache management
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum CacheAction {
    /// Show cache location and size for the configured model
    Stats,

    /// Delete the cache file for the configured model
    Clear,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration with sensitive fields redacted
    Show,
}

/// Validate file extension
pub fn validate_file_extension(path: &Path, allowed_extensions: &[&str]) -> Result<(), String> {
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) => {
            if allowed_extensions.contains(&ext.to_lowercase().as_str()) {
                Ok(())
            } else {
                Err(format!(
                    "Unsupported file extension: .{}. Allowed: {}",
                    ext,
                    allowed_extensions.join(", ")
                ))
            }
        }
        None => Err("File has no extension".to_string()),
    }
}
