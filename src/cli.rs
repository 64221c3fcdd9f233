//! CLI interface for the resume ranker

use crate::config::{EncoderBackend, OutputFormat};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "resume-ranker")]
#[command(about = "Rank resumes against a job description by semantic similarity")]
#[command(long_about = "Extract text from resumes (PDF, DOCX, TXT and scanned images via OCR), embed them with a sentence encoder and rank them by cosine similarity to a job description")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank every resume in a directory against a job description
    Rank {
        /// Path to the job description
        #[arg(short, long)]
        job: Option<PathBuf>,

        /// Directory scanned recursively for resumes
        #[arg(short, long)]
        resumes: Option<PathBuf>,

        /// Embedding model (HuggingFace repo ID or local directory)
        #[arg(short, long)]
        embedding: Option<String>,

        /// Embedding backend: sentence or static
        #[arg(long)]
        backend: Option<String>,

        /// Minimum number of characters for extracted text to be accepted
        #[arg(long)]
        min_chars: Option<usize>,

        /// Resolution used when rendering pages for OCR
        #[arg(long)]
        ocr_dpi: Option<u32>,

        /// Output format: console, json
        #[arg(short, long)]
        output: Option<String>,

        /// Include model details and skipped documents
        #[arg(short, long)]
        detailed: bool,
    },

    /// Extract text from a single document
    Extract {
        /// Document to extract
        path: PathBuf,

        /// Print the extracted text
        #[arg(long)]
        show_text: bool,
    },

    /// Show configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file location
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        _ => Err(format!("Invalid output format: {}. Supported: console, json", format)),
    }
}

/// Parse and validate embedding backend
pub fn parse_backend(backend: &str) -> Result<EncoderBackend, String> {
    match backend.to_lowercase().as_str() {
        "sentence" => Ok(EncoderBackend::Sentence),
        "static" | "model2vec" => Ok(EncoderBackend::Static),
        _ => Err(format!("Invalid embedding backend: {}. Supported: sentence, static", backend)),
    }
}
