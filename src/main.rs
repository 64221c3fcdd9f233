//! Resume ranker: rank resumes against a job description by semantic similarity

use clap::Parser;
use log::{error, info};
use resume_ranker::cli::{self, Cli, Commands, ConfigAction};
use resume_ranker::config::Config;
use resume_ranker::input::scanner::discover_documents;
use resume_ranker::input::ExtractionCoordinator;
use resume_ranker::output::formatter_for;
use resume_ranker::processing::embeddings::load_encoder;
use resume_ranker::processing::MatchingPipeline;
use resume_ranker::{Result, ResumeRankerError};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    // Load configuration
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = run_command(cli.command, config, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

async fn run_command(command: Commands, mut config: Config, config_file: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Rank {
            job,
            resumes,
            embedding,
            backend,
            min_chars,
            ocr_dpi,
            output,
            detailed,
        } => {
            // CLI flags take precedence over the configuration file
            if let Some(model) = embedding {
                config.embedding.model = model;
            }
            if let Some(backend) = backend {
                config.embedding.backend =
                    cli::parse_backend(&backend).map_err(ResumeRankerError::InvalidInput)?;
            }
            if let Some(min_chars) = min_chars {
                config.extraction.min_text_length = min_chars;
            }
            if ocr_dpi.is_some() {
                config.ocr.dpi = ocr_dpi;
            }
            if let Some(output) = output {
                config.output.format =
                    cli::parse_output_format(&output).map_err(ResumeRankerError::InvalidInput)?;
            }
            config.output.detailed |= detailed;
            config.validate()?;

            let job = job.or_else(|| config.input.job_description.clone()).ok_or_else(|| {
                ResumeRankerError::InvalidInput(
                    "No job description given; pass --job or set input.job_description".to_string(),
                )
            })?;
            let resumes = resumes.or_else(|| config.input.resumes_dir.clone()).ok_or_else(|| {
                ResumeRankerError::InvalidInput(
                    "No resumes directory given; pass --resumes or set input.resumes_dir".to_string(),
                )
            })?;

            info!("Starting resume ranking");
            info!("Job description: {}", job.display());
            info!("Resumes directory: {}", resumes.display());

            if !job.is_file() {
                return Err(ResumeRankerError::InvalidInput(format!(
                    "Job description not found at {}",
                    job.display()
                )));
            }

            let candidates = discover_documents(&resumes, &config.extraction)?;
            info!("Found {} candidate document(s)", candidates.len());

            let encoder = load_encoder(&config.embedding).await?;
            let coordinator = ExtractionCoordinator::new(config.extraction.clone(), &config.ocr);
            let pipeline = MatchingPipeline::new(coordinator, encoder.as_ref());

            let report = pipeline.run(&job, &candidates).await?;

            let formatter = formatter_for(&config.output);
            println!("{}", formatter.format_report(&report)?);
        }

        Commands::Extract { path, show_text } => {
            if !path.is_file() {
                return Err(ResumeRankerError::InvalidInput(format!(
                    "File not found: {}",
                    path.display()
                )));
            }

            let coordinator = ExtractionCoordinator::new(config.extraction.clone(), &config.ocr);
            let result = coordinator.extract(&path).await;

            println!("File: {}", path.display());
            println!("Method: {}", result.method);
            println!("Characters: {}", result.char_count());

            if show_text && result.is_success() {
                println!("\n{}", result.text);
            }

            if !result.is_success() {
                return Err(ResumeRankerError::Processing(format!(
                    "No usable text could be extracted from {}",
                    path.display()
                )));
            }
        }

        Commands::Config { action } => {
            let config_path = config_file.unwrap_or_else(Config::config_path);
            match action {
                Some(ConfigAction::Show) | None => {
                    println!("Configuration file: {}\n", config_path.display());
                    let content = toml::to_string_pretty(&config).map_err(|e| {
                        ResumeRankerError::Configuration(format!("Failed to serialize config: {}", e))
                    })?;
                    println!("{}", content);
                }

                Some(ConfigAction::Reset) => {
                    Config::default().save_to(&config_path)?;
                    println!("Configuration reset to defaults at {}", config_path.display());
                }

                Some(ConfigAction::Path) => {
                    println!("{}", config_path.display());
                }
            }
        }
    }

    Ok(())
}
