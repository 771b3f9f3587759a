//! Skill matcher: scores candidate skills against job requirements

use clap::Parser;
use log::{error, info, warn};
use serde_json::json;
use skill_matcher::cli::{self, CacheAction, Cli, Commands, ConfigAction};
use skill_matcher::input::manager::InputManager;
use skill_matcher::input::skills::{load_candidate_skills, load_job_description};
use skill_matcher::output::formatter::{
    metadata_filename, parse_output_format, results_filename, save_json, to_json, ConsoleFormatter, OutputFormat,
};
use skill_matcher::output::report::{redacted_config, ReportBuilder, SourceIdentifier};
use skill_matcher::processing::embedding_cache::EmbeddingCache;
use skill_matcher::{MatchRequest, MatcherConfig, Result, SkillMatchError, SkillMatcher};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run_command(cli.command, cli.config).await {
        error!("Command failed: {}", e);
        process::exit(1);
    }
}

async fn run_command(command: Commands, config_path: Option<PathBuf>) -> Result<()> {
    match command {
        Commands::Match {
            candidate_skills,
            job_description,
            output,
            metadata_dir,
            format,
            detailed,
        } => {
            let format = parse_output_format(&format).map_err(SkillMatchError::InvalidInput)?;
            run_match(
                config_path.as_deref(),
                &candidate_skills,
                &job_description,
                output,
                &metadata_dir,
                format,
                detailed,
            )
            .await
        }

        Commands::Extract {
            input,
            chunk_size,
            chunk_overlap,
            output,
        } => {
            cli::validate_file_extension(&input, &["pdf", "txt", "md", "markdown"])
                .map_err(|e| SkillMatchError::InvalidInput(format!("Resume file: {}", e)))?;

            let mut input_manager = InputManager::new()?;
            let chunks = input_manager.extract_chunks(&input, chunk_size, chunk_overlap).await?;
            info!("Extracted {} chunks from {}", chunks.len(), input.display());

            let document = json!({
                "source": input.display().to_string(),
                "chunks": chunks,
            });
            match output {
                Some(path) => {
                    save_json(&document, &path)?;
                    println!("Saved extracted text to {}", path.display());
                }
                None => println!("{}", to_json(&document)?),
            }
            Ok(())
        }

        Commands::Cache { action } => {
            let config = load_config(config_path.as_deref())?;
            let mut cache = EmbeddingCache::open(config.cache_file(), &config.model_settings.model_name);
            match action {
                CacheAction::Stats => {
                    println!("Model: {}", cache.model_name());
                    if let Some(path) = cache.path() {
                        println!("Cache file: {}", path.display());
                    }
                    println!("Entries: {}", cache.len());
                }
                CacheAction::Clear => {
                    let removed = cache.len();
                    cache.clear()?;
                    println!("Removed {} cached embeddings", removed);
                }
            }
            Ok(())
        }

        Commands::Config { action } => match action {
            ConfigAction::Show => {
                let config = load_config(config_path.as_deref())?;
                println!("{}", to_json(&redacted_config(&config))?);
                Ok(())
            }
        },
    }
}

/// Explicit path first, then the per-user default location.
fn load_config(path: Option<&Path>) -> Result<MatcherConfig> {
    match path {
        Some(path) => MatcherConfig::from_path(path),
        None => {
            let default_path = MatcherConfig::default_config_path();
            if default_path.exists() {
                MatcherConfig::from_path(&default_path)
            } else {
                Err(SkillMatchError::Configuration(format!(
                    "No configuration given and none found at {}",
                    default_path.display()
                )))
            }
        }
    }
}

/// Save a failure record before handing the error back.
fn record_failure(report: ReportBuilder, metadata_path: &Path, err: SkillMatchError) -> SkillMatchError {
    let metadata = report.failure(err.to_string());
    match save_json(&metadata, metadata_path) {
        Ok(()) => info!("Metadata saved to {}", metadata_path.display()),
        Err(e) => error!("Failed to save metadata to {}: {}", metadata_path.display(), e),
    }
    err
}

async fn run_match(
    config_path: Option<&Path>,
    candidate_path: &Path,
    job_path: &Path,
    output: Option<PathBuf>,
    metadata_dir: &Path,
    format: OutputFormat,
    detailed: bool,
) -> Result<()> {
    let metadata_path = metadata_dir.join(metadata_filename(candidate_path, job_path));
    let candidate_source = SourceIdentifier::file_system(candidate_path.display().to_string());
    let job_source = SourceIdentifier::file_system(job_path.display().to_string());
    let report = ReportBuilder::start(candidate_source.clone(), job_source.clone());

    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => return Err(record_failure(report, &metadata_path, e)),
    };
    let report = report.with_config(&config);

    let candidate_skills = match load_candidate_skills(candidate_path).await {
        Ok(skills) => skills,
        Err(e) => return Err(record_failure(report, &metadata_path, e)),
    };
    let job = match load_job_description(job_path).await {
        Ok(job) => job,
        Err(e) => return Err(record_failure(report, &metadata_path, e)),
    };

    let request = MatchRequest::new(candidate_skills, job.required_skills, job.optional_skills)
        .with_candidate_source(candidate_source)
        .with_job_source(job_source);
    let report = report.with_input_counts(request.input_counts());

    let mut matcher = match SkillMatcher::from_config(config) {
        Ok(matcher) => matcher,
        Err(e) => return Err(record_failure(report, &metadata_path, e)),
    };

    let outcome = matcher.match_skills(&request);
    if let Err(e) = matcher.close() {
        warn!("Failed to save embedding cache: {}", e);
    }

    save_json(&outcome.metadata, &metadata_path)?;
    info!("Metadata saved to {}", metadata_path.display());

    let formatter = ConsoleFormatter::new(true, detailed);
    match outcome.results {
        Some(results) => {
            let results_path = match output {
                Some(path) => path,
                None => results_filename(job_path)?,
            };
            save_json(&results, &results_path)?;
            info!("Results saved to {}", results_path.display());

            match format {
                OutputFormat::Console => print!("{}", formatter.format_results(&results)),
                OutputFormat::Json => println!("{}", to_json(&results)?),
            }
            Ok(())
        }
        None => {
            eprint!("{}", formatter.format_failure(&outcome.metadata));
            Err(SkillMatchError::Matching(
                outcome
                    .metadata
                    .matching_details
                    .error_message
                    .unwrap_or_else(|| "matching failed".to_string()),
            ))
        }
    }
}
